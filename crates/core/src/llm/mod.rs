use crate::domain::narrative::NarrativeAnalysis;
use crate::domain::structured::StructuredFinancialData;

pub mod error;
pub mod groq;
pub mod json;

#[derive(Debug, Clone)]
pub struct NarrativeInput {
    pub company_name: String,
    pub symbol: String,
    pub structured: StructuredFinancialData,
}

impl NarrativeInput {
    /// Pretty-printed structured data, as embedded in the prompt.
    pub fn structured_json(&self) -> String {
        serde_json::to_string_pretty(&self.structured).unwrap_or_else(|_| "{}".to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Groq,
}

impl Provider {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Groq => "groq",
        }
    }
}

#[async_trait::async_trait]
pub trait NarrativeClient: Send + Sync {
    fn provider(&self) -> Provider;

    async fn analyze(&self, input: NarrativeInput) -> anyhow::Result<NarrativeAnalysis>;
}
