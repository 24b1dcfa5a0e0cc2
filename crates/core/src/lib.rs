pub mod chart;
pub mod domain;
pub mod error;
pub mod ingest;
pub mod llm;
pub mod memo;
pub mod merge;
pub mod render;
pub mod structure;

pub mod config {
    use crate::error::MemoError;
    use anyhow::Context;

    #[derive(Debug, Clone, Default)]
    pub struct Settings {
        pub fmp_api_key: Option<String>,
        pub groq_api_key: Option<String>,
        pub sentry_dsn: Option<String>,
        pub fmp_base_url: Option<String>,
        pub groq_base_url: Option<String>,
        pub groq_model: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Ok(Self {
                fmp_api_key: non_empty_var("FMP_API_KEY"),
                groq_api_key: non_empty_var("GROQ_API_KEY"),
                sentry_dsn: non_empty_var("SENTRY_DSN"),
                fmp_base_url: non_empty_var("FMP_BASE_URL"),
                groq_base_url: non_empty_var("GROQ_BASE_URL"),
                groq_model: non_empty_var("GROQ_MODEL"),
            })
        }

        pub fn require_fmp_api_key(&self) -> anyhow::Result<&str> {
            self.fmp_api_key
                .as_deref()
                .context("FMP_API_KEY is required")
        }

        pub fn require_groq_api_key(&self) -> anyhow::Result<&str> {
            self.groq_api_key
                .as_deref()
                .context("GROQ_API_KEY is required")
        }

        /// Both collaborator credentials, or the configuration error surfaced to callers.
        pub fn require_credentials(&self) -> Result<(&str, &str), MemoError> {
            match (self.fmp_api_key.as_deref(), self.groq_api_key.as_deref()) {
                (Some(fmp), Some(groq)) => Ok((fmp, groq)),
                _ => Err(MemoError::Configuration(
                    "API keys not configured".to_string(),
                )),
            }
        }
    }

    fn non_empty_var(key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|v| !v.trim().is_empty())
    }

}
