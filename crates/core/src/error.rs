use crate::ingest::provider::ProviderHttpError;
use crate::llm::error::LlmDiagnosticsError;
use thiserror::Error;

/// Request-level failures. Anything not listed here degrades to a sentinel instead.
#[derive(Debug, Error)]
pub enum MemoError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Configuration(String),

    #[error("no company profile found for symbol {symbol}")]
    NotFound { symbol: String },

    #[error("{service} request failed: {detail}")]
    Upstream {
        service: &'static str,
        status: Option<u16>,
        detail: String,
    },

    #[error("company identity incomplete: missing {0}")]
    DataIncomplete(String),
}

impl MemoError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Lifts a collaborator failure, keeping the upstream HTTP status when one is in the chain.
    pub fn upstream(service: &'static str, err: anyhow::Error) -> Self {
        let status = err
            .chain()
            .find_map(|cause| {
                if let Some(diag) = cause.downcast_ref::<LlmDiagnosticsError>() {
                    return Some(diag.status);
                }
                cause
                    .downcast_ref::<ProviderHttpError>()
                    .map(|e| Some(e.status))
            })
            .flatten();

        Self::Upstream {
            service,
            status,
            detail: format!("{err:#}"),
        }
    }

    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::NotFound { .. } => Some("Try a different company or check symbol format"),
            _ => None,
        }
    }
}
