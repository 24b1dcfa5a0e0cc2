use crate::config::Settings;
use crate::domain::report::MemoReport;
use crate::error::MemoError;
use crate::ingest::provider::{FinancialDataClient, FmpClient};
use crate::ingest::symbol::{resolve_symbol, SymbolSearch};
use crate::llm::groq::GroqClient;
use crate::llm::{NarrativeClient, NarrativeInput};
use crate::merge::{company_identity, merge};
use crate::structure::structure_financial_data;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoRequest {
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub exchange: Option<String>,
}

impl MemoRequest {
    pub fn new(company_name: impl Into<String>, exchange: Option<String>) -> Self {
        Self {
            company_name: Some(company_name.into()),
            exchange,
        }
    }

    /// Trimmed company name, or the validation error every entry point reports first.
    pub fn company_name(&self) -> Result<&str, MemoError> {
        self.company_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| MemoError::validation("Company name is required"))
    }
}

/// One memo per call; holds no per-request state between calls.
#[derive(Clone)]
pub struct MemoService {
    symbols: Arc<dyn SymbolSearch>,
    data: Arc<dyn FinancialDataClient>,
    narrative: Arc<dyn NarrativeClient>,
}

impl MemoService {
    pub fn new(
        symbols: Arc<dyn SymbolSearch>,
        data: Arc<dyn FinancialDataClient>,
        narrative: Arc<dyn NarrativeClient>,
    ) -> Self {
        Self {
            symbols,
            data,
            narrative,
        }
    }

    /// Production wiring. Missing credentials surface as a configuration error.
    pub fn from_settings(settings: &Settings) -> Result<Self, MemoError> {
        settings.require_credentials()?;
        let fmp = Arc::new(
            FmpClient::from_settings(settings)
                .map_err(|err| MemoError::Configuration(format!("{err:#}")))?,
        );
        let groq = GroqClient::from_settings(settings)
            .map_err(|err| MemoError::Configuration(format!("{err:#}")))?;
        Ok(Self::new(fmp.clone(), fmp, Arc::new(groq)))
    }

    pub async fn generate(&self, request: MemoRequest) -> Result<MemoReport, MemoError> {
        let company_name = request.company_name()?;
        let exchange = request.exchange.as_deref();

        let symbol = resolve_symbol(self.symbols.as_ref(), company_name, exchange).await;
        tracing::info!(%company_name, ?exchange, %symbol, "resolved symbol");

        let bundle = self
            .data
            .fetch_bundle(&symbol)
            .await
            .map_err(|err| MemoError::upstream(self.data.provider_name(), err))?;
        if bundle.profile.is_none() {
            return Err(MemoError::NotFound { symbol });
        }
        let company = company_identity(bundle.profile.as_ref())?;

        let structured = structure_financial_data(&bundle);
        tracing::debug!(
            %symbol,
            snapshot_years = structured.financial_snapshot.data.len(),
            ratio_years = structured.financial_ratios.data.len(),
            has_prices = structured.price_data.is_some(),
            "structured financial data"
        );

        let provider = self.narrative.provider().as_str();
        tracing::info!(%symbol, provider, "requesting narrative");
        let narrative = self
            .narrative
            .analyze(NarrativeInput {
                company_name: company.name.clone(),
                symbol: company.symbol.clone(),
                structured: structured.clone(),
            })
            .await
            .map_err(|err| MemoError::upstream(provider, err))?;

        let report = merge(company, structured, narrative);
        tracing::info!(symbol = %report.company.symbol, "memo generated");
        Ok(report)
    }
}
