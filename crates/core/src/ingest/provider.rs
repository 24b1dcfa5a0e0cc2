use crate::config::Settings;
use crate::domain::raw::RawFinancialBundle;
use crate::ingest::prices;
use crate::ingest::symbol::{SearchHit, SymbolSearch};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use reqwest::Url;
use serde_json::{json, Value};
use std::fmt;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://financialmodelingprep.com";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const STATEMENT_LIMIT: &str = "5";

#[async_trait::async_trait]
pub trait FinancialDataClient: Send + Sync {
    fn provider_name(&self) -> &'static str;

    /// Everything the structurer needs for one symbol. `profile` is `None` for unknown symbols.
    async fn fetch_bundle(&self, symbol: &str) -> Result<RawFinancialBundle>;
}

/// Non-success status from the provider, kept in the error chain so callers can surface it.
#[derive(Debug, Clone)]
pub struct ProviderHttpError {
    pub endpoint: String,
    pub status: u16,
    pub body: String,
}

impl fmt::Display for ProviderHttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "data provider HTTP {} on {}: {}",
            self.status, self.endpoint, self.body
        )
    }
}

impl std::error::Error for ProviderHttpError {}

#[derive(Debug, Clone)]
pub struct FmpClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl FmpClient {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let api_key = settings.require_fmp_api_key()?.to_string();
        let base_url = settings
            .fmp_base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let timeout_secs = std::env::var("FMP_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build data provider http client")?;

        Ok(Self {
            http,
            base_url,
            api_key,
        })
    }

    /// `{base}/api/v3/{segments..}` with each segment percent-encoded, so a free-text symbol
    /// cannot add path segments or a query.
    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .with_context(|| format!("invalid data provider base url: {}", self.base_url))?;
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("data provider base url cannot take a path: {}", self.base_url))?
            .pop_if_empty()
            .extend(["api", "v3"])
            .extend(segments);
        Ok(url)
    }

    /// GET one endpoint. `endpoint` names it in errors and logs; the key never leaves this fn.
    async fn get_json(&self, endpoint: &str, path: &[&str], query: &[(&str, &str)]) -> Result<Value> {
        let res = self
            .http
            .get(self.url(path)?)
            .query(query)
            .query(&[("apikey", self.api_key.as_str())])
            .send()
            .await
            .with_context(|| format!("data provider request failed ({endpoint})"))?;

        let status = res.status();
        let text = res
            .text()
            .await
            .with_context(|| format!("failed to read provider response ({endpoint})"))?;

        if !status.is_success() {
            return Err(ProviderHttpError {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body: text,
            }
            .into());
        }

        serde_json::from_str::<Value>(&text)
            .with_context(|| format!("provider response is not valid JSON ({endpoint}): {text}"))
    }

    async fn statements(&self, endpoint: &str, symbol: &str) -> Result<Value> {
        self.get_json(
            endpoint,
            &[endpoint, symbol],
            &[("limit", STATEMENT_LIMIT)],
        )
        .await
    }
}

#[async_trait::async_trait]
impl FinancialDataClient for FmpClient {
    fn provider_name(&self) -> &'static str {
        "fmp"
    }

    async fn fetch_bundle(&self, symbol: &str) -> Result<RawFinancialBundle> {
        let profile = self.get_json("profile", &["profile", symbol], &[]).await?;
        let Some(profile) = profile_record(profile) else {
            tracing::info!(%symbol, "no provider profile; skipping statements");
            return Ok(RawFinancialBundle::default());
        };

        let income = self.statements("income-statement", symbol).await?;
        let ratios = self.statements("ratios", symbol).await?;
        let cash_flow = self.statements("cash-flow-statement", symbol).await?;
        let key_metrics = self.statements("key-metrics", symbol).await?;
        let history = self
            .get_json(
                "historical-price-full",
                &["historical-price-full", symbol],
                &[("serietype", "line")],
            )
            .await?;

        let closes = historical_closes(&history);
        let summary = prices::summarize(&closes);
        tracing::debug!(
            %symbol,
            closes = closes.len(),
            "fetched provider bundle"
        );

        let mut bundle = bundle_from_parts(profile, income, ratios, cash_flow, key_metrics)?;
        bundle.prices = (!summary.is_empty()).then_some(summary);
        Ok(bundle)
    }
}

#[async_trait::async_trait]
impl SymbolSearch for FmpClient {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>> {
        let limit = limit.to_string();
        let value = self
            .get_json("search", &["search"], &[("query", query), ("limit", &limit)])
            .await?;
        let Value::Array(items) = value else {
            return Ok(Vec::new());
        };
        Ok(items
            .into_iter()
            .filter_map(|item| serde_json::from_value::<SearchHit>(item).ok())
            .collect())
    }
}

/// The profile record, or `None` when the provider does not know the symbol. Profiles arrive
/// as a one-element array; an empty array, an empty object or an error object means unknown.
fn profile_record(profile: Value) -> Option<Value> {
    match profile {
        Value::Array(mut items) if !items.is_empty() => Some(items.swap_remove(0)),
        Value::Object(map) if !map.is_empty() && !map.contains_key("Error Message") => {
            Some(Value::Object(map))
        }
        _ => None,
    }
}

/// Assembles the provider payloads through the bundle's forgiving decoder.
fn bundle_from_parts(
    profile: Value,
    income: Value,
    ratios: Value,
    cash_flow: Value,
    key_metrics: Value,
) -> Result<RawFinancialBundle> {
    serde_json::from_value::<RawFinancialBundle>(json!({
        "profile": profile,
        "incomeStatement": income,
        "ratios": ratios,
        "cashFlow": cash_flow,
        "keyMetrics": key_metrics,
    }))
    .context("failed to decode provider payload into RawFinancialBundle")
}

/// `{"historical": [{"date": "YYYY-MM-DD", "close": n}, ...]}`; unusable rows are skipped.
fn historical_closes(value: &Value) -> Vec<(NaiveDate, f64)> {
    value
        .get("historical")
        .and_then(Value::as_array)
        .map(|rows| {
            rows.iter()
                .filter_map(|row| {
                    let date = row.get("date")?.as_str()?;
                    let date = NaiveDate::parse_from_str(date.get(..10)?, "%Y-%m-%d").ok()?;
                    let close = row.get("close")?.as_f64()?;
                    Some((date, close))
                })
                .collect()
        })
        .unwrap_or_default()
}
