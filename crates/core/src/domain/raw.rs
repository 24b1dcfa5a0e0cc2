//! Records as the financial-data provider hands them over.
//!
//! Decoding is deliberately forgiving: numbers may arrive as JSON numbers, numeric strings or
//! null, and whole sections may be missing. Nothing here is mutated after decode.

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFinancialBundle {
    #[serde(default)]
    pub profile: Option<CompanyProfile>,
    #[serde(default, deserialize_with = "lenient::vec")]
    pub income_statement: Vec<IncomeStatement>,
    #[serde(default, deserialize_with = "lenient::vec")]
    pub ratios: Vec<RatioRecord>,
    #[serde(default, deserialize_with = "lenient::vec")]
    pub cash_flow: Vec<CashFlowRecord>,
    #[serde(default, deserialize_with = "lenient::vec")]
    pub key_metrics: Vec<KeyMetricRecord>,
    #[serde(default)]
    pub prices: Option<PricePerformanceSummary>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyProfile {
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub exchange_short_name: Option<String>,
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default, deserialize_with = "lenient::f64")]
    pub pe: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeStatement {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "lenient::f64")]
    pub revenue: Option<f64>,
    #[serde(default, deserialize_with = "lenient::f64")]
    pub ebitda: Option<f64>,
    #[serde(default, deserialize_with = "lenient::f64")]
    pub net_income: Option<f64>,
    #[serde(default, deserialize_with = "lenient::f64")]
    pub operating_income: Option<f64>,
    #[serde(default, deserialize_with = "lenient::f64")]
    pub eps: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatioRecord {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "lenient::f64")]
    pub return_on_equity: Option<f64>,
    #[serde(default, deserialize_with = "lenient::f64")]
    pub return_on_assets: Option<f64>,
    #[serde(default, deserialize_with = "lenient::f64")]
    pub debt_equity_ratio: Option<f64>,
    #[serde(default, deserialize_with = "lenient::f64")]
    pub interest_coverage: Option<f64>,
    #[serde(default, deserialize_with = "lenient::f64")]
    pub current_ratio: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashFlowRecord {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "lenient::f64")]
    pub free_cash_flow: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyMetricRecord {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "lenient::f64")]
    pub pe_ratio: Option<f64>,
}

/// Summary statistics per fixed window. Each window is independently optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricePerformanceSummary {
    #[serde(default, deserialize_with = "lenient::period")]
    pub one_year: Option<PeriodRecord>,
    #[serde(default, deserialize_with = "lenient::period")]
    pub three_year: Option<PeriodRecord>,
    #[serde(default, deserialize_with = "lenient::period")]
    pub five_year: Option<PeriodRecord>,
}

impl PricePerformanceSummary {
    pub fn is_empty(&self) -> bool {
        self.one_year.is_none() && self.three_year.is_none() && self.five_year.is_none()
    }
}

/// All five statistics are present or the record does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodRecord {
    #[serde(deserialize_with = "lenient::required_f64")]
    pub start_price: f64,
    #[serde(deserialize_with = "lenient::required_f64")]
    pub end_price: f64,
    /// Signed percent.
    #[serde(deserialize_with = "lenient::required_f64")]
    pub change: f64,
    /// Percent, never positive.
    #[serde(deserialize_with = "lenient::required_f64")]
    pub max_drawdown: f64,
    /// Percent, never negative.
    #[serde(deserialize_with = "lenient::required_f64")]
    pub volatility: f64,
}

pub(crate) mod lenient {
    use super::*;
    use serde::de::{DeserializeOwned, Error as _};
    use serde_json::Value;

    fn number_from(value: &Value) -> Option<f64> {
        match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
        .filter(|v| v.is_finite())
    }

    pub fn f64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        let value = Value::deserialize(d)?;
        Ok(number_from(&value))
    }

    pub fn required_f64<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
        let value = Value::deserialize(d)?;
        number_from(&value).ok_or_else(|| D::Error::custom(format!("expected a number, got {value}")))
    }

    /// A period record with any unusable field counts as absent.
    pub fn period<'de, D: Deserializer<'de>>(d: D) -> Result<Option<PeriodRecord>, D::Error> {
        let value = Value::deserialize(d)?;
        if value.is_null() {
            return Ok(None);
        }
        match serde_json::from_value::<PeriodRecord>(value) {
            Ok(record) => Ok(Some(record)),
            Err(err) => {
                tracing::warn!(error = %err, "dropping incomplete price period record");
                Ok(None)
            }
        }
    }

    /// Null or a non-array reads as empty. An element that fails to decode keeps its slot as
    /// `T::default()`, since statements are joined by position.
    pub fn vec<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned + Default,
    {
        let value = Value::deserialize(d)?;
        let Value::Array(items) = value else {
            return Ok(Vec::new());
        };
        Ok(items
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                serde_json::from_value::<T>(item).unwrap_or_else(|err| {
                    tracing::warn!(index, error = %err, "blanking undecodable statement record");
                    T::default()
                })
            })
            .collect())
    }
}
