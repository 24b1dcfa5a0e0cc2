use crate::domain::metric::Metric;
use crate::domain::raw::PricePerformanceSummary;
use serde::{Deserialize, Serialize};

pub const SEGMENT_UNAVAILABLE_MESSAGE: &str = "Segment data not available from FMP API";

/// Numeric half of a memo, derived once per request from the provider bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredFinancialData {
    #[serde(default)]
    pub price_data: Option<PricePerformanceSummary>,
    #[serde(default)]
    pub financial_snapshot: YearSeries<SnapshotYear>,
    #[serde(default)]
    pub segment_breakdown: SegmentBreakdown,
    #[serde(default)]
    pub financial_ratios: YearSeries<RatioYear>,
    #[serde(default)]
    pub valuation_metrics: ValuationMetrics,
}

/// Parallel `years`/`data` lists, newest first. `years[i]` labels `data[i]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearSeries<T> {
    #[serde(default)]
    pub years: Vec<Option<String>>,
    #[serde(default)]
    pub data: Vec<T>,
}

impl<T> Default for YearSeries<T> {
    fn default() -> Self {
        Self {
            years: Vec::new(),
            data: Vec::new(),
        }
    }
}

impl<T> YearSeries<T> {
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Pairs each row with its year date string, if any.
    pub fn rows(&self) -> impl Iterator<Item = (Option<&str>, &T)> {
        self.data
            .iter()
            .enumerate()
            .map(move |(i, row)| (self.years.get(i).and_then(|y| y.as_deref()), row))
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotYear {
    #[serde(default)]
    pub revenue: Option<f64>,
    #[serde(default)]
    pub ebitda: Option<f64>,
    #[serde(default)]
    pub net_income: Option<f64>,
    #[serde(default)]
    pub eps: Option<f64>,
    /// Percent; absent when revenue is zero or missing.
    #[serde(default)]
    pub operating_margin: Option<f64>,
    #[serde(default)]
    pub net_margin: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatioYear {
    #[serde(default)]
    pub roe: Metric,
    #[serde(default)]
    pub roa: Metric,
    #[serde(default)]
    pub roce: Metric,
    #[serde(default)]
    pub debt_to_equity: Metric,
    #[serde(default)]
    pub interest_coverage: Metric,
    #[serde(default)]
    pub current_ratio: Metric,
    #[serde(default)]
    pub free_cash_flow: Metric,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuationMetrics {
    #[serde(default, rename = "currentPE")]
    pub current_pe: Metric,
    #[serde(default, rename = "historicalAvgPE")]
    pub historical_avg_pe: Metric,
    #[serde(default, rename = "sectorAvgPE")]
    pub sector_avg_pe: Metric,
}

impl ValuationMetrics {
    pub fn any_disclosed(&self) -> bool {
        self.current_pe.is_disclosed()
            || self.historical_avg_pe.is_disclosed()
            || self.sector_avg_pe.is_disclosed()
    }
}

/// The provider has no segment data; the shape is kept so richer sources can fill it later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentBreakdown {
    pub available: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Default for SegmentBreakdown {
    fn default() -> Self {
        Self {
            available: false,
            message: Some(SEGMENT_UNAVAILABLE_MESSAGE.to_string()),
        }
    }
}
