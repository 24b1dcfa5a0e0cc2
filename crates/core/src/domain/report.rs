use crate::domain::metric::NOT_DISCLOSED;
use crate::domain::narrative::{
    self, FinancialStructure, Judgment, PriceContext, ThesisPoint, ValuationSanity,
};
use crate::domain::raw::PricePerformanceSummary;
use crate::domain::structured::{
    RatioYear, SegmentBreakdown, SnapshotYear, ValuationMetrics, YearSeries,
};
use crate::merge::fit_arity;
use serde::{Deserialize, Deserializer, Serialize};

pub const BUSINESS_SNAPSHOT_COUNT: usize = 4;
pub const THESIS_COUNT: usize = 3;
pub const KEY_RISK_COUNT: usize = 5;
pub const VALIDATION_NEED_COUNT: usize = 3;

/// Company identity plus both halves of the analysis. The renderer's only input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoReport {
    pub company: CompanyIdentity,
    #[serde(default)]
    pub research: Research,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyIdentity {
    pub name: String,
    pub symbol: String,
    pub exchange: String,
    pub sector: String,
    #[serde(default)]
    pub industry: Option<String>,
}

/// Structured and narrative fields flattened into one object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Research {
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

    #[serde(default)]
    pub price_context: PriceContext,
    #[serde(default)]
    pub financial_structure: FinancialStructure,
    #[serde(default = "sentinel_strings", deserialize_with = "fitted_strings")]
    pub business_snapshot: [String; BUSINESS_SNAPSHOT_COUNT],
    #[serde(
        default = "sentinel_theses",
        alias = "whyThisCOULDWork",
        deserialize_with = "fitted_theses"
    )]
    pub why_this_could_work: [ThesisPoint; THESIS_COUNT],
    #[serde(default = "sentinel_strings", deserialize_with = "fitted_strings")]
    pub key_risks: [String; KEY_RISK_COUNT],
    #[serde(default)]
    pub valuation_sanity: ValuationSanity,
    #[serde(default)]
    pub judgment_support: JudgmentGrid,
    #[serde(default = "sentinel_strings", deserialize_with = "fitted_strings")]
    pub validation_needs: [String; VALIDATION_NEED_COUNT],
    #[serde(default)]
    pub narrative_context: Vec<String>,
}

impl Default for Research {
    fn default() -> Self {
        Self {
            price_data: None,
            financial_snapshot: YearSeries::default(),
            segment_breakdown: SegmentBreakdown::default(),
            financial_ratios: YearSeries::default(),
            valuation_metrics: ValuationMetrics::default(),
            price_context: PriceContext::default(),
            financial_structure: FinancialStructure::default(),
            business_snapshot: sentinel_strings(),
            why_this_could_work: sentinel_theses(),
            key_risks: sentinel_strings(),
            valuation_sanity: ValuationSanity::default(),
            judgment_support: JudgmentGrid::default(),
            validation_needs: sentinel_strings(),
            narrative_context: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JudgmentGrid {
    #[serde(default)]
    pub business_quality: Judgment,
    #[serde(default)]
    pub evidence_strength: Judgment,
    #[serde(default)]
    pub uncertainty_level: Judgment,
}

pub fn not_disclosed() -> String {
    NOT_DISCLOSED.to_string()
}

fn sentinel_strings<const N: usize>() -> [String; N] {
    std::array::from_fn(|_| not_disclosed())
}

fn sentinel_theses<const N: usize>() -> [ThesisPoint; N] {
    std::array::from_fn(|_| ThesisPoint::not_disclosed())
}

// Saved reports go through the narrative decoders and are re-fitted, so a hand-edited file
// still renders the contracted counts.
fn fitted_strings<'de, D: Deserializer<'de>, const N: usize>(d: D) -> Result<[String; N], D::Error> {
    Ok(fit_arity(narrative::strings(d)?, not_disclosed))
}

fn fitted_theses<'de, D: Deserializer<'de>, const N: usize>(
    d: D,
) -> Result<[ThesisPoint; N], D::Error> {
    Ok(fit_arity(narrative::theses(d)?, ThesisPoint::not_disclosed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sparse_report_json_fills_contracted_slots() {
        let v = json!({
            "company": {"name": "Acme Corp", "symbol": "ACME", "exchange": "NASDAQ", "sector": "Industrials"},
            "research": {
                "keyRisks": ["a", "b", "c", "d", "e", "f", "g"],
                "businessSnapshot": ["only one"]
            }
        });
        let report: MemoReport = serde_json::from_value(v).unwrap();
        let r = &report.research;
        assert_eq!(r.key_risks[4], "e");
        assert_eq!(r.business_snapshot[0], "only one");
        assert_eq!(r.business_snapshot[3], NOT_DISCLOSED);
        assert_eq!(r.why_this_could_work[2], ThesisPoint::not_disclosed());
        assert_eq!(r.validation_needs.len(), VALIDATION_NEED_COUNT);
        assert!(!r.segment_breakdown.available);
    }

    #[test]
    fn saved_report_accepts_loose_list_shapes() {
        let v = json!({
            "company": {"name": "Acme Corp", "symbol": "ACME", "exchange": "NASDAQ", "sector": "Industrials"},
            "research": {
                "whyThisCOULDWork": ["Bare claim", {"claim": "Pricing power", "evidenceStrength": "Strong"}],
                "keyRisks": ["Churn", null, "FX"],
                "validationNeeds": "Check backlog",
                "businessSnapshot": null
            }
        });
        let report: MemoReport = serde_json::from_value(v).unwrap();
        let r = &report.research;
        assert_eq!(r.why_this_could_work[0].claim, "Bare claim");
        assert_eq!(r.why_this_could_work[1].claim, "Pricing power");
        assert_eq!(r.why_this_could_work[2], ThesisPoint::not_disclosed());
        assert_eq!(r.key_risks[..3], ["Churn", "FX", NOT_DISCLOSED]);
        assert_eq!(r.validation_needs[0], "Check backlog");
        assert_eq!(r.business_snapshot, sentinel_strings::<BUSINESS_SNAPSHOT_COUNT>());
    }

    #[test]
    fn serializes_flattened_research_keys() {
        let report = MemoReport {
            company: CompanyIdentity {
                name: "Acme Corp".to_string(),
                symbol: "ACME".to_string(),
                exchange: "NASDAQ".to_string(),
                sector: "Industrials".to_string(),
                industry: None,
            },
            research: Research::default(),
        };
        let v = serde_json::to_value(&report).unwrap();
        let research = v["research"].as_object().unwrap();
        for key in [
            "priceData",
            "financialSnapshot",
            "segmentBreakdown",
            "financialRatios",
            "valuationMetrics",
            "priceContext",
            "financialStructure",
            "businessSnapshot",
            "whyThisCouldWork",
            "keyRisks",
            "valuationSanity",
            "judgmentSupport",
            "validationNeeds",
            "narrativeContext",
        ] {
            assert!(research.contains_key(key), "missing {key}");
        }
        assert_eq!(v["research"]["valuationMetrics"]["currentPE"], json!("Not disclosed"));
    }
}
