//! The qualitative half of a memo as the narrative collaborator returns it.
//!
//! Every field is optional on the wire. List lengths are not trusted here; the merger fits them
//! to their contracted counts.

use crate::domain::metric::NOT_DISCLOSED;
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NarrativeAnalysis {
    #[serde(default)]
    pub price_context: Option<PriceContext>,
    #[serde(default)]
    pub financial_structure: Option<FinancialStructure>,
    #[serde(default, deserialize_with = "strings")]
    pub business_snapshot: Vec<String>,
    #[serde(default, alias = "whyThisCOULDWork", deserialize_with = "theses")]
    pub why_this_could_work: Vec<ThesisPoint>,
    #[serde(default, deserialize_with = "strings")]
    pub key_risks: Vec<String>,
    #[serde(default)]
    pub valuation_sanity: Option<ValuationSanity>,
    #[serde(default)]
    pub judgment_support: Option<JudgmentSupport>,
    #[serde(default, deserialize_with = "strings")]
    pub validation_needs: Vec<String>,
    #[serde(default, deserialize_with = "strings")]
    pub narrative_context: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceContext {
    #[serde(default)]
    pub trend: Option<String>,
    #[serde(default)]
    pub volatility: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialStructure {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "strings")]
    pub segments: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThesisPoint {
    #[serde(default)]
    pub claim: String,
    #[serde(default)]
    pub evidence_strength: EvidenceStrength,
}

impl ThesisPoint {
    pub fn not_disclosed() -> Self {
        Self {
            claim: NOT_DISCLOSED.to_string(),
            evidence_strength: EvidenceStrength::Weak,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum EvidenceStrength {
    Strong,
    Moderate,
    #[default]
    Weak,
}

impl EvidenceStrength {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Strong => "Strong",
            Self::Moderate => "Moderate",
            Self::Weak => "Weak",
        }
    }
}

impl<'de> Deserialize<'de> for EvidenceStrength {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let tag = loose_tag(d)?;
        Ok(match tag.as_str() {
            "strong" => Self::Strong,
            "moderate" => Self::Moderate,
            _ => Self::Weak,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValuationSanity {
    #[serde(default)]
    pub assessment: Option<String>,
    #[serde(default)]
    pub reasoning: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JudgmentSupport {
    #[serde(default)]
    pub business_quality: Option<Judgment>,
    #[serde(default)]
    pub evidence_strength: Option<Judgment>,
    #[serde(default)]
    pub uncertainty_level: Option<Judgment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Judgment {
    #[serde(default)]
    pub level: Level,
    #[serde(default)]
    pub reasoning: String,
}

impl Default for Judgment {
    fn default() -> Self {
        Self {
            level: Level::Medium,
            reasoning: NOT_DISCLOSED.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Level {
    High,
    #[default]
    Medium,
    Low,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

impl<'de> Deserialize<'de> for Level {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let tag = loose_tag(d)?;
        Ok(match tag.as_str() {
            "high" => Self::High,
            "low" => Self::Low,
            _ => Self::Medium,
        })
    }
}

/// Lowercased tag text; anything that is not a string reads as empty.
fn loose_tag<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    let value = serde_json::Value::deserialize(d)?;
    Ok(value
        .as_str()
        .map(|s| s.trim().to_ascii_lowercase())
        .unwrap_or_default())
}

/// String lists where a model sometimes emits null, a bare string, or non-string entries.
pub(crate) fn strings<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    use serde_json::Value;

    Ok(match Value::deserialize(d)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                Value::Null => None,
                other => Some(other.to_string()),
            })
            .collect(),
        Value::String(s) => vec![s],
        _ => Vec::new(),
    })
}

/// Thesis points, accepting bare claim strings as unsupported ("Weak") claims.
pub(crate) fn theses<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<ThesisPoint>, D::Error> {
    use serde_json::Value;

    let Value::Array(items) = Value::deserialize(d)? else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .filter_map(|item| match item {
            Value::String(claim) => Some(ThesisPoint {
                claim,
                evidence_strength: EvidenceStrength::Weak,
            }),
            other => serde_json::from_value::<ThesisPoint>(other).ok(),
        })
        .collect())
}
