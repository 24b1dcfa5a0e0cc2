//! Joins company identity, structured data and the narrative into a [`MemoReport`].

use crate::domain::narrative::{Judgment, NarrativeAnalysis, ThesisPoint};
use crate::domain::raw::CompanyProfile;
use crate::domain::report::{not_disclosed, CompanyIdentity, JudgmentGrid, MemoReport, Research};
use crate::domain::structured::StructuredFinancialData;
use crate::error::MemoError;

/// Exactly `N` items: the first `N` of `items`, padded with `sentinel()`.
pub fn fit_arity<T, const N: usize>(items: Vec<T>, mut sentinel: impl FnMut() -> T) -> [T; N] {
    let mut items = items.into_iter();
    std::array::from_fn(|_| items.next().unwrap_or_else(&mut sentinel))
}

/// The one hard failure of the merge: a report cannot exist without name, symbol, exchange and
/// sector.
pub fn company_identity(profile: Option<&CompanyProfile>) -> Result<CompanyIdentity, MemoError> {
    let Some(profile) = profile else {
        return Err(MemoError::DataIncomplete("company profile".to_string()));
    };

    let required = [
        ("name", &profile.company_name),
        ("symbol", &profile.symbol),
        ("exchange", &profile.exchange_short_name),
        ("sector", &profile.sector),
    ];
    let missing: Vec<&str> = required
        .iter()
        .filter(|(_, v)| v.as_deref().map_or(true, |s| s.trim().is_empty()))
        .map(|(field, _)| *field)
        .collect();
    if !missing.is_empty() {
        return Err(MemoError::DataIncomplete(missing.join(", ")));
    }

    let field = |v: &Option<String>| v.as_deref().unwrap_or_default().trim().to_string();
    Ok(CompanyIdentity {
        name: field(&profile.company_name),
        symbol: field(&profile.symbol),
        exchange: field(&profile.exchange_short_name),
        sector: field(&profile.sector),
        industry: profile
            .industry
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
    })
}

pub fn merge(
    company: CompanyIdentity,
    structured: StructuredFinancialData,
    narrative: NarrativeAnalysis,
) -> MemoReport {
    let judgment = narrative.judgment_support.unwrap_or_default();

    MemoReport {
        company,
        research: Research {
            price_data: structured.price_data,
            financial_snapshot: structured.financial_snapshot,
            segment_breakdown: structured.segment_breakdown,
            financial_ratios: structured.financial_ratios,
            valuation_metrics: structured.valuation_metrics,

            price_context: narrative.price_context.unwrap_or_default(),
            financial_structure: narrative.financial_structure.unwrap_or_default(),
            business_snapshot: fit_arity(clean(narrative.business_snapshot), not_disclosed),
            why_this_could_work: fit_arity(
                narrative
                    .why_this_could_work
                    .into_iter()
                    .filter(|p| !p.claim.trim().is_empty())
                    .collect(),
                ThesisPoint::not_disclosed,
            ),
            key_risks: fit_arity(clean(narrative.key_risks), not_disclosed),
            valuation_sanity: narrative.valuation_sanity.unwrap_or_default(),
            judgment_support: JudgmentGrid {
                business_quality: judgment_or_default(judgment.business_quality),
                evidence_strength: judgment_or_default(judgment.evidence_strength),
                uncertainty_level: judgment_or_default(judgment.uncertainty_level),
            },
            validation_needs: fit_arity(clean(narrative.validation_needs), not_disclosed),
            narrative_context: clean(narrative.narrative_context),
        },
    }
}

fn clean(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn judgment_or_default(judgment: Option<Judgment>) -> Judgment {
    match judgment {
        Some(j) if !j.reasoning.trim().is_empty() => j,
        Some(j) => Judgment {
            level: j.level,
            ..Judgment::default()
        },
        None => Judgment::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::metric::NOT_DISCLOSED;
    use crate::domain::narrative::{EvidenceStrength, Level};
    use crate::structure::structure_financial_data;
    use serde_json::json;

    fn profile() -> CompanyProfile {
        serde_json::from_value(json!({
            "companyName": "Acme Corp",
            "symbol": "ACME",
            "exchangeShortName": "NASDAQ",
            "sector": "Industrials",
            "industry": "Machinery"
        }))
        .unwrap()
    }

    fn narrative(v: serde_json::Value) -> NarrativeAnalysis {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn fit_arity_pads_and_truncates() {
        let padded: [String; 4] = fit_arity(vec!["a".to_string()], not_disclosed);
        assert_eq!(padded, ["a", NOT_DISCLOSED, NOT_DISCLOSED, NOT_DISCLOSED].map(String::from));

        let truncated: [u8; 2] = fit_arity(vec![1, 2, 3, 4], || 0);
        assert_eq!(truncated, [1, 2]);

        let empty: [u8; 3] = fit_arity(Vec::new(), || 9);
        assert_eq!(empty, [9, 9, 9]);
    }

    #[test]
    fn identity_requires_core_fields() {
        let mut p = profile();
        p.sector = Some("  ".to_string());
        p.exchange_short_name = None;
        match company_identity(Some(&p)) {
            Err(MemoError::DataIncomplete(missing)) => assert_eq!(missing, "exchange, sector"),
            other => panic!("unexpected: {other:?}"),
        }
        assert!(matches!(
            company_identity(None),
            Err(MemoError::DataIncomplete(_))
        ));
    }

    #[test]
    fn identity_keeps_optional_industry() {
        let id = company_identity(Some(&profile())).unwrap();
        assert_eq!(id.name, "Acme Corp");
        assert_eq!(id.industry.as_deref(), Some("Machinery"));
    }

    #[test]
    fn merge_enforces_every_arity() {
        let n = narrative(json!({
            "businessSnapshot": ["1", "2", "3", "4", "5", "6"],
            "whyThisCOULDWork": [{"claim": "Only claim", "evidenceStrength": "Strong"}],
            "keyRisks": ["r1", "", "r2"],
            "validationNeeds": []
        }));
        let structured = structure_financial_data(&Default::default());
        let report = merge(company_identity(Some(&profile())).unwrap(), structured, n);
        let r = &report.research;

        assert_eq!(r.business_snapshot, ["1", "2", "3", "4"].map(String::from));
        assert_eq!(r.why_this_could_work[0].evidence_strength, EvidenceStrength::Strong);
        assert_eq!(r.why_this_could_work[1], ThesisPoint::not_disclosed());
        assert_eq!(r.why_this_could_work[2].evidence_strength, EvidenceStrength::Weak);
        assert_eq!(
            r.key_risks,
            ["r1", "r2", NOT_DISCLOSED, NOT_DISCLOSED, NOT_DISCLOSED].map(String::from)
        );
        assert_eq!(r.validation_needs, [NOT_DISCLOSED; 3].map(String::from));
        assert!(r.narrative_context.is_empty());
    }

    #[test]
    fn merge_defaults_missing_judgments() {
        let n = narrative(json!({
            "judgmentSupport": {"businessQuality": {"level": "High", "reasoning": ""}}
        }));
        let structured = structure_financial_data(&Default::default());
        let report = merge(company_identity(Some(&profile())).unwrap(), structured, n);
        let js = &report.research.judgment_support;
        assert_eq!(js.business_quality.level, Level::High);
        assert_eq!(js.business_quality.reasoning, NOT_DISCLOSED);
        assert_eq!(js.uncertainty_level, Judgment::default());
    }

    #[test]
    fn merge_preserves_structured_fields() {
        let bundle = serde_json::from_value(json!({
            "profile": {"pe": 15.0},
            "incomeStatement": [{"date": "2024-12-31", "revenue": 10.0, "netIncome": 1.0}]
        }))
        .unwrap();
        let structured = structure_financial_data(&bundle);
        let report = merge(
            company_identity(Some(&profile())).unwrap(),
            structured.clone(),
            NarrativeAnalysis::default(),
        );
        let r = &report.research;
        assert_eq!(r.financial_snapshot, structured.financial_snapshot);
        assert_eq!(r.financial_ratios, structured.financial_ratios);
        assert_eq!(r.valuation_metrics, structured.valuation_metrics);
        assert_eq!(r.price_data, structured.price_data);
    }
}
