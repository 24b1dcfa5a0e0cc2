//! Provider bundle → canonical numeric schema.
//!
//! Total by construction: absent or zero inputs become sentinels, never errors.

use crate::domain::metric::{round2, Metric};
use crate::domain::raw::{
    CashFlowRecord, CompanyProfile, IncomeStatement, KeyMetricRecord, RatioRecord,
    RawFinancialBundle,
};
use crate::domain::structured::{
    RatioYear, SegmentBreakdown, SnapshotYear, StructuredFinancialData, ValuationMetrics,
    YearSeries,
};

/// Provider lists are newest-first; only this many years are reported.
pub const MAX_YEARS: usize = 5;

pub fn structure_financial_data(bundle: &RawFinancialBundle) -> StructuredFinancialData {
    StructuredFinancialData {
        price_data: bundle.prices.clone(),
        financial_snapshot: financial_snapshot(&bundle.income_statement),
        segment_breakdown: SegmentBreakdown::default(),
        financial_ratios: financial_ratios(&bundle.ratios, &bundle.cash_flow),
        valuation_metrics: valuation_metrics(&bundle.key_metrics, bundle.profile.as_ref()),
    }
}

fn financial_snapshot(statements: &[IncomeStatement]) -> YearSeries<SnapshotYear> {
    let recent = &statements[..statements.len().min(MAX_YEARS)];
    YearSeries {
        years: recent.iter().map(|s| s.date.clone()).collect(),
        data: recent
            .iter()
            .map(|s| SnapshotYear {
                revenue: s.revenue,
                ebitda: s.ebitda,
                net_income: s.net_income,
                eps: s.eps,
                operating_margin: margin(s.operating_income, s.revenue),
                net_margin: margin(s.net_income, s.revenue),
            })
            .collect(),
    }
}

/// `part / revenue * 100`, or nothing when revenue is zero or either side is missing.
fn margin(part: Option<f64>, revenue: Option<f64>) -> Option<f64> {
    let (part, revenue) = (part?, revenue?);
    if revenue == 0.0 {
        return None;
    }
    Some(round2(part / revenue * 100.0)).filter(|m| m.is_finite())
}

// Cash-flow years are paired with ratio years by position, not by date. Misaligned provider
// arrays pair the wrong years.
// TODO: join on the fiscal date once provider date alignment has been checked against real data.
fn financial_ratios(ratios: &[RatioRecord], cash_flows: &[CashFlowRecord]) -> YearSeries<RatioYear> {
    let recent = &ratios[..ratios.len().min(MAX_YEARS)];
    YearSeries {
        years: recent.iter().map(|r| r.date.clone()).collect(),
        data: recent
            .iter()
            .enumerate()
            .map(|(i, r)| RatioYear {
                roe: percent(r.return_on_equity),
                roa: percent(r.return_on_assets),
                roce: Metric::NotDisclosed,
                debt_to_equity: rounded(r.debt_equity_ratio),
                interest_coverage: rounded(r.interest_coverage),
                current_ratio: rounded(r.current_ratio),
                free_cash_flow: Metric::from_option(
                    cash_flows.get(i).and_then(|cf| cf.free_cash_flow),
                ),
            })
            .collect(),
    }
}

fn percent(fraction: Option<f64>) -> Metric {
    Metric::from_option(fraction.map(|f| round2(f * 100.0)))
}

fn rounded(value: Option<f64>) -> Metric {
    Metric::from_option(value.map(round2))
}

fn valuation_metrics(metrics: &[KeyMetricRecord], profile: Option<&CompanyProfile>) -> ValuationMetrics {
    let profile_pe = profile.and_then(|p| p.pe);
    let latest_pe = metrics.first().and_then(|m| m.pe_ratio);

    let positive: Vec<f64> = metrics
        .iter()
        .filter_map(|m| m.pe_ratio)
        .filter(|pe| *pe > 0.0)
        .collect();
    let historical_avg_pe = if positive.is_empty() {
        Metric::NotDisclosed
    } else {
        rounded(Some(positive.iter().sum::<f64>() / positive.len() as f64))
    };

    ValuationMetrics {
        current_pe: rounded(profile_pe.or(latest_pe)),
        historical_avg_pe,
        sector_avg_pe: Metric::NotDisclosed,
    }
}
