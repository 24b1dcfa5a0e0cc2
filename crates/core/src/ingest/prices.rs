use crate::domain::metric::round2;
use crate::domain::raw::{PeriodRecord, PricePerformanceSummary};
use chrono::{Months, NaiveDate};

const TRADING_DAYS_PER_YEAR: f64 = 252.0;
/// How far past a window's cutoff the oldest close may sit and still count as covering it.
const COVERAGE_SLACK_DAYS: i64 = 14;

/// Reduces a daily close series (any order) to the 1/3/5-year summary.
///
/// Non-finite or non-positive closes are dropped before anything is computed.
pub fn summarize(closes: &[(NaiveDate, f64)]) -> PricePerformanceSummary {
    let mut series: Vec<(NaiveDate, f64)> = closes
        .iter()
        .copied()
        .filter(|(_, close)| close.is_finite() && *close > 0.0)
        .collect();
    series.sort_by_key(|(date, _)| *date);

    PricePerformanceSummary {
        one_year: period(&series, 1),
        three_year: period(&series, 3),
        five_year: period(&series, 5),
    }
}

fn period(series: &[(NaiveDate, f64)], years: u32) -> Option<PeriodRecord> {
    let (latest, _) = *series.last()?;
    let cutoff = latest.checked_sub_months(Months::new(12 * years))?;

    let start_idx = series.iter().position(|(date, _)| *date >= cutoff)?;
    let window = &series[start_idx..];
    if window.len() < 2 || (window[0].0 - cutoff).num_days() > COVERAGE_SLACK_DAYS {
        return None;
    }

    let prices: Vec<f64> = window.iter().map(|(_, close)| *close).collect();
    let start = prices[0];
    let end = prices[prices.len() - 1];

    Some(PeriodRecord {
        start_price: round2(start),
        end_price: round2(end),
        change: round2((end - start) / start * 100.0),
        max_drawdown: round2(max_drawdown(&prices)),
        volatility: round2(annualized_volatility(&prices)),
    })
}

/// Most negative peak-to-trough move in percent; never positive.
fn max_drawdown(prices: &[f64]) -> f64 {
    let mut peak = f64::MIN;
    let mut worst = 0.0_f64;
    for &p in prices {
        peak = peak.max(p);
        worst = worst.min((p - peak) / peak * 100.0);
    }
    worst
}

fn annualized_volatility(prices: &[f64]) -> f64 {
    let returns: Vec<f64> = prices.windows(2).map(|w| w[1] / w[0] - 1.0).collect();
    if returns.len() < 2 {
        return 0.0;
    }
    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
    variance.sqrt() * TRADING_DAYS_PER_YEAR.sqrt() * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn one_year_window_from_newest_first_series() {
        let closes = vec![
            (d(2026, 1, 1), 120.0),
            (d(2025, 6, 1), 80.0),
            (d(2025, 1, 1), 100.0),
            (d(2024, 6, 1), 90.0),
        ];
        let summary = summarize(&closes);
        let one = summary.one_year.unwrap();
        assert_eq!(one.start_price, 100.0);
        assert_eq!(one.end_price, 120.0);
        assert_eq!(one.change, 20.0);
        assert_eq!(one.max_drawdown, -20.0);
        // returns -0.2 and +0.5: sample sd = sqrt(0.245)
        let expected = round2(0.245_f64.sqrt() * 252_f64.sqrt() * 100.0);
        assert_eq!(one.volatility, expected);
        assert!(summary.three_year.is_none());
        assert!(summary.five_year.is_none());
    }

    #[test]
    fn coverage_allows_small_gap_after_cutoff() {
        let closes = vec![(d(2025, 1, 10), 50.0), (d(2026, 1, 1), 55.0)];
        let one = summarize(&closes).one_year.unwrap();
        assert_eq!(one.start_price, 50.0);
        assert_eq!(one.change, 10.0);
        assert_eq!(one.volatility, 0.0);
        assert_eq!(one.max_drawdown, 0.0);

        let late = vec![(d(2025, 2, 1), 50.0), (d(2026, 1, 1), 55.0)];
        assert!(summarize(&late).one_year.is_none());
    }

    #[test]
    fn degenerate_series_yield_no_periods() {
        assert!(summarize(&[]).is_empty());
        assert!(summarize(&[(d(2026, 1, 1), 10.0)]).is_empty());
        let bad = vec![(d(2025, 1, 1), 0.0), (d(2026, 1, 1), f64::NAN)];
        assert!(summarize(&bad).is_empty());
    }
}
