use chrono::NaiveDate;
use memo_core::chart::{parse_segments, ChartFrame, ChartPeriod, PriceChart, NO_SEGMENTS};
use memo_core::domain::report::MemoReport;
use memo_core::render::format::format_price;
use rand::Rng;
use std::fmt::Write;

/// Terminal (or JSON) view of one chart period plus the narrative's segment split.
pub fn chart_output<R: Rng + ?Sized>(
    report: &MemoReport,
    period: ChartPeriod,
    today: NaiveDate,
    rng: &mut R,
    json: bool,
) -> anyhow::Result<String> {
    let mut chart = PriceChart::new(report.research.price_data.clone());
    let frame = chart.switch_period(period, today, rng);
    let segments = parse_segments(&report.research.financial_structure.segments);

    if json {
        let value = serde_json::json!({
            "symbol": report.company.symbol,
            "frame": frame,
            "segments": segments
                .iter()
                .map(|(label, pct)| serde_json::json!({"label": label, "percent": pct}))
                .collect::<Vec<_>>(),
        });
        return Ok(serde_json::to_string_pretty(&value)?);
    }

    let mut out = String::new();
    let _ = writeln!(out, "{} ({}) {}", report.company.name, report.company.symbol, period.label());
    match &frame {
        ChartFrame::NoPriceData { message } | ChartFrame::NoPeriodData { message, .. } => {
            let _ = writeln!(out, "{message}");
        }
        ChartFrame::Series { stats, series, .. } => {
            let line = stats
                .iter()
                .map(|s| format!("{}: {}", s.label, s.value))
                .collect::<Vec<_>>()
                .join(" | ");
            let _ = writeln!(out, "{line}");
            for point in &series.points {
                let _ = writeln!(out, "  {:<8}{:>12}", point.label, format_price(point.price));
            }
        }
    }

    out.push('\n');
    if segments.is_empty() {
        let _ = writeln!(out, "{NO_SEGMENTS}");
    } else {
        for (label, pct) in &segments {
            let _ = writeln!(out, "  {label}: {pct:.1}%");
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use memo_core::domain::raw::{PeriodRecord, PricePerformanceSummary};
    use memo_core::domain::report::{CompanyIdentity, Research};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn report(prices: Option<PricePerformanceSummary>, segments: Vec<String>) -> MemoReport {
        let mut research = Research {
            price_data: prices,
            ..Default::default()
        };
        research.financial_structure.segments = segments;
        MemoReport {
            company: CompanyIdentity {
                name: "Acme Corp".to_string(),
                symbol: "ACME".to_string(),
                exchange: "NASDAQ".to_string(),
                sector: "Industrials".to_string(),
                industry: None,
            },
            research,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 14).unwrap()
    }

    #[test]
    fn text_output_lists_points_and_segments() {
        let prices = PricePerformanceSummary {
            one_year: Some(PeriodRecord {
                start_price: 100.0,
                end_price: 150.0,
                change: 50.0,
                max_drawdown: -8.0,
                volatility: 20.0,
            }),
            ..Default::default()
        };
        let r = report(Some(prices), vec!["Cloud: 60%".to_string(), "Devices: 40%".to_string()]);
        let mut rng = StdRng::seed_from_u64(11);
        let out = chart_output(&r, ChartPeriod::OneYear, today(), &mut rng, false).unwrap();

        assert!(out.starts_with("Acme Corp (ACME) 1Y\n"));
        assert!(out.contains("Start: $100.00 | Current: $150.00 | Change: ↑ 50.00%"));
        assert_eq!(out.matches("\n  ").count(), 12 + 2);
        assert!(out.contains("  Cloud: 60.0%"));
    }

    #[test]
    fn missing_data_prints_placeholders() {
        let r = report(None, Vec::new());
        let mut rng = StdRng::seed_from_u64(1);
        let out = chart_output(&r, ChartPeriod::FiveYear, today(), &mut rng, false).unwrap();
        assert!(out.contains("Historical price data not available"));
        assert!(out.contains(NO_SEGMENTS));
    }

    #[test]
    fn json_output_tags_frame_kind() {
        let r = report(Some(PricePerformanceSummary::default()), Vec::new());
        let mut rng = StdRng::seed_from_u64(1);
        let out = chart_output(&r, ChartPeriod::ThreeYear, today(), &mut rng, true).unwrap();
        let v: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(v["frame"]["kind"], "no_price_data");
        assert_eq!(v["symbol"], "ACME");
    }
}
