//! Plot-ready price paths rebuilt from period summary statistics.
//!
//! The provider only gives start/end/volatility per window, so the path between the endpoints
//! is a noisy linear walk. Endpoints are exact; everything in between is fresh randomness on each
//! call.

use crate::domain::raw::{PeriodRecord, PricePerformanceSummary};
use crate::render::format::{format_percent, format_price, ChangeDirection};
use chrono::{Months, NaiveDate};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Prices never drop below this floor.
pub const MIN_PRICE: f64 = 0.01;
const NOISE_SCALE: f64 = 0.5;

pub const NO_PRICE_DATA: &str = "Historical price data not available";
pub const NO_PERIOD_DATA: &str = "Data not available for this period";
pub const NO_SEGMENTS: &str = "Segment breakdown not disclosed";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ChartPeriod {
    #[default]
    #[serde(rename = "1Y")]
    OneYear,
    #[serde(rename = "3Y")]
    ThreeYear,
    #[serde(rename = "5Y")]
    FiveYear,
}

impl ChartPeriod {
    pub const ALL: [ChartPeriod; 3] = [Self::OneYear, Self::ThreeYear, Self::FiveYear];

    /// One point per month.
    pub fn points(self) -> usize {
        match self {
            Self::OneYear => 12,
            Self::ThreeYear => 36,
            Self::FiveYear => 60,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::OneYear => "1Y",
            Self::ThreeYear => "3Y",
            Self::FiveYear => "5Y",
        }
    }

    pub fn record(self, summary: &PricePerformanceSummary) -> Option<&PeriodRecord> {
        match self {
            Self::OneYear => summary.one_year.as_ref(),
            Self::ThreeYear => summary.three_year.as_ref(),
            Self::FiveYear => summary.five_year.as_ref(),
        }
    }
}

impl std::str::FromStr for ChartPeriod {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "1Y" => Ok(Self::OneYear),
            "3Y" => Ok(Self::ThreeYear),
            "5Y" => Ok(Self::FiveYear),
            other => anyhow::bail!("unknown chart period {other:?} (expected 1Y, 3Y or 5Y)"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricePoint {
    pub label: String,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyntheticPriceSeries {
    pub period: ChartPeriod,
    pub points: Vec<PricePoint>,
}

impl SyntheticPriceSeries {
    pub fn prices(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.price)
    }
}

/// Builds the monthly series for `period`, ending at `today`'s month.
///
/// Returns `None` when the summary has no record for the period; a path is never invented
/// from nothing.
pub fn synthesize_series<R: Rng + ?Sized>(
    summary: &PricePerformanceSummary,
    period: ChartPeriod,
    today: NaiveDate,
    rng: &mut R,
) -> Option<SyntheticPriceSeries> {
    let record = period.record(summary)?;
    Some(synthesize_from_record(record, period, today, rng))
}

pub fn synthesize_from_record<R: Rng + ?Sized>(
    record: &PeriodRecord,
    period: ChartPeriod,
    today: NaiveDate,
    rng: &mut R,
) -> SyntheticPriceSeries {
    let n = period.points();
    let start = record.start_price;
    let end = record.end_price;
    let amplitude = record.volatility / 100.0 * start * NOISE_SCALE;

    let points = (0..n)
        .map(|i| {
            let price = if i == 0 {
                start
            } else if i == n - 1 {
                end
            } else {
                let progress = i as f64 / (n - 1) as f64;
                let base = start + (end - start) * progress;
                base + (rng.gen::<f64>() - 0.5) * amplitude
            };
            PricePoint {
                label: month_label(today, (n - 1 - i) as u32),
                price: price.max(MIN_PRICE),
            }
        })
        .collect();

    SyntheticPriceSeries { period, points }
}

/// "Oct 26" style label for the month `months_ago` before `today`.
fn month_label(today: NaiveDate, months_ago: u32) -> String {
    today
        .checked_sub_months(Months::new(months_ago))
        .unwrap_or(today)
        .format("%b %y")
        .to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatItem {
    pub label: &'static str,
    pub value: String,
    pub class: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartFrame {
    /// The summary has no periods at all.
    NoPriceData { message: &'static str },
    /// The selected period has no record; any previous series is gone.
    NoPeriodData {
        period: ChartPeriod,
        message: &'static str,
    },
    Series {
        stats: Vec<StatItem>,
        direction: &'static str,
        series: SyntheticPriceSeries,
    },
}

/// Interactive price chart state: one summary, one selected period, at most one live series.
#[derive(Debug, Clone)]
pub struct PriceChart {
    summary: Option<PricePerformanceSummary>,
    period: ChartPeriod,
    current: Option<SyntheticPriceSeries>,
}

impl PriceChart {
    pub fn new(summary: Option<PricePerformanceSummary>) -> Self {
        Self {
            summary,
            period: ChartPeriod::default(),
            current: None,
        }
    }

    pub fn period(&self) -> ChartPeriod {
        self.period
    }

    pub fn current(&self) -> Option<&SyntheticPriceSeries> {
        self.current.as_ref()
    }

    /// Selects `period` and redraws. The previous series is dropped before the new one exists.
    pub fn switch_period<R: Rng + ?Sized>(
        &mut self,
        period: ChartPeriod,
        today: NaiveDate,
        rng: &mut R,
    ) -> ChartFrame {
        self.period = period;
        self.current = None;

        let Some(summary) = self.summary.as_ref().filter(|s| !s.is_empty()) else {
            return ChartFrame::NoPriceData {
                message: NO_PRICE_DATA,
            };
        };
        let Some(record) = period.record(summary).copied() else {
            return ChartFrame::NoPeriodData {
                period,
                message: NO_PERIOD_DATA,
            };
        };

        let series = synthesize_from_record(&record, period, today, rng);
        self.current = Some(series.clone());
        let direction = ChangeDirection::classify(record.change);

        ChartFrame::Series {
            stats: vec![
                StatItem {
                    label: "Start",
                    value: format_price(record.start_price),
                    class: None,
                },
                StatItem {
                    label: "Current",
                    value: format_price(record.end_price),
                    class: None,
                },
                StatItem {
                    label: "Change",
                    value: format!("{} {}", direction.glyph(), format_percent(Some(record.change))),
                    class: Some(direction.class_name()),
                },
                StatItem {
                    label: "Max Drawdown",
                    value: format_percent(Some(record.max_drawdown)),
                    class: Some("negative"),
                },
                StatItem {
                    label: "Volatility",
                    value: format_percent(Some(record.volatility)),
                    class: None,
                },
            ],
            direction: direction.class_name(),
            series,
        }
    }
}

/// Parses narrative segment lines shaped like `"Cloud: 42%"`. Malformed lines are skipped.
pub fn parse_segments(segments: &[String]) -> Vec<(String, f64)> {
    segments
        .iter()
        .filter_map(|segment| {
            let mut parts = segment.split(':');
            let (label, value, rest) = (parts.next()?, parts.next()?, parts.next());
            if rest.is_some() {
                return None;
            }
            let value = value.trim().trim_end_matches('%').trim().parse::<f64>().ok()?;
            let label = label.trim();
            (!label.is_empty() && value.is_finite()).then(|| (label.to_string(), value))
        })
        .collect()
}
