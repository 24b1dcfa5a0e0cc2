//! Deterministic layout of a [`MemoReport`] into headed sections.
//!
//! Every generator is total: absent or empty inputs become a single placeholder paragraph.
//! The tree is serialized by [`html`] and [`text`].

pub mod format;
pub mod html;
pub mod text;

use crate::domain::narrative::{EvidenceStrength, Judgment, Level};
use crate::domain::raw::{PeriodRecord, PricePerformanceSummary};
use crate::domain::report::{CompanyIdentity, MemoReport, Research};
use crate::domain::structured::{RatioYear, SnapshotYear, YearSeries};
use chrono::{Datelike, NaiveDate};
use format::{
    format_large_currency, format_large_metric, format_number, format_percent, format_price,
    format_ratio, ChangeDirection,
};

pub const REPORT_SUBTITLE: &str = "StockMemo — Analytical Research Report";
pub const DISCLAIMER: &str = "This report is an analytical research aid generated using publicly available information. It does not constitute investment advice.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionId {
    Title,
    PriceData,
    FinancialSnapshot,
    SegmentBreakdown,
    FinancialRatios,
    BusinessSnapshot,
    WhyThisCouldWork,
    KeyRisks,
    ValuationMetrics,
    JudgmentSupport,
    ValidationNeeds,
    NarrativeContext,
}

impl SectionId {
    pub const CONTENT: [SectionId; 11] = [
        SectionId::PriceData,
        SectionId::FinancialSnapshot,
        SectionId::SegmentBreakdown,
        SectionId::FinancialRatios,
        SectionId::BusinessSnapshot,
        SectionId::WhyThisCouldWork,
        SectionId::KeyRisks,
        SectionId::ValuationMetrics,
        SectionId::JudgmentSupport,
        SectionId::ValidationNeeds,
        SectionId::NarrativeContext,
    ];

    pub fn heading(self) -> &'static str {
        match self {
            Self::Title => "",
            Self::PriceData => "SECTION 1: PRICE & MARKET DATA",
            Self::FinancialSnapshot => "SECTION 2: FINANCIAL SNAPSHOT (5 YEARS)",
            Self::SegmentBreakdown => "SECTION 3: SEGMENT & REVENUE BREAKDOWN",
            Self::FinancialRatios => "SECTION 4: KEY FINANCIAL RATIOS",
            Self::BusinessSnapshot => "SECTION 5: BUSINESS SNAPSHOT",
            Self::WhyThisCouldWork => "SECTION 6: WHY THIS COULD WORK (MANAGEMENT-SUPPORTED)",
            Self::KeyRisks => "SECTION 7: KEY RISKS (COMPANY-DISCLOSED)",
            Self::ValuationMetrics => "SECTION 8: VALUATION CONTEXT",
            Self::JudgmentSupport => "SECTION 9: JUDGMENT SUPPORT (NON-ADVISORY)",
            Self::ValidationNeeds => "SECTION 10: WHAT NEEDS VALIDATION NEXT",
            Self::NarrativeContext => "SECTION 11: NEWS & RECENT EVENTS",
        }
    }

    pub fn tooltip(self) -> &'static str {
        match self {
            Self::Title => "",
            Self::PriceData => "Historical price performance showing start price, end price, percentage change, maximum drawdown, and volatility for different time periods.",
            Self::FinancialSnapshot => "Key financial metrics from income statements including Revenue, EBITDA, Net Profit, EPS (Earnings Per Share), and margin percentages over the past 5 years.",
            Self::SegmentBreakdown => "Revenue breakdown by business segment or product line, showing how the company generates income across different areas.",
            Self::FinancialRatios => "Key profitability and efficiency ratios including ROE (Return on Equity), ROA (Return on Assets), ROCE (Return on Capital Employed), and Debt-to-Equity ratio.",
            Self::BusinessSnapshot => "Quick overview of the company's business model, products/services, geographic presence, and market position.",
            Self::WhyThisCouldWork => "Management-stated claims and strategies that could drive future growth. Evidence strength indicates reliability of each claim.",
            Self::KeyRisks => "Company-disclosed risk factors that could negatively impact business performance or stock price.",
            Self::ValuationMetrics => "Valuation ratios comparing the stock price to fundamental metrics like earnings (P/E), against the company's own history and its sector.",
            Self::JudgmentSupport => "Non-advisory assessment of business quality, evidence strength, and uncertainty level to support investment analysis.",
            Self::ValidationNeeds => "Key assumptions and claims that require further verification before making investment decisions.",
            Self::NarrativeContext => "Recent news, events, and developments that may affect the company's outlook.",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedReport {
    pub sections: Vec<Section>,
    pub disclaimer: &'static str,
}

impl RenderedReport {
    pub fn section(&self, id: SectionId) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub id: SectionId,
    pub heading: String,
    pub tooltip: &'static str,
    pub blocks: Vec<Block>,
}

impl Section {
    fn new(id: SectionId, blocks: Vec<Block>) -> Self {
        Self {
            id,
            heading: id.heading().to_string(),
            tooltip: id.tooltip(),
            blocks,
        }
    }

    fn placeholder(id: SectionId, text: &str) -> Self {
        Self::new(id, vec![Block::Paragraph(text.to_string())])
    }

    pub fn table(&self) -> Option<&Table> {
        self.blocks.iter().find_map(|b| match b {
            Block::Table(t) => Some(t),
            _ => None,
        })
    }

    pub fn list(&self) -> Option<&[ListItem]> {
        self.blocks.iter().find_map(|b| match b {
            Block::List(items) => Some(items.as_slice()),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Paragraph(String),
    Field { label: &'static str, value: String },
    Table(Table),
    List(Vec<ListItem>),
    Judgments(Vec<JudgmentCell>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub columns: Vec<&'static str>,
    pub rows: Vec<Vec<Cell>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub text: String,
    pub class: Option<&'static str>,
}

impl Cell {
    fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            class: None,
        }
    }

    fn styled(text: impl Into<String>, class: &'static str) -> Self {
        Self {
            text: text.into(),
            class: Some(class),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListItem {
    pub text: String,
    pub evidence: Option<EvidenceStrength>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JudgmentCell {
    pub label: &'static str,
    pub level: Level,
    pub reasoning: String,
}

pub fn render(report: &MemoReport) -> RenderedReport {
    let r = &report.research;
    RenderedReport {
        sections: vec![
            title(&report.company),
            price_data(r),
            financial_snapshot(&r.financial_snapshot),
            segment_breakdown(r),
            financial_ratios(&r.financial_ratios),
            string_list(SectionId::BusinessSnapshot, &r.business_snapshot),
            why_this_could_work(r),
            string_list(SectionId::KeyRisks, &r.key_risks),
            valuation_context(r),
            judgment_support(r),
            string_list(SectionId::ValidationNeeds, &r.validation_needs),
            narrative_context(&r.narrative_context),
        ],
        disclaimer: DISCLAIMER,
    }
}

fn title(company: &CompanyIdentity) -> Section {
    Section {
        id: SectionId::Title,
        heading: format!("{} | {} | {}", company.name, company.exchange, company.sector),
        tooltip: SectionId::Title.tooltip(),
        blocks: vec![Block::Paragraph(REPORT_SUBTITLE.to_string())],
    }
}

fn price_data(r: &Research) -> Section {
    let id = SectionId::PriceData;
    let Some(prices) = r.price_data.as_ref().filter(|p| !p.is_empty()) else {
        return Section::placeholder(id, "Price data not available");
    };

    let rows = period_rows(prices)
        .map(|(label, record)| {
            let direction = ChangeDirection::classify(record.change);
            vec![
                Cell::plain(label),
                Cell::plain(format_price(record.start_price)),
                Cell::plain(format_price(record.end_price)),
                Cell::styled(format_percent(Some(record.change)), direction.class_name()),
                Cell::styled(format_percent(Some(record.max_drawdown)), "negative"),
                Cell::plain(format_percent(Some(record.volatility))),
            ]
        })
        .collect();

    let mut blocks = vec![Block::Table(Table {
        columns: vec![
            "Period",
            "Start Price",
            "End Price",
            "Change %",
            "Max Drawdown %",
            "Volatility %",
        ],
        rows,
    })];
    push_field(&mut blocks, "Trend", r.price_context.trend.as_deref());
    push_field(&mut blocks, "Volatility", r.price_context.volatility.as_deref());
    Section::new(id, blocks)
}

/// Present periods only, in 1/3/5-year order.
fn period_rows(prices: &PricePerformanceSummary) -> impl Iterator<Item = (&'static str, &PeriodRecord)> {
    [
        ("1 Year", prices.one_year.as_ref()),
        ("3 Year", prices.three_year.as_ref()),
        ("5 Year", prices.five_year.as_ref()),
    ]
    .into_iter()
    .filter_map(|(label, record)| record.map(|r| (label, r)))
}

fn financial_snapshot(snapshot: &YearSeries<SnapshotYear>) -> Section {
    let id = SectionId::FinancialSnapshot;
    if snapshot.is_empty() {
        return Section::placeholder(id, "Financial data not available");
    }

    let rows = snapshot
        .rows()
        .enumerate()
        .map(|(i, (date, year))| {
            vec![
                Cell::plain(year_label(date, i)),
                Cell::plain(format_large_currency(year.revenue)),
                Cell::plain(format_large_currency(year.ebitda)),
                Cell::plain(format_large_currency(year.net_income)),
                Cell::plain(format_number(year.eps)),
                Cell::plain(format_percent(year.operating_margin)),
                Cell::plain(format_percent(year.net_margin)),
            ]
        })
        .collect();

    Section::new(
        id,
        vec![Block::Table(Table {
            columns: vec![
                "Year",
                "Revenue",
                "EBITDA",
                "Net Profit",
                "EPS",
                "Op Margin %",
                "Net Margin %",
            ],
            rows,
        })],
    )
}

fn segment_breakdown(r: &Research) -> Section {
    let id = SectionId::SegmentBreakdown;
    let segments = &r.segment_breakdown;
    let mut blocks = Vec::new();

    if !segments.available {
        let message = segments
            .message
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or("Segment data not available");
        blocks.push(Block::Paragraph(message.to_string()));
    } else if r.financial_structure.segments.is_empty() {
        blocks.push(Block::Paragraph(
            "Segment data will be displayed here once available".to_string(),
        ));
    } else {
        blocks.push(Block::List(
            r.financial_structure
                .segments
                .iter()
                .map(|s| ListItem {
                    text: s.clone(),
                    evidence: None,
                })
                .collect(),
        ));
    }

    push_field(
        &mut blocks,
        "Financial structure",
        r.financial_structure.description.as_deref(),
    );
    Section::new(id, blocks)
}

fn financial_ratios(ratios: &YearSeries<RatioYear>) -> Section {
    let id = SectionId::FinancialRatios;
    if ratios.is_empty() {
        return Section::placeholder(id, "Financial ratios not available");
    }

    let rows = ratios
        .rows()
        .enumerate()
        .map(|(i, (date, year))| {
            vec![
                Cell::plain(year_label(date, i)),
                Cell::plain(format_ratio(year.roe)),
                Cell::plain(format_ratio(year.roa)),
                Cell::plain(format_ratio(year.roce)),
                Cell::plain(format_ratio(year.debt_to_equity)),
                Cell::plain(format_ratio(year.interest_coverage)),
                Cell::plain(format_ratio(year.current_ratio)),
                Cell::plain(format_large_metric(year.free_cash_flow)),
            ]
        })
        .collect();

    Section::new(
        id,
        vec![Block::Table(Table {
            columns: vec![
                "Year",
                "ROE %",
                "ROA %",
                "ROCE %",
                "Debt/Equity",
                "Interest Coverage",
                "Current Ratio",
                "Free Cash Flow",
            ],
            rows,
        })],
    )
}

fn string_list(id: SectionId, items: &[String]) -> Section {
    Section::new(
        id,
        vec![Block::List(
            items
                .iter()
                .map(|text| ListItem {
                    text: text.clone(),
                    evidence: None,
                })
                .collect(),
        )],
    )
}

fn why_this_could_work(r: &Research) -> Section {
    Section::new(
        SectionId::WhyThisCouldWork,
        vec![Block::List(
            r.why_this_could_work
                .iter()
                .map(|point| ListItem {
                    text: point.claim.clone(),
                    evidence: Some(point.evidence_strength),
                })
                .collect(),
        )],
    )
}

fn valuation_context(r: &Research) -> Section {
    let metrics = &r.valuation_metrics;
    let mut blocks = Vec::new();

    if metrics.any_disclosed() {
        let row = |label: &str, value| vec![Cell::plain(label), Cell::plain(format_ratio(value))];
        blocks.push(Block::Table(Table {
            columns: vec!["Metric", "Value"],
            rows: vec![
                row("Current P/E", metrics.current_pe),
                row("Historical Avg P/E", metrics.historical_avg_pe),
                row("Sector Avg P/E", metrics.sector_avg_pe),
            ],
        }));
    } else {
        blocks.push(Block::Paragraph("Valuation metrics not available".to_string()));
    }

    let sanity = &r.valuation_sanity;
    if sanity.assessment.is_some() || sanity.reasoning.is_some() {
        blocks.push(Block::Field {
            label: "Assessment",
            value: non_blank(sanity.assessment.as_deref())
                .unwrap_or(crate::domain::metric::NOT_DISCLOSED)
                .to_string(),
        });
        if let Some(reasoning) = non_blank(sanity.reasoning.as_deref()) {
            blocks.push(Block::Paragraph(reasoning.to_string()));
        }
    }

    Section::new(SectionId::ValuationMetrics, blocks)
}

fn judgment_support(r: &Research) -> Section {
    let js = &r.judgment_support;
    let cell = |label, j: &Judgment| JudgmentCell {
        label,
        level: j.level,
        reasoning: j.reasoning.clone(),
    };
    Section::new(
        SectionId::JudgmentSupport,
        vec![Block::Judgments(vec![
            cell("Business Quality", &js.business_quality),
            cell("Evidence Strength", &js.evidence_strength),
            cell("Uncertainty Level", &js.uncertainty_level),
        ])],
    )
}

fn narrative_context(items: &[String]) -> Section {
    let id = SectionId::NarrativeContext;
    if items.is_empty() {
        return Section::placeholder(id, "No recent news available");
    }
    string_list(id, items)
}

fn push_field(blocks: &mut Vec<Block>, label: &'static str, value: Option<&str>) {
    if let Some(value) = non_blank(value) {
        blocks.push(Block::Field {
            label,
            value: value.to_string(),
        });
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

/// Calendar year of an ISO date (or datetime) string; positional fallback otherwise.
pub fn year_label(date: Option<&str>, index: usize) -> String {
    date.and_then(|d| {
        let day = d.trim();
        let day = day.get(..10).unwrap_or(day);
        NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
    })
    .map(|d| d.year().to_string())
    .unwrap_or_else(|| format!("Year {}", index + 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::metric::NOT_DISCLOSED;
    use crate::domain::narrative::NarrativeAnalysis;
    use crate::merge::{company_identity, merge};
    use crate::structure::structure_financial_data;
    use serde_json::json;

    fn report(bundle: serde_json::Value, narrative: serde_json::Value) -> MemoReport {
        let bundle = serde_json::from_value(bundle).unwrap();
        let narrative: NarrativeAnalysis = serde_json::from_value(narrative).unwrap();
        let company = company_identity(Some(&serde_json::from_value(json!({
            "companyName": "Acme Corp",
            "symbol": "ACME",
            "exchangeShortName": "NASDAQ",
            "sector": "Industrials"
        })).unwrap()))
        .unwrap();
        merge(company, structure_financial_data(&bundle), narrative)
    }

    fn only_paragraph(section: &Section) -> &str {
        match section.blocks.as_slice() {
            [Block::Paragraph(p)] => p,
            other => panic!("expected a single paragraph, got {other:?}"),
        }
    }

    #[test]
    fn emits_title_eleven_sections_and_disclaimer() {
        let rendered = render(&report(json!({}), json!({})));
        assert_eq!(rendered.sections.len(), 12);
        assert_eq!(rendered.sections[0].heading, "Acme Corp | NASDAQ | Industrials");
        let ids: Vec<_> = rendered.sections[1..].iter().map(|s| s.id).collect();
        assert_eq!(ids, SectionId::CONTENT);
        assert_eq!(rendered.disclaimer, DISCLAIMER);
        for section in &rendered.sections[1..] {
            assert!(!section.tooltip.is_empty());
        }
    }

    #[test]
    fn sparse_input_renders_placeholders() {
        let rendered = render(&report(json!({}), json!({})));
        let p = |id| only_paragraph(rendered.section(id).unwrap()).to_string();
        assert_eq!(p(SectionId::PriceData), "Price data not available");
        assert_eq!(p(SectionId::FinancialSnapshot), "Financial data not available");
        assert_eq!(p(SectionId::FinancialRatios), "Financial ratios not available");
        assert_eq!(p(SectionId::ValuationMetrics), "Valuation metrics not available");
        assert_eq!(p(SectionId::NarrativeContext), "No recent news available");
        assert_eq!(
            p(SectionId::SegmentBreakdown),
            "Segment data not available from FMP API"
        );
    }

    #[test]
    fn list_sections_have_contracted_counts() {
        let many: Vec<String> = (0..9).map(|i| format!("item {i}")).collect();
        let rendered = render(&report(
            json!({}),
            json!({
                "businessSnapshot": many,
                "whyThisCouldWork": [{"claim": "c", "evidenceStrength": "Moderate"}],
                "keyRisks": ["only"],
                "validationNeeds": many
            }),
        ));
        let len = |id| rendered.section(id).unwrap().list().unwrap().len();
        assert_eq!(len(SectionId::BusinessSnapshot), 4);
        assert_eq!(len(SectionId::WhyThisCouldWork), 3);
        assert_eq!(len(SectionId::KeyRisks), 5);
        assert_eq!(len(SectionId::ValidationNeeds), 3);

        let theses = rendered.section(SectionId::WhyThisCouldWork).unwrap().list().unwrap();
        assert_eq!(theses[0].evidence, Some(EvidenceStrength::Moderate));
        assert_eq!(theses[2].text, NOT_DISCLOSED);
        assert_eq!(theses[2].evidence, Some(EvidenceStrength::Weak));
    }

    #[test]
    fn three_year_only_price_data_renders_one_row() {
        let rendered = render(&report(
            json!({"prices": {"threeYear": {
                "startPrice": 80, "endPrice": 120, "change": 50, "maxDrawdown": -20.5, "volatility": 30
            }}}),
            json!({}),
        ));
        let table = rendered.section(SectionId::PriceData).unwrap().table().unwrap();
        assert_eq!(table.rows.len(), 1);
        let row = &table.rows[0];
        assert_eq!(row[0].text, "3 Year");
        assert_eq!(row[1].text, "$80.00");
        assert_eq!(row[3].text, "50.00%");
        assert_eq!(row[3].class, Some("positive"));
        assert_eq!(row[4].text, "-20.50%");
        assert_eq!(row[4].class, Some("negative"));
    }

    #[test]
    fn snapshot_rows_label_years_and_degrade_margins() {
        let rendered = render(&report(
            json!({"incomeStatement": [
                {"date": "2024-09-28", "revenue": 3.9e11, "ebitda": 1.3e11, "netIncome": 9.4e10, "operatingIncome": 1.2e11, "eps": 6.08},
                {"date": "not a date", "revenue": 0, "netIncome": 5}
            ]}),
            json!({}),
        ));
        let table = rendered.section(SectionId::FinancialSnapshot).unwrap().table().unwrap();
        assert_eq!(table.rows[0][0].text, "2024");
        assert_eq!(table.rows[0][1].text, "$390.00B");
        assert_eq!(table.rows[0][4].text, "6.08");
        assert_eq!(table.rows[1][0].text, "Year 2");
        assert_eq!(table.rows[1][5].text, "N/A");
        assert_eq!(table.rows[1][6].text, "N/A");
        assert_eq!(table.rows[1][4].text, "N/A");
    }

    #[test]
    fn ratio_rows_use_sentinels() {
        let rendered = render(&report(
            json!({"ratios": [{"date": "2024-12-31", "returnOnEquity": 0.25}]}),
            json!({}),
        ));
        let table = rendered.section(SectionId::FinancialRatios).unwrap().table().unwrap();
        let row: Vec<&str> = table.rows[0].iter().map(|c| c.text.as_str()).collect();
        assert_eq!(row, ["2024", "25.00", "N/A", "N/A", "N/A", "N/A", "N/A", "N/A"]);
    }

    #[test]
    fn valuation_section_shows_table_and_sanity() {
        let rendered = render(&report(
            json!({"keyMetrics": [{"peRatio": 18.0}, {"peRatio": 22.0}]}),
            json!({"valuationSanity": {"assessment": "Inline", "reasoning": "P/E near its average"}}),
        ));
        let section = rendered.section(SectionId::ValuationMetrics).unwrap();
        let table = section.table().unwrap();
        assert_eq!(table.rows[0][1].text, "18.00");
        assert_eq!(table.rows[1][1].text, "20.00");
        assert_eq!(table.rows[2][1].text, "N/A");
        assert!(section.blocks.contains(&Block::Field {
            label: "Assessment",
            value: "Inline".to_string()
        }));
    }

    #[test]
    fn judgment_grid_defaults_to_medium() {
        let rendered = render(&report(json!({}), json!({})));
        let section = rendered.section(SectionId::JudgmentSupport).unwrap();
        let Block::Judgments(cells) = &section.blocks[0] else {
            panic!("expected judgments");
        };
        assert_eq!(cells.len(), 3);
        assert!(cells.iter().all(|c| c.level == Level::Medium && c.reasoning == NOT_DISCLOSED));
    }

    #[test]
    fn year_label_parses_dates_and_datetimes() {
        assert_eq!(year_label(Some("2023-06-30"), 0), "2023");
        assert_eq!(year_label(Some("2022-12-31 00:00:00"), 0), "2022");
        assert_eq!(year_label(Some(""), 2), "Year 3");
        assert_eq!(year_label(None, 0), "Year 1");
    }
}
