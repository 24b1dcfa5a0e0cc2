use crate::render::{Block, RenderedReport, SectionId, Table};
use std::fmt::Write;

const RULE_WIDTH: usize = 60;

impl RenderedReport {
    /// Export format: title block, a rule, every section in order, then the disclaimer.
    pub fn to_plain_text(&self) -> String {
        let mut out = String::new();
        for section in &self.sections {
            if section.id == SectionId::Title {
                let _ = writeln!(out, "{}", section.heading);
                for block in &section.blocks {
                    if let Block::Paragraph(p) = block {
                        let _ = writeln!(out, "{p}");
                    }
                }
                let _ = writeln!(out, "{}\n", "=".repeat(RULE_WIDTH));
                continue;
            }

            let _ = writeln!(out, "{}", section.heading);
            let _ = writeln!(out, "{}", "-".repeat(section.heading.chars().count()));
            for block in &section.blocks {
                match block {
                    Block::Paragraph(p) => {
                        let _ = writeln!(out, "{p}");
                    }
                    Block::Field { label, value } => {
                        let _ = writeln!(out, "{label}: {value}");
                    }
                    Block::Table(table) => write_table(&mut out, table),
                    Block::List(items) => {
                        for item in items {
                            match item.evidence {
                                Some(e) => {
                                    let _ = writeln!(out, "  - {} [{}]", item.text, e.as_str());
                                }
                                None => {
                                    let _ = writeln!(out, "  - {}", item.text);
                                }
                            }
                        }
                    }
                    Block::Judgments(cells) => {
                        for cell in cells {
                            let _ = writeln!(
                                out,
                                "  {}: {} ({})",
                                cell.label,
                                cell.level.as_str(),
                                cell.reasoning
                            );
                        }
                    }
                }
            }
            out.push('\n');
        }
        let _ = writeln!(out, "DISCLAIMER: {}", self.disclaimer);
        out
    }
}

/// Left-aligned columns padded to the widest cell.
fn write_table(out: &mut String, table: &Table) {
    let mut widths: Vec<usize> = table.columns.iter().map(|c| c.chars().count()).collect();
    for row in &table.rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.text.chars().count());
            }
        }
    }

    let line = |cells: Vec<&str>| {
        cells
            .iter()
            .zip(&widths)
            .map(|(c, &w)| format!("{c:<w$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let _ = writeln!(out, "{}", line(table.columns.clone()));
    for row in &table.rows {
        let _ = writeln!(out, "{}", line(row.iter().map(|c| c.text.as_str()).collect()));
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::report::{CompanyIdentity, MemoReport, Research};
    use crate::render::render;

    #[test]
    fn plain_text_contains_every_section() {
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
        let text = render(&report).to_plain_text();
        assert!(text.starts_with("Acme Corp | NASDAQ | Industrials\n"));
        for n in 1..=11 {
            assert!(text.contains(&format!("SECTION {n}:")), "missing section {n}");
        }
        assert_eq!(text.matches("  - Not disclosed").count(), 4 + 3 + 5 + 3);
        assert!(text.trim_end().ends_with("It does not constitute investment advice."));
    }
}
