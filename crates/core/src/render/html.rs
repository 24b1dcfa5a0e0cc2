use crate::render::{Block, ListItem, RenderedReport, Section, SectionId, Table};
use std::fmt::Write;

impl RenderedReport {
    /// Markup consumed by the memo page; styling lives with the presentation layer.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for section in &self.sections {
            if section.id == SectionId::Title {
                write_title(&mut out, section);
            } else {
                write_section(&mut out, section);
            }
            out.push_str("\n\n");
        }
        let _ = write!(
            out,
            "<div class=\"disclaimer\"><strong>DISCLAIMER:</strong> {}</div>",
            escape(self.disclaimer)
        );
        out
    }
}

fn write_title(out: &mut String, section: &Section) {
    let _ = write!(out, "<div class=\"memo-title\">{}", escape(&section.heading));
    for block in &section.blocks {
        if let Block::Paragraph(p) = block {
            let _ = write!(out, "<div class=\"memo-subtitle\">{}</div>", escape(p));
        }
    }
    out.push_str("</div>");
}

fn write_section(out: &mut String, section: &Section) {
    let heading = escape(&section.heading);
    let _ = write!(
        out,
        "<div class=\"memo-section\"><div class=\"section-heading-wrapper\">\
         <h2 class=\"memo-section-heading\">{heading}</h2>\
         <button class=\"info-btn\" type=\"button\" aria-label=\"Info about {heading}\">ℹ\
         <span class=\"info-tooltip\">{}</span></button></div>",
        escape(section.tooltip)
    );

    for block in &section.blocks {
        match block {
            Block::Paragraph(p) => {
                let _ = write!(out, "<p>{}</p>", escape(p));
            }
            Block::Field { label, value } => {
                let _ = write!(out, "<p><strong>{}:</strong> {}</p>", escape(label), escape(value));
            }
            Block::Table(table) => write_table(out, table),
            Block::List(items) => write_list(out, items),
            Block::Judgments(cells) => {
                out.push_str("<div class=\"judgment-grid\">");
                for cell in cells {
                    let _ = write!(
                        out,
                        "<div class=\"judgment-item\"><div class=\"judgment-label\">{}</div>\
                         <div class=\"judgment-value\">{}</div>\
                         <div class=\"judgment-description\">{}</div></div>",
                        cell.label,
                        cell.level.as_str(),
                        escape(&cell.reasoning)
                    );
                }
                out.push_str("</div>");
            }
        }
    }
    out.push_str("</div>");
}

fn write_table(out: &mut String, table: &Table) {
    out.push_str("<table class=\"data-table\"><thead><tr>");
    for column in &table.columns {
        let _ = write!(out, "<th>{}</th>", escape(column));
    }
    out.push_str("</tr></thead><tbody>");
    for row in &table.rows {
        out.push_str("<tr>");
        for cell in row {
            match cell.class {
                Some(class) => {
                    let _ = write!(out, "<td class=\"{class}\">{}</td>", escape(&cell.text));
                }
                None => {
                    let _ = write!(out, "<td>{}</td>", escape(&cell.text));
                }
            }
        }
        out.push_str("</tr>");
    }
    out.push_str("</tbody></table>");
}

fn write_list(out: &mut String, items: &[ListItem]) {
    out.push_str("<ul>");
    for item in items {
        match item.evidence {
            Some(evidence) => {
                let tag = evidence.as_str();
                let _ = write!(
                    out,
                    "<li>{} <span class=\"evidence-tag evidence-{}\">{tag}</span></li>",
                    escape(&item.text),
                    tag.to_ascii_lowercase()
                );
            }
            None => {
                let _ = write!(out, "<li>{}</li>", escape(&item.text));
            }
        }
    }
    out.push_str("</ul>");
}

/// Narrative text comes from a model; never let it inject markup.
fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
