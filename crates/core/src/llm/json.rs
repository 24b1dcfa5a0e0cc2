use crate::domain::narrative::NarrativeAnalysis;
use anyhow::Context;

pub fn extract_json(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.starts_with("```") {
        // Remove Markdown fences (```json ... ``` or ``` ... ```).
        let mut inner = trimmed;
        if let Some(after_first) = inner.splitn(2, '\n').nth(1) {
            inner = after_first;
        }
        if let Some(end) = inner.rfind("```") {
            inner = &inner[..end];
        }
        return Some(inner.trim().to_string());
    }

    // Best-effort extraction: first '{' to last '}'.
    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    if end <= start {
        return None;
    }
    Some(trimmed[start..=end].trim().to_string())
}

/// Model text to a narrative. Only a top-level JSON object is accepted.
pub fn parse_narrative(text: &str) -> anyhow::Result<NarrativeAnalysis> {
    let json_str = extract_json(text).unwrap_or_else(|| text.trim().to_string());
    let value = serde_json::from_str::<serde_json::Value>(&json_str)
        .with_context(|| format!("LLM output is not valid JSON: {json_str}"))?;
    anyhow::ensure!(value.is_object(), "LLM output is not a JSON object: {json_str}");
    serde_json::from_value::<NarrativeAnalysis>(value)
        .context("LLM output does not match the narrative shape")
}
