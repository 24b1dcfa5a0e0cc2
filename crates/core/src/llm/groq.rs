use crate::config::Settings;
use crate::domain::narrative::NarrativeAnalysis;
use crate::domain::report::{BUSINESS_SNAPSHOT_COUNT, KEY_RISK_COUNT, THESIS_COUNT};
use crate::llm::error::LlmDiagnosticsError;
use crate::llm::json;
use crate::llm::{NarrativeClient, NarrativeInput, Provider};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai";
const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";
const DEFAULT_MAX_TOKENS: u32 = 4000;
const DEFAULT_TIMEOUT_SECS: u64 = 60;
const TEMPERATURE: f32 = 0.3;

const SYSTEM_PROMPT: &str = "You are a financial analyst. Return ONLY valid JSON.";

/// OpenAI-compatible chat completions against Groq. One request per memo, no repair loop.
#[derive(Debug, Clone)]
pub struct GroqClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
}

impl GroqClient {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let api_key = settings.require_groq_api_key()?.to_string();
        let base_url = settings
            .groq_base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let model = settings
            .groq_model
            .clone()
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let max_tokens = std::env::var("GROQ_MAX_TOKENS")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(DEFAULT_MAX_TOKENS);

        let timeout_secs = std::env::var("GROQ_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build reqwest client")?;

        Ok(Self {
            http,
            api_key,
            base_url,
            model,
            max_tokens,
        })
    }

    async fn create_completion(&self, req: &ChatRequest<'_>) -> anyhow::Result<ChatResponse> {
        let url = format!(
            "{}/v1/chat/completions",
            self.base_url.trim_end_matches('/')
        );
        let res = self
            .http
            .post(url)
            .bearer_auth(&self.api_key)
            .json(req)
            .send()
            .await
            .context("Groq request failed")?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read Groq response body")?;
        if !status.is_success() {
            return Err(LlmDiagnosticsError {
                provider: Provider::Groq,
                stage: "http",
                status: Some(status.as_u16()),
                detail: format!("Groq API error: {status}"),
                raw_output: Some(text),
            }
            .into());
        }

        serde_json::from_str::<ChatResponse>(&text).map_err(|err| {
            LlmDiagnosticsError {
                provider: Provider::Groq,
                stage: "response",
                status: None,
                detail: format!("failed to decode chat completion: {err}"),
                raw_output: Some(text),
            }
            .into()
        })
    }

    fn user_prompt(input: &NarrativeInput) -> String {
        let name = &input.company_name;
        format!(
            "You are analyzing {name} ({symbol}).

FINANCIAL DATA PROVIDED:
{data}

Based on this REAL financial data, provide analytical interpretation in JSON format (no markdown):

{{
  \"priceContext\": {{
    \"trend\": \"Neutral description of price trends based on the data provided\",
    \"volatility\": \"Assessment based on volatility number\"
  }},
  \"financialStructure\": {{
    \"description\": \"Analytical description of revenue/margin trends from the 5-year data\",
    \"segments\": []
  }},
  \"businessSnapshot\": [
    \"Factual bullet 1 about {name}\",
    \"Factual bullet 2\",
    \"Factual bullet 3\",
    \"Factual bullet 4\"
  ],
  \"whyThisCOULDWork\": [
    {{\"claim\": \"Management claim 1\", \"evidenceStrength\": \"Strong\"}},
    {{\"claim\": \"Management claim 2\", \"evidenceStrength\": \"Moderate\"}},
    {{\"claim\": \"Management claim 3\", \"evidenceStrength\": \"Weak\"}}
  ],
  \"keyRisks\": [
    \"Risk 1\", \"Risk 2\", \"Risk 3\", \"Risk 4\", \"Risk 5\"
  ],
  \"valuationSanity\": {{
    \"assessment\": \"Based on P/E data: Cheap/Inline/Premium\",
    \"reasoning\": \"Brief explanation using the numbers\"
  }},
  \"judgmentSupport\": {{
    \"businessQuality\": {{\"level\": \"High/Medium/Low\", \"reasoning\": \"Based on margins/ROE\"}},
    \"evidenceStrength\": {{\"level\": \"High/Medium/Low\", \"reasoning\": \"Data quality assessment\"}},
    \"uncertaintyLevel\": {{\"level\": \"High/Medium/Low\", \"reasoning\": \"Based on volatility/trends\"}}
  }},
  \"validationNeeds\": [
    \"Validation 1\", \"Validation 2\", \"Validation 3\"
  ],
  \"narrativeContext\": [
    \"Recent development 1\", \"Recent development 2\", \"Recent development 3\"
  ]
}}

RULES:
- Reference the numerical data where applicable
- EXACTLY {BUSINESS_SNAPSHOT_COUNT} business snapshot bullets
- EXACTLY {THESIS_COUNT} whyThisCOULDWork with evidence tags
- EXACTLY {KEY_RISK_COUNT} keyRisks
- NO predictions, NO recommendations",
            symbol = input.symbol,
            data = input.structured_json(),
        )
    }

    fn response_text(res: &ChatResponse) -> Option<&str> {
        res.choices
            .first()
            .and_then(|choice| choice.message.content.as_deref())
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }
}

#[async_trait::async_trait]
impl NarrativeClient for GroqClient {
    fn provider(&self) -> Provider {
        Provider::Groq
    }

    async fn analyze(&self, input: NarrativeInput) -> anyhow::Result<NarrativeAnalysis> {
        let user = Self::user_prompt(&input);
        let req = ChatRequest {
            model: &self.model,
            messages: vec![
                Message {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                Message {
                    role: "user",
                    content: &user,
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: self.max_tokens,
        };

        let res = self.create_completion(&req).await?;
        if matches!(
            res.choices.first().and_then(|c| c.finish_reason.as_deref()),
            Some("length")
        ) {
            tracing::warn!(
                symbol = %input.symbol,
                max_tokens = self.max_tokens,
                "Groq completion truncated at max_tokens"
            );
        }

        let text = Self::response_text(&res).ok_or_else(|| LlmDiagnosticsError {
            provider: Provider::Groq,
            stage: "response",
            status: None,
            detail: "completion has no message content".to_string(),
            raw_output: None,
        })?;

        json::parse_narrative(text).map_err(|err| {
            LlmDiagnosticsError {
                provider: Provider::Groq,
                stage: "parse",
                status: None,
                detail: format!("{err:#}"),
                raw_output: Some(text.to_string()),
            }
            .into()
        })
    }
}

#[derive(Debug, Clone, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Clone, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Clone, Deserialize)]
struct Choice {
    message: ChoiceMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}
