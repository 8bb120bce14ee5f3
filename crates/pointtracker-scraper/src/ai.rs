//! Optional model-assisted correction of the spend and first-year fields.
//!
//! The model only ever sees visible page text and may only touch three
//! fields. Every failure is logged and treated as "no override".

use std::sync::LazyLock;

use pointtracker_core::{AppConfig, ExtractedCardRecord};
use regex::Regex;
use serde_json::{json, Value};

use crate::bounds;
use crate::error::ScraperError;

const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 1024;
/// Shorter text is a page that failed to render, not an offer.
const MIN_TEXT_CHARS: usize = 100;
const MAX_TEXT_CHARS: usize = 12_000;
const MAX_NOTES_CHARS: usize = 500;

const SYSTEM_PROMPT: &str = "You are a precise data extractor for Canadian credit card offer pages (Milesopedia).
Extract ONLY the following from the given page text. Return valid JSON with these keys (use null for missing):
- minSpend: number | null. The minimum SPEND in DOLLARS (CAD) required to get the welcome bonus, NOT the number of points. If the offer says \"spend 6 000 $ in 6 months\" then minSpend is 6000. If it says \"80 000 points after spending 6 000 $\" the minSpend is 6000, not 80000.
- minSpendNotes: string | null. Short human-readable condition, e.g. \"6 000 $ in 6 months + 1 purchase in month 15\". Keep it concise, in the language of the page.
- welcomeValueY1: number | null. First year welcome offer value in dollars (CAD) if stated. Null if not stated or if there is no welcome offer.
Return ONLY the JSON object, no markdown or explanation.";

static FENCE_OPEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*```(?:json)?\s*").expect("valid regex"));
static FENCE_CLOSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*```\s*$").expect("valid regex"));

/// Fields the model may correct, each already bounds-checked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AiOverride {
    pub min_spend: Option<u32>,
    pub min_spend_notes: Option<String>,
    pub welcome_value_y1: Option<u32>,
}

impl AiOverride {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.min_spend.is_none() && self.min_spend_notes.is_none() && self.welcome_value_y1.is_none()
    }

    /// Overwrites the covered fields that the model supplied. The first-year
    /// value is left alone on cards flagged as having no welcome offer.
    pub fn apply(&self, record: &mut ExtractedCardRecord) {
        if let Some(min_spend) = self.min_spend {
            record.min_spend = Some(min_spend);
        }
        if let Some(notes) = &self.min_spend_notes {
            record.min_spend_notes = Some(notes.clone());
        }
        if let Some(y1) = self.welcome_value_y1 {
            if !record.no_welcome_bonus {
                record.welcome_value_y1 = Some(y1);
            }
        }
    }
}

/// Client for the Anthropic messages API.
#[derive(Debug, Clone)]
pub struct AiExtractor {
    client: reqwest::Client,
    api_key: String,
    model: String,
    endpoint: String,
}

impl AiExtractor {
    #[must_use]
    pub fn new(client: reqwest::Client, api_key: String, model: String, base_url: &str) -> Self {
        Self {
            client,
            api_key,
            model,
            endpoint: format!("{}/v1/messages", base_url.trim_end_matches('/')),
        }
    }

    /// `None` when no API key is configured.
    #[must_use]
    pub fn from_config(config: &AppConfig, client: reqwest::Client) -> Option<Self> {
        let api_key = config.anthropic_api_key.clone()?;
        Some(Self::new(
            client,
            api_key,
            config.anthropic_model.clone(),
            &config.anthropic_base_url,
        ))
    }

    /// Asks the model for corrections. Never fails: errors are logged and
    /// yield `None`, as does text too short to hold an offer.
    pub async fn extract(&self, page_text: &str) -> Option<AiOverride> {
        if page_text.chars().count() < MIN_TEXT_CHARS {
            return None;
        }
        match self.request(page_text).await {
            Ok(found) => Some(found).filter(|o| !o.is_empty()),
            Err(e) => {
                tracing::warn!(error = %e, "AI extraction failed, keeping rule-based values");
                None
            }
        }
    }

    async fn request(&self, page_text: &str) -> Result<AiOverride, ScraperError> {
        let excerpt: String = page_text.chars().take(MAX_TEXT_CHARS).collect();
        let req_body = json!({
            "model": self.model,
            "max_tokens": MAX_TOKENS,
            "system": SYSTEM_PROMPT,
            "messages": [
                {
                    "role": "user",
                    "content": format!("Extract from this credit card page:\n\n{excerpt}")
                }
            ]
        });

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&req_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScraperError::UnexpectedStatus {
                status: status.as_u16(),
                url: self.endpoint.clone(),
            });
        }

        let body: Value = response.json().await?;
        let text = body
            .get("content")
            .and_then(Value::as_array)
            .and_then(|blocks| {
                blocks
                    .iter()
                    .find(|b| b.get("type").and_then(Value::as_str) == Some("text"))
            })
            .and_then(|block| block.get("text"))
            .and_then(Value::as_str)
            .ok_or_else(|| ScraperError::Ai("response has no text block".to_string()))?;

        parse_ai_response(text)
    }
}

/// Parses the model's reply, tolerating a markdown code fence around the JSON.
/// Values outside their bounds are dropped.
///
/// # Errors
///
/// Returns [`ScraperError::Deserialize`] if the reply is not a JSON object.
pub fn parse_ai_response(raw: &str) -> Result<AiOverride, ScraperError> {
    let without_open = FENCE_OPEN_RE.replace(raw, "");
    let json_str = FENCE_CLOSE_RE.replace(&without_open, "");
    let parsed: Value =
        serde_json::from_str(json_str.trim()).map_err(|source| ScraperError::Deserialize {
            context: "AI extraction reply".to_string(),
            source,
        })?;
    if !parsed.is_object() {
        return Err(ScraperError::Ai("reply is not a JSON object".to_string()));
    }

    Ok(AiOverride {
        min_spend: bounded_number(parsed.get("minSpend"), bounds::MIN_SPEND),
        min_spend_notes: parsed
            .get("minSpendNotes")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| s.chars().take(MAX_NOTES_CHARS).collect()),
        welcome_value_y1: bounded_number(parsed.get("welcomeValueY1"), bounds::WELCOME_VALUE_Y1),
    })
}

fn bounded_number(value: Option<&Value>, bound: bounds::Bound) -> Option<u32> {
    let value = value?;
    let whole = match value.as_u64() {
        Some(n) => n,
        None => {
            let f = value.as_f64()?;
            if !f.is_finite() || f < 0.0 || f.fract() != 0.0 {
                return None;
            }
            format!("{f:.0}").parse::<u64>().ok()?
        }
    };
    u32::try_from(whole).ok().and_then(|n| bound.accept(n))
}
