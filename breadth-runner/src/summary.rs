//! Optional natural-language summary of the latest breadth readings.
//!
//! The summarizer sees only the latest row of each snapshot, keyed by column
//! name. A failure here is logged by the runner and never aborts a run.

use breadth_core::ProcessedBreadth;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;
use thiserror::Error;

use crate::config::SummarySection;

#[derive(Debug, Error)]
pub enum SummaryError {
    #[error("summary request failed: {0}")]
    Request(String),

    #[error("summary endpoint returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unexpected summary response: {0}")]
    Response(String),
}

/// Latest row of every table, as `{table: {"date": .., column: value}}`.
///
/// Tables with no rows are omitted; undefined values become null.
pub fn latest_rows(processed: &ProcessedBreadth) -> Value {
    let mut tables = Map::new();
    for table in processed.tables() {
        if let Some((date, row)) = table.latest_row() {
            let mut fields = Map::new();
            fields.insert("date".into(), Value::String(date.to_string()));
            for (name, value) in row {
                let value = serde_json::Number::from_f64(value)
                    .map(Value::Number)
                    .unwrap_or(Value::Null);
                fields.insert(name.to_string(), value);
            }
            tables.insert(table.name().to_string(), Value::Object(fields));
        }
    }
    Value::Object(tables)
}

/// Turns the latest snapshot rows into prose.
pub trait NarrativeSummarizer: Send + Sync {
    fn name(&self) -> &str;

    /// `Ok(None)` means the summarizer chose not to produce anything.
    fn summarize(&self, market: &str, latest: &Value) -> Result<Option<String>, SummaryError>;
}

/// Summarizer that never produces text.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSummarizer;

impl NarrativeSummarizer for NoopSummarizer {
    fn name(&self) -> &str {
        "noop"
    }

    fn summarize(&self, _market: &str, _latest: &Value) -> Result<Option<String>, SummaryError> {
        Ok(None)
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// Summarizer backed by an OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAiSummarizer {
    client: reqwest::blocking::Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl OpenAiSummarizer {
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, SummaryError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| SummaryError::Request(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            model: model.into(),
            api_key: api_key.into(),
        })
    }

    /// Build from config, reading the key from the configured environment
    /// variable. `Ok(None)` when disabled or when the key is absent.
    pub fn from_config(section: &SummarySection) -> Result<Option<Self>, SummaryError> {
        if !section.enabled {
            return Ok(None);
        }
        match std::env::var(&section.api_key_env) {
            Ok(key) if !key.trim().is_empty() => {
                Self::new(&section.endpoint, &section.model, key).map(Some)
            }
            _ => {
                tracing::warn!(
                    env = %section.api_key_env,
                    "summary enabled but API key is not set; skipping"
                );
                Ok(None)
            }
        }
    }

    fn url(&self) -> String {
        format!("{}/chat/completions", self.endpoint.trim_end_matches('/'))
    }

    fn prompt(market: &str, latest: &Value) -> String {
        format!(
            "Latest {market} market breadth readings, one object per table, keyed by column:\n\
             {latest:#}\n\n\
             above_N is the percent of constituents above their N-day moving average; \
             tables ending in _smoothed hold the 21-day average of the same columns. \
             Write a short plain-language summary of market breadth and what changed."
        )
    }
}

impl NarrativeSummarizer for OpenAiSummarizer {
    fn name(&self) -> &str {
        "openai"
    }

    fn summarize(&self, market: &str, latest: &Value) -> Result<Option<String>, SummaryError> {
        let request = build_request(&self.model, market, latest);

        let resp = self
            .client
            .post(self.url())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .map_err(|e| SummaryError::Request(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(SummaryError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let chat: ChatResponse = resp
            .json()
            .map_err(|e| SummaryError::Response(e.to_string()))?;
        parse_choice(chat).map(Some)
    }
}

fn build_request<'a>(model: &'a str, market: &str, latest: &Value) -> ChatRequest<'a> {
    ChatRequest {
        model,
        messages: vec![
            ChatMessage {
                role: "system".into(),
                content: "You are a concise equity market analyst.".into(),
            },
            ChatMessage {
                role: "user".into(),
                content: OpenAiSummarizer::prompt(market, latest),
            },
        ],
        temperature: 0.3,
    }
}

fn parse_choice(chat: ChatResponse) -> Result<String, SummaryError> {
    chat.choices
        .into_iter()
        .next()
        .map(|c| c.message.content.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| SummaryError::Response("no choices in response".into()))
}
