use std::time::{Duration, Instant};

use async_openai::{config::OpenAIConfig, error::OpenAIError, Client};
use async_trait::async_trait;
use backoff::ExponentialBackoff;
use serde_json::{json, Value};

use crate::domain::{
    analysis::{AnalysisRecord, Subject, PARSE_FAILURE_EVIDENCE},
    prompt, safe_preview,
};

pub const TRANSIENT_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];
/// Reason phrases of 5xx statuses that another attempt cannot fix.
pub const PERMANENT_SERVER_ERRORS: [&str; 3] = [
    "not implemented",
    "http version not supported",
    "network authentication required",
];
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(1500);
pub const LOG_PREVIEW_CHARS: usize = 220;

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Model request timed out: {0}")]
    Timeout(String),
    #[error("Model API returned HTTP {status}: {message}")]
    Http { status: u16, message: String },
    /// A 5xx whose exact status the client library does not expose. Only the
    /// response body is known, so it is retried unless the body names one of
    /// [`PERMANENT_SERVER_ERRORS`].
    #[error("Model API server error: {0}")]
    Server(String),
    #[error("Model API rate limit: {0}")]
    RateLimited(String),
    #[error("Model API error: {0}")]
    Api(String),
    #[error("Model request failed: {0}")]
    Transport(String),
    #[error("Model response was not valid JSON: {0}")]
    InvalidResponse(String),
    #[error("Model did not return a message")]
    EmptyOutput,
}

impl ModelError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ModelError::Http { status, .. } => Some(*status),
            ModelError::RateLimited(_) => Some(429),
            _ => None,
        }
    }

    /// Timeouts and the usual overload statuses are worth another attempt.
    pub fn is_transient(&self) -> bool {
        let message = self.to_string().to_lowercase();
        if message.contains("timeout") || message.contains("timed out") {
            return true;
        }

        match self {
            ModelError::Timeout(_) => true,
            ModelError::Server(_) => !PERMANENT_SERVER_ERRORS
                .iter()
                .any(|phrase| message.contains(phrase)),
            _ => self
                .status()
                .is_some_and(|status| TRANSIENT_STATUSES.contains(&status)),
        }
    }
}

impl From<reqwest::Error> for ModelError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            return ModelError::Timeout(e.to_string());
        }
        match e.status() {
            Some(status) => ModelError::Http {
                status: status.as_u16(),
                message: e.to_string(),
            },
            None => ModelError::Transport(e.to_string()),
        }
    }
}

impl From<OpenAIError> for ModelError {
    fn from(e: OpenAIError) -> Self {
        match e {
            OpenAIError::Reqwest(e) => ModelError::from(e),
            OpenAIError::ApiError(api_error) => {
                let rate_limited = api_error.code.as_deref() == Some("rate_limit_exceeded");
                // 5xx bodies arrive as an ApiError with every detail field empty.
                let untyped = api_error.r#type.is_none() && api_error.code.is_none();

                match (rate_limited, untyped) {
                    (true, _) => ModelError::RateLimited(api_error.message),
                    (false, true) => ModelError::Server(api_error.message),
                    (false, false) => ModelError::Api(api_error.to_string()),
                }
            }
            OpenAIError::JSONDeserialize(e) => ModelError::InvalidResponse(e.to_string()),
            other => ModelError::Api(other.to_string()),
        }
    }
}

/// One round trip to a generative model endpoint.
#[async_trait]
pub trait ModelBackend: Send + Sync {
    async fn create(&self, model: &str, input: &str) -> Result<Value, ModelError>;
}

/// Responses API over plain HTTP, so the status of a failed call stays visible.
pub struct ResponsesClient {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
}

impl ResponsesClient {
    pub fn new(api_key: String, api_base: String, timeout: Duration) -> Result<Self, ModelError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(ResponsesClient {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key,
        })
    }
}

#[async_trait]
impl ModelBackend for ResponsesClient {
    async fn create(&self, model: &str, input: &str) -> Result<Value, ModelError> {
        let res = self
            .client
            .post(format!("{}/responses", self.api_base))
            .bearer_auth(&self.api_key)
            .json(&json!({ "model": model, "input": input }))
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            let message = match serde_json::from_str::<Value>(&body) {
                Ok(error_json) => error_json
                    .pointer("/error/message")
                    .and_then(Value::as_str)
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| safe_preview(&body, LOG_PREVIEW_CHARS)),
                Err(_) => safe_preview(&body, LOG_PREVIEW_CHARS),
            };
            return Err(ModelError::Http {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str::<Value>(&body).map_err(|e| ModelError::InvalidResponse(e.to_string()))
    }
}

/// Chat Completions through async-openai.
pub struct OpenaiClient {
    client: Client<OpenAIConfig>,
}

impl OpenaiClient {
    pub fn new(api_key: String, api_base: String, timeout: Duration) -> Result<Self, ModelError> {
        let config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(api_base.trim_end_matches('/'));
        let http_client = reqwest::Client::builder().timeout(timeout).build()?;
        // Retries belong to the invoker; the library's own backoff is switched off.
        let no_retries = ExponentialBackoff {
            max_elapsed_time: Some(Duration::ZERO),
            ..Default::default()
        };

        Ok(OpenaiClient {
            client: Client::with_config(config)
                .with_http_client(http_client)
                .with_backoff(no_retries),
        })
    }
}

#[async_trait]
impl ModelBackend for OpenaiClient {
    async fn create(&self, model: &str, input: &str) -> Result<Value, ModelError> {
        let request = json!({
            "model": model,
            "messages": [{ "role": "user", "content": input }],
        });
        let response: Value = self.client.chat().create_byot(request).await?;

        Ok(response)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Sleep after failed attempt `attempt` (1-based): `base_delay * 2^(attempt - 1)`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay.checked_mul(factor).unwrap_or(Duration::MAX)
    }
}

/// Bookkeeping for one invocation.
#[derive(Debug, Default)]
pub struct RetryState {
    pub attempt: u32,
    pub last_error: Option<ModelError>,
    pub delay: Duration,
}

impl RetryState {
    /// Records the failure of the current attempt. `Ok` carries the delay before the
    /// next attempt; `Err` hands the error back when no attempt follows, leaving
    /// `last_error` on the failure before it.
    pub fn retry_after(
        &mut self,
        e: ModelError,
        policy: &RetryPolicy,
    ) -> Result<Duration, ModelError> {
        if !e.is_transient() || self.attempt >= policy.max_attempts.max(1) {
            return Err(e);
        }

        self.delay = policy.delay_for(self.attempt);
        self.last_error = Some(e);
        Ok(self.delay)
    }
}

pub type ExtractionStrategy = fn(&Value) -> Option<String>;

/// Tried in order; the first non-empty text wins.
pub const EXTRACTION_STRATEGIES: [ExtractionStrategy; 3] =
    [aggregate_output_text, output_blocks_text, chat_choices_text];

const BLOCK_TEXT_KEYS: [&str; 4] = ["text", "content", "value", "message"];

fn non_empty(text: &str) -> Option<String> {
    match text.is_empty() {
        true => None,
        false => Some(text.to_string()),
    }
}

fn join_blocks(blocks: &[Value]) -> Option<String> {
    let texts: Vec<String> = blocks.iter().filter_map(block_text).collect();
    non_empty(&texts.join("\n"))
}

/// Text of one content block. Objects without any text (reasoning items, tool calls) give `None`.
pub fn block_text(block: &Value) -> Option<String> {
    match block {
        Value::Null => None,
        Value::String(s) => non_empty(s),
        Value::Bool(_) | Value::Number(_) => Some(block.to_string()),
        Value::Array(items) => join_blocks(items),
        Value::Object(map) => {
            let keyed = BLOCK_TEXT_KEYS.iter().find_map(|key| match map.get(*key) {
                Some(Value::String(s)) => non_empty(s),
                _ => None,
            });
            if keyed.is_some() {
                return keyed;
            }

            match (map.get("content"), map.get("text")) {
                (Some(Value::Array(items)), _) => join_blocks(items),
                (_, Some(text @ Value::Object(_))) => block_text(text),
                _ => None,
            }
        }
    }
}

pub fn aggregate_output_text(response: &Value) -> Option<String> {
    match response.get("output_text")? {
        Value::String(s) => non_empty(s),
        Value::Array(items) => join_blocks(items),
        _ => None,
    }
}

pub fn output_blocks_text(response: &Value) -> Option<String> {
    match response.get("output")? {
        Value::Array(blocks) => join_blocks(blocks),
        other => block_text(other),
    }
}

pub fn chat_choices_text(response: &Value) -> Option<String> {
    let choices = response.get("choices")?.as_array()?;
    let texts: Vec<String> = choices
        .iter()
        .filter_map(|choice| {
            choice
                .pointer("/message/content")
                .and_then(block_text)
                .or_else(|| choice.get("text").and_then(block_text))
        })
        .collect();

    non_empty(&texts.join("\n"))
}

pub fn extract_text(response: &Value) -> Result<String, ModelError> {
    EXTRACTION_STRATEGIES
        .iter()
        .find_map(|strategy| strategy(response))
        .ok_or(ModelError::EmptyOutput)
}

/// Sends prompts to one model with bounded retries.
pub struct ModelInvoker {
    backend: Box<dyn ModelBackend>,
    model: String,
    policy: RetryPolicy,
}

impl ModelInvoker {
    pub fn new(backend: Box<dyn ModelBackend>, model: String) -> Self {
        ModelInvoker {
            backend,
            model,
            policy: RetryPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Raw model response, retrying transient failures with exponential backoff.
    pub async fn create_with_retry(&self, input: &str) -> Result<Value, ModelError> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut state = RetryState::default();

        loop {
            state.attempt += 1;
            let started = Instant::now();
            log::info!(
                "Calling model {} (attempt {}/{})",
                self.model,
                state.attempt,
                max_attempts
            );

            match self.backend.create(&self.model, input).await {
                Ok(response) => {
                    log::info!(
                        "Model call finished in {:.2}s on attempt {}",
                        started.elapsed().as_secs_f64(),
                        state.attempt
                    );
                    return Ok(response);
                }
                Err(e) => {
                    let transient = e.is_transient();
                    log::warn!(
                        "Model call failed in {:.2}s on attempt {}: {} | transient={} status={:?}",
                        started.elapsed().as_secs_f64(),
                        state.attempt,
                        e,
                        transient,
                        e.status()
                    );

                    match state.retry_after(e, &self.policy) {
                        Ok(delay) => {
                            log::info!("Retrying in {:.1}s...", delay.as_secs_f64());
                            tokio::time::sleep(delay).await;
                        }
                        Err(e) => {
                            if let Some(previous) = &state.last_error {
                                log::error!(
                                    "Giving up on {} after {} attempts; previous failure: {}",
                                    self.model,
                                    state.attempt,
                                    previous
                                );
                            }
                            return Err(e);
                        }
                    }
                }
            }
        }
    }

    pub async fn invoke_text(&self, input: &str) -> Result<String, ModelError> {
        let response = self.create_with_retry(input).await?;
        extract_text(&response)
    }

    /// Structured analysis of one startup. Malformed output degrades to a fallback record.
    pub async fn analyze(
        &self,
        subject: &Subject,
        context: &str,
    ) -> Result<AnalysisRecord, ModelError> {
        let input = prompt::compose(subject, context);
        log::info!(
            "Prompt chars: {} | desc chars: {} | context chars: {} | preview: {}",
            input.chars().count(),
            subject.description.chars().count(),
            context.chars().count(),
            safe_preview(&input, LOG_PREVIEW_CHARS)
        );

        let text = self.invoke_text(&input).await?;
        let record = AnalysisRecord::from_model_text(&text, subject);
        if record.evidence == Value::String(PARSE_FAILURE_EVIDENCE.to_string()) {
            log::warn!(
                "Model returned non-JSON for {}; preview: {}",
                subject.name,
                safe_preview(&text, LOG_PREVIEW_CHARS)
            );
        }

        Ok(record)
    }
}
