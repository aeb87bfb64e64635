//! Anthropic Messages API client used as the judge oracle
//!
//! Each judgment is a single stateless request. Rate limits (429) are
//! retried honouring `retry-after`, server errors (5xx) with exponential
//! backoff. Repeated hard failures open a circuit breaker shared by every
//! clone of the client.

use crate::auth;
use crate::circuit_breaker::CircuitBreaker;
use crate::oracle::Oracle;
use crate::types::{Message, MessagesRequest, MessagesResponse};
use async_trait::async_trait;
use medeval_core::{EvalError, JudgeSettings, Result};
use std::sync::Arc;
use std::time::Duration;

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Retry schedule for 429 and 5xx responses
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            initial_backoff: Duration::from_secs(30),
            max_backoff: Duration::from_secs(300),
        }
    }
}

/// Judge oracle backed by the Anthropic Messages API
#[derive(Clone)]
pub struct AnthropicOracle {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
    retry: RetryPolicy,
    breaker: Arc<CircuitBreaker>,
}

impl AnthropicOracle {
    /// Build a client from judge settings, reading the API key from the environment
    pub fn from_settings(settings: &JudgeSettings) -> Result<Self> {
        let key = auth::api_key(&settings.api_key_env)?;
        Self::with_api_key(settings, key)
    }

    pub fn with_api_key(settings: &JudgeSettings, api_key: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| EvalError::JudgeTransport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            api_url: settings.api_url.clone(),
            api_key: api_key.into(),
            model: settings.model.clone(),
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
            retry: RetryPolicy::default(),
            breaker: Arc::new(CircuitBreaker::default()),
        })
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_circuit_breaker(mut self, breaker: Arc<CircuitBreaker>) -> Self {
        self.breaker = breaker;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn record_hard_failure(&self) {
        self.breaker.record_failure();
        tracing::error!(
            "Circuit breaker: recorded failure (count: {})",
            self.breaker.failure_count()
        );
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        if !self.breaker.can_execute() {
            return Err(EvalError::RateLimited(format!(
                "Circuit breaker is OPEN after repeated judge failures. Retry in {} seconds.",
                self.breaker.remaining_cooldown().as_secs()
            )));
        }

        let request = MessagesRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            messages: vec![Message::user(prompt)],
        };

        let mut retries = 0;
        let mut backoff = self.retry.initial_backoff;

        loop {
            tracing::debug!(
                prompt_chars = prompt.len(),
                "Sending judge request (attempt {})",
                retries + 1
            );

            let response = self
                .http
                .post(&self.api_url)
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .header("content-type", "application/json")
                .json(&request)
                .send()
                .await
                .map_err(|e| EvalError::JudgeTransport(format!("Failed to send request: {}", e)))?;

            let status = response.status();

            if status.as_u16() == 429 {
                retries += 1;

                if retries > self.retry.max_retries {
                    let error_text = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Unknown".to_string());
                    self.record_hard_failure();
                    return Err(EvalError::RateLimited(format!(
                        "Rate limit exceeded after {} retries. Last error: {}",
                        self.retry.max_retries, error_text
                    )));
                }

                let wait = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.trim().parse::<u64>().ok())
                    .map(Duration::from_secs)
                    .unwrap_or(backoff);

                tracing::warn!(
                    "Rate limited (429). Waiting {:?} before retry {}/{}",
                    wait,
                    retries,
                    self.retry.max_retries
                );

                tokio::time::sleep(wait).await;
                backoff = (backoff * 2).min(self.retry.max_backoff);
                continue;
            }

            if !status.is_success() {
                let error_text = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown".to_string());

                if status.is_server_error() && retries < self.retry.max_retries {
                    retries += 1;
                    tracing::warn!(
                        "Server error ({}). Waiting {:?} before retry {}/{}",
                        status,
                        backoff,
                        retries,
                        self.retry.max_retries
                    );
                    tokio::time::sleep(backoff).await;
                    backoff = (backoff * 2).min(self.retry.max_backoff);
                    continue;
                }

                self.record_hard_failure();
                return Err(EvalError::JudgeTransport(format!(
                    "Anthropic API error {}: {}",
                    status, error_text
                )));
            }

            let body: MessagesResponse = response
                .json()
                .await
                .map_err(|e| EvalError::JudgeTransport(format!("Failed to parse response: {}", e)))?;

            let text = body
                .text()
                .ok_or_else(|| EvalError::JudgeTransport("No content in response".to_string()))?;

            self.breaker.record_success();

            match body.usage {
                Some(usage) => tracing::info!(
                    "Judge reply received ({} chars, {} input tokens, {} output tokens)",
                    text.len(),
                    usage.input_tokens,
                    usage.output_tokens
                ),
                None => tracing::info!("Judge reply received ({} chars)", text.len()),
            }

            return Ok(text);
        }
    }
}

#[async_trait]
impl Oracle for AnthropicOracle {
    async fn judge(&self, prompt: &str) -> Result<String> {
        self.complete(prompt).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings(server: &MockServer) -> JudgeSettings {
        JudgeSettings {
            api_url: format!("{}/v1/messages", server.uri()),
            timeout_secs: 5,
            ..JudgeSettings::default()
        }
    }

    fn fast_retry() -> RetryPolicy {
        RetryPolicy {
            max_retries: 2,
            initial_backoff: Duration::from_millis(10),
            max_backoff: Duration::from_millis(40),
        }
    }

    fn reply(text: &str) -> serde_json::Value {
        serde_json::json!({
            "id": "msg_test",
            "content": [{"type": "text", "text": text}],
            "usage": {"input_tokens": 10, "output_tokens": 20}
        })
    }

    #[tokio::test]
    async fn test_successful_judgment() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "sk-test"))
            .and(header("anthropic-version", ANTHROPIC_VERSION))
            .and(body_partial_json(serde_json::json!({
                "max_tokens": 4000,
                "messages": [{"role": "user", "content": "rubric prompt"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(reply("```json\n{}\n```")))
            .expect(1)
            .mount(&server)
            .await;

        let oracle = AnthropicOracle::with_api_key(&settings(&server), "sk-test").unwrap();
        let text = oracle.judge("rubric prompt").await.unwrap();
        assert_eq!(text, "```json\n{}\n```");
    }

    #[tokio::test]
    async fn test_retries_server_errors_then_succeeds() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(reply("ok")))
            .mount(&server)
            .await;

        let oracle = AnthropicOracle::with_api_key(&settings(&server), "sk-test")
            .unwrap()
            .with_retry_policy(fast_retry());
        assert_eq!(oracle.judge("p").await.unwrap(), "ok");
    }

    #[tokio::test]
    async fn test_rate_limit_exhausts_retries() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "0"))
            .expect(3)
            .mount(&server)
            .await;

        let oracle = AnthropicOracle::with_api_key(&settings(&server), "sk-test")
            .unwrap()
            .with_retry_policy(fast_retry());
        let err = oracle.judge("p").await.unwrap_err();
        assert!(matches!(err, EvalError::RateLimited(_)));
    }

    #[tokio::test]
    async fn test_client_error_is_transport_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string("bad request"))
            .expect(1)
            .mount(&server)
            .await;

        let oracle = AnthropicOracle::with_api_key(&settings(&server), "sk-test")
            .unwrap()
            .with_retry_policy(fast_retry());
        let err = oracle.judge("p").await.unwrap_err();
        assert!(matches!(err, EvalError::JudgeTransport(_)));
        assert!(err.to_string().contains("bad request"));
    }

    #[tokio::test]
    async fn test_open_breaker_short_circuits() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(reply("ok")))
            .expect(0)
            .mount(&server)
            .await;

        let breaker = Arc::new(CircuitBreaker::new(1, Duration::from_secs(60)));
        breaker.record_failure();

        let oracle = AnthropicOracle::with_api_key(&settings(&server), "sk-test")
            .unwrap()
            .with_circuit_breaker(breaker);
        let err = oracle.judge("p").await.unwrap_err();
        assert!(matches!(err, EvalError::RateLimited(_)));
    }
}
