use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::GatewayError;
use crate::metrics::{GATEWAY_ERRORS, GATEWAY_LATENCY};
use crate::models::ChatMessage;

// OpenAI-compatible chat completion request format
#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChatMessage,
}

// Client for the hosted LLM gateway.
pub struct GatewayClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl GatewayClient {
    pub fn new(client: reqwest::Client, base_url: String, api_key: Option<String>, model: String) -> Self {
        Self { client, base_url, api_key, model }
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }

    fn completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url.trim_end_matches('/'))
    }

    async fn send(&self, messages: &[ChatMessage], stream: bool) -> Result<reqwest::Response, GatewayError> {
        let api_key = self.api_key.as_deref().filter(|k| !k.is_empty()).ok_or(GatewayError::MissingApiKey)?;

        let start = Instant::now();
        let result = self
            .client
            .post(self.completions_url())
            .bearer_auth(api_key)
            .json(&CompletionRequest { model: &self.model, messages, stream })
            .send()
            .await;
        GATEWAY_LATENCY.observe(start.elapsed().as_secs_f64());

        let response = result.inspect_err(|_| GATEWAY_ERRORS.inc())?;
        let status = response.status();
        debug!(status = status.as_u16(), stream, "gateway responded");

        if status.is_success() {
            return Ok(response);
        }

        GATEWAY_ERRORS.inc();
        match status.as_u16() {
            429 => Err(GatewayError::RateLimited),
            402 => Err(GatewayError::PaymentRequired),
            code => {
                let body = response.text().await.unwrap_or_default();
                warn!(status = code, body = %body, "gateway error");
                Err(GatewayError::Upstream { status: code, body })
            }
        }
    }

    // Starts a streaming completion. The response body is the raw
    // server-sent event stream.
    pub async fn stream_chat(&self, messages: &[ChatMessage]) -> Result<reqwest::Response, GatewayError> {
        self.send(messages, true).await
    }

    // Runs a non-streaming completion and returns the first choice's text.
    pub async fn complete(&self, messages: &[ChatMessage]) -> Result<String, GatewayError> {
        let response = self.send(messages, false).await?;
        let body: CompletionResponse =
            response.json().await.map_err(|e| GatewayError::Malformed(e.to_string()))?;

        body.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| GatewayError::Malformed("no choices in completion".to_string()))
    }
}
