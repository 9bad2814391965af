//! HTTP transport for the chat service.
//!
//! `POST {base_url}/api/chat` with `{"message", "step"}`, answered by
//! `{"response", "step"}`.

use async_trait::async_trait;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use super::{Reply, Transport, TransportError};

// ============================================================================
// Wire Types
// ============================================================================

#[derive(Serialize, Debug)]
struct ChatRequest<'a> {
    message: &'a str,
    step: i64,
}

#[derive(Deserialize, Debug)]
struct ChatResponse {
    response: String,
    step: i64,
}

// ============================================================================
// Transport Implementation
// ============================================================================

pub struct HttpTransport {
    base_url: String,
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Full URL of the chat endpoint; tolerates a trailing slash on the base.
    pub fn endpoint(&self) -> String {
        format!("{}/api/chat", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    fn name(&self) -> &str {
        "http"
    }

    async fn send(&self, message: &str, step: i64) -> Result<Reply, TransportError> {
        let url = self.endpoint();
        info!(
            "Chat request: url={}, step={}, message_len={}",
            url,
            step,
            message.len()
        );

        let response = self
            .client
            .post(&url)
            .json(&ChatRequest { message, step })
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        debug!("Chat response status: {}", response.status());

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            warn!("Chat service error: {} - {}", status, body);
            return Err(TransportError::Status { status, body });
        }

        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let parsed: ChatResponse = serde_json::from_str(&body).map_err(|e| {
            warn!("Undecodable chat reply ({} bytes): {}", body.len(), e);
            TransportError::Payload(e.to_string())
        })?;

        debug!(
            "Chat reply: step={}, response_len={}",
            parsed.step,
            parsed.response.len()
        );

        Ok(Reply {
            text: parsed.response,
            step: parsed.step,
        })
    }
}
