//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::core::controller::ConversationController;
use crate::transport::{Reply, Transport, TransportError};

pub const TEST_WELCOME: &str = "Welcome to the test session.";

/// A transport that replays canned results in order and records every call.
///
/// A gated transport additionally parks each `send` until the returned
/// `Notify` is signalled, which lets tests hold an exchange in flight.
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Result<Reply, TransportError>>>,
    calls: Mutex<Vec<(String, i64)>>,
    gate: Option<Arc<Notify>>,
}

impl ScriptedTransport {
    pub fn new(script: Vec<Result<Reply, TransportError>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            calls: Mutex::new(Vec::new()),
            gate: None,
        })
    }

    pub fn gated(script: Vec<Result<Reply, TransportError>>) -> (Arc<Self>, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        let transport = Arc::new(Self {
            script: Mutex::new(script.into()),
            calls: Mutex::new(Vec::new()),
            gate: Some(gate.clone()),
        });
        (transport, gate)
    }

    /// Every `(message, step)` the transport has been asked to send.
    pub fn calls(&self) -> Vec<(String, i64)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn send(&self, message: &str, step: i64) -> Result<Reply, TransportError> {
        self.calls.lock().unwrap().push((message.to_string(), step));
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Network("script exhausted".to_string())))
    }
}

/// Creates a controller over the given transport with a generous timeout.
pub fn controller_with(transport: Arc<ScriptedTransport>) -> ConversationController {
    ConversationController::new(transport, TEST_WELCOME, Duration::from_secs(5))
}
