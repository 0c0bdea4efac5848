//! Scripted transport double for tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};

use fieldops_core::ClientError;

use crate::transport::{Transport, WireResponse};

/// A request as the mock transport saw it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub url: String,
    pub body: Value,
    pub cookie: Option<String>,
}

/// Replays scripted responses in FIFO order and records every request.
#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<WireResponse>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

fn poisoned() -> ClientError {
    ClientError::Transport("mock transport lock poisoned".to_string())
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, response: WireResponse) {
        if let Ok(mut responses) = self.responses.lock() {
            responses.push_back(response);
        }
    }

    /// Script a 200 response with a raw body and no cookies.
    pub fn push_body(&self, body: &str) {
        self.push(WireResponse {
            status: 200,
            body: body.to_string(),
            set_cookie: Vec::new(),
        });
    }

    /// Script a successful `{"jsonrpc": "2.0", "result": ...}` body.
    pub fn push_result(&self, result: Value) {
        self.push_body(&json!({"jsonrpc": "2.0", "result": result}).to_string());
    }

    /// Script a fault carrying the given exception class and message.
    pub fn push_fault(&self, name: &str, message: &str) {
        self.push_body(
            &json!({
                "jsonrpc": "2.0",
                "error": {
                    "message": "Odoo Server Error",
                    "data": {"name": name, "message": message},
                },
            })
            .to_string(),
        );
    }

    /// Script a stale-session fault.
    pub fn push_expired(&self) {
        self.push_fault(
            crate::protocol::SESSION_EXPIRED_EXCEPTION,
            "Session expired",
        );
    }

    /// Script an authenticate response whose Set-Cookie header carries
    /// `cookie` (e.g. `session_id=abc`).
    pub fn push_auth(&self, cookie: &str, uid: i64) {
        self.push(WireResponse {
            status: 200,
            body: json!({"jsonrpc": "2.0", "result": {"uid": uid}}).to_string(),
            set_cookie: vec![format!("{cookie}; Path=/; HttpOnly")],
        });
    }

    /// Everything sent through this transport so far.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn post_json(
        &self,
        url: &str,
        body: &Value,
        cookie: Option<&str>,
        _timeout: Duration,
    ) -> Result<WireResponse, ClientError> {
        self.requests
            .lock()
            .map_err(|_| poisoned())?
            .push(RecordedRequest {
                url: url.to_string(),
                body: body.clone(),
                cookie: cookie.map(str::to_string),
            });
        self.responses
            .lock()
            .map_err(|_| poisoned())?
            .pop_front()
            .ok_or_else(|| ClientError::Transport("no scripted response left".to_string()))
    }
}
