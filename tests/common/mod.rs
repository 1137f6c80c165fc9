//! Test doubles shared by the integration tests.

#![allow(dead_code)]

use amwal::metadata::RequestMetadata;
use amwal::{RawResponse, Sleeper, Transport, TransportError};
use async_trait::async_trait;
use http::StatusCode;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub type Reply = Result<RawResponse, TransportError>;

/// Plays back scripted replies in order, then keeps returning the fallback.
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<Reply>>,
    fallback: Reply,
    calls: AtomicUsize,
    requests: Mutex<Vec<RequestMetadata>>,
}

impl ScriptedTransport {
    pub fn new(replies: Vec<Reply>, fallback: Reply) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            fallback,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Always answers with `status` and `body`.
    pub fn always(status: u16, body: &str) -> Self {
        Self::new(Vec::new(), Ok(ok_reply(status, body)))
    }

    /// Always fails at the transport level.
    pub fn always_failing() -> Self {
        Self::new(Vec::new(), Err(connect_error()))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<RequestMetadata> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: &RequestMetadata) -> Result<RawResponse, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        let next = self.replies.lock().unwrap().pop_front();
        next.unwrap_or_else(|| self.fallback.clone())
    }
}

/// Records requested delays without waiting.
#[derive(Default)]
pub struct RecordingSleeper {
    delays: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn delays(&self) -> Vec<Duration> {
        self.delays.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.delays.lock().unwrap().push(duration);
    }
}

/// Routes client events to the test output; safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("amwal=debug")
        .with_test_writer()
        .try_init();
}

pub fn ok_reply(status: u16, body: &str) -> RawResponse {
    RawResponse::new(StatusCode::from_u16(status).unwrap(), body)
}

pub fn connect_error() -> TransportError {
    TransportError::Connect("connection refused".to_string())
}

pub fn millis(values: &[u64]) -> Vec<Duration> {
    values.iter().copied().map(Duration::from_millis).collect()
}
