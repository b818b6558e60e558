use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::engine::error::LlmError;
use crate::llm::interface::{CompletionClient, CompletionRequest};

/// One scripted turn of a [`ScriptedClient`].
#[derive(Debug, Clone)]
pub enum ScriptStep {
    /// Return this reply.
    Reply(String),
    /// Fail as if the deadline passed.
    Timeout,
    /// Fail with an HTTP status error.
    Status(u16, String),
    /// Sleep far past any test deadline, so callers exercise their own
    /// timeout handling.
    Hang,
}

/// A completion client that plays back a fixed script, one step per call.
/// Panics when called more times than the script allows.
#[derive(Debug)]
pub struct ScriptedClient {
    steps: Mutex<VecDeque<ScriptStep>>,
    calls: AtomicUsize,
}

impl ScriptedClient {
    pub fn new(steps: Vec<ScriptStep>) -> Self {
        Self { steps: Mutex::new(steps.into_iter().collect()), calls: AtomicUsize::new(0) }
    }

    /// How many completions were requested.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionClient for ScriptedClient {
    async fn complete(&self, _request: CompletionRequest) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let step = self
            .steps
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("scripted client exhausted after {} calls", self.calls()));
        match step {
            ScriptStep::Reply(text) => Ok(text),
            ScriptStep::Timeout => Err(LlmError::Timeout(Duration::from_millis(1))),
            ScriptStep::Status(status, body) => Err(LlmError::Status { status, body }),
            ScriptStep::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(LlmError::Timeout(Duration::from_secs(3600)))
            }
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
