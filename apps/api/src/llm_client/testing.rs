//! Scripted `TextGenerator` for unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::Semaphore;

use super::{GenerationConfig, LlmError, TextGenerator};

/// What the mock should answer for one call.
#[derive(Debug, Clone)]
pub enum Reply {
    Text(String),
    Api { status: u16, body: String },
    Malformed,
    MissingKey,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Reply::Text(text.into())
    }

    fn into_result(self) -> Result<String, LlmError> {
        match self {
            Reply::Text(text) => Ok(text),
            Reply::Api { status, body } => Err(LlmError::Api {
                status,
                message: body,
            }),
            Reply::Malformed => Err(LlmError::MalformedResponse),
            Reply::MissingKey => Err(LlmError::MissingApiKey),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub model: String,
    pub prompt: String,
    pub config: Option<GenerationConfig>,
}

/// Answers calls from a queue; once the queue drains every call gets the
/// default reply. Optionally parks each call until `release` is invoked.
pub struct MockGenerator {
    replies: Mutex<VecDeque<Reply>>,
    default_reply: Reply,
    calls: Mutex<Vec<RecordedCall>>,
    gate: Option<Semaphore>,
}

impl MockGenerator {
    pub fn always(reply: Reply) -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            default_reply: reply,
            calls: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    pub fn sequence(replies: Vec<Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            default_reply: Reply::Malformed,
            calls: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    /// Every call blocks until a matching `release()`.
    pub fn gated(mut self) -> Self {
        self.gate = Some(Semaphore::new(0));
        self
    }

    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.add_permits(1);
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    async fn generate(
        &self,
        model: &str,
        prompt: &str,
        config: Option<GenerationConfig>,
    ) -> Result<String, LlmError> {
        let reply = {
            self.calls.lock().unwrap().push(RecordedCall {
                model: model.to_string(),
                prompt: prompt.to_string(),
                config,
            });
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| self.default_reply.clone())
        };
        if let Some(gate) = &self.gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }
        reply.into_result()
    }
}
