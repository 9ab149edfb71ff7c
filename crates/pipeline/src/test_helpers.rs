//! Shared test helpers for pipeline tests.

use cartmanify_core::message::Message;
use cartmanify_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use cartmanify_core::ProviderError;
use std::sync::Mutex;

/// A mock provider that returns a sequence of scripted completions.
///
/// Each call to `complete` returns the next text in the queue and records
/// the request. Panics if more calls are made than responses provided.
pub struct ScriptedProvider {
    responses: Mutex<Vec<String>>,
    call_count: Mutex<usize>,
    last_request: Mutex<Option<ProviderRequest>>,
}

impl ScriptedProvider {
    pub fn new(responses: Vec<String>) -> Self {
        Self {
            responses: Mutex::new(responses),
            call_count: Mutex::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Create a provider that returns a single completion.
    pub fn text(text: &str) -> Self {
        Self::new(vec![text.to_string()])
    }

    pub fn calls(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    pub fn last_request(&self) -> Option<ProviderRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let mut count = self.call_count.lock().unwrap();
        let responses = self.responses.lock().unwrap();

        if *count >= responses.len() {
            panic!(
                "ScriptedProvider: no more responses (call #{}, have {})",
                *count,
                responses.len()
            );
        }

        let text = responses[*count].clone();
        *count += 1;
        *self.last_request.lock().unwrap() = Some(request);
        Ok(make_text_response(&text))
    }
}

/// A provider that always fails with the given error.
pub struct FailingProvider {
    error: ProviderError,
}

impl FailingProvider {
    pub fn new(error: ProviderError) -> Self {
        Self { error }
    }
}

#[async_trait::async_trait]
impl Provider for FailingProvider {
    fn name(&self) -> &str {
        "failing_mock"
    }

    async fn complete(&self, _request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        Err(self.error.clone())
    }
}

/// Create a simple text response.
pub fn make_text_response(text: &str) -> ProviderResponse {
    ProviderResponse {
        message: Message::assistant(text),
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
        model: "mock-model".into(),
    }
}
