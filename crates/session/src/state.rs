//! The per-user conversation state machine.
//!
//! Pure and synchronous: every transition is a method on [`Session`], and
//! asynchronous dispatch is left to the orchestrator. A dispatch is
//! described by a [`Ticket`] carrying the epoch it was issued in; results
//! for any other epoch are refused.

use cartmanify_core::error::TransformError;
use cartmanify_core::message::Message;
use cartmanify_core::transform::{SensorLevel, TransformHistoryItem, TransformRequest, TransformResult};
use serde::Serialize;

/// Shown when a blank submission is refused.
pub const BLANK_INPUT_MESSAGE: &str = "Please enter some text to transform";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    #[default]
    Idle,
    AwaitingResponse,
    Error,
}

/// Why a submission did not start a dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitRejection {
    /// Input was empty or whitespace.
    Blank,
    /// A request is already outstanding.
    Busy,
}

/// A dispatch the orchestrator must carry out.
#[derive(Debug, Clone)]
pub struct Ticket {
    pub epoch: u64,
    pub request: TransformRequest,
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    messages: Vec<Message>,
    sensor_level: SensorLevel,
    draft: String,
    state: SessionState,
    error: Option<String>,
    epoch: u64,
    last_failed: Option<TransformRequest>,
}

impl Session {
    pub fn new(sensor_level: SensorLevel) -> Self {
        Self {
            sensor_level,
            ..Self::default()
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn sensor_level(&self) -> SensorLevel {
        self.sensor_level
    }

    pub fn set_sensor_level(&mut self, level: SensorLevel) {
        self.sensor_level = level;
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, draft: impl Into<String>) {
        self.draft = draft.into();
    }

    pub fn can_retry(&self) -> bool {
        self.state == SessionState::Error && self.last_failed.is_some()
    }

    /// Start a transform of `text` at the current sensor level.
    ///
    /// Appends the user message and enters `AwaitingResponse`. While a
    /// request is outstanding nothing changes.
    pub fn submit(&mut self, text: &str) -> Result<Ticket, SubmitRejection> {
        if self.state == SessionState::AwaitingResponse {
            return Err(SubmitRejection::Busy);
        }
        if text.trim().is_empty() {
            self.error = Some(BLANK_INPUT_MESSAGE.to_string());
            return Err(SubmitRejection::Blank);
        }

        self.messages.push(Message::user(text));
        self.draft.clear();
        self.error = None;
        self.last_failed = None;
        self.state = SessionState::AwaitingResponse;

        Ok(Ticket {
            epoch: self.epoch,
            request: TransformRequest::new(text, self.sensor_level),
        })
    }

    /// Re-issue the request that last failed, without a new user message.
    pub fn retry(&mut self) -> Option<Ticket> {
        if self.state != SessionState::Error {
            return None;
        }
        let request = self.last_failed.take()?;
        self.error = None;
        self.state = SessionState::AwaitingResponse;
        Some(Ticket {
            epoch: self.epoch,
            request,
        })
    }

    /// Apply a successful response. Returns `false` if the ticket is stale.
    pub fn complete(&mut self, epoch: u64, result: &TransformResult) -> bool {
        if !self.is_current(epoch) {
            return false;
        }
        self.messages
            .push(Message::assistant(&result.transformed_text).with_emotion(result.emotion));
        self.state = SessionState::Idle;
        true
    }

    /// Apply a failed response. Returns `false` if the ticket is stale.
    pub fn fail(&mut self, ticket: Ticket, error: &TransformError) -> bool {
        if !self.is_current(ticket.epoch) {
            return false;
        }
        self.error = Some(error.to_string());
        self.last_failed = Some(ticket.request);
        self.state = SessionState::Error;
        true
    }

    /// Empty the log and abandon any outstanding request.
    pub fn clear(&mut self) {
        self.messages.clear();
        self.error = None;
        self.last_failed = None;
        self.state = SessionState::Idle;
        self.epoch += 1;
    }

    /// Replay a history item as a user/assistant pair and adopt its level.
    ///
    /// Refused while a request is outstanding so that an assistant reply
    /// always follows its own user message.
    pub fn replay(&mut self, item: &TransformHistoryItem) -> bool {
        if self.state == SessionState::AwaitingResponse {
            return false;
        }
        self.messages.push(Message::user(&item.original_text));
        self.messages.push(Message::assistant(&item.transformed_text));
        self.sensor_level = item.sensor_level;
        true
    }

    fn is_current(&self, epoch: u64) -> bool {
        epoch == self.epoch && self.state == SessionState::AwaitingResponse
    }
}
