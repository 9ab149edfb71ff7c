//! Drives a [`Session`] against a [`Transformer`] and the client-side stores.

use cartmanify_core::error::{StoreError, TransformError};
use cartmanify_core::message::Message;
use cartmanify_core::store::{HistoryStore, PreferenceStore};
use cartmanify_core::transform::{SensorLevel, TransformHistoryItem, TransformResult, Transformer};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::state::{Session, SessionState, SubmitRejection, Ticket};

/// What became of a dispatched request.
#[derive(Debug)]
pub enum Resolution {
    /// The reply was appended to the log and recorded in history.
    Applied(TransformResult),
    /// The error was recorded on the session.
    Failed(TransformError),
    /// The session was cleared while the request was outstanding.
    Discarded,
}

/// A request in flight. Dropping the handle does not cancel it.
pub struct Dispatch {
    handle: JoinHandle<Resolution>,
    session: Arc<Mutex<Session>>,
    ticket: Ticket,
}

impl Dispatch {
    /// Wait for the outcome. A task that died without resolving is recorded
    /// on the session as a failure so the session does not stay busy.
    pub async fn wait(self) -> Resolution {
        match self.handle.await {
            Ok(resolution) => resolution,
            Err(e) => {
                let err = TransformError::upstream(e);
                if !lock_session(&self.session).fail(self.ticket, &err) {
                    return Resolution::Discarded;
                }
                warn!(error = %err, "Transform task aborted");
                Resolution::Failed(err)
            }
        }
    }
}

pub enum SubmitOutcome {
    Dispatched(Dispatch),
    /// Blank input; the session carries the message to show.
    Rejected(String),
    /// A request is already outstanding; nothing changed.
    Busy,
}

/// A point-in-time copy of the session for rendering.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub sensor_level: SensorLevel,
    pub messages: Vec<Message>,
    pub draft: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub can_retry: bool,
}

/// Owns one session and its collaborators.
///
/// The session lock is only ever taken for a synchronous transition and is
/// never held across an await.
#[derive(Clone)]
pub struct SessionOrchestrator {
    session: Arc<Mutex<Session>>,
    transformer: Arc<dyn Transformer>,
    history: Arc<dyn HistoryStore>,
    preferences: Arc<dyn PreferenceStore>,
}

impl SessionOrchestrator {
    pub fn new(
        transformer: Arc<dyn Transformer>,
        history: Arc<dyn HistoryStore>,
        preferences: Arc<dyn PreferenceStore>,
    ) -> Self {
        Self {
            session: Arc::new(Mutex::new(Session::default())),
            transformer,
            history,
            preferences,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Session> {
        lock_session(&self.session)
    }

    /// Restore the stored preference and return the persisted history.
    pub async fn start(&self) -> Result<Vec<TransformHistoryItem>, StoreError> {
        let level = self
            .preferences
            .load_sensor_level()
            .await?
            .unwrap_or_default();
        self.lock().set_sensor_level(level);

        let history = self.history.list().await?;
        debug!(level = %level, history = history.len(), "Session started");
        Ok(history)
    }

    pub fn submit(&self, text: &str) -> SubmitOutcome {
        let ticket = {
            let mut session = self.lock();
            match session.submit(text) {
                Ok(ticket) => ticket,
                Err(SubmitRejection::Busy) => return SubmitOutcome::Busy,
                Err(SubmitRejection::Blank) => {
                    return SubmitOutcome::Rejected(session.error().unwrap_or_default().to_string());
                }
            }
        };
        SubmitOutcome::Dispatched(self.dispatch(ticket))
    }

    /// Re-dispatch the last failed request. `None` unless in the error state.
    pub fn retry(&self) -> Option<Dispatch> {
        let ticket = self.lock().retry()?;
        info!(text_len = ticket.request.text.len(), "Retrying failed transform");
        Some(self.dispatch(ticket))
    }

    /// Empty the log. Any outstanding response will be discarded.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Replay a past transform without calling the transformer.
    ///
    /// Returns `false` if the id is unknown or a request is outstanding.
    pub async fn select_history(&self, id: &str) -> Result<bool, StoreError> {
        let Some(item) = self.history.get(id).await? else {
            return Ok(false);
        };
        if !self.lock().replay(&item) {
            return Ok(false);
        }
        self.preferences.save_sensor_level(item.sensor_level).await?;
        Ok(true)
    }

    pub async fn set_sensor_level(&self, level: SensorLevel) -> Result<(), StoreError> {
        self.lock().set_sensor_level(level);
        self.preferences.save_sensor_level(level).await
    }

    pub async fn history(&self) -> Result<Vec<TransformHistoryItem>, StoreError> {
        self.history.list().await
    }

    pub async fn remove_history(&self, id: &str) -> Result<bool, StoreError> {
        self.history.remove(id).await
    }

    pub async fn clear_history(&self) -> Result<(), StoreError> {
        self.history.clear().await
    }

    /// Hold unsent input. Cleared when a submission is accepted.
    pub fn set_draft(&self, draft: impl Into<String>) {
        self.lock().set_draft(draft);
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let session = self.lock();
        SessionSnapshot {
            state: session.state(),
            sensor_level: session.sensor_level(),
            messages: session.messages().to_vec(),
            draft: session.draft().to_string(),
            error: session.error().map(str::to_string),
            can_retry: session.can_retry(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.lock().state()
    }

    pub fn sensor_level(&self) -> SensorLevel {
        self.lock().sensor_level()
    }

    fn dispatch(&self, ticket: Ticket) -> Dispatch {
        let session = self.session.clone();
        let transformer = self.transformer.clone();
        let history = self.history.clone();
        let pending = ticket.clone();

        let handle = tokio::spawn(async move {
            let epoch = ticket.epoch;
            match transformer.transform(ticket.request.clone()).await {
                Ok(result) => {
                    if !lock_session(&session).complete(epoch, &result) {
                        debug!(epoch, "Discarding response for cleared session");
                        return Resolution::Discarded;
                    }
                    if let Err(e) = history.push(TransformHistoryItem::from_result(&result)).await {
                        warn!(error = %e, "Failed to record transform history");
                    }
                    Resolution::Applied(result)
                }
                Err(err) => {
                    if !lock_session(&session).fail(ticket, &err) {
                        debug!(epoch, "Discarding failure for cleared session");
                        return Resolution::Discarded;
                    }
                    warn!(status = err.status_code(), error = %err, "Transform failed");
                    Resolution::Failed(err)
                }
            }
        });

        Dispatch {
            handle,
            session: self.session.clone(),
            ticket: pending,
        }
    }
}

fn lock_session(session: &Mutex<Session>) -> MutexGuard<'_, Session> {
    session.lock().unwrap_or_else(|e| e.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use cartmanify_core::transform::{Emotion, TransformRequest};
    use cartmanify_memory::{HistoryLog, InMemoryStore, SensorPreference};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use tokio::sync::Notify;

    /// Replies "Cartman: <text>", optionally waiting for a release first.
    struct TestTransformer {
        gate: Option<Arc<Notify>>,
        failures: Mutex<Vec<TransformError>>,
        panic_once: AtomicBool,
        calls: AtomicUsize,
    }

    impl TestTransformer {
        fn instant() -> Self {
            Self {
                gate: None,
                failures: Mutex::new(Vec::new()),
                panic_once: AtomicBool::new(false),
                calls: AtomicUsize::new(0),
            }
        }

        fn gated(gate: Arc<Notify>) -> Self {
            Self {
                gate: Some(gate),
                ..Self::instant()
            }
        }

        fn failing_once(err: TransformError) -> Self {
            Self {
                failures: Mutex::new(vec![err]),
                ..Self::instant()
            }
        }

        fn panicking_once() -> Self {
            Self {
                panic_once: AtomicBool::new(true),
                ..Self::instant()
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Transformer for TestTransformer {
        async fn transform(
            &self,
            request: TransformRequest,
        ) -> Result<TransformResult, TransformError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            if self.panic_once.swap(false, Ordering::SeqCst) {
                panic!("transformer blew up");
            }
            if let Some(err) = self.failures.lock().unwrap().pop() {
                return Err(err);
            }
            Ok(TransformResult {
                transformed_text: format!("Cartman: {}", request.text),
                sensor_level: request.sensor_level.parse().unwrap(),
                original_text: request.text,
                emotion: Some(Emotion::Laughing),
            })
        }
    }

    struct Harness {
        orchestrator: SessionOrchestrator,
        transformer: Arc<TestTransformer>,
        store: InMemoryStore,
    }

    async fn harness(transformer: TestTransformer) -> Harness {
        let store = InMemoryStore::new();
        let history = HistoryLog::load(Arc::new(store.clone()), 5).await.unwrap();
        let preferences = SensorPreference::new(Arc::new(store.clone()));
        let transformer = Arc::new(transformer);
        let orchestrator = SessionOrchestrator::new(
            transformer.clone(),
            Arc::new(history),
            Arc::new(preferences),
        );
        orchestrator.start().await.unwrap();
        Harness {
            orchestrator,
            transformer,
            store,
        }
    }

    fn dispatched(outcome: SubmitOutcome) -> Dispatch {
        match outcome {
            SubmitOutcome::Dispatched(dispatch) => dispatch,
            SubmitOutcome::Rejected(msg) => panic!("rejected: {msg}"),
            SubmitOutcome::Busy => panic!("busy"),
        }
    }

    #[tokio::test]
    async fn successful_submit_logs_and_records_history() {
        let h = harness(TestTransformer::instant()).await;

        let resolution = dispatched(h.orchestrator.submit("Goodbye")).wait().await;
        assert!(matches!(resolution, Resolution::Applied(_)));

        let snapshot = h.orchestrator.snapshot();
        assert_eq!(snapshot.state, SessionState::Idle);
        assert_eq!(snapshot.messages.len(), 2);
        assert_eq!(snapshot.messages[1].content, "Cartman: Goodbye");
        assert_eq!(snapshot.messages[1].emotion, Some(Emotion::Laughing));

        let history = h.orchestrator.history().await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].original_text, "Goodbye");
    }

    #[tokio::test]
    async fn blank_submit_does_not_call_transformer() {
        let h = harness(TestTransformer::instant()).await;
        match h.orchestrator.submit("  \n") {
            SubmitOutcome::Rejected(msg) => {
                assert_eq!(msg, "Please enter some text to transform")
            }
            _ => panic!("expected rejection"),
        }
        assert_eq!(h.transformer.calls(), 0);
    }

    #[tokio::test]
    async fn six_transforms_keep_five_newest() {
        let h = harness(TestTransformer::instant()).await;
        for n in 1..=6 {
            let text = format!("message {n}");
            dispatched(h.orchestrator.submit(&text)).wait().await;
        }

        let history = h.orchestrator.history().await.unwrap();
        assert_eq!(history.len(), 5);
        assert_eq!(history[0].original_text, "message 6");
        assert_eq!(history[4].original_text, "message 2");
    }

    #[tokio::test]
    async fn submit_while_awaiting_is_ignored() {
        let gate = Arc::new(Notify::new());
        let h = harness(TestTransformer::gated(gate.clone())).await;

        let first = dispatched(h.orchestrator.submit("first"));
        assert!(matches!(h.orchestrator.submit("second"), SubmitOutcome::Busy));
        assert_eq!(h.orchestrator.snapshot().messages.len(), 1);

        gate.notify_one();
        first.wait().await;
        assert_eq!(h.orchestrator.snapshot().messages.len(), 2);
        assert_eq!(h.transformer.calls(), 1);
    }

    #[tokio::test]
    async fn clear_while_outstanding_discards_response() {
        let gate = Arc::new(Notify::new());
        let h = harness(TestTransformer::gated(gate.clone())).await;

        let pending = dispatched(h.orchestrator.submit("Goodbye"));
        h.orchestrator.clear();
        gate.notify_one();

        assert!(matches!(pending.wait().await, Resolution::Discarded));
        assert!(h.orchestrator.snapshot().messages.is_empty());
        assert!(h.orchestrator.history().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn failure_then_manual_retry() {
        let h = harness(TestTransformer::failing_once(TransformError::UpstreamRateLimited)).await;

        let resolution = dispatched(h.orchestrator.submit("Goodbye")).wait().await;
        assert!(matches!(resolution, Resolution::Failed(TransformError::UpstreamRateLimited)));

        let snapshot = h.orchestrator.snapshot();
        assert_eq!(snapshot.state, SessionState::Error);
        assert_eq!(
            snapshot.error.as_deref(),
            Some("Rate limit exceeded. Please try again later.")
        );
        assert_eq!(snapshot.messages.len(), 1);
        assert!(snapshot.can_retry);

        let resolution = h.orchestrator.retry().unwrap().wait().await;
        assert!(matches!(resolution, Resolution::Applied(_)));
        let snapshot = h.orchestrator.snapshot();
        assert_eq!(snapshot.messages.len(), 2);
        assert_eq!(snapshot.state, SessionState::Idle);
        assert_eq!(h.transformer.calls(), 2);
    }

    #[tokio::test]
    async fn sensor_level_is_persisted_and_restored() {
        let h = harness(TestTransformer::instant()).await;
        h.orchestrator.set_sensor_level(SensorLevel::Raw).await.unwrap();

        let history = HistoryLog::load(Arc::new(h.store.clone()), 5).await.unwrap();
        let restored = SessionOrchestrator::new(
            h.transformer.clone(),
            Arc::new(history),
            Arc::new(SensorPreference::new(Arc::new(h.store.clone()))),
        );
        assert_eq!(restored.sensor_level(), SensorLevel::Medium);
        restored.start().await.unwrap();
        assert_eq!(restored.sensor_level(), SensorLevel::Raw);
    }

    #[tokio::test]
    async fn select_history_replays_without_transform() {
        let h = harness(TestTransformer::instant()).await;
        h.orchestrator.set_sensor_level(SensorLevel::Mild).await.unwrap();
        dispatched(h.orchestrator.submit("Hello")).wait().await;
        h.orchestrator.set_sensor_level(SensorLevel::Raw).await.unwrap();
        h.orchestrator.clear();

        let id = h.orchestrator.history().await.unwrap()[0].id.clone();
        assert!(h.orchestrator.select_history(&id).await.unwrap());
        assert!(!h.orchestrator.select_history("missing").await.unwrap());

        let snapshot = h.orchestrator.snapshot();
        assert_eq!(snapshot.messages.len(), 2);
        assert_eq!(snapshot.messages[0].content, "Hello");
        assert_eq!(snapshot.messages[1].content, "Cartman: Hello");
        assert_eq!(snapshot.sensor_level, SensorLevel::Mild);
        assert_eq!(h.transformer.calls(), 1);

        let prefs = SensorPreference::new(Arc::new(h.store.clone()));
        assert_eq!(prefs.load_sensor_level().await.unwrap(), Some(SensorLevel::Mild));
    }

    #[tokio::test]
    async fn remove_and_clear_history() {
        let h = harness(TestTransformer::instant()).await;
        dispatched(h.orchestrator.submit("one")).wait().await;
        dispatched(h.orchestrator.submit("two")).wait().await;

        let id = h.orchestrator.history().await.unwrap()[0].id.clone();
        assert!(h.orchestrator.remove_history(&id).await.unwrap());
        assert_eq!(h.orchestrator.history().await.unwrap().len(), 1);

        h.orchestrator.clear_history().await.unwrap();
        assert!(h.orchestrator.history().await.unwrap().is_empty());
        // The conversation log is independent of history.
        assert_eq!(h.orchestrator.snapshot().messages.len(), 4);
    }

    #[tokio::test]
    async fn aborted_task_leaves_session_retryable() {
        let h = harness(TestTransformer::panicking_once()).await;

        let resolution = dispatched(h.orchestrator.submit("Hello")).wait().await;
        assert!(matches!(resolution, Resolution::Failed(TransformError::Upstream { .. })));
        assert_eq!(h.orchestrator.state(), SessionState::Error);

        let retried = h.orchestrator.retry().expect("retry after abort");
        assert!(matches!(retried.wait().await, Resolution::Applied(_)));
        assert_eq!(h.orchestrator.state(), SessionState::Idle);
        assert!(matches!(h.orchestrator.submit("again"), SubmitOutcome::Dispatched(_)));
    }

    #[tokio::test]
    async fn accepted_submit_clears_draft() {
        let h = harness(TestTransformer::instant()).await;
        h.orchestrator.set_draft("Goodbye");
        assert_eq!(h.orchestrator.snapshot().draft, "Goodbye");

        dispatched(h.orchestrator.submit("Goodbye")).wait().await;
        assert!(h.orchestrator.snapshot().draft.is_empty());
    }
}
