//! Observability hook at the store boundary.
//!
//! [`ObservedStore`] wraps any [`DataStore`] and reports every call to a
//! [`StoreObserver`]. The default observer emits `tracing` events.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::error::as_store_error;
use crate::model::{AnswerRow, NewStudent, NewSubmission, Question, RecordId};
use crate::traits::DataStore;

/// Which store call is being made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    CreateStudent,
    ListQuestions,
    CreateSubmission,
    CreateAnswers,
    ListTimeSlots,
}

impl fmt::Display for StoreOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StoreOp::CreateStudent => "create_student",
            StoreOp::ListQuestions => "list_active_questions",
            StoreOp::CreateSubmission => "create_submission",
            StoreOp::CreateAnswers => "create_answers",
            StoreOp::ListTimeSlots => "list_time_slots",
        };
        f.write_str(name)
    }
}

/// Receives one callback per store call.
pub trait StoreObserver: Send + Sync {
    fn on_call_start(&self, store: &str, op: StoreOp);
    fn on_call_complete(&self, store: &str, op: StoreOp, elapsed: Duration);
    fn on_call_error(&self, store: &str, op: StoreOp, elapsed: Duration, error: &anyhow::Error);
}

/// No-op observer.
pub struct NoopObserver;

impl StoreObserver for NoopObserver {
    fn on_call_start(&self, _: &str, _: StoreOp) {}
    fn on_call_complete(&self, _: &str, _: StoreOp, _: Duration) {}
    fn on_call_error(&self, _: &str, _: StoreOp, _: Duration, _: &anyhow::Error) {}
}

/// Structured `tracing` events for each call.
pub struct TracingObserver;

impl StoreObserver for TracingObserver {
    fn on_call_start(&self, store: &str, op: StoreOp) {
        tracing::debug!(store, %op, "store call started");
    }

    fn on_call_complete(&self, store: &str, op: StoreOp, elapsed: Duration) {
        tracing::info!(
            store,
            %op,
            elapsed_ms = elapsed.as_millis() as u64,
            "store call succeeded"
        );
    }

    fn on_call_error(&self, store: &str, op: StoreOp, elapsed: Duration, error: &anyhow::Error) {
        let permanent = as_store_error(error).is_some_and(|e| e.is_permanent());
        tracing::warn!(
            store,
            %op,
            elapsed_ms = elapsed.as_millis() as u64,
            permanent,
            error = %error,
            "store call failed"
        );
    }
}

/// A store wrapper that reports every call.
pub struct ObservedStore<S> {
    inner: S,
    observer: Arc<dyn StoreObserver>,
}

impl<S: DataStore> ObservedStore<S> {
    pub fn new(inner: S, observer: Arc<dyn StoreObserver>) -> Self {
        Self { inner, observer }
    }

    /// Wrap with the default tracing observer.
    pub fn traced(inner: S) -> Self {
        Self::new(inner, Arc::new(TracingObserver))
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    async fn observe<T, F>(&self, op: StoreOp, call: F) -> anyhow::Result<T>
    where
        F: std::future::Future<Output = anyhow::Result<T>>,
    {
        let name = self.inner.name();
        self.observer.on_call_start(name, op);
        let start = Instant::now();
        let result = call.await;
        let elapsed = start.elapsed();
        match &result {
            Ok(_) => self.observer.on_call_complete(name, op, elapsed),
            Err(e) => self.observer.on_call_error(name, op, elapsed, e),
        }
        result
    }
}

#[async_trait]
impl<S: DataStore> DataStore for ObservedStore<S> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn create_student(&self, student: &NewStudent) -> anyhow::Result<RecordId> {
        self.observe(StoreOp::CreateStudent, self.inner.create_student(student))
            .await
    }

    async fn list_active_questions(&self) -> anyhow::Result<Vec<Question>> {
        self.observe(StoreOp::ListQuestions, self.inner.list_active_questions())
            .await
    }

    async fn create_submission(&self, submission: &NewSubmission) -> anyhow::Result<RecordId> {
        self.observe(
            StoreOp::CreateSubmission,
            self.inner.create_submission(submission),
        )
        .await
    }

    async fn create_answers(&self, rows: &[AnswerRow]) -> anyhow::Result<()> {
        self.observe(StoreOp::CreateAnswers, self.inner.create_answers(rows))
            .await
    }

    async fn list_time_slots(&self) -> anyhow::Result<Vec<String>> {
        self.observe(StoreOp::ListTimeSlots, self.inner.list_time_slots())
            .await
    }
}
