//! The data store collaborator trait.
//!
//! Implemented by the `admissions-store` crate for the hosted REST backend and
//! for an in-memory store. Errors are `anyhow::Error` wrapping a
//! [`StoreError`](crate::error::StoreError) so callers can classify them.

use async_trait::async_trait;

use crate::model::{AnswerRow, NewStudent, NewSubmission, Question, RecordId};

/// Remote persistence used by the wizard steps.
///
/// The store owns id assignment and uniqueness enforcement; the wizard never
/// generates ids itself.
#[async_trait]
pub trait DataStore: Send + Sync {
    /// Human-readable store name (e.g. "rest").
    fn name(&self) -> &str;

    /// Insert a student row and return the id the store assigned.
    async fn create_student(&self, student: &NewStudent) -> anyhow::Result<RecordId>;

    /// Active questions ordered by question number.
    async fn list_active_questions(&self) -> anyhow::Result<Vec<Question>>;

    /// Insert a submission row and return its id.
    async fn create_submission(&self, submission: &NewSubmission) -> anyhow::Result<RecordId>;

    /// Insert all answer rows of one submission.
    async fn create_answers(&self, rows: &[AnswerRow]) -> anyhow::Result<()>;

    /// Cohort start slots configured on the server.
    async fn list_time_slots(&self) -> anyhow::Result<Vec<String>>;
}
