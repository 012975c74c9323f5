//! Scriptable store for unit tests.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::model::{AnswerRow, NewStudent, NewSubmission, ProgramType, Question, RecordId};
use crate::traits::DataStore;

type Failure = Box<dyn Fn() -> StoreError + Send + Sync>;

/// Records every write and returns canned results.
pub(crate) struct FakeStore {
    slots: Vec<String>,
    slots_fail: bool,
    questions: Vec<Question>,
    questions_fail: bool,
    student_id: RecordId,
    submission_id: RecordId,
    student_failure: Option<Failure>,
    submission_failure: Option<Failure>,
    answer_failure: Option<Failure>,
    slot_calls: AtomicU32,
    students: Mutex<Vec<NewStudent>>,
    submissions: Mutex<Vec<NewSubmission>>,
    answers: Mutex<Vec<AnswerRow>>,
}

impl Default for FakeStore {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            slots_fail: false,
            questions: Vec::new(),
            questions_fail: false,
            student_id: RecordId::Int(1),
            submission_id: RecordId::Int(1),
            student_failure: None,
            submission_failure: None,
            answer_failure: None,
            slot_calls: AtomicU32::new(0),
            students: Mutex::new(Vec::new()),
            submissions: Mutex::new(Vec::new()),
            answers: Mutex::new(Vec::new()),
        }
    }
}

impl FakeStore {
    pub fn with_slots(mut self, slots: Vec<String>) -> Self {
        self.slots = slots;
        self
    }

    pub fn failing_slots(mut self) -> Self {
        self.slots_fail = true;
        self
    }

    pub fn with_questions(mut self, questions: Vec<Question>) -> Self {
        self.questions = questions;
        self
    }

    pub fn failing_questions(mut self) -> Self {
        self.questions_fail = true;
        self
    }

    pub fn with_student_id(mut self, id: RecordId) -> Self {
        self.student_id = id;
        self
    }

    pub fn with_submission_id(mut self, id: RecordId) -> Self {
        self.submission_id = id;
        self
    }

    pub fn failing_students(
        mut self,
        failure: impl Fn() -> StoreError + Send + Sync + 'static,
    ) -> Self {
        self.student_failure = Some(Box::new(failure));
        self
    }

    pub fn failing_submissions(
        mut self,
        failure: impl Fn() -> StoreError + Send + Sync + 'static,
    ) -> Self {
        self.submission_failure = Some(Box::new(failure));
        self
    }

    pub fn failing_answers(
        mut self,
        failure: impl Fn() -> StoreError + Send + Sync + 'static,
    ) -> Self {
        self.answer_failure = Some(Box::new(failure));
        self
    }

    pub fn slot_calls(&self) -> u32 {
        self.slot_calls.load(Ordering::Relaxed)
    }

    pub fn students(&self) -> Vec<NewStudent> {
        self.students.lock().unwrap().clone()
    }

    pub fn submissions(&self) -> Vec<NewSubmission> {
        self.submissions.lock().unwrap().clone()
    }

    pub fn answers(&self) -> Vec<AnswerRow> {
        self.answers.lock().unwrap().clone()
    }
}

#[async_trait]
impl DataStore for FakeStore {
    fn name(&self) -> &str {
        "fake"
    }

    async fn create_student(&self, student: &NewStudent) -> anyhow::Result<RecordId> {
        if let Some(fail) = &self.student_failure {
            return Err(fail().into());
        }
        self.students.lock().unwrap().push(student.clone());
        Ok(self.student_id.clone())
    }

    async fn list_active_questions(&self) -> anyhow::Result<Vec<Question>> {
        if self.questions_fail {
            return Err(StoreError::NetworkError("questions unavailable".into()).into());
        }
        Ok(self.questions.clone())
    }

    async fn create_submission(&self, submission: &NewSubmission) -> anyhow::Result<RecordId> {
        if let Some(fail) = &self.submission_failure {
            return Err(fail().into());
        }
        self.submissions.lock().unwrap().push(submission.clone());
        Ok(self.submission_id.clone())
    }

    async fn create_answers(&self, rows: &[AnswerRow]) -> anyhow::Result<()> {
        if let Some(fail) = &self.answer_failure {
            return Err(fail().into());
        }
        self.answers.lock().unwrap().extend_from_slice(rows);
        Ok(())
    }

    async fn list_time_slots(&self) -> anyhow::Result<Vec<String>> {
        self.slot_calls.fetch_add(1, Ordering::Relaxed);
        if self.slots_fail {
            return Err(StoreError::ApiError {
                status: 503,
                message: "slots unavailable".into(),
            }
            .into());
        }
        Ok(self.slots.clone())
    }
}

/// A minimal workshop registration row.
pub(crate) fn sample_student() -> NewStudent {
    NewStudent {
        full_name: "Ada Lovelace".into(),
        email: "ada@example.com".into(),
        phone_number: "9876543210".into(),
        college_name: "Analytical College".into(),
        year_of_passing: "2026".into(),
        branch: "Data Science".into(),
        selected_slot: None,
        session_time: None,
        mode: None,
        specific_course: Some("Crochet".into()),
        referred_by: None,
        program_type: ProgramType::Workshop,
    }
}
