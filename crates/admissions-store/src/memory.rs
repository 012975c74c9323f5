//! In-memory store for demos and tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use admissions_core::catalog::DEFAULT_TIME_SLOTS;
use admissions_core::error::StoreError;
use admissions_core::model::{
    AnswerRow, NewStudent, NewSubmission, Question, QuestionKind, RecordId,
};
use admissions_core::observe::StoreOp;
use admissions_core::traits::DataStore;

/// How the store assigns ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdStyle {
    /// 1, 2, 3, ... from one counter shared by every table.
    #[default]
    Sequential,
    /// Random v4 uuids.
    Uuid,
}

/// A row together with its server-side metadata.
#[derive(Debug, Clone)]
pub struct Stored<T> {
    pub id: RecordId,
    pub created_at: DateTime<Utc>,
    pub row: T,
}

#[derive(Default)]
struct Tables {
    students: Vec<Stored<NewStudent>>,
    submissions: Vec<Stored<NewSubmission>>,
    answers: Vec<Stored<AnswerRow>>,
}

/// A store that keeps every row in memory and enforces unique emails.
#[derive(Default)]
pub struct MemoryStore {
    questions: Vec<Question>,
    slots: Vec<String>,
    id_style: IdStyle,
    next_id: AtomicI64,
    tables: Mutex<Tables>,
    failures: Mutex<HashMap<StoreOp, StoreError>>,
}

impl MemoryStore {
    pub fn new(questions: Vec<Question>, slots: Vec<String>) -> Self {
        Self {
            questions,
            slots,
            ..Default::default()
        }
    }

    /// A store seeded with a sample question bank and the default slots.
    pub fn demo() -> Self {
        let slots = DEFAULT_TIME_SLOTS.iter().map(|s| s.to_string()).collect();
        Self::new(demo_questions(), slots)
    }

    pub fn with_id_style(mut self, style: IdStyle) -> Self {
        self.id_style = style;
        self
    }

    /// Make the next call of `op` fail with `error`.
    pub fn fail_next(&self, op: StoreOp, error: StoreError) {
        self.failures.lock().unwrap().insert(op, error);
    }

    pub fn students(&self) -> Vec<Stored<NewStudent>> {
        self.tables.lock().unwrap().students.clone()
    }

    pub fn submissions(&self) -> Vec<Stored<NewSubmission>> {
        self.tables.lock().unwrap().submissions.clone()
    }

    pub fn answers(&self) -> Vec<Stored<AnswerRow>> {
        self.tables.lock().unwrap().answers.clone()
    }

    fn injected(&self, op: StoreOp) -> Result<(), StoreError> {
        match self.failures.lock().unwrap().remove(&op) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn assign_id(&self) -> RecordId {
        match self.id_style {
            IdStyle::Sequential => RecordId::Int(self.next_id.fetch_add(1, Ordering::Relaxed) + 1),
            IdStyle::Uuid => RecordId::Text(uuid::Uuid::new_v4().to_string()),
        }
    }

    fn stored<T>(&self, row: T) -> Stored<T> {
        Stored {
            id: self.assign_id(),
            created_at: Utc::now(),
            row,
        }
    }
}

#[async_trait]
impl DataStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn create_student(&self, student: &NewStudent) -> anyhow::Result<RecordId> {
        self.injected(StoreOp::CreateStudent)?;
        let mut tables = self.tables.lock().unwrap();
        if tables.students.iter().any(|s| s.row.email == student.email) {
            return Err(StoreError::UniqueViolation {
                constraint: Some("students_email_key".into()),
                message: "duplicate key value violates unique constraint \"students_email_key\""
                    .into(),
            }
            .into());
        }
        let stored = self.stored(student.clone());
        let id = stored.id.clone();
        tables.students.push(stored);
        Ok(id)
    }

    async fn list_active_questions(&self) -> anyhow::Result<Vec<Question>> {
        self.injected(StoreOp::ListQuestions)?;
        let mut questions = self.questions.clone();
        questions.sort_by_key(|q| q.question_number);
        Ok(questions)
    }

    async fn create_submission(&self, submission: &NewSubmission) -> anyhow::Result<RecordId> {
        self.injected(StoreOp::CreateSubmission)?;
        let mut tables = self.tables.lock().unwrap();
        if !tables.students.iter().any(|s| s.id == submission.student_id) {
            return Err(StoreError::ApiError {
                status: 409,
                message: format!("student {} does not exist", submission.student_id),
            }
            .into());
        }
        let stored = self.stored(submission.clone());
        let id = stored.id.clone();
        tables.submissions.push(stored);
        Ok(id)
    }

    async fn create_answers(&self, rows: &[AnswerRow]) -> anyhow::Result<()> {
        self.injected(StoreOp::CreateAnswers)?;
        let mut tables = self.tables.lock().unwrap();
        let stored: Vec<_> = rows.iter().map(|row| self.stored(row.clone())).collect();
        tables.answers.extend(stored);
        Ok(())
    }

    async fn list_time_slots(&self) -> anyhow::Result<Vec<String>> {
        self.injected(StoreOp::ListTimeSlots)?;
        Ok(self.slots.clone())
    }
}

fn mcq(id: i64, text: &str, options: &[&str]) -> Question {
    Question {
        id,
        question_number: id as i32,
        text: text.to_string(),
        kind: QuestionKind::Mcq {
            options: options.iter().map(|o| o.to_string()).collect(),
        },
    }
}

fn text(id: i64, text: &str) -> Question {
    Question {
        id,
        question_number: id as i32,
        text: text.to_string(),
        kind: QuestionKind::Text,
    }
}

/// Sample question bank used by `--demo`.
pub fn demo_questions() -> Vec<Question> {
    vec![
        mcq(
            1,
            "How comfortable are you with HTML and CSS?",
            &["Never used them", "Built a simple page", "Built several sites"],
        ),
        mcq(
            2,
            "Which of these have you used to store data?",
            &["Spreadsheets", "SQL databases", "NoSQL databases", "None"],
        ),
        text(
            3,
            "Tell us about something you built or learned on your own and how you went about it.",
        ),
        mcq(
            4,
            "How many hours per week can you commit to the program?",
            &["Less than 5", "5 to 10", "10 to 20", "More than 20"],
        ),
        mcq(
            5,
            "What best describes your current status?",
            &["Student", "Working professional", "Between jobs"],
        ),
        text(
            6,
            "Describe a time you got stuck on a problem. What did you do to get unstuck?",
        ),
        text(7, "What do you hope to be doing one year after this program?"),
    ]
}
