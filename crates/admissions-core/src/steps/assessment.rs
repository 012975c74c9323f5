//! The timed assessment step.
//!
//! Fetches the active questions, shows them in interleaved order, and on
//! submit writes one submission row followed by one answer row per question.

use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;
use tracing::instrument;

use crate::model::{
    AnswerRow, AnswerSet, EnrollmentRecord, NewSubmission, Question, QuestionId, QuestionKind,
};
use crate::order::interleave_questions;
use crate::steps::{InFlight, SubmitError};
use crate::traits::DataStore;
use crate::validate::{has_min_chars, is_present, FieldErrors, MIN_TEXT_ANSWER_CHARS};

pub const ANSWER_REQUIRED_MESSAGE: &str = "This question requires an answer";
pub const ANSWER_TOO_SHORT_MESSAGE: &str =
    "Please provide a more detailed answer (minimum 50 characters)";

/// The question list could not be prepared.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LoadError {
    #[error("No questions found. Please add questions to the database.")]
    NoQuestions,

    #[error("Failed to load questions: {0}")]
    Fetch(String),
}

/// An answer could not be recorded.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AnswerError {
    #[error("unknown question id {0}")]
    UnknownQuestion(QuestionId),

    #[error("'{answer}' is not an option for question {question}")]
    NotAnOption { question: QuestionId, answer: String },
}

/// Whole seconds elapsed, rounded down.
pub fn duration_seconds(elapsed: Duration) -> u64 {
    elapsed.as_secs()
}

/// The assessment step.
#[derive(Debug)]
pub struct AssessmentStep {
    questions: Vec<Question>,
    answers: AnswerSet,
    errors: FieldErrors<QuestionId>,
    banner: Option<String>,
    submitting: bool,
    started: Instant,
}

impl AssessmentStep {
    /// Fetch active questions and start the clock.
    #[instrument(skip_all, fields(store = store.name()))]
    pub async fn load(store: &dyn DataStore) -> Result<Self, LoadError> {
        let questions = store.list_active_questions().await.map_err(|e| {
            tracing::error!(error = %e, "failed to fetch questions");
            LoadError::Fetch(e.to_string())
        })?;
        tracing::info!(count = questions.len(), "questions loaded");
        Self::from_questions(questions)
    }

    /// Prepare the step from an already fetched question list.
    pub fn from_questions(questions: Vec<Question>) -> Result<Self, LoadError> {
        if questions.is_empty() {
            return Err(LoadError::NoQuestions);
        }
        let questions = interleave_questions(questions);
        let answers = questions.iter().map(|q| (q.id, String::new())).collect();

        Ok(Self {
            questions,
            answers,
            errors: FieldErrors::new(),
            banner: None,
            submitting: false,
            started: Instant::now(),
        })
    }

    /// Questions in display order.
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn answer(&self, id: QuestionId) -> Option<&str> {
        self.answers.get(&id).map(String::as_str)
    }

    /// Record an answer and clear that question's error.
    pub fn set_answer(
        &mut self,
        id: QuestionId,
        value: impl Into<String>,
    ) -> Result<(), AnswerError> {
        let value = value.into();
        let question = self
            .questions
            .iter()
            .find(|q| q.id == id)
            .ok_or(AnswerError::UnknownQuestion(id))?;

        if let QuestionKind::Mcq { options } = &question.kind {
            if !value.is_empty() && !options.contains(&value) {
                return Err(AnswerError::NotAnOption {
                    question: id,
                    answer: value,
                });
            }
        }

        self.answers.insert(id, value);
        self.errors.clear(&id);
        Ok(())
    }

    pub fn answered_count(&self) -> usize {
        self.answers.values().filter(|a| is_present(a)).count()
    }

    /// The submit control is enabled once something is answered and no
    /// request is pending.
    pub fn can_submit(&self) -> bool {
        self.answered_count() > 0 && !self.submitting
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn errors(&self) -> &FieldErrors<QuestionId> {
        &self.errors
    }

    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    /// Time since the question list became ready.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Check every answer. Replaces previous errors.
    pub fn validate(&mut self) -> bool {
        let mut errors = FieldErrors::new();
        for question in &self.questions {
            let answer = self.answers.get(&question.id).map(String::as_str).unwrap_or("");
            if !is_present(answer) {
                errors.insert(question.id, ANSWER_REQUIRED_MESSAGE);
            } else if question.kind == QuestionKind::Text
                && !has_min_chars(answer, MIN_TEXT_ANSWER_CHARS)
            {
                errors.insert(question.id, ANSWER_TOO_SHORT_MESSAGE);
            }
        }
        self.banner = None;
        self.errors = errors;
        self.errors.is_empty()
    }

    /// Validate and persist the answers for the registered student.
    ///
    /// Nothing is written when the record has no id. A failure on either
    /// write leaves the step active with a banner so the user can retry.
    #[instrument(skip_all, fields(store = store.name(), questions = self.questions.len()))]
    pub async fn submit(
        &mut self,
        record: &EnrollmentRecord,
        store: &dyn DataStore,
    ) -> Result<AnswerSet, SubmitError> {
        if self.submitting {
            return Err(SubmitError::InFlight);
        }
        if !self.validate() {
            return Err(SubmitError::Invalid(self.errors.len()));
        }
        let Some(student_id) = record.id.clone() else {
            tracing::error!("assessment submitted without a registered student");
            self.banner = Some(format!("System Error: {}", super::MISSING_STUDENT_MESSAGE));
            return Err(SubmitError::MissingStudent);
        };

        let duration = duration_seconds(self.elapsed());
        tracing::info!(%student_id, duration_seconds = duration, "submitting assessment");

        let submission = NewSubmission {
            student_id: student_id.clone(),
            total_questions: self.questions.len() as u32,
            duration_seconds: duration,
        };
        let student_name = record.full_name().unwrap_or("Unknown").to_string();
        let student_email = record.email().unwrap_or("unknown@email.com").to_string();

        let result = {
            let _in_flight = InFlight::begin(&mut self.submitting)?;
            write_submission(
                store,
                &submission,
                &self.questions,
                &self.answers,
                &student_name,
                &student_email,
            )
            .await
        };

        match result {
            Ok(rows) => {
                tracing::info!(rows, "assessment saved");
                Ok(self.answers.clone())
            }
            Err(message) => {
                tracing::error!(error = %message, "failed to save assessment");
                let message = format!("Error: {message}");
                self.banner = Some(message.clone());
                Err(SubmitError::Store(message))
            }
        }
    }
}

async fn write_submission(
    store: &dyn DataStore,
    submission: &NewSubmission,
    questions: &[Question],
    answers: &AnswerSet,
    student_name: &str,
    student_email: &str,
) -> Result<usize, String> {
    let submission_id = store
        .create_submission(submission)
        .await
        .map_err(|e| format!("Failed to create submission record: {e}"))?;

    let rows: Vec<AnswerRow> = questions
        .iter()
        .map(|q| AnswerRow {
            student_id: submission.student_id.clone(),
            submission_id: submission_id.clone(),
            question_id: q.id,
            student_name: student_name.to_string(),
            student_email: student_email.to_string(),
            question_number: q.question_number,
            question_text: q.text.clone(),
            answer_text: answers.get(&q.id).cloned().unwrap_or_default(),
        })
        .collect();

    store
        .create_answers(&rows)
        .await
        .map_err(|e| format!("Failed to save answers: {e}"))?;

    Ok(rows.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::model::{Applicant, DeliveryMode, ProgramDetails, RecordId};
    use crate::testing::FakeStore;

    fn mcq(id: i64) -> Question {
        Question {
            id,
            question_number: id as i32,
            text: format!("Pick one ({id})"),
            kind: QuestionKind::Mcq {
                options: vec!["A".into(), "B".into(), "C".into()],
            },
        }
    }

    fn text(id: i64) -> Question {
        Question {
            id,
            question_number: id as i32,
            text: format!("Describe a situation ({id})"),
            kind: QuestionKind::Text,
        }
    }

    fn long_answer() -> String {
        "I organised a study group, split the syllabus, and we all passed.".into()
    }

    fn registered(id: i64) -> EnrollmentRecord {
        EnrollmentRecord {
            id: Some(RecordId::Int(id)),
            applicant: Some(Applicant {
                full_name: "Ada Lovelace".into(),
                email: "ada@example.com".into(),
                phone_number: "9876543210".into(),
                college_name: "Analytical College".into(),
                year_of_passing: "2026".into(),
                branch: "Data Science".into(),
                program: ProgramDetails::Cohort {
                    course: "Full Stack Web Development".into(),
                    slot: "19th January".into(),
                    session_time: "Morning Session (10am-11.30am)".into(),
                    mode: DeliveryMode::Online,
                },
                referred_by: None,
            }),
            ..Default::default()
        }
    }

    fn answer_all(step: &mut AssessmentStep) {
        let ids: Vec<(QuestionId, bool)> =
            step.questions().iter().map(|q| (q.id, q.is_mcq())).collect();
        for (id, is_mcq) in ids {
            let value = if is_mcq { "B".to_string() } else { long_answer() };
            step.set_answer(id, value).unwrap();
        }
    }

    #[tokio::test]
    async fn load_interleaves_and_initialises_answers() {
        let store = FakeStore::default().with_questions(vec![
            mcq(1),
            mcq(2),
            text(3),
            mcq(4),
            mcq(5),
            text(6),
            text(7),
        ]);
        let step = AssessmentStep::load(&store).await.unwrap();
        let ids: Vec<i64> = step.questions().iter().map(|q| q.id).collect();
        assert_eq!(ids, vec![1, 2, 4, 3, 6, 5, 7]);
        assert_eq!(step.answer(3), Some(""));
        assert_eq!(step.answered_count(), 0);
        assert!(!step.can_submit());
    }

    #[tokio::test]
    async fn load_reports_empty_and_failed_fetches() {
        let empty = FakeStore::default();
        assert_eq!(
            AssessmentStep::load(&empty).await.unwrap_err(),
            LoadError::NoQuestions
        );

        let broken = FakeStore::default().failing_questions();
        assert!(matches!(
            AssessmentStep::load(&broken).await.unwrap_err(),
            LoadError::Fetch(_)
        ));
    }

    #[test]
    fn set_answer_rejects_unknown_ids_and_options() {
        let mut step = AssessmentStep::from_questions(vec![mcq(1), text(2)]).unwrap();
        assert_eq!(
            step.set_answer(99, "x"),
            Err(AnswerError::UnknownQuestion(99))
        );
        assert_eq!(
            step.set_answer(1, "Z"),
            Err(AnswerError::NotAnOption {
                question: 1,
                answer: "Z".into(),
            })
        );
        step.set_answer(1, "C").unwrap();
        assert_eq!(step.answered_count(), 1);
        assert!(step.can_submit());
    }

    #[test]
    fn text_answers_need_fifty_characters() {
        let mut step = AssessmentStep::from_questions(vec![text(1), text(2)]).unwrap();
        step.set_answer(1, format!("  {}  ", "a".repeat(49))).unwrap();
        step.set_answer(2, "b".repeat(50)).unwrap();
        assert!(!step.validate());
        assert_eq!(step.errors().get(&1), Some(ANSWER_TOO_SHORT_MESSAGE));
        assert!(!step.errors().contains(&2));

        step.set_answer(1, "a".repeat(50)).unwrap();
        assert!(!step.errors().contains(&1));
        assert!(step.validate());
    }

    #[test]
    fn unanswered_mcq_is_required() {
        let mut step = AssessmentStep::from_questions(vec![mcq(1)]).unwrap();
        assert!(!step.validate());
        assert_eq!(step.errors().get(&1), Some(ANSWER_REQUIRED_MESSAGE));
    }

    #[tokio::test]
    async fn missing_student_id_blocks_without_writing() {
        let store = FakeStore::default();
        let mut step = AssessmentStep::from_questions(vec![mcq(1), text(2)]).unwrap();
        answer_all(&mut step);

        let err = step
            .submit(&EnrollmentRecord::default(), &store)
            .await
            .unwrap_err();
        assert_eq!(err, SubmitError::MissingStudent);
        assert!(step.banner().unwrap().contains("restart registration"));
        assert!(store.submissions().is_empty());
        assert!(store.answers().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn submit_links_every_row_and_records_duration() {
        let store = FakeStore::default().with_submission_id(RecordId::Int(900));
        let mut step =
            AssessmentStep::from_questions(vec![mcq(1), text(2), mcq(3)]).unwrap();
        answer_all(&mut step);
        tokio::time::advance(Duration::from_millis(95_400)).await;

        let answers = step.submit(&registered(12), &store).await.unwrap();
        assert_eq!(answers.len(), 3);

        let submissions = store.submissions();
        assert_eq!(submissions.len(), 1);
        assert_eq!(submissions[0].student_id, RecordId::Int(12));
        assert_eq!(submissions[0].total_questions, 3);
        assert_eq!(submissions[0].duration_seconds, 95);

        let rows = store.answers();
        assert_eq!(rows.len(), 3);
        for row in &rows {
            assert_eq!(row.student_id, RecordId::Int(12));
            assert_eq!(row.submission_id, RecordId::Int(900));
            assert_eq!(row.student_email, "ada@example.com");
        }
        let text_row = rows.iter().find(|r| r.question_id == 2).unwrap();
        assert_eq!(text_row.question_text, "Describe a situation (2)");
        assert_eq!(text_row.answer_text, long_answer());
        assert!(!step.is_submitting());
    }

    #[tokio::test]
    async fn failed_submission_write_is_reported_once() {
        let store = FakeStore::default()
            .failing_submissions(|| StoreError::ApiError {
                status: 500,
                message: "boom".into(),
            });
        let mut step = AssessmentStep::from_questions(vec![mcq(1)]).unwrap();
        answer_all(&mut step);

        let err = step.submit(&registered(5), &store).await.unwrap_err();
        assert_eq!(
            err,
            SubmitError::Store(
                "Error: Failed to create submission record: API error (HTTP 500): boom".into()
            )
        );
        assert!(store.answers().is_empty());
        assert!(!step.is_submitting());
        assert!(step.can_submit());
    }

    #[tokio::test]
    async fn failed_answer_write_is_not_success() {
        let store =
            FakeStore::default().failing_answers(|| StoreError::Timeout(30));
        let mut step = AssessmentStep::from_questions(vec![mcq(1), text(2)]).unwrap();
        answer_all(&mut step);

        let err = step.submit(&registered(5), &store).await.unwrap_err();
        assert!(matches!(err, SubmitError::Store(ref m) if m.contains("Failed to save answers")));
        assert!(step.banner().is_some());
        assert_eq!(step.answer(1), Some("B"));
    }
}
