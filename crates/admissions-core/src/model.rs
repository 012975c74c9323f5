//! Core data model types for admissions.
//!
//! These are the records the wizard accumulates and the payloads it hands to
//! the `DataStore` collaborator.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Category of offering. Controls which registration fields apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgramType {
    Cohort,
    #[serde(rename = "ondemand")]
    OnDemand,
    Workshop,
}

impl ProgramType {
    /// Heading shown above the registration form.
    pub fn registration_title(&self) -> &'static str {
        match self {
            ProgramType::Cohort => "Cohort Registration",
            ProgramType::OnDemand => "On-Demand Learning Registration",
            ProgramType::Workshop => "Workshop Registration",
        }
    }
}

impl fmt::Display for ProgramType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgramType::Cohort => write!(f, "cohort"),
            ProgramType::OnDemand => write!(f, "ondemand"),
            ProgramType::Workshop => write!(f, "workshop"),
        }
    }
}

impl FromStr for ProgramType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cohort" => Ok(ProgramType::Cohort),
            "ondemand" | "on-demand" | "on_demand" => Ok(ProgramType::OnDemand),
            "workshop" => Ok(ProgramType::Workshop),
            other => Err(format!("unknown program type: {other}")),
        }
    }
}

/// Identifier assigned by the remote store.
///
/// Kept in whatever shape the server returned so it can be echoed back
/// verbatim when linking submissions and answers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Int(id) => write!(f, "{id}"),
            RecordId::Text(id) => f.write_str(id),
        }
    }
}

impl From<i64> for RecordId {
    fn from(id: i64) -> Self {
        RecordId::Int(id)
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        RecordId::Text(id.to_string())
    }
}

/// Cohort delivery mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeliveryMode {
    Online,
    Offline,
}

impl fmt::Display for DeliveryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryMode::Online => write!(f, "Online"),
            DeliveryMode::Offline => write!(f, "Offline"),
        }
    }
}

impl FromStr for DeliveryMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "online" => Ok(DeliveryMode::Online),
            "offline" => Ok(DeliveryMode::Offline),
            other => Err(format!("unknown mode: {other}")),
        }
    }
}

/// Program-specific registration details.
///
/// Each variant carries only the fields its program type requires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "program_type", rename_all = "lowercase")]
pub enum ProgramDetails {
    Cohort {
        course: String,
        slot: String,
        session_time: String,
        mode: DeliveryMode,
    },
    #[serde(rename = "ondemand")]
    OnDemand { course: Option<String> },
    Workshop { course: Option<String> },
}

impl ProgramDetails {
    pub fn program_type(&self) -> ProgramType {
        match self {
            ProgramDetails::Cohort { .. } => ProgramType::Cohort,
            ProgramDetails::OnDemand { .. } => ProgramType::OnDemand,
            ProgramDetails::Workshop { .. } => ProgramType::Workshop,
        }
    }

    pub fn course(&self) -> Option<&str> {
        match self {
            ProgramDetails::Cohort { course, .. } => Some(course),
            ProgramDetails::OnDemand { course } | ProgramDetails::Workshop { course } => {
                course.as_deref()
            }
        }
    }
}

/// A validated registration: identity, education, program details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Applicant {
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    pub college_name: String,
    pub year_of_passing: String,
    pub branch: String,
    pub program: ProgramDetails,
    #[serde(default)]
    pub referred_by: Option<String>,
}

/// The record the wizard grows as each step completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrollmentRecord {
    /// Server-assigned identifier, present once registration persisted.
    pub id: Option<RecordId>,
    pub program_type: ProgramType,
    /// Course picked on the course-selection step, if the plan has one.
    pub selected_course: Option<String>,
    pub applicant: Option<Applicant>,
}

impl Default for EnrollmentRecord {
    fn default() -> Self {
        Self {
            id: None,
            program_type: ProgramType::Cohort,
            selected_course: None,
            applicant: None,
        }
    }
}

impl EnrollmentRecord {
    pub fn full_name(&self) -> Option<&str> {
        self.applicant.as_ref().map(|a| a.full_name.as_str())
    }

    pub fn email(&self) -> Option<&str> {
        self.applicant.as_ref().map(|a| a.email.as_str())
    }
}

pub type QuestionId = i64;

/// What kind of answer a question expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum QuestionKind {
    /// Multiple choice over an ordered list of options.
    Mcq { options: Vec<String> },
    /// Free-form text with a minimum length.
    Text,
}

/// A server-supplied assessment question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub question_number: i32,
    pub text: String,
    pub kind: QuestionKind,
}

impl Question {
    pub fn is_mcq(&self) -> bool {
        matches!(self.kind, QuestionKind::Mcq { .. })
    }
}

/// Answers keyed by question id.
pub type AnswerSet = BTreeMap<QuestionId, String>;

/// Row sent to the store when a student registers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewStudent {
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    pub college_name: String,
    pub year_of_passing: String,
    pub branch: String,
    pub selected_slot: Option<String>,
    pub session_time: Option<String>,
    pub mode: Option<String>,
    pub specific_course: Option<String>,
    pub referred_by: Option<String>,
    pub program_type: ProgramType,
}

impl From<&Applicant> for NewStudent {
    fn from(applicant: &Applicant) -> Self {
        let (selected_slot, session_time, mode) = match &applicant.program {
            ProgramDetails::Cohort {
                slot,
                session_time,
                mode,
                ..
            } => (
                Some(slot.clone()),
                Some(session_time.clone()),
                Some(mode.to_string()),
            ),
            _ => (None, None, None),
        };

        Self {
            full_name: applicant.full_name.clone(),
            email: applicant.email.clone(),
            phone_number: applicant.phone_number.clone(),
            college_name: applicant.college_name.clone(),
            year_of_passing: applicant.year_of_passing.clone(),
            branch: applicant.branch.clone(),
            selected_slot,
            session_time,
            mode,
            specific_course: applicant.program.course().map(str::to_string),
            referred_by: applicant.referred_by.clone(),
            program_type: applicant.program.program_type(),
        }
    }
}

/// Row sent to the store when an assessment is submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSubmission {
    pub student_id: RecordId,
    pub total_questions: u32,
    pub duration_seconds: u64,
}

/// One persisted answer, with a snapshot of the question it answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRow {
    pub student_id: RecordId,
    pub submission_id: RecordId,
    pub question_id: QuestionId,
    pub student_name: String,
    pub student_email: String,
    pub question_number: i32,
    pub question_text: String,
    pub answer_text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn program_type_display_and_parse() {
        assert_eq!(ProgramType::OnDemand.to_string(), "ondemand");
        assert_eq!("cohort".parse::<ProgramType>().unwrap(), ProgramType::Cohort);
        assert_eq!(
            "On-Demand".parse::<ProgramType>().unwrap(),
            ProgramType::OnDemand
        );
        assert!("bootcamp".parse::<ProgramType>().is_err());
    }

    #[test]
    fn record_id_accepts_numbers_and_strings() {
        let int: RecordId = serde_json::from_str("42").unwrap();
        assert_eq!(int, RecordId::Int(42));
        let text: RecordId = serde_json::from_str("\"9b2c\"").unwrap();
        assert_eq!(text, RecordId::Text("9b2c".into()));
        assert_eq!(serde_json::to_string(&int).unwrap(), "42");
    }

    #[test]
    fn new_student_from_cohort_applicant() {
        let applicant = Applicant {
            full_name: "Ada Lovelace".into(),
            email: "ada@example.com".into(),
            phone_number: "+44 20 7946 0958".into(),
            college_name: "Analytical College".into(),
            year_of_passing: "2026".into(),
            branch: "Data Science".into(),
            program: ProgramDetails::Cohort {
                course: "Full Stack Web Development".into(),
                slot: "2nd February".into(),
                session_time: "Evening Session (5pm-6.30pm)".into(),
                mode: DeliveryMode::Offline,
            },
            referred_by: None,
        };

        let row = NewStudent::from(&applicant);
        assert_eq!(row.program_type, ProgramType::Cohort);
        assert_eq!(row.mode.as_deref(), Some("Offline"));
        assert_eq!(row.selected_slot.as_deref(), Some("2nd February"));
        assert_eq!(
            row.specific_course.as_deref(),
            Some("Full Stack Web Development")
        );

        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["program_type"], "cohort");
        assert!(json["referred_by"].is_null());
    }

    #[test]
    fn new_student_from_workshop_applicant_omits_cohort_fields() {
        let applicant = Applicant {
            full_name: "Grace Hopper".into(),
            email: "grace@example.com".into(),
            phone_number: "5551234567".into(),
            college_name: "Navy College".into(),
            year_of_passing: "2025".into(),
            branch: "Other".into(),
            program: ProgramDetails::Workshop {
                course: Some("Crochet".into()),
            },
            referred_by: Some("Ada".into()),
        };

        let row = NewStudent::from(&applicant);
        assert_eq!(row.program_type, ProgramType::Workshop);
        assert!(row.selected_slot.is_none());
        assert!(row.session_time.is_none());
        assert!(row.mode.is_none());
        assert_eq!(row.specific_course.as_deref(), Some("Crochet"));
    }
}
