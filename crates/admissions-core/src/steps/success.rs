//! The confirmation shown once the wizard is done.

use crate::model::{EnrollmentRecord, ProgramType};
use crate::wizard::{Step, Wizard};

/// Text of the final screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuccessSummary {
    pub headline: &'static str,
    pub message: String,
    pub next_steps: Vec<&'static str>,
    pub reference: Option<String>,
}

impl SuccessSummary {
    /// Summary for a finished wizard; the assessment headline needs an
    /// `Assess` step in the plan.
    pub fn for_wizard(wizard: &Wizard) -> Self {
        Self::for_record(wizard.record(), wizard.plan().contains(Step::Assess))
    }

    pub fn for_record(record: &EnrollmentRecord, assessed: bool) -> Self {
        let name = record.full_name().unwrap_or("there");
        let reference = record.id.as_ref().map(ToString::to_string);

        match record.program_type {
            ProgramType::Cohort if assessed => Self {
                headline: "Assessment Submitted Successfully!",
                message: format!(
                    "Thank you, {name}. Your responses have been recorded and will be reviewed by our team."
                ),
                next_steps: vec![
                    "Team reviews responses",
                    "Email in 3-5 business days",
                    "If selected, enrollment info sent",
                ],
                reference,
            },
            _ => Self {
                headline: "Registration Completed Successfully!",
                message: format!("Thank you, {name}. Your registration has been received."),
                next_steps: vec![
                    "Confirmation email with joining details",
                    "Check your spam folder if you don't see our email",
                ],
                reference,
            },
        }
    }
}
