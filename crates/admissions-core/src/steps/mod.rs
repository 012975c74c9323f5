//! Step components.
//!
//! Each step owns its own form state and validation. On success it yields a
//! [`StepOutput`](crate::wizard::StepOutput) or a record for the wizard to
//! merge; it never mutates wizard state directly.

pub mod assessment;
pub mod program;
pub mod registration;
pub mod success;

pub use assessment::{AnswerError, AssessmentStep, LoadError};
pub use program::{CourseSelection, ProgramSelection, SelectionError};
pub use registration::{Field, RegistrationForm, RegistrationStep};
pub use success::SuccessSummary;

use thiserror::Error;

/// Message shown when assessment answers cannot be linked to a student.
pub const MISSING_STUDENT_MESSAGE: &str =
    "Student identification missing. Please restart registration and try again.";

/// Why a step refused or failed to submit.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmitError {
    /// Field validation failed; details are in the step's error map.
    #[error("{0} field(s) need attention")]
    Invalid(usize),

    /// A previous submit has not resolved yet.
    #[error("a submission is already in progress")]
    InFlight,

    /// The store rejected a field value (duplicate email).
    #[error("{0}")]
    Rejected(String),

    /// Any other store failure. The form keeps its values for a retry.
    #[error("{0}")]
    Store(String),

    /// The assessment has no student record to attach to.
    #[error("{}", MISSING_STUDENT_MESSAGE)]
    MissingStudent,
}

/// Holds a step's submitting flag up for the life of one request.
///
/// Dropping the guard clears the flag, including when the request future is
/// cancelled.
pub(crate) struct InFlight<'a> {
    flag: &'a mut bool,
}

impl<'a> InFlight<'a> {
    pub(crate) fn begin(flag: &'a mut bool) -> Result<Self, SubmitError> {
        if *flag {
            return Err(SubmitError::InFlight);
        }
        *flag = true;
        Ok(Self { flag })
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        *self.flag = false;
    }
}
