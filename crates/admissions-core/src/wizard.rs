//! The wizard controller.
//!
//! Owns the enrollment state and moves through an ordered [`StepPlan`].
//! Steps never touch the state directly: they hand a [`StepOutput`] back and
//! the controller merges it and advances.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{AnswerSet, EnrollmentRecord, ProgramType};

/// One screen of the wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Step {
    SelectProgram,
    SelectCourse,
    Register,
    Assess,
    Done,
}

impl Step {
    /// Label shown in the progress header.
    pub fn label(&self) -> &'static str {
        match self {
            Step::SelectProgram => "Program Selection",
            Step::SelectCourse => "Course Selection",
            Step::Register => "Registration Details",
            Step::Assess => "Skill Assessment",
            Step::Done => "Completion",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::SelectProgram => "select-program",
            Step::SelectCourse => "select-course",
            Step::Register => "register",
            Step::Assess => "assess",
            Step::Done => "done",
        };
        f.write_str(name)
    }
}

/// Errors raised by controller transitions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WizardError {
    #[error("invalid step plan: {0}")]
    InvalidPlan(String),

    #[error("step '{step}' cannot accept {output} output")]
    UnexpectedOutput { step: Step, output: &'static str },

    #[error("cannot go back from step '{0}'")]
    BackNotAllowed(Step),

    #[error("registration completed without a student id")]
    MissingStudentId,

    #[error("the wizard is finished")]
    Finished,
}

/// Ordered list of steps the wizard walks through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Step>", into = "Vec<Step>")]
pub struct StepPlan {
    steps: Vec<Step>,
}

impl StepPlan {
    /// Validate and build a plan.
    ///
    /// A plan starts with program selection, ends with `Done`, registers
    /// exactly once, and only assesses after registering.
    pub fn new(steps: Vec<Step>) -> Result<Self, WizardError> {
        if steps.first() != Some(&Step::SelectProgram) {
            return Err(WizardError::InvalidPlan(
                "plan must start with select-program".into(),
            ));
        }
        if steps.last() != Some(&Step::Done) {
            return Err(WizardError::InvalidPlan("plan must end with done".into()));
        }
        for (i, step) in steps.iter().enumerate() {
            if steps[..i].contains(step) {
                return Err(WizardError::InvalidPlan(format!(
                    "step '{step}' appears more than once"
                )));
            }
        }
        let register = steps
            .iter()
            .position(|s| *s == Step::Register)
            .ok_or_else(|| WizardError::InvalidPlan("plan must include register".into()))?;
        if let Some(assess) = steps.iter().position(|s| *s == Step::Assess) {
            if assess < register {
                return Err(WizardError::InvalidPlan(
                    "assess must come after register".into(),
                ));
            }
        }
        if let Some(course) = steps.iter().position(|s| *s == Step::SelectCourse) {
            if course > register {
                return Err(WizardError::InvalidPlan(
                    "select-course must come before register".into(),
                ));
            }
        }
        Ok(Self { steps })
    }

    /// Program, course, registration, assessment, done.
    pub fn full() -> Self {
        Self {
            steps: vec![
                Step::SelectProgram,
                Step::SelectCourse,
                Step::Register,
                Step::Assess,
                Step::Done,
            ],
        }
    }

    /// Course choice folded into the registration form.
    pub fn compact() -> Self {
        Self {
            steps: vec![Step::SelectProgram, Step::Register, Step::Assess, Step::Done],
        }
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn contains(&self, step: Step) -> bool {
        self.steps.contains(&step)
    }
}

impl Default for StepPlan {
    fn default() -> Self {
        Self::full()
    }
}

impl TryFrom<Vec<Step>> for StepPlan {
    type Error = WizardError;

    fn try_from(steps: Vec<Step>) -> Result<Self, Self::Error> {
        Self::new(steps)
    }
}

impl From<StepPlan> for Vec<Step> {
    fn from(plan: StepPlan) -> Self {
        plan.steps
    }
}

/// Completed payload handed back by a step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutput {
    Program(ProgramType),
    Course(String),
    Registered(EnrollmentRecord),
    Assessed(AnswerSet),
}

impl StepOutput {
    fn kind(&self) -> &'static str {
        match self {
            StepOutput::Program(_) => "program",
            StepOutput::Course(_) => "course",
            StepOutput::Registered(_) => "registration",
            StepOutput::Assessed(_) => "assessment",
        }
    }
}

/// Everything the wizard has collected so far.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WizardState {
    pub step_index: usize,
    pub record: EnrollmentRecord,
    pub answers: AnswerSet,
}

/// Progress header model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// 1-based position among the numbered steps.
    pub position: usize,
    pub total: usize,
    pub label: &'static str,
}

/// The wizard controller.
#[derive(Debug, Clone, Default)]
pub struct Wizard {
    plan: StepPlan,
    state: WizardState,
}

impl Wizard {
    pub fn new(plan: StepPlan) -> Self {
        Self {
            plan,
            state: WizardState::default(),
        }
    }

    pub fn plan(&self) -> &StepPlan {
        &self.plan
    }

    pub fn current(&self) -> Step {
        self.plan.steps[self.state.step_index]
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn record(&self) -> &EnrollmentRecord {
        &self.state.record
    }

    pub fn answers(&self) -> &AnswerSet {
        &self.state.answers
    }

    pub fn is_done(&self) -> bool {
        self.current() == Step::Done
    }

    /// Merge a step's output and advance to the next step.
    pub fn complete(&mut self, output: StepOutput) -> Result<Step, WizardError> {
        let step = self.current();
        let state = &mut self.state;

        match (step, output) {
            (Step::Done, _) => return Err(WizardError::Finished),
            (Step::SelectProgram, StepOutput::Program(program)) => {
                if state.record.program_type != program {
                    state.record.selected_course = None;
                }
                state.record.program_type = program;
            }
            (Step::SelectCourse, StepOutput::Course(course)) => {
                state.record.selected_course = Some(course);
            }
            (Step::Register, StepOutput::Registered(record)) => {
                if record.id.is_none() {
                    return Err(WizardError::MissingStudentId);
                }
                state.record = record;
            }
            (Step::Assess, StepOutput::Assessed(answers)) => {
                state.answers = answers;
            }
            (step, output) => {
                return Err(WizardError::UnexpectedOutput {
                    step,
                    output: output.kind(),
                })
            }
        }

        state.step_index += 1;
        let next = self.current();
        tracing::debug!(from = %step, to = %next, "wizard advanced");
        Ok(next)
    }

    /// Return from course selection to program selection.
    ///
    /// Data already entered is kept.
    pub fn back(&mut self) -> Result<Step, WizardError> {
        let step = self.current();
        if step != Step::SelectCourse {
            return Err(WizardError::BackNotAllowed(step));
        }
        self.state.step_index -= 1;
        tracing::debug!(from = %step, to = %self.current(), "wizard went back");
        Ok(self.current())
    }

    /// Progress header for the current step, hidden on program selection.
    pub fn progress(&self) -> Option<Progress> {
        let step = self.current();
        if step == Step::SelectProgram {
            return None;
        }
        Some(Progress {
            position: self.state.step_index,
            total: self.plan.steps.len() - 1,
            label: step.label(),
        })
    }
}
