//! Program and course selection steps.
//!
//! Both read from the fixed [`Catalog`] and persist nothing.

use thiserror::Error;

use crate::catalog::{Catalog, Course, Program};
use crate::model::ProgramType;
use crate::wizard::StepOutput;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("program '{0}' is not available yet")]
    ProgramUnavailable(ProgramType),

    #[error("program '{0}' is not in the catalog")]
    UnknownProgram(ProgramType),

    #[error("course '{0}' is not offered under this program")]
    UnknownCourse(String),

    #[error("course '{0}' is not available yet")]
    CourseUnavailable(String),

    #[error("no courses available for this program type yet")]
    NoCourses,
}

/// First step: pick a program type.
pub struct ProgramSelection<'a> {
    catalog: &'a Catalog,
}

impl<'a> ProgramSelection<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// All programs, unavailable ones included so they can be shown greyed out.
    pub fn options(&self) -> &'a [Program] {
        self.catalog.programs()
    }

    pub fn choose(&self, kind: ProgramType) -> Result<StepOutput, SelectionError> {
        let program = self
            .catalog
            .program(kind)
            .ok_or(SelectionError::UnknownProgram(kind))?;
        if !program.available {
            return Err(SelectionError::ProgramUnavailable(kind));
        }
        Ok(StepOutput::Program(kind))
    }
}

/// Second step: pick a course within the chosen program.
///
/// Going back to program selection is a controller transition
/// ([`Wizard::back`](crate::wizard::Wizard::back)).
pub struct CourseSelection<'a> {
    program: &'a Program,
}

impl<'a> CourseSelection<'a> {
    pub fn new(catalog: &'a Catalog, kind: ProgramType) -> Result<Self, SelectionError> {
        let program = catalog
            .program(kind)
            .ok_or(SelectionError::UnknownProgram(kind))?;
        Ok(Self { program })
    }

    pub fn program(&self) -> &'a Program {
        self.program
    }

    pub fn courses(&self) -> &'a [Course] {
        &self.program.courses
    }

    pub fn has_choices(&self) -> bool {
        self.program.available_courses().next().is_some()
    }

    pub fn choose(&self, course_id: &str) -> Result<StepOutput, SelectionError> {
        if !self.has_choices() {
            return Err(SelectionError::NoCourses);
        }
        let course = self
            .program
            .courses
            .iter()
            .find(|c| c.id == course_id)
            .ok_or_else(|| SelectionError::UnknownCourse(course_id.to_string()))?;
        if !course.available {
            return Err(SelectionError::CourseUnavailable(course.id.clone()));
        }
        Ok(StepOutput::Course(course.id.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_program_is_rejected() {
        let catalog = Catalog::default();
        let step = ProgramSelection::new(&catalog);
        assert_eq!(step.options().len(), 3);
        assert_eq!(
            step.choose(ProgramType::OnDemand),
            Err(SelectionError::ProgramUnavailable(ProgramType::OnDemand))
        );
        assert_eq!(
            step.choose(ProgramType::Cohort),
            Ok(StepOutput::Program(ProgramType::Cohort))
        );
    }

    #[test]
    fn course_must_belong_to_program() {
        let catalog = Catalog::default();
        let step = CourseSelection::new(&catalog, ProgramType::Workshop).unwrap();
        assert_eq!(
            step.choose("Crochet"),
            Ok(StepOutput::Course("Crochet".into()))
        );
        assert_eq!(
            step.choose("React Mastery"),
            Err(SelectionError::UnknownCourse("React Mastery".into()))
        );
    }

    #[test]
    fn greyed_out_course_is_rejected() {
        let mut programs = Catalog::default().programs().to_vec();
        programs[2].courses[1].available = false;
        let catalog = Catalog::new(programs);
        let step = CourseSelection::new(&catalog, ProgramType::Workshop).unwrap();
        assert_eq!(
            step.choose("Crochet"),
            Err(SelectionError::CourseUnavailable("Crochet".into()))
        );
    }

    #[test]
    fn empty_program_has_nothing_to_choose() {
        let mut programs = Catalog::default().programs().to_vec();
        programs[2].courses.clear();
        let catalog = Catalog::new(programs);
        let step = CourseSelection::new(&catalog, ProgramType::Workshop).unwrap();
        assert!(!step.has_choices());
        assert_eq!(step.choose("Crochet"), Err(SelectionError::NoCourses));
    }
}
