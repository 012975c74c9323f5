//! The registration step.
//!
//! Collects identity, education, and program-specific fields, validates them,
//! and creates the student record in the store. Which program fields apply
//! depends on the program type chosen earlier.

use std::fmt;

use tracing::instrument;

use crate::catalog::{Catalog, DEFAULT_TIME_SLOTS};
use crate::error::as_store_error;
use crate::model::{
    Applicant, DeliveryMode, EnrollmentRecord, NewStudent, ProgramDetails, ProgramType,
};
use crate::steps::{InFlight, SubmitError};
use crate::traits::DataStore;
use crate::validate::{is_present, is_valid_email, is_valid_phone, FieldErrors, MIN_NAME_CHARS};

pub const DUPLICATE_EMAIL_MESSAGE: &str = "This email is already registered";

/// A registration form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    FullName,
    Email,
    PhoneNumber,
    CollegeName,
    YearOfPassing,
    Branch,
    Course,
    Slot,
    SessionTime,
    Mode,
    ReferredBy,
}

impl Field {
    pub fn label(&self) -> &'static str {
        match self {
            Field::FullName => "Full Name",
            Field::Email => "Email Address",
            Field::PhoneNumber => "Phone Number",
            Field::CollegeName => "College Name",
            Field::YearOfPassing => "Year of Passing",
            Field::Branch => "Majors/Specialization",
            Field::Course => "Course",
            Field::Slot => "Select Slot to Start Course",
            Field::SessionTime => "Session Time",
            Field::Mode => "Preferred Mode",
            Field::ReferredBy => "Referred By (Optional)",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = match self {
            Field::FullName => "full_name",
            Field::Email => "email",
            Field::PhoneNumber => "phone_number",
            Field::CollegeName => "college_name",
            Field::YearOfPassing => "year_of_passing",
            Field::Branch => "branch",
            Field::Course => "specific_course",
            Field::Slot => "selected_slot",
            Field::SessionTime => "session_time",
            Field::Mode => "mode",
            Field::ReferredBy => "referred_by",
        };
        f.write_str(key)
    }
}

/// Raw form values as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationForm {
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    pub college_name: String,
    pub year_of_passing: String,
    pub branch: String,
    pub course: String,
    pub slot: String,
    pub session_time: String,
    pub mode: String,
    pub referred_by: String,
}

impl RegistrationForm {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::FullName => &self.full_name,
            Field::Email => &self.email,
            Field::PhoneNumber => &self.phone_number,
            Field::CollegeName => &self.college_name,
            Field::YearOfPassing => &self.year_of_passing,
            Field::Branch => &self.branch,
            Field::Course => &self.course,
            Field::Slot => &self.slot,
            Field::SessionTime => &self.session_time,
            Field::Mode => &self.mode,
            Field::ReferredBy => &self.referred_by,
        }
    }

    fn get_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::FullName => &mut self.full_name,
            Field::Email => &mut self.email,
            Field::PhoneNumber => &mut self.phone_number,
            Field::CollegeName => &mut self.college_name,
            Field::YearOfPassing => &mut self.year_of_passing,
            Field::Branch => &mut self.branch,
            Field::Course => &mut self.course,
            Field::Slot => &mut self.slot,
            Field::SessionTime => &mut self.session_time,
            Field::Mode => &mut self.mode,
            Field::ReferredBy => &mut self.referred_by,
        }
    }
}

/// The registration step for one program type.
#[derive(Debug)]
pub struct RegistrationStep {
    record: EnrollmentRecord,
    course_required: bool,
    course_preselected: bool,
    form: RegistrationForm,
    errors: FieldErrors<Field>,
    banner: Option<String>,
    submitting: bool,
    slots: Vec<String>,
}

impl RegistrationStep {
    /// Build the form from the wizard's current record.
    ///
    /// A course picked on an earlier step is carried into the form and not
    /// asked again.
    pub fn new(record: &EnrollmentRecord, catalog: &Catalog) -> Self {
        let course_required = match record.program_type {
            ProgramType::Cohort => true,
            kind => catalog.program(kind).is_some_and(|p| p.requires_course()),
        };
        let form = RegistrationForm {
            course: record.selected_course.clone().unwrap_or_default(),
            ..Default::default()
        };

        Self {
            record: record.clone(),
            course_required,
            course_preselected: record.selected_course.is_some(),
            form,
            errors: FieldErrors::new(),
            banner: None,
            submitting: false,
            slots: Vec::new(),
        }
    }

    pub fn program_type(&self) -> ProgramType {
        self.record.program_type
    }

    /// Load the cohort slot list. Falls back to `fallback` (or the built-in
    /// defaults when that is empty) if the store fails or has no slots.
    #[instrument(skip_all, fields(program = %self.record.program_type))]
    pub async fn mount(&mut self, store: &dyn DataStore, fallback: &[String]) {
        if self.record.program_type != ProgramType::Cohort {
            return;
        }

        let defaults = || -> Vec<String> {
            if fallback.is_empty() {
                DEFAULT_TIME_SLOTS.iter().map(|s| s.to_string()).collect()
            } else {
                fallback.to_vec()
            }
        };

        self.slots = match store.list_time_slots().await {
            Ok(slots) if !slots.is_empty() => slots,
            Ok(_) => {
                tracing::warn!("store returned no time slots, using defaults");
                defaults()
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to fetch time slots, using defaults");
                defaults()
            }
        };
    }

    pub fn slots(&self) -> &[String] {
        &self.slots
    }

    /// Fields that need their own input, in display order.
    pub fn visible_fields(&self) -> Vec<Field> {
        let mut fields = vec![
            Field::FullName,
            Field::Email,
            Field::PhoneNumber,
            Field::CollegeName,
            Field::YearOfPassing,
            Field::Branch,
        ];
        if self.course_required && !self.course_preselected {
            fields.push(Field::Course);
        }
        if self.record.program_type == ProgramType::Cohort {
            fields.extend([Field::Slot, Field::SessionTime, Field::Mode]);
        }
        fields.push(Field::ReferredBy);
        fields
    }

    /// Fields that must be non-empty for this program type.
    pub fn required_fields(&self) -> Vec<Field> {
        let mut fields = vec![
            Field::FullName,
            Field::Email,
            Field::PhoneNumber,
            Field::CollegeName,
            Field::YearOfPassing,
            Field::Branch,
        ];
        match self.record.program_type {
            ProgramType::Cohort => {
                fields.extend([Field::Slot, Field::SessionTime, Field::Mode, Field::Course])
            }
            ProgramType::OnDemand | ProgramType::Workshop => {
                if self.course_required {
                    fields.push(Field::Course);
                }
            }
        }
        fields
    }

    /// Update a field and clear its error.
    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        *self.form.get_mut(field) = value.into();
        self.errors.clear(&field);
    }

    pub fn form(&self) -> &RegistrationForm {
        &self.form
    }

    pub fn errors(&self) -> &FieldErrors<Field> {
        &self.errors
    }

    /// Form-level error from the last failed submit.
    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Validate every field. Replaces previous errors.
    pub fn validate(&mut self) -> Option<Applicant> {
        let mut errors = FieldErrors::new();
        let form = &self.form;

        let full_name = form.full_name.trim();
        if full_name.is_empty() {
            errors.insert(Field::FullName, "Full name is required");
        } else if full_name.chars().count() < MIN_NAME_CHARS {
            errors.insert(Field::FullName, "Name must be at least 2 characters");
        }

        let email = form.email.trim();
        if email.is_empty() {
            errors.insert(Field::Email, "Email is required");
        } else if !is_valid_email(email) {
            errors.insert(Field::Email, "Please enter a valid email address");
        }

        let phone = form.phone_number.trim();
        if phone.is_empty() {
            errors.insert(Field::PhoneNumber, "Phone number is required");
        } else if !is_valid_phone(phone) {
            errors.insert(
                Field::PhoneNumber,
                "Please enter a valid phone number (at least 10 digits)",
            );
        }

        for (field, message) in [
            (Field::CollegeName, "College name is required"),
            (Field::YearOfPassing, "Year of passing is required"),
            (Field::Branch, "Branch is required"),
        ] {
            if !is_present(form.get(field)) {
                errors.insert(field, message);
            }
        }

        let required = self.required_fields();
        for (field, message) in [
            (Field::Slot, "Please select a slot"),
            (Field::SessionTime, "Please select a session time"),
            (Field::Mode, "Please select a preferred mode"),
            (Field::Course, "Please select a course"),
        ] {
            if required.contains(&field) && !is_present(form.get(field)) {
                errors.insert(field, message);
            }
        }

        let mode = if self.record.program_type == ProgramType::Cohort
            && !errors.contains(&Field::Mode)
        {
            match form.mode.parse::<DeliveryMode>() {
                Ok(mode) => Some(mode),
                Err(_) => {
                    errors.insert(Field::Mode, "Please select a preferred mode");
                    None
                }
            }
        } else {
            None
        };

        self.banner = None;
        let valid = errors.is_empty();
        self.errors = errors;
        if !valid {
            return None;
        }

        let course = || {
            let course = form.course.trim();
            (!course.is_empty()).then(|| course.to_string())
        };
        let program = match (self.record.program_type, mode) {
            (ProgramType::Cohort, Some(mode)) => ProgramDetails::Cohort {
                course: form.course.trim().to_string(),
                slot: form.slot.trim().to_string(),
                session_time: form.session_time.trim().to_string(),
                mode,
            },
            (ProgramType::Cohort, None) => return None,
            (ProgramType::OnDemand, _) => ProgramDetails::OnDemand { course: course() },
            (ProgramType::Workshop, _) => ProgramDetails::Workshop { course: course() },
        };

        let referred_by = form.referred_by.trim();
        Some(Applicant {
            full_name: full_name.to_string(),
            email: email.to_string(),
            phone_number: phone.to_string(),
            college_name: form.college_name.trim().to_string(),
            year_of_passing: form.year_of_passing.trim().to_string(),
            branch: form.branch.trim().to_string(),
            program,
            referred_by: (!referred_by.is_empty()).then(|| referred_by.to_string()),
        })
    }

    /// Validate and create the student record.
    ///
    /// On success returns the wizard record with the new id merged in. On a
    /// duplicate email the error lands on [`Field::Email`]; any other store
    /// failure sets the banner. Entered values are kept either way.
    #[instrument(skip_all, fields(program = %self.record.program_type, store = store.name()))]
    pub async fn submit(&mut self, store: &dyn DataStore) -> Result<EnrollmentRecord, SubmitError> {
        if self.submitting {
            return Err(SubmitError::InFlight);
        }
        let Some(applicant) = self.validate() else {
            return Err(SubmitError::Invalid(self.errors.len()));
        };

        let row = NewStudent::from(&applicant);
        let result = {
            let _in_flight = InFlight::begin(&mut self.submitting)?;
            store.create_student(&row).await
        };

        match result {
            Ok(id) => {
                tracing::info!(student_id = %id, "student registered");
                let mut record = self.record.clone();
                record.id = Some(id);
                record.selected_course = applicant.program.course().map(str::to_string);
                record.applicant = Some(applicant);
                Ok(record)
            }
            Err(e) if as_store_error(&e).is_some_and(|se| se.is_unique_violation()) => {
                tracing::info!("registration rejected: email already registered");
                self.errors.insert(Field::Email, DUPLICATE_EMAIL_MESSAGE);
                Err(SubmitError::Rejected(DUPLICATE_EMAIL_MESSAGE.to_string()))
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to register student");
                let message = format!("Error: {e}");
                self.banner = Some(message.clone());
                Err(SubmitError::Store(message))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::model::RecordId;
    use crate::testing::FakeStore;

    fn cohort_record() -> EnrollmentRecord {
        EnrollmentRecord::default()
    }

    fn fill_identity(step: &mut RegistrationStep) {
        step.set(Field::FullName, "Ada Lovelace");
        step.set(Field::Email, "ada@example.com");
        step.set(Field::PhoneNumber, "+1 (555) 123-4567");
        step.set(Field::CollegeName, "Analytical College");
        step.set(Field::YearOfPassing, "2026");
        step.set(Field::Branch, "Data Science");
    }

    fn fill_cohort(step: &mut RegistrationStep) {
        fill_identity(step);
        step.set(Field::Course, "Full Stack Web Development");
        step.set(Field::Slot, "19th January");
        step.set(Field::SessionTime, "Morning Session (10am-11.30am)");
        step.set(Field::Mode, "Online");
    }

    #[test]
    fn empty_cohort_form_reports_every_required_field() {
        let mut step = RegistrationStep::new(&cohort_record(), &Catalog::default());
        assert!(step.validate().is_none());
        for field in step.required_fields() {
            assert!(step.errors().contains(&field), "missing error for {field}");
        }
        assert!(!step.errors().contains(&Field::ReferredBy));
    }

    #[test]
    fn editing_clears_only_that_error() {
        let mut step = RegistrationStep::new(&cohort_record(), &Catalog::default());
        step.validate();
        step.set(Field::Email, "x");
        assert!(!step.errors().contains(&Field::Email));
        assert!(step.errors().contains(&Field::FullName));
    }

    #[test]
    fn invalid_email_and_phone_messages() {
        let mut step = RegistrationStep::new(&cohort_record(), &Catalog::default());
        fill_cohort(&mut step);
        step.set(Field::Email, "user@com");
        step.set(Field::PhoneNumber, "12345");
        assert!(step.validate().is_none());
        assert_eq!(
            step.errors().get(&Field::Email),
            Some("Please enter a valid email address")
        );
        assert_eq!(
            step.errors().get(&Field::PhoneNumber),
            Some("Please enter a valid phone number (at least 10 digits)")
        );
    }

    #[test]
    fn short_name_rejected() {
        let mut step = RegistrationStep::new(&cohort_record(), &Catalog::default());
        fill_cohort(&mut step);
        step.set(Field::FullName, " A ");
        assert!(step.validate().is_none());
        assert_eq!(
            step.errors().get(&Field::FullName),
            Some("Name must be at least 2 characters")
        );
    }

    #[test]
    fn cohort_applicant_carries_cohort_details() {
        let mut step = RegistrationStep::new(&cohort_record(), &Catalog::default());
        fill_cohort(&mut step);
        step.set(Field::ReferredBy, "   ");
        let applicant = step.validate().unwrap();
        assert_eq!(
            applicant.program,
            ProgramDetails::Cohort {
                course: "Full Stack Web Development".into(),
                slot: "19th January".into(),
                session_time: "Morning Session (10am-11.30am)".into(),
                mode: DeliveryMode::Online,
            }
        );
        assert!(applicant.referred_by.is_none());
    }

    #[test]
    fn unavailable_on_demand_needs_no_course() {
        let record = EnrollmentRecord {
            program_type: ProgramType::OnDemand,
            ..Default::default()
        };
        let mut step = RegistrationStep::new(&record, &Catalog::default());
        assert!(!step.required_fields().contains(&Field::Course));
        assert!(!step.visible_fields().contains(&Field::Slot));
        fill_identity(&mut step);
        let applicant = step.validate().unwrap();
        assert_eq!(applicant.program, ProgramDetails::OnDemand { course: None });
    }

    #[test]
    fn workshop_requires_course_unless_preselected() {
        let record = EnrollmentRecord {
            program_type: ProgramType::Workshop,
            ..Default::default()
        };
        let mut step = RegistrationStep::new(&record, &Catalog::default());
        assert!(step.visible_fields().contains(&Field::Course));
        fill_identity(&mut step);
        assert!(step.validate().is_none());
        assert_eq!(
            step.errors().get(&Field::Course),
            Some("Please select a course")
        );

        let record = EnrollmentRecord {
            program_type: ProgramType::Workshop,
            selected_course: Some("Crochet".into()),
            ..Default::default()
        };
        let mut step = RegistrationStep::new(&record, &Catalog::default());
        assert!(!step.visible_fields().contains(&Field::Course));
        fill_identity(&mut step);
        let applicant = step.validate().unwrap();
        assert_eq!(applicant.program.course(), Some("Crochet"));
    }

    #[tokio::test]
    async fn mount_uses_store_slots() {
        let store = FakeStore::default().with_slots(vec!["5th March".into()]);
        let mut step = RegistrationStep::new(&cohort_record(), &Catalog::default());
        step.mount(&store, &[]).await;
        assert_eq!(step.slots(), ["5th March".to_string()]);
    }

    #[tokio::test]
    async fn mount_falls_back_when_slot_fetch_fails() {
        let store = FakeStore::default().failing_slots();
        let mut step = RegistrationStep::new(&cohort_record(), &Catalog::default());
        step.mount(&store, &[]).await;
        assert_eq!(step.slots(), ["19th January", "2nd February"]);

        let mut step = RegistrationStep::new(&cohort_record(), &Catalog::default());
        step.mount(&store, &["1st April".to_string()]).await;
        assert_eq!(step.slots(), ["1st April"]);
    }

    #[tokio::test]
    async fn mount_skips_fetch_for_non_cohort() {
        let store = FakeStore::default().with_slots(vec!["5th March".into()]);
        let record = EnrollmentRecord {
            program_type: ProgramType::Workshop,
            ..Default::default()
        };
        let mut step = RegistrationStep::new(&record, &Catalog::default());
        step.mount(&store, &[]).await;
        assert!(step.slots().is_empty());
        assert_eq!(store.slot_calls(), 0);
    }

    #[tokio::test]
    async fn submit_invalid_form_issues_no_write() {
        let store = FakeStore::default();
        let mut step = RegistrationStep::new(&cohort_record(), &Catalog::default());
        let err = step.submit(&store).await.unwrap_err();
        assert!(matches!(err, SubmitError::Invalid(n) if n > 0));
        assert!(store.students().is_empty());
    }

    #[tokio::test]
    async fn submit_returns_record_with_id() {
        let store = FakeStore::default().with_student_id(RecordId::Int(41));
        let mut step = RegistrationStep::new(&cohort_record(), &Catalog::default());
        fill_cohort(&mut step);
        let record = step.submit(&store).await.unwrap();
        assert_eq!(record.id, Some(RecordId::Int(41)));
        assert_eq!(record.email(), Some("ada@example.com"));
        assert_eq!(
            record.selected_course.as_deref(),
            Some("Full Stack Web Development")
        );
        assert!(!step.is_submitting());
        assert_eq!(store.students().len(), 1);
    }

    #[tokio::test]
    async fn duplicate_email_becomes_field_error() {
        let store = FakeStore::default().failing_students(|| StoreError::UniqueViolation {
            constraint: Some("students_email_key".into()),
            message: "duplicate key value violates unique constraint".into(),
        });
        let mut step = RegistrationStep::new(&cohort_record(), &Catalog::default());
        fill_cohort(&mut step);
        let err = step.submit(&store).await.unwrap_err();
        assert_eq!(err, SubmitError::Rejected(DUPLICATE_EMAIL_MESSAGE.into()));
        assert_eq!(step.errors().get(&Field::Email), Some(DUPLICATE_EMAIL_MESSAGE));
        assert!(step.banner().is_none());
        assert!(!step.is_submitting());
    }

    #[tokio::test]
    async fn other_failures_set_banner_and_keep_values() {
        let store =
            FakeStore::default().failing_students(|| StoreError::NetworkError("offline".into()));
        let mut step = RegistrationStep::new(&cohort_record(), &Catalog::default());
        fill_cohort(&mut step);
        let err = step.submit(&store).await.unwrap_err();
        assert_eq!(
            err,
            SubmitError::Store("Error: network error: offline".into())
        );
        assert_eq!(step.banner(), Some("Error: network error: offline"));
        assert!(step.errors().is_empty());
        assert_eq!(step.form().email, "ada@example.com");
        assert!(!step.is_submitting());
    }
}
