//! The `admissions enroll` command: the interactive wizard.

use std::path::PathBuf;

use anyhow::Result;
use console::style;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Select};

use admissions_core::catalog::{Catalog, BRANCHES, SESSION_TIMES, YEARS_OF_PASSING};
use admissions_core::model::{AnswerSet, DeliveryMode, EnrollmentRecord, QuestionKind};
use admissions_core::steps::{
    AssessmentStep, CourseSelection, Field, ProgramSelection, RegistrationStep, SubmitError,
    SuccessSummary,
};
use admissions_core::traits::DataStore;
use admissions_core::wizard::{Step, StepOutput, StepPlan, Wizard};

use super::{open_store, print_banner};

pub async fn execute(config_path: Option<PathBuf>, demo: bool, compact: bool) -> Result<()> {
    let (config, store) = open_store(config_path.as_deref(), demo)?;
    let plan = if compact {
        StepPlan::compact()
    } else {
        config.wizard.plan.clone()
    };
    let catalog = config.catalog();
    let fallback_slots = config.wizard.fallback_slots();
    let theme = ColorfulTheme::default();

    let mut wizard = Wizard::new(plan);
    tracing::info!(store = store.name(), "starting enrollment wizard");

    loop {
        print_progress(&wizard);
        match wizard.current() {
            Step::SelectProgram => {
                let output = select_program(&theme, &catalog)?;
                wizard.complete(output)?;
            }
            Step::SelectCourse => {
                match select_course(&theme, &catalog, wizard.record())? {
                    Some(output) => wizard.complete(output)?,
                    None => wizard.back()?,
                };
            }
            Step::Register => {
                let record = register(
                    &theme,
                    &catalog,
                    wizard.record(),
                    store.as_ref(),
                    &fallback_slots,
                )
                .await?;
                wizard.complete(StepOutput::Registered(record))?;
            }
            Step::Assess => {
                let answers = assess(&theme, wizard.record(), store.as_ref()).await?;
                wizard.complete(StepOutput::Assessed(answers))?;
            }
            Step::Done => {
                print_success(&SuccessSummary::for_wizard(&wizard));
                return Ok(());
            }
        }
    }
}

fn print_progress(wizard: &Wizard) {
    println!();
    match wizard.progress() {
        Some(progress) => println!(
            "{} {}",
            style(format!("Step {} of {}", progress.position, progress.total)).dim(),
            style(progress.label).cyan().bold()
        ),
        None => println!("{}", style("Choose Your Learning Path").cyan().bold()),
    }
    println!();
}

fn select_program(theme: &ColorfulTheme, catalog: &Catalog) -> Result<StepOutput> {
    let step = ProgramSelection::new(catalog);
    let programs = step.options();
    let items: Vec<String> = programs
        .iter()
        .map(|p| {
            if p.available {
                format!("{} - {}", p.title, p.summary)
            } else {
                format!("{} (coming soon)", p.title)
            }
        })
        .collect();

    loop {
        let index = Select::with_theme(theme)
            .with_prompt("Program")
            .items(&items)
            .default(0)
            .interact()?;
        match step.choose(programs[index].kind) {
            Ok(output) => return Ok(output),
            Err(e) => eprintln!("  {} {e}", style("!").yellow()),
        }
    }
}

/// `None` means the user asked to go back.
fn select_course(
    theme: &ColorfulTheme,
    catalog: &Catalog,
    record: &EnrollmentRecord,
) -> Result<Option<StepOutput>> {
    let step = CourseSelection::new(catalog, record.program_type)?;
    println!("{}", style(&step.program().title).bold());

    if !step.has_choices() {
        eprintln!(
            "  {} No courses available for this program type yet.",
            style("!").yellow()
        );
        return Ok(None);
    }

    let courses = step.courses();
    let mut items: Vec<String> = courses
        .iter()
        .map(|c| {
            let suffix = if c.available { "" } else { " (coming soon)" };
            format!("{}{suffix} - {}", c.title, c.description)
        })
        .collect();
    items.push("<- Back to programs".to_string());

    let default = record
        .selected_course
        .as_ref()
        .and_then(|id| courses.iter().position(|c| &c.id == id))
        .unwrap_or(0);

    loop {
        let index = Select::with_theme(theme)
            .with_prompt("Course")
            .items(&items)
            .default(default)
            .interact()?;
        if index == courses.len() {
            return Ok(None);
        }
        match step.choose(&courses[index].id) {
            Ok(output) => return Ok(Some(output)),
            Err(e) => eprintln!("  {} {e}", style("!").yellow()),
        }
    }
}

async fn register(
    theme: &ColorfulTheme,
    catalog: &Catalog,
    record: &EnrollmentRecord,
    store: &dyn DataStore,
    fallback_slots: &[String],
) -> Result<EnrollmentRecord> {
    let mut step = RegistrationStep::new(record, catalog);
    step.mount(store, fallback_slots).await;

    println!("{}", style(step.program_type().registration_title()).bold());
    if let Some(course) = &record.selected_course {
        println!("  Course: {}", style(course).cyan());
    }

    let mut pending = step.visible_fields();
    loop {
        for field in pending {
            let value = prompt_field(theme, catalog, &step, field)?;
            step.set(field, value);
        }

        match step.submit(store).await {
            Ok(record) => {
                println!("{} Registered", style("✓").green());
                return Ok(record);
            }
            Err(SubmitError::Invalid(_)) | Err(SubmitError::Rejected(_)) => {
                for (field, message) in step.errors().iter() {
                    eprintln!("  {} {}: {message}", style("!").yellow(), field.label());
                }
                pending = step.errors().iter().map(|(field, _)| *field).collect();
            }
            Err(SubmitError::Store(message)) => {
                print_banner(&message);
                if !confirm_retry(theme)? {
                    anyhow::bail!("registration was not completed");
                }
                pending = Vec::new();
            }
            Err(e) => return Err(e.into()),
        }
    }
}

fn prompt_field(
    theme: &ColorfulTheme,
    catalog: &Catalog,
    step: &RegistrationStep,
    field: Field,
) -> Result<String> {
    let current = step.form().get(field).to_string();
    let options: Option<Vec<String>> = match field {
        Field::YearOfPassing => Some(YEARS_OF_PASSING.iter().map(|s| s.to_string()).collect()),
        Field::Branch => Some(BRANCHES.iter().map(|s| s.to_string()).collect()),
        Field::SessionTime => Some(SESSION_TIMES.iter().map(|s| s.to_string()).collect()),
        Field::Mode => Some(
            [DeliveryMode::Online, DeliveryMode::Offline]
                .iter()
                .map(ToString::to_string)
                .collect(),
        ),
        Field::Slot => Some(step.slots().to_vec()),
        Field::Course => Some(
            catalog
                .program(step.program_type())
                .map(|p| p.available_courses().map(|c| c.id.clone()).collect())
                .unwrap_or_default(),
        ),
        _ => None,
    };

    match options {
        Some(options) if !options.is_empty() => {
            let default = options.iter().position(|o| *o == current).unwrap_or(0);
            let index = Select::with_theme(theme)
                .with_prompt(field.label())
                .items(&options)
                .default(default)
                .interact()?;
            Ok(options[index].clone())
        }
        _ => {
            let value: String = Input::with_theme(theme)
                .with_prompt(field.label())
                .with_initial_text(current)
                .allow_empty(true)
                .interact_text()?;
            Ok(value)
        }
    }
}

async fn assess(
    theme: &ColorfulTheme,
    record: &EnrollmentRecord,
    store: &dyn DataStore,
) -> Result<AnswerSet> {
    let mut step = AssessmentStep::load(store).await?;
    let questions = step.questions().to_vec();
    println!(
        "{} question(s). Free-text answers need at least 50 characters.",
        questions.len()
    );

    let mut pending: Vec<i64> = questions.iter().map(|q| q.id).collect();
    loop {
        for id in &pending {
            let Some((position, question)) =
                questions.iter().enumerate().find(|(_, q)| q.id == *id)
            else {
                continue;
            };
            println!();
            println!(
                "{} {}",
                style(format!("Question {} of {}", position + 1, questions.len())).dim(),
                style(&question.text).bold()
            );

            let current = step.answer(question.id).unwrap_or_default().to_string();
            let value = match &question.kind {
                QuestionKind::Mcq { options } => {
                    let default = options.iter().position(|o| *o == current).unwrap_or(0);
                    let index = Select::with_theme(theme)
                        .items(options)
                        .default(default)
                        .interact()?;
                    options[index].clone()
                }
                QuestionKind::Text => Input::with_theme(theme)
                    .with_prompt("Answer")
                    .with_initial_text(current)
                    .allow_empty(true)
                    .interact_text()?,
            };
            step.set_answer(question.id, value)?;
        }
        println!(
            "\n{}",
            style(format!(
                "{} of {} answered",
                step.answered_count(),
                questions.len()
            ))
            .dim()
        );

        match step.submit(record, store).await {
            Ok(answers) => {
                println!("{} Assessment submitted", style("✓").green());
                return Ok(answers);
            }
            Err(SubmitError::Invalid(_)) => {
                for (id, message) in step.errors().iter() {
                    eprintln!("  {} question {id}: {message}", style("!").yellow());
                }
                pending = step.errors().iter().map(|(id, _)| *id).collect();
            }
            Err(SubmitError::Store(message)) => {
                print_banner(&message);
                if !confirm_retry(theme)? {
                    anyhow::bail!("assessment was not submitted");
                }
                pending = Vec::new();
            }
            Err(e) => {
                if let Some(banner) = step.banner() {
                    print_banner(banner);
                }
                return Err(e.into());
            }
        }
    }
}

fn confirm_retry(theme: &ColorfulTheme) -> Result<bool> {
    Ok(Confirm::with_theme(theme)
        .with_prompt("Try again?")
        .default(true)
        .interact()?)
}

fn print_success(summary: &SuccessSummary) {
    println!("{}", style(summary.headline).green().bold());
    println!("{}", summary.message);
    if let Some(reference) = &summary.reference {
        println!("Reference: {}", style(reference).cyan());
    }
    println!();
    println!("{}", style("What happens next?").bold());
    for (i, next) in summary.next_steps.iter().enumerate() {
        println!("  {}. {next}", i + 1);
    }
}
