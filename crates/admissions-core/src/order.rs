//! Display ordering for assessment questions.
//!
//! Questions are stored in question-number order, but shown in runs of up to
//! three multiple-choice questions followed by up to two free-text questions,
//! repeating until both pools are exhausted.

use crate::model::Question;

/// Maximum consecutive multiple-choice questions per block.
pub const MCQ_RUN: usize = 3;
/// Maximum consecutive free-text questions per block.
pub const TEXT_RUN: usize = 2;

/// Reorder questions for display. Relative order within each kind is kept.
pub fn interleave_questions(questions: Vec<Question>) -> Vec<Question> {
    let (mcqs, texts): (Vec<_>, Vec<_>) = questions.into_iter().partition(Question::is_mcq);
    interleave_runs(mcqs, texts, MCQ_RUN, TEXT_RUN)
}

/// Alternate runs of at most `first_run` items from `first` and `second_run`
/// items from `second` until both are empty.
pub fn interleave_runs<T>(
    first: Vec<T>,
    second: Vec<T>,
    first_run: usize,
    second_run: usize,
) -> Vec<T> {
    assert!(first_run > 0 && second_run > 0, "run lengths must be positive");

    let mut out = Vec::with_capacity(first.len() + second.len());
    let mut first = first.into_iter().peekable();
    let mut second = second.into_iter().peekable();

    while first.peek().is_some() || second.peek().is_some() {
        out.extend(first.by_ref().take(first_run));
        out.extend(second.by_ref().take(second_run));
    }

    out
}
