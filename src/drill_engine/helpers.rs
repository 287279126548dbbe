//! Fixed spoken phrases and small builders shared by the session controller.
//!
//! Every run reads the same handful of phrases: the problem announcement,
//! the sign-change cues, the two step tails, and the reveal cues. They live
//! here so the controller only deals with ordering and timing.

use crate::drill_engine::models::{AnswerLine, Operation, Problem, ScoreRecord};

/// Cue spoken when switching into an add step.
pub const ADD_CUE: &str = "くわえて ";
/// Cue spoken when switching into a subtract step.
pub const SUBTRACT_CUE: &str = "とってわ ";

/// Tail after every step but the last.
pub const STEP_TAIL: &str = "円なりー、";
/// Tail after the last step of a problem.
pub const FINAL_STEP_TAIL: &str = "円、でわ";

pub const REVEAL: &str = "答えの発表です。";
pub const TEST_PHRASE: &str = "テスト発話です。";

/// Pause between big-unit segments when reading a step.
pub const STEP_UNIT_PAUSE_MS: u64 = 100;
/// Pause between big-unit segments when reading an answer.
pub const ANSWER_UNIT_PAUSE_MS: u64 = 150;

/// `"第N問"` for the 1-based `ordinal`.
pub fn announce(ordinal: usize) -> String {
    format!("第{ordinal}問")
}

/// Spoken before each answer during the reveal.
pub fn answer_cue(ordinal: usize) -> String {
    format!("第{ordinal}問、")
}

/// Spoken before a single-problem replay.
pub fn replay_cue(ordinal: usize) -> String {
    format!("第{ordinal}問、復習です。")
}

/// Cue for step `current` given the step before it, if the sign changed.
pub fn sign_change_cue(prev: Option<Operation>, current: Operation) -> Option<&'static str> {
    match prev {
        Some(p) if p != current => Some(match current {
            Operation::Add      => ADD_CUE,
            Operation::Subtract => SUBTRACT_CUE,
        }),
        _ => None,
    }
}

pub fn step_tail(is_last: bool) -> &'static str {
    if is_last { FINAL_STEP_TAIL } else { STEP_TAIL }
}

/// Run log: a `"第N問"` header and the step lines for every problem.
pub fn log_text(problems: &[Problem]) -> String {
    problems
        .iter()
        .enumerate()
        .map(|(i, p)| format!("{}\n{p}\n\n", announce(i + 1)))
        .collect()
}

pub fn answer_lines(problems: &[Problem]) -> Vec<AnswerLine> {
    problems
        .iter()
        .enumerate()
        .map(|(index, p)| AnswerLine { index, ordinal: index + 1, result: p.result() })
        .collect()
}

pub fn score_records(problems: &[Problem]) -> Vec<ScoreRecord> {
    problems
        .iter()
        .enumerate()
        .map(|(i, p)| ScoreRecord::from_problem(i + 1, p))
        .collect()
}
