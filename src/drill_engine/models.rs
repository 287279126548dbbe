use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

// ---------------------------------------------------------------------------
// Drill settings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Mode {
    /// Every step is an addition.
    #[default]
    AdditionOnly,
    /// Subtraction may appear from the third step on.
    Mixed,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::AdditionOnly => write!(f, "Addition only"),
            Mode::Mixed        => write!(f, "Mixed"),
        }
    }
}

/// Immutable snapshot of one run's parameters.
///
/// Defaults, clamping and file loading live in `config`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Digits per term, 1..=12.
    pub digits: u32,
    /// Terms per problem, 1..=50.
    pub term_count: usize,
    /// Problems per run, 1..=10.
    pub problem_count: usize,
    pub mode: Mode,
    pub rate: f32,
    pub pitch: f32,
    /// Pause between steps of one problem, in seconds.
    pub step_interval: f64,
    /// Pause between problems (and before the answer reveal), in seconds.
    pub problem_interval: f64,
    pub use_kanji: bool,
}

// ---------------------------------------------------------------------------
// Problems
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operation {
    Add,
    Subtract,
}

impl Operation {
    pub fn symbol(self) -> &'static str {
        match self {
            Operation::Add      => "+",
            Operation::Subtract => "-",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// One signed operand of a problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub op: Operation,
    pub magnitude: u64,
}

impl Step {
    pub fn add(magnitude: u64) -> Self {
        Step { op: Operation::Add, magnitude }
    }

    pub fn subtract(magnitude: u64) -> Self {
        Step { op: Operation::Subtract, magnitude }
    }

    /// The step's contribution to the problem result.
    pub fn signed_value(self) -> i64 {
        let m = self.magnitude as i64;
        match self.op {
            Operation::Add      => m,
            Operation::Subtract => -m,
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.op, self.magnitude)
    }
}

/// An ordered list of steps and their signed sum.
///
/// `result` always equals the fold of `steps`; build one with
/// [`Problem::from_steps`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Problem {
    steps: Vec<Step>,
    result: i64,
}

impl Problem {
    pub fn from_steps(steps: Vec<Step>) -> Self {
        let result = steps.iter().map(|s| s.signed_value()).sum();
        Problem { steps, result }
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn result(&self) -> i64 {
        self.result
    }

    pub fn subtract_count(&self) -> usize {
        self.steps.iter().filter(|s| s.op == Operation::Subtract).count()
    }
}

/// One `"+ 50"` / `"- 30"` line per step, as shown in the run log.
impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{step}")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Session snapshot
// ---------------------------------------------------------------------------

/// Everything one run produced. Replaced wholesale by the next run.
#[derive(Debug, Clone)]
pub struct Session {
    pub settings: Settings,
    pub problems: Vec<Problem>,
    pub started_at: Instant,
    /// Time from start to the end of the last problem, captured once before
    /// the answer reveal. `None` while reading, or if the run was cancelled
    /// before the reveal; a cancel during the reveal keeps it.
    pub elapsed: Option<Duration>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Running,
    Cancelled,
    Completed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Idle      => write!(f, "Idle"),
            SessionState::Running   => write!(f, "Running"),
            SessionState::Cancelled => write!(f, "Cancelled"),
            SessionState::Completed => write!(f, "Completed"),
        }
    }
}

/// How a call to `SessionController::start` ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// A run was already in progress; nothing happened.
    Rejected,
    /// Cancelled before the answer reveal.
    Cancelled { problems_announced: usize },
    /// All problems read and all answers revealed.
    Completed { elapsed: Duration },
}

// ---------------------------------------------------------------------------
// Data handed to display / export collaborators
// ---------------------------------------------------------------------------

/// One entry of the answer list shown after the reveal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerLine {
    /// Zero-based index, usable with `SessionController::replay`.
    pub index: usize,
    /// One-based problem number.
    pub ordinal: usize,
    pub result: i64,
}

impl fmt::Display for AnswerLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "第{}問： {}", self.ordinal, self.result)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Score {
    Correct,
    Incorrect,
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Score::Correct   => write!(f, "○"),
            Score::Incorrect => write!(f, "×"),
        }
    }
}

/// Flattened per-problem record for scoring and export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub ordinal: usize,
    pub steps: Vec<i64>,
    pub result: i64,
    /// Filled in by the scoring collaborator; the core never sets it.
    pub score: Option<Score>,
}

impl ScoreRecord {
    pub fn from_problem(ordinal: usize, problem: &Problem) -> Self {
        ScoreRecord {
            ordinal,
            steps: problem.steps().iter().map(|s| s.signed_value()).collect(),
            result: problem.result(),
            score: None,
        }
    }

    pub fn with_score(mut self, score: Score) -> Self {
        self.score = Some(score);
        self
    }

    /// Steps as `"+50"` / `"-30"` tokens.
    pub fn signed_tokens(&self) -> Vec<String> {
        self.steps.iter().map(|v| format!("{v:+}")).collect()
    }
}
