//! # soroban_drill
//!
//! Mental-arithmetic ("読み上げ算") drills for abacus practice.
//!
//! The library generates addition / mixed addition-subtraction problems under
//! fixed pedagogical constraints, renders each number as spoken Japanese
//! numerals with short pauses after 万・億・兆, and drives an external speech
//! engine through a full run: announce each problem, read its steps, pause,
//! then reveal the answers.
//!
//! ## How it works
//!
//! 1. Build a [`Settings`] (digits, terms, problem count, mode, pacing) and
//!    clamp it with [`Settings::clamped`] if it came from user input.
//! 2. Implement [`SpeechEngine`] for your output device. `speak` resolves when
//!    the utterance finishes; errors are absorbed, never fatal.
//! 3. Create a [`SessionController`] and `await` [`SessionController::start`].
//!    `cancel`, `pause` and `resume` may be called from elsewhere while it runs.
//! 4. Afterwards read [`SessionController::answers`], replay any single
//!    problem with [`SessionController::replay`], or export
//!    [`SessionController::score_records`].
//!
//! ## Key features
//!
//! - **Deterministic**: [`SessionController::with_seed`] reproduces the exact
//!   same problems; [`generate_problem`] accepts any [`DrawSource`].
//! - **Smooth subtraction**: the first two terms are always added, subtraction
//!   is capped at 40% of the terms, and a running sum never drops to or below
//!   the first term.
//! - **Strict ordering**: every utterance and pause is awaited before the next
//!   one is issued; cancellation aborts the utterance in flight.
//!
//! ## Quick start
//!
//! ```rust
//! use soroban_drill::{generate_problem, make_rng, to_kanji, Mode, Settings};
//!
//! let settings = Settings { digits: 3, term_count: 8, mode: Mode::Mixed, ..Settings::default() };
//! let problem = generate_problem(&settings, &mut make_rng(Some(42)));
//! println!("{problem}");
//! println!("= {} ({})", problem.result(), to_kanji(problem.result() as u64));
//! ```

pub mod drill_engine;

// Convenience re-exports so callers can use `soroban_drill::SessionController`
// directly without reaching into `drill_engine::`.
pub use drill_engine::{
    generate_batch, generate_problem, make_rng, render, to_kanji, AnswerLine, ConfigError,
    DrawSource, Mode, Operation, Problem, RunOutcome, Score, ScoreRecord, Segment, Session,
    SessionController, SessionState, Settings, SpeechEngine, SpeechError, SpeechSequencer, Step,
    VoiceParams,
};
