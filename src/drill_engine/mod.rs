//! Core drill engine: problem generation, numeral rendering, and speech sequencing.
//!
//! ## Module overview
//!
//! | Module      | Purpose |
//! |-------------|---------|
//! | `models`    | All shared types: settings, steps, problems, session records |
//! | `config`    | Settings defaults, range clamping, JSON loading |
//! | `generator` | Constrained problem generation from any random source |
//! | `numeral`   | Kanji numerals and pause-delimited speech segments |
//! | `helpers`   | Fixed spoken phrases and log/answer/export builders |
//! | `speech`    | Speech-engine trait and the ordered, cancellable sequencer |
//! | `session`   | `SessionController`, the run / replay state machine |
//! | `error`     | Error enums for speech engines and settings loading |

pub mod config;
pub mod error;
pub mod generator;
pub mod helpers;
pub mod models;
pub mod numeral;
pub mod session;
pub mod speech;

// Re-export the public API surface so callers can use
// `drill_engine::SessionController` without reaching into sub-modules.
pub use error::{ConfigError, SpeechError};
pub use generator::{generate_batch, generate_problem, make_rng, DrawSource};
pub use models::{
    AnswerLine, Mode, Operation, Problem, RunOutcome, Score, ScoreRecord, Session,
    SessionState, Settings, Step,
};
pub use numeral::{render, to_kanji, Segment};
pub use session::SessionController;
pub use speech::{SpeechEngine, SpeechSequencer, VoiceParams};
