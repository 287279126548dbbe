//! Settings defaults, range clamping, and JSON loading.
//!
//! The session controller trusts whatever `Settings` it is given. Front ends
//! call [`Settings::clamped`] on user input before starting a run.

use std::path::Path;

use crate::drill_engine::{
    error::ConfigError,
    models::{Mode, Settings},
};

pub const DIGITS_RANGE: (u32, u32) = (1, 12);
pub const TERM_COUNT_RANGE: (usize, usize) = (1, 50);
pub const PROBLEM_COUNT_RANGE: (usize, usize) = (1, 10);

/// Standard gap between problems; leaves time to write the answer down.
pub const DEFAULT_PROBLEM_INTERVAL_SECS: f64 = 10.0;

impl Default for Settings {
    fn default() -> Self {
        Settings {
            digits: 2,
            term_count: 5,
            problem_count: 3,
            mode: Mode::AdditionOnly,
            rate: 1.0,
            pitch: 1.0,
            step_interval: 1.0,
            problem_interval: DEFAULT_PROBLEM_INTERVAL_SECS,
            use_kanji: true,
        }
    }
}

fn non_negative_secs(v: f64) -> f64 {
    if v.is_finite() { v.max(0.0) } else { 0.0 }
}

impl Settings {
    /// Copy of `self` with every field forced into its valid range.
    pub fn clamped(&self) -> Settings {
        Settings {
            digits: self.digits.clamp(DIGITS_RANGE.0, DIGITS_RANGE.1),
            term_count: self.term_count.clamp(TERM_COUNT_RANGE.0, TERM_COUNT_RANGE.1),
            problem_count: self.problem_count.clamp(PROBLEM_COUNT_RANGE.0, PROBLEM_COUNT_RANGE.1),
            step_interval: non_negative_secs(self.step_interval),
            problem_interval: non_negative_secs(self.problem_interval),
            ..self.clone()
        }
    }

    /// Parse settings from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Settings, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Settings, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let settings = Self::from_json_str(&raw)?;
        log::debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }
}
