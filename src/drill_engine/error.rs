use thiserror::Error;

/// Failure reported by a [`SpeechEngine`](crate::drill_engine::speech::SpeechEngine).
///
/// The sequencer logs and swallows these; they never reach a caller of the
/// session controller.
#[derive(Error, Debug)]
pub enum SpeechError {
    #[error("speech device unavailable")]
    Unavailable,

    #[error("utterance rejected: {0}")]
    Rejected(String),

    #[error("utterance interrupted")]
    Interrupted,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
}
