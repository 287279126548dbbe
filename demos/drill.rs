//! Console read-aloud run.
//!
//! Run with: `cargo run --example drill [settings.json]`
//!
//! Speech goes to stdout: each utterance is printed and "spoken" for a time
//! proportional to its length. Set `RUST_LOG=debug` to see every unit the
//! sequencer issues.
//!
//! The run shows the whole flow:
//!
//! 1. Settings are loaded (or defaulted) and clamped.
//! 2. A seeded run reads every problem, then reveals the answers.
//! 3. Problem 1 is replayed on its own.
//! 4. The export records are printed as JSON.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use soroban_drill::{
    Mode, RunOutcome, SessionController, Settings, SpeechEngine, SpeechError, VoiceParams,
};

/// Prints each utterance and sleeps ~60ms per character.
struct ConsoleEngine;

#[async_trait]
impl SpeechEngine for ConsoleEngine {
    async fn speak(&self, text: &str, params: &VoiceParams) -> Result<(), SpeechError> {
        println!("  🔊 {text}");
        let per_char = (60.0 / params.rate.max(0.1)) as u64;
        tokio::time::sleep(Duration::from_millis(per_char * text.chars().count() as u64)).await;
        Ok(())
    }

    fn cancel_speech(&self) {
        println!("  ⏹  cancelled");
    }

    fn pause_speech(&self) {
        println!("  ⏸  paused");
    }

    fn resume_speech(&self) {
        println!("  ▶  resumed");
    }
}

fn load_settings() -> Settings {
    let Some(path) = std::env::args().nth(1).map(PathBuf::from) else {
        return Settings {
            digits: 3,
            term_count: 6,
            problem_count: 2,
            mode: Mode::Mixed,
            step_interval: 0.5,
            problem_interval: 2.0,
            ..Settings::default()
        };
    };
    match Settings::load(&path) {
        Ok(s) => s,
        Err(e) => {
            log::error!("{e}; using defaults");
            Settings::default()
        }
    }
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let settings = load_settings().clamped();
    let controller = SessionController::with_seed(Arc::new(ConsoleEngine), 42);

    println!();
    println!("══ Run: {} problems × {} terms, {} digits, {} ══",
        settings.problem_count, settings.term_count, settings.digits, settings.mode);
    println!();
    match controller.start(settings.clone()).await {
        RunOutcome::Completed { elapsed } => {
            println!();
            println!("  Solving time: {:.1}s", elapsed.as_secs_f64());
        }
        other => println!("  Run ended: {other:?}"),
    }

    println!();
    println!("══ Log ══");
    println!("{}", controller.log_text());

    println!("══ Answers ══");
    for line in controller.answers() {
        println!("  {line}");
    }

    println!();
    println!("══ Replay problem 1 ══");
    controller.replay(0).await;

    println!();
    println!("══ Export ══");
    match serde_json::to_string_pretty(&controller.score_records()) {
        Ok(json) => println!("{json}"),
        Err(e) => log::error!("export failed: {e}"),
    }
}
