//! The read-aloud run state machine.
//!
//! `Idle → Running → (Cancelled | Completed)`; a new `start` is accepted from
//! any state but `Running`. One [`SessionController`] owns every piece of
//! run-scoped state: the last [`Session`], the speech sequencer, and the
//! random source.
//!
//! A run reads each problem in order (announce, steps, inter-problem gap),
//! measures the solving time, waits one more problem interval, then reveals
//! every answer. Cancellation is observed at the top of each problem and the
//! engine is stopped at once.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::Instant;

use crate::drill_engine::{
    generator::{generate_batch, make_rng, random_term, DrawSource},
    helpers::{self, ANSWER_UNIT_PAUSE_MS, REVEAL, STEP_TAIL, STEP_UNIT_PAUSE_MS, TEST_PHRASE},
    models::{AnswerLine, Problem, RunOutcome, ScoreRecord, Session, SessionState, Settings},
    numeral::render,
    speech::{lock, secs_to_ms, SpeechEngine, SpeechSequencer, VoiceParams},
};

/// Leaves `Running` when `start` returns or its future is dropped. A run
/// dropped mid-way is treated as cancelled and the device is stopped.
struct RunGuard<'a> {
    controller: &'a SessionController,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        let mut state = lock(&self.controller.state);
        if *state == SessionState::Running {
            log::info!("Run dropped before finishing");
            self.controller.sequencer.cancel();
            *state = SessionState::Cancelled;
        }
    }
}

pub struct SessionController {
    sequencer: SpeechSequencer,
    source: Mutex<Box<dyn DrawSource + Send>>,
    state: Mutex<SessionState>,
    session: Mutex<Option<Session>>,
    voice: Mutex<Option<String>>,
}

impl SessionController {
    /// Controller drawing problems from an entropy-seeded RNG.
    pub fn new(engine: Arc<dyn SpeechEngine>) -> Self {
        Self::with_source(engine, make_rng(None))
    }

    /// Controller with a reproducible problem sequence.
    pub fn with_seed(engine: Arc<dyn SpeechEngine>, seed: u64) -> Self {
        Self::with_source(engine, make_rng(Some(seed)))
    }

    pub fn with_source(
        engine: Arc<dyn SpeechEngine>,
        source: impl DrawSource + Send + 'static,
    ) -> Self {
        Self {
            sequencer: SpeechSequencer::new(engine),
            source: Mutex::new(Box::new(source)),
            state: Mutex::new(SessionState::Idle),
            session: Mutex::new(None),
            voice: Mutex::new(None),
        }
    }

    /// Voice identifier passed to the engine with every utterance.
    pub fn set_voice(&self, voice: Option<String>) {
        *lock(&self.voice) = voice;
    }

    // -----------------------------------------------------------------------
    // Run
    // -----------------------------------------------------------------------

    /// Generate a batch and read it aloud, resolving when the run ends.
    ///
    /// Returns [`RunOutcome::Rejected`] without side effects while a run or a
    /// replay holds the speech device.
    pub async fn start(&self, settings: Settings) -> RunOutcome {
        let Some(_device) = self.sequencer.try_acquire() else {
            log::debug!("Start ignored: speech device busy");
            return RunOutcome::Rejected;
        };
        // The token is swapped under the state lock `cancel` also takes, so a
        // cancel racing this prologue trips the new run's token.
        let token = {
            let mut state = lock(&self.state);
            if *state == SessionState::Running {
                return RunOutcome::Rejected;
            }
            *state = SessionState::Running;
            self.sequencer.reset()
        };
        let _run = RunGuard { controller: self };

        let problems = {
            let mut source = lock(&self.source);
            generate_batch(&settings, &mut **source)
        };
        let started_at = Instant::now();
        *lock(&self.session) = Some(Session {
            settings: settings.clone(),
            problems: problems.clone(),
            started_at,
            elapsed: None,
        });
        log::info!(
            "Run started: {} problems × {} terms, {} digits, {}",
            settings.problem_count, settings.term_count, settings.digits, settings.mode
        );

        let params = self.voice_params(&settings);
        let problem_gap = secs_to_ms(settings.problem_interval);
        let mut announced = 0usize;

        for (i, problem) in problems.iter().enumerate() {
            if token.is_cancelled() {
                break;
            }
            self.sequencer.speak(&helpers::announce(i + 1), &params).await;
            announced += 1;
            self.play_problem(problem, &settings, &params).await;
            if i + 1 < problems.len() {
                self.sequencer.wait(problem_gap).await;
            }
        }

        if token.is_cancelled() {
            return self.finish_cancelled(announced);
        }

        let elapsed = started_at.elapsed();
        {
            let mut session = lock(&self.session);
            if let Some(session) = session.as_mut() {
                session.elapsed = Some(elapsed);
            }
        }
        log::info!("All problems read in {:.1}s", elapsed.as_secs_f64());

        self.sequencer.wait(problem_gap).await;
        self.sequencer.speak(REVEAL, &params).await;
        for (i, problem) in problems.iter().enumerate() {
            self.sequencer.speak(&helpers::answer_cue(i + 1), &params).await;
            let segments = render(
                problem.result().unsigned_abs(),
                settings.use_kanji,
                "",
                ANSWER_UNIT_PAUSE_MS,
            );
            self.sequencer.speak_segments(&segments, &params).await;
        }

        if token.is_cancelled() {
            return self.finish_cancelled(announced);
        }
        *lock(&self.state) = SessionState::Completed;
        log::info!("Run completed");
        RunOutcome::Completed { elapsed }
    }

    fn finish_cancelled(&self, announced: usize) -> RunOutcome {
        *lock(&self.state) = SessionState::Cancelled;
        log::info!("Run cancelled after {announced} problem(s)");
        RunOutcome::Cancelled { problems_announced: announced }
    }

    /// Read one problem's steps with sign-change cues, tails and step gaps.
    async fn play_problem(&self, problem: &Problem, settings: &Settings, params: &VoiceParams) {
        let steps = problem.steps();
        let step_gap = secs_to_ms(settings.step_interval);
        for (i, step) in steps.iter().enumerate() {
            let prev = i.checked_sub(1).map(|j| steps[j].op);
            if let Some(cue) = helpers::sign_change_cue(prev, step.op) {
                self.sequencer.speak(cue, params).await;
            }
            let last = i + 1 == steps.len();
            let segments = render(
                step.magnitude,
                settings.use_kanji,
                helpers::step_tail(last),
                STEP_UNIT_PAUSE_MS,
            );
            self.sequencer.speak_segments(&segments, params).await;
            if !last {
                self.sequencer.wait(step_gap).await;
            }
        }
    }

    // -----------------------------------------------------------------------
    // Controls
    // -----------------------------------------------------------------------

    /// Stop the current run (or replay) and abort the utterance in flight.
    pub fn cancel(&self) {
        let mut state = lock(&self.state);
        self.sequencer.cancel();
        if *state == SessionState::Running {
            *state = SessionState::Cancelled;
        }
    }

    pub fn pause(&self) {
        self.sequencer.pause();
    }

    pub fn resume(&self) {
        self.sequencer.resume();
    }

    /// Re-read stored problem `index` on its own.
    ///
    /// Returns `false` (and does nothing) when there is no such problem, a run
    /// is in progress, or another replay is already playing.
    pub async fn replay(&self, index: usize) -> bool {
        if self.state() == SessionState::Running {
            return false;
        }
        let Some(_device) = self.sequencer.try_begin_replay() else {
            log::debug!("Replay {index} ignored: speech device busy");
            return false;
        };
        let stored = lock(&self.session)
            .as_ref()
            .and_then(|s| s.problems.get(index).cloned().map(|p| (p, s.settings.clone())));
        let Some((problem, settings)) = stored else {
            return false;
        };

        self.begin_flow();
        log::info!("Replaying problem {}", index + 1);
        let params = self.voice_params(&settings);
        self.sequencer.speak(&helpers::replay_cue(index + 1), &params).await;
        self.play_problem(&problem, &settings, &params).await;
        true
    }

    /// Speak one random term of the configured size with the step tail.
    pub async fn preview(&self, settings: &Settings) -> bool {
        let Some(_device) = self.sequencer.try_acquire() else {
            return false;
        };
        self.begin_flow();
        let n = {
            let mut source = lock(&self.source);
            random_term(settings.digits, &mut **source)
        };
        let params = self.voice_params(settings);
        let segments = render(n, settings.use_kanji, STEP_TAIL, STEP_UNIT_PAUSE_MS);
        self.sequencer.speak_segments(&segments, &params).await;
        true
    }

    /// Speak a fixed phrase to check the voice.
    pub async fn test_speak(&self, settings: &Settings) -> bool {
        let Some(_device) = self.sequencer.try_acquire() else {
            return false;
        };
        self.begin_flow();
        self.sequencer.speak(TEST_PHRASE, &self.voice_params(settings)).await;
        true
    }

    /// Fresh token for a replay, preview or test phrase. Taken under the state
    /// lock, like `start`, so a concurrent `cancel` is never overwritten.
    fn begin_flow(&self) {
        let _state = lock(&self.state);
        self.sequencer.reset();
    }

    fn voice_params(&self, settings: &Settings) -> VoiceParams {
        VoiceParams::from_settings(settings, lock(&self.voice).clone())
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn state(&self) -> SessionState {
        *lock(&self.state)
    }

    pub fn is_reviewing(&self) -> bool {
        self.sequencer.is_replaying()
    }

    pub fn is_paused(&self) -> bool {
        self.sequencer.is_paused()
    }

    pub fn session(&self) -> Option<Session> {
        lock(&self.session).clone()
    }

    pub fn problems(&self) -> Vec<Problem> {
        lock(&self.session)
            .as_ref()
            .map(|s| s.problems.clone())
            .unwrap_or_default()
    }

    /// Solving time of the last run; `None` until a run reaches the reveal.
    pub fn elapsed(&self) -> Option<Duration> {
        lock(&self.session).as_ref().and_then(|s| s.elapsed)
    }

    pub fn log_text(&self) -> String {
        helpers::log_text(&self.problems())
    }

    /// Answer list; empty unless the last run completed.
    pub fn answers(&self) -> Vec<AnswerLine> {
        if self.state() != SessionState::Completed {
            return Vec::new();
        }
        helpers::answer_lines(&self.problems())
    }

    pub fn score_records(&self) -> Vec<ScoreRecord> {
        helpers::score_records(&self.problems())
    }
}
