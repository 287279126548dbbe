//! Ordered, cancellable speech output.
//!
//! The [`SpeechSequencer`] wraps one opaque [`SpeechEngine`] and turns it into
//! two awaitable primitives, `speak` and `wait`. Callers await each before
//! issuing the next, so what the listener hears is exactly the order of the
//! calls.
//!
//! ## Failure and cancellation
//!
//! - An engine error completes the utterance immediately; it is logged and
//!   never returned, so a broken voice cannot stall a run.
//! - [`SpeechSequencer::cancel`] trips the current [`CancellationToken`] and
//!   tells the engine to stop. An in-flight `speak` is dropped at once, later
//!   `speak` calls complete without dispatch, and `wait` returns early.
//! - [`SpeechSequencer::reset`] installs a fresh token for the next flow and
//!   lifts any pause left behind by the previous one.
//!
//! ## Pause
//!
//! While paused, a new `speak` is held before dispatch until resumed. Timers
//! keep running; nothing is reordered or dropped.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::drill_engine::{
    error::SpeechError,
    models::Settings,
    numeral::Segment,
};

/// Per-utterance voice parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceParams {
    pub rate: f32,
    pub pitch: f32,
    /// Engine-specific voice identifier; `None` lets the engine choose.
    pub voice: Option<String>,
}

impl Default for VoiceParams {
    fn default() -> Self {
        Self { rate: 1.0, pitch: 1.0, voice: None }
    }
}

impl VoiceParams {
    pub fn from_settings(settings: &Settings, voice: Option<String>) -> Self {
        Self { rate: settings.rate, pitch: settings.pitch, voice }
    }
}

/// The external speech device.
///
/// `speak` resolves when the utterance has finished (or failed). The three
/// control methods act on the device immediately and must not block.
#[async_trait]
pub trait SpeechEngine: Send + Sync {
    async fn speak(&self, text: &str, params: &VoiceParams) -> Result<(), SpeechError>;

    /// Abort the current utterance and anything the device has queued.
    fn cancel_speech(&self);

    fn pause_speech(&self);

    fn resume_speech(&self);
}

pub(crate) fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Seconds (as configured) to whole milliseconds.
pub fn secs_to_ms(secs: f64) -> u64 {
    if secs.is_finite() && secs > 0.0 {
        (secs * 1000.0).round() as u64
    } else {
        0
    }
}

pub struct SpeechSequencer {
    engine: Arc<dyn SpeechEngine>,
    token: Mutex<CancellationToken>,
    paused: watch::Sender<bool>,
    busy: AtomicBool,
    replaying: AtomicBool,
}

/// Exclusive use of the speech device; released on drop.
pub struct DeviceGuard<'a> {
    seq: &'a SpeechSequencer,
    replay: bool,
}

impl Drop for DeviceGuard<'_> {
    fn drop(&mut self) {
        if self.replay {
            self.seq.replaying.store(false, Ordering::Release);
        }
        self.seq.busy.store(false, Ordering::Release);
    }
}

impl SpeechSequencer {
    pub fn new(engine: Arc<dyn SpeechEngine>) -> Self {
        let (paused, _) = watch::channel(false);
        Self {
            engine,
            token: Mutex::new(CancellationToken::new()),
            paused,
            busy: AtomicBool::new(false),
            replaying: AtomicBool::new(false),
        }
    }

    /// Claim the device for one logical sequence, or `None` if it is taken.
    pub fn try_acquire(&self) -> Option<DeviceGuard<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| DeviceGuard { seq: self, replay: false })
    }

    /// Like [`try_acquire`](Self::try_acquire), and marks a replay in progress
    /// until the guard drops.
    pub fn try_begin_replay(&self) -> Option<DeviceGuard<'_>> {
        let mut guard = self.try_acquire()?;
        guard.replay = true;
        self.replaying.store(true, Ordering::Release);
        Some(guard)
    }

    pub fn is_replaying(&self) -> bool {
        self.replaying.load(Ordering::Acquire)
    }

    pub fn is_paused(&self) -> bool {
        *self.paused.borrow()
    }

    /// Current cancellation token.
    pub fn token(&self) -> CancellationToken {
        lock(&self.token).clone()
    }

    pub fn is_cancelled(&self) -> bool {
        lock(&self.token).is_cancelled()
    }

    /// Start a new flow: install a fresh, untripped token and lift any pause
    /// left over from the previous one.
    pub fn reset(&self) -> CancellationToken {
        let fresh = CancellationToken::new();
        *lock(&self.token) = fresh.clone();
        if self.paused.send_replace(false) {
            log::debug!("Clearing stale pause");
            self.engine.resume_speech();
        }
        fresh
    }

    pub fn cancel(&self) {
        log::info!("Speech cancelled");
        lock(&self.token).cancel();
        self.engine.cancel_speech();
    }

    pub fn pause(&self) {
        self.paused.send_replace(true);
        self.engine.pause_speech();
    }

    pub fn resume(&self) {
        self.paused.send_replace(false);
        self.engine.resume_speech();
    }

    /// Speak `text` and wait for it to finish. Always completes.
    pub async fn speak(&self, text: &str, params: &VoiceParams) {
        let token = self.token();
        if token.is_cancelled() {
            log::debug!("Skipping {text:?}: cancelled");
            return;
        }
        if !self.wait_unpaused(&token).await {
            return;
        }

        log::debug!("Speak {text:?}");
        tokio::select! {
            res = self.engine.speak(text, params) => {
                if let Err(e) = res {
                    log::warn!("Speech engine failed on {text:?}: {e}");
                }
            }
            _ = token.cancelled() => {
                log::debug!("Aborted {text:?}");
            }
        }
    }

    /// Pause for `ms` milliseconds, or until cancelled.
    pub async fn wait(&self, ms: u64) {
        if ms == 0 {
            return;
        }
        let token = self.token();
        log::debug!("Wait {ms}ms");
        tokio::select! {
            _ = tokio::time::sleep(Duration::from_millis(ms)) => {}
            _ = token.cancelled() => {}
        }
    }

    /// Speak rendered segments with their inter-segment pauses.
    pub async fn speak_segments(&self, segments: &[Segment], params: &VoiceParams) {
        for seg in segments {
            self.speak(&seg.text, params).await;
            self.wait(seg.pause_after_ms).await;
        }
    }

    /// Block while paused. Returns `false` if cancelled first.
    async fn wait_unpaused(&self, token: &CancellationToken) -> bool {
        let mut rx = self.paused.subscribe();
        loop {
            let paused = *rx.borrow_and_update();
            if !paused {
                return true;
            }
            tokio::select! {
                changed = rx.changed() => {
                    if changed.is_err() {
                        return true;
                    }
                }
                _ = token.cancelled() => return false,
            }
        }
    }
}
