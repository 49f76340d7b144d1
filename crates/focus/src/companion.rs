//! Session driver
//!
//! Owns a [`PhaseTimer`] and turns its transitions into stored sessions and
//! coin rewards. Like the timer it never reads a clock: every call takes the
//! monotonic `now` used by the engine, plus a wall-clock stamp where a
//! session record needs one.

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use grove_core::Settings;

use crate::preset::durations_for;
use crate::session::{coin_reward, SessionRecord, Theme};
use crate::store::FocusStore;
use crate::timer::{PhaseTimer, TimerSnapshot, TimerState};

/// What a frame observed
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameEvent {
    /// Nothing beyond progress
    Tick(TimerSnapshot),
    /// A focus phase ran to completion and was recorded.
    /// `finished` is set when no break follows.
    FocusCompleted {
        coins: u32,
        balance: u64,
        finished: bool,
        snapshot: TimerSnapshot,
    },
}

/// Result of stopping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// A focus phase was cut short and recorded as failed
    Failed { elapsed: u64 },
    /// A break was ended; the timer is idle
    BreakEnded,
    /// A finished timer was cleared back to idle
    Cleared,
    /// Nothing was running
    Nothing,
}

#[derive(Debug, Clone, Copy)]
struct ActiveSession {
    started: DateTime<Utc>,
    theme: Theme,
}

/// Drives one timer against the session store
pub struct Companion {
    timer: PhaseTimer,
    store: FocusStore,
    settings: Settings,
    active: Option<ActiveSession>,
}

impl Companion {
    /// Create a driver, configuring the timer from `settings`
    pub fn new(store: FocusStore, settings: Settings) -> Result<Self> {
        let mut companion = Self {
            timer: PhaseTimer::default(),
            store,
            settings,
            active: None,
        };
        companion.apply_settings()?;
        Ok(companion)
    }

    pub fn timer(&self) -> &PhaseTimer {
        &self.timer
    }

    pub fn store(&self) -> &FocusStore {
        &self.store
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Theme of the running session, or the configured one
    pub fn theme(&self) -> Theme {
        self.active
            .map(|s| s.theme)
            .unwrap_or_else(|| Theme::normalize(&self.settings.theme))
    }

    /// Replace the settings. Invalid durations are rejected and the previous
    /// settings stay in effect. The running phase keeps its length.
    pub fn update_settings(&mut self, settings: Settings) -> Result<()> {
        let previous = std::mem::replace(&mut self.settings, settings);
        if let Err(e) = self.apply_settings() {
            self.settings = previous;
            return Err(e);
        }
        Ok(())
    }

    fn apply_settings(&mut self) -> Result<()> {
        let (focus, brk) = durations_for(&self.settings);
        self.timer.configure(focus, brk, self.settings.auto_cycle)?;
        Ok(())
    }

    /// Start a focus session. Returns false if one is already under way.
    pub fn start(&mut self, now: f64, wall: DateTime<Utc>) -> Result<bool> {
        if !self.timer.state().can_start() {
            return Ok(false);
        }
        self.apply_settings()?;
        self.timer.start(now);
        self.active = Some(ActiveSession {
            started: wall,
            theme: Theme::normalize(&self.settings.theme),
        });
        tracing::info!(
            focus = self.timer.config().focus_duration,
            theme = self.theme().as_str(),
            "focus session started"
        );
        Ok(true)
    }

    pub fn pause(&mut self, now: f64) -> bool {
        self.timer.pause(now)
    }

    pub fn resume(&mut self, now: f64) -> bool {
        self.timer.resume(now)
    }

    /// Pause a running phase or resume a paused one
    pub fn toggle_pause(&mut self, now: f64) -> bool {
        if self.timer.state().is_paused() {
            self.resume(now)
        } else {
            self.pause(now)
        }
    }

    pub fn snapshot(&self, now: f64) -> TimerSnapshot {
        self.timer.snapshot(now)
    }

    /// Poll the timer, recording any focus phase that just completed
    pub fn frame(&mut self, now: f64, wall: DateTime<Utc>) -> Result<FrameEvent> {
        let before = self.timer.state();
        // Length of the phase that ran, not of the current configuration
        let duration = self.timer.snapshot(now).total_seconds;
        let snapshot = self.timer.tick(now);

        match (before, snapshot.state) {
            (TimerState::FocusRunning, TimerState::BreakRunning | TimerState::Finished) => {
                let coins = coin_reward(duration);
                let session = self.active.unwrap_or(ActiveSession {
                    started: wall,
                    theme: self.theme(),
                });

                let record =
                    SessionRecord::succeeded(session.started, duration, session.theme, coins);
                self.store.record_session(&record)?;
                let balance = self.store.add_coins(i64::from(coins))?;

                let finished = snapshot.state == TimerState::Finished;
                if finished {
                    self.active = None;
                }
                Ok(FrameEvent::FocusCompleted {
                    coins,
                    balance,
                    finished,
                    snapshot,
                })
            }
            (TimerState::BreakRunning, TimerState::FocusRunning) => {
                // The chained focus phase began `elapsed` seconds ago
                let started = wall - Duration::seconds(snapshot.elapsed_seconds as i64);
                let theme = self.theme();
                self.active = Some(ActiveSession { started, theme });
                Ok(FrameEvent::Tick(snapshot))
            }
            _ => Ok(FrameEvent::Tick(snapshot)),
        }
    }

    /// Stop whatever is running. A focus phase cut short is recorded as a
    /// failed session; the timer is left idle.
    pub fn stop(&mut self, now: f64) -> Result<StopOutcome> {
        let before = self.timer.state();
        let outcome = match before {
            TimerState::FocusRunning | TimerState::FocusPaused => {
                self.timer.stop(now);
                let elapsed = self.timer.snapshot(now).elapsed_seconds;
                if let Some(session) = self.active {
                    let record = SessionRecord::failed(session.started, elapsed, session.theme);
                    self.store.record_session(&record)?;
                }
                StopOutcome::Failed { elapsed }
            }
            TimerState::BreakRunning | TimerState::BreakPaused => {
                self.timer.stop(now);
                StopOutcome::BreakEnded
            }
            TimerState::Finished => StopOutcome::Cleared,
            TimerState::Idle | TimerState::Failed => StopOutcome::Nothing,
        };

        self.timer.reset();
        self.active = None;
        tracing::info!(from = before.as_str(), ?outcome, "session stopped");
        Ok(outcome)
    }
}
