//! Phase timer engine
//!
//! A clock-agnostic state machine for alternating focus and break phases.
//! Every operation takes the caller's current time as `now`, in seconds on a
//! monotonically non-decreasing clock; the engine never reads a clock itself
//! and never blocks. Callers poll [`PhaseTimer::tick`] at whatever interval
//! suits them: time observed past a phase boundary is carried into the next
//! phase, so coarse or irregular polling neither loses nor double counts
//! elapsed time.
//!
//! Calls that make no sense in the current state (pausing while paused,
//! starting while running, ...) are ignored and leave the engine untouched.

use thiserror::Error;

/// Kind of phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Working interval
    Focus,
    /// Rest interval following a focus phase
    Break,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Focus => "focus",
            Phase::Break => "break",
        }
    }
}

/// Engine state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimerState {
    #[default]
    Idle,
    FocusRunning,
    FocusPaused,
    BreakRunning,
    BreakPaused,
    /// A phase ran to completion without auto-cycle
    Finished,
    /// A focus phase was stopped early
    Failed,
}

impl TimerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerState::Idle => "idle",
            TimerState::FocusRunning => "focus_running",
            TimerState::FocusPaused => "focus_paused",
            TimerState::BreakRunning => "break_running",
            TimerState::BreakPaused => "break_paused",
            TimerState::Finished => "finished",
            TimerState::Failed => "failed",
        }
    }

    /// Phase in progress, if any
    pub fn phase(&self) -> Option<Phase> {
        match self {
            TimerState::FocusRunning | TimerState::FocusPaused => Some(Phase::Focus),
            TimerState::BreakRunning | TimerState::BreakPaused => Some(Phase::Break),
            _ => None,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, TimerState::FocusRunning | TimerState::BreakRunning)
    }

    pub fn is_paused(&self) -> bool {
        matches!(self, TimerState::FocusPaused | TimerState::BreakPaused)
    }

    /// Whether a phase is running or paused
    pub fn is_active(&self) -> bool {
        self.phase().is_some()
    }

    /// Whether `start` would begin a new focus phase
    pub fn can_start(&self) -> bool {
        matches!(self, TimerState::Idle | TimerState::Finished | TimerState::Failed)
    }

    /// Everything except an active or paused break counts as focus context
    pub fn is_focus(&self) -> bool {
        self.phase() != Some(Phase::Break)
    }
}

/// Errors raised by the engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimerError {
    #[error("Durations must be positive (focus: {focus}s, break: {brk}s)")]
    InvalidDuration { focus: i64, brk: i64 },
}

/// Phase durations and cycling behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerConfig {
    /// Focus phase length in seconds
    pub focus_duration: u64,
    /// Break phase length in seconds
    pub break_duration: u64,
    /// Chain focus and break phases automatically
    pub auto_cycle: bool,
}

impl TimerConfig {
    /// Validate and build a configuration
    pub fn new(
        focus_seconds: i64,
        break_seconds: i64,
        auto_cycle: bool,
    ) -> Result<Self, TimerError> {
        if focus_seconds <= 0 || break_seconds <= 0 {
            return Err(TimerError::InvalidDuration {
                focus: focus_seconds,
                brk: break_seconds,
            });
        }
        Ok(Self {
            focus_duration: focus_seconds as u64,
            break_duration: break_seconds as u64,
            auto_cycle,
        })
    }

    fn duration_of(&self, phase: Phase) -> f64 {
        match phase {
            Phase::Focus => self.focus_duration as f64,
            Phase::Break => self.break_duration as f64,
        }
    }
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            focus_duration: 25 * 60,
            break_duration: 5 * 60,
            auto_cycle: false,
        }
    }
}

/// Read-only view of the engine at one instant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimerSnapshot {
    pub total_seconds: u64,
    pub remaining_seconds: u64,
    pub elapsed_seconds: u64,
    /// Elapsed share of the phase, in `[0, 1]`
    pub progress: f64,
    pub state: TimerState,
    pub is_focus: bool,
    pub completed_focus_sessions: u32,
}

/// Timing of the current phase.
///
/// `elapsed_before_pause` stays within `[0, phase_total]`; `started_at` is
/// only set while the phase is running.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct PhaseTiming {
    phase_total: f64,
    elapsed_before_pause: f64,
    started_at: Option<f64>,
}

impl PhaseTiming {
    fn begin(phase_total: f64, started_at: f64) -> Self {
        Self {
            phase_total,
            elapsed_before_pause: 0.0,
            started_at: Some(started_at),
        }
    }

    fn finished(phase_total: f64) -> Self {
        Self {
            phase_total,
            elapsed_before_pause: phase_total,
            started_at: None,
        }
    }

    /// Elapsed time without the upper clamp, used to measure overflow
    fn unclamped_elapsed(&self, now: f64) -> f64 {
        match self.started_at {
            Some(started_at) => self.elapsed_before_pause + (now - started_at).max(0.0),
            None => self.elapsed_before_pause,
        }
    }

    fn elapsed(&self, now: f64) -> f64 {
        self.unclamped_elapsed(now).clamp(0.0, self.phase_total)
    }
}

/// Inputs to the transition table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerEvent {
    Start,
    Pause,
    Resume,
    Stop,
    Reset,
    /// A running phase reached its full duration
    PhaseComplete,
}

/// Two-phase focus/break countdown engine
#[derive(Debug, Clone, Default)]
pub struct PhaseTimer {
    config: TimerConfig,
    state: TimerState,
    timing: PhaseTiming,
    completed_focus_sessions: u32,
}

impl PhaseTimer {
    /// Create an idle timer with the given configuration
    pub fn new(config: TimerConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn config(&self) -> TimerConfig {
        self.config
    }

    pub fn completed_focus_sessions(&self) -> u32 {
        self.completed_focus_sessions
    }

    /// Replace the configuration.
    ///
    /// The running phase keeps its length; the new durations apply from the
    /// next phase start. On error the previous configuration stays in effect.
    pub fn configure(
        &mut self,
        focus_seconds: i64,
        break_seconds: i64,
        auto_cycle: bool,
    ) -> Result<(), TimerError> {
        self.config = TimerConfig::new(focus_seconds, break_seconds, auto_cycle)?;
        tracing::debug!(
            focus = self.config.focus_duration,
            brk = self.config.break_duration,
            auto_cycle,
            "timer configured"
        );
        Ok(())
    }

    /// Begin a focus phase. Returns false (and does nothing) while a phase is
    /// already running or paused.
    pub fn start(&mut self, now: f64) -> bool {
        self.transition(TimerEvent::Start, now)
    }

    /// Freeze the running phase
    pub fn pause(&mut self, now: f64) -> bool {
        self.transition(TimerEvent::Pause, now)
    }

    /// Continue a paused phase from where it was frozen
    pub fn resume(&mut self, now: f64) -> bool {
        self.transition(TimerEvent::Resume, now)
    }

    /// Stop the current phase.
    ///
    /// Returns whether the session counts as a success: stopping a focus
    /// phase fails it, stopping a break resets to idle and succeeds, and a
    /// finished timer is trivially successful. Idle and failed timers return
    /// false and stay as they are.
    pub fn stop(&mut self, now: f64) -> bool {
        match self.state {
            TimerState::FocusRunning | TimerState::FocusPaused => {
                self.transition(TimerEvent::Stop, now);
                false
            }
            TimerState::BreakRunning | TimerState::BreakPaused => {
                self.transition(TimerEvent::Stop, now);
                true
            }
            TimerState::Finished => true,
            TimerState::Idle | TimerState::Failed => false,
        }
    }

    /// Return to idle, keeping the configuration and the session counter
    pub fn reset(&mut self) {
        // Reset ignores the clock.
        self.transition(TimerEvent::Reset, 0.0);
    }

    /// Advance the engine to `now`, completing the running phase if its
    /// duration has been reached.
    pub fn tick(&mut self, now: f64) -> TimerSnapshot {
        let complete = self.timing.unclamped_elapsed(now) >= self.timing.phase_total;
        if self.state.is_running() && complete {
            self.transition(TimerEvent::PhaseComplete, now);
        }
        self.snapshot(now)
    }

    /// Project the current state at `now` without changing anything
    pub fn snapshot(&self, now: f64) -> TimerSnapshot {
        let elapsed = self.timing.elapsed(now);
        let total_seconds = self.timing.phase_total as u64;
        let elapsed_seconds = (elapsed as u64).min(total_seconds);
        let progress = if self.timing.phase_total > 0.0 {
            (elapsed / self.timing.phase_total).clamp(0.0, 1.0)
        } else {
            0.0
        };

        TimerSnapshot {
            total_seconds,
            remaining_seconds: total_seconds - elapsed_seconds,
            elapsed_seconds,
            progress,
            state: self.state,
            is_focus: self.state.is_focus(),
            completed_focus_sessions: self.completed_focus_sessions,
        }
    }

    /// The whole transition table. Returns false when `event` has no effect
    /// in the current state.
    fn transition(&mut self, event: TimerEvent, now: f64) -> bool {
        use TimerState::*;

        let from = self.state;
        let to = match (from, event) {
            (_, TimerEvent::Reset) => {
                self.timing = PhaseTiming::default();
                Idle
            }
            (Idle | Finished | Failed, TimerEvent::Start) => {
                self.timing = PhaseTiming::begin(self.config.duration_of(Phase::Focus), now);
                FocusRunning
            }
            (FocusRunning | BreakRunning, TimerEvent::Pause) => {
                self.timing.elapsed_before_pause = self.timing.elapsed(now);
                self.timing.started_at = None;
                if from == FocusRunning {
                    FocusPaused
                } else {
                    BreakPaused
                }
            }
            (FocusPaused | BreakPaused, TimerEvent::Resume) => {
                self.timing.started_at = Some(now);
                if from == FocusPaused {
                    FocusRunning
                } else {
                    BreakRunning
                }
            }
            (FocusRunning | FocusPaused, TimerEvent::Stop) => {
                self.timing.elapsed_before_pause = self.timing.elapsed(now);
                self.timing.started_at = None;
                Failed
            }
            (BreakRunning | BreakPaused, TimerEvent::Stop) => {
                self.timing = PhaseTiming::default();
                Idle
            }
            (FocusRunning, TimerEvent::PhaseComplete) => {
                self.completed_focus_sessions += 1;
                self.complete_phase(Phase::Break, now)
            }
            (BreakRunning, TimerEvent::PhaseComplete) => self.complete_phase(Phase::Focus, now),
            _ => return false,
        };

        tracing::debug!(
            from = from.as_str(),
            to = to.as_str(),
            ?event,
            completed = self.completed_focus_sessions,
            "timer transition"
        );
        self.state = to;
        true
    }

    /// Finish the running phase and either chain into `next` or stop at
    /// `Finished`. A chained phase is backdated by the overflow so polling
    /// granularity never shifts the schedule.
    fn complete_phase(&mut self, next: Phase, now: f64) -> TimerState {
        if !self.config.auto_cycle {
            self.timing = PhaseTiming::finished(self.timing.phase_total);
            return TimerState::Finished;
        }

        let overflow = (self.timing.unclamped_elapsed(now) - self.timing.phase_total).max(0.0);
        self.timing = PhaseTiming::begin(self.config.duration_of(next), now - overflow);
        match next {
            Phase::Focus => TimerState::FocusRunning,
            Phase::Break => TimerState::BreakRunning,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timer(focus: i64, brk: i64, auto_cycle: bool) -> PhaseTimer {
        let mut timer = PhaseTimer::default();
        timer.configure(focus, brk, auto_cycle).unwrap();
        timer
    }

    fn assert_consistent(snapshot: &TimerSnapshot) {
        assert!(snapshot.elapsed_seconds <= snapshot.total_seconds);
        assert_eq!(snapshot.elapsed_seconds + snapshot.remaining_seconds, snapshot.total_seconds);
        assert!((0.0..=1.0).contains(&snapshot.progress));
    }

    #[test]
    fn test_initial_state() {
        let timer = PhaseTimer::default();
        let snapshot = timer.snapshot(0.0);
        assert_eq!(snapshot.state, TimerState::Idle);
        assert_eq!(snapshot.total_seconds, 0);
        assert_eq!(snapshot.progress, 0.0);
        assert!(snapshot.is_focus);
        assert_eq!(timer.config(), TimerConfig::default());
    }

    #[test]
    fn test_auto_cycle_focus_to_break() {
        let mut timer = timer(2, 2, true);
        assert!(timer.start(100.0));

        assert_eq!(timer.tick(100.0).state, TimerState::FocusRunning);
        let snapshot = timer.tick(102.1);

        assert_eq!(snapshot.state, TimerState::BreakRunning);
        assert!(!snapshot.is_focus);
        assert_eq!(timer.completed_focus_sessions(), 1);
        assert_eq!(snapshot.completed_focus_sessions, 1);
    }

    #[test]
    fn test_overflow_carries_into_next_phase() {
        let mut timer = timer(10, 5, true);
        timer.start(0.0);

        // Polled 3s late: the break has already run for 3s
        let snapshot = timer.tick(13.0);
        assert_eq!(snapshot.state, TimerState::BreakRunning);
        assert_eq!(snapshot.elapsed_seconds, 3);

        // Break still ends at 15, as if polled on time
        assert_eq!(timer.tick(14.9).state, TimerState::BreakRunning);
        let snapshot = timer.tick(15.0);
        assert_eq!(snapshot.state, TimerState::FocusRunning);
        assert_eq!(snapshot.elapsed_seconds, 0);
        assert_eq!(snapshot.total_seconds, 10);
    }

    #[test]
    fn test_coarse_polling_does_not_drift() {
        let mut timer = timer(3, 2, true);
        timer.start(0.0);

        // Each full cycle is 5s; poll every 0.7s for 10 cycles
        let mut now = 0.0;
        while now < 50.0 {
            now += 0.7;
            assert_consistent(&timer.tick(now));
        }
        // 50.4s in: 10 full cycles plus 0.4s into the next focus phase
        assert_eq!(timer.completed_focus_sessions(), 10);
        assert_eq!(timer.state(), TimerState::FocusRunning);
    }

    #[test]
    fn test_auto_cycle_break_to_focus() {
        let mut timer = timer(2, 3, true);
        timer.start(0.0);
        timer.tick(2.0);
        assert_eq!(timer.state(), TimerState::BreakRunning);

        let snapshot = timer.tick(5.5);
        assert_eq!(snapshot.state, TimerState::FocusRunning);
        assert_eq!(snapshot.total_seconds, 2);
        assert_eq!(snapshot.completed_focus_sessions, 1);
    }

    #[test]
    fn test_finish_without_auto_cycle() {
        let mut timer = timer(10, 5, false);
        timer.start(0.0);

        let snapshot = timer.tick(12.0);
        assert_eq!(snapshot.state, TimerState::Finished);
        assert_eq!(snapshot.elapsed_seconds, 10);
        assert_eq!(snapshot.remaining_seconds, 0);
        assert_eq!(snapshot.progress, 1.0);
        assert!(snapshot.is_focus);
        assert_eq!(timer.completed_focus_sessions(), 1);

        // Finished is frozen
        assert_eq!(timer.tick(100.0), snapshot);
        assert_eq!(timer.completed_focus_sessions(), 1);
    }

    #[test]
    fn test_pause_resume_keeps_elapsed_stable() {
        let mut timer = timer(10, 5, false);
        timer.start(10.0);

        timer.tick(10.0);
        assert!(timer.pause(15.0));
        let paused = timer.snapshot(15.0);
        let frozen = timer.snapshot(16.0);
        assert!(timer.resume(16.0));
        timer.tick(18.0);
        let resumed = timer.snapshot(18.0);

        assert_eq!(paused.state, TimerState::FocusPaused);
        assert_eq!(paused.elapsed_seconds, 5);
        assert_eq!(frozen.elapsed_seconds, 5);
        assert_eq!(resumed.elapsed_seconds, 7);
        assert_eq!(resumed.state, TimerState::FocusRunning);
    }

    #[test]
    fn test_paused_timer_ignores_time() {
        let mut timer = timer(10, 5, false);
        timer.start(0.0);
        timer.pause(4.0);

        let snapshot = timer.tick(1_000.0);
        assert_eq!(snapshot.state, TimerState::FocusPaused);
        assert_eq!(snapshot.elapsed_seconds, 4);
        assert_eq!(timer.snapshot(5_000.0), snapshot);
    }

    #[test]
    fn test_pause_and_resume_break() {
        let mut timer = timer(2, 10, true);
        timer.start(0.0);
        timer.tick(2.0);

        assert!(timer.pause(5.0));
        assert_eq!(timer.state(), TimerState::BreakPaused);
        assert!(!timer.snapshot(5.0).is_focus);
        assert!(timer.resume(20.0));
        assert_eq!(timer.state(), TimerState::BreakRunning);
        assert_eq!(timer.snapshot(21.0).elapsed_seconds, 4);
    }

    #[test]
    fn test_start_is_idempotent() {
        let mut timer = timer(10, 5, false);
        timer.start(0.0);
        timer.tick(3.0);

        assert!(!timer.start(3.0));
        assert_eq!(timer.snapshot(3.0).elapsed_seconds, 3);
        assert_eq!(timer.state(), TimerState::FocusRunning);

        timer.pause(4.0);
        assert!(!timer.start(9.0));
        assert_eq!(timer.state(), TimerState::FocusPaused);
        assert_eq!(timer.snapshot(9.0).elapsed_seconds, 4);
    }

    #[test]
    fn test_out_of_context_calls_are_ignored() {
        let mut timer = timer(10, 5, false);
        assert!(!timer.pause(1.0));
        assert!(!timer.resume(1.0));
        assert_eq!(timer.state(), TimerState::Idle);

        timer.start(0.0);
        assert!(!timer.resume(1.0));
        assert_eq!(timer.state(), TimerState::FocusRunning);

        timer.pause(2.0);
        assert!(!timer.pause(3.0));
        assert_eq!(timer.snapshot(3.0).elapsed_seconds, 2);
    }

    #[test]
    fn test_stop_focus_marks_failed() {
        let mut timer = timer(10, 5, false);
        timer.start(0.0);
        timer.tick(5.0);

        assert!(!timer.stop(5.0));
        assert_eq!(timer.state(), TimerState::Failed);

        let snapshot = timer.snapshot(8.0);
        assert_eq!(snapshot.elapsed_seconds, 5);
        assert!(snapshot.is_focus);
        assert_eq!(timer.completed_focus_sessions(), 0);
    }

    #[test]
    fn test_stop_paused_focus_fails() {
        let mut timer = timer(10, 5, false);
        timer.start(0.0);
        timer.pause(6.0);

        assert!(!timer.stop(9.0));
        assert_eq!(timer.state(), TimerState::Failed);
        assert_eq!(timer.snapshot(9.0).elapsed_seconds, 6);
    }

    #[test]
    fn test_stop_break_resets() {
        let mut timer = timer(2, 5, true);
        timer.start(0.0);
        timer.tick(3.0);
        assert_eq!(timer.state(), TimerState::BreakRunning);

        assert!(timer.stop(3.5));
        let snapshot = timer.snapshot(3.5);
        assert_eq!(snapshot.state, TimerState::Idle);
        assert_eq!(snapshot.elapsed_seconds, 0);
        assert_eq!(timer.completed_focus_sessions(), 1);
    }

    #[test]
    fn test_stop_in_terminal_states() {
        let mut timer = timer(1, 1, false);
        assert!(!timer.stop(0.0));
        assert_eq!(timer.state(), TimerState::Idle);

        timer.start(0.0);
        timer.tick(1.0);
        assert_eq!(timer.state(), TimerState::Finished);
        assert!(timer.stop(2.0));
        assert_eq!(timer.state(), TimerState::Finished);

        timer.start(3.0);
        timer.stop(3.5);
        assert_eq!(timer.state(), TimerState::Failed);
        assert!(!timer.stop(4.0));
        assert_eq!(timer.state(), TimerState::Failed);
    }

    #[test]
    fn test_restart_after_failure_and_finish() {
        let mut timer = timer(10, 5, false);
        timer.start(0.0);
        timer.stop(2.0);

        assert!(timer.start(50.0));
        let snapshot = timer.snapshot(51.0);
        assert_eq!(snapshot.state, TimerState::FocusRunning);
        assert_eq!(snapshot.elapsed_seconds, 1);

        timer.tick(60.0);
        assert_eq!(timer.state(), TimerState::Finished);
        assert!(timer.start(61.0));
        assert_eq!(timer.snapshot(61.0).elapsed_seconds, 0);
    }

    #[test]
    fn test_reset_keeps_counter_and_config() {
        let mut timer = timer(2, 2, false);
        timer.start(0.0);
        timer.tick(2.0);
        timer.reset();

        let snapshot = timer.snapshot(10.0);
        assert_eq!(snapshot.state, TimerState::Idle);
        assert_eq!(snapshot.total_seconds, 0);
        assert_eq!(snapshot.completed_focus_sessions, 1);
        assert_eq!(timer.config().focus_duration, 2);
    }

    #[test]
    fn test_configuration_rejection() {
        let mut timer = timer(30, 10, true);

        assert_eq!(
            timer.configure(0, 5, false),
            Err(TimerError::InvalidDuration { focus: 0, brk: 5 })
        );
        assert!(matches!(timer.configure(5, -1, false), Err(TimerError::InvalidDuration { .. })));

        let config = timer.config();
        assert_eq!(config.focus_duration, 30);
        assert_eq!(config.break_duration, 10);
        assert!(config.auto_cycle);
    }

    #[test]
    fn test_configure_does_not_resize_running_phase() {
        let mut timer = timer(10, 5, false);
        timer.start(0.0);
        timer.configure(60, 5, false).unwrap();

        assert_eq!(timer.snapshot(1.0).total_seconds, 10);
        assert_eq!(timer.tick(10.0).state, TimerState::Finished);

        timer.start(20.0);
        assert_eq!(timer.snapshot(20.0).total_seconds, 60);
    }

    #[test]
    fn test_clock_going_backwards_is_clamped() {
        let mut timer = timer(10, 5, false);
        timer.start(10.0);

        let snapshot = timer.snapshot(5.0);
        assert_eq!(snapshot.elapsed_seconds, 0);
        assert_eq!(snapshot.progress, 0.0);
        assert_consistent(&snapshot);
    }

    #[test]
    fn test_snapshot_invariants_across_lifecycle() {
        let mut timer = timer(7, 3, true);
        timer.start(0.0);
        let mut now = 0.0;
        for step in 0..200 {
            now += 0.35;
            match step % 37 {
                5 => {
                    timer.pause(now);
                }
                9 => {
                    timer.resume(now);
                }
                _ => {}
            }
            assert_consistent(&timer.tick(now));
            assert_consistent(&timer.snapshot(now + 0.1));
        }
        timer.stop(now);
        assert_consistent(&timer.snapshot(now));
    }

    #[test]
    fn test_state_helpers() {
        let mut timer = PhaseTimer::new(TimerConfig::new(4, 2, true).unwrap());
        assert!(timer.state().can_start());
        assert!(!timer.state().is_active());

        timer.start(0.0);
        assert_eq!(timer.state().phase().map(|p| p.as_str()), Some("focus"));
        timer.tick(4.0);
        timer.pause(5.0);
        assert!(timer.state().is_paused());
        assert_eq!(timer.state().phase(), Some(Phase::Break));
        assert_eq!(timer.state().as_str(), "break_paused");
    }

    #[test]
    fn test_progress_tracks_elapsed_share() {
        let mut timer = timer(8, 2, false);
        timer.start(0.0);
        let snapshot = timer.snapshot(2.0);
        assert!((snapshot.progress - 0.25).abs() < 1e-9);
        assert_eq!(snapshot.remaining_seconds, 6);
    }
}
