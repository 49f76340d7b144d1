//! focus - Focus/break session timer with coin rewards
//!
//! "Grow something while you work."
//!
//! The crate is built around [`PhaseTimer`], a clock-agnostic state machine
//! that alternates focus and break phases. Around it:
//! - Presets for common focus/break rhythms
//! - Session records, themes and the coin reward policy
//! - A JSONL session log and coin wallet
//! - Statistics: success rate, today's successes, daily streak
//! - [`Companion`], which drives a timer and records what happens
//!
//! Commands:
//! - run: Run focus/break phases in the foreground
//! - stats [DAYS]: Show focus statistics
//! - history: List recent sessions
//! - config: Show or change timer settings
//! - presets: List presets

pub mod companion;
pub mod preset;
pub mod session;
pub mod stats;
pub mod store;
pub mod timer;

pub use companion::{Companion, FrameEvent, StopOutcome};
pub use preset::Preset;
pub use session::{SessionRecord, Theme};
pub use stats::FocusStats;
pub use store::FocusStore;
pub use timer::{Phase, PhaseTimer, TimerConfig, TimerError, TimerSnapshot, TimerState};
