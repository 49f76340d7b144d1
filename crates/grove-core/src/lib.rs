//! Grove Core - Shared functionality for grove tools
//!
//! A focus-session companion: timed focus and break phases, coins for
//! finished sessions, and a local session log.

pub mod config;
pub mod format;
pub mod paths;

pub use config::Settings;
pub use paths::Paths;
