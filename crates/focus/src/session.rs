//! Session records and rewards
//!
//! A session record is written whenever a focus phase ends, successfully or
//! not. Successful sessions earn coins.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Scene theme a session was run under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Forest,
    Flight,
    Ice,
    Hourglass,
}

impl Theme {
    pub const ALL: [Theme; 4] = [Theme::Forest, Theme::Flight, Theme::Ice, Theme::Hourglass];

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Forest => "forest",
            Theme::Flight => "flight",
            Theme::Ice => "ice",
            Theme::Hourglass => "hourglass",
        }
    }

    /// Map a theme name to a theme, falling back to forest
    pub fn normalize(name: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|theme| theme.as_str().eq_ignore_ascii_case(name.trim()))
            .unwrap_or_default()
    }
}

/// Coins awarded for a successful focus phase: one per five minutes, at
/// least one.
pub fn coin_reward(focus_duration_secs: u64) -> u32 {
    u32::try_from((focus_duration_secs / 300).max(1)).unwrap_or(u32::MAX)
}

fn saturating_secs(duration: u64) -> u32 {
    u32::try_from(duration).unwrap_or(u32::MAX)
}

/// A finished session (stored in session logs)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// When the focus phase started (Unix timestamp)
    pub start: i64,
    /// Seconds actually focused
    pub duration: u32,
    /// Theme in effect
    pub theme: Theme,
    /// Whether the focus phase ran to completion
    pub success: bool,
    /// Coins credited for this session
    #[serde(default)]
    pub coins_earned: u32,
}

impl SessionRecord {
    /// A focus phase that ran its full length
    pub fn succeeded(start: DateTime<Utc>, duration: u64, theme: Theme, coins_earned: u32) -> Self {
        Self {
            start: start.timestamp(),
            duration: saturating_secs(duration),
            theme,
            success: true,
            coins_earned,
        }
    }

    /// A focus phase stopped early; failures never earn coins
    pub fn failed(start: DateTime<Utc>, duration: u64, theme: Theme) -> Self {
        Self {
            start: start.timestamp(),
            duration: saturating_secs(duration),
            theme,
            success: false,
            coins_earned: 0,
        }
    }

    /// Get the start time as a DateTime
    pub fn start_time(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.start, 0).unwrap_or_default()
    }
}
