//! Focus statistics calculation
//!
//! Aggregates session records into:
//! - Total and successful sessions, success rate
//! - Focused time and coins earned
//! - Successes on a given day and the current daily streak

use chrono::NaiveDate;
use std::collections::HashSet;

use crate::session::SessionRecord;

/// Aggregated focus statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FocusStats {
    /// Total number of sessions
    pub total_sessions: u32,
    /// Sessions that ran to completion
    pub successful_sessions: u32,
    /// Success rate as percentage (0-100)
    pub success_rate: u32,
    /// Total focused time in seconds
    pub total_seconds: u64,
    /// Coins earned by these sessions
    pub coins_earned: u64,
    /// Successful sessions on the reference day
    pub successes_today: u32,
    /// Consecutive days, ending on the reference day, with a success
    pub streak_days: u32,
}

impl FocusStats {
    /// Calculate statistics relative to `today`
    pub fn from_sessions(sessions: &[SessionRecord], today: NaiveDate) -> Self {
        if sessions.is_empty() {
            return Self::default();
        }

        let total_sessions = sessions.len() as u32;
        let successful_sessions = sessions.iter().filter(|s| s.success).count() as u32;

        let success_days: HashSet<NaiveDate> = sessions
            .iter()
            .filter(|s| s.success)
            .map(|s| s.start_time().date_naive())
            .collect();

        let successes_today = sessions
            .iter()
            .filter(|s| s.success && s.start_time().date_naive() == today)
            .count() as u32;

        Self {
            total_sessions,
            successful_sessions,
            success_rate: (successful_sessions * 100) / total_sessions,
            total_seconds: sessions.iter().map(|s| u64::from(s.duration)).sum(),
            coins_earned: sessions.iter().map(|s| u64::from(s.coins_earned)).sum(),
            successes_today,
            streak_days: streak_ending(&success_days, today),
        }
    }

    /// Get total hours and minutes as a tuple
    pub fn total_time(&self) -> (u64, u64) {
        let minutes = self.total_seconds / 60;
        (minutes / 60, minutes % 60)
    }
}

fn streak_ending(days: &HashSet<NaiveDate>, today: NaiveDate) -> u32 {
    let mut streak = 0;
    let mut cursor = Some(today);
    while let Some(day) = cursor.filter(|d| days.contains(d)) {
        streak += 1;
        cursor = day.pred_opt();
    }
    streak
}
