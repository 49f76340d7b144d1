//! Focus session storage
//!
//! Persists finished sessions and the coin wallet.
//! - Session logs: ~/.local/share/grove/focus/sessions-YYYY-MM-DD.jsonl
//! - Wallet: ~/.local/share/grove/focus/wallet.json

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use crate::session::SessionRecord;

const LOG_PREFIX: &str = "sessions-";
const LOG_SUFFIX: &str = ".jsonl";

#[derive(Debug, Default, Serialize, Deserialize)]
struct Wallet {
    balance: u64,
}

/// Focus session store
pub struct FocusStore {
    /// Base directory for focus data
    data_dir: PathBuf,
}

impl FocusStore {
    /// Create a new focus store with the given data directory
    pub fn new(data_dir: &Path) -> Result<Self> {
        fs::create_dir_all(data_dir).with_context(|| {
            format!("Failed to create focus data directory: {}", data_dir.display())
        })?;

        Ok(Self {
            data_dir: data_dir.to_path_buf(),
        })
    }

    fn wallet_path(&self) -> PathBuf {
        self.data_dir.join("wallet.json")
    }

    /// Get the path to the session log for a specific date
    fn session_log_path(&self, date: &NaiveDate) -> PathBuf {
        self.data_dir.join(format!("{}{}{}", LOG_PREFIX, date, LOG_SUFFIX))
    }

    /// Append a finished session to the log for its start date
    pub fn record_session(&self, session: &SessionRecord) -> Result<()> {
        let date = session.start_time().date_naive();
        let path = self.session_log_path(&date);

        let line = serde_json::to_string(session).context("Failed to serialize session record")?;

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open session log: {}", path.display()))?;

        writeln!(file, "{}", line)
            .with_context(|| format!("Failed to write to session log: {}", path.display()))?;

        tracing::info!(
            success = session.success,
            duration = session.duration,
            coins = session.coins_earned,
            "session recorded"
        );
        Ok(())
    }

    /// Get all sessions for a specific date
    pub fn get_sessions_for_date(&self, date: &NaiveDate) -> Result<Vec<SessionRecord>> {
        let path = self.session_log_path(date);
        if !path.exists() {
            return Ok(Vec::new());
        }
        read_log(&path)
    }

    /// Get all sessions for the last N days, oldest first
    pub fn get_sessions_for_days(&self, days: u32) -> Result<Vec<SessionRecord>> {
        let today = Utc::now().date_naive();
        let mut all_sessions = Vec::new();

        for i in 0..days {
            let date = today - chrono::Duration::days(i as i64);
            all_sessions.extend(self.get_sessions_for_date(&date)?);
        }

        all_sessions.sort_by_key(|s| s.start);
        Ok(all_sessions)
    }

    /// Get the most recent sessions across all logs, newest first
    pub fn recent_sessions(&self, limit: usize) -> Result<Vec<SessionRecord>> {
        let mut logs: Vec<PathBuf> = fs::read_dir(&self.data_dir)
            .with_context(|| format!("Failed to list focus data: {}", self.data_dir.display()))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| name.starts_with(LOG_PREFIX) && name.ends_with(LOG_SUFFIX))
            })
            .collect();
        // Date-stamped names sort chronologically
        logs.sort();

        let mut sessions = Vec::new();
        for path in logs.iter().rev() {
            let mut day = read_log(path)?;
            day.sort_by_key(|s| std::cmp::Reverse(s.start));
            sessions.extend(day);
            if sessions.len() >= limit {
                break;
            }
        }

        sessions.truncate(limit);
        Ok(sessions)
    }

    /// Current coin balance (0 before the first reward)
    pub fn coins_balance(&self) -> Result<u64> {
        Ok(self.load_wallet()?.balance)
    }

    /// Credit (or debit) coins; the balance never drops below zero.
    /// Returns the new balance.
    pub fn add_coins(&self, amount: i64) -> Result<u64> {
        let mut wallet = self.load_wallet()?;
        wallet.balance = wallet.balance.saturating_add_signed(amount);

        let path = self.wallet_path();
        let content = serde_json::to_string_pretty(&wallet).context("Failed to serialize wallet")?;
        fs::write(&path, content)
            .with_context(|| format!("Failed to write wallet: {}", path.display()))?;

        tracing::debug!(amount, balance = wallet.balance, "wallet updated");
        Ok(wallet.balance)
    }

    fn load_wallet(&self) -> Result<Wallet> {
        let path = self.wallet_path();
        if !path.exists() {
            return Ok(Wallet::default());
        }
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read wallet: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse wallet: {}", path.display()))
    }
}

/// Read one JSONL log, skipping lines that don't parse
fn read_log(path: &Path) -> Result<Vec<SessionRecord>> {
    let file = fs::File::open(path)
        .with_context(|| format!("Failed to open session log: {}", path.display()))?;

    let reader = BufReader::new(file);
    let mut sessions = Vec::new();

    for (line_num, line) in reader.lines().enumerate() {
        let line = line
            .with_context(|| format!("Failed to read line {} of session log", line_num + 1))?;

        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<SessionRecord>(&line) {
            Ok(session) => sessions.push(session),
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    line = line_num + 1,
                    error = %e,
                    "skipping malformed session"
                );
            }
        }
    }

    Ok(sessions)
}
