//! focus - Focus/break session timer with coin rewards
//!
//! "Grow something while you work."
//!
//! Usage:
//!   focus run                   Run a focus phase with the saved settings
//!   focus run --preset deep     Run a 50-minute deep work phase
//!   focus run --auto-cycle      Alternate focus and break phases
//!   focus stats [DAYS]          Show focus statistics
//!   focus history               List recent sessions
//!   focus config                Show timer settings
//!   focus config set KEY VALUE  Change a timer setting
//!   focus presets               List presets

use std::io::Write;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{bail, Result};
use chrono::{Local, Utc};
use clap::{Parser, Subcommand};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use grove_core::{format, Paths, Settings};
use tracing_subscriber::EnvFilter;

use focus::preset::{durations_for, Preset};
use focus::session::Theme;
use focus::stats::FocusStats;
use focus::store::FocusStore;
use focus::timer::{TimerConfig, TimerSnapshot, TimerState};
use focus::{Companion, FrameEvent, StopOutcome};

/// Focus - Focus/break session timer with coin rewards
#[derive(Parser)]
#[command(name = "focus")]
#[command(about = "Focus/break session timer with coin rewards and session history")]
#[command(version)]
#[command(after_help = r#"PRESETS:
    pomodoro    25 min focus, 5 min break (default)
    deep        50 min focus, 10 min break
    quick       1 min focus, 30 s break
    custom      focus_minutes / break_minutes from settings

EXAMPLES:
    focus run                       # Run one focus phase
    focus run --focus 45 --break 15 # Custom durations for this run
    focus run --auto-cycle -n 4     # Four focus phases with breaks between
    focus stats 30                  # Show 30-day statistics
    focus config set auto_cycle on  # Always chain phases

REWARDS:
    Each completed focus phase earns one coin per five minutes (at least
    one). Interrupting a focus phase records a failed session.

CONTROLS (while running):
    space, p        Pause / resume the current phase
    q, Esc, Ctrl-C  Stop (a focus phase stopped early counts as failed)

LOGGING:
    Set RUST_LOG=focus=debug to trace timer transitions on stderr.
"#)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run focus (and break) phases in the foreground
    #[command(alias = "r")]
    Run {
        /// Preset to use instead of the saved one
        #[arg(long)]
        preset: Option<String>,

        /// Focus length in minutes (implies the custom preset)
        #[arg(long, value_name = "MINS")]
        focus: Option<u32>,

        /// Break length in minutes (implies the custom preset)
        #[arg(long = "break", value_name = "MINS")]
        break_minutes: Option<u32>,

        /// Chain focus and break phases automatically
        #[arg(long)]
        auto_cycle: bool,

        /// Scene theme recorded with the session
        #[arg(long)]
        theme: Option<String>,

        /// With auto-cycle, stop after this many completed focus phases
        #[arg(short = 'n', long)]
        cycles: Option<u32>,

        /// Polling interval in milliseconds
        #[arg(long, default_value = "250")]
        interval_ms: u64,
    },

    /// Show focus statistics
    #[command(alias = "statistics")]
    Stats {
        /// Number of days to show (default: 7)
        #[arg(default_value = "7")]
        days: u32,
    },

    /// List recent sessions
    #[command(alias = "log")]
    History {
        /// Number of sessions to show
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Show or change timer settings
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },

    /// List presets
    Presets,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current settings
    Show,
    /// Change one setting
    Set {
        /// preset, focus_minutes, break_minutes, auto_cycle or theme
        key: String,
        value: String,
    },
}

// ANSI color codes
const RED: &str = "\x1b[0;31m";
const GREEN: &str = "\x1b[0;32m";
const YELLOW: &str = "\x1b[0;33m";
const CYAN: &str = "\x1b[0;36m";
const MAGENTA: &str = "\x1b[0;35m";
const BOLD: &str = "\x1b[1m";
const NC: &str = "\x1b[0m";

/// Check if stdout is a TTY and colors should be used
fn use_colors() -> bool {
    std::io::IsTerminal::is_terminal(&std::io::stdout())
}

/// Conditionally apply color
fn color(code: &str, text: &str) -> String {
    if use_colors() {
        format!("{}{}{}", code, text, NC)
    } else {
        text.to_string()
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let paths = Paths::new();
    let store = FocusStore::new(&paths.state("focus"))?;
    let settings_path = paths.settings_file();
    let settings = Settings::load(&settings_path)?;

    match cli.command {
        Some(Commands::Run {
            preset,
            focus,
            break_minutes,
            auto_cycle,
            theme,
            cycles,
            interval_ms,
        }) => {
            let settings = run_settings(settings, preset, focus, break_minutes, auto_cycle, theme)?;
            cmd_run(store, settings, cycles, interval_ms)
        }
        Some(Commands::Stats { days }) => cmd_stats(&store, days),
        Some(Commands::History { limit }) => cmd_history(&store, limit),
        Some(Commands::Config { action }) => match action {
            Some(ConfigAction::Set { key, value }) => {
                cmd_config_set(settings, &settings_path, &key, &value)
            }
            Some(ConfigAction::Show) | None => cmd_config_show(&settings),
        },
        Some(Commands::Presets) => cmd_presets(&settings),
        None => cmd_stats(&store, 7),
    }
}

/// Apply command-line overrides on top of the saved settings
fn run_settings(
    mut settings: Settings,
    preset: Option<String>,
    focus: Option<u32>,
    break_minutes: Option<u32>,
    auto_cycle: bool,
    theme: Option<String>,
) -> Result<Settings> {
    if let Some(name) = preset {
        let Some(preset) = Preset::from_str(&name) else {
            bail!("Unknown preset '{}'. Run 'focus presets' to list them.", name);
        };
        settings.preset = preset.as_str().to_string();
    }
    if focus.is_some() || break_minutes.is_some() {
        let (current_focus, current_break) = durations_for(&settings);
        settings.preset = Preset::Custom.as_str().to_string();
        settings.focus_minutes = focus.unwrap_or((current_focus / 60) as u32);
        settings.break_minutes = break_minutes.unwrap_or((current_break / 60) as u32);
    }
    if auto_cycle {
        settings.auto_cycle = true;
    }
    if let Some(theme) = theme {
        settings.theme = theme;
    }
    Ok(settings)
}

/// Keyboard controls while a session runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Control {
    TogglePause,
    Stop,
}

/// Map a key press to a session control
fn control_for(key: KeyEvent) -> Option<Control> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    match key.code {
        KeyCode::Char(' ') | KeyCode::Char('p') => Some(Control::TogglePause),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(Control::Stop),
        KeyCode::Char('q') | KeyCode::Esc => Some(Control::Stop),
        _ => None,
    }
}

/// Raw terminal mode for the lifetime of a run, restored on drop
struct RawMode;

impl RawMode {
    fn enable() -> Result<Self> {
        enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
    }
}

/// Wait up to `timeout` for a control key
fn poll_control(timeout: Duration) -> Result<Option<Control>> {
    if event::poll(timeout)? {
        if let Event::Key(key) = event::read()? {
            return Ok(control_for(key));
        }
    }
    Ok(None)
}

/// Print a full line; raw mode needs an explicit carriage return
fn emit(text: &str) {
    print!("{}\r\n", text);
    let _ = std::io::stdout().flush();
}

/// Run phases until the timer finishes, the cycle budget is spent or the
/// user stops. Stopping a focus phase records it as failed.
fn cmd_run(
    store: FocusStore,
    settings: Settings,
    cycles: Option<u32>,
    interval_ms: u64,
) -> Result<()> {
    let mut companion = Companion::new(store, settings)?;
    let config = companion.timer().config();

    let origin = Instant::now();
    let clock = || origin.elapsed().as_secs_f64();
    let interval = Duration::from_millis(interval_ms.max(10));
    let interactive = use_colors() && std::io::IsTerminal::is_terminal(&std::io::stdin());

    println!("{}", color(&format!("{}{}", BOLD, MAGENTA), "FOCUS MODE"));
    println!();
    println!("  {}     {}", color(CYAN, "Focus:"), format::duration(config.focus_duration));
    println!("  {}     {}", color(CYAN, "Break:"), format::duration(config.break_duration));
    println!("  {}     {}", color(CYAN, "Theme:"), companion.theme().as_str());
    println!(
        "  {} {}",
        color(CYAN, "Auto-cycle:"),
        if config.auto_cycle { "on" } else { "off" }
    );
    println!();
    if interactive {
        println!("  space: pause/resume   q: stop");
        println!();
    }

    let _raw = if interactive { Some(RawMode::enable()?) } else { None };
    companion.start(clock(), Utc::now())?;

    loop {
        let control = if interactive {
            poll_control(interval)?
        } else {
            thread::sleep(interval);
            None
        };
        let now = clock();

        match control {
            Some(Control::Stop) => {
                clear_line();
                report_stop(companion.stop(now)?);
                break;
            }
            Some(Control::TogglePause) => {
                companion.toggle_pause(now);
            }
            None => {}
        }

        match companion.frame(now, Utc::now())? {
            FrameEvent::FocusCompleted {
                coins,
                balance,
                finished,
                snapshot,
            } => {
                clear_line();
                emit(&format!(
                    "{} Focus complete! +{} coins (balance: {})",
                    color(GREEN, "[ok]"),
                    coins,
                    balance
                ));

                if finished {
                    break;
                }
                let done = snapshot.completed_focus_sessions;
                if cycles.is_some_and(|n| done >= n) {
                    if let StopOutcome::BreakEnded = companion.stop(now)? {
                        emit(&format!("{} {} focus phases done", color(GREEN, "[ok]"), done));
                    }
                    break;
                }
                emit(&color(&format!("{}{}", BOLD, GREEN), "BREAK TIME"));
            }
            FrameEvent::Tick(snapshot) => render(&snapshot),
        }
    }

    Ok(())
}

fn report_stop(outcome: StopOutcome) {
    match outcome {
        StopOutcome::Failed { elapsed } => emit(&format!(
            "{} Session stopped early after {} and was not counted",
            color(RED, "[failed]"),
            format::clock(elapsed)
        )),
        StopOutcome::BreakEnded => emit(&format!("{} Break ended", color(GREEN, "[ok]"))),
        StopOutcome::Cleared | StopOutcome::Nothing => {}
    }
}

fn clear_line() {
    if use_colors() {
        print!("\r\x1b[2K");
    }
}

/// Redraw the progress line in place
fn render(snapshot: &TimerSnapshot) {
    if !use_colors() {
        return;
    }

    let label = match snapshot.state {
        TimerState::FocusRunning => color(MAGENTA, "focus"),
        TimerState::BreakRunning => color(GREEN, "break"),
        TimerState::FocusPaused => color(YELLOW, "focus (paused)"),
        TimerState::BreakPaused => color(YELLOW, "break (paused)"),
        other => color(YELLOW, other.as_str()),
    };

    clear_line();
    print!(
        "  {} [{}] {} remaining",
        label,
        format::progress_bar(snapshot.progress, 30),
        format::clock(snapshot.remaining_seconds)
    );
    let _ = std::io::stdout().flush();
}

/// Show focus statistics
fn cmd_stats(store: &FocusStore, days: u32) -> Result<()> {
    let sessions = store.get_sessions_for_days(days)?;
    let stats = FocusStats::from_sessions(&sessions, Utc::now().date_naive());
    let (hours, mins) = stats.total_time();

    println!("{}Focus Statistics (Last {} days){}", BOLD, days, NC);
    println!();
    println!("  {}    {}", color(CYAN, "Total Sessions:"), stats.total_sessions);
    println!(
        "  {}        {} ({}%)",
        color(CYAN, "Successful:"),
        stats.successful_sessions,
        stats.success_rate
    );
    println!("  {}  {}h {}m", color(CYAN, "Total Focus Time:"), hours, mins);
    println!("  {}             {}", color(CYAN, "Today:"), stats.successes_today);
    println!("  {}    {} days", color(CYAN, "Current Streak:"), stats.streak_days);
    println!("  {}             {}", color(CYAN, "Coins:"), store.coins_balance()?);

    Ok(())
}

/// List recent sessions
fn cmd_history(store: &FocusStore, limit: usize) -> Result<()> {
    let sessions = store.recent_sessions(limit)?;
    if sessions.is_empty() {
        println!("No sessions yet");
        println!();
        println!("Start one with: focus run");
        return Ok(());
    }

    for session in sessions {
        let mark = if session.success {
            color(GREEN, "\u{2713}")
        } else {
            color(RED, "\u{2717}")
        };
        let started = session.start_time().with_timezone(&Local);
        println!(
            "{} {} \u{00b7} {} \u{00b7} {}",
            mark,
            started.format("%Y-%m-%d %H:%M"),
            format::clock(u64::from(session.duration)),
            session.theme.as_str()
        );
    }

    Ok(())
}

/// Show current settings
fn cmd_config_show(settings: &Settings) -> Result<()> {
    for key in Settings::KEYS {
        let value = settings.get(key).unwrap_or_default();
        println!("  {} {}", color(CYAN, &format!("{:<14}", key)), value);
    }
    Ok(())
}

/// Change a setting, rejecting values the timer would refuse
fn cmd_config_set(
    mut settings: Settings,
    path: &std::path::Path,
    key: &str,
    value: &str,
) -> Result<()> {
    settings.set(key, value)?;

    if key == "preset" && Preset::from_str(&settings.preset).is_none() {
        bail!("Unknown preset '{}'. Run 'focus presets' to list them.", value);
    }
    if key == "theme" {
        settings.theme = Theme::normalize(&settings.theme).as_str().to_string();
    }
    let (focus, brk) = durations_for(&settings);
    TimerConfig::new(focus, brk, settings.auto_cycle)?;

    settings.save(path)?;
    println!(
        "{} {} = {}",
        color(GREEN, "[ok]"),
        key,
        settings.get(key).unwrap_or_default()
    );
    Ok(())
}

/// List presets
fn cmd_presets(settings: &Settings) -> Result<()> {
    for preset in Preset::ALL {
        let (focus, brk) = preset.durations(settings.focus_minutes, settings.break_minutes);
        let marker = if settings.preset == preset.as_str() { "*" } else { " " };
        println!(
            "{} {:<9} {:>7} / {:<7} {}",
            marker,
            preset.as_str(),
            format::duration(focus.max(0) as u64),
            format::duration(brk.max(0) as u64),
            preset.description()
        );
    }
    Ok(())
}
