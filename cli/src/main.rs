//! awaitprobe CLI - Binary entry point and terminal session management.
//!
//! # Architecture
//!
//! The CLI bridges [`probe_engine`] (probe and application state) and
//! [`probe_tui`] (rendering), providing RAII-based terminal management with
//! guaranteed cleanup.
//!
//! ```text
//! main() -> settings + HttpFetcher -+-> run_headless(pattern)        (argument given)
//!                                   +-> TerminalSession -> run_app()  (no argument)
//! ```
//!
//! # Event Loop
//!
//! The TUI uses a fixed 8ms (~120 FPS) render cadence:
//!
//! 1. Wait for frame tick
//! 2. Drain input queue (non-blocking via [`probe_tui::InputPump`])
//! 3. Advance application state (`app.tick()`)
//! 4. Render frame

use anyhow::{Context, Result, bail};
use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use std::{
    env,
    fs::{self, OpenOptions},
    io::{Stdout, Write, stdout},
    path::PathBuf,
    process::ExitCode,
    sync::{Arc, Mutex},
    time::Duration,
};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use probe_config::{ProbeConfig, ProbeSettings, config_dir};
use probe_engine::{App, Fetcher, HttpFetcher, LineStyle, Pattern, Probe, WriteSink};
use probe_tui::{InputPump, draw, handle_events};
use tokio::task::LocalSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Tui,
    Headless(Pattern),
}

impl Mode {
    fn from_args(mut args: impl Iterator<Item = String>) -> Result<Self> {
        let Some(arg) = args.next() else {
            return Ok(Mode::Tui);
        };
        if let Some(extra) = args.next() {
            bail!("unexpected argument `{extra}`\n\n{USAGE}");
        }
        if arg == "-h" || arg == "--help" {
            bail!("{USAGE}");
        }
        let pattern = arg.parse::<Pattern>().with_context(|| USAGE.to_string())?;
        Ok(Mode::Headless(pattern))
    }
}

const USAGE: &str = "usage: awaitprobe [simple|await|await-sleep|sleep-await]";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"))
}

fn init_tracing(mode: Mode) {
    if matches!(mode, Mode::Headless(_)) {
        // stdout carries the probe lines; diagnostics go to stderr.
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr))
            .with(env_filter())
            .init();
        return;
    }

    let (log_file, init_warnings) = open_log_file();

    if let Some((log_path, file)) = log_file {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .with(env_filter())
            .init();

        tracing::info!(path = %log_path.display(), "Logging initialized");
        for warning in init_warnings {
            tracing::warn!("{warning}");
        }
        return;
    }

    // No log file: stay silent rather than drawing over the TUI.
    tracing_subscriber::registry().with(env_filter()).init();
}

fn open_log_file() -> (Option<(PathBuf, std::fs::File)>, Vec<String>) {
    let mut warnings = Vec::new();

    for candidate in log_file_candidates() {
        if let Some(parent) = candidate.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            warnings.push(format!(
                "Failed to create log dir {}: {e}",
                parent.display()
            ));
            continue;
        }

        match OpenOptions::new()
            .create(true)
            .append(true)
            .open(&candidate)
        {
            Ok(file) => return (Some((candidate, file)), warnings),
            Err(e) => {
                warnings.push(format!(
                    "Failed to open log file {}: {e}",
                    candidate.display()
                ));
            }
        }
    }

    (None, warnings)
}

fn log_file_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    // Primary: ~/.awaitprobe/logs/awaitprobe.log
    if let Some(dir) = config_dir() {
        candidates.push(dir.join("logs").join("awaitprobe.log"));
    }

    // Fallback: ./.awaitprobe/logs/awaitprobe.log
    candidates.push(
        PathBuf::from(".awaitprobe")
            .join("logs")
            .join("awaitprobe.log"),
    );

    candidates
}

/// Load `~/.awaitprobe/config.toml`; any problem is logged and defaults are used.
fn load_settings() -> ProbeSettings {
    let config = match ProbeConfig::load() {
        Ok(Some(config)) => config,
        Ok(None) => return ProbeSettings::default(),
        Err(e) => {
            tracing::warn!("Ignoring config file: {e}");
            return ProbeSettings::default();
        }
    };
    config.resolve().unwrap_or_else(|e| {
        tracing::warn!("Ignoring config file: {e}");
        ProbeSettings::default()
    })
}

/// RAII wrapper for terminal state with guaranteed cleanup on drop.
///
/// Raw mode and the alternate screen are restored on drop, so the terminal
/// stays usable after panics or early returns.
struct TerminalSession {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalSession {
    fn new() -> Result<Self> {
        enable_raw_mode()?;

        let mut out = stdout();
        if let Err(err) = execute!(out, EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(err.into());
        }

        let terminal = match Terminal::new(CrosstermBackend::new(out)) {
            Ok(t) => t,
            Err(err) => {
                let _ = disable_raw_mode();
                let _ = execute!(stdout(), LeaveAlternateScreen);
                return Err(err.into());
            }
        };

        Ok(Self { terminal })
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let mode = Mode::from_args(env::args().skip(1))?;
    init_tracing(mode);

    let settings = load_settings();
    let fetcher: Arc<dyn Fetcher> =
        Arc::new(HttpFetcher::new(&settings.http).context("building HTTP client")?);

    match mode {
        Mode::Headless(pattern) => Ok(run_headless(&settings, fetcher, pattern, stdout()).await),
        Mode::Tui => {
            let mut app = App::new(&settings, fetcher);
            let mut session = TerminalSession::new()?;
            // Handlers are spawned onto this thread and run whenever the frame loop yields.
            LocalSet::new()
                .run_until(run_app(&mut session.terminal, &mut app))
                .await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Run one pattern, writing each probe line to `out` as it happens.
///
/// Fails when the fetch fails or a line could not be written.
async fn run_headless<W>(
    settings: &ProbeSettings,
    fetcher: Arc<dyn Fetcher>,
    pattern: Pattern,
    out: W,
) -> ExitCode
where
    W: Write + Send + 'static,
{
    let style = LineStyle {
        show_worker: settings.show_thread_id,
    };
    let sink = Arc::new(WriteSink::new(out, style));
    let probe = Probe::new(settings, fetcher, sink.clone());
    tracing::info!(pattern = pattern.slug(), url = %probe.url(), "headless run");

    let outcome = probe.run(pattern).await;

    if outcome.is_ok() && !sink.failed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

const FRAME_DURATION: Duration = Duration::from_millis(8);

async fn run_app<B>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()>
where
    B: Backend,
    B::Error: Send + Sync + 'static,
{
    let mut input = InputPump::new();
    let mut frames = tokio::time::interval(FRAME_DURATION);
    frames.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let result: Result<()> = loop {
        frames.tick().await;

        // Non-blocking input (drain queue only)
        match handle_events(app, &mut input) {
            Ok(true) => break Ok(()),
            Ok(false) => {}
            Err(e) => break Err(e),
        }

        app.tick();

        if let Err(e) = terminal.draw(|frame| draw(frame, app)) {
            break Err(e.into());
        }
    };

    input.shutdown().await;
    result
}
