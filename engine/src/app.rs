//! UI-facing application state.
//!
//! A button press behaves like an `async void` click handler. The handler is
//! spawned onto the UI thread's [`LocalSet`](tokio::task::LocalSet), the press
//! returns at once, and nobody awaits the result inline. Handlers only run when
//! the UI loop yields, so a blocking prefix stalls the UI loop itself, while
//! continuations started with [`initiate`](crate::initiate) run on the worker
//! pool. Outcomes and log entries come back over channels and are drained by
//! [`App::tick`] once per frame.

use std::collections::VecDeque;
use std::sync::Arc;

use probe_config::ProbeSettings;
use probe_fetch::Fetcher;
use probe_types::{LineStyle, LogEntry, Pattern};
use tokio::sync::mpsc;

use crate::probe::{Probe, ProbeOutcome};
use crate::sink::{ChannelSink, LogSink, Tee, TracingSink};

/// Log pane keeps at most this many entries; oldest are dropped first.
pub const LOG_CAPACITY: usize = 1000;

pub struct App {
    probe: Probe,
    style: LineStyle,
    focus: Pattern,
    log: VecDeque<LogEntry>,
    log_rx: mpsc::UnboundedReceiver<LogEntry>,
    outcome_tx: mpsc::UnboundedSender<ProbeOutcome>,
    outcome_rx: mpsc::UnboundedReceiver<ProbeOutcome>,
    last: [Option<ProbeOutcome>; 4],
    in_flight: usize,
    ticks: usize,
    should_quit: bool,
}

impl App {
    /// Build the app with a probe that logs to both `tracing` and the log pane.
    #[must_use]
    pub fn new(settings: &ProbeSettings, fetcher: Arc<dyn Fetcher>) -> Self {
        let style = LineStyle {
            show_worker: settings.show_thread_id,
        };
        let (log_tx, log_rx) = mpsc::unbounded_channel();
        let sink: Arc<dyn LogSink> = Arc::new(
            Tee::new()
                .with(Arc::new(TracingSink::new(style)))
                .with(Arc::new(ChannelSink::new(log_tx))),
        );
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();

        Self {
            probe: Probe::new(settings, fetcher, sink),
            style,
            focus: Pattern::Simple,
            log: VecDeque::new(),
            log_rx,
            outcome_tx,
            outcome_rx,
            last: [None, None, None, None],
            in_flight: 0,
            ticks: 0,
            should_quit: false,
        }
    }

    #[must_use]
    pub fn probe(&self) -> &Probe {
        &self.probe
    }

    #[must_use]
    pub fn style(&self) -> LineStyle {
        self.style
    }

    #[must_use]
    pub fn focus(&self) -> Pattern {
        self.focus
    }

    pub fn focus_next(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn focus_prev(&mut self) {
        self.focus = self.focus.prev();
    }

    pub fn press_focused(&mut self) {
        self.press(self.focus);
    }

    /// Queue `pattern`'s handler on the UI thread and return immediately.
    ///
    /// Must be called from within a [`LocalSet`](tokio::task::LocalSet) context.
    pub fn press(&mut self, pattern: Pattern) {
        self.focus = pattern;
        self.in_flight += 1;
        tracing::debug!(pattern = pattern.slug(), in_flight = self.in_flight, "button pressed");

        let probe = self.probe.clone();
        let tx = self.outcome_tx.clone();
        tokio::task::spawn_local(async move {
            let outcome = probe.run(pattern).await;
            let _ = tx.send(outcome);
        });
    }

    /// Drain pending log entries and outcomes. Call once per frame.
    pub fn tick(&mut self) {
        self.ticks = self.ticks.wrapping_add(1);

        // Outcomes first: a handler's entries are all sent before its outcome,
        // so draining the log afterwards never leaves a finished run half-shown.
        while let Ok(outcome) = self.outcome_rx.try_recv() {
            self.in_flight = self.in_flight.saturating_sub(1);
            let idx = outcome.pattern.index();
            self.last[idx] = Some(outcome);
        }

        while let Ok(entry) = self.log_rx.try_recv() {
            if self.log.len() == LOG_CAPACITY {
                self.log.pop_front();
            }
            self.log.push_back(entry);
        }
    }

    #[must_use]
    pub fn log(&self) -> &VecDeque<LogEntry> {
        &self.log
    }

    /// Log pane contents, formatted.
    pub fn log_lines(&self) -> impl Iterator<Item = String> + '_ {
        self.log.iter().map(|e| e.line(self.style))
    }

    pub fn clear_log(&mut self) {
        self.log.clear();
    }

    #[must_use]
    pub fn last_outcome(&self, pattern: Pattern) -> Option<&ProbeOutcome> {
        self.last[pattern.index()].as_ref()
    }

    /// Handlers started but not yet reported back.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Frames ticked so far; drives the spinner.
    #[must_use]
    pub fn tick_count(&self) -> usize {
        self.ticks
    }

    pub fn request_quit(&mut self) {
        self.should_quit = true;
    }

    #[must_use]
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }
}

#[cfg(test)]
mod tests {
    use super::{App, LOG_CAPACITY};
    use crate::probe::handler_context;
    use chrono::Local;
    use probe_config::ProbeSettings;
    use probe_fetch::ScriptedFetcher;
    use probe_types::{LogEntry, Pattern, WorkerId};
    use std::sync::Arc;
    use std::time::{Duration, Instant};
    use tokio::task::LocalSet;

    fn app_with(blocking_ms: u64, latency_ms: u64) -> App {
        let settings = ProbeSettings {
            blocking_delay: Duration::from_millis(blocking_ms),
            ..ProbeSettings::default()
        };
        App::new(
            &settings,
            Arc::new(ScriptedFetcher::ok(
                "<!doctype html>",
                Duration::from_millis(latency_ms),
            )),
        )
    }

    fn app(latency_ms: u64) -> App {
        app_with(10, latency_ms)
    }

    async fn settle(app: &mut App) {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            app.tick();
            if app.in_flight() == 0 {
                return;
            }
            assert!(Instant::now() < deadline, "handlers did not settle");
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn press_returns_before_the_fetch_completes() {
        LocalSet::new()
            .run_until(async {
                let mut app = app(200);
                let start = Instant::now();
                app.press(Pattern::Await);
                assert!(start.elapsed() < Duration::from_millis(100));
                assert_eq!(app.in_flight(), 1);

                settle(&mut app).await;
                let outcome = app.last_outcome(Pattern::Await).expect("outcome recorded");
                assert_eq!(outcome.result.as_deref(), Ok("<!doctype html>"));
                assert!(app.last_outcome(Pattern::Simple).is_none());
            })
            .await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn handler_lines_stay_on_the_ui_thread() {
        LocalSet::new()
            .run_until(async {
                let ui = WorkerId::current();
                let mut app = app_with(50, 30);
                for pattern in Pattern::ALL {
                    app.press(pattern);
                    settle(&mut app).await;
                }

                for pattern in Pattern::ALL {
                    let ctx = handler_context(pattern);
                    let workers: Vec<WorkerId> = app
                        .log()
                        .iter()
                        .filter(|e| e.context() == ctx)
                        .map(LogEntry::worker)
                        .collect();
                    assert!(workers.len() >= 3, "{ctx}: {workers:?}");
                    assert!(workers.iter().all(|w| *w == ui), "{ctx}: {workers:?}");
                }
            })
            .await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn blocking_prefix_stalls_the_ui_loop() {
        LocalSet::new()
            .run_until(async {
                let mut app = app_with(150, 10);
                let start = Instant::now();
                app.press(Pattern::SleepAwait);
                assert!(start.elapsed() < Duration::from_millis(50));

                // The queued handler runs as soon as the UI loop yields.
                tokio::task::yield_now().await;
                assert!(start.elapsed() >= Duration::from_millis(150));
                settle(&mut app).await;
            })
            .await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn log_pane_receives_formatted_lines() {
        LocalSet::new()
            .run_until(async {
                let mut app = app(5);
                app.press(Pattern::Simple);
                settle(&mut app).await;
                let lines: Vec<String> = app.log_lines().collect();
                assert_eq!(lines.len(), 3);
                assert!(lines[0].ends_with("simple_clicked() / Begin"));
                assert!(lines[0].contains(" / T"));
                assert!(lines[2].ends_with("/ <!doctype html>"));
                app.clear_log();
                assert!(app.log().is_empty());
            })
            .await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrent_presses_all_report_back() {
        LocalSet::new()
            .run_until(async {
                let mut app = app(30);
                for pattern in Pattern::ALL {
                    app.press(pattern);
                }
                assert_eq!(app.in_flight(), 4);
                settle(&mut app).await;
                for pattern in Pattern::ALL {
                    assert!(app.last_outcome(pattern).is_some_and(|o| o.is_ok()));
                }
            })
            .await;
    }

    #[tokio::test]
    async fn log_is_capped() {
        let mut app = app(0);
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        app.log_rx = rx;
        for i in 0..LOG_CAPACITY + 5 {
            tx.send(LogEntry::new(
                Local::now(),
                Duration::ZERO,
                WorkerId::current(),
                "test",
                i.to_string(),
            ))
            .unwrap();
        }
        app.tick();
        assert_eq!(app.log().len(), LOG_CAPACITY);
        assert_eq!(app.log().front().unwrap().message(), "5");
    }

    #[test]
    fn focus_and_quit() {
        let mut app = app(0);
        assert_eq!(app.focus(), Pattern::Simple);
        app.focus_prev();
        assert_eq!(app.focus(), Pattern::SleepAwait);
        app.focus_next();
        app.focus_next();
        assert_eq!(app.focus(), Pattern::Await);
        assert!(!app.should_quit());
        app.request_quit();
        assert!(app.should_quit());
    }

    #[test]
    fn thread_id_can_be_hidden() {
        let settings = ProbeSettings {
            show_thread_id: false,
            ..ProbeSettings::default()
        };
        let app = App::new(
            &settings,
            Arc::new(ScriptedFetcher::ok("", Duration::ZERO)),
        );
        assert!(!app.style().show_worker);
    }
}
