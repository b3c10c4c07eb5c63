//! The async timing probe.
//!
//! Each [`Pattern`] maps to a handler (`*_clicked`) that plays the role of a
//! button's click handler. Three of them delegate to a helper that is started with
//! [`initiate`](crate::initiate). Where the helper's blocking delay sits relative
//! to its suspension point decides who pays for it:
//!
//! | Pattern      | Helper             | Delay before suspension? | Cost lands on   |
//! |--------------|--------------------|--------------------------|-----------------|
//! | `Simple`     | none               | -                        | -               |
//! | `Await`      | `fetch_delegated`  | no delay                 | -               |
//! | `AwaitSleep` | `fetch_then_block` | no                       | awaiting handle |
//! | `SleepAwait` | `block_then_fetch` | yes                      | obtaining handle|
//!
//! Every probe point writes one [`LogEntry`] to the configured [`LogSink`].

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Local;
use probe_config::ProbeSettings;
use probe_fetch::Fetcher;
use probe_types::messages::{AFTER_CALL, AFTER_SLEEP, AWAITING, BEGIN, FAILED_PREFIX};
use probe_types::{LogEntry, Pattern, WorkerId, head};
use url::Url;

use crate::sink::LogSink;
use crate::task::{TaskHandle, initiate};
use crate::ProbeError;

const SIMPLE_CLICKED: &str = "simple_clicked";
const AWAIT_CLICKED: &str = "await_clicked";
const AWAIT_SLEEP_CLICKED: &str = "await_sleep_clicked";
const SLEEP_AWAIT_CLICKED: &str = "sleep_await_clicked";
const FETCH_DELEGATED: &str = "fetch_delegated";
const FETCH_THEN_BLOCK: &str = "fetch_then_block";
const BLOCK_THEN_FETCH: &str = "block_then_fetch";

/// Name of the handler that runs `pattern`, as it appears in log lines.
#[must_use]
pub const fn handler_context(pattern: Pattern) -> &'static str {
    match pattern {
        Pattern::Simple => SIMPLE_CLICKED,
        Pattern::Await => AWAIT_CLICKED,
        Pattern::AwaitSleep => AWAIT_SLEEP_CLICKED,
        Pattern::SleepAwait => SLEEP_AWAIT_CLICKED,
    }
}

/// What a finished handler reports back to the UI.
#[derive(Debug, Clone)]
pub struct ProbeOutcome {
    pub pattern: Pattern,
    /// Truncated body on success, error text on failure.
    pub result: Result<String, String>,
    pub elapsed: Duration,
}

impl ProbeOutcome {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

struct ProbeInner {
    fetcher: Arc<dyn Fetcher>,
    sink: Arc<dyn LogSink>,
    url: Url,
    blocking_delay: Duration,
    head_len: usize,
}

/// Runs the scheduling patterns against one shared fetcher.
///
/// Cheap to clone; clones share the fetcher and sink.
#[derive(Clone)]
pub struct Probe {
    inner: Arc<ProbeInner>,
}

impl std::fmt::Debug for Probe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Probe")
            .field("url", &self.inner.url.as_str())
            .field("blocking_delay", &self.inner.blocking_delay)
            .field("head_len", &self.inner.head_len)
            .finish_non_exhaustive()
    }
}

impl Probe {
    #[must_use]
    pub fn new(
        settings: &ProbeSettings,
        fetcher: Arc<dyn Fetcher>,
        sink: Arc<dyn LogSink>,
    ) -> Self {
        Self {
            inner: Arc::new(ProbeInner {
                fetcher,
                sink,
                url: settings.url.clone(),
                blocking_delay: settings.blocking_delay,
                head_len: settings.head_len,
            }),
        }
    }

    #[must_use]
    pub fn url(&self) -> &Url {
        &self.inner.url
    }

    #[must_use]
    pub fn blocking_delay(&self) -> Duration {
        self.inner.blocking_delay
    }

    /// Run one pattern's handler to completion.
    ///
    /// Failures are never swallowed. The handler logs them as `Failed: ...`
    /// under its own context, emits a `tracing` warning, and returns them in
    /// the outcome.
    pub async fn run(&self, pattern: Pattern) -> ProbeOutcome {
        let run = Run::start(self.clone());
        tracing::debug!(pattern = pattern.slug(), url = %self.inner.url, "probe started");

        let result = match pattern {
            Pattern::Simple => simple_clicked(&run).await,
            Pattern::Await => await_clicked(&run).await,
            Pattern::AwaitSleep => await_sleep_clicked(&run).await,
            Pattern::SleepAwait => sleep_await_clicked(&run).await,
        };

        let elapsed = run.elapsed();
        let result = match result {
            Ok(content) => {
                tracing::debug!(
                    pattern = pattern.slug(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    "probe finished"
                );
                Ok(head(&content, self.inner.head_len))
            }
            Err(err) => {
                run.write(
                    handler_context(pattern),
                    format!("{FAILED_PREFIX}{err}"),
                );
                tracing::warn!(pattern = pattern.slug(), "probe failed: {err}");
                Err(err.to_string())
            }
        };

        ProbeOutcome {
            pattern,
            result,
            elapsed,
        }
    }
}

/// One handler invocation: the probe plus the instant it started.
#[derive(Clone)]
struct Run {
    probe: Probe,
    started: Instant,
}

impl Run {
    fn start(probe: Probe) -> Self {
        Self {
            probe,
            started: Instant::now(),
        }
    }

    fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    fn write(&self, context: &'static str, message: impl Into<String>) {
        let entry = LogEntry::new(
            Local::now(),
            self.elapsed(),
            WorkerId::current(),
            context,
            message,
        );
        self.probe.inner.sink.emit(&entry);
    }

    fn write_head(&self, context: &'static str, content: &str) {
        self.write(context, head(content, self.probe.inner.head_len));
    }

    /// Send the GET now, on the worker pool. The returned future only waits for it.
    fn fetch(&self) -> impl Future<Output = Result<String, ProbeError>> + Send + 'static {
        let request = tokio::spawn(self.probe.inner.fetcher.fetch(&self.probe.inner.url));
        async move {
            match request.await {
                Ok(body) => body.map_err(ProbeError::from),
                Err(err) => Err(ProbeError::Join(err.to_string())),
            }
        }
    }

    /// Simulated non-suspending work. Occupies the current thread.
    fn block(&self) {
        std::thread::sleep(self.probe.inner.blocking_delay);
    }
}

// ----------------------------------------------------------------------------
// Handlers
// ----------------------------------------------------------------------------

async fn simple_clicked(run: &Run) -> Result<String, ProbeError> {
    run.write(SIMPLE_CLICKED, BEGIN);

    run.write(SIMPLE_CLICKED, AWAITING);
    let content = run.fetch().await?;

    run.write_head(SIMPLE_CLICKED, &content);
    Ok(content)
}

async fn await_clicked(run: &Run) -> Result<String, ProbeError> {
    delegate(run, AWAIT_CLICKED, fetch_delegated).await
}

async fn await_sleep_clicked(run: &Run) -> Result<String, ProbeError> {
    delegate(run, AWAIT_SLEEP_CLICKED, fetch_then_block).await
}

async fn sleep_await_clicked(run: &Run) -> Result<String, ProbeError> {
    delegate(run, SLEEP_AWAIT_CLICKED, block_then_fetch).await
}

/// Shared caller side of the delegated patterns.
async fn delegate(
    run: &Run,
    context: &'static str,
    helper: fn(&Run) -> TaskHandle<String>,
) -> Result<String, ProbeError> {
    run.write(context, BEGIN);

    let task = helper(run);
    run.write(context, AFTER_CALL);

    run.write(context, AWAITING);
    let content = task.await?;

    run.write_head(context, &content);
    Ok(content)
}

// ----------------------------------------------------------------------------
// Helpers
// ----------------------------------------------------------------------------

fn fetch_delegated(run: &Run) -> TaskHandle<String> {
    initiate(|| {
        run.write(FETCH_DELEGATED, BEGIN);

        run.write(FETCH_DELEGATED, AWAITING);
        let fetch = run.fetch();
        let run = run.clone();
        async move {
            let content = fetch.await?;
            run.write_head(FETCH_DELEGATED, &content);
            Ok(content)
        }
    })
}

fn fetch_then_block(run: &Run) -> TaskHandle<String> {
    initiate(|| {
        run.write(FETCH_THEN_BLOCK, BEGIN);

        run.write(FETCH_THEN_BLOCK, AWAITING);
        let fetch = run.fetch();
        let run = run.clone();
        async move {
            let content = fetch.await?;
            run.write_head(FETCH_THEN_BLOCK, &content);

            // Resumed on a runtime worker; the delay holds that worker, not the caller.
            run.block();
            run.write(FETCH_THEN_BLOCK, AFTER_SLEEP);
            Ok(content)
        }
    })
}

fn block_then_fetch(run: &Run) -> TaskHandle<String> {
    initiate(|| {
        run.write(BLOCK_THEN_FETCH, BEGIN);

        // No suspension point yet: this holds the caller's thread.
        run.block();
        run.write(BLOCK_THEN_FETCH, AFTER_SLEEP);

        run.write(BLOCK_THEN_FETCH, AWAITING);
        let fetch = run.fetch();
        let run = run.clone();
        async move {
            let content = fetch.await?;
            run.write_head(BLOCK_THEN_FETCH, &content);
            Ok(content)
        }
    })
}
