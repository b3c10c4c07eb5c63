//! Starting concurrent work with an explicit suspension point.
//!
//! Rust futures do nothing until polled, so "the body runs synchronously up to
//! its first await" does not happen by itself. [`initiate`] makes that boundary
//! explicit and moves it into the call itself:
//!
//! ```text
//! initiate(|| {            <- runs now, on the caller's thread
//!     prefix work ...
//!     async move {         <- suspension point: everything below is deferred
//!         continuation ...
//!     }
//! })                       -> TaskHandle (pending)
//! ```
//!
//! Whatever the prefix does, blocking work included, is paid for by the caller
//! before it gets the handle. Whatever the continuation does is paid for by
//! whoever awaits the handle.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::task::JoinHandle;

use crate::ProbeError;

/// Pending result of work started by [`initiate`].
///
/// Awaiting it yields the continuation's result. A panic in the continuation
/// surfaces as [`ProbeError::Join`]. Dropping the handle does not cancel the
/// work.
#[derive(Debug)]
#[must_use = "a TaskHandle does nothing useful unless awaited"]
pub struct TaskHandle<T> {
    join: JoinHandle<Result<T, ProbeError>>,
}

impl<T> Future for TaskHandle<T> {
    type Output = Result<T, ProbeError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.join).poll(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(err)) => Poll::Ready(Err(ProbeError::Join(err.to_string()))),
        }
    }
}

/// Run `prefix` now and spawn the continuation it returns.
///
/// Must be called from within a tokio runtime.
pub fn initiate<T, F, Fut>(prefix: F) -> TaskHandle<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, ProbeError>> + Send + 'static,
    T: Send + 'static,
{
    let continuation = prefix();
    TaskHandle {
        join: tokio::spawn(continuation),
    }
}

#[cfg(test)]
mod tests {
    use super::initiate;
    use crate::ProbeError;
    use std::sync::{Arc, Mutex};
    use std::time::{Duration, Instant};

    #[tokio::test]
    async fn prefix_runs_before_initiate_returns() {
        let trace = Arc::new(Mutex::new(Vec::new()));
        let t = trace.clone();
        let handle = initiate(move || {
            t.lock().unwrap().push("prefix");
            let t = t.clone();
            async move {
                t.lock().unwrap().push("continuation");
                Ok::<_, ProbeError>(7)
            }
        });
        trace.lock().unwrap().push("returned");
        assert_eq!(handle.await.unwrap(), 7);
        assert_eq!(
            *trace.lock().unwrap(),
            vec!["prefix", "returned", "continuation"]
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn blocking_prefix_is_paid_by_the_caller() {
        let start = Instant::now();
        let handle = initiate(|| {
            std::thread::sleep(Duration::from_millis(150));
            async { Ok::<_, ProbeError>(()) }
        });
        assert!(start.elapsed() >= Duration::from_millis(150));
        handle.await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn deferred_work_is_paid_by_the_waiter() {
        let start = Instant::now();
        let handle = initiate(|| async {
            tokio::time::sleep(Duration::from_millis(150)).await;
            Ok::<_, ProbeError>(())
        });
        assert!(start.elapsed() < Duration::from_millis(100));
        handle.await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(150));
    }

    #[tokio::test]
    async fn continuation_errors_propagate() {
        let handle = initiate(|| async { Err::<(), _>(ProbeError::Join("boom".into())) });
        assert!(matches!(handle.await, Err(ProbeError::Join(m)) if m == "boom"));
    }

    #[tokio::test]
    async fn panics_surface_as_join_errors() {
        let handle = initiate(|| async {
            if true {
                panic!("continuation exploded");
            }
            Ok::<(), ProbeError>(())
        });
        assert!(matches!(handle.await, Err(ProbeError::Join(_))));
    }
}
