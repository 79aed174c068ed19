//! Background execution context for the blocking and task call styles.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use tokio::runtime::{Builder, Handle, Runtime};
use tokio_util::sync::CancellationToken;

use crate::{task::CallTask, Result, SkillError};

/// Owns the runtime that backs `*_blocking` and `*_task` calls, plus the
/// cancellation token observed by every in-flight retry loop.
///
/// The async call style never schedules work here; it only shares the
/// cancellation token, so one `shutdown` terminates all three styles.
pub(crate) struct BackgroundRuntime {
    // Taken exactly once, at shutdown. The handle stays usable for guarded
    // submissions until the `closed` flag flips.
    runtime: Mutex<Option<Runtime>>,
    handle: Handle,
    cancel: CancellationToken,
    closed: AtomicBool,
}

impl BackgroundRuntime {
    pub(crate) fn start() -> Result<Self> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("skill-http")
            .enable_all()
            .build()
            .map_err(SkillError::Runtime)?;
        let handle = runtime.handle().clone();

        Ok(Self {
            runtime: Mutex::new(Some(runtime)),
            handle,
            cancel: CancellationToken::new(),
            closed: AtomicBool::new(false),
        })
    }

    pub(crate) fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Spawns a call onto the background runtime.
    ///
    /// After shutdown the task is rejected up front and resolves with
    /// [`SkillError::Cancelled`] without touching the network.
    pub(crate) fn spawn<T, F>(&self, future: F) -> CallTask<T>
    where
        T: Send + 'static,
        F: Future<Output = Result<T>> + Send + 'static,
    {
        if self.is_closed() {
            return CallTask::rejected(SkillError::Cancelled);
        }
        CallTask::running(self.handle.spawn(future))
    }

    /// Drives a call to completion on the current thread.
    ///
    /// Panics if invoked from within an async context; the public blocking
    /// methods document that contract.
    pub(crate) fn block_on<T, F>(&self, future: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        if self.is_closed() {
            return Err(SkillError::Cancelled);
        }
        self.handle.block_on(future)
    }

    /// Cancels outstanding work and releases the runtime. Idempotent.
    pub(crate) fn shutdown(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.cancel.cancel();

        let runtime = self
            .runtime
            .lock()
            .map(|mut slot| slot.take())
            .unwrap_or(None);
        if let Some(runtime) = runtime {
            // Non-blocking teardown: safe from async contexts and Drop.
            runtime.shutdown_background();
        }
    }
}

impl Drop for BackgroundRuntime {
    fn drop(&mut self) {
        self.shutdown();
    }
}
