//! Future-style call handles for work running on the background runtime.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::task::JoinHandle;

use crate::{Result, SkillError};

/// Handle to a call executing on the client's background runtime.
///
/// Returned immediately by the `*_task` methods. Await it to obtain the same
/// result the async and blocking styles would produce; an aborted or
/// shut-down call resolves with [`SkillError::Cancelled`].
#[derive(Debug)]
pub struct CallTask<T> {
    state: State<T>,
}

#[derive(Debug)]
enum State<T> {
    Running(JoinHandle<Result<T>>),
    Rejected(Option<SkillError>),
}

impl<T> CallTask<T> {
    pub(crate) fn running(handle: JoinHandle<Result<T>>) -> Self {
        Self {
            state: State::Running(handle),
        }
    }

    pub(crate) fn rejected(error: SkillError) -> Self {
        Self {
            state: State::Rejected(Some(error)),
        }
    }

    /// Aborts the underlying call; the handle then resolves with
    /// [`SkillError::Cancelled`]. A finished call is unaffected.
    pub fn abort(&self) {
        if let State::Running(handle) = &self.state {
            handle.abort();
        }
    }

    /// Whether the call has already completed.
    pub fn is_finished(&self) -> bool {
        match &self.state {
            State::Running(handle) => handle.is_finished(),
            State::Rejected(_) => true,
        }
    }
}

impl<T> Future for CallTask<T> {
    type Output = Result<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match &mut self.get_mut().state {
            State::Running(handle) => match Pin::new(handle).poll(cx) {
                Poll::Pending => Poll::Pending,
                Poll::Ready(Ok(result)) => Poll::Ready(result),
                Poll::Ready(Err(join_error)) => {
                    if join_error.is_panic() {
                        std::panic::resume_unwind(join_error.into_panic());
                    }
                    Poll::Ready(Err(SkillError::Cancelled))
                }
            },
            State::Rejected(error) => match error.take() {
                Some(error) => Poll::Ready(Err(error)),
                None => panic!("CallTask polled after completion"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{CallTask, SkillError};

    #[tokio::test]
    async fn running_task_resolves_with_inner_result() {
        let handle = tokio::spawn(async { Ok::<_, SkillError>(5u32) });
        let value = CallTask::running(handle).await;
        assert_eq!(value.expect("must succeed"), 5);
    }

    #[tokio::test]
    async fn rejected_task_resolves_immediately() {
        let task: CallTask<u32> = CallTask::rejected(SkillError::Cancelled);
        assert!(task.is_finished());
        assert!(matches!(
            task.await.expect_err("must fail"),
            SkillError::Cancelled
        ));
    }

    #[tokio::test]
    async fn aborted_task_resolves_cancelled() {
        let handle = tokio::spawn(async {
            tokio::time::sleep(std::time::Duration::from_secs(60)).await;
            Ok::<_, SkillError>(0u32)
        });
        let task = CallTask::running(handle);
        task.abort();
        assert!(matches!(
            task.await.expect_err("must fail"),
            SkillError::Cancelled
        ));
    }
}
