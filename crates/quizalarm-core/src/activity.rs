//! Cancellable background activities

use std::future::Future;
use tokio::task::JoinHandle;

/// Handle to a spawned background activity.
///
/// `cancel` aborts the task; calling it again is a no-op. Dropping the
/// handle cancels as well.
#[derive(Debug, Default)]
pub struct ActivityHandle {
    task: Option<JoinHandle<()>>,
}

impl ActivityHandle {
    /// Spawn `fut` on the current tokio runtime
    pub fn spawn<F>(fut: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Self {
            task: Some(tokio::spawn(fut)),
        }
    }

    /// A handle with nothing attached
    pub fn idle() -> Self {
        Self { task: None }
    }

    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    /// Let the task run to completion without this handle
    pub fn detach(&mut self) {
        self.task = None;
    }

    /// True while a task is attached and has not finished
    pub fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }
}

impl Drop for ActivityHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}
