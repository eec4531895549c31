// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cancellable background actions

use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;

/// A spawned action that is aborted when cancelled or dropped.
///
/// Delays use `tokio::time`, so tests can drive them with paused time.
#[derive(Debug)]
pub struct ScheduledTask {
    name: &'static str,
    handle: JoinHandle<()>,
}

impl ScheduledTask {
    /// Run `action` now on the runtime
    pub fn spawn<F>(name: &'static str, action: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        tracing::trace!(task = name, "scheduling task");
        Self {
            name,
            handle: tokio::spawn(action),
        }
    }

    /// Run `action` once `delay` has elapsed
    pub fn after<F>(name: &'static str, delay: Duration, action: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Self::spawn(name, async move {
            tokio::time::sleep(delay).await;
            action.await;
        })
    }

    /// Task name, for logging
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Abort the action if it has not finished
    pub fn cancel(&self) {
        if !self.handle.is_finished() {
            tracing::debug!(task = self.name, "cancelling task");
            self.handle.abort();
        }
    }

    /// Whether the action is still pending or running
    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
