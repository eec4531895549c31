// SPDX-License-Identifier: MIT OR Apache-2.0

//! The receive loop

use super::{MessageBatch, RetryDecision, Session};
use crate::transport::Transport;
use chrono::Utc;
use std::sync::Arc;

/// Receive until the session is logged out, a receive fails, or nobody is
/// listening for batches any more. A failure within the retry budget
/// schedules the next run.
pub(super) async fn run<T: Transport>(session: Arc<Session<T>>) {
    tracing::debug!("receive loop started");

    loop {
        match session.transport.receive().await {
            Ok(mut messages) => {
                session.transition(|state| state.receive_succeeded(&mut messages));

                if !messages.is_empty() {
                    let kinds: Vec<&str> = messages.iter().map(|m| m.kind()).collect();
                    tracing::trace!(?kinds, "delivering batch");
                    let batch = MessageBatch {
                        messages,
                        received_at: Utc::now(),
                    };
                    if session.batch_tx.send(batch).is_err() {
                        tracing::debug!("batch receiver dropped, stopping receive loop");
                        break;
                    }
                }

                if !session.state().is_active() {
                    break;
                }
            }
            Err(err) => {
                let max_retries = session.settings.max_retries;
                let decision = session.transition(|state| state.receive_failed(&err, max_retries));
                match decision {
                    RetryDecision::Retry => {
                        tracing::warn!(
                            error = %err,
                            retry_times = session.state().retry_times,
                            "receive failed, retrying"
                        );
                        session.schedule_retry(session.settings.retry_delay);
                        return;
                    }
                    RetryDecision::Stop => {
                        tracing::warn!(error = %err, "receive failed, giving up");
                        break;
                    }
                }
            }
        }
    }

    tracing::debug!(status = ?session.state().status, "receive loop stopped");
}
