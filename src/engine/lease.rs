// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::observability::messages::consumer::LeaseRenewalFailed;
use crate::observability::messages::StructuredLog;
use crate::traits::{QueueClient, ReceiptHandle};

/// Background task that keeps one delivery's lease alive.
///
/// Renews every `interval`, first after one full interval. Renewal failures
/// are logged and the task keeps going. Dropping the value cancels the task;
/// [`LeaseRenewal::stop`] cancels and waits, so no renewal is in flight once it
/// returns.
pub struct LeaseRenewal {
    token: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl LeaseRenewal {
    pub fn start(
        queue: Arc<dyn QueueClient>,
        receipt: ReceiptHandle,
        interval: Duration,
        lease: Duration,
    ) -> Self {
        let token = CancellationToken::new();
        let cancelled = token.clone();

        let task = tokio::spawn(async move {
            let mut ticks = interval_at(Instant::now() + interval, interval);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    _ = cancelled.cancelled() => break,
                    _ = ticks.tick() => {}
                }

                tokio::select! {
                    biased;
                    _ = cancelled.cancelled() => break,
                    result = queue.renew_lease(&receipt, lease) => {
                        if let Err(error) = result {
                            LeaseRenewalFailed {
                                receipt: receipt.as_str(),
                                error: &error,
                            }
                            .log();
                        }
                    }
                }
            }
        });

        Self {
            token,
            task: Some(task),
        }
    }

    /// Stop renewing and wait for the task to finish.
    pub async fn stop(mut self) {
        self.token.cancel();
        if let Some(task) = self.task.take() {
            if let Err(error) = task.await {
                tracing::warn!(error = %error, "Lease renewal task ended abnormally");
            }
        }
    }
}

impl Drop for LeaseRenewal {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
