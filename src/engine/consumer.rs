// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Queue consumer: the poll loop and per-message delivery.
//!
//! The loop long-polls the queue and hands every received message to its own
//! task. Each task owns a [`LeaseRenewal`] for its delivery, decodes the body,
//! dispatches it, and deletes the message only when the handler asked to stop.
//! Every other outcome leaves the message on the queue, so the backend
//! redelivers it once the lease runs out.
//!
//! ```text
//! receive ──► spawn ──► renew lease ─┐
//!                      decode        │
//!                      dispatch      │
//!                      stop renewal ◄┘
//!                      delete (Stop only)
//! ```

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::Instrument;

use crate::config::ConsumerSettings;
use crate::engine::dispatcher::{Dispatched, Dispatcher};
use crate::engine::lease::LeaseRenewal;
use crate::errors::ConsumerError;
use crate::message::Message;
use crate::observability::messages::consumer::{
    AcknowledgeFailed, ConsumerStarted, ConsumerStopped, DecodeFailed, HandlerFailed,
    MessageAcknowledged, MessageReceived, MessageUnhandled, ReceiveFailed,
};
use crate::observability::messages::StructuredLog;
use crate::traits::{Handling, HandlerRegistry, QueueClient, ReceivedMessage};

/// Terminal state of one delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// Handler stopped and the message was deleted.
    Acknowledged,
    /// Handler stopped but the delete failed; the message will come back.
    AcknowledgeFailed,
    /// Handler passed the message on and nothing consumed it.
    Continued,
    /// No handler is registered for the message type.
    Unhandled,
    /// The handler returned an error.
    HandlerFailed,
    /// The body could not be decoded.
    DecodeFailed,
}

#[derive(Clone)]
pub struct QueueConsumer {
    queue: Arc<dyn QueueClient>,
    dispatcher: Dispatcher,
    settings: ConsumerSettings,
}

impl QueueConsumer {
    pub fn new(
        queue: Arc<dyn QueueClient>,
        registry: Arc<HandlerRegistry>,
        settings: ConsumerSettings,
    ) -> Self {
        Self {
            queue,
            dispatcher: Dispatcher::new(registry),
            settings,
        }
    }

    /// Poll until `shutdown` is cancelled or receiving fails for good.
    ///
    /// In-flight deliveries are always drained before this returns, on both
    /// the shutdown and the error path.
    pub async fn run(&self, shutdown: CancellationToken) -> Result<(), ConsumerError> {
        ConsumerStarted {
            queue: self.queue.name(),
            wait: self.settings.wait,
            lease: self.settings.lease,
            renew_interval: self.settings.renew_interval,
            max_in_flight: self.settings.max_in_flight,
        }
        .log();

        let tracker = TaskTracker::new();
        let limit = self.settings.max_in_flight.map(|n| Arc::new(Semaphore::new(n)));
        let mut failures: u32 = 0;

        let result = loop {
            // Wait for capacity before asking for more work
            let first_permit = match &limit {
                Some(semaphore) => tokio::select! {
                    biased;
                    _ = shutdown.cancelled() => break Ok(()),
                    permit = Arc::clone(semaphore).acquire_owned() => match permit {
                        Ok(permit) => Some(permit),
                        Err(_) => break Ok(()),
                    },
                },
                None => None,
            };

            let max_messages = match &limit {
                Some(semaphore) => self
                    .settings
                    .receive_batch_size
                    .min(semaphore.available_permits() + 1),
                None => self.settings.receive_batch_size,
            };

            let received = tokio::select! {
                biased;
                _ = shutdown.cancelled() => break Ok(()),
                result = self.queue.receive(max_messages, self.settings.wait, self.settings.lease) => result,
            };

            let messages = match received {
                Ok(messages) => {
                    failures = 0;
                    messages
                }
                Err(error) => {
                    failures += 1;
                    let retry_in = self.settings.receive_error_policy.backoff(failures);
                    ReceiveFailed {
                        queue: self.queue.name(),
                        attempts: failures,
                        retry_in,
                        error: &error,
                    }
                    .log();

                    match retry_in {
                        Some(delay) => {
                            tokio::select! {
                                biased;
                                _ = shutdown.cancelled() => break Ok(()),
                                _ = tokio::time::sleep(delay) => continue,
                            }
                        }
                        None => {
                            break Err(ConsumerError::Receive {
                                attempts: failures,
                                source: error,
                            })
                        }
                    }
                }
            };

            let mut first_permit = first_permit;
            for received in messages {
                let permit = match (first_permit.take(), &limit) {
                    (Some(permit), _) => Some(permit),
                    (None, Some(semaphore)) => acquire(semaphore).await,
                    (None, None) => None,
                };

                let consumer = self.clone();
                tracker.spawn(async move {
                    consumer.process(received).await;
                    drop(permit);
                });
            }
        };

        tracker.close();
        tracker.wait().await;

        ConsumerStopped {
            queue: self.queue.name(),
            reason: match &result {
                Ok(()) => "shutdown requested",
                Err(_) => "receive failed",
            },
        }
        .log();

        result
    }

    /// Run one delivery to its terminal state.
    pub async fn process(&self, received: ReceivedMessage) -> DeliveryOutcome {
        let message_id = received.id.to_string();
        let announce = MessageReceived {
            message_id: &message_id,
            body_size: received.body.len(),
        };
        let span = announce.span("delivery");
        announce.log();

        self.deliver(&message_id, received).instrument(span).await
    }

    async fn deliver(&self, message_id: &str, received: ReceivedMessage) -> DeliveryOutcome {
        let started = Instant::now();
        let renewal = LeaseRenewal::start(
            Arc::clone(&self.queue),
            received.receipt.clone(),
            self.settings.renew_interval,
            self.settings.lease,
        );

        let message = match Message::decode(&received.body) {
            Ok(message) => message,
            Err(error) => {
                renewal.stop().await;
                DecodeFailed {
                    message_id,
                    error: &error,
                }
                .log();
                return DeliveryOutcome::DecodeFailed;
            }
        };

        let dispatched = self.dispatcher.dispatch(&message).await;
        renewal.stop().await;

        let message_type = message.message_type().unwrap_or("<untyped>");
        match dispatched {
            Ok(Dispatched::Handled(Handling::Stop)) => {
                match self.queue.delete(&received.receipt).await {
                    Ok(()) => {
                        MessageAcknowledged {
                            message_id,
                            message_type,
                            duration: started.elapsed(),
                        }
                        .log();
                        DeliveryOutcome::Acknowledged
                    }
                    Err(error) => {
                        AcknowledgeFailed {
                            message_id,
                            error: &error,
                        }
                        .log();
                        DeliveryOutcome::AcknowledgeFailed
                    }
                }
            }
            Ok(Dispatched::Handled(Handling::Continue)) => {
                MessageUnhandled {
                    message_id,
                    message_type,
                    reason: "handler passed it on and nothing else consumes it",
                }
                .log();
                DeliveryOutcome::Continued
            }
            Ok(Dispatched::NoHandler) => {
                MessageUnhandled {
                    message_id,
                    message_type,
                    reason: "no handler registered for type",
                }
                .log();
                DeliveryOutcome::Unhandled
            }
            Err(error) => {
                HandlerFailed {
                    message_id,
                    message_type,
                    error: &error,
                }
                .log();
                DeliveryOutcome::HandlerFailed
            }
        }
    }
}

/// Only the poll loop acquires permits, so capacity seen before a receive is
/// still there afterwards; fall back to waiting anyway.
async fn acquire(semaphore: &Arc<Semaphore>) -> Option<OwnedSemaphorePermit> {
    match Arc::clone(semaphore).try_acquire_owned() {
        Ok(permit) => Some(permit),
        Err(_) => Arc::clone(semaphore).acquire_owned().await.ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::stub::{FailingHandler, RecordingQueue, SlowHandler, StaticHandler};
    use crate::config::{ReceiveErrorPolicy, RegistryBuilder};
    use crate::traits::{MessageHandler, MessageId, ReceiptHandle};
    use std::time::Duration;

    fn settings() -> ConsumerSettings {
        ConsumerSettings {
            wait: Duration::from_secs(1),
            ..ConsumerSettings::default()
        }
    }

    fn consumer_with(
        queue: Arc<RecordingQueue>,
        handlers: Vec<(&str, Arc<dyn MessageHandler>)>,
        settings: ConsumerSettings,
    ) -> QueueConsumer {
        let mut builder = RegistryBuilder::new();
        for (message_type, handler) in handlers {
            builder.register_message_handler(message_type, handler).unwrap();
        }
        QueueConsumer::new(queue, Arc::new(builder.build()), settings)
    }

    fn as_dyn<H: MessageHandler + 'static>(handler: Arc<H>) -> Arc<dyn MessageHandler> {
        handler
    }

    async fn receive_one(queue: &RecordingQueue, body: String) -> ReceivedMessage {
        queue.send(body).await.unwrap();
        queue
            .receive(1, Duration::ZERO, Duration::from_secs(30))
            .await
            .unwrap()
            .remove(0)
    }

    #[tokio::test]
    async fn test_delivery_outcomes() {
        struct TestCase {
            name: &'static str,
            body: String,
            expected: DeliveryOutcome,
            expected_deletes: usize,
            remaining: usize,
        }

        let test_cases = vec![
            TestCase {
                name: "stop acknowledges",
                body: Message::create("io.example.stop").encode().unwrap(),
                expected: DeliveryOutcome::Acknowledged,
                expected_deletes: 1,
                remaining: 0,
            },
            TestCase {
                name: "continue keeps message",
                body: Message::create("io.example.continue").encode().unwrap(),
                expected: DeliveryOutcome::Continued,
                expected_deletes: 0,
                remaining: 1,
            },
            TestCase {
                name: "handler error keeps message",
                body: Message::create("io.example.fail").encode().unwrap(),
                expected: DeliveryOutcome::HandlerFailed,
                expected_deletes: 0,
                remaining: 1,
            },
            TestCase {
                name: "unregistered type keeps message",
                body: Message::create("io.example.nobody").encode().unwrap(),
                expected: DeliveryOutcome::Unhandled,
                expected_deletes: 0,
                remaining: 1,
            },
            TestCase {
                name: "undecodable body keeps message",
                body: "%%% not base64 %%%".to_string(),
                expected: DeliveryOutcome::DecodeFailed,
                expected_deletes: 0,
                remaining: 1,
            },
        ];

        for test_case in test_cases {
            let queue = Arc::new(RecordingQueue::new());
            let consumer = consumer_with(
                queue.clone(),
                vec![
                    ("io.example.stop", as_dyn(Arc::new(StaticHandler::new("stop", Handling::Stop)))),
                    (
                        "io.example.continue",
                        as_dyn(Arc::new(StaticHandler::new("continue", Handling::Continue))),
                    ),
                    ("io.example.fail", as_dyn(Arc::new(FailingHandler::new()))),
                ],
                settings(),
            );

            let received = receive_one(&queue, test_case.body).await;
            let outcome = consumer.process(received).await;

            assert_eq!(outcome, test_case.expected, "Test case '{}' failed", test_case.name);
            assert_eq!(
                queue.deletes(),
                test_case.expected_deletes,
                "Test case '{}' failed",
                test_case.name
            );
            assert_eq!(
                queue.len().await,
                test_case.remaining,
                "Test case '{}' failed",
                test_case.name
            );
        }
    }

    #[tokio::test]
    async fn test_failed_delete_is_reported() {
        let queue = Arc::new(RecordingQueue::new());
        queue.fail_deletes();
        let consumer = consumer_with(
            queue.clone(),
            vec![("io.example.stop", as_dyn(Arc::new(StaticHandler::new("stop", Handling::Stop))))],
            settings(),
        );

        let received = receive_one(&queue, Message::create("io.example.stop").encode().unwrap()).await;

        assert_eq!(consumer.process(received).await, DeliveryOutcome::AcknowledgeFailed);
        assert_eq!(queue.len().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_handler_gets_renewals_and_none_after() {
        struct TestCase {
            name: &'static str,
            finish: Option<Handling>,
            expected: DeliveryOutcome,
            deletes: usize,
        }

        let test_cases = vec![
            TestCase {
                name: "stop",
                finish: Some(Handling::Stop),
                expected: DeliveryOutcome::Acknowledged,
                deletes: 1,
            },
            TestCase {
                name: "continue",
                finish: Some(Handling::Continue),
                expected: DeliveryOutcome::Continued,
                deletes: 0,
            },
            TestCase {
                name: "handler error",
                finish: None,
                expected: DeliveryOutcome::HandlerFailed,
                deletes: 0,
            },
        ];

        for test_case in test_cases {
            let queue = Arc::new(RecordingQueue::new());
            let handler = SlowHandler::finishing(Duration::from_secs(60), test_case.finish);
            let consumer = consumer_with(
                queue.clone(),
                vec![("io.example.slow", as_dyn(Arc::new(handler)))],
                settings(),
            );

            let received = receive_one(&queue, Message::create("io.example.slow").encode().unwrap()).await;
            assert_eq!(
                consumer.process(received).await,
                test_case.expected,
                "Test case '{}' failed",
                test_case.name
            );

            // 60s of work with a 25s interval
            assert_eq!(queue.renewals(), 2, "Test case '{}' failed", test_case.name);
            assert_eq!(queue.deletes(), test_case.deletes, "Test case '{}' failed", test_case.name);

            tokio::time::sleep(Duration::from_secs(120)).await;
            assert_eq!(
                queue.renewals(),
                2,
                "Test case '{}' renewed after the delivery ended",
                test_case.name
            );
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_fast_handler_gets_no_renewal() {
        let queue = Arc::new(RecordingQueue::new());
        let consumer = consumer_with(
            queue.clone(),
            vec![("io.example.fast", as_dyn(Arc::new(SlowHandler::new(Duration::from_secs(1)))))],
            settings(),
        );

        let received = receive_one(&queue, Message::create("io.example.fast").encode().unwrap()).await;
        consumer.process(received).await;
        tokio::time::sleep(Duration::from_secs(120)).await;

        assert_eq!(queue.renewals(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fatal_receive_error_ends_loop() {
        let queue = Arc::new(RecordingQueue::new());
        queue.fail_next_receives(1);
        let consumer = consumer_with(queue.clone(), vec![], settings());

        let err = consumer.run(CancellationToken::new()).await.unwrap_err();

        assert!(matches!(err, ConsumerError::Receive { attempts: 1, .. }));
        assert_eq!(queue.receives(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_policy_recovers_then_gives_up() {
        struct TestCase {
            name: &'static str,
            failures: u32,
            max_retries: u32,
            gives_up: bool,
        }

        let test_cases = vec![
            TestCase {
                name: "recovers within budget",
                failures: 3,
                max_retries: 3,
                gives_up: false,
            },
            TestCase {
                name: "exhausts budget",
                failures: 5,
                max_retries: 3,
                gives_up: true,
            },
        ];

        for test_case in test_cases {
            let queue = Arc::new(RecordingQueue::new());
            queue.fail_next_receives(test_case.failures);
            let consumer = consumer_with(
                queue.clone(),
                vec![],
                ConsumerSettings {
                    receive_error_policy: ReceiveErrorPolicy::Retry {
                        max_retries: test_case.max_retries,
                        base_backoff: Duration::from_millis(100),
                    },
                    ..settings()
                },
            );

            let shutdown = CancellationToken::new();
            let stopper = {
                let shutdown = shutdown.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    shutdown.cancel();
                })
            };

            let result = consumer.run(shutdown).await;
            stopper.abort();

            assert_eq!(result.is_err(), test_case.gives_up, "Test case '{}' failed", test_case.name);
            if test_case.gives_up {
                assert_eq!(
                    queue.receives() as u32,
                    test_case.max_retries + 1,
                    "Test case '{}' failed",
                    test_case.name
                );
            } else {
                assert!(
                    queue.receives() as u32 > test_case.failures,
                    "Test case '{}' failed",
                    test_case.name
                );
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_drains_in_flight() {
        let queue = Arc::new(RecordingQueue::new());
        let handler = Arc::new(SlowHandler::new(Duration::from_secs(10)));
        let consumer = consumer_with(
            queue.clone(),
            vec![("io.example.slow", as_dyn(handler.clone()))],
            settings(),
        );
        queue
            .send(Message::create("io.example.slow").encode().unwrap())
            .await
            .unwrap();

        let shutdown = CancellationToken::new();
        let run = {
            let consumer = consumer.clone();
            let shutdown = shutdown.clone();
            tokio::spawn(async move { consumer.run(shutdown).await })
        };

        tokio::time::sleep(Duration::from_secs(2)).await;
        shutdown.cancel();
        run.await.unwrap().unwrap();

        assert_eq!(handler.calls(), 1);
        assert_eq!(queue.deletes(), 1);
        assert_eq!(queue.len().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_max_in_flight_bounds_concurrency() {
        let queue = Arc::new(RecordingQueue::new());
        let handler = Arc::new(SlowHandler::new(Duration::from_secs(5)));
        let consumer = consumer_with(
            queue.clone(),
            vec![("io.example.slow", as_dyn(handler.clone()))],
            ConsumerSettings {
                receive_batch_size: 10,
                max_in_flight: Some(2),
                ..settings()
            },
        );
        for _ in 0..6 {
            queue
                .send(Message::create("io.example.slow").encode().unwrap())
                .await
                .unwrap();
        }

        let shutdown = CancellationToken::new();
        let run = {
            let consumer = consumer.clone();
            let shutdown = shutdown.clone();
            tokio::spawn(async move { consumer.run(shutdown).await })
        };

        tokio::time::sleep(Duration::from_secs(60)).await;
        shutdown.cancel();
        run.await.unwrap().unwrap();

        assert_eq!(handler.calls(), 6);
        assert_eq!(handler.peak(), 2);
        assert_eq!(queue.len().await, 0);
    }

    #[tokio::test]
    async fn test_outcome_for_unknown_receipt_delete() {
        let queue = Arc::new(RecordingQueue::new());
        let consumer = consumer_with(
            queue.clone(),
            vec![("io.example.stop", as_dyn(Arc::new(StaticHandler::new("stop", Handling::Stop))))],
            settings(),
        );

        let outcome = consumer
            .process(ReceivedMessage {
                id: MessageId("ghost".to_string()),
                body: Message::create("io.example.stop").encode().unwrap(),
                receipt: ReceiptHandle("ghost#1".to_string()),
            })
            .await;

        assert_eq!(outcome, DeliveryOutcome::AcknowledgeFailed);
    }
}
