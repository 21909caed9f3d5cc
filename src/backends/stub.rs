// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::backends::InMemoryQueue;
use crate::errors::{HandlerError, QueueError};
use crate::ingest::IngestState;
use crate::message::Message;
use crate::traits::{
    Handling, InputHandler, InputHandlerHelp, MessageHandler, MessageId, QueueClient,
    ReceiptHandle, ReceivedMessage,
};

/// A handler that always returns the same decision and counts its calls
pub struct StaticHandler {
    name: &'static str,
    handling: Handling,
    calls: AtomicUsize,
}

impl StaticHandler {
    pub fn new(name: &'static str, handling: Handling) -> Self {
        Self {
            name,
            handling,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MessageHandler for StaticHandler {
    async fn handle(&self, _message: &Message) -> Result<Handling, HandlerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.handling)
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

/// A handler that always fails for testing failure scenarios
pub struct FailingHandler {
    calls: AtomicUsize,
}

impl FailingHandler {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MessageHandler for FailingHandler {
    async fn handle(&self, _message: &Message) -> Result<Handling, HandlerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(HandlerError::Failed("Simulated handler failure".to_string()))
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

/// Keeps every message it sees and stops handling
pub struct RecordingHandler {
    seen: Mutex<Vec<Message>>,
}

impl RecordingHandler {
    pub fn new() -> Self {
        Self {
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn seen(&self) -> Vec<Message> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessageHandler for RecordingHandler {
    async fn handle(&self, message: &Message) -> Result<Handling, HandlerError> {
        self.seen.lock().unwrap().push(message.clone());
        Ok(Handling::Stop)
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

/// Takes `delay` per message and tracks peak concurrency
pub struct SlowHandler {
    delay: Duration,
    finish: Option<Handling>,
    current: AtomicUsize,
    peak: AtomicUsize,
    calls: AtomicUsize,
}

impl SlowHandler {
    pub fn new(delay: Duration) -> Self {
        Self::finishing(delay, Some(Handling::Stop))
    }

    /// `None` fails the delivery once the delay has elapsed
    pub fn finishing(delay: Duration, finish: Option<Handling>) -> Self {
        Self {
            delay,
            finish,
            current: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MessageHandler for SlowHandler {
    async fn handle(&self, _message: &Message) -> Result<Handling, HandlerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        tokio::time::sleep(self.delay).await;

        self.current.fetch_sub(1, Ordering::SeqCst);
        self.finish
            .ok_or_else(|| HandlerError::Failed("Simulated slow failure".to_string()))
    }

    fn name(&self) -> &'static str {
        "slow"
    }
}

/// An input handler without routes, for registry tests
pub struct StubInput {
    path: String,
}

impl StubInput {
    pub fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
        }
    }
}

impl InputHandler for StubInput {
    fn routes(&self) -> axum::Router<IngestState> {
        axum::Router::new()
    }

    fn help(&self) -> InputHandlerHelp {
        InputHandlerHelp {
            path: self.path.clone(),
            description: "stub".to_string(),
        }
    }
}

/// In-memory queue that counts calls and can inject failures
#[derive(Default)]
pub struct RecordingQueue {
    inner: InMemoryQueue,
    receives: AtomicUsize,
    renewals: AtomicUsize,
    deletes: AtomicUsize,
    failing_receives: AtomicU32,
    fail_deletes: AtomicBool,
    fail_sends: AtomicBool,
}

impl RecordingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next `count` receive calls.
    pub fn fail_next_receives(&self, count: u32) {
        self.failing_receives.store(count, Ordering::SeqCst);
    }

    pub fn fail_deletes(&self) {
        self.fail_deletes.store(true, Ordering::SeqCst);
    }

    pub fn fail_sends(&self) {
        self.fail_sends.store(true, Ordering::SeqCst);
    }

    pub fn receives(&self) -> usize {
        self.receives.load(Ordering::SeqCst)
    }

    pub fn renewals(&self) -> usize {
        self.renewals.load(Ordering::SeqCst)
    }

    pub fn deletes(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    pub async fn len(&self) -> usize {
        self.inner.len().await
    }
}

#[async_trait]
impl QueueClient for RecordingQueue {
    async fn receive(
        &self,
        max_messages: usize,
        wait: Duration,
        lease: Duration,
    ) -> Result<Vec<ReceivedMessage>, QueueError> {
        self.receives.fetch_add(1, Ordering::SeqCst);
        let failing = self
            .failing_receives
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(QueueError::Transport("Simulated receive failure".to_string()));
        }
        self.inner.receive(max_messages, wait, lease).await
    }

    async fn renew_lease(&self, receipt: &ReceiptHandle, lease: Duration) -> Result<(), QueueError> {
        self.renewals.fetch_add(1, Ordering::SeqCst);
        self.inner.renew_lease(receipt, lease).await
    }

    async fn delete(&self, receipt: &ReceiptHandle) -> Result<(), QueueError> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(QueueError::Transport("Simulated delete failure".to_string()));
        }
        self.inner.delete(receipt).await
    }

    async fn send(&self, body: String) -> Result<MessageId, QueueError> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(QueueError::Transport("Simulated send failure".to_string()));
        }
        self.inner.send(body).await
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}
