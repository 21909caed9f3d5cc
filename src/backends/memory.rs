// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Process-local queue with lease semantics.
//!
//! Mirrors the delivery model of a managed queue closely enough to run the
//! relay without cloud infrastructure: received messages become invisible for
//! the lease, come back if not deleted in time, and every delivery gets a fresh
//! receipt handle. Nothing survives a restart.

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};
use tokio::time::{sleep_until, Instant};

use crate::errors::QueueError;
use crate::traits::{MessageId, QueueClient, ReceiptHandle, ReceivedMessage};

struct Entry {
    id: MessageId,
    body: String,
    visible_at: Instant,
    receipt: Option<ReceiptHandle>,
    deliveries: u64,
}

#[derive(Default)]
struct State {
    next_id: u64,
    entries: VecDeque<Entry>,
}

impl State {
    fn entry_by_receipt(&mut self, receipt: &ReceiptHandle) -> Option<(usize, &mut Entry)> {
        self.entries
            .iter_mut()
            .enumerate()
            .find(|(_, entry)| entry.receipt.as_ref() == Some(receipt))
    }

    /// Earliest instant a currently leased message becomes visible again.
    fn next_visible(&self) -> Option<Instant> {
        self.entries.iter().map(|entry| entry.visible_at).min()
    }
}

#[derive(Default)]
pub struct InMemoryQueue {
    state: Mutex<State>,
    arrivals: Notify,
}

impl InMemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages not yet deleted, leased or not.
    pub async fn len(&self) -> usize {
        self.state.lock().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn take_visible(&self, max_messages: usize, lease: Duration) -> Vec<ReceivedMessage> {
        let now = Instant::now();
        let mut state = self.state.lock().await;

        state
            .entries
            .iter_mut()
            .filter(|entry| entry.visible_at <= now)
            .take(max_messages)
            .map(|entry| {
                entry.deliveries += 1;
                entry.visible_at = now + lease;
                let receipt = ReceiptHandle(format!("{}#{}", entry.id, entry.deliveries));
                entry.receipt = Some(receipt.clone());
                ReceivedMessage {
                    id: entry.id.clone(),
                    body: entry.body.clone(),
                    receipt,
                }
            })
            .collect()
    }
}

#[async_trait]
impl QueueClient for InMemoryQueue {
    async fn receive(
        &self,
        max_messages: usize,
        wait: Duration,
        lease: Duration,
    ) -> Result<Vec<ReceivedMessage>, QueueError> {
        if max_messages == 0 {
            return Ok(Vec::new());
        }
        let deadline = Instant::now() + wait;

        loop {
            let arrival = self.arrivals.notified();
            tokio::pin!(arrival);
            arrival.as_mut().enable();

            let messages = self.take_visible(max_messages, lease).await;
            if !messages.is_empty() {
                return Ok(messages);
            }

            let now = Instant::now();
            if now >= deadline {
                return Ok(Vec::new());
            }

            let next_visible = self.state.lock().await.next_visible();
            let wake_at = match next_visible {
                Some(visible_at) if visible_at <= now => continue,
                Some(visible_at) => visible_at.min(deadline),
                None => deadline,
            };

            tokio::select! {
                _ = &mut arrival => {}
                _ = sleep_until(wake_at) => {}
            }
        }
    }

    async fn renew_lease(&self, receipt: &ReceiptHandle, lease: Duration) -> Result<(), QueueError> {
        let now = Instant::now();
        let mut state = self.state.lock().await;

        match state.entry_by_receipt(receipt) {
            Some((_, entry)) if entry.visible_at > now => {
                entry.visible_at = now + lease;
                Ok(())
            }
            _ => Err(QueueError::InvalidReceipt(receipt.as_str().to_string())),
        }
    }

    async fn delete(&self, receipt: &ReceiptHandle) -> Result<(), QueueError> {
        let mut state = self.state.lock().await;

        let index = state
            .entry_by_receipt(receipt)
            .map(|(index, _)| index)
            .ok_or_else(|| QueueError::InvalidReceipt(receipt.as_str().to_string()))?;
        state.entries.remove(index);
        Ok(())
    }

    async fn send(&self, body: String) -> Result<MessageId, QueueError> {
        let id = {
            let mut state = self.state.lock().await;
            state.next_id += 1;
            let id = MessageId(format!("mem-{:08}", state.next_id));
            state.entries.push_back(Entry {
                id: id.clone(),
                body,
                visible_at: Instant::now(),
                receipt: None,
                deliveries: 0,
            });
            id
        };

        self.arrivals.notify_waiters();
        Ok(id)
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
