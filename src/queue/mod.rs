// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The single-flight command queue.
//!
//! All change requests for one device funnel through a [`CommandQueue`]. The
//! queue guarantees the device client never sees two concurrent change
//! requests: while one batch is in flight, new submissions merge into a
//! single pending batch (last value wins per field) instead of queueing as
//! separate parallel requests.
//!
//! Fan-speed-only submissions additionally pass through a debounce window:
//! a burst of slider adjustments collapses into one outgoing command
//! carrying only the final value. This is a deliberate relaxation of FIFO
//! ordering for that one control.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::client::{DeviceClient, DeviceCommand};
use crate::error::{Error, Result, TransportError};
use crate::state::StateDelta;

/// Identifier for one outgoing command batch, used in log correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BatchId(Uuid);

impl BatchId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Short form is enough to correlate log lines
        let full = self.0.to_string();
        write!(f, "{}", &full[..8])
    }
}

/// Outcome channel payload for one batch.
type BatchResult = std::result::Result<(), TransportError>;

/// Awaitable completion handle for an enqueued change.
///
/// Every caller whose delta was merged into a batch holds a ticket for that
/// batch; all of them resolve with the batch's outcome. Dropping a ticket
/// without awaiting it is allowed.
#[derive(Debug)]
pub struct CommandTicket {
    batch_id: BatchId,
    rx: oneshot::Receiver<BatchResult>,
}

impl CommandTicket {
    /// Returns the batch this ticket belongs to.
    #[must_use]
    pub fn batch_id(&self) -> BatchId {
        self.batch_id
    }

    /// Waits for the batch to be sent.
    ///
    /// # Errors
    ///
    /// Returns `Error::Transport` if the send failed, or
    /// `Error::QueueDisposed` if the queue was torn down before the batch
    /// went out.
    pub async fn wait(self) -> Result<()> {
        match self.rx.await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(Error::Transport(e)),
            Err(_) => Err(Error::QueueDisposed),
        }
    }

    /// Creates a ticket that is already resolved successfully.
    fn resolved(batch_id: BatchId) -> Self {
        let (tx, rx) = oneshot::channel();
        let _ = tx.send(Ok(()));
        Self { batch_id, rx }
    }
}

/// One merged batch waiting to be sent.
struct PendingBatch {
    id: BatchId,
    delta: StateDelta,
    waiters: Vec<oneshot::Sender<BatchResult>>,
}

impl PendingBatch {
    fn new(delta: StateDelta, waiter: oneshot::Sender<BatchResult>) -> Self {
        Self {
            id: BatchId::new(),
            delta,
            waiters: vec![waiter],
        }
    }

    fn absorb(&mut self, delta: StateDelta, waiter: oneshot::Sender<BatchResult>) {
        self.delta.merge(delta);
        self.waiters.push(waiter);
    }
}

/// The debounce slot: a batch accumulating rapid fan-speed changes plus the
/// cancellable timer that will flush it.
struct DebounceSlot {
    batch: PendingBatch,
    timer: JoinHandle<()>,
}

struct QueueInner {
    client: Arc<dyn DeviceClient>,
    debounce_window: Duration,
    slots: Mutex<Slots>,
    disposed: AtomicBool,
}

#[derive(Default)]
struct Slots {
    in_flight: bool,
    pending: Option<PendingBatch>,
    debounce: Option<DebounceSlot>,
}

/// The single-flight, debounced, ordered channel through which state changes
/// reach the device.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use std::time::Duration;
/// use climsync::queue::CommandQueue;
/// use climsync::state::StateDelta;
/// use climsync::types::PowerState;
/// # async fn example(client: Arc<dyn climsync::DeviceClient>) -> climsync::Result<()> {
/// let queue = CommandQueue::new(client, Duration::from_millis(500));
///
/// let ticket = queue.enqueue(StateDelta::power(PowerState::On))?;
/// ticket.wait().await?;
/// # Ok(())
/// # }
/// ```
pub struct CommandQueue {
    inner: Arc<QueueInner>,
}

impl CommandQueue {
    /// Creates a queue sending through `client`, collapsing fan-speed bursts
    /// within `debounce_window`.
    #[must_use]
    pub fn new(client: Arc<dyn DeviceClient>, debounce_window: Duration) -> Self {
        Self {
            inner: Arc::new(QueueInner {
                client,
                debounce_window,
                slots: Mutex::new(Slots::default()),
                disposed: AtomicBool::new(false),
            }),
        }
    }

    /// Submits a partial change for transmission to the device.
    ///
    /// If nothing is in flight the batch goes out immediately; otherwise the
    /// delta merges into the single pending batch, last value wins per
    /// field. A delta touching only the fan speed first passes through the
    /// debounce window, so rapid successive values collapse into one
    /// command carrying the final value.
    ///
    /// An empty delta resolves immediately without any client interaction.
    ///
    /// # Errors
    ///
    /// Returns `Error::QueueDisposed` if [`dispose`](Self::dispose) was
    /// called.
    pub fn enqueue(&self, delta: StateDelta) -> Result<CommandTicket> {
        if self.inner.disposed.load(Ordering::SeqCst) {
            return Err(Error::QueueDisposed);
        }
        if delta.is_empty() {
            return Ok(CommandTicket::resolved(BatchId::new()));
        }

        let (tx, rx) = oneshot::channel();
        let debounced = delta.is_fan_speed_only();
        let mut slots = self.inner.slots.lock();
        // Re-check under the lock; dispose may have raced the check above
        if self.inner.disposed.load(Ordering::SeqCst) {
            return Err(Error::QueueDisposed);
        }

        let batch_id = if debounced {
            self.merge_debounced(&mut slots, delta, tx)
        } else {
            Self::merge_pending(&self.inner, &mut slots, delta, tx)
        };

        drop(slots);
        Ok(CommandTicket { batch_id, rx })
    }

    /// Merges a delta into the pending batch, starting the drain task if the
    /// queue is idle.
    fn merge_pending(
        inner: &Arc<QueueInner>,
        slots: &mut Slots,
        delta: StateDelta,
        waiter: oneshot::Sender<BatchResult>,
    ) -> BatchId {
        let batch_id = if let Some(batch) = slots.pending.as_mut() {
            batch.absorb(delta, waiter);
            batch.id
        } else {
            let batch = PendingBatch::new(delta, waiter);
            let id = batch.id;
            slots.pending = Some(batch);
            id
        };

        if !slots.in_flight {
            slots.in_flight = true;
            tokio::spawn(drain(Arc::clone(inner)));
        }
        batch_id
    }

    /// Merges a fan-speed delta into the debounce slot and resets the timer.
    fn merge_debounced(
        &self,
        slots: &mut Slots,
        delta: StateDelta,
        waiter: oneshot::Sender<BatchResult>,
    ) -> BatchId {
        if let Some(slot) = slots.debounce.as_mut() {
            slot.batch.absorb(delta, waiter);
            slot.timer.abort();
            slot.timer = spawn_debounce_timer(&self.inner);
            slot.batch.id
        } else {
            let batch = PendingBatch::new(delta, waiter);
            let id = batch.id;
            slots.debounce = Some(DebounceSlot {
                batch,
                timer: spawn_debounce_timer(&self.inner),
            });
            id
        }
    }

    /// Disposes the queue.
    ///
    /// Cancels any pending debounce timer, fails waiters whose batches were
    /// never sent, and refuses further enqueues. Idempotent; an in-flight
    /// send resolves or fails on its own and its tickets keep their
    /// outcome.
    pub fn dispose(&self) {
        if self.inner.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        let mut slots = self.inner.slots.lock();
        if let Some(slot) = slots.debounce.take() {
            slot.timer.abort();
            // Dropping the waiters resolves their tickets as QueueDisposed
            drop(slot.batch);
        }
        if let Some(batch) = slots.pending.take() {
            drop(batch);
        }
    }

    /// Returns `true` if the queue has been disposed.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.load(Ordering::SeqCst)
    }
}

impl fmt::Debug for CommandQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slots = self.inner.slots.lock();
        f.debug_struct("CommandQueue")
            .field("in_flight", &slots.in_flight)
            .field("has_pending", &slots.pending.is_some())
            .field("has_debounce", &slots.debounce.is_some())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

/// Starts the debounce timer; when it fires, the accumulated batch moves
/// into the normal single-flight path.
fn spawn_debounce_timer(inner: &Arc<QueueInner>) -> JoinHandle<()> {
    let inner = Arc::clone(inner);
    tokio::spawn(async move {
        tokio::time::sleep(inner.debounce_window).await;
        flush_debounce(&inner);
    })
}

/// Moves the debounce batch into the pending slot. Harmless if the slot is
/// already empty (fired twice, or raced with dispose).
fn flush_debounce(inner: &Arc<QueueInner>) {
    if inner.disposed.load(Ordering::SeqCst) {
        return;
    }
    let mut slots = inner.slots.lock();
    let Some(slot) = slots.debounce.take() else {
        return;
    };
    let DebounceSlot { batch, .. } = slot;
    tracing::debug!(batch_id = %batch.id, "debounce window elapsed, submitting");

    if let Some(pending) = slots.pending.as_mut() {
        pending.delta.merge(batch.delta);
        pending.waiters.extend(batch.waiters);
    } else {
        slots.pending = Some(batch);
    }

    if !slots.in_flight {
        slots.in_flight = true;
        tokio::spawn(drain(Arc::clone(inner)));
    }
}

/// Sends pending batches one at a time until the queue is empty.
///
/// Exactly one drain task runs per queue at any moment (guarded by the
/// `in_flight` flag), which is what enforces the single-flight invariant.
async fn drain(inner: Arc<QueueInner>) {
    loop {
        let batch = {
            let mut slots = inner.slots.lock();
            match slots.pending.take() {
                Some(batch) => batch,
                None => {
                    slots.in_flight = false;
                    return;
                }
            }
        };

        let result = send_batch(&inner, &batch).await;
        if let Err(e) = &result {
            tracing::warn!(batch_id = %batch.id, error = %e, "command batch failed");
        }
        for waiter in batch.waiters {
            let _ = waiter.send(result.clone());
        }
    }
}

/// Sends one batch as a sequence of client calls; the first failure rejects
/// the whole batch.
async fn send_batch(inner: &Arc<QueueInner>, batch: &PendingBatch) -> BatchResult {
    let commands = batch.delta.to_commands();
    tracing::debug!(
        batch_id = %batch.id,
        commands = commands.len(),
        "sending command batch"
    );
    for command in commands {
        match command {
            DeviceCommand::PowerOn => inner.client.power_on().await?,
            DeviceCommand::PowerOff => inner.client.power_off().await?,
            DeviceCommand::Set(option) => inner.client.set_option(option).await?,
        }
    }
    Ok(())
}
