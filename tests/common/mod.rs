// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shared test double for the device client.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Notify;

use climsync::state::{DeviceState, StatusSnapshot};
use climsync::{DeviceClient, DeviceCommand, DeviceOption, TransportError};

/// A scripted in-memory device.
///
/// Commands are recorded in order; status fetches serve scripted responses
/// (falling back to a default snapshot when the script runs dry). A gate can
/// hold the next command open to probe the single-flight invariant, and a
/// failure flag makes every command fail.
#[derive(Default)]
pub struct FakeDevice {
    commands: Mutex<Vec<DeviceCommand>>,
    statuses: Mutex<Vec<Result<StatusSnapshot, TransportError>>>,
    fetch_count: AtomicU32,
    fail_commands: AtomicBool,
    released: AtomicBool,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    gate: Mutex<Option<Arc<Notify>>>,
}

impl FakeDevice {
    pub fn arc() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queues a status response.
    pub fn push_status(&self, snapshot: StatusSnapshot) {
        self.statuses.lock().push(Ok(snapshot));
    }

    /// Queues a failing status response.
    pub fn push_fetch_failure(&self, error: TransportError) {
        self.statuses.lock().push(Err(error));
    }

    /// Makes every subsequent command fail (or succeed again).
    pub fn fail_commands(&self, fail: bool) {
        self.fail_commands.store(fail, Ordering::SeqCst);
    }

    /// Holds the next command open until the returned notify is triggered.
    pub fn gate_next_command(&self) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        *self.gate.lock() = Some(notify.clone());
        notify
    }

    /// Commands received so far, in order.
    pub fn commands(&self) -> Vec<DeviceCommand> {
        self.commands.lock().clone()
    }

    /// Number of status fetches served.
    pub fn fetch_count(&self) -> u32 {
        self.fetch_count.load(Ordering::SeqCst)
    }

    /// Highest number of concurrently in-flight commands observed.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Whether `release()` has been called.
    pub fn released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }

    async fn run_command(&self, command: DeviceCommand) -> Result<(), TransportError> {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        let gate = self.gate.lock().take();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        if self.fail_commands.load(Ordering::SeqCst) {
            return Err(TransportError::Unreachable("fake device".to_string()));
        }
        self.commands.lock().push(command);
        Ok(())
    }
}

#[async_trait]
impl DeviceClient for FakeDevice {
    async fn fetch_status(&self) -> Result<StatusSnapshot, TransportError> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);
        let mut statuses = self.statuses.lock();
        if statuses.is_empty() {
            return Ok(StatusSnapshot::from_state(&DeviceState::default()));
        }
        statuses.remove(0)
    }

    async fn power_on(&self) -> Result<(), TransportError> {
        self.run_command(DeviceCommand::PowerOn).await
    }

    async fn power_off(&self) -> Result<(), TransportError> {
        self.run_command(DeviceCommand::PowerOff).await
    }

    async fn set_option(&self, option: DeviceOption) -> Result<(), TransportError> {
        self.run_command(DeviceCommand::Set(option)).await
    }

    async fn release(&self) {
        self.released.store(true, Ordering::SeqCst);
    }
}
