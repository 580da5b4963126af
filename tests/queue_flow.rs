// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for the command queue: single-flight, merging,
//! debounce collapse and failure propagation.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::FakeDevice;

use climsync::queue::CommandQueue;
use climsync::state::StateDelta;
use climsync::types::{FanSpeed, PowerState, SwingMode};
use climsync::{DeviceCommand, DeviceOption};

fn queue_with(device: &Arc<FakeDevice>) -> CommandQueue {
    CommandQueue::new(device.clone(), Duration::from_millis(500))
}

#[tokio::test]
async fn single_flight_under_concurrent_enqueues() {
    let device = FakeDevice::arc();
    let queue = queue_with(&device);

    // Hold the first batch open inside the client
    let gate = device.gate_next_command();
    let first = queue.enqueue(StateDelta::power(PowerState::On)).unwrap();
    tokio::task::yield_now().await;

    // Both of these arrive while the first is in flight
    let second = queue
        .enqueue(StateDelta {
            swing: Some(SwingMode::Horizontal),
            ..StateDelta::default()
        })
        .unwrap();
    let third = queue
        .enqueue(StateDelta {
            swing: Some(SwingMode::Both),
            ..StateDelta::default()
        })
        .unwrap();

    gate.notify_one();
    first.wait().await.unwrap();
    second.wait().await.unwrap();
    third.wait().await.unwrap();

    // The client never saw two concurrent requests
    assert_eq!(device.max_in_flight(), 1);
    // The two queued submissions merged, last value winning
    assert_eq!(
        device.commands(),
        vec![
            DeviceCommand::PowerOn,
            DeviceCommand::Set(DeviceOption::Swing(SwingMode::Both)),
        ]
    );
}

#[tokio::test]
async fn batches_go_out_in_submission_order() {
    let device = FakeDevice::arc();
    let queue = queue_with(&device);

    let gate = device.gate_next_command();
    let first = queue.enqueue(StateDelta::power(PowerState::On)).unwrap();
    tokio::task::yield_now().await;

    let second = queue
        .enqueue(StateDelta {
            swing: Some(SwingMode::Vertical),
            ..StateDelta::default()
        })
        .unwrap();

    gate.notify_one();
    first.wait().await.unwrap();
    second.wait().await.unwrap();

    assert_eq!(
        device.commands(),
        vec![
            DeviceCommand::PowerOn,
            DeviceCommand::Set(DeviceOption::Swing(SwingMode::Vertical)),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn rapid_fan_speed_requests_collapse_to_the_last_value() {
    let device = FakeDevice::arc();
    let queue = queue_with(&device);

    // 10% -> Silent, 30% -> Low, 60% -> Medium, all within the window
    for percent in [10, 30, 60] {
        let speed = FanSpeed::from_percent(percent).unwrap();
        queue.enqueue(StateDelta::fan_speed(speed)).unwrap();
    }

    // Sleep past the debounce window so the collapsed batch drains
    tokio::time::sleep(Duration::from_secs(1)).await;

    assert_eq!(
        device.commands(),
        vec![DeviceCommand::Set(DeviceOption::FanSpeed(FanSpeed::Medium))]
    );
}

#[tokio::test(start_paused = true)]
async fn every_debounced_caller_gets_the_batch_outcome() {
    let device = FakeDevice::arc();
    let queue = queue_with(&device);

    let t1 = queue.enqueue(StateDelta::fan_speed(FanSpeed::Low)).unwrap();
    let t2 = queue.enqueue(StateDelta::fan_speed(FanSpeed::High)).unwrap();
    assert_eq!(t1.batch_id(), t2.batch_id());

    t1.wait().await.unwrap();
    t2.wait().await.unwrap();

    assert_eq!(device.commands().len(), 1);
}

#[tokio::test]
async fn failure_rejects_the_batch_but_not_the_queue() {
    let device = FakeDevice::arc();
    let queue = queue_with(&device);

    device.fail_commands(true);
    let failing = queue.enqueue(StateDelta::power(PowerState::On)).unwrap();
    assert!(failing.wait().await.is_err());

    // The in-flight slot is free again; unrelated work proceeds
    device.fail_commands(false);
    let ok = queue.enqueue(StateDelta::power(PowerState::Off)).unwrap();
    ok.wait().await.unwrap();

    assert_eq!(device.commands(), vec![DeviceCommand::PowerOff]);
}

#[tokio::test]
async fn dispose_refuses_new_work_and_cancels_debounce() {
    let device = FakeDevice::arc();
    let queue = queue_with(&device);

    let pending = queue.enqueue(StateDelta::fan_speed(FanSpeed::High)).unwrap();
    queue.dispose();

    assert!(matches!(
        pending.wait().await,
        Err(climsync::Error::QueueDisposed)
    ));
    assert!(matches!(
        queue.enqueue(StateDelta::power(PowerState::On)),
        Err(climsync::Error::QueueDisposed)
    ));
    assert!(device.commands().is_empty());
}
