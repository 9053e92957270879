#![allow(dead_code)]

use elevator_sim::notifier::{Notification, Subscription};
use elevator_sim::{ElevatorSystem, SimulationConfig, StateChange};
use std::time::Duration;
use tokio::time::{timeout, Instant};

pub const TIME_TO_FLOOR: Duration = Duration::from_secs(1);
pub const OPEN_DOORS_TIMEOUT: Duration = Duration::from_secs(2);
pub const INITIAL_FLOOR: i32 = 5;

// Longer than any single timer, so silence this long means the system is idle.
const QUIET_PERIOD: Duration = Duration::from_secs(30);
const TOLERANCE: Duration = Duration::from_millis(5);

/// Floors 0 through 10, cabin at floor 5.
pub fn config() -> SimulationConfig {
    SimulationConfig {
        floors: 11,
        floor_height_m: 3.0,
        velocity_mps: 3.0,
        open_doors_timeout_s: OPEN_DOORS_TIMEOUT.as_secs_f64(),
        initial_floor: INITIAL_FLOOR,
    }
}

pub async fn start() -> ElevatorSystem {
    ElevatorSystem::start(&config()).await.expect("system starts")
}

pub fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

/// Floors passed when travelling from `from` to `to`, excluding `from`.
pub fn floors_sequence(from: i32, to: i32) -> Vec<i32> {
    if to >= from {
        (from + 1..=to).collect()
    } else {
        (to..from).rev().collect()
    }
}

/// Changes published when the cabin visits `floors` in order, opening and
/// closing its doors at every stop after the first.
pub fn changes_for_floors(floors: &[i32]) -> Vec<StateChange> {
    floors
        .windows(2)
        .flat_map(|leg| {
            floors_sequence(leg[0], leg[1])
                .into_iter()
                .map(StateChange::Floor)
                .chain([StateChange::DoorsOpen(true), StateChange::DoorsOpen(false)])
        })
        .collect()
}

pub async fn next(rx: &mut Subscription, within: Duration) -> Option<Notification> {
    timeout(within, rx.recv()).await.ok().flatten()
}

/// Wait for the next change and return it with the time it took to arrive.
pub async fn next_timed(rx: &mut Subscription) -> (StateChange, Duration) {
    let start = Instant::now();
    let notification = next(rx, QUIET_PERIOD).await.expect("a state change");
    (notification.change, start.elapsed())
}

/// Collect everything published until the system goes quiet.
pub async fn drain(rx: &mut Subscription) -> Vec<Notification> {
    let mut received = Vec::new();
    while let Some(notification) = next(rx, QUIET_PERIOD).await {
        received.push(notification);
    }
    received
}

pub fn changes(notifications: &[Notification]) -> Vec<StateChange> {
    notifications.iter().map(|n| n.change).collect()
}

pub fn assert_elapsed(actual: Duration, expected: Duration) {
    assert!(
        actual >= expected && actual <= expected + TOLERANCE,
        "expected {:?}, got {:?}",
        expected,
        actual
    );
}
