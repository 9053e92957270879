mod common;

use common::*;
use elevator_sim::notifier::Subscription;
use elevator_sim::{Cabin, CabinConfig, CabinHandle, Direction, NotificationBus, StateChange, CABIN_STATE_TOPIC};

fn spawn_cabin() -> (CabinHandle, Subscription) {
    let bus = NotificationBus::new();
    let subscriber = bus.subscribe("observer", CABIN_STATE_TOPIC);
    let config = CabinConfig {
        initial_floor: INITIAL_FLOOR,
        time_to_floor: TIME_TO_FLOOR,
        open_doors_timeout: OPEN_DOORS_TIMEOUT,
    };
    let (cabin, _task) = Cabin::new(&config, bus).spawn();
    (cabin, subscriber)
}

async fn assert_moves_to(cabin: &CabinHandle, rx: &mut Subscription, from: i32, target: i32) {
    assert_eq!(cabin.state().await.unwrap().target_floor, target);
    for floor in floors_sequence(from, target) {
        let (change, elapsed) = next_timed(rx).await;
        assert_eq!(change, StateChange::Floor(floor));
        assert_elapsed(elapsed, TIME_TO_FLOOR);
    }
    assert!(next(rx, TIME_TO_FLOOR * 3).await.is_none());

    let state = cabin.state().await.unwrap();
    assert_eq!(state.floor, target);
    assert_eq!(state.direction(), Direction::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_initial_state() {
    let (cabin, _rx) = spawn_cabin();
    let state = cabin.state().await.unwrap();

    assert_eq!(state.floor, INITIAL_FLOOR);
    assert_eq!(state.target_floor, INITIAL_FLOOR);
    assert!(!state.doors_open);
    assert_eq!(state.direction(), Direction::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_open_doors_then_close_after_timeout() {
    let (cabin, mut rx) = spawn_cabin();

    assert!(cabin.open_doors().await.unwrap());
    assert!(cabin.state().await.unwrap().doors_open);
    assert_eq!(next(&mut rx, ms(1)).await.map(|n| n.change), Some(StateChange::DoorsOpen(true)));

    let (change, elapsed) = next_timed(&mut rx).await;
    assert_eq!(change, StateChange::DoorsOpen(false));
    assert_elapsed(elapsed, OPEN_DOORS_TIMEOUT);
    assert!(!cabin.state().await.unwrap().doors_open);
}

#[tokio::test(start_paused = true)]
async fn test_repeated_open_resets_timer_without_new_event() {
    let (cabin, mut rx) = spawn_cabin();

    assert!(cabin.open_doors().await.unwrap());
    assert_eq!(next(&mut rx, ms(1)).await.map(|n| n.change), Some(StateChange::DoorsOpen(true)));

    tokio::time::sleep(ms(1500)).await;
    assert!(cabin.open_doors().await.unwrap());

    // Would have closed at 2s without the reset
    let (change, elapsed) = next_timed(&mut rx).await;
    assert_eq!(change, StateChange::DoorsOpen(false));
    assert_elapsed(elapsed, OPEN_DOORS_TIMEOUT);
}

#[tokio::test(start_paused = true)]
async fn test_moves_step_by_step() {
    let (cabin, mut rx) = spawn_cabin();

    assert!(cabin.move_to(8).await.unwrap());
    assert_moves_to(&cabin, &mut rx, INITIAL_FLOOR, 8).await;
}

#[tokio::test(start_paused = true)]
async fn test_moves_down_step_by_step() {
    let (cabin, mut rx) = spawn_cabin();

    assert!(cabin.move_to(1).await.unwrap());
    assert_moves_to(&cabin, &mut rx, INITIAL_FLOOR, 1).await;
}

#[tokio::test(start_paused = true)]
async fn test_moving_up_accepts_nearer_target() {
    let (cabin, mut rx) = spawn_cabin();

    assert!(cabin.move_to(INITIAL_FLOOR + 3).await.unwrap());
    assert!(cabin.move_to(INITIAL_FLOOR + 2).await.unwrap());
    assert_moves_to(&cabin, &mut rx, INITIAL_FLOOR, INITIAL_FLOOR + 2).await;
}

#[tokio::test(start_paused = true)]
async fn test_moving_up_accepts_further_target() {
    let (cabin, mut rx) = spawn_cabin();

    assert!(cabin.move_to(INITIAL_FLOOR + 3).await.unwrap());
    assert!(cabin.move_to(INITIAL_FLOOR + 4).await.unwrap());
    assert_moves_to(&cabin, &mut rx, INITIAL_FLOOR, INITIAL_FLOOR + 4).await;
}

#[tokio::test(start_paused = true)]
async fn test_moving_up_rejects_target_behind() {
    let (cabin, _rx) = spawn_cabin();

    assert!(cabin.move_to(INITIAL_FLOOR + 3).await.unwrap());
    assert!(!cabin.move_to(INITIAL_FLOOR - 1).await.unwrap());
    assert_eq!(cabin.state().await.unwrap().target_floor, INITIAL_FLOOR + 3);
}

#[tokio::test(start_paused = true)]
async fn test_moving_down_accepts_nearer_and_further_targets() {
    let (cabin, mut rx) = spawn_cabin();

    assert!(cabin.move_to(INITIAL_FLOOR - 3).await.unwrap());
    assert!(cabin.move_to(INITIAL_FLOOR - 2).await.unwrap());
    assert!(cabin.move_to(INITIAL_FLOOR - 4).await.unwrap());
    assert_moves_to(&cabin, &mut rx, INITIAL_FLOOR, INITIAL_FLOOR - 4).await;
}

#[tokio::test(start_paused = true)]
async fn test_moving_down_rejects_target_behind() {
    let (cabin, _rx) = spawn_cabin();

    assert!(cabin.move_to(INITIAL_FLOOR - 3).await.unwrap());
    assert!(!cabin.move_to(INITIAL_FLOOR + 1).await.unwrap());
    assert_eq!(cabin.state().await.unwrap().target_floor, INITIAL_FLOOR - 3);
}

#[tokio::test(start_paused = true)]
async fn test_mid_flight_target_must_be_beyond_current_floor() {
    let (cabin, mut rx) = spawn_cabin();

    assert!(cabin.move_to(9).await.unwrap());
    assert_eq!(next(&mut rx, ms(1500)).await.map(|n| n.change), Some(StateChange::Floor(6)));

    // Already at 6, so 6 is behind the direction of travel
    assert!(!cabin.move_to(6).await.unwrap());
    assert!(cabin.move_to(7).await.unwrap());
    assert_eq!(cabin.state().await.unwrap().target_floor, 7);
}

#[tokio::test(start_paused = true)]
async fn test_move_rejected_while_doors_open() {
    let (cabin, mut rx) = spawn_cabin();

    assert!(cabin.open_doors().await.unwrap());
    assert!(!cabin.move_to(8).await.unwrap());
    assert_eq!(cabin.state().await.unwrap().target_floor, INITIAL_FLOOR);

    let events = drain(&mut rx).await;
    assert_eq!(changes(&events), vec![StateChange::DoorsOpen(true), StateChange::DoorsOpen(false)]);
}

#[tokio::test(start_paused = true)]
async fn test_open_doors_rejected_while_moving() {
    let (cabin, mut rx) = spawn_cabin();

    assert!(cabin.move_to(7).await.unwrap());
    assert!(!cabin.open_doors().await.unwrap());
    assert!(!cabin.state().await.unwrap().doors_open);

    let events = drain(&mut rx).await;
    assert_eq!(changes(&events), vec![StateChange::Floor(6), StateChange::Floor(7)]);
}

#[tokio::test(start_paused = true)]
async fn test_doors_never_open_while_moving() {
    let (cabin, mut rx) = spawn_cabin();

    assert!(cabin.move_to(2).await.unwrap());
    tokio::time::sleep(ms(3500)).await;
    assert!(cabin.open_doors().await.unwrap());
    assert!(!cabin.move_to(9).await.unwrap());
    tokio::time::sleep(ms(2500)).await;
    assert!(cabin.move_to(4).await.unwrap());

    let events = drain(&mut rx).await;
    assert_eq!(
        changes(&events),
        vec![
            StateChange::Floor(4),
            StateChange::Floor(3),
            StateChange::Floor(2),
            StateChange::DoorsOpen(true),
            StateChange::DoorsOpen(false),
            StateChange::Floor(3),
            StateChange::Floor(4),
        ]
    );
    for event in &events {
        assert!(!event.snapshot.doors_open || event.snapshot.direction() == Direction::Idle);
    }
}
