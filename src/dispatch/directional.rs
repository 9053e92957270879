//! SCAN style policy: keep moving in one direction while there are requests
//! ahead, then turn around and repeat.

use super::{Action, DispatchStrategy, RequestSet};
use crate::cabin::{CabinState, Direction};
use tracing::debug;

#[derive(Debug, Default)]
pub struct DirectionalStrategy {
    /// Last direction of travel. Unlike the cabin's own direction it is not
    /// reset when the cabin stops.
    direction: Direction,
}

impl DirectionalStrategy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    fn initial_direction(cabin: &CabinState, requests: &RequestSet) -> Direction {
        match requests.first_preferring_internal() {
            Some(target) if target > cabin.floor => Direction::Up,
            _ => Direction::Down,
        }
    }

    fn next_in_direction(&self, requests: &RequestSet, floor: i32) -> Option<i32> {
        match self.direction {
            Direction::Up => requests.next_above(floor),
            Direction::Down => requests.next_below(floor),
            Direction::Idle => None,
        }
    }
}

impl DispatchStrategy for DirectionalStrategy {
    fn next_action(&mut self, cabin: &CabinState, requests: &RequestSet) -> Option<Action> {
        if requests.is_empty() {
            return None;
        }
        if self.direction.is_idle() {
            self.direction = Self::initial_direction(cabin, requests);
        }

        let target = self.next_in_direction(requests, cabin.floor).or_else(|| {
            self.direction = self.direction.reversed();
            debug!(direction = ?self.direction, "nothing ahead, reversing");
            self.next_in_direction(requests, cabin.floor)
        });

        target.map(Action::MoveTo)
    }

    fn name(&self) -> &'static str {
        "directional"
    }
}
