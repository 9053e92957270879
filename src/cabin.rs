//! Low-level cabin emulator.
//!
//! The cabin only knows how to perform basic actions (move towards a target
//! floor one step at a time, open its doors and close them again after a
//! timeout) and publishes every observable change on the [`NotificationBus`].
//! It never decides where to go; that is the dispatcher's job.

use crate::notifier::{NotificationBus, StateChange, CABIN_STATE_TOPIC};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info};

const COMMAND_QUEUE_SIZE: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Direction {
    Down,
    #[default]
    Idle,
    Up,
}

impl Direction {
    /// Direction of travel needed to get from `from` to `to`.
    pub fn between(from: i32, to: i32) -> Self {
        match to.cmp(&from) {
            std::cmp::Ordering::Greater => Direction::Up,
            std::cmp::Ordering::Less => Direction::Down,
            std::cmp::Ordering::Equal => Direction::Idle,
        }
    }

    /// Floor delta of a single step: -1, 0 or 1.
    pub fn step(self) -> i32 {
        match self {
            Direction::Down => -1,
            Direction::Idle => 0,
            Direction::Up => 1,
        }
    }

    pub fn reversed(self) -> Self {
        match self {
            Direction::Down => Direction::Up,
            Direction::Idle => Direction::Idle,
            Direction::Up => Direction::Down,
        }
    }

    pub fn is_idle(self) -> bool {
        self == Direction::Idle
    }
}

/// Read-only snapshot of the cabin. Direction is always derived, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CabinState {
    pub floor: i32,
    pub target_floor: i32,
    pub doors_open: bool,
}

impl CabinState {
    pub fn at_floor(floor: i32) -> Self {
        Self {
            floor,
            target_floor: floor,
            doors_open: false,
        }
    }

    pub fn direction(&self) -> Direction {
        Direction::between(self.floor, self.target_floor)
    }

    pub fn is_stationary(&self) -> bool {
        self.direction().is_idle()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CabinConfig {
    pub initial_floor: i32,
    pub time_to_floor: Duration,
    pub open_doors_timeout: Duration,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CabinError {
    #[error("cabin task is no longer running")]
    Stopped,
}

#[derive(Debug)]
enum CabinCommand {
    OpenDoors { reply: oneshot::Sender<bool> },
    MoveTo { target: i32, reply: oneshot::Sender<bool> },
    State { reply: oneshot::Sender<CabinState> },
}

/// Cloneable handle used to command a running cabin.
#[derive(Debug, Clone)]
pub struct CabinHandle {
    tx: mpsc::Sender<CabinCommand>,
    bus: NotificationBus,
}

impl CabinHandle {
    /// Open the doors, or keep them open for another full timeout if they
    /// already are. Resolves to `false` while the cabin is moving.
    pub async fn open_doors(&self) -> Result<bool, CabinError> {
        self.request(|reply| CabinCommand::OpenDoors { reply }).await
    }

    /// Commit to `target`. Resolves to `false` when the doors are open or
    /// when `target` is not ahead of the cabin in its current direction.
    pub async fn move_to(&self, target: i32) -> Result<bool, CabinError> {
        self.request(|reply| CabinCommand::MoveTo { target, reply }).await
    }

    pub async fn state(&self) -> Result<CabinState, CabinError> {
        self.request(|reply| CabinCommand::State { reply }).await
    }

    /// Bus the cabin publishes its state changes on.
    pub fn notifier(&self) -> &NotificationBus {
        &self.bus
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> CabinCommand,
    ) -> Result<T, CabinError> {
        let (reply, response) = oneshot::channel();
        self.tx
            .send(command(reply))
            .await
            .map_err(|_| CabinError::Stopped)?;
        response.await.map_err(|_| CabinError::Stopped)
    }
}

static_assertions::assert_impl_all!(CabinHandle: Send, Sync, Clone);

/// The cabin state machine. Owned by its own task once spawned; every
/// mutation happens inside that task, one command or timer at a time.
#[derive(Debug)]
pub struct Cabin {
    state: CabinState,
    time_to_floor: Duration,
    open_doors_timeout: Duration,
    bus: NotificationBus,
    // Some while a movement sequence is running.
    next_step_at: Option<Instant>,
    // Some while the doors are open.
    close_doors_at: Option<Instant>,
}

impl Cabin {
    pub fn new(config: &CabinConfig, bus: NotificationBus) -> Self {
        Self {
            state: CabinState::at_floor(config.initial_floor),
            time_to_floor: config.time_to_floor,
            open_doors_timeout: config.open_doors_timeout,
            bus,
            next_step_at: None,
            close_doors_at: None,
        }
    }

    /// Move the cabin into its own task.
    pub fn spawn(self) -> (CabinHandle, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(COMMAND_QUEUE_SIZE);
        let handle = CabinHandle {
            tx,
            bus: self.bus.clone(),
        };
        let task = tokio::spawn(self.run(rx));
        (handle, task)
    }

    async fn run(mut self, mut commands: mpsc::Receiver<CabinCommand>) {
        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => self.handle(command),
                    None => break,
                },
                () = wait_for(self.next_step_at) => self.step(),
                () = wait_for(self.close_doors_at) => self.close_doors(),
            }
        }
        debug!(floor = self.state.floor, "cabin task stopped");
    }

    fn handle(&mut self, command: CabinCommand) {
        match command {
            CabinCommand::OpenDoors { reply } => {
                let _ = reply.send(self.open_doors());
            }
            CabinCommand::MoveTo { target, reply } => {
                let _ = reply.send(self.move_to(target));
            }
            CabinCommand::State { reply } => {
                let _ = reply.send(self.state);
            }
        }
    }

    fn open_doors(&mut self) -> bool {
        if !self.state.is_stationary() {
            debug!(floor = self.state.floor, "refusing to open doors while moving");
            return false;
        }

        let deadline = Instant::now() + self.open_doors_timeout;
        if self.close_doors_at.replace(deadline).is_some() {
            info!("Keeping doors opened");
        } else {
            self.set_doors_open(true);
            info!("Open doors");
        }
        true
    }

    fn move_to(&mut self, target: i32) -> bool {
        if self.state.doors_open {
            debug!(target_floor = target, "refusing to move with open doors");
            return false;
        }

        let accepted = match self.state.direction() {
            Direction::Up => target > self.state.floor,
            Direction::Down => target < self.state.floor,
            Direction::Idle => true,
        };
        if !accepted {
            debug!(
                target_floor = target,
                floor = self.state.floor,
                direction = ?self.state.direction(),
                "refusing to redirect a moving cabin"
            );
            return false;
        }

        self.state.target_floor = target;
        self.start_movement();
        true
    }

    fn start_movement(&mut self) {
        if self.next_step_at.is_some() || self.state.doors_open || self.state.is_stationary() {
            return;
        }
        self.next_step_at = Some(Instant::now() + self.time_to_floor);
    }

    fn step(&mut self) {
        let floor = self.state.floor + self.state.direction().step();
        self.set_floor(floor);
        info!("Floor: {}", floor);

        self.next_step_at = if self.state.is_stationary() {
            None
        } else {
            self.next_step_at.map(|at| at + self.time_to_floor)
        };
    }

    fn close_doors(&mut self) {
        self.close_doors_at = None;
        self.set_doors_open(false);
        info!("Close doors");
    }

    fn set_floor(&mut self, floor: i32) {
        if self.state.floor == floor {
            return;
        }
        self.state.floor = floor;
        self.publish(StateChange::Floor(floor));
    }

    fn set_doors_open(&mut self, open: bool) {
        if self.state.doors_open == open {
            return;
        }
        self.state.doors_open = open;
        self.publish(StateChange::DoorsOpen(open));
    }

    fn publish(&self, change: StateChange) {
        debug_assert!(
            !(self.state.doors_open && !self.state.is_stationary()),
            "cabin moving with open doors: {:?}",
            self.state
        );
        self.bus.publish(CABIN_STATE_TOPIC, change, &self.state);
    }
}

async fn wait_for(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
