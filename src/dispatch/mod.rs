//! Request bookkeeping and the reaction protocol between requests, the cabin
//! and a pluggable [`DispatchStrategy`].
//!
//! [`DispatchCore`] decides *when* to re-evaluate and whether to open the
//! doors at the current floor. The strategy only decides *where* to go next.

pub mod directional;
pub mod requests;

pub use directional::DirectionalStrategy;
pub use requests::{RequestKind, RequestSet};

use crate::cabin::{CabinError, CabinHandle, CabinState};
use crate::notifier::{Notification, StateChange, Subscription, CABIN_STATE_TOPIC};
use std::ops::Range;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error};

const COMMAND_QUEUE_SIZE: usize = 64;
const SUBSCRIBER_ID: &str = "dispatch";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    MoveTo(i32),
    OpenDoors,
}

/// Chooses the next cabin action from the pending requests.
pub trait DispatchStrategy: Send {
    fn next_action(&mut self, cabin: &CabinState, requests: &RequestSet) -> Option<Action>;

    fn name(&self) -> &'static str;
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DispatchError {
    #[error("dispatch task is no longer running")]
    Stopped,
    #[error(transparent)]
    Cabin(#[from] CabinError),
}

#[derive(Debug)]
enum DispatchCommand {
    Request { kind: RequestKind, floor: i32 },
    Pending { reply: oneshot::Sender<RequestSet> },
}

/// Cloneable entry point used by input layers.
#[derive(Debug, Clone)]
pub struct DispatchHandle {
    tx: mpsc::Sender<DispatchCommand>,
    floors: Range<i32>,
}

impl DispatchHandle {
    pub async fn external_request(&self, floor: i32) -> Result<(), DispatchError> {
        self.send(DispatchCommand::Request {
            kind: RequestKind::External,
            floor,
        })
        .await
    }

    pub async fn internal_request(&self, floor: i32) -> Result<(), DispatchError> {
        self.send(DispatchCommand::Request {
            kind: RequestKind::Internal,
            floor,
        })
        .await
    }

    /// Snapshot of the requests that have not been served yet.
    pub async fn pending(&self) -> Result<RequestSet, DispatchError> {
        let (reply, response) = oneshot::channel();
        self.send(DispatchCommand::Pending { reply }).await?;
        response.await.map_err(|_| DispatchError::Stopped)
    }

    pub fn valid_floor(&self, floor: i32) -> bool {
        self.floors.contains(&floor)
    }

    pub fn floors_range(&self) -> Range<i32> {
        self.floors.clone()
    }

    async fn send(&self, command: DispatchCommand) -> Result<(), DispatchError> {
        self.tx.send(command).await.map_err(|_| DispatchError::Stopped)
    }
}

pub struct DispatchCore {
    cabin: CabinHandle,
    floors: Range<i32>,
    requests: RequestSet,
    strategy: Box<dyn DispatchStrategy>,
    // Last snapshot delivered by the cabin.
    cabin_state: CabinState,
}

impl DispatchCore {
    /// Subscribe to `cabin`, take its initial snapshot and start the dispatch
    /// task.
    pub async fn spawn(
        cabin: CabinHandle,
        floors: Range<i32>,
        strategy: Box<dyn DispatchStrategy>,
    ) -> Result<(DispatchHandle, JoinHandle<()>), DispatchError> {
        // Subscribe first so no change slips in between the snapshot and the
        // first delivered event.
        let notifications = cabin.notifier().subscribe(SUBSCRIBER_ID, CABIN_STATE_TOPIC);
        let cabin_state = cabin.state().await?;
        debug!(strategy = strategy.name(), ?floors, "starting dispatcher");

        let (tx, rx) = mpsc::channel(COMMAND_QUEUE_SIZE);
        let handle = DispatchHandle {
            tx,
            floors: floors.clone(),
        };
        let core = Self {
            cabin,
            floors,
            requests: RequestSet::new(),
            strategy,
            cabin_state,
        };
        let task = tokio::spawn(async move {
            if let Err(e) = core.run(rx, notifications).await {
                error!("Dispatcher stopped: {}", e);
            }
        });

        Ok((handle, task))
    }

    async fn run(
        mut self,
        mut commands: mpsc::Receiver<DispatchCommand>,
        mut notifications: Subscription,
    ) -> Result<(), DispatchError> {
        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => self.handle_command(command).await?,
                    None => break,
                },
                Some(notification) = notifications.recv() => {
                    self.cabin_state_changed(notification).await?;
                }
                else => break,
            }
        }
        debug!("dispatch task stopped");
        Ok(())
    }

    async fn handle_command(&mut self, command: DispatchCommand) -> Result<(), DispatchError> {
        match command {
            DispatchCommand::Request { kind, floor } => self.add_request(kind, floor).await?,
            DispatchCommand::Pending { reply } => {
                let _ = reply.send(self.requests.clone());
            }
        }
        Ok(())
    }

    async fn add_request(&mut self, kind: RequestKind, floor: i32) -> Result<(), CabinError> {
        if !self.floors.contains(&floor) {
            debug!(floor, floors = ?self.floors, "ignoring request outside floor range");
            return Ok(());
        }
        if !self.requests.insert(kind, floor) {
            debug!(floor, "floor already requested");
            return Ok(());
        }
        self.process_requests().await
    }

    async fn cabin_state_changed(&mut self, notification: Notification) -> Result<(), CabinError> {
        self.cabin_state = notification.snapshot;
        match notification.change {
            StateChange::DoorsOpen(true) => {
                self.doors_opened();
                Ok(())
            }
            StateChange::DoorsOpen(false) => self.process_requests().await,
            StateChange::Floor(_) if self.cabin_state.is_stationary() => {
                self.process_requests().await
            }
            StateChange::Floor(_) => Ok(()),
        }
    }

    // Opening the doors serves every request for the current floor.
    fn doors_opened(&mut self) {
        let floor = self.cabin_state.floor;
        if self.requests.serve(floor) {
            debug!(floor, "request served");
        }
    }

    async fn process_requests(&mut self) -> Result<(), CabinError> {
        if self.open_doors_if_required().await? {
            return Ok(());
        }

        match self.strategy.next_action(&self.cabin_state, &self.requests) {
            Some(Action::MoveTo(floor)) => {
                if !self.cabin.move_to(floor).await? {
                    debug!(floor, "cabin rejected move, waiting for next event");
                }
            }
            Some(Action::OpenDoors) => {
                if !self.cabin.open_doors().await? {
                    debug!("cabin rejected door opening, waiting for next event");
                }
            }
            None => {}
        }
        Ok(())
    }

    /// Opens the doors when the cabin stands at a requested floor. Returns
    /// `true` if the current floor was requested.
    async fn open_doors_if_required(&mut self) -> Result<bool, CabinError> {
        let floor = self.cabin_state.floor;
        if !self.cabin_state.is_stationary() || !self.requests.contains(floor) {
            return Ok(false);
        }

        self.cabin.open_doors().await?;
        // No open event will follow if the doors were already open.
        if self.cabin_state.doors_open {
            self.doors_opened();
        }
        Ok(true)
    }
}
