use crate::cabin::{Cabin, CabinHandle};
use crate::config::{ConfigError, SimulationConfig};
use crate::dispatch::{DirectionalStrategy, DispatchCore, DispatchError, DispatchHandle, DispatchStrategy};
use crate::notifier::NotificationBus;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::info;

#[derive(Debug, Error)]
pub enum SystemError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("dispatcher failed to start: {0}")]
    Dispatch(#[from] DispatchError),
}

/// A running cabin with its dispatcher, wired through one notification bus.
#[derive(Debug)]
pub struct ElevatorSystem {
    bus: NotificationBus,
    cabin: CabinHandle,
    dispatch: DispatchHandle,
    tasks: Vec<JoinHandle<()>>,
}

impl ElevatorSystem {
    /// Start with the default directional (SCAN) strategy.
    pub async fn start(config: &SimulationConfig) -> Result<Self, SystemError> {
        Self::start_with_strategy(config, Box::new(DirectionalStrategy::new())).await
    }

    pub async fn start_with_strategy(
        config: &SimulationConfig,
        strategy: Box<dyn DispatchStrategy>,
    ) -> Result<Self, SystemError> {
        let cabin_config = config.cabin_config()?;
        let bus = NotificationBus::new();

        let (cabin, cabin_task) = Cabin::new(&cabin_config, bus.clone()).spawn();
        let strategy_name = strategy.name();
        let (dispatch, dispatch_task) =
            match DispatchCore::spawn(cabin.clone(), config.floors_range(), strategy).await {
                Ok(started) => started,
                Err(e) => {
                    cabin_task.abort();
                    return Err(e.into());
                }
            };

        info!(
            floors = ?config.floors_range(),
            time_to_floor = ?cabin_config.time_to_floor,
            open_doors_timeout = ?cabin_config.open_doors_timeout,
            strategy = strategy_name,
            "Elevator started at floor {}",
            cabin_config.initial_floor
        );

        Ok(Self {
            bus,
            cabin,
            dispatch,
            tasks: vec![cabin_task, dispatch_task],
        })
    }

    pub fn bus(&self) -> &NotificationBus {
        &self.bus
    }

    pub fn cabin(&self) -> &CabinHandle {
        &self.cabin
    }

    pub fn dispatch(&self) -> &DispatchHandle {
        &self.dispatch
    }

    pub fn shutdown(self) {
        for task in &self.tasks {
            task.abort();
        }
        info!("Elevator stopped");
    }
}
