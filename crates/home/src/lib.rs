//! Simulated home for the domotica compiler.
//!
//! Provides the collaborators [`domotica_core::Pipeline::dispatch`] forwards
//! to: a [`SimulatedExecutor`], a file-backed [`StateManager`], and a
//! [`Pictograms`] presenter, all configured by a [`HomeConfig`].

/// Home configuration and its loader.
pub mod config;
/// Simulated executor.
pub mod executor;
/// Pictogram presenter.
pub mod presenter;
/// Device state store.
pub mod state;

pub use config::{ConfigError, HomeConfig, load_config, load_config_from_str};
pub use executor::SimulatedExecutor;
pub use presenter::Pictograms;
pub use state::{DeviceRecord, HistoryEntry, Snapshot, StateError, StateManager};

/// The three simulated collaborators, built from one config.
#[derive(Debug)]
pub struct Home {
    /// Executor.
    pub executor: SimulatedExecutor,
    /// State store.
    pub state: StateManager,
    /// Presenter.
    pub pictograms: Pictograms,
}

impl Home {
    /// Build every collaborator from `config`, loading state from `config.state_file`.
    pub fn new(config: &HomeConfig) -> Self {
        Self {
            executor: SimulatedExecutor::new(config),
            state: StateManager::from_config(config),
            pictograms: Pictograms::new(config.pictogram_dir.clone()),
        }
    }

    /// Borrow as pipeline collaborators.
    pub fn collaborators(&self) -> domotica_core::Collaborators<'_> {
        domotica_core::Collaborators::new(&self.executor, &self.state)
            .with_presenter(&self.pictograms)
    }
}
