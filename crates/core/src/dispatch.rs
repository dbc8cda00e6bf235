//! Seams to the outside world: device execution, state storage, and
//! presentation.
//!
//! The pipeline only calls these after every stage succeeded.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::grammar::command::Command;
use crate::grammar::vocab::{Action, Device, Room};

/// Outcome reported by an [`Executor`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionReport {
    /// Whether the device accepted the command.
    pub success: bool,
    /// Spoken/printed confirmation or failure message.
    pub message: String,
}

impl ExecutionReport {
    /// A successful report.
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    /// A failed report.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Last recorded state of a device, as returned by [`StateStore::query`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastKnown {
    /// Device queried.
    pub device: Device,
    /// Room queried.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room: Option<Room>,
    /// Last action applied to the device, if any.
    pub last_action: Option<Action>,
    /// Human label such as `encendido` or `ajustado_a_40`.
    pub status: String,
    /// Current level for volume/brightness.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<u64>,
    /// Power flag for the queried room (or the whole device without a room).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on: Option<bool>,
    /// When the device was last touched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

/// Carries out a validated command.
pub trait Executor: Send + Sync {
    /// Execute `command` and report what happened.
    fn execute(&self, command: &Command) -> ExecutionReport;
}

/// Records device state after execution.
pub trait StateStore: Send + Sync {
    /// Apply an executed action.
    fn update(&self, device: Device, room: Option<Room>, action: Action, value: Option<u64>);

    /// Last known state of `device` (optionally for one room).
    fn query(&self, device: Device, room: Option<Room>) -> Option<LastKnown>;
}

/// Shows something to the user for a device, e.g. a pictogram.
pub trait Presenter: Send + Sync {
    /// Present `device`.
    fn show(&self, device: Device);
}

/// The collaborators a [`Pipeline::dispatch`](crate::Pipeline::dispatch) call forwards to.
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    /// Device executor.
    pub executor: &'a dyn Executor,
    /// State store.
    pub state: &'a dyn StateStore,
    /// Optional presenter.
    pub presenter: Option<&'a dyn Presenter>,
}

impl<'a> Collaborators<'a> {
    /// Executor and state store, no presenter.
    pub fn new(executor: &'a dyn Executor, state: &'a dyn StateStore) -> Self {
        Self {
            executor,
            state,
            presenter: None,
        }
    }

    /// Builder: attach a presenter.
    pub fn with_presenter(mut self, presenter: &'a dyn Presenter) -> Self {
        self.presenter = Some(presenter);
        self
    }
}
