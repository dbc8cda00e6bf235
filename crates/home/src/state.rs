//! Device state store with a flat JSON snapshot and bounded history.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use domotica_core::{Action, Device, LastKnown, Room, StateStore};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::HomeConfig;

/// Errors raised while loading or persisting state.
#[derive(Debug, Error)]
pub enum StateError {
    /// The snapshot file exists but could not be read.
    #[error("cannot read state {path}: {source}")]
    Read {
        /// Snapshot path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The snapshot file is not a valid snapshot.
    #[error("cannot parse state {path}: {source}")]
    Parse {
        /// Snapshot path.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
    /// A stored level is outside `0..=100`.
    #[error("invalid state {path}: {device} level {level} exceeds 100")]
    LevelOutOfRange {
        /// Snapshot path.
        path: PathBuf,
        /// Device holding the level.
        device: Device,
        /// Stored level.
        level: u64,
    },
    /// The snapshot file could not be written.
    #[error("cannot write state {path}: {source}")]
    Io {
        /// Snapshot path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The snapshot could not be serialized.
    #[error("cannot encode state: {0}")]
    Json(#[from] serde_json::Error),
}

/// Current state of one device.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceRecord {
    /// Power flag, for switchable devices.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on: Option<bool>,
    /// Per-room power flags.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub rooms: BTreeMap<Room, bool>,
    /// Level for volume and brightness.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<u64>,
    /// Mute flag, for volume.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub muted: Option<bool>,
    /// Last action applied.
    pub last_action: Option<Action>,
    /// Human label: `encendido`, `ajustado_a_40`, `subido`, ...
    pub status: String,
    /// When the record last changed.
    pub timestamp: Option<DateTime<Utc>>,
}

/// One applied command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// When it was applied.
    pub timestamp: DateTime<Utc>,
    /// Target device.
    pub device: Device,
    /// Target room.
    pub room: Option<Room>,
    /// Applied action.
    pub action: Action,
    /// Value, for `AJUSTAR`.
    pub value: Option<u64>,
}

/// Everything the store persists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    /// Per-device records.
    pub devices: BTreeMap<Device, DeviceRecord>,
    /// Most recent commands, oldest first.
    pub history: Vec<HistoryEntry>,
    /// Time of the last update.
    pub updated_at: Option<DateTime<Utc>>,
}

fn is_switchable(device: Device) -> bool {
    matches!(
        device,
        Device::Luz | Device::Ventilador | Device::Televisor | Device::Calefactor
    )
}

/// Thread-safe device state store, optionally backed by a JSON file.
#[derive(Debug)]
pub struct StateManager {
    path: Option<PathBuf>,
    history_limit: usize,
    level_step: u64,
    brightness_floor: u64,
    default_volume: u64,
    default_brightness: u64,
    inner: Mutex<Snapshot>,
}

impl StateManager {
    /// Store that never touches the filesystem.
    pub fn in_memory(config: &HomeConfig) -> Self {
        Self {
            path: None,
            history_limit: config.history_limit,
            level_step: config.level_step,
            brightness_floor: config.brightness_floor,
            default_volume: config.default_volume,
            default_brightness: config.default_brightness,
            inner: Mutex::new(default_snapshot(config, Utc::now())),
        }
    }

    /// Store backed by `path`.
    ///
    /// A missing file starts from defaults. An unreadable or corrupt file
    /// also starts from defaults and is overwritten on the next update.
    pub fn open(config: &HomeConfig, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut manager = Self::in_memory(config);
        match load_snapshot(&path) {
            Ok(Some(snapshot)) => {
                tracing::info!(path = %path.display(), devices = snapshot.devices.len(), "state loaded");
                manager.inner = Mutex::new(snapshot);
            }
            Ok(None) => {
                tracing::debug!(path = %path.display(), "no state file, using defaults");
            }
            Err(error) => {
                tracing::warn!(%error, "ignoring unreadable state file");
            }
        }
        manager.path = Some(path);
        manager
    }

    /// Store backed by `config.state_file`.
    pub fn from_config(config: &HomeConfig) -> Self {
        Self::open(config, config.state_file.clone())
    }

    /// Snapshot file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> Snapshot {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, Snapshot> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply an executed action and save the snapshot if file-backed.
    pub fn try_update(
        &self,
        device: Device,
        room: Option<Room>,
        action: Action,
        value: Option<u64>,
    ) -> Result<(), StateError> {
        let now = Utc::now();
        let mut snap = self.lock();
        let record = snap.devices.entry(device).or_default();
        self.apply(record, device, room, action, value);
        record.last_action = Some(action);
        record.timestamp = Some(now);

        snap.history.push(HistoryEntry {
            timestamp: now,
            device,
            room,
            action,
            value,
        });
        if snap.history.len() > self.history_limit {
            let excess = snap.history.len() - self.history_limit;
            snap.history.drain(..excess);
        }
        snap.updated_at = Some(now);
        tracing::debug!(%device, %action, status = %snap.devices[&device].status, "state updated");

        match &self.path {
            Some(path) => save_snapshot(path, &snap),
            None => Ok(()),
        }
    }

    fn apply(
        &self,
        record: &mut DeviceRecord,
        device: Device,
        room: Option<Room>,
        action: Action,
        value: Option<u64>,
    ) {
        record.status = action.dsl_name();
        match (device, action) {
            (d, Action::Encender | Action::Apagar) if is_switchable(d) => {
                let on = action == Action::Encender;
                record.on = Some(on);
                if let Some(r) = room {
                    record.rooms.insert(r, on);
                }
                record.status = if on { "encendido" } else { "apagado" }.into();
            }
            (Device::Volumen | Device::Brillo, Action::Ajustar) => {
                if let Some(v) = value {
                    record.level = Some(v);
                    if device == Device::Volumen {
                        record.muted = Some(false);
                    }
                    record.status = format!("ajustado_a_{v}");
                }
            }
            (Device::Volumen | Device::Brillo, Action::Subir) => {
                let current = record.level.unwrap_or(self.default_level(device));
                record.level = Some(current.saturating_add(self.level_step).min(100));
                record.status = "subido".into();
            }
            (Device::Volumen | Device::Brillo, Action::Bajar) => {
                let floor = if device == Device::Brillo {
                    self.brightness_floor
                } else {
                    0
                };
                let current = record.level.unwrap_or(self.default_level(device));
                record.level = Some(current.saturating_sub(self.level_step).max(floor));
                record.status = "bajado".into();
            }
            (Device::Volumen, Action::Silenciar) => {
                record.muted = Some(true);
                record.status = "silenciado".into();
            }
            (Device::Volumen, Action::Activar) => {
                record.muted = Some(false);
                record.status = "activado".into();
            }
            _ => {}
        }
    }

    fn default_level(&self, device: Device) -> u64 {
        match device {
            Device::Brillo => self.default_brightness,
            _ => self.default_volume,
        }
    }
}

impl StateStore for StateManager {
    fn update(&self, device: Device, room: Option<Room>, action: Action, value: Option<u64>) {
        if let Err(e) = self.try_update(device, room, action, value) {
            tracing::error!(error = %e, "failed to save state");
        }
    }

    fn query(&self, device: Device, room: Option<Room>) -> Option<LastKnown> {
        let snap = self.lock();
        let record = snap.devices.get(&device)?;
        let on = match (record.on, room) {
            (Some(_), Some(r)) => Some(record.rooms.get(&r).copied().unwrap_or(false)),
            (on, _) => on,
        };
        Some(LastKnown {
            device,
            room,
            last_action: record.last_action,
            status: record.status.clone(),
            level: record.level,
            on,
            timestamp: record.timestamp,
        })
    }
}

// ── Persistence ─────────────────────────────────────────────────────────

fn default_snapshot(config: &HomeConfig, now: DateTime<Utc>) -> Snapshot {
    let mut devices = BTreeMap::new();
    for &device in Device::ALL {
        let record = match device {
            d if is_switchable(d) => DeviceRecord {
                on: Some(false),
                status: "apagado".into(),
                ..DeviceRecord::default()
            },
            Device::Volumen => DeviceRecord {
                level: Some(config.default_volume),
                muted: Some(false),
                status: "normal".into(),
                ..DeviceRecord::default()
            },
            Device::Brillo => DeviceRecord {
                level: Some(config.default_brightness),
                status: "normal".into(),
                ..DeviceRecord::default()
            },
            _ => continue,
        };
        devices.insert(
            device,
            DeviceRecord {
                timestamp: Some(now),
                ..record
            },
        );
    }
    Snapshot {
        devices,
        history: Vec::new(),
        updated_at: None,
    }
}

/// `Ok(None)` when the file does not exist.
fn load_snapshot(path: &Path) -> Result<Option<Snapshot>, StateError> {
    let text = match std::fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(StateError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    let snapshot: Snapshot = serde_json::from_str(&text).map_err(|source| StateError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    for (&device, record) in &snapshot.devices {
        if let Some(level) = record.level
            && level > 100
        {
            return Err(StateError::LevelOutOfRange {
                path: path.to_path_buf(),
                device,
                level,
            });
        }
    }
    Ok(Some(snapshot))
}

fn save_snapshot(path: &Path, snapshot: &Snapshot) -> Result<(), StateError> {
    let json = serde_json::to_string_pretty(snapshot)?;
    std::fs::write(path, json).map_err(|source| StateError::Io {
        path: path.to_path_buf(),
        source,
    })
}
