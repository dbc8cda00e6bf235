//! Domain tables: which devices and rooms exist, which actions apply to
//! which devices, and the numeric ranges of adjustable devices.
//!
//! [`DomainTables::default`] is the built-in home. A JSON file with the same
//! shape can replace it; [`DomainTables::from_json`] validates it on load.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::vocab::{Action, Device, Room};

/// Current format version for the domain tables JSON schema.
pub const TABLE_FORMAT_VERSION: &str = "1.0";

/// Devices an action may be applied to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompatibilityRule {
    /// The action.
    pub action: Action,
    /// Compatible devices, in listing order.
    pub devices: Vec<Device>,
}

/// Inclusive numeric range for an adjustable device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueRange {
    /// The device.
    pub device: Device,
    /// Smallest accepted value.
    pub min: u64,
    /// Largest accepted value.
    pub max: u64,
}

impl ValueRange {
    /// `true` if `value` lies within `[min, max]`.
    pub fn contains(&self, value: u64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// The domain knowledge consulted by the semantic validator.
///
/// Read-only after construction; share it by reference or `Arc`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainTables {
    /// Schema version of this table set.
    pub format_version: String,
    /// Known devices and query subjects, in listing order.
    pub devices: Vec<Device>,
    /// Known rooms, in listing order.
    pub rooms: Vec<Room>,
    /// Action to device compatibility.
    pub compatibility: Vec<CompatibilityRule>,
    /// Ranges of adjustable devices.
    #[serde(default)]
    pub ranges: Vec<ValueRange>,
}

/// Errors raised while loading a domain tables file.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum TablesError {
    /// The file is not valid JSON for this schema.
    #[error("invalid tables JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// The file declares a format version this build cannot read.
    #[error("unsupported tables format version '{found}' (expected {TABLE_FORMAT_VERSION})")]
    Version {
        /// Version found in the file.
        found: String,
    },
    /// An action has more than one compatibility rule.
    #[error("action {0} has more than one compatibility rule")]
    DuplicateRule(Action),
    /// A rule or range names a device missing from `devices`.
    #[error("{context} names device {device}, which is not in the device list")]
    UnlistedDevice {
        /// Where the device was referenced.
        context: String,
        /// The device.
        device: Device,
    },
    /// A range with `min > max`.
    #[error("range for {device} is empty ({min} > {max})")]
    EmptyRange {
        /// The device.
        device: Device,
        /// Declared minimum.
        min: u64,
        /// Declared maximum.
        max: u64,
    },
}

impl Default for DomainTables {
    fn default() -> Self {
        use Device::*;
        let switchable = [Luz, Ventilador, Televisor, Calefactor];
        let levels = [Volumen, Brillo];
        let rule = |action, devices: &[Device]| CompatibilityRule {
            action,
            devices: devices.to_vec(),
        };
        Self {
            format_version: TABLE_FORMAT_VERSION.to_string(),
            devices: vec![Luz, Ventilador, Televisor, Calefactor, Volumen, Brillo, Bateria, Hora],
            rooms: Room::ALL.to_vec(),
            compatibility: vec![
                rule(Action::Encender, &switchable),
                rule(Action::Apagar, &switchable),
                rule(Action::Subir, &levels),
                rule(Action::Bajar, &levels),
                rule(Action::Ajustar, &levels),
                rule(Action::Silenciar, &[Volumen]),
                rule(Action::Activar, &[Volumen]),
                rule(Action::Ver, &[Bateria, Hora]),
            ],
            ranges: vec![
                ValueRange { device: Volumen, min: 0, max: 100 },
                ValueRange { device: Brillo, min: 0, max: 100 },
            ],
        }
    }
}

impl DomainTables {
    /// Parse and validate a JSON table set.
    pub fn from_json(json: &str) -> Result<Self, TablesError> {
        let tables: DomainTables = serde_json::from_str(json)?;
        tables.check()?;
        Ok(tables)
    }

    /// Check internal consistency.
    pub fn check(&self) -> Result<(), TablesError> {
        let major = self.format_version.split('.').next().unwrap_or_default();
        let expected = TABLE_FORMAT_VERSION.split('.').next().unwrap_or_default();
        if major != expected {
            return Err(TablesError::Version {
                found: self.format_version.clone(),
            });
        }

        let mut seen = HashSet::new();
        for rule in &self.compatibility {
            if !seen.insert(rule.action) {
                return Err(TablesError::DuplicateRule(rule.action));
            }
            if let Some(device) = rule.devices.iter().find(|d| !self.knows_device(**d)) {
                return Err(TablesError::UnlistedDevice {
                    context: format!("compatibility rule for {}", rule.action),
                    device: *device,
                });
            }
        }
        for range in &self.ranges {
            if !self.knows_device(range.device) {
                return Err(TablesError::UnlistedDevice {
                    context: "a value range".into(),
                    device: range.device,
                });
            }
            if range.min > range.max {
                return Err(TablesError::EmptyRange {
                    device: range.device,
                    min: range.min,
                    max: range.max,
                });
            }
        }
        Ok(())
    }

    /// `true` if `device` is in the device list.
    pub fn knows_device(&self, device: Device) -> bool {
        self.devices.contains(&device)
    }

    /// `true` if `room` is in the room list.
    pub fn knows_room(&self, room: Room) -> bool {
        self.rooms.contains(&room)
    }

    /// Devices compatible with `action`, or `None` if the action has no rule.
    pub fn compatible_devices(&self, action: Action) -> Option<&[Device]> {
        self.compatibility
            .iter()
            .find(|r| r.action == action)
            .map(|r| r.devices.as_slice())
    }

    /// Range of an adjustable device, if it has one.
    pub fn range_for(&self, device: Device) -> Option<ValueRange> {
        self.ranges.iter().copied().find(|r| r.device == device)
    }
}
