use serde::{Deserialize, Serialize};

use super::vocab::{Action, Device, Room};

/// A validated command: the four semantic slots.
///
/// Built by the validator, which guarantees that `action` is compatible with
/// `device`, that `room` is a known room, and that `value` lies in the
/// device's range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Command {
    /// What to do.
    pub action: Action,
    /// Device or query subject.
    pub device: Device,
    /// Room, if the command named one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<Room>,
    /// Target level, if the command named one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<u64>,
}

impl Command {
    /// A command with no room and no value.
    pub fn new(action: Action, device: Device) -> Self {
        Self {
            action,
            device,
            room: None,
            value: None,
        }
    }

    /// Builder: set the room.
    pub fn in_room(mut self, room: Room) -> Self {
        self.room = Some(room);
        self
    }

    /// Builder: set the value.
    pub fn with_value(mut self, value: u64) -> Self {
        self.value = Some(value);
        self
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.action, self.device)?;
        if let Some(v) = self.value {
            write!(f, " A {v}")?;
        }
        if let Some(r) = self.room {
            write!(f, " EN {r}")?;
        }
        Ok(())
    }
}
