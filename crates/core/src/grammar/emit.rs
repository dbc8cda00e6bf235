//! DSL generator: renders a validated [`Command`] into its canonical string
//! and wraps it with metadata.
//!
//! The DSL string depends only on the command. Metadata adds the creation
//! instant and a short random id, so two generations of the same command
//! share `dsl` but not `metadata`.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::command::Command;
use super::vocab::{Action, Device, Room};

/// Version tag written into every generated command's metadata.
pub const DSL_VERSION: &str = "1.0";

// ── Templates ───────────────────────────────────────────────────────────

/// The DSL template chosen for a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Template {
    /// `ver_{device}`
    Query,
    /// `{action}_{device}_{value}_en_{room}`
    Full,
    /// `{action}_{device}_{value}`
    WithValue,
    /// `{action}_{device}_en_{room}`
    WithRoom,
    /// `{action}_{device}`
    Simple,
}

/// Pick the template for a command. `VER` always uses the query template.
pub fn select_template(command: &Command) -> Template {
    match (command.action, command.value, command.room) {
        (Action::Ver, _, _) => Template::Query,
        (_, Some(_), Some(_)) => Template::Full,
        (_, Some(_), None) => Template::WithValue,
        (_, None, Some(_)) => Template::WithRoom,
        (_, None, None) => Template::Simple,
    }
}

/// Render the DSL string of a command.
pub fn render_dsl(command: &Command) -> String {
    let action = command.action.dsl_name();
    let device = command.device.dsl_name();
    let room = command.room.map(Room::dsl_name).unwrap_or_default();
    let value = command.value.map(|v| v.to_string()).unwrap_or_default();
    match select_template(command) {
        Template::Query => format!("ver_{device}"),
        Template::Full => format!("{action}_{device}_{value}_en_{room}"),
        Template::WithValue => format!("{action}_{device}_{value}"),
        Template::WithRoom => format!("{action}_{device}_en_{room}"),
        Template::Simple => format!("{action}_{device}"),
    }
}

// ── Generated artifact ──────────────────────────────────────────────────

/// Metadata attached to a generated command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Metadata {
    /// Creation instant (RFC 3339, UTC).
    pub timestamp: DateTime<Utc>,
    /// Short unique id: 8 hex characters.
    pub command_id: String,
    /// DSL version tag.
    pub dsl_version: &'static str,
    /// Echo of the action slot.
    pub action: Action,
    /// Echo of the device slot.
    pub device: Device,
    /// Echo of the room slot.
    pub room: Option<Room>,
    /// Echo of the value slot.
    pub value: Option<u64>,
}

/// A rendered command: DSL string, metadata, and the command itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedCode {
    /// Canonical DSL string, e.g. `encender_luz_en_cocina`.
    pub dsl: String,
    /// Timestamp, id, and version.
    pub metadata: Metadata,
    /// The originating command.
    pub command: Command,
}

// ── Generator ───────────────────────────────────────────────────────────

/// Renders commands. Cheap to construct and safe to share across threads.
#[derive(Debug, Clone, Copy)]
pub struct CodeGenerator {
    next_id: fn() -> String,
}

impl Default for CodeGenerator {
    fn default() -> Self {
        Self {
            next_id: random_short_id,
        }
    }
}

fn random_short_id() -> String {
    let mut id = uuid::Uuid::new_v4().simple().to_string();
    id.truncate(8);
    id
}

impl CodeGenerator {
    /// Generator with random v4-UUID-derived ids.
    pub fn new() -> Self {
        Self::default()
    }

    /// Generator with a custom id source (for reproducible output).
    pub fn with_id_source(next_id: fn() -> String) -> Self {
        Self { next_id }
    }

    /// Generate code stamped with the current time.
    pub fn generate(&self, command: &Command) -> GeneratedCode {
        self.generate_at(command, Utc::now())
    }

    /// Generate code stamped with `at`.
    pub fn generate_at(&self, command: &Command, at: DateTime<Utc>) -> GeneratedCode {
        let dsl = render_dsl(command);
        tracing::debug!(dsl = %dsl, template = ?select_template(command), "generated DSL");
        GeneratedCode {
            dsl,
            metadata: Metadata {
                timestamp: at,
                command_id: (self.next_id)(),
                dsl_version: DSL_VERSION,
                action: command.action,
                device: command.device,
                room: command.room,
                value: command.value,
            },
            command: *command,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_id() -> String {
        "deadbeef".into()
    }

    // ── Template selection ──────────────────────────────────────────────

    #[test]
    fn templates() {
        let base = Command::new(Action::Ajustar, Device::Volumen);
        assert_eq!(select_template(&base), Template::Simple);
        assert_eq!(select_template(&base.with_value(3)), Template::WithValue);
        assert_eq!(select_template(&base.in_room(Room::Sala)), Template::WithRoom);
        assert_eq!(
            select_template(&base.with_value(3).in_room(Room::Sala)),
            Template::Full
        );
        let ver = Command::new(Action::Ver, Device::Hora).in_room(Room::Sala);
        assert_eq!(select_template(&ver), Template::Query);
    }

    #[test]
    fn render_each_template() {
        let c = Command::new(Action::Ajustar, Device::Volumen);
        assert_eq!(render_dsl(&c), "ajustar_volumen");
        assert_eq!(render_dsl(&c.with_value(40)), "ajustar_volumen_40");
        assert_eq!(
            render_dsl(&c.with_value(40).in_room(Room::Bano)),
            "ajustar_volumen_40_en_bano"
        );
        let c = Command::new(Action::Encender, Device::Luz).in_room(Room::Cocina);
        assert_eq!(render_dsl(&c), "encender_luz_en_cocina");
        assert_eq!(render_dsl(&Command::new(Action::Ver, Device::Bateria)), "ver_bateria");
    }

    // ── Metadata ────────────────────────────────────────────────────────

    #[test]
    fn metadata_is_complete() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
        let c = Command::new(Action::Subir, Device::Brillo).in_room(Room::Oficina);
        let code = CodeGenerator::with_id_source(fixed_id).generate_at(&c, at);
        assert_eq!(code.dsl, "subir_brillo_en_oficina");
        assert_eq!(code.metadata.command_id, "deadbeef");
        assert_eq!(code.metadata.dsl_version, "1.0");
        assert_eq!(code.metadata.timestamp, at);
        assert_eq!(code.metadata.room, Some(Room::Oficina));
        assert_eq!(code.command, c);
    }

    #[test]
    fn random_ids_are_short_hex() {
        let code = CodeGenerator::new().generate(&Command::new(Action::Ver, Device::Hora));
        let id = &code.metadata.command_id;
        assert_eq!(id.len(), 8);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()), "{id}");
    }

    #[test]
    fn json_shape() {
        let at = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let c = Command::new(Action::Ajustar, Device::Volumen).with_value(40);
        let code = CodeGenerator::with_id_source(fixed_id).generate_at(&c, at);
        let json = serde_json::to_value(&code).unwrap();
        assert_eq!(json["dsl"], "ajustar_volumen_40");
        assert_eq!(json["metadata"]["timestamp"], "2024-01-02T03:04:05Z");
        assert_eq!(json["metadata"]["action"], "AJUSTAR");
        assert_eq!(json["metadata"]["room"], serde_json::Value::Null);
        assert_eq!(json["command"]["value"], 40);
        assert!(json["command"].get("room").is_none());
    }
}
