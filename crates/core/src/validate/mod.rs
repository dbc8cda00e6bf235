//! Semantic validation: fill the four slots and check them against the
//! domain tables.
//!
//! Slot filling is a single left-to-right scan where the most recent token
//! of each class wins. Checks then run in a fixed order and stop at the first
//! failure:
//!
//! 1. a device was named
//! 2. an action was named
//! 3. the device is in the device list
//! 4. the action is compatible with the device
//! 5. the room, if any, is in the room list
//! 6. the value, if any, is within the device's range

use serde::Serialize;

use crate::grammar::command::Command;
use crate::grammar::diag::{Diagnostic, Span, codes, ctx};
use crate::grammar::lexer::{Token, TokenKind};
use crate::grammar::tables::DomainTables;
use crate::grammar::vocab::{Action, Device, Room};

/// A command that failed semantic validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum SemanticError {
    /// No device or query subject in the command.
    #[error("no device specified")]
    MissingDevice,
    /// No action in the command.
    #[error("no action specified")]
    MissingAction,
    /// The device is not in the tables' device list.
    #[error("unknown device {device}; valid devices: {}", join(.valid))]
    UnknownDevice {
        /// The device named.
        device: Device,
        /// Devices the tables know, in table order.
        valid: Vec<Device>,
        /// Span of the device word.
        span: Span,
    },
    /// The action cannot be applied to the device.
    #[error(
        "action {action} not compatible with device {device}; compatible devices: {}",
        join(.compatible)
    )]
    IncompatibleAction {
        /// The action named.
        action: Action,
        /// The device named.
        device: Device,
        /// Devices the action accepts, in table order.
        compatible: Vec<Device>,
        /// Span of the device word.
        span: Span,
    },
    /// The room is not in the tables' room list.
    #[error("room not recognized: {room}; valid rooms: {}", join(.valid))]
    UnknownRoom {
        /// The room named.
        room: Room,
        /// Rooms the tables know, in table order.
        valid: Vec<Room>,
        /// Span of the room word.
        span: Span,
    },
    /// The value lies outside the device's range.
    #[error("value {value} out of range for {device}; valid range: {min}-{max}")]
    OutOfRange {
        /// The device.
        device: Device,
        /// The value given.
        value: u64,
        /// Smallest accepted value.
        min: u64,
        /// Largest accepted value.
        max: u64,
        /// Span of the number.
        span: Span,
    },
}

fn join<T: std::fmt::Display>(items: &[T]) -> String {
    if items.is_empty() {
        return "none".into();
    }
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl SemanticError {
    /// Diagnostic code for this failure.
    pub fn code(&self) -> &'static str {
        match self {
            SemanticError::MissingDevice => codes::SEMANTIC_MISSING_DEVICE,
            SemanticError::MissingAction => codes::SEMANTIC_MISSING_ACTION,
            SemanticError::UnknownDevice { .. } => codes::SEMANTIC_UNKNOWN_DEVICE,
            SemanticError::IncompatibleAction { .. } => codes::SEMANTIC_INCOMPATIBLE_ACTION,
            SemanticError::UnknownRoom { .. } => codes::SEMANTIC_UNKNOWN_ROOM,
            SemanticError::OutOfRange { .. } => codes::SEMANTIC_OUT_OF_RANGE,
        }
    }

    /// Span of the offending token, when there is one.
    pub fn span(&self) -> Option<Span> {
        match self {
            SemanticError::MissingDevice | SemanticError::MissingAction => None,
            SemanticError::UnknownDevice { span, .. }
            | SemanticError::IncompatibleAction { span, .. }
            | SemanticError::UnknownRoom { span, .. }
            | SemanticError::OutOfRange { span, .. } => Some(*span),
        }
    }

    /// Convert to an error diagnostic with machine-readable context.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.code(), self.to_string(), self.span());
        match self {
            SemanticError::MissingDevice | SemanticError::MissingAction => diag,
            SemanticError::UnknownDevice { device, valid, .. } => diag.with_context(ctx!(
                "device" => device.as_str(),
                "valid" => join(valid),
            )),
            SemanticError::IncompatibleAction {
                action,
                device,
                compatible,
                ..
            } => diag.with_context(ctx!(
                "action" => action.as_str(),
                "device" => device.as_str(),
                "compatible" => join(compatible),
            )),
            SemanticError::UnknownRoom { room, valid, .. } => diag.with_context(ctx!(
                "room" => room.as_str(),
                "valid" => join(valid),
            )),
            SemanticError::OutOfRange {
                device,
                value,
                min,
                max,
                ..
            } => diag.with_context(ctx!(
                "device" => device.as_str(),
                "value" => value.to_string(),
                "min" => min.to_string(),
                "max" => max.to_string(),
            )),
        }
    }
}

/// Successful validation: the command plus slot-overwrite warnings.
#[derive(Debug, Clone, Serialize)]
pub struct Validation {
    /// The validated command.
    pub command: Command,
    /// `DOM3101` warnings, one per overwritten slot.
    pub warnings: Vec<Diagnostic>,
}

// ── Slot filling ────────────────────────────────────────────────────────

#[derive(Default)]
struct Slots {
    action: Option<(Action, Span)>,
    device: Option<(Device, Span)>,
    room: Option<(Room, Span)>,
    value: Option<(u64, Span)>,
    overwrites: Vec<Diagnostic>,
}

impl Slots {
    fn fill<T: Copy + std::fmt::Display>(
        slot: &mut Option<(T, Span)>,
        name: &'static str,
        new: T,
        span: Span,
        overwrites: &mut Vec<Diagnostic>,
    ) {
        if let Some((old, _)) = slot.replace((new, span)) {
            tracing::warn!(slot = name, old = %old, new = %new, "slot overwritten, last value wins");
            overwrites.push(
                Diagnostic::from_code(
                    codes::SEMANTIC_SLOT_OVERWRITTEN,
                    format!("{name} given more than once; using {new} instead of {old}"),
                    Some(span),
                )
                .with_context(ctx!("slot" => name, "old" => old.to_string(), "new" => new.to_string())),
            );
        }
    }

    fn scan(tokens: &[Token]) -> Self {
        let mut s = Slots::default();
        for t in tokens {
            match t.kind {
                TokenKind::Action(a) => Self::fill(&mut s.action, "action", a, t.span, &mut s.overwrites),
                TokenKind::Device(d) => Self::fill(&mut s.device, "device", d, t.span, &mut s.overwrites),
                TokenKind::Room(r) => Self::fill(&mut s.room, "room", r, t.span, &mut s.overwrites),
                TokenKind::Number => {
                    if let Some(n) = t.number() {
                        Self::fill(&mut s.value, "value", n, t.span, &mut s.overwrites);
                    }
                }
                TokenKind::Preposition(_) | TokenKind::Unknown => {}
            }
        }
        s
    }
}

// ── Validator ───────────────────────────────────────────────────────────

/// Checks token sequences against a set of domain tables.
#[derive(Debug, Clone, Copy)]
pub struct Validator<'t> {
    tables: &'t DomainTables,
}

impl<'t> Validator<'t> {
    /// Validator over the given tables.
    pub fn new(tables: &'t DomainTables) -> Self {
        Self { tables }
    }

    /// The tables this validator consults.
    pub fn tables(&self) -> &'t DomainTables {
        self.tables
    }

    /// Fill slots and run every check, keeping overwrite warnings.
    pub fn validate_tokens(&self, tokens: &[Token]) -> Result<Validation, SemanticError> {
        let slots = Slots::scan(tokens);
        tracing::debug!(
            action = ?slots.action.map(|s| s.0),
            device = ?slots.device.map(|s| s.0),
            room = ?slots.room.map(|s| s.0),
            value = ?slots.value.map(|s| s.0),
            "slots extracted"
        );

        let Some((device, device_span)) = slots.device else {
            return Err(SemanticError::MissingDevice);
        };
        let Some((action, _)) = slots.action else {
            return Err(SemanticError::MissingAction);
        };

        if !self.tables.knows_device(device) {
            return Err(SemanticError::UnknownDevice {
                device,
                valid: self.tables.devices.clone(),
                span: device_span,
            });
        }

        let compatible = self.tables.compatible_devices(action).unwrap_or_default();
        if !compatible.contains(&device) {
            return Err(SemanticError::IncompatibleAction {
                action,
                device,
                compatible: compatible.to_vec(),
                span: device_span,
            });
        }

        if let Some((room, span)) = slots.room
            && !self.tables.knows_room(room)
        {
            return Err(SemanticError::UnknownRoom {
                room,
                valid: self.tables.rooms.clone(),
                span,
            });
        }

        if let (Some((value, span)), Some(range)) = (slots.value, self.tables.range_for(device))
            && !range.contains(value)
        {
            return Err(SemanticError::OutOfRange {
                device,
                value,
                min: range.min,
                max: range.max,
                span,
            });
        }

        Ok(Validation {
            command: Command {
                action,
                device,
                room: slots.room.map(|r| r.0),
                value: slots.value.map(|v| v.0),
            },
            warnings: slots.overwrites,
        })
    }

    /// Like [`validate_tokens`](Self::validate_tokens) but returns only the command.
    pub fn validate(&self, tokens: &[Token]) -> Result<Command, SemanticError> {
        self.validate_tokens(tokens).map(|v| v.command)
    }
}

/// Validate against the given tables, keeping warnings.
pub fn validate_tokens(tokens: &[Token], tables: &DomainTables) -> Result<Validation, SemanticError> {
    Validator::new(tables).validate_tokens(tokens)
}

/// Validate against the given tables.
pub fn validate(tokens: &[Token], tables: &DomainTables) -> Result<Command, SemanticError> {
    Validator::new(tables).validate(tokens)
}
