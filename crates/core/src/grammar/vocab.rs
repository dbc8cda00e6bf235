//! Closed vocabularies: actions, devices, rooms, and prepositions.
//!
//! Every enum serializes as its canonical upper-case tag (`"ENCENDER"`,
//! `"BAÑO"`, ...), which is also the form used in domain tables and error
//! messages. DSL rendering uses the lower-case [`dsl_name`](Action::dsl_name)
//! forms.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Implements `as_str`, `ALL`, and `Display` for a closed vocabulary enum.
macro_rules! vocabulary {
    ($ty:ident { $($variant:ident => $tag:literal),+ $(,)? }) => {
        impl $ty {
            /// Every variant, in canonical table order.
            pub const ALL: &'static [$ty] = &[$($ty::$variant),+];

            /// Canonical upper-case tag.
            pub fn as_str(self) -> &'static str {
                match self {
                    $($ty::$variant => $tag),+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

// ── Actions ─────────────────────────────────────────────────────────────

/// What the user asks the home to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
    /// Switch a device on.
    Encender,
    /// Switch a device off.
    Apagar,
    /// Raise a level.
    Subir,
    /// Lower a level.
    Bajar,
    /// Set a level to an explicit value.
    Ajustar,
    /// Mute audio.
    Silenciar,
    /// Unmute audio.
    Activar,
    /// Ask for information (battery, time).
    Ver,
}

vocabulary!(Action {
    Encender => "ENCENDER",
    Apagar => "APAGAR",
    Subir => "SUBIR",
    Bajar => "BAJAR",
    Ajustar => "AJUSTAR",
    Silenciar => "SILENCIAR",
    Activar => "ACTIVAR",
    Ver => "VER",
});

impl Action {
    /// Lower-case form used in DSL output.
    pub fn dsl_name(self) -> String {
        self.as_str().to_lowercase()
    }

    /// `true` for the mute toggles, whose sentence shape is not checked further.
    pub fn is_mute_toggle(self) -> bool {
        matches!(self, Action::Silenciar | Action::Activar)
    }
}

// ── Devices and query subjects ──────────────────────────────────────────

/// A controllable device or a query subject.
///
/// `Bateria` and `Hora` are query subjects: they fill the device slot but are
/// only compatible with [`Action::Ver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Device {
    /// Lights.
    Luz,
    /// Fan.
    Ventilador,
    /// Television.
    Televisor,
    /// Heater.
    Calefactor,
    /// Audio volume.
    Volumen,
    /// Screen brightness.
    Brillo,
    /// Battery level query.
    Bateria,
    /// Current time query.
    Hora,
}

vocabulary!(Device {
    Luz => "LUZ",
    Ventilador => "VENTILADOR",
    Televisor => "TELEVISOR",
    Calefactor => "CALEFACTOR",
    Volumen => "VOLUMEN",
    Brillo => "BRILLO",
    Bateria => "BATERIA",
    Hora => "HORA",
});

impl Device {
    /// `true` for `BATERIA` and `HORA`.
    pub fn is_query(self) -> bool {
        matches!(self, Device::Bateria | Device::Hora)
    }

    /// `true` for devices with a numeric level (`VOLUMEN`, `BRILLO`).
    pub fn is_adjustable(self) -> bool {
        matches!(self, Device::Volumen | Device::Brillo)
    }

    /// Lower-case form used in DSL output and file names.
    pub fn dsl_name(self) -> String {
        self.as_str().to_lowercase()
    }
}

// ── Rooms ───────────────────────────────────────────────────────────────

/// A room of the house.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Room {
    /// Kitchen.
    Cocina,
    /// Bedroom.
    Dormitorio,
    /// Living room.
    Sala,
    /// Bathroom.
    #[serde(rename = "BAÑO", alias = "BANO")]
    Bano,
    /// Office.
    Oficina,
}

vocabulary!(Room {
    Cocina => "COCINA",
    Dormitorio => "DORMITORIO",
    Sala => "SALA",
    Bano => "BAÑO",
    Oficina => "OFICINA",
});

impl Room {
    /// DSL form: lower-case, spaces become `_`, `ñ` becomes `n`.
    pub fn dsl_name(self) -> String {
        self.as_str()
            .to_lowercase()
            .chars()
            .map(|c| match c {
                ' ' => '_',
                'ñ' => 'n',
                other => other,
            })
            .collect()
    }

    /// Human-readable lower-case name (`"baño"`), used in spoken messages.
    pub fn label(self) -> String {
        self.as_str().to_lowercase()
    }
}

// ── Prepositions ────────────────────────────────────────────────────────

/// Grammatical glue words recognised by the lexicon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Preposition {
    /// "en": introduces a room.
    En,
    /// "a": introduces a value.
    A,
    /// "de".
    De,
    /// "del".
    Del,
    /// "la" (article, dropped by the tokenizer).
    La,
    /// "el" (article, dropped by the tokenizer).
    El,
}

vocabulary!(Preposition {
    En => "EN",
    A => "A",
    De => "DE",
    Del => "DEL",
    La => "LA",
    El => "EL",
});

impl Preposition {
    /// Articles are recognised but never reach the parser.
    pub fn is_article(self) -> bool {
        matches!(self, Preposition::La | Preposition::El)
    }
}
