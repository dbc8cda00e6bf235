//! Word lists mapping normalized Spanish words to canonical vocabulary.
//!
//! Lookups expect input already passed through
//! [`normalize`](super::lexer::normalize): lower-case, no diacritics.

use super::lexer::TokenKind;
use super::vocab::{Action, Device, Preposition, Room};

const ACTIONS: &[(&str, Action)] = &[
    ("encender", Action::Encender),
    ("enciende", Action::Encender),
    ("prende", Action::Encender),
    ("prender", Action::Encender),
    ("apagar", Action::Apagar),
    ("apaga", Action::Apagar),
    ("subir", Action::Subir),
    ("sube", Action::Subir),
    ("aumentar", Action::Subir),
    ("bajar", Action::Bajar),
    ("baja", Action::Bajar),
    ("disminuir", Action::Bajar),
    ("ajustar", Action::Ajustar),
    ("ajusta", Action::Ajustar),
    ("poner", Action::Ajustar),
    ("silenciar", Action::Silenciar),
    ("silencia", Action::Silenciar),
    ("mutear", Action::Silenciar),
    ("activar", Action::Activar),
    ("activa", Action::Activar),
    ("ver", Action::Ver),
    ("mostrar", Action::Ver),
    ("dime", Action::Ver),
    ("decir", Action::Ver),
];

const DEVICES: &[(&str, Device)] = &[
    ("luz", Device::Luz),
    ("luces", Device::Luz),
    ("lampara", Device::Luz),
    ("lamparas", Device::Luz),
    ("ventilador", Device::Ventilador),
    ("abanico", Device::Ventilador),
    ("televisor", Device::Televisor),
    ("television", Device::Televisor),
    ("tv", Device::Televisor),
    ("tele", Device::Televisor),
    ("calefactor", Device::Calefactor),
    ("calefaccion", Device::Calefactor),
    ("calentador", Device::Calefactor),
    ("volumen", Device::Volumen),
    ("audio", Device::Volumen),
    ("sonido", Device::Volumen),
    ("brillo", Device::Brillo),
    ("luminosidad", Device::Brillo),
];

const ROOMS: &[(&str, Room)] = &[
    ("cocina", Room::Cocina),
    ("dormitorio", Room::Dormitorio),
    ("cuarto", Room::Dormitorio),
    ("habitacion", Room::Dormitorio),
    ("recamara", Room::Dormitorio),
    ("sala", Room::Sala),
    ("living", Room::Sala),
    ("salon", Room::Sala),
    ("bano", Room::Bano),
    ("lavabo", Room::Bano),
    ("oficina", Room::Oficina),
    ("estudio", Room::Oficina),
    ("despacho", Room::Oficina),
];

const QUERIES: &[(&str, Device)] = &[
    ("bateria", Device::Bateria),
    ("pila", Device::Bateria),
    ("energia", Device::Bateria),
    ("hora", Device::Hora),
    ("tiempo", Device::Hora),
    ("reloj", Device::Hora),
];

const PREPOSITIONS: &[(&str, Preposition)] = &[
    ("en", Preposition::En),
    ("a", Preposition::A),
    ("de", Preposition::De),
    ("del", Preposition::Del),
    ("la", Preposition::La),
    ("el", Preposition::El),
];

fn find<T: Copy>(table: &[(&str, T)], word: &str) -> Option<T> {
    table.iter().find(|(w, _)| *w == word).map(|(_, v)| *v)
}

/// Classify a normalized word by probing the vocabularies in priority order.
///
/// Actions win over devices, devices over rooms, rooms over queries, and
/// queries over prepositions. Returns `None` for words outside the lexicon
/// (numbers included).
pub fn classify(word: &str) -> Option<TokenKind> {
    if let Some(a) = find(ACTIONS, word) {
        return Some(TokenKind::Action(a));
    }
    if let Some(d) = find(DEVICES, word) {
        return Some(TokenKind::Device(d));
    }
    if let Some(r) = find(ROOMS, word) {
        return Some(TokenKind::Room(r));
    }
    if let Some(q) = find(QUERIES, word) {
        return Some(TokenKind::Device(q));
    }
    find(PREPOSITIONS, word).map(TokenKind::Preposition)
}

/// All synonyms (normalized) that map to the given action.
pub fn action_synonyms(action: Action) -> impl Iterator<Item = &'static str> {
    ACTIONS
        .iter()
        .filter(move |(_, a)| *a == action)
        .map(|(w, _)| *w)
}

/// All synonyms (normalized) that map to the given device or query subject.
pub fn device_synonyms(device: Device) -> impl Iterator<Item = &'static str> {
    DEVICES
        .iter()
        .chain(QUERIES.iter())
        .filter(move |(_, d)| *d == device)
        .map(|(w, _)| *w)
}

/// All synonyms (normalized) that map to the given room.
pub fn room_synonyms(room: Room) -> impl Iterator<Item = &'static str> {
    ROOMS
        .iter()
        .filter(move |(_, r)| *r == room)
        .map(|(w, _)| *w)
}
