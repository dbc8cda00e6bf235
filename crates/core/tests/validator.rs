//! Semantic validator tests: slot extraction, check order, compatibility
//! and range invariants, and custom tables.

mod common;

use common::TABLES;
use domotica_core::{
    Action, Command, Device, DomainTables, Room, SemanticError, codes, tokenize, validate,
    validate_tokens,
};

fn check(input: &str) -> Result<Command, SemanticError> {
    validate(&tokenize(input), &TABLES)
}

/// A token sequence naming `action` and `device` directly.
fn sentence(action: Action, device: Device) -> String {
    format!("{} {}", action.dsl_name(), device.dsl_name())
}

// ─── Slot extraction ────────────────────────────────────────────────────────

#[test]
fn four_slots_round_trip_for_each_shape() {
    let cases = [
        ("ver la bateria", Command::new(Action::Ver, Device::Bateria)),
        ("silencia el volumen", Command::new(Action::Silenciar, Device::Volumen)),
        (
            "enciende el ventilador en el dormitorio",
            Command::new(Action::Encender, Device::Ventilador).in_room(Room::Dormitorio),
        ),
        (
            "ajusta el volumen a 35 en la sala",
            Command::new(Action::Ajustar, Device::Volumen)
                .with_value(35)
                .in_room(Room::Sala),
        ),
    ];
    for (input, expected) in cases {
        assert_eq!(check(input).unwrap(), expected, "{input}");
    }
}

#[test]
fn last_token_of_each_class_wins() {
    let v = validate_tokens(&tokenize("ajusta el brillo a 10 a 20"), &TABLES).unwrap();
    assert_eq!(v.command.value, Some(20));
    assert_eq!(v.warnings.len(), 1);
    assert_eq!(v.warnings[0].id, codes::SEMANTIC_SLOT_OVERWRITTEN);
    assert_eq!(v.warnings[0].context.as_ref().unwrap()["slot"], "value");
}

#[test]
fn overwriting_the_device_can_change_the_outcome_of_checks() {
    // The parser only looks at the head; the validator sees the last device.
    let err = check("enciende la luz volumen").unwrap_err();
    assert!(matches!(
        err,
        SemanticError::IncompatibleAction { device: Device::Volumen, .. }
    ));
}

// ─── Check order ────────────────────────────────────────────────────────────

#[test]
fn missing_device_before_missing_action() {
    assert_eq!(check("en la cocina 5"), Err(SemanticError::MissingDevice));
    assert_eq!(check("luz en la cocina"), Err(SemanticError::MissingAction));
    assert_eq!(check("ver"), Err(SemanticError::MissingDevice));
}

#[test]
fn compatibility_before_room_before_range() {
    let mut tables = DomainTables::default();
    tables.rooms.retain(|r| *r != Room::Sala);
    // Incompatible and unknown room: compatibility is reported.
    let err = validate(&tokenize("enciende el brillo en la sala"), &tables).unwrap_err();
    assert_eq!(err.code(), codes::SEMANTIC_INCOMPATIBLE_ACTION);
    // Unknown room and out of range: room is reported.
    let err = validate(&tokenize("ajusta el brillo a 900 en la sala"), &tables).unwrap_err();
    assert_eq!(err.code(), codes::SEMANTIC_UNKNOWN_ROOM);
}

// ─── Compatibility invariant ────────────────────────────────────────────────

#[test]
fn every_action_device_pair_follows_the_table() {
    for &action in Action::ALL {
        let allowed = TABLES.compatible_devices(action).unwrap();
        for &device in Device::ALL {
            let result = check(&sentence(action, device));
            assert_eq!(
                result.is_ok(),
                allowed.contains(&device),
                "{action} x {device}: {result:?}"
            );
        }
    }
}

#[test]
fn scenario_c_lists_switchable_devices() {
    let err = check("enciende el volumen").unwrap_err();
    assert_eq!(
        err,
        SemanticError::IncompatibleAction {
            action: Action::Encender,
            device: Device::Volumen,
            compatible: vec![Device::Luz, Device::Ventilador, Device::Televisor, Device::Calefactor],
            span: domotica_core::Span::new(12, 19),
        }
    );
    assert!(err.to_string().contains("LUZ, VENTILADOR, TELEVISOR, CALEFACTOR"));
}

// ─── Range invariant ────────────────────────────────────────────────────────

#[test]
fn level_devices_accept_exactly_zero_to_hundred() {
    for device in ["volumen", "brillo"] {
        for value in [0u64, 1, 50, 99, 100, 101, 150, 1000, u64::MAX] {
            let input = format!("ajusta el {device} a {value}");
            let ok = check(&input).is_ok();
            assert_eq!(ok, value <= 100, "{input}");
        }
    }
}

#[test]
fn scenario_b_out_of_range() {
    let err = check("ajusta el brillo a 150").unwrap_err();
    assert_eq!(err.code(), codes::SEMANTIC_OUT_OF_RANGE);
    assert_eq!(err.to_string(), "value 150 out of range for BRILLO; valid range: 0-100");
}

// ─── Custom tables ──────────────────────────────────────────────────────────

#[test]
fn custom_tables_can_forget_a_device() {
    let mut tables = DomainTables::default();
    tables.devices.retain(|d| *d != Device::Calefactor);
    for rule in &mut tables.compatibility {
        rule.devices.retain(|d| *d != Device::Calefactor);
    }
    tables.check().unwrap();
    let err = validate(&tokenize("enciende el calefactor"), &tables).unwrap_err();
    assert_eq!(err.code(), codes::SEMANTIC_UNKNOWN_DEVICE);
    let msg = err.to_string();
    let (_, listed) = msg.split_once("valid devices: ").unwrap();
    assert!(!listed.contains("CALEFACTOR"), "{msg}");
}

#[test]
fn custom_tables_can_narrow_ranges() {
    let mut tables = DomainTables::default();
    tables.ranges[0].max = 60;
    assert!(validate(&tokenize("ajusta el volumen a 60"), &tables).is_ok());
    let err = validate(&tokenize("ajusta el volumen a 61"), &tables).unwrap_err();
    assert!(err.to_string().ends_with("valid range: 0-60"));
}

#[test]
fn action_without_rule_is_incompatible_with_everything() {
    let mut tables = DomainTables::default();
    tables.compatibility.retain(|r| r.action != Action::Ver);
    let err = validate(&tokenize("ver la hora"), &tables).unwrap_err();
    assert!(err.to_string().ends_with("compatible devices: none"), "{err}");
}
