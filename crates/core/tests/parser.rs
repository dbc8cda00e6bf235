//! Parser tests: accepted shapes, leniency warnings, and rejection positions.

mod common;

use common::diag_codes;
use domotica_core::{SentenceShape, Severity, codes, parse, tokenize};

fn parse_str(input: &str) -> Result<domotica_core::Parsed, domotica_core::SyntaxError> {
    parse(&tokenize(input))
}

// ─── Query ──────────────────────────────────────────────────────────────────

#[test]
fn query_accepts_both_subjects() {
    for input in ["ver la hora", "dime la batería", "mostrar el reloj", "decir la energia"] {
        let p = parse_str(input).unwrap();
        assert_eq!(p.shape, SentenceShape::Query, "{input}");
        assert!(p.warnings.is_empty());
    }
}

#[test]
fn query_rejects_devices_and_rooms() {
    for input in ["ver la luz", "ver la cocina", "ver 5"] {
        let e = parse_str(input).unwrap_err();
        assert_eq!(e.code, codes::SYNTAX_UNEXPECTED_TOKEN, "{input}");
        assert_eq!(e.position, 1);
    }
}

// ─── Mute toggle ────────────────────────────────────────────────────────────

#[test]
fn mute_toggle_is_not_checked_further() {
    for input in ["silencia", "silencia el volumen", "activa la cocina luz 3", "mutear en"] {
        assert_eq!(parse_str(input).unwrap().shape, SentenceShape::MuteToggle, "{input}");
    }
}

// ─── Simple action ──────────────────────────────────────────────────────────

#[test]
fn simple_action_with_and_without_room() {
    let p = parse_str("apaga el televisor en la sala").unwrap();
    assert_eq!(p.shape, SentenceShape::SimpleAction);
    assert!(p.warnings.is_empty());

    let p = parse_str("sube el volumen").unwrap();
    assert_eq!(p.shape, SentenceShape::SimpleAction);
    assert!(p.warnings.is_empty());
}

#[test]
fn simple_action_requires_a_device_not_a_query() {
    let e = parse_str("enciende la hora").unwrap_err();
    assert_eq!(e.code, codes::SYNTAX_UNEXPECTED_TOKEN);
    assert_eq!(e.position, 1);
    assert!(e.reason.contains("hora"), "{}", e.reason);
}

#[test]
fn dangling_en_warns_with_incomplete() {
    let input = "baja el brillo en";
    let p = parse_str(input).unwrap();
    assert_eq!(diag_codes(&p.warnings), [codes::SYNTAX_INCOMPLETE]);
    let w = &p.warnings[0];
    assert_eq!(w.severity, Severity::Warn);
    assert_eq!(w.span.unwrap().start, input.len());
}

#[test]
fn room_clause_rejects_non_room() {
    let e = parse_str("enciende la luz en la hora").unwrap_err();
    assert_eq!(e.code, codes::SYNTAX_UNEXPECTED_TOKEN);
    assert_eq!(e.position, 3);
}

// ─── Value adjustment ───────────────────────────────────────────────────────

#[test]
fn adjustment_variants() {
    for input in [
        "ajusta el volumen a 20",
        "ajusta el brillo a 80 en la oficina",
        "poner el sonido a 5 en la cocina",
    ] {
        let p = parse_str(input).unwrap();
        assert_eq!(p.shape, SentenceShape::ValueAdjustment, "{input}");
        assert!(p.warnings.is_empty());
    }
}

#[test]
fn adjustment_without_value_warns() {
    let p = parse_str("poner el volumen").unwrap();
    assert_eq!(p.shape, SentenceShape::ValueAdjustment);
    assert_eq!(diag_codes(&p.warnings), [codes::SYNTAX_INCOMPLETE]);
}

#[test]
fn adjustment_with_room_but_no_value_is_silent() {
    let p = parse_str("ajusta el brillo en la sala").unwrap();
    assert!(p.warnings.is_empty());
}

#[test]
fn adjustment_device_must_have_a_level() {
    for input in ["ajusta la luz a 3", "ajusta el ventilador", "ajusta la bateria"] {
        assert_eq!(parse_str(input).unwrap_err().code, codes::SYNTAX_NOT_ADJUSTABLE, "{input}");
    }
    assert_eq!(
        parse_str("ajusta en la sala").unwrap_err().code,
        codes::SYNTAX_UNEXPECTED_TOKEN
    );
}

#[test]
fn a_needs_a_number() {
    let e = parse_str("ajusta el volumen a").unwrap_err();
    assert_eq!(e.code, codes::SYNTAX_EXPECTED_NUMBER);
    assert_eq!(e.reason, "expected a number after 'a'");

    let e = parse_str("ajusta el volumen a la sala").unwrap_err();
    assert_eq!(e.code, codes::SYNTAX_EXPECTED_NUMBER);
    assert!(e.reason.contains("sala"));
}

// ─── Head token ─────────────────────────────────────────────────────────────

#[test]
fn non_action_head_is_unrecognized() {
    for input in ["luz", "cocina enciende", "40", "en la sala"] {
        let e = parse_str(input).unwrap_err();
        assert_eq!(e.code, codes::SYNTAX_UNRECOGNIZED_COMMAND, "{input}");
        assert_eq!(e.position, 0);
    }
}

#[test]
fn bare_actions_are_syntax_errors() {
    for input in ["ver", "encender", "apaga", "sube", "ajusta", "por favor enciende"] {
        let e = parse_str(input).unwrap_err();
        assert_eq!(e.code, codes::SYNTAX_UNEXPECTED_TOKEN, "{input}");
        assert!(e.reason.ends_with("found end of input"), "{input}: {}", e.reason);
        assert!(e.span.is_empty());
        assert_eq!(e.span.start, input.len(), "{input}");
    }
}

#[test]
fn extra_tokens_after_a_full_match_are_accepted() {
    let p = parse_str("ver la hora en la cocina por favor").unwrap();
    assert_eq!(p.shape, SentenceShape::Query);
}
