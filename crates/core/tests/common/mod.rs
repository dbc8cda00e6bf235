//! Shared test helpers for `domotica_core` integration tests.

#![allow(unreachable_pub)]

use std::sync::LazyLock;
use domotica_core::{Compiled, Diagnostic, DomainTables, Pipeline, Token, TokenKind, tokenize};

/// Default tables built once per test binary.
#[allow(dead_code)]
pub static TABLES: LazyLock<DomainTables> = LazyLock::new(DomainTables::default);

// ─── Token helpers ───────────────────────────────────────────────────────────

/// Canonical tags of the filtered tokens, e.g. `["ENCENDER", "LUZ"]`.
#[allow(dead_code)]
pub fn tags(input: &str) -> Vec<&'static str> {
    tokenize(input).iter().map(|t| t.kind.tag()).collect()
}

/// Kinds of a token slice, without spans or values.
#[allow(dead_code)]
pub fn kinds(tokens: &[Token]) -> Vec<TokenKind> {
    tokens.iter().map(|t| t.kind).collect()
}

/// The original text a token was read from.
#[allow(dead_code)]
pub fn source_of<'a>(input: &'a str, token: &Token) -> &'a str {
    &input[token.span.start..token.span.end]
}

// ─── Pipeline helpers ────────────────────────────────────────────────────────

/// Compile with a fresh default pipeline, panicking on failure.
#[allow(dead_code)]
pub fn compile(input: &str) -> Compiled {
    Pipeline::new()
        .process(input)
        .unwrap_or_else(|e| panic!("expected {input:?} to compile, got {e}"))
}

/// DSL string for an input that must compile.
#[allow(dead_code)]
pub fn dsl(input: &str) -> String {
    compile(input).code.dsl
}

/// Collect diagnostic codes.
#[allow(dead_code)]
pub fn diag_codes(diags: &[Diagnostic]) -> Vec<String> {
    diags.iter().map(|d| d.id.to_string()).collect()
}

/// Find first diagnostic with the given code.
#[allow(dead_code)]
pub fn find_diag<'a>(issues: &'a [Diagnostic], code: &str) -> &'a Diagnostic {
    issues
        .iter()
        .find(|d| &*d.id == code)
        .unwrap_or_else(|| panic!("expected diagnostic {code}"))
}
