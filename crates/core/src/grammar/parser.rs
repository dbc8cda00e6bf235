//! Sentence-shape parser.
//!
//! The first token picks one of four shapes:
//!
//! | shape              | grammar                                            |
//! |--------------------|----------------------------------------------------|
//! | query              | `VER (BATERIA \| HORA)`                            |
//! | mute toggle        | `(SILENCIAR \| ACTIVAR) ...`                       |
//! | simple action      | `(ENCENDER \| APAGAR \| SUBIR \| BAJAR) DEVICE [EN ROOM]` |
//! | value adjustment   | `AJUSTAR (VOLUMEN \| BRILLO) [A NUMERO] [EN ROOM]` |
//!
//! An action with nothing after it is an error (`DOM2002` at end of input).
//! Once the device is matched, a trailing clause that hits the end of the
//! stream (`en`, a missing `a NUMERO`) is accepted with a `DOM2101` warning:
//! transcriptions are often cut short. A clause followed by a token of the
//! wrong kind is an error. Tokens after a fully matched shape are ignored.

use serde::Serialize;

use super::diag::{Diagnostic, Span, codes, ctx};
use super::lexer::{Token, TokenClass, TokenKind};
use super::vocab::{Action, Preposition};

/// Which grammar shape a command matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SentenceShape {
    /// `VER (BATERIA|HORA)`.
    Query,
    /// `SILENCIAR ...` / `ACTIVAR ...`.
    MuteToggle,
    /// `ENCENDER|APAGAR|SUBIR|BAJAR DEVICE [EN ROOM]`.
    SimpleAction,
    /// `AJUSTAR DEVICE [A NUMERO] [EN ROOM]`.
    ValueAdjustment,
}

impl std::fmt::Display for SentenceShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SentenceShape::Query => "query",
            SentenceShape::MuteToggle => "mute toggle",
            SentenceShape::SimpleAction => "simple action",
            SentenceShape::ValueAdjustment => "value adjustment",
        };
        f.write_str(s)
    }
}

/// Successful parse: the matched shape plus any leniency warnings.
#[derive(Debug, Clone, Serialize)]
pub struct Parsed {
    /// Matched shape.
    pub shape: SentenceShape,
    /// `DOM2101` warnings for clauses cut short.
    pub warnings: Vec<Diagnostic>,
}

/// A token sequence that matches no sentence shape.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{reason}")]
pub struct SyntaxError {
    /// Diagnostic code (`DOM20xx`).
    pub code: &'static str,
    /// Human-readable reason.
    pub reason: String,
    /// Index of the token where matching failed.
    pub position: usize,
    /// Span of the offending token, or an empty span at end of input.
    pub span: Span,
}

impl SyntaxError {
    /// Convert to an error diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(self.code, self.reason.clone(), Some(self.span))
            .with_context(ctx!("position" => self.position.to_string()))
    }
}

// ── Public API ──────────────────────────────────────────────────────────

/// Check a token sequence against the grammar.
pub fn parse(tokens: &[Token]) -> Result<Parsed, SyntaxError> {
    Parser::new(tokens).parse()
}

// ── Parser Implementation ───────────────────────────────────────────────

struct Parser<'a> {
    toks: &'a [Token],
    pos: usize,
    warnings: Vec<Diagnostic>,
}

impl<'a> Parser<'a> {
    fn new(toks: &'a [Token]) -> Self {
        Self {
            toks,
            pos: 0,
            warnings: Vec::new(),
        }
    }

    // ── Token navigation ────────────────────────────────────────────────

    fn peek(&self) -> Option<&'a Token> {
        self.toks.get(self.pos)
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    /// Zero-width span just past the last token.
    fn end_span(&self) -> Span {
        Span::empty(self.toks.last().map_or(0, |t| t.span.end))
    }

    fn error(&self, code: &'static str, reason: String) -> SyntaxError {
        let span = self.peek().map_or_else(|| self.end_span(), |t| t.span);
        SyntaxError {
            code,
            reason,
            position: self.pos,
            span,
        }
    }

    /// Record a clause that ran into the end of the stream.
    fn incomplete(&mut self, after: &Token, expected: &str) {
        tracing::warn!(after = %after.value, expected, "incomplete command accepted");
        self.warnings.push(
            Diagnostic::from_code(
                codes::SYNTAX_INCOMPLETE,
                format!("command ends after '{}'; expected {expected}", after.value),
                Some(self.end_span()),
            )
            .with_context(ctx!("after" => after.value.to_string(), "expected" => expected)),
        );
    }

    // ── Main dispatch ───────────────────────────────────────────────────

    fn parse(mut self) -> Result<Parsed, SyntaxError> {
        let Some(head) = self.peek() else {
            return Err(SyntaxError {
                code: codes::SYNTAX_EMPTY_COMMAND,
                reason: "empty command".into(),
                position: 0,
                span: Span::empty(0),
            });
        };
        let TokenKind::Action(action) = head.kind else {
            return Err(self.error(
                codes::SYNTAX_UNRECOGNIZED_COMMAND,
                format!("unrecognized command: '{}' is not an action", head.value),
            ));
        };
        tracing::trace!(action = %action, "parsing command");

        let shape = match action {
            Action::Ver => self.query(head)?,
            Action::Silenciar | Action::Activar => SentenceShape::MuteToggle,
            Action::Ajustar => self.value_adjustment(head)?,
            Action::Encender | Action::Apagar | Action::Subir | Action::Bajar => {
                self.simple_action(head)?
            }
        };
        Ok(Parsed {
            shape,
            warnings: self.warnings,
        })
    }

    // ── Shapes ──────────────────────────────────────────────────────────

    fn query(&mut self, head: &Token) -> Result<SentenceShape, SyntaxError> {
        self.advance();
        match self.peek() {
            None => {
                return Err(self.error(
                    codes::SYNTAX_UNEXPECTED_TOKEN,
                    format!("expected 'bateria' or 'hora' after '{}', found end of input", head.value),
                ));
            }
            Some(t) if t.class() == TokenClass::Query => self.advance(),
            Some(t) => {
                return Err(self.error(
                    codes::SYNTAX_UNEXPECTED_TOKEN,
                    format!("expected 'bateria' or 'hora' after '{}', found '{}'", head.value, t.value),
                ));
            }
        }
        Ok(SentenceShape::Query)
    }

    fn simple_action(&mut self, head: &Token) -> Result<SentenceShape, SyntaxError> {
        self.advance();
        let device = match self.peek() {
            None => {
                return Err(self.error(
                    codes::SYNTAX_UNEXPECTED_TOKEN,
                    format!("expected a device after '{}', found end of input", head.value),
                ));
            }
            Some(t) if t.class() == TokenClass::Device => t,
            Some(t) => {
                return Err(self.error(
                    codes::SYNTAX_UNEXPECTED_TOKEN,
                    format!("expected a device after '{}', found '{}'", head.value, t.value),
                ));
            }
        };
        self.advance();
        if self.peek().is_none() {
            tracing::warn!(device = %device.value, "command has no room; applying to the whole home");
        }
        self.room_clause()?;
        Ok(SentenceShape::SimpleAction)
    }

    fn value_adjustment(&mut self, head: &Token) -> Result<SentenceShape, SyntaxError> {
        self.advance();
        let device = match self.peek() {
            None => {
                return Err(self.error(
                    codes::SYNTAX_UNEXPECTED_TOKEN,
                    format!("expected 'volumen' or 'brillo' after '{}', found end of input", head.value),
                ));
            }
            Some(t) => t,
        };
        match device.kind {
            TokenKind::Device(d) if d.is_adjustable() => self.advance(),
            TokenKind::Device(d) => {
                return Err(self.error(
                    codes::SYNTAX_NOT_ADJUSTABLE,
                    format!("'{}' ({d}) cannot be adjusted; only VOLUMEN and BRILLO have a level", device.value),
                ));
            }
            _ => {
                return Err(self.error(
                    codes::SYNTAX_UNEXPECTED_TOKEN,
                    format!("expected 'volumen' or 'brillo' after '{}', found '{}'", head.value, device.value),
                ));
            }
        }

        match self.peek() {
            None => {
                self.incomplete(device, "'a' and a value");
                return Ok(SentenceShape::ValueAdjustment);
            }
            Some(t) if t.is(Preposition::A) => {
                self.advance();
                match self.peek() {
                    Some(n) if n.kind == TokenKind::Number => self.advance(),
                    Some(n) => {
                        return Err(self.error(
                            codes::SYNTAX_EXPECTED_NUMBER,
                            format!("expected a number after 'a', found '{}'", n.value),
                        ));
                    }
                    None => {
                        return Err(self.error(
                            codes::SYNTAX_EXPECTED_NUMBER,
                            "expected a number after 'a'".into(),
                        ));
                    }
                }
            }
            Some(_) => {}
        }
        self.room_clause()?;
        Ok(SentenceShape::ValueAdjustment)
    }

    /// Optional `EN ROOM` tail.
    fn room_clause(&mut self) -> Result<(), SyntaxError> {
        let Some(en) = self.peek().filter(|t| t.is(Preposition::En)) else {
            return Ok(());
        };
        self.advance();
        match self.peek() {
            None => self.incomplete(en, "a room"),
            Some(t) if t.class() == TokenClass::Room => self.advance(),
            Some(t) => {
                return Err(self.error(
                    codes::SYNTAX_UNEXPECTED_TOKEN,
                    format!("expected a room after 'en', found '{}'", t.value),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::lexer::tokenize;

    fn shape(input: &str) -> SentenceShape {
        parse(&tokenize(input)).unwrap().shape
    }

    fn err(input: &str) -> SyntaxError {
        parse(&tokenize(input)).unwrap_err()
    }

    // ── Accepted shapes ─────────────────────────────────────────────────

    #[test]
    fn four_shapes() {
        assert_eq!(shape("ver la hora"), SentenceShape::Query);
        assert_eq!(shape("silencia"), SentenceShape::MuteToggle);
        assert_eq!(shape("enciende la luz en la cocina"), SentenceShape::SimpleAction);
        assert_eq!(shape("ajusta el volumen a 30 en la sala"), SentenceShape::ValueAdjustment);
    }

    #[test]
    fn mute_toggle_ignores_the_rest() {
        assert_eq!(shape("activa hora cocina 12"), SentenceShape::MuteToggle);
    }

    #[test]
    fn trailing_tokens_after_full_match_are_ignored() {
        let p = parse(&tokenize("apaga la luz en la sala 40")).unwrap();
        assert_eq!(p.shape, SentenceShape::SimpleAction);
        assert!(p.warnings.is_empty());
    }

    // ── Leniency ────────────────────────────────────────────────────────

    #[test]
    fn en_at_end_is_a_warning() {
        let p = parse(&tokenize("enciende la luz en")).unwrap();
        assert_eq!(p.warnings.len(), 1);
        assert_eq!(p.warnings[0].id, codes::SYNTAX_INCOMPLETE);
        assert_eq!(p.warnings[0].severity, domotica_diagnostics::Severity::Warn);
    }

    #[test]
    fn missing_room_clause_is_silent() {
        let p = parse(&tokenize("enciende la luz")).unwrap();
        assert!(p.warnings.is_empty());
    }

    #[test]
    fn adjust_without_value_warns() {
        let p = parse(&tokenize("ajusta el brillo")).unwrap();
        assert_eq!(p.shape, SentenceShape::ValueAdjustment);
        assert_eq!(p.warnings.len(), 1);
    }

    #[test]
    fn dangling_head_is_rejected_at_end() {
        for input in ["ver", "enciende", "apaga", "ajusta"] {
            let e = err(input);
            assert_eq!(e.code, codes::SYNTAX_UNEXPECTED_TOKEN, "{input}");
            assert_eq!(e.position, 1, "{input}");
            assert!(e.span.is_empty(), "{input}");
            assert_eq!(e.span.start, input.len(), "{input}");
        }
    }

    #[test]
    fn bare_mute_toggle_stays_lenient() {
        let p = parse(&tokenize("silencia")).unwrap();
        assert_eq!(p.shape, SentenceShape::MuteToggle);
        assert!(p.warnings.is_empty());
    }

    // ── Errors ──────────────────────────────────────────────────────────

    #[test]
    fn empty_tokens() {
        let e = parse(&[]).unwrap_err();
        assert_eq!(e.code, codes::SYNTAX_EMPTY_COMMAND);
        assert_eq!(e.position, 0);
    }

    #[test]
    fn must_start_with_action() {
        let e = err("luz enciende");
        assert_eq!(e.code, codes::SYNTAX_UNRECOGNIZED_COMMAND);
        assert_eq!(e.position, 0);
    }

    #[test]
    fn ver_needs_query_subject() {
        let e = err("ver la luz");
        assert_eq!(e.code, codes::SYNTAX_UNEXPECTED_TOKEN);
        assert_eq!(e.position, 1);
    }

    #[test]
    fn a_without_number() {
        let e = err("ajusta el volumen a");
        assert_eq!(e.code, codes::SYNTAX_EXPECTED_NUMBER);
        assert_eq!(e.position, 3);
        assert!(e.span.is_empty());

        let e = err("ajusta el volumen a cocina");
        assert_eq!(e.code, codes::SYNTAX_EXPECTED_NUMBER);
        assert_eq!(e.position, 3);
    }

    #[test]
    fn adjust_rejects_switchable_device() {
        let e = err("ajusta la luz a 40");
        assert_eq!(e.code, codes::SYNTAX_NOT_ADJUSTABLE);
        assert!(e.reason.contains("LUZ"));
    }

    #[test]
    fn en_followed_by_non_room() {
        let text = "apaga la tele en 5";
        let e = parse(&tokenize(text)).unwrap_err();
        assert_eq!(e.code, codes::SYNTAX_UNEXPECTED_TOKEN);
        assert_eq!(&text[e.span.start..e.span.end], "5");
    }

    #[test]
    fn error_converts_to_diagnostic() {
        let d = err("ver cocina").to_diagnostic();
        assert!(d.is_error());
        assert_eq!(d.context.unwrap()["position"], "1");
    }
}
