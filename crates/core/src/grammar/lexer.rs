//! Tokenizer: turns a free-form sentence into typed tokens.
//!
//! Words are split on whitespace in the original input so every token keeps
//! the byte span of the word as it was typed or transcribed. Each word is
//! normalized independently before the lexicon lookup.

use serde::{Serialize, Serializer};

use super::diag::Span;
use super::lexicon::classify;
use super::vocab::{Action, Device, Preposition, Room};

/// Canonical category of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// An action word (`enciende`, `ajusta`, ...).
    Action(Action),
    /// A device or query subject (`luz`, `volumen`, `hora`, ...).
    Device(Device),
    /// A room (`cocina`, `baño`, ...).
    Room(Room),
    /// A preposition or article.
    Preposition(Preposition),
    /// An all-digit word.
    Number,
    /// A word outside the lexicon.
    Unknown,
}

/// Coarse class of a [`TokenKind`], used for slot filling and messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenClass {
    /// Action words.
    Action,
    /// Controllable devices.
    Device,
    /// Query subjects (`BATERIA`, `HORA`).
    Query,
    /// Rooms.
    Room,
    /// Prepositions and articles.
    Preposition,
    /// Numbers.
    Number,
    /// Unrecognised words.
    Unknown,
}

impl TokenKind {
    /// Canonical tag: the vocabulary tag, `NUMERO`, or `DESCONOCIDO`.
    pub fn tag(self) -> &'static str {
        match self {
            TokenKind::Action(a) => a.as_str(),
            TokenKind::Device(d) => d.as_str(),
            TokenKind::Room(r) => r.as_str(),
            TokenKind::Preposition(p) => p.as_str(),
            TokenKind::Number => "NUMERO",
            TokenKind::Unknown => "DESCONOCIDO",
        }
    }

    /// Coarse class of this kind.
    pub fn class(self) -> TokenClass {
        match self {
            TokenKind::Action(_) => TokenClass::Action,
            TokenKind::Device(d) if d.is_query() => TokenClass::Query,
            TokenKind::Device(_) => TokenClass::Device,
            TokenKind::Room(_) => TokenClass::Room,
            TokenKind::Preposition(_) => TokenClass::Preposition,
            TokenKind::Number => TokenClass::Number,
            TokenKind::Unknown => TokenClass::Unknown,
        }
    }
}

impl Serialize for TokenKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.tag())
    }
}

impl std::fmt::Display for TokenClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TokenClass::Action => "action",
            TokenClass::Device => "device",
            TokenClass::Query => "query",
            TokenClass::Room => "room",
            TokenClass::Preposition => "preposition",
            TokenClass::Number => "number",
            TokenClass::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// Payload of a token: the normalized word, or the integer of a number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum TokenValue {
    /// Integer value of a `NUMERO` token.
    Number(u64),
    /// Normalized lexeme.
    Lexeme(String),
}

impl std::fmt::Display for TokenValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenValue::Number(n) => write!(f, "{n}"),
            TokenValue::Lexeme(s) => f.write_str(s),
        }
    }
}

/// A classified word with its position in the original input.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Token {
    /// Canonical category.
    pub kind: TokenKind,
    /// Normalized lexeme or number.
    pub value: TokenValue,
    /// Byte span of the word in the original input.
    pub span: Span,
}

impl Token {
    /// Integer value for `NUMERO` tokens.
    pub fn number(&self) -> Option<u64> {
        match self.value {
            TokenValue::Number(n) => Some(n),
            TokenValue::Lexeme(_) => None,
        }
    }

    /// Coarse class shorthand.
    pub fn class(&self) -> TokenClass {
        self.kind.class()
    }

    /// Unknown words and the articles `la`/`el`, which [`tokenize`] drops.
    pub fn is_filler(&self) -> bool {
        match self.kind {
            TokenKind::Unknown => true,
            TokenKind::Preposition(p) => p.is_article(),
            _ => false,
        }
    }

    /// `true` if this token is the given preposition.
    pub fn is(&self, prep: Preposition) -> bool {
        self.kind == TokenKind::Preposition(prep)
    }
}

// ── Normalization ───────────────────────────────────────────────────────

/// Lower-case `text` and strip the Spanish diacritics (á é í ó ú ñ).
///
/// Idempotent: `normalize(&normalize(s)) == normalize(s)`.
pub fn normalize(text: &str) -> String {
    text.chars()
        .flat_map(char::to_lowercase)
        .map(fold_diacritic)
        .collect()
}

fn fold_diacritic(c: char) -> char {
    match c {
        'á' | 'Á' => 'a',
        'é' | 'É' => 'e',
        'í' | 'Í' => 'i',
        'ó' | 'Ó' => 'o',
        'ú' | 'Ú' => 'u',
        'ñ' | 'Ñ' => 'n',
        other => other,
    }
}

// ── Tokenization ────────────────────────────────────────────────────────

/// Tokenize a sentence, dropping unknown words and the articles `la`/`el`.
///
/// Blank input yields an empty vector.
pub fn tokenize(text: &str) -> Vec<Token> {
    tokenize_all(text)
        .into_iter()
        .filter(|t| {
            if t.is_filler() {
                tracing::trace!(word = %t.value, kind = t.kind.tag(), "dropping filler word");
                return false;
            }
            true
        })
        .collect()
}

/// Tokenize a sentence keeping every word, including unknown words and articles.
pub fn tokenize_all(text: &str) -> Vec<Token> {
    word_spans(text)
        .into_iter()
        .map(|span| classify_word(&text[span.start..span.end], span))
        .collect()
}

fn classify_word(raw: &str, span: Span) -> Token {
    let word = normalize(raw);
    if let Some(kind) = classify(&word) {
        return Token {
            kind,
            value: TokenValue::Lexeme(word),
            span,
        };
    }
    if !word.is_empty() && word.bytes().all(|b| b.is_ascii_digit()) {
        // All-digit words only fail to parse on overflow.
        let n = word.parse::<u64>().unwrap_or(u64::MAX);
        return Token {
            kind: TokenKind::Number,
            value: TokenValue::Number(n),
            span,
        };
    }
    Token {
        kind: TokenKind::Unknown,
        value: TokenValue::Lexeme(word),
        span,
    }
}

/// Byte spans of the whitespace-separated words of `text`.
fn word_spans(text: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut start: Option<usize> = None;
    for (i, c) in text.char_indices() {
        match (c.is_whitespace(), start) {
            (true, Some(s)) => {
                spans.push(Span::new(s, i));
                start = None;
            }
            (false, None) => start = Some(i),
            _ => {}
        }
    }
    if let Some(s) = start {
        spans.push(Span::new(s, text.len()));
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_accents_and_case() {
        assert_eq!(normalize("Enciende la LUZ del Baño"), "enciende la luz del bano");
        assert_eq!(normalize("Calefacción"), "calefaccion");
        assert_eq!(normalize("ÁÉÍÓÚÑ"), "aeioun");
    }

    #[test]
    fn normalize_is_idempotent() {
        for s in ["Habitación", "  Dime la HORA ", "ñandú", ""] {
            let once = normalize(s);
            assert_eq!(normalize(&once), once);
        }
    }

    #[test]
    fn word_spans_point_into_original() {
        let text = "  sube  el\tvolumen ";
        let spans = word_spans(text);
        let words: Vec<&str> = spans.iter().map(|s| &text[s.start..s.end]).collect();
        assert_eq!(words, ["sube", "el", "volumen"]);
    }

    #[test]
    fn spans_survive_multibyte_words() {
        let text = "apaga la calefacción del baño";
        let toks = tokenize_all(text);
        let last = toks.last().unwrap();
        assert_eq!(&text[last.span.start..last.span.end], "baño");
        assert_eq!(last.kind, TokenKind::Room(Room::Bano));
    }

    #[test]
    fn huge_number_saturates() {
        let toks = tokenize("ajusta volumen a 99999999999999999999999");
        assert_eq!(toks[3].kind, TokenKind::Number);
        assert_eq!(toks[3].number(), Some(u64::MAX));
    }

    #[test]
    fn non_ascii_digits_are_unknown() {
        let toks = tokenize_all("²");
        assert_eq!(toks[0].kind, TokenKind::Unknown);
    }

    #[test]
    fn class_separates_queries_from_devices() {
        assert_eq!(TokenKind::Device(Device::Hora).class(), TokenClass::Query);
        assert_eq!(TokenKind::Device(Device::Luz).class(), TokenClass::Device);
    }

    #[test]
    fn token_serializes_with_tag() {
        let toks = tokenize("sube a 40");
        let json = serde_json::to_value(&toks).unwrap();
        assert_eq!(json[0]["kind"], "SUBIR");
        assert_eq!(json[0]["value"], "sube");
        assert_eq!(json[2]["kind"], "NUMERO");
        assert_eq!(json[2]["value"], 40);
    }
}
