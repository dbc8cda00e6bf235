//! Domotica core library.
//!
//! Compiles Spanish home-control sentences ("enciende la luz en la cocina")
//! into canonical DSL strings (`encender_luz_en_cocina`). The main entry
//! point is [`Pipeline::process`]; the individual stages are [`tokenize`],
//! [`parse`], [`validate`], and [`CodeGenerator::generate`].

#![warn(missing_docs)]

/// Seams to executors, state stores, and presenters.
pub mod dispatch;
/// Vocabulary, tokenizer, parser, domain tables, and DSL generator.
pub mod grammar;
/// The four-stage pipeline orchestrator.
pub mod pipeline;
/// Pipeline statistics.
pub mod stats;
/// Semantic validation against domain tables.
pub mod validate;

// ── Convenience re-exports ──────────────────────────────────────────────────

// Vocabulary and command
pub use grammar::command::Command;
pub use grammar::vocab::{Action, Device, Preposition, Room};

// Tokenizer
pub use grammar::lexer::{Token, TokenClass, TokenKind, TokenValue, normalize, tokenize, tokenize_all};

// Parser
pub use grammar::parser::{Parsed, SentenceShape, SyntaxError, parse};

// Validator
pub use validate::{SemanticError, Validation, Validator, validate, validate_tokens};

// Tables
pub use grammar::tables::{DomainTables, TablesError};

// Generator
pub use grammar::emit::{CodeGenerator, DSL_VERSION, GeneratedCode, Metadata, Template, render_dsl, select_template};

// Pipeline
pub use pipeline::{Checked, Compiled, Dispatched, LexicalError, Pipeline, PipelineError, Stage};
pub use stats::{PipelineStats, StatsSnapshot};

// Collaborators
pub use dispatch::{Collaborators, ExecutionReport, Executor, LastKnown, Presenter, StateStore};

// Diagnostics (re-exported from the diagnostics crate)
pub use grammar::diag::{Diagnostic, Severity, Span, codes};
