//! The four-stage compiler: tokenize, parse, validate, generate.
//!
//! Each stage either succeeds or aborts the whole command. A [`Pipeline`] is
//! an ordinary value; build one per set of domain tables and share it across
//! threads.

use serde::Serialize;

use crate::dispatch::{Collaborators, ExecutionReport};
use crate::grammar::command::Command;
use crate::grammar::diag::{Diagnostic, Span, codes};
use crate::grammar::emit::{CodeGenerator, GeneratedCode};
use crate::grammar::lexer::{Token, TokenKind, tokenize_all};
use crate::grammar::parser::{SentenceShape, SyntaxError, parse};
use crate::grammar::tables::DomainTables;
use crate::stats::PipelineStats;
use crate::validate::{SemanticError, Validator};

/// Pipeline stage that rejected a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Tokenizer.
    Lexical,
    /// Parser.
    Syntax,
    /// Validator.
    Semantic,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Lexical => f.write_str("lexical"),
            Stage::Syntax => f.write_str("syntax"),
            Stage::Semantic => f.write_str("semantic"),
        }
    }
}

/// Input the tokenizer could not turn into anything.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum LexicalError {
    /// Blank input, or only unknown words and articles.
    #[error("no tokens")]
    Empty,
}

/// Why a command was rejected. `Display` is `"<stage>: <reason>"`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PipelineError {
    /// Rejected by the tokenizer.
    #[error("lexical: {0}")]
    Lexical(#[from] LexicalError),
    /// Rejected by the parser.
    #[error("syntax: {0}")]
    Syntax(#[from] SyntaxError),
    /// Rejected by the validator.
    #[error("semantic: {0}")]
    Semantic(#[from] SemanticError),
}

impl PipelineError {
    /// Stage that failed.
    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::Lexical(_) => Stage::Lexical,
            PipelineError::Syntax(_) => Stage::Syntax,
            PipelineError::Semantic(_) => Stage::Semantic,
        }
    }

    /// Convert to an error diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            PipelineError::Lexical(e) => Diagnostic::from_code(
                codes::LEXICAL_EMPTY,
                e.to_string(),
                Some(Span::empty(0)),
            ),
            PipelineError::Syntax(e) => e.to_diagnostic(),
            PipelineError::Semantic(e) => e.to_diagnostic(),
        }
    }
}

/// A command that passed every stage up to validation.
#[derive(Debug, Clone, Serialize)]
pub struct Checked {
    /// Tokens after filtering.
    pub tokens: Vec<Token>,
    /// Sentence shape the parser matched.
    pub shape: SentenceShape,
    /// The validated command.
    pub command: Command,
    /// Warnings from the parser and validator, in stage order.
    pub warnings: Vec<Diagnostic>,
}

/// A successfully compiled command.
#[derive(Debug, Clone, Serialize)]
pub struct Compiled {
    /// Tokens after filtering.
    pub tokens: Vec<Token>,
    /// Sentence shape the parser matched.
    pub shape: SentenceShape,
    /// Generated DSL, metadata, and command.
    pub code: GeneratedCode,
    /// Warnings from the parser and validator, in stage order.
    pub warnings: Vec<Diagnostic>,
}

/// A compiled command plus what the executor made of it.
#[derive(Debug, Clone, Serialize)]
pub struct Dispatched {
    /// The compiled command.
    pub compiled: Compiled,
    /// Executor report.
    pub execution: ExecutionReport,
}

/// The command compiler.
#[derive(Debug, Default)]
pub struct Pipeline {
    tables: DomainTables,
    generator: CodeGenerator,
    stats: PipelineStats,
}

impl Pipeline {
    /// Pipeline over the built-in domain tables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pipeline over custom domain tables.
    pub fn with_tables(tables: DomainTables) -> Self {
        Self {
            tables,
            ..Self::default()
        }
    }

    /// Builder: replace the code generator.
    pub fn with_generator(mut self, generator: CodeGenerator) -> Self {
        self.generator = generator;
        self
    }

    /// Domain tables in use.
    pub fn tables(&self) -> &DomainTables {
        &self.tables
    }

    /// Counters accumulated by every call so far.
    pub fn stats(&self) -> &PipelineStats {
        &self.stats
    }

    /// Compile one sentence.
    pub fn process(&self, raw: &str) -> Result<Compiled, PipelineError> {
        let result = self.run_checks(raw).map(|checked| {
            let code = self.generator.generate(&checked.command);
            Compiled {
                tokens: checked.tokens,
                shape: checked.shape,
                code,
                warnings: checked.warnings,
            }
        });
        match &result {
            Ok(c) => {
                self.stats.record_success(c.warnings.len());
                tracing::info!(dsl = %c.code.dsl, warnings = c.warnings.len(), "command compiled");
            }
            Err(e) => self.record_rejection(e),
        }
        result
    }

    /// Run tokenize, parse, and validate without generating code.
    pub fn check(&self, raw: &str) -> Result<Checked, PipelineError> {
        let result = self.run_checks(raw);
        match &result {
            Ok(c) => {
                self.stats.record_success(c.warnings.len());
                tracing::info!(command = %c.command, warnings = c.warnings.len(), "command checked");
            }
            Err(e) => self.record_rejection(e),
        }
        result
    }

    fn record_rejection(&self, err: &PipelineError) {
        self.stats.record_failure(err.stage());
        tracing::info!(stage = %err.stage(), error = %err, "command rejected");
    }

    fn run_checks(&self, raw: &str) -> Result<Checked, PipelineError> {
        let all = tokenize_all(raw);
        let unknown = all.iter().filter(|t| t.kind == TokenKind::Unknown).count();
        self.stats.record_received(unknown);
        let tokens: Vec<Token> = all.into_iter().filter(|t| !t.is_filler()).collect();
        tracing::debug!(count = tokens.len(), unknown, "lexical stage done");
        if tokens.is_empty() {
            return Err(LexicalError::Empty.into());
        }

        let parsed = parse(&tokens)?;
        tracing::debug!(shape = %parsed.shape, "syntax stage done");

        let validation = Validator::new(&self.tables).validate_tokens(&tokens)?;
        tracing::debug!(command = %validation.command, "semantic stage done");

        let mut warnings = parsed.warnings;
        warnings.extend(validation.warnings);
        Ok(Checked {
            tokens,
            shape: parsed.shape,
            command: validation.command,
            warnings,
        })
    }

    /// Compile one sentence and forward the result to the collaborators.
    ///
    /// The executor always runs; the state store is updated only when the
    /// executor reports success. The presenter, if any, is shown the device
    /// last.
    pub fn dispatch(
        &self,
        raw: &str,
        collaborators: &Collaborators<'_>,
    ) -> Result<Dispatched, PipelineError> {
        let compiled = self.process(raw)?;
        let command = compiled.code.command;
        let execution = collaborators.executor.execute(&command);
        tracing::debug!(success = execution.success, message = %execution.message, "executed");
        if execution.success {
            collaborators
                .state
                .update(command.device, command.room, command.action, command.value);
        }
        if let Some(presenter) = collaborators.presenter {
            presenter.show(command.device);
        }
        Ok(Dispatched {
            compiled,
            execution,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Pipeline>();
    }

    #[test]
    fn error_display_has_stage_prefix() {
        let p = Pipeline::new();
        assert_eq!(p.process("").unwrap_err().to_string(), "lexical: no tokens");
        assert!(p.process("luz").unwrap_err().to_string().starts_with("syntax: "));
        assert!(
            p.process("apaga el brillo")
                .unwrap_err()
                .to_string()
                .starts_with("semantic: ")
        );
    }

    #[test]
    fn lexical_diagnostic() {
        let d = Pipeline::new().process("hola mundo").unwrap_err().to_diagnostic();
        assert_eq!(d.id, codes::LEXICAL_EMPTY);
    }

    #[test]
    fn stats_follow_outcomes() {
        let p = Pipeline::new();
        let _ = p.process("enciende la luz en");
        let _ = p.process("xyz");
        let _ = p.process("ajusta el volumen a 900");
        let s = p.stats().snapshot();
        assert_eq!(s.processed, 3);
        assert_eq!(s.succeeded, 1);
        assert_eq!(s.warnings, 1);
        assert_eq!(s.lexical_errors, 1);
        assert_eq!(s.semantic_errors, 1);
        assert_eq!(s.unknown_words, 1);
    }
}
