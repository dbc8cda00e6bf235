/// The validated four-slot command.
pub mod command;
/// Re-exports from the diagnostics crate.
pub mod diag;
/// DSL generator: templates, metadata, and [`CodeGenerator`](emit::CodeGenerator).
pub mod emit;
/// Tokenizer: normalization and word classification.
pub mod lexer;
/// Word lists for every vocabulary.
pub mod lexicon;
/// Sentence-shape parser.
pub mod parser;
/// Domain tables consulted by the validator.
pub mod tables;
/// Closed vocabularies: actions, devices, rooms, prepositions.
pub mod vocab;
