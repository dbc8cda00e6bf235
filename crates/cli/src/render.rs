//! Pretty diagnostic rendering using ariadne.
//!
//! Converts [`Diagnostic`]s into ariadne [`Report`]s that underline the
//! offending word of the sentence. Falls back to structured JSON when the
//! output is piped or when the user explicitly requests it.

use std::io::{self, IsTerminal};

use ariadne::{Color, Config, Fmt, IndexType, Label, Report, ReportKind, Source};
use domotica_core::{Diagnostic, Severity, StatsSnapshot};

// ── Output format ───────────────────────────────────────────────────────

/// Output format for everything the CLI prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Format {
    /// Coloured, source-annotated output (ariadne).
    Pretty,
    /// Machine-readable JSON.
    Json,
}

impl Format {
    /// Use the explicit choice, or pick by whether stdout is a TTY.
    pub(crate) fn resolve_or_detect(explicit: Option<&str>) -> Self {
        match explicit {
            Some("json") => Format::Json,
            Some("pretty") => Format::Pretty,
            _ => {
                if io::stdout().is_terminal() {
                    Format::Pretty
                } else {
                    Format::Json
                }
            }
        }
    }
}

// ── Severity mapping ────────────────────────────────────────────────────

fn report_kind(severity: Severity) -> ReportKind<'static> {
    match severity {
        Severity::Error => ReportKind::Error,
        Severity::Info => ReportKind::Advice,
        _ => ReportKind::Warning,
    }
}

fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Error => Color::Red,
        Severity::Warn => Color::Yellow,
        Severity::Info => Color::Blue,
        _ => Color::White,
    }
}

fn context_note(diag: &Diagnostic) -> Option<String> {
    let ctx = diag.context.as_ref().filter(|c| !c.is_empty())?;
    Some(
        ctx.iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(", "),
    )
}

// ── Pretty rendering ────────────────────────────────────────────────────

/// Render diagnostics against `source` to stderr.
///
/// Spanned diagnostics get an underlined excerpt; the rest print as a
/// single `error[ID]: message` line.
pub(crate) fn render_diagnostics_pretty(source: &str, name: &str, diagnostics: &[Diagnostic]) {
    if diagnostics.is_empty() {
        return;
    }

    // Token spans are byte offsets; accented input would shift char-indexed labels.
    let config = Config::default()
        .with_compact(false)
        .with_index_type(IndexType::Byte);
    let mut cache = (name, Source::from(source));

    for diag in diagnostics {
        let Some(span) = diag.span else {
            eprintln!("{diag}");
            if let Some(note) = context_note(diag) {
                eprintln!("  = note: {note}");
            }
            if let Some(explanation) = diag.explain() {
                eprintln!("  = help: {explanation}");
            }
            continue;
        };

        // Clamp: lexical diagnostics point at offset 0 even for blank input.
        let start = span.start.min(source.len());
        let end = span.end.min(source.len()).max(start);

        let mut builder = Report::build(report_kind(diag.severity), (name, start..end))
            .with_code(diag.id.as_ref())
            .with_message(&diag.message)
            .with_config(config);

        builder = builder.with_label(
            Label::new((name, start..end))
                .with_message(context_note(diag).unwrap_or_else(|| diag.message.clone()))
                .with_color(severity_color(diag.severity)),
        );
        if let Some(explanation) = diag.explain() {
            builder = builder.with_help(explanation);
        }

        builder.finish().eprint(&mut cache).ok();
    }
}

/// Render diagnostics in the given format.
///
/// - `Pretty` → coloured output to stderr.
/// - `Json`   → nothing; callers embed diagnostics in their JSON object.
pub(crate) fn render_diagnostics(
    source: &str,
    name: &str,
    diagnostics: &[Diagnostic],
    format: Format,
) {
    if format == Format::Pretty {
        render_diagnostics_pretty(source, name, diagnostics);
    }
}

// ── Summary lines ───────────────────────────────────────────────────────

/// Print a coloured `1 error, 2 warnings` line to stderr.
pub(crate) fn print_summary(diagnostics: &[Diagnostic]) {
    let errors = diagnostics.iter().filter(|d| d.is_error()).count();
    let warnings = diagnostics.len() - errors;
    if diagnostics.is_empty() {
        return;
    }

    let mut parts = Vec::new();
    if errors > 0 {
        let s = if errors == 1 { "" } else { "s" };
        parts.push(format!("{}", format!("{errors} error{s}").fg(Color::Red)));
    }
    if warnings > 0 {
        let s = if warnings == 1 { "" } else { "s" };
        parts.push(format!(
            "{}",
            format!("{warnings} warning{s}").fg(Color::Yellow)
        ));
    }
    eprintln!("{}", parts.join(", "));
}

/// Print end-of-session pipeline statistics to stderr.
pub(crate) fn print_stats(stats: &StatsSnapshot) {
    let rate = stats
        .success_rate()
        .map(|r| format!("{r:.1}%"))
        .unwrap_or_else(|| "n/a".into());
    eprintln!(
        "{} processed={} ok={} failed={} (lexical={} syntax={} semantic={}) warnings={} unknown_words={} success={}",
        "stats:".fg(Color::Cyan),
        stats.processed,
        stats.succeeded,
        stats.failed(),
        stats.lexical_errors,
        stats.syntax_errors,
        stats.semantic_errors,
        stats.warnings,
        stats.unknown_words,
        rate,
    );
}
