mod render;

use std::fs;
use std::io::{self, BufRead, Read};
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use domotica_core::{
    Device, Diagnostic, DomainTables, Pipeline, Room, StateStore, TokenKind, normalize, tokenize,
    tokenize_all,
};
use domotica_diagnostics as diag;
use domotica_home::{Home, HomeConfig, StateManager, load_config};
use tracing_subscriber::EnvFilter;

use crate::render::{Format, print_stats, print_summary, render_diagnostics};

// ── CLI definition ──────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "domo",
    version,
    about = "Compile Spanish home-control sentences into device commands"
)]
struct Cli {
    /// Output mode: "pretty" for coloured terminal output, "json" for
    /// machine-readable JSON. Defaults to "pretty" when stdout is a TTY,
    /// "json" otherwise.
    #[arg(long, global = true, value_parser = ["pretty", "json"])]
    output: Option<String>,

    /// Domain tables JSON replacing the built-in device, room,
    /// compatibility, and range tables.
    #[arg(long, global = true, env = "DOMO_TABLES")]
    tables: Option<PathBuf>,

    /// Log more (-v info, -vv debug, -vvv trace). `RUST_LOG` wins when set.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    // ── Single-sentence commands (progressive: tokenize → check → compile) ──
    /// Print the tokens of a sentence.
    Tokenize {
        /// Sentence words, or `-` to read stdin.
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
        /// Keep unknown words and articles.
        #[arg(long)]
        all: bool,
    },

    /// Parse and validate a sentence without generating code.
    Check {
        /// Sentence words, or `-` to read stdin.
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Compile a sentence to its DSL string.
    Compile {
        /// Sentence words, or `-` to read stdin.
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    // ── Simulated home ──────────────────────────────────────────────
    /// Read one sentence per line from stdin and run it against the
    /// simulated home. `salir` or end of input stops.
    Run {
        /// Home config JSON.
        #[arg(long)]
        config: Option<PathBuf>,
        /// State snapshot file (overrides the config's `state_file`).
        #[arg(long)]
        state: Option<PathBuf>,
    },

    /// Show recorded device state.
    State {
        /// Device word (`luz`, `tele`, `volumen`, ...). All devices when omitted.
        device: Option<String>,
        /// Room word (`cocina`, `salón`, ...).
        #[arg(long, requires = "device")]
        room: Option<String>,
        /// Home config JSON.
        #[arg(long)]
        config: Option<PathBuf>,
        /// State snapshot file (overrides the config's `state_file`).
        #[arg(long)]
        state: Option<PathBuf>,
    },

    // ── Reference ───────────────────────────────────────────────────
    /// Explain a diagnostic ID (e.g. DOM3004).
    Explain { id: String },
}

// ── Main ────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let format = Format::resolve_or_detect(cli.output.as_deref());
    let tables = cli.tables.as_deref();

    match cli.cmd {
        Cmd::Tokenize { text, all } => cmd_tokenize(&text, all, format)?,
        Cmd::Check { text } => cmd_check(&text, tables, format)?,
        Cmd::Compile { text } => cmd_compile(&text, tables, format)?,
        Cmd::Run { config, state } => {
            let home = resolve_home_config(config.as_deref(), state)?;
            cmd_run(&home, tables, format)?;
        }
        Cmd::State {
            device,
            room,
            config,
            state,
        } => {
            let home = resolve_home_config(config.as_deref(), state)?;
            cmd_state(&home, device.as_deref(), room.as_deref(), format)?;
        }
        Cmd::Explain { id } => cmd_explain(&id, format)?,
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

// ── Commands ────────────────────────────────────────────────────────────

fn cmd_tokenize(text: &[String], all: bool, format: Format) -> Result<()> {
    let input = read_sentence(text)?;
    let tokens = if all {
        tokenize_all(&input)
    } else {
        tokenize(&input)
    };

    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&tokens)?),
        Format::Pretty => {
            for t in &tokens {
                println!(
                    "{:<12} {:<14} {}..{}",
                    t.kind.tag(),
                    t.value,
                    t.span.start,
                    t.span.end
                );
            }
        }
    }
    Ok(())
}

fn cmd_check(text: &[String], tables_path: Option<&Path>, format: Format) -> Result<()> {
    let input = read_sentence(text)?;
    let pipeline = Pipeline::with_tables(resolve_tables(tables_path)?);
    let (diagnostics, command) = match pipeline.check(&input) {
        Ok(checked) => (checked.warnings, Some(checked.command)),
        Err(e) => (vec![e.to_diagnostic()], None),
    };

    match format {
        Format::Json => {
            let out = serde_json::json!({
                "ok": command.is_some(),
                "command": command,
                "diagnostics": diagnostics,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Format::Pretty => {
            render_diagnostics(&input, "<input>", &diagnostics, format);
            print_summary(&diagnostics);
            if let Some(c) = command {
                eprintln!("ok: {c}");
            }
        }
    }

    exit_on_errors(&diagnostics);
    Ok(())
}

fn cmd_compile(text: &[String], tables_path: Option<&Path>, format: Format) -> Result<()> {
    let input = read_sentence(text)?;
    let pipeline = Pipeline::with_tables(resolve_tables(tables_path)?);

    match pipeline.process(&input) {
        Ok(compiled) => match format {
            Format::Json => println!("{}", serde_json::to_string_pretty(&compiled.code)?),
            Format::Pretty => {
                render_diagnostics(&input, "<input>", &compiled.warnings, format);
                println!("{}", compiled.code.dsl);
            }
        },
        Err(e) => {
            let diagnostics = [e.to_diagnostic()];
            match format {
                Format::Json => {
                    let out = serde_json::json!({
                        "ok": false,
                        "stage": e.stage(),
                        "error": e.to_string(),
                        "diagnostics": diagnostics,
                    });
                    println!("{}", serde_json::to_string_pretty(&out)?);
                }
                Format::Pretty => render_diagnostics(&input, "<input>", &diagnostics, format),
            }
            process::exit(1);
        }
    }
    Ok(())
}

fn cmd_run(config: &HomeConfig, tables_path: Option<&Path>, format: Format) -> Result<()> {
    let pipeline = Pipeline::with_tables(resolve_tables(tables_path)?);
    let home = Home::new(config);
    let collaborators = home.collaborators();

    for line in io::stdin().lock().lines() {
        let line = line.context("failed to read stdin")?;
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if normalize(input) == "salir" {
            break;
        }

        match pipeline.dispatch(input, &collaborators) {
            Ok(out) => match format {
                Format::Json => {
                    let entry = serde_json::json!({
                        "input": input,
                        "ok": true,
                        "dsl": out.compiled.code.dsl,
                        "execution": out.execution,
                        "diagnostics": out.compiled.warnings,
                    });
                    println!("{}", serde_json::to_string(&entry)?);
                }
                Format::Pretty => {
                    render_diagnostics(input, "<input>", &out.compiled.warnings, format);
                    let mark = if out.execution.success { "ok" } else { "failed" };
                    println!(
                        "{} [{mark}] {}",
                        out.compiled.code.dsl, out.execution.message
                    );
                }
            },
            Err(e) => match format {
                Format::Json => {
                    let entry = serde_json::json!({
                        "input": input,
                        "ok": false,
                        "stage": e.stage(),
                        "error": e.to_string(),
                        "diagnostics": [e.to_diagnostic()],
                    });
                    println!("{}", serde_json::to_string(&entry)?);
                }
                Format::Pretty => {
                    render_diagnostics(input, "<input>", &[e.to_diagnostic()], format);
                }
            },
        }
    }

    let stats = pipeline.stats().snapshot();
    tracing::info!(processed = stats.processed, failed = stats.failed(), "session finished");
    match format {
        Format::Json => println!("{}", serde_json::to_string(&serde_json::json!({ "stats": stats }))?),
        Format::Pretty => print_stats(&stats),
    }
    if stats.failed() > 0 {
        process::exit(1);
    }
    Ok(())
}

fn cmd_state(
    config: &HomeConfig,
    device: Option<&str>,
    room: Option<&str>,
    format: Format,
) -> Result<()> {
    let state = StateManager::from_config(config);

    let Some(word) = device else {
        let snapshot = state.snapshot();
        match format {
            Format::Json => println!("{}", serde_json::to_string_pretty(&snapshot)?),
            Format::Pretty => {
                for (device, record) in &snapshot.devices {
                    let level = record.level.map(|l| format!(" level={l}")).unwrap_or_default();
                    println!("{:<12} {}{level}", device.as_str(), record.status);
                }
                println!("history: {} entries", snapshot.history.len());
            }
        }
        return Ok(());
    };

    let device = resolve_device(word)?;
    let room = room.map(resolve_room).transpose()?;
    match state.query(device, room) {
        Some(last) => match format {
            Format::Json => println!("{}", serde_json::to_string_pretty(&last)?),
            Format::Pretty => {
                let place = room.map(|r| format!(" en {}", r.label())).unwrap_or_default();
                println!("{}{place}: {}", device.dsl_name(), last.status);
                if let Some(on) = last.on {
                    println!("  on: {on}");
                }
                if let Some(level) = last.level {
                    println!("  level: {level}");
                }
                if let Some(ts) = last.timestamp {
                    println!("  updated: {}", ts.to_rfc3339());
                }
            }
        },
        None => match format {
            Format::Json => {
                let out = serde_json::json!({
                    "device": device,
                    "room": room,
                    "status": "no_configurado",
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            }
            Format::Pretty => println!("{}: no_configurado", device.dsl_name()),
        },
    }
    Ok(())
}

fn cmd_explain(id: &str, format: Format) -> Result<()> {
    match format {
        Format::Json => {
            let out = serde_json::json!({
                "id": id,
                "stage": diag::stage_of(id),
                "explanation": diag::explain(id),
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Format::Pretty => {
            if let Some(text) = diag::explain(id) {
                use ariadne::Fmt;
                println!("{}: {}", id.fg(ariadne::Color::Cyan), text);
            } else {
                println!("{id}: (no explanation available)");
            }
        }
    }
    Ok(())
}

// ── Helpers ─────────────────────────────────────────────────────────────

/// Exit with code 1 if any diagnostic is an error.
/// Warnings do not cause a non-zero exit.
fn exit_on_errors(diagnostics: &[Diagnostic]) {
    if diagnostics.iter().any(Diagnostic::is_error) {
        process::exit(1);
    }
}

/// The sentence given on the command line, or stdin for `-`.
fn read_sentence(words: &[String]) -> Result<String> {
    if let [only] = words
        && only == "-"
    {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        return Ok(buf.trim_end().to_string());
    }
    Ok(words.join(" "))
}

/// Built-in tables, or the `--tables` file when given.
fn resolve_tables(path: Option<&Path>) -> Result<DomainTables> {
    let Some(path) = path else {
        return Ok(DomainTables::default());
    };
    tracing::debug!(path = %path.display(), "loading domain tables");
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read tables file '{}'", path.display()))?;
    DomainTables::from_json(&json)
        .with_context(|| format!("invalid tables file '{}'", path.display()))
}

fn resolve_home_config(path: Option<&Path>, state: Option<PathBuf>) -> Result<HomeConfig> {
    let mut config = match path {
        Some(p) => load_config(p).context("failed to load home config")?,
        None => HomeConfig::default(),
    };
    if let Some(state) = state {
        config.state_file = state;
    }
    tracing::debug!(state_file = %config.state_file.display(), "home config resolved");
    Ok(config)
}

fn resolve_device(word: &str) -> Result<Device> {
    match tokenize_all(word).first().map(|t| t.kind) {
        Some(TokenKind::Device(d)) => Ok(d),
        _ => bail!("unknown device: {word}"),
    }
}

fn resolve_room(word: &str) -> Result<Room> {
    match tokenize_all(word).first().map(|t| t.kind) {
        Some(TokenKind::Room(r)) => Ok(r),
        _ => bail!("unknown room: {word}"),
    }
}
