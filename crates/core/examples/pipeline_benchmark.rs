//! Per-stage timing harness for local baselines.
//!
//! Run from repository root:
//! `cargo run -p domotica_core --example pipeline_benchmark --release`

use std::time::{Duration, Instant};

use domotica_core::{CodeGenerator, DomainTables, parse, tokenize, validate};

const SENTENCES: &[(&str, &str)] = &[
    ("switch_with_room", "enciende la luz en la cocina"),
    ("adjust_with_room", "poner el brillo a 80 en el baño"),
    ("query", "dime la hora"),
    ("noisy", "por favor ahora mismo sube un poco el volumen de la sala gracias"),
];

fn time(iterations: usize, mut f: impl FnMut()) -> Duration {
    let start = Instant::now();
    for _ in 0..iterations {
        f();
    }
    start.elapsed()
}

fn report(stage: &str, elapsed: Duration, iterations: usize) {
    println!(
        "  {stage:<9} total={elapsed:?}, per_iter={:.3} us",
        elapsed.as_secs_f64() * 1_000_000.0 / iterations as f64
    );
}

fn run_benchmark(label: &str, input: &str, tables: &DomainTables, iterations: usize) {
    let generator = CodeGenerator::new();
    let tokens = tokenize(input);
    let command = match validate(&tokens, tables) {
        Ok(c) => c,
        Err(e) => {
            println!("Benchmark: {label} skipped ({e})");
            return;
        }
    };

    println!("Benchmark: {label}");
    println!("  input_bytes: {}", input.len());
    report("tokenize", time(iterations, || drop(tokenize(input))), iterations);
    report("parse", time(iterations, || drop(parse(&tokens))), iterations);
    report(
        "validate",
        time(iterations, || drop(validate(&tokens, tables))),
        iterations,
    );
    report(
        "generate",
        time(iterations, || drop(generator.generate(&command))),
        iterations,
    );
}

fn main() {
    let tables = DomainTables::default();
    let iterations = std::env::var("DOMO_BENCH_ITERS")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(10_000);

    for (label, input) in SENTENCES {
        run_benchmark(label, input, &tables, iterations);
    }
}
