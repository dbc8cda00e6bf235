//! CLI tests for `domo compile` and `domo tokenize`.

mod common;

use common::{domo, run_with_stdin, stdout_json};

#[test]
fn compile_json_returns_generated_code() {
    let output = domo()
        .args(["--output", "json", "compile", "enciende la luz en la cocina"])
        .output()
        .expect("run compile");

    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["dsl"], "encender_luz_en_cocina");
    assert_eq!(json["metadata"]["dsl_version"], "1.0");
    assert_eq!(json["metadata"]["command_id"].as_str().map(str::len), Some(8));
    assert_eq!(json["command"]["action"], "ENCENDER");
    assert_eq!(json["command"]["room"], "COCINA");
}

#[test]
fn compile_pretty_prints_only_the_dsl() {
    let output = domo()
        .args(["--output", "pretty", "compile", "ajusta", "el", "volumen", "a", "40"])
        .output()
        .expect("run compile");

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "ajustar_volumen_40");
}

#[test]
fn compile_out_of_range_exits_1_with_envelope() {
    let output = domo()
        .args(["--output", "json", "compile", "ajusta el brillo a 150"])
        .output()
        .expect("run compile");

    assert_eq!(output.status.code(), Some(1));
    let json = stdout_json(&output);
    assert_eq!(json["ok"], false);
    assert_eq!(json["stage"], "semantic");
    assert_eq!(json["diagnostics"][0]["id"], "DOM3006");
    assert!(
        json["error"]
            .as_str()
            .is_some_and(|e| e.contains("valid range: 0-100"))
    );
}

#[test]
fn compile_reads_stdin_dash() {
    let output = run_with_stdin(&["--output", "json", "compile", "-"], "dime la hora\n");
    assert!(output.status.success());
    assert_eq!(stdout_json(&output)["dsl"], "ver_hora");
}

#[test]
fn compile_with_custom_tables() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tables.json");
    std::fs::write(
        &path,
        r#"{
            "formatVersion": "1.0",
            "devices": ["VOLUMEN"],
            "rooms": ["COCINA"],
            "compatibility": [{"action": "AJUSTAR", "devices": ["VOLUMEN"]}],
            "ranges": [{"device": "VOLUMEN", "min": 0, "max": 30}]
        }"#,
    )
    .unwrap();
    let tables = path.to_str().unwrap();

    let ok = domo()
        .args(["--output", "json", "--tables", tables, "compile", "ajusta el volumen a 30"])
        .output()
        .expect("run compile");
    assert!(ok.status.success());

    let too_high = domo()
        .args(["--output", "json", "--tables", tables, "compile", "ajusta el volumen a 40"])
        .output()
        .expect("run compile");
    assert_eq!(too_high.status.code(), Some(1));
    assert_eq!(stdout_json(&too_high)["diagnostics"][0]["id"], "DOM3006");
}

#[test]
fn bad_tables_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tables.json");
    std::fs::write(&path, r#"{"formatVersion": "9.0", "devices": [], "rooms": [], "compatibility": []}"#)
        .unwrap();
    let output = domo()
        .args(["--tables", path.to_str().unwrap(), "compile", "enciende la luz"])
        .output()
        .expect("run compile");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid tables file"));
}

#[test]
fn tokenize_json_lists_kinds_and_spans() {
    let output = domo()
        .args(["--output", "json", "tokenize", "sube el volumen"])
        .output()
        .expect("run tokenize");

    assert!(output.status.success());
    let json = stdout_json(&output);
    let kinds: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|t| t["kind"].as_str())
        .collect();
    assert_eq!(kinds, ["SUBIR", "VOLUMEN"]);
    assert_eq!(json[1]["span"]["start"], 8);
}

#[test]
fn tokenize_all_keeps_articles_and_unknown_words() {
    let output = domo()
        .args(["--output", "json", "tokenize", "--all", "por favor sube el volumen"])
        .output()
        .expect("run tokenize");

    let json = stdout_json(&output);
    let kinds: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|t| t["kind"].as_str())
        .collect();
    assert_eq!(kinds, ["DESCONOCIDO", "DESCONOCIDO", "SUBIR", "EL", "VOLUMEN"]);
}
