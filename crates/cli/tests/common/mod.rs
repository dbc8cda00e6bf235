#![allow(unreachable_pub)]

use std::io::Write;
use std::process::{Command, Output, Stdio};

use assert_cmd::cargo;

pub fn domo() -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("domo"));
    cmd.env_remove("RUST_LOG").env_remove("DOMO_TABLES");
    cmd
}

#[allow(dead_code)]
pub fn run_with_stdin(args: &[&str], stdin_body: &str) -> Output {
    let mut child = domo()
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn domo command");

    {
        let stdin = child.stdin.as_mut().expect("stdin handle");
        stdin
            .write_all(stdin_body.as_bytes())
            .expect("write stdin body");
    }

    child.wait_with_output().expect("wait for output")
}

#[allow(dead_code)]
pub fn stdout_json(output: &Output) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(&stdout).unwrap_or_else(|e| panic!("invalid json ({e}): {stdout}"))
}
