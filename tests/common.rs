#![allow(dead_code)]
use assert_cmd::{cargo_bin_cmd, Command};
use std::path::{Path, PathBuf};

/// `daybook` bound to a calendar and config file inside `dir`.
pub fn daybook(dir: &Path) -> Command {
    let mut cmd = cargo_bin_cmd!("daybook");
    cmd.arg("--data")
        .arg(data_file(dir))
        .arg("--config")
        .arg(dir.join("config.yml"))
        .env_remove("DAYBOOK_LOG");
    cmd
}

pub fn data_file(dir: &Path) -> PathBuf {
    dir.join("calendar.yml")
}

/// Runs `daybook` with `args` and returns the block id from "Added block <id> on ...".
pub fn add_block(dir: &Path, args: &[&str]) -> String {
    let output = daybook(dir)
        .args(["block", "add"])
        .args(args)
        .output()
        .expect("run daybook");
    assert!(output.status.success(), "block add failed: {:?}", output);
    let stdout = String::from_utf8_lossy(&output.stdout);
    stdout
        .split_whitespace()
        .nth(2)
        .expect("block id in output")
        .to_string()
}
