//! Re-running the current test binary as a child process.
//!
//! The harness reads its settings from the real process environment and
//! tears the shared container down when the process exits. Both are only
//! observable from outside, so these tests start a second copy of their own
//! binary with a chosen environment and read what it reports on stdout.

#![allow(dead_code)]

use std::process::{Command, Output};

/// Set in the child so its half of the test does the work.
pub const CHILD_VAR: &str = "INVENTORY_TESTING_CHILD";

/// `true` inside a child started by [`run_child`].
pub fn is_child() -> bool {
    std::env::var_os(CHILD_VAR).is_some()
}

/// Run the ignored test `name` from this binary in a child process.
pub fn run_child(name: &str, envs: &[(&str, &str)]) -> Output {
    let binary = std::env::current_exe().expect("test binary path");
    let mut command = Command::new(binary);
    command
        .args([name, "--exact", "--ignored", "--nocapture", "--test-threads=1"])
        .env(CHILD_VAR, "1");
    for (key, value) in envs {
        command.env(key, value);
    }
    let output = command.output().expect("child test process runs");
    assert!(
        output.status.success(),
        "child test {name} failed:\n{}\n{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    output
}

/// Value the child printed as `{marker}{value}`, up to the next whitespace.
pub fn reported(output: &Output, marker: &str) -> Option<String> {
    let stdout = String::from_utf8_lossy(&output.stdout);
    stdout.lines().find_map(|line| {
        let start = line.find(marker)? + marker.len();
        line[start..].split_whitespace().next().map(str::to_string)
    })
}
