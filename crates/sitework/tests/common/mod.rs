//! Common test utilities shared across integration tests.

use std::path::Path;
use std::process::{Command, Output};

/// A small site: slab done, framing waits on slab, roofing waits on
/// framing, fixtures may start early.
pub const SITE_SNAPSHOT: &str = r#"[
  {"id": 1, "title": "Pour slab", "status": "completed", "dependencies": []},
  {"id": 2, "title": "Frame walls", "status": "not-started", "dependencies": [1]},
  {"id": 3, "title": "Roof trusses", "status": "not-started", "dependencies": [2]},
  {"id": 4, "title": "Order fixtures", "status": "not-started", "dependencies": [3],
   "canStartWithoutDependency": true}
]"#;

/// Write `tasks.json` into `dir`.
pub fn write_snapshot(dir: &Path, json: &str) {
    std::fs::write(dir.join("tasks.json"), json).expect("Failed to write snapshot");
}

/// Run the sitework binary in the specified directory with plain output
pub fn run_sitework_in_dir(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_sitework"))
        .args(args)
        .current_dir(dir)
        .env("NO_COLOR", "1")
        .env("SITEWORK_ASCII", "1")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute sitework binary")
}

/// Parse stdout of a successful `--json` invocation
pub fn json_output(output: &Output) -> serde_json::Value {
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout is not JSON")
}
