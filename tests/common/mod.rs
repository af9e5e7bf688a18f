//! Shared test helpers for integration tests
//!
//! This module provides common utilities used across all test files.

#![allow(dead_code)]

use assert_cmd::cargo;
use assert_cmd::Command;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Helper to get a vsm command isolated from any user config
pub fn vsm() -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("vsm"));
    cmd.env_remove("VSM_RULES")
        .env_remove("VSM_AVAILABLE_HOURS")
        .env_remove("RUST_LOG");
    cmd
}

/// Three-station line: push-controlled cutting with a WIP pile, a welding
/// station with defects and downtime, and a manual assembly station.
pub const LINE_YAML: &str = r#"
steps:
  - id: P1
    name: Cutting
    ct_sec: 60
    wip_units_in: 300
    push_pull: Push
    distance_m: 40
  - id: P2
    name: Welding
    process_type: Semi-auto
    ct_sec: 90
    downtime_pct: 10
    defect_pct: 6
    rework_pct: 4
    waiting_starved_pct: 15
  - id: P3
    name: Assembly
    ct_sec: 45
    push_pull: Pull
    walk_m_per_unit: 5
"#;

/// The same line as CSV
pub const LINE_CSV: &str = "\
id,name,ct_sec,downtime_pct,defect_pct,rework_pct,waiting_starved_pct,wip_units_in,push_pull,distance_m,walk_m_per_unit
P1,Cutting,60,,,,,300,Push,40,
P2,Welding,90,10,6,4,15,,,,
P3,Assembly,45,,,,,,Pull,,5
";

/// Write a file into a fresh temp directory, returning both
pub fn write_temp(name: &str, content: &str) -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join(name);
    fs::write(&path, content).unwrap();
    (tmp, path)
}

/// Write the sample line as YAML
pub fn line_file() -> (TempDir, PathBuf) {
    write_temp("line.yaml", LINE_YAML)
}
