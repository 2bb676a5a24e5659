//! Embeds a human-readable version string as `BUILD_INFO_HUMAN`.
//!
//! The string is `<crate version> (<git version>) <rustc version>`, where the
//! git version is `git describe --tags --always --dirty` when a tag is
//! reachable and otherwise a pseudo-version
//! `v<crate version>-<YYYYMMDDHHMMSS>-<12 char sha>[+dirty]`. Clean trees use
//! the commit time, dirty trees and trees without git use the build time.

use std::process::Command;

use chrono::Utc;

const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

fn main() {
    for path in ["src", "build.rs", "Cargo.toml", "Cargo.lock"] {
        println!("cargo:rerun-if-changed={path}");
    }

    println!("cargo:rustc-env=BUILD_INFO_HUMAN={}", build_info());
}

fn run(program: &str, args: &[&str]) -> Option<String> {
    Command::new(program)
        .args(args)
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// `None` outside a git checkout. `.cargo-ok` is written by
/// `cargo install --git` and does not count as a local change.
fn tree_is_dirty() -> Option<bool> {
    run("git", &["status", "--porcelain"]).map(|status| {
        status
            .lines()
            .any(|line| line.get(3..).is_some_and(|path| path != ".cargo-ok"))
    })
}

fn pseudo_version() -> String {
    let sha = run("git", &["rev-parse", "--short=12", "HEAD"]).unwrap_or_else(|| "unknown".into());
    let dirty = tree_is_dirty();

    let commit_time = match dirty {
        Some(false) => run("git", &["log", "-1", "--format=%ct"])
            .and_then(|s| s.parse::<i64>().ok())
            .and_then(|secs| chrono::DateTime::from_timestamp(secs, 0)),
        _ => None,
    };
    let timestamp = commit_time
        .map(|dt| dt.format(TIMESTAMP_FORMAT).to_string())
        .unwrap_or_else(|| Utc::now().format(TIMESTAMP_FORMAT).to_string());

    let suffix = if dirty == Some(true) { "+dirty" } else { "" };
    let version = env!("CARGO_PKG_VERSION");

    format!("v{version}-{timestamp}-{sha}{suffix}")
}

fn git_version() -> String {
    match run("git", &["describe", "--tags", "--always", "--dirty"]) {
        // A bare hash means no tag is reachable.
        Some(desc) if desc.contains('v') || desc.contains("-g") => desc,
        _ => pseudo_version(),
    }
}

fn build_info() -> String {
    [
        Some(env!("CARGO_PKG_VERSION").to_string()),
        Some(format!("({})", git_version())),
        run("rustc", &["--version"]),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(" ")
}
