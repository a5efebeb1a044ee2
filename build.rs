//! Passes through the build target and rustc/git information so that the
//! `version` subcommand can report it.

use std::env;
use std::process::Command;

use anyhow::{anyhow, Context, Result};

fn main() {
    println!(
        "cargo:rustc-env=TARGET={}",
        env::var("TARGET").expect("TARGET is always set for build scripts")
    );
    if let Err(err) = rustc_version() {
        panic!("failed to fetch rustc version information: {err:#}");
    }
    // Git information is optional, e.g. when building from a crates.io
    // tarball there is no repository at all.
    git_info().ok();
}

/// Emits `RUSTC_VERSION_*` environment variables from `rustc -vV`.
fn rustc_version() -> Result<()> {
    let rustc = env::var_os("RUSTC").unwrap_or_else(|| "rustc".into());
    let output = Command::new(rustc)
        .arg("-vV")
        .output()
        .context("failed to run `rustc -vV`")?;
    let text = String::from_utf8(output.stdout).context("rustc output is not UTF-8")?;

    let summary = text
        .lines()
        .next()
        .ok_or_else(|| anyhow!("empty rustc output"))?;
    println!("cargo:rustc-env=RUSTC_VERSION_SUMMARY={summary}");

    for (field, var) in [
        ("binary", "RUSTC_VERSION_BINARY"),
        ("release", "RUSTC_VERSION_RELEASE"),
        ("commit-hash", "RUSTC_VERSION_COMMIT_HASH"),
        ("commit-date", "RUSTC_VERSION_COMMIT_DATE"),
        ("host", "RUSTC_VERSION_HOST"),
    ] {
        let prefix = format!("{field}: ");
        let value = text
            .lines()
            .find_map(|line| line.strip_prefix(&prefix))
            .unwrap_or("unknown");
        println!("cargo:rustc-env={var}={value}");
    }

    Ok(())
}

/// Emits `GIT_COMMIT_*` environment variables when building from a checkout.
fn git_info() -> Result<()> {
    let output = Command::new("git")
        .args(["log", "-1", "--format=%H%n%h%n%cs"])
        .output()
        .context("failed to run `git log`")?;
    if !output.status.success() {
        return Err(anyhow!("`git log` failed"));
    }
    let text = String::from_utf8(output.stdout).context("git output is not UTF-8")?;
    let mut lines = text.lines();
    let (hash, short_hash, date) = match (lines.next(), lines.next(), lines.next()) {
        (Some(h), Some(s), Some(d)) => (h, s, d),
        _ => return Err(anyhow!("unexpected `git log` output")),
    };
    println!("cargo:rustc-env=GIT_COMMIT_HASH={hash}");
    println!("cargo:rustc-env=GIT_COMMIT_SHORT_HASH={short_hash}");
    println!("cargo:rustc-env=GIT_COMMIT_DATE={date}");
    Ok(())
}
