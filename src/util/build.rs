//! Version information assembled from the Cargo manifest and the values the
//! build script passes through.

use once_cell::sync::Lazy;

/// This is the name defined in the Cargo manifest.
pub const CRATE_NAME: &str = env!("CARGO_PKG_NAME");

/// This is the version defined in the Cargo manifest.
pub const CRATE_RELEASE: &str = env!("CARGO_PKG_VERSION");

/// The name and release together, e.g. `curator 0.3.1`.
pub const CRATE_NAME_RELEASE: &str = constcat::concat!(CRATE_NAME, " ", CRATE_RELEASE);

/// The commit (hash, short hash, date) when built from a Git checkout. The
/// build script either emits all three variables or none of them.
const GIT_COMMIT: Option<(&str, &str, &str)> = match (
    option_env!("GIT_COMMIT_HASH"),
    option_env!("GIT_COMMIT_SHORT_HASH"),
    option_env!("GIT_COMMIT_DATE"),
) {
    (Some(hash), Some(short), Some(date)) => Some((hash, short, date)),
    _ => None,
};

/// The release, with the commit appended when known.
pub static CRATE_VERSION: Lazy<String> = Lazy::new(|| match GIT_COMMIT {
    Some((_, short, date)) => format!("{CRATE_RELEASE} ({short} {date})"),
    None => CRATE_RELEASE.to_string(),
});

/// The version over two lines, with the compiler that produced the binary.
pub static CRATE_LONG_VERSION: Lazy<String> = Lazy::new(|| {
    let mut out = CRATE_VERSION.clone();
    out.push('\n');
    out.push_str(env!("RUSTC_VERSION_SUMMARY"));
    out
});

/// Everything the `version` subcommand reports: the version followed by a
/// labelled section for this build and one for the compiler.
pub static CRATE_VERBOSE_VERSION: Lazy<String> = Lazy::new(|| {
    let (commit_hash, commit_date) = match GIT_COMMIT {
        Some((hash, _, date)) => (hash, date),
        None => ("unknown", "unknown"),
    };
    let details = [
        ("binary", CRATE_NAME),
        ("release", CRATE_RELEASE),
        ("commit-hash", commit_hash),
        ("commit-date", commit_date),
        ("target", env!("TARGET")),
    ];
    let compiler = [
        ("binary", env!("RUSTC_VERSION_BINARY")),
        ("release", env!("RUSTC_VERSION_RELEASE")),
        ("commit-hash", env!("RUSTC_VERSION_COMMIT_HASH")),
        ("commit-date", env!("RUSTC_VERSION_COMMIT_DATE")),
        ("host", env!("RUSTC_VERSION_HOST")),
    ];

    let mut out = CRATE_VERSION.clone();
    for (header, fields) in [("Details:", &details), ("Compiled with:", &compiler)] {
        out.push_str("\n\n");
        out.push_str(header);
        for (label, value) in fields {
            out.push_str(&format!("\n  {label}: {value}"));
        }
    }
    out
});
