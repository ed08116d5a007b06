use std::env;
use std::process::Command;

/// Exposes `MCLAUDE_VERSION`: the package version for release builds, or
/// `<version>-dev+<hash>[.dirty]` for debug builds made from a git checkout.
fn main() {
    let version = env::var("CARGO_PKG_VERSION").unwrap_or_else(|_| "0.0.0".to_string());
    let is_debug = env::var("PROFILE").map(|p| p == "debug").unwrap_or(false);

    let full_version = if is_debug {
        let hash = git(&["rev-parse", "--short=8", "HEAD"]).unwrap_or_else(|| "unknown".into());
        let suffix = if worktree_dirty() { ".dirty" } else { "" };
        format!("{version}-dev+{hash}{suffix}")
    } else {
        version
    };

    println!("cargo:rustc-env=MCLAUDE_VERSION={full_version}");
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/heads/");
}

fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    output
        .status
        .success()
        .then(|| String::from_utf8_lossy(&output.stdout).trim().to_string())
}

fn worktree_dirty() -> bool {
    [&["diff", "--quiet"][..], &["diff", "--cached", "--quiet"][..]]
        .iter()
        .any(|args| {
            Command::new("git")
                .args(*args)
                .status()
                .map(|status| !status.success())
                .unwrap_or(false)
        })
}
