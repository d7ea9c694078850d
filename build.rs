// SPDX-License-Identifier: GPL-3.0-only

use std::process::Command;

fn main() {
    println!("cargo::rerun-if-changed=.git/HEAD");
    println!("cargo::rerun-if-env-changed=KINECT_MESH_VERSION");

    // Packagers without a git checkout set the version explicitly
    let version = std::env::var("KINECT_MESH_VERSION")
        .ok()
        .or_else(git_version)
        .unwrap_or_else(|| std::env::var("CARGO_PKG_VERSION").unwrap_or_default());

    println!("cargo::rustc-env=GIT_VERSION={}", version);
}

/// `git describe` without the leading `v`, e.g. `0.1.0` or `0.1.0-5-gabcdef1`
fn git_version() -> Option<String> {
    let output = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty", "--match", "v*"])
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }
    let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
    Some(version.strip_prefix('v').unwrap_or(&version).to_string())
}
