use crate::constants::{APP, TARGET};
use anyhow::{Context, Result};
use std::process::Command;

pub fn build_firmware(features: Option<&str>, release: bool) -> Result<()> {
    let mut cargo_build = Command::new("cargo");
    cargo_build
        .arg("build")
        .arg("--no-default-features")
        .args(["--package", APP])
        .args(["--target", TARGET]);

    if release {
        cargo_build.arg("--release");
    }

    if let Some(features) = features {
        cargo_build.args(["--features", features]);
    }

    let status = cargo_build
        .status()
        .with_context(|| format!("Failed to build {APP}"))?;

    if !status.success() {
        anyhow::bail!("Build failed for {APP}");
    }

    Ok(())
}
