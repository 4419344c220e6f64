use anyhow::{Context, Result, bail};
use std::{path::Path, process::Command};

/// Unpacks with the system `tar`, which figures out the compression itself.
pub fn unpack_external(
    archive_path: &Path,
    container_dir: &Path,
    preserve_ownership: bool,
) -> Result<()> {
    let mut command = Command::new("tar");
    command
        .arg("-xpf")
        .arg(archive_path)
        .arg("-C")
        .arg(container_dir);

    if preserve_ownership {
        command.arg("--numeric-owner");
    } else {
        command.arg("--no-same-owner");
    }

    let status = command
        .status()
        .with_context(|| "Failed to run tar, is it installed?")?;

    if !status.success() {
        bail!("tar failed: {status}");
    }

    Ok(())
}
