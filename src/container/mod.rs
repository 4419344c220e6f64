use anyhow::{Context, Result, bail};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{config::Scope, log::config_written};

/// Checks a box name is usable as a single directory under the container root
///
/// # Errors
///
/// - Empty name
/// - Name would escape the container root
/// - Name contains whitespace or quotes, which would break the `lxc-start` hint
pub fn validate_box_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        bail!("The box name can not be empty.");
    }

    if name == "." || name == ".." {
        bail!("The box name can not be {name}.");
    }

    if let Some(bad) = name
        .chars()
        .find(|c| matches!(*c, '/' | '\0' | '\'' | '"') || c.is_whitespace())
    {
        bail!("The box name can not contain {bad:?}.");
    }

    Ok(())
}

/// Where the container `name` lives. Always absolute, LXC can't resolve
/// relative paths in the config.
///
/// # Errors
///
/// - `lxc_path` is relative and the current directory is gone
pub fn container_dir(lxc_path: &Path, name: &str) -> Result<PathBuf> {
    let lxc_path = std::path::absolute(lxc_path)
        .with_context(|| format!("Could not resolve {}", lxc_path.display()))?;

    Ok(lxc_path.join(name))
}

/// The container configuration, with everything but the name and directory fixed.
#[must_use]
pub fn render_config(name: &str, container_dir: &Path) -> String {
    let dir = container_dir.display();

    format!(
        "# Container configuration written by grab-box

lxc.uts.name = {name}
lxc.rootfs.path = dir:{dir}/rootfs
lxc.mount.fstab = {dir}/fstab

lxc.include = /usr/share/lxc/config/common.conf
lxc.arch = linux64
lxc.tty.max = 4
lxc.pty.max = 1024

lxc.net.0.type = veth
lxc.net.0.link = lxcbr0
lxc.net.0.flags = up
"
    )
}

/// Writes `config` into `container_dir`.
/// Written to a `.new` first and renamed, so a half written config never exists.
/// Boxes without an `fstab` get an empty one, LXC refuses to start without it.
///
/// # Errors
///
/// - Filesystem errors (Permissions, Out of space)
pub fn write_config(container_dir: &Path, name: &str) -> Result<PathBuf> {
    let config_path = container_dir.join("config");
    let new_path = container_dir.join("config.new");
    let fstab_path = container_dir.join("fstab");

    if !fstab_path.exists() {
        fs::write(&fstab_path, "")
            .with_context(|| format!("Could not create {}", fstab_path.display()))?;
    }

    fs::write(&new_path, render_config(name, container_dir))
        .with_context(|| format!("Could not write {}", new_path.display()))?;
    fs::rename(&new_path, &config_path)
        .with_context(|| format!("Could not replace {}", config_path.display()))?;

    config_written(&config_path);

    Ok(config_path)
}

/// What to run to start the freshly unpacked container
#[must_use]
pub fn start_command(name: &str, scope: Scope) -> String {
    match scope {
        Scope::System => format!("sudo lxc-start -n '{name}'"),
        Scope::User => format!("lxc-start -n '{name}'"),
    }
}
