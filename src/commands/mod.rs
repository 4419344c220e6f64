use anyhow::{Result, bail};
use dialoguer::{Input, theme::ColorfulTheme};
use std::path::{Path, PathBuf};
use temp_dir::TempDir;

use grabbox::{
    config::{Scope, UnpackerKind},
    container::{container_dir, start_command, validate_box_name, write_config},
    log::{finished, welcome},
    unpack::{ensure_container_dir, unpack_archive},
};

/// What the user told us up front, anything missing is prompted for
pub struct GrabOptions {
    pub archive: Option<PathBuf>,
    pub url: Option<String>,
    pub name: Option<String>,
    pub force: bool,
}

pub async fn grab_cmd(
    lxc_path: &Path,
    scope: Scope,
    unpacker: UnpackerKind,
    options: GrabOptions,
) -> Result<()> {
    welcome();

    // Fail before downloading anything
    if let Some(name) = &options.name {
        validate_box_name(name)?;
    }

    // The temporary directory has to outlive the unpacking
    let (archive_path, _download_dir) = if let Some(archive) = options.archive {
        if !archive.is_file() {
            bail!("The archive {} does not exist.", archive.display());
        }

        (archive, None)
    } else {
        let url = match options.url {
            Some(url) => url,
            None => ask_url()?,
        };

        let download_dir = TempDir::new()?;
        let archive_path = fetch(&url, download_dir.path()).await?;

        (archive_path, Some(download_dir))
    };

    let name = match options.name {
        Some(name) => name,
        None => ask_name()?,
    };

    let container_dir = container_dir(lxc_path, &name)?;
    ensure_container_dir(&container_dir, options.force)?;

    unpack_archive(
        &archive_path,
        &container_dir,
        unpacker,
        scope == Scope::System,
    )?;
    write_config(&container_dir, &name)?;

    finished(&start_command(&name, scope));

    Ok(())
}

#[cfg(feature = "network")]
async fn fetch(url: &str, download_dir: &Path) -> Result<PathBuf> {
    grabbox::download::download_box(url, download_dir).await
}

#[cfg(not(feature = "network"))]
#[allow(clippy::unused_async)]
async fn fetch(url: &str, _download_dir: &Path) -> Result<PathBuf> {
    bail!("Built without network support, download {url} yourself and use --archive.")
}

fn ask_url() -> Result<String> {
    let url = Input::<String>::with_theme(&ColorfulTheme::default())
        .with_prompt("What is the url of the box?")
        .interact_text()?;

    Ok(url.trim().to_string())
}

fn ask_name() -> Result<String> {
    let name = Input::<String>::with_theme(&ColorfulTheme::default())
        .with_prompt("What is the name of the box?")
        .validate_with(|input: &String| validate_box_name(input).map_err(|err| err.to_string()))
        .interact_text()?;

    Ok(name)
}
