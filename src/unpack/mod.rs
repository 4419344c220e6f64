mod external;

use anyhow::{Context, Result, bail};
use bzip2::read::BzDecoder;
use flate2::read::GzDecoder;
use liblzma::read::XzDecoder;
use std::{
    fs::{self, File},
    io::{BufReader, Read},
    os::unix::fs::PermissionsExt,
    path::Path,
};
use tar::Archive;

use crate::{
    config::UnpackerKind,
    log::{container_created, overwriting_container, unarchiving},
    unpack::external::unpack_external,
};

/// Compression wrapped around the tar, as told by its magic bytes
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Compression {
    Gzip,
    Xz,
    Bzip2,
    /// Anything unrecognised is handed to the tar reader as-is
    None,
}

impl Compression {
    #[must_use]
    pub fn from_magic(magic: &[u8]) -> Self {
        if magic.starts_with(&[0x1f, 0x8b]) {
            Self::Gzip
        } else if magic.starts_with(&[0xfd, b'7', b'z', b'X', b'Z', 0x00]) {
            Self::Xz
        } else if magic.starts_with(b"BZh") {
            Self::Bzip2
        } else {
            Self::None
        }
    }

    /// Sniffs the compression of the file at `path`
    ///
    /// # Errors
    ///
    /// - File can't be read
    pub fn detect(path: &Path) -> Result<Self> {
        let mut magic = Vec::with_capacity(6);
        File::open(path)
            .with_context(|| format!("Could not open archive {}", path.display()))?
            .take(6)
            .read_to_end(&mut magic)?;

        Ok(Self::from_magic(&magic))
    }
}

/// Makes sure `container_dir` exists and is safe to unpack into.
/// An existing container is only unpacked over when `force` is set.
///
/// # Errors
///
/// - The directory already contains a container and `force` isn't set
/// - Filesystem errors (Permissions, most likely not being root)
pub fn ensure_container_dir(container_dir: &Path, force: bool) -> Result<()> {
    if container_dir.exists() {
        let occupied = fs::read_dir(container_dir)
            .with_context(|| format!("Could not read {}", container_dir.display()))?
            .next()
            .is_some();

        if occupied {
            if !force {
                bail!(
                    "{} already exists and is not empty. Use --force to unpack over it.",
                    container_dir.display()
                );
            }

            overwriting_container(container_dir);
        }
    }

    fs::create_dir_all(container_dir)
        .with_context(|| format!("Failed to create {}", container_dir.display()))?;

    Ok(())
}

/// Unpacks the box at `archive_path` into `container_dir`.
/// `preserve_ownership` keeps the uids/gids from the archive, which only root can do.
///
/// # Errors
///
/// - Archive is unreadable or corrupt
/// - External `tar` missing or failed
/// - Filesystem errors (Out of space, Permissions)
pub fn unpack_archive(
    archive_path: &Path,
    container_dir: &Path,
    unpacker: UnpackerKind,
    preserve_ownership: bool,
) -> Result<()> {
    unarchiving();

    fs::create_dir_all(container_dir)
        .with_context(|| format!("Failed to create {}", container_dir.display()))?;

    let result = match unpacker {
        UnpackerKind::Builtin => unpack_builtin(archive_path, container_dir, preserve_ownership),
        UnpackerKind::External => {
            unpack_external(archive_path, container_dir, preserve_ownership)
        }
    };
    result.with_context(|| format!("Failed to unpack {}", archive_path.display()))?;

    // chmod 755
    let mut perms = fs::metadata(container_dir)
        .with_context(|| format!("Could not read {}", container_dir.display()))?
        .permissions();
    perms.set_mode(0o755);
    fs::set_permissions(container_dir, perms)
        .with_context(|| format!("Could not chmod {}", container_dir.display()))?;

    container_created(container_dir);

    Ok(())
}

fn unpack_builtin(
    archive_path: &Path,
    container_dir: &Path,
    preserve_ownership: bool,
) -> Result<()> {
    let compression = Compression::detect(archive_path)?;
    let file = BufReader::new(File::open(archive_path)?);

    let reader: Box<dyn Read> = match compression {
        Compression::Gzip => Box::new(GzDecoder::new(file)),
        Compression::Xz => Box::new(XzDecoder::new(file)),
        Compression::Bzip2 => Box::new(BzDecoder::new(file)),
        Compression::None => Box::new(file),
    };

    let mut archive = Archive::new(reader);
    archive.set_preserve_permissions(true);
    archive.set_preserve_mtime(true);
    archive.set_preserve_ownerships(preserve_ownership);
    archive.set_overwrite(true);

    // Entries trying to escape `container_dir` are skipped by `unpack`
    archive.unpack(container_dir)?;

    Ok(())
}
