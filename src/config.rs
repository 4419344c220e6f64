use anyhow::{Context, Result};
use directories::BaseDirs;
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Where containers are unpacked to, and who will own them.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Scope {
    /// Unprivileged containers of the current user
    User,
    /// Privileged containers, requires root
    System,
}

/// Which unpacker handles the box archive
#[derive(serde::Deserialize, serde::Serialize, Debug, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum UnpackerKind {
    /// In-process tar reader
    #[default]
    Builtin,
    /// The system `tar` binary
    External,
}

/// User settings, read from `config.yml` in the config directory.
/// Every field is optional, command line flags take precedence.
#[derive(serde::Deserialize, serde::Serialize, Debug, PartialEq, Eq, Clone, Default)]
#[serde(default)]
pub struct Settings {
    /// Overrides the scope's default container root
    pub lxc_path: Option<PathBuf>,
    pub unpacker: UnpackerKind,
}

impl Settings {
    /// Reads settings from `path`, falling back to defaults if it doesn't exist.
    ///
    /// # Errors
    ///
    /// - Filesystem errors (Permissions)
    /// - Malformed YAML
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("Could not read settings from {}", path.display()))?;
        let settings = serde_yaml::from_str(&raw)
            .with_context(|| format!("Invalid settings in {}", path.display()))?;

        Ok(settings)
    }

    /// The container root for `scope`, unless one was configured
    ///
    /// # Errors
    ///
    /// - User directories could not be found
    pub fn lxc_path(&self, scope: Scope) -> Result<PathBuf> {
        match (&self.lxc_path, scope) {
            (Some(path), _) => Ok(path.clone()),
            (None, Scope::User) => get_user_lxc_dir(),
            (None, Scope::System) => Ok(system_lxc_dir()),
        }
    }
}

/// Location of `config.yml`, does not create anything.
///
/// # Errors
///
/// - User directories could not be found
pub fn get_settings_path() -> Result<PathBuf> {
    // Locate XDG config directory
    let base_dirs = BaseDirs::new().context("Could not find user directories")?;

    Ok(base_dirs.config_dir().join("grab-box").join("config.yml"))
}

/// Same location unprivileged LXC uses by default
///
/// # Errors
///
/// - User directories could not be found
pub fn get_user_lxc_dir() -> Result<PathBuf> {
    // Locate XDG data directory
    let base_dirs = BaseDirs::new().context("Could not find user directories")?;

    Ok(base_dirs.data_dir().join("lxc"))
}

#[must_use]
pub fn system_lxc_dir() -> PathBuf {
    PathBuf::from("/var/lib/lxc")
}

#[cfg(test)]
mod tests {
    use super::*;
    use temp_dir::TempDir;

    #[test]
    fn test_missing_settings_are_default() -> Result<()> {
        let temp_dir = TempDir::new()?;

        let settings = Settings::load(&temp_dir.path().join("config.yml"))?;
        assert_eq!(settings, Settings::default());

        Ok(())
    }

    #[test]
    fn test_partial_settings() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("config.yml");
        fs::write(&path, "unpacker: external\nlxc_path: /srv/lxc\n")?;

        let settings = Settings::load(&path)?;
        assert_eq!(settings.unpacker, UnpackerKind::External);
        assert_eq!(
            settings.lxc_path(Scope::System)?,
            PathBuf::from("/srv/lxc")
        );

        Ok(())
    }

    #[test]
    fn test_malformed_settings() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("config.yml");
        fs::write(&path, "unpacker: [not, a, kind]\n")?;

        assert!(Settings::load(&path).is_err());

        Ok(())
    }

    #[test]
    fn test_system_scope_default() -> Result<()> {
        let settings = Settings::default();
        assert_eq!(settings.lxc_path(Scope::System)?, system_lxc_dir());

        Ok(())
    }
}
