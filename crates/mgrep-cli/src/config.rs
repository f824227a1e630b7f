//! Locating and reading the mgrep configuration file.
//!
//! The file holds an `[export]` table and an `[icons]` table, mirroring
//! [`AppConfig`]. Icon paths written in the file are read relative to the
//! file itself, so a configuration can ship next to its icon set.

use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};

use mgrep::{ConfigurationError, MgrepError, config::AppConfig};

/// Configuration file looked up in the working directory.
const LOCAL_CONFIG: &str = "mgrep/config.toml";

/// Where the configuration comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ConfigSource {
    /// Given with `--config`; must exist.
    Explicit(PathBuf),
    /// `mgrep/config.toml` in the working directory.
    Local(PathBuf),
    /// `config.toml` in the platform configuration directory.
    User(PathBuf),
    Defaults,
}

impl ConfigSource {
    fn locate(explicit_path: Option<&Path>) -> Self {
        if let Some(path) = explicit_path {
            return Self::Explicit(path.to_path_buf());
        }

        let local = PathBuf::from(LOCAL_CONFIG);
        if local.is_file() {
            return Self::Local(local);
        }

        match ProjectDirs::from("com", "mgrep", "mgrep") {
            Some(dirs) => {
                let user = dirs.config_dir().join("config.toml");
                if user.is_file() {
                    return Self::User(user);
                }
                debug!(path:? = user; "No user configuration file");
            }
            None => debug!("No platform configuration directory"),
        }
        Self::Defaults
    }
}

/// Loads the configuration from `--config`, `mgrep/config.toml` or the
/// platform configuration directory, in that order. Without any file, the
/// defaults apply.
///
/// # Errors
///
/// Returns [`ConfigurationError::MissingFile`] if the explicit file does not
/// exist, and [`ConfigurationError::InvalidFile`] if a file is not valid TOML,
/// has unknown values, or sets a non-positive `export.dpi`.
pub fn load_config(explicit_path: Option<&Path>) -> Result<AppConfig, MgrepError> {
    let source = ConfigSource::locate(explicit_path);
    let path = match &source {
        ConfigSource::Explicit(path) | ConfigSource::Local(path) | ConfigSource::User(path) => path,
        ConfigSource::Defaults => {
            debug!("No configuration file found, using defaults");
            return Ok(AppConfig::default());
        }
    };

    info!(path:? = path, source:? = source; "Loading configuration");
    if !path.is_file() {
        return Err(ConfigurationError::MissingFile(path.clone()).into());
    }
    let content = fs::read_to_string(path)?;
    parse_config(&content, path)
}

/// Parses the content of the configuration file at `path`.
fn parse_config(content: &str, path: &Path) -> Result<AppConfig, MgrepError> {
    let invalid = |message: String| ConfigurationError::InvalidFile {
        path: path.to_path_buf(),
        message,
    };

    let mut config: AppConfig = toml::from_str(content).map_err(|err| invalid(err.to_string()))?;

    let dpi = config.export().dpi();
    if !(dpi.is_finite() && dpi > 0.0) {
        return Err(invalid(format!("export.dpi must be positive, got {dpi}")).into());
    }

    if let Some(base) = path.parent() {
        config.icons_mut().resolve_relative_to(base);
    }
    debug!(
        output_dir:? = config.export().output_dir(),
        format:% = config.export().format(),
        icons:? = config.icons().directory();
        "Configuration loaded"
    );
    Ok(config)
}
