//! Settings file management.
//!
//! Handles reading, writing, and validating `~/.stowage/config.toml`.
//! Every field is optional in the file; missing values take defaults
//! rooted at the stowage home directory.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::constants::{
    DEFAULT_CONCURRENCY, HOME_DIR, IDENTITIES_DIR, SETTINGS_FILE, STORE_DIR,
};
use crate::error::{ConfigError, Result};

/// Environment variable overriding the stowage home directory.
pub const HOME_ENV: &str = "STOWAGE_HOME";

/// User settings stored in `config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Pack/unpack worker pool width.
    pub concurrency: usize,
    /// Keyring directory.
    pub identities: PathBuf,
    /// Default store location.
    pub store: PathBuf,
}

#[derive(Debug, Default, Deserialize)]
struct RawSettings {
    concurrency: Option<usize>,
    identities: Option<PathBuf>,
    store: Option<PathBuf>,
}

/// Stowage home: `$STOWAGE_HOME`, or `~/.stowage`.
///
/// # Errors
///
/// Returns `ConfigError::NoHome` if neither is available.
pub fn home_dir() -> Result<PathBuf> {
    if let Some(home) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(home));
    }
    dirs::home_dir()
        .map(|h| h.join(HOME_DIR))
        .ok_or_else(|| ConfigError::NoHome.into())
}

impl Settings {
    /// Defaults rooted at `home`.
    pub fn defaults(home: &Path) -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            identities: home.join(IDENTITIES_DIR),
            store: home.join(STORE_DIR),
        }
    }

    /// Load settings from the stowage home.
    pub fn load() -> Result<Self> {
        Self::load_from(&home_dir()?)
    }

    /// Load settings from `<home>/config.toml`; a missing file means
    /// defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` if the TOML is malformed and
    /// `ConfigError::InvalidValue` if validation fails.
    pub fn load_from(home: &Path) -> Result<Self> {
        let path = home.join(SETTINGS_FILE);
        debug!(path = %path.display(), "loading settings");

        let raw = if path.exists() {
            let contents = std::fs::read_to_string(&path).map_err(|source| ConfigError::ReadFile {
                path: path.display().to_string(),
                source,
            })?;
            toml::from_str::<RawSettings>(&contents).map_err(ConfigError::Parse)?
        } else {
            RawSettings::default()
        };

        let defaults = Self::defaults(home);
        let settings = Self {
            concurrency: raw.concurrency.unwrap_or(defaults.concurrency),
            identities: raw.identities.unwrap_or(defaults.identities),
            store: raw.store.unwrap_or(defaults.store),
        };
        settings.validate()?;

        debug!(
            concurrency = settings.concurrency,
            store = %settings.store.display(),
            "settings loaded"
        );
        Ok(settings)
    }

    /// Write settings to `<home>/config.toml`.
    pub fn save(&self, home: &Path) -> Result<()> {
        self.validate()?;
        let contents = toml::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        std::fs::create_dir_all(home)?;
        std::fs::write(home.join(SETTINGS_FILE), contents)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            return Err(ConfigError::InvalidValue {
                field: "concurrency",
                reason: "must be greater than zero".to_string(),
            }
            .into());
        }
        Ok(())
    }
}
