use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

const DEFAULT_CONFIG_FILES: &[&str] = &[
    "studybud.toml",
    "config/studybud.toml",
    "crates/config/studybud.toml",
    "../studybud.toml",
    "../config/studybud.toml",
];

/// Placeholder image reference stored for users without an uploaded avatar.
pub const DEFAULT_AVATAR: &str = "avatar.svg";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub accounts: AccountsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://studybud.db".to_string(),
            max_connections: 10,
        }
    }
}

/// Settings consumed by the account factory.
///
/// ```
/// use studybud_config::AccountsConfig;
///
/// let accounts = AccountsConfig::default();
/// assert_eq!(accounts.default_avatar, "avatar.svg");
/// assert_eq!(accounts.unusable_password_length, 40);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountsConfig {
    #[serde(default = "AccountsConfig::default_avatar")]
    pub default_avatar: String,
    #[serde(default = "AccountsConfig::default_unusable_password_length")]
    pub unusable_password_length: usize,
}

impl AccountsConfig {
    fn default_avatar() -> String {
        DEFAULT_AVATAR.to_string()
    }

    const fn default_unusable_password_length() -> usize {
        40
    }
}

impl Default for AccountsConfig {
    fn default() -> Self {
        Self {
            default_avatar: Self::default_avatar(),
            unusable_password_length: Self::default_unusable_password_length(),
        }
    }
}

/// Load the application configuration by combining defaults, files, and environment overrides.
///
/// ```
/// use studybud_config::load;
///
/// std::env::remove_var("STUDYBUD_CONFIG");
///
/// let config = load().expect("configuration should load with defaults");
/// assert!(!config.database.url.is_empty());
/// ```
pub fn load() -> anyhow::Result<AppConfig> {
    let explicit = std::env::var("STUDYBUD_CONFIG").ok().map(PathBuf::from);
    load_from(explicit.as_deref())
}

/// Same as [`load`], but with an explicit configuration file taking the place
/// of `STUDYBUD_CONFIG` and the discovery list.
pub fn load_from(path: Option<&Path>) -> anyhow::Result<AppConfig> {
    let defaults = AppConfig::default();

    let unusable_len = i64::try_from(defaults.accounts.unusable_password_length).unwrap_or(i64::MAX);

    let mut builder = config::Config::builder()
        .set_default("database.url", defaults.database.url.clone())?
        .set_default("database.max_connections", i64::from(defaults.database.max_connections))?
        .set_default("accounts.default_avatar", defaults.accounts.default_avatar.clone())?
        .set_default("accounts.unusable_password_length", unusable_len)?;

    let environment_overrides = config::Environment::with_prefix("STUDYBUD").separator("__");

    if let Some(path) = path {
        debug!(path = %path.display(), "loading configuration from explicit path");
        builder = builder.add_source(config::File::from(path.to_path_buf()));
    } else if let Ok(cwd) = std::env::current_dir() {
        let fallback = DEFAULT_CONFIG_FILES
            .iter()
            .map(|candidate| cwd.join(candidate))
            .find(|path| path.exists());

        match fallback {
            Some(path) => {
                debug!(path = %path.display(), "loading configuration file");
                builder = builder.add_source(config::File::from(path));
            }
            None => {
                debug!("no configuration file found, relying on defaults and environment overrides");
            }
        }
    }

    builder = builder.add_source(environment_overrides);

    let cfg = builder.build().context("unable to build configuration")?;

    let config = cfg
        .try_deserialize::<AppConfig>()
        .context("invalid configuration")?;

    if config.database.max_connections == 0 {
        anyhow::bail!("database.max_connections must be at least 1");
    }

    debug!(?config, "loaded configuration");
    Ok(config)
}
