//! Configuration loading and root folder resolution

use chrono::Duration;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::{Error, Result};

pub const DEFAULT_BIND: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5780;
pub const DEFAULT_SESSION_TTL_MINUTES: i64 = 60 * 24;
/// Upper bound on `session_ttl_minutes`: one year
pub const MAX_SESSION_TTL_MINUTES: i64 = 60 * 24 * 366;
pub const DATABASE_FILE: &str = "mlib.db";

/// Contents of `config.toml`; every key is optional
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub root_folder: Option<PathBuf>,
    pub bind: Option<String>,
    pub port: Option<u16>,
    pub session_ttl_minutes: Option<i64>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Session lifetime, defaulting when unset; must lie in
    /// `1..=MAX_SESSION_TTL_MINUTES`
    pub fn session_ttl(&self) -> Result<Duration> {
        let minutes = self.session_ttl_minutes.unwrap_or(DEFAULT_SESSION_TTL_MINUTES);
        if !(1..=MAX_SESSION_TTL_MINUTES).contains(&minutes) {
            return Err(Error::Config(format!(
                "session_ttl_minutes must be between 1 and {}, got {}",
                MAX_SESSION_TTL_MINUTES, minutes
            )));
        }
        Duration::try_minutes(minutes).ok_or_else(|| {
            Error::Config(format!("session_ttl_minutes out of range: {}", minutes))
        })
    }
}

/// Settings the web server runs with
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub root_folder: PathBuf,
    pub bind: String,
    pub port: u16,
    pub session_ttl: Duration,
}

impl ServerConfig {
    /// Merge command-line values (which already carry env fallbacks) over
    /// the config file, over compiled defaults
    pub fn resolve(
        cli_root_folder: Option<&str>,
        root_env_var: &str,
        cli_bind: Option<&str>,
        cli_port: Option<u16>,
    ) -> Result<Self> {
        let file = find_config_file()
            .map(|path| FileConfig::load(&path))
            .transpose()?
            .unwrap_or_default();

        let root_folder = resolve_root_folder(cli_root_folder, root_env_var, &file);
        let session_ttl = file.session_ttl()?;

        Ok(Self {
            root_folder,
            bind: cli_bind
                .map(str::to_string)
                .or(file.bind)
                .unwrap_or_else(|| DEFAULT_BIND.to_string()),
            port: cli_port.or(file.port).unwrap_or(DEFAULT_PORT),
            session_ttl,
        })
    }

    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join(DATABASE_FILE)
    }
}

/// Root folder resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. TOML config file
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_root_folder(cli_arg: Option<&str>, env_var_name: &str, file: &FileConfig) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return PathBuf::from(path);
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        return PathBuf::from(path);
    }

    // Priority 3: TOML config file
    if let Some(root_folder) = &file.root_folder {
        return root_folder.clone();
    }

    // Priority 4: OS-dependent compiled default
    get_default_root_folder()
}

/// First existing config file: `~/.config/mlib/config.toml`, then `/etc/mlib/config.toml`
fn find_config_file() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("mlib").join("config.toml"));
    let system_config = cfg!(unix).then(|| PathBuf::from("/etc/mlib/config.toml"));

    let found = [user_config, system_config]
        .into_iter()
        .flatten()
        .find(|path| path.exists());
    if let Some(path) = &found {
        debug!("Using config file {}", path.display());
    }
    found
}

/// Get OS-dependent default root folder path
fn get_default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("mlib"))
        .unwrap_or_else(|| PathBuf::from("./mlib_data"))
}
