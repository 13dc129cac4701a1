use anyhow::{format_err, Error};
use serde_derive::Deserialize;
use std::{
    ops::Deref,
    path::{Path, PathBuf},
    sync::Arc,
};

use stack_string::{format_sstr, StackString};

#[derive(Debug, Deserialize)]
pub struct ConfigInner {
    #[serde(default = "default_gdrive_secret_file")]
    pub gdrive_secret_file: PathBuf,
    #[serde(default = "default_gdrive_token_path")]
    pub gdrive_token_path: PathBuf,
    #[serde(default = "default_gdrive_session_name")]
    pub gdrive_session_name: StackString,
    #[serde(default = "default_restore_root")]
    pub restore_root: PathBuf,
    #[serde(default = "default_locker_marker")]
    pub locker_marker: StackString,
    #[serde(default = "default_failure_log_path")]
    pub failure_log_path: PathBuf,
    #[serde(default = "default_page_size")]
    pub page_size: i32,
}

#[derive(Debug, Clone)]
pub struct Config(Arc<ConfigInner>);

fn default_home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("/tmp"))
}
fn default_config_dir() -> PathBuf {
    dirs::config_dir().unwrap_or_else(|| default_home_dir().join(".config"))
}
fn default_gdrive_secret_file() -> PathBuf {
    default_config_dir()
        .join("drive_restore")
        .join("client_secrets.json")
}
fn default_gdrive_token_path() -> PathBuf {
    default_home_dir().join(".gdrive")
}
fn default_gdrive_session_name() -> StackString {
    "drive_restore".into()
}
fn default_restore_root() -> PathBuf {
    default_home_dir().join("GoogleDriveRestore")
}
fn default_locker_marker() -> StackString {
    ".CTB-Locker".into()
}
fn default_failure_log_path() -> PathBuf {
    "DontRestoredFiles.txt".into()
}
fn default_page_size() -> i32 {
    1000
}

impl Default for ConfigInner {
    fn default() -> Self {
        Self {
            gdrive_secret_file: default_gdrive_secret_file(),
            gdrive_token_path: default_gdrive_token_path(),
            gdrive_session_name: default_gdrive_session_name(),
            restore_root: default_restore_root(),
            locker_marker: default_locker_marker(),
            failure_log_path: default_failure_log_path(),
            page_size: default_page_size(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_inner(ConfigInner::default())
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_inner(inner: ConfigInner) -> Self {
        Self(Arc::new(inner))
    }

    pub fn init_config() -> Result<Self, Error> {
        let fname = Path::new("config.env");
        let config_dir = dirs::config_dir().ok_or_else(|| format_err!("No CONFIG directory"))?;
        let default_fname = config_dir.join("drive_restore").join("config.env");

        let env_file = if fname.exists() {
            fname
        } else {
            &default_fname
        };

        dotenv::dotenv().ok();

        if env_file.exists() {
            dotenv::from_path(env_file).ok();
        }

        let conf: ConfigInner = envy::from_env()?;

        Ok(Self(Arc::new(conf)))
    }

    /// Local root of the restored tree as a string ending in `/`.
    pub fn restore_root_str(&self) -> StackString {
        let root = self.restore_root.to_string_lossy();
        if root.ends_with('/') {
            format_sstr!("{root}")
        } else {
            format_sstr!("{root}/")
        }
    }
}

impl Deref for Config {
    type Target = ConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Error;
    use maplit::hashmap;
    use std::path::Path;

    use crate::config::{Config, ConfigInner};

    #[test]
    fn test_config_from_env_values() -> Result<(), Error> {
        let vars = hashmap! {
            "RESTORE_ROOT".to_string() => "/media/restore".to_string(),
            "LOCKER_MARKER".to_string() => ".locked".to_string(),
            "PAGE_SIZE".to_string() => "100".to_string(),
        };
        let inner: ConfigInner = envy::from_iter(vars)?;
        let config = Config::from_inner(inner);
        assert_eq!(config.restore_root, Path::new("/media/restore"));
        assert_eq!(config.restore_root_str().as_str(), "/media/restore/");
        assert_eq!(config.locker_marker.as_str(), ".locked");
        assert_eq!(config.page_size, 100);
        assert_eq!(config.gdrive_session_name.as_str(), "drive_restore");
        assert_eq!(
            config.failure_log_path,
            Path::new("DontRestoredFiles.txt")
        );
        Ok(())
    }

    #[test]
    fn test_default_config() {
        let config = Config::new();
        assert_eq!(config.locker_marker.as_str(), ".CTB-Locker");
        assert!(config.restore_root_str().ends_with('/'));
    }
}
