use std::{
    env,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

const TMP_SUFFIX: &str = "tmp";
const APP_DIR: &str = "ecm_admin";
const CONFIG_FILE: &str = "config.json";

/// Overrides `api_base_url` when set.
pub const API_URL_ENV: &str = "ECM_ADMIN_API_URL";

/// Directory holding `config.json`; replaces the platform default when set.
pub const CONFIG_DIR_ENV: &str = "ECM_ADMIN_CONFIG_DIR";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub api_base_url: String,
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
}

fn default_timeout() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000/api/v1".into(),
            request_timeout_secs: default_timeout(),
            auth_token: None,
        }
    }
}

impl Config {
    /// Applies environment overrides on top of the persisted values.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = env::var(API_URL_ENV) {
            let url = url.trim();
            if !url.is_empty() {
                tracing::debug!(url, "api base url overridden from environment");
                self.api_base_url = url.to_string();
            }
        }
        self
    }
}

/// Loads and persists [`Config`] as pretty JSON.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    pub fn new(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self, ConfigError> {
        fs::create_dir_all(&base)?;
        Ok(Self::new(base.join(CONFIG_FILE)))
    }

    /// `<config dir>/ecm_admin/config.json`, falling back to the working
    /// directory when the platform has no config dir.
    pub fn default_location() -> Result<Self, ConfigError> {
        let base = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR);
        Self::with_base_dir(base)
    }

    /// Honors [`CONFIG_DIR_ENV`], otherwise [`ConfigManager::default_location`].
    pub fn from_env() -> Result<Self, ConfigError> {
        match env::var_os(CONFIG_DIR_ENV) {
            Some(dir) if !dir.is_empty() => Self::with_base_dir(PathBuf::from(dir)),
            _ => Self::default_location(),
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn load(&self) -> Result<Config, ConfigError> {
        if self.config_path.exists() {
            let data = fs::read_to_string(&self.config_path)?;
            serde_json::from_str(&data).map_err(|err| ConfigError::Serde(err.to_string()))
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(config)
            .map_err(|err| ConfigError::Serde(err.to_string()))?;
        let tmp = tmp_path(&self.config_path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &self.config_path)?;
        Ok(())
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<(), ConfigError> {
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tmp_path_appends_suffix() {
        assert_eq!(
            tmp_path(Path::new("/a/config.json")),
            PathBuf::from("/a/config.json.tmp")
        );
        assert_eq!(tmp_path(Path::new("/a/config")), PathBuf::from("/a/config.tmp"));
    }

    #[test]
    fn missing_timeout_takes_default() {
        let config: Config =
            serde_json::from_str(r#"{ "api_base_url": "https://ecm.example/api" }"#).unwrap();
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.auth_token, None);
    }
}
