use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use crate::{
    core::utils::{ensure_dir, tmp_path, PathResolver},
    errors::LedgerError,
};

/// Operator preferences persisted as `config/config.json` under the app home.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "Config::default_currency_symbol")]
    pub currency_symbol: String,
    /// Rate applied to newly added entities.
    #[serde(default)]
    pub default_rate: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_company: Option<String>,
    /// Overrides the period store directory (defaults to `<home>/periods`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_dir: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_opened_period: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            currency_symbol: Self::default_currency_symbol(),
            default_rate: 0.0,
            default_company: None,
            store_dir: None,
            last_opened_period: None,
        }
    }
}

impl Config {
    pub fn default_currency_symbol() -> String {
        "$".into()
    }

    /// Keys accepted by [`Config::set`].
    pub const SETTABLE_KEYS: [&'static str; 4] =
        ["currency_symbol", "default_rate", "default_company", "store_dir"];

    pub fn resolve_store_dir(&self, base: &Path) -> PathBuf {
        self.store_dir
            .clone()
            .unwrap_or_else(|| PathResolver::periods_dir_in(base))
    }

    /// Updates one setting from text. An empty value clears optional settings.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), LedgerError> {
        let value = value.trim();
        match key {
            "currency_symbol" => {
                self.currency_symbol = value.to_string();
            }
            "default_rate" => {
                let rate = value.parse::<f64>().ok().filter(|rate| rate.is_finite());
                self.default_rate = rate.ok_or_else(|| {
                    LedgerError::Config(format!("default_rate must be a number, got `{value}`"))
                })?;
            }
            "default_company" => {
                self.default_company = (!value.is_empty()).then(|| value.to_string());
            }
            "store_dir" => {
                self.store_dir = (!value.is_empty()).then(|| PathBuf::from(value));
            }
            other => {
                return Err(LedgerError::Config(format!(
                    "unknown setting `{other}` (expected one of: {})",
                    Self::SETTABLE_KEYS.join(", ")
                )))
            }
        }
        Ok(())
    }
}

/// Loads and saves [`Config`] with write-then-rename semantics.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    base: PathBuf,
    path: PathBuf,
}

impl ConfigManager {
    pub fn with_base_dir(base: PathBuf) -> Result<Self, LedgerError> {
        ensure_dir(&base)?;
        ensure_dir(&PathResolver::config_dir_in(&base))?;
        Ok(Self {
            path: PathResolver::config_file_in(&base),
            base,
        })
    }

    pub fn load(&self) -> Result<Config, LedgerError> {
        if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            Ok(serde_json::from_str(&data)?)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self, config: &Config) -> Result<(), LedgerError> {
        if let Some(parent) = self.path.parent() {
            ensure_dir(parent)?;
        }
        let json = serde_json::to_string_pretty(config)?;
        let tmp = tmp_path(&self.path);
        let mut file = File::create(&tmp)?;
        file.write_all(json.as_bytes())?;
        file.flush()?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    pub fn base_dir(&self) -> &Path {
        &self.base
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
