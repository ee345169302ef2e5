use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::analytics::AnalysisPeriod;
use crate::currency::{self, DEFAULT_CURRENCY};
use crate::errors::FinanceError;
use crate::utils::{
    backups::{backup_file_name, backup_path, list_backups},
    paths::{ensure_dir, write_atomic, PathResolver},
};

const BACKUP_PREFIX: &str = "config";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub base_currency: String,
    pub locale: String,
    pub analytics_period: AnalysisPeriod,
    pub sankey_canvas_height: f64,
    pub fx_cache_ttl_minutes: i64,
    pub backup_retention: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_currency: DEFAULT_CURRENCY.into(),
            locale: "en-US".into(),
            analytics_period: AnalysisPeriod::Last30Days,
            sankey_canvas_height: 600.0,
            fx_cache_ttl_minutes: 60,
            backup_retention: 5,
        }
    }
}

impl Config {
    pub const KEYS: [&'static str; 6] = [
        "base_currency",
        "locale",
        "analytics_period",
        "sankey_canvas_height",
        "fx_cache_ttl_minutes",
        "backup_retention",
    ];

    /// Updates one field from its textual form, validating the value.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), FinanceError> {
        let value = value.trim();
        let invalid = |what: &str| FinanceError::Config(format!("invalid {what} `{value}`"));
        match key {
            "base_currency" => {
                let code = value.to_uppercase();
                if !currency::is_supported(&code) {
                    return Err(invalid("currency"));
                }
                self.base_currency = code;
            }
            "locale" => {
                if value.is_empty() {
                    return Err(invalid("locale"));
                }
                self.locale = value.to_string();
            }
            "analytics_period" => {
                self.analytics_period = value.parse().map_err(|_| invalid("period"))?;
            }
            "sankey_canvas_height" => {
                let height: f64 = value.parse().map_err(|_| invalid("canvas height"))?;
                if !(height.is_finite() && height > 0.0) {
                    return Err(invalid("canvas height"));
                }
                self.sankey_canvas_height = height;
            }
            "fx_cache_ttl_minutes" => {
                let ttl: i64 = value.parse().map_err(|_| invalid("cache ttl"))?;
                if ttl < 0 {
                    return Err(invalid("cache ttl"));
                }
                self.fx_cache_ttl_minutes = ttl;
            }
            "backup_retention" => {
                self.backup_retention = value.parse().map_err(|_| invalid("retention"))?;
            }
            other => {
                return Err(FinanceError::Config(format!("unknown setting `{other}`")));
            }
        }
        Ok(())
    }

    pub fn entries(&self) -> Vec<(&'static str, String)> {
        vec![
            ("base_currency", self.base_currency.clone()),
            ("locale", self.locale.clone()),
            ("analytics_period", self.analytics_period.code().to_string()),
            ("sankey_canvas_height", self.sankey_canvas_height.to_string()),
            ("fx_cache_ttl_minutes", self.fx_cache_ttl_minutes.to_string()),
            ("backup_retention", self.backup_retention.to_string()),
        ]
    }
}

pub struct ConfigManager {
    path: PathBuf,
    backups_dir: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self, FinanceError> {
        Self::with_base_dir(PathResolver::base_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self, FinanceError> {
        ensure_dir(&base)?;
        let backups_dir = PathResolver::config_backup_dir_in(&base);
        ensure_dir(&backups_dir)?;
        Ok(Self {
            path: PathResolver::config_file_in(&base),
            backups_dir,
        })
    }

    /// Missing file yields defaults; an unreadable one is reported and replaced by defaults.
    pub fn load(&self) -> Result<Config, FinanceError> {
        if !self.path.exists() {
            return Ok(Config::default());
        }
        let data = fs::read_to_string(&self.path)?;
        match serde_json::from_str(&data) {
            Ok(config) => Ok(config),
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "config unreadable, using defaults");
                Ok(Config::default())
            }
        }
    }

    pub fn save(&self, config: &Config) -> Result<(), FinanceError> {
        let json = serde_json::to_string_pretty(config)?;
        write_atomic(&self.path, &json)?;
        info!(path = %self.path.display(), "configuration saved");
        Ok(())
    }

    pub fn backup(&self, config: &Config, note: Option<&str>) -> Result<String, FinanceError> {
        ensure_dir(&self.backups_dir)?;
        let name = backup_file_name(BACKUP_PREFIX, note, Utc::now());
        let json = serde_json::to_string_pretty(config)?;
        write_atomic(&self.backups_dir.join(&name), &json)?;
        Ok(name)
    }

    pub fn restore(&self, backup_name: &str) -> Result<Config, FinanceError> {
        let path = backup_path(&self.backups_dir, backup_name)?;
        let data = fs::read_to_string(&path)?;
        let config: Config = serde_json::from_str(&data)?;
        self.save(&config)?;
        Ok(config)
    }

    pub fn list_backups(&self) -> Result<Vec<String>, FinanceError> {
        list_backups(&self.backups_dir, &[BACKUP_PREFIX])
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
