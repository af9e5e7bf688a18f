//! User configuration
//!
//! Layered: platform config dir (`vsm/config.yaml`), then `.vsm.yaml` in the
//! working directory, then `VSM_*` environment variables. Later layers win.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::yaml::parse_yaml_file;

/// Default shift length in hours
pub const DEFAULT_AVAILABLE_HOURS: f64 = 8.0;

/// Default number of wastes kept per step for map annotations
pub const DEFAULT_TOP_WASTES: usize = 2;

/// Name of the per-directory config file
pub const LOCAL_CONFIG: &str = ".vsm.yaml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Rule book to use instead of the embedded one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules: Option<PathBuf>,

    /// Available time per shift in hours
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_hours: Option<f64>,

    /// Wastes kept per step for map annotations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_wastes: Option<usize>,
}

impl Config {
    /// Load configuration from all layers. Unreadable layers are skipped.
    pub fn load() -> Self {
        let mut config = Config::default();

        if let Some(dirs) = ProjectDirs::from("", "", "vsm") {
            config.merge_file(&dirs.config_dir().join("config.yaml"));
        }
        config.merge_file(Path::new(LOCAL_CONFIG));
        config.merge_env(|key| std::env::var(key).ok());

        config
    }

    fn merge_file(&mut self, path: &Path) {
        if !path.exists() {
            return;
        }
        match parse_yaml_file::<Config>(path) {
            Ok(layer) => self.merge(layer),
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable config"),
        }
    }

    /// Overlay another layer on top of this one
    pub fn merge(&mut self, other: Config) {
        if other.rules.is_some() {
            self.rules = other.rules;
        }
        if other.available_hours.is_some() {
            self.available_hours = other.available_hours;
        }
        if other.top_wastes.is_some() {
            self.top_wastes = other.top_wastes;
        }
    }

    /// Apply `VSM_RULES` and `VSM_AVAILABLE_HOURS`
    pub fn merge_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(rules) = var("VSM_RULES").filter(|v| !v.is_empty()) {
            self.rules = Some(PathBuf::from(rules));
        }
        if let Some(hours) = var("VSM_AVAILABLE_HOURS") {
            match hours.trim().parse::<f64>() {
                Ok(h) => self.available_hours = Some(h),
                Err(_) => tracing::warn!(value = %hours, "ignoring invalid VSM_AVAILABLE_HOURS"),
            }
        }
    }

    pub fn available_hours(&self) -> f64 {
        self.available_hours.unwrap_or(DEFAULT_AVAILABLE_HOURS)
    }

    pub fn top_wastes(&self) -> usize {
        self.top_wastes.unwrap_or(DEFAULT_TOP_WASTES)
    }
}
