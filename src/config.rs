use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use camino::Utf8PathBuf;
use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::Metric;
use crate::error::PanelError;
use crate::source::DEFAULT_BASE_URL;

pub const CONFIG_FILE_NAME: &str = "covid-panel.json";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_RETRIES: usize = 3;

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub source_dir: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub max_retries: Option<usize>,
    #[serde(default)]
    pub metrics: Option<Vec<String>>,
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub base_url: String,
    pub source_dir: Option<Utf8PathBuf>,
    pub timeout: Duration,
    pub max_retries: usize,
    pub metrics: Vec<Metric>,
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn resolve(path: Option<&str>) -> Result<ResolvedConfig, PanelError> {
        let config_path = match path {
            Some(path) => Some(PathBuf::from(path)),
            None => Self::discover(),
        };

        let config = match config_path {
            Some(config_path) => {
                debug!(path = %config_path.display(), "reading config");
                let content = fs::read_to_string(&config_path)
                    .map_err(|_| PanelError::ConfigRead(config_path.clone()))?;
                serde_json::from_str::<Config>(&content)
                    .map_err(|err| PanelError::ConfigParse(err.to_string()))?
            }
            None => Config::default(),
        };

        Self::resolve_config(config)
    }

    fn discover() -> Option<PathBuf> {
        let local = PathBuf::from(CONFIG_FILE_NAME);
        if local.exists() {
            return Some(local);
        }
        BaseDirs::new()
            .map(|dirs| {
                dirs.config_dir()
                    .join("covid-panel")
                    .join(CONFIG_FILE_NAME)
            })
            .filter(|path| path.exists())
    }

    pub fn resolve_config(config: Config) -> Result<ResolvedConfig, PanelError> {
        let base_url = config
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        if !(base_url.starts_with("https://") || base_url.starts_with("http://")) {
            return Err(PanelError::ConfigValue(format!(
                "base_url must be an http(s) URL: {base_url}"
            )));
        }

        let timeout_secs = config.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(PanelError::ConfigValue(
                "timeout_secs must be positive".to_string(),
            ));
        }

        let metrics = match config.metrics {
            Some(values) => values
                .iter()
                .map(|value| value.parse())
                .collect::<Result<Vec<Metric>, PanelError>>()?,
            None => Metric::ALL.to_vec(),
        };

        Ok(ResolvedConfig {
            base_url,
            source_dir: config.source_dir.map(Utf8PathBuf::from),
            timeout: Duration::from_secs(timeout_secs),
            max_retries: config.max_retries.unwrap_or(DEFAULT_MAX_RETRIES),
            metrics,
        })
    }
}
