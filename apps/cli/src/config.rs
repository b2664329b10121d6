use std::fs;
use std::path::{Path, PathBuf};

use analytics::AnalyticsConfig;
use serde::{Deserialize, Serialize};
use youknow_app::PipelineConfig;
use youknow_db::StorageBackend;

use crate::dirs;

const CONFIG_FILE_NAME: &str = "config.toml";
const DEFAULT_PORT: u16 = 3846;

/// Contents of `config.toml`. Missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub port: u16,
    /// History file to read; `~/` is expanded. Browser profiles are searched when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history_path: Option<String>,
    pub interval_secs: u64,
    pub retention_days: u32,
    pub windows_days: Vec<u32>,
    pub storage: StorageBackend,
    pub refresh_debounce_secs: u64,
    pub analytics: AnalyticsConfig,
}

impl Default for CliConfig {
    fn default() -> Self {
        let pipeline = PipelineConfig::default();
        Self {
            port: DEFAULT_PORT,
            history_path: None,
            interval_secs: pipeline.interval_secs,
            retention_days: pipeline.retention_days,
            windows_days: pipeline.windows_days,
            storage: pipeline.storage,
            refresh_debounce_secs: pipeline.refresh_debounce_secs,
            analytics: pipeline.analytics,
        }
    }
}

impl CliConfig {
    pub fn pipeline(&self) -> PipelineConfig {
        PipelineConfig {
            interval_secs: self.interval_secs,
            retention_days: self.retention_days,
            windows_days: self.windows_days.clone(),
            storage: self.storage,
            refresh_debounce_secs: self.refresh_debounce_secs,
            analytics: self.analytics.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigPaths {
    pub file: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: CliConfig,
    pub paths: ConfigPaths,
    pub created: bool,
}

pub fn load_or_create() -> Result<ConfigLoad, String> {
    load_or_create_in(&dirs::config_dir()?)
}

fn load_or_create_in(dir: &Path) -> Result<ConfigLoad, String> {
    fs::create_dir_all(dir)
        .map_err(|err| format!("create config dir {}: {}", dir.display(), err))?;
    let file = dir.join(CONFIG_FILE_NAME);
    let paths = ConfigPaths { file };

    if paths.file.exists() {
        let contents = fs::read_to_string(&paths.file)
            .map_err(|err| format!("read config {}: {}", paths.file.display(), err))?;
        let config: CliConfig = toml::from_str(&contents)
            .map_err(|err| format!("parse config {}: {}", paths.file.display(), err))?;
        return Ok(ConfigLoad {
            config,
            paths,
            created: false,
        });
    }

    let config = CliConfig::default();
    let contents =
        toml::to_string_pretty(&config).map_err(|err| format!("serialize config: {}", err))?;
    fs::write(&paths.file, contents)
        .map_err(|err| format!("write config {}: {}", paths.file.display(), err))?;

    Ok(ConfigLoad {
        config,
        paths,
        created: true,
    })
}
