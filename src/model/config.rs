use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration from config.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlannerConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Where the local store lives (default: `$XDG_DATA_HOME/planner`)
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Directory holding the per-user remote documents
    #[serde(default)]
    pub remote_dir: Option<PathBuf>,
    /// Quiet period before a burst of edits is pushed
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            enabled: false,
            remote_dir: None,
            debounce_ms: default_debounce_ms(),
            user_id: None,
            display_name: None,
        }
    }
}

fn default_debounce_ms() -> u64 {
    400
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Width in terminal cells of one day column in `pm week`
    #[serde(default = "default_day_width")]
    pub day_width: usize,
}

impl Default for UiConfig {
    fn default() -> Self {
        UiConfig {
            day_width: default_day_width(),
        }
    }
}

fn default_day_width() -> usize {
    12
}
