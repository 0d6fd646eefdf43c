use crate::error::{Result, TrackerError};
use event_tracker_common::DEFAULT_TOP_LOCATIONS;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// イベントCSV
    pub data_path: PathBuf,
    /// ブックマークCSV
    pub bookmark_path: PathBuf,
    /// 場所グラフの表示件数
    pub top_locations: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("events.csv"),
            bookmark_path: PathBuf::from("bookmarks.csv"),
            top_locations: DEFAULT_TOP_LOCATIONS,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            tracing::debug!(path = %config_path.display(), "config loaded");
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| TrackerError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("event-tracker").join("config.json"))
    }

    /// コマンドライン指定で上書き
    pub fn with_overrides(mut self, data: Option<PathBuf>, bookmarks: Option<PathBuf>) -> Self {
        if let Some(path) = data {
            self.data_path = path;
        }
        if let Some(path) = bookmarks {
            self.bookmark_path = path;
        }
        self
    }

    pub fn set_top_locations(&mut self, top: usize) -> Result<()> {
        if top == 0 {
            return Err(TrackerError::Config("表示件数は1以上を指定してください".into()));
        }
        self.top_locations = top;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.data_path, PathBuf::from("events.csv"));
        assert_eq!(config.bookmark_path, PathBuf::from("bookmarks.csv"));
        assert_eq!(config.top_locations, 10);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{"data_path": "my.csv"}"#).unwrap();
        assert_eq!(config.data_path, PathBuf::from("my.csv"));
        assert_eq!(config.bookmark_path, PathBuf::from("bookmarks.csv"));
    }

    #[test]
    fn test_overrides() {
        let config = Config::default().with_overrides(Some("a.csv".into()), None);
        assert_eq!(config.data_path, PathBuf::from("a.csv"));
        assert_eq!(config.bookmark_path, PathBuf::from("bookmarks.csv"));
    }

    #[test]
    fn test_set_top_locations_rejects_zero() {
        let mut config = Config::default();
        assert!(config.set_top_locations(0).is_err());
        config.set_top_locations(5).unwrap();
        assert_eq!(config.top_locations, 5);
    }
}
