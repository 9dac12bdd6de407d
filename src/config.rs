use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::bounce::BounceConfig;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// animation frames per second
    pub fps: u32,
    /// label speed range, in cells per frame
    pub min_speed: f64,
    pub max_speed: f64,
    /// SQLite file holding the duration log; defaults to the state dir
    pub db_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        let bounce = BounceConfig::terminal();
        Self {
            fps: 30,
            min_speed: bounce.min_speed,
            max_speed: bounce.max_speed,
            db_path: None,
        }
    }
}

impl Config {
    pub fn bounce_config(&self) -> BounceConfig {
        BounceConfig::terminal().with_speed(self.min_speed, self.max_speed)
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "bouncetime") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("bouncetime_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        if let Ok(bytes) = fs::read(&self.path) {
            match serde_json::from_slice::<Config>(&bytes) {
                Ok(cfg) => return cfg,
                Err(e) => log::warn!("Ignoring malformed config {}: {e}", self.path.display()),
            }
        }
        Config::default()
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg).unwrap_or_default();
        fs::write(&self.path, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn roundtrip_default_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = Config::default();
        store.save(&cfg).unwrap();
        let loaded = store.load();
        assert_eq!(cfg, loaded);
    }

    #[test]
    fn save_and_load_custom_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = Config {
            fps: 60,
            min_speed: 0.25,
            max_speed: 1.0,
            db_path: Some(dir.path().join("log.db")),
        };
        store.save(&cfg).unwrap();
        assert_eq!(store.load(), cfg);
    }

    #[test]
    fn missing_or_malformed_falls_back_to_default() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);
        assert_eq!(store.load(), Config::default());

        fs::write(&path, "{ nope").unwrap();
        assert_eq!(store.load(), Config::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"fps": 12}"#).unwrap();

        let cfg = FileConfigStore::with_path(&path).load();
        assert_eq!(cfg.fps, 12);
        assert_eq!(cfg.min_speed, Config::default().min_speed);
        assert_eq!(cfg.db_path, None);
    }

    #[test]
    fn bounce_config_uses_speed_range() {
        let cfg = Config {
            min_speed: 2.0,
            max_speed: 1.0,
            ..Config::default()
        };
        let bounce = cfg.bounce_config();
        assert_eq!(bounce.min_speed, 1.0);
        assert_eq!(bounce.max_speed, 2.0);
        assert_eq!(bounce.bottom_margin, BounceConfig::terminal().bottom_margin);
    }
}
