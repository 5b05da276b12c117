use crate::scoring::ScoringConfig;
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

pub trait ConfigStore {
    fn load(&self) -> ScoringConfig;
    fn save(&self, cfg: &ScoringConfig) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "hanmeter") {
            pd.config_dir().join("scoring.json")
        } else {
            PathBuf::from("hanmeter_scoring.json")
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
    fn load(&self) -> ScoringConfig {
        if let Ok(bytes) = fs::read(&self.path) {
            if let Ok(cfg) = serde_json::from_slice::<ScoringConfig>(&bytes) {
                return cfg;
            }
        }
        ScoringConfig::default()
    }

    fn save(&self, cfg: &ScoringConfig) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg).unwrap_or_default();
        fs::write(&self.path, data)
    }
}
