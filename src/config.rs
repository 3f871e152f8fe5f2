use anyhow::{Context, Result};
use directories::BaseDirs;
use modshift::{deploy::DeployOptions, migrate::MigrationOptions};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_true")]
    pub use_hardlinks: bool,
    #[serde(default)]
    pub replace: bool,
    #[serde(default)]
    pub file_blacklist: Vec<String>,
    #[serde(default)]
    pub activate_instance: bool,
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            use_hardlinks: true,
            replace: false,
            file_blacklist: Vec::new(),
            activate_instance: false,
            catalog_path: None,
        }
    }
}

impl AppConfig {
    pub fn load_or_create() -> Result<Self> {
        let path = config_path()?;
        if path.exists() {
            let raw = fs::read_to_string(&path).context("read app config")?;
            let mut config: AppConfig = serde_json::from_str(&raw).context("parse app config")?;
            config.file_blacklist = config
                .file_blacklist
                .iter()
                .map(|name| name.to_lowercase())
                .collect();
            return Ok(config);
        }

        let config = AppConfig::default();
        config.save()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let path = config_path()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("create app data dir")?;
        }
        let raw = serde_json::to_string_pretty(self).context("serialize app config")?;
        fs::write(path, raw).context("write app config")?;
        Ok(())
    }

    pub fn migration_options(&self) -> MigrationOptions {
        MigrationOptions {
            deploy: DeployOptions {
                use_hardlinks: self.use_hardlinks,
                replace: self.replace,
            },
            file_blacklist: self.file_blacklist.clone(),
            activate_instance: self.activate_instance,
            game_folder: None,
        }
    }
}

fn default_true() -> bool {
    true
}

pub fn config_path() -> Result<PathBuf> {
    let base = BaseDirs::new().context("resolve home dir")?;
    Ok(base.data_local_dir().join("modshift").join("config.json"))
}
