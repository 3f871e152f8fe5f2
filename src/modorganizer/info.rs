use super::ini::MO2_INI;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_PROFILE: &str = "Default";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mo2InstanceInfo {
    pub display_name: String,
    pub game: String,
    pub profile: String,
    pub is_global: bool,
    pub base_folder: PathBuf,
    pub mods_folder: PathBuf,
    pub profiles_folder: PathBuf,
    #[serde(default = "default_true", skip_serializing)]
    pub use_root_builder: bool,
}

impl Mo2InstanceInfo {
    pub fn portable(
        display_name: impl Into<String>,
        game: impl Into<String>,
        base_folder: impl Into<PathBuf>,
    ) -> Self {
        let base_folder = base_folder.into();
        Self {
            display_name: display_name.into(),
            game: game.into(),
            profile: DEFAULT_PROFILE.to_string(),
            is_global: false,
            mods_folder: base_folder.join("mods"),
            profiles_folder: base_folder.join("profiles"),
            base_folder,
            use_root_builder: true,
        }
    }

    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = profile.into();
        self
    }

    pub fn ini_path(&self) -> PathBuf {
        self.base_folder.join(MO2_INI)
    }

    pub fn profile_folder(&self) -> PathBuf {
        self.profiles_folder.join(&self.profile)
    }

    pub fn modlist_path(&self) -> PathBuf {
        self.profile_folder().join("modlist.txt")
    }

    pub fn settings_path(&self) -> PathBuf {
        self.profile_folder().join("settings.ini")
    }

    pub fn is_inside(&self, root: &Path) -> bool {
        self.ini_path().starts_with(root)
    }

    pub fn label(&self) -> String {
        format!("{} > {}", self.display_name, self.profile)
    }
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn portable_layout() {
        let info = Mo2InstanceInfo::portable("Nolvus", "skyrimse", "/mo2/nolvus").with_profile("Main");
        assert_eq!(info.modlist_path(), PathBuf::from("/mo2/nolvus/profiles/Main/modlist.txt"));
        assert_eq!(info.ini_path(), PathBuf::from("/mo2/nolvus/ModOrganizer.ini"));
        assert_eq!(info.label(), "Nolvus > Main");
    }

    #[test]
    fn root_builder_flag_is_not_serialized() {
        let mut info = Mo2InstanceInfo::portable("Nolvus", "skyrimse", "/mo2/nolvus");
        info.use_root_builder = false;
        let raw = serde_json::to_string(&info).unwrap();
        assert!(!raw.contains("use_root_builder"));
        let back: Mo2InstanceInfo = serde_json::from_str(&raw).unwrap();
        assert!(back.use_root_builder);
    }
}
