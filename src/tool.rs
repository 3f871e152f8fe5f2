use crate::{instance::Instance, mods::ModId};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct Tool {
    pub display_name: String,
    pub owner: Option<ModId>,
    /// Relative to the owning mod, to the game folder when `is_in_game_dir`
    /// is set, otherwise absolute.
    pub executable: PathBuf,
    pub commandline_args: Vec<String>,
    pub working_dir: Option<PathBuf>,
    pub is_in_game_dir: bool,
}

impl PartialEq for Tool {
    fn eq(&self, other: &Self) -> bool {
        self.display_name == other.display_name
            && self.executable == other.executable
            && self.commandline_args == other.commandline_args
    }
}

impl Eq for Tool {}

impl Tool {
    pub fn full_executable_path(&self, instance: &Instance, game_folder: &Path) -> PathBuf {
        if let Some(owner) = self.owner.and_then(|id| instance.get(id)) {
            return owner.path.join(&self.executable);
        }
        if self.is_in_game_dir {
            return game_folder.join(&self.executable);
        }
        self.executable.clone()
    }
}
