use crate::{
    deploy::{self, DeployOptions, DeployReport, FileRedirects},
    error::Result,
    game::{Game, GameCatalog},
    instance::Instance,
    modorganizer::{Mo2InstanceInfo, ModOrganizer},
    mods::{Mod, ModId},
    progress::ProgressCallback,
    tool::Tool,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mod_manager")]
pub enum InstanceInfo {
    #[serde(rename = "Mod Organizer 2")]
    ModOrganizer(Mo2InstanceInfo),
}

impl InstanceInfo {
    pub fn display_name(&self) -> &str {
        match self {
            InstanceInfo::ModOrganizer(info) => &info.display_name,
        }
    }

    pub fn game_id(&self) -> &str {
        match self {
            InstanceInfo::ModOrganizer(info) => &info.game,
        }
    }
}

impl From<Mo2InstanceInfo> for InstanceInfo {
    fn from(info: Mo2InstanceInfo) -> Self {
        InstanceInfo::ModOrganizer(info)
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    pub file_blacklist: Vec<String>,
    pub game_folder: Option<PathBuf>,
}

#[derive(Clone, Copy, Default)]
pub struct TransferOptions<'a> {
    pub deploy: DeployOptions,
    pub blacklist: &'a [String],
    pub progress: Option<&'a ProgressCallback>,
}

#[derive(Debug, Clone)]
pub enum ModManager {
    ModOrganizer(ModOrganizer),
}

impl ModManager {
    pub fn for_instance(info: &InstanceInfo, catalog: &GameCatalog) -> Self {
        match info {
            InstanceInfo::ModOrganizer(_) => {
                ModManager::ModOrganizer(ModOrganizer::detect(catalog.clone()))
            }
        }
    }

    pub fn id(&self) -> &'static str {
        match self {
            ModManager::ModOrganizer(_) => ModOrganizer::ID,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ModManager::ModOrganizer(_) => ModOrganizer::DISPLAY_NAME,
        }
    }

    pub fn catalog(&self) -> &GameCatalog {
        match self {
            ModManager::ModOrganizer(mo2) => mo2.catalog(),
        }
    }

    pub fn instance_names(&self, game: &Game) -> Result<Vec<String>> {
        match self {
            ModManager::ModOrganizer(mo2) => mo2.instance_names(game),
        }
    }

    pub fn load_instance(
        &self,
        info: &InstanceInfo,
        options: &LoadOptions,
        progress: Option<&ProgressCallback>,
    ) -> Result<Instance> {
        match (self, info) {
            (ModManager::ModOrganizer(mo2), InstanceInfo::ModOrganizer(info)) => {
                mo2.load_instance(info, options, progress)
            }
        }
    }

    pub fn create_instance(
        &self,
        info: &InstanceInfo,
        game_folder: &Path,
        progress: Option<&ProgressCallback>,
    ) -> Result<Instance> {
        match (self, info) {
            (ModManager::ModOrganizer(mo2), InstanceInfo::ModOrganizer(info)) => {
                mo2.create_instance(info, game_folder, progress)
            }
        }
    }

    pub fn install_mod(
        &self,
        source: &Instance,
        mod_id: ModId,
        dest: &mut Instance,
        info: &InstanceInfo,
        redirects: &FileRedirects,
        transfer: TransferOptions<'_>,
    ) -> Result<DeployReport> {
        match (self, info) {
            (ModManager::ModOrganizer(mo2), InstanceInfo::ModOrganizer(info)) => {
                mo2.install_mod(source, mod_id, dest, info, redirects, transfer)
            }
        }
    }

    pub fn add_tool(
        &self,
        tool: &Tool,
        source: &Instance,
        dest: &mut Instance,
        info: &InstanceInfo,
    ) -> Result<bool> {
        match (self, info) {
            (ModManager::ModOrganizer(mo2), InstanceInfo::ModOrganizer(info)) => {
                mo2.add_tool(tool, source, dest, info)
            }
        }
    }

    pub fn finalize_instance(
        &self,
        instance: &Instance,
        info: &InstanceInfo,
        activate_instance: bool,
    ) -> Result<()> {
        match (self, info) {
            (ModManager::ModOrganizer(mo2), InstanceInfo::ModOrganizer(info)) => {
                mo2.finalize_instance(instance, info, activate_instance)
            }
        }
    }

    pub fn actual_files(&self, mod_entry: &Mod) -> FileRedirects {
        match self {
            ModManager::ModOrganizer(_) => ModOrganizer::actual_files(mod_entry),
        }
    }

    pub fn is_instance_existing(&self, info: &InstanceInfo) -> bool {
        match (self, info) {
            (ModManager::ModOrganizer(mo2), InstanceInfo::ModOrganizer(info)) => {
                mo2.is_instance_existing(info)
            }
        }
    }

    fn instance_ini_dir(&self, info: &InstanceInfo) -> PathBuf {
        match info {
            InstanceInfo::ModOrganizer(info) => ModOrganizer::instance_ini_dir(info),
        }
    }

    fn additional_files_folder(&self, info: &InstanceInfo) -> PathBuf {
        match info {
            InstanceInfo::ModOrganizer(info) => ModOrganizer::additional_files_folder(info),
        }
    }

    pub fn ini_dir(&self, info: &InstanceInfo, separate_ini_files: bool) -> Result<PathBuf> {
        if separate_ini_files {
            return Ok(self.instance_ini_dir(info));
        }
        Ok(self.catalog().by_id(info.game_id())?.inidir.clone())
    }

    pub fn ini_files(&self, instance: &Instance, info: &InstanceInfo) -> Result<Vec<PathBuf>> {
        let game = self.catalog().by_id(info.game_id())?;
        let ini_dir = self.ini_dir(info, instance.separate_ini_files)?;
        Ok(game.inifiles.iter().map(|file| ini_dir.join(file)).collect())
    }

    pub fn import_ini_files(
        &self,
        files: &[PathBuf],
        dest: &InstanceInfo,
        separate_ini_files: bool,
        transfer: TransferOptions<'_>,
    ) -> Result<DeployReport> {
        let dest_folder = self.ini_dir(dest, separate_ini_files)?;
        deploy::import_files(files, &dest_folder, transfer.deploy, transfer.progress)
    }

    pub fn additional_files(&self, info: &InstanceInfo) -> Result<Vec<PathBuf>> {
        let game = self.catalog().by_id(info.game_id())?;
        let folder = self.additional_files_folder(info);
        Ok(game
            .additional_files
            .iter()
            .map(|name| folder.join(name))
            .filter(|path| path.is_file())
            .collect())
    }

    pub fn import_additional_files(
        &self,
        files: &[PathBuf],
        dest: &InstanceInfo,
        transfer: TransferOptions<'_>,
    ) -> Result<DeployReport> {
        let dest_folder = self.additional_files_folder(dest);
        deploy::import_files(files, &dest_folder, transfer.deploy, transfer.progress)
    }
}
