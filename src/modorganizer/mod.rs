//! Mod Organizer 2 support: instance discovery, loading, creation and
//! deployment into MO2's per-mod folder layout.

pub mod args;
pub mod ini;
mod info;
pub mod modlist;

pub use info::{Mo2InstanceInfo, DEFAULT_PROFILE};
pub use self::ini::{Layout, MO2_INI};

use crate::{
    conflicts::{self, unique},
    deploy::{self, DeployReport, FileRedirects},
    error::{Error, IoContext, Result},
    game::{Game, GameCatalog},
    instance::Instance,
    manager::{LoadOptions, TransferOptions},
    metadata::{normalize_version, Metadata},
    mods::{DeployPath, Mod, ModId, ModKind},
    paths,
    progress::{self, ProgressCallback, ProgressUpdate},
    tool::Tool,
};
use ::ini::Ini;
use self::modlist::{ModlistEntry, SEPARATOR_SUFFIX};
use std::{
    collections::{BTreeMap, HashSet},
    fs::{self, OpenOptions},
    path::{Path, PathBuf},
};
use tracing::{debug, error, info, warn};

/// Suffix MO2 appends to files overridden by another mod.
pub const HIDDEN_SUFFIX: &str = ".mohidden";
pub const FILE_BLACKLIST: &[&str] = &["meta.ini"];
pub const EXE_BLACKLIST: &[&str] = &["Explorer++.exe"];

const ROOT_FOLDER: &str = "Root";
const OVERWRITE_NAME: &str = "Overwrite";
const META_INI: &str = "meta.ini";

/// Catalog short name -> name MO2 writes into `meta.ini`.
const SHORT_NAME_OVERRIDES: &[(&str, &str)] = &[("EnderalSpecialEdition", "EnderalSE")];

#[derive(Debug, Clone)]
pub struct ModOrganizer {
    catalog: GameCatalog,
    global_root: Option<PathBuf>,
}

impl ModOrganizer {
    pub const ID: &'static str = "modorganizer";
    pub const DISPLAY_NAME: &'static str = "Mod Organizer 2";

    pub fn new(catalog: GameCatalog, global_root: Option<PathBuf>) -> Self {
        Self {
            catalog,
            global_root,
        }
    }

    pub fn detect(catalog: GameCatalog) -> Self {
        let global_root = paths::local_app_data_dir().map(|dir| dir.join("ModOrganizer"));
        Self::new(catalog, global_root)
    }

    pub fn catalog(&self) -> &GameCatalog {
        &self.catalog
    }

    pub fn global_root(&self) -> Option<&Path> {
        self.global_root.as_deref()
    }

    pub fn instance_names(&self, game: &Game) -> Result<Vec<String>> {
        let Some(root) = self.global_root.as_deref().filter(|root| root.is_dir()) else {
            return Ok(Vec::new());
        };
        info!("Getting global MO2 instances for {}...", game.id);

        let mut names = Vec::new();
        for entry in fs::read_dir(root).at("list instances", root)? {
            let entry = entry.at("list instances", root)?;
            let ini_path = entry.path().join(MO2_INI);
            if !ini_path.is_file() {
                continue;
            }
            let mo2_ini = match ini::load(&ini_path) {
                Ok(mo2_ini) => mo2_ini,
                Err(err) => {
                    warn!("Skipped unreadable instance: {err}");
                    continue;
                }
            };
            let instance_game = ini::get(&mo2_ini, "General", "gameName").unwrap_or_default();
            if instance_game.eq_ignore_ascii_case(&game.display_name) {
                names.push(entry.file_name().to_string_lossy().to_string());
            }
        }
        names.sort();

        info!("Got {} instance(s).", names.len());
        Ok(names)
    }

    pub fn has_global_instances(&self) -> bool {
        let Some(root) = self.global_root.as_deref() else {
            return false;
        };
        let found = fs::read_dir(root)
            .map(|entries| {
                entries
                    .filter_map(|entry| entry.ok())
                    .any(|entry| entry.path().join(MO2_INI).is_file())
            })
            .unwrap_or(false);
        info!("Global instances found: {found}");
        found
    }

    pub fn existing_instance(
        &self,
        base_folder: &Path,
        game: &str,
        profile: &str,
    ) -> Result<Mo2InstanceInfo> {
        let ini_path = base_folder.join(MO2_INI);
        if !ini_path.is_file() {
            return Err(Error::InstanceNotFound(format!(
                "{} > {profile}",
                base_folder.display()
            )));
        }
        let layout = Layout::read(&ini_path)?;
        let display_name = base_folder
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| base_folder.display().to_string());
        let is_global = self
            .global_root
            .as_deref()
            .is_some_and(|root| base_folder.starts_with(root));

        Ok(Mo2InstanceInfo {
            display_name,
            game: game.to_string(),
            profile: profile.to_string(),
            is_global,
            base_folder: base_folder.to_path_buf(),
            mods_folder: layout.mods_dir,
            profiles_folder: layout.profiles_dir,
            use_root_builder: true,
        })
    }

    pub fn load_instance(
        &self,
        info: &Mo2InstanceInfo,
        options: &LoadOptions,
        progress: Option<&ProgressCallback>,
    ) -> Result<Instance> {
        let game = self.catalog.by_id(&info.game)?;
        let label = info.label();

        if info.is_global && !self.instance_names(game)?.contains(&info.display_name) {
            return Err(Error::InstanceNotFound(label));
        }
        let ini_path = info.ini_path();
        if !ini_path.is_file() {
            return Err(Error::InstanceNotFound(label));
        }

        let mo2_ini = ini::load(&ini_path)?;
        let game_folder = match ini::get(&mo2_ini, "General", "gamePath") {
            Some(raw) => paths::from_windows_str(&ini::unwrap_byte_array(raw)),
            None => options
                .game_folder
                .clone()
                .ok_or(Error::GameFolderNotFound)?,
        };

        info!(
            "Loading profile {:?} from instance {:?} at {:?}...",
            info.profile, info.display_name, info.base_folder
        );
        let layout = Layout::from_ini(&mo2_ini, &ini_path);
        let mut instance = Instance::new(label.as_str(), game_folder);
        instance.order_matters = true;

        self.load_mods(&mut instance, info, &layout, game, &options.file_blacklist, progress)?;
        progress::report(
            progress,
            ProgressUpdate::status(format!("Loading tools from {label}...")),
        )?;
        load_tools(&mut instance, &mo2_ini);
        load_profile_settings(&mut instance, &layout.profiles_dir.join(&info.profile));

        info!(
            "Loaded {label} with {} mod(s) and {} tool(s).",
            instance.len(),
            instance.tools().len()
        );
        Ok(instance)
    }

    fn load_mods(
        &self,
        instance: &mut Instance,
        info: &Mo2InstanceInfo,
        layout: &Layout,
        game: &Game,
        file_blacklist: &[String],
        progress: Option<&ProgressCallback>,
    ) -> Result<()> {
        let label = info.label();
        let modlist_path = layout.profiles_dir.join(&info.profile).join("modlist.txt");
        if !(layout.mods_dir.is_dir() && layout.profiles_dir.is_dir() && modlist_path.is_file()) {
            return Err(Error::InstanceNotFound(label));
        }

        let mut entries = modlist::read(&modlist_path)?;
        let unmanaged = unmanaged_folders(&layout.mods_dir, &entries)?;
        if !unmanaged.is_empty() {
            warn!("Found {} unmanaged mod(s):", unmanaged.len());
            for folder in &unmanaged {
                warn!(" - {folder}");
            }
        }
        entries.extend(unmanaged.into_iter().map(|folder| ModlistEntry {
            folder,
            enabled: false,
        }));

        for (position, entry) in entries.iter().enumerate() {
            progress::report(
                progress,
                ProgressUpdate::step(
                    format!("Loading mods from {label}: {}...", entry.folder),
                    position,
                    entries.len(),
                ),
            )?;

            let mut mod_path = layout.mods_dir.join(&entry.folder);
            let meta_path = mod_path.join(META_INI);
            let metadata = if meta_path.is_file() {
                self.parse_meta_ini(&meta_path, game)
            } else {
                warn!("No metadata available for {:?}!", entry.folder);
                Metadata::empty()
            };

            let mut deploy_path = None;
            if mod_path.join(ROOT_FOLDER).is_dir() {
                deploy_path = Some(DeployPath::InstanceRoot);
                mod_path.push(ROOT_FOLDER);
                debug!("Detected mod using Root Builder plugin: {}", entry.folder);
            }

            let mut mod_entry = Mod::new(entry.display_name(), mod_path, entry.kind());
            mod_entry.deploy_path = deploy_path;
            mod_entry.metadata = metadata;
            mod_entry.enabled = entry.enabled;
            mod_entry.files();
            instance.push_mod(mod_entry);
        }

        let overwrite_has_files = fs::read_dir(&layout.overwrite_dir)
            .map(|mut entries| entries.next().is_some())
            .unwrap_or(false);
        if overwrite_has_files {
            instance.push_mod(Mod::new(
                OVERWRITE_NAME,
                layout.overwrite_dir.clone(),
                ModKind::Overwrite,
            ));
        }

        progress::report(progress, ProgressUpdate::status("Processing mod conflicts..."))?;
        let mut blacklist = file_blacklist.to_vec();
        blacklist.extend(FILE_BLACKLIST.iter().map(|name| name.to_string()));
        conflicts::resolve_conflicts(instance, &blacklist, HIDDEN_SUFFIX);

        info!("Loaded {} mod(s) from {label}.", instance.len());
        Ok(())
    }

    pub fn parse_meta_ini(&self, path: &Path, default_game: &Game) -> Metadata {
        let mod_name = path
            .parent()
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();
        let mut metadata = Metadata::for_game(&default_game.nexus_id);

        let meta = match ini::load(path) {
            Ok(meta) => meta,
            Err(err) => {
                error!("Failed to parse meta.ini of {mod_name:?}: {err}");
                return metadata;
            }
        };
        let Some(general) = meta.section(Some("General")) else {
            warn!("Incomplete meta.ini in {mod_name:?}!");
            return metadata;
        };

        metadata.mod_id = parse_id(general.get("modid"));
        metadata.version = normalize_version(general.get("version").unwrap_or_default());
        metadata.file_name = general
            .get("installationFile")
            .and_then(|raw| raw.rsplit(|c| c == '/' || c == '\\').next())
            .filter(|name| !name.is_empty())
            .map(str::to_string);

        match general.get("gameName") {
            None => warn!("No game specified for {mod_name:?}!"),
            Some(game_name) => match self.catalog.by_short_name(catalog_short_name(game_name)) {
                Ok(game) => metadata.game_id = game.nexus_id.clone(),
                Err(_) => warn!("Unknown game for mod {mod_name:?}: {game_name}"),
            },
        }
        metadata.file_id = parse_id(ini::get(&meta, "installedFiles", "1\\fileid"));
        metadata
    }

    pub fn create_instance(
        &self,
        info: &Mo2InstanceInfo,
        game_folder: &Path,
        progress: Option<&ProgressCallback>,
    ) -> Result<Instance> {
        info!("Creating instance {:?}...", info.display_name);
        progress::report(
            progress,
            ProgressUpdate::status(format!("Creating instance {}...", info.display_name)),
        )?;

        let game = self.catalog.by_id(&info.game)?;
        let ini_path = info.ini_path();
        if info.is_global {
            let expected = self.global_root.clone().unwrap_or_default();
            if self.global_root.is_none() || !info.is_inside(&expected) {
                return Err(Error::InvalidGlobalInstancePath {
                    expected,
                    actual: ini_path,
                });
            }
        }

        let mut mo2_ini = Ini::new();
        mo2_ini
            .with_section(Some("General"))
            .set("gameName", game.display_name.as_str())
            .set("selected_profile", format!("@ByteArray({})", info.profile))
            .set("gamePath", paths::to_forward_slashes(game_folder))
            .set("first_start", "true");
        mo2_ini
            .with_section(Some("Settings"))
            .set("base_directory", paths::to_forward_slashes(&info.base_folder))
            .set("download_directory", "%BASE_DIR%/downloads")
            .set(
                "mod_directory",
                ini::base_relative(&info.mods_folder, &info.base_folder),
            )
            .set(
                "profiles_directory",
                ini::base_relative(&info.profiles_folder, &info.base_folder),
            )
            .set("overwrite_directory", "%BASE_DIR%/overwrite")
            .set("language", "en")
            .set("style", "Paper Dark.qss");
        ini::save(&mo2_ini, &ini_path)?;

        for folder in [
            info.mods_folder.clone(),
            info.profile_folder(),
            info.base_folder.join("downloads"),
            info.base_folder.join("overwrite"),
        ] {
            fs::create_dir_all(&folder).at("create dir", &folder)?;
        }
        let modlist_path = info.modlist_path();
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&modlist_path)
            .at("create modlist", &modlist_path)?;

        info!("Instance created successfully.");
        let mut instance = Instance::new(info.display_name.as_str(), game_folder.to_path_buf());
        instance.order_matters = true;
        Ok(instance)
    }

    pub fn install_mod(
        &self,
        source: &Instance,
        mod_id: ModId,
        dest: &mut Instance,
        info: &Mo2InstanceInfo,
        redirects: &FileRedirects,
        transfer: TransferOptions<'_>,
    ) -> Result<DeployReport> {
        let Some(mod_entry) = source.get(mod_id) else {
            debug!("Skipped removed mod {mod_id}.");
            return Ok(DeployReport::default());
        };
        info!("Installing mod {:?}...", mod_entry.display_name);

        self.install_mod_entry(source, mod_id, mod_entry, dest, info, redirects, transfer)
            .map_err(|err| match err {
                Error::Aborted => Error::Aborted,
                other => Error::InstallFailed {
                    mod_name: mod_entry.display_name.clone(),
                    source: Box::new(other),
                },
            })
    }

    #[allow(clippy::too_many_arguments)]
    fn install_mod_entry(
        &self,
        source: &Instance,
        mod_id: ModId,
        mod_entry: &Mod,
        dest: &mut Instance,
        info: &Mo2InstanceInfo,
        redirects: &FileRedirects,
        transfer: TransferOptions<'_>,
    ) -> Result<DeployReport> {
        let mut regular_deployment = true;
        let mod_folder = match mod_entry.kind {
            ModKind::Regular | ModKind::Separator => {
                let mut folder_name = mod_entry.display_name.clone();
                if mod_entry.kind == ModKind::Separator {
                    folder_name.push_str(SEPARATOR_SUFFIX);
                }
                let base = info.mods_folder.join(paths::clean_fs_string(&folder_name));
                let mod_folder = match &mod_entry.deploy_path {
                    Some(DeployPath::InstanceRoot) if info.use_root_builder => {
                        base.join(ROOT_FOLDER)
                    }
                    Some(DeployPath::InstanceRoot) => {
                        regular_deployment = false;
                        dest.game_folder.clone()
                    }
                    Some(DeployPath::Subdir(subdir)) => base.join(subdir),
                    None => base.clone(),
                };
                debug!("Deploy path: {:?}", mod_entry.deploy_path);
                debug!("Mod folder: {:?}", mod_folder);

                if regular_deployment && mod_folder.is_dir() {
                    warn!(
                        "Mod {:?} already exists! Merging files...",
                        mod_entry.display_name
                    );
                }
                fs::create_dir_all(&mod_folder).at("create mod folder", &mod_folder)?;
                if regular_deployment {
                    self.write_meta_ini(mod_entry, info, &base.join(META_INI))?;
                }
                mod_folder
            }
            ModKind::Overwrite => Layout::read(&info.ini_path())?.overwrite_dir,
        };

        let deployment = deploy::install_mod_files(
            mod_entry,
            &mod_folder,
            redirects,
            transfer.deploy,
            transfer.blacklist,
            transfer.progress,
        )?;
        let mut report = deployment.report.clone();

        for (relative, authoritative) in &mod_entry.file_conflicts {
            if *authoritative == mod_id {
                continue;
            }
            if !deployment.wrote(relative) {
                debug!("Left {:?} alone; it was not deployed by this run.", relative);
                continue;
            }
            if deploy::hide_file(&mod_folder, relative, HIDDEN_SUFFIX, transfer.deploy.replace)? {
                report.hidden += 1;
            }
        }

        let mod_conflicts: Vec<ModId> = mod_entry
            .mod_conflicts
            .iter()
            .filter_map(|id| dest.translate_id(source, *id))
            .collect();
        let file_conflicts: BTreeMap<PathBuf, ModId> = mod_entry
            .file_conflicts
            .iter()
            .filter_map(|(path, id)| dest.translate_id(source, *id).map(|id| (path.clone(), id)))
            .collect();

        if let Some(existing) = dest.installed_mod_mut(mod_entry) {
            existing.mod_conflicts.extend(mod_conflicts);
            existing.mod_conflicts = unique(&existing.mod_conflicts);
            existing.file_conflicts.extend(file_conflicts);
        } else if regular_deployment && mod_entry.kind != ModKind::Overwrite {
            let mut installed = mod_entry.relocated(mod_folder);
            installed.mod_conflicts = mod_conflicts;
            installed.file_conflicts = file_conflicts;
            dest.push_mod(installed);
        }

        Ok(report)
    }

    fn write_meta_ini(&self, mod_entry: &Mod, info: &Mo2InstanceInfo, path: &Path) -> Result<()> {
        let shipped = mod_entry
            .files()
            .iter()
            .find(|file| paths::slash_path(file).eq_ignore_ascii_case(META_INI));
        if let Some(shipped) = shipped {
            let source = mod_entry.path.join(shipped);
            fs::copy(&source, path).at("copy meta.ini", &source)?;
            info!("Copied original meta.ini from mod.");
            return Ok(());
        }

        let game = match self.catalog.by_nexus_id(&mod_entry.metadata.game_id) {
            Ok(game) => game,
            Err(_) => {
                warn!(
                    "Unsupported game {:?} for mod {:?}! Falling back to instance's default...",
                    mod_entry.metadata.game_id, mod_entry.display_name
                );
                self.catalog.by_id(&info.game)?
            }
        };
        let metadata = &mod_entry.metadata;
        let mod_id = metadata.mod_id.unwrap_or(0).to_string();

        let mut meta = Ini::new();
        meta.with_section(Some("General"))
            .set("gameName", meta_short_name(&game.short_name))
            .set("modid", mod_id.as_str())
            .set("version", metadata.version.as_str())
            .set(
                "installationFile",
                metadata.file_name.clone().unwrap_or_default(),
            );
        meta.with_section(Some("installedFiles"))
            .set("1\\modid", mod_id.as_str())
            .set("size", "1")
            .set("1\\fileid", metadata.file_id.unwrap_or(0).to_string());
        ini::save(&meta, path)
    }

    pub fn add_tool(
        &self,
        tool: &Tool,
        source: &Instance,
        dest: &mut Instance,
        info: &Mo2InstanceInfo,
    ) -> Result<bool> {
        let mut new_tool = tool.clone();
        if let Some(owner) = tool.owner.and_then(|id| source.get(id)) {
            match dest.installed_mod(owner) {
                Some((id, _)) => new_tool.owner = Some(id),
                None => {
                    // Keep pointing at the source copy of the executable.
                    new_tool.executable = tool.full_executable_path(source, &source.game_folder);
                    new_tool.owner = None;
                    new_tool.is_in_game_dir = false;
                }
            }
        } else {
            new_tool.owner = None;
        }
        if dest.has_tool(&new_tool) {
            return Ok(false);
        }
        info!("Adding tool {:?}...", tool.display_name);

        let ini_path = info.ini_path();
        let mut mo2_ini = ini::load(&ini_path)?;
        let size = ini::get(&mo2_ini, "customExecutables", "size")
            .and_then(|raw| raw.trim().parse::<usize>().ok())
            .unwrap_or(0);
        let index = size + 1;
        let binary = new_tool.full_executable_path(dest, &dest.game_folder);
        let working_dir = new_tool
            .working_dir
            .as_deref()
            .map(paths::to_forward_slashes)
            .unwrap_or_default();

        mo2_ini
            .with_section(Some("customExecutables"))
            .set(
                format!("{index}\\arguments"),
                args::join_arguments(&new_tool.commandline_args),
            )
            .set(format!("{index}\\binary"), paths::to_forward_slashes(&binary))
            .set(format!("{index}\\hide"), "false")
            .set(format!("{index}\\ownicon"), "false")
            .set(format!("{index}\\steamAppID"), "")
            .set(format!("{index}\\title"), new_tool.display_name.as_str())
            .set(format!("{index}\\toolbar"), "false")
            .set(format!("{index}\\workingDirectory"), working_dir)
            .set("size", index.to_string());
        ini::save(&mo2_ini, &ini_path)?;

        dest.add_tool(new_tool);
        Ok(true)
    }

    pub fn finalize_instance(
        &self,
        instance: &Instance,
        info: &Mo2InstanceInfo,
        activate_instance: bool,
    ) -> Result<()> {
        let modlist_path = info.modlist_path();
        modlist::write(&modlist_path, instance.load_order_mods())?;
        debug!("Dumped modlist to {:?}.", modlist_path);

        let settings_path = info.settings_path();
        let mut settings = Ini::new();
        settings
            .with_section(Some("General"))
            .set("LocalSaves", instance.separate_save_games.to_string())
            .set("LocalSettings", instance.separate_ini_files.to_string());
        ini::save(&settings, &settings_path)?;
        debug!("Dumped settings to {:?}.", settings_path);

        if activate_instance {
            debug!("Mod Organizer 2 picks its instance on start; nothing to activate.");
        }
        Ok(())
    }

    /// Maps each `x.mohidden` the mod ships to `x` when `x` is one of its
    /// single-file conflicts and the mod does not ship `x` itself.
    pub fn actual_files(mod_entry: &Mod) -> FileRedirects {
        mod_entry
            .files()
            .iter()
            .filter_map(|file| {
                let spelled = paths::slash_path(file);
                let cut = spelled.len().checked_sub(HIDDEN_SUFFIX.len())?;
                if !spelled.get(cut..)?.eq_ignore_ascii_case(HIDDEN_SUFFIX) {
                    return None;
                }
                let real = spelled.get(..cut)?;
                if mod_entry.has_file(Path::new(real)) {
                    return None;
                }
                mod_entry
                    .file_conflicts
                    .keys()
                    .any(|key| paths::slash_path(key).eq_ignore_ascii_case(real))
                    .then(|| (file.clone(), PathBuf::from(real)))
            })
            .collect()
    }

    pub fn is_instance_existing(&self, info: &Mo2InstanceInfo) -> bool {
        if info.is_global {
            let listed = self
                .catalog
                .by_id(&info.game)
                .and_then(|game| self.instance_names(game))
                .map(|names| names.contains(&info.display_name))
                .unwrap_or(false);
            if listed {
                return true;
            }
        }

        let ini_path = info.ini_path();
        if !ini_path.is_file() {
            return false;
        }
        match Layout::read(&ini_path) {
            Ok(layout) => layout.profiles_dir.join(&info.profile).is_dir(),
            Err(err) => {
                warn!("Failed to read instance layout: {err}");
                false
            }
        }
    }

    pub fn instance_ini_dir(info: &Mo2InstanceInfo) -> PathBuf {
        info.profile_folder()
    }

    pub fn additional_files_folder(info: &Mo2InstanceInfo) -> PathBuf {
        info.profile_folder()
    }
}

fn unmanaged_folders(mods_dir: &Path, entries: &[ModlistEntry]) -> Result<Vec<String>> {
    let listed: HashSet<String> = entries
        .iter()
        .map(|entry| entry.folder.to_lowercase())
        .collect();
    let mut unmanaged = Vec::new();
    for entry in fs::read_dir(mods_dir).at("list mods", mods_dir)? {
        let entry = entry.at("list mods", mods_dir)?;
        if !entry.path().is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if !listed.contains(&name.to_lowercase()) {
            unmanaged.push(name);
        }
    }
    unmanaged.sort();
    Ok(unmanaged)
}

fn load_tools(instance: &mut Instance, mo2_ini: &Ini) {
    let Some(section) = mo2_ini.section(Some("customExecutables")) else {
        return;
    };
    let size = section
        .get("size")
        .and_then(|raw| raw.trim().parse::<usize>().ok())
        .unwrap_or(0);
    let game_folder = instance.game_folder.clone();
    let owners: Vec<(ModId, PathBuf)> = instance
        .mods()
        .map(|(id, mod_entry)| (id, mod_entry.path.clone()))
        .collect();

    for index in 1..=size {
        let key = |name: &str| format!("{index}\\{name}");
        let (Some(binary), Some(title)) = (section.get(key("binary")), section.get(key("title")))
        else {
            error!("Failed to load tool with index {index}: binary or title missing");
            continue;
        };

        let binary = paths::from_windows_str(binary);
        let exe_name = binary
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();
        if EXE_BLACKLIST
            .iter()
            .any(|blocked| blocked.eq_ignore_ascii_case(&exe_name))
        {
            debug!("Skipped tool {exe_name:?} due to mod manager blacklist.");
            continue;
        }

        let working_dir = section
            .get(key("workingDirectory"))
            .filter(|raw| !raw.trim().is_empty())
            .map(paths::from_windows_str)
            .filter(|dir| *dir != game_folder);

        let (owner, executable, is_in_game_dir) =
            match owners.iter().find(|(_, path)| binary.starts_with(path)) {
                Some((id, path)) => (Some(*id), relative_to(&binary, path), false),
                None if binary.starts_with(&game_folder) => {
                    (None, relative_to(&binary, &game_folder), true)
                }
                None => (None, binary.clone(), false),
            };

        instance.add_tool(Tool {
            display_name: title.to_string(),
            owner,
            executable,
            commandline_args: args::split_arguments(
                section.get(key("arguments")).unwrap_or_default(),
            ),
            working_dir,
            is_in_game_dir,
        });
    }
}

fn load_profile_settings(instance: &mut Instance, profile_dir: &Path) {
    let settings_path = profile_dir.join("settings.ini");
    if !settings_path.is_file() {
        return;
    }
    match ini::load(&settings_path) {
        Ok(settings) => {
            instance.separate_save_games =
                ini::get_bool(&settings, "General", "LocalSaves").unwrap_or(false);
            instance.separate_ini_files =
                ini::get_bool(&settings, "General", "LocalSettings").unwrap_or(false);
        }
        Err(err) => warn!("Ignored profile settings: {err}"),
    }
}

fn relative_to(path: &Path, base: &Path) -> PathBuf {
    path.strip_prefix(base)
        .map(Path::to_path_buf)
        .unwrap_or_else(|_| path.to_path_buf())
}

fn parse_id(raw: Option<&str>) -> Option<u64> {
    raw?.trim().parse::<u64>().ok().filter(|id| *id != 0)
}

fn catalog_short_name(meta_name: &str) -> &str {
    SHORT_NAME_OVERRIDES
        .iter()
        .find(|(_, written)| written.eq_ignore_ascii_case(meta_name))
        .map(|(catalog, _)| *catalog)
        .unwrap_or(meta_name)
}

fn meta_short_name(short_name: &str) -> &str {
    SHORT_NAME_OVERRIDES
        .iter()
        .find(|(catalog, _)| catalog.eq_ignore_ascii_case(short_name))
        .map(|(_, written)| *written)
        .unwrap_or(short_name)
}
