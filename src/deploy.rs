use crate::{
    error::{Error, IoContext, Result},
    index::is_blacklisted,
    mods::Mod,
    paths,
    progress::{self, format_size, ProgressCallback, ProgressUpdate},
};
#[cfg(unix)]
use std::os::unix::fs::MetadataExt;
use std::{
    collections::{HashMap, HashSet},
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};

pub type FileRedirects = HashMap<PathBuf, PathBuf>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeployOptions {
    pub use_hardlinks: bool,
    /// Delete and rewrite destination files that already exist.
    pub replace: bool,
}

impl Default for DeployOptions {
    fn default() -> Self {
        Self {
            use_hardlinks: true,
            replace: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkMode {
    Hardlink,
    Copy,
}

impl LinkMode {
    pub fn label(self) -> &'static str {
        match self {
            LinkMode::Hardlink => "hardlink",
            LinkMode::Copy => "copy",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome {
    Placed(LinkMode),
    Replaced(LinkMode),
    SkippedExisting,
    SkippedSamePath,
    SkippedBlacklisted,
    SkippedMissing,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeployReport {
    pub linked: usize,
    pub copied: usize,
    pub replaced: usize,
    pub skipped: usize,
    pub hidden: usize,
}

impl DeployReport {
    pub fn record(&mut self, outcome: FileOutcome) {
        match outcome {
            FileOutcome::Placed(mode) | FileOutcome::Replaced(mode) => {
                if matches!(outcome, FileOutcome::Replaced(_)) {
                    self.replaced += 1;
                }
                match mode {
                    LinkMode::Hardlink => self.linked += 1,
                    LinkMode::Copy => self.copied += 1,
                }
            }
            FileOutcome::SkippedExisting
            | FileOutcome::SkippedSamePath
            | FileOutcome::SkippedBlacklisted
            | FileOutcome::SkippedMissing => self.skipped += 1,
        }
    }

    pub fn merge(&mut self, other: &DeployReport) {
        self.linked += other.linked;
        self.copied += other.copied;
        self.replaced += other.replaced;
        self.skipped += other.skipped;
        self.hidden += other.hidden;
    }

    pub fn link_mode_summary(&self) -> &'static str {
        match (self.linked > 0, self.copied > 0) {
            (false, false) => "none",
            (true, false) => LinkMode::Hardlink.label(),
            (false, true) => LinkMode::Copy.label(),
            (true, true) => "mixed",
        }
    }
}

pub struct LinkModeCache {
    source_dev: Option<u64>,
    modes: HashMap<PathBuf, LinkMode>,
}

impl LinkModeCache {
    pub fn new(source_root: &Path, use_hardlinks: bool) -> Result<Self> {
        let source_dev = if use_hardlinks {
            Some(filesystem_id(source_root)?)
        } else {
            None
        };
        Ok(Self {
            source_dev,
            modes: HashMap::new(),
        })
    }

    pub fn mode_for(&mut self, target_dir: &Path) -> Result<LinkMode> {
        if let Some(mode) = self.modes.get(target_dir) {
            return Ok(*mode);
        }
        let mode = match self.source_dev {
            Some(source_dev) if filesystem_id(target_dir)? == source_dev => LinkMode::Hardlink,
            _ => LinkMode::Copy,
        };
        self.modes.insert(target_dir.to_path_buf(), mode);
        Ok(mode)
    }
}

#[cfg(unix)]
fn filesystem_id(path: &Path) -> Result<u64> {
    Ok(fs::metadata(path).at("stat", path)?.dev())
}

#[cfg(not(unix))]
fn filesystem_id(path: &Path) -> Result<u64> {
    use std::hash::{Hash, Hasher};
    let absolute = std::path::absolute(path).at("resolve", path)?;
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    absolute
        .components()
        .next()
        .map(|prefix| prefix.as_os_str().to_string_lossy().to_lowercase())
        .hash(&mut hasher);
    Ok(hasher.finish())
}

/// An existing destination is deleted first when `replace` is set and left
/// alone otherwise.
pub fn place_file(
    source: &Path,
    dest: &Path,
    options: DeployOptions,
    link_modes: &mut LinkModeCache,
) -> Result<FileOutcome> {
    if source == dest {
        warn!("Skipped file due to same path: {:?}", source);
        return Ok(FileOutcome::SkippedSamePath);
    }

    let parent = dest
        .parent()
        .ok_or_else(|| Error::io("resolve parent of", dest, std::io::ErrorKind::NotFound.into()))?;
    fs::create_dir_all(parent).at("create dir", parent)?;

    let mut replaced = false;
    if let Ok(meta) = fs::symlink_metadata(dest) {
        if !options.replace {
            info!("Skipped existing file: {:?}", dest);
            return Ok(FileOutcome::SkippedExisting);
        }
        if meta.file_type().is_dir() {
            return Err(Error::io(
                "replace",
                dest,
                std::io::Error::new(
                    std::io::ErrorKind::AlreadyExists,
                    "destination exists as directory",
                ),
            ));
        }
        fs::remove_file(dest).at("remove existing file", dest)?;
        warn!("Deleted existing file: {:?}", dest);
        replaced = true;
    }

    let mode = link_modes.mode_for(parent)?;
    match mode {
        LinkMode::Hardlink => fs::hard_link(source, dest).at("hardlink", dest)?,
        LinkMode::Copy => {
            fs::copy(source, dest).at("copy", dest)?;
        }
    }

    Ok(if replaced {
        FileOutcome::Replaced(mode)
    } else {
        FileOutcome::Placed(mode)
    })
}

#[derive(Debug, Clone, Default)]
pub struct ModDeployment {
    pub report: DeployReport,
    /// Destination-relative paths written by this run, lowercased.
    written: HashSet<String>,
}

impl ModDeployment {
    pub fn wrote(&self, relative: &Path) -> bool {
        self.written
            .contains(&paths::slash_path(relative).to_lowercase())
    }
}

pub fn install_mod_files(
    mod_entry: &Mod,
    mod_folder: &Path,
    redirects: &FileRedirects,
    options: DeployOptions,
    blacklist: &[String],
    progress: Option<&ProgressCallback>,
) -> Result<ModDeployment> {
    let mut deployment = ModDeployment::default();
    let files = mod_entry.files();
    if files.is_empty() {
        return Ok(deployment);
    }
    fs::create_dir_all(mod_folder).at("create mod folder", mod_folder)?;
    let mut link_modes = LinkModeCache::new(&mod_entry.path, options.use_hardlinks)?;

    for (position, file) in files.iter().enumerate() {
        let file_name = paths::file_name_lower(file);
        if is_blacklisted(&file_name, blacklist) {
            info!("Skipped file due to configured blacklist: {:?}", file);
            deployment.report.record(FileOutcome::SkippedBlacklisted);
            continue;
        }

        let source = mod_entry.path.join(file);
        let relative = redirects.get(file).unwrap_or(file);
        let dest = mod_folder.join(relative);

        let size = fs::metadata(&source).map(|meta| meta.len()).unwrap_or(0);
        progress::report(
            progress,
            ProgressUpdate::step(
                format!("{} ({})", file.display(), format_size(size)),
                position,
                files.len(),
            ),
        )?;

        let outcome = place_file(&source, &dest, options, &mut link_modes)?;
        if matches!(outcome, FileOutcome::Placed(_) | FileOutcome::Replaced(_)) {
            deployment
                .written
                .insert(paths::slash_path(relative).to_lowercase());
        }
        deployment.report.record(outcome);
    }

    let report = &deployment.report;
    debug!(
        "Deployed {:?} to {:?} ({} linked, {} copied, {} skipped).",
        mod_entry.display_name, mod_folder, report.linked, report.copied, report.skipped
    );
    Ok(deployment)
}

pub fn import_files(
    files: &[PathBuf],
    dest_folder: &Path,
    options: DeployOptions,
    progress: Option<&ProgressCallback>,
) -> Result<DeployReport> {
    let mut report = DeployReport::default();
    for (position, file) in files.iter().enumerate() {
        let Some(file_name) = file.file_name() else {
            continue;
        };
        if !file.is_file() {
            warn!("Skipped not existing file: {:?}", file);
            report.record(FileOutcome::SkippedMissing);
            continue;
        }
        info!(
            "Migrating {:?} from {:?} to {:?}...",
            file_name,
            file.parent().unwrap_or(Path::new("")),
            dest_folder
        );
        let size = fs::metadata(file).map(|meta| meta.len()).unwrap_or(0);
        progress::report(
            progress,
            ProgressUpdate::step(
                format!("{} ({})", file_name.to_string_lossy(), format_size(size)),
                position,
                files.len(),
            ),
        )?;

        let mut link_modes = LinkModeCache::new(file, options.use_hardlinks)?;
        let outcome = place_file(file, &dest_folder.join(file_name), options, &mut link_modes)?;
        report.record(outcome);
    }
    Ok(report)
}

/// Appends `hidden_suffix` to a file this run deployed. If a hidden copy is
/// already there it is kept (unless `replace`) and the fresh copy dropped.
pub fn hide_file(
    mod_folder: &Path,
    relative: &Path,
    hidden_suffix: &str,
    replace: bool,
) -> Result<bool> {
    let active = mod_folder.join(relative);
    if !active.is_file() {
        debug!("Nothing to hide at {:?}.", active);
        return Ok(false);
    }
    let mut hidden_name = active.as_os_str().to_os_string();
    hidden_name.push(hidden_suffix);
    let hidden = PathBuf::from(hidden_name);

    if hidden.exists() {
        if !replace {
            info!("Kept existing hidden file {:?}; removing active copy.", hidden);
            fs::remove_file(&active).at("remove overridden file", &active)?;
            return Ok(true);
        }
        fs::remove_file(&hidden).at("remove existing hidden file", &hidden)?;
    }
    fs::rename(&active, &hidden).at("hide overridden file", &active)?;
    debug!("Renamed {:?} to {:?} due to file conflict.", active, hidden);
    Ok(true)
}
