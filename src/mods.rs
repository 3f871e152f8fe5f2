use crate::{metadata::Metadata, paths};
use std::{
    cell::OnceCell,
    collections::BTreeMap,
    fmt,
    path::{Path, PathBuf},
};
use tracing::warn;
use walkdir::WalkDir;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModId(pub(crate) usize);

impl fmt::Display for ModId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModKind {
    Regular,
    Separator,
    Overwrite,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployPath {
    InstanceRoot,
    Subdir(PathBuf),
}

#[derive(Debug, Clone)]
pub struct Mod {
    pub display_name: String,
    pub path: PathBuf,
    pub deploy_path: Option<DeployPath>,
    pub metadata: Metadata,
    pub installed: bool,
    pub enabled: bool,
    pub kind: ModKind,
    pub mod_conflicts: Vec<ModId>,
    /// Unsuffixed relative path -> mod whose copy of that path is active.
    pub file_conflicts: BTreeMap<PathBuf, ModId>,
    files: OnceCell<Vec<PathBuf>>,
}

impl Mod {
    pub fn new(display_name: impl Into<String>, path: impl Into<PathBuf>, kind: ModKind) -> Self {
        Self {
            display_name: display_name.into(),
            path: path.into(),
            deploy_path: None,
            metadata: Metadata::empty(),
            installed: true,
            enabled: true,
            kind,
            mod_conflicts: Vec::new(),
            file_conflicts: BTreeMap::new(),
            files: OnceCell::new(),
        }
    }

    pub fn with_files(
        display_name: impl Into<String>,
        path: impl Into<PathBuf>,
        files: Vec<PathBuf>,
    ) -> Self {
        let mod_entry = Self::new(display_name, path, ModKind::Regular);
        let _ = mod_entry.files.set(files);
        mod_entry
    }

    pub fn files(&self) -> &[PathBuf] {
        self.files.get_or_init(|| scan_files(&self.path))
    }

    pub fn has_file(&self, relative: &Path) -> bool {
        let wanted = paths::slash_path(relative).to_lowercase();
        self.files()
            .iter()
            .any(|file| paths::slash_path(file).to_lowercase() == wanted)
    }

    pub fn relocated(&self, path: PathBuf) -> Self {
        Self {
            display_name: self.display_name.clone(),
            path,
            deploy_path: self.deploy_path.clone(),
            metadata: self.metadata.clone(),
            installed: self.installed,
            enabled: self.enabled,
            kind: self.kind,
            mod_conflicts: Vec::new(),
            file_conflicts: BTreeMap::new(),
            files: OnceCell::new(),
        }
    }

    pub fn is_same_mod(&self, other: &Mod) -> bool {
        self.display_name == other.display_name
    }
}

fn scan_files(root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!("Skipped unreadable entry below {:?}: {err}", root);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        if let Ok(relative) = entry.path().strip_prefix(root) {
            files.push(relative.to_path_buf());
        }
    }
    files
}
