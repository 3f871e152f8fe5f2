use crate::{
    error::{IoContext, Result},
    mods::{Mod, ModKind},
    paths,
};
use std::{collections::HashSet, fs, path::Path};

pub const SEPARATOR_SUFFIX: &str = "_separator";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModlistEntry {
    pub folder: String,
    pub enabled: bool,
}

impl ModlistEntry {
    pub fn is_separator(&self) -> bool {
        self.folder.ends_with(SEPARATOR_SUFFIX)
    }

    pub fn display_name(&self) -> &str {
        self.folder
            .strip_suffix(SEPARATOR_SUFFIX)
            .unwrap_or(&self.folder)
    }

    pub fn kind(&self) -> ModKind {
        if self.is_separator() {
            ModKind::Separator
        } else {
            ModKind::Regular
        }
    }
}

/// Entries in load order. The file lists the highest priority first, so
/// lines are reversed; anything not starting with `+` or `-` is ignored.
pub fn parse(raw: &str) -> Vec<ModlistEntry> {
    raw.lines()
        .rev()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| {
            let enabled = match line.chars().next()? {
                '+' => true,
                '-' => false,
                _ => return None,
            };
            Some(ModlistEntry {
                folder: line[1..].trim_end_matches('\r').to_string(),
                enabled,
            })
        })
        .collect()
}

pub fn read(path: &Path) -> Result<Vec<ModlistEntry>> {
    let raw = fs::read_to_string(path).at("read modlist", path)?;
    Ok(parse(&raw))
}

pub fn render<'a>(mods: impl IntoIterator<Item = &'a Mod>) -> String {
    let mods: Vec<&Mod> = mods.into_iter().collect();
    let mut seen = HashSet::new();
    let mut out = String::new();
    for mod_entry in mods.into_iter().rev() {
        let line = match mod_entry.kind {
            ModKind::Overwrite => continue,
            ModKind::Separator => format!(
                "+{}{}",
                paths::clean_fs_string(&mod_entry.display_name),
                SEPARATOR_SUFFIX
            ),
            ModKind::Regular => format!(
                "{}{}",
                if mod_entry.enabled { '+' } else { '-' },
                paths::clean_fs_string(&mod_entry.display_name)
            ),
        };
        if !seen.insert(line.to_lowercase()) {
            continue;
        }
        out.push_str(&line);
        out.push('\n');
    }
    out
}

pub fn write<'a>(path: &Path, mods: impl IntoIterator<Item = &'a Mod>) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).at("create dir", parent)?;
    }
    fs::write(path, render(mods)).at("write modlist", path)
}
