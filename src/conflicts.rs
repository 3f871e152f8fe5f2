use crate::{
    index::FileIndex,
    instance::Instance,
    mods::{Mod, ModId},
    paths,
};
use std::{
    collections::{HashMap, HashSet},
    path::PathBuf,
};
use tracing::debug;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConflictSummary {
    pub indexed_files: usize,
    pub conflicting_files: usize,
    pub hidden_files: usize,
}

/// Later sequence position means higher priority: every owner of a shared
/// path is overridden by all owners listed after it. A file carrying
/// `hidden_suffix` whose plain counterpart is indexed yields a single-file
/// conflict pointing at the last owner of the plain path.
pub fn resolve_conflicts(
    instance: &mut Instance,
    blacklist: &[String],
    hidden_suffix: &str,
) -> ConflictSummary {
    let index = FileIndex::build(instance.mods(), blacklist);
    let mut summary = ConflictSummary {
        indexed_files: index.len(),
        ..ConflictSummary::default()
    };
    debug!(
        "Modlist has {} file(s) in {} mod(s).",
        index.len(),
        instance.len()
    );

    let mut overriders: HashMap<ModId, Vec<ModId>> = HashMap::new();
    for (_, owners) in index.iter() {
        if owners.len() < 2 {
            continue;
        }
        summary.conflicting_files += 1;
        for (position, owner) in owners.iter().enumerate() {
            overriders
                .entry(*owner)
                .or_default()
                .extend_from_slice(&owners[position + 1..]);
        }
    }

    for (id, found) in overriders {
        if let Some(mod_entry) = instance.get_mut(id) {
            mod_entry.mod_conflicts.extend(found);
            mod_entry.mod_conflicts = unique(&mod_entry.mod_conflicts);
        }
    }

    let hidden_suffix = hidden_suffix.to_lowercase();
    let mut single_file: Vec<(ModId, PathBuf, ModId)> = Vec::new();
    for (hidden_path, owners) in index.iter() {
        let Some(real_path) = hidden_path.strip_suffix(hidden_suffix.as_str()) else {
            continue;
        };
        let Some(real_owners) = index.owners(real_path) else {
            continue;
        };
        let Some(authoritative) = real_owners.last().copied() else {
            continue;
        };
        summary.hidden_files += 1;
        for owner in owners {
            let Some(mod_entry) = instance.get(*owner) else {
                continue;
            };
            if let Some(key) = own_real_path(mod_entry, hidden_path, hidden_suffix.len()) {
                single_file.push((*owner, key, authoritative));
            }
        }
    }
    debug!("Found {} hidden file(s) with conflicts.", summary.hidden_files);

    for (owner, key, authoritative) in single_file {
        if let Some(mod_entry) = instance.get_mut(owner) {
            mod_entry.file_conflicts.insert(key, authoritative);
        }
    }

    summary
}

fn own_real_path(mod_entry: &Mod, hidden_key: &str, suffix_len: usize) -> Option<PathBuf> {
    let file = mod_entry
        .files()
        .iter()
        .find(|file| paths::slash_path(file).to_lowercase() == hidden_key)?;
    let spelled = paths::slash_path(file);
    let cut = spelled.len().checked_sub(suffix_len)?;
    spelled.get(..cut).map(PathBuf::from)
}

pub fn unique<T: Copy + Eq + std::hash::Hash>(items: &[T]) -> Vec<T> {
    let mut seen = HashSet::new();
    items
        .iter()
        .copied()
        .filter(|item| seen.insert(*item))
        .collect()
}
