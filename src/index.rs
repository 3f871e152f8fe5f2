use crate::{
    mods::{Mod, ModId},
    paths,
};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileIndex {
    owners: BTreeMap<String, Vec<ModId>>,
}

impl FileIndex {
    pub fn build<'a>(
        mods: impl IntoIterator<Item = (ModId, &'a Mod)>,
        blacklist: &[String],
    ) -> Self {
        let mut owners: BTreeMap<String, Vec<ModId>> = BTreeMap::new();
        for (id, mod_entry) in mods {
            for file in mod_entry.files() {
                if is_blacklisted(&paths::file_name_lower(file), blacklist) {
                    continue;
                }
                let key = paths::slash_path(file).to_lowercase();
                let entry = owners.entry(key).or_default();
                // A case-only duplicate inside one mod counts once.
                if entry.last() != Some(&id) {
                    entry.push(id);
                }
            }
        }
        Self { owners }
    }

    pub fn owners(&self, path: &str) -> Option<&[ModId]> {
        self.owners.get(&path.to_lowercase()).map(Vec::as_slice)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.owners.contains_key(&path.to_lowercase())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[ModId])> {
        self.owners
            .iter()
            .map(|(path, owners)| (path.as_str(), owners.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }
}

pub fn is_blacklisted(file_name_lower: &str, blacklist: &[String]) -> bool {
    blacklist
        .iter()
        .any(|entry| entry.eq_ignore_ascii_case(file_name_lower))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::Instance;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn files(list: &[&str]) -> Vec<PathBuf> {
        list.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn owners_follow_scan_order_and_ignore_case() {
        let instance = Instance::with_mods(
            "test",
            PathBuf::from("/game"),
            [
                Mod::with_files("A", "/m/a", files(&["Textures/Sky.dds", "a.esp"])),
                Mod::with_files("B", "/m/b", files(&["textures/sky.DDS"])),
            ],
        );
        let ids = instance.mod_ids().to_vec();
        let index = FileIndex::build(instance.mods(), &[]);

        assert_eq!(index.len(), 2);
        assert_eq!(index.owners("textures/sky.dds").unwrap(), &[ids[0], ids[1]]);
        assert_eq!(index.owners("A.ESP").unwrap(), &[ids[0]]);
        assert!(index.iter().all(|(key, _)| key == key.to_lowercase()));
    }

    #[test]
    fn blacklisted_basenames_are_skipped() {
        let instance = Instance::with_mods(
            "test",
            PathBuf::from("/game"),
            [
                Mod::with_files("A", "/m/a", files(&["meta.ini", "x.esp"])),
                Mod::with_files("B", "/m/b", files(&["Meta.INI"])),
            ],
        );
        let index = FileIndex::build(instance.mods(), &["meta.ini".to_string()]);
        assert!(!index.contains("meta.ini"));
        assert!(index.contains("x.esp"));
    }
}
