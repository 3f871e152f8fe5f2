use crate::{
    error::{Error, IoContext, Result},
    paths::{self, PathResolver},
};
use ini::{EscapePolicy, Ini, ParseOption, WriteOption};
use regex::Regex;
use std::{
    fs,
    path::{Path, PathBuf},
    sync::LazyLock,
};

pub const MO2_INI: &str = "ModOrganizer.ini";

static BYTE_ARRAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@ByteArray\((.*)\)$").expect("static regex"));

/// Reads an INI file verbatim: MO2 stores backslashes and quotes unescaped.
pub fn load(path: &Path) -> Result<Ini> {
    let options = ParseOption {
        enabled_quote: false,
        enabled_escape: false,
        ..ParseOption::default()
    };
    Ini::load_from_file_opt(path, options).map_err(|source| Error::Ini {
        path: path.to_path_buf(),
        source,
    })
}

pub fn save(ini: &Ini, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).at("create dir", parent)?;
    }
    let options = WriteOption {
        escape_policy: EscapePolicy::Nothing,
        ..WriteOption::default()
    };
    ini.write_to_file_opt(path, options).at("write ini", path)
}

pub fn get<'a>(ini: &'a Ini, section: &str, key: &str) -> Option<&'a str> {
    ini.section(Some(section)).and_then(|props| props.get(key))
}

pub fn get_bool(ini: &Ini, section: &str, key: &str) -> Option<bool> {
    get(ini, section, key).map(|value| value.trim().eq_ignore_ascii_case("true"))
}

/// Strips Qt's `@ByteArray(...)` wrapper and collapses doubled backslashes.
pub fn unwrap_byte_array(raw: &str) -> String {
    BYTE_ARRAY.replace(raw, "$1").replace("\\\\", "\\")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub base_dir: PathBuf,
    pub mods_dir: PathBuf,
    pub profiles_dir: PathBuf,
    pub overwrite_dir: PathBuf,
}

impl Layout {
    pub fn read(ini_path: &Path) -> Result<Self> {
        Ok(Self::from_ini(&load(ini_path)?, ini_path))
    }

    pub fn from_ini(ini: &Ini, ini_path: &Path) -> Self {
        let base_dir = get(ini, "Settings", "base_directory")
            .map(paths::from_windows_str)
            .or_else(|| ini_path.parent().map(Path::to_path_buf))
            .unwrap_or_default();
        let resolver = PathResolver::new().with_var("BASE_DIR", &base_dir);
        let folder = |key: &str, default: &str| match get(ini, "Settings", key) {
            Some(raw) => paths::from_windows_str(&resolver.resolve_str(raw)),
            None => base_dir.join(default),
        };

        Self {
            mods_dir: folder("mod_directory", "mods"),
            profiles_dir: folder("profiles_directory", "profiles"),
            overwrite_dir: folder("overwrite_directory", "overwrite"),
            base_dir,
        }
    }

    pub fn profile_names(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.profiles_dir).at("list profiles", &self.profiles_dir)? {
            let entry = entry.at("list profiles", &self.profiles_dir)?;
            if entry.path().is_dir() {
                names.push(entry.file_name().to_string_lossy().to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}

pub fn base_relative(folder: &Path, base: &Path) -> String {
    match folder.strip_prefix(base) {
        Ok(relative) => format!("%BASE_DIR%/{}", paths::to_forward_slashes(relative)),
        Err(_) => paths::to_forward_slashes(folder),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn byte_array_is_unwrapped() {
        assert_eq!(
            unwrap_byte_array(r"@ByteArray(C:\\Games\\Skyrim Special Edition)"),
            r"C:\Games\Skyrim Special Edition"
        );
        assert_eq!(unwrap_byte_array("D:/Games/Skyrim"), "D:/Games/Skyrim");
    }

    #[test]
    fn layout_expands_base_dir_and_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let ini_path = dir.path().join(MO2_INI);
        fs::write(
            &ini_path,
            "[Settings]\nmod_directory=%BASE_DIR%/my mods\nprofiles_directory=/elsewhere/profiles\n",
        )
        .unwrap();

        let layout = Layout::read(&ini_path).unwrap();
        assert_eq!(layout.base_dir, dir.path());
        assert_eq!(layout.mods_dir, dir.path().join("my mods"));
        assert_eq!(layout.profiles_dir, PathBuf::from("/elsewhere/profiles"));
        assert_eq!(layout.overwrite_dir, dir.path().join("overwrite"));
    }

    #[test]
    fn backslash_keys_survive_a_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("meta.ini");
        let mut ini = Ini::new();
        ini.with_section(Some("installedFiles"))
            .set("1\\fileid", "42")
            .set("size", "1");
        save(&ini, &path).unwrap();

        let loaded = load(&path).unwrap();
        assert_eq!(get(&loaded, "installedFiles", "1\\fileid"), Some("42"));
    }

    #[test]
    fn base_relative_paths() {
        let base = Path::new("/mo2/portable");
        assert_eq!(base_relative(&base.join("mods"), base), "%BASE_DIR%/mods");
        assert_eq!(base_relative(Path::new("/d/mods"), base), "/d/mods");
    }
}
