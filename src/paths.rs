use directories::{BaseDirs, UserDirs};
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

#[derive(Debug, Clone, Default)]
pub struct PathResolver {
    vars: HashMap<String, String>,
}

impl PathResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_var(mut self, name: &str, value: impl AsRef<Path>) -> Self {
        self.vars.insert(
            name.to_ascii_uppercase(),
            value.as_ref().to_string_lossy().to_string(),
        );
        self
    }

    pub fn resolve(&self, path: &Path) -> PathBuf {
        PathBuf::from(self.resolve_str(&path.to_string_lossy()))
    }

    pub fn resolve_str(&self, raw: &str) -> String {
        let mut out = String::with_capacity(raw.len());
        let mut rest = raw;
        while let Some(start) = rest.find('%') {
            out.push_str(&rest[..start]);
            let after = &rest[start + 1..];
            let Some(end) = after.find('%') else {
                out.push_str(&rest[start..]);
                return out;
            };
            let name = &after[..end];
            match self.lookup(name) {
                Some(value) => out.push_str(&value),
                None => {
                    out.push('%');
                    out.push_str(name);
                    out.push('%');
                }
            }
            rest = &after[end + 1..];
        }
        out.push_str(rest);
        out
    }

    fn lookup(&self, name: &str) -> Option<String> {
        if name.is_empty() {
            return None;
        }
        let key = name.to_ascii_uppercase();
        if let Some(value) = self.vars.get(&key) {
            return Some(value.clone());
        }
        let known = match key.as_str() {
            "DOCUMENTS" => documents_dir(),
            "LOCALAPPDATA" => local_app_data_dir(),
            _ => None,
        };
        known
            .map(|path| path.to_string_lossy().to_string())
            .or_else(|| std::env::var(name).ok())
    }
}

pub fn documents_dir() -> Option<PathBuf> {
    UserDirs::new().and_then(|dirs| dirs.document_dir().map(Path::to_path_buf))
}

pub fn local_app_data_dir() -> Option<PathBuf> {
    BaseDirs::new().map(|dirs| dirs.data_local_dir().to_path_buf())
}

pub fn clean_fs_string(text: &str) -> String {
    const ILLEGAL: &[char] = &['<', '>', '\\', '/', '|', '*', '?', '"', ':'];
    let kept: String = text.chars().filter(|c| !ILLEGAL.contains(c)).collect();
    kept.trim().trim_end_matches('.').to_string()
}

pub fn slash_path(path: &Path) -> String {
    path.components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

pub fn from_windows_str(raw: &str) -> PathBuf {
    if cfg!(windows) {
        PathBuf::from(raw)
    } else {
        PathBuf::from(raw.replace('\\', "/"))
    }
}

pub fn to_forward_slashes(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

pub fn file_name_lower(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}
