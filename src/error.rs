use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("instance not found: {0}")]
    InstanceNotFound(String),

    #[error("the installation folder for the selected game could not be found")]
    GameFolderNotFound,

    #[error("game not found: {0}")]
    GameNotFound(String),

    #[error("global instance must live below {expected:?}, got {actual:?}")]
    InvalidGlobalInstancePath { expected: PathBuf, actual: PathBuf },

    #[error("{action} {path:?}: {source}")]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("walk mod files: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("read ini {path:?}: {source}")]
    Ini {
        path: PathBuf,
        #[source]
        source: ini::Error,
    },

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("install mod {mod_name:?}: {source}")]
    InstallFailed {
        mod_name: String,
        #[source]
        source: Box<Error>,
    },

    #[error("migration aborted")]
    Aborted,
}

impl Error {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            action,
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

pub(crate) trait IoContext<T> {
    fn at(self, action: &'static str, path: &std::path::Path) -> Result<T>;
}

impl<T> IoContext<T> for std::io::Result<T> {
    fn at(self, action: &'static str, path: &std::path::Path) -> Result<T> {
        self.map_err(|source| Error::io(action, path, source))
    }
}
