use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub mod_id: Option<u64>,
    pub file_id: Option<u64>,
    pub version: String,
    pub file_name: Option<String>,
    pub game_id: String,
}

impl Metadata {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn for_game(game_id: &str) -> Self {
        Self {
            game_id: game_id.to_string(),
            ..Self::default()
        }
    }
}

pub fn normalize_version(raw: &str) -> String {
    let mut version = raw.trim().to_string();
    while version.ends_with(".0") && version.matches('.').count() > 1 {
        version.truncate(version.len() - 2);
    }
    version
}
