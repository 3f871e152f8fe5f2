use crate::{
    error::{Error, IoContext, Result},
    paths::PathResolver,
};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

const BUNDLED_GAMES: &str = include_str!("../resources/games.json");

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Game {
    /// Identifier shared with other mod managers (eg. `skyrimse`).
    pub id: String,
    pub display_name: String,
    pub short_name: String,
    pub nexus_id: String,
    pub inidir: PathBuf,
    pub inifiles: Vec<PathBuf>,
    pub mods_folder: PathBuf,
    #[serde(default)]
    pub additional_files: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct GameCatalog {
    games: Vec<Game>,
}

impl GameCatalog {
    pub fn bundled(resolver: &PathResolver) -> Result<Self> {
        Self::from_json(BUNDLED_GAMES, resolver)
    }

    pub fn load(path: &Path, resolver: &PathResolver) -> Result<Self> {
        let raw = fs::read_to_string(path).at("read game catalog", path)?;
        Self::from_json(&raw, resolver)
    }

    pub fn from_json(raw: &str, resolver: &PathResolver) -> Result<Self> {
        let mut games: Vec<Game> = serde_json::from_str(raw)?;
        for game in &mut games {
            game.inidir = resolver.resolve(&game.inidir);
            game.inifiles = game
                .inifiles
                .iter()
                .map(|file| resolver.resolve(file))
                .collect();
        }
        Ok(Self { games })
    }

    pub fn by_id(&self, id: &str) -> Result<&Game> {
        self.games
            .iter()
            .find(|game| game.id.eq_ignore_ascii_case(id))
            .ok_or_else(|| Error::GameNotFound(id.to_string()))
    }

    pub fn by_short_name(&self, short_name: &str) -> Result<&Game> {
        self.games
            .iter()
            .find(|game| game.short_name.eq_ignore_ascii_case(short_name))
            .ok_or_else(|| Error::GameNotFound(short_name.to_string()))
    }

    /// Several entries may share a catalog id; the first listed wins.
    pub fn by_nexus_id(&self, nexus_id: &str) -> Result<&Game> {
        self.games
            .iter()
            .find(|game| game.nexus_id.eq_ignore_ascii_case(nexus_id))
            .ok_or_else(|| Error::GameNotFound(nexus_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> GameCatalog {
        let resolver = PathResolver::new().with_var("DOCUMENTS", "/home/user/Documents");
        GameCatalog::bundled(&resolver).unwrap()
    }

    #[test]
    fn lookups_ignore_case() {
        let catalog = catalog();
        assert_eq!(catalog.by_id("SkyrimSE").unwrap().short_name, "SkyrimSE");
        assert_eq!(catalog.by_short_name("skyrimse").unwrap().id, "skyrimse");
        assert_eq!(
            catalog.by_nexus_id("skyrimspecialedition").unwrap().id,
            "skyrimse"
        );
    }

    #[test]
    fn missing_game_is_a_distinct_error() {
        let err = catalog().by_id("morrowind").unwrap_err();
        assert!(matches!(err, Error::GameNotFound(ref query) if query == "morrowind"));
    }

    #[test]
    fn ini_paths_are_resolved() {
        let catalog = catalog();
        let game = catalog.by_id("skyrimse").unwrap();
        assert_eq!(
            game.inidir,
            PathBuf::from("/home/user/Documents/My Games/Skyrim Special Edition")
        );
    }
}
