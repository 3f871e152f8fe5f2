//! Instance migration engine for game mod managers.
//!
//! Loads a modding instance (mods, their files, tools) from one mod
//! manager and rebuilds it in another instance while keeping the file-level
//! override result of the source: wherever several mods ship the same file,
//! the same copy wins after migration.
//!
//! - [`index`] maps every relative file path to the mods shipping it
//! - [`conflicts`] derives which mods override which
//! - [`load_order`] turns those relationships into a stable order
//! - [`manager`] and [`modorganizer`] read, create and deploy instances
//! - [`migrate`] ties the steps together

pub mod conflicts;
pub mod deploy;
mod error;
pub mod game;
pub mod index;
pub mod instance;
pub mod load_order;
pub mod manager;
pub mod metadata;
pub mod migrate;
pub mod modorganizer;
pub mod mods;
pub mod paths;
pub mod progress;
pub mod tool;

pub use error::{Error, Result};
