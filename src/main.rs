mod config;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use config::AppConfig;
use modshift::{
    game::GameCatalog,
    manager::{InstanceInfo, LoadOptions, ModManager},
    migrate::Migration,
    modorganizer::{Layout, Mo2InstanceInfo, ModOrganizer, DEFAULT_PROFILE, MO2_INI},
    paths::PathResolver,
    progress::{ProgressCallback, ProgressUpdate},
};
use std::{path::PathBuf, sync::Arc};
use tracing::info;

#[derive(Parser)]
#[command(name = "modshift")]
#[command(author, version, about = "Migrate modding instances between mod managers", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List global Mod Organizer 2 instances of a game
    Instances {
        /// Game id (eg. skyrimse)
        #[arg(short, long)]
        game: String,
    },
    /// List the profiles of an instance
    Profiles {
        /// Folder containing ModOrganizer.ini
        instance_dir: PathBuf,
    },
    /// Print the resolved load order of a profile
    Order {
        #[arg(short, long)]
        game: String,
        instance_dir: PathBuf,
        #[arg(short, long, default_value = DEFAULT_PROFILE)]
        profile: String,
        /// Sort by file conflicts instead of trusting the profile's order
        #[arg(long)]
        resolve: bool,
    },
    /// Migrate a profile into a new portable instance
    Migrate {
        #[arg(short, long)]
        game: String,
        /// Folder containing the source ModOrganizer.ini
        source_dir: PathBuf,
        /// Base folder of the new instance
        dest_dir: PathBuf,
        #[arg(short, long, default_value = DEFAULT_PROFILE)]
        profile: String,
        /// Game folder, when the source does not record one
        #[arg(long)]
        game_folder: Option<PathBuf>,
        /// Copy files instead of hardlinking them
        #[arg(long)]
        copy: bool,
        /// Overwrite files that already exist in the destination
        #[arg(long)]
        replace: bool,
        /// Deploy root-level mods into the game folder instead of a Root sub-folder
        #[arg(long)]
        no_root_builder: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load_or_create()?;
    let resolver = PathResolver::new();
    let catalog = match &config.catalog_path {
        Some(path) => GameCatalog::load(path, &resolver)
            .with_context(|| format!("load game catalog {}", path.display()))?,
        None => GameCatalog::bundled(&resolver).context("load bundled game catalog")?,
    };
    let mo2 = ModOrganizer::detect(catalog.clone());

    match cli.command {
        Commands::Instances { game } => {
            let game = catalog.by_id(&game)?;
            for name in mo2.instance_names(game)? {
                println!("{name}");
            }
        }
        Commands::Profiles { instance_dir } => {
            let layout = Layout::read(&instance_dir.join(MO2_INI))
                .with_context(|| format!("read instance at {}", instance_dir.display()))?;
            for name in layout.profile_names()? {
                println!("{name}");
            }
        }
        Commands::Order {
            game,
            instance_dir,
            profile,
            resolve,
        } => {
            let info: InstanceInfo = mo2.existing_instance(&instance_dir, &game, &profile)?.into();
            let manager = ModManager::ModOrganizer(mo2);
            let options = LoadOptions {
                file_blacklist: config.file_blacklist.clone(),
                game_folder: None,
            };
            let instance = manager.load_instance(&info, &options, None)?;
            for (position, id) in instance.load_order_with(!resolve).into_iter().enumerate() {
                let Some(mod_entry) = instance.get(id) else {
                    continue;
                };
                let marker = if mod_entry.enabled { '+' } else { '-' };
                println!("{:>4} {marker} {}", position + 1, mod_entry.display_name);
            }
        }
        Commands::Migrate {
            game,
            source_dir,
            dest_dir,
            profile,
            game_folder,
            copy,
            replace,
            no_root_builder,
        } => {
            let source: InstanceInfo = mo2.existing_instance(&source_dir, &game, &profile)?.into();
            let display_name = dest_dir
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_else(|| "Migrated".to_string());
            let mut dest_info = Mo2InstanceInfo::portable(display_name, game, &dest_dir);
            dest_info.use_root_builder = !no_root_builder;
            let dest: InstanceInfo = dest_info.into();

            let mut options = config.migration_options();
            options.deploy.use_hardlinks &= !copy;
            options.deploy.replace |= replace;
            options.game_folder = game_folder;

            let manager = ModManager::ModOrganizer(mo2);
            let progress: ProgressCallback = Arc::new(|update: ProgressUpdate| -> modshift::Result<()> {
                if let Some(text) = update.status_text {
                    tracing::debug!("[{}/{}] {text}", update.value, update.maximum);
                }
                Ok(())
            });
            let migration = Migration {
                source_manager: &manager,
                source: &source,
                dest_manager: &manager,
                dest: &dest,
            };
            let (instance, report) = migration.run(&options, Some(&progress))?;

            info!("Finished migration into {}.", dest_dir.display());
            println!(
                "Migrated {} mod(s) and {} tool(s) into {} ({} linked, {} copied, {} skipped, {} hidden file(s)).",
                report.mods_installed,
                report.tools_added,
                instance.display_name,
                report.files.linked,
                report.files.copied,
                report.files.skipped,
                report.files.hidden
            );
        }
    }

    Ok(())
}
