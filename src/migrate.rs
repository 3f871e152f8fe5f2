use crate::{
    deploy::{DeployOptions, DeployReport},
    error::Result,
    instance::Instance,
    manager::{InstanceInfo, LoadOptions, ModManager, TransferOptions},
    progress::{self, ProgressCallback, ProgressUpdate},
};
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone, Default)]
pub struct MigrationOptions {
    pub deploy: DeployOptions,
    pub file_blacklist: Vec<String>,
    pub activate_instance: bool,
    pub game_folder: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub mods_installed: usize,
    pub tools_added: usize,
    pub ini_files: usize,
    pub additional_files: usize,
    pub files: DeployReport,
}

pub struct Migration<'a> {
    pub source_manager: &'a ModManager,
    pub source: &'a InstanceInfo,
    pub dest_manager: &'a ModManager,
    pub dest: &'a InstanceInfo,
}

impl Migration<'_> {
    pub fn run(
        &self,
        options: &MigrationOptions,
        progress: Option<&ProgressCallback>,
    ) -> Result<(Instance, MigrationReport)> {
        let load_options = LoadOptions {
            file_blacklist: options.file_blacklist.clone(),
            game_folder: options.game_folder.clone(),
        };
        let source = self
            .source_manager
            .load_instance(self.source, &load_options, progress)?;

        let mut dest = self
            .dest_manager
            .create_instance(self.dest, &source.game_folder, progress)?;
        dest.separate_save_games = source.separate_save_games;
        dest.separate_ini_files = source.separate_ini_files;

        let transfer = TransferOptions {
            deploy: options.deploy,
            blacklist: &options.file_blacklist,
            progress,
        };
        let mut report = MigrationReport::default();

        let order = source.load_order();
        info!(
            "Migrating {} mod(s) from {:?} to {:?}...",
            order.len(),
            source.display_name,
            dest.display_name
        );
        for (position, id) in order.iter().enumerate() {
            let Some(mod_entry) = source.get(*id) else {
                continue;
            };
            progress::report(
                progress,
                ProgressUpdate::step(
                    format!("Migrating {}...", mod_entry.display_name),
                    position,
                    order.len(),
                ),
            )?;
            let redirects = self.source_manager.actual_files(mod_entry);
            let files = self.dest_manager.install_mod(
                &source,
                *id,
                &mut dest,
                self.dest,
                &redirects,
                transfer,
            )?;
            report.files.merge(&files);
            report.mods_installed += 1;
        }

        for tool in source.tools() {
            if self.dest_manager.add_tool(tool, &source, &mut dest, self.dest)? {
                report.tools_added += 1;
            }
        }

        progress::report(progress, ProgressUpdate::status("Migrating INI files..."))?;
        let ini_files = self.source_manager.ini_files(&source, self.source)?;
        let ini_report = self.dest_manager.import_ini_files(
            &ini_files,
            self.dest,
            source.separate_ini_files,
            transfer,
        )?;
        report.ini_files = ini_files.len().saturating_sub(ini_report.skipped);
        report.files.merge(&ini_report);

        let additional = self.source_manager.additional_files(self.source)?;
        let additional_report =
            self.dest_manager
                .import_additional_files(&additional, self.dest, transfer)?;
        report.additional_files = additional.len().saturating_sub(additional_report.skipped);
        report.files.merge(&additional_report);

        self.dest_manager
            .finalize_instance(&dest, self.dest, options.activate_instance)?;

        info!(
            "Migrated {} mod(s) and {} tool(s) ({} linked, {} copied, {} skipped file(s)).",
            report.mods_installed,
            report.tools_added,
            report.files.linked,
            report.files.copied,
            report.files.skipped
        );
        Ok((dest, report))
    }
}
