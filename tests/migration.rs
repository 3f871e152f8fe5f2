use modshift::{
    deploy::DeployOptions,
    game::GameCatalog,
    instance::Instance,
    manager::{InstanceInfo, LoadOptions, ModManager},
    migrate::{Migration, MigrationOptions},
    modorganizer::{Mo2InstanceInfo, ModOrganizer},
    mods::ModKind,
    paths::PathResolver,
    progress::{ProgressCallback, ProgressUpdate},
    Error,
};
use pretty_assertions::assert_eq;
use std::{
    fs,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};
use tempfile::TempDir;

struct Fixture {
    _root: TempDir,
    source_dir: PathBuf,
    dest_dir: PathBuf,
    game_dir: PathBuf,
    catalog: GameCatalog,
}

fn write(path: &Path, contents: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

/// Portable MO2 instance with two conflicting weather mods, a hidden file,
/// a separator, a Root Builder mod, an unmanaged folder, overwrite content
/// and one tool.
fn fixture() -> Fixture {
    let root = tempfile::tempdir().unwrap();
    let source_dir = root.path().join("source");
    let dest_dir = root.path().join("dest");
    let game_dir = root.path().join("game");
    fs::create_dir_all(&game_dir).unwrap();

    write(
        &source_dir.join("ModOrganizer.ini"),
        &format!(
            "[General]\ngameName=Skyrim Special Edition\ngamePath=@ByteArray({})\n\n\
             [customExecutables]\n1\\title=SSEEdit\n1\\binary={}\n1\\arguments=-quickautoclean\n\
             1\\workingDirectory=\nsize=1\n",
            game_dir.display(),
            source_dir.join("mods/xEdit/SSEEdit.exe").display()
        ),
    );
    write(
        &source_dir.join("profiles/Default/modlist.txt"),
        "+WeatherMod-German\n+WeatherMod\n+xEdit\n+Visuals_separator\n+Old UI\n+RootMod\n",
    );
    write(
        &source_dir.join("profiles/Default/settings.ini"),
        "[General]\nLocalSaves=true\nLocalSettings=true\n",
    );
    write(&source_dir.join("profiles/Default/Skyrim.ini"), "[Display]\n");
    write(&source_dir.join("profiles/Default/plugins.txt"), "*WeatherMod.esp\n");

    let mods = source_dir.join("mods");
    write(&mods.join("WeatherMod/textures/sky.dds"), "sky");
    write(&mods.join("WeatherMod/WeatherMod.esp"), "esp");
    write(
        &mods.join("WeatherMod/meta.ini"),
        "[General]\ngameName=SkyrimSE\nmodid=1234\nversion=1.0.0\n",
    );
    write(&mods.join("WeatherMod-German/textures/sky.dds"), "himmel");
    write(&mods.join("WeatherMod-German/scripts/ui.pex"), "german ui");
    write(&mods.join("Old UI/scripts/ui.pex.mohidden"), "old ui");
    write(&mods.join("Visuals_separator/meta.ini"), "[General]\n");
    write(&mods.join("xEdit/SSEEdit.exe"), "exe");
    write(&mods.join("RootMod/Root/skse64_loader.exe"), "loader");
    write(&mods.join("Unmanaged/readme.txt"), "readme");
    write(&source_dir.join("overwrite/SKSE/skse.log"), "log");

    let resolver = PathResolver::new().with_var("DOCUMENTS", root.path().join("docs"));
    let catalog = GameCatalog::bundled(&resolver).unwrap();

    Fixture {
        _root: root,
        source_dir,
        dest_dir,
        game_dir,
        catalog,
    }
}

impl Fixture {
    fn mo2(&self) -> ModOrganizer {
        ModOrganizer::new(self.catalog.clone(), None)
    }

    fn source_info(&self) -> InstanceInfo {
        self.mo2()
            .existing_instance(&self.source_dir, "skyrimse", "Default")
            .unwrap()
            .into()
    }

    fn dest_info(&self) -> InstanceInfo {
        Mo2InstanceInfo::portable("Dest", "skyrimse", &self.dest_dir).into()
    }

    fn manager(&self) -> ModManager {
        ModManager::ModOrganizer(self.mo2())
    }
}

fn options(use_hardlinks: bool, replace: bool) -> MigrationOptions {
    MigrationOptions {
        deploy: DeployOptions {
            use_hardlinks,
            replace,
        },
        ..MigrationOptions::default()
    }
}

#[test]
fn loads_source_instance() {
    let fx = fixture();
    let instance = fx
        .manager()
        .load_instance(&fx.source_info(), &LoadOptions::default(), None)
        .unwrap();

    assert_eq!(instance.game_folder, fx.game_dir);
    assert!(instance.separate_save_games);
    let names: Vec<(&str, ModKind, bool)> = instance
        .load_order_mods()
        .into_iter()
        .map(|m| (m.display_name.as_str(), m.kind, m.enabled))
        .collect();
    assert_eq!(
        names,
        vec![
            ("RootMod", ModKind::Regular, true),
            ("Old UI", ModKind::Regular, true),
            ("Visuals", ModKind::Separator, true),
            ("xEdit", ModKind::Regular, true),
            ("WeatherMod", ModKind::Regular, true),
            ("WeatherMod-German", ModKind::Regular, true),
            ("Unmanaged", ModKind::Regular, false),
            ("Overwrite", ModKind::Overwrite, true),
        ]
    );

    let weather = instance.id_of("WeatherMod", ModKind::Regular).unwrap();
    let german = instance.id_of("WeatherMod-German", ModKind::Regular).unwrap();
    let old_ui = instance.id_of("Old UI", ModKind::Regular).unwrap();
    assert_eq!(instance.get(weather).unwrap().mod_conflicts, vec![german]);
    assert_eq!(instance.get(weather).unwrap().metadata.mod_id, Some(1234));
    assert_eq!(
        instance.get(old_ui).unwrap().file_conflicts[&PathBuf::from("scripts/ui.pex")],
        german
    );

    // The stored order already satisfies every conflict.
    assert_eq!(instance.load_order_with(false), instance.load_order_with(true));

    let tools = instance.tools();
    assert_eq!(tools.len(), 1);
    assert_eq!(tools[0].executable, PathBuf::from("SSEEdit.exe"));
    assert_eq!(tools[0].owner, instance.id_of("xEdit", ModKind::Regular));
}

#[test]
fn removal_keeps_remaining_order_valid() {
    let fx = fixture();
    let mut instance = fx
        .manager()
        .load_instance(&fx.source_info(), &LoadOptions::default(), None)
        .unwrap();
    let names = |instance: &Instance, trust: bool| -> Vec<String> {
        instance
            .load_order_with(trust)
            .into_iter()
            .filter_map(|id| instance.get(id))
            .map(|m| m.display_name.clone())
            .collect()
    };
    assert_eq!(
        names(&instance, false),
        vec![
            "RootMod",
            "Old UI",
            "Visuals",
            "xEdit",
            "WeatherMod",
            "WeatherMod-German",
            "Unmanaged",
            "Overwrite",
        ]
    );

    let weather = instance.id_of("WeatherMod", ModKind::Regular).unwrap();
    let german = instance.id_of("WeatherMod-German", ModKind::Regular).unwrap();
    let old_ui = instance.id_of("Old UI", ModKind::Regular).unwrap();
    instance.remove(german).unwrap();
    instance.remove(old_ui).unwrap();

    assert_eq!(instance.get(weather).unwrap().mod_conflicts, vec![german]);
    let expected = vec!["RootMod", "Visuals", "xEdit", "WeatherMod", "Unmanaged", "Overwrite"];
    assert_eq!(names(&instance, false), expected);
    assert_eq!(names(&instance, true), expected);
}

#[test]
fn migrates_into_new_portable_instance() {
    let fx = fixture();
    let manager = fx.manager();
    let (source, dest) = (fx.source_info(), fx.dest_info());
    let migration = Migration {
        source_manager: &manager,
        source: &source,
        dest_manager: &manager,
        dest: &dest,
    };

    let (instance, report) = migration.run(&options(true, false), None).unwrap();
    let mods = fx.dest_dir.join("mods");

    assert_eq!(report.mods_installed, 8);
    assert_eq!(report.tools_added, 1);
    assert_eq!(report.ini_files, 1);
    assert_eq!(report.additional_files, 1);
    assert_eq!(report.files.hidden, 1);

    assert_eq!(
        fs::read_to_string(fx.dest_dir.join("profiles/Default/modlist.txt")).unwrap(),
        "-Unmanaged\n+WeatherMod-German\n+WeatherMod\n+xEdit\n+Visuals_separator\n+Old UI\n+RootMod\n"
    );
    let settings = fs::read_to_string(fx.dest_dir.join("profiles/Default/settings.ini")).unwrap();
    assert!(settings.contains("LocalSaves=true"));
    assert!(settings.contains("LocalSettings=true"));
    assert!(fx.dest_dir.join("profiles/Default/Skyrim.ini").is_file());
    assert!(fx.dest_dir.join("profiles/Default/plugins.txt").is_file());

    assert_eq!(fs::read_to_string(mods.join("WeatherMod/textures/sky.dds")).unwrap(), "sky");
    assert_eq!(
        fs::read_to_string(mods.join("WeatherMod-German/textures/sky.dds")).unwrap(),
        "himmel"
    );
    assert!(mods.join("Old UI/scripts/ui.pex.mohidden").is_file());
    assert!(!mods.join("Old UI/scripts/ui.pex").exists());
    assert!(mods.join("RootMod/Root/skse64_loader.exe").is_file());
    assert!(fx.dest_dir.join("overwrite/SKSE/skse.log").is_file());

    let copied_meta = fs::read_to_string(mods.join("WeatherMod/meta.ini")).unwrap();
    assert!(copied_meta.contains("modid=1234"));
    let written_meta = fs::read_to_string(mods.join("WeatherMod-German/meta.ini")).unwrap();
    assert!(written_meta.contains("gameName=SkyrimSE"));

    let mo2_ini = fs::read_to_string(fx.dest_dir.join("ModOrganizer.ini")).unwrap();
    assert!(mo2_ini.contains("1\\title=SSEEdit"));
    assert!(mo2_ini.contains(&format!(
        "1\\binary={}",
        mods.join("xEdit/SSEEdit.exe").display()
    )));
    assert!(mo2_ini.contains("1\\arguments=-quickautoclean"));

    let weather = instance.id_of("WeatherMod", ModKind::Regular).unwrap();
    let german = instance.id_of("WeatherMod-German", ModKind::Regular).unwrap();
    let old_ui = instance.id_of("Old UI", ModKind::Regular).unwrap();
    assert_eq!(instance.get(weather).unwrap().mod_conflicts, vec![german]);
    assert_eq!(instance.get(weather).unwrap().path, mods.join("WeatherMod"));
    assert_eq!(
        instance.get(old_ui).unwrap().file_conflicts[&PathBuf::from("scripts/ui.pex")],
        german
    );
    assert!(instance.overwrite_mod().is_none());
}

#[cfg(unix)]
#[test]
fn same_volume_migration_hardlinks_files() {
    use std::os::unix::fs::MetadataExt;

    let fx = fixture();
    let manager = fx.manager();
    let (source, dest) = (fx.source_info(), fx.dest_info());
    let migration = Migration {
        source_manager: &manager,
        source: &source,
        dest_manager: &manager,
        dest: &dest,
    };
    let (_, report) = migration.run(&options(true, false), None).unwrap();
    assert_eq!(report.files.copied, 0);

    let original = fs::metadata(fx.source_dir.join("mods/WeatherMod/textures/sky.dds")).unwrap();
    let linked = fs::metadata(fx.dest_dir.join("mods/WeatherMod/textures/sky.dds")).unwrap();
    assert_eq!(original.ino(), linked.ino());
    assert_eq!(original.dev(), linked.dev());
}

#[test]
fn existing_files_are_only_replaced_on_request() {
    let fx = fixture();
    let stale = fx.dest_dir.join("mods/WeatherMod/textures/sky.dds");
    write(&stale, "stale");

    let manager = fx.manager();
    let (source, dest) = (fx.source_info(), fx.dest_info());
    let migration = Migration {
        source_manager: &manager,
        source: &source,
        dest_manager: &manager,
        dest: &dest,
    };

    migration.run(&options(false, false), None).unwrap();
    assert_eq!(fs::read_to_string(&stale).unwrap(), "stale");

    let (_, report) = migration.run(&options(false, true), None).unwrap();
    assert_eq!(fs::read_to_string(&stale).unwrap(), "sky");
    assert!(report.files.replaced > 0);
    assert_eq!(report.files.linked, 0);
}

#[test]
fn abort_from_progress_stops_migration() {
    let fx = fixture();
    let manager = fx.manager();
    let (source, dest) = (fx.source_info(), fx.dest_info());
    let migration = Migration {
        source_manager: &manager,
        source: &source,
        dest_manager: &manager,
        dest: &dest,
    };
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let progress: ProgressCallback = Arc::new(move |_: ProgressUpdate| -> modshift::Result<()> {
        if counter.fetch_add(1, Ordering::SeqCst) >= 20 {
            return Err(Error::Aborted);
        }
        Ok(())
    });

    let err = migration.run(&options(false, false), Some(&progress)).unwrap_err();
    assert!(matches!(err, Error::Aborted));
    let modlist = fs::read_to_string(fx.dest_dir.join("profiles/Default/modlist.txt")).unwrap();
    assert!(modlist.is_empty());
}

#[test]
fn missing_instance_and_game_folder_are_reported() {
    let fx = fixture();
    let err = fx
        .mo2()
        .existing_instance(&fx.dest_dir, "skyrimse", "Default")
        .unwrap_err();
    assert!(matches!(err, Error::InstanceNotFound(_)));

    let missing_profile: InstanceInfo = fx
        .mo2()
        .existing_instance(&fx.source_dir, "skyrimse", "Survival")
        .unwrap()
        .into();
    let err = fx
        .manager()
        .load_instance(&missing_profile, &LoadOptions::default(), None)
        .unwrap_err();
    assert!(matches!(err, Error::InstanceNotFound(ref label) if label == "source > Survival"));
    assert!(!fx.manager().is_instance_existing(&missing_profile));
    assert!(fx.manager().is_instance_existing(&fx.source_info()));

    write(&fx.source_dir.join("ModOrganizer.ini"), "[General]\ngameName=Skyrim Special Edition\n");
    let err = fx
        .manager()
        .load_instance(&fx.source_info(), &LoadOptions::default(), None)
        .unwrap_err();
    assert!(matches!(err, Error::GameFolderNotFound));

    let options = LoadOptions {
        game_folder: Some(fx.game_dir.clone()),
        ..LoadOptions::default()
    };
    let instance = fx
        .manager()
        .load_instance(&fx.source_info(), &options, None)
        .unwrap();
    assert_eq!(instance.game_folder, fx.game_dir);
    assert!(instance.tools().is_empty());
}
