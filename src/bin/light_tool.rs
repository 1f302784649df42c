use anyhow::{anyhow, bail, Context, Result};
use kestrel_lights::cli::{CliArgs, ToolCommand};
use kestrel_lights::config::{LightManagerConfig, DEFAULT_CONFIG_PATH};
use kestrel_lights::events::PanelEvent;
use kestrel_lights::manager::{LightManager, StatusKind};
use kestrel_lights::panel::swatch_rgb;
use kestrel_lights::{HeadlessToolkit, MemoryScene, NodeRef};
use std::path::Path;
use std::process;
use tracing::info;

type Manager = LightManager<MemoryScene, HeadlessToolkit>;

fn main() {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();
    if let Err(err) = run() {
        eprintln!("error: {err:?}");
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = CliArgs::parse_from_env()?;
    let Some(command) = args.command.clone() else {
        print_usage();
        return Ok(());
    };
    let mut config = match &args.config_path {
        Some(path) => LightManagerConfig::load(path)?,
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => LightManagerConfig::load_or_default(DEFAULT_CONFIG_PATH),
        None => LightManagerConfig::default(),
    };
    config.apply_overrides(&args.overrides);
    config.validate()?;
    if !args.overrides.is_empty() {
        info!(fields = ?args.overrides.applied_fields(), "applied command-line overrides");
    }

    match command {
        ToolCommand::List { scene } => cmd_list(&config, &scene),
        ToolCommand::Categories => {
            for category in config.registry().all_categories() {
                println!("{:<18} {}", category.display_name(), category.persisted_token());
            }
            Ok(())
        }
        ToolCommand::Create { scene, category } => {
            let mut manager = open(&config, &scene)?;
            manager.dispatch(PanelEvent::CreateRequested { category });
            finish(manager, &scene)
        }
        ToolCommand::Delete { scene, light } => {
            let mut manager = open(&config, &scene)?;
            let entry = manager
                .collection()
                .entry_for(&NodeRef::from(light.as_str()))
                .map(|entry| entry.id())
                .ok_or_else(|| anyhow!("no light named '{light}' in {}", scene.display()))?;
            manager.dispatch(PanelEvent::DeleteRequested { entry });
            finish(manager, &scene)
        }
        ToolCommand::Save { scene, name } => {
            let mut manager = open(&config, &scene)?;
            manager.dispatch(PanelEvent::SaveRequested { name });
            check_status(&manager)?;
            if let Some(path) = manager.last_saved() {
                println!("{}", path.display());
            }
            Ok(())
        }
        ToolCommand::Load { scene, file } => {
            let mut manager = open(&config, &scene)?;
            manager.dispatch(PanelEvent::LoadRequested { path: file });
            if let Some(report) = manager.last_load() {
                for node in &report.created {
                    println!("created {node}");
                }
                for skipped in &report.skipped {
                    match &skipped.token {
                        Some(token) => println!("skipped {} (type '{token}')", skipped.name),
                        None => println!("skipped {} (no type)", skipped.name),
                    }
                }
            }
            finish(manager, &scene)
        }
        ToolCommand::Saves => {
            for path in config.codec().list_saves()? {
                println!("{}", path.display());
            }
            Ok(())
        }
        ToolCommand::Help => {
            print_usage();
            Ok(())
        }
    }
}

fn open(config: &LightManagerConfig, scene_path: &Path) -> Result<Manager> {
    let scene = if scene_path.exists() {
        MemoryScene::load_from_path(scene_path)?
    } else {
        info!(path = %scene_path.display(), "scene file not found; starting from an empty scene");
        MemoryScene::new()
    };
    let mut manager = LightManager::from_config(scene, HeadlessToolkit::new(), config);
    manager.open();
    check_status(&manager)?;
    Ok(manager)
}

fn check_status(manager: &Manager) -> Result<()> {
    match manager.status() {
        Some(status) if status.kind == StatusKind::Error => bail!("{}", status.message),
        _ => Ok(()),
    }
}

fn finish(manager: Manager, scene_path: &Path) -> Result<()> {
    check_status(&manager)?;
    if let Some(status) = manager.status() {
        println!("{}", status.message);
    }
    let (scene, _) = manager.into_collection().into_parts();
    scene
        .save_to_path(scene_path)
        .with_context(|| format!("Saving scene back to {}", scene_path.display()))
}

fn cmd_list(config: &LightManagerConfig, scene_path: &Path) -> Result<()> {
    let manager = open(config, scene_path)?;
    let collection = manager.collection();
    if collection.is_empty() {
        println!("no lights in {}", scene_path.display());
        return Ok(());
    }
    for entry in collection.entries() {
        let [r, g, b] = swatch_rgb(entry.color());
        println!(
            "{:<20} {:<18} visible={:<5} intensity={:<3} color=#{r:02x}{g:02x}{b:02x}",
            entry.transform().as_str(),
            entry.category().display_name(),
            entry.checked(),
            entry.intensity(),
        );
    }
    Ok(())
}

fn print_usage() {
    eprintln!(
        "Light Tool

Usage:
  light_tool list <scene>                 List lights with visibility, intensity and color
  light_tool categories                   List light categories and their file tokens
  light_tool create <scene> [category]    Create a light (default category when omitted)
  light_tool delete <scene> <light>       Delete a light by transform or shape name
  light_tool save <scene> [name]          Write the scene's lights to a light file
  light_tool load <scene> <light_file>    Recreate the lights stored in a light file
  light_tool saves                        List light files in the save directory
  light_tool help                         Show this message

Flags:
  --dir <path>         Light file directory (default: per-user data directory)
  --category <name>    Default category for create
  --config <path>      Config file (default: {DEFAULT_CONFIG_PATH})
"
    );
}
