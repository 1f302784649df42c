use crate::config::ConfigOverrides;
use crate::light_types::LightCategory;
use anyhow::{anyhow, bail, Context, Result};
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolCommand {
    List { scene: PathBuf },
    Categories,
    Create { scene: PathBuf, category: Option<LightCategory> },
    Delete { scene: PathBuf, light: String },
    Save { scene: PathBuf, name: Option<String> },
    Load { scene: PathBuf, file: PathBuf },
    Saves,
    Help,
}

#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    pub command: Option<ToolCommand>,
    pub config_path: Option<PathBuf>,
    pub overrides: ConfigOverrides,
}

impl CliArgs {
    pub fn parse_from_env() -> Result<Self> {
        Self::parse(env::args())
    }

    pub fn parse<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut parsed = CliArgs::default();
        let mut positional = Vec::new();
        let mut iter = args.into_iter();
        let _ = iter.next(); // skip program name if present
        while let Some(raw) = iter.next() {
            let arg = raw.as_ref();
            let Some(key) = arg.strip_prefix("--") else {
                positional.push(arg.to_string());
                continue;
            };
            if key == "help" {
                parsed.command = Some(ToolCommand::Help);
                return Ok(parsed);
            }
            let value = iter.next().ok_or_else(|| anyhow!("Expected a value after '{arg}'"))?.as_ref().to_string();
            match key {
                "dir" => parsed.overrides.save_directory = Some(PathBuf::from(value)),
                "category" => {
                    let category =
                        value.parse::<LightCategory>().with_context(|| format!("Invalid category '{value}'"))?;
                    parsed.overrides.default_category = Some(category);
                }
                "config" => parsed.config_path = Some(PathBuf::from(value)),
                _ => bail!("Unknown flag '{arg}'. Supported flags: --dir, --category, --config."),
            }
        }
        parsed.command = parse_command(&positional)?;
        Ok(parsed)
    }
}

fn parse_command(positional: &[String]) -> Result<Option<ToolCommand>> {
    let Some((command, rest)) = positional.split_first() else {
        return Ok(None);
    };
    let scene = |usage: &str| {
        rest.first().map(PathBuf::from).ok_or_else(|| anyhow!("{command} requires a scene path: light_tool {usage}"))
    };
    let command = match command.as_str() {
        "list" => ToolCommand::List { scene: scene("list <scene>")? },
        "categories" => ToolCommand::Categories,
        "create" => {
            let scene = scene("create <scene> [category]")?;
            let category = rest
                .get(1)
                .map(|value| value.parse::<LightCategory>().with_context(|| format!("Invalid category '{value}'")))
                .transpose()?;
            ToolCommand::Create { scene, category }
        }
        "delete" => {
            let scene = scene("delete <scene> <light>")?;
            let light = rest.get(1).cloned().ok_or_else(|| anyhow!("delete missing light name argument"))?;
            ToolCommand::Delete { scene, light }
        }
        "save" => ToolCommand::Save { scene: scene("save <scene> [name]")?, name: rest.get(1).cloned() },
        "load" => {
            let scene = scene("load <scene> <light_file>")?;
            let file = rest.get(1).map(PathBuf::from).ok_or_else(|| anyhow!("load missing light file argument"))?;
            ToolCommand::Load { scene, file }
        }
        "saves" => ToolCommand::Saves,
        "help" | "-h" => ToolCommand::Help,
        other => bail!("Unknown command '{other}'"),
    };
    Ok(Some(command))
}
