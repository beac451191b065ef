use std::path::Path;

use clap::Subcommand;
use roundbell_core::timer::format_clock;
use roundbell_core::{ConfigError, Preset};

#[derive(Subcommand)]
pub enum PresetAction {
    /// List built-in presets
    List,
    /// Show a preset as JSON ("custom" reads the config file)
    Show {
        /// Preset name
        name: String,
    },
}

pub fn run(action: PresetAction, explicit: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        PresetAction::List => {
            for preset in Preset::builtin() {
                println!("{}", summary(&preset));
            }
        }
        PresetAction::Show { name } => {
            let preset = if name == "custom" {
                let mut config = super::load_config(explicit)?;
                config.preset = name;
                config.resolve_preset()?
            } else {
                Preset::by_name(&name).ok_or(ConfigError::UnknownPreset(name))?
            };
            println!("{}", serde_json::to_string_pretty(&preset)?);
        }
    }
    Ok(())
}

fn summary(preset: &Preset) -> String {
    let rest = match &preset.rest {
        Some(rest) => format!("rest {}", format_clock(rest.duration_secs)),
        None => "no rest".to_string(),
    };
    format!(
        "{:<10} work {}  {:<10}  session {}",
        preset.name,
        format_clock(preset.work.duration_secs),
        rest,
        format_clock(preset.session_secs)
    )
}
