use std::path::PathBuf;

use bevy::prelude::*;
use bevy::window::WindowResolution;
use clap::Parser;

mod config;
mod systems;

use config::{DEFAULT_CONFIG_PATH, OrreryConfig, load_config};
use systems::OrreryPlugin;

#[derive(Parser, Debug)]
#[command(name = "orrery", about = "Animated orbital diagram")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Seed for the starfield, overrides the configuration file
    #[arg(long)]
    seed: Option<u64>,
}

// config problems found before the log plugin exists, reported at startup
#[derive(Resource, Default)]
struct ConfigWarning(Option<String>);

fn main() -> bevy::app::AppExit {
    let cli = Cli::parse();

    let (mut config, warning) = match load_config(&cli.config) {
        Ok(config) => (config, None),
        Err(e) => (
            OrreryConfig::default(),
            Some(format!("{}, using defaults", e)),
        ),
    };
    if cli.seed.is_some() {
        config.starfield.seed = cli.seed;
    }

    let window = Window {
        title: config.window.title.clone(),
        resolution: WindowResolution::new(config.window.width, config.window.height),
        ..default()
    };

    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(window),
            ..default()
        }))
        .insert_resource(ClearColor(Color::srgb(0.0, 0.0, 0.0)))
        .insert_resource(ConfigWarning(warning))
        .add_plugins(OrreryPlugin { config })
        .add_systems(Startup, report_config)
        .run()
}

fn report_config(warning: Res<ConfigWarning>, bodies: Res<systems::bodies::BodyList>) {
    if let Some(message) = &warning.0 {
        warn!("{}", message);
    }
    info!("Starting with {} bodies", bodies.0.len());
}
