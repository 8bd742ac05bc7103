use bevy::prelude::*;

pub mod bodies;
pub mod controls;
pub mod lifecycle;
pub mod orbits;
pub mod scene;
pub mod starfield;
pub mod store;
pub mod time;
pub mod ui;
pub mod viewport;

use crate::config::OrreryConfig;

/// Everything the orrery window needs, configured from one file
pub struct OrreryPlugin {
    pub config: OrreryConfig,
}

impl Plugin for OrreryPlugin {
    fn build(&self, app: &mut App) {
        let config = &self.config;

        app.add_plugins(time::ClockPlugin)
            .add_plugins(lifecycle::LifecyclePlugin {
                lighting: config.lighting,
                seed: config.starfield.seed,
                bodies: config.bodies.clone(),
            })
            .add_plugins(controls::ControlsPlugin {
                store: config.store.clone(),
                initial_bodies: config.bodies.clone(),
            })
            .add_plugins(ui::UIPlugin);
    }
}
