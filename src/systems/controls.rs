//! controls.rs
//!
//! Minimal stand-in for the editing side: keyboard shortcuts for the clock
//! plus save/load of the active list through the configured store. Store
//! calls run on their own tokio runtime and are collected once finished.

use std::sync::Arc;

use bevy::prelude::*;
use thiserror::Error;
use tokio::task::JoinHandle;

use crate::config::StoreConfig;
use crate::systems::bodies::{BodyDescriptor, BodyList, DescriptorError, validate_all};
use crate::systems::store::{ConfigurationStore, SavedConfiguration, StoreError};
use crate::systems::time::AnimationClock;

pub struct ControlsPlugin {
    pub store: StoreConfig,
    pub initial_bodies: Vec<BodyDescriptor>,
}

impl Plugin for ControlsPlugin {
    fn build(&self, app: &mut App) {
        match StoreWorker::new(ConfigurationStore::from_config(&self.store)) {
            Ok(worker) => {
                app.insert_resource(worker);
            }
            Err(e) => error!("Save/load disabled: {}", e),
        }

        app.insert_resource(InitialBodies(self.initial_bodies.clone()))
            .add_systems(Update, (handle_keys, apply_store_results));
    }
}

/// The list `R` goes back to
#[derive(Resource, Debug, Clone)]
pub struct InitialBodies(pub Vec<BodyDescriptor>);

pub enum StoreOutcome {
    Saved(Result<(), StoreError>),
    Loaded(Result<Vec<SavedConfiguration>, StoreError>),
}

#[derive(Resource)]
pub struct StoreWorker {
    runtime: tokio::runtime::Runtime,
    store: Arc<ConfigurationStore>,
    pending: Vec<JoinHandle<StoreOutcome>>,
}

impl StoreWorker {
    pub fn new(store: ConfigurationStore) -> Result<Self, StoreError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("orrery-store")
            .enable_all()
            .build()
            .map_err(|e| StoreError::Runtime(e.to_string()))?;

        Ok(Self {
            runtime,
            store: Arc::new(store),
            pending: Vec::new(),
        })
    }

    pub fn save(&mut self, planets: Arc<[BodyDescriptor]>) {
        let store = self.store.clone();
        self.pending.push(
            self.runtime
                .spawn(async move { StoreOutcome::Saved(store.save(&planets).await) }),
        );
    }

    pub fn load(&mut self) {
        let store = self.store.clone();
        self.pending
            .push(self.runtime.spawn(async move { StoreOutcome::Loaded(store.load().await) }));
    }

    #[cfg(test)]
    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }

    /// Outcomes of every job that has completed since the last call
    pub fn finished(&mut self) -> Vec<StoreOutcome> {
        let mut outcomes = Vec::new();

        for handle in std::mem::take(&mut self.pending) {
            if !handle.is_finished() {
                self.pending.push(handle);
                continue;
            }
            // already complete, so this does not wait
            match self.runtime.block_on(handle) {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => error!("Store job failed: {}", e),
            }
        }

        outcomes
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum LoadRejected {
    #[error("no saved configurations found")]
    Empty,
    #[error(transparent)]
    Invalid(#[from] DescriptorError),
}

/// Picks the most recent saved list and checks it before it replaces the active one
pub fn choose_configuration(saved: &[SavedConfiguration]) -> Result<Vec<BodyDescriptor>, LoadRejected> {
    let latest = saved.first().ok_or(LoadRejected::Empty)?;
    validate_all(&latest.planets)?;
    Ok(latest.planets.clone())
}

fn handle_keys(
    keys: Res<ButtonInput<KeyCode>>,
    mut clock: ResMut<AnimationClock>,
    bodies: Option<Res<BodyList>>,
    initial: Res<InitialBodies>,
    worker: Option<ResMut<StoreWorker>>,
    mut commands: Commands,
) {
    if keys.just_pressed(KeyCode::Space) {
        clock.toggle_pause();
    }
    if keys.just_pressed(KeyCode::Equal) {
        clock.speed_up();
    }
    if keys.just_pressed(KeyCode::Minus) {
        clock.slow_down();
    }
    if keys.just_pressed(KeyCode::Digit0) {
        clock.reset_to_normal();
    }

    if keys.just_pressed(KeyCode::KeyR) {
        info!("Restoring initial configuration");
        commands.insert_resource(BodyList::new(initial.0.clone()));
    }

    let Some(mut worker) = worker else {
        return;
    };

    if keys.just_pressed(KeyCode::KeyS) {
        match bodies {
            Some(bodies) if !bodies.0.is_empty() => worker.save(bodies.0.clone()),
            _ => warn!("No planets to save!"),
        }
    }
    if keys.just_pressed(KeyCode::KeyL) {
        worker.load();
    }
}

fn apply_store_results(worker: Option<ResMut<StoreWorker>>, mut commands: Commands) {
    let Some(mut worker) = worker else {
        return;
    };

    for outcome in worker.finished() {
        match outcome {
            StoreOutcome::Saved(Ok(())) => info!("Configuration saved"),
            StoreOutcome::Saved(Err(e)) => error!("Failed to save configuration: {}", e),
            StoreOutcome::Loaded(Ok(saved)) => match choose_configuration(&saved) {
                Ok(planets) => {
                    info!("Loaded configuration with {} bodies", planets.len());
                    commands.insert_resource(BodyList::new(planets));
                }
                Err(e) => warn!("Not applying saved configuration: {}", e),
            },
            StoreOutcome::Loaded(Err(e)) => error!("Failed to load configurations: {}", e),
        }
    }
}
