//! lifecycle.rs
//!
//! Owns the single running scene. Build, run and teardown are driven from
//! one exclusive system, so the frame and resize systems never see a scene
//! that is half built or half released.

use std::sync::Arc;

use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::config::LightingConfig;
use crate::systems::bodies::{BodyDescriptor, BodyList};
use crate::systems::scene::OrbitScene;
use crate::systems::{orbits, time, viewport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LifecyclePhase {
    #[default]
    Unmounted,
    Building,
    Running,
    TearingDown,
}

// the scene plus the exact list it was built from
struct ActiveScene {
    scene: OrbitScene,
    bodies: Arc<[BodyDescriptor]>,
}

#[derive(Resource)]
pub struct LifecycleController {
    phase: LifecyclePhase,
    active: Option<ActiveScene>,
    lighting: LightingConfig,
    rng: StdRng,
    builds: u64,
}

impl LifecycleController {
    /// `rng` seeds every starfield this controller generates
    pub fn new(lighting: LightingConfig, rng: StdRng) -> Self {
        Self {
            phase: LifecyclePhase::Unmounted,
            active: None,
            lighting,
            rng,
            builds: 0,
        }
    }

    pub fn phase(&self) -> LifecyclePhase {
        self.phase
    }

    /// The running scene, if any
    pub fn scene(&self) -> Option<&OrbitScene> {
        self.active.as_ref().map(|active| &active.scene)
    }

    /// The list the running scene was built from
    pub fn bodies(&self) -> Option<&Arc<[BodyDescriptor]>> {
        self.active.as_ref().map(|active| &active.bodies)
    }

    /// Number of scenes built over this controller's lifetime
    pub fn builds(&self) -> u64 {
        self.builds
    }

    /// True when running the exact list (by reference) on `mount`
    pub fn is_running(&self, bodies: &Arc<[BodyDescriptor]>, mount: Entity) -> bool {
        self.active
            .as_ref()
            .is_some_and(|active| Arc::ptr_eq(&active.bodies, bodies) && active.scene.mount == mount)
    }

    /// Tears down whatever is running, then builds a scene for `bodies` on
    /// `mount`. Stays unmounted when there is no usable mount.
    pub fn start(&mut self, world: &mut World, bodies: Arc<[BodyDescriptor]>, mount: Option<Entity>) {
        self.stop(world);

        let Some(mount) = mount.filter(|&mount| world.get::<Window>(mount).is_some()) else {
            debug!("No mount window available, staying unmounted");
            return;
        };

        self.set_phase(LifecyclePhase::Building);
        let scene = OrbitScene::build(world, &bodies, mount, &self.lighting, &mut self.rng);
        self.builds += 1;
        info!(
            "Built orbit scene #{} with {} bodies on window {}",
            self.builds,
            scene.bodies.len(),
            mount
        );

        self.active = Some(ActiveScene { scene, bodies });
        self.set_phase(LifecyclePhase::Running);
    }

    /// Releases the running scene. Safe to call any number of times.
    pub fn stop(&mut self, world: &mut World) {
        // taking the scene out stops the frame and resize systems in the same step
        let Some(active) = self.active.take() else {
            return;
        };

        self.set_phase(LifecyclePhase::TearingDown);
        let bodies = active.scene.bodies.len();
        active.scene.release(world);
        info!("Released orbit scene with {} bodies", bodies);
        self.set_phase(LifecyclePhase::Unmounted);
    }

    /// Reconciles the controller with the current inputs: rebuild on a new
    /// list or mount, stop when either is gone.
    pub fn sync(&mut self, world: &mut World, bodies: Option<Arc<[BodyDescriptor]>>, mount: Option<Entity>) {
        match (bodies, mount) {
            (Some(bodies), Some(mount)) => {
                if !self.is_running(&bodies, mount) {
                    self.start(world, bodies, Some(mount));
                }
            }
            _ => self.stop(world),
        }
    }

    fn set_phase(&mut self, phase: LifecyclePhase) {
        debug!("Lifecycle {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
    }
}

/// Per-frame driver: the primary window is the mount, `BodyList` the input
pub fn drive(world: &mut World, windows: &mut QueryState<Entity, With<PrimaryWindow>>) {
    if !world.contains_resource::<LifecycleController>() {
        return;
    }

    let mount = windows.iter(world).next();
    let bodies = world.get_resource::<BodyList>().map(|list| list.0.clone());

    world.resource_scope(|world, mut controller: Mut<LifecycleController>| {
        controller.sync(world, bodies, mount);
    });
}

// treat app exit as disposal
pub fn dispose_on_exit(world: &mut World) {
    let exiting = world
        .get_resource::<Events<AppExit>>()
        .is_some_and(|events| !events.is_empty());
    if !exiting || !world.contains_resource::<LifecycleController>() {
        return;
    }

    world.resource_scope(|world, mut controller: Mut<LifecycleController>| {
        controller.stop(world);
    });
}

pub struct LifecyclePlugin {
    pub lighting: LightingConfig,
    pub seed: Option<u64>,
    pub bodies: Vec<BodyDescriptor>,
}

impl Plugin for LifecyclePlugin {
    fn build(&self, app: &mut App) {
        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        app.insert_resource(LifecycleController::new(self.lighting, rng))
            .insert_resource(BodyList::new(self.bodies.clone()))
            .add_systems(
                Update,
                (
                    drive,
                    viewport::sync_viewport,
                    time::sample.pipe(orbits::animate),
                )
                    .chain(),
            )
            .add_systems(Last, dispose_on_exit);
    }
}
