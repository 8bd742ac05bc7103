//! scene.rs
//!
//! Builds the full diagram for one descriptor list and tears it down again.
//! Everything a build allocates is recorded on `OrbitScene` so release can
//! hand it all back, whatever state the world is in by then.

use bevy::prelude::*;
use bevy::render::camera::RenderTarget;
use bevy::window::WindowRef;
use rand::Rng;

use crate::config::{
    AMBIENT_COLOR, BODY_EMISSIVE_INTENSITY, CAMERA_DISTANCE, CENTRAL_COLOR, CENTRAL_EMISSIVE,
    CENTRAL_EMISSIVE_INTENSITY, CENTRAL_RADIUS, LightingConfig, SPHERE_SEGMENTS,
};
use crate::systems::bodies::{BodyDescriptor, hex_color, resolve};
use crate::systems::starfield::{Starfield, starfield_material, starfield_mesh};
use crate::systems::viewport::{OutputSurface, aspect_ratio, perspective};

// fallback when the window reports a zero size at build time
const FALLBACK_ASPECT: f32 = 16.0 / 9.0;

// sun tag
#[derive(Component)]
pub struct CentralBody;

// planet tag, index into the descriptor list
#[derive(Component, Debug)]
pub struct OrbitingBody {
    pub index: usize,
}

#[derive(Component)]
pub struct SceneCamera;

/// Motion parameters copied out of a descriptor at build time
#[derive(Debug, Clone, Copy)]
pub struct TrackedBody {
    pub entity: Entity,
    pub speed: f32,
    pub orbit_radius: f32,
}

/// One built diagram. Owns every entity and asset handle it created.
#[derive(Debug)]
pub struct OrbitScene {
    pub mount: Entity,
    pub camera: Entity,
    pub starfield: Entity,
    pub central_body: Entity,
    pub point_light: Entity,
    /// in descriptor order
    pub bodies: Vec<TrackedBody>,
    meshes: Vec<Handle<Mesh>>,
    materials: Vec<Handle<StandardMaterial>>,
}

impl OrbitScene {
    pub fn build<R: Rng>(
        world: &mut World,
        descriptors: &[BodyDescriptor],
        mount: Entity,
        lighting: &LightingConfig,
        rng: &mut R,
    ) -> Self {
        let mut meshes = Vec::with_capacity(descriptors.len() + 2);
        let mut materials = Vec::with_capacity(descriptors.len() + 2);

        // camera, rendering into the mount window
        let (width, height) = world
            .get::<Window>(mount)
            .map(|window| (window.width(), window.height()))
            .unwrap_or((0.0, 0.0));
        let aspect = aspect_ratio(width, height).unwrap_or(FALLBACK_ASPECT);

        let camera = world
            .spawn((
                Camera3d::default(),
                Camera {
                    target: RenderTarget::Window(WindowRef::Entity(mount)),
                    ..default()
                },
                perspective(aspect),
                Transform::from_xyz(0.0, 0.0, CAMERA_DISTANCE).looking_at(Vec3::ZERO, Vec3::Y),
                OutputSurface { width, height },
                SceneCamera,
            ))
            .id();

        // starfield
        let star_mesh = add_asset(world, starfield_mesh(rng));
        let star_material = add_asset(world, starfield_material());
        meshes.push(star_mesh.clone());
        materials.push(star_material.clone());

        let starfield = world
            .spawn((
                Mesh3d(star_mesh),
                MeshMaterial3d(star_material),
                Transform::default(),
                Starfield,
                Name::new("Starfield"),
            ))
            .id();

        // central body
        let sun_mesh = add_asset(world, sphere(CENTRAL_RADIUS));
        let sun_material = add_asset(
            world,
            StandardMaterial {
                base_color: hex_color(CENTRAL_COLOR),
                emissive: scaled_emissive(hex_color(CENTRAL_EMISSIVE), CENTRAL_EMISSIVE_INTENSITY),
                ..default()
            },
        );
        meshes.push(sun_mesh.clone());
        materials.push(sun_material.clone());

        let central_body = world
            .spawn((
                Mesh3d(sun_mesh),
                MeshMaterial3d(sun_material),
                Transform::default(),
                CentralBody,
                Name::new("Central body"),
            ))
            .id();

        // light rig: point light inside the sun plus a weak fill
        let point_light = world
            .spawn((
                PointLight {
                    color: Color::WHITE,
                    intensity: lighting.point_intensity,
                    range: lighting.point_range,
                    ..default()
                },
                Transform::from_xyz(0.0, 0.0, 0.0),
            ))
            .id();

        world.insert_resource(AmbientLight {
            color: hex_color(AMBIENT_COLOR),
            brightness: lighting.ambient_brightness,
            ..default()
        });

        // orbiting bodies, in descriptor order
        let mut bodies = Vec::with_capacity(descriptors.len());
        for (index, descriptor) in descriptors.iter().enumerate() {
            let body = resolve(index, descriptor);

            // a zero-sized body still orbits, it just has nothing to draw
            let drawable = body.is_visible().then(|| {
                let mesh = add_asset(world, sphere(body.size));
                let material = add_asset(
                    world,
                    StandardMaterial {
                        base_color: body.color,
                        emissive: scaled_emissive(body.color, BODY_EMISSIVE_INTENSITY),
                        ..default()
                    },
                );
                meshes.push(mesh.clone());
                materials.push(material.clone());
                (Mesh3d(mesh), MeshMaterial3d(material))
            });

            let mut entity = world.spawn((
                Transform::from_xyz(body.orbit_radius, 0.0, 0.0),
                OrbitingBody { index },
                Name::new(descriptor.name.clone()),
            ));
            if let Some(drawable) = drawable {
                entity.insert(drawable);
            }

            bodies.push(TrackedBody {
                entity: entity.id(),
                speed: body.speed,
                orbit_radius: body.orbit_radius,
            });
        }

        Self {
            mount,
            camera,
            starfield,
            central_body,
            point_light,
            bodies,
            meshes,
            materials,
        }
    }

    #[cfg(test)]
    pub fn mesh_handles(&self) -> &[Handle<Mesh>] {
        &self.meshes
    }

    #[cfg(test)]
    pub fn material_handles(&self) -> &[Handle<StandardMaterial>] {
        &self.materials
    }

    /// Despawns everything and frees every asset this scene added. Entities or
    /// assets that are already gone are skipped.
    pub fn release(self, world: &mut World) {
        let renderables = self
            .bodies
            .iter()
            .map(|body| body.entity)
            .chain([self.starfield, self.central_body, self.point_light]);
        for entity in renderables {
            despawn_if_present(world, entity);
        }

        if let Some(mut assets) = world.get_resource_mut::<Assets<Mesh>>() {
            for handle in &self.meshes {
                assets.remove(handle);
            }
        }
        if let Some(mut assets) = world.get_resource_mut::<Assets<StandardMaterial>>() {
            for handle in &self.materials {
                assets.remove(handle);
            }
        }

        if let Some(mut ambient) = world.get_resource_mut::<AmbientLight>() {
            ambient.brightness = 0.0;
        }

        // detach the output surface last
        if !despawn_if_present(world, self.camera) {
            debug!("Scene camera already detached");
        }
    }
}

fn despawn_if_present(world: &mut World, entity: Entity) -> bool {
    match world.get_entity_mut(entity) {
        Ok(entity) => {
            entity.despawn();
            true
        }
        Err(_) => false,
    }
}

fn add_asset<A: Asset>(world: &mut World, asset: A) -> Handle<A> {
    world
        .get_resource_or_insert_with(Assets::<A>::default)
        .add(asset)
}

fn sphere(radius: f32) -> Mesh {
    Sphere::new(radius).mesh().uv(SPHERE_SEGMENTS, SPHERE_SEGMENTS)
}

// same hue as the base color, glowing at a fraction of full strength
fn scaled_emissive(color: Color, intensity: f32) -> LinearRgba {
    let linear = color.to_linear();
    LinearRgba::rgb(
        linear.red * intensity,
        linear.green * intensity,
        linear.blue * intensity,
    )
}
