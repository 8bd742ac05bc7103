use std::f64::consts::TAU;

use bevy::prelude::*;

use crate::config::{BODY_SPIN_PER_FRAME, STARFIELD_SPIN_PER_FRAME};
use crate::systems::lifecycle::LifecycleController;
use crate::systems::scene::OrbitScene;

/// Orbit angle in [0, 2π). Computed in f64 so long-running clocks keep precision.
pub fn orbit_angle(clock: f64, speed: f32) -> f64 {
    (clock * speed as f64).rem_euclid(TAU)
}

// position on the XZ plane, returned as (x, z)
pub fn orbital_position(clock: f64, speed: f32, orbit_radius: f32) -> Vec2 {
    let angle = orbit_angle(clock, speed);
    let radius = orbit_radius as f64;
    Vec2::new((angle.cos() * radius) as f32, (angle.sin() * radius) as f32)
}

/// Advances every tracked body to `clock` and applies one frame of spin.
/// Positions depend only on `clock`; spin accumulates per call.
pub fn step(scene: &OrbitScene, clock: f64, transforms: &mut Query<&mut Transform>) {
    for body in &scene.bodies {
        let Ok(mut transform) = transforms.get_mut(body.entity) else {
            continue;
        };
        let position = orbital_position(clock, body.speed, body.orbit_radius);
        transform.translation.x = position.x;
        transform.translation.z = position.y;
        transform.rotate_y(BODY_SPIN_PER_FRAME);
    }

    if let Ok(mut transform) = transforms.get_mut(scene.starfield) {
        transform.rotate_y(STARFIELD_SPIN_PER_FRAME);
    }
}

// frame callback, fed by the clock sample
pub fn animate(
    In(clock): In<f64>,
    controller: Res<LifecycleController>,
    mut transforms: Query<&mut Transform>,
) {
    if let Some(scene) = controller.scene() {
        step(scene, clock, &mut transforms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::system::RunSystemOnce;
    use std::f64::consts::PI;

    use crate::systems::bodies::BodyDescriptor;
    use crate::systems::testing::{seeded_controller, test_world};

    fn run_step(world: &mut World, clock: f64) {
        world
            .run_system_once(
                move |controller: Res<LifecycleController>, mut transforms: Query<&mut Transform>| {
                    step(controller.scene().unwrap(), clock, &mut transforms);
                },
            )
            .unwrap();
    }

    #[test]
    fn test_known_position() {
        let position = orbital_position(10.0, 0.6, 22.0);

        assert!((orbit_angle(10.0, 0.6) - 6.0).abs() < 1e-9);
        assert!((position.x - 22.0 * 6.0f32.cos()).abs() < 1e-4);
        assert!((position.y - 22.0 * 6.0f32.sin()).abs() < 1e-4);
        assert!((position.x - 21.124).abs() < 0.01);
        assert!((position.y - -6.147).abs() < 0.01);
    }

    #[test]
    fn test_stays_on_circle() {
        for &(speed, radius) in &[(1.0f32, 21.0f32), (-0.3, 45.0), (0.15, 55.0), (2.5, 0.0)] {
            for i in 0..200 {
                let clock = i as f64 * 0.37;
                let p = orbital_position(clock, speed, radius);
                assert!((p.length() - radius).abs() < 1e-3, "speed {speed} radius {radius} t {clock}");
            }
        }
    }

    #[test]
    fn test_periodic() {
        let speed = 0.8f32;
        let period = 2.0 * PI / speed as f64;

        for i in 0..20 {
            let clock = i as f64 * 1.3;
            let a = orbital_position(clock, speed, 24.0);
            let b = orbital_position(clock + period, speed, 24.0);
            assert!(a.distance(b) < 1e-3);
        }
    }

    #[test]
    fn test_zero_speed_is_stationary() {
        for clock in [0.0, 1.0, 1234.5, 1e9] {
            assert_eq!(orbital_position(clock, 0.0, 30.0), Vec2::new(30.0, 0.0));
        }
    }

    #[test]
    fn test_large_clock_keeps_precision() {
        // a clock that has run for weeks
        let clock = 1.7e8;
        let p = orbital_position(clock, 0.6, 22.0);
        assert!((p.length() - 22.0).abs() < 1e-3);
    }

    #[test]
    fn test_step_moves_and_spins() {
        let (mut world, window) = test_world();
        let mut controller = seeded_controller(1);
        let bodies = vec![
            BodyDescriptor::new("Earth", 4.0, None, 0.6, 22.0),
            BodyDescriptor::new("Still", 1.0, None, 0.0, 30.0),
        ];
        controller.start(&mut world, bodies.into(), Some(window));
        let scene = controller.scene().unwrap();
        let (earth, still, stars) = (scene.bodies[0].entity, scene.bodies[1].entity, scene.starfield);
        world.insert_resource(controller);

        run_step(&mut world, 10.0);
        let first = *world.get::<Transform>(earth).unwrap();
        run_step(&mut world, 10.0);
        let second = *world.get::<Transform>(earth).unwrap();

        // same clock, same place
        assert_eq!(first.translation, second.translation);
        assert!((first.translation.x - 21.124).abs() < 0.01);
        assert_eq!(first.translation.y, 0.0);
        assert!((first.translation.z - -6.147).abs() < 0.01);

        // spin accumulates per frame regardless of speed
        assert!(second.rotation.abs_diff_eq(Quat::from_rotation_y(0.04), 1e-6));
        let still = world.get::<Transform>(still).unwrap();
        assert_eq!(still.translation, Vec3::new(30.0, 0.0, 0.0));
        assert!(still.rotation.abs_diff_eq(Quat::from_rotation_y(0.04), 1e-6));

        let stars = world.get::<Transform>(stars).unwrap();
        assert!(stars.rotation.abs_diff_eq(Quat::from_rotation_y(0.001), 1e-6));
    }

    fn fixed_clock() -> f64 {
        3.0
    }

    #[test]
    fn test_animate_without_scene_is_noop() {
        let (mut world, _) = test_world();
        world.insert_resource(seeded_controller(1));

        world.run_system_once(fixed_clock.pipe(animate)).unwrap();
    }

    #[test]
    fn test_empty_scene_animates() {
        let (mut world, window) = test_world();
        let mut controller = seeded_controller(1);
        controller.start(&mut world, Vec::new().into(), Some(window));
        world.insert_resource(controller);

        run_step(&mut world, 1.0);
        run_step(&mut world, 2.0);
    }
}
