use bevy::prelude::*;
use bevy::window::WindowResized;

use crate::config::{CAMERA_FAR, CAMERA_FOV_DEGREES, CAMERA_NEAR};
use crate::systems::lifecycle::LifecycleController;

/// Size of the surface the scene camera renders into, in logical pixels.
/// The window owns the actual swapchain; this tracks what the camera was told.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct OutputSurface {
    pub width: f32,
    pub height: f32,
}

pub fn aspect_ratio(width: f32, height: f32) -> Option<f32> {
    let valid = width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0;
    valid.then(|| width / height)
}

pub fn perspective(aspect_ratio: f32) -> Projection {
    Projection::Perspective(PerspectiveProjection {
        fov: CAMERA_FOV_DEGREES.to_radians(),
        aspect_ratio,
        near: CAMERA_NEAR,
        far: CAMERA_FAR,
        ..default()
    })
}

/// Returns false for degenerate sizes (e.g. a minimized window), leaving the
/// previous ratio in place
pub fn apply_resize(
    projection: &mut Projection,
    surface: &mut OutputSurface,
    width: f32,
    height: f32,
) -> bool {
    let Some(aspect) = aspect_ratio(width, height) else {
        return false;
    };

    // bevy recomputes the projection matrix when this component changes
    if let Projection::Perspective(perspective) = projection {
        perspective.aspect_ratio = aspect;
    }
    surface.width = width;
    surface.height = height;
    true
}

// keep the running scene's camera in step with its window
pub fn sync_viewport(
    mut resized: EventReader<WindowResized>,
    controller: Res<LifecycleController>,
    mut cameras: Query<(&mut Projection, &mut OutputSurface)>,
) {
    let Some(scene) = controller.scene() else {
        resized.clear();
        return;
    };

    for event in resized.read() {
        if event.window != scene.mount {
            continue;
        }
        if let Ok((mut projection, mut surface)) = cameras.get_mut(scene.camera) {
            if !apply_resize(&mut projection, &mut surface, event.width, event.height) {
                debug!("Ignoring degenerate resize {}x{}", event.width, event.height);
            }
        }
    }
}
