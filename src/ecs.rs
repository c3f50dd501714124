//! ECS components for camera visualization.
//!
//! A camera spawned with [`CameraRegistry::spawn_with_gizmo`](crate::CameraRegistry::spawn_with_gizmo)
//! gets an entity in the registry's `hecs` world carrying a [`CameraGizmo`] and
//! a [`GizmoTransform`]. The render layer draws whichever gizmos are visible,
//! so every camera except the one being looked through can show up in the scene.
//!
//! # Example
//!
//! ```ignore
//! for (camera, transform) in registry.visible_gizmos() {
//!     draw_frustum_marker(transform.position, transform.facing);
//! }
//! ```

use glam::DVec3;

use crate::camera::CameraId;

/// Marks an entity as the visual stand-in for a camera.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CameraGizmo {
    /// Camera this gizmo represents.
    pub camera: CameraId,
    /// Hidden while its camera is the active view.
    pub visible: bool,
}

/// Where to draw a gizmo. Follows the camera's eye after every recompute.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GizmoTransform {
    /// Eye position.
    pub position: DVec3,
    /// Viewing direction, toward the scene origin.
    pub facing: DVec3,
}

impl Default for GizmoTransform {
    fn default() -> Self {
        Self {
            position: DVec3::ZERO,
            facing: DVec3::NEG_Z,
        }
    }
}
