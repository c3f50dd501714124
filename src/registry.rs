//! Registry of live cameras.
//!
//! The registry tracks two independent selections:
//!
//! - the **active view** camera, whose geometry the render pass projects through
//! - the **active control** camera, which navigation input moves
//!
//! Both start out pointing at the first camera spawned. Cameras are handed out
//! as `Arc<Camera>` so an input thread can hold on to one; the registry itself
//! is owned by whatever drives the render loop.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use glam::{DVec2, DVec3};
use hecs::{Entity, World};

use crate::camera::{Camera, CameraId};
use crate::config::CameraConfig;
use crate::ecs::{CameraGizmo, GizmoTransform};
use crate::error::RegistryError;
use crate::projection::Projection;

/// All live cameras plus the active view/control selections.
#[derive(Default)]
pub struct CameraRegistry {
    cameras: BTreeMap<CameraId, Arc<Camera>>,
    gizmos: HashMap<CameraId, Entity>,
    world: World,
    active_view: Option<CameraId>,
    active_control: Option<CameraId>,
    next_id: u64,
}

impl CameraRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create and register a camera.
    ///
    /// The first camera in an empty registry becomes both the active view and
    /// the active control camera.
    pub fn spawn(&mut self, config: CameraConfig) -> CameraId {
        let id = CameraId(self.next_id);
        self.next_id += 1;
        self.cameras.insert(id, Arc::new(Camera::new(id, config)));
        if self.active_view.is_none() {
            self.active_view = Some(id);
        }
        if self.active_control.is_none() {
            self.active_control = Some(id);
        }
        log::debug!("camera {id}: created");
        id
    }

    /// Create a camera that is drawn in the scene while another camera is the
    /// active view.
    pub fn spawn_with_gizmo(&mut self, config: CameraConfig) -> CameraId {
        let id = self.spawn(config);
        let entity = self.world.spawn((
            CameraGizmo {
                camera: id,
                visible: self.active_view != Some(id),
            },
            GizmoTransform::default(),
        ));
        self.gizmos.insert(id, entity);
        id
    }

    /// Remove a camera.
    ///
    /// If it held the active view or control role, the role passes to the
    /// remaining camera with the lowest id, or to nobody if none remain.
    /// Transitions driving this camera are dropped by the scheduler on its next
    /// tick; use [`Scheduler::remove_camera`](crate::Scheduler::remove_camera)
    /// to drop them immediately.
    pub fn remove(&mut self, id: CameraId) -> Option<Arc<Camera>> {
        let camera = self.cameras.remove(&id)?;
        if let Some(entity) = self.gizmos.remove(&id) {
            if self.world.despawn(entity).is_err() {
                log::warn!("camera {id}: gizmo entity {entity:?} was already gone");
            }
        }
        let fallback = self.cameras.keys().next().copied();
        if self.active_view == Some(id) {
            self.active_view = None;
            if let Some(next) = fallback {
                self.show_gizmo(next, false);
                self.active_view = Some(next);
                camera_mark_dirty(&self.cameras, next);
            }
            log::debug!("camera {id}: removed while active view, now {:?}", self.active_view);
        }
        if self.active_control == Some(id) {
            self.active_control = fallback;
            log::debug!(
                "camera {id}: removed while active control, now {:?}",
                self.active_control
            );
        }
        log::debug!("camera {id}: removed");
        Some(camera)
    }

    pub fn camera(&self, id: CameraId) -> Option<Arc<Camera>> {
        self.cameras.get(&id).cloned()
    }

    pub fn try_camera(&self, id: CameraId) -> Result<Arc<Camera>, RegistryError> {
        self.camera(id).ok_or(RegistryError::UnknownCamera(id))
    }

    pub fn contains(&self, id: CameraId) -> bool {
        self.cameras.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.cameras.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cameras.is_empty()
    }

    /// Live camera ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = CameraId> + '_ {
        self.cameras.keys().copied()
    }

    /// Live cameras in ascending id order.
    pub fn cameras(&self) -> impl Iterator<Item = &Arc<Camera>> + '_ {
        self.cameras.values()
    }

    /// The `index`-th live camera in ascending id order.
    pub fn nth(&self, index: usize) -> Option<CameraId> {
        self.cameras.keys().nth(index).copied()
    }

    pub fn active_view_id(&self) -> Option<CameraId> {
        self.active_view
    }

    pub fn active_control_id(&self) -> Option<CameraId> {
        self.active_control
    }

    pub fn active_view(&self) -> Option<Arc<Camera>> {
        self.active_view.and_then(|id| self.camera(id))
    }

    pub fn active_control(&self) -> Option<Arc<Camera>> {
        self.active_control.and_then(|id| self.camera(id))
    }

    /// Look through a different camera.
    ///
    /// Does nothing if `id` is already the active view or is unknown. Otherwise
    /// the old view camera's gizmo is shown, the new one's hidden, and both
    /// cameras are marked dirty.
    pub fn set_active_view(&mut self, id: CameraId) {
        if self.active_view == Some(id) || !self.contains(id) {
            return;
        }
        if let Some(previous) = self.active_view {
            self.show_gizmo(previous, true);
            camera_mark_dirty(&self.cameras, previous);
        }
        self.show_gizmo(id, false);
        camera_mark_dirty(&self.cameras, id);
        log::debug!("camera {id}: now active view (was {:?})", self.active_view);
        self.active_view = Some(id);
    }

    /// Route navigation input to a different camera. Unknown ids are ignored.
    pub fn set_active_control(&mut self, id: CameraId) {
        if self.active_control == Some(id) || !self.contains(id) {
            return;
        }
        log::debug!("camera {id}: now active control (was {:?})", self.active_control);
        self.active_control = Some(id);
    }

    /// Make `id` both the active view and the active control camera.
    pub fn set_active(&mut self, id: CameraId) {
        self.set_active_view(id);
        self.set_active_control(id);
    }

    /// Projection through the active view camera, if it has usable geometry.
    pub fn projection(&self) -> Option<Projection> {
        self.active_view()
            .and_then(|camera| camera.geometry())
            .map(Projection::new)
    }

    /// Eye position of the active view camera.
    pub fn camera_position(&self) -> Option<DVec3> {
        self.active_view().and_then(|camera| camera.position())
    }

    /// World-space viewport size of the active view camera.
    pub fn viewport_dimensions(&self) -> Option<DVec2> {
        self.active_view().map(|camera| camera.viewport_dimensions())
    }

    /// Move the active control camera to a pose.
    pub fn set_location(&self, phi: f64, theta: f64, rho: f64) -> bool {
        self.active_control()
            .is_some_and(|camera| camera.set_location(phi, theta, rho))
    }

    /// The gizmo world, for render layers that walk it directly.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Gizmos that should currently be drawn.
    pub fn visible_gizmos(&self) -> Vec<(CameraId, GizmoTransform)> {
        let mut visible: Vec<_> = self
            .world
            .query::<(&CameraGizmo, &GizmoTransform)>()
            .iter()
            .filter(|(_, (gizmo, _))| gizmo.visible)
            .map(|(_, (gizmo, transform))| (gizmo.camera, *transform))
            .collect();
        visible.sort_by_key(|(camera, _)| *camera);
        visible
    }

    /// Move a camera's gizmo to its current eye position.
    pub(crate) fn sync_gizmo(&mut self, id: CameraId) {
        let Some(&entity) = self.gizmos.get(&id) else {
            return;
        };
        let Some(geometry) = self.cameras.get(&id).and_then(|c| c.geometry()) else {
            return;
        };
        if let Ok(mut transform) = self.world.get::<&mut GizmoTransform>(entity) {
            transform.position = geometry.c;
            transform.facing = -geometry.n;
        }
    }

    fn show_gizmo(&mut self, id: CameraId, visible: bool) {
        let Some(&entity) = self.gizmos.get(&id) else {
            return;
        };
        if let Ok(mut gizmo) = self.world.get::<&mut CameraGizmo>(entity) {
            gizmo.visible = visible;
        }
    }
}

impl std::fmt::Debug for CameraRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CameraRegistry")
            .field("cameras", &self.cameras)
            .field("gizmos", &self.gizmos)
            .field("active_view", &self.active_view)
            .field("active_control", &self.active_control)
            .finish_non_exhaustive()
    }
}

fn camera_mark_dirty(cameras: &BTreeMap<CameraId, Arc<Camera>>, id: CameraId) {
    if let Some(camera) = cameras.get(&id) {
        camera.mark_dirty();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_with(n: usize) -> (CameraRegistry, Vec<CameraId>) {
        let mut registry = CameraRegistry::new();
        let ids = (0..n)
            .map(|_| registry.spawn_with_gizmo(CameraConfig::default()))
            .collect();
        (registry, ids)
    }

    fn settle(registry: &CameraRegistry) {
        for camera in registry.cameras() {
            camera.refresh(DVec3::ZERO).unwrap();
        }
    }

    #[test]
    fn empty_registry_has_no_active_cameras() {
        let registry = CameraRegistry::new();
        assert!(registry.active_view().is_none());
        assert!(registry.active_control().is_none());
        assert!(registry.projection().is_none());
        assert!(registry.camera_position().is_none());
    }

    #[test]
    fn remove_tolerates_missing_gizmo_entity() {
        let (mut registry, ids) = registry_with(2);
        let entity = registry.gizmos[&ids[1]];
        registry.world.despawn(entity).unwrap();
        assert!(registry.remove(ids[1]).is_some());
        assert!(!registry.gizmos.contains_key(&ids[1]));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn first_camera_becomes_active() {
        let (registry, ids) = registry_with(3);
        assert_eq!(registry.active_view_id(), Some(ids[0]));
        assert_eq!(registry.active_control_id(), Some(ids[0]));
        assert_eq!(ids, vec![CameraId(0), CameraId(1), CameraId(2)]);
    }

    #[test]
    fn set_active_view_same_id_is_noop() {
        let (mut registry, ids) = registry_with(2);
        settle(&registry);
        registry.set_active_view(ids[0]);
        assert!(registry.cameras().all(|c| !c.is_update_required()));
        assert_eq!(registry.visible_gizmos().len(), 1);
    }

    #[test]
    fn set_active_view_swaps_gizmos_and_dirties_both() {
        let (mut registry, ids) = registry_with(3);
        settle(&registry);
        registry.set_active_view(ids[1]);

        assert_eq!(registry.active_view_id(), Some(ids[1]));
        assert_eq!(registry.active_control_id(), Some(ids[0]));
        let visible: Vec<_> = registry.visible_gizmos().iter().map(|(id, _)| *id).collect();
        assert_eq!(visible, vec![ids[0], ids[2]]);
        assert!(registry.camera(ids[0]).unwrap().is_update_required());
        assert!(registry.camera(ids[1]).unwrap().is_update_required());
        assert!(!registry.camera(ids[2]).unwrap().is_update_required());
    }

    #[test]
    fn unknown_ids_are_ignored() {
        let (mut registry, ids) = registry_with(1);
        registry.set_active(CameraId(42));
        assert_eq!(registry.active_view_id(), Some(ids[0]));
        assert_eq!(registry.active_control_id(), Some(ids[0]));
        assert_eq!(
            registry.try_camera(CameraId(42)).unwrap_err(),
            RegistryError::UnknownCamera(CameraId(42))
        );
    }

    #[test]
    fn removing_active_camera_promotes_lowest_id() {
        let (mut registry, ids) = registry_with(3);
        registry.set_active_control(ids[2]);
        assert!(registry.remove(ids[0]).is_some());

        assert_eq!(registry.active_view_id(), Some(ids[1]));
        assert_eq!(registry.active_control_id(), Some(ids[2]));
        let visible: Vec<_> = registry.visible_gizmos().iter().map(|(id, _)| *id).collect();
        assert_eq!(visible, vec![ids[2]]);
    }

    #[test]
    fn removing_last_camera_clears_selection() {
        let (mut registry, ids) = registry_with(1);
        registry.remove(ids[0]);
        assert!(registry.is_empty());
        assert_eq!(registry.active_view_id(), None);
        assert_eq!(registry.active_control_id(), None);
        assert!(registry.remove(ids[0]).is_none());
    }

    #[test]
    fn ids_are_not_reused() {
        let (mut registry, ids) = registry_with(2);
        registry.remove(ids[1]);
        assert_eq!(registry.spawn(CameraConfig::default()), CameraId(2));
    }

    #[test]
    fn gizmo_follows_eye() {
        let (mut registry, ids) = registry_with(2);
        settle(&registry);
        registry.sync_gizmo(ids[1]);
        let (_, transform) = registry.visible_gizmos()[0];
        assert!(transform.position.abs_diff_eq(DVec3::new(-9.0, 0.0, 0.0), 1e-12));
        assert!(transform.facing.abs_diff_eq(DVec3::X, 1e-12));
    }
}
