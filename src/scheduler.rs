//! Per-frame camera upkeep.
//!
//! One [`Scheduler`] drives every camera and every fluid transition from the
//! render loop: call [`Scheduler::tick`] once per frame, before projecting.
//! Each tick advances running transitions, then refreshes every camera whose
//! pose or scene origin changed. Cameras that are not being viewed are
//! refreshed too, so switching the active view never shows stale geometry.

use std::sync::Arc;
use std::time::{Duration, Instant};

use glam::DVec3;

use crate::camera::{Camera, CameraId};
use crate::error::GeometryError;
use crate::registry::CameraRegistry;
use crate::transition::{Easing, FluidTransition, PoseDelta, TransitionId};

/// What happened during one [`Scheduler::tick`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickReport {
    /// Cameras whose geometry was rebuilt.
    pub recomputed: Vec<CameraId>,
    /// Cameras whose screen plane could not be derived this tick.
    pub failed: Vec<(CameraId, GeometryError)>,
    /// Transitions that reached their target.
    pub finished: Vec<TransitionId>,
}

/// Drives camera recompute and fluid transitions.
#[derive(Debug)]
pub struct Scheduler {
    frame_interval: Duration,
    last_tick: Option<Instant>,
    transitions: Vec<FluidTransition>,
    next_transition: u64,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(Duration::from_millis(16))
    }
}

impl Scheduler {
    pub fn new(frame_interval: Duration) -> Self {
        Self {
            frame_interval,
            last_tick: None,
            transitions: Vec::new(),
            next_transition: 0,
        }
    }

    pub fn frame_interval(&self) -> Duration {
        self.frame_interval
    }

    /// Whether a frame interval has passed since the last tick.
    pub fn is_due(&self, now: Instant) -> bool {
        self.last_tick
            .is_none_or(|last| now.saturating_duration_since(last) >= self.frame_interval)
    }

    /// Start a linear transition of `camera` by `delta` over `duration`.
    pub fn add_fluid_transition(
        &mut self,
        camera: CameraId,
        delta: PoseDelta,
        duration: Duration,
    ) -> TransitionId {
        self.add_fluid_transition_with(camera, delta, duration, Easing::Linear)
    }

    /// Start a transition with a custom easing curve.
    pub fn add_fluid_transition_with(
        &mut self,
        camera: CameraId,
        delta: PoseDelta,
        duration: Duration,
        easing: Easing,
    ) -> TransitionId {
        let id = TransitionId(self.next_transition);
        self.next_transition += 1;
        self.transitions
            .push(FluidTransition::new(id, camera, delta, duration, easing));
        id
    }

    /// Stop a transition where it is. Returns whether it was still running.
    pub fn cancel_transition(&mut self, id: TransitionId) -> bool {
        let before = self.transitions.len();
        self.transitions.retain(|t| t.id() != id);
        self.transitions.len() != before
    }

    /// Stop every transition driving `camera`. Returns how many were stopped.
    pub fn cancel_camera(&mut self, camera: CameraId) -> usize {
        let before = self.transitions.len();
        self.transitions.retain(|t| t.camera() != camera);
        before - self.transitions.len()
    }

    /// Transitions that have not finished yet.
    pub fn transitions(&self) -> impl Iterator<Item = &FluidTransition> + '_ {
        self.transitions.iter()
    }

    /// Remove a camera from `registry` along with its transitions.
    pub fn remove_camera(
        &mut self,
        registry: &mut CameraRegistry,
        camera: CameraId,
    ) -> Option<Arc<Camera>> {
        self.cancel_camera(camera);
        registry.remove(camera)
    }

    /// Advance transitions and refresh cameras for the frame at `now`.
    pub fn tick(
        &mut self,
        now: Instant,
        origin: DVec3,
        registry: &mut CameraRegistry,
    ) -> TickReport {
        self.last_tick = Some(now);
        let mut report = TickReport::default();

        self.transitions.retain_mut(|transition| {
            let Some(camera) = registry.camera(transition.camera()) else {
                log::debug!(
                    "dropping transition {:?}: camera {} is gone",
                    transition.id(),
                    transition.camera()
                );
                return false;
            };
            if transition.tick(now, &camera) {
                report.finished.push(transition.id());
                false
            } else {
                true
            }
        });

        let ids: Vec<CameraId> = registry.ids().collect();
        for id in ids {
            let Some(camera) = registry.camera(id) else {
                continue;
            };
            match camera.refresh(origin) {
                Ok(true) => {
                    registry.sync_gizmo(id);
                    report.recomputed.push(id);
                }
                Ok(false) => {}
                Err(err) => report.failed.push((id, err)),
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CameraConfig;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn first_tick_recomputes_everything_then_idles() {
        let mut registry = CameraRegistry::new();
        let a = registry.spawn(CameraConfig::default());
        let b = registry.spawn(CameraConfig::default());
        let mut scheduler = Scheduler::default();
        let now = Instant::now();

        let report = scheduler.tick(now, DVec3::ZERO, &mut registry);
        assert_eq!(report.recomputed, vec![a, b]);

        let report = scheduler.tick(now, DVec3::ZERO, &mut registry);
        assert!(report.recomputed.is_empty());

        registry.camera(b).unwrap().set_location(1.0, 1.0, 3.0);
        let report = scheduler.tick(now, DVec3::ZERO, &mut registry);
        assert_eq!(report.recomputed, vec![b]);
    }

    #[test]
    fn origin_change_recomputes_all_cameras() {
        let mut registry = CameraRegistry::new();
        registry.spawn(CameraConfig::default());
        registry.spawn(CameraConfig::default());
        let mut scheduler = Scheduler::default();
        let now = Instant::now();
        scheduler.tick(now, DVec3::ZERO, &mut registry);
        let report = scheduler.tick(now, DVec3::new(0.0, 0.0, 1.0), &mut registry);
        assert_eq!(report.recomputed.len(), 2);
    }

    #[test]
    fn due_after_interval() {
        let mut registry = CameraRegistry::new();
        let mut scheduler = Scheduler::new(Duration::from_millis(10));
        let now = Instant::now();
        assert!(scheduler.is_due(now));
        scheduler.tick(now, DVec3::ZERO, &mut registry);
        assert!(!scheduler.is_due(now + Duration::from_millis(5)));
        assert!(scheduler.is_due(now + Duration::from_millis(10)));
    }

    #[test]
    fn transitions_finish_and_are_dropped() {
        let mut registry = CameraRegistry::new();
        let cam = registry.spawn(CameraConfig::default());
        let mut scheduler = Scheduler::default();
        let id = scheduler.add_fluid_transition(
            cam,
            PoseDelta::new(0.0, FRAC_PI_2, 0.0),
            Duration::from_millis(100),
        );
        let start = Instant::now();
        scheduler.tick(start, DVec3::ZERO, &mut registry);
        let report = scheduler.tick(start + Duration::from_millis(100), DVec3::ZERO, &mut registry);
        assert_eq!(report.finished, vec![id]);
        assert_eq!(report.recomputed, vec![cam]);
        assert_eq!(scheduler.transitions().count(), 0);
        assert!(!scheduler.cancel_transition(id));
    }

    #[test]
    fn removing_camera_drops_its_transitions() {
        let mut registry = CameraRegistry::new();
        let a = registry.spawn(CameraConfig::default());
        let b = registry.spawn(CameraConfig::default());
        let mut scheduler = Scheduler::default();
        let delta = PoseDelta::new(0.0, 1.0, 0.0);
        let second = Duration::from_secs(1);
        scheduler.add_fluid_transition(a, delta, second);
        scheduler.add_fluid_transition(a, delta, second);
        scheduler.add_fluid_transition(b, delta, second);

        assert!(scheduler.remove_camera(&mut registry, a).is_some());
        assert_eq!(scheduler.transitions().count(), 1);

        // Removal behind the scheduler's back is cleaned up on the next tick.
        registry.remove(b);
        let report = scheduler.tick(Instant::now(), DVec3::ZERO, &mut registry);
        assert!(report.finished.is_empty());
        assert_eq!(scheduler.transitions().count(), 0);
    }

    #[test]
    fn degenerate_camera_reported_each_tick_until_fixed() {
        let mut registry = CameraRegistry::new();
        let cam = registry.spawn(CameraConfig::default().screen_size(0, 600));
        let mut scheduler = Scheduler::default();
        let now = Instant::now();
        for _ in 0..3 {
            let report = scheduler.tick(now, DVec3::ZERO, &mut registry);
            assert_eq!(report.failed.len(), 1);
            assert!(registry.projection().is_none());
        }
        registry.camera(cam).unwrap().resize(800, 600);
        let report = scheduler.tick(now, DVec3::ZERO, &mut registry);
        assert_eq!(report.recomputed, vec![cam]);
        assert!(registry.projection().is_some());
    }
}
