//! Fluid transitions: timed, interpolated pose changes.
//!
//! A transition moves a camera from wherever it is when the transition first
//! ticks to that pose plus a fixed delta. Progress is measured from wall-clock
//! time on every tick, so a late or skipped tick only makes the motion coarser,
//! never slower.

use std::time::{Duration, Instant};

use crate::camera::{Camera, CameraId};
use crate::pose::SphericalPose;

/// How quickly a camera covers its [`PoseDelta`] over the transition.
///
/// Maps elapsed time to the share of the delta applied so far. Every curve
/// starts at 0 and lands exactly on 1, so the camera always ends on its target.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Easing {
    /// Constant angular and radial speed.
    #[default]
    Linear,
    /// Pull away slowly from the start pose.
    Accelerate,
    /// Arrive gently at the target pose.
    Decelerate,
    /// Smoothstep: gentle at both ends.
    Smooth,
}

impl Easing {
    /// Share of the delta covered after `elapsed` of a `duration`-long move.
    ///
    /// A zero-length transition is complete immediately.
    pub fn progress(self, elapsed: Duration, duration: Duration) -> f64 {
        if duration.is_zero() || elapsed >= duration {
            return 1.0;
        }
        self.curve(elapsed.as_secs_f64() / duration.as_secs_f64())
    }

    /// The curve itself, on a linear time fraction clamped to `[0, 1]`.
    pub fn curve(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::Accelerate => t * t,
            Easing::Decelerate => t * (2.0 - t),
            Easing::Smooth => t * t * (3.0 - 2.0 * t),
        }
    }
}

/// Handle for cancelling a transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TransitionId(pub(crate) u64);

/// Change to apply to a pose over the course of a transition.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PoseDelta {
    pub phi: f64,
    pub theta: f64,
    pub rho: f64,
}

impl PoseDelta {
    pub const fn new(phi: f64, theta: f64, rho: f64) -> Self {
        Self { phi, theta, rho }
    }
}

/// Where a transition is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TransitionPhase {
    /// Not ticked yet.
    Pending,
    /// Interpolating from `from`, started at `started`.
    Running {
        started: Instant,
        from: SphericalPose,
    },
    /// Target reached; the transition no longer touches its camera.
    Done,
}

/// A timed pose change for one camera.
#[derive(Clone, Debug)]
pub struct FluidTransition {
    id: TransitionId,
    camera: CameraId,
    delta: PoseDelta,
    duration: Duration,
    easing: Easing,
    phase: TransitionPhase,
}

impl FluidTransition {
    pub(crate) fn new(
        id: TransitionId,
        camera: CameraId,
        delta: PoseDelta,
        duration: Duration,
        easing: Easing,
    ) -> Self {
        Self {
            id,
            camera,
            delta,
            duration,
            easing,
            phase: TransitionPhase::Pending,
        }
    }

    pub fn id(&self) -> TransitionId {
        self.id
    }

    pub fn camera(&self) -> CameraId {
        self.camera
    }

    pub fn phase(&self) -> TransitionPhase {
        self.phase
    }

    pub fn is_done(&self) -> bool {
        matches!(self.phase, TransitionPhase::Done)
    }

    /// Advance the transition to `now`, writing the interpolated pose into
    /// `camera`.
    ///
    /// The first tick only records the start time and pose. Only components
    /// with a non-zero delta are written, so a transition in `theta` does not
    /// fight keyboard input in `phi`. Returns `true` once the transition is done.
    pub fn tick(&mut self, now: Instant, camera: &Camera) -> bool {
        match self.phase {
            TransitionPhase::Pending => {
                self.phase = TransitionPhase::Running {
                    started: now,
                    from: camera.pose(),
                };
                log::debug!(
                    "camera {}: transition {:?} started ({:?} over {:?})",
                    self.camera,
                    self.id,
                    self.delta,
                    self.duration,
                );
                false
            }
            TransitionPhase::Running { started, from } => {
                let elapsed = now.saturating_duration_since(started);
                let finished = elapsed >= self.duration;
                let fraction = self.easing.progress(elapsed, self.duration);
                let delta = self.delta;
                camera.modify_pose(|pose, _| {
                    if delta.phi != 0.0 {
                        pose.phi = from.phi + delta.phi * fraction;
                    }
                    if delta.theta != 0.0 {
                        pose.theta = from.theta + delta.theta * fraction;
                    }
                    if delta.rho != 0.0 {
                        pose.rho = from.rho + delta.rho * fraction;
                    }
                });
                if finished {
                    self.phase = TransitionPhase::Done;
                    log::debug!("camera {}: transition {:?} done", self.camera, self.id);
                }
                finished
            }
            TransitionPhase::Done => true,
        }
    }
}
