//! Orbiting pinhole cameras.
//!
//! A [`Camera`] is shared between the render loop, the input layer and any
//! running fluid transitions, so all of its mutable state lives behind one
//! mutex. Pose edits go through [`Camera::modify_pose`], which updates the
//! dirty flag in the same critical section; geometry is only ever replaced
//! wholesale by [`Camera::refresh`].

use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use glam::{DVec2, DVec3};

use crate::config::CameraConfig;
use crate::error::GeometryError;
use crate::geometry::ScreenGeometry;
use crate::pose::SphericalPose;

/// Unique camera identifier, handed out sequentially by the registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CameraId(pub(crate) u64);

impl fmt::Display for CameraId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug)]
struct CameraState {
    config: CameraConfig,
    pose: SphericalPose,
    update_required: bool,
    /// Scene origin seen by the last refresh.
    last_origin: Option<DVec3>,
    geometry: Option<ScreenGeometry>,
    /// Set after a failed recompute has been logged; cleared on success.
    failure_logged: bool,
}

/// A camera orbiting the scene origin.
#[derive(Debug)]
pub struct Camera {
    id: CameraId,
    state: Mutex<CameraState>,
}

impl Camera {
    pub(crate) fn new(id: CameraId, config: CameraConfig) -> Self {
        let pose = config
            .initial_pose
            .normalized(config.phi_boundary, config.min_rho());
        Self {
            id,
            state: Mutex::new(CameraState {
                config,
                pose,
                update_required: true,
                last_origin: None,
                geometry: None,
                failure_logged: false,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CameraState> {
        // The state is plain data; a panic mid-update cannot leave it unusable.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn id(&self) -> CameraId {
        self.id
    }

    pub fn config(&self) -> CameraConfig {
        self.lock().config
    }

    pub fn pose(&self) -> SphericalPose {
        self.lock().pose
    }

    /// Whether derived geometry is out of date.
    pub fn is_update_required(&self) -> bool {
        self.lock().update_required
    }

    /// Force a recompute on the next refresh.
    pub fn mark_dirty(&self) {
        self.lock().update_required = true;
    }

    /// Latest successfully derived geometry, if any.
    ///
    /// `None` before the first refresh and while the screen plane is degenerate.
    pub fn geometry(&self) -> Option<ScreenGeometry> {
        self.lock().geometry
    }

    /// Position of the eye, once geometry is available.
    pub fn position(&self) -> Option<DVec3> {
        self.geometry().map(|g| g.c)
    }

    /// World-space viewport edge lengths `(viewport_x, viewport_y)`.
    pub fn viewport_dimensions(&self) -> DVec2 {
        self.lock().config.viewport.extent()
    }

    /// Edit the pose atomically.
    ///
    /// The closure sees the current pose and the camera's config. The result is
    /// clamped and wrapped into range; if it differs from the old pose the
    /// camera is marked dirty. Returns whether anything changed.
    pub fn modify_pose<F>(&self, edit: F) -> bool
    where
        F: FnOnce(&mut SphericalPose, &CameraConfig),
    {
        let mut state = self.lock();
        let config = state.config;
        let mut pose = state.pose;
        edit(&mut pose, &config);
        if !pose.is_finite() {
            log::warn!("camera {}: ignoring non-finite pose {pose:?}", self.id);
            return false;
        }
        let pose = pose.normalized(config.phi_boundary, config.min_rho());
        if pose == state.pose {
            return false;
        }
        state.pose = pose;
        state.update_required = true;
        true
    }

    /// Jump straight to a pose.
    pub fn set_location(&self, phi: f64, theta: f64, rho: f64) -> bool {
        self.modify_pose(|pose, _| *pose = SphericalPose::new(rho, phi, theta))
    }

    /// Adapt to a new screen size, keeping the world size of a pixel.
    pub fn resize(&self, width: u32, height: u32) {
        let mut state = self.lock();
        let viewport = &mut state.config.viewport;
        if viewport.width == width && viewport.height == height {
            return;
        }
        viewport.width = width;
        viewport.height = height;
        state.update_required = true;
    }

    /// Bring derived geometry up to date for the given scene origin.
    ///
    /// Returns `Ok(true)` if geometry was rebuilt and `Ok(false)` if it was
    /// already current. On failure the previous geometry is dropped, so the
    /// camera is not renderable until a later refresh succeeds, and the camera
    /// stays dirty so that refresh is retried.
    pub fn refresh(&self, origin: DVec3) -> Result<bool, GeometryError> {
        let mut state = self.lock();
        if state.last_origin != Some(origin) {
            state.last_origin = Some(origin);
            state.update_required = true;
        }
        if !state.update_required {
            return Ok(false);
        }

        match ScreenGeometry::derive(state.pose, origin, state.config.viewport) {
            Ok(geometry) => {
                if state.config.verify_viewport && !geometry.verify() {
                    let measured = geometry.edge_lengths();
                    let expected = geometry.viewport.extent();
                    log::warn!(
                        "camera {}: viewport is {:.6}x{:.6}, expected {:.6}x{:.6}",
                        self.id,
                        measured.x,
                        measured.y,
                        expected.x,
                        expected.y,
                    );
                }
                log::trace!("camera {}: recomputed at {:?}", self.id, state.pose);
                state.geometry = Some(geometry);
                state.update_required = false;
                state.failure_logged = false;
                Ok(true)
            }
            Err(err) => {
                if !state.failure_logged {
                    log::warn!("camera {}: cannot derive screen plane: {err}", self.id);
                    state.failure_logged = true;
                }
                state.geometry = None;
                Err(err)
            }
        }
    }
}
