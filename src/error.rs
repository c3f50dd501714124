//! Error types.
//!
//! Only the plane solve and explicit registry lookups can fail. Everything on
//! the render path that can go wrong geometrically (a projection line parallel
//! to the screen, a point behind the eye) is reported as "not visible" instead.

use crate::camera::CameraId;

/// Errors from deriving a camera's screen-plane geometry.
#[derive(Clone, Copy, Debug, PartialEq, thiserror::Error)]
pub enum GeometryError {
    /// The three reference points for the plane equation are linearly dependent,
    /// so `e · x = 1` has no unique solution.
    ///
    /// Happens when a viewport extent is zero or when the screen plane passes
    /// through the world origin.
    #[error("screen plane is degenerate (determinant {determinant:e})")]
    Degenerate {
        /// Determinant of the rejected system.
        determinant: f64,
    },
    /// The pose or scene origin contained NaN or infinite values.
    #[error("camera pose or scene origin is not finite")]
    NonFinite,
}

/// Errors from explicit camera registry lookups.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// No live camera has this id.
    #[error("no camera with id {0}")]
    UnknownCamera(CameraId),
}
