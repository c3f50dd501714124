//! Screen-plane geometry derived from a spherical pose.
//!
//! The screen is a rectangle lying in the plane tangent to the camera's sphere
//! at `m`. Its normal `n` points from the scene origin toward `m`, and the eye
//! sits behind the screen at `c = m + n * viewport_x`.
//!
//! Corner layout, seen from the eye:
//!
//! ```text
//!  s1 ---- px ----> s2
//!   |               |
//!   py      m       |
//!   v               |
//!  s4 ------------- s3
//! ```
//!
//! `px` points toward increasing `theta` and `py` toward increasing `phi`, so
//! collapsed coordinates grow rightward and downward like raster pixels.

use glam::{DMat3, DVec2, DVec3};

use crate::config::Viewport;
use crate::error::GeometryError;
use crate::pose::SphericalPose;

/// Below this magnitude a normal component is treated as zero when picking the
/// axis to intercept.
const AXIS_EPSILON: f64 = 1e-6;

/// Relative determinant threshold for the plane-equation solve.
const SOLVE_EPSILON: f64 = 1e-12;

/// Relative tolerance used by [`ScreenGeometry::verify`].
pub const VERIFY_TOLERANCE: f64 = 1e-9;

/// Everything the projection pipeline needs to know about one camera.
///
/// This is an immutable snapshot: a recompute builds a new value and swaps it in
/// whole, so a reader never sees corners from one pose paired with plane
/// coefficients from another.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScreenGeometry {
    /// Scene origin the pose was resolved against.
    pub origin: DVec3,
    /// Center of the screen rectangle.
    pub m: DVec3,
    /// Unit normal of the screen plane, pointing away from the origin.
    pub n: DVec3,
    /// Unit in-plane direction of increasing screen x.
    pub px: DVec3,
    /// Unit in-plane direction of increasing screen y.
    pub py: DVec3,
    /// Screen corners in winding order; see the module docs.
    pub corners: [DVec3; 4],
    /// Camera eye.
    pub c: DVec3,
    /// Plane coefficients with `e · x = 1` for every point on the screen plane.
    pub e: DVec3,
    pub viewport: Viewport,
}

impl ScreenGeometry {
    /// Derive the screen plane for `pose` around `origin`.
    pub fn derive(
        pose: SphericalPose,
        origin: DVec3,
        viewport: Viewport,
    ) -> Result<Self, GeometryError> {
        if !pose.is_finite() || !origin.is_finite() {
            return Err(GeometryError::NonFinite);
        }

        let offset = pose.to_cartesian();
        let m = origin + offset;
        let n = offset.try_normalize().ok_or(GeometryError::NonFinite)?;

        let p1 = plane_reference_point(origin, n, pose.rho);
        let py = vertical_basis(p1 - m).ok_or(GeometryError::NonFinite)?;
        let px = (-py.cross(n)).normalize();

        let extent = viewport.extent();
        let half_x = px * (extent.x / 2.0);
        let half_y = py * (extent.y / 2.0);
        let corners = [
            m - half_x - half_y,
            m + half_x - half_y,
            m + half_x + half_y,
            m - half_x + half_y,
        ];

        let c = m + n * extent.x;
        let e = solve_plane(corners[0], corners[1], m)?;

        Ok(Self {
            origin,
            m,
            n,
            px,
            py,
            corners,
            c,
            e,
            viewport,
        })
    }

    pub fn s1(&self) -> DVec3 {
        self.corners[0]
    }

    pub fn s2(&self) -> DVec3 {
        self.corners[1]
    }

    pub fn s3(&self) -> DVec3 {
        self.corners[2]
    }

    pub fn s4(&self) -> DVec3 {
        self.corners[3]
    }

    /// Measured edge lengths `(|s1 - s2|, |s1 - s4|)`.
    pub fn edge_lengths(&self) -> DVec2 {
        DVec2::new(
            self.s1().distance(self.s2()),
            self.s1().distance(self.s4()),
        )
    }

    /// Check that the corners form the configured rectangle on the plane.
    ///
    /// Returns `false` if an edge length is off, if the corners are not
    /// perpendicular, or if a corner fails the plane equation.
    pub fn verify(&self) -> bool {
        let extent = self.viewport.extent();
        let measured = self.edge_lengths();
        let scale = extent.max_element().max(1.0);
        let tolerance = VERIFY_TOLERANCE * scale * self.m.length().max(1.0);

        let lengths_ok = (measured.x - extent.x).abs() <= tolerance
            && (measured.y - extent.y).abs() <= tolerance;
        let square = (self.s2() - self.s1()).dot(self.s4() - self.s1()).abs() <= tolerance * scale;
        let planar = self
            .corners
            .iter()
            .all(|s| (self.e.dot(*s) - 1.0).abs() <= VERIFY_TOLERANCE * 10.0);

        lengths_ok && square && planar
    }
}

/// Find a second point on the screen plane besides `m`.
///
/// Intercepts the polar axis through the origin, where `n · (x - m) = 0` is
/// solved for the z coordinate with x and y fixed to the origin's. When `n` is
/// nearly horizontal that intercept runs off to infinity; the limit direction
/// there is the polar axis projected into the plane, which is used instead.
fn plane_reference_point(origin: DVec3, n: DVec3, rho: f64) -> DVec3 {
    if n.z.abs() > AXIS_EPSILON {
        origin + DVec3::new(0.0, 0.0, rho / n.z)
    } else {
        origin + n * rho + (DVec3::Z - n * n.z)
    }
}

/// Orient the in-plane vector from `m` to the reference point so that it
/// points toward increasing `phi`, whichever hemisphere the camera is in.
fn vertical_basis(toward_reference: DVec3) -> Option<DVec3> {
    let dir = toward_reference.try_normalize()?;
    // Increasing phi always moves down the polar axis.
    if dir.z > 0.0 { Some(-dir) } else { Some(dir) }
}

/// Solve `e · a = e · b = e · c = 1`.
fn solve_plane(a: DVec3, b: DVec3, c: DVec3) -> Result<DVec3, GeometryError> {
    let rows = DMat3::from_cols(a, b, c).transpose();
    let determinant = rows.determinant();
    let scale = a.length().max(b.length()).max(c.length()).powi(3);
    if !determinant.is_finite() || determinant.abs() <= SOLVE_EPSILON * scale {
        return Err(GeometryError::Degenerate { determinant });
    }
    Ok(rows.inverse() * DVec3::ONE)
}
