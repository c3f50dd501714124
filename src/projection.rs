//! World-to-screen projection through a camera's screen plane.
//!
//! The pipeline has four stages that must run in this order:
//!
//! 1. [`Projection::project`]: slide a world point along its line to the eye
//!    until it hits the screen plane.
//! 2. [`Projection::collapse`]: express that plane point in 2D relative to
//!    corner `s1`, in world units.
//! 3. [`Projection::is_visible`]: reject points behind the eye or outside the
//!    viewport rectangle.
//! 4. [`Projection::scale_to_screen`]: convert world units to integer pixels.
//!
//! Stages that can fail geometrically return `None`; a `None` anywhere means
//! "not visible", never an error.
//!
//! # Example
//!
//! ```
//! use periscope::{CameraConfig, CameraRegistry, DVec3};
//!
//! let mut registry = CameraRegistry::new();
//! let id = registry.spawn(CameraConfig::default());
//! registry.camera(id).unwrap().refresh(DVec3::ZERO).unwrap();
//!
//! let projection = registry.projection().unwrap();
//! let pixels = projection.render_points(&[DVec3::ZERO]).unwrap();
//! assert_eq!(pixels[0].map(|p| (p.x, p.y)), Some((400, 300)));
//! ```

use glam::{DVec2, DVec3, IVec2};

use crate::geometry::ScreenGeometry;

/// Denominators smaller than this mean the line to the eye runs parallel to
/// the screen plane.
const PARALLEL_EPSILON: f64 = 1e-12;

/// Projection functions bound to one geometry snapshot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projection {
    geometry: ScreenGeometry,
}

impl From<ScreenGeometry> for Projection {
    fn from(geometry: ScreenGeometry) -> Self {
        Self { geometry }
    }
}

impl Projection {
    pub fn new(geometry: ScreenGeometry) -> Self {
        Self { geometry }
    }

    pub fn geometry(&self) -> &ScreenGeometry {
        &self.geometry
    }

    /// Intersect the line from `v` through the eye with the screen plane.
    ///
    /// Returns `None` when that line is parallel to the plane.
    pub fn project(&self, v: DVec3) -> Option<DVec3> {
        let e = self.geometry.e;
        let to_eye = self.geometry.c - v;
        let denominator = e.dot(to_eye);
        if denominator.abs() < PARALLEL_EPSILON * e.length() * to_eye.length().max(1.0) {
            return None;
        }
        let k = (1.0 - e.dot(v)) / denominator;
        let projected = v + to_eye * k;
        projected.is_finite().then_some(projected)
    }

    /// Convert a point on the screen plane to viewport coordinates.
    ///
    /// `(0, 0)` is corner `s1` and `(viewport_x, viewport_y)` is corner `s3`.
    pub fn collapse(&self, on_plane: DVec3) -> DVec2 {
        let g = &self.geometry;
        let from_corner = on_plane - g.s1();
        let across = (g.s2() - g.s1()).normalize_or_zero();
        let down = (g.s4() - g.s1()).normalize_or_zero();
        DVec2::new(from_corner.dot(across), from_corner.dot(down))
    }

    /// Whether the eye has orbited past `v`: the point is further from the
    /// scene origin than the eye is, and closer to the eye than to the origin.
    pub fn is_behind_camera(&self, v: DVec3) -> bool {
        let g = &self.geometry;
        let from_origin = v.distance(g.origin);
        from_origin > g.c.distance(g.origin) && g.c.distance(v) < from_origin
    }

    /// Whether viewport coordinates fall inside `[0, viewport_x) x [0, viewport_y)`.
    pub fn in_viewport(&self, collapsed: DVec2) -> bool {
        let extent = self.geometry.viewport.extent();
        (0.0..extent.x).contains(&collapsed.x) && (0.0..extent.y).contains(&collapsed.y)
    }

    /// Visibility of a single point, given its world position and its collapsed
    /// projection.
    pub fn is_visible(&self, original: DVec3, collapsed: Option<DVec2>) -> bool {
        !self.is_behind_camera(original) && collapsed.is_some_and(|c| self.in_viewport(c))
    }

    /// Visibility of a shape: none of its points may be behind the eye, and at
    /// least one must land in the viewport.
    ///
    /// `collapsed` and `originals` are parallel slices.
    pub fn is_any_visible(&self, collapsed: &[Option<DVec2>], originals: &[DVec3]) -> bool {
        if originals.iter().any(|v| self.is_behind_camera(*v)) {
            return false;
        }
        collapsed
            .iter()
            .flatten()
            .any(|c| self.in_viewport(*c))
    }

    /// Convert viewport coordinates to rounded pixel coordinates.
    pub fn scale_to_screen(&self, collapsed: DVec2) -> IVec2 {
        let viewport = self.geometry.viewport;
        let scaled = collapsed * viewport.pixels() / viewport.extent();
        IVec2::new(scaled.x.round() as i32, scaled.y.round() as i32)
    }

    pub fn project_all(&self, points: &[DVec3]) -> Vec<Option<DVec3>> {
        points.iter().map(|v| self.project(*v)).collect()
    }

    pub fn collapse_all(&self, projected: &[Option<DVec3>]) -> Vec<Option<DVec2>> {
        projected
            .iter()
            .map(|p| p.map(|p| self.collapse(p)))
            .collect()
    }

    pub fn scale_all(&self, collapsed: &[Option<DVec2>]) -> Vec<Option<IVec2>> {
        collapsed
            .iter()
            .map(|c| c.map(|c| self.scale_to_screen(c)))
            .collect()
    }

    /// Run the whole pipeline over one shape's points.
    ///
    /// Returns `None` if the shape is culled; otherwise pixel coordinates per
    /// input point, with `None` for points whose projection is undefined.
    pub fn render_points(&self, points: &[DVec3]) -> Option<Vec<Option<IVec2>>> {
        let collapsed = self.collapse_all(&self.project_all(points));
        self.is_any_visible(&collapsed, points)
            .then(|| self.scale_all(&collapsed))
    }
}
