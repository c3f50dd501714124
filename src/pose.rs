//! Spherical camera poses.
//!
//! A pose places the screen-plane center on a sphere around the scene origin:
//!
//! - `rho`: distance from the origin
//! - `phi`: polar angle measured from the +Z axis, kept away from the poles
//! - `theta`: azimuth in the XY plane measured from +X, wrapped into `[0, 2π)`

use std::f64::consts::{PI, TAU};

use glam::DVec3;

/// Position of a camera relative to the scene origin, in spherical coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SphericalPose {
    /// Radial distance from the scene origin.
    pub rho: f64,
    /// Polar angle in radians.
    pub phi: f64,
    /// Azimuth in radians.
    pub theta: f64,
}

impl Default for SphericalPose {
    /// Five units out along -X, level with the origin.
    fn default() -> Self {
        Self {
            rho: 5.0,
            phi: PI / 2.0,
            theta: PI,
        }
    }
}

impl SphericalPose {
    pub const fn new(rho: f64, phi: f64, theta: f64) -> Self {
        Self { rho, phi, theta }
    }

    /// Offset of this pose from the scene origin in world coordinates.
    pub fn to_cartesian(&self) -> DVec3 {
        let (sin_phi, cos_phi) = self.phi.sin_cos();
        let (sin_theta, cos_theta) = self.theta.sin_cos();
        DVec3::new(
            self.rho * sin_phi * cos_theta,
            self.rho * sin_phi * sin_theta,
            self.rho * cos_phi,
        )
    }

    pub fn is_finite(&self) -> bool {
        self.rho.is_finite() && self.phi.is_finite() && self.theta.is_finite()
    }

    /// Clamp and wrap every component into its legal range.
    pub fn normalized(self, phi_boundary: f64, min_rho: f64) -> Self {
        Self {
            rho: self.rho.max(min_rho),
            phi: clamp_phi(self.phi, phi_boundary),
            theta: wrap_theta(self.theta),
        }
    }

    /// Move `phi` by `delta`, stopping exactly on the boundary band if the step
    /// would overshoot it. Returns whether `phi` changed.
    pub fn step_phi(&mut self, delta: f64, phi_boundary: f64) -> bool {
        let before = self.phi;
        self.phi = clamp_phi(self.phi + delta, phi_boundary);
        self.phi != before
    }

    /// Move `theta` by `delta`, wrapping modulo 2π. Returns whether `theta` changed.
    pub fn step_theta(&mut self, delta: f64) -> bool {
        let before = self.theta;
        self.theta = wrap_theta(self.theta + delta);
        self.theta != before
    }

    /// Move `rho` by `delta`, never going below `min_rho`. Returns whether `rho` changed.
    pub fn step_rho(&mut self, delta: f64, min_rho: f64) -> bool {
        let before = self.rho;
        self.rho = (self.rho + delta).max(min_rho);
        self.rho != before
    }
}

/// Clamp a polar angle into `[boundary, π - boundary]`.
pub fn clamp_phi(phi: f64, boundary: f64) -> f64 {
    let lo = boundary;
    let hi = PI - boundary;
    if phi < lo {
        lo
    } else if phi > hi {
        hi
    } else {
        phi
    }
}

/// Wrap an azimuth into `[0, 2π)`.
pub fn wrap_theta(theta: f64) -> f64 {
    let wrapped = theta.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= TAU { 0.0 } else { wrapped }
}
