use glam::DVec2;

use crate::pose::SphericalPose;

/// Target screen size and how much world space each pixel covers.
///
/// The world-space viewport is the rectangle on the screen plane that maps onto
/// the full screen; its edges are `width * units_per_pixel` by
/// `height * units_per_pixel`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    /// Screen width in pixels.
    pub width: u32,
    /// Screen height in pixels.
    pub height: u32,
    /// World units covered by one pixel.
    pub units_per_pixel: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            units_per_pixel: 0.005,
        }
    }
}

impl Viewport {
    pub fn new(width: u32, height: u32, units_per_pixel: f64) -> Self {
        Self {
            width,
            height,
            units_per_pixel,
        }
    }

    /// World-space edge lengths `(viewport_x, viewport_y)`.
    pub fn extent(&self) -> DVec2 {
        self.pixels() * self.units_per_pixel
    }

    /// Screen size in pixels as floats.
    pub fn pixels(&self) -> DVec2 {
        DVec2::new(self.width as f64, self.height as f64)
    }
}

/// Per-camera settings.
///
/// # Example
/// ```
/// use periscope::CameraConfig;
///
/// let config = CameraConfig::new()
///     .screen_size(1280, 720)
///     .speeds(0.02, 0.02, 0.25)
///     .verify_viewport(true);
/// assert_eq!(config.viewport.width, 1280);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraConfig {
    pub viewport: Viewport,
    /// Polar step per navigation event, in radians.
    pub phi_speed: f64,
    /// Azimuth step per navigation event, in radians.
    pub theta_speed: f64,
    /// Radial step per navigation event. Also the minimum `rho`.
    pub zoom_speed: f64,
    /// Width of the forbidden band at each pole, in radians.
    pub phi_boundary: f64,
    /// Check the viewport rectangle after every recompute and log mismatches.
    pub verify_viewport: bool,
    /// Pose the camera starts in.
    pub initial_pose: SphericalPose,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            viewport: Viewport::default(),
            phi_speed: 0.05,
            theta_speed: 0.05,
            zoom_speed: 0.1,
            phi_boundary: 0.01,
            verify_viewport: false,
            initial_pose: SphericalPose::default(),
        }
    }
}

impl CameraConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target screen size in pixels.
    pub fn screen_size(mut self, width: u32, height: u32) -> Self {
        self.viewport.width = width;
        self.viewport.height = height;
        self
    }

    /// Set how many world units one pixel covers.
    pub fn units_per_pixel(mut self, units: f64) -> Self {
        self.viewport.units_per_pixel = units;
        self
    }

    /// Set navigation step sizes.
    pub fn speeds(mut self, phi: f64, theta: f64, zoom: f64) -> Self {
        self.phi_speed = phi;
        self.theta_speed = theta;
        self.zoom_speed = zoom;
        self
    }

    pub fn phi_boundary(mut self, boundary: f64) -> Self {
        self.phi_boundary = boundary;
        self
    }

    /// Set the starting pose. Out-of-range values are clamped when the camera
    /// is created.
    pub fn pose(mut self, rho: f64, phi: f64, theta: f64) -> Self {
        self.initial_pose = SphericalPose::new(rho, phi, theta);
        self
    }

    pub fn verify_viewport(mut self, verify: bool) -> Self {
        self.verify_viewport = verify;
        self
    }

    /// Smallest `rho` a camera may reach.
    pub fn min_rho(&self) -> f64 {
        self.zoom_speed
    }
}
