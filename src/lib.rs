//! # Periscope
//!
//! **Orbiting pinhole cameras that turn 3D points into screen pixels.**
//!
//! Each camera sits on a sphere around a scene origin, described by a
//! [`SphericalPose`]. From the pose it derives a screen plane with a rectangular
//! viewport and an eye behind it; world points are projected onto that plane,
//! collapsed into 2D viewport coordinates, culled, and scaled to pixels.
//!
//! ## Quick Start
//!
//! ```
//! use periscope::*;
//! use std::time::{Duration, Instant};
//!
//! let mut registry = CameraRegistry::new();
//! let mut scheduler = Scheduler::default();
//! let mut navigator = Navigator::default();
//!
//! let overview = registry.spawn(CameraConfig::new().screen_size(1280, 720));
//! scheduler.add_fluid_transition(
//!     overview,
//!     PoseDelta::new(0.0, std::f64::consts::FRAC_PI_2, 0.0),
//!     Duration::from_secs(2),
//! );
//!
//! // Once per frame:
//! navigator.press(KeyCode::KeyW, &mut registry);
//! scheduler.tick(Instant::now(), DVec3::ZERO, &mut registry);
//!
//! if let Some(projection) = registry.projection() {
//!     let cube = [DVec3::new(0.5, 0.5, 0.5), DVec3::new(-0.5, -0.5, -0.5)];
//!     if let Some(pixels) = projection.render_points(&cube) {
//!         // hand `pixels` to the rasterizer
//!         assert_eq!(pixels.len(), 2);
//!     }
//! }
//! ```
//!
//! ## Pieces
//!
//! - [`CameraRegistry`] owns every camera and tracks which one is viewed and
//!   which one is steered. They can differ.
//! - [`Scheduler`] is ticked by the render loop. It advances fluid transitions
//!   and rebuilds geometry for cameras whose pose or origin changed.
//! - [`Navigator`] maps keys to orbit/zoom steps and camera switches.
//! - [`Projection`] is a snapshot of one camera's geometry with the projection
//!   pipeline on it.

mod camera;
mod config;
mod ecs;
mod error;
mod geometry;
mod input;
mod navigation;
mod pose;
mod projection;
mod registry;
mod scheduler;
mod transition;

pub use camera::{Camera, CameraId};
pub use config::{CameraConfig, Viewport};
pub use ecs::{CameraGizmo, GizmoTransform};
pub use error::{GeometryError, RegistryError};
pub use geometry::{ScreenGeometry, VERIFY_TOLERANCE};
pub use input::Input;
pub use navigation::{Binding, CameraSwitch, KeyBindings, NavAction, Navigator, SwitchTarget};
pub use pose::{SphericalPose, clamp_phi, wrap_theta};
pub use projection::Projection;
pub use registry::CameraRegistry;
pub use scheduler::{Scheduler, TickReport};
pub use transition::{Easing, FluidTransition, PoseDelta, TransitionId, TransitionPhase};

// Re-export glam math types for convenience
pub use glam::{DVec2, DVec3, IVec2};

// Re-export commonly used winit types for convenience
pub use winit::event::ElementState;
pub use winit::keyboard::KeyCode;

pub use hecs::{Entity, World};
