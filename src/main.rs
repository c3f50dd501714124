use std::sync::Arc;
use std::time::{Duration, Instant};

use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use periscope::{
    CameraConfig, CameraRegistry, DVec3, Input, Navigator, PoseDelta, Scheduler,
};

const CUBE: [DVec3; 8] = [
    DVec3::new(-0.5, -0.5, -0.5),
    DVec3::new(0.5, -0.5, -0.5),
    DVec3::new(0.5, 0.5, -0.5),
    DVec3::new(-0.5, 0.5, -0.5),
    DVec3::new(-0.5, -0.5, 0.5),
    DVec3::new(0.5, -0.5, 0.5),
    DVec3::new(0.5, 0.5, 0.5),
    DVec3::new(-0.5, 0.5, 0.5),
];

struct App {
    window: Option<Arc<Window>>,
    registry: CameraRegistry,
    scheduler: Scheduler,
    navigator: Navigator,
    input: Input,
    start_time: Instant,
}

impl Default for App {
    fn default() -> Self {
        let mut registry = CameraRegistry::new();
        let mut scheduler = Scheduler::default();

        let config = CameraConfig::new().verify_viewport(true);
        let hero = registry.spawn_with_gizmo(config);
        registry.spawn_with_gizmo(config.pose(8.0, 0.6, 0.0));
        registry.spawn_with_gizmo(config.pose(3.0, 2.2, 2.0));

        // Swing the first camera a quarter turn around the cube on startup.
        scheduler.add_fluid_transition(
            hero,
            PoseDelta::new(0.0, std::f64::consts::FRAC_PI_2, 0.0),
            Duration::from_secs(2),
        );

        Self {
            window: None,
            registry,
            scheduler,
            navigator: Navigator::default(),
            input: Input::new(),
            start_time: Instant::now(),
        }
    }
}

impl App {
    fn frame(&mut self) {
        let now = Instant::now();
        self.navigator.update(&self.input, &mut self.registry);
        self.input.begin_frame();

        if !self.scheduler.is_due(now) {
            return;
        }

        // Bob the scene origin so cameras have something to track.
        let t = self.start_time.elapsed().as_secs_f64();
        let origin = DVec3::new(0.0, 0.0, 0.25 * t.sin());
        let report = self.scheduler.tick(now, origin, &mut self.registry);
        if report.recomputed.is_empty() {
            return;
        }

        let Some(projection) = self.registry.projection() else {
            return;
        };
        let cube = CUBE.map(|corner| corner + origin);
        match projection.render_points(&cube) {
            Some(pixels) => {
                let visible: Vec<_> = pixels.iter().flatten().map(|p| (p.x, p.y)).collect();
                log::info!("cube corners at {visible:?}");
            }
            None => log::info!("cube culled"),
        }
        for (camera, gizmo) in self.registry.visible_gizmos() {
            log::debug!("gizmo for camera {camera} at {:.2}", gizmo.position);
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let attributes = Window::default_attributes().with_title("Periscope");
        match event_loop.create_window(attributes) {
            Ok(window) => self.window = Some(Arc::new(window)),
            Err(err) => {
                log::error!("failed to create window: {err}");
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        self.input.handle_event(&event);
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                for camera in self.registry.cameras() {
                    camera.resize(size.width, size.height);
                }
            }
            WindowEvent::RedrawRequested => {
                self.frame();
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => (),
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::default();
    event_loop.run_app(&mut app)?;
    Ok(())
}
