use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI, TAU};
use std::time::{Duration, Instant};

use approx::assert_abs_diff_eq;
use periscope::*;

fn settled(config: CameraConfig) -> (CameraRegistry, Scheduler, CameraId) {
    let mut registry = CameraRegistry::new();
    let mut scheduler = Scheduler::default();
    let id = registry.spawn(config);
    scheduler.tick(Instant::now(), DVec3::ZERO, &mut registry);
    (registry, scheduler, id)
}

#[test]
fn test_default_pose_scenario() {
    let (registry, _, id) = settled(CameraConfig::default());
    let geometry = registry.camera(id).unwrap().geometry().unwrap();
    assert!(geometry.m.abs_diff_eq(DVec3::new(-5.0, 0.0, 0.0), 1e-12));
    assert!(geometry.n.abs_diff_eq(DVec3::new(-1.0, 0.0, 0.0), 1e-12));
}

#[test]
fn test_corner_round_trip() {
    let poses = [
        (5.0, FRAC_PI_2, PI),
        (2.5, 0.3, 1.2),
        (12.0, 2.9, 5.5),
        (7.0, 0.01, 0.0),
    ];
    for (rho, phi, theta) in poses {
        let (registry, _, _) = settled(CameraConfig::new().pose(rho, phi, theta));
        let projection = registry.projection().unwrap();
        let g = *projection.geometry();
        let extent = registry.viewport_dimensions().unwrap();
        let expected = [
            DVec2::ZERO,
            DVec2::new(extent.x, 0.0),
            extent,
            DVec2::new(0.0, extent.y),
        ];
        for (corner, want) in g.corners.iter().zip(expected) {
            let collapsed = projection.collapse(projection.project(*corner).unwrap());
            assert_abs_diff_eq!(collapsed.x, want.x, epsilon = 1e-9);
            assert_abs_diff_eq!(collapsed.y, want.y, epsilon = 1e-9);
        }

        let top_left = projection.collapse(projection.project(g.s1()).unwrap());
        let bottom_right = projection.collapse(projection.project(g.s3()).unwrap());
        assert_eq!(projection.scale_to_screen(top_left), IVec2::new(0, 0));
        assert_eq!(projection.scale_to_screen(bottom_right), IVec2::new(800, 600));
    }
}

#[test]
fn test_viewport_rectangle_everywhere() {
    let config = CameraConfig::default();
    let viewport = config.viewport;
    let boundary = config.phi_boundary;
    for i in 0..=20 {
        let phi = boundary + (PI - 2.0 * boundary) * i as f64 / 20.0;
        for j in 0..24 {
            let theta = TAU * j as f64 / 24.0;
            let g = ScreenGeometry::derive(SphericalPose::new(5.0, phi, theta), DVec3::ZERO, viewport)
                .unwrap();
            let edges = g.edge_lengths();
            assert_abs_diff_eq!(edges.x, 4.0, epsilon = 1e-9);
            assert_abs_diff_eq!(edges.y, 3.0, epsilon = 1e-9);
            assert!(g.n.dot(g.s3() - g.s1()).abs() < 1e-9);
        }
    }
}

#[test]
fn test_fluid_transition_halfway() {
    let (mut registry, mut scheduler, id) = settled(CameraConfig::default());
    let start_theta = registry.camera(id).unwrap().pose().theta;
    scheduler.add_fluid_transition(
        id,
        PoseDelta::new(0.0, FRAC_PI_2, 0.0),
        Duration::from_millis(1000),
    );

    let start = Instant::now();
    scheduler.tick(start, DVec3::ZERO, &mut registry);
    scheduler.tick(start + Duration::from_millis(500), DVec3::ZERO, &mut registry);
    let theta = registry.camera(id).unwrap().pose().theta;
    assert_abs_diff_eq!(theta, start_theta + FRAC_PI_4, epsilon = 1e-9);

    let report = scheduler.tick(start + Duration::from_millis(1000), DVec3::ZERO, &mut registry);
    assert_eq!(report.finished.len(), 1);
    let theta = registry.camera(id).unwrap().pose().theta;
    assert_abs_diff_eq!(theta, wrap_theta(start_theta + FRAC_PI_2), epsilon = 1e-12);
}

#[test]
fn test_switching_control_mid_navigation() {
    let mut registry = CameraRegistry::new();
    let first = registry.spawn(CameraConfig::default());
    let second = registry.spawn(CameraConfig::default());
    let mut navigator = Navigator::default();

    navigator.press(KeyCode::KeyD, &mut registry);
    let first_pose = registry.camera(first).unwrap().pose();
    assert_ne!(first_pose, SphericalPose::default());

    registry.set_active_control(second);
    navigator.press(KeyCode::KeyD, &mut registry);
    navigator.press(KeyCode::KeyQ, &mut registry);

    assert_eq!(registry.camera(first).unwrap().pose(), first_pose);
    let second_pose = registry.camera(second).unwrap().pose();
    assert_abs_diff_eq!(second_pose.theta, PI + 0.1, epsilon = 1e-12);
    assert_abs_diff_eq!(second_pose.rho, 4.9, epsilon = 1e-12);
}

#[test]
fn test_view_and_control_are_independent() {
    let mut registry = CameraRegistry::new();
    let mut scheduler = Scheduler::default();
    let viewer = registry.spawn(CameraConfig::default());
    let drone = registry.spawn_with_gizmo(CameraConfig::new().pose(6.0, 1.0, 0.5));
    registry.set_active_control(drone);

    let mut navigator = Navigator::default();
    let now = Instant::now();
    scheduler.tick(now, DVec3::ZERO, &mut registry);
    let before = registry.projection().unwrap();

    navigator.press(KeyCode::KeyE, &mut registry);
    let report = scheduler.tick(now, DVec3::ZERO, &mut registry);
    assert_eq!(report.recomputed, vec![drone]);

    // The viewed camera did not move; the drone's gizmo did.
    assert_eq!(registry.projection().unwrap(), before);
    assert_eq!(registry.active_view_id(), Some(viewer));
    let (id, gizmo) = registry.visible_gizmos()[0];
    assert_eq!(id, drone);
    let eye = registry.camera(drone).unwrap().position().unwrap();
    assert!(gizmo.position.abs_diff_eq(eye, 1e-12));
}

#[test]
fn test_set_active_view_is_idempotent() {
    let (mut registry, _, id) = settled(CameraConfig::default());
    registry.set_active_view(id);
    assert!(!registry.camera(id).unwrap().is_update_required());
}

#[test]
fn test_points_behind_camera_are_culled() {
    let (registry, _, _) = settled(CameraConfig::default());
    let projection = registry.projection().unwrap();
    let eye = registry.camera_position().unwrap();
    let behind = eye * 3.0;
    assert_eq!(projection.render_points(&[behind]), None);
    assert!(projection.render_points(&[DVec3::ZERO]).is_some());
}
