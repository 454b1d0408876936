//! Spherical orbit camera controller.
//!
//! Keeps the camera's position as `target + spherical offset` and converges
//! toward user-driven set-points (rotate / dolly / pan) with optional damping.
//! Driven by the host's per-frame callback via [`OrbitCamera::update`].

use glam::{Vec2, Vec3};
use thiserror::Error;

use crate::camera::Camera;

/// Pointer-delta to radians factor applied on top of `rotate_speed`.
const ROTATE_SENSITIVITY: f32 = 0.01;
/// Pointer-delta to world-units factor applied on top of `pan_speed`,
/// scaled by the current orbit radius.
const PAN_SENSITIVITY: f32 = 0.001;
/// Per-wheel-event dolly step; 1.0 zoom_speed gives 0.9x / 1.1x.
const ZOOM_STEP: f32 = 0.1;
/// Keeps the polar angle off the exact poles, where the up vector
/// becomes degenerate.
const POLAR_EPSILON: f32 = 1e-4;
/// Normalizes `damping_factor` (a per-frame lerp weight at 60 Hz) into a
/// dt-scaled exponential smoothing rate.
const DAMPING_RATE: f32 = 60.0;

/// Construction-time validation failures.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("min distance {min} must be positive")]
    DistanceRange { min: f32 },
    #[error("distance bounds out of order: min {min} > max {max}")]
    DistanceBounds { min: f32, max: f32 },
    #[error("polar angle bounds out of order: min {min} > max {max}")]
    PolarBounds { min: f32, max: f32 },
    #[error("polar angle bound {angle} outside [0, pi]")]
    PolarRange { angle: f32 },
}

/// Orbit constraints and behavior, fixed for the controller's lifetime.
#[derive(Debug, Clone, Copy)]
pub struct OrbitConfig {
    pub min_distance: f32,
    pub max_distance: f32,
    /// Polar angle lower bound in radians, measured from the +Y axis.
    pub min_polar_angle: f32,
    /// Polar angle upper bound in radians.
    pub max_polar_angle: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub enable_damping: bool,
    /// Per-frame convergence weight when damping is enabled.
    pub damping_factor: f32,
    pub auto_rotate: bool,
    /// Azimuthal drift in radians per second while auto-rotating.
    pub auto_rotate_speed: f32,
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self {
            min_distance: 1.0,
            max_distance: 30.0,
            min_polar_angle: 0.1,
            max_polar_angle: 1.4,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pan_speed: 1.0,
            enable_damping: true,
            damping_factor: 0.05,
            auto_rotate: false,
            auto_rotate_speed: 2.0,
        }
    }
}

impl OrbitConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        // A zero radius collapses the eye onto the target and the look-at
        // direction degenerates.
        if self.min_distance <= 0.0 {
            return Err(ConfigError::DistanceRange {
                min: self.min_distance,
            });
        }
        if self.min_distance > self.max_distance {
            return Err(ConfigError::DistanceBounds {
                min: self.min_distance,
                max: self.max_distance,
            });
        }
        if self.min_polar_angle > self.max_polar_angle {
            return Err(ConfigError::PolarBounds {
                min: self.min_polar_angle,
                max: self.max_polar_angle,
            });
        }
        for angle in [self.min_polar_angle, self.max_polar_angle] {
            if !(0.0..=std::f32::consts::PI).contains(&angle) {
                return Err(ConfigError::PolarRange { angle });
            }
        }
        Ok(())
    }
}

/// Offset from the orbit target in spherical coordinates.
///
/// `phi` is the polar angle from the +Y axis, `theta` the azimuth around it:
/// `x = r sin(phi) sin(theta)`, `y = r cos(phi)`, `z = r sin(phi) cos(theta)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spherical {
    pub radius: f32,
    pub phi: f32,
    pub theta: f32,
}

impl Spherical {
    pub fn from_offset(offset: Vec3) -> Self {
        let radius = offset.length();
        if radius <= f32::EPSILON {
            return Self {
                radius: 0.0,
                phi: 0.0,
                theta: 0.0,
            };
        }
        Self {
            radius,
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),
            theta: offset.x.atan2(offset.z),
        }
    }

    pub fn to_offset(self) -> Vec3 {
        let sin_phi = self.phi.sin();
        Vec3::new(
            self.radius * sin_phi * self.theta.sin(),
            self.radius * self.phi.cos(),
            self.radius * sin_phi * self.theta.cos(),
        )
    }

    fn lerp(self, other: Self, t: f32) -> Self {
        Self {
            radius: self.radius + (other.radius - self.radius) * t,
            phi: self.phi + (other.phi - self.phi) * t,
            theta: self.theta + (other.theta - self.theta) * t,
        }
    }
}

/// Maps `angle` to its equivalent in `(-PI, PI]`.
fn wrap_angle(angle: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    let wrapped = angle.rem_euclid(TAU);
    if wrapped > PI {
        wrapped - TAU
    } else {
        wrapped
    }
}

/// Read-only view of the controller's pose, for console inspection.
#[cfg(feature = "inspect")]
#[derive(Debug, Clone, Copy)]
pub struct CameraSnapshot {
    pub position: Vec3,
    pub target: Vec3,
    pub radius: f32,
    pub polar_angle: f32,
    pub azimuth_angle: f32,
}

/// Orbit controller owning the camera it steers.
///
/// Input handlers mutate the desired spherical set-points; `update` clamps
/// them, interpolates the live values toward them, and writes the resulting
/// position and look-at onto the camera. The camera is exclusively mutated
/// through this controller until [`OrbitCamera::dispose`] is called.
pub struct OrbitCamera {
    camera: Camera,
    config: OrbitConfig,

    target: Vec3,
    desired_target: Vec3,
    current: Spherical,
    desired: Spherical,

    auto_rotate: bool,
    dragging: bool,
    disposed: bool,
}

impl OrbitCamera {
    /// Binds to `camera`, deriving the initial spherical offset from its pose.
    ///
    /// Fails with [`ConfigError`] when the configured bounds are out of order
    /// or the polar bounds leave `[0, pi]`.
    pub fn new(camera: Camera, config: OrbitConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let target = camera.target;
        let spherical = Spherical::from_offset(camera.eye - target);
        let auto_rotate = config.auto_rotate;
        let mut orbit = Self {
            camera,
            config,
            target,
            desired_target: target,
            current: spherical,
            desired: spherical,
            auto_rotate,
            dragging: false,
            disposed: false,
        };
        // Establish the clamped-pose invariants before the first frame.
        orbit.desired = orbit.clamped(orbit.desired);
        orbit.current = orbit.desired;
        orbit.apply();
        Ok(orbit)
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    /// Current orbit radius set-point.
    pub fn radius(&self) -> f32 {
        self.desired.radius
    }

    /// Current polar angle set-point in radians.
    pub fn polar_angle(&self) -> f32 {
        self.desired.phi
    }

    /// Current azimuth set-point in radians. Unbounded; grows monotonically
    /// under auto-rotation.
    pub fn azimuth_angle(&self) -> f32 {
        self.desired.theta
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Starts a rotate/pan gesture. Auto-rotation pauses while dragging.
    pub fn begin_drag(&mut self) {
        if self.disposed {
            return;
        }
        self.dragging = true;
    }

    pub fn end_drag(&mut self) {
        self.dragging = false;
    }

    /// Applies a pointer-move delta (in pixels) to the rotate gesture.
    /// Angles are left unclamped here; `update` makes them safe.
    pub fn drag(&mut self, delta: Vec2) {
        if self.disposed || !self.dragging {
            return;
        }
        let k = self.config.rotate_speed * ROTATE_SENSITIVITY;
        self.desired.theta -= delta.x * k;
        self.desired.phi += delta.y * k;
    }

    /// Translates the target along the camera's screen axes (right-drag).
    pub fn pan(&mut self, delta: Vec2) {
        if self.disposed || !self.dragging {
            return;
        }
        let forward = (self.target - self.camera.eye).normalize_or_zero();
        let right = forward.cross(self.camera.up).normalize_or_zero();
        let up = right.cross(forward);

        let k = self.config.pan_speed * PAN_SENSITIVITY * self.desired.radius;
        self.desired_target += (right * -delta.x + up * delta.y) * k;
    }

    /// Dollies in (`delta_y < 0`) or out (`delta_y > 0`) by a fixed factor,
    /// clamping the radius into the distance bounds immediately.
    pub fn wheel(&mut self, delta_y: f32) {
        if self.disposed {
            return;
        }
        let step = ZOOM_STEP * self.config.zoom_speed;
        let factor = if delta_y < 0.0 { 1.0 - step } else { 1.0 + step };
        self.desired.radius = (self.desired.radius * factor)
            .clamp(self.config.min_distance, self.config.max_distance);
    }

    /// Moves the orbit target. Takes effect on the next `update`.
    pub fn set_target(&mut self, x: f32, y: f32, z: f32) {
        if self.disposed {
            return;
        }
        self.target = Vec3::new(x, y, z);
        self.desired_target = self.target;
    }

    /// Places the camera at an absolute position, recomputing the spherical
    /// offset from `position - target` and re-aiming at the target immediately.
    pub fn set_position(&mut self, x: f32, y: f32, z: f32) {
        if self.disposed {
            return;
        }
        let spherical = Spherical::from_offset(Vec3::new(x, y, z) - self.target);
        self.current = spherical;
        self.desired = spherical;
        self.apply();
    }

    /// Smoothly repositions to look from `eye` toward `target`; snaps when
    /// damping is disabled.
    pub fn set_look_at(&mut self, eye: Vec3, target: Vec3) {
        if self.disposed {
            return;
        }
        self.desired_target = target;
        let mut desired = Spherical::from_offset(eye - target);
        // The live azimuth accumulates whole revolutions (auto-rotate, long
        // drags); steer to the nearest equivalent angle instead of unwinding
        // them.
        desired.theta = self.current.theta + wrap_angle(desired.theta - self.current.theta);
        self.desired = desired;
    }

    /// Dollies to an absolute distance, clamped into the distance bounds.
    pub fn zoom_to(&mut self, distance: f32) {
        if self.disposed {
            return;
        }
        self.desired.radius =
            distance.clamp(self.config.min_distance, self.config.max_distance);
    }

    pub fn set_auto_rotate(&mut self, enabled: bool) {
        self.auto_rotate = enabled;
    }

    pub fn auto_rotate(&self) -> bool {
        self.auto_rotate
    }

    /// Advances one frame: applies auto-rotation, clamps the set-points into
    /// bounds, converges the live pose toward them, and writes position +
    /// look-at onto the camera. Call once per rendered frame.
    pub fn update(&mut self, dt: f32) {
        if self.disposed {
            return;
        }

        if self.auto_rotate && !self.dragging {
            self.desired.theta += self.config.auto_rotate_speed * dt;
        }

        self.desired = self.clamped(self.desired);

        if self.config.enable_damping {
            let t = 1.0 - (-self.config.damping_factor * DAMPING_RATE * dt).exp();
            self.current = self.current.lerp(self.desired, t);
            self.target = self.target.lerp(self.desired_target, t);
        } else {
            self.current = self.desired;
            self.target = self.desired_target;
        }
        self.current = self.clamped(self.current);

        self.apply();
    }

    /// Detaches the controller: every later call, `update` included, leaves
    /// the camera untouched. Safe to call repeatedly.
    pub fn dispose(&mut self) {
        self.disposed = true;
        self.dragging = false;
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    #[cfg(feature = "inspect")]
    pub fn snapshot(&self) -> CameraSnapshot {
        CameraSnapshot {
            position: self.camera.eye,
            target: self.target,
            radius: self.current.radius,
            polar_angle: self.current.phi,
            azimuth_angle: self.current.theta,
        }
    }

    fn clamped(&self, s: Spherical) -> Spherical {
        let min_phi = self.config.min_polar_angle.max(POLAR_EPSILON);
        let max_phi = self
            .config
            .max_polar_angle
            .min(std::f32::consts::PI - POLAR_EPSILON)
            .max(min_phi);
        Spherical {
            radius: s
                .radius
                .clamp(self.config.min_distance, self.config.max_distance),
            phi: s.phi.clamp(min_phi, max_phi),
            theta: s.theta,
        }
    }

    fn apply(&mut self) {
        self.camera.eye = self.target + self.current.to_offset();
        self.camera.target = self.target;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f32 = 1e-4;

    fn test_camera() -> Camera {
        let mut camera = Camera::new();
        camera.eye = Vec3::new(-6.0, 5.0, 10.0);
        camera.target = Vec3::ZERO;
        camera
    }

    fn undamped_config() -> OrbitConfig {
        OrbitConfig {
            enable_damping: false,
            ..OrbitConfig::default()
        }
    }

    fn orbit(config: OrbitConfig) -> OrbitCamera {
        OrbitCamera::new(test_camera(), config).unwrap()
    }

    fn approx_vec(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < TOLERANCE
    }

    #[test]
    fn rejects_out_of_order_distance_bounds() {
        let config = OrbitConfig {
            min_distance: 10.0,
            max_distance: 5.0,
            ..OrbitConfig::default()
        };
        assert_eq!(
            OrbitCamera::new(test_camera(), config).err(),
            Some(ConfigError::DistanceBounds {
                min: 10.0,
                max: 5.0
            })
        );
    }

    #[test]
    fn rejects_non_positive_min_distance() {
        let config = OrbitConfig {
            min_distance: 0.0,
            ..OrbitConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DistanceRange { .. })
        ));
    }

    #[test]
    fn rejects_out_of_order_polar_bounds() {
        let config = OrbitConfig {
            min_polar_angle: 1.4,
            max_polar_angle: 0.1,
            ..OrbitConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::PolarBounds { .. })
        ));
    }

    #[test]
    fn rejects_polar_bound_outside_zero_pi() {
        let config = OrbitConfig {
            min_polar_angle: -0.5,
            max_polar_angle: 4.0,
            ..OrbitConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::PolarRange { .. })
        ));
    }

    #[test]
    fn spherical_round_trips_non_degenerate_offsets() {
        let offset = Vec3::new(-6.0, 5.0, 10.0);
        let back = Spherical::from_offset(offset).to_offset();
        assert!(approx_vec(offset, back));
    }

    #[test]
    fn wheel_keeps_radius_inside_bounds() {
        let mut orbit = orbit(undamped_config());
        for i in 0..200 {
            let delta = if i % 3 == 0 { 4.0 } else { -1.0 };
            orbit.wheel(delta);
            assert!(orbit.radius() >= 1.0 && orbit.radius() <= 30.0);
        }
    }

    #[test]
    fn repeated_zoom_in_clamps_to_min_distance() {
        let mut orbit = orbit(undamped_config());
        orbit.zoom_to(10.0);
        for _ in 0..50 {
            orbit.wheel(-1.0);
        }
        assert_eq!(orbit.radius(), 1.0);
    }

    #[test]
    fn drag_past_pole_clamps_polar_angle_exactly() {
        let mut orbit = orbit(undamped_config());
        orbit.begin_drag();
        orbit.drag(Vec2::new(0.0, -500.0));
        orbit.end_drag();
        orbit.update(0.016);
        assert_eq!(orbit.polar_angle(), 0.1);

        orbit.begin_drag();
        orbit.drag(Vec2::new(0.0, 500.0));
        orbit.end_drag();
        orbit.update(0.016);
        assert_eq!(orbit.polar_angle(), 1.4);
    }

    #[test]
    fn polar_angle_stays_bounded_over_drag_sequences() {
        let mut orbit = orbit(undamped_config());
        let deltas = [50.0, -120.0, 300.0, -40.0, -900.0, 75.0, 600.0];
        for dy in deltas {
            orbit.begin_drag();
            orbit.drag(Vec2::new(10.0, dy));
            orbit.end_drag();
            orbit.update(0.016);
            assert!(orbit.polar_angle() >= 0.1 && orbit.polar_angle() <= 1.4);
        }
    }

    #[test]
    fn position_matches_target_plus_spherical_offset() {
        let mut orbit = orbit(undamped_config());
        orbit.set_target(1.0, 2.0, 3.0);
        orbit.begin_drag();
        orbit.drag(Vec2::new(35.0, -12.0));
        orbit.end_drag();
        orbit.update(0.016);

        let expected = orbit.target()
            + Spherical {
                radius: orbit.radius(),
                phi: orbit.polar_angle(),
                theta: orbit.azimuth_angle(),
            }
            .to_offset();
        assert!(approx_vec(orbit.camera().eye, expected));
    }

    #[test]
    fn camera_faces_target_after_update() {
        let mut orbit = orbit(undamped_config());
        orbit.begin_drag();
        orbit.drag(Vec2::new(-80.0, 25.0));
        orbit.end_drag();
        orbit.update(0.016);

        let camera = orbit.camera();
        let expected = (orbit.target() - camera.eye).normalize();
        assert!(approx_vec(camera.forward(), expected));
    }

    #[test]
    fn set_position_round_trips_through_update() {
        let mut orbit = orbit(undamped_config());
        // In-bounds pose: radius ~12.7, polar ~1.17.
        orbit.set_position(-6.0, 5.0, 10.0);
        let placed = orbit.camera().eye;
        assert!(approx_vec(placed, Vec3::new(-6.0, 5.0, 10.0)));

        orbit.update(0.016);
        assert!(approx_vec(orbit.camera().eye, placed));
    }

    #[test]
    fn update_is_idempotent_without_input() {
        let mut orbit = orbit(undamped_config());
        orbit.update(0.016);
        let first = orbit.camera().eye;
        orbit.update(0.016);
        assert_eq!(orbit.camera().eye, first);
    }

    #[test]
    fn auto_rotate_drifts_azimuth_by_speed_times_dt() {
        let config = OrbitConfig {
            enable_damping: false,
            auto_rotate: true,
            auto_rotate_speed: 2.0,
            ..OrbitConfig::default()
        };
        let mut orbit = orbit(config);
        orbit.set_position(0.0, 5.0, 10.0);
        let start = orbit.azimuth_angle();

        let dt = 0.016;
        let steps = 25;
        for _ in 0..steps {
            orbit.update(dt);
        }
        let expected = start + steps as f32 * 2.0 * dt;
        assert!((orbit.azimuth_angle() - expected).abs() < 1e-4);
    }

    #[test]
    fn auto_rotate_pauses_while_dragging() {
        let config = OrbitConfig {
            enable_damping: false,
            auto_rotate: true,
            ..OrbitConfig::default()
        };
        let mut orbit = orbit(config);
        let start = orbit.azimuth_angle();
        orbit.begin_drag();
        for _ in 0..10 {
            orbit.update(0.016);
        }
        assert_eq!(orbit.azimuth_angle(), start);
    }

    #[test]
    fn damping_converges_monotonically_toward_set_point() {
        let mut orbit = orbit(OrbitConfig::default());
        orbit.zoom_to(5.0);

        let mut previous_gap = f32::INFINITY;
        for _ in 0..400 {
            orbit.update(0.016);
            let gap = ((orbit.camera().eye - orbit.target()).length() - 5.0).abs();
            assert!(gap <= previous_gap + TOLERANCE);
            previous_gap = gap;
        }
        assert!(previous_gap < 1e-3);
    }

    #[test]
    fn set_target_takes_effect_on_next_update() {
        let mut orbit = orbit(undamped_config());
        orbit.update(0.016);
        let before = orbit.camera().eye;

        orbit.set_target(3.0, 0.0, -2.0);
        assert_eq!(orbit.camera().eye, before);

        orbit.update(0.016);
        assert!(approx_vec(orbit.camera().target, Vec3::new(3.0, 0.0, -2.0)));
    }

    #[test]
    fn set_look_at_snaps_without_damping() {
        let mut orbit = orbit(undamped_config());
        orbit.set_look_at(Vec3::new(0.0, 5.0, 10.0), Vec3::new(0.0, 1.0, 0.0));
        orbit.update(0.016);
        assert!(approx_vec(orbit.camera().eye, Vec3::new(0.0, 5.0, 10.0)));
        assert!(approx_vec(orbit.camera().target, Vec3::new(0.0, 1.0, 0.0)));
    }

    #[test]
    fn set_look_at_steers_the_short_way_after_many_revolutions() {
        let config = OrbitConfig {
            enable_damping: false,
            auto_rotate: true,
            auto_rotate_speed: 2.0,
            ..OrbitConfig::default()
        };
        let mut orbit = orbit(config);
        // ~10 full revolutions of accumulated azimuth.
        for _ in 0..2000 {
            orbit.update(0.016);
        }
        let accumulated = orbit.azimuth_angle();
        assert!(accumulated > std::f32::consts::TAU);

        orbit.set_auto_rotate(false);
        orbit.set_look_at(Vec3::new(-6.0, 5.0, 10.0), Vec3::ZERO);

        let gap = (orbit.azimuth_angle() - accumulated).abs();
        assert!(gap <= std::f32::consts::PI + TOLERANCE);

        orbit.update(0.016);
        assert!((orbit.camera().eye - Vec3::new(-6.0, 5.0, 10.0)).length() < 1e-2);
    }

    #[test]
    fn pan_moves_target_perpendicular_to_view() {
        let mut orbit = orbit(undamped_config());
        orbit.set_position(0.0, 5.0, 10.0);
        let view = (orbit.target() - orbit.camera().eye).normalize();

        orbit.begin_drag();
        orbit.pan(Vec2::new(120.0, 0.0));
        orbit.end_drag();
        orbit.update(0.016);

        let shift = orbit.target();
        assert!(shift.length() > 0.0);
        assert!(shift.normalize().dot(view).abs() < 1e-4);
    }

    #[test]
    fn zoom_to_clamps_into_distance_bounds() {
        let mut orbit = orbit(undamped_config());
        orbit.zoom_to(500.0);
        assert_eq!(orbit.radius(), 30.0);
        orbit.zoom_to(0.01);
        assert_eq!(orbit.radius(), 1.0);
    }

    #[test]
    fn zoom_to_zero_never_collapses_onto_the_target() {
        let mut orbit = orbit(undamped_config());
        orbit.zoom_to(0.0);
        orbit.update(0.016);
        assert_eq!(orbit.radius(), 1.0);
        assert!(orbit.camera().forward().is_finite());
    }

    #[test]
    fn dispose_freezes_the_camera() {
        let mut orbit = orbit(undamped_config());
        orbit.update(0.016);
        let frozen = orbit.camera().eye;

        orbit.dispose();
        orbit.dispose();
        assert!(orbit.is_disposed());

        orbit.begin_drag();
        orbit.drag(Vec2::new(100.0, 100.0));
        orbit.wheel(-1.0);
        orbit.set_target(9.0, 9.0, 9.0);
        orbit.set_position(1.0, 1.0, 1.0);
        orbit.update(0.016);
        assert_eq!(orbit.camera().eye, frozen);
    }

    #[cfg(feature = "inspect")]
    #[test]
    fn snapshot_reflects_the_live_pose() {
        let mut orbit = orbit(undamped_config());
        orbit.update(0.016);
        let snapshot = orbit.snapshot();
        assert_eq!(snapshot.position, orbit.camera().eye);
        assert_eq!(snapshot.target, orbit.target());
        assert!((snapshot.radius - orbit.radius()).abs() < TOLERANCE);
    }
}
