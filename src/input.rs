use glam::Vec2;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};

use crate::orbit::OrbitCamera;

#[derive(Debug, Clone, Copy, PartialEq)]
enum DragMode {
    Idle,
    Rotate,
    Pan,
}

/// Translates winit window events into orbit controller operations.
///
/// Left-drag rotates, right-drag pans the target in screen space, the wheel
/// dollies. The right button maps straight to pan; there is no native context
/// menu to suppress under winit.
pub struct InputState {
    pointer: Vec2,
    mode: DragMode,
}

impl InputState {
    pub fn new() -> Self {
        Self {
            pointer: Vec2::ZERO,
            mode: DragMode::Idle,
        }
    }

    /// Returns true when the event was consumed by the camera.
    pub fn handle_event(&mut self, orbit: &mut OrbitCamera, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::MouseInput { button, state, .. } => match state {
                ElementState::Pressed => self.press(orbit, *button),
                ElementState::Released => self.release(orbit, *button),
            },
            WindowEvent::CursorMoved { position, .. } => {
                let pos = Vec2::new(position.x as f32, position.y as f32);
                self.pointer_moved(orbit, pos);
                true
            }
            WindowEvent::MouseWheel { delta, .. } => {
                orbit.wheel(wheel_delta_y(delta));
                true
            }
            _ => false,
        }
    }

    fn press(&mut self, orbit: &mut OrbitCamera, button: MouseButton) -> bool {
        let mode = match button {
            MouseButton::Left => DragMode::Rotate,
            MouseButton::Right => DragMode::Pan,
            _ => return false,
        };
        self.mode = mode;
        orbit.begin_drag();
        true
    }

    fn release(&mut self, orbit: &mut OrbitCamera, button: MouseButton) -> bool {
        if !matches!(button, MouseButton::Left | MouseButton::Right) {
            return false;
        }
        self.mode = DragMode::Idle;
        orbit.end_drag();
        true
    }

    fn pointer_moved(&mut self, orbit: &mut OrbitCamera, pos: Vec2) {
        let delta = pos - self.pointer;
        self.pointer = pos;
        match self.mode {
            DragMode::Rotate => orbit.drag(delta),
            DragMode::Pan => orbit.pan(delta),
            DragMode::Idle => {}
        }
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}

/// Winit reports wheel movement positive-up; the controller expects the
/// browser deltaY convention (negative = zoom in).
fn wheel_delta_y(delta: &MouseScrollDelta) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => -y,
        MouseScrollDelta::PixelDelta(pos) => -(pos.y as f32) * 0.01,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Camera;
    use crate::orbit::OrbitConfig;

    fn orbit() -> OrbitCamera {
        let mut camera = Camera::new();
        camera.eye = glam::Vec3::new(0.0, 5.0, 10.0);
        let config = OrbitConfig {
            enable_damping: false,
            ..OrbitConfig::default()
        };
        OrbitCamera::new(camera, config).unwrap()
    }

    #[test]
    fn left_drag_rotates() {
        let mut input = InputState::new();
        let mut orbit = orbit();
        let start = orbit.azimuth_angle();

        input.press(&mut orbit, MouseButton::Left);
        input.pointer_moved(&mut orbit, Vec2::new(40.0, 0.0));
        input.release(&mut orbit, MouseButton::Left);

        assert!(orbit.azimuth_angle() != start);
        assert!(!orbit.is_dragging());
    }

    #[test]
    fn right_drag_pans_the_target() {
        let mut input = InputState::new();
        let mut orbit = orbit();

        input.press(&mut orbit, MouseButton::Right);
        input.pointer_moved(&mut orbit, Vec2::new(60.0, 0.0));
        input.release(&mut orbit, MouseButton::Right);
        orbit.update(0.016);

        assert!(orbit.target().length() > 0.0);
    }

    #[test]
    fn movement_without_a_held_button_is_ignored() {
        let mut input = InputState::new();
        let mut orbit = orbit();
        let start = orbit.azimuth_angle();

        input.pointer_moved(&mut orbit, Vec2::new(500.0, 500.0));
        assert_eq!(orbit.azimuth_angle(), start);
    }

    #[test]
    fn scroll_up_zooms_in() {
        let mut orbit = orbit();
        let start = orbit.radius();
        orbit.wheel(wheel_delta_y(&MouseScrollDelta::LineDelta(0.0, 1.0)));
        assert!(orbit.radius() < start);
    }

    #[test]
    fn middle_button_is_not_consumed() {
        let mut input = InputState::new();
        let mut orbit = orbit();
        assert!(!input.press(&mut orbit, MouseButton::Middle));
        assert!(!orbit.is_dragging());
    }
}
