use glam::{Mat4, Vec3};

/// Degrees of view rotation per pixel of horizontal drag, per second.
pub const DRAG_SPEED: f32 = 15.0;

const FOV_Y_DEGREES: f32 = 45.0;
const Z_NEAR: f32 = 0.1;
const Z_FAR: f32 = 1000.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CameraMode {
    /// Dragging rotates the view about world up; otherwise the view is fixed.
    Orbit { drag_speed: f32 },
    /// The scene spins on its own and input is ignored.
    Turntable { degrees_per_second: f32 },
}

impl Default for CameraMode {
    fn default() -> Self {
        Self::Orbit {
            drag_speed: DRAG_SPEED,
        }
    }
}

pub struct State {
    view: Mat4,
    perspective: Mat4,
    scene_model: Mat4,
    mode: CameraMode,
}

impl State {
    pub fn new(mode: CameraMode, width: u32, height: u32) -> Self {
        Self {
            view: Mat4::look_at_rh(
                Vec3::new(0.0, 25.0, -45.0),
                Vec3::new(0.0, -2.0, 0.0),
                Vec3::Y,
            ),
            perspective: Self::projection(width, height),
            scene_model: Mat4::IDENTITY,
            mode,
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn projection(width: u32, height: u32) -> Mat4 {
        let aspect = width.max(1) as f32 / height.max(1) as f32;
        Mat4::perspective_rh_gl(FOV_Y_DEGREES.to_radians(), aspect, Z_NEAR, Z_FAR)
    }

    pub fn get_perspective(&self) -> Mat4 {
        self.perspective
    }

    pub fn get_view(&self) -> Mat4 {
        self.view
    }

    /// Transform applied to the whole scene (board and pieces).
    pub fn get_scene_model(&self) -> Mat4 {
        self.scene_model
    }

    /// World-space position of the eye.
    pub fn eye_position(&self) -> Vec3 {
        self.view.inverse().w_axis.truncate()
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.perspective = Self::projection(width, height);
    }

    /// Advances one frame. `drag_dx` is the horizontal pointer travel while the
    /// drag button was held, in pixels; `dt` is the frame time in seconds.
    pub fn update(&mut self, drag_dx: f32, dt: f32) {
        match self.mode {
            CameraMode::Orbit { drag_speed } => {
                if drag_dx != 0.0 {
                    self.view *= Mat4::from_rotation_y((drag_dx * drag_speed).to_radians() * dt);
                }
            }
            CameraMode::Turntable { degrees_per_second } => {
                self.scene_model *= Mat4::from_rotation_y(degrees_per_second.to_radians() * dt);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Mat4, b: Mat4) -> bool {
        a.abs_diff_eq(b, 1e-5)
    }

    #[test]
    fn orbit_without_drag_keeps_view() {
        let mut cam = State::new(CameraMode::default(), 640, 480);
        let before = cam.get_view();
        for _ in 0..10 {
            cam.update(0.0, 0.016);
        }
        assert_eq!(cam.get_view(), before);
        assert_eq!(cam.get_scene_model(), Mat4::IDENTITY);
    }

    #[test]
    fn orbit_drag_composes_into_view() {
        let mut cam = State::new(CameraMode::default(), 640, 480);
        let start = cam.get_view();
        cam.update(4.0, 0.5);
        let expected = start * Mat4::from_rotation_y((4.0 * DRAG_SPEED).to_radians() * 0.5);
        assert!(close(cam.get_view(), expected));

        // a second drag accumulates rather than resetting
        cam.update(4.0, 0.5);
        let expected = start * Mat4::from_rotation_y((8.0 * DRAG_SPEED).to_radians() * 0.5);
        assert!(close(cam.get_view(), expected));
    }

    #[test]
    fn orbit_keeps_eye_distance() {
        let mut cam = State::new(CameraMode::default(), 640, 480);
        let radius = cam.eye_position().length();
        cam.update(37.0, 0.1);
        assert!((cam.eye_position().length() - radius).abs() < 1e-3);
        assert!((cam.eye_position().y - 25.0).abs() < 1e-3);
    }

    #[test]
    fn turntable_advances_by_speed_times_dt() {
        let mode = CameraMode::Turntable {
            degrees_per_second: 90.0,
        };
        let mut cam = State::new(mode, 640, 480);
        let view = cam.get_view();
        cam.update(100.0, 0.5);
        assert_eq!(cam.get_view(), view);
        assert!(close(
            cam.get_scene_model(),
            Mat4::from_rotation_y(45f32.to_radians())
        ));

        cam.update(0.0, 1.0);
        assert!(close(
            cam.get_scene_model(),
            Mat4::from_rotation_y(135f32.to_radians())
        ));
    }

    #[test]
    fn eye_starts_behind_the_board() {
        let cam = State::new(CameraMode::default(), 640, 480);
        assert!(cam.eye_position().abs_diff_eq(Vec3::new(0.0, 25.0, -45.0), 1e-3));
    }

    #[test]
    fn resize_tracks_aspect() {
        let mut cam = State::new(CameraMode::default(), 640, 480);
        let narrow = cam.get_perspective();
        cam.resize(1280, 480);
        assert!(cam.get_perspective().x_axis.x < narrow.x_axis.x);
        // zero-sized windows (minimised) do not produce NaNs
        cam.resize(0, 0);
        assert!(!cam.get_perspective().x_axis.x.is_nan());
    }
}
