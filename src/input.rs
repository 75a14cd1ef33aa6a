use winit::event::{DeviceEvent, ElementState, MouseButton, WindowEvent};

/// Tracks left-button drags. Motion is collected between frames and handed
/// to the camera once per frame.
#[derive(Debug, Default)]
pub struct DragInput {
    dragging: bool,
    pending_dx: f32,
}

impl DragInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle_window_event(&mut self, event: &WindowEvent) {
        if let WindowEvent::MouseInput {
            state,
            button: MouseButton::Left,
            ..
        } = event
        {
            self.set_button(*state == ElementState::Pressed);
        }
    }

    pub fn handle_device_event(&mut self, event: &DeviceEvent) {
        if let DeviceEvent::MouseMotion { delta: (dx, _) } = event {
            #[allow(clippy::cast_possible_truncation)]
            let dx = *dx as f32;
            self.motion(dx);
        }
    }

    fn set_button(&mut self, pressed: bool) {
        self.dragging = pressed;
    }

    fn motion(&mut self, dx: f32) {
        if self.dragging {
            self.pending_dx += dx;
        }
    }

    /// Returns the horizontal drag travel since the last call and resets it.
    pub fn take_drag(&mut self) -> f32 {
        std::mem::take(&mut self.pending_dx)
    }
}
