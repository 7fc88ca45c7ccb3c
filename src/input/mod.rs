//! Windowing-independent view input.
//!
//! Front ends turn their native events into [`ViewEvent`]s (see
//! [`WinitTranslator`] for winit) and feed them to
//! [`CameraController::handle_event`]. Positions are canvas-relative pixels.

mod winit;

use glam::Vec2;

use crate::camera::{CameraController, Tap};

pub use self::winit::WinitTranslator;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Touch {
    pub id: u64,
    pub position: Vec2,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ViewEvent {
    PointerDown(Vec2),
    PointerMove(Vec2),
    PointerUp(Vec2),
    PointerLeave,
    /// Positive `delta_y` scrolls down/towards the user.
    Wheel { position: Vec2, delta_y: f32 },
    /// `touches` is every active touch, including the new one.
    TouchStart { touches: Vec<Touch> },
    TouchMove { touches: Vec<Touch> },
    TouchEnd { remaining: Vec<Touch>, lifted: Vec<Touch> },
    Resize(Vec2),
}

impl CameraController {
    /// Apply one input event. Returns the tap it completed, if any.
    pub fn handle_event(&mut self, event: &ViewEvent) -> Option<Tap> {
        match event {
            ViewEvent::PointerDown(p) => self.pointer_down(*p),
            ViewEvent::PointerMove(p) => self.pointer_move(*p),
            ViewEvent::PointerUp(p) => return self.pointer_up(*p),
            ViewEvent::PointerLeave => self.pointer_leave(),
            ViewEvent::Wheel { position, delta_y } => self.wheel(*position, *delta_y),
            ViewEvent::TouchStart { touches } => self.touch_start(touches),
            ViewEvent::TouchMove { touches } => self.touch_move(touches),
            ViewEvent::TouchEnd { remaining, lifted } => return self.touch_end(remaining, lifted),
            ViewEvent::Resize(size) => self.resize(*size),
        }
        None
    }
}
