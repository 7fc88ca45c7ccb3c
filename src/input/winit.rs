use glam::Vec2;
use ::winit::event::{ElementState, MouseButton, MouseScrollDelta, TouchPhase, WindowEvent};

use super::{Touch, ViewEvent};

/// Converts winit window events into [`ViewEvent`]s.
///
/// winit reports touches one at a time, so the translator keeps the set of
/// active touches and the last cursor position to fill in the full event.
#[derive(Debug, Default)]
pub struct WinitTranslator {
    cursor: Vec2,
    touches: Vec<Touch>,
}

impl WinitTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_touches(&self) -> &[Touch] {
        &self.touches
    }

    /// `None` for events the view does not care about.
    pub fn translate(&mut self, event: &WindowEvent) -> Option<ViewEvent> {
        match event {
            WindowEvent::Resized(size) => {
                Some(ViewEvent::Resize(Vec2::new(size.width as f32, size.height as f32)))
            }

            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = Vec2::new(position.x as f32, position.y as f32);
                Some(ViewEvent::PointerMove(self.cursor))
            }

            WindowEvent::CursorLeft { .. } => Some(ViewEvent::PointerLeave),

            WindowEvent::MouseInput { button: MouseButton::Left, state, .. } => match state {
                ElementState::Pressed => Some(ViewEvent::PointerDown(self.cursor)),
                ElementState::Released => Some(ViewEvent::PointerUp(self.cursor)),
            },

            WindowEvent::MouseWheel { delta, .. } => {
                // winit: positive y scrolls up/away.
                let delta_y = match delta {
                    MouseScrollDelta::LineDelta(_, y) => -*y,
                    MouseScrollDelta::PixelDelta(pos) => -(pos.y as f32),
                };
                Some(ViewEvent::Wheel { position: self.cursor, delta_y })
            }

            WindowEvent::Touch(t) => {
                let touch = Touch {
                    id: t.id,
                    position: Vec2::new(t.location.x as f32, t.location.y as f32),
                };
                match t.phase {
                    TouchPhase::Started => {
                        self.touches.retain(|a| a.id != touch.id);
                        self.touches.push(touch);
                        Some(ViewEvent::TouchStart { touches: self.touches.clone() })
                    }
                    TouchPhase::Moved => {
                        let active = self.touches.iter_mut().find(|a| a.id == touch.id)?;
                        active.position = touch.position;
                        Some(ViewEvent::TouchMove { touches: self.touches.clone() })
                    }
                    TouchPhase::Ended | TouchPhase::Cancelled => {
                        let before = self.touches.len();
                        self.touches.retain(|a| a.id != touch.id);
                        if self.touches.len() == before {
                            return None;
                        }
                        Some(ViewEvent::TouchEnd {
                            remaining: self.touches.clone(),
                            lifted: vec![touch],
                        })
                    }
                }
            }

            _ => None,
        }
    }
}
