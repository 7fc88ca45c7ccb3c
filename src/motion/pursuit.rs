use std::collections::VecDeque;

use glam::{IVec2, Vec2};

use super::{Facing, MotionEvent, SpriteAnimator};

/// Frame-driven movement: every tick the actor moves `speed` tiles straight
/// toward the next cell of its path, snapping onto the cell once it is
/// within one step.
#[derive(Clone, Debug)]
pub struct Pursuit {
    position: Vec2,
    speed: f32,
    path: Option<VecDeque<IVec2>>,
    facing: Facing,
    pub animator: SpriteAnimator,
}

impl Pursuit {
    pub fn new(position: Vec2, speed: f32, animator: SpriteAnimator) -> Self {
        Self {
            position,
            speed: speed.max(f32::EPSILON),
            path: None,
            facing: Facing::default(),
            animator,
        }
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn is_moving(&self) -> bool {
        self.path.is_some()
    }

    /// Cells still ahead, next first.
    pub fn remaining(&self) -> impl Iterator<Item = IVec2> + '_ {
        self.path.iter().flatten().copied()
    }

    /// Final cell of the current path.
    pub fn destination(&self) -> Option<IVec2> {
        self.path.as_ref().and_then(|p| p.back().copied())
    }

    /// Start following `path` from wherever the actor is now. The previous
    /// path is dropped. An empty path changes nothing and returns `false`.
    pub fn set_path(&mut self, path: Vec<IVec2>) -> bool {
        if path.is_empty() {
            return false;
        }
        self.path = Some(path.into());
        true
    }

    /// Drop the path and stand still where the actor is.
    pub fn stop(&mut self) {
        if self.path.take().is_some() {
            self.animator.rest();
        }
    }

    /// Place the actor without moving along a path.
    pub fn teleport(&mut self, position: Vec2) {
        self.path = None;
        self.position = position;
        self.animator.rest();
    }

    /// Advance one frame. `frame` drives the walk-cycle cadence.
    pub fn tick(&mut self, frame: u64) -> MotionEvent {
        let Some(path) = self.path.as_mut() else {
            return MotionEvent::Idle;
        };
        let Some(&next) = path.front() else {
            self.path = None;
            self.animator.rest();
            return MotionEvent::Idle;
        };

        let target = next.as_vec2();
        let delta = target - self.position;
        let dist = delta.length();
        if let Some(facing) = Facing::from_delta(delta) {
            self.facing = facing;
        }

        if dist <= self.speed {
            self.position = target;
            path.pop_front();
            if path.is_empty() {
                self.path = None;
                self.animator.face(self.facing);
                self.animator.rest();
                return MotionEvent::Arrived(next);
            }
        } else {
            self.position += delta / dist * self.speed;
        }

        self.animator.walk(frame, self.facing);
        MotionEvent::Moving
    }
}
