use std::collections::VecDeque;

use glam::{IVec2, Vec2};

use super::{Facing, MotionConfig, MotionEvent, SpriteAnimator};
use crate::pathfinding::nearest_cell;
use crate::trigger::{TriggerHandler, TriggerMap};

/// One emitted position of a step-interpolated walk.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Waypoint {
    pub position: Vec2,
    pub facing: Facing,
}

/// Split each segment of `from -> path[0] -> path[1] -> ...` into
/// `substeps + 1` equal steps. Every cell of the path is emitted exactly, and
/// each point carries the facing of its segment. Zero-length segments emit
/// nothing.
pub fn subdivide(from: Vec2, path: &[IVec2], substeps: u32) -> Vec<Waypoint> {
    let parts = substeps + 1;
    let mut out = Vec::with_capacity(path.len() * parts as usize);
    let mut prev = from;
    for &cell in path {
        let target = cell.as_vec2();
        let Some(facing) = Facing::from_delta(target - prev) else {
            continue;
        };
        for i in 1..parts {
            let t = i as f32 / parts as f32;
            out.push(Waypoint { position: prev.lerp(target, t), facing });
        }
        out.push(Waypoint { position: target, facing });
        prev = target;
    }
    out
}

/// Timer-driven movement: the path is pre-split into waypoints and one is
/// emitted per tick. When the last one is reached the triggers at the
/// destination fire.
#[derive(Clone, Debug)]
pub struct StepInterpolator {
    position: Vec2,
    facing: Facing,
    waypoints: VecDeque<Waypoint>,
    substeps: u32,
    interval: f32,
    elapsed: f32,
    pub animator: SpriteAnimator,
}

impl StepInterpolator {
    pub fn new(position: Vec2, config: &MotionConfig, animator: SpriteAnimator) -> Self {
        Self {
            position,
            facing: Facing::default(),
            waypoints: VecDeque::new(),
            substeps: config.substeps,
            interval: config.step_interval.max(f32::EPSILON),
            elapsed: 0.0,
            animator,
        }
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    pub fn is_moving(&self) -> bool {
        !self.waypoints.is_empty()
    }

    pub fn pending(&self) -> usize {
        self.waypoints.len()
    }

    /// Re-plan from the current position. An empty path changes nothing and
    /// returns `false`.
    pub fn set_path(&mut self, path: &[IVec2]) -> bool {
        let waypoints = subdivide(self.position, path, self.substeps);
        if waypoints.is_empty() {
            return false;
        }
        self.waypoints = waypoints.into();
        self.elapsed = 0.0;
        true
    }

    pub fn stop(&mut self) {
        self.waypoints.clear();
        self.elapsed = 0.0;
        self.animator.rest();
    }

    /// Emit the next waypoint.
    pub fn tick<H: TriggerHandler + ?Sized>(&mut self, triggers: &TriggerMap, handler: &mut H) -> MotionEvent {
        let Some(point) = self.waypoints.pop_front() else {
            return MotionEvent::Idle;
        };
        self.position = point.position;
        self.facing = point.facing;

        if self.waypoints.is_empty() {
            let cell = nearest_cell(self.position);
            self.animator.face(self.facing);
            self.animator.rest();
            triggers.fire_at(self.position, &mut *handler);
            return MotionEvent::Arrived(cell);
        }
        self.animator.step(self.facing);
        MotionEvent::Moving
    }

    /// Accumulate `dt` seconds and emit one waypoint per elapsed interval.
    /// Reports the last event, so an arrival inside the batch is not lost.
    pub fn update<H: TriggerHandler + ?Sized>(
        &mut self,
        dt: f32,
        triggers: &TriggerMap,
        handler: &mut H,
    ) -> MotionEvent {
        if self.waypoints.is_empty() {
            self.elapsed = 0.0;
            return MotionEvent::Idle;
        }
        self.elapsed += dt.max(0.0);
        let mut event = MotionEvent::Moving;
        while self.elapsed >= self.interval && !self.waypoints.is_empty() {
            self.elapsed -= self.interval;
            event = self.tick(triggers, &mut *handler);
        }
        if self.waypoints.is_empty() {
            self.elapsed = 0.0;
        }
        event
    }
}
