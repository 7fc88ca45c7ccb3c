//! One running map: camera, walking actors, triggers and the surfaces the
//! renderer uploads each frame.
//!
//! Everything runs on the caller's frame/event thread. A session that has
//! been [`stop`](Session::stop)ped ignores every further frame, tap and
//! event, so a replacement session can take over the same render target.

use glam::{IVec2, Vec2};
use image::RgbaImage;
use serde::Deserialize;

use crate::camera::{CameraConfig, CameraController, Tap, ViewUniform};
use crate::grid::BlockingGrid;
use crate::input::ViewEvent;
use crate::motion::{MotionConfig, MotionEvent, Pursuit, SpriteAnimator, SpriteSheet};
use crate::pathfinding::{Movement, Pathfinder, containing_cell};
use crate::tilemap::{ObjectHandle, TileMap};
use crate::trigger::{TriggerHandler, TriggerMap};

// ── Config ──────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub camera: CameraConfig,
    pub motion: MotionConfig,
    pub movement: Movement,
    /// Names of the map objects that walk on tap. The first one is the
    /// primary actor: the camera centres on it and its arrivals fire
    /// triggers.
    pub actors: Vec<String>,
    /// Frames between animated-tile overlay updates.
    pub animation_cadence: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            camera: CameraConfig::default(),
            motion: MotionConfig::default(),
            movement: Movement::default(),
            actors: vec!["character".to_string()],
            animation_cadence: 12,
        }
    }
}

impl SessionConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

// ── Session ─────────────────────────────────────────────────────────────────

/// A map object driven along paths.
#[derive(Clone, Debug)]
pub struct Actor {
    pub name: String,
    pub handle: ObjectHandle,
    pub motion: Pursuit,
}

/// What happened during one [`Session::frame`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameReport {
    pub frame: u32,
    /// Actor index and cell, for every actor that finished its path.
    pub arrivals: Vec<(usize, IVec2)>,
    /// Objects whose one-shot animation ended this frame.
    pub finished_animations: Vec<ObjectHandle>,
    /// Set when the animated-tile overlay was redrawn.
    pub animation_tick: Option<u64>,
    pub triggers_fired: usize,
}

/// Surfaces for the render side. `below` and `above` only change on map
/// edits; `objects` and `animation` are rewritten in place.
pub struct Surfaces<'a> {
    pub below: &'a RgbaImage,
    pub above: &'a RgbaImage,
    pub objects: &'a RgbaImage,
    pub animation: &'a RgbaImage,
}

pub struct Session {
    config: SessionConfig,
    map: TileMap,
    pathfinder: Pathfinder,
    camera: CameraController,
    actors: Vec<Actor>,
    triggers: TriggerMap,
    one_shots: Vec<(ObjectHandle, SpriteAnimator)>,
    below: RgbaImage,
    above: RgbaImage,
    objects: RgbaImage,
    animation: RgbaImage,
    frame: u32,
    animation_tick: u64,
    stopped: bool,
}

impl Session {
    pub fn new(map: TileMap, config: SessionConfig) -> Self {
        let pathfinder = Pathfinder::from_map(&map, config.movement).unwrap_or_else(|| {
            Pathfinder::new(BlockingGrid::open(map.width, map.height), config.movement)
        });
        let triggers = TriggerMap::from_map(&map);

        let mut actors = Vec::new();
        for name in &config.actors {
            let Some(handle) = map.find_object_handle(name) else {
                tracing::warn!(actor = %name, "actor object not found on map");
                continue;
            };
            let Some(object) = map.object(handle) else {
                continue;
            };
            let speed = object
                .properties
                .float("speed")
                .map_or(config.motion.speed, |s| s as f32);
            let (column, row) = object.tile().map_or((0, 0), |t| (t.column, t.row));
            let base = SpriteSheet {
                cadence: config.motion.frame_cadence,
                ..SpriteSheet::still(column, row)
            };
            let animator = SpriteAnimator::new(
                SpriteSheet::from_properties(&object.properties, &base),
                column,
                row,
            );
            actors.push(Actor {
                name: name.clone(),
                handle,
                motion: Pursuit::new(object.position(), speed, animator),
            });
        }

        let below = map.rasterize_below_actors();
        let above = map.rasterize_above_actors();
        let objects = map.rasterize_objects(|_| true);
        let animation = map.new_surface();

        let mut camera = CameraController::new(config.camera.clone());
        if let Some(actor) = actors.first() {
            camera.center_on(actor.motion.position());
        }

        tracing::debug!(actors = actors.len(), triggers = !triggers.is_empty(), "session started");

        Self {
            config,
            map,
            pathfinder,
            camera,
            actors,
            triggers,
            one_shots: Vec::new(),
            below,
            above,
            objects,
            animation,
            frame: 0,
            animation_tick: 0,
            stopped: false,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn map(&self) -> &TileMap {
        &self.map
    }

    /// Mutable map access. Call [`refresh`](Self::refresh) after editing
    /// layers so the grid, triggers and static surfaces follow.
    pub fn map_mut(&mut self) -> &mut TileMap {
        &mut self.map
    }

    /// Re-derive the blocking grid, triggers and static surfaces.
    pub fn refresh(&mut self) {
        self.pathfinder.rebuild(&self.map);
        self.triggers = TriggerMap::from_map(&self.map);
        self.map.rasterize_into(|l, _| !l.is_above_actors() && !l.is_hidden(), &mut self.below);
        self.map.rasterize_into(|l, _| l.is_above_actors() && !l.is_hidden(), &mut self.above);
    }

    pub fn pathfinder(&self) -> &Pathfinder {
        &self.pathfinder
    }

    pub fn camera(&self) -> &CameraController {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut CameraController {
        &mut self.camera
    }

    pub fn actors(&self) -> &[Actor] {
        &self.actors
    }

    pub fn triggers(&self) -> &TriggerMap {
        &self.triggers
    }

    pub fn frame_number(&self) -> u32 {
        self.frame
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn surfaces(&self) -> Surfaces<'_> {
        Surfaces {
            below: &self.below,
            above: &self.above,
            objects: &self.objects,
            animation: &self.animation,
        }
    }

    /// Centre the camera on the primary actor, if there is one.
    pub fn center_on_actor(&mut self) {
        if let Some(actor) = self.actors.first() {
            self.camera.center_on(actor.motion.position());
        }
    }

    pub fn uniform(&self) -> ViewUniform {
        self.camera.state.uniform(self.frame)
    }

    /// Advance one frame: move actors, run one-shot animations, update the
    /// animated-tile overlay and redraw the object surface.
    pub fn frame<H: TriggerHandler + ?Sized>(&mut self, handler: &mut H) -> FrameReport {
        if self.stopped {
            return FrameReport { frame: self.frame, ..FrameReport::default() };
        }
        self.frame = self.frame.wrapping_add(1);
        let frame = u64::from(self.frame);
        let mut report = FrameReport { frame: self.frame, ..FrameReport::default() };

        for (i, actor) in self.actors.iter_mut().enumerate() {
            let event = actor.motion.tick(frame);
            if let Some(object) = self.map.object_mut(actor.handle) {
                object.set_position(actor.motion.position());
                if let Some(tile) = object.tile_mut() {
                    (tile.column, tile.row) = actor.motion.animator.cell();
                }
            }
            if let MotionEvent::Arrived(cell) = event {
                report.arrivals.push((i, cell));
                if i == 0 {
                    report.triggers_fired += self.triggers.fire_at(actor.motion.position(), &mut *handler);
                }
            }
        }

        let map = &mut self.map;
        self.one_shots.retain_mut(|(handle, animator)| {
            let finished = animator.advance_once(frame);
            if let Some(tile) = map.object_mut(*handle).and_then(|o| o.tile_mut()) {
                tile.column = animator.cell().0;
            }
            if finished {
                report.finished_animations.push(*handle);
            }
            !finished
        });

        let cadence = self.config.animation_cadence.max(1);
        if self.frame % cadence == 0 {
            self.map.rasterize_animation(self.animation_tick, &mut self.animation);
            report.animation_tick = Some(self.animation_tick);
            self.animation_tick += 1;
        }

        self.map.rasterize_objects_into(|_| true, &mut self.objects);
        report
    }

    /// Start a one-shot sheet animation on the named object.
    pub fn play_once(&mut self, name: &str) -> bool {
        if self.stopped {
            return false;
        }
        let Some(handle) = self.map.find_object_handle(name) else {
            tracing::warn!(object = %name, "no object to animate");
            return false;
        };
        let Some(object) = self.map.object(handle) else {
            return false;
        };
        let Some(tile) = object.tile() else {
            return false;
        };
        let base = SpriteSheet {
            cadence: self.config.motion.frame_cadence,
            ..SpriteSheet::still(tile.column, tile.row)
        };
        let mut animator = SpriteAnimator::new(
            SpriteSheet::from_properties(&object.properties, &base),
            tile.column,
            tile.row,
        );
        animator.play_once(u64::from(self.frame));
        self.one_shots.retain(|(h, _)| *h != handle);
        self.one_shots.push((handle, animator));
        true
    }

    /// Send every actor toward the cell containing `tile`. Returns whether
    /// any actor got a new path; taps outside the map do nothing.
    pub fn tap(&mut self, tile: Vec2) -> bool {
        if self.stopped {
            return false;
        }
        let goal = containing_cell(tile);
        if !self.pathfinder.grid().in_bounds(goal) {
            tracing::warn!(?tile, "tap outside the map");
            return false;
        }
        let mut moved = false;
        for actor in &mut self.actors {
            let path = self.pathfinder.search_from(actor.motion.position(), goal);
            moved |= actor.motion.set_path(path);
        }
        moved
    }

    /// Feed an input event to the camera; a completed tap moves the actors.
    pub fn handle_event(&mut self, event: &ViewEvent) -> Option<Tap> {
        if self.stopped {
            return None;
        }
        let tap = self.camera.handle_event(event)?;
        self.tap(tap.tile);
        Some(tap)
    }

    /// Quiesce: halt every actor and ignore all further input and frames.
    pub fn stop(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;
        for actor in &mut self.actors {
            actor.motion.stop();
        }
        self.one_shots.clear();
        tracing::debug!(frame = self.frame, "session stopped");
    }

    /// Stop this session and start one on `map`, keeping the zoom level and
    /// canvas. The primary actor is placed at `spawn` when given.
    pub fn handoff(mut self, map: TileMap, spawn: Option<Vec2>) -> Session {
        self.stop();
        let mut next = Session::new(map, self.config.clone());
        next.camera.state.tile_size = self.camera.state.tile_size;
        next.camera.resize(self.camera.state.canvas);

        if let (Some(actor), Some(spawn)) = (next.actors.first_mut(), spawn) {
            actor.motion.teleport(spawn);
            if let Some(object) = next.map.object_mut(actor.handle) {
                object.set_position(spawn);
            }
        }
        next.center_on_actor();
        next.map.rasterize_objects_into(|_| true, &mut next.objects);
        next
    }
}
