use glam::Vec2;
use serde::Deserialize;

use crate::input::Touch;

// ── Projection ──────────────────────────────────────────────────────────────

/// How tile space maps onto the screen.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Projection {
    /// `screen = size * (u, tile_size_y * v)`.
    #[default]
    Orthogonal,
    /// Diamond grid: `screen = size * (v - u, tile_size_y * (v + u))`.
    Isometric,
}

/// Everything the renderer needs to place the world under the canvas.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CameraState {
    /// Screen position of tile-space (0, 0).
    pub origin: Vec2,
    /// Pixels per tile (horizontal).
    pub tile_size: f32,
    /// Vertical foreshortening ratio.
    pub tile_size_y: f32,
    pub projection: Projection,
    /// Last known pointer position, screen space.
    pub cursor: Vec2,
    pub canvas: Vec2,
}

impl CameraState {
    pub fn new(config: &CameraConfig) -> Self {
        Self {
            origin: Vec2::ZERO,
            tile_size: config.tile_size.max(config.tile_size_min),
            tile_size_y: config.tile_size_y,
            projection: config.projection,
            cursor: Vec2::ZERO,
            canvas: Vec2::ZERO,
        }
    }

    /// Tile-space point to a screen offset relative to `origin`.
    pub fn project(&self, tile: Vec2) -> Vec2 {
        let s = self.tile_size;
        match self.projection {
            Projection::Orthogonal => Vec2::new(s * tile.x, s * self.tile_size_y * tile.y),
            Projection::Isometric => Vec2::new(
                s * (tile.y - tile.x),
                s * self.tile_size_y * (tile.y + tile.x),
            ),
        }
    }

    /// Screen offset relative to `origin` to a tile-space point.
    /// Exact inverse of [`project`](Self::project).
    pub fn unproject(&self, raw: Vec2) -> Vec2 {
        let s = self.tile_size;
        let sy = s * self.tile_size_y;
        match self.projection {
            Projection::Orthogonal => Vec2::new(raw.x / s, raw.y / sy),
            Projection::Isometric => {
                let diff = raw.x / s;
                let sum = raw.y / sy;
                Vec2::new((sum - diff) * 0.5, (sum + diff) * 0.5)
            }
        }
    }

    pub fn to_screen(&self, tile: Vec2) -> Vec2 {
        self.origin + self.project(tile)
    }

    pub fn to_tile(&self, screen: Vec2) -> Vec2 {
        self.unproject(screen - self.origin)
    }

    /// Tile-space point under the last known cursor position.
    pub fn cursor_tile(&self) -> Vec2 {
        self.to_tile(self.cursor)
    }

    /// Move the origin so `tile` sits at the canvas centre.
    pub fn center_on(&mut self, tile: Vec2) {
        self.origin = self.canvas * 0.5 - self.project(tile);
    }

    /// Snapshot for the render side.
    pub fn uniform(&self, frame: u32) -> ViewUniform {
        ViewUniform {
            origin: self.origin.to_array(),
            tile_size: self.tile_size,
            tile_size_y: self.tile_size_y,
            cursor: self.cursor.to_array(),
            canvas: self.canvas.to_array(),
            frame,
            projection: match self.projection {
                Projection::Orthogonal => 0,
                Projection::Isometric => 1,
            },
            _pad: [0; 2],
        }
    }
}

/// Camera state laid out for a uniform buffer.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ViewUniform {
    pub origin: [f32; 2],
    pub tile_size: f32,
    pub tile_size_y: f32,
    pub cursor: [f32; 2],
    pub canvas: [f32; 2],
    pub frame: u32,
    /// 0 = orthogonal, 1 = isometric.
    pub projection: u32,
    pub _pad: [u32; 2],
}

// ── Config ──────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub tile_size: f32,
    pub tile_size_y: f32,
    pub tile_size_min: f32,
    /// Tile size multiplier for a positive wheel delta.
    pub zoom_out_ratio: f32,
    /// Tile size multiplier for a negative wheel delta.
    pub zoom_in_ratio: f32,
    pub projection: Projection,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            tile_size: 60.0,
            tile_size_y: 1.0,
            tile_size_min: 3.0,
            zoom_out_ratio: 1.2,
            zoom_in_ratio: 0.8,
            projection: Projection::Orthogonal,
        }
    }
}

impl CameraConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

// ── Controller ──────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Mode {
    Idle,
    Panning,
    Pinching,
}

/// A pointer or touch released without the view having moved.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Tap {
    pub screen: Vec2,
    pub tile: Vec2,
}

#[derive(Copy, Clone, Debug)]
struct Pan {
    start_cursor: Vec2,
    start_origin: Vec2,
}

#[derive(Copy, Clone, Debug)]
struct Pinch {
    distance: f32,
    tile_size: f32,
    origin: Vec2,
    /// Tile under the two-finger midpoint at pinch start.
    tile: Vec2,
    /// That tile's origin-relative screen offset at pinch start.
    offset: Vec2,
}

#[derive(Copy, Clone, Debug)]
enum Interaction {
    Idle,
    Panning(Pan),
    Pinching(Pinch),
}

/// Turns pointer, wheel and touch input into [`CameraState`] changes.
///
/// Panning moves the origin 1:1 with the pointer. Zooming keeps the tile
/// under the wheel cursor or pinch midpoint at the same screen position.
/// Both are computed from the gesture's start snapshot, never accumulated.
#[derive(Clone, Debug)]
pub struct CameraController {
    pub state: CameraState,
    config: CameraConfig,
    interaction: Interaction,
}

impl CameraController {
    pub fn new(config: CameraConfig) -> Self {
        Self {
            state: CameraState::new(&config),
            config,
            interaction: Interaction::Idle,
        }
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    pub fn mode(&self) -> Mode {
        match self.interaction {
            Interaction::Idle => Mode::Idle,
            Interaction::Panning(_) => Mode::Panning,
            Interaction::Pinching(_) => Mode::Pinching,
        }
    }

    fn set_interaction(&mut self, next: Interaction) {
        let before = self.mode();
        self.interaction = next;
        let after = self.mode();
        if before != after {
            tracing::debug!(?before, ?after, "camera interaction");
        }
    }

    pub fn resize(&mut self, canvas: Vec2) {
        self.state.canvas = canvas;
    }

    pub fn center_on(&mut self, tile: Vec2) {
        self.state.center_on(tile);
    }

    pub fn cursor_tile(&self) -> Vec2 {
        self.state.cursor_tile()
    }

    // ── Pointer ──

    pub fn pointer_down(&mut self, position: Vec2) {
        self.state.cursor = position;
        if matches!(self.interaction, Interaction::Pinching(_)) {
            return;
        }
        self.set_interaction(Interaction::Panning(Pan {
            start_cursor: position,
            start_origin: self.state.origin,
        }));
    }

    pub fn pointer_move(&mut self, position: Vec2) {
        self.state.cursor = position;
        if let Interaction::Panning(pan) = self.interaction {
            self.state.origin = pan.start_origin + (position - pan.start_cursor);
        }
    }

    /// End a pan. Reports a tap when the origin never moved.
    pub fn pointer_up(&mut self, position: Vec2) -> Option<Tap> {
        self.state.cursor = position;
        let Interaction::Panning(pan) = self.interaction else {
            return None;
        };
        self.set_interaction(Interaction::Idle);
        self.tap_if_still(pan, position)
    }

    pub fn pointer_leave(&mut self) {
        if let Interaction::Panning(_) = self.interaction {
            self.set_interaction(Interaction::Idle);
        }
    }

    fn tap_if_still(&self, pan: Pan, position: Vec2) -> Option<Tap> {
        let unmoved = pan.start_origin.x.to_bits() == self.state.origin.x.to_bits()
            && pan.start_origin.y.to_bits() == self.state.origin.y.to_bits();
        unmoved.then(|| Tap {
            screen: position,
            tile: self.state.to_tile(position),
        })
    }

    // ── Zoom ──

    /// Wheel zoom about `position`. A zero delta is ignored.
    pub fn wheel(&mut self, position: Vec2, delta_y: f32) {
        self.state.cursor = position;
        if delta_y == 0.0 || delta_y.is_nan() {
            return;
        }
        let ratio = if delta_y > 0.0 {
            self.config.zoom_out_ratio
        } else {
            self.config.zoom_in_ratio
        };
        self.zoom_about(position, self.state.tile_size * ratio);
    }

    /// Set the tile size, keeping the tile under `anchor` at `anchor`.
    pub fn zoom_about(&mut self, anchor: Vec2, tile_size: f32) {
        let raw = anchor - self.state.origin;
        let tile = self.state.unproject(raw);
        self.state.tile_size = self.clamp_size(tile_size);
        let actual = self.state.project(tile);
        self.state.origin -= actual - raw;
    }

    fn clamp_size(&self, size: f32) -> f32 {
        size.max(self.config.tile_size_min)
    }

    // ── Touch ──

    /// `touches` is the full set of active touches after the new one landed.
    pub fn touch_start(&mut self, touches: &[Touch]) {
        match touches {
            [] => {}
            [only] => {
                if matches!(self.interaction, Interaction::Idle) {
                    self.pointer_down(only.position);
                }
            }
            [a, b, ..] => self.begin_pinch(a.position, b.position),
        }
    }

    fn begin_pinch(&mut self, a: Vec2, b: Vec2) {
        let mid = (a + b) * 0.5;
        self.state.cursor = mid;
        let offset = mid - self.state.origin;
        let tile = self.state.unproject(offset);
        self.set_interaction(Interaction::Pinching(Pinch {
            distance: a.distance(b),
            tile_size: self.state.tile_size,
            origin: self.state.origin,
            tile,
            offset: self.state.project(tile),
        }));
    }

    pub fn touch_move(&mut self, touches: &[Touch]) {
        match (self.interaction, touches) {
            (Interaction::Pinching(pinch), [a, b, ..]) => {
                if pinch.distance <= 0.0 {
                    return;
                }
                let scale = a.position.distance(b.position) / pinch.distance;
                self.state.tile_size = self.clamp_size(pinch.tile_size * scale);
                self.state.origin = pinch.origin + pinch.offset - self.state.project(pinch.tile);
            }
            (Interaction::Panning(_), [only]) => self.pointer_move(only.position),
            _ => {}
        }
    }

    /// `remaining` are the touches still down, `lifted` the ones just
    /// released. Lifting the last finger of an unmoved pan is a tap.
    pub fn touch_end(&mut self, remaining: &[Touch], lifted: &[Touch]) -> Option<Tap> {
        match self.interaction {
            Interaction::Pinching(_) if remaining.len() < 2 => {
                self.set_interaction(Interaction::Idle);
                None
            }
            Interaction::Panning(_) if remaining.is_empty() => {
                let position = lifted.first().map_or(self.state.cursor, |t| t.position);
                self.pointer_up(position)
            }
            _ => None,
        }
    }
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new(CameraConfig::default())
    }
}
