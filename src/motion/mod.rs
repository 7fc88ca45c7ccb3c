//! Turning a discrete cell path into motion.
//!
//! Two interpolators share the same facing and sprite-sheet rules:
//! - [`Pursuit`] moves a fixed distance toward the next cell every frame.
//! - [`StepInterpolator`] pre-computes evenly spaced waypoints and emits one
//!   per timer tick.

mod pursuit;
mod steps;

use glam::{IVec2, Vec2};
use serde::Deserialize;

use crate::tilemap::Properties;

pub use pursuit::Pursuit;
pub use steps::{StepInterpolator, Waypoint, subdivide};

// ── Config ──────────────────────────────────────────────────────────────────

/// Motion tuning shared by both interpolation modes.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Tiles travelled per frame in pursuit mode.
    pub speed: f32,
    /// Frames between walk-cycle sheet columns in pursuit mode.
    pub frame_cadence: u32,
    /// Intermediate points inserted between consecutive cells in step mode.
    pub substeps: u32,
    /// Seconds per emitted point in step mode.
    pub step_interval: f32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            speed: 0.1,
            frame_cadence: 8,
            substeps: 3,
            step_interval: 0.1,
        }
    }
}

impl MotionConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

// ── Facing ──────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Facing {
    #[default]
    Down,
    Right,
    Up,
    Left,
}

impl Facing {
    /// Facing for a travel vector: the dominant axis wins, a tie goes to the
    /// vertical axis. `None` for a zero vector.
    pub fn from_delta(delta: Vec2) -> Option<Self> {
        if delta == Vec2::ZERO {
            return None;
        }
        Some(if delta.x.abs() > delta.y.abs() {
            if delta.x > 0.0 { Facing::Right } else { Facing::Left }
        } else if delta.y > 0.0 {
            Facing::Down
        } else {
            Facing::Up
        })
    }
}

/// What an interpolator did on one tick.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum MotionEvent {
    /// No path in progress.
    Idle,
    /// Moved toward the destination.
    Moving,
    /// Reached the final cell of the path this tick.
    Arrived(IVec2),
}

// ── Sprite sheet animation ──────────────────────────────────────────────────

/// Sheet rows holding each facing's walk cycle.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FacingRows {
    pub down: u32,
    pub right: u32,
    pub up: u32,
    pub left: u32,
}

impl Default for FacingRows {
    fn default() -> Self {
        Self { down: 0, right: 1, up: 2, left: 3 }
    }
}

impl FacingRows {
    pub fn row(&self, facing: Facing) -> u32 {
        match facing {
            Facing::Down => self.down,
            Facing::Right => self.right,
            Facing::Up => self.up,
            Facing::Left => self.left,
        }
    }
}

/// Static description of a sprite's sheet layout.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SpriteSheet {
    /// Column shown while standing still.
    pub idle_column: u32,
    pub min_column: u32,
    pub max_column: u32,
    /// Column to rest on after a one-shot animation; `min_column` if unset.
    pub after_once_column: Option<u32>,
    /// Frames between column advances.
    pub cadence: u32,
    pub rows: FacingRows,
}

impl Default for SpriteSheet {
    fn default() -> Self {
        Self {
            idle_column: 0,
            min_column: 0,
            max_column: 3,
            after_once_column: None,
            cadence: 8,
            rows: FacingRows::default(),
        }
    }
}

impl SpriteSheet {
    /// A sheet that never leaves `(column, row)`: the base for objects
    /// without sheet properties.
    pub fn still(column: u32, row: u32) -> Self {
        Self {
            idle_column: column,
            min_column: column,
            max_column: column,
            after_once_column: None,
            cadence: SpriteSheet::default().cadence,
            rows: FacingRows { down: row, right: row, up: row, left: row },
        }
    }

    /// Read the sheet layout from an object's properties
    /// (`tileXIdle`, `tileXMin`, `tileXMax`, `tileXTime`, `tileXAnimStage2Frame`,
    /// `tileYDown`, `tileYRight`, `tileYUp`, `tileYLeft`), falling back to
    /// `base` for anything absent.
    pub fn from_properties(props: &Properties, base: &SpriteSheet) -> Self {
        let get = |name: &str, fallback: u32| {
            props
                .int(name)
                .and_then(|v| u32::try_from(v).ok())
                .unwrap_or(fallback)
        };
        Self {
            idle_column: get("tileXIdle", base.idle_column),
            min_column: get("tileXMin", base.min_column),
            max_column: get("tileXMax", base.max_column),
            after_once_column: props
                .int("tileXAnimStage2Frame")
                .and_then(|v| u32::try_from(v).ok())
                .or(base.after_once_column),
            cadence: get("tileXTime", base.cadence),
            rows: FacingRows {
                down: get("tileYDown", base.rows.down),
                right: get("tileYRight", base.rows.right),
                up: get("tileYUp", base.rows.up),
                left: get("tileYLeft", base.rows.left),
            },
        }
    }
}

/// Current sheet cell of an animated sprite.
#[derive(Clone, Debug, PartialEq)]
pub struct SpriteAnimator {
    pub sheet: SpriteSheet,
    column: u32,
    row: u32,
    last_advance: u64,
    playing_once: bool,
}

impl SpriteAnimator {
    pub fn new(sheet: SpriteSheet, column: u32, row: u32) -> Self {
        Self {
            sheet,
            column,
            row,
            last_advance: 0,
            playing_once: false,
        }
    }

    /// Sheet (column, row) to draw.
    pub fn cell(&self) -> (u32, u32) {
        (self.column, self.row)
    }

    pub fn face(&mut self, facing: Facing) {
        self.row = self.sheet.rows.row(facing);
    }

    /// Walking: face `facing` and advance the column once per `cadence` frames.
    pub fn walk(&mut self, frame: u64, facing: Facing) {
        self.face(facing);
        if frame.wrapping_sub(self.last_advance) >= u64::from(self.sheet.cadence) {
            self.next_column();
            self.last_advance = frame;
        }
    }

    /// Walking on a timer: face `facing` and advance one column now.
    pub fn step(&mut self, facing: Facing) {
        self.face(facing);
        self.next_column();
    }

    /// Standing still.
    pub fn rest(&mut self) {
        self.column = self.sheet.idle_column;
    }

    fn next_column(&mut self) {
        self.column = if self.column >= self.sheet.max_column || self.column < self.sheet.min_column {
            self.sheet.min_column
        } else {
            self.column + 1
        };
    }

    /// Run the min..=max columns once, starting now.
    pub fn play_once(&mut self, frame: u64) {
        self.playing_once = true;
        self.column = self.sheet.min_column;
        self.last_advance = frame;
    }

    pub fn is_playing_once(&self) -> bool {
        self.playing_once
    }

    /// Advance a one-shot animation. Returns `true` on the frame it ends;
    /// the column then rests on `after_once_column`.
    pub fn advance_once(&mut self, frame: u64) -> bool {
        if !self.playing_once
            || frame.wrapping_sub(self.last_advance) < u64::from(self.sheet.cadence)
        {
            return false;
        }
        self.last_advance = frame;
        if self.column >= self.sheet.max_column {
            self.playing_once = false;
            self.column = self.sheet.after_once_column.unwrap_or(self.sheet.min_column);
            return true;
        }
        self.column += 1;
        false
    }
}

impl Default for SpriteAnimator {
    fn default() -> Self {
        Self::new(SpriteSheet::default(), 0, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tilemap::PropertyValue;

    #[test]
    fn facing_prefers_dominant_axis_and_vertical_on_tie() {
        assert_eq!(Facing::from_delta(Vec2::new(2.0, 1.0)), Some(Facing::Right));
        assert_eq!(Facing::from_delta(Vec2::new(-2.0, 1.0)), Some(Facing::Left));
        assert_eq!(Facing::from_delta(Vec2::new(1.0, 1.0)), Some(Facing::Down));
        assert_eq!(Facing::from_delta(Vec2::new(1.0, -1.0)), Some(Facing::Up));
        assert_eq!(Facing::from_delta(Vec2::ZERO), None);
    }

    #[test]
    fn walk_cycles_on_cadence() {
        let sheet = SpriteSheet { min_column: 1, max_column: 2, cadence: 2, ..SpriteSheet::default() };
        let mut anim = SpriteAnimator::new(sheet, 0, 0);
        anim.walk(2, Facing::Left);
        assert_eq!(anim.cell(), (1, 3));
        anim.walk(3, Facing::Left);
        assert_eq!(anim.cell(), (1, 3));
        anim.walk(4, Facing::Left);
        assert_eq!(anim.cell(), (2, 3));
        anim.walk(6, Facing::Up);
        assert_eq!(anim.cell(), (1, 2));
        anim.rest();
        assert_eq!(anim.cell(), (0, 2));
    }

    #[test]
    fn one_shot_reports_end_once() {
        let sheet = SpriteSheet { max_column: 2, cadence: 1, after_once_column: Some(2), ..SpriteSheet::default() };
        let mut anim = SpriteAnimator::new(sheet, 0, 0);
        anim.play_once(10);
        assert!(!anim.advance_once(11));
        assert!(!anim.advance_once(12));
        assert!(anim.advance_once(13));
        assert_eq!(anim.cell().0, 2);
        assert!(!anim.advance_once(14));
    }

    #[test]
    fn sheet_reads_object_properties() {
        let mut props = Properties::new();
        props.insert("tileXMax", PropertyValue::Int(5));
        props.insert("tileYLeft", PropertyValue::Int(7));
        let sheet = SpriteSheet::from_properties(&props, &SpriteSheet::default());
        assert_eq!(sheet.max_column, 5);
        assert_eq!(sheet.rows.left, 7);
        assert_eq!(sheet.rows.down, 0);
    }

    #[test]
    fn still_sheet_keeps_its_cell_while_walking() {
        let mut anim = SpriteAnimator::new(SpriteSheet::still(1, 0), 1, 0);
        for (frame, facing) in [(8, Facing::Left), (16, Facing::Up), (24, Facing::Right)] {
            anim.walk(frame, facing);
            assert_eq!(anim.cell(), (1, 0));
        }
        anim.rest();
        assert_eq!(anim.cell(), (1, 0));
    }
}
