//! Tile-map views: TMX loading and rasterization, a pan/zoom/pinch camera,
//! grid pathfinding and path-following motion for map actors.

pub mod camera;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod input;
pub mod motion;
pub mod pathfinding;
pub mod session;
pub mod tilemap;
pub mod trigger;

pub use camera::{CameraConfig, CameraController, CameraState, Mode, Projection, Tap, ViewUniform};
pub use error::MapError;
pub use grid::{BlockingGrid, Grid};
pub use input::{Touch, ViewEvent, WinitTranslator};
pub use motion::{Facing, MotionConfig, MotionEvent, Pursuit, StepInterpolator};
pub use pathfinding::{Movement, Pathfinder};
pub use session::{FrameReport, Session, SessionConfig};
pub use tilemap::{Layer, MapObject, TileMap, TileSet};
pub use trigger::{Trigger, TriggerHandler, TriggerMap};
