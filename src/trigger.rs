//! Trigger lookup: which scripted hooks fire when an actor arrives somewhere.
//!
//! Objects and layers carrying a `trigger` property are collected once from
//! the map. What a trigger *does* is up to the [`TriggerHandler`].

use glam::{IVec2, Vec2};

use crate::geometry::Rect;
use crate::grid::Grid;
use crate::pathfinding::containing_cell;
use crate::tilemap::{Properties, TileMap};

#[derive(Clone, Debug, PartialEq)]
pub enum TriggerSource {
    /// A map object; `area` is its footprint in tile units.
    Object { name: String, area: Rect },
    /// Every non-empty cell of a tile layer.
    Layer { name: String },
}

/// A fired (or fireable) trigger: its symbolic name plus the owning
/// object's or layer's properties.
#[derive(Clone, Debug, PartialEq)]
pub struct Trigger {
    pub name: String,
    pub source: TriggerSource,
    pub properties: Properties,
}

impl Trigger {
    /// The properties as a JSON object, for handlers that forward them.
    pub fn properties_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.properties).unwrap_or(serde_json::Value::Null)
    }
}

/// Receives triggers when an actor arrives on them.
pub trait TriggerHandler {
    fn on_trigger(&mut self, trigger: &Trigger);
}

impl<F: FnMut(&Trigger)> TriggerHandler for F {
    fn on_trigger(&mut self, trigger: &Trigger) {
        self(trigger)
    }
}

/// Handler that ignores every trigger.
pub struct NoTriggers;

impl TriggerHandler for NoTriggers {
    fn on_trigger(&mut self, _trigger: &Trigger) {}
}

#[derive(Clone, Debug, Default)]
pub struct TriggerMap {
    objects: Vec<Trigger>,
    layers: Vec<(usize, Trigger)>,
    /// Per cell, the indices of trigger layers with a tile there.
    cells: Option<Grid<Vec<usize>>>,
}

impl TriggerMap {
    /// Collect every trigger object and trigger layer of `map`.
    pub fn from_map(map: &TileMap) -> Self {
        let objects = map
            .objects()
            .filter_map(|o| {
                Some(Trigger {
                    name: o.trigger()?.to_string(),
                    source: TriggerSource::Object {
                        name: o.name.clone(),
                        area: o.area(),
                    },
                    properties: o.properties.clone(),
                })
            })
            .collect();

        let layers: Vec<(usize, Trigger)> = map
            .layers()
            .iter()
            .enumerate()
            .filter_map(|(i, l)| {
                let trigger = Trigger {
                    name: l.trigger()?.to_string(),
                    source: TriggerSource::Layer { name: l.name.clone() },
                    properties: l.properties.clone(),
                };
                Some((i, trigger))
            })
            .collect();

        let mut cells: Option<Grid<Vec<usize>>> = None;
        for &(i, _) in &layers {
            let layer = &map.layers()[i];
            let grid = cells.get_or_insert_with(|| Grid::filled(map.width, map.height, Vec::new()));
            for y in 0..map.height {
                for x in 0..map.width {
                    if layer.gid(x, y) == 0 {
                        continue;
                    }
                    if let Some(hits) = grid.get_mut(IVec2::new(x as i32, y as i32)) {
                        hits.push(i);
                    }
                }
            }
        }

        Self { objects, layers, cells }
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty() && self.layers.is_empty()
    }

    /// Every trigger whose area holds `pos`: objects first (document order),
    /// then layers (layer order).
    pub fn triggers_at(&self, pos: Vec2) -> Vec<&Trigger> {
        let mut hits: Vec<&Trigger> = self
            .objects
            .iter()
            .filter(|t| matches!(&t.source, TriggerSource::Object { area, .. } if area.contains(pos)))
            .collect();

        if let Some(layer_ids) = self.cells.as_ref().and_then(|g| g.get(containing_cell(pos))) {
            for id in layer_ids {
                if let Some((_, t)) = self.layers.iter().find(|(i, _)| i == id) {
                    hits.push(t);
                }
            }
        }
        hits
    }

    /// Fire every trigger at `pos` through `handler`; returns how many fired.
    pub fn fire_at<H: TriggerHandler + ?Sized>(&self, pos: Vec2, handler: &mut H) -> usize {
        let hits = self.triggers_at(pos);
        for trigger in &hits {
            tracing::debug!(trigger = %trigger.name, ?pos, "trigger fired");
            handler.on_trigger(trigger);
        }
        hits.len()
    }
}
