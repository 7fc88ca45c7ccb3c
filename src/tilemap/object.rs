use glam::Vec2;

use crate::geometry::Rect;

use super::Properties;

/// Stable address of an object: group index plus index within the group.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ObjectHandle {
    pub group: usize,
    pub index: usize,
}

/// Sheet cell of a tile-bearing object, resolved once at load time.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TileObject {
    pub gid: u32,
    /// Index into the map's tileset list.
    pub tileset: usize,
    pub column: u32,
    pub row: u32,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ObjectKind {
    /// Draws a tile; anchored at its bottom-left corner.
    Tile(TileObject),
    /// Plain area; anchored at its top-left corner.
    Rect,
}

/// A map object. All geometry is in tile units.
#[derive(Clone, Debug, PartialEq)]
pub struct MapObject {
    pub id: u32,
    pub name: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Sprite offset, from the `offsetX` property.
    pub offset_x: f32,
    /// Sprite offset, from the `offsetY` property.
    pub offset_y: f32,
    pub properties: Properties,
    pub kind: ObjectKind,
}

impl MapObject {
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn set_position(&mut self, p: Vec2) {
        self.x = p.x;
        self.y = p.y;
    }

    pub fn tile(&self) -> Option<&TileObject> {
        match &self.kind {
            ObjectKind::Tile(t) => Some(t),
            ObjectKind::Rect => None,
        }
    }

    pub fn tile_mut(&mut self) -> Option<&mut TileObject> {
        match &mut self.kind {
            ObjectKind::Tile(t) => Some(t),
            ObjectKind::Rect => None,
        }
    }

    /// Painter's-order key for z-sorted groups.
    #[inline]
    pub fn depth(&self) -> f32 {
        self.y - self.offset_y
    }

    /// Footprint used for trigger hits. Tile objects extend upward from
    /// their anchor, rectangles downward.
    pub fn area(&self) -> Rect {
        match self.kind {
            ObjectKind::Tile(_) => Rect::new(self.x, self.y - self.height, self.width, self.height),
            ObjectKind::Rect => Rect::new(self.x, self.y, self.width, self.height),
        }
    }

    /// Where the sprite is drawn, offsets applied.
    pub fn sprite_rect(&self) -> Rect {
        Rect::new(
            self.x - self.offset_x,
            self.y - self.offset_y - self.height,
            self.width,
            self.height,
        )
    }

    pub fn trigger(&self) -> Option<&str> {
        self.properties.string("trigger").filter(|s| !s.is_empty())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ObjectGroup {
    pub name: String,
    pub properties: Properties,
    pub objects: Vec<MapObject>,
}

impl ObjectGroup {
    /// Groups flagged `zIndexing` draw in ascending depth order.
    pub fn is_z_sorted(&self) -> bool {
        self.properties.flag("zIndexing")
    }

    /// Objects in draw order. The sort is stable, so equal depths keep
    /// document order.
    pub fn draw_order(&self) -> Vec<&MapObject> {
        let mut order: Vec<&MapObject> = self.objects.iter().collect();
        if self.is_z_sorted() {
            order.sort_by(|a, b| a.depth().total_cmp(&b.depth()));
        }
        order
    }
}
