//! In-memory tile map: tilesets, tile layers and object groups parsed from a
//! TMX document, plus the queries the pathfinder, trigger map and renderer
//! need (`resolve_tile`, `build_grid`, `find_object`, rasterization).

mod object;
mod properties;
mod raster;
mod tmx;

use std::path::{Path, PathBuf};

use glam::IVec2;
use image::RgbaImage;

use crate::error::MapError;
use crate::grid::{BlockingGrid, Grid};

pub use object::{MapObject, ObjectGroup, ObjectHandle, ObjectKind, TileObject};
pub use properties::{Properties, PropertyValue};

// ── TileSet ─────────────────────────────────────────────────────────────────

/// One tile sheet and the half-open gid range `[first_gid, last_gid)` it owns.
#[derive(Clone, Debug)]
pub struct TileSet {
    pub name: String,
    pub first_gid: u32,
    pub tile_count: u32,
    pub columns: u32,
    pub tile_width: u32,
    pub tile_height: u32,
    /// Image path as written in the map, relative to the map's directory.
    pub image_source: String,
    /// Decoded sheet; `None` until images are attached.
    pub image: Option<RgbaImage>,
}

impl TileSet {
    /// Exclusive upper bound of this tileset's gid range.
    #[inline]
    pub fn last_gid(&self) -> u32 {
        self.first_gid.saturating_add(self.tile_count)
    }

    #[inline]
    pub fn contains(&self, gid: u32) -> bool {
        gid >= self.first_gid && gid < self.last_gid()
    }

    /// Zero-based (column, row) of `gid` inside the sheet.
    /// The caller guarantees `self.contains(gid)`.
    #[inline]
    pub fn cell_of(&self, gid: u32) -> (u32, u32) {
        let index = gid - self.first_gid;
        let columns = self.columns.max(1);
        (index % columns, index / columns)
    }

    /// Number of tile rows in the sheet.
    pub fn rows(&self) -> u32 {
        self.tile_count.div_ceil(self.columns.max(1))
    }
}

/// A resolved gid: owning tileset plus the tile's position in its sheet.
#[derive(Copy, Clone, Debug)]
pub struct TileRef<'a> {
    pub tileset: &'a TileSet,
    /// Index of `tileset` within the map's tileset list.
    pub tileset_index: usize,
    pub column: u32,
    pub row: u32,
}

// ── Layer ───────────────────────────────────────────────────────────────────

/// A full-size tile layer. `data` is row-major: `index = y * width + x`.
#[derive(Clone, Debug)]
pub struct Layer {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub data: Vec<u32>,
    pub properties: Properties,
}

impl Layer {
    /// Gid at `(x, y)`, or 0 when out of bounds.
    #[inline]
    pub fn gid(&self, x: u32, y: u32) -> u32 {
        if x >= self.width || y >= self.height {
            return 0;
        }
        self.data[(y * self.width + x) as usize]
    }

    pub fn is_blocking(&self) -> bool {
        self.properties.flag("blocking")
    }

    pub fn is_hidden(&self) -> bool {
        self.properties.flag("hidden")
    }

    /// Drawn over the walking actors instead of under them.
    pub fn is_above_actors(&self) -> bool {
        self.properties.flag("aboveChar")
    }

    pub fn trigger(&self) -> Option<&str> {
        self.properties.string("trigger").filter(|s| !s.is_empty())
    }

    /// `(frame, frame_max)` for animated-tile layers. Both must be ≥ 1.
    pub fn animation_frame(&self) -> Option<(u32, u32)> {
        let frame = self.properties.int("frame")?;
        let frame_max = self.properties.int("frame_max")?;
        if frame < 1 || frame_max < 1 {
            return None;
        }
        Some((frame as u32, frame_max as u32))
    }

    /// Whether this animation layer is the visible frame on `tick`.
    pub fn shows_on_tick(&self, tick: u64) -> bool {
        self.animation_frame()
            .is_some_and(|(frame, max)| u64::from(frame - 1) == tick % u64::from(max))
    }
}

// ── TileMap ─────────────────────────────────────────────────────────────────

/// A parsed, fixed-size, orthogonal, right-down tile map.
#[derive(Clone, Debug)]
pub struct TileMap {
    /// Width in cells.
    pub width: u32,
    /// Height in cells.
    pub height: u32,
    /// Tile width in pixels.
    pub tile_width: u32,
    /// Tile height in pixels.
    pub tile_height: u32,
    pub properties: Properties,
    pub(crate) tilesets: Vec<TileSet>,
    pub(crate) layers: Vec<Layer>,
    pub(crate) object_groups: Vec<ObjectGroup>,
    pub(crate) base_dir: PathBuf,
}

impl TileMap {
    /// Parse the map structure only. Tileset images stay unattached, so
    /// rasterization skips their tiles.
    pub fn parse(xml: &str) -> Result<Self, MapError> {
        tmx::parse_map(xml)
    }

    /// Parse the map and obtain every tileset image through `resolver`,
    /// which receives the image path as written in the document.
    ///
    /// The first image failure aborts the whole load.
    pub fn parse_with<F>(xml: &str, mut resolver: F) -> Result<Self, MapError>
    where
        F: FnMut(&str) -> Result<RgbaImage, image::ImageError>,
    {
        let mut map = Self::parse(xml)?;
        map.attach_images(|source| {
            resolver(source).map_err(|e| MapError::ImageLoadError {
                path: PathBuf::from(source),
                source: e,
            })
        })?;
        map.log_loaded();
        Ok(map)
    }

    /// Read a `.tmx` file and decode its tileset images from the same
    /// directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, MapError> {
        let path = path.as_ref();
        let xml = std::fs::read_to_string(path)?;
        let mut map = Self::parse(&xml)?;
        map.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();

        let base_dir = map.base_dir.clone();
        map.attach_images(|source| {
            let full = base_dir.join(source);
            image::open(&full)
                .map(|img| img.to_rgba8())
                .map_err(|e| MapError::ImageLoadError { path: full, source: e })
        })?;
        map.log_loaded();
        Ok(map)
    }

    fn attach_images<F>(&mut self, mut fetch: F) -> Result<(), MapError>
    where
        F: FnMut(&str) -> Result<RgbaImage, MapError>,
    {
        for tileset in &mut self.tilesets {
            tileset.image = Some(fetch(&tileset.image_source)?);
        }
        Ok(())
    }

    fn log_loaded(&self) {
        tracing::info!(
            width = self.width,
            height = self.height,
            tilesets = self.tilesets.len(),
            layers = self.layers.len(),
            objects = self.objects().count(),
            "tile map loaded"
        );
    }

    /// True once every tileset has its image.
    pub fn is_loaded(&self) -> bool {
        self.tilesets.iter().all(|t| t.image.is_some())
    }

    /// Resolve a path written in the map (a sibling map, an image) against
    /// the directory the map was loaded from.
    pub fn resolve_path(&self, relative: &str) -> PathBuf {
        self.base_dir.join(relative)
    }

    pub fn tilesets(&self) -> &[TileSet] {
        &self.tilesets
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn object_groups(&self) -> &[ObjectGroup] {
        &self.object_groups
    }

    /// First layer with the given name, with its index.
    pub fn layer(&self, name: &str) -> Option<(usize, &Layer)> {
        self.layers.iter().enumerate().find(|(_, l)| l.name == name)
    }

    // ── Tile resolution ──────────────────────────────────────────────────────

    /// Index of the tileset owning `gid`. Linear scan in insertion order.
    pub fn tileset_index_for(&self, gid: u32) -> Option<usize> {
        tileset_index_for(&self.tilesets, gid)
    }

    /// Resolve a gid to its tileset and sheet cell.
    ///
    /// Returns `Ok(None)` for gid 0 (empty) and `UnresolvedGid` when no
    /// tileset owns a non-zero gid.
    pub fn resolve_tile(&self, gid: u32) -> Result<Option<TileRef<'_>>, MapError> {
        if gid == 0 {
            return Ok(None);
        }
        let index = self.tileset_index_for(gid).ok_or(MapError::UnresolvedGid(gid))?;
        let tileset = &self.tilesets[index];
        let (column, row) = tileset.cell_of(gid);
        Ok(Some(TileRef { tileset, tileset_index: index, column, row }))
    }

    /// Overwrite one cell of a layer. The gid must be 0 or resolvable.
    pub fn set_tile(&mut self, layer: usize, cell: IVec2, gid: u32) -> Result<(), MapError> {
        if gid != 0 && self.tileset_index_for(gid).is_none() {
            return Err(MapError::UnresolvedGid(gid));
        }
        let (width, height) = (self.width, self.height);
        if let Some(layer) = self.layers.get_mut(layer) {
            if cell.x >= 0 && cell.y >= 0 && (cell.x as u32) < width && (cell.y as u32) < height {
                layer.data[(cell.y as u32 * width + cell.x as u32) as usize] = gid;
            }
        }
        Ok(())
    }

    // ── Objects ──────────────────────────────────────────────────────────────

    /// Every object across all groups, in document order.
    pub fn objects(&self) -> impl Iterator<Item = &MapObject> {
        self.object_groups.iter().flat_map(|g| g.objects.iter())
    }

    /// First object (across all groups) with the given name.
    pub fn find_object(&self, name: &str) -> Option<&MapObject> {
        self.objects().find(|o| o.name == name)
    }

    /// Stable handle to the first object with the given name.
    pub fn find_object_handle(&self, name: &str) -> Option<ObjectHandle> {
        self.object_groups.iter().enumerate().find_map(|(group, g)| {
            g.objects
                .iter()
                .position(|o| o.name == name)
                .map(|index| ObjectHandle { group, index })
        })
    }

    pub fn object(&self, handle: ObjectHandle) -> Option<&MapObject> {
        self.object_groups.get(handle.group)?.objects.get(handle.index)
    }

    pub fn object_mut(&mut self, handle: ObjectHandle) -> Option<&mut MapObject> {
        self.object_groups.get_mut(handle.group)?.objects.get_mut(handle.index)
    }

    // ── Grids ────────────────────────────────────────────────────────────────

    /// Fold every layer accepted by `filter` into a width × height grid.
    ///
    /// For each non-empty cell of an accepted layer the cell becomes
    /// `value(layer, x, y, gid, &previous)`; untouched cells keep `default`.
    /// Returns `None` when no layer was accepted, which distinguishes
    /// "no such layer" from "a layer with nothing on it".
    pub fn build_grid<T, F, V>(&self, mut filter: F, mut value: V, default: T) -> Option<Grid<T>>
    where
        T: Clone,
        F: FnMut(&Layer, usize) -> bool,
        V: FnMut(&Layer, u32, u32, u32, &T) -> T,
    {
        let mut grid: Option<Grid<T>> = None;
        for (i, layer) in self.layers.iter().enumerate() {
            if !filter(layer, i) {
                continue;
            }
            let out = grid.get_or_insert_with(|| Grid::filled(self.width, self.height, default.clone()));
            for y in 0..self.height {
                for x in 0..self.width {
                    let gid = layer.gid(x, y);
                    if gid == 0 {
                        continue;
                    }
                    if let Some(cell) = out.get_mut(IVec2::new(x as i32, y as i32)) {
                        let next = value(layer, x, y, gid, cell);
                        *cell = next;
                    }
                }
            }
        }
        grid
    }

    /// Collision grid from every `blocking` layer; `None` if the map has none.
    pub fn blocking_grid(&self) -> Option<BlockingGrid> {
        self.build_grid(|layer, _| layer.is_blocking(), |_, _, _, _, _| true, false)
    }
}

/// Linear scan for the tileset whose half-open range holds `gid`.
pub(crate) fn tileset_index_for(tilesets: &[TileSet], gid: u32) -> Option<usize> {
    if gid == 0 {
        return None;
    }
    tilesets.iter().position(|t| t.contains(gid))
}
