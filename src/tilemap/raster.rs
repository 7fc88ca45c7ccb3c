// ── Rasterization ───────────────────────────────────────────────────────────
//
// Composites tile layers and tile objects into RGBA surfaces that the render
// side uploads as textures. Surfaces are `width * tile_width` by
// `height * tile_height` pixels. Callers that update every frame pass the
// same surface back in to avoid reallocating it.

use image::{Pixel, Rgba, RgbaImage};

use super::{Layer, MapObject, ObjectKind, TileMap, TileSet};

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

impl TileMap {
    /// Pixel size of a full-map surface.
    pub fn surface_size(&self) -> (u32, u32) {
        (self.width * self.tile_width, self.height * self.tile_height)
    }

    /// A fully transparent full-map surface.
    pub fn new_surface(&self) -> RgbaImage {
        let (w, h) = self.surface_size();
        RgbaImage::new(w, h)
    }

    /// Composite every layer accepted by `filter(layer, index)` into a new
    /// surface, later layers over earlier ones. Empty cells stay transparent.
    pub fn rasterize<F>(&self, filter: F) -> RgbaImage
    where
        F: FnMut(&Layer, usize) -> bool,
    {
        let mut surface = self.new_surface();
        self.rasterize_into(filter, &mut surface);
        surface
    }

    /// Same as [`rasterize`](Self::rasterize) but clears and reuses `surface`.
    pub fn rasterize_into<F>(&self, mut filter: F, surface: &mut RgbaImage)
    where
        F: FnMut(&Layer, usize) -> bool,
    {
        clear(surface);
        for (i, layer) in self.layers.iter().enumerate() {
            if filter(layer, i) {
                self.draw_layer(layer, surface, false);
            }
        }
    }

    /// Visible layers drawn beneath the walking actors.
    pub fn rasterize_below_actors(&self) -> RgbaImage {
        self.rasterize(|layer, _| !layer.is_above_actors() && !layer.is_hidden())
    }

    /// Visible layers drawn over the walking actors.
    pub fn rasterize_above_actors(&self) -> RgbaImage {
        self.rasterize(|layer, _| layer.is_above_actors() && !layer.is_hidden())
    }

    /// Composite tile-bearing objects accepted by `filter` into a new surface.
    /// Groups flagged `zIndexing` are drawn in ascending depth order.
    pub fn rasterize_objects<F>(&self, filter: F) -> RgbaImage
    where
        F: FnMut(&MapObject) -> bool,
    {
        let mut surface = self.new_surface();
        self.rasterize_objects_into(filter, &mut surface);
        surface
    }

    /// Same as [`rasterize_objects`](Self::rasterize_objects) but clears and
    /// reuses `surface`.
    pub fn rasterize_objects_into<F>(&self, mut filter: F, surface: &mut RgbaImage)
    where
        F: FnMut(&MapObject) -> bool,
    {
        clear(surface);
        for group in &self.object_groups {
            for object in group.draw_order() {
                if matches!(object.kind, ObjectKind::Tile(_)) && filter(object) {
                    self.draw_object(object, surface);
                }
            }
        }
    }

    /// Draw the animation layers that show on `tick` over whatever the
    /// surface already holds. Cells they cover are replaced, the rest keep
    /// the previous frame.
    pub fn rasterize_animation(&self, tick: u64, surface: &mut RgbaImage) {
        for layer in self.layers.iter().filter(|l| l.shows_on_tick(tick)) {
            self.draw_layer(layer, surface, true);
        }
    }

    /// One pixel per cell encoding the first non-empty accepted layer's tile
    /// as `(column, row, tileset index, 255)`; empty cells are all zero.
    /// Values above 255 saturate.
    pub fn index_surface<F>(&self, mut filter: F) -> RgbaImage
    where
        F: FnMut(&Layer, usize) -> bool,
    {
        let mut surface = RgbaImage::new(self.width, self.height);
        for (i, layer) in self.layers.iter().enumerate() {
            if !filter(layer, i) {
                continue;
            }
            for y in 0..self.height {
                for x in 0..self.width {
                    let gid = layer.gid(x, y);
                    let Some(ts_index) = self.tileset_index_for(gid) else {
                        continue;
                    };
                    let px = surface.get_pixel_mut(x, y);
                    if px[3] != 0 {
                        continue;
                    }
                    let (column, row) = self.tilesets[ts_index].cell_of(gid);
                    *px = Rgba([saturate(column), saturate(row), saturate(ts_index as u32), 255]);
                }
            }
        }
        surface
    }

    fn draw_layer(&self, layer: &Layer, surface: &mut RgbaImage, replace: bool) {
        let (tw, th) = (self.tile_width, self.tile_height);
        for y in 0..self.height {
            for x in 0..self.width {
                let gid = layer.gid(x, y);
                let Some(ts_index) = self.tileset_index_for(gid) else {
                    continue;
                };
                let tileset = &self.tilesets[ts_index];
                let Some(sheet) = &tileset.image else {
                    continue;
                };
                let (column, row) = tileset.cell_of(gid);
                let dst = Blit {
                    x: i64::from(x * tw),
                    y: i64::from(y * th),
                    w: tw,
                    h: th,
                };
                if replace {
                    fill(surface, dst, TRANSPARENT);
                }
                blit(surface, sheet, source_rect(tileset, column, row), dst);
            }
        }
    }

    fn draw_object(&self, object: &MapObject, surface: &mut RgbaImage) {
        let ObjectKind::Tile(tile) = object.kind else {
            return;
        };
        let Some(tileset) = self.tilesets.get(tile.tileset) else {
            return;
        };
        let Some(sheet) = &tileset.image else {
            return;
        };
        let rect = object.sprite_rect();
        let tw = self.tile_width as f32;
        let th = self.tile_height as f32;
        let dst = Blit {
            x: (rect.min.x * tw).round() as i64,
            y: (rect.min.y * th).round() as i64,
            w: (object.width * tw).round().max(0.0) as u32,
            h: (object.height * th).round().max(0.0) as u32,
        };
        blit(surface, sheet, source_rect(tileset, tile.column, tile.row), dst);
    }
}

// ── Pixel helpers ────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug)]
struct Blit {
    x: i64,
    y: i64,
    w: u32,
    h: u32,
}

fn source_rect(tileset: &TileSet, column: u32, row: u32) -> Blit {
    Blit {
        x: i64::from(column * tileset.tile_width),
        y: i64::from(row * tileset.tile_height),
        w: tileset.tile_width,
        h: tileset.tile_height,
    }
}

fn saturate(v: u32) -> u8 {
    u8::try_from(v).unwrap_or(u8::MAX)
}

fn clear(surface: &mut RgbaImage) {
    for px in surface.pixels_mut() {
        *px = TRANSPARENT;
    }
}

fn fill(surface: &mut RgbaImage, dst: Blit, color: Rgba<u8>) {
    for dy in 0..dst.h {
        for dx in 0..dst.w {
            if let Some((x, y)) = clip(surface, dst.x + i64::from(dx), dst.y + i64::from(dy)) {
                surface.put_pixel(x, y, color);
            }
        }
    }
}

/// Alpha-blend `src` from `sheet` onto `dst` in `surface`, scaling with
/// nearest-neighbour sampling when the sizes differ. Source rectangles that
/// fall outside the sheet are skipped whole.
fn blit(surface: &mut RgbaImage, sheet: &RgbaImage, src: Blit, dst: Blit) {
    if src.w == 0 || src.h == 0 || dst.w == 0 || dst.h == 0 {
        return;
    }
    if src.x + i64::from(src.w) > i64::from(sheet.width())
        || src.y + i64::from(src.h) > i64::from(sheet.height())
    {
        return;
    }
    for dy in 0..dst.h {
        let sy = (src.y + i64::from(dy * src.h / dst.h)) as u32;
        for dx in 0..dst.w {
            let Some((x, y)) = clip(surface, dst.x + i64::from(dx), dst.y + i64::from(dy)) else {
                continue;
            };
            let sx = (src.x + i64::from(dx * src.w / dst.w)) as u32;
            let px = *sheet.get_pixel(sx, sy);
            if px[3] == 0 {
                continue;
            }
            surface.get_pixel_mut(x, y).blend(&px);
        }
    }
}

fn clip(surface: &RgbaImage, x: i64, y: i64) -> Option<(u32, u32)> {
    (x >= 0 && y >= 0 && x < i64::from(surface.width()) && y < i64::from(surface.height()))
        .then_some((x as u32, y as u32))
}
