use glam::{IVec2, Vec2};
use image::{Rgba, RgbaImage};
use tileview::error::MapError;
use tileview::tilemap::{ObjectKind, TileMap};

// ── Fixtures ──────────────────────────────────────────────────────────────────

const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
const GREEN: Rgba<u8> = Rgba([0, 255, 0, 255]);
const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);
const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
const CLEAR: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// 2×2 sheet of 2-px tiles: gid 1 red, 2 green, 3 blue, 4 white.
fn sheet() -> RgbaImage {
    let colors = [RED, GREEN, BLUE, WHITE];
    RgbaImage::from_fn(4, 4, |x, y| colors[((y / 2) * 2 + x / 2) as usize])
}

fn tmx(width: u32, height: u32, body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<map version="1.10" orientation="orthogonal" renderorder="right-down" width="{width}" height="{height}" tilewidth="2" tileheight="2" infinite="0">
 <tileset firstgid="1" name="terrain" tilewidth="2" tileheight="2" tilecount="4" columns="2">
  <image source="terrain.png" width="4" height="4"/>
 </tileset>
{body}
</map>"#
    )
}

fn layer(name: &str, width: u32, height: u32, props: &str, data: &[u32]) -> String {
    let csv: Vec<String> = data.iter().map(u32::to_string).collect();
    format!(
        r#" <layer id="1" name="{name}" width="{width}" height="{height}">
  <properties>{props}</properties>
  <data encoding="csv">
{}
</data>
 </layer>"#,
        csv.join(",")
    )
}

fn flag(name: &str) -> String {
    format!(r#"<property name="{name}" type="bool" value="true"/>"#)
}

fn load(xml: &str) -> TileMap {
    TileMap::parse_with(xml, |_| Ok(sheet())).unwrap()
}

// ── Loading ───────────────────────────────────────────────────────────────────

#[test]
fn parses_structure_and_attaches_images() {
    let xml = tmx(2, 2, &layer("ground", 2, 2, "", &[1, 2, 3, 4]));
    let map = load(&xml);
    assert_eq!((map.width, map.height), (2, 2));
    assert_eq!((map.tile_width, map.tile_height), (2, 2));
    assert_eq!(map.layers().len(), 1);
    assert_eq!(map.layers()[0].gid(1, 1), 4);
    assert_eq!(map.tilesets()[0].last_gid(), 5);
    assert!(map.is_loaded());
}

#[test]
fn parse_without_resolver_leaves_images_unattached() {
    let xml = tmx(1, 1, &layer("ground", 1, 1, "", &[1]));
    let map = TileMap::parse(&xml).unwrap();
    assert!(!map.is_loaded());
    assert!(map.rasterize(|_, _| true).pixels().all(|p| *p == CLEAR));
}

#[test]
fn rejects_non_orthogonal_maps() {
    let xml = tmx(1, 1, "").replace("orthogonal", "isometric");
    assert!(matches!(TileMap::parse(&xml), Err(MapError::UnsupportedOrientation(o)) if o == "isometric"));
}

#[test]
fn rejects_other_render_orders_and_infinite_maps() {
    let xml = tmx(1, 1, "").replace("right-down", "left-up");
    assert!(matches!(TileMap::parse(&xml), Err(MapError::UnsupportedRenderOrder(_))));
    let xml = tmx(1, 1, "").replace(r#"infinite="0""#, r#"infinite="1""#);
    assert!(matches!(TileMap::parse(&xml), Err(MapError::InfiniteMapUnsupported)));
}

#[test]
fn rejects_tileset_with_other_tile_size() {
    let xml = tmx(1, 1, "").replace(
        r#"name="terrain" tilewidth="2""#,
        r#"name="terrain" tilewidth="4""#,
    );
    match TileMap::parse(&xml) {
        Err(MapError::TileSizeMismatch { tileset, expected, found }) => {
            assert_eq!(tileset, "terrain");
            assert_eq!(expected, (2, 2));
            assert_eq!(found, (4, 2));
        }
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn rejects_layer_with_other_dimensions() {
    let xml = tmx(2, 2, &layer("small", 1, 1, "", &[1]));
    assert!(matches!(TileMap::parse(&xml), Err(MapError::LayerSizeMismatch { layer, .. }) if layer == "small"));
}

#[test]
fn rejects_short_layer_data() {
    let xml = tmx(2, 2, &layer("ground", 2, 2, "", &[1, 1, 1]));
    assert!(matches!(
        TileMap::parse(&xml),
        Err(MapError::LayerDataLength { expected: 4, found: 3, .. })
    ));
}

#[test]
fn rejects_gid_outside_every_tileset() {
    let xml = tmx(1, 1, &layer("ground", 1, 1, "", &[9]));
    assert!(matches!(TileMap::parse(&xml), Err(MapError::UnresolvedGid(9))));
}

#[test]
fn rejects_gid_range_past_u32_max() {
    let xml = tmx(1, 1, &layer("ground", 1, 1, "", &[4294967295])).replace(
        r#"firstgid="1" name="terrain""#,
        r#"firstgid="4294967295" name="terrain""#,
    );
    assert!(matches!(
        TileMap::parse(&xml),
        Err(MapError::InvalidAttribute { attribute: "tilecount", .. })
    ));
}

#[test]
fn rejects_unknown_children_and_encodings() {
    let xml = tmx(1, 1, r#"<group name="g"/>"#);
    assert!(matches!(TileMap::parse(&xml), Err(MapError::UnsupportedElement(e)) if e == "group"));

    let xml = tmx(1, 1, &layer("ground", 1, 1, "", &[1])).replace("csv", "base64");
    assert!(matches!(TileMap::parse(&xml), Err(MapError::UnsupportedEncoding(e)) if e == "base64"));
}

#[test]
fn malformed_xml_is_an_xml_error() {
    let xml = tmx(1, 1, "<layer>");
    assert!(matches!(TileMap::parse(&xml), Err(MapError::Xml(_))));
}

#[test]
fn image_failure_aborts_the_load() {
    let xml = tmx(1, 1, &layer("ground", 1, 1, "", &[1]));
    let result = TileMap::parse_with(&xml, |_| {
        Err(image::ImageError::IoError(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "missing",
        )))
    });
    match result {
        Err(MapError::ImageLoadError { path, .. }) => assert_eq!(path.to_str(), Some("terrain.png")),
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn loads_from_disk_relative_to_the_map() {
    let dir = std::env::temp_dir().join(format!("tileview-load-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    sheet().save(dir.join("terrain.png")).unwrap();
    let path = dir.join("map.tmx");
    std::fs::write(&path, tmx(1, 1, &layer("ground", 1, 1, "", &[3]))).unwrap();

    let map = TileMap::load(&path).unwrap();
    assert!(map.is_loaded());
    assert_eq!(map.resolve_path("next.tmx"), dir.join("next.tmx"));
    assert_eq!(*map.rasterize(|_, _| true).get_pixel(0, 0), BLUE);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn missing_map_file_is_io_error() {
    assert!(matches!(TileMap::load("/definitely/not/here.tmx"), Err(MapError::Io(_))));
}

// ── Queries ───────────────────────────────────────────────────────────────────

#[test]
fn resolve_tile_maps_gid_to_sheet_cell() {
    let map = load(&tmx(1, 1, ""));
    let tile = map.resolve_tile(4).unwrap().unwrap();
    assert_eq!((tile.column, tile.row, tile.tileset_index), (1, 1, 0));
    assert!(map.resolve_tile(0).unwrap().is_none());
    assert!(matches!(map.resolve_tile(5), Err(MapError::UnresolvedGid(5))));
}

#[test]
fn objects_are_stored_in_tile_units() {
    let body = r#" <objectgroup name="things">
  <object id="7" name="character" gid="2" x="4" y="6" width="2" height="2">
   <properties>
    <property name="offsetY" type="float" value="0.5"/>
    <property name="speed" type="float" value="0.2"/>
   </properties>
  </object>
  <object id="8" name="door" x="2" y="0" width="4" height="2">
   <properties><property name="trigger" value="loadMap"/></properties>
  </object>
 </objectgroup>"#;
    let map = load(&tmx(4, 4, body));

    let character = map.find_object("character").unwrap();
    assert_eq!(character.position(), Vec2::new(2.0, 3.0));
    assert_eq!((character.width, character.height), (1.0, 1.0));
    assert!((character.offset_y - 0.5).abs() < 1e-6);
    assert!(matches!(character.kind, ObjectKind::Tile(t) if (t.column, t.row) == (1, 0)));
    // Tile objects hang up from their anchor.
    assert!(character.area().contains(Vec2::new(2.5, 2.5)));
    assert!(!character.area().contains(Vec2::new(2.5, 3.0)));

    let door = map.find_object("door").unwrap();
    assert_eq!(door.kind, ObjectKind::Rect);
    assert_eq!(door.trigger(), Some("loadMap"));
    assert!(door.area().contains(Vec2::new(1.0, 0.0)));
    assert!(map.find_object("nobody").is_none());
}

#[test]
fn blocking_grid_merges_blocking_layers() {
    let body = [
        layer("ground", 2, 2, "", &[1, 1, 1, 1]),
        layer("walls", 2, 2, &flag("blocking"), &[0, 1, 0, 0]),
        layer("rocks", 2, 2, &flag("blocking"), &[0, 0, 1, 0]),
    ]
    .join("\n");
    let map = load(&tmx(2, 2, &body));
    let grid = map.blocking_grid().unwrap();
    assert!(!grid.is_blocked(IVec2::new(0, 0)));
    assert!(grid.is_blocked(IVec2::new(1, 0)));
    assert!(grid.is_blocked(IVec2::new(0, 1)));
    assert!(grid.is_blocked(IVec2::new(5, 5)));
}

#[test]
fn build_grid_is_none_without_matching_layers() {
    let map = load(&tmx(2, 2, &layer("ground", 2, 2, "", &[1, 1, 1, 1])));
    assert!(map.blocking_grid().is_none());
    let counts = map
        .build_grid(|_, _| true, |_, _, _, gid, prev: &u32| prev + gid, 0)
        .unwrap();
    assert_eq!(counts.get(IVec2::new(1, 1)), Some(&1));
}

#[test]
fn set_tile_validates_gid() {
    let mut map = load(&tmx(2, 2, &layer("ground", 2, 2, "", &[1, 1, 1, 1])));
    map.set_tile(0, IVec2::new(1, 0), 4).unwrap();
    assert_eq!(map.layers()[0].gid(1, 0), 4);
    assert!(matches!(map.set_tile(0, IVec2::ZERO, 42), Err(MapError::UnresolvedGid(42))));
}

// ── Rasterization ─────────────────────────────────────────────────────────────

#[test]
fn rasterize_draws_later_layers_on_top() {
    let body = [
        layer("ground", 2, 1, "", &[1, 2]),
        layer("detail", 2, 1, "", &[3, 0]),
    ]
    .join("\n");
    let map = load(&tmx(2, 1, &body));
    let surface = map.rasterize(|_, _| true);
    assert_eq!(surface.dimensions(), (4, 2));
    assert_eq!(*surface.get_pixel(1, 1), BLUE);
    assert_eq!(*surface.get_pixel(3, 0), GREEN);

    let ground_only = map.rasterize(|l, _| l.name == "ground");
    assert_eq!(*ground_only.get_pixel(0, 0), RED);
}

#[test]
fn rasterize_is_deterministic_and_reuses_surfaces() {
    let map = load(&tmx(2, 2, &layer("ground", 2, 2, "", &[1, 0, 4, 2])));
    let first = map.rasterize(|_, _| true);
    let mut reused = RgbaImage::from_pixel(4, 4, WHITE);
    map.rasterize_into(|_, _| true, &mut reused);
    assert_eq!(first, reused);
    assert_eq!(*first.get_pixel(2, 0), CLEAR);
}

#[test]
fn below_and_above_actor_surfaces_split_layers() {
    let body = [
        layer("ground", 1, 1, "", &[1]),
        layer("roof", 1, 1, &flag("aboveChar"), &[2]),
        layer("secret", 1, 1, &flag("hidden"), &[3]),
    ]
    .join("\n");
    let map = load(&tmx(1, 1, &body));
    assert_eq!(*map.rasterize_below_actors().get_pixel(0, 0), RED);
    assert_eq!(*map.rasterize_above_actors().get_pixel(0, 0), GREEN);
}

fn overlapping_objects(z_sorted: bool) -> TileMap {
    let props = if z_sorted { flag("zIndexing") } else { String::new() };
    let body = format!(
        r#" <objectgroup name="actors">
  <properties>{props}</properties>
  <object id="1" name="front" gid="1" x="4" y="6" width="2" height="2"/>
  <object id="2" name="back" gid="3" x="4" y="5" width="2" height="2"/>
 </objectgroup>"#
    );
    load(&tmx(4, 4, &body))
}

#[test]
fn z_sorted_groups_draw_by_depth() {
    // Overlap is pixel row 4: "front" is lower on screen, so it wins.
    let sorted = overlapping_objects(true).rasterize_objects(|_| true);
    assert_eq!(*sorted.get_pixel(4, 4), RED);
    assert_eq!(*sorted.get_pixel(4, 3), BLUE);

    let unsorted = overlapping_objects(false).rasterize_objects(|_| true);
    assert_eq!(*unsorted.get_pixel(4, 4), BLUE);
}

#[test]
fn object_filter_skips_objects() {
    let surface = overlapping_objects(true).rasterize_objects(|o| o.name != "front");
    assert_eq!(*surface.get_pixel(4, 5), CLEAR);
    assert_eq!(*surface.get_pixel(4, 4), BLUE);
}

#[test]
fn animation_overlay_follows_tick() {
    let frame = |n: u32| {
        format!(
            r#"<property name="frame" type="int" value="{n}"/><property name="frame_max" type="int" value="2"/>{}"#,
            flag("hidden")
        )
    };
    let body = [
        layer("water1", 2, 1, &frame(1), &[1, 0]),
        layer("water2", 2, 1, &frame(2), &[2, 0]),
    ]
    .join("\n");
    let map = load(&tmx(2, 1, &body));

    let mut overlay = map.new_surface();
    map.rasterize_animation(0, &mut overlay);
    assert_eq!(*overlay.get_pixel(0, 0), RED);
    map.rasterize_animation(1, &mut overlay);
    assert_eq!(*overlay.get_pixel(0, 0), GREEN);
    map.rasterize_animation(2, &mut overlay);
    assert_eq!(*overlay.get_pixel(1, 1), RED);
    assert_eq!(*overlay.get_pixel(2, 0), CLEAR);
}

#[test]
fn index_surface_encodes_first_accepted_tile() {
    let body = [
        layer("ground", 2, 1, "", &[4, 0]),
        layer("detail", 2, 1, "", &[1, 2]),
    ]
    .join("\n");
    let map = load(&tmx(2, 1, &body));
    let index = map.index_surface(|_, _| true);
    assert_eq!(index.dimensions(), (2, 1));
    assert_eq!(*index.get_pixel(0, 0), Rgba([1, 1, 0, 255]));
    assert_eq!(*index.get_pixel(1, 0), Rgba([1, 0, 0, 255]));

    let empty = map.index_surface(|l, _| l.name == "ground");
    assert_eq!(*empty.get_pixel(1, 0), CLEAR);
}
