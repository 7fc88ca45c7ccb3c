use glam::Vec2;
use serde_json::json;
use tileview::tilemap::TileMap;
use tileview::trigger::{Trigger, TriggerMap, TriggerSource};

/// 3×3 map of 2-px tiles. A "door" layer and a "hazard" layer both cover
/// cell (2, 1); the hazard layer also covers (0, 0). A chest tile object
/// sits with its bottom edge on y = 2 over cell (2, 1).
fn map() -> TileMap {
    let xml = r#"<map orientation="orthogonal" renderorder="right-down" width="3" height="3" tilewidth="2" tileheight="2" infinite="0">
 <tileset firstgid="1" name="t" tilewidth="2" tileheight="2" tilecount="1" columns="1"><image source="t.png"/></tileset>
 <layer name="floor" width="3" height="3"><data encoding="csv">1,1,1,1,1,1,1,1,1</data></layer>
 <layer name="door" width="3" height="3">
  <properties><property name="trigger" value="warp"/><property name="dest" value="cave.tmx"/></properties>
  <data encoding="csv">0,0,0,0,0,1,0,0,0</data>
 </layer>
 <layer name="hazard" width="3" height="3">
  <properties><property name="trigger" value="hurt"/></properties>
  <data encoding="csv">1,0,0,0,0,1,0,0,0</data>
 </layer>
 <objectgroup name="things">
  <object id="1" name="chest" gid="1" x="4" y="4" width="2" height="2">
   <properties>
    <property name="trigger" value="open"/>
    <property name="coins" type="int" value="3"/>
   </properties>
  </object>
 </objectgroup>
</map>"#;
    TileMap::parse(xml).unwrap()
}

fn names(hits: &[&Trigger]) -> Vec<String> {
    hits.iter().map(|t| t.name.clone()).collect()
}

#[test]
fn objects_come_before_layers_in_layer_order() {
    let triggers = TriggerMap::from_map(&map());
    let hits = triggers.triggers_at(Vec2::new(2.5, 1.5));
    assert_eq!(names(&hits), vec!["open", "warp", "hurt"]);
    assert_eq!(hits[1].source, TriggerSource::Layer { name: "door".into() });
    assert_eq!(hits[1].properties.string("dest"), Some("cave.tmx"));
}

#[test]
fn layer_trigger_hits_only_non_empty_cells() {
    let triggers = TriggerMap::from_map(&map());
    assert_eq!(names(&triggers.triggers_at(Vec2::new(0.2, 0.7))), vec!["hurt"]);
    assert!(triggers.triggers_at(Vec2::new(1.5, 1.5)).is_empty());
    assert!(triggers.triggers_at(Vec2::new(-0.5, 0.5)).is_empty());
    assert!(!triggers.is_empty());
}

#[test]
fn tile_object_area_is_bottom_anchored() {
    let triggers = TriggerMap::from_map(&map());
    let at = |x: f32, y: f32| names(&triggers.triggers_at(Vec2::new(x, y))).contains(&"open".to_string());
    assert!(at(2.0, 1.0));
    assert!(at(2.9, 1.9));
    assert!(!at(2.5, 2.0));
    assert!(!at(2.5, 0.9));
}

#[test]
fn fire_at_calls_the_handler_for_every_hit() {
    let triggers = TriggerMap::from_map(&map());
    let mut seen = Vec::new();
    let mut handler = |t: &Trigger| seen.push(t.name.clone());
    assert_eq!(triggers.fire_at(Vec2::new(2.5, 1.5), &mut handler), 3);
    assert_eq!(seen, vec!["open", "warp", "hurt"]);
}

#[test]
fn properties_convert_to_json() {
    let triggers = TriggerMap::from_map(&map());
    let hits = triggers.triggers_at(Vec2::new(2.5, 1.5));
    assert_eq!(hits[0].properties_json(), json!({ "coins": 3, "trigger": "open" }));
}
