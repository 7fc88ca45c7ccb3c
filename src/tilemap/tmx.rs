//! TMX (XML) reader.
//!
//! The document is first read into a small element tree with `quick-xml`,
//! then walked into the map types. Only what the map model supports is
//! accepted: a fixed-size, orthogonal, right-down map with embedded
//! tilesets and CSV layer data.

use std::path::PathBuf;
use std::str::FromStr;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::MapError;

use super::{
    tileset_index_for, Layer, MapObject, ObjectGroup, ObjectKind, Properties, PropertyValue,
    TileMap, TileObject, TileSet,
};

// ── Element tree ─────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Element>,
    text: String,
}

impl Element {
    fn from_start(start: &BytesStart<'_>) -> Result<Self, MapError> {
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(quick_xml::Error::from)?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value()?.into_owned();
            attributes.push((key, value));
        }
        Ok(Self {
            name: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
            attributes,
            ..Self::default()
        })
    }

    fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    fn parse_attr<T: FromStr>(&self, name: &'static str, raw: &str) -> Result<T, MapError> {
        raw.trim().parse().map_err(|_| MapError::InvalidAttribute {
            element: self.name.clone(),
            attribute: name,
            value: raw.to_string(),
        })
    }

    fn required<T: FromStr>(&self, name: &'static str) -> Result<T, MapError> {
        let raw = self.attr(name).ok_or_else(|| MapError::MissingAttribute {
            element: self.name.clone(),
            attribute: name,
        })?;
        self.parse_attr(name, raw)
    }

    fn optional<T: FromStr>(&self, name: &'static str) -> Result<Option<T>, MapError> {
        self.attr(name).map(|raw| self.parse_attr(name, raw)).transpose()
    }

    fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }
}

fn read_tree(xml: &str) -> Result<Element, MapError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => stack.push(Element::from_start(&start)?),
            Event::Empty(start) => {
                let element = Element::from_start(&start)?;
                attach(&mut stack, &mut root, element);
            }
            Event::End(_) => {
                if let Some(element) = stack.pop() {
                    attach(&mut stack, &mut root, element);
                }
            }
            Event::Text(text) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&text.unescape()?);
                }
            }
            Event::CData(data) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(&data.into_inner()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    root.ok_or_else(|| MapError::UnsupportedElement("(empty document)".into()))
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => {
            if root.is_none() {
                *root = Some(element);
            }
        }
    }
}

// ── Map ──────────────────────────────────────────────────────────────────────

pub(crate) fn parse_map(xml: &str) -> Result<TileMap, MapError> {
    let root = read_tree(xml)?;
    if root.name != "map" {
        return Err(MapError::UnsupportedElement(root.name));
    }

    let orientation = root.attr("orientation").unwrap_or_default();
    if orientation != "orthogonal" {
        return Err(MapError::UnsupportedOrientation(orientation.to_string()));
    }
    let render_order = root.attr("renderorder").unwrap_or_default();
    if render_order != "right-down" {
        return Err(MapError::UnsupportedRenderOrder(render_order.to_string()));
    }
    if root.attr("infinite").unwrap_or_default() != "0" {
        return Err(MapError::InfiniteMapUnsupported);
    }

    let mut map = TileMap {
        width: root.required("width")?,
        height: root.required("height")?,
        tile_width: root.required("tilewidth")?,
        tile_height: root.required("tileheight")?,
        properties: read_properties(&root)?,
        tilesets: Vec::new(),
        layers: Vec::new(),
        object_groups: Vec::new(),
        base_dir: PathBuf::new(),
    };

    // Objects resolve their gid against every tileset, so groups are read
    // after the whole child list has been scanned.
    let mut group_elements = Vec::new();
    for child in &root.children {
        match child.name.as_str() {
            "tileset" => {
                let tileset = read_tileset(child, &map)?;
                map.tilesets.push(tileset);
            }
            "layer" => {
                let layer = read_layer(child, &map)?;
                map.layers.push(layer);
            }
            "objectgroup" => group_elements.push(child),
            "properties" => {}
            other => return Err(MapError::UnsupportedElement(other.to_string())),
        }
    }

    for layer in &map.layers {
        if let Some(&gid) = layer
            .data
            .iter()
            .find(|&&gid| gid != 0 && tileset_index_for(&map.tilesets, gid).is_none())
        {
            return Err(MapError::UnresolvedGid(gid));
        }
    }

    for element in group_elements {
        let group = read_object_group(element, &map)?;
        map.object_groups.push(group);
    }

    Ok(map)
}

// ── Children ─────────────────────────────────────────────────────────────────

fn read_tileset(el: &Element, map: &TileMap) -> Result<TileSet, MapError> {
    let name = el.attr("name").unwrap_or_default().to_string();
    let tile_width: u32 = el.required("tilewidth")?;
    let tile_height: u32 = el.required("tileheight")?;
    if (tile_width, tile_height) != (map.tile_width, map.tile_height) {
        return Err(MapError::TileSizeMismatch {
            tileset: name,
            expected: (map.tile_width, map.tile_height),
            found: (tile_width, tile_height),
        });
    }

    let image = el.child("image").ok_or_else(|| MapError::MissingAttribute {
        element: el.name.clone(),
        attribute: "image",
    })?;

    let first_gid: u32 = el.required("firstgid")?;
    let tile_count: u32 = el.required("tilecount")?;
    if first_gid.checked_add(tile_count).is_none() {
        return Err(MapError::InvalidAttribute {
            element: el.name.clone(),
            attribute: "tilecount",
            value: tile_count.to_string(),
        });
    }

    Ok(TileSet {
        first_gid,
        tile_count,
        columns: el.required("columns")?,
        tile_width,
        tile_height,
        image_source: image.required("source")?,
        image: None,
        name,
    })
}

fn read_layer(el: &Element, map: &TileMap) -> Result<Layer, MapError> {
    let name = el.attr("name").unwrap_or_default().to_string();
    let width: u32 = el.required("width")?;
    let height: u32 = el.required("height")?;
    if (width, height) != (map.width, map.height) {
        return Err(MapError::LayerSizeMismatch {
            layer: name,
            expected: (map.width, map.height),
            found: (width, height),
        });
    }

    let data_el = el.child("data").ok_or_else(|| MapError::MissingAttribute {
        element: el.name.clone(),
        attribute: "data",
    })?;
    match data_el.attr("encoding") {
        Some("csv") => {}
        other => return Err(MapError::UnsupportedEncoding(other.unwrap_or("xml").to_string())),
    }
    let data = parse_csv(data_el)?;

    let expected = width as usize * height as usize;
    if data.len() != expected {
        return Err(MapError::LayerDataLength {
            layer: name,
            expected,
            found: data.len(),
        });
    }

    Ok(Layer {
        name,
        width,
        height,
        data,
        properties: read_properties(el)?,
    })
}

fn parse_csv(data_el: &Element) -> Result<Vec<u32>, MapError> {
    data_el
        .text
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| data_el.parse_attr("csv", s))
        .collect()
}

fn read_object_group(el: &Element, map: &TileMap) -> Result<ObjectGroup, MapError> {
    let mut objects = Vec::new();
    for child in el.children.iter().filter(|c| c.name == "object") {
        objects.push(read_object(child, map)?);
    }
    Ok(ObjectGroup {
        name: el.attr("name").unwrap_or_default().to_string(),
        properties: read_properties(el)?,
        objects,
    })
}

/// Pixel geometry is converted to tile units here, once.
fn read_object(el: &Element, map: &TileMap) -> Result<MapObject, MapError> {
    let tw = map.tile_width as f32;
    let th = map.tile_height as f32;
    let properties = read_properties(el)?;

    let kind = match el.optional::<u32>("gid")? {
        Some(gid) if gid != 0 => {
            let index = tileset_index_for(&map.tilesets, gid).ok_or(MapError::UnresolvedGid(gid))?;
            let (column, row) = map.tilesets[index].cell_of(gid);
            ObjectKind::Tile(TileObject { gid, tileset: index, column, row })
        }
        _ => ObjectKind::Rect,
    };

    Ok(MapObject {
        id: el.optional("id")?.unwrap_or(0),
        name: el.attr("name").unwrap_or_default().to_string(),
        x: el.optional::<f32>("x")?.unwrap_or(0.0) / tw,
        y: el.optional::<f32>("y")?.unwrap_or(0.0) / th,
        width: el.optional::<f32>("width")?.unwrap_or(0.0) / tw,
        height: el.optional::<f32>("height")?.unwrap_or(0.0) / th,
        offset_x: properties.float("offsetX").unwrap_or(0.0) as f32,
        offset_y: properties.float("offsetY").unwrap_or(0.0) as f32,
        properties,
        kind,
    })
}

fn read_properties(el: &Element) -> Result<Properties, MapError> {
    let mut properties = Properties::new();
    let Some(list) = el.child("properties") else {
        return Ok(properties);
    };
    for prop in list.children.iter().filter(|c| c.name == "property") {
        let name: String = prop.required("name")?;
        // Multi-line string properties carry their value as element text.
        let raw = prop.attr("value").unwrap_or(prop.text.as_str());
        let value = PropertyValue::parse(prop.attr("type"), raw).ok_or_else(|| {
            MapError::InvalidAttribute {
                element: format!("property '{name}'"),
                attribute: "value",
                value: raw.to_string(),
            }
        })?;
        properties.insert(name, value);
    }
    Ok(properties)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tree_collects_nested_text_and_attributes() {
        let root = read_tree(r#"<a x="1"><b>hello</b><c y="2"/></a>"#).unwrap();
        assert_eq!(root.name, "a");
        assert_eq!(root.attr("x"), Some("1"));
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.children[0].text, "hello");
        assert_eq!(root.child("c").and_then(|c| c.attr("y")), Some("2"));
    }

    #[test]
    fn csv_tolerates_whitespace_and_trailing_comma() {
        let el = Element {
            name: "data".into(),
            text: "\n1,0,\n 2,3,\n".into(),
            ..Element::default()
        };
        assert_eq!(parse_csv(&el).unwrap(), vec![1, 0, 2, 3]);
    }

    #[test]
    fn csv_rejects_garbage() {
        let el = Element {
            name: "data".into(),
            text: "1,x".into(),
            ..Element::default()
        };
        assert!(matches!(parse_csv(&el), Err(MapError::InvalidAttribute { .. })));
    }

    #[test]
    fn properties_use_text_for_multiline_values() {
        let root = read_tree(
            r#"<o><properties>
                <property name="text">line one
line two</property>
                <property name="n" type="int" value="3"/>
            </properties></o>"#,
        )
        .unwrap();
        let props = read_properties(&root).unwrap();
        assert_eq!(props.string("text"), Some("line one\nline two"));
        assert_eq!(props.int("n"), Some(3));
    }
}
