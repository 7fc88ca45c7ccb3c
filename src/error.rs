use std::path::PathBuf;

/// Load-time failures for a tile map.
///
/// Every variant aborts the whole load: the source data is assumed to be
/// malformed, so nothing here is worth retrying.
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    /// The map's `orientation` attribute is anything but `orthogonal`.
    #[error("unsupported map orientation '{0}' (only 'orthogonal' is supported)")]
    UnsupportedOrientation(String),
    /// The map's `renderorder` attribute is anything but `right-down`.
    #[error("unsupported render order '{0}' (only 'right-down' is supported)")]
    UnsupportedRenderOrder(String),
    /// The map is flagged `infinite="1"`.
    #[error("infinite maps are not supported")]
    InfiniteMapUnsupported,
    /// A tileset's tile size differs from the map's tile size.
    #[error("tileset '{tileset}' has tile size {found:?}, map expects {expected:?}")]
    TileSizeMismatch {
        tileset: String,
        expected: (u32, u32),
        found: (u32, u32),
    },
    /// A layer's width/height differs from the map's.
    #[error("layer '{layer}' is {found:?} cells, map is {expected:?}")]
    LayerSizeMismatch {
        layer: String,
        expected: (u32, u32),
        found: (u32, u32),
    },
    /// A layer's CSV payload does not hold exactly width × height ids.
    #[error("layer '{layer}' holds {found} tile ids, expected {expected}")]
    LayerDataLength {
        layer: String,
        expected: usize,
        found: usize,
    },
    /// A non-zero gid falls outside every tileset's range.
    #[error("gid {0} does not belong to any tileset")]
    UnresolvedGid(u32),
    /// A tileset image could not be read or decoded.
    #[error("failed to load tileset image '{}': {source}", path.display())]
    ImageLoadError {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    /// The document is not well-formed XML.
    #[error("malformed map document: {0}")]
    Xml(#[from] quick_xml::Error),
    /// A required attribute is absent.
    #[error("<{element}> is missing attribute '{attribute}'")]
    MissingAttribute {
        element: String,
        attribute: &'static str,
    },
    /// An attribute is present but cannot be parsed.
    #[error("<{element}> attribute '{attribute}' has invalid value '{value}'")]
    InvalidAttribute {
        element: String,
        attribute: &'static str,
        value: String,
    },
    /// The map contains a child element this loader does not understand.
    #[error("unsupported map element <{0}>")]
    UnsupportedElement(String),
    /// Layer data uses an encoding other than CSV.
    #[error("unsupported layer data encoding '{0}' (only 'csv' is supported)")]
    UnsupportedEncoding(String),
    /// The map document itself could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
