use serde::Serialize;
use std::collections::BTreeMap;

/// Normalizes a column header for lookup: trimmed and upper-cased.
pub fn normalize_header(header: &str) -> String {
    header.trim().to_uppercase()
}

/// One row of an input table. Headers are normalized on insertion so lookups
/// work across tables with inconsistent header formatting.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RawRecord {
    fields: BTreeMap<String, String>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut record = Self::new();
        for (key, value) in pairs {
            record.insert(key.as_ref(), value);
        }
        record
    }

    pub fn insert(&mut self, header: &str, value: impl Into<String>) {
        self.fields.insert(normalize_header(header), value.into());
    }

    /// Raw cell value, `None` if the column is absent.
    pub fn get(&self, header: &str) -> Option<&str> {
        self.fields.get(&normalize_header(header)).map(String::as_str)
    }

    /// First non-blank value found under any of the given spellings.
    pub fn get_any<S: AsRef<str>>(&self, headers: &[S]) -> Option<&str> {
        headers
            .iter()
            .filter_map(|h| self.get(h.as_ref()))
            .map(str::trim)
            .find(|v| !v.is_empty())
    }
}

/// A record whose coordinates parsed into a geographically valid position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoRecord {
    pub record: RawRecord,
    pub lat_decimal: f64,
    pub lon_decimal: f64,
}

/// An administrative polygon with its attributes. The geometry is opaque and
/// forwarded to the renderer as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryFeature {
    pub geometry: geojson::Geometry,
    pub properties: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerStyle {
    pub color: String,
    pub radius: f64,
    pub fill_opacity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradientStop {
    pub stop: f64,
    pub color: String,
}

/// Heat colour ramp, sorted by stop. Every stop lies in [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Gradient {
    stops: Vec<GradientStop>,
}

impl Gradient {
    /// Callers go through `config::parse_gradient`, which checks the stops.
    pub(crate) fn from_sorted(stops: Vec<GradientStop>) -> Self {
        Self { stops }
    }

    pub fn stops(&self) -> &[GradientStop] {
        &self.stops
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatStyle {
    pub gradient: Gradient,
    pub radius: f64,
    pub blur: f64,
    pub max_zoom: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoundaryStyle {
    pub color: String,
    pub weight: f64,
    pub opacity: f64,
    pub fill_color: String,
    pub fill_opacity: f64,
    pub tooltip_label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub lat: f64,
    pub lon: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoundaryShape {
    pub geometry: geojson::Geometry,
    pub tooltip: String,
}

/// What a layer draws. Each layer owns its points.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LayerContent {
    Markers {
        style: MarkerStyle,
        markers: Vec<Marker>,
    },
    Heat {
        style: HeatStyle,
        points: Vec<[f64; 2]>,
    },
    Boundary {
        style: BoundaryStyle,
        shapes: Vec<BoundaryShape>,
    },
}

/// A named, independently toggleable overlay.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layer {
    pub name: String,
    #[serde(flatten)]
    pub content: LayerContent,
}

impl Layer {
    /// Number of markers, heat points or shapes in the layer.
    pub fn len(&self) -> usize {
        match &self.content {
            LayerContent::Markers { markers, .. } => markers.len(),
            LayerContent::Heat { points, .. } => points.len(),
            LayerContent::Boundary { shapes, .. } => shapes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapView {
    pub center: [f64; 2],
    pub zoom: u8,
}

/// The base imagery. Never an overlay, always fully opaque.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TileLayer {
    pub name: String,
    pub url: String,
    pub attribution: String,
    pub overlay: bool,
    pub opacity: f64,
}

/// Lists the base layers separately from the overlays it can toggle.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LayerControl {
    pub base_layers: Vec<String>,
    pub overlays: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapDocument {
    pub view: MapView,
    pub base: TileLayer,
    /// Boundary overlay first, then data layers in caller order.
    pub overlays: Vec<Layer>,
    pub control: LayerControl,
}
