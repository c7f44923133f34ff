use crate::types::{BoundaryStyle, Gradient, GradientStop, HeatStyle, MarkerStyle};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration mistakes. Messy input data never produces one of these.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("gradient stop {stop:?} is not a number")]
    GradientStopNotNumeric { stop: String },
    #[error("gradient stop {stop} is outside [0, 1]")]
    GradientStopOutOfRange { stop: f64 },
    #[error("gradient has no stops")]
    EmptyGradient,
    #[error("{field} must be a finite non-negative number, got {value}")]
    InvalidMagnitude { field: &'static str, value: f64 },
    #[error("{field} must lie in [0, 1], got {value}")]
    InvalidOpacity { field: &'static str, value: f64 },
    #[error("zoom level {zoom} is above the maximum of {max}")]
    InvalidZoom { zoom: u8, max: u8 },
    #[error("map center ({lat}, {lon}) is not a valid position")]
    InvalidCenter { lat: f64, lon: f64 },
    #[error("alias list for {field} is empty")]
    EmptyAliases { field: &'static str },
    #[error("layer name {name:?} is used more than once")]
    DuplicateLayerName { name: String },
    #[error("dataset {dataset:?} draws {kind} layers but has no [{section}] style")]
    MissingStyle {
        dataset: String,
        kind: &'static str,
        section: &'static str,
    },
}

pub const MAX_ZOOM: u8 = 22;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub map: MapConfig,
    pub boundary: BoundaryConfig,
    pub datasets: Vec<DatasetConfig>,
    #[serde(default)]
    pub aliases: FieldAliases,
    pub output: OutputConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct MapConfig {
    /// `[lat, lon]`
    pub center: [f64; 2],
    pub zoom: u8,
    pub tiles: TileConfig,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            center: [26.8, 80.9],
            zoom: 7,
            tiles: TileConfig::default(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct TileConfig {
    pub name: String,
    pub url: String,
    pub attribution: String,
}

impl Default for TileConfig {
    fn default() -> Self {
        Self {
            name: "Esri Satellite".to_string(),
            url: "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{z}/{y}/{x}".to_string(),
            attribution: "Tiles &copy; Esri, Maxar, Earthstar Geographics, and the GIS User Community".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct BoundaryConfig {
    /// GeoJSON or Shapefile.
    pub path: PathBuf,
    #[serde(default = "default_boundary_layer_name")]
    pub layer_name: String,
    /// Attribute shown in the hover tooltip, e.g. `district` or `villname`.
    pub name_field: String,
    #[serde(default)]
    pub style: BoundaryStyleConfig,
}

fn default_boundary_layer_name() -> String {
    "District Boundaries".to_string()
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct BoundaryStyleConfig {
    pub color: String,
    pub weight: f64,
    pub opacity: f64,
    pub fill_opacity: f64,
    pub tooltip_label: String,
}

impl Default for BoundaryStyleConfig {
    fn default() -> Self {
        Self {
            color: "white".to_string(),
            weight: 1.5,
            opacity: 1.0,
            fill_opacity: 0.0,
            tooltip_label: "District:".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LayerKind {
    Marker,
    Heat,
    MarkerAndHeat,
}

impl LayerKind {
    /// Names of the layers a dataset called `name` produces, in draw order.
    pub fn layer_names(self, name: &str) -> Vec<String> {
        match self {
            LayerKind::Marker | LayerKind::Heat => vec![name.to_string()],
            LayerKind::MarkerAndHeat => vec![format!("{name} (heat)"), format!("{name} (points)")],
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatasetConfig {
    pub name: String,
    pub path: PathBuf,
    pub kind: LayerKind,
    pub marker: Option<MarkerStyleConfig>,
    pub heat: Option<HeatStyleConfig>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MarkerStyleConfig {
    pub color: String,
    pub radius: f64,
    pub fill_opacity: f64,
}

impl Default for MarkerStyleConfig {
    fn default() -> Self {
        Self {
            color: "darkred".to_string(),
            radius: 4.0,
            fill_opacity: 0.8,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct HeatStyleConfig {
    /// Intensity stop (as a string key, TOML tables need one) to colour.
    pub gradient: BTreeMap<String, String>,
    #[serde(default = "default_heat_radius")]
    pub radius: f64,
    #[serde(default = "default_heat_blur")]
    pub blur: f64,
    #[serde(default = "default_heat_max_zoom")]
    pub max_zoom: u8,
}

fn default_heat_radius() -> f64 {
    18.0
}

fn default_heat_blur() -> f64 {
    15.0
}

fn default_heat_max_zoom() -> u8 {
    13
}

/// Accepted header spellings per canonical field. A new spelling in a source
/// table is added here, not in code.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct FieldAliases {
    pub latitude: Vec<String>,
    pub longitude: Vec<String>,
    pub district: Vec<String>,
    pub settlement: Vec<String>,
}

impl Default for FieldAliases {
    fn default() -> Self {
        Self {
            latitude: vec!["LATITUDE".to_string()],
            longitude: vec!["LONGITUDE".to_string()],
            district: vec!["DISTRICT".to_string()],
            settlement: vec![
                "SETTLEMENT/VILLAGE".to_string(),
                "SETTLEMENT / VILLAGE".to_string(),
            ],
        }
    }
}

impl FieldAliases {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, aliases) in [
            ("latitude", &self.latitude),
            ("longitude", &self.longitude),
            ("district", &self.district),
            ("settlement", &self.settlement),
        ] {
            if aliases.iter().all(|a| a.trim().is_empty()) {
                return Err(ConfigError::EmptyAliases { field });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct OutputConfig {
    pub html: PathBuf,
    /// Also write the composed document as JSON.
    pub json: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 8080 }
    }
}

impl AppConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: AppConfig = toml::from_str(&content)
            .with_context(|| "Failed to parse TOML configuration")?;
        config
            .validate()
            .with_context(|| format!("Invalid configuration in {:?}", path))?;
        Ok(config)
    }

    /// Checks every style up front so a bad value fails before any input is read.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.map.validate()?;
        self.aliases.validate()?;
        self.boundary.style.to_style()?;
        for dataset in &self.datasets {
            dataset.marker_style()?;
            dataset.heat_style()?;
        }
        self.check_layer_names()
    }

    /// The layer control is keyed by name, so every overlay needs its own.
    fn check_layer_names(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        seen.insert(self.boundary.layer_name.clone());
        for dataset in &self.datasets {
            for name in dataset.kind.layer_names(&dataset.name) {
                if !seen.insert(name.clone()) {
                    return Err(ConfigError::DuplicateLayerName { name });
                }
            }
        }
        Ok(())
    }
}

impl MapConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let [lat, lon] = self.center;
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return Err(ConfigError::InvalidCenter { lat, lon });
        }
        if self.zoom > MAX_ZOOM {
            return Err(ConfigError::InvalidZoom {
                zoom: self.zoom,
                max: MAX_ZOOM,
            });
        }
        Ok(())
    }
}

impl BoundaryStyleConfig {
    pub fn to_style(&self) -> Result<BoundaryStyle, ConfigError> {
        Ok(BoundaryStyle {
            color: self.color.clone(),
            weight: magnitude("boundary weight", self.weight)?,
            opacity: opacity("boundary opacity", self.opacity)?,
            fill_color: "transparent".to_string(),
            fill_opacity: opacity("boundary fill_opacity", self.fill_opacity)?,
            tooltip_label: self.tooltip_label.clone(),
        })
    }
}

impl MarkerStyleConfig {
    pub fn to_style(&self) -> Result<MarkerStyle, ConfigError> {
        Ok(MarkerStyle {
            color: self.color.clone(),
            radius: magnitude("marker radius", self.radius)?,
            fill_opacity: opacity("marker fill_opacity", self.fill_opacity)?,
        })
    }
}

impl HeatStyleConfig {
    pub fn to_style(&self) -> Result<HeatStyle, ConfigError> {
        if self.max_zoom > MAX_ZOOM {
            return Err(ConfigError::InvalidZoom {
                zoom: self.max_zoom,
                max: MAX_ZOOM,
            });
        }
        Ok(HeatStyle {
            gradient: parse_gradient(&self.gradient)?,
            radius: magnitude("heat radius", self.radius)?,
            blur: magnitude("heat blur", self.blur)?,
            max_zoom: self.max_zoom,
        })
    }
}

impl DatasetConfig {
    fn needs_marker(&self) -> bool {
        matches!(self.kind, LayerKind::Marker | LayerKind::MarkerAndHeat)
    }

    fn needs_heat(&self) -> bool {
        matches!(self.kind, LayerKind::Heat | LayerKind::MarkerAndHeat)
    }

    /// Marker style for this dataset; the defaults apply when the section is
    /// omitted.
    pub fn marker_style(&self) -> Result<Option<MarkerStyle>, ConfigError> {
        if !self.needs_marker() {
            return Ok(None);
        }
        self.marker
            .clone()
            .unwrap_or_default()
            .to_style()
            .map(Some)
    }

    /// Heat style for this dataset. Heat has no sensible default gradient, so
    /// the section is required whenever heat layers are drawn.
    pub fn heat_style(&self) -> Result<Option<HeatStyle>, ConfigError> {
        if !self.needs_heat() {
            return Ok(None);
        }
        match &self.heat {
            Some(heat) => heat.to_style().map(Some),
            None => Err(ConfigError::MissingStyle {
                dataset: self.name.clone(),
                kind: "heat",
                section: "datasets.heat",
            }),
        }
    }
}

/// Builds a gradient from `stop -> colour` pairs, rejecting stops that are
/// not numbers in [0, 1].
pub fn parse_gradient(raw: &BTreeMap<String, String>) -> Result<Gradient, ConfigError> {
    if raw.is_empty() {
        return Err(ConfigError::EmptyGradient);
    }

    let mut stops = raw
        .iter()
        .map(|(stop, color)| {
            let value: f64 = stop
                .trim()
                .parse()
                .map_err(|_| ConfigError::GradientStopNotNumeric { stop: stop.clone() })?;
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::GradientStopOutOfRange { stop: value });
            }
            Ok(GradientStop {
                stop: value,
                color: color.clone(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    stops.sort_by(|a, b| a.stop.total_cmp(&b.stop));
    Ok(Gradient::from_sorted(stops))
}

fn magnitude(field: &'static str, value: f64) -> Result<f64, ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::InvalidMagnitude { field, value })
    }
}

fn opacity(field: &'static str, value: f64) -> Result<f64, ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(ConfigError::InvalidOpacity { field, value })
    }
}
