use crate::config::{ConfigError, FieldAliases, LayerKind};
use crate::types::{GeoRecord, HeatStyle, Layer, LayerContent, Marker, MarkerStyle};

pub const UNKNOWN_DISTRICT: &str = "Unknown District";
pub const UNKNOWN_SETTLEMENT: &str = "Village";

/// Styles for the layers a dataset can produce. A style is only required for
/// the kinds actually drawn.
#[derive(Debug, Clone, Default)]
pub struct DatasetStyle {
    pub marker: Option<MarkerStyle>,
    pub heat: Option<HeatStyle>,
}

/// Popup text for a record: `"{district}, {settlement}"`, with placeholders
/// for fields missing under every accepted header.
pub fn marker_label(record: &GeoRecord, aliases: &FieldAliases) -> String {
    let district = record
        .record
        .get_any(&aliases.district)
        .unwrap_or(UNKNOWN_DISTRICT);
    let settlement = record
        .record
        .get_any(&aliases.settlement)
        .unwrap_or(UNKNOWN_SETTLEMENT);
    format!("{district}, {settlement}")
}

pub fn build_marker_layer(
    name: &str,
    records: &[GeoRecord],
    style: &MarkerStyle,
    aliases: &FieldAliases,
) -> Layer {
    let markers = records
        .iter()
        .map(|record| Marker {
            lat: record.lat_decimal,
            lon: record.lon_decimal,
            label: marker_label(record, aliases),
        })
        .collect();

    Layer {
        name: name.to_string(),
        content: LayerContent::Markers {
            style: style.clone(),
            markers,
        },
    }
}

/// Density only: bare `[lat, lon]` pairs, no labels.
pub fn build_heat_layer(name: &str, records: &[GeoRecord], style: &HeatStyle) -> Layer {
    let points = records
        .iter()
        .map(|record| [record.lat_decimal, record.lon_decimal])
        .collect();

    Layer {
        name: name.to_string(),
        content: LayerContent::Heat {
            style: style.clone(),
            points,
        },
    }
}

impl DatasetStyle {
    fn marker_for(&self, dataset: &str) -> Result<&MarkerStyle, ConfigError> {
        self.marker.as_ref().ok_or_else(|| ConfigError::MissingStyle {
            dataset: dataset.to_string(),
            kind: "marker",
            section: "datasets.marker",
        })
    }

    fn heat_for(&self, dataset: &str) -> Result<&HeatStyle, ConfigError> {
        self.heat.as_ref().ok_or_else(|| ConfigError::MissingStyle {
            dataset: dataset.to_string(),
            kind: "heat",
            section: "datasets.heat",
        })
    }
}

/// Emits the layers `kind` asks for. With both, the heat layer comes first so
/// the markers draw on top, and each gets its own name in the layer control.
pub fn build_layers(
    name: &str,
    records: &[GeoRecord],
    kind: LayerKind,
    style: &DatasetStyle,
    aliases: &FieldAliases,
) -> Result<Vec<Layer>, ConfigError> {
    let layers = match kind {
        LayerKind::Marker => vec![build_marker_layer(
            name,
            records,
            style.marker_for(name)?,
            aliases,
        )],
        LayerKind::Heat => vec![build_heat_layer(name, records, style.heat_for(name)?)],
        LayerKind::MarkerAndHeat => {
            let marker = style.marker_for(name)?;
            let heat = style.heat_for(name)?;
            let names = kind.layer_names(name);
            vec![
                build_heat_layer(&names[0], records, heat),
                build_marker_layer(&names[1], records, marker, aliases),
            ]
        }
    };
    Ok(layers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Gradient, GradientStop, RawRecord};

    fn geo(pairs: &[(&str, &str)], lat: f64, lon: f64) -> GeoRecord {
        GeoRecord {
            record: RawRecord::from_pairs(pairs.iter().copied()),
            lat_decimal: lat,
            lon_decimal: lon,
        }
    }

    fn marker_style() -> MarkerStyle {
        MarkerStyle {
            color: "darkred".to_string(),
            radius: 4.0,
            fill_opacity: 0.8,
        }
    }

    fn heat_style() -> HeatStyle {
        HeatStyle {
            gradient: Gradient::from_sorted(vec![
                GradientStop { stop: 0.2, color: "orange".to_string() },
                GradientStop { stop: 0.4, color: "red".to_string() },
                GradientStop { stop: 0.8, color: "darkred".to_string() },
            ]),
            radius: 18.0,
            blur: 15.0,
            max_zoom: 13,
        }
    }

    #[test]
    fn label_uses_either_village_spelling() {
        let aliases = FieldAliases::default();
        let a = geo(&[("DISTRICT", "Balrampur"), ("SETTLEMENT/VILLAGE", "X")], 26.8, 81.2);
        let b = geo(&[("DISTRICT", "Gonda"), ("SETTLEMENT / VILLAGE", "Y")], 27.1, 81.9);

        assert_eq!(marker_label(&a, &aliases), "Balrampur, X");
        assert_eq!(marker_label(&b, &aliases), "Gonda, Y");
    }

    #[test]
    fn label_falls_back_to_placeholders() {
        let aliases = FieldAliases::default();
        let record = geo(&[("DISTRICT", "  ")], 26.8, 81.2);
        assert_eq!(marker_label(&record, &aliases), "Unknown District, Village");
    }

    #[test]
    fn marker_layer_has_one_marker_per_record() {
        let records = vec![
            geo(&[("DISTRICT", "Balrampur"), ("SETTLEMENT/VILLAGE", "X")], 26.8, 81.2),
            geo(&[], 27.0, 82.0),
        ];
        let aliases = FieldAliases::default();
        let layer = build_marker_layer("Flood Affected", &records, &marker_style(), &aliases);

        assert_eq!(layer.name, "Flood Affected");
        match &layer.content {
            LayerContent::Markers { markers, style } => {
                assert_eq!(style, &marker_style());
                assert_eq!(markers.len(), 2);
                assert_eq!(markers[0].label, "Balrampur, X");
                assert_eq!((markers[1].lat, markers[1].lon), (27.0, 82.0));
            }
            other => panic!("expected markers, got {other:?}"),
        }
    }

    #[test]
    fn heat_layer_carries_bare_points() {
        let records = vec![geo(&[("DISTRICT", "Balrampur")], 26.8, 81.2)];
        let layer = build_heat_layer("Density", &records, &heat_style());

        match &layer.content {
            LayerContent::Heat { points, style } => {
                assert_eq!(points, &vec![[26.8, 81.2]]);
                assert_eq!(style.gradient.stops().len(), 3);
            }
            other => panic!("expected heat, got {other:?}"),
        }
    }

    #[test]
    fn marker_and_heat_emits_two_layers_from_one_record_set() {
        let records = vec![geo(&[], 26.8, 81.2), geo(&[], 26.9, 81.3)];
        let before = records.clone();
        let style = DatasetStyle {
            marker: Some(marker_style()),
            heat: Some(heat_style()),
        };
        let aliases = FieldAliases::default();
        let layers =
            build_layers("Flooded 3 Times", &records, LayerKind::MarkerAndHeat, &style, &aliases)
                .unwrap();

        assert_eq!(layers.len(), 2);
        assert_eq!(layers[0].name, "Flooded 3 Times (heat)");
        assert_eq!(layers[1].name, "Flooded 3 Times (points)");
        assert!(matches!(layers[0].content, LayerContent::Heat { .. }));
        assert!(matches!(layers[1].content, LayerContent::Markers { .. }));
        assert_eq!(layers[0].len(), 2);
        assert_eq!(layers[1].len(), 2);
        assert_eq!(records, before);
    }

    #[test]
    fn single_kind_keeps_dataset_name() {
        let style = DatasetStyle {
            marker: Some(marker_style()),
            heat: None,
        };
        let aliases = FieldAliases::default();
        let layers = build_layers("Flooded", &[], LayerKind::Marker, &style, &aliases).unwrap();
        assert_eq!(layers.len(), 1);
        assert_eq!(layers[0].name, "Flooded");
        assert!(layers[0].is_empty());

        assert!(matches!(
            build_layers("Flooded", &[], LayerKind::Heat, &style, &aliases),
            Err(ConfigError::MissingStyle { kind: "heat", .. })
        ));
    }
}
