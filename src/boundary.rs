use crate::types::{BoundaryFeature, BoundaryShape, BoundaryStyle, Layer, LayerContent};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("boundary feature has no {field:?} attribute")]
pub struct MissingAttribute {
    pub field: String,
}

impl BoundaryFeature {
    /// Text value of an attribute. Numbers and booleans are stringified;
    /// null counts as missing.
    pub fn attribute(&self, field: &str) -> Result<String, MissingAttribute> {
        match self.properties.get(field) {
            Some(Value::String(s)) => Ok(s.clone()),
            Some(Value::Number(n)) => Ok(n.to_string()),
            Some(Value::Bool(b)) => Ok(b.to_string()),
            Some(Value::Null) | None => Err(MissingAttribute {
                field: field.to_string(),
            }),
            Some(other) => Ok(other.to_string()),
        }
    }
}

/// Wraps the boundary polygons into one overlay. A feature without
/// `name_field` keeps its geometry and gets an empty tooltip.
pub fn build_boundary_overlay(
    name: &str,
    features: Vec<BoundaryFeature>,
    name_field: &str,
    style: &BoundaryStyle,
) -> Layer {
    let mut missing = 0usize;
    let shapes = features
        .into_iter()
        .map(|feature| {
            let tooltip = feature.attribute(name_field).unwrap_or_else(|_| {
                missing += 1;
                String::new()
            });
            BoundaryShape {
                geometry: feature.geometry,
                tooltip,
            }
        })
        .collect();

    if missing > 0 {
        debug!(missing, name_field, "boundary features without tooltip attribute");
    }

    Layer {
        name: name.to_string(),
        content: LayerContent::Boundary {
            style: style.clone(),
            shapes,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn square() -> geojson::Geometry {
        geojson::Geometry::new(geojson::Value::Polygon(vec![vec![
            vec![81.0, 26.0],
            vec![82.0, 26.0],
            vec![82.0, 27.0],
            vec![81.0, 27.0],
            vec![81.0, 26.0],
        ]]))
    }

    fn feature(properties: Value) -> BoundaryFeature {
        BoundaryFeature {
            geometry: square(),
            properties: properties.as_object().cloned().unwrap_or_default(),
        }
    }

    fn style() -> BoundaryStyle {
        BoundaryStyle {
            color: "white".to_string(),
            weight: 1.5,
            opacity: 1.0,
            fill_color: "transparent".to_string(),
            fill_opacity: 0.0,
            tooltip_label: "District:".to_string(),
        }
    }

    #[test]
    fn missing_attribute_yields_empty_tooltip() {
        let features = vec![feature(json!({ "district": "A" })), feature(json!({ "other": 1 }))];
        let layer = build_boundary_overlay("District Boundaries", features, "district", &style());

        match &layer.content {
            LayerContent::Boundary { shapes, style: s } => {
                assert_eq!(shapes.len(), 2);
                assert_eq!(shapes[0].tooltip, "A");
                assert_eq!(shapes[1].tooltip, "");
                assert_eq!(shapes[1].geometry, square());
                assert_eq!(s.fill_color, "transparent");
            }
            other => panic!("expected boundary, got {other:?}"),
        }
    }

    #[test]
    fn name_field_is_configurable() {
        let features = vec![feature(json!({ "villname": "Tulsipur", "district": "Balrampur" }))];
        let layer = build_boundary_overlay("Villages", features, "villname", &style());

        match &layer.content {
            LayerContent::Boundary { shapes, .. } => assert_eq!(shapes[0].tooltip, "Tulsipur"),
            other => panic!("expected boundary, got {other:?}"),
        }
    }

    #[test]
    fn attribute_stringifies_scalars_and_treats_null_as_missing() {
        let f = feature(json!({ "code": 42, "flag": true, "empty": null }));
        assert_eq!(f.attribute("code"), Ok("42".to_string()));
        assert_eq!(f.attribute("flag"), Ok("true".to_string()));
        assert_eq!(
            f.attribute("empty"),
            Err(MissingAttribute {
                field: "empty".to_string()
            })
        );
    }

    #[test]
    fn empty_feature_set_is_a_valid_layer() {
        let layer = build_boundary_overlay("District Boundaries", Vec::new(), "district", &style());
        assert!(layer.is_empty());
    }
}
