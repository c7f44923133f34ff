use crate::config::MapConfig;
use crate::types::{Layer, LayerControl, MapDocument, MapView, TileLayer};

/// Assembles the document: base imagery, the boundary overlay, then the data
/// layers in the order given. Layer contents are passed through untouched.
pub fn compose(map: &MapConfig, boundary_overlay: Layer, data_layers: Vec<Layer>) -> MapDocument {
    let base = TileLayer {
        name: map.tiles.name.clone(),
        url: map.tiles.url.clone(),
        attribution: map.tiles.attribution.clone(),
        overlay: false,
        opacity: 1.0,
    };

    let mut overlays = Vec::with_capacity(data_layers.len() + 1);
    overlays.push(boundary_overlay);
    overlays.extend(data_layers);

    let control = LayerControl {
        base_layers: vec![base.name.clone()],
        overlays: overlays.iter().map(|layer| layer.name.clone()).collect(),
    };

    MapDocument {
        view: MapView {
            center: map.center,
            zoom: map.zoom,
        },
        base,
        overlays,
        control,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BoundaryStyle, HeatStyle, Gradient, LayerContent, MarkerStyle};

    fn boundary() -> Layer {
        Layer {
            name: "District Boundaries".to_string(),
            content: LayerContent::Boundary {
                style: BoundaryStyle {
                    color: "white".to_string(),
                    weight: 1.5,
                    opacity: 1.0,
                    fill_color: "transparent".to_string(),
                    fill_opacity: 0.0,
                    tooltip_label: "District:".to_string(),
                },
                shapes: Vec::new(),
            },
        }
    }

    fn markers(name: &str) -> Layer {
        Layer {
            name: name.to_string(),
            content: LayerContent::Markers {
                style: MarkerStyle {
                    color: "darkblue".to_string(),
                    radius: 4.0,
                    fill_opacity: 0.8,
                },
                markers: Vec::new(),
            },
        }
    }

    fn heat(name: &str) -> Layer {
        Layer {
            name: name.to_string(),
            content: LayerContent::Heat {
                style: HeatStyle {
                    gradient: Gradient::from_sorted(Vec::new()),
                    radius: 18.0,
                    blur: 15.0,
                    max_zoom: 13,
                },
                points: vec![[26.8, 81.2]],
            },
        }
    }

    #[test]
    fn empty_data_layers_yield_base_boundary_and_control() {
        let doc = compose(&MapConfig::default(), boundary(), Vec::new());

        assert!(!doc.base.overlay);
        assert_eq!(doc.base.opacity, 1.0);
        assert_eq!(doc.overlays, vec![boundary()]);
        assert_eq!(doc.control.base_layers, vec!["Esri Satellite".to_string()]);
        assert_eq!(doc.control.overlays, vec!["District Boundaries".to_string()]);
    }

    #[test]
    fn data_layers_follow_boundary_in_caller_order() {
        let layers = vec![heat("Flooded 10-15 Times"), markers("Flooded 3 Times")];
        let doc = compose(&MapConfig::default(), boundary(), layers.clone());

        assert_eq!(doc.overlays.len(), 3);
        assert_eq!(doc.overlays[0], boundary());
        assert_eq!(&doc.overlays[1..], &layers[..]);
        assert_eq!(
            doc.control.overlays,
            vec!["District Boundaries", "Flooded 10-15 Times", "Flooded 3 Times"]
        );
        assert!(!doc.control.overlays.contains(&doc.base.name));
    }

    #[test]
    fn view_comes_from_map_config() {
        let map = MapConfig {
            center: [27.4, 82.2],
            zoom: 10,
            ..MapConfig::default()
        };
        let doc = compose(&map, boundary(), Vec::new());
        assert_eq!(doc.view.center, [27.4, 82.2]);
        assert_eq!(doc.view.zoom, 10);
    }
}
