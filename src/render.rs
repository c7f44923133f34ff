use crate::config::OutputConfig;
use crate::types::MapDocument;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::info;

const DOCUMENT_PLACEHOLDER: &str = "__MAP_DOCUMENT__";
const TITLE_PLACEHOLDER: &str = "__MAP_TITLE__";

const PAGE_TEMPLATE: &str = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>__MAP_TITLE__</title>
  <link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css" />
  <script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
  <script src="https://unpkg.com/leaflet.heat@0.2.0/dist/leaflet-heat.js"></script>
  <style>
    html, body, #map { height: 100%; margin: 0; }
  </style>
</head>
<body>
  <div id="map"></div>
  <script>
    const doc = __MAP_DOCUMENT__;

    function escapeHtml(text) {
      const div = document.createElement("div");
      div.textContent = text;
      return div.innerHTML;
    }

    function boundaryLayer(layer) {
      const collection = {
        type: "FeatureCollection",
        features: layer.shapes.map((shape) => ({
          type: "Feature",
          geometry: shape.geometry,
          properties: { tooltip: shape.tooltip },
        })),
      };
      const s = layer.style;
      return L.geoJSON(collection, {
        style: () => ({
          color: s.color,
          weight: s.weight,
          opacity: s.opacity,
          fillColor: s.fill_color,
          fillOpacity: s.fill_opacity,
        }),
        onEachFeature: (feature, shape) => {
          shape.bindTooltip(
            "<b>" + escapeHtml(s.tooltip_label) + "</b> " + escapeHtml(feature.properties.tooltip)
          );
        },
      });
    }

    function markerLayer(layer) {
      const s = layer.style;
      return L.layerGroup(
        layer.markers.map((m) =>
          L.circleMarker([m.lat, m.lon], {
            radius: s.radius,
            color: s.color,
            fill: true,
            fillColor: s.color,
            fillOpacity: s.fill_opacity,
          }).bindPopup(escapeHtml(m.label))
        )
      );
    }

    function heatLayer(layer) {
      const s = layer.style;
      const gradient = {};
      s.gradient.forEach((g) => { gradient[g.stop] = g.color; });
      return L.heatLayer(layer.points, {
        radius: s.radius,
        blur: s.blur,
        maxZoom: s.max_zoom,
        gradient: gradient,
      });
    }

    const builders = { boundary: boundaryLayer, markers: markerLayer, heat: heatLayer };

    const map = L.map("map").setView(doc.view.center, doc.view.zoom);
    const base = L.tileLayer(doc.base.url, {
      attribution: doc.base.attribution,
      opacity: doc.base.opacity,
    }).addTo(map);

    const baseLayers = {};
    baseLayers[doc.base.name] = base;

    const overlays = {};
    doc.overlays.forEach((layer) => {
      const built = builders[layer.kind](layer).addTo(map);
      overlays[layer.name] = built;
    });

    L.control.layers(baseLayers, overlays).addTo(map);
  </script>
</body>
</html>
"#;

/// Renders the document as a self-contained Leaflet page.
pub fn render_html(doc: &MapDocument, title: &str) -> Result<String> {
    let json = serde_json::to_string(doc).context("Failed to serialize map document")?;
    // Keeps a label containing `</script>` from closing the script block.
    let json = json.replace("</", "<\\/");

    Ok(PAGE_TEMPLATE
        .replace(TITLE_PLACEHOLDER, &escape_html(title))
        .replace(DOCUMENT_PLACEHOLDER, &json))
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Page title, taken from the output file name.
pub fn page_title(output: &OutputConfig) -> &str {
    output
        .html
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("Flood map")
}

pub fn write_document(output: &OutputConfig, doc: &MapDocument) -> Result<()> {
    let html = render_html(doc, page_title(output))?;
    write_file(&output.html, &html)?;
    info!(path = ?output.html, overlays = doc.overlays.len(), "wrote map page");

    if let Some(json_path) = &output.json {
        let json = serde_json::to_string_pretty(doc).context("Failed to serialize map document")?;
        write_file(json_path, &json)?;
        info!(path = ?json_path, "wrote map document");
    }

    Ok(())
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory: {:?}", parent))?;
    }
    fs::write(path, contents).with_context(|| format!("Failed to write {:?}", path))
}
