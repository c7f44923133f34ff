use crate::types::{BoundaryFeature, RawRecord};
use anyhow::{anyhow, Context, Result};
use csv::ReaderBuilder;
use geo::MultiPolygon;
use geojson::GeoJson;
use serde_json::{Map, Value};
use shapefile::Reader;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{debug, info};

pub fn load_table(path: &Path) -> Result<Vec<RawRecord>> {
    let file = File::open(path).with_context(|| format!("Failed to open CSV file: {:?}", path))?;
    let table = read_table(file).with_context(|| format!("Failed to read CSV file: {:?}", path))?;
    info!(path = ?path, rows = table.len(), "loaded table");
    Ok(table)
}

/// Reads a CSV table. The first row is the header; blank cells stay blank and
/// are treated as missing downstream.
pub fn read_table<R: Read>(reader: R) -> Result<Vec<RawRecord>> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = rdr.headers()?.clone();

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        rows.push(RawRecord::from_pairs(headers.iter().zip(record.iter())));
    }
    Ok(rows)
}

/// Loads boundary polygons from GeoJSON or a Shapefile, picked by extension.
pub fn load_boundaries(path: &Path, name_field: &str) -> Result<Vec<BoundaryFeature>> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|s: &str| s.to_lowercase())
        .ok_or_else(|| anyhow!("Boundary file has no extension: {:?}", path))?;

    let features = match extension.as_str() {
        "json" | "geojson" => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open GeoJSON file: {:?}", path))?;
            read_geojson(BufReader::new(file))
                .with_context(|| format!("Failed to parse GeoJSON file: {:?}", path))?
        }
        "shp" => load_shapefile(path, name_field)?,
        _ => return Err(anyhow!("Unsupported boundary format: {}", extension)),
    };

    info!(path = ?path, features = features.len(), "loaded boundaries");
    Ok(features)
}

/// Reads a FeatureCollection. Features without geometry have nothing to draw
/// and are skipped.
pub fn read_geojson<R: Read>(reader: R) -> Result<Vec<BoundaryFeature>> {
    let geojson = GeoJson::from_reader(reader).context("Failed to parse GeoJSON")?;

    let collection = match geojson {
        GeoJson::FeatureCollection(fc) => fc,
        _ => return Err(anyhow!("Boundary GeoJSON must be a FeatureCollection")),
    };

    let mut features = Vec::with_capacity(collection.features.len());
    for (index, feature) in collection.features.into_iter().enumerate() {
        let Some(geometry) = feature.geometry else {
            debug!(index, "skipping boundary feature without geometry");
            continue;
        };
        features.push(BoundaryFeature {
            geometry,
            properties: feature.properties.unwrap_or_default(),
        });
    }
    Ok(features)
}

/// Reads polygon shapes and the `name_field` column of the dBase table.
fn load_shapefile(path: &Path, name_field: &str) -> Result<Vec<BoundaryFeature>> {
    let mut reader = Reader::from_path(path)
        .with_context(|| format!("Failed to open Shapefile: {:?}", path))?;

    let mut features = Vec::new();

    for result in reader.iter_shapes_and_records() {
        let (shape, record) = result?;

        let polygon: MultiPolygon<f64> = match shape {
            shapefile::Shape::Polygon(polygon) => polygon
                .try_into()
                .map_err(|e| anyhow!("Failed to convert polygon: {:?}", e))?,
            shapefile::Shape::PolygonM(polygon) => polygon
                .try_into()
                .map_err(|e| anyhow!("Failed to convert polygonM: {:?}", e))?,
            shapefile::Shape::PolygonZ(polygon) => polygon
                .try_into()
                .map_err(|e| anyhow!("Failed to convert polygonZ: {:?}", e))?,
            _ => continue,
        };

        let mut properties = Map::new();
        if let Some(value) = record.get(name_field).and_then(field_to_json) {
            properties.insert(name_field.to_string(), value);
        }

        features.push(BoundaryFeature {
            geometry: geojson::Geometry::new(geojson::Value::from(&polygon)),
            properties,
        });
    }

    Ok(features)
}

fn field_to_json(value: &shapefile::dbase::FieldValue) -> Option<Value> {
    use shapefile::dbase::FieldValue;

    match value {
        FieldValue::Character(Some(s)) => Some(Value::String(s.trim().to_string())),
        FieldValue::Memo(s) => Some(Value::String(s.trim().to_string())),
        FieldValue::Numeric(Some(n)) => serde_json::Number::from_f64(*n).map(Value::Number),
        FieldValue::Integer(i) => Some(Value::from(*i)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_table_with_inconsistent_headers() {
        let csv = "Sl No, latitude ,LONGITUDE,District,SETTLEMENT / VILLAGE\n\
                   1,26°50'12.0\",81°15'30\",Balrampur,X\n\
                   2,,81°0'0\",Gonda,Y\n";
        let rows = read_table(csv.as_bytes()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("LATITUDE"), Some("26°50'12.0\""));
        assert_eq!(rows[0].get("SETTLEMENT / VILLAGE"), Some("X"));
        assert_eq!(rows[1].get("LATITUDE"), Some(""));
    }

    #[test]
    fn reads_short_rows() {
        let csv = "LATITUDE,LONGITUDE,DISTRICT\n26°0'0\",80°0'0\"\n";
        let rows = read_table(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("DISTRICT"), None);
    }

    #[test]
    fn reads_feature_collection_and_skips_null_geometry() {
        let json = r#"{
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "properties": { "district": "Balrampur" },
                    "geometry": { "type": "Polygon", "coordinates": [[[81.0, 26.0], [82.0, 26.0], [82.0, 27.0], [81.0, 26.0]]] }
                },
                {
                    "type": "Feature",
                    "properties": null,
                    "geometry": { "type": "MultiPolygon", "coordinates": [[[[80.0, 26.0], [81.0, 26.0], [81.0, 27.0], [80.0, 26.0]]]] }
                },
                { "type": "Feature", "properties": { "district": "Nowhere" }, "geometry": null }
            ]
        }"#;
        let features = read_geojson(json.as_bytes()).unwrap();

        assert_eq!(features.len(), 2);
        assert_eq!(features[0].attribute("district"), Ok("Balrampur".to_string()));
        assert!(features[1].properties.is_empty());
    }

    #[test]
    fn rejects_bare_geometry() {
        let json = r#"{ "type": "Point", "coordinates": [81.0, 26.0] }"#;
        assert!(read_geojson(json.as_bytes()).is_err());
    }

    #[test]
    fn rejects_unknown_extension() {
        let err = load_boundaries(Path::new("districts.kml"), "district").unwrap_err();
        assert!(err.to_string().contains("Unsupported boundary format"));
    }
}
