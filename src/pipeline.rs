use crate::boundary::build_boundary_overlay;
use crate::compose::compose;
use crate::config::AppConfig;
use crate::data;
use crate::layers::{build_layers, DatasetStyle};
use crate::processing::normalize_with_report;
use crate::types::{BoundaryFeature, MapDocument, RawRecord};
use anyhow::{anyhow, Result};
use rayon::prelude::*;
use tracing::{info, warn};

/// Reads every dataset table, in config order.
pub fn load_tables(config: &AppConfig) -> Result<Vec<Vec<RawRecord>>> {
    config
        .datasets
        .iter()
        .map(|dataset| data::load_table(&dataset.path))
        .collect()
}

pub fn load_boundaries(config: &AppConfig) -> Result<Vec<BoundaryFeature>> {
    data::load_boundaries(&config.boundary.path, &config.boundary.name_field)
}

/// Runs normalization, layer building and composition over already-loaded
/// inputs. `tables` lines up with `config.datasets`.
pub fn build_document(
    config: &AppConfig,
    tables: Vec<Vec<RawRecord>>,
    features: Vec<BoundaryFeature>,
) -> Result<MapDocument> {
    config.validate()?;
    if tables.len() != config.datasets.len() {
        return Err(anyhow!(
            "Expected {} tables, got {}",
            config.datasets.len(),
            tables.len()
        ));
    }

    // Tables are independent, so they normalize in parallel.
    let normalized: Vec<_> = tables
        .par_iter()
        .map(|table| normalize_with_report(table, &config.aliases))
        .collect();

    let mut data_layers = Vec::new();
    for (dataset, (records, report)) in config.datasets.iter().zip(normalized) {
        if report.dropped() > 0 {
            warn!(
                dataset = %dataset.name,
                missing_coordinate = report.missing_coordinate,
                parse_failure = report.parse_failure,
                out_of_range = report.out_of_range,
                "dropped records without a usable position"
            );
        }
        info!(dataset = %dataset.name, records = report.kept, "normalized dataset");

        let style = DatasetStyle {
            marker: dataset.marker_style()?,
            heat: dataset.heat_style()?,
        };
        data_layers.extend(build_layers(
            &dataset.name,
            &records,
            dataset.kind,
            &style,
            &config.aliases,
        )?);
    }

    let boundary_style = config.boundary.style.to_style()?;
    let overlay = build_boundary_overlay(
        &config.boundary.layer_name,
        features,
        &config.boundary.name_field,
        &boundary_style,
    );

    Ok(compose(&config.map, overlay, data_layers))
}
