use crate::config::FieldAliases;
use crate::dms::parse_dms;
use crate::types::{GeoRecord, RawRecord};
use tracing::debug;

/// Why a record did not make it into the normalized output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Latitude or longitude is absent or blank.
    MissingCoordinate,
    /// A coordinate is present but is not a `D°M'S` value.
    ParseFailure,
    /// Parsed, but not a position on the globe.
    OutOfRange,
}

/// Per-reason drop counts for one table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeReport {
    pub kept: usize,
    pub missing_coordinate: usize,
    pub parse_failure: usize,
    pub out_of_range: usize,
}

impl NormalizeReport {
    fn record(&mut self, rejection: Rejection) {
        match rejection {
            Rejection::MissingCoordinate => self.missing_coordinate += 1,
            Rejection::ParseFailure => self.parse_failure += 1,
            Rejection::OutOfRange => self.out_of_range += 1,
        }
    }

    pub fn dropped(&self) -> usize {
        self.missing_coordinate + self.parse_failure + self.out_of_range
    }
}

/// Turns one raw row into a geolocated record.
pub fn geolocate(record: &RawRecord, aliases: &FieldAliases) -> Result<GeoRecord, Rejection> {
    let (Some(lat_raw), Some(lon_raw)) = (
        record.get_any(&aliases.latitude),
        record.get_any(&aliases.longitude),
    ) else {
        return Err(Rejection::MissingCoordinate);
    };

    let (Some(lat), Some(lon)) = (parse_dms(lat_raw), parse_dms(lon_raw)) else {
        return Err(Rejection::ParseFailure);
    };

    // `contains` is false for NaN; infinities fall outside the bounds.
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return Err(Rejection::OutOfRange);
    }

    Ok(GeoRecord {
        record: record.clone(),
        lat_decimal: lat,
        lon_decimal: lon,
    })
}

/// Keeps the rows whose coordinates parse, in input order.
pub fn normalize(table: &[RawRecord], aliases: &FieldAliases) -> Vec<GeoRecord> {
    normalize_with_report(table, aliases).0
}

pub fn normalize_with_report(
    table: &[RawRecord],
    aliases: &FieldAliases,
) -> (Vec<GeoRecord>, NormalizeReport) {
    let mut report = NormalizeReport::default();
    let mut records = Vec::with_capacity(table.len());

    for (row, raw) in table.iter().enumerate() {
        match geolocate(raw, aliases) {
            Ok(record) => records.push(record),
            Err(rejection) => {
                debug!(row, ?rejection, "dropping record");
                report.record(rejection);
            }
        }
    }

    report.kept = records.len();
    (records, report)
}
