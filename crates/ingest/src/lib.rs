#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

pub mod convert;
pub mod error;
pub mod fields;
pub mod legacy;
pub mod parse;

use log::{debug, warn};
use serde::Serialize;

use ferrum_domain::catalog::Catalog;
use ferrum_domain::event::TrainingEvent;
use ferrum_domain::resolver::{ExerciseResolver, FuzzyMode};
use ferrum_domain::units::{DistanceUnit, WeightUnit};

pub use convert::DateStats;
pub use error::IngestError;
pub use fields::{FieldMap, FieldMapping, SemanticField};
pub use legacy::LegacyFormat;

/// Aggregate confidence below this value adds a warning to the result; it
/// never fails the ingestion.
pub const LOW_CONFIDENCE_THRESHOLD: f32 = 0.6;

/// The date-localization heuristic only fires once this many rows carry a
/// date string.
const MIN_DATED_ROWS: usize = 5;

/// Caller-supplied ingestion configuration.
#[derive(Clone, Copy, Debug)]
pub struct IngestOptions {
    /// Assumed weight unit when neither the header nor a unit column says.
    pub preferred_weight_unit: WeightUnit,
    /// Assumed distance unit when neither the header nor a unit column says.
    pub preferred_distance_unit: DistanceUnit,
    pub fuzzy_mode: FuzzyMode,
    /// Number of rows sampled for field-detection validation.
    pub sample_size: usize,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            preferred_weight_unit: WeightUnit::Kg,
            preferred_distance_unit: DistanceUnit::Km,
            fuzzy_mode: FuzzyMode::Strict,
            sample_size: 50,
        }
    }
}

/// Everything the caller needs to know about an ingestion besides the events
/// themselves.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct IngestMeta {
    pub confidence: f32,
    pub field_mappings: Vec<FieldMapping>,
    pub unmatched_exercises: Vec<String>,
    pub fuzzy_matches: usize,
    pub representative_matches: Vec<(String, String)>,
    pub row_count: usize,
    pub warnings: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Ingestion {
    pub events: Vec<TrainingEvent>,
    pub meta: IngestMeta,
}

/// Compares comma, semicolon, and tab counts in the first line; the most
/// frequent wins, comma on ties.
#[must_use]
pub fn detect_delimiter(first_line: &str) -> u8 {
    let comma = first_line.matches(',').count();
    let semicolon = first_line.matches(';').count();
    let tab = first_line.matches('\t').count();

    if tab > comma && tab > semicolon {
        b'\t'
    } else if semicolon > comma {
        b';'
    } else {
        b','
    }
}

/// Ingests raw CSV text into resolved [`TrainingEvent`]s.
///
/// The two legacy fixed schemas are tried first; everything else goes through
/// semantic field detection. Exercise names are rewritten in place against
/// the catalog; unresolved names pass through unchanged and are reported in
/// the metadata.
pub fn ingest(
    text: &str,
    catalog: &Catalog,
    options: &IngestOptions,
) -> Result<Ingestion, IngestError> {
    let text = text.trim_start_matches('\u{feff}').trim();
    if text.is_empty() {
        return Err(IngestError::EmptyInput);
    }

    let delimiter = detect_delimiter(text.lines().next().unwrap_or_default());
    debug!("detected delimiter {:?}", char::from(delimiter));

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    if headers.iter().filter(|h| !h.is_empty()).count() < 2 {
        return Err(IngestError::UnrecognizedFormat);
    }

    let mut rows: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(String::from).collect());
    }

    let mut warnings = Vec::new();

    let field_map = match legacy::detect_legacy(&headers) {
        Some((format, map)) => {
            debug!("recognized fixed {format:?} schema");
            map
        }
        None => {
            let sample: Vec<Vec<String>> = rows.iter().take(options.sample_size).cloned().collect();
            fields::detect_fields(&headers, &sample)?
        }
    };

    let (mut events, date_stats) = convert::convert_rows(&rows, &headers, &field_map, options);

    if date_stats.dated >= MIN_DATED_ROWS && date_stats.parsed * 2 < date_stats.dated {
        return Err(IngestError::UnparseableDates {
            dated: date_stats.dated,
            parsed: date_stats.parsed,
        });
    }
    if date_stats.parsed < date_stats.dated {
        warnings.push(format!(
            "{} of {} dates could not be parsed",
            date_stats.dated - date_stats.parsed,
            date_stats.dated
        ));
    }

    let mut resolver = ExerciseResolver::with_mode(catalog, options.fuzzy_mode);
    let resolution = resolver.resolve_events(&mut events);

    if field_map.confidence < LOW_CONFIDENCE_THRESHOLD {
        warn!(
            "field detection confidence is low ({:.2})",
            field_map.confidence
        );
        warnings.push(format!(
            "Column detection confidence is low ({:.0}%); review the imported data",
            field_map.confidence * 100.0
        ));
    }

    Ok(Ingestion {
        events,
        meta: IngestMeta {
            confidence: field_map.confidence,
            field_mappings: field_map.mappings,
            unmatched_exercises: resolution.unmatched,
            fuzzy_matches: resolution.fuzzy_matches,
            representative_matches: resolution.representative_matches,
            row_count: rows.len(),
            warnings,
        },
    })
}
