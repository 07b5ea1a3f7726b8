//! Conversion of raw CSV rows into [`TrainingEvent`]s. Every value degrades
//! locally: a malformed cell becomes a default, never a failed batch.

use std::collections::HashMap;

use ferrum_domain::event::{Rpe, SetType, TrainingEvent};
use ferrum_domain::units::{DistanceUnit, WeightUnit};

use crate::fields::{self, FieldMap, SemanticField};
use crate::parse;
use crate::IngestOptions;

/// Date-parse bookkeeping for the localization heuristic.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DateStats {
    /// Rows that carried a non-empty date string.
    pub dated: usize,
    /// Rows whose date string parsed.
    pub parsed: usize,
}

pub(crate) fn convert_rows(
    rows: &[Vec<String>],
    headers: &[String],
    map: &FieldMap,
    options: &IngestOptions,
) -> (Vec<TrainingEvent>, DateStats) {
    let weight_header_unit = map
        .column(SemanticField::Weight)
        .and_then(|c| header_weight_unit(&headers[c]));
    let distance_header_unit = map
        .column(SemanticField::Distance)
        .and_then(|c| header_distance_unit(&headers[c]));

    let mut stats = DateStats::default();
    let mut set_counters: HashMap<(String, String), u32> = HashMap::new();
    let mut events = Vec::with_capacity(rows.len());

    for row in rows {
        let exercise = value(row, map.column(SemanticField::Exercise));
        if exercise.is_empty() {
            continue;
        }

        let start_raw = value(row, map.column(SemanticField::StartTime));
        let start = parse::parse_datetime(start_raw);
        if !start_raw.is_empty() {
            stats.dated += 1;
            if start.is_some() {
                stats.parsed += 1;
            }
        }

        let title = value(row, map.column(SemanticField::WorkoutTitle));

        // Header-encoded unit > sibling unit column > caller preference.
        let weight_unit = weight_header_unit
            .or_else(|| {
                WeightUnit::try_from(value(row, map.column(SemanticField::WeightUnit))).ok()
            })
            .unwrap_or(options.preferred_weight_unit);
        let distance_unit = distance_header_unit
            .or_else(|| {
                DistanceUnit::try_from(value(row, map.column(SemanticField::DistanceUnit))).ok()
            })
            .unwrap_or(options.preferred_distance_unit);

        let weight_kg = parse::parse_number(value(row, map.column(SemanticField::Weight)))
            .map_or(0.0, |w| weight_unit.to_kg(w))
            .max(0.0);
        let distance_km = parse::parse_number(value(row, map.column(SemanticField::Distance)))
            .map_or(0.0, |d| distance_unit.to_km(d))
            .max(0.0);

        let set_index = parse::parse_count(value(row, map.column(SemanticField::SetIndex)))
            .unwrap_or_else(|| {
                let counter = set_counters
                    .entry((start_raw.to_string(), exercise.to_string()))
                    .or_insert(0);
                let index = *counter;
                *counter += 1;
                index
            });

        let rpe = Rpe::try_from(value(row, map.column(SemanticField::Rpe)))
            .ok()
            .or_else(|| {
                parse::parse_number(value(row, map.column(SemanticField::Rir)))
                    .and_then(|rir| Rpe::new((10.0 - rir).clamp(0.0, 10.0)).ok())
            });

        let superset_id = value(row, map.column(SemanticField::SupersetId));

        events.push(TrainingEvent {
            title: title.to_string(),
            start_raw: start_raw.to_string(),
            start,
            end: parse::parse_datetime(value(row, map.column(SemanticField::EndTime))),
            exercise: exercise.to_string(),
            superset_id: (!superset_id.is_empty()).then(|| superset_id.to_string()),
            set_index,
            set_type: SetType::try_from(value(row, map.column(SemanticField::SetType)))
                .unwrap_or_default(),
            weight_kg,
            reps: parse::parse_count(value(row, map.column(SemanticField::Reps))).unwrap_or(0),
            distance_km,
            duration_secs: parse::parse_duration_secs(value(
                row,
                map.column(SemanticField::Duration),
            ))
            .unwrap_or(0),
            rpe,
            notes: join_columns(row, map.columns(SemanticField::Notes)),
            workout_notes: join_columns(row, map.columns(SemanticField::WorkoutNotes)),
            is_personal_record: None,
        });
    }

    (events, stats)
}

fn value<'a>(row: &'a [String], column: Option<usize>) -> &'a str {
    column
        .and_then(|c| row.get(c))
        .map_or("", |v| v.trim())
}

fn join_columns(row: &[String], columns: &[usize]) -> String {
    columns
        .iter()
        .filter_map(|c| row.get(*c))
        .map(|s| s.trim())
        .filter(|v| !v.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn header_weight_unit(header: &str) -> Option<WeightUnit> {
    fields::normalize(header)
        .split_whitespace()
        .find_map(|token| WeightUnit::try_from(token).ok())
}

fn header_distance_unit(header: &str) -> Option<DistanceUnit> {
    fields::normalize(header)
        .split_whitespace()
        .find_map(|token| DistanceUnit::try_from(token).ok())
}
