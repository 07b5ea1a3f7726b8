//! Fixed-schema fast paths for the two known exporters. Both are recognized
//! by exact required-header match before semantic detection runs, and both
//! feed the same [`FieldMap`] so that row conversion stays a single
//! algorithm.

use serde::Serialize;

use crate::fields::{FieldMap, FieldMapping, SemanticField};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LegacyFormat {
    Hevy,
    Strong,
}

struct LegacySchema {
    format: LegacyFormat,
    required: &'static [&'static str],
    columns: &'static [(&'static str, SemanticField)],
}

static SCHEMAS: [LegacySchema; 2] = [
    LegacySchema {
        format: LegacyFormat::Hevy,
        required: &[
            "title",
            "start_time",
            "exercise_title",
            "set_index",
            "set_type",
            "weight_kg",
            "reps",
        ],
        columns: &[
            ("title", SemanticField::WorkoutTitle),
            ("start_time", SemanticField::StartTime),
            ("end_time", SemanticField::EndTime),
            ("description", SemanticField::WorkoutNotes),
            ("exercise_title", SemanticField::Exercise),
            ("superset_id", SemanticField::SupersetId),
            ("exercise_notes", SemanticField::Notes),
            ("set_index", SemanticField::SetIndex),
            ("set_type", SemanticField::SetType),
            ("weight_kg", SemanticField::Weight),
            ("reps", SemanticField::Reps),
            ("distance_km", SemanticField::Distance),
            ("duration_seconds", SemanticField::Duration),
            ("rpe", SemanticField::Rpe),
        ],
    },
    LegacySchema {
        format: LegacyFormat::Strong,
        required: &[
            "Date",
            "Workout Name",
            "Exercise Name",
            "Set Order",
            "Weight",
            "Reps",
        ],
        columns: &[
            ("Date", SemanticField::StartTime),
            ("Workout Name", SemanticField::WorkoutTitle),
            ("Exercise Name", SemanticField::Exercise),
            ("Set Order", SemanticField::SetIndex),
            ("Weight", SemanticField::Weight),
            ("Weight Unit", SemanticField::WeightUnit),
            ("Reps", SemanticField::Reps),
            ("Distance", SemanticField::Distance),
            ("Distance Unit", SemanticField::DistanceUnit),
            ("Seconds", SemanticField::Duration),
            ("Notes", SemanticField::Notes),
            ("Workout Notes", SemanticField::WorkoutNotes),
            ("RPE", SemanticField::Rpe),
        ],
    },
];

/// Matches the header row against the known fixed schemas. Every required
/// header must be present verbatim (after trimming).
#[must_use]
pub fn detect_legacy(headers: &[String]) -> Option<(LegacyFormat, FieldMap)> {
    for schema in &SCHEMAS {
        if !schema
            .required
            .iter()
            .all(|required| headers.iter().any(|h| h == required))
        {
            continue;
        }

        let mappings: Vec<FieldMapping> = schema
            .columns
            .iter()
            .filter_map(|(name, field)| {
                headers.iter().position(|h| h == name).map(|column| FieldMapping {
                    field: *field,
                    header: headers[column].clone(),
                    column,
                    score: 1.0,
                })
            })
            .collect();

        return Some((schema.format, FieldMap::from_mappings(mappings, 1.0)));
    }
    None
}
