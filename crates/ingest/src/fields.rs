//! Schema-agnostic detection of what each CSV column means, driven by
//! synonym tables, bigram similarity, and validation of sampled values.

use std::collections::BTreeMap;

use serde::Serialize;

use ferrum_domain::event::SetType;
use ferrum_domain::units::{DistanceUnit, WeightUnit};

use crate::error::IngestError;
use crate::parse;

/// Weight of the header-text component of the final score.
const TEXT_WEIGHT: f32 = 0.6;
/// Weight of the sampled-value validation component.
const VALIDATION_WEIGHT: f32 = 0.4;
/// Minimum bigram similarity for a non-exact header match.
const SIMILARITY_THRESHOLD: f32 = 0.75;
/// Minimum final score for an assignment to be accepted.
const ACCEPTANCE_THRESHOLD: f32 = 0.5;

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticField {
    Exercise,
    StartTime,
    EndTime,
    Duration,
    SetIndex,
    SetType,
    Weight,
    WeightUnit,
    Reps,
    Distance,
    DistanceUnit,
    Rpe,
    Rir,
    Notes,
    WorkoutNotes,
    SupersetId,
    RestTime,
    WorkoutTitle,
}

struct FieldDescriptor {
    field: SemanticField,
    synonyms: &'static [&'static str],
    /// At most one header may be assigned to a unique field; non-unique
    /// fields (notes) may claim several columns or stay unmapped.
    unique: bool,
    priority: f32,
    validator: Option<fn(&[&str]) -> f32>,
}

static DESCRIPTORS: [FieldDescriptor; 18] = [
    FieldDescriptor {
        field: SemanticField::Exercise,
        synonyms: &[
            "exercise",
            "exercise name",
            "exercise title",
            "movement",
            "lift",
            "uebung",
            "übung",
            "ejercicio",
            "exercice",
        ],
        unique: true,
        priority: 1.0,
        validator: Some(text_ratio),
    },
    FieldDescriptor {
        field: SemanticField::StartTime,
        synonyms: &[
            "start time",
            "date",
            "start",
            "workout date",
            "started at",
            "start date",
            "datetime",
            "datum",
            "fecha",
        ],
        unique: true,
        priority: 1.0,
        validator: Some(date_ratio),
    },
    FieldDescriptor {
        field: SemanticField::EndTime,
        synonyms: &["end time", "end", "ended at", "finish time", "end date"],
        unique: true,
        priority: 0.9,
        validator: Some(date_ratio),
    },
    FieldDescriptor {
        field: SemanticField::Duration,
        synonyms: &["duration", "seconds", "duration seconds", "time", "set duration"],
        unique: true,
        priority: 0.8,
        validator: Some(duration_ratio),
    },
    FieldDescriptor {
        field: SemanticField::SetIndex,
        synonyms: &["set order", "set index", "set number", "set", "set no"],
        unique: true,
        priority: 0.9,
        validator: Some(set_index_ratio),
    },
    FieldDescriptor {
        field: SemanticField::SetType,
        synonyms: &["set type", "type", "set category"],
        unique: true,
        priority: 0.9,
        validator: Some(set_type_ratio),
    },
    FieldDescriptor {
        field: SemanticField::Weight,
        synonyms: &[
            "weight",
            "weight kg",
            "weight lbs",
            "load",
            "kg",
            "lbs",
            "gewicht",
            "peso",
        ],
        unique: true,
        priority: 1.0,
        validator: Some(weight_ratio),
    },
    FieldDescriptor {
        field: SemanticField::WeightUnit,
        synonyms: &["weight unit", "unit"],
        unique: true,
        priority: 0.8,
        validator: Some(weight_unit_ratio),
    },
    FieldDescriptor {
        field: SemanticField::Reps,
        synonyms: &["reps", "rep", "repetitions", "rep count", "wiederholungen"],
        unique: true,
        priority: 1.0,
        validator: Some(reps_ratio),
    },
    FieldDescriptor {
        field: SemanticField::Distance,
        synonyms: &["distance", "distance km", "distance meters", "meters", "miles"],
        unique: true,
        priority: 0.8,
        validator: Some(number_ratio),
    },
    FieldDescriptor {
        field: SemanticField::DistanceUnit,
        synonyms: &["distance unit"],
        unique: true,
        priority: 0.8,
        validator: Some(distance_unit_ratio),
    },
    FieldDescriptor {
        field: SemanticField::Rpe,
        synonyms: &["rpe", "effort", "intensity", "rating"],
        unique: true,
        priority: 0.9,
        validator: Some(rpe_ratio),
    },
    FieldDescriptor {
        field: SemanticField::Rir,
        synonyms: &["rir", "reps in reserve"],
        unique: true,
        priority: 0.9,
        validator: Some(rpe_ratio),
    },
    FieldDescriptor {
        field: SemanticField::Notes,
        synonyms: &["notes", "note", "comment", "comments", "exercise notes"],
        unique: false,
        priority: 0.7,
        validator: None,
    },
    FieldDescriptor {
        field: SemanticField::WorkoutNotes,
        synonyms: &["workout notes", "session notes", "description"],
        unique: false,
        priority: 0.7,
        validator: None,
    },
    FieldDescriptor {
        field: SemanticField::SupersetId,
        synonyms: &["superset id", "superset"],
        unique: true,
        priority: 0.8,
        validator: None,
    },
    FieldDescriptor {
        field: SemanticField::RestTime,
        synonyms: &["rest time", "rest", "rest seconds", "rest sec"],
        unique: true,
        priority: 0.8,
        validator: Some(duration_ratio),
    },
    FieldDescriptor {
        field: SemanticField::WorkoutTitle,
        synonyms: &[
            "workout name",
            "workout",
            "title",
            "routine",
            "session",
            "workout title",
        ],
        unique: true,
        priority: 0.9,
        validator: Some(text_ratio),
    },
];

/// One accepted header-to-field assignment.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FieldMapping {
    pub field: SemanticField,
    pub header: String,
    pub column: usize,
    pub score: f32,
}

/// The complete detection result for one CSV header row.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct FieldMap {
    columns: BTreeMap<SemanticField, Vec<usize>>,
    pub mappings: Vec<FieldMapping>,
    pub confidence: f32,
}

impl FieldMap {
    pub(crate) fn from_mappings(mappings: Vec<FieldMapping>, confidence: f32) -> Self {
        let mut columns: BTreeMap<SemanticField, Vec<usize>> = BTreeMap::new();
        for mapping in &mappings {
            columns.entry(mapping.field).or_default().push(mapping.column);
        }
        Self {
            columns,
            mappings,
            confidence,
        }
    }

    /// First column assigned to the field.
    #[must_use]
    pub fn column(&self, field: SemanticField) -> Option<usize> {
        self.columns.get(&field).and_then(|c| c.first().copied())
    }

    /// All columns assigned to the field (more than one only for non-unique
    /// fields).
    #[must_use]
    pub fn columns(&self, field: SemanticField) -> &[usize] {
        self.columns.get(&field).map_or(&[], Vec::as_slice)
    }
}

/// Infers the semantic meaning of every header from synonym tables, bigram
/// similarity, and validation of up to the sampled rows' values. Fails when
/// no column can mean "exercise", "date", or "weight".
pub fn detect_fields(headers: &[String], sample: &[Vec<String>]) -> Result<FieldMap, IngestError> {
    let normalized_headers: Vec<String> = headers.iter().map(|h| normalize(h)).collect();

    let mut candidates: Vec<(f32, usize, &FieldDescriptor)> = Vec::new();
    for (column, header) in normalized_headers.iter().enumerate() {
        if header.is_empty() {
            continue;
        }
        for spec in &DESCRIPTORS {
            if let Some(score) = score_candidate(header, column, spec, sample) {
                candidates.push((score, column, spec));
            }
        }
    }

    candidates.sort_by(|a, b| {
        b.0.partial_cmp(&a.0)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.1.cmp(&b.1))
            .then(a.2.field.cmp(&b.2.field))
    });

    let mut claimed_columns = vec![false; headers.len()];
    let mut claimed_fields: BTreeMap<SemanticField, usize> = BTreeMap::new();
    let mut mappings = Vec::new();

    for (score, column, spec) in candidates {
        if score <= ACCEPTANCE_THRESHOLD {
            continue;
        }
        if claimed_columns[column] {
            continue;
        }
        if spec.unique && claimed_fields.contains_key(&spec.field) {
            continue;
        }
        claimed_columns[column] = true;
        *claimed_fields.entry(spec.field).or_insert(0) += 1;
        mappings.push(FieldMapping {
            field: spec.field,
            header: headers[column].clone(),
            column,
            score,
        });
    }

    #[allow(clippy::cast_precision_loss)]
    let confidence = if mappings.is_empty() {
        0.0
    } else {
        mappings.iter().map(|m| m.score).sum::<f32>() / mappings.len() as f32
    };

    let map = FieldMap::from_mappings(mappings, confidence);

    if map.column(SemanticField::Exercise).is_none() {
        return Err(IngestError::MissingExerciseColumn);
    }
    if map.column(SemanticField::StartTime).is_none() {
        return Err(IngestError::MissingStartTimeColumn);
    }
    if map.column(SemanticField::Weight).is_none() {
        return Err(IngestError::MissingWeightColumn);
    }

    Ok(map)
}

fn score_candidate(
    header: &str,
    column: usize,
    spec: &FieldDescriptor,
    sample: &[Vec<String>],
) -> Option<f32> {
    let text_score = spec
        .synonyms
        .iter()
        .map(|synonym| {
            let synonym = normalize(synonym);
            if header == synonym {
                1.0
            } else {
                let similarity = dice_similarity(header, &synonym);
                if similarity > SIMILARITY_THRESHOLD {
                    similarity
                } else {
                    0.0
                }
            }
        })
        .fold(0.0_f32, f32::max);

    if text_score <= 0.0 {
        return None;
    }

    let validation_score = match spec.validator {
        Some(validator) => {
            let values: Vec<&str> = sample
                .iter()
                .filter_map(|row| row.get(column))
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .collect();
            if values.is_empty() {
                text_score
            } else {
                validator(&values)
            }
        }
        None => text_score,
    };

    Some((text_score * TEXT_WEIGHT + validation_score * VALIDATION_WEIGHT) * spec.priority)
}

/// Lowercases and reduces punctuation to spaces so that "Weight (kg)" and
/// "weight_kg" compare equal.
#[must_use]
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Dice coefficient over character bigrams.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn dice_similarity(a: &str, b: &str) -> f32 {
    if a == b {
        return 1.0;
    }

    let bigrams_a = bigrams(a);
    let bigrams_b = bigrams(b);
    if bigrams_a.is_empty() || bigrams_b.is_empty() {
        return 0.0;
    }

    let mut counts: BTreeMap<(char, char), usize> = BTreeMap::new();
    for bigram in &bigrams_a {
        *counts.entry(*bigram).or_insert(0) += 1;
    }

    let mut overlap = 0_usize;
    for bigram in &bigrams_b {
        if let Some(count) = counts.get_mut(bigram) {
            if *count > 0 {
                *count -= 1;
                overlap += 1;
            }
        }
    }

    2.0 * overlap as f32 / (bigrams_a.len() + bigrams_b.len()) as f32
}

fn bigrams(text: &str) -> Vec<(char, char)> {
    let chars: Vec<char> = text.chars().filter(|c| !c.is_whitespace()).collect();
    chars.windows(2).map(|w| (w[0], w[1])).collect()
}

#[allow(clippy::cast_precision_loss)]
fn ratio(values: &[&str], accept: impl Fn(&str) -> bool) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().filter(|v| accept(v)).count() as f32 / values.len() as f32
}

fn date_ratio(values: &[&str]) -> f32 {
    ratio(values, |v| parse::parse_datetime(v).is_some())
}

fn duration_ratio(values: &[&str]) -> f32 {
    ratio(values, |v| parse::parse_duration_secs(v).is_some())
}

fn number_ratio(values: &[&str]) -> f32 {
    ratio(values, |v| parse::parse_number(v).is_some())
}

fn weight_ratio(values: &[&str]) -> f32 {
    ratio(values, |v| {
        parse::parse_number(v).is_some_and(|n| (0.0..2000.0).contains(&n))
    })
}

fn reps_ratio(values: &[&str]) -> f32 {
    ratio(values, |v| {
        parse::parse_count(v).is_some_and(|n| n < 1000)
    })
}

fn set_index_ratio(values: &[&str]) -> f32 {
    ratio(values, |v| {
        parse::parse_count(v).is_some_and(|n| n < 100)
    })
}

fn rpe_ratio(values: &[&str]) -> f32 {
    ratio(values, |v| {
        parse::parse_number(v).is_some_and(|n| (0.0..=10.0).contains(&n))
    })
}

fn set_type_ratio(values: &[&str]) -> f32 {
    ratio(values, |v| SetType::try_from(v).is_ok())
}

fn weight_unit_ratio(values: &[&str]) -> f32 {
    ratio(values, |v| WeightUnit::try_from(v).is_ok())
}

fn distance_unit_ratio(values: &[&str]) -> f32 {
    ratio(values, |v| DistanceUnit::try_from(v).is_ok())
}

fn text_ratio(values: &[&str]) -> f32 {
    ratio(values, |v| {
        parse::parse_number(v).is_none() && parse::parse_datetime(v).is_none()
    })
}

#[cfg(test)]
mod tests {
    use assert_approx_eq::assert_approx_eq;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| (*n).to_string()).collect()
    }

    fn rows(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|row| row.iter().map(|v| (*v).to_string()).collect())
            .collect()
    }

    #[rstest]
    #[case("Weight (kg)", "weight kg")]
    #[case("weight_kg", "weight kg")]
    #[case("  Set   Order ", "set order")]
    #[case("RPE", "rpe")]
    fn test_normalize(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize(input), expected);
    }

    #[rstest]
    #[case("weight", "weight", 1.0)]
    #[case("night", "nacht", 0.25)]
    #[case("exercise", "exercises", 0.933_333)]
    #[case("a", "b", 0.0)]
    fn test_dice_similarity(#[case] a: &str, #[case] b: &str, #[case] expected: f32) {
        assert_approx_eq!(dice_similarity(a, b), expected, 1e-3);
    }

    fn detect(headers_list: &[&str], sample: &[&[&str]]) -> Result<FieldMap, IngestError> {
        detect_fields(&headers(headers_list), &rows(sample))
    }

    #[test]
    fn test_detect_fields_synonyms() {
        let map = detect(
            &["Movement", "Workout Date", "Load", "Rep Count"],
            &[&["Bench Press", "2024-03-17 18:30", "100", "8"]],
        )
        .unwrap();

        assert_eq!(map.column(SemanticField::Exercise), Some(0));
        assert_eq!(map.column(SemanticField::StartTime), Some(1));
        assert_eq!(map.column(SemanticField::Weight), Some(2));
        assert_eq!(map.column(SemanticField::Reps), Some(3));
        assert!(map.confidence > ACCEPTANCE_THRESHOLD);
    }

    #[test]
    fn test_detect_fields_similar_headers() {
        let map = detect(
            &["Exercises", "Date", "Weights", "Reps"],
            &[&["Squat", "2024-03-17", "120", "5"]],
        )
        .unwrap();

        assert_eq!(map.column(SemanticField::Exercise), Some(0));
        assert_eq!(map.column(SemanticField::Weight), Some(2));
    }

    #[test]
    fn test_detect_fields_missing_exercise() {
        let result = detect(
            &["Date", "Weight", "Reps"],
            &[&["2024-03-17", "100", "8"]],
        );

        assert!(matches!(result, Err(IngestError::MissingExerciseColumn)));
    }

    #[test]
    fn test_detect_fields_missing_date() {
        let result = detect(
            &["Exercise", "Weight", "Reps"],
            &[&["Bench Press", "100", "8"]],
        );

        assert!(matches!(result, Err(IngestError::MissingStartTimeColumn)));
    }

    #[test]
    fn test_detect_fields_missing_weight() {
        let result = detect(
            &["Exercise", "Date", "Reps"],
            &[&["Bench Press", "2024-03-17", "8"]],
        );

        assert!(matches!(result, Err(IngestError::MissingWeightColumn)));
    }

    #[test]
    fn test_detect_fields_unique_field_claimed_once() {
        let map = detect(
            &["Exercise", "Date", "Weight", "Weight (kg)", "Reps"],
            &[&["Bench Press", "2024-03-17", "100", "100", "8"]],
        )
        .unwrap();

        assert_eq!(map.columns(SemanticField::Weight).len(), 1);
    }

    #[test]
    fn test_detect_fields_validation_breaks_text_ties() {
        // Both columns could be "weight" by name; the sampled values decide.
        let map = detect(
            &["Exercise", "Date", "Weight", "Reps", "Unit"],
            &[
                &["Bench Press", "2024-03-17", "102.5", "8", "kg"],
                &["Bench Press", "2024-03-17", "102.5", "8", "kg"],
            ],
        )
        .unwrap();

        assert_eq!(map.column(SemanticField::Weight), Some(2));
        assert_eq!(map.column(SemanticField::WeightUnit), Some(4));
    }

    #[test]
    fn test_detect_fields_notes_allows_multiple_columns() {
        let map = detect(
            &["Exercise", "Date", "Weight", "Notes", "Comments"],
            &[&["Bench Press", "2024-03-17", "100", "solid", "easy"]],
        )
        .unwrap();

        assert_eq!(map.columns(SemanticField::Notes).len(), 2);
    }

    #[test]
    fn test_confidence_is_mean_of_accepted_scores() {
        let map = detect(
            &["Exercise", "Date", "Weight"],
            &[&["Bench Press", "2024-03-17", "100"]],
        )
        .unwrap();

        #[allow(clippy::cast_precision_loss)]
        let expected =
            map.mappings.iter().map(|m| m.score).sum::<f32>() / map.mappings.len() as f32;
        assert_approx_eq!(map.confidence, expected);
    }
}
