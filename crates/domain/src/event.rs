use std::fmt;
use std::slice::Iter;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::muscle::Property;

/// Tag describing how a set was performed. Unknown tags in source data
/// degrade to [`SetType::Normal`] at ingestion instead of failing the row.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SetType {
    #[default]
    Normal,
    Warmup,
    Dropset,
    Failure,
    Amrap,
    RestPause,
    Myoreps,
    Cluster,
    GiantSet,
    Superset,
    Backoff,
}

impl Property for SetType {
    fn iter() -> Iter<'static, SetType> {
        static SET_TYPES: [SetType; 11] = [
            SetType::Normal,
            SetType::Warmup,
            SetType::Dropset,
            SetType::Failure,
            SetType::Amrap,
            SetType::RestPause,
            SetType::Myoreps,
            SetType::Cluster,
            SetType::GiantSet,
            SetType::Superset,
            SetType::Backoff,
        ];
        SET_TYPES.iter()
    }

    #[must_use]
    fn name(self) -> &'static str {
        match self {
            SetType::Normal => "Normal",
            SetType::Warmup => "Warmup",
            SetType::Dropset => "Dropset",
            SetType::Failure => "Failure",
            SetType::Amrap => "AMRAP",
            SetType::RestPause => "Rest-Pause",
            SetType::Myoreps => "Myoreps",
            SetType::Cluster => "Cluster",
            SetType::GiantSet => "Giant Set",
            SetType::Superset => "Superset",
            SetType::Backoff => "Backoff",
        }
    }
}

impl TryFrom<&str> for SetType {
    type Error = SetTypeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let tag = value
            .trim()
            .to_lowercase()
            .replace(['-', '_', ' '], "");
        match tag.as_str() {
            "normal" | "regular" | "working" | "work" => Ok(SetType::Normal),
            "warmup" => Ok(SetType::Warmup),
            "dropset" | "drop" => Ok(SetType::Dropset),
            "failure" | "tofailure" => Ok(SetType::Failure),
            "amrap" => Ok(SetType::Amrap),
            "restpause" => Ok(SetType::RestPause),
            "myoreps" | "myorep" | "myo" => Ok(SetType::Myoreps),
            "cluster" | "clusterset" => Ok(SetType::Cluster),
            "giantset" | "giant" => Ok(SetType::GiantSet),
            "superset" | "super" => Ok(SetType::Superset),
            "backoff" => Ok(SetType::Backoff),
            _ => Err(SetTypeError::Unknown(value.trim().to_string())),
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum SetTypeError {
    #[error("Unknown set type \"{0}\"")]
    Unknown(String),
}

/// Rating of perceived exertion, stored in tenths.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Serialize)]
pub struct Rpe(u8);

impl Rpe {
    pub fn new(value: f32) -> Result<Self, RpeError> {
        if !(0.0..=10.0).contains(&value) {
            return Err(RpeError::OutOfRange);
        }

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let v = (value * 10.0).round() as u8;

        if v % 5 != 0 {
            return Err(RpeError::InvalidResolution);
        }

        Ok(Self(v))
    }
}

impl From<Rpe> for f32 {
    fn from(value: Rpe) -> Self {
        f32::from(value.0) / 10.0
    }
}

impl TryFrom<&str> for Rpe {
    type Error = RpeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().parse::<f32>() {
            Ok(parsed_value) => Rpe::new(parsed_value),
            Err(_) => Err(RpeError::ParseError),
        }
    }
}

impl fmt::Display for Rpe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", f32::from(*self))
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum RpeError {
    #[error("RPE must be in the range 0.0 to 10.0")]
    OutOfRange,
    #[error("RPE must be a multiple of 0.5")]
    InvalidResolution,
    #[error("RPE must be a decimal")]
    ParseError,
}

/// One logged set, normalized to canonical units (kg, km, seconds).
///
/// Events are immutable after ingestion, apart from `exercise`, which the
/// identity resolver rewrites in place, and `is_personal_record`, which a
/// downstream pass may set.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TrainingEvent {
    pub title: String,
    pub start_raw: String,
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
    pub exercise: String,
    pub superset_id: Option<String>,
    pub set_index: u32,
    pub set_type: SetType,
    pub weight_kg: f32,
    pub reps: u32,
    pub distance_km: f32,
    pub duration_secs: u32,
    pub rpe: Option<Rpe>,
    pub notes: String,
    pub workout_notes: String,
    pub is_personal_record: Option<bool>,
}

impl TrainingEvent {
    #[must_use]
    pub fn date(&self) -> Option<NaiveDate> {
        self.start.map(|s| s.date())
    }

    #[must_use]
    pub fn is_working_set(&self) -> bool {
        self.set_type != SetType::Warmup
    }
}

impl Default for TrainingEvent {
    fn default() -> Self {
        Self {
            title: String::new(),
            start_raw: String::new(),
            start: None,
            end: None,
            exercise: String::new(),
            superset_id: None,
            set_index: 0,
            set_type: SetType::Normal,
            weight_kg: 0.0,
            reps: 0,
            distance_km: 0.0,
            duration_secs: 0,
            rpe: None,
            notes: String::new(),
            workout_notes: String::new(),
            is_personal_record: None,
        }
    }
}
