use std::fmt;

use serde::Serialize;

const KG_PER_LB: f32 = 0.453_592_37;
const KM_PER_MI: f32 = 1.609_344;
const KM_PER_M: f32 = 0.001;

/// Source unit of a weight value. Values are stored in kilograms, conversion
/// happens exactly once at ingestion.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightUnit {
    #[default]
    Kg,
    Lbs,
}

impl WeightUnit {
    #[must_use]
    pub fn to_kg(self, value: f32) -> f32 {
        match self {
            WeightUnit::Kg => value,
            WeightUnit::Lbs => value * KG_PER_LB,
        }
    }

    #[must_use]
    pub fn from_kg(self, value: f32) -> f32 {
        match self {
            WeightUnit::Kg => value,
            WeightUnit::Lbs => value / KG_PER_LB,
        }
    }
}

impl TryFrom<&str> for WeightUnit {
    type Error = UnitError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().trim_matches(['(', ')', '[', ']']).to_lowercase().as_str() {
            "kg" | "kgs" | "kilogram" | "kilograms" => Ok(WeightUnit::Kg),
            "lb" | "lbs" | "pound" | "pounds" => Ok(WeightUnit::Lbs),
            _ => Err(UnitError::UnknownWeightUnit(value.trim().to_string())),
        }
    }
}

impl fmt::Display for WeightUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeightUnit::Kg => write!(f, "kg"),
            WeightUnit::Lbs => write!(f, "lbs"),
        }
    }
}

/// Source unit of a distance value, stored canonically in kilometers.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceUnit {
    #[default]
    Km,
    Mi,
    M,
}

impl DistanceUnit {
    #[must_use]
    pub fn to_km(self, value: f32) -> f32 {
        match self {
            DistanceUnit::Km => value,
            DistanceUnit::Mi => value * KM_PER_MI,
            DistanceUnit::M => value * KM_PER_M,
        }
    }

    #[must_use]
    pub fn from_km(self, value: f32) -> f32 {
        match self {
            DistanceUnit::Km => value,
            DistanceUnit::Mi => value / KM_PER_MI,
            DistanceUnit::M => value / KM_PER_M,
        }
    }
}

impl TryFrom<&str> for DistanceUnit {
    type Error = UnitError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().trim_matches(['(', ')', '[', ']']).to_lowercase().as_str() {
            "km" | "kms" | "kilometer" | "kilometers" | "kilometre" | "kilometres" => {
                Ok(DistanceUnit::Km)
            }
            "mi" | "mile" | "miles" => Ok(DistanceUnit::Mi),
            "m" | "meter" | "meters" | "metre" | "metres" => Ok(DistanceUnit::M),
            _ => Err(UnitError::UnknownDistanceUnit(value.trim().to_string())),
        }
    }
}

impl fmt::Display for DistanceUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DistanceUnit::Km => write!(f, "km"),
            DistanceUnit::Mi => write!(f, "mi"),
            DistanceUnit::M => write!(f, "m"),
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum UnitError {
    #[error("Unknown weight unit \"{0}\"")]
    UnknownWeightUnit(String),
    #[error("Unknown distance unit \"{0}\"")]
    UnknownDistanceUnit(String),
}
