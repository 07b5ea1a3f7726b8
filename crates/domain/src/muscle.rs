use std::slice::Iter;

use serde::Serialize;

/// Common interface of the closed property enums (muscle groups, set types).
pub trait Property: Clone + Copy + Sized {
    fn iter() -> Iter<'static, Self>;
    fn name(self) -> &'static str;
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MuscleGroup {
    Chest,
    Back,
    Shoulders,
    Biceps,
    Triceps,
    Forearms,
    Core,
    Glutes,
    Quads,
    Hamstrings,
    Calves,
    Other,
}

impl Property for MuscleGroup {
    fn iter() -> Iter<'static, MuscleGroup> {
        static GROUPS: [MuscleGroup; 11] = [
            MuscleGroup::Chest,
            MuscleGroup::Back,
            MuscleGroup::Shoulders,
            MuscleGroup::Biceps,
            MuscleGroup::Triceps,
            MuscleGroup::Forearms,
            MuscleGroup::Core,
            MuscleGroup::Glutes,
            MuscleGroup::Quads,
            MuscleGroup::Hamstrings,
            MuscleGroup::Calves,
        ];
        GROUPS.iter()
    }

    #[must_use]
    fn name(self) -> &'static str {
        match self {
            MuscleGroup::Chest => "Chest",
            MuscleGroup::Back => "Back",
            MuscleGroup::Shoulders => "Shoulders",
            MuscleGroup::Biceps => "Biceps",
            MuscleGroup::Triceps => "Triceps",
            MuscleGroup::Forearms => "Forearms",
            MuscleGroup::Core => "Core",
            MuscleGroup::Glutes => "Glutes",
            MuscleGroup::Quads => "Quads",
            MuscleGroup::Hamstrings => "Hamstrings",
            MuscleGroup::Calves => "Calves",
            MuscleGroup::Other => "Other",
        }
    }
}

/// Keyword patterns per group, in match order. New synonyms are added here,
/// not as code branches. Shoulder patterns precede the back patterns so that
/// "lateral deltoid" is never claimed by "lat".
static GROUP_PATTERNS: [(MuscleGroup, &[&str]); 11] = [
    (MuscleGroup::Shoulders, &["shoulder", "delt"]),
    (MuscleGroup::Chest, &["chest", "pec"]),
    (
        MuscleGroup::Back,
        &[
            "lats",
            "latissimus",
            "upper back",
            "lower back",
            "trap",
            "rhomboid",
            "erector",
            "back",
        ],
    ),
    (MuscleGroup::Biceps, &["bicep"]),
    (MuscleGroup::Triceps, &["tricep"]),
    (
        MuscleGroup::Forearms,
        &["forearm", "brachio", "grip", "wrist"],
    ),
    (
        MuscleGroup::Core,
        &["abdominal", "abs", "oblique", "core", "serratus"],
    ),
    (
        MuscleGroup::Quads,
        &["quad", "adductor", "thigh", "hip flexor"],
    ),
    (MuscleGroup::Glutes, &["glute", "abductor", "hip"]),
    (MuscleGroup::Hamstrings, &["hamstring"]),
    (
        MuscleGroup::Calves,
        &["calf", "calves", "soleus", "gastrocnemius", "shin", "tibialis"],
    ),
];

static CARDIO_PATTERNS: [&str; 3] = ["cardio", "conditioning", "aerobic"];

static FULL_BODY_PATTERNS: [&str; 4] =
    ["full body", "full-body", "total body", "whole body"];

/// Maps a free-text muscle name to its group. Empty input maps to nothing,
/// unknown text to [`MuscleGroup::Other`].
#[must_use]
pub fn muscle_group(text: &str) -> Option<MuscleGroup> {
    let text = text.trim().to_lowercase();
    if text.is_empty() {
        return None;
    }
    for (group, patterns) in &GROUP_PATTERNS {
        if patterns.iter().any(|p| text.contains(p)) {
            return Some(*group);
        }
    }
    Some(MuscleGroup::Other)
}

#[must_use]
pub fn is_cardio(text: &str) -> bool {
    let text = text.trim().to_lowercase();
    CARDIO_PATTERNS.iter().any(|p| text.contains(p))
}

#[must_use]
pub fn is_full_body(text: &str) -> bool {
    let text = text.trim().to_lowercase();
    FULL_BODY_PATTERNS.iter().any(|p| text.contains(p))
}

/// Key under which an individual muscle is reported in the detailed
/// (non-grouped) volume path.
#[must_use]
pub fn muscle_key(text: &str) -> Option<String> {
    let key = text.trim().to_lowercase();
    if key.is_empty() { None } else { Some(key) }
}
