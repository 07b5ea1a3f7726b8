use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;

use crate::muscle::{self, MuscleGroup, Property};

/// Set-equivalent contributed by an exercise's primary muscle.
pub const PRIMARY_SET: f32 = 1.0;
/// Set-equivalent contributed by each secondary muscle.
pub const SECONDARY_SET: f32 = 0.5;

/// One canonical exercise as supplied by the external exercise-asset catalog.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatalogEntry {
    pub name: String,
    pub equipment: Option<String>,
    pub primary_muscle: Option<String>,
    pub secondary_muscles: Vec<String>,
    pub media: Option<String>,
}

impl CatalogEntry {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.trim().to_string(),
            equipment: None,
            primary_muscle: None,
            secondary_muscles: Vec::new(),
            media: None,
        }
    }

    /// Builds an entry from the catalog's external form, where secondary
    /// muscles are a comma list and the literal token "None" means empty.
    #[must_use]
    pub fn from_parts(
        name: &str,
        equipment: Option<&str>,
        primary_muscle: Option<&str>,
        secondary_muscle: Option<&str>,
        media: Option<&str>,
    ) -> Self {
        Self {
            name: name.trim().to_string(),
            equipment: equipment
                .map(str::trim)
                .filter(|e| !e.is_empty())
                .map(String::from),
            primary_muscle: primary_muscle
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(String::from),
            secondary_muscles: split_muscle_list(secondary_muscle.unwrap_or_default()),
            media: media
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(String::from),
        }
    }
}

impl<'de> Deserialize<'de> for CatalogEntry {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            name: String,
            equipment: Option<String>,
            primary_muscle: Option<String>,
            secondary_muscle: Option<String>,
            media: Option<String>,
        }

        let raw = Raw::deserialize(deserializer)?;
        Ok(CatalogEntry::from_parts(
            &raw.name,
            raw.equipment.as_deref(),
            raw.primary_muscle.as_deref(),
            raw.secondary_muscle.as_deref(),
            raw.media.as_deref(),
        ))
    }
}

fn split_muscle_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty() && !m.eq_ignore_ascii_case("none"))
        .map(String::from)
        .collect()
}

/// The canonical exercise catalog. Immutable once built; looked up by name
/// case-insensitively.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
    by_lowercase: HashMap<String, usize>,
}

impl Catalog {
    #[must_use]
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        let by_lowercase = entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.name.to_lowercase(), i))
            .collect();
        Self {
            entries,
            by_lowercase,
        }
    }

    #[must_use]
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&CatalogEntry> {
        self.by_lowercase
            .get(&name.trim().to_lowercase())
            .map(|i| &self.entries[*i])
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Set-equivalents per muscle group for one set of the given exercise.
    ///
    /// Primary counts [`PRIMARY_SET`], each secondary [`SECONDARY_SET`].
    /// Cardio exercises contribute nothing, full-body exercises contribute
    /// [`PRIMARY_SET`] to every major group. Unknown exercises contribute
    /// nothing.
    #[must_use]
    pub fn group_contributions(&self, exercise: &str) -> BTreeMap<MuscleGroup, f32> {
        let mut result = BTreeMap::new();
        let Some(entry) = self.get(exercise) else {
            return result;
        };
        let Some(primary) = entry.primary_muscle.as_deref() else {
            return result;
        };

        if muscle::is_cardio(primary) {
            return result;
        }
        if muscle::is_full_body(primary) {
            for group in MuscleGroup::iter() {
                result.insert(*group, PRIMARY_SET);
            }
            return result;
        }

        if let Some(group) = muscle::muscle_group(primary) {
            *result.entry(group).or_insert(0.0) += PRIMARY_SET;
        }
        for secondary in &entry.secondary_muscles {
            if muscle::is_cardio(secondary) || muscle::is_full_body(secondary) {
                continue;
            }
            if let Some(group) = muscle::muscle_group(secondary) {
                *result.entry(group).or_insert(0.0) += SECONDARY_SET;
            }
        }
        result
    }

    /// Set-equivalents per individual muscle for one set of the given
    /// exercise, keyed by the catalog's own muscle names. Used by the
    /// detailed body-map path.
    #[must_use]
    pub fn muscle_contributions(&self, exercise: &str) -> BTreeMap<String, f32> {
        let mut result = BTreeMap::new();
        let Some(entry) = self.get(exercise) else {
            return result;
        };
        let Some(primary) = entry.primary_muscle.as_deref() else {
            return result;
        };

        if muscle::is_cardio(primary) {
            return result;
        }

        if let Some(key) = muscle::muscle_key(primary) {
            *result.entry(key).or_insert(0.0) += PRIMARY_SET;
        }
        for secondary in &entry.secondary_muscles {
            if let Some(key) = muscle::muscle_key(secondary) {
                *result.entry(key).or_insert(0.0) += SECONDARY_SET;
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn catalog() -> Catalog {
        Catalog::new(vec![
            CatalogEntry::from_parts(
                "Bench Press (Barbell)",
                Some("Barbell"),
                Some("Chest"),
                Some("Triceps, Front Delts"),
                None,
            ),
            CatalogEntry::from_parts(
                "Running",
                None,
                Some("Cardio"),
                Some("None"),
                None,
            ),
            CatalogEntry::from_parts(
                "Burpee",
                None,
                Some("Full Body"),
                None,
                None,
            ),
            CatalogEntry::from_parts(
                "Deadlift (Barbell)",
                Some("Barbell"),
                Some("Lower Back"),
                Some("Glutes, Hamstrings"),
                None,
            ),
        ])
    }

    #[rstest]
    #[case(None, Vec::new())]
    #[case(Some("None"), Vec::new())]
    #[case(Some("none"), Vec::new())]
    #[case(Some("Triceps"), vec!["Triceps".to_string()])]
    #[case(
        Some("Triceps, Front Delts"),
        vec!["Triceps".to_string(), "Front Delts".to_string()]
    )]
    #[case(Some("Lats, None"), vec!["Lats".to_string()])]
    fn test_catalog_entry_secondary_muscles(
        #[case] secondary: Option<&str>,
        #[case] expected: Vec<String>,
    ) {
        assert_eq!(
            CatalogEntry::from_parts("A", None, None, secondary, None).secondary_muscles,
            expected
        );
    }

    #[test]
    fn test_catalog_entry_deserialize() {
        let entry: CatalogEntry = serde_json::from_str(
            r#"{
                "name": "Bench Press (Barbell)",
                "equipment": "Barbell",
                "primary_muscle": "Chest",
                "secondary_muscle": "Triceps, None"
            }"#,
        )
        .unwrap();
        assert_eq!(
            entry,
            CatalogEntry {
                name: "Bench Press (Barbell)".to_string(),
                equipment: Some("Barbell".to_string()),
                primary_muscle: Some("Chest".to_string()),
                secondary_muscles: vec!["Triceps".to_string()],
                media: None,
            }
        );
    }

    #[rstest]
    #[case("Bench Press (Barbell)", true)]
    #[case("bench press (barbell)", true)]
    #[case("BENCH PRESS (BARBELL)", true)]
    #[case("Bench Press", false)]
    fn test_catalog_get(#[case] name: &str, #[case] expected: bool) {
        assert_eq!(catalog().get(name).is_some(), expected);
    }

    #[test]
    fn test_catalog_group_contributions() {
        assert_eq!(
            catalog().group_contributions("Bench Press (Barbell)"),
            BTreeMap::from([
                (MuscleGroup::Chest, PRIMARY_SET),
                (MuscleGroup::Triceps, SECONDARY_SET),
                (MuscleGroup::Shoulders, SECONDARY_SET),
            ])
        );
    }

    #[test]
    fn test_catalog_group_contributions_cardio() {
        assert_eq!(catalog().group_contributions("Running"), BTreeMap::new());
    }

    #[test]
    fn test_catalog_group_contributions_full_body() {
        let contributions = catalog().group_contributions("Burpee");
        assert_eq!(contributions.len(), MuscleGroup::iter().count());
        assert!(contributions.values().all(|c| (*c - PRIMARY_SET).abs() < f32::EPSILON));
    }

    #[test]
    fn test_catalog_group_contributions_unknown() {
        assert_eq!(
            catalog().group_contributions("Cable Crossover"),
            BTreeMap::new()
        );
    }

    #[test]
    fn test_catalog_muscle_contributions() {
        assert_eq!(
            catalog().muscle_contributions("Deadlift (Barbell)"),
            BTreeMap::from([
                ("lower back".to_string(), PRIMARY_SET),
                ("glutes".to_string(), SECONDARY_SET),
                ("hamstrings".to_string(), SECONDARY_SET),
            ])
        );
    }

    #[test]
    fn test_empty_catalog() {
        let catalog = Catalog::default();
        assert!(catalog.is_empty());
        assert_eq!(catalog.len(), 0);
        assert_eq!(catalog.group_contributions("Anything"), BTreeMap::new());
    }
}
