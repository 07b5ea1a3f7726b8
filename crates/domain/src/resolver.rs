use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::LazyLock;

use derive_more::Display;
use log::debug;
use serde::Serialize;

use crate::catalog::Catalog;
use crate::event::TrainingEvent;

/// Minimum fuzzy score accepted in strict mode.
const FUZZY_THRESHOLD_STRICT: f32 = 0.5;
/// Minimum fuzzy score accepted in relaxed mode.
const FUZZY_THRESHOLD_RELAXED: f32 = 0.4;
/// Required margin to the runner-up in strict mode.
const FUZZY_MARGIN: f32 = 0.05;
/// Bonus applied to the overlap coefficient so that full containment of the
/// shorter token set outranks plain Jaccard similarity.
const OVERLAP_BONUS: f32 = 1.1;

const SCORE_EPSILON: f32 = 1e-6;

static STOP_WORDS: [&str; 11] = [
    "the", "a", "an", "and", "with", "of", "on", "in", "at", "to", "for",
];

/// Singular/abbreviated tokens rewritten during normalization.
static TOKEN_REWRITES: [(&str, &str); 5] = [
    ("bicep", "biceps"),
    ("tricep", "triceps"),
    ("db", "dumbbell"),
    ("bb", "barbell"),
    ("kb", "kettlebell"),
];

/// Compound terms collapsed to their canonical single-word form.
static PHRASE_REWRITES: [(&str, &str); 7] = [
    ("pull down", "pulldown"),
    ("push down", "pushdown"),
    ("pull up", "pullup"),
    ("push up", "pushup"),
    ("chin up", "chinup"),
    ("sit up", "situp"),
    ("step up", "stepup"),
];

/// Curated many-to-one aliases with ordered canonical fallbacks. A fallback
/// is only used when the active catalog contains it.
static ALIASES: [(&str, &[&str]); 22] = [
    (
        "ez bar bicep curl",
        &["EZ Bar Biceps Curl", "Biceps Curl (Barbell)"],
    ),
    ("ez bar curl", &["EZ Bar Biceps Curl", "Biceps Curl (Barbell)"]),
    ("ez curl", &["EZ Bar Biceps Curl", "Biceps Curl (Barbell)"]),
    ("ohp", &["Overhead Press (Barbell)", "Shoulder Press (Barbell)"]),
    (
        "military press",
        &["Overhead Press (Barbell)", "Shoulder Press (Barbell)"],
    ),
    ("bench", &["Bench Press (Barbell)"]),
    ("flat bench", &["Bench Press (Barbell)"]),
    ("deads", &["Deadlift (Barbell)"]),
    ("dl", &["Deadlift (Barbell)"]),
    (
        "rdl",
        &["Romanian Deadlift (Barbell)", "Romanian Deadlift (Dumbbell)"],
    ),
    ("sldl", &["Stiff Leg Deadlift (Barbell)"]),
    ("bent over row", &["Bent Over Row (Barbell)"]),
    ("lat pulldown", &["Lat Pulldown (Cable)", "Lat Pulldown (Machine)"]),
    ("pulldowns", &["Lat Pulldown (Cable)", "Lat Pulldown (Machine)"]),
    ("skullcrusher", &["Skullcrusher (Barbell)", "Skullcrusher (Dumbbell)"]),
    ("skull crushers", &["Skullcrusher (Barbell)", "Skullcrusher (Dumbbell)"]),
    ("bss", &["Bulgarian Split Squat"]),
    ("squats", &["Squat (Barbell)"]),
    ("front squats", &["Front Squat (Barbell)"]),
    ("hip thrusts", &["Hip Thrust (Barbell)"]),
    ("calf raises", &["Standing Calf Raise", "Calf Press (Machine)"]),
    ("facepull", &["Face Pull (Cable)"]),
];

static ALIAS_MAP: LazyLock<HashMap<String, &'static [&'static str]>> = LazyLock::new(|| {
    ALIASES
        .iter()
        .map(|(alias, candidates)| (normalize(alias), *candidates))
        .collect()
});

/// How a raw exercise name was mapped to its canonical catalog name.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionMethod {
    #[display("exact")]
    Exact,
    #[display("case-insensitive")]
    CaseInsensitive,
    #[display("alias")]
    Alias,
    #[display("normalized")]
    Normalized,
    #[display("normalized-no-parens")]
    NormalizedNoParens,
    #[display("fuzzy")]
    Fuzzy,
    #[display("none")]
    None,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FuzzyMode {
    #[default]
    Strict,
    Relaxed,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Resolution {
    pub name: String,
    pub method: ResolutionMethod,
    pub score: Option<f32>,
}

/// Summary of an in-place resolution pass over a batch of events.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ResolutionSummary {
    pub unmatched: Vec<String>,
    pub fuzzy_matches: usize,
    pub representative_matches: Vec<(String, String)>,
}

const REPRESENTATIVE_LIMIT: usize = 5;

/// Resolves free-text exercise names against one catalog.
///
/// All lookup tables and the memoization cache are owned by the instance;
/// construct a new resolver whenever the catalog changes.
pub struct ExerciseResolver {
    mode: FuzzyMode,
    exact: HashSet<String>,
    lowercase: HashMap<String, String>,
    normalized: HashMap<String, String>,
    normalized_no_parens: HashMap<String, String>,
    tokens: Vec<(String, BTreeSet<String>)>,
    cache: HashMap<String, Resolution>,
    unmatched: BTreeSet<String>,
}

impl ExerciseResolver {
    #[must_use]
    pub fn new(catalog: &Catalog) -> Self {
        Self::with_mode(catalog, FuzzyMode::default())
    }

    #[must_use]
    pub fn with_mode(catalog: &Catalog, mode: FuzzyMode) -> Self {
        let mut exact = HashSet::new();
        let mut lowercase = HashMap::new();
        let mut normalized = HashMap::new();
        let mut normalized_no_parens = HashMap::new();
        let mut tokens = Vec::new();

        for entry in catalog.entries() {
            let name = entry.name.clone();
            exact.insert(name.clone());
            lowercase.entry(name.to_lowercase()).or_insert_with(|| name.clone());
            normalized
                .entry(normalize(&name))
                .or_insert_with(|| name.clone());
            normalized_no_parens
                .entry(normalize(&strip_parens(&name)))
                .or_insert_with(|| name.clone());
            tokens.push((name.clone(), significant_tokens(&name)));
        }

        Self {
            mode,
            exact,
            lowercase,
            normalized,
            normalized_no_parens,
            tokens,
            cache: HashMap::new(),
            unmatched: BTreeSet::new(),
        }
    }

    /// Raw names that failed every resolution step so far, sorted.
    #[must_use]
    pub fn unmatched(&self) -> Vec<String> {
        self.unmatched.iter().cloned().collect()
    }

    /// Resolves one raw name. Never fails: an unresolvable name is returned
    /// unchanged with method [`ResolutionMethod::None`].
    pub fn resolve(&mut self, raw: &str) -> Resolution {
        let raw = raw.trim();
        if let Some(cached) = self.cache.get(raw) {
            return cached.clone();
        }

        let resolution = self.resolve_uncached(raw);
        if resolution.method == ResolutionMethod::None && !raw.is_empty() {
            self.unmatched.insert(raw.to_string());
        }
        self.cache.insert(raw.to_string(), resolution.clone());
        resolution
    }

    fn resolve_uncached(&self, raw: &str) -> Resolution {
        if self.exact.contains(raw) {
            return hit(raw, ResolutionMethod::Exact);
        }

        if let Some(name) = self.lowercase.get(&raw.to_lowercase()) {
            return hit(name, ResolutionMethod::CaseInsensitive);
        }

        if let Some(name) = self.resolve_alias(raw) {
            return hit(&name, ResolutionMethod::Alias);
        }

        if let Some(name) = self.normalized.get(&normalize(raw)) {
            return hit(name, ResolutionMethod::Normalized);
        }

        let no_parens = normalize(&strip_parens(raw));
        if !no_parens.is_empty() {
            if let Some(name) = self
                .normalized
                .get(&no_parens)
                .or_else(|| self.normalized_no_parens.get(&no_parens))
            {
                return hit(name, ResolutionMethod::NormalizedNoParens);
            }
        }

        if let Some((name, score)) = self.resolve_fuzzy(raw) {
            debug!("fuzzy-matched \"{raw}\" to \"{name}\" (score {score:.2})");
            return Resolution {
                name,
                method: ResolutionMethod::Fuzzy,
                score: Some(score),
            };
        }

        Resolution {
            name: raw.to_string(),
            method: ResolutionMethod::None,
            score: None,
        }
    }

    fn resolve_alias(&self, raw: &str) -> Option<String> {
        let keys = [normalize(raw), normalize(&strip_parens(raw))];
        for key in &keys {
            let Some(candidates) = ALIAS_MAP.get(key) else {
                continue;
            };
            for candidate in *candidates {
                if let Some(name) = self.lowercase.get(&candidate.to_lowercase()) {
                    return Some(name.clone());
                }
            }
        }
        None
    }

    fn resolve_fuzzy(&self, raw: &str) -> Option<(String, f32)> {
        let raw_tokens = significant_tokens(raw);
        if raw_tokens.is_empty() {
            return None;
        }

        let mut scored: Vec<(f32, usize, &str)> = self
            .tokens
            .iter()
            .filter(|(_, entry_tokens)| !entry_tokens.is_empty())
            .map(|(name, entry_tokens)| {
                (
                    token_similarity(&raw_tokens, entry_tokens),
                    entry_tokens.len(),
                    name.as_str(),
                )
            })
            .collect();
        scored.sort_by(|a, b| {
            b.0.partial_cmp(&a.0)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.1.cmp(&b.1))
                .then(a.2.cmp(b.2))
        });

        let (best_score, _, best_name) = *scored.first()?;
        let second_score = scored.get(1).map_or(0.0, |(score, _, _)| *score);

        let accepted = match self.mode {
            FuzzyMode::Strict => {
                best_score >= FUZZY_THRESHOLD_STRICT
                    && best_score - second_score >= FUZZY_MARGIN - SCORE_EPSILON
            }
            FuzzyMode::Relaxed => best_score >= FUZZY_THRESHOLD_RELAXED,
        };

        accepted.then(|| (best_name.to_string(), best_score))
    }

    /// Rewrites the exercise name of every event in place and summarizes
    /// what happened for ingestion metadata.
    pub fn resolve_events(&mut self, events: &mut [TrainingEvent]) -> ResolutionSummary {
        let mut summary = ResolutionSummary::default();
        let mut seen_pairs = HashSet::new();

        for event in events {
            let resolution = self.resolve(&event.exercise);
            match resolution.method {
                ResolutionMethod::None => {}
                ResolutionMethod::Fuzzy => {
                    summary.fuzzy_matches += 1;
                    if summary.representative_matches.len() < REPRESENTATIVE_LIMIT
                        && seen_pairs.insert((event.exercise.clone(), resolution.name.clone()))
                    {
                        summary
                            .representative_matches
                            .push((event.exercise.clone(), resolution.name.clone()));
                    }
                    event.exercise = resolution.name;
                }
                _ => event.exercise = resolution.name,
            }
        }

        summary.unmatched = self.unmatched();
        summary
    }
}

fn hit(name: &str, method: ResolutionMethod) -> Resolution {
    Resolution {
        name: name.to_string(),
        method,
        score: None,
    }
}

/// Lowercases, strips punctuation, collapses whitespace, and applies the
/// token and phrase rewrite tables.
#[must_use]
pub fn normalize(name: &str) -> String {
    let lowered: String = name
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();

    let mut joined = lowered
        .split_whitespace()
        .map(|token| {
            TOKEN_REWRITES
                .iter()
                .find(|(from, _)| *from == token)
                .map_or(token, |(_, to)| *to)
        })
        .collect::<Vec<_>>()
        .join(" ");

    for (from, to) in &PHRASE_REWRITES {
        if joined.contains(from) {
            joined = joined.replace(from, to);
        }
    }

    joined
}

fn strip_parens(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    let mut depth = 0_u32;
    for c in name.chars() {
        match c {
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            _ if depth == 0 => result.push(c),
            _ => {}
        }
    }
    result
}

fn significant_tokens(name: &str) -> BTreeSet<String> {
    normalize(name)
        .split_whitespace()
        .filter(|token| !STOP_WORDS.contains(token))
        .map(String::from)
        .collect()
}

#[allow(clippy::cast_precision_loss)]
fn token_similarity(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f32 {
    let intersection = a.intersection(b).count();
    if intersection == 0 {
        return 0.0;
    }
    let union = a.len() + b.len() - intersection;
    let jaccard = intersection as f32 / union as f32;
    let overlap = intersection as f32 / a.len().min(b.len()) as f32;
    jaccard.max(OVERLAP_BONUS * overlap)
}
