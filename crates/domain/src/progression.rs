use chrono::NaiveDate;
use derive_more::Display;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::event::TrainingEvent;

/// The Epley estimate degrades at high rep counts, so reps are capped.
pub const ONE_RM_REP_CAP: u32 = 12;

/// Default rep target of the weight-promotion rule.
pub const DEFAULT_REP_TARGET: u32 = 10;

const SAME_WEIGHT_EPSILON_PCT: f32 = 1.0;
const NORMAL_FATIGUE_MAX_PCT: f32 = 15.0;
const HIGH_FATIGUE_MAX_PCT: f32 = 25.0;
const GOOD_OVERLOAD_SLACK_REPS: f32 = 1.5;
const AMBITIOUS_SLACK_REPS: f32 = 3.0;
const BACKOFF_SLACK_REPS: f32 = 3.0;

const STRENGTH_MAX_AVG_REPS: f32 = 5.0;
const HYPERTROPHY_MAX_AVG_REPS: f32 = 15.0;

const TREND_WINDOW_MIN: usize = 4;
const TREND_WINDOW_MAX: usize = 6;
const STAGNANT_WEIGHT_EPSILON_KG: f32 = 0.5;
const STAGNANT_REPS_EPSILON: f32 = 1.0;
const TREND_THRESHOLD_PCT: f32 = 1.0;
const TREND_MIN_DELTA_KG: f32 = 0.25;
const TREND_MIN_DELTA_REPS: f32 = 1.0;
const FAKE_PR_SPIKE_PCT: f32 = 5.0;
const FAKE_PR_REGRESSION_PCT: f32 = 2.0;
const FAKE_PR_SOFT_SPIKE_PCT: f32 = 2.0;
const FAKE_PR_SOFT_DROP_PCT: f32 = 2.5;
const BODYWEIGHT_SESSION_RATIO: f32 = 0.75;
const BODYWEIGHT_EPSILON_KG: f32 = 0.5;

const HYPERTROPHY_REP_FLOOR: u32 = 5;
const PROMOTION_STRONG_MARGIN: u32 = 2;
const TOP_WEIGHT_EPSILON_KG: f32 = 0.001;

/// Estimated one-rep-max via the Epley formula, reps capped at
/// [`ONE_RM_REP_CAP`].
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn one_rep_max(weight_kg: f32, reps: u32) -> f32 {
    weight_kg * (1.0 + reps.min(ONE_RM_REP_CAP) as f32 / 30.0)
}

/// Reps expected at `weight_kg` given an estimated one-rep-max, from the
/// inverse Epley relation, floored at one rep.
#[must_use]
pub fn predicted_reps(one_rm: f32, weight_kg: f32) -> f32 {
    if weight_kg <= 0.0 {
        return 1.0;
    }
    (30.0 * (one_rm / weight_kg - 1.0)).max(1.0)
}

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[display("success")]
    Success,
    #[display("info")]
    Info,
    #[display("warning")]
    Warning,
    #[display("danger")]
    Danger,
}

/// Structured explanation attached to every classification.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Insight {
    /// Signed percentage: rep change for same-weight transitions, weight
    /// change otherwise.
    pub trend_pct: f32,
    pub why: String,
    pub improve: Option<String>,
}

/// Classification of one set-to-set transition.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub status: Status,
    pub label: &'static str,
    pub insight: Insight,
}

/// Classifies every transition between consecutive working sets of one
/// exercise within one session. Warmups are ignored; fewer than two working
/// sets yield no results.
#[must_use]
pub fn analyze_sets(sets: &[TrainingEvent]) -> Vec<AnalysisResult> {
    let working: Vec<&TrainingEvent> = sets.iter().filter(|s| s.is_working_set()).collect();
    if working.len() < 2 {
        return Vec::new();
    }

    let mut results = Vec::with_capacity(working.len() - 1);
    let mut best_one_rm = one_rep_max(working[0].weight_kg, working[0].reps);

    for (i, pair) in working.windows(2).enumerate() {
        let (previous, current) = (pair[0], pair[1]);
        results.push(classify_transition(previous, current, best_one_rm, i == 0));
        best_one_rm = best_one_rm.max(one_rep_max(current.weight_kg, current.reps));
    }

    results
}

#[allow(clippy::cast_precision_loss)]
fn classify_transition(
    previous: &TrainingEvent,
    current: &TrainingEvent,
    best_one_rm: f32,
    first_transition: bool,
) -> AnalysisResult {
    let weight_pct = if previous.weight_kg > 0.0 {
        (current.weight_kg - previous.weight_kg) / previous.weight_kg * 100.0
    } else if current.weight_kg > 0.0 {
        100.0
    } else {
        0.0
    };

    if weight_pct.abs() < SAME_WEIGHT_EPSILON_PCT {
        return classify_same_weight(previous, current, first_transition);
    }

    let expected = predicted_reps(best_one_rm, current.weight_kg);
    let actual = current.reps as f32;
    let shortfall = expected - actual;

    if weight_pct > 0.0 {
        let (status, label, why, improve) = if actual > expected {
            (
                Status::Success,
                "Strong Overload",
                format!(
                    "You beat the {expected:.1} reps predicted at the higher weight with {actual:.0}."
                ),
                None,
            )
        } else if shortfall <= GOOD_OVERLOAD_SLACK_REPS {
            (
                Status::Success,
                "Good Overload",
                format!("You hit the predicted rep range at the higher weight ({actual:.0} of {expected:.1})."),
                None,
            )
        } else if shortfall <= AMBITIOUS_SLACK_REPS {
            (
                Status::Warning,
                "Slightly Ambitious",
                format!("{actual:.0} reps fell short of the {expected:.1} predicted at this weight."),
                Some("Try a smaller weight increase next time.".to_string()),
            )
        } else {
            (
                Status::Danger,
                "Premature Jump",
                format!(
                    "{actual:.0} reps is far below the {expected:.1} predicted, the jump was too large."
                ),
                Some("Step back to the previous weight and add reps first.".to_string()),
            )
        };
        return AnalysisResult {
            status,
            label,
            insight: Insight {
                trend_pct: weight_pct,
                why,
                improve,
            },
        };
    }

    let (status, label, why, improve) = if shortfall <= 0.0 {
        (
            Status::Success,
            "Effective Backoff",
            format!("You met the {expected:.1} reps predicted at the reduced weight."),
            None,
        )
    } else if shortfall <= BACKOFF_SLACK_REPS {
        (
            Status::Info,
            "Fatigued Backoff",
            format!("{actual:.0} reps at the reduced weight, slightly under the {expected:.1} predicted."),
            None,
        )
    } else {
        (
            Status::Warning,
            "Heavy Fatigue",
            format!(
                "Even after reducing the weight, {actual:.0} reps is well under the {expected:.1} predicted."
            ),
            Some("Consider longer rest between sets or ending the exercise here.".to_string()),
        )
    };
    AnalysisResult {
        status,
        label,
        insight: Insight {
            trend_pct: weight_pct,
            why,
            improve,
        },
    }
}

#[allow(clippy::cast_precision_loss)]
fn classify_same_weight(
    previous: &TrainingEvent,
    current: &TrainingEvent,
    first_transition: bool,
) -> AnalysisResult {
    let rep_pct = if previous.reps > 0 {
        (current.reps as f32 - previous.reps as f32) / previous.reps as f32 * 100.0
    } else {
        0.0
    };

    if current.reps > previous.reps {
        return AnalysisResult {
            status: Status::Success,
            label: "Second Wind",
            insight: Insight {
                trend_pct: rep_pct,
                why: "Rep count went up at the same weight.".to_string(),
                improve: None,
            },
        };
    }

    if current.reps == previous.reps {
        return AnalysisResult {
            status: Status::Success,
            label: "Consistent",
            insight: Insight {
                trend_pct: 0.0,
                why: "Rep count held steady at the same weight.".to_string(),
                improve: None,
            },
        };
    }

    let drop_pct = -rep_pct;
    let context = if first_transition {
        "after the opening set"
    } else {
        "as fatigue accumulated"
    };

    let (status, label, improve) = if drop_pct <= NORMAL_FATIGUE_MAX_PCT {
        (Status::Info, "Normal Fatigue", None)
    } else if drop_pct <= HIGH_FATIGUE_MAX_PCT {
        (
            Status::Warning,
            "High Fatigue",
            Some("Longer rest between sets may keep more reps in reserve.".to_string()),
        )
    } else {
        (
            Status::Danger,
            "Significant Drop",
            Some("Reduce the weight for the remaining sets.".to_string()),
        )
    };

    AnalysisResult {
        status,
        label,
        insight: Insight {
            trend_pct: rep_pct,
            why: format!("Reps dropped by {drop_pct:.0}% {context}."),
            improve,
        },
    }
}

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainingGoal {
    #[display("Strength")]
    Strength,
    #[display("Hypertrophy")]
    Hypertrophy,
    #[display("Endurance")]
    Endurance,
}

/// Session-level classification derived from the working sets of one session.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SessionAnalysis {
    pub goal: TrainingGoal,
    pub avg_reps: f32,
    pub best_one_rep_max: f32,
    pub working_sets: usize,
}

#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn analyze_session(sets: &[TrainingEvent]) -> Option<SessionAnalysis> {
    let working: Vec<&TrainingEvent> = sets.iter().filter(|s| s.is_working_set()).collect();
    if working.is_empty() {
        return None;
    }

    let avg_reps = working.iter().map(|s| s.reps as f32).sum::<f32>() / working.len() as f32;
    let goal = if avg_reps <= STRENGTH_MAX_AVG_REPS {
        TrainingGoal::Strength
    } else if avg_reps <= HYPERTROPHY_MAX_AVG_REPS {
        TrainingGoal::Hypertrophy
    } else {
        TrainingGoal::Endurance
    };

    Some(SessionAnalysis {
        goal,
        avg_reps,
        best_one_rep_max: working
            .iter()
            .map(|s| one_rep_max(s.weight_kg, s.reps))
            .fold(0.0, f32::max),
        working_sets: working.len(),
    })
}

/// One session of one exercise, summarized by its best set (by estimated
/// one-rep-max).
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SessionSummary {
    pub date: NaiveDate,
    pub weight_kg: f32,
    pub reps: u32,
    pub one_rep_max: f32,
    pub max_reps: u32,
}

/// Summarizes the working sets of one exercise into one entry per training
/// day, in date order.
#[must_use]
pub fn summarize_sessions(events: &[TrainingEvent]) -> Vec<SessionSummary> {
    let mut days: BTreeMap<NaiveDate, Vec<&TrainingEvent>> = BTreeMap::new();
    for event in events.iter().filter(|e| e.is_working_set()) {
        if let Some(date) = event.date() {
            days.entry(date).or_default().push(event);
        }
    }

    days.into_iter()
        .map(|(date, sets)| {
            let best = sets
                .iter()
                .max_by(|a, b| {
                    one_rep_max(a.weight_kg, a.reps)
                        .partial_cmp(&one_rep_max(b.weight_kg, b.reps))
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
                .copied()
                .unwrap();
            SessionSummary {
                date,
                weight_kg: best.weight_kg,
                reps: best.reps,
                one_rep_max: one_rep_max(best.weight_kg, best.reps),
                max_reps: sets.iter().map(|s| s.reps).max().unwrap_or(0),
            }
        })
        .collect()
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendState {
    New,
    Stagnant,
    Overload,
    Regression,
    FakePr,
    Neutral,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendMetric {
    OneRepMax,
    MaxReps,
}

/// Multi-session progression verdict for one exercise.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ExerciseTrend {
    pub state: TrendState,
    pub metric: TrendMetric,
    pub change_pct: f32,
}

impl ExerciseTrend {
    fn new(metric: TrendMetric) -> Self {
        Self {
            state: TrendState::New,
            metric,
            change_pct: 0.0,
        }
    }
}

/// Classifies the recent progression of one exercise from its session
/// summaries (date order). Sparse data degrades to [`TrendState::New`].
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn exercise_trend(summaries: &[SessionSummary]) -> ExerciseTrend {
    let recent = &summaries[summaries.len().saturating_sub(TREND_WINDOW_MAX)..];

    let bodyweight_sessions = recent
        .iter()
        .filter(|s| s.weight_kg <= BODYWEIGHT_EPSILON_KG)
        .count();
    let bodyweight_like = !recent.is_empty()
        && bodyweight_sessions as f32 / recent.len() as f32 >= BODYWEIGHT_SESSION_RATIO;
    let (metric, min_delta) = if bodyweight_like {
        (TrendMetric::MaxReps, TREND_MIN_DELTA_REPS)
    } else {
        (TrendMetric::OneRepMax, TREND_MIN_DELTA_KG)
    };

    if recent.len() < TREND_WINDOW_MIN {
        return ExerciseTrend::new(metric);
    }

    let values: Vec<f32> = recent
        .iter()
        .map(|s| match metric {
            TrendMetric::OneRepMax => s.one_rep_max,
            TrendMetric::MaxReps => s.max_reps as f32,
        })
        .collect();

    if values.iter().all(|v| *v <= f32::EPSILON) {
        return ExerciseTrend::new(metric);
    }

    let weight_range = range(recent.iter().map(|s| s.weight_kg));
    let reps_range = range(recent.iter().map(|s| s.reps as f32));
    if weight_range <= STAGNANT_WEIGHT_EPSILON_KG && reps_range <= STAGNANT_REPS_EPSILON {
        return ExerciseTrend {
            state: TrendState::Stagnant,
            metric,
            change_pct: 0.0,
        };
    }

    let current = values[values.len() - 2..].iter().sum::<f32>() / 2.0;
    let previous_values = &values[..values.len() - 2];
    let previous = previous_values.iter().sum::<f32>() / previous_values.len() as f32;
    let change = current - previous;
    let change_pct = if previous > 0.0 {
        change / previous * 100.0
    } else {
        0.0
    };

    if change_pct >= TREND_THRESHOLD_PCT && change >= min_delta {
        return ExerciseTrend {
            state: TrendState::Overload,
            metric,
            change_pct,
        };
    }
    if change_pct <= -TREND_THRESHOLD_PCT && -change >= min_delta {
        return ExerciseTrend {
            state: TrendState::Regression,
            metric,
            change_pct,
        };
    }

    if has_fake_pr(&values) {
        return ExerciseTrend {
            state: TrendState::FakePr,
            metric,
            change_pct,
        };
    }

    ExerciseTrend {
        state: TrendState::Neutral,
        metric,
        change_pct,
    }
}

fn range(values: impl Iterator<Item = f32>) -> f32 {
    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;
    for value in values {
        min = min.min(value);
        max = max.max(value);
    }
    if min.is_finite() { max - min } else { 0.0 }
}

/// A spike that the very next session gives back, or a softer spike followed
/// by a clear post-spike drop, flags an unsustainable one-off.
fn has_fake_pr(values: &[f32]) -> bool {
    for i in 1..values.len() {
        let spike_pct = pct_change(values[i - 1], values[i]);

        if spike_pct >= FAKE_PR_SPIKE_PCT
            && i + 1 < values.len()
            && pct_change(values[i], values[i + 1]) <= -FAKE_PR_REGRESSION_PCT
        {
            return true;
        }

        if spike_pct >= FAKE_PR_SOFT_SPIKE_PCT
            && values[i + 1..]
                .iter()
                .any(|later| pct_change(values[i], *later) <= -FAKE_PR_SOFT_DROP_PCT)
        {
            return true;
        }
    }
    false
}

fn pct_change(from: f32, to: f32) -> f32 {
    if from > 0.0 { (to - from) / from * 100.0 } else { 0.0 }
}

/// Load-change recommendation derived from the sets at the session's top
/// weight.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "advice")]
pub enum WeightAdvice {
    Increase { min_pct: f32, max_pct: f32 },
    Decrease { min_pct: f32, max_pct: f32 },
    Hold,
}

/// Recommends a load change when every set at the current top weight meets
/// the rep target, scaled by how far past the target the athlete is; a max
/// rep count below the hypertrophy floor recommends backing the weight off.
#[must_use]
pub fn weight_recommendation(sets: &[TrainingEvent], target_reps: u32) -> Option<WeightAdvice> {
    let weighted: Vec<&TrainingEvent> = sets
        .iter()
        .filter(|s| s.is_working_set() && s.weight_kg > 0.0)
        .collect();
    let top_weight = weighted
        .iter()
        .map(|s| s.weight_kg)
        .fold(f32::NEG_INFINITY, f32::max);
    if !top_weight.is_finite() {
        return None;
    }

    let at_top: Vec<&&TrainingEvent> = weighted
        .iter()
        .filter(|s| (s.weight_kg - top_weight).abs() < TOP_WEIGHT_EPSILON_KG)
        .collect();
    let min_reps = at_top.iter().map(|s| s.reps).min().unwrap_or(0);
    let max_reps = at_top.iter().map(|s| s.reps).max().unwrap_or(0);

    if min_reps >= target_reps {
        if min_reps >= target_reps + PROMOTION_STRONG_MARGIN {
            return Some(WeightAdvice::Increase {
                min_pct: 5.0,
                max_pct: 10.0,
            });
        }
        return Some(WeightAdvice::Increase {
            min_pct: 2.5,
            max_pct: 5.0,
        });
    }

    if max_reps < HYPERTROPHY_REP_FLOOR {
        return Some(WeightAdvice::Decrease {
            min_pct: 5.0,
            max_pct: 10.0,
        });
    }

    Some(WeightAdvice::Hold)
}

#[cfg(test)]
mod tests {
    use assert_approx_eq::assert_approx_eq;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use crate::event::SetType;

    use super::*;

    fn set(weight_kg: f32, reps: u32) -> TrainingEvent {
        TrainingEvent {
            exercise: "Bench Press (Barbell)".to_string(),
            weight_kg,
            reps,
            ..TrainingEvent::default()
        }
    }

    fn dated_set(day: u32, weight_kg: f32, reps: u32) -> TrainingEvent {
        TrainingEvent {
            start: NaiveDate::from_ymd_opt(2024, 3, day)
                .unwrap()
                .and_hms_opt(18, 0, 0),
            ..set(weight_kg, reps)
        }
    }

    fn summary(day: u32, weight_kg: f32, reps: u32, one_rep_max: f32, max_reps: u32) -> SessionSummary {
        SessionSummary {
            date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            weight_kg,
            reps,
            one_rep_max,
            max_reps,
        }
    }

    #[rstest]
    #[case(100.0, 8, 126.666_67)]
    #[case(100.0, 1, 103.333_33)]
    #[case(100.0, 0, 100.0)]
    #[case(100.0, 20, 140.0)]
    fn test_one_rep_max(#[case] weight: f32, #[case] reps: u32, #[case] expected: f32) {
        assert_approx_eq!(one_rep_max(weight, reps), expected, 1e-3);
    }

    #[rstest]
    #[case(120.0, 112.5, 2.0)]
    #[case(120.0, 100.0, 6.0)]
    #[case(100.0, 100.0, 1.0)]
    #[case(100.0, 120.0, 1.0)]
    #[case(100.0, 0.0, 1.0)]
    fn test_predicted_reps(#[case] one_rm: f32, #[case] weight: f32, #[case] expected: f32) {
        assert_approx_eq!(predicted_reps(one_rm, weight), expected, 1e-4);
    }

    #[test]
    fn test_analyze_sets_needs_two_working_sets() {
        assert_eq!(analyze_sets(&[]), Vec::new());
        assert_eq!(analyze_sets(&[set(100.0, 8)]), Vec::new());

        let warmup = TrainingEvent {
            set_type: SetType::Warmup,
            ..set(60.0, 10)
        };
        assert_eq!(analyze_sets(&[warmup, set(100.0, 8)]), Vec::new());
    }

    #[test]
    fn test_consistent_has_zero_trend() {
        let results = analyze_sets(&[set(100.0, 8), set(100.0, 8)]);

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].status, Status::Success);
        assert_eq!(results[0].label, "Consistent");
        assert_approx_eq!(results[0].insight.trend_pct, 0.0);
    }

    #[test]
    fn test_second_wind() {
        let results = analyze_sets(&[set(100.0, 8), set(100.0, 9)]);

        assert_eq!(results[0].status, Status::Success);
        assert_eq!(results[0].label, "Second Wind");
        assert_approx_eq!(results[0].insight.trend_pct, 12.5);
    }

    #[rstest]
    #[case(8, 7, Status::Info, "Normal Fatigue")]
    #[case(8, 6, Status::Warning, "High Fatigue")]
    #[case(8, 5, Status::Danger, "Significant Drop")]
    fn test_same_weight_fatigue_bands(
        #[case] previous_reps: u32,
        #[case] current_reps: u32,
        #[case] status: Status,
        #[case] label: &str,
    ) {
        let results = analyze_sets(&[set(100.0, previous_reps), set(100.0, current_reps)]);

        assert_eq!(results[0].status, status);
        assert_eq!(results[0].label, label);
    }

    #[test]
    fn test_fatigue_rationale_differs_after_first_set() {
        let results = analyze_sets(&[set(100.0, 10), set(100.0, 8), set(100.0, 6)]);

        assert!(results[0].insight.why.contains("after the opening set"));
        assert!(results[1].insight.why.contains("as fatigue accumulated"));
    }

    #[test]
    fn test_exact_prediction_is_good_not_strong_overload() {
        // Best prior 1RM is 120.0, so 2.0 reps are predicted at 112.5 kg.
        let results = analyze_sets(&[set(100.0, 6), set(112.5, 2)]);

        assert_eq!(results[0].status, Status::Success);
        assert_eq!(results[0].label, "Good Overload");
    }

    #[test]
    fn test_strong_overload_beats_prediction() {
        let results = analyze_sets(&[set(100.0, 6), set(112.5, 3)]);

        assert_eq!(results[0].status, Status::Success);
        assert_eq!(results[0].label, "Strong Overload");
    }

    #[rstest]
    #[case(6, Status::Warning, "Slightly Ambitious")]
    #[case(4, Status::Danger, "Premature Jump")]
    fn test_overload_shortfall_bands(
        #[case] current_reps: u32,
        #[case] status: Status,
        #[case] label: &str,
    ) {
        // Best prior 1RM is 140.0, so 8.18 reps are predicted at 110 kg.
        let results = analyze_sets(&[set(100.0, 12), set(110.0, current_reps)]);

        assert_eq!(results[0].status, status);
        assert_eq!(results[0].label, label);
    }

    #[rstest]
    #[case(6, Status::Success, "Effective Backoff")]
    #[case(4, Status::Info, "Fatigued Backoff")]
    #[case(2, Status::Warning, "Heavy Fatigue")]
    fn test_backoff_bands(#[case] current_reps: u32, #[case] status: Status, #[case] label: &str) {
        // Best prior 1RM is 120.0, so 6.0 reps are predicted at 100 kg.
        let results = analyze_sets(&[set(112.5, 2), set(100.0, current_reps)]);

        assert_eq!(results[0].status, status);
        assert_eq!(results[0].label, label);
    }

    #[rstest]
    #[case(&[(100.0, 5), (100.0, 5)], TrainingGoal::Strength, 5.0)]
    #[case(&[(80.0, 8), (80.0, 12)], TrainingGoal::Hypertrophy, 10.0)]
    #[case(&[(40.0, 18), (40.0, 16)], TrainingGoal::Endurance, 17.0)]
    fn test_analyze_session_goal(
        #[case] sets: &[(f32, u32)],
        #[case] goal: TrainingGoal,
        #[case] avg_reps: f32,
    ) {
        let events: Vec<TrainingEvent> = sets.iter().map(|(w, r)| set(*w, *r)).collect();

        let analysis = analyze_session(&events).unwrap();

        assert_eq!(analysis.goal, goal);
        assert_approx_eq!(analysis.avg_reps, avg_reps);
    }

    #[test]
    fn test_analyze_session_empty() {
        assert_eq!(analyze_session(&[]), None);
    }

    #[test]
    fn test_summarize_sessions_picks_best_set_per_day() {
        let events = vec![
            dated_set(1, 100.0, 8),
            dated_set(1, 105.0, 3),
            dated_set(3, 100.0, 9),
        ];

        let summaries = summarize_sessions(&events);

        assert_eq!(summaries.len(), 2);
        // 100 kg x 8 (1RM 126.7) beats 105 kg x 3 (1RM 115.5).
        assert_approx_eq!(summaries[0].weight_kg, 100.0);
        assert_eq!(summaries[0].reps, 8);
        assert_eq!(summaries[0].max_reps, 8);
        assert_approx_eq!(summaries[1].one_rep_max, 130.0, 1e-3);
    }

    #[test]
    fn test_trend_new_with_few_sessions() {
        let summaries = vec![
            summary(1, 100.0, 8, 126.7, 8),
            summary(3, 100.0, 8, 126.7, 8),
            summary(5, 105.0, 6, 126.0, 6),
        ];

        let trend = exercise_trend(&summaries);

        assert_eq!(trend.state, TrendState::New);
        assert_eq!(trend.metric, TrendMetric::OneRepMax);
    }

    #[test]
    fn test_trend_new_without_signal() {
        let summaries: Vec<SessionSummary> =
            (1..=4).map(|day| summary(day, 0.0, 0, 0.0, 0)).collect();

        assert_eq!(exercise_trend(&summaries).state, TrendState::New);
    }

    #[test]
    fn test_trend_stagnant() {
        let summaries: Vec<SessionSummary> = (1..=4)
            .map(|day| summary(day, 100.0, 8, 126.7, 8))
            .collect();

        assert_eq!(exercise_trend(&summaries).state, TrendState::Stagnant);
    }

    #[test]
    fn test_trend_not_stagnant_when_weight_moved() {
        // The scenario from the ingestion round-trip: top weight moved by
        // more than 0.5 kg, so the verdict comes from the windowed averages.
        let summaries = vec![
            summary(1, 100.0, 8, 126.666_67, 8),
            summary(3, 100.0, 8, 126.666_67, 8),
            summary(5, 100.0, 8, 126.666_67, 8),
            summary(7, 105.0, 6, 126.0, 6),
        ];

        let trend = exercise_trend(&summaries);

        assert_ne!(trend.state, TrendState::Stagnant);
        // Current average 126.33 vs previous 126.67 is a -0.26% move, inside
        // the +-1% dead band.
        assert_eq!(trend.state, TrendState::Neutral);
        assert!(trend.change_pct.abs() < TREND_THRESHOLD_PCT);
    }

    #[test]
    fn test_trend_overload() {
        let summaries = vec![
            summary(1, 100.0, 8, 126.7, 8),
            summary(3, 100.0, 8, 126.7, 8),
            summary(5, 102.5, 8, 129.8, 8),
            summary(7, 105.0, 8, 133.0, 8),
        ];

        let trend = exercise_trend(&summaries);

        assert_eq!(trend.state, TrendState::Overload);
        assert!(trend.change_pct >= TREND_THRESHOLD_PCT);
    }

    #[test]
    fn test_trend_regression() {
        let summaries = vec![
            summary(1, 105.0, 8, 133.0, 8),
            summary(3, 105.0, 8, 133.0, 8),
            summary(5, 100.0, 8, 126.7, 8),
            summary(7, 100.0, 7, 123.3, 7),
        ];

        let trend = exercise_trend(&summaries);

        assert_eq!(trend.state, TrendState::Regression);
        assert!(trend.change_pct <= -TREND_THRESHOLD_PCT);
    }

    #[test]
    fn test_trend_fake_pr() {
        // A 5% spike given straight back, while the windowed averages stay
        // inside the dead band.
        let summaries = vec![
            summary(1, 100.0, 4, 100.0, 4),
            summary(3, 105.0, 4, 105.0, 4),
            summary(5, 101.0, 4, 101.0, 4),
            summary(7, 103.0, 4, 103.0, 4),
        ];

        let trend = exercise_trend(&summaries);

        assert_eq!(trend.state, TrendState::FakePr);
    }

    #[test]
    fn test_trend_bodyweight_uses_max_reps() {
        let summaries = vec![
            summary(1, 0.0, 10, 0.0, 10),
            summary(3, 0.0, 11, 0.0, 11),
            summary(5, 0.0, 12, 0.0, 12),
            summary(7, 0.0, 13, 0.0, 13),
        ];

        let trend = exercise_trend(&summaries);

        assert_eq!(trend.metric, TrendMetric::MaxReps);
        assert_eq!(trend.state, TrendState::Overload);
    }

    #[test]
    fn test_trend_empty() {
        assert_eq!(exercise_trend(&[]).state, TrendState::New);
    }

    #[rstest]
    #[case(&[(100.0, 10), (100.0, 10)], Some(WeightAdvice::Increase { min_pct: 2.5, max_pct: 5.0 }))]
    #[case(&[(100.0, 12), (100.0, 13)], Some(WeightAdvice::Increase { min_pct: 5.0, max_pct: 10.0 }))]
    #[case(&[(100.0, 4), (100.0, 3)], Some(WeightAdvice::Decrease { min_pct: 5.0, max_pct: 10.0 }))]
    #[case(&[(100.0, 8), (100.0, 6)], Some(WeightAdvice::Hold))]
    #[case(&[(100.0, 10), (95.0, 2)], Some(WeightAdvice::Increase { min_pct: 2.5, max_pct: 5.0 }))]
    #[case(&[], None)]
    fn test_weight_recommendation(
        #[case] sets: &[(f32, u32)],
        #[case] expected: Option<WeightAdvice>,
    ) {
        let events: Vec<TrainingEvent> = sets.iter().map(|(w, r)| set(*w, *r)).collect();

        assert_eq!(weight_recommendation(&events, DEFAULT_REP_TARGET), expected);
    }
}
