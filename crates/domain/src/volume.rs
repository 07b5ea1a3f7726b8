use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

use crate::catalog::Catalog;
use crate::event::TrainingEvent;
use crate::muscle::{MuscleGroup, Property};

/// A gap of strictly more than this many calendar days between two training
/// days is a break.
pub const BREAK_GAP_DAYS: i64 = 7;

const WINDOW_DAYS: i64 = 7;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

/// Raw per-muscle set-equivalents of one training day.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DailyVolume<K: Ord> {
    pub date: NaiveDate,
    pub sets: BTreeMap<K, f32>,
}

/// Rolling-7-day per-muscle set-equivalents, keyed by the training day the
/// window ends on.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RollingVolume<K: Ord> {
    pub date: NaiveDate,
    pub sets: BTreeMap<K, f32>,
    pub total: f32,
    pub in_break: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TimeSeriesEntry {
    pub date: NaiveDate,
    pub label: String,
    pub values: BTreeMap<String, f32>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct VolumeSeries {
    pub data: Vec<TimeSeriesEntry>,
    pub keys: Vec<String>,
}

/// Per-day training volume per muscle group.
#[must_use]
pub fn daily_group_volume(
    events: &[TrainingEvent],
    catalog: &Catalog,
) -> Vec<DailyVolume<MuscleGroup>> {
    to_daily(daily_buckets(events, |e| catalog.group_contributions(e)))
}

/// Per-day training volume per individual muscle.
#[must_use]
pub fn daily_muscle_volume(
    events: &[TrainingEvent],
    catalog: &Catalog,
) -> Vec<DailyVolume<String>> {
    to_daily(daily_buckets(events, |e| catalog.muscle_contributions(e)))
}

/// Rolling-7-day training volume per muscle group, with break tagging.
#[must_use]
pub fn rolling_group_volume(
    events: &[TrainingEvent],
    catalog: &Catalog,
) -> Vec<RollingVolume<MuscleGroup>> {
    rolling(&daily_buckets(events, |e| catalog.group_contributions(e)))
}

/// Rolling-7-day training volume per individual muscle, with break tagging.
#[must_use]
pub fn rolling_muscle_volume(
    events: &[TrainingEvent],
    catalog: &Catalog,
) -> Vec<RollingVolume<String>> {
    rolling(&daily_buckets(events, |e| catalog.muscle_contributions(e)))
}

/// Volume time series per muscle group for the given period.
#[must_use]
pub fn muscle_group_volume(
    events: &[TrainingEvent],
    catalog: &Catalog,
    period: Period,
) -> VolumeSeries {
    series(
        daily_buckets(events, |e| catalog.group_contributions(e)),
        period,
        |group| group.name().to_string(),
    )
}

/// Volume time series per individual muscle for the given period.
#[must_use]
pub fn muscle_volume(
    events: &[TrainingEvent],
    catalog: &Catalog,
    period: Period,
) -> VolumeSeries {
    series(
        daily_buckets(events, |e| catalog.muscle_contributions(e)),
        period,
        Clone::clone,
    )
}

fn daily_buckets<K: Ord + Clone>(
    events: &[TrainingEvent],
    contributions: impl Fn(&str) -> BTreeMap<K, f32>,
) -> BTreeMap<NaiveDate, BTreeMap<K, f32>> {
    let mut buckets: BTreeMap<NaiveDate, BTreeMap<K, f32>> = BTreeMap::new();

    for event in events.iter().filter(|e| e.is_working_set()) {
        let Some(date) = event.date() else {
            continue;
        };
        let bucket = buckets.entry(date).or_default();
        for (key, sets) in contributions(&event.exercise) {
            *bucket.entry(key).or_insert(0.0) += sets;
        }
    }

    buckets
}

fn to_daily<K: Ord + Clone>(
    buckets: BTreeMap<NaiveDate, BTreeMap<K, f32>>,
) -> Vec<DailyVolume<K>> {
    buckets
        .into_iter()
        .map(|(date, sets)| DailyVolume { date, sets })
        .collect()
}

/// Sliding accumulator over the trailing window: the current day is added,
/// then every day outside `[date - 6, date]` is evicted.
fn rolling<K: Ord + Clone>(
    buckets: &BTreeMap<NaiveDate, BTreeMap<K, f32>>,
) -> Vec<RollingVolume<K>> {
    let days: Vec<(&NaiveDate, &BTreeMap<K, f32>)> = buckets.iter().collect();

    let mut acc: BTreeMap<K, f32> = BTreeMap::new();
    let mut start = 0;
    let mut previous_day: Option<NaiveDate> = None;
    let mut result = Vec::with_capacity(days.len());

    for (date, sets) in &days {
        let date = **date;

        for (key, value) in *sets {
            *acc.entry(key.clone()).or_insert(0.0) += value;
        }

        let window_start = date - Duration::days(WINDOW_DAYS - 1);
        while *days[start].0 < window_start {
            for (key, value) in days[start].1 {
                if let Some(entry) = acc.get_mut(key) {
                    *entry -= value;
                    if *entry <= f32::EPSILON {
                        acc.remove(key);
                    }
                }
            }
            start += 1;
        }

        let in_break =
            previous_day.is_some_and(|prev| (date - prev).num_days() > BREAK_GAP_DAYS);
        previous_day = Some(date);

        result.push(RollingVolume {
            date,
            sets: acc.clone(),
            total: acc.values().sum(),
            in_break,
        });
    }

    result
}

fn series<K: Ord + Clone>(
    buckets: BTreeMap<NaiveDate, BTreeMap<K, f32>>,
    period: Period,
    key_name: impl Fn(&K) -> String,
) -> VolumeSeries {
    let entries: Vec<(NaiveDate, String, BTreeMap<K, f32>)> = match period {
        Period::Daily => buckets
            .iter()
            .map(|(date, sets)| (*date, day_label(*date), sets.clone()))
            .collect(),
        Period::Weekly => rolling(&buckets)
            .into_iter()
            .map(|snapshot| (snapshot.date, day_label(snapshot.date), snapshot.sets))
            .collect(),
        Period::Monthly => averaged(&rolling(&buckets), |date| {
            (
                NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date),
                month_label(date),
            )
        }),
        Period::Yearly => averaged(&rolling(&buckets), |date| {
            (
                NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date),
                date.year().to_string(),
            )
        }),
    };

    let mut keys: Vec<K> = Vec::new();
    for (_, _, values) in &entries {
        for key in values.keys() {
            if !keys.contains(key) {
                keys.push(key.clone());
            }
        }
    }
    keys.sort();

    let data = entries
        .into_iter()
        .map(|(date, label, values)| TimeSeriesEntry {
            date,
            label,
            values: keys
                .iter()
                .map(|key| (key_name(key), values.get(key).copied().unwrap_or(0.0)))
                .collect(),
        })
        .collect();

    VolumeSeries {
        data,
        keys: keys.iter().map(key_name).collect(),
    }
}

/// Arithmetic mean of the non-break rolling snapshots in each period:
/// "average weekly sets", not a period total.
#[allow(clippy::cast_precision_loss)]
fn averaged<K: Ord + Clone>(
    snapshots: &[RollingVolume<K>],
    period_of: impl Fn(NaiveDate) -> (NaiveDate, String),
) -> Vec<(NaiveDate, String, BTreeMap<K, f32>)> {
    let mut periods: BTreeMap<NaiveDate, (String, usize, BTreeMap<K, f32>)> = BTreeMap::new();

    for snapshot in snapshots.iter().filter(|s| !s.in_break) {
        let (period_date, label) = period_of(snapshot.date);
        let (_, count, sums) = periods
            .entry(period_date)
            .or_insert_with(|| (label, 0, BTreeMap::new()));
        *count += 1;
        for (key, value) in &snapshot.sets {
            *sums.entry(key.clone()).or_insert(0.0) += value;
        }
    }

    periods
        .into_iter()
        .map(|(date, (label, count, sums))| {
            let values = sums
                .into_iter()
                .map(|(key, sum)| (key, sum / count as f32))
                .collect();
            (date, label, values)
        })
        .collect()
}

static MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

fn month_name(month: u32) -> &'static str {
    MONTH_NAMES[(month as usize - 1).min(11)]
}

fn day_label(date: NaiveDate) -> String {
    format!("{} {} {}", date.day(), month_name(date.month()), date.year())
}

fn month_label(date: NaiveDate) -> String {
    format!("{} {}", month_name(date.month()), date.year())
}
