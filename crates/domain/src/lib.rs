#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

pub mod catalog;
pub mod event;
pub mod muscle;
pub mod progression;
pub mod resolver;
pub mod units;
pub mod volume;

pub use catalog::{Catalog, CatalogEntry};
pub use event::{Rpe, RpeError, SetType, SetTypeError, TrainingEvent};
pub use muscle::{MuscleGroup, Property};
pub use progression::{
    AnalysisResult, ExerciseTrend, Insight, SessionAnalysis, SessionSummary, Status, TrainingGoal,
    TrendMetric, TrendState, WeightAdvice,
};
pub use resolver::{
    ExerciseResolver, FuzzyMode, Resolution, ResolutionMethod, ResolutionSummary,
};
pub use units::{DistanceUnit, UnitError, WeightUnit};
pub use volume::{
    DailyVolume, Period, RollingVolume, TimeSeriesEntry, VolumeSeries,
};
