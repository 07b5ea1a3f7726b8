/// Classified, user-actionable ingestion failures. A single malformed row is
/// never one of these; row-level problems degrade to default values instead.
#[derive(thiserror::Error, Debug)]
pub enum IngestError {
    #[error("The file contains no data")]
    EmptyInput,
    #[error("Unrecognized CSV format")]
    UnrecognizedFormat,
    #[error("Could not detect an exercise column")]
    MissingExerciseColumn,
    #[error("Could not detect a date column")]
    MissingStartTimeColumn,
    #[error("Could not detect a weight column")]
    MissingWeightColumn,
    #[error(
        "Only {parsed} of {dated} dates could be parsed; the export probably uses an unsupported date localization"
    )]
    UnparseableDates { dated: usize, parsed: usize },
    #[error(transparent)]
    Csv(#[from] csv::Error),
}
