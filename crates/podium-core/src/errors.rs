use thiserror::Error;

#[derive(Debug, Error)]
#[error("config error: {0}")]
pub struct ConfigError(pub String);

/// Fatal problems with the data fed into a scoring run. None of these are
/// recoverable: the input has to be fixed and the run repeated.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("{file}: missing required column '{column}'")]
    MissingColumn { file: String, column: String },

    #[error("{file}: row {row}, column '{column}': invalid value '{value}' (expected {expected})")]
    InvalidValue {
        file: String,
        row: usize,
        column: String,
        value: String,
        expected: String,
    },

    #[error("cannot resolve division of benchmark '{benchmark}': {reason}")]
    Division { benchmark: String, reason: String },

    #[error("inconsistent input: {0}")]
    Consistency(String),

    #[error("ranking invariant violated: {0}")]
    Ranking(String),

    #[error("duplicate result for solver '{solver}' on '{division}/{benchmark}'")]
    Duplicate {
        division: String,
        benchmark: String,
        solver: String,
    },

    #[error("{file}: {source}")]
    Csv {
        file: String,
        #[source]
        source: csv::Error,
    },
}

impl InputError {
    pub fn csv(file: &str, source: csv::Error) -> Self {
        InputError::Csv {
            file: file.to_string(),
            source,
        }
    }
}
