use thiserror::Error;

#[derive(Error, Debug)]
pub enum SurveyError {
    #[error("Shape mismatch in {context}: expected {expected}, got {got}")]
    ShapeMismatch {
        context: String,
        expected: String,
        got: String,
    },

    #[error("Unit mismatch in {context}: '{left}' vs '{right}'")]
    UnitMismatch {
        context: String,
        left: String,
        right: String,
    },

    #[error("Unsupported unit '{unit}' for {quantity}")]
    UnsupportedUnit { unit: String, quantity: String },

    #[error("Timestamps are not strictly increasing at index {index}")]
    NonMonotonicTime { index: usize },

    #[error("Degenerate tetrahedron (coplanar spacecraft) at sample {index}")]
    DegenerateTetrahedron { index: usize },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type SurveyResult<T> = Result<T, SurveyError>;

impl SurveyError {
    pub fn shape(context: &str, expected: impl ToString, got: impl ToString) -> Self {
        SurveyError::ShapeMismatch {
            context: context.to_string(),
            expected: expected.to_string(),
            got: got.to_string(),
        }
    }
}
