use crate::failure::{ActionFailure, ValidationFailure};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TidyError {
    #[error(transparent)]
    Validation(#[from] ValidationFailure),

    #[error(transparent)]
    Action(#[from] ActionFailure),

    #[error("plan not found: {0}")]
    PlanNotFound(String),

    #[error("unsupported plan version {0}: expected 1")]
    UnsupportedPlanVersion(u32),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("invalid JSON pointer: {0}")]
    InvalidPointer(String),

    #[error("invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

pub type Result<T> = std::result::Result<T, TidyError>;
