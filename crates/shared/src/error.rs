use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown status value '{value}'")]
pub struct UnknownStatus {
    pub value: String,
}

impl UnknownStatus {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

/// A collection response that does not match the expected page schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResponseShapeError {
    #[error("response body is not a JSON object")]
    NotAnObject,
    #[error("response body is not a list")]
    NotAList,
    #[error("`data` is missing or not a list")]
    DataNotAList,
    #[error("`totalPages` is missing")]
    MissingTotalPages,
    #[error("`{field}` is not a non-negative integer")]
    InvalidCounter { field: &'static str },
    #[error("page {page} is outside 1..={total_pages}")]
    PageOutOfRange { page: u32, total_pages: u32 },
    #[error("item {index} could not be decoded: {reason}")]
    InvalidItem { index: usize, reason: String },
}

/// Error payload the backend sends alongside non-2xx responses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            message: None,
        }
    }

    pub fn into_message(self) -> Option<String> {
        self.error.or(self.message).filter(|m| !m.trim().is_empty())
    }
}
