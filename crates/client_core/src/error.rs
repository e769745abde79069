use std::fmt;

use shared::{domain::ResourceId, error::ResponseShapeError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("server responded {status}: {message}")]
    Status { status: u16, message: String },
    #[error("response body is not valid JSON: {0}")]
    InvalidBody(#[from] serde_json::Error),
    #[error("base url '{0}' cannot carry path segments")]
    CannotBeABase(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    UpdateStatus,
    Delete,
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UpdateStatus => f.write_str("update status of"),
            Self::Delete => f.write_str("delete"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("failed to fetch {collection} page {page}: {source}")]
    Fetch {
        collection: &'static str,
        page: u32,
        #[source]
        source: TransportError,
    },
    #[error("invalid data structure received for {collection} page {page}: {source}")]
    DataShape {
        collection: &'static str,
        page: u32,
        #[source]
        source: ResponseShapeError,
    },
    #[error("failed to {kind} {label} {id}: {source}")]
    Mutation {
        kind: MutationKind,
        label: &'static str,
        id: ResourceId,
        #[source]
        source: TransportError,
    },
    #[error("page {requested} is outside 1..={total_pages}")]
    InvalidPage { requested: u32, total_pages: u32 },
    #[error("{label} {id} is not on the current page")]
    UnknownItem { label: &'static str, id: ResourceId },
    #[error("{label} {id} already has status '{status}'")]
    StatusUnchanged {
        label: &'static str,
        id: ResourceId,
        status: &'static str,
    },
    #[error("status '{status}' cannot be assigned to a {label}")]
    InvalidStatus {
        label: &'static str,
        status: &'static str,
    },
    #[error("no {label} selected")]
    EmptySelection { label: &'static str },
    #[error("failed to load {collection}: {source}")]
    List {
        collection: &'static str,
        #[source]
        source: TransportError,
    },
    #[error("invalid data structure received for {collection}: {source}")]
    ListShape {
        collection: &'static str,
        #[source]
        source: ResponseShapeError,
    },
    #[error("unknown category '{name}' (known: {known})")]
    UnknownCategory { name: String, known: String },
}

impl ControllerError {
    /// Read failures are offered a retry; everything else is dismissed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Fetch { .. } | Self::DataShape { .. } | Self::List { .. } | Self::ListShape { .. }
        )
    }
}
