use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    domain::{Resource, StatusValue},
    error::ResponseShapeError,
};

/// Window metadata for the currently loaded page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub total_pages: u32,
    pub total: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            total_pages: 1,
            total: 0,
        }
    }
}

impl Pagination {
    pub fn contains(&self, page: u32) -> bool {
        page >= 1 && page <= self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

/// Body of `PATCH /{resource}/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: String,
}

impl StatusUpdateRequest {
    pub fn new(status: impl StatusValue) -> Self {
        Self {
            status: status.as_str().to_string(),
        }
    }
}

/// Wire shape of `GET /{resource}?page=n`, used by servers producing pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse<T> {
    pub data: Vec<T>,
    pub page: u32,
    pub total_pages: u32,
    pub total: u64,
}

/// Validates a collection response and decodes its items.
///
/// `data` must be a list and `totalPages` must be present. Missing or zero
/// `page`/`totalPages` fall back to 1 and a missing `total` to 0.
pub fn parse_page<T: Resource>(body: Value) -> Result<Page<T>, ResponseShapeError> {
    let Value::Object(mut fields) = body else {
        return Err(ResponseShapeError::NotAnObject);
    };

    let Some(Value::Array(raw_items)) = fields.remove("data") else {
        return Err(ResponseShapeError::DataNotAList);
    };
    if !fields.contains_key("totalPages") {
        return Err(ResponseShapeError::MissingTotalPages);
    }

    let page = counter(&fields, "page")?.unwrap_or(0).max(1);
    let total_pages = counter(&fields, "totalPages")?.unwrap_or(0).max(1);
    let total = counter(&fields, "total")?.unwrap_or(0);

    let page =
        u32::try_from(page).map_err(|_| ResponseShapeError::InvalidCounter { field: "page" })?;
    let total_pages = u32::try_from(total_pages).map_err(|_| ResponseShapeError::InvalidCounter {
        field: "totalPages",
    })?;
    if page > total_pages {
        return Err(ResponseShapeError::PageOutOfRange { page, total_pages });
    }

    Ok(Page {
        items: decode_items(raw_items)?,
        pagination: Pagination {
            page,
            total_pages,
            total,
        },
    })
}

/// Decodes an unpaginated collection: either a bare list or `{ data: [...] }`.
pub fn parse_list<T: DeserializeOwned>(body: Value) -> Result<Vec<T>, ResponseShapeError> {
    match body {
        Value::Array(raw_items) => decode_items(raw_items),
        Value::Object(mut fields) => match fields.remove("data") {
            Some(Value::Array(raw_items)) => decode_items(raw_items),
            _ => Err(ResponseShapeError::DataNotAList),
        },
        _ => Err(ResponseShapeError::NotAList),
    }
}

fn decode_items<T: DeserializeOwned>(
    raw_items: Vec<Value>,
) -> Result<Vec<T>, ResponseShapeError> {
    raw_items
        .into_iter()
        .enumerate()
        .map(|(index, raw)| {
            serde_json::from_value::<T>(raw).map_err(|err| ResponseShapeError::InvalidItem {
                index,
                reason: err.to_string(),
            })
        })
        .collect()
}

fn counter(
    fields: &Map<String, Value>,
    field: &'static str,
) -> Result<Option<u64>, ResponseShapeError> {
    match fields.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| {
                n.as_f64()
                    .filter(|f| *f >= 0.0 && f.fract() == 0.0 && *f <= u64::MAX as f64)
                    .map(|f| f as u64)
            })
            .map(Some)
            .ok_or(ResponseShapeError::InvalidCounter { field }),
        Some(_) => Err(ResponseShapeError::InvalidCounter { field }),
    }
}
