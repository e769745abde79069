use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};

use crate::error::UnknownStatus;

/// Opaque server-assigned identifier (`_id` on the wire).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(pub String);

impl ResourceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Trailing six characters, the form admins see in tables.
    pub fn short(&self) -> &str {
        let start = self
            .0
            .char_indices()
            .rev()
            .nth(5)
            .map(|(idx, _)| idx)
            .unwrap_or(0);
        &self.0[start..]
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

pub trait StatusValue:
    Copy + Eq + fmt::Debug + fmt::Display + FromStr<Err = UnknownStatus> + Send + Sync + 'static
{
    fn as_str(self) -> &'static str;

    /// Values an admin may set. Placeholder values decoded from bad data are excluded.
    fn assignable() -> &'static [Self];

    fn is_assignable(self) -> bool {
        Self::assignable().contains(&self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub enum OrderStatus {
    Pending,
    Processing,
    Completed,
    Cancelled,
    #[default]
    Unknown,
}

impl StatusValue for OrderStatus {
    fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Unknown => "unknown",
        }
    }

    fn assignable() -> &'static [Self] {
        &[
            Self::Pending,
            Self::Processing,
            Self::Completed,
            Self::Cancelled,
        ]
    }
}

impl FromStr for OrderStatus {
    type Err = UnknownStatus;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(UnknownStatus::new(raw)),
        }
    }
}

impl From<Option<String>> for OrderStatus {
    fn from(value: Option<String>) -> Self {
        value
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(Self::Unknown)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub enum ProductStatus {
    #[default]
    Published,
    Draft,
    Archived,
    Unknown,
}

impl StatusValue for ProductStatus {
    fn as_str(self) -> &'static str {
        match self {
            Self::Published => "published",
            Self::Draft => "draft",
            Self::Archived => "archived",
            Self::Unknown => "unknown",
        }
    }

    fn assignable() -> &'static [Self] {
        &[Self::Published, Self::Draft, Self::Archived]
    }
}

impl FromStr for ProductStatus {
    type Err = UnknownStatus;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "published" => Ok(Self::Published),
            "draft" => Ok(Self::Draft),
            "archived" => Ok(Self::Archived),
            _ => Err(UnknownStatus::new(raw)),
        }
    }
}

impl From<Option<String>> for ProductStatus {
    fn from(value: Option<String>) -> Self {
        match value {
            None => Self::Published,
            Some(raw) if raw.trim().is_empty() => Self::Published,
            Some(raw) => raw.parse().unwrap_or(Self::Unknown),
        }
    }
}

macro_rules! status_string_impls {
    ($name:ident) => {
        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.as_str().to_string()
            }
        }
    };
}

status_string_impls!(OrderStatus);
status_string_impls!(ProductStatus);

/// An item of a remotely paginated collection with a mutable status.
pub trait Resource: Clone + fmt::Debug + DeserializeOwned + Send + Sync + 'static {
    type Status: StatusValue;

    /// Path segment of the collection endpoint.
    const COLLECTION: &'static str;
    /// Singular noun used in prompts and log lines.
    const LABEL: &'static str;

    fn id(&self) -> &ResourceId;
    fn status(&self) -> Self::Status;
    fn set_status(&mut self, status: Self::Status);

    fn search_text(&self) -> Vec<&str> {
        Vec::new()
    }

    fn category(&self) -> Option<&str> {
        None
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomerInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    #[serde(default)]
    pub title: String,
    #[serde(default = "one")]
    pub quantity: u32,
    #[serde(default, deserialize_with = "lenient_number")]
    pub price: Option<f64>,
}

fn one() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: ResourceId,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub customer_info: Option<CustomerInfo>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub total: Option<f64>,
    #[serde(default)]
    pub payment_status: Option<String>,
    #[serde(default)]
    pub items: Vec<OrderItem>,
}

impl Resource for Order {
    type Status = OrderStatus;

    const COLLECTION: &'static str = "orders";
    const LABEL: &'static str = "order";

    fn id(&self) -> &ResourceId {
        &self.id
    }

    fn status(&self) -> OrderStatus {
        self.status
    }

    fn set_status(&mut self, status: OrderStatus) {
        self.status = status;
    }

    fn search_text(&self) -> Vec<&str> {
        let mut text = vec![self.id.as_str()];
        if let Some(customer) = &self.customer_info {
            text.extend(customer.name.as_deref());
            text.extend(customer.email.as_deref());
        }
        text
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: ResourceId,
    #[serde(default)]
    pub status: ProductStatus,
    #[serde(default)]
    pub product_title: String,
    #[serde(default)]
    pub sku: String,
    #[serde(default)]
    pub product_category: String,
    #[serde(default)]
    pub product_brand: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub product_amount: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub stock_quantity: Option<f64>,
}

impl Resource for Product {
    type Status = ProductStatus;

    const COLLECTION: &'static str = "products";
    const LABEL: &'static str = "product";

    fn id(&self) -> &ResourceId {
        &self.id
    }

    fn status(&self) -> ProductStatus {
        self.status
    }

    fn set_status(&mut self, status: ProductStatus) {
        self.status = status;
    }

    fn search_text(&self) -> Vec<&str> {
        vec![self.product_title.as_str(), self.sku.as_str()]
    }

    fn category(&self) -> Option<&str> {
        Some(self.product_category.as_str())
    }
}

/// Product category. Categories are listed whole, without pagination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    #[serde(rename = "_id")]
    pub id: ResourceId,
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl Category {
    pub const COLLECTION: &'static str = "categories";

    /// Case-insensitive match on the display name or the slug.
    pub fn is_named(&self, name: &str) -> bool {
        let name = name.trim();
        self.name.trim().eq_ignore_ascii_case(name)
            || self
                .slug
                .as_deref()
                .is_some_and(|slug| slug.eq_ignore_ascii_case(name))
    }
}

/// Accepts JSON numbers and numeric strings; anything else decodes as `None`.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}
