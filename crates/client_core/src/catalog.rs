//! Product categories, used to back and check the category filter.

use shared::{domain::Category, protocol::parse_list};
use tracing::{debug, warn};

use crate::{error::ControllerError, transport::CollectionApi};

pub async fn load_categories(api: &impl CollectionApi) -> Result<Vec<Category>, ControllerError> {
    let body = api
        .list(Category::COLLECTION)
        .await
        .map_err(|source| ControllerError::List {
            collection: Category::COLLECTION,
            source,
        })
        .inspect_err(|err| warn!(error = %err, "category list failed"))?;
    let categories: Vec<Category> =
        parse_list(body).map_err(|source| ControllerError::ListShape {
            collection: Category::COLLECTION,
            source,
        })?;
    debug!(count = categories.len(), "categories loaded");
    Ok(categories)
}

/// Resolves a user-typed category against the known list.
pub fn find_category<'a>(
    categories: &'a [Category],
    name: &str,
) -> Result<&'a Category, ControllerError> {
    categories
        .iter()
        .find(|category| category.is_named(name))
        .ok_or_else(|| ControllerError::UnknownCategory {
            name: name.trim().to_string(),
            known: categories
                .iter()
                .map(|category| category.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn categories() -> Vec<Category> {
        serde_json::from_value(json!([
            { "_id": "c1", "name": "Kitchen", "slug": "kitchen" },
            { "_id": "c2", "name": "Garden Tools", "slug": "garden-tools" },
        ]))
        .expect("categories")
    }

    #[test]
    fn finds_category_by_name_or_slug() {
        let categories = categories();
        assert_eq!(find_category(&categories, "garden tools").expect("by name").id.as_str(), "c2");
        assert_eq!(find_category(&categories, "GARDEN-TOOLS").expect("by slug").id.as_str(), "c2");
    }

    #[test]
    fn unknown_category_lists_known_names() {
        let err = find_category(&categories(), "toys").expect_err("should fail");
        assert_eq!(
            err.to_string(),
            "unknown category 'toys' (known: Kitchen, Garden Tools)"
        );
        assert!(!err.is_retryable());
    }
}
