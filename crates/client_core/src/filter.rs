use shared::domain::Resource;

/// Client-side narrowing of the loaded page. Matching is case-insensitive.
#[derive(Debug, Clone)]
pub struct ItemFilter<S> {
    pub search: Option<String>,
    pub status: Option<S>,
    pub category: Option<String>,
}

impl<S> Default for ItemFilter<S> {
    fn default() -> Self {
        Self {
            search: None,
            status: None,
            category: None,
        }
    }
}

impl<S: Copy + Eq> ItemFilter<S> {
    pub fn matches<T>(&self, item: &T) -> bool
    where
        T: Resource<Status = S>,
    {
        self.matches_search(item) && self.matches_status(item) && self.matches_category(item)
    }

    fn matches_search<T: Resource<Status = S>>(&self, item: &T) -> bool {
        let Some(term) = self.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) else {
            return true;
        };
        let term = term.to_lowercase();
        item.search_text()
            .iter()
            .any(|text| text.to_lowercase().contains(&term))
    }

    fn matches_status<T: Resource<Status = S>>(&self, item: &T) -> bool {
        self.status.map_or(true, |status| item.status() == status)
    }

    fn matches_category<T: Resource<Status = S>>(&self, item: &T) -> bool {
        let Some(category) = self.category.as_deref() else {
            return true;
        };
        item.category()
            .is_some_and(|c| c.eq_ignore_ascii_case(category.trim()))
    }
}
