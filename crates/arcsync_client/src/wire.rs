use serde::Deserialize;

/// One archive entry as returned by the index, metadata and search
/// endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IndexEntry {
    pub arcid: String,
    pub title: String,
    #[serde(default)]
    pub tags: Option<String>,
    #[serde(default)]
    pub isnew: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SearchResult {
    pub data: Vec<IndexEntry>,
    #[serde(default, rename = "recordsFiltered")]
    pub records_filtered: Option<i64>,
    #[serde(default, rename = "recordsTotal")]
    pub records_total: Option<i64>,
}

/// Page references prepared by the extract endpoint, each fetchable via
/// `fetch_page`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExtractResult {
    pub pages: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CategoryEntry {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub archives: Vec<String>,
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub pinned: Option<String>,
}

/// Optional query parameters for the search endpoint. Absent fields are left
/// out of the query string entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    pub category: Option<String>,
    pub filter: Option<String>,
    pub start: Option<String>,
    pub sortby: Option<String>,
    pub order: Option<String>,
}

impl SearchQuery {
    pub fn with_filter(keyword: impl Into<String>) -> Self {
        Self {
            filter: Some(keyword.into()),
            ..Self::default()
        }
    }

    pub(crate) fn to_params(&self) -> Vec<(&'static str, &str)> {
        let mut params = Vec::new();
        if let Some(category) = self.category.as_deref() {
            params.push(("category", category));
        }
        if let Some(filter) = self.filter.as_deref() {
            params.push(("filter", filter));
        }
        if let Some(start) = self.start.as_deref() {
            params.push(("start", start));
        }
        if let Some(sortby) = self.sortby.as_deref() {
            params.push(("sortby", sortby));
        }
        if let Some(order) = self.order.as_deref() {
            params.push(("order", order));
        }
        params
    }
}
