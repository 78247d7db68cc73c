/// How a load call populates the collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchStrategy {
    /// One request for the server's full archive index.
    FullIndex,
    /// One search request filtered by the given keyword.
    Search(String),
    /// One metadata request per archive id, issued concurrently.
    CategorySubset(Vec<String>),
}

impl FetchStrategy {
    /// Selects the strategy from the caller's optional parameters.
    ///
    /// A non-empty search keyword takes precedence over a non-empty category
    /// subset; the full index is the default.
    pub fn select(search_keyword: Option<&str>, category_ids: Option<&[String]>) -> Self {
        if let Some(keyword) = search_keyword {
            if !keyword.is_empty() {
                return FetchStrategy::Search(keyword.to_string());
            }
        }
        if let Some(ids) = category_ids {
            if !ids.is_empty() {
                return FetchStrategy::CategorySubset(ids.to_vec());
            }
        }
        FetchStrategy::FullIndex
    }
}
