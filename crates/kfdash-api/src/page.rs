use serde::{
    Deserialize,
    Serialize,
};

/// Kinds of paged collections the console lists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Pipelines,
    PipelineVersions,
    Runs,
    RecurringRuns,
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceKind::Pipelines => write!(f, "pipelines"),
            ResourceKind::PipelineVersions => write!(f, "pipeline versions"),
            ResourceKind::Runs => write!(f, "runs"),
            ResourceKind::RecurringRuns => write!(f, "recurring runs"),
        }
    }
}

/// One page of a listing as returned by the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_size: Option<usize>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, next_page_token: Option<String>) -> Self {
        Self {
            items,
            next_page_token,
            total_size: None,
        }
    }

    pub fn last(items: Vec<T>) -> Self {
        Self::new(items, None)
    }

    pub fn empty() -> Self {
        Self::last(Vec::new())
    }

    /// Token for the next page; an empty token ends pagination.
    pub fn continuation(&self) -> Option<&str> {
        self.next_page_token.as_deref().filter(|t| !t.is_empty())
    }
}

/// Every item of a listing, with the count recomputed from what was
/// actually collected
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aggregated<T> {
    pub items: Vec<T>,
    pub total_count: usize,
}

impl<T> Aggregated<T> {
    pub fn from_items(items: Vec<T>) -> Self {
        let total_count = items.len();
        Self { items, total_count }
    }

    pub fn empty() -> Self {
        Self::from_items(Vec::new())
    }

    /// Concatenates per-scope results in the given order
    pub fn concat(parts: Vec<Vec<T>>) -> Self {
        let total_count = parts.iter().map(Vec::len).sum();
        let items: Vec<T> = parts.into_iter().flatten().collect();
        debug_assert_eq!(items.len(), total_count);
        Self { items, total_count }
    }
}

impl<T> From<Vec<T>> for Aggregated<T> {
    fn from(items: Vec<T>) -> Self {
        Self::from_items(items)
    }
}

/// Connection context forwarded unchanged to every page call
#[derive(Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    pub namespace: Option<String>,
    pub bearer_token: Option<String>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }
}

impl std::fmt::Debug for RequestOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestOptions")
            .field("namespace", &self.namespace)
            .field(
                "bearer_token",
                &self.bearer_token.as_ref().map(|_| "[redacted]"),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_token_ends_pagination() {
        let page = Page::new(vec![1, 2], Some(String::new()));
        assert!(page.continuation().is_none());

        let page = Page::new(vec![1, 2], Some("abc".to_string()));
        assert_eq!(page.continuation(), Some("abc"));
    }

    #[test]
    fn test_aggregated_count_matches_items() {
        let aggregated = Aggregated::concat(vec![vec!["a", "b"], vec![], vec!["c"]]);
        assert_eq!(aggregated.items, vec!["a", "b", "c"]);
        assert_eq!(aggregated.total_count, 3);

        let empty: Aggregated<u8> = Aggregated::empty();
        assert_eq!(empty.total_count, 0);
    }

    #[test]
    fn test_request_options_debug_redacts_token() {
        let options = RequestOptions::new()
            .with_namespace("ds-project")
            .with_bearer_token("sha256~secret");
        let rendered = format!("{:?}", options);

        assert!(rendered.contains("ds-project"));
        assert!(!rendered.contains("sha256~secret"));
    }
}
