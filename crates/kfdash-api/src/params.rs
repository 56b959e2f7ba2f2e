use serde::{
    Deserialize,
    Serialize,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortOrder {
    pub field: String,
    pub direction: SortDirection,
}

impl SortOrder {
    /// Value for the `sort_by` query parameter, e.g. `created_at desc`
    pub fn to_query_value(&self) -> String {
        match self.direction {
            SortDirection::Asc => self.field.clone(),
            SortDirection::Desc => format!("{} desc", self.field),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PredicateOperation {
    Equals,
    NotEquals,
    GreaterThan,
    LessThan,
    IsSubstring,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredicateValue {
    StringValue(String),
    LongValue(i64),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Predicate {
    pub key: String,
    pub operation: PredicateOperation,
    #[serde(flatten)]
    pub value: PredicateValue,
}

impl Predicate {
    pub fn equals(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            operation: PredicateOperation::Equals,
            value: PredicateValue::StringValue(value.into()),
        }
    }
}

/// Predicate filter serialized as JSON into the `filter` query parameter
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    pub predicates: Vec<Predicate>,
}

impl Filter {
    /// Exact match on the resource name, used for duplicate-name checks
    pub fn name_equals(name: impl Into<String>) -> Self {
        Self {
            predicates: vec![Predicate::equals("name", name)],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }
}

/// Optional scoping filters for run-like listings.
///
/// Only populated fields are merged into outgoing params; empty strings
/// count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunFilters {
    #[serde(default)]
    pub experiment_id: Option<String>,
    #[serde(default)]
    pub pipeline_version_id: Option<String>,
}

impl RunFilters {
    pub fn for_experiment(experiment_id: impl Into<String>) -> Self {
        Self {
            experiment_id: Some(experiment_id.into()),
            pipeline_version_id: None,
        }
    }
}

fn defined(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.is_empty()).cloned()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub page_token: Option<String>,
    #[serde(default)]
    pub page_size: Option<usize>,
    #[serde(default)]
    pub sort: Option<SortOrder>,
    #[serde(default)]
    pub filter: Option<Filter>,
    #[serde(default)]
    pub experiment_id: Option<String>,
    #[serde(default)]
    pub pipeline_version_id: Option<String>,
}

impl ListParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Appends a predicate to the filter, creating the filter if needed
    pub fn with_predicate(mut self, predicate: Predicate) -> Self {
        self.filter
            .get_or_insert_with(Filter::default)
            .predicates
            .push(predicate);
        self
    }

    /// Params for the page after this one: identical except for the token,
    /// and the page size when the caller tracks the server's page length.
    pub fn next_page(&self, page_token: &str, page_size: Option<usize>) -> Self {
        let mut next = self.clone();
        next.page_token = Some(page_token.to_string());
        if let Some(size) = page_size {
            next.page_size = Some(size);
        }
        next
    }

    pub fn merge_run_filters(mut self, filters: &RunFilters) -> Self {
        if let Some(experiment_id) = defined(&filters.experiment_id) {
            self.experiment_id = Some(experiment_id);
        }
        if let Some(pipeline_version_id) = defined(&filters.pipeline_version_id) {
            self.pipeline_version_id = Some(pipeline_version_id);
        }
        self
    }

    /// Filter sent on the wire, folding the pipeline version scope into a
    /// predicate since the endpoint has no dedicated parameter for it.
    pub fn effective_filter(&self) -> Option<Filter> {
        let mut filter = self.filter.clone().unwrap_or_default();
        if let Some(pipeline_version_id) = defined(&self.pipeline_version_id) {
            filter
                .predicates
                .push(Predicate::equals("pipeline_version_id", pipeline_version_id));
        }

        if filter.is_empty() {
            None
        } else {
            Some(filter)
        }
    }

    /// Query pairs for the request; unset fields produce no key at all.
    pub fn query_pairs(&self) -> Result<Vec<(&'static str, String)>, serde_json::Error> {
        let mut pairs = Vec::new();

        if let Some(token) = defined(&self.page_token) {
            pairs.push(("page_token", token));
        }
        if let Some(size) = self.page_size {
            pairs.push(("page_size", size.to_string()));
        }
        if let Some(sort) = &self.sort {
            pairs.push(("sort_by", sort.to_query_value()));
        }
        if let Some(filter) = self.effective_filter() {
            pairs.push(("filter", serde_json::to_string(&filter)?));
        }
        if let Some(experiment_id) = defined(&self.experiment_id) {
            pairs.push(("experiment_id", experiment_id));
        }

        Ok(pairs)
    }
}
