use futures::future::try_join_all;
use kfdash_api::{
    Aggregated,
    ListParams,
    PageFetcher,
    RequestOptions,
};

use crate::domain::{
    DomainError,
    DomainResult,
};

pub const DEFAULT_MAX_PAGES: usize = 1000;

/// Walks continuation tokens until a listing is exhausted.
///
/// Pages of one scope are requested strictly in order since each token only
/// exists in the previous response. A scope needing more than `max_pages`
/// requests fails instead of looping forever on a server that keeps
/// handing out tokens. A listing always starts from the first page; any
/// `page_token` in the initial params is dropped.
#[derive(Debug, Clone, Copy)]
pub struct Aggregator {
    max_pages: usize,
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PAGES)
    }
}

impl Aggregator {
    pub fn new(max_pages: usize) -> Self {
        Self {
            max_pages: max_pages.max(1),
        }
    }

    pub fn max_pages(&self) -> usize {
        self.max_pages
    }

    pub async fn aggregate_all<F>(
        &self, fetcher: &F, options: &RequestOptions, scope: Option<&str>, params: ListParams,
    ) -> DomainResult<Vec<F::Item>>
    where
        F: PageFetcher + ?Sized,
    {
        let kind = fetcher.resource_kind();
        let mut items = Vec::new();
        let mut params = ListParams {
            page_token: None,
            ..params
        };
        let mut pages = 0usize;

        loop {
            if pages == self.max_pages {
                tracing::warn!(
                    kind = %kind,
                    scope = ?scope,
                    limit = self.max_pages,
                    collected = items.len(),
                    "Server kept returning continuation tokens, giving up"
                );
                return Err(DomainError::PaginationLimitExceeded {
                    kind,
                    limit: self.max_pages,
                });
            }

            let page = fetcher.fetch_page(options, scope, &params).await?;
            pages += 1;

            let received = page.items.len();
            let next_token = page.continuation().map(str::to_string);
            items.extend(page.items);

            tracing::debug!(
                kind = %kind,
                scope = ?scope,
                page = pages,
                received,
                has_more = next_token.is_some(),
                "Fetched page"
            );

            match next_token {
                Some(token) => {
                    let page_size = (fetcher.follows_server_page_size() && received > 0)
                        .then_some(received);
                    params = params.next_page(&token, page_size);
                }
                None => break,
            }
        }

        tracing::debug!(
            kind = %kind,
            scope = ?scope,
            pages,
            total = items.len(),
            "Aggregated listing"
        );

        Ok(items)
    }

    /// Aggregates every scope concurrently and concatenates the results in
    /// the order the scopes were given. The first failure fails the whole
    /// call and drops the remaining in-flight requests.
    pub async fn aggregate_across_scopes<F>(
        &self, fetcher: &F, options: &RequestOptions, scopes: &[String], params: &ListParams,
    ) -> DomainResult<Aggregated<F::Item>>
    where
        F: PageFetcher + ?Sized,
    {
        let requests = scopes.iter().map(|scope| {
            self.aggregate_all(fetcher, options, Some(scope.as_str()), params.clone())
        });

        let per_scope = try_join_all(requests).await?;

        tracing::debug!(
            kind = %fetcher.resource_kind(),
            scopes = scopes.len(),
            "Aggregated listing across scopes"
        );

        Ok(Aggregated::concat(per_scope))
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use kfdash_api::{
        ApiError,
        ApiResult,
        Page,
        ResourceKind,
    };

    use super::*;

    type PageKey = (Option<String>, Option<String>);

    /// Serves canned pages keyed by (scope, page token) and records every
    /// request it receives. Unknown keys answer with an empty last page.
    pub struct StubFetcher<T = String> {
        pub kind: ResourceKind,
        pub follows_page_size: bool,
        pages: HashMap<PageKey, ApiResult<Page<T>>>,
        pub calls: Mutex<Vec<(Option<String>, ListParams)>>,
        endless: Option<fn(usize) -> T>,
    }

    impl<T> StubFetcher<T> {
        pub fn new(kind: ResourceKind) -> Self {
            Self {
                kind,
                follows_page_size: false,
                pages: HashMap::new(),
                calls: Mutex::new(Vec::new()),
                endless: None,
            }
        }

        pub fn page(
            mut self, scope: Option<&str>, token: Option<&str>, items: Vec<T>, next: Option<&str>,
        ) -> Self {
            self.pages.insert(
                (scope.map(str::to_string), token.map(str::to_string)),
                Ok(Page::new(items, next.map(str::to_string))),
            );
            self
        }

        pub fn failing(mut self, scope: Option<&str>, token: Option<&str>, err: ApiError) -> Self {
            self.pages
                .insert((scope.map(str::to_string), token.map(str::to_string)), Err(err));
            self
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        pub fn tokens(&self) -> Vec<Option<String>> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .map(|(_, p)| p.page_token.clone())
                .collect()
        }

        pub fn last_params(&self) -> Option<ListParams> {
            self.calls.lock().unwrap().last().map(|(_, p)| p.clone())
        }
    }

    impl StubFetcher<String> {
        /// Always answers with one item and a fresh token
        pub fn endless(kind: ResourceKind) -> Self {
            Self {
                endless: Some(|n| format!("item-{}", n)),
                ..Self::new(kind)
            }
        }
    }

    pub fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[async_trait]
    impl<T> PageFetcher for StubFetcher<T>
    where
        T: Clone + Send + Sync,
    {
        type Item = T;

        fn resource_kind(&self) -> ResourceKind {
            self.kind
        }

        fn follows_server_page_size(&self) -> bool {
            self.follows_page_size
        }

        async fn fetch_page(
            &self, _options: &RequestOptions, scope: Option<&str>, params: &ListParams,
        ) -> ApiResult<Page<T>> {
            let call_number = {
                let mut calls = self.calls.lock().unwrap();
                calls.push((scope.map(str::to_string), params.clone()));
                calls.len()
            };
            tokio::task::yield_now().await;

            if let Some(make_item) = self.endless {
                return Ok(Page::new(
                    vec![make_item(call_number)],
                    Some(format!("token-{}", call_number)),
                ));
            }

            self.pages
                .get(&(scope.map(str::to_string), params.page_token.clone()))
                .cloned()
                .unwrap_or_else(|| Ok(Page::empty()))
        }
    }
}
