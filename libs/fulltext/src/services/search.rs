//! Search service - ranked full-text search over configured entity kinds
//!
//! Orchestrates one search by:
//! - Sanitizing the raw term into boolean-mode tokens
//! - Listing every record when nothing searchable remains
//! - Running the ranked search and rehydrating hits in rank order
//!
//! The service holds no per-search state; one instance serves concurrent
//! callers for every configured entity kind.

use crate::{
    db::search::{hits_from_rows, rehydrate, sanitize, QueryBuilder},
    db::StatementExecutor,
    models::{RecordId, SearchRequest, SearchResult, TargetConfig, TargetRegistry},
    Result,
};

/// Search service coordinating sanitization, ranking and rehydration
pub struct SearchService<E> {
    executor: E,
    targets: TargetRegistry,
}

impl<E: StatementExecutor> SearchService<E> {
    pub fn new(executor: E, targets: TargetRegistry) -> Self {
        Self { executor, targets }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Public entry point: search `entity_kind` for `raw_term`.
    ///
    /// An empty or missing term is valid and lists every record.
    pub async fn search_kind(
        &self,
        raw_term: Option<&str>,
        entity_kind: &str,
        scope: Option<RecordId>,
    ) -> Result<SearchResult> {
        let mut request = SearchRequest::new(entity_kind, raw_term);
        if let Some(scope) = scope {
            request = request.with_scope(scope);
        }
        self.search_entity(&request).await
    }

    /// Search the target registered for the request's entity kind.
    pub async fn search_entity(&self, request: &SearchRequest) -> Result<SearchResult> {
        let target = self.targets.get(request.kind())?;
        self.search(request, &target).await
    }

    /// Search a specific target.
    #[tracing::instrument(
        name = "fulltext.search",
        skip_all,
        fields(kind = request.kind(), table = target.table())
    )]
    pub async fn search(
        &self,
        request: &SearchRequest,
        target: &TargetConfig,
    ) -> Result<SearchResult> {
        let tokens = sanitize(request.term());
        let builder = QueryBuilder::new(target);

        if tokens.is_empty() {
            tracing::debug!("Empty search term, listing all records");
            let records = self
                .executor
                .execute(&builder.listing(request.scope()))
                .await?;
            return Ok(SearchResult::listing(records));
        }

        tracing::debug!(tokens = tokens.len(), "Running ranked search");
        let rows = self
            .executor
            .execute(&builder.ranked_search(&tokens, request.scope()))
            .await?;
        let hits = hits_from_rows(&rows, target)?;

        if hits.is_empty() {
            tracing::debug!("No matches");
            return Ok(SearchResult::ranked(Vec::new()));
        }

        let records = rehydrate(&self.executor, &hits, target).await?;
        tracing::debug!(hits = hits.len(), records = records.len(), "Search complete");
        Ok(SearchResult::ranked(records))
    }
}
