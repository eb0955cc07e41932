use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};

use super::scoring::rank_candidates;
use crate::{
    data::{CoreError, EmbeddingError, RequestContext, ScoredResult},
    embedding::EmbeddingAggregator,
    services::messages::{SearchOptions, SearchRequest},
    traits::StateStore,
};

/// Service responsible for semantic search over the stored embeddings.
#[derive(Clone)]
pub struct QueryService {
    state_store: Arc<dyn StateStore>,
    aggregator: EmbeddingAggregator,
    defaults: SearchOptions,
}

impl QueryService {
    /// Creates a new QueryService with the provided dependencies.
    ///
    /// `defaults` apply whenever a request leaves `topN` or `minScore` out.
    pub fn new(state_store: Arc<dyn StateStore>, aggregator: EmbeddingAggregator, defaults: SearchOptions) -> Self {
        Self {
            state_store,
            aggregator,
            defaults,
        }
    }

    /// Ranks stored records by similarity to the query text.
    ///
    /// Returns at most `topN` results, best first, each scoring strictly
    /// above `minScore`. An empty store yields an empty list.
    #[instrument(skip(self, request, ctx), fields(request_id = %ctx.request_id))]
    pub async fn search(&self, request: &SearchRequest, ctx: &RequestContext) -> Result<Vec<ScoredResult>, CoreError> {
        let result = self.search_inner(request, ctx).await;

        match &result {
            Ok(results) => info!(
                results = results.len(),
                elapsed_ms = ctx.elapsed_ms(),
                "Semantic search completed"
            ),
            Err(e) if e.is_client_error() => warn!(error = %e, "Rejected search request"),
            Err(e) => error!(
                kind = e.kind(),
                elapsed_ms = ctx.elapsed_ms(),
                error = %e,
                "Error during semantic search"
            ),
        }

        result
    }

    async fn search_inner(&self, request: &SearchRequest, ctx: &RequestContext) -> Result<Vec<ScoredResult>, CoreError> {
        // Blank queries are rejected, but the model sees the text as sent
        let query = request
            .query
            .as_deref()
            .filter(|q| !q.trim().is_empty())
            .ok_or_else(|| CoreError::validation("Query text is required"))?;
        let options = self.resolve_options(request)?;

        let started = Instant::now();
        let query_vector = self
            .aggregator
            .embed(query, ctx)
            .await
            .map_err(|e| CoreError::embedding("Failed to embed query", e))?;
        if query_vector.iter().all(|v| *v == 0.0) {
            return Err(CoreError::embedding("Failed to embed query", EmbeddingError::ZeroMagnitude));
        }
        let embed_ms = elapsed_ms(started);

        let started = Instant::now();
        let candidates = self
            .state_store
            .fetch_embeddings(ctx)
            .await
            .map_err(|e| CoreError::persistence("Failed to fetch stored embeddings", e))?;
        let fetch_ms = elapsed_ms(started);
        let candidate_count = candidates.len();

        let started = Instant::now();
        let results = rank_candidates(&query_vector, candidates, &options);
        debug!(
            candidates = candidate_count,
            top_n = options.top_n,
            min_score = options.min_score,
            embed_ms,
            fetch_ms,
            scoring_ms = elapsed_ms(started),
            "Scored candidates"
        );

        Ok(results)
    }

    fn resolve_options(&self, request: &SearchRequest) -> Result<SearchOptions, CoreError> {
        let options = SearchOptions {
            top_n: request.top_n.unwrap_or(self.defaults.top_n),
            min_score: request.min_score.unwrap_or(self.defaults.min_score),
        };
        if options.top_n == 0 {
            return Err(CoreError::validation("topN must be at least 1"));
        }
        if !options.min_score.is_finite() {
            return Err(CoreError::validation("minScore must be a finite number"));
        }
        Ok(options)
    }
}

fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}
