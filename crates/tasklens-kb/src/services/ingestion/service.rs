use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, instrument, warn};

use crate::{
    data::{CoreError, RecordId, RequestContext, TextRecord},
    embedding::EmbeddingAggregator,
    services::messages::{EmbedTaskRequest, IngestionOutcome, ReembedReport},
    traits::StateStore,
};

/// Service responsible for embedding task records and storing the vectors.
#[derive(Clone)]
pub struct IngestionService {
    state_store: Arc<dyn StateStore>,
    aggregator: EmbeddingAggregator,
}

/// Validated ingest input.
struct IngestionJob {
    record_id: RecordId,
    text: String,
}

impl IngestionService {
    /// Creates a new IngestionService with the provided dependencies.
    pub fn new(state_store: Arc<dyn StateStore>, aggregator: EmbeddingAggregator) -> Self {
        Self {
            state_store,
            aggregator,
        }
    }

    /// Embeds a record's title and description and stores the vector on it.
    ///
    /// The stored vector replaces any previous one. Validation failures
    /// happen before any backend is touched.
    #[instrument(skip(self, request, ctx), fields(request_id = %ctx.request_id, record_id = ?request.record_id))]
    pub async fn ingest(
        &self,
        request: &EmbedTaskRequest,
        ctx: &RequestContext,
    ) -> Result<IngestionOutcome, CoreError> {
        let result = self.ingest_inner(request, ctx).await;

        match &result {
            Ok(outcome) => info!(
                record_id = %outcome.record_id,
                chunks = outcome.chunks,
                dimensions = outcome.dimensions,
                elapsed_ms = ctx.elapsed_ms(),
                "Embedding successfully generated and stored"
            ),
            Err(e) if e.is_client_error() => warn!(
                record_id = ?request.record_id,
                error = %e,
                "Rejected embed request"
            ),
            Err(e) => error!(
                record_id = ?request.record_id,
                kind = e.kind(),
                elapsed_ms = ctx.elapsed_ms(),
                error = %e,
                "Error embedding record"
            ),
        }

        result
    }

    async fn ingest_inner(
        &self,
        request: &EmbedTaskRequest,
        ctx: &RequestContext,
    ) -> Result<IngestionOutcome, CoreError> {
        let job = validate(request)?;
        self.embed_and_store(job, ctx).await
    }

    async fn embed_and_store(&self, job: IngestionJob, ctx: &RequestContext) -> Result<IngestionOutcome, CoreError> {
        let started = Instant::now();
        let aggregated = self
            .aggregator
            .embed_with_stats(&job.text, ctx)
            .await
            .map_err(|e| CoreError::embedding(format!("Failed to embed record {}", job.record_id), e))?;
        info!(
            record_id = %job.record_id,
            elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
            "Embedding generation finished"
        );

        let matched = self
            .state_store
            .set_embedding(ctx, &job.record_id, &aggregated.vector)
            .await
            .map_err(|e| CoreError::persistence(format!("Failed to store embedding for record {}", job.record_id), e))?;

        if !matched {
            warn!(record_id = %job.record_id, "No record matched; embedding was not stored");
        }

        Ok(IngestionOutcome {
            record_id: job.record_id,
            dimensions: aggregated.vector.len(),
            chunks: aggregated.chunks,
            matched,
        })
    }

    /// Re-embeds every record in the store.
    ///
    /// Records without text are skipped. A failure on one record is logged
    /// and counted; only a failure to list the records aborts the pass.
    #[instrument(skip(self, ctx), fields(request_id = %ctx.request_id))]
    pub async fn reembed_all(&self, ctx: &RequestContext) -> Result<ReembedReport, CoreError> {
        let records = self
            .state_store
            .list_records(ctx)
            .await
            .map_err(|e| CoreError::persistence("Failed to list records for re-embedding", e))?;

        let mut report = ReembedReport {
            total: records.len(),
            ..ReembedReport::default()
        };
        info!(total = report.total, "Starting re-embedding pass");

        for record in records {
            let Some(job) = job_for_record(record) else {
                report.skipped += 1;
                continue;
            };
            let record_id = job.record_id.clone();
            match self.embed_and_store(job, ctx).await {
                Ok(_) => report.embedded += 1,
                Err(e) => {
                    error!(record_id = %record_id, error = %e, "Error re-embedding record");
                    report.failed += 1;
                }
            }
        }

        info!(
            embedded = report.embedded,
            skipped = report.skipped,
            failed = report.failed,
            elapsed_ms = ctx.elapsed_ms(),
            "Re-embedding pass completed"
        );
        Ok(report)
    }
}

fn validate(request: &EmbedTaskRequest) -> Result<IngestionJob, CoreError> {
    let record_id = request
        .record_id
        .clone()
        .and_then(RecordId::parse)
        .ok_or_else(|| CoreError::validation("recordId and at least title or description are required"))?;

    let record = TextRecord::new(record_id, request.title.clone(), request.description.clone());
    if !record.has_text() {
        return Err(CoreError::validation(
            "recordId and at least title or description are required",
        ));
    }

    job_for_record(record).ok_or_else(|| CoreError::validation("No text content provided for embedding"))
}

fn job_for_record(record: TextRecord) -> Option<IngestionJob> {
    if !record.has_text() {
        return None;
    }
    let text = record.embedding_text();
    if text.is_empty() {
        return None;
    }
    Some(IngestionJob {
        record_id: record.record_id,
        text,
    })
}
