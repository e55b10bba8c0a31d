use std::time::Instant;

use sqlx::PgPool;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::db::queries;
use crate::models::job::{JobStatus, ReportJob};

/// View of a job returned to status queries.
///
/// The full job payload is exposed only once the job has completed;
/// in-flight and failed jobs surface status and error alone, so clients
/// never see a partially-populated record that looks finished.
#[derive(Debug)]
pub struct StatusSnapshot {
    pub status: JobStatus,
    pub error: Option<String>,
    pub job: Option<ReportJob>,
}

fn is_valid_email(email: &str) -> bool {
    !email.is_empty() && email.contains('@')
}

/// Create a report job for an email address and start processing it.
///
/// Validates the email, inserts the job in `processing` state, and spawns
/// the detached background pipeline. Returns the job id immediately; the
/// caller never waits on (or observes) the pipeline's outcome. Progress
/// is read back through [`query_status`].
pub async fn submit(state: &AppState, email: &str) -> Result<Uuid, SubmitError> {
    if !is_valid_email(email) {
        return Err(SubmitError::InvalidInput);
    }

    let job = queries::create_job(&state.db, email)
        .await
        .map_err(SubmitError::Store)?;

    metrics::counter!("report_jobs_total").increment(1);
    tracing::info!(job_id = %job.id, "Report job created");

    spawn_pipeline(state.clone(), email.to_string(), job.id);

    Ok(job.id)
}

/// Spawn the detached per-job pipeline task.
///
/// The inner task's JoinHandle is awaited by a supervising task so that a
/// panic in the pipeline body is recorded as a failed job instead of
/// crashing the process or leaving the job silently stuck.
fn spawn_pipeline(state: AppState, email: String, job_id: Uuid) {
    tokio::spawn(async move {
        let pipeline = tokio::spawn(run_pipeline(state.clone(), email, job_id));
        if pipeline.await.is_err() {
            tracing::error!(job_id = %job_id, "Report pipeline panicked");
            record_failure(&state, job_id, "Internal error while processing the report").await;
        }
    });
}

/// The two-stage background pipeline for one job.
///
/// Stage failures are converted to messages and written to the job record;
/// they are never propagated to the submitter, who has already
/// disconnected. A store failure during an update is logged and the task
/// stops, leaving the job in its last durably written state.
async fn run_pipeline(state: AppState, email: String, job_id: Uuid) {
    let start = Instant::now();

    // Stage A: enrichment
    let enrichment = match state.enrichment.enrich(&email).await {
        Ok(enrichment) => enrichment,
        Err(e) => {
            tracing::error!(job_id = %job_id, error = %e, "Enrichment stage failed");
            record_failure(&state, job_id, &e.to_string()).await;
            return;
        }
    };

    if let Err(e) = queries::update_job_enrichment(&state.db, job_id, &enrichment).await {
        tracing::error!(
            job_id = %job_id,
            error = %e,
            "Failed to record enrichment result, stopping pipeline"
        );
        return;
    }

    tracing::info!(job_id = %job_id, "Enrichment stage complete");

    // Stage B: narrative generation, fed from the enrichment value just
    // computed rather than a store re-read.
    match state.generator.generate(&enrichment).await {
        Ok(report) => {
            if let Err(e) = queries::update_job_completed(
                &state.db,
                job_id,
                &report.narrative,
                &report.projection,
            )
            .await
            {
                tracing::error!(
                    job_id = %job_id,
                    error = %e,
                    "Failed to record completed report, stopping pipeline"
                );
                return;
            }

            metrics::counter!("report_jobs_completed").increment(1);
            metrics::histogram!("report_processing_seconds")
                .record(start.elapsed().as_secs_f64());

            tracing::info!(
                job_id = %job_id,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Report completed"
            );
        }
        Err(e) => {
            tracing::error!(job_id = %job_id, error = %e, "Generation stage failed");
            record_failure(&state, job_id, &e.to_string()).await;
        }
    }
}

async fn record_failure(state: &AppState, job_id: Uuid, message: &str) {
    metrics::counter!("report_jobs_failed").increment(1);

    if let Err(e) = queries::update_job_failed(&state.db, job_id, message).await {
        tracing::error!(
            job_id = %job_id,
            error = %e,
            "Failed to record job failure, job left in last written state"
        );
    }
}

/// Look up the current status of a job.
pub async fn query_status(pool: &PgPool, job_id: Uuid) -> Result<StatusSnapshot, QueryError> {
    let job = queries::get_job(pool, job_id)
        .await
        .map_err(QueryError::Store)?
        .ok_or(QueryError::NotFound)?;

    Ok(snapshot_of(job))
}

fn snapshot_of(job: ReportJob) -> StatusSnapshot {
    StatusSnapshot {
        status: job.status,
        error: job.error.clone(),
        job: (job.status == JobStatus::Completed).then_some(job),
    }
}

/// All jobs, newest first (history view).
pub async fn list_reports(pool: &PgPool) -> Result<Vec<ReportJob>, sqlx::Error> {
    queries::list_jobs(pool).await
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("Please provide a valid email address")]
    InvalidInput,

    #[error("Database error: {0}")]
    Store(#[from] sqlx::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("Report not found")]
    NotFound,

    #[error("Database error: {0}")]
    Store(#[from] sqlx::Error),
}
