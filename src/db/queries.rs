use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::models::job::{JobStatus, ReportJob};
use crate::models::lead::{EnrichmentResult, LeadProjection};

/// A status string outside the state machine means the row is corrupt;
/// surface it as a decode error instead of misreading it as a live state.
fn parse_status(status: &str) -> Result<JobStatus, sqlx::Error> {
    status
        .parse()
        .map_err(|_| sqlx::Error::Decode(format!("unrecognized job status: {status}").into()))
}

fn job_from_row(row: &PgRow) -> Result<ReportJob, sqlx::Error> {
    let status_str: String = row.try_get("status")?;
    let status = parse_status(&status_str)?;

    let enrichment: Option<Json<EnrichmentResult>> = row.try_get("enrichment")?;
    let lead_projection: Option<Json<LeadProjection>> = row.try_get("lead_projection")?;

    Ok(ReportJob {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        status,
        enrichment: enrichment.map(|Json(e)| e),
        narrative: row.try_get("narrative")?,
        lead_projection: lead_projection.map(|Json(p)| p),
        error: row.try_get("error")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Insert a new report job in the initial `processing` state
pub async fn create_job(pool: &PgPool, email: &str) -> Result<ReportJob, sqlx::Error> {
    let row = sqlx::query(
        r#"
        INSERT INTO report_jobs (email, status)
        VALUES ($1, 'processing')
        RETURNING id, email, status, enrichment, narrative, lead_projection, error,
                  created_at, updated_at
        "#,
    )
    .bind(email)
    .fetch_one(pool)
    .await?;

    job_from_row(&row)
}

/// Get a job by ID
pub async fn get_job(pool: &PgPool, job_id: Uuid) -> Result<Option<ReportJob>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT id, email, status, enrichment, narrative, lead_projection, error,
               created_at, updated_at
        FROM report_jobs
        WHERE id = $1
        "#,
    )
    .bind(job_id)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(job_from_row).transpose()
}

/// Stage-A partial update: store the enrichment payload and advance the
/// job to `fetching_enrichment`.
pub async fn update_job_enrichment(
    pool: &PgPool,
    job_id: Uuid,
    enrichment: &EnrichmentResult,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE report_jobs
        SET enrichment = $1,
            status = 'fetching_enrichment',
            updated_at = NOW()
        WHERE id = $2
        "#,
    )
    .bind(Json(enrichment))
    .bind(job_id)
    .execute(pool)
    .await?;

    Ok(())
}

/// Stage-B success update: store the narrative and projection and mark the
/// job completed.
pub async fn update_job_completed(
    pool: &PgPool,
    job_id: Uuid,
    narrative: &str,
    projection: &LeadProjection,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE report_jobs
        SET narrative = $1,
            lead_projection = $2,
            status = 'completed',
            updated_at = NOW()
        WHERE id = $3
        "#,
    )
    .bind(narrative)
    .bind(Json(projection))
    .bind(job_id)
    .execute(pool)
    .await?;

    Ok(())
}

/// Mark a job failed with a human-readable error message.
pub async fn update_job_failed(
    pool: &PgPool,
    job_id: Uuid,
    error: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE report_jobs
        SET status = 'failed',
            error = $1,
            updated_at = NOW()
        WHERE id = $2
        "#,
    )
    .bind(error)
    .bind(job_id)
    .execute(pool)
    .await?;

    Ok(())
}

/// List all jobs, newest first (history view)
pub async fn list_jobs(pool: &PgPool) -> Result<Vec<ReportJob>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT id, email, status, enrichment, narrative, lead_projection, error,
               created_at, updated_at
        FROM report_jobs
        ORDER BY created_at DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    rows.iter().map(job_from_row).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status_accepts_state_machine_states() {
        assert_eq!(parse_status("processing").unwrap(), JobStatus::Processing);
        assert_eq!(
            parse_status("fetching_enrichment").unwrap(),
            JobStatus::FetchingEnrichment
        );
        assert_eq!(parse_status("completed").unwrap(), JobStatus::Completed);
        assert_eq!(parse_status("failed").unwrap(), JobStatus::Failed);
    }

    #[test]
    fn test_parse_status_rejects_unknown_strings() {
        let result = parse_status("pending");
        assert!(matches!(result, Err(sqlx::Error::Decode(_))));
    }
}
