use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use garde::Validate;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::models::job::{JobStatus, ReportJob};
use crate::models::report::{
    ErrorResponse, ReportStatusResponse, SubmitReportRequest, SubmitReportResponse,
};
use crate::services::pipeline::{self, QueryError, SubmitError};

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

/// POST /api/v1/reports — Submit an email address for report generation.
///
/// Returns 202 with the job id as soon as the job row exists; the pipeline
/// runs in the background and is observed via the status endpoint.
pub async fn submit_report(
    State(state): State<AppState>,
    Json(request): Json<SubmitReportRequest>,
) -> Result<(StatusCode, Json<SubmitReportResponse>), ApiError> {
    request
        .validate()
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, e.to_string()))?;

    let report_id = pipeline::submit(&state, &request.email)
        .await
        .map_err(|e| match e {
            SubmitError::InvalidInput => api_error(StatusCode::BAD_REQUEST, e.to_string()),
            SubmitError::Store(_) => {
                tracing::error!(error = %e, "Failed to create report job");
                api_error(StatusCode::SERVICE_UNAVAILABLE, "Storage unavailable")
            }
        })?;

    Ok((
        StatusCode::ACCEPTED,
        Json(SubmitReportResponse {
            report_id,
            status: JobStatus::Processing,
        }),
    ))
}

/// GET /api/v1/reports/{report_id} — Check report job status.
pub async fn get_report_status(
    State(state): State<AppState>,
    Path(report_id): Path<Uuid>,
) -> Result<Json<ReportStatusResponse>, ApiError> {
    let snapshot = pipeline::query_status(&state.db, report_id)
        .await
        .map_err(|e| match e {
            QueryError::NotFound => api_error(StatusCode::NOT_FOUND, e.to_string()),
            QueryError::Store(_) => {
                tracing::error!(report_id = %report_id, error = %e, "Failed to query report status");
                api_error(StatusCode::SERVICE_UNAVAILABLE, "Storage unavailable")
            }
        })?;

    Ok(Json(ReportStatusResponse {
        status: snapshot.status,
        error: snapshot.error,
        report: snapshot.job,
    }))
}

/// GET /api/v1/reports — List all report jobs, newest first.
pub async fn list_reports(
    State(state): State<AppState>,
) -> Result<Json<Vec<ReportJob>>, ApiError> {
    let jobs = pipeline::list_reports(&state.db).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to list report jobs");
        api_error(StatusCode::SERVICE_UNAVAILABLE, "Storage unavailable")
    })?;

    Ok(Json(jobs))
}
