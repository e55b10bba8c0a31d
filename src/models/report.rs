use garde::Validate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::job::{JobStatus, ReportJob};

/// Request to start a lead report for an email address.
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitReportRequest {
    #[garde(length(min = 3, max = 320))]
    pub email: String,
}

/// Response after a report job has been created.
#[derive(Debug, Serialize)]
pub struct SubmitReportResponse {
    pub report_id: Uuid,
    pub status: JobStatus,
}

/// Response for querying report status.
///
/// `report` is populated only for completed jobs, so clients never observe
/// a partially-filled payload that looks finished.
#[derive(Debug, Serialize)]
pub struct ReportStatusResponse {
    pub status: JobStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<ReportJob>,
}

/// Body returned with non-success status codes.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
