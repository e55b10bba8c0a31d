use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

use crate::models::lead::{EnrichmentResult, LeadProjection};

/// Lifecycle state of a report job.
///
/// `Processing` is the initial state. The background pipeline advances the
/// job to `FetchingEnrichment` once enrichment lands, then to `Completed`
/// or `Failed`. `Failed` is reachable from any non-terminal state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum JobStatus {
    Processing,
    FetchingEnrichment,
    Completed,
    Failed,
}

impl JobStatus {
    /// Terminal states accept no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

/// A lead report job.
///
/// `enrichment` is written after the enrichment stage, `narrative` and
/// `lead_projection` only on completion, `error` only on failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportJob {
    pub id: Uuid,
    pub email: String,
    pub status: JobStatus,
    pub enrichment: Option<EnrichmentResult>,
    pub narrative: Option<String>,
    pub lead_projection: Option<LeadProjection>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
