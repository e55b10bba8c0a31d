//! Test helper utilities for E2E testing

use serde::Deserialize;
use std::time::Duration;
use tokio::time::sleep;
use uuid::Uuid;

/// Response from POST /api/v1/reports
#[derive(Debug, Deserialize)]
pub struct SubmitResponse {
    pub report_id: Uuid,
    pub status: String,
}

/// Response from GET /api/v1/reports/{report_id}
#[derive(Debug, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    pub error: Option<String>,
    pub report: Option<serde_json::Value>,
}

/// Submit an email address to the reports endpoint
pub async fn submit_report(
    client: &reqwest::Client,
    base_url: &str,
    email: &str,
) -> Result<SubmitResponse, Box<dyn std::error::Error>> {
    let response = client
        .post(format!("{}/api/v1/reports", base_url))
        .json(&serde_json::json!({ "email": email }))
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let error_text = response.text().await?;
        return Err(format!("Submit failed with status {}: {}", status, error_text).into());
    }

    let body = response.json::<SubmitResponse>().await?;
    Ok(body)
}

/// Poll report status until completed or failed (with timeout)
pub async fn poll_report_status(
    client: &reqwest::Client,
    base_url: &str,
    report_id: &Uuid,
    timeout_secs: u64,
) -> Result<StatusResponse, Box<dyn std::error::Error>> {
    let max_attempts = timeout_secs * 2; // Poll every 500ms

    for attempt in 0..max_attempts {
        let response = client
            .get(format!("{}/api/v1/reports/{}", base_url, report_id))
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            return Err(format!("Status check failed: {}", error_text).into());
        }

        let status_response = response.json::<StatusResponse>().await?;

        match status_response.status.as_str() {
            "completed" | "failed" => return Ok(status_response),
            "processing" | "fetching_enrichment" => {
                if attempt % 10 == 0 && attempt > 0 {
                    println!("  ... still waiting (attempt {}/{})", attempt, max_attempts);
                }
                sleep(Duration::from_millis(500)).await;
            }
            _ => {
                return Err(format!("Unknown report status: {}", status_response.status).into());
            }
        }
    }

    Err(format!("Report did not complete within {} seconds", timeout_secs).into())
}
