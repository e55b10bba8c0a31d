use serde::{Deserialize, Serialize};

/// Normalized person and company facts from the enrichment provider.
///
/// Every field is optional; an absent field is a valid terminal answer for
/// that field, not an error. `photo_url` is always populated after
/// normalization (provider photo, derived social photo, or a synthesized
/// avatar).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct EnrichmentResult {
    pub name: Option<String>,
    pub title: Option<String>,
    pub photo_url: Option<String>,
    pub phone_number: Option<String>,
    pub linkedin_url: Option<String>,
    pub email: Option<String>,
    pub facebook_url: Option<String>,
    pub organization: Option<Organization>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Organization {
    pub name: Option<String>,
    pub website_url: Option<String>,
    pub industry: Option<String>,
    pub employee_count: Option<String>,
    pub location: Option<OrgLocation>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct OrgLocation {
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
}

/// Normalized lead summary derived deterministically from an
/// [`EnrichmentResult`]. Absent source fields default to the literal
/// placeholder `N/A`; only `photo` stays null.
///
/// Serialized camelCase: this is the document shape stored alongside the
/// narrative and consumed by the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadProjection {
    pub name: String,
    pub position: String,
    pub company_name: String,
    pub photo: Option<String>,
    pub about_lead: String,
    pub about_company: String,
    pub contact_details: ContactDetails,
    pub company_details: CompanyDetails,
    pub lead_scoring: LeadScoring,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactDetails {
    pub email: String,
    pub phone: String,
    pub linkedin: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyDetails {
    pub headquarters: String,
    pub website: String,
    pub industry: String,
    pub employees: String,
}

/// Fixed qualification rubric. The rating and criteria are literals, not
/// the output of any scoring logic; consumers must not treat them as such.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadScoring {
    pub rating: String,
    pub qualification_criteria: QualificationCriteria,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualificationCriteria {
    pub decision_maker: String,
    pub viewed_solution_deck: String,
    pub have_budget: String,
    pub need: String,
}
