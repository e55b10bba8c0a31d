use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::models::lead::{
    CompanyDetails, ContactDetails, EnrichmentResult, LeadProjection, LeadScoring, OrgLocation,
    QualificationCriteria,
};

const CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";

const SYSTEM_PROMPT: &str = "You are a professional lead researcher. Create a detailed, \
    well-structured report based on the provided data. Focus on business value, \
    decision-making capacity, and potential engagement strategies. Use markdown \
    formatting for better readability.";

/// Narrative text plus the deterministic projection it was prompted with.
#[derive(Debug, Clone)]
pub struct GeneratedReport {
    pub narrative: String,
    pub projection: LeadProjection,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// Client for the OpenAI chat-completions narrative generator.
pub struct OpenAiClient {
    http: Client,
    api_key: String,
    model: String,
    completions_url: String,
}

impl OpenAiClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            http: Client::new(),
            api_key,
            model,
            completions_url: CHAT_COMPLETIONS_URL.to_string(),
        }
    }

    /// Point the client at an alternate host (stub servers in tests).
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.completions_url = format!("{}/v1/chat/completions", base_url.trim_end_matches('/'));
        self
    }

    /// Generate the narrative report for an enrichment result.
    ///
    /// The lead projection is computed locally and embedded in the prompt;
    /// it never depends on the provider response, so it is reproducible
    /// even when the narrative wording varies between calls. One request,
    /// no retries.
    pub async fn generate(
        &self,
        enrichment: &EnrichmentResult,
    ) -> Result<GeneratedReport, GenerationError> {
        let projection = build_lead_projection(enrichment);
        let prompt = build_report_prompt(&projection);

        let response = self
            .http
            .post(&self.completions_url)
            .bearer_auth(&self.api_key)
            .json(&ChatRequest {
                model: &self.model,
                messages: vec![
                    ChatMessage {
                        role: "system",
                        content: SYSTEM_PROMPT,
                    },
                    ChatMessage {
                        role: "user",
                        content: &prompt,
                    },
                ],
                temperature: 0.7,
                max_tokens: 1500,
            })
            .send()
            .await
            .map_err(GenerationError::Http)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "OpenAI chat completion failed");
            return Err(GenerationError::Provider(status));
        }

        let body: ChatResponse = response.json().await.map_err(GenerationError::Http)?;

        let narrative = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(GenerationError::MalformedResponse)?;

        Ok(GeneratedReport {
            narrative,
            projection,
        })
    }
}

/// Build the normalized lead projection from an enrichment result.
///
/// Pure and deterministic: the same enrichment always yields the same
/// projection. Absent (or empty) source fields default to `N/A`; only the
/// photo stays null.
pub fn build_lead_projection(enrichment: &EnrichmentResult) -> LeadProjection {
    let org = enrichment.organization.as_ref();

    let about_lead = format!(
        "{} is {} at {}",
        non_empty(&enrichment.name).unwrap_or("The lead"),
        non_empty(&enrichment.title).unwrap_or("a professional"),
        org.and_then(|o| non_empty(&o.name)).unwrap_or("their organization"),
    );

    LeadProjection {
        name: or_na(&enrichment.name),
        position: or_na(&enrichment.title),
        company_name: org.map(|o| or_na(&o.name)).unwrap_or_else(na),
        photo: enrichment.photo_url.clone(),
        about_lead,
        about_company: org.map(|o| or_na(&o.description)).unwrap_or_else(na),
        contact_details: ContactDetails {
            email: or_na(&enrichment.email),
            phone: or_na(&enrichment.phone_number),
            linkedin: or_na(&enrichment.linkedin_url),
        },
        company_details: CompanyDetails {
            headquarters: org
                .map(|o| format_headquarters(o.location.as_ref()))
                .unwrap_or_else(na),
            website: org.map(|o| or_na(&o.website_url)).unwrap_or_else(na),
            industry: org.map(|o| or_na(&o.industry)).unwrap_or_else(na),
            employees: org.map(|o| or_na(&o.employee_count)).unwrap_or_else(na),
        },
        lead_scoring: LeadScoring {
            rating: "⭐⭐⭐⭐⭐".to_string(),
            qualification_criteria: QualificationCriteria {
                decision_maker: "YES".to_string(),
                viewed_solution_deck: "YES".to_string(),
                have_budget: "YES".to_string(),
                need: "YES".to_string(),
            },
        },
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn or_na(value: &Option<String>) -> String {
    non_empty(value).unwrap_or("N/A").to_string()
}

fn na() -> String {
    "N/A".to_string()
}

/// Comma-joined non-empty city/state/country, `N/A` when nothing is known.
fn format_headquarters(location: Option<&OrgLocation>) -> String {
    let Some(location) = location else {
        return na();
    };

    let parts: Vec<&str> = [&location.city, &location.state, &location.country]
        .into_iter()
        .filter_map(|part| non_empty(part))
        .collect();

    if parts.is_empty() {
        na()
    } else {
        parts.join(", ")
    }
}

/// Render the fixed markdown report template the generator is prompted
/// with. The qualification rubric is a literal, always-affirmative block.
fn build_report_prompt(lead: &LeadProjection) -> String {
    format!(
        r#"
Create a professional lead report with the following structure:

# {name}
## {position} at {company}

### Contact Details
- **Phone:** {phone}
- **LinkedIn:** {linkedin}
- **Email:** {email}

### About Lead
{about_lead}

### About Company
{about_company}

### Company Details
- **Company HQ:** {headquarters}
- **Company Website:** {website}
- **Industry:** {industry}
- **Employee Count:** {employees}

### Lead Scoring
**Lead Rating:** {rating}

#### Qualification Criteria
- **Decision Maker:** {decision_maker}
- **Viewed Solution Deck:** {viewed_solution_deck}
- **Have Budget:** {have_budget}
- **Need:** {need}

### Engagement Strategy
Please provide specific recommendations for engaging with this lead based on their profile and company details.

### Notes
- Initial contact made through Apollo.io lead generation
"#,
        name = lead.name,
        position = lead.position,
        company = lead.company_name,
        phone = lead.contact_details.phone,
        linkedin = lead.contact_details.linkedin,
        email = lead.contact_details.email,
        about_lead = lead.about_lead,
        about_company = lead.about_company,
        headquarters = lead.company_details.headquarters,
        website = lead.company_details.website,
        industry = lead.company_details.industry,
        employees = lead.company_details.employees,
        rating = lead.lead_scoring.rating,
        decision_maker = lead.lead_scoring.qualification_criteria.decision_maker,
        viewed_solution_deck = lead.lead_scoring.qualification_criteria.viewed_solution_deck,
        have_budget = lead.lead_scoring.qualification_criteria.have_budget,
        need = lead.lead_scoring.qualification_criteria.need,
    )
}

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("Failed to generate AI report (status {0}). Please try again later.")]
    Provider(StatusCode),

    #[error("Text generation response missing expected content")]
    MalformedResponse,

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::lead::Organization;

    fn jane() -> EnrichmentResult {
        EnrichmentResult {
            name: Some("Jane Doe".to_string()),
            title: Some("CTO".to_string()),
            photo_url: Some("https://example.com/jane.jpg".to_string()),
            phone_number: Some("+1 555 0100".to_string()),
            linkedin_url: Some("https://linkedin.com/in/janedoe".to_string()),
            email: Some("jane@acme.com".to_string()),
            facebook_url: None,
            organization: Some(Organization {
                name: Some("Acme".to_string()),
                website_url: Some("https://acme.com".to_string()),
                industry: Some("Software".to_string()),
                employee_count: Some("51-200".to_string()),
                location: Some(OrgLocation {
                    city: Some("Austin".to_string()),
                    state: Some("TX".to_string()),
                    country: Some("USA".to_string()),
                }),
                description: Some("Makers of everything".to_string()),
            }),
        }
    }

    #[test]
    fn test_projection_maps_known_fields() {
        let projection = build_lead_projection(&jane());
        assert_eq!(projection.name, "Jane Doe");
        assert_eq!(projection.position, "CTO");
        assert_eq!(projection.company_name, "Acme");
        assert_eq!(projection.company_details.industry, "Software");
        assert_eq!(projection.company_details.employees, "51-200");
        assert_eq!(projection.company_details.headquarters, "Austin, TX, USA");
        assert_eq!(projection.about_lead, "Jane Doe is CTO at Acme");
        assert_eq!(projection.photo.as_deref(), Some("https://example.com/jane.jpg"));
    }

    #[test]
    fn test_projection_defaults_absent_fields_to_placeholder() {
        let projection = build_lead_projection(&EnrichmentResult::default());
        assert_eq!(projection.name, "N/A");
        assert_eq!(projection.position, "N/A");
        assert_eq!(projection.company_name, "N/A");
        assert_eq!(projection.contact_details.phone, "N/A");
        assert_eq!(projection.company_details.headquarters, "N/A");
        assert_eq!(projection.photo, None);
        assert_eq!(
            projection.about_lead,
            "The lead is a professional at their organization"
        );
    }

    #[test]
    fn test_projection_treats_empty_strings_as_absent() {
        let enrichment = EnrichmentResult {
            name: Some(String::new()),
            title: Some(String::new()),
            ..Default::default()
        };
        let projection = build_lead_projection(&enrichment);
        assert_eq!(projection.name, "N/A");
        assert_eq!(projection.position, "N/A");
    }

    #[test]
    fn test_projection_is_byte_identical_on_recompute() {
        let enrichment = jane();
        let first = serde_json::to_vec(&build_lead_projection(&enrichment)).unwrap();
        let second = serde_json::to_vec(&build_lead_projection(&enrichment)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_projection_serializes_camel_case() {
        let value = serde_json::to_value(build_lead_projection(&jane())).unwrap();
        assert_eq!(value["companyName"], "Acme");
        assert_eq!(value["companyDetails"]["employees"], "51-200");
        assert_eq!(
            value["leadScoring"]["qualificationCriteria"]["decisionMaker"],
            "YES"
        );
    }

    #[test]
    fn test_headquarters_partial_location() {
        let location = OrgLocation {
            city: Some("Austin".to_string()),
            state: None,
            country: Some("USA".to_string()),
        };
        assert_eq!(format_headquarters(Some(&location)), "Austin, USA");
    }

    #[test]
    fn test_headquarters_empty_location() {
        assert_eq!(format_headquarters(None), "N/A");
        assert_eq!(format_headquarters(Some(&OrgLocation::default())), "N/A");
    }

    #[test]
    fn test_base_url_override_rewrites_endpoint() {
        let client = OpenAiClient::new("key".to_string(), "gpt-4".to_string())
            .with_base_url("http://127.0.0.1:9");
        assert_eq!(
            client.completions_url,
            "http://127.0.0.1:9/v1/chat/completions"
        );
    }

    #[test]
    fn test_prompt_embeds_projection() {
        let prompt = build_report_prompt(&build_lead_projection(&jane()));
        assert!(prompt.contains("# Jane Doe"));
        assert!(prompt.contains("## CTO at Acme"));
        assert!(prompt.contains("- **Industry:** Software"));
        assert!(prompt.contains("- **Employee Count:** 51-200"));
        assert!(prompt.contains("- **Decision Maker:** YES"));
        assert!(prompt.contains("### Engagement Strategy"));
    }
}
