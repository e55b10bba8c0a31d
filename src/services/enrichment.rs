use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rand::Rng;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::models::lead::EnrichmentResult;

const PEOPLE_MATCH_URL: &str = "https://api.apollo.io/api/v1/people/match";
const UI_AVATARS_URL: &str = "https://ui-avatars.com/api/";

/// Background/foreground hex color pair for synthesized avatars.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AvatarColors {
    pub bg: &'static str,
    pub fg: &'static str,
}

/// Fixed palette used for synthesized avatars.
const AVATAR_PALETTE: [AvatarColors; 5] = [
    AvatarColors { bg: "2563eb", fg: "ffffff" }, // Blue
    AvatarColors { bg: "4f46e5", fg: "ffffff" }, // Indigo
    AvatarColors { bg: "7c3aed", fg: "ffffff" }, // Violet
    AvatarColors { bg: "0891b2", fg: "ffffff" }, // Cyan
    AvatarColors { bg: "0284c7", fg: "ffffff" }, // Light Blue
];

/// How the avatar color pair is chosen when a photo must be synthesized.
///
/// `Random` matches production behavior; `ByNameHash` is deterministic so
/// tests can assert on the generated URL.
#[derive(Debug, Clone, Copy, Default)]
pub enum AvatarColorPolicy {
    #[default]
    Random,
    ByNameHash,
}

impl AvatarColorPolicy {
    fn pick(&self, name: &str) -> AvatarColors {
        let index = match self {
            AvatarColorPolicy::Random => rand::thread_rng().gen_range(0..AVATAR_PALETTE.len()),
            AvatarColorPolicy::ByNameHash => {
                let mut hasher = DefaultHasher::new();
                name.hash(&mut hasher);
                hasher.finish() as usize % AVATAR_PALETTE.len()
            }
        };
        AVATAR_PALETTE[index]
    }
}

#[derive(Serialize)]
struct MatchRequest<'a> {
    email: &'a str,
    reveal_personal_emails: bool,
    reveal_phone_number: bool,
    enrich_profiles: bool,
}

#[derive(Deserialize)]
struct MatchResponse {
    person: Option<EnrichmentResult>,
}

/// Client for the Apollo people-match enrichment API.
pub struct ApolloClient {
    http: Client,
    api_key: String,
    avatar_policy: AvatarColorPolicy,
    match_url: String,
}

impl ApolloClient {
    pub fn new(api_key: String) -> Self {
        Self::with_avatar_policy(api_key, AvatarColorPolicy::Random)
    }

    pub fn with_avatar_policy(api_key: String, avatar_policy: AvatarColorPolicy) -> Self {
        Self {
            http: Client::new(),
            api_key,
            avatar_policy,
            match_url: PEOPLE_MATCH_URL.to_string(),
        }
    }

    /// Point the client at an alternate host (stub servers in tests).
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.match_url = format!("{}/api/v1/people/match", base_url.trim_end_matches('/'));
        self
    }

    /// Resolve an email address to normalized person/company facts.
    ///
    /// Issues a single request; failures are not retried and propagate to
    /// the caller to be recorded verbatim. The returned `photo_url` is
    /// always populated (provider photo, a Facebook-derived picture, or a
    /// synthesized avatar).
    pub async fn enrich(&self, email: &str) -> Result<EnrichmentResult, EnrichmentError> {
        let response = self
            .http
            .post(&self.match_url)
            .header("Cache-Control", "no-cache")
            .header("X-API-KEY", &self.api_key)
            .json(&MatchRequest {
                email,
                reveal_personal_emails: false,
                reveal_phone_number: false,
                enrich_profiles: true,
            })
            .send()
            .await
            .map_err(EnrichmentError::Http)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, email = %email, "Apollo people match failed");

            return Err(match status {
                StatusCode::TOO_MANY_REQUESTS => EnrichmentError::RateLimited,
                StatusCode::UNAUTHORIZED => EnrichmentError::AuthFailed,
                StatusCode::BAD_REQUEST => EnrichmentError::BadRequest,
                StatusCode::NOT_FOUND => EnrichmentError::NoData,
                other => EnrichmentError::Provider(other),
            });
        }

        let body: MatchResponse = response.json().await.map_err(EnrichmentError::Http)?;
        let mut person = body.person.ok_or(EnrichmentError::EmptyResult)?;

        person.photo_url = Some(resolve_photo_url(&person, email, self.avatar_policy));

        Ok(person)
    }
}

/// Photo resolution policy: provider photo first, then a picture derived
/// from the Facebook profile URL, otherwise a synthesized avatar.
fn resolve_photo_url(person: &EnrichmentResult, email: &str, policy: AvatarColorPolicy) -> String {
    if let Some(url) = person.photo_url.as_deref().filter(|u| !u.is_empty()) {
        return url.to_string();
    }

    if let Some(url) = person.facebook_url.as_deref().and_then(facebook_picture_url) {
        return url;
    }

    let name = person
        .name
        .as_deref()
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| email.split('@').next().unwrap_or(email));

    avatar_url(name, policy.pick(name))
}

/// Derive a profile picture URL from a Facebook profile URL, if the
/// username can be extracted.
fn facebook_picture_url(facebook_url: &str) -> Option<String> {
    let username = facebook_url
        .split("facebook.com/")
        .nth(1)?
        .split('?')
        .next()?
        .trim_end_matches('/');

    if username.is_empty() {
        return None;
    }

    Some(format!(
        "https://graph.facebook.com/{username}/picture?type=large"
    ))
}

fn avatar_url(name: &str, colors: AvatarColors) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("name", name)
        .append_pair("background", colors.bg)
        .append_pair("color", colors.fg)
        .append_pair("bold", "true")
        .append_pair("size", "200")
        .append_pair("length", "2")
        .append_pair("font-size", "0.4")
        .finish();

    format!("{UI_AVATARS_URL}?{query}")
}

#[derive(Debug, thiserror::Error)]
pub enum EnrichmentError {
    #[error("Apollo API rate limit exceeded. Please try again later.")]
    RateLimited,

    #[error("Invalid Apollo API key. Please check your configuration.")]
    AuthFailed,

    #[error("Invalid request to Apollo API. Please check the email format.")]
    BadRequest,

    #[error("No data found for the provided email address.")]
    NoData,

    #[error("No person data found in Apollo API response")]
    EmptyResult,

    #[error("Failed to fetch Apollo data: {0}")]
    Provider(StatusCode),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}
