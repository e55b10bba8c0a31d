use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    /// Server bind address (e.g., "0.0.0.0:3000").
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// PostgreSQL connection string
    pub database_url: String,

    /// Apollo people-match API key
    pub apollo_api_key: String,

    /// OpenAI API key for narrative generation
    pub openai_api_key: String,

    /// OpenAI model used for narrative generation
    #[serde(default = "default_openai_model")]
    pub openai_model: String,
}

fn default_bind_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_openai_model() -> String {
    "gpt-4".to_string()
}

impl AppConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }
}
