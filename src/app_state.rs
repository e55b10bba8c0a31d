use sqlx::PgPool;
use std::sync::Arc;

use crate::services::{enrichment::ApolloClient, generation::OpenAiClient};

/// Shared application state passed to all route handlers and cloned into
/// each job's background task. The store handle is constructed once at
/// startup and injected here rather than held in ambient global state.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub enrichment: Arc<ApolloClient>,
    pub generator: Arc<OpenAiClient>,
}

impl AppState {
    pub fn new(db: PgPool, enrichment: ApolloClient, generator: OpenAiClient) -> Self {
        Self {
            db,
            enrichment: Arc::new(enrichment),
            generator: Arc::new(generator),
        }
    }
}
