use std::sync::Arc;

use async_openai::{config::OpenAIConfig, Client};
use common::{
    storage::{db::SurrealDbClient, vector_store::VectorStore},
    utils::{config::AppConfig, embedding::EmbeddingProvider},
};
use ingestion_pipeline::IngestionCoordinator;
use retrieval_pipeline::AnswerOptions;

#[derive(Clone)]
pub struct ApiState {
    pub db: Arc<SurrealDbClient>,
    pub store: Arc<VectorStore>,
    pub openai_client: Arc<Client<OpenAIConfig>>,
    pub coordinator: Arc<IngestionCoordinator>,
    pub answer_options: AnswerOptions,
    pub config: AppConfig,
}

impl ApiState {
    /// Connects to the configured database and wires the full pipeline up.
    pub async fn new(config: &AppConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let db = Arc::new(
            SurrealDbClient::new(
                &config.surrealdb_address,
                &config.surrealdb_username,
                &config.surrealdb_password,
                &config.surrealdb_namespace,
                &config.surrealdb_database,
            )
            .await?,
        );

        let openai_client = Arc::new(Client::with_config(
            OpenAIConfig::new()
                .with_api_key(&config.openai_api_key)
                .with_api_base(&config.openai_base_url),
        ));

        let embedder = EmbeddingProvider::from_config(config, openai_client.clone());
        let store = Arc::new(VectorStore::new(db.clone(), embedder));
        store.ensure_index().await?;

        Self::new_with_resources(db, store, openai_client, config.clone())
    }

    /// Builds the state from already-constructed resources. Tests use this
    /// with an in-memory database and the hashed embedding backend.
    pub fn new_with_resources(
        db: Arc<SurrealDbClient>,
        store: Arc<VectorStore>,
        openai_client: Arc<Client<OpenAIConfig>>,
        config: AppConfig,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let coordinator = Arc::new(IngestionCoordinator::new(store.clone(), &config)?);
        let answer_options = AnswerOptions::from_config(&config);

        Ok(Self {
            db,
            store,
            openai_client,
            coordinator,
            answer_options,
            config,
        })
    }
}
