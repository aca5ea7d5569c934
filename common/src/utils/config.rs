use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use super::embedding::EmbeddingBackend;

#[derive(Clone, Deserialize, Debug)]
pub struct AppConfig {
    pub openai_api_key: String,
    pub surrealdb_address: String,
    pub surrealdb_username: String,
    pub surrealdb_password: String,
    pub surrealdb_namespace: String,
    pub surrealdb_database: String,
    pub http_port: u16,
    #[serde(default = "default_base_url")]
    pub openai_base_url: String,
    #[serde(default = "default_chat_model")]
    pub chat_model: String,
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
    #[serde(default = "default_embedding_dimensions")]
    pub embedding_dimensions: u32,
    #[serde(default)]
    pub embedding_backend: EmbeddingBackend,
    #[serde(default = "default_retrieval_top_k")]
    pub retrieval_top_k: usize,
    #[serde(default = "default_answer_max_tokens")]
    pub answer_max_tokens: u32,
    #[serde(default = "default_answer_temperature")]
    pub answer_temperature: f32,
    #[serde(default = "default_item_timeout_secs")]
    pub item_timeout_secs: u64,
    #[serde(default = "default_ingest_max_files")]
    pub ingest_max_files: usize,
    #[serde(default = "default_ingest_max_texts")]
    pub ingest_max_texts: usize,
    #[serde(default = "default_ingest_max_links")]
    pub ingest_max_links: usize,
    #[serde(default = "default_ingest_max_text_bytes")]
    pub ingest_max_text_bytes: usize,
    #[serde(default = "default_ingest_max_body_bytes")]
    pub ingest_max_body_bytes: usize,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_chat_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_embedding_dimensions() -> u32 {
    1536
}

fn default_retrieval_top_k() -> usize {
    4
}

fn default_answer_max_tokens() -> u32 {
    2048
}

fn default_answer_temperature() -> f32 {
    0.3
}

fn default_item_timeout_secs() -> u64 {
    60
}

fn default_ingest_max_files() -> usize {
    10
}

fn default_ingest_max_texts() -> usize {
    20
}

fn default_ingest_max_links() -> usize {
    20
}

fn default_ingest_max_text_bytes() -> usize {
    200_000
}

fn default_ingest_max_body_bytes() -> usize {
    50_000_000
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            openai_api_key: String::new(),
            surrealdb_address: "mem://".to_string(),
            surrealdb_username: "root".to_string(),
            surrealdb_password: "root".to_string(),
            surrealdb_namespace: "docchat".to_string(),
            surrealdb_database: "docchat".to_string(),
            http_port: 3000,
            openai_base_url: default_base_url(),
            chat_model: default_chat_model(),
            embedding_model: default_embedding_model(),
            embedding_dimensions: default_embedding_dimensions(),
            embedding_backend: EmbeddingBackend::default(),
            retrieval_top_k: default_retrieval_top_k(),
            answer_max_tokens: default_answer_max_tokens(),
            answer_temperature: default_answer_temperature(),
            item_timeout_secs: default_item_timeout_secs(),
            ingest_max_files: default_ingest_max_files(),
            ingest_max_texts: default_ingest_max_texts(),
            ingest_max_links: default_ingest_max_links(),
            ingest_max_text_bytes: default_ingest_max_text_bytes(),
            ingest_max_body_bytes: default_ingest_max_body_bytes(),
        }
    }
}

pub fn get_config() -> Result<AppConfig, ConfigError> {
    let config = Config::builder()
        .add_source(File::with_name("config").required(false))
        .add_source(Environment::default())
        .build()?;

    config.try_deserialize()
}
