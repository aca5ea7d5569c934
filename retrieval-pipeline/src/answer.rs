use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessage, ChatCompletionRequestUserMessage,
        CreateChatCompletionRequest, CreateChatCompletionRequestArgs,
    },
    Client,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use common::{
    error::AppError,
    storage::{
        types::document_chunk::SourceKind,
        vector_store::{RetrievedChunk, VectorStore},
    },
    utils::config::AppConfig,
};

use crate::retriever::{format_context, retrieve_context};

/// Cap on how much of a chunk is echoed back to the caller as a preview.
const SOURCE_PREVIEW_CHARS: usize = 200;

const FALLBACK_ANSWER: &str = "Sorry, I encountered an error processing your request.";

/// Decoding and retrieval parameters for one answer call. Low temperature
/// keeps the model close to the retrieved context.
#[derive(Debug, Clone)]
pub struct AnswerOptions {
    pub model: String,
    pub top_k: usize,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl AnswerOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            model: config.chat_model.clone(),
            top_k: config.retrieval_top_k,
            max_tokens: config.answer_max_tokens,
            temperature: config.answer_temperature,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    #[serde(alias = "human")]
    User,
    #[serde(alias = "ai")]
    Assistant,
}

/// One prior turn of the conversation, held by the caller and passed in
/// read-only. Never persisted here.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConversationTurn {
    pub role: TurnRole,
    pub content: String,
}

/// Provenance entry returned alongside an answer. Carries a bounded preview
/// rather than the full chunk text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceRef {
    pub source_name: String,
    pub source_kind: SourceKind,
    pub source_url: Option<String>,
    pub content: String,
}

impl SourceRef {
    fn from_chunk(hit: &RetrievedChunk) -> Self {
        Self {
            source_name: hit.chunk.source_name.clone(),
            source_kind: hit.chunk.source_kind,
            source_url: hit.chunk.source_url.clone(),
            content: preview(&hit.chunk.text),
        }
    }
}

#[derive(Debug)]
pub struct ChatAnswer {
    pub text: String,
    pub sources: Vec<SourceRef>,
}

/// Structured model-side failure: the caller gets a user-safe fallback
/// string plus the underlying error message, never a propagated fault.
#[derive(Debug)]
pub struct ModelFailure {
    pub error: String,
    pub fallback: String,
}

impl ModelFailure {
    fn new(error: String) -> Self {
        Self {
            error,
            fallback: FALLBACK_ANSWER.to_string(),
        }
    }
}

#[derive(Debug)]
pub enum ChatResponse {
    Answered(ChatAnswer),
    Failed(ModelFailure),
}

/// Produces a grounded answer for one owner's question. Retrieval failures
/// propagate as errors since there is no safe state to answer from; model
/// failures are converted into a structured [`ChatResponse::Failed`].
#[instrument(skip_all, fields(user_id = %user_id, history_len = history.len()))]
pub async fn answer(
    store: &VectorStore,
    llm: &Client<OpenAIConfig>,
    options: &AnswerOptions,
    question: &str,
    history: &[ConversationTurn],
    user_id: &str,
) -> Result<ChatResponse, AppError> {
    let chunks = retrieve_context(store, question, user_id, options.top_k).await?;
    let context = format_context(&chunks);

    let request = match build_chat_request(options, &context, history, question) {
        Ok(request) => request,
        Err(err) => {
            warn!(error = %err, "Failed to build chat completion request");
            return Ok(ChatResponse::Failed(ModelFailure::new(err.to_string())));
        }
    };

    match llm.chat().create(request).await {
        Ok(response) => {
            let Some(text) = response
                .choices
                .into_iter()
                .next()
                .and_then(|choice| choice.message.content)
            else {
                warn!("Chat completion contained no content");
                return Ok(ChatResponse::Failed(ModelFailure::new(
                    "No content found in model response".to_string(),
                )));
            };

            info!(
                sources = chunks.len(),
                answer_chars = text.len(),
                "Chat answer generated"
            );

            Ok(ChatResponse::Answered(ChatAnswer {
                text,
                sources: chunks.iter().map(SourceRef::from_chunk).collect(),
            }))
        }
        Err(err) => {
            warn!(error = %err, "Chat completion failed");
            Ok(ChatResponse::Failed(ModelFailure::new(err.to_string())))
        }
    }
}

fn build_system_prompt(context: &str) -> String {
    let context = if context.is_empty() {
        "No context available."
    } else {
        context
    };

    format!(
        "You are a helpful AI assistant. Use the following context from the user's \
uploaded documents to answer their questions accurately.\n\n\
CONTEXT FROM DOCUMENTS:\n{context}\n\n\
Instructions:\n\
- Answer based primarily on the provided context\n\
- Be specific and cite which documents you're referencing\n\
- If information isn't in the context, clearly state that\n\
- Keep responses conversational and helpful"
    )
}

/// Instruction message first, the caller's history re-mapped into the
/// two-role form, then the current question as the final user turn.
fn build_chat_request(
    options: &AnswerOptions,
    context: &str,
    history: &[ConversationTurn],
    question: &str,
) -> Result<CreateChatCompletionRequest, OpenAIError> {
    let mut messages: Vec<ChatCompletionRequestMessage> = Vec::with_capacity(history.len() + 2);

    messages.push(ChatCompletionRequestSystemMessage::from(build_system_prompt(context)).into());

    for turn in history {
        match turn.role {
            TurnRole::User => {
                messages.push(ChatCompletionRequestUserMessage::from(turn.content.clone()).into());
            }
            TurnRole::Assistant => {
                messages.push(
                    ChatCompletionRequestAssistantMessageArgs::default()
                        .content(turn.content.clone())
                        .build()?
                        .into(),
                );
            }
        }
    }

    messages.push(ChatCompletionRequestUserMessage::from(question.to_string()).into());

    CreateChatCompletionRequestArgs::default()
        .model(options.model.clone())
        .messages(messages)
        .temperature(options.temperature)
        .max_tokens(options.max_tokens)
        .build()
}

fn preview(text: &str) -> String {
    if text.chars().count() <= SOURCE_PREVIEW_CHARS {
        return text.to_string();
    }

    let truncated: String = text.chars().take(SOURCE_PREVIEW_CHARS).collect();
    format!("{truncated}...")
}
