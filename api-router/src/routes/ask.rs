use axum::{extract::State, http::StatusCode, response::IntoResponse, Extension, Json};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use retrieval_pipeline::{answer, ChatResponse, ConversationTurn};

use crate::{api_state::ApiState, error::ApiError, middleware_client_identity::ClientId};

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub question: String,
    #[serde(default)]
    pub history: Vec<ConversationTurn>,
}

/// Chat endpoint. A blank question is rejected before the retriever or the
/// model is touched; model-side failures come back as a structured 500 with
/// a user-safe fallback answer.
pub async fn ask_question(
    State(state): State<ApiState>,
    Extension(client): Extension<ClientId>,
    Json(request): Json<AskRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if request.question.trim().is_empty() {
        return Err(ApiError::ValidationError("Question is required".to_string()));
    }

    info!(
        client_id = %client.0,
        history_len = request.history.len(),
        "Received chat question"
    );

    let response = answer(
        &state.store,
        &state.openai_client,
        &state.answer_options,
        &request.question,
        &request.history,
        &client.0,
    )
    .await?;

    match response {
        ChatResponse::Answered(chat_answer) => Ok((
            StatusCode::OK,
            Json(json!({
                "success": true,
                "answer": chat_answer.text,
                "sources": chat_answer.sources,
            })),
        )),
        ChatResponse::Failed(failure) => Ok((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "success": false,
                "error": failure.error,
                "answer": failure.fallback,
            })),
        )),
    }
}
