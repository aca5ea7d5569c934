pub mod answer;
pub mod retriever;

pub use answer::{
    answer, AnswerOptions, ChatAnswer, ChatResponse, ConversationTurn, ModelFailure, SourceRef,
    TurnRole,
};
pub use retriever::{format_context, retrieve_context};
