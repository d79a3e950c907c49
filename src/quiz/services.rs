use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::{error::ApiError, quiz::dto::QuizQuestion, state::AppState};

pub const LEVELS: [&str; 6] = ["A1", "A2", "B1", "B2", "C1", "C2"];

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

/// Ask the completions endpoint for a batch of questions and parse the
/// JSON array out of its reply.
pub async fn generate_quiz(st: &AppState, level: &str) -> Result<Vec<QuizQuestion>, ApiError> {
    if !LEVELS.contains(&level) {
        return Err(ApiError::Validation(
            "Invalid level. Must be one of A1, A2, B1, B2, C1, C2".into(),
        ));
    }

    let prompt = build_prompt(level);
    let request = ChatRequest {
        model: &st.config.quiz.model,
        messages: vec![ChatMessage {
            role: "user",
            content: &prompt,
        }],
        max_tokens: st.config.quiz.max_tokens,
    };

    let response = st
        .http
        .post(&st.config.quiz.completions_url)
        .json(&request)
        .send()
        .await
        .context("quiz completions request")?
        .error_for_status()
        .context("quiz completions status")?
        .json::<ChatResponse>()
        .await
        .context("quiz completions body")?;

    let content = response
        .choices
        .first()
        .map(|c| c.message.content.as_str())
        .ok_or_else(|| anyhow::anyhow!("completions reply had no choices"))?;

    let questions: Vec<QuizQuestion> =
        serde_json::from_str(strip_code_fences(content)).map_err(|e| {
            error!(error = %e, "model reply was not a parsable question array");
            anyhow::Error::from(e)
        })?;

    info!(level, count = questions.len(), "quiz generated");
    Ok(questions)
}

fn build_prompt(level: &str) -> String {
    format!(
        "Generate 20 English quiz questions for level {level}. Each question should be \
         multiple choice with 4 options A, B, C, D, and only one correct answer. Return \
         as JSON array of objects with fields: question, Choice (object with A,B,C,D), \
         Correct (the letter A, B, C, or D). Ensure the response is valid JSON."
    )
}

/// Models wrap JSON replies in Markdown fences more often than not.
fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let body = if let Some(rest) = trimmed.strip_prefix("```json") {
        rest
    } else if let Some(rest) = trimmed.strip_prefix("```") {
        rest
    } else {
        return trimmed;
    };
    body.strip_suffix("```").unwrap_or(body).trim()
}
