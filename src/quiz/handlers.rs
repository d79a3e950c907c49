use axum::{extract::State, routing::post, Json, Router};
use tracing::instrument;

use crate::{
    error::ApiError,
    quiz::{
        dto::{GenerateQuizRequest, QuizQuestion},
        services,
    },
    state::AppState,
};

pub fn quiz_routes() -> Router<AppState> {
    Router::new().route("/generate-quiz", post(generate_quiz))
}

#[instrument(skip(state, payload))]
pub async fn generate_quiz(
    State(state): State<AppState>,
    Json(payload): Json<GenerateQuizRequest>,
) -> Result<Json<Vec<QuizQuestion>>, ApiError> {
    let questions = services::generate_quiz(&state, &payload.level).await?;
    Ok(Json(questions))
}
