use axum::{
    extract::State,
    http::StatusCode,
    routing::{post, put},
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::{
        dto::{
            ChangePasswordRequest, LoginRequest, LoginResponse, MessageResponse, RegisterRequest,
            RegisterResponse, RegisteredUser, ScoreResponse, SessionUser, SubmitScoreRequest,
        },
        extractors::AuthUser,
        services,
    },
    error::ApiError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/change-password", put(change_password))
        .route("/submit-score", post(submit_score))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let user = services::register(&state, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            success: true,
            message: "User registered successfully".into(),
            user: RegisteredUser {
                id: user.id,
                full_name: user.full_name,
                username: user.username,
                email: user.email,
                created_at: user.created_at,
            },
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let (token, user) = services::login(&state, payload).await?;
    Ok(Json(LoginResponse {
        success: true,
        message: "Login successful".into(),
        token,
        user: SessionUser {
            id: user.id,
            full_name: user.full_name,
            username: user.username,
            email: user.email,
            recent_score: user.recent_score,
        },
    }))
}

#[instrument(skip(state, payload))]
pub async fn change_password(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    services::change_password(&state, user_id, payload).await?;
    Ok(Json(MessageResponse {
        success: true,
        message: "Password changed successfully".into(),
    }))
}

#[instrument(skip(state, payload))]
pub async fn submit_score(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<SubmitScoreRequest>,
) -> Result<Json<ScoreResponse>, ApiError> {
    let recent_score = services::submit_score(&state, user_id, payload.score).await?;
    Ok(Json(ScoreResponse {
        success: true,
        message: "Score submitted successfully".into(),
        recent_score,
    }))
}
