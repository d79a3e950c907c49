use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Request body for user registration. Absent fields deserialize as
/// empty strings and fail the required-field check instead of the body
/// parse, so every missing-input case gets the same validation answer.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Request body for login. The identifier is a username or an email.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub identifier: String,
    #[serde(default)]
    pub password: String,
}

/// Request body for password change. The bearer token is the proof of
/// identity; no current password is asked for.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    /// Defaults to empty so a missing field fails the length check.
    #[serde(default)]
    pub new_password: String,
}

/// Request body for score submission.
#[derive(Debug, Deserialize)]
pub struct SubmitScoreRequest {
    /// Defaults to an empty text score, which fails normalization.
    #[serde(default)]
    pub score: ScoreInput,
}

/// Score as it arrives on the wire: clients send 30, "30" or "30%".
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ScoreInput {
    Number(f64),
    Text(String),
}

impl Default for ScoreInput {
    fn default() -> Self {
        ScoreInput::Text(String::new())
    }
}

/// Public part of the user returned after registration.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredUser {
    pub id: Uuid,
    pub full_name: String,
    pub username: String,
    pub email: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Response returned after registration.
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub success: bool,
    pub message: String,
    pub user: RegisteredUser,
}

/// Public part of the user returned after login.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: Uuid,
    pub full_name: String,
    pub username: String,
    pub email: String,
    pub recent_score: Option<String>,
}

/// Response returned after login, carrying the bearer token.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    pub token: String,
    pub user: SessionUser,
}

/// Plain success envelope.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

/// Response returned after score submission.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResponse {
    pub success: bool,
    pub message: String,
    pub recent_score: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_request_reads_camel_case_keys() {
        let body = r#"{
            "fullName": "Ann Example",
            "username": "Ann",
            "email": "ANN@x.com",
            "password": "secret1"
        }"#;
        let req: RegisterRequest = serde_json::from_str(body).unwrap();
        assert_eq!(req.full_name, "Ann Example");
        assert_eq!(req.username, "Ann");
        assert_eq!(req.email, "ANN@x.com");
        assert_eq!(req.password, "secret1");
    }

    #[test]
    fn change_password_request_reads_camel_case_keys() {
        let body = r#"{"newPassword": "newsecret"}"#;
        let req: ChangePasswordRequest = serde_json::from_str(body).unwrap();
        assert_eq!(req.new_password, "newsecret");
    }

    #[test]
    fn score_input_accepts_numbers_and_strings() {
        let num: SubmitScoreRequest = serde_json::from_str(r#"{"score": 30}"#).unwrap();
        let text: SubmitScoreRequest = serde_json::from_str(r#"{"score": "30"}"#).unwrap();
        let pct: SubmitScoreRequest = serde_json::from_str(r#"{"score": "30%"}"#).unwrap();
        assert!(matches!(num.score, ScoreInput::Number(n) if n == 30.0));
        assert!(matches!(text.score, ScoreInput::Text(ref s) if s == "30"));
        assert!(matches!(pct.score, ScoreInput::Text(ref s) if s == "30%"));
    }

    #[test]
    fn absent_body_fields_default_to_empty_values() {
        let reg: RegisterRequest = serde_json::from_str("{}").unwrap();
        assert!(reg.full_name.is_empty() && reg.username.is_empty());
        assert!(reg.email.is_empty() && reg.password.is_empty());

        let login: LoginRequest = serde_json::from_str("{}").unwrap();
        assert!(login.identifier.is_empty() && login.password.is_empty());

        let change: ChangePasswordRequest = serde_json::from_str("{}").unwrap();
        assert!(change.new_password.is_empty());

        let score: SubmitScoreRequest = serde_json::from_str("{}").unwrap();
        assert!(matches!(score.score, ScoreInput::Text(ref s) if s.is_empty()));
    }

    #[test]
    fn registered_user_serializes_camel_case() {
        let user = RegisteredUser {
            id: Uuid::new_v4(),
            full_name: "Ann Example".into(),
            username: "ann".into(),
            email: "ann@x.com".into(),
            created_at: OffsetDateTime::now_utc(),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(json.contains("\"fullName\""));
        assert!(json.contains("\"createdAt\""));
        assert!(!json.contains("password"));
    }

    #[test]
    fn session_user_keeps_nullable_score() {
        let user = SessionUser {
            id: Uuid::new_v4(),
            full_name: "Ann Example".into(),
            username: "ann".into(),
            email: "ann@x.com".into(),
            recent_score: None,
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(json.contains("\"recentScore\":null"));
        assert!(!json.contains("password"));
    }
}
