use axum::extract::FromRef;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    auth::{
        dto::{ChangePasswordRequest, LoginRequest, RegisterRequest, ScoreInput},
        jwt::JwtKeys,
        password::{Credential, Hasher},
        repo_types::{NewUser, User},
    },
    error::ApiError,
    state::AppState,
};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Argon2 is deliberately slow, so hashing runs on the blocking pool and
/// the request threads keep serving other traffic meanwhile.
async fn hash_blocking(hasher: Hasher, credential: Credential) -> Result<String, ApiError> {
    let hash = tokio::task::spawn_blocking(move || credential.hash_with(&hasher))
        .await
        .map_err(anyhow::Error::from)??;
    Ok(hash)
}

async fn verify_blocking(hasher: Hasher, plain: String, stored: String) -> Result<bool, ApiError> {
    let ok = tokio::task::spawn_blocking(move || hasher.verify(&plain, &stored))
        .await
        .map_err(anyhow::Error::from)?;
    Ok(ok)
}

/// Register a new account. The duplicate pre-check runs before the
/// expensive hash; the unique index stays authoritative for the race
/// window between check and insert.
pub async fn register(st: &AppState, req: RegisterRequest) -> Result<User, ApiError> {
    let full_name = req.full_name.trim().to_string();
    let username = req.username.trim().to_lowercase();
    let email = req.email.trim().to_lowercase();
    let password = req.password;

    if full_name.is_empty() || username.is_empty() || email.is_empty() || password.trim().is_empty()
    {
        return Err(ApiError::Validation(
            "All fields are required: fullName, username, email, password".into(),
        ));
    }
    if !is_valid_email(&email) {
        warn!(email = %email, "rejected invalid email");
        return Err(ApiError::Validation("Please enter a valid email".into()));
    }
    if password.len() < 6 {
        return Err(ApiError::Validation(
            "Password must be at least 6 characters".into(),
        ));
    }

    // Username and email share one lookup namespace because login matches
    // either column, so both probes must come back empty.
    for probe in [username.as_str(), email.as_str()] {
        if st.users.find_by_identifier(probe).await?.is_some() {
            warn!(identifier = %probe, "registration for taken identifier");
            return Err(ApiError::DuplicateUser);
        }
    }

    let hasher = Hasher::from_ref(st);
    let password_hash = hash_blocking(hasher, Credential::Plaintext(password)).await?;

    let user = st
        .users
        .insert(NewUser {
            full_name,
            username,
            email,
            password_hash,
        })
        .await?;

    info!(user_id = %user.id, username = %user.username, "user registered");
    Ok(user)
}

/// Authenticate by username or email. Unknown identifier and wrong
/// password leave the same trace to the caller.
pub async fn login(st: &AppState, req: LoginRequest) -> Result<(String, User), ApiError> {
    let identifier = req.identifier.trim().to_lowercase();
    if identifier.is_empty() || req.password.is_empty() {
        return Err(ApiError::Validation(
            "Identifier and password are required".into(),
        ));
    }

    let user = match st.users.find_by_identifier(&identifier).await? {
        Some(u) => u,
        None => {
            warn!(identifier = %identifier, "login for unknown identifier");
            return Err(ApiError::InvalidCredentials);
        }
    };

    let hasher = Hasher::from_ref(st);
    let ok = verify_blocking(hasher, req.password, user.password_hash.clone()).await?;
    if !ok {
        warn!(user_id = %user.id, "login with wrong password");
        return Err(ApiError::InvalidCredentials);
    }

    let token = JwtKeys::from_ref(st).sign(&user)?;
    info!(user_id = %user.id, "user logged in");
    Ok((token, user))
}

/// Replace the password of the authenticated user. The bearer token
/// already proved identity, so no current password is required.
pub async fn change_password(
    st: &AppState,
    user_id: Uuid,
    req: ChangePasswordRequest,
) -> Result<(), ApiError> {
    if req.new_password.trim().is_empty() || req.new_password.len() < 6 {
        return Err(ApiError::Validation(
            "New password must be at least 6 characters".into(),
        ));
    }

    let mut user = match st.users.find_by_id(user_id).await? {
        Some(u) => u,
        None => return Err(ApiError::NotFound("User not found".into())),
    };

    let hasher = Hasher::from_ref(st);
    user.password_hash = hash_blocking(hasher, Credential::Plaintext(req.new_password)).await?;
    st.users.update(&user).await?;

    info!(user_id = %user.id, "password changed");
    Ok(())
}

/// Store the latest quiz score as a normalized percentage string.
pub async fn submit_score(
    st: &AppState,
    user_id: Uuid,
    score: ScoreInput,
) -> Result<String, ApiError> {
    let normalized = normalize_score(&score)?;

    let mut user = match st.users.find_by_id(user_id).await? {
        Some(u) => u,
        None => return Err(ApiError::NotFound("User not found".into())),
    };

    // The update re-saves the whole record; the untouched password is
    // tagged as already hashed so it passes through unchanged.
    let hasher = Hasher::from_ref(st);
    user.password_hash = Credential::Hashed(user.password_hash).hash_with(&hasher)?;
    user.recent_score = Some(normalized.clone());
    st.users.update(&user).await?;

    info!(user_id = %user.id, score = %normalized, "score submitted");
    Ok(normalized)
}

/// Reduce a wire score to `"<n>%"` with n an integer in 0..=100.
fn normalize_score(input: &ScoreInput) -> Result<String, ApiError> {
    const MSG: &str = "Score must be an integer between 0 and 100";
    let value = match input {
        ScoreInput::Number(n) => *n,
        ScoreInput::Text(s) => {
            let trimmed = s.trim();
            let trimmed = trimmed.strip_suffix('%').unwrap_or(trimmed).trim();
            trimmed
                .parse::<f64>()
                .map_err(|_| ApiError::Validation(MSG.into()))?
        }
    };
    if value.fract() != 0.0 || !(0.0..=100.0).contains(&value) {
        return Err(ApiError::Validation(MSG.into()));
    }
    Ok(format!("{}%", value as i64))
}
