use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_days: i64,
}

/// Argon2 cost parameters. Verification reads the parameters embedded in
/// the stored hash, so raising these never invalidates existing hashes.
#[derive(Debug, Clone, Deserialize)]
pub struct HashingConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuizConfig {
    pub completions_url: String,
    pub model: String,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub hashing: HashingConfig,
    pub quiz: QuizConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "quizmind".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "quizmind-users".into()),
            ttl_days: std::env::var("JWT_TTL_DAYS")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(7),
        };
        let hashing = HashingConfig {
            memory_kib: std::env::var("ARGON2_MEMORY_KIB")
                .ok()
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(19_456),
            iterations: std::env::var("ARGON2_ITERATIONS")
                .ok()
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(2),
            parallelism: std::env::var("ARGON2_PARALLELISM")
                .ok()
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(1),
        };
        let quiz = QuizConfig {
            completions_url: std::env::var("QUIZ_COMPLETIONS_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:1234/v1/chat/completions".into()),
            model: std::env::var("QUIZ_MODEL").unwrap_or_else(|_| "local-model".into()),
            max_tokens: std::env::var("QUIZ_MAX_TOKENS")
                .ok()
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(4_000),
        };
        Ok(Self {
            database_url,
            jwt,
            hashing,
            quiz,
        })
    }
}
