use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT payload used for authentication. Username and email are
/// denormalized copies of what the user looked like at issue time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,        // user ID
    pub username: String, // denormalized at issue time
    pub email: String,    // denormalized at issue time
    pub iat: usize,       // issued at (unix timestamp)
    pub exp: usize,       // expires at (unix timestamp)
    pub iss: String,      // issuer
    pub aud: String,      // audience
}
