use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::store::users::{Role, User};
use crate::store::Id;

mod policy;

pub use policy::authorize_owner;

/// Claims carried by every issued token. The subject id is re-resolved
/// against the users collection on each authenticated request, so a deleted
/// account invalidates its outstanding tokens.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Id,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(user: &User, ttl_hours: i64) -> Self {
        let now = Utc::now();
        Self {
            sub: user.id.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            role: user.role,
            iat: now.timestamp(),
            exp: (now + Duration::hours(ttl_hours)).timestamp(),
        }
    }
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("Token generation failed: {0}")]
    Generation(String),

    #[error("Invalid or expired token")]
    Invalid,
}

pub fn generate_jwt(claims: &Claims, key: &str) -> Result<String, JwtError> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(key.as_bytes()),
    )
    .map_err(|err| JwtError::Generation(err.to_string()))
}

pub fn validate_jwt(token: &str, key: &str) -> Result<Claims, JwtError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(key.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| JwtError::Invalid)
}
