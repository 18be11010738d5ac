use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenClaims {
    pub exp: u64,    // Expiration in seconds since Unix epoch
    pub iat: u64,    // Issued at (seconds since Unix epoch)
    pub jti: Uuid,   // Token ID, keys the server-side revocation record
    pub uid: i32,    // User ID
    pub unm: String, // Username
}

#[derive(Debug)]
pub enum TokenError {
    TokenInvalid,
    TokenExpired,
    TokenMissing,
    EncodingError(jsonwebtoken::errors::Error),
}

impl std::error::Error for TokenError {}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenError::TokenInvalid => write!(f, "TokenError: Token is invalid"),
            TokenError::TokenExpired => write!(f, "TokenError: Token has expired"),
            TokenError::TokenMissing => write!(f, "TokenError: Token is missing"),
            TokenError::EncodingError(e) => write!(f, "TokenError: Failed to encode token: {e}"),
        }
    }
}

pub fn generate_access_token(
    user_id: i32,
    username: &str,
    lifetime: Duration,
    signing_key: &[u8],
) -> Result<(String, Uuid), TokenError> {
    let time_since_epoch = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Failed to fetch system time");
    let token_id = Uuid::now_v7();

    let claims = TokenClaims {
        exp: (time_since_epoch + lifetime).as_secs(),
        iat: time_since_epoch.as_secs(),
        jti: token_id,
        uid: user_id,
        unm: String::from(username),
    };

    let token = jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )
    .map_err(TokenError::EncodingError)?;

    Ok((token, token_id))
}

pub fn validate_access_token(token: &str, signing_key: &[u8]) -> Result<TokenClaims, TokenError> {
    let decoded = jsonwebtoken::decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(signing_key),
        &Validation::new(Algorithm::HS256),
    );

    match decoded {
        Ok(token_data) => Ok(token_data.claims),
        Err(e) => match e.kind() {
            ErrorKind::ExpiredSignature => Err(TokenError::TokenExpired),
            _ => Err(TokenError::TokenInvalid),
        },
    }
}
