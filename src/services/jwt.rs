use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - user_id as string
    pub sub: String,
    /// Expiration time as Unix timestamp
    pub exp: i64,
    /// Issued at time as Unix timestamp
    pub iat: i64,
}

/// Generates a JWT access token for a user.
///
/// # Arguments
/// * `user_id` - The user's UUID
/// * `secret` - The JWT secret key for signing
/// * `expiration_minutes` - Token expiration time in minutes (from config)
pub fn generate_jwt(user_id: Uuid, secret: &str, expiration_minutes: i64) -> Result<String> {
    let now = Utc::now();
    let expiration = now + Duration::minutes(expiration_minutes);

    let claims = Claims {
        sub: user_id.to_string(),
        exp: expiration.timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )
    .map_err(|e| Error::Internal(format!("Failed to generate JWT: {}", e)))
}

/// Verifies a JWT token and returns the claims if valid.
///
/// Returns an error if the token is invalid, expired, or has a bad signature.
pub fn verify_jwt(token: &str, secret: &str) -> Result<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::default(),
    )
    .map_err(|e| {
        let error_msg = e.to_string().to_lowercase();
        if error_msg.contains("expired") {
            Error::Authentication("Token has expired".to_string())
        } else if error_msg.contains("signature") {
            Error::Authentication("Invalid token signature".to_string())
        } else {
            Error::Authentication(format!("Invalid token: {}", e))
        }
    })?;

    Ok(token_data.claims)
}

/// Extracts the user id from a valid JWT token.
pub fn get_user_id_from_token(token: &str, secret: &str) -> Result<Uuid> {
    let claims = verify_jwt(token, secret)?;
    Uuid::parse_str(&claims.sub).map_err(|_| Error::Internal("Invalid user_id in token".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_jwt() {
        let user_id = Uuid::now_v7();
        let token = generate_jwt(user_id, "test-secret-key", 15).unwrap();
        assert!(!token.is_empty());
        assert!(token.contains('.'));
    }

    #[test]
    fn test_verify_jwt_valid() {
        let user_id = Uuid::now_v7();
        let token = generate_jwt(user_id, "test-secret-key", 15).unwrap();
        let claims = verify_jwt(&token, "test-secret-key").unwrap();
        assert_eq!(claims.sub, user_id.to_string());
    }

    #[test]
    fn test_verify_jwt_invalid_signature() {
        let user_id = Uuid::now_v7();
        let token = generate_jwt(user_id, "test-secret-key", 15).unwrap();
        assert!(verify_jwt(&token, "wrong-secret").is_err());
    }

    #[test]
    fn test_verify_jwt_invalid_format() {
        assert!(verify_jwt("invalid.token.here", "test-secret-key").is_err());
    }

    #[test]
    fn test_get_user_id_from_token() {
        let user_id = Uuid::now_v7();
        let token = generate_jwt(user_id, "test-secret-key", 15).unwrap();
        assert_eq!(get_user_id_from_token(&token, "test-secret-key").unwrap(), user_id);
    }
}
