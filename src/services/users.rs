use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{Duration, Utc};

use crate::{
    config::AuthConfig,
    database::DbConn,
    error::{Error, Result},
    models::users::{LoginResult, LoginUser, NewUser, RegisterUser, User},
    queries::users,
    services::jwt,
    validation::{FieldErrors, email_looks_valid},
};
use secrecy::ExposeSecret;

/// Registers a new (non-superuser) account with password validation and hashing.
pub async fn register_user(conn: &mut DbConn, register: RegisterUser) -> Result<User> {
    let mut errors = FieldErrors::new();

    if register.username.trim().is_empty() {
        errors.add("username", "Username is required");
    }
    if !email_looks_valid(&register.email) {
        errors.add("email", "Enter a valid email address");
    }
    if register.password.len() < 8 {
        errors.add("password", "Password must be at least 8 characters long");
    }
    if register.password != register.confirm_password {
        errors.add("confirm_password", "Passwords do not match");
    }
    errors.into_result()?;

    // Hash the password using Argon2
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(register.password.as_bytes(), &salt)
        .map_err(|e| Error::Internal(format!("Failed to hash password: {}", e)))?
        .to_string();

    let new_user = NewUser {
        username: register.username.trim().to_string(),
        email: register.email.trim().to_string(),
        password_hash,
        full_name: register.full_name,
    };

    users::create_user(conn, new_user).await
}

/// Authenticates a user by username or email.
///
/// Every failure path answers with the same generic message so callers
/// cannot distinguish an unknown account from a wrong password.
pub async fn login_user(conn: &mut DbConn, login: LoginUser, auth: &AuthConfig) -> Result<LoginResult> {
    let invalid = || Error::Authentication("Invalid credentials".to_string());

    let identifier = login.identifier.trim();
    if identifier.is_empty() || login.password.is_empty() {
        return Err(invalid());
    }

    let user = users::find_user_by_identifier(conn, identifier)
        .await?
        .ok_or_else(invalid)?;

    if !verify_password(&login.password, &user.password_hash)? {
        return Err(invalid());
    }

    let access_token = jwt::generate_jwt(
        user.id,
        auth.jwt_secret.expose_secret(),
        auth.access_token_minutes,
    )?;
    let access_token_expires_at = Utc::now() + Duration::minutes(auth.access_token_minutes);

    Ok(LoginResult {
        user,
        access_token,
        access_token_expires_at,
    })
}

/// Verifies a password against a password hash
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| Error::Internal(format!("Invalid password hash: {}", e)))?;

    let argon2 = Argon2::default();

    match argon2.verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(Error::Internal(format!("Password verification failed: {}", e))),
    }
}
