use crate::error::{AppError, AppResult};
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use leadform_core::gate::{CredentialHasher, GateError, ADMIN_USERNAME};
use serde::{Deserialize, Serialize};

/// Hash a password using Argon2id with the crate's default parameters
pub fn hash_password(password: &str) -> Result<String, GateError> {
    use argon2::password_hash::rand_core::OsRng;
    let salt = SaltString::generate(&mut OsRng);

    let argon2 = Argon2::default();

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| GateError::Hashing(format!("Failed to hash password: {}", e)))?
        .to_string();

    Ok(password_hash)
}

/// Verify a password against an Argon2id hash
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, GateError> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|e| GateError::Hashing(format!("Failed to parse password hash: {}", e)))?;

    let argon2 = Argon2::default();

    match argon2.verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(_) => Ok(false),
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Argon2Hasher;

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<String, GateError> {
        hash_password(password)
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, GateError> {
        verify_password(password, hash)
    }
}

/// JWT claims for admin session tokens
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub epoch: u64, // Gate session epoch at login
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(epoch: u64, hours: i64) -> Self {
        let now = Utc::now().timestamp();

        Self {
            sub: ADMIN_USERNAME.to_string(),
            epoch,
            exp: now + hours * 60 * 60,
            iat: now,
        }
    }
}

/// Generate a JWT token from claims
pub fn generate_token(claims: &Claims, secret: &str) -> AppResult<String> {
    let token = encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Failed to generate JWT token: {}", e)))?;

    Ok(token)
}

/// Validate and decode a JWT token
pub fn validate_token(token: &str, secret: &str) -> AppResult<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))?;

    Ok(token_data.claims)
}
