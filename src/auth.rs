use bcrypt::{hash, verify, DEFAULT_COST};
use jsonwebtoken::{encode, decode, Header, Validation, EncodingKey, DecodingKey, Algorithm};
use crate::models::AuthPayload;
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

static SECRET: OnceLock<Vec<u8>> = OnceLock::new();

// TASKBOARD_JWT_SECRET in prod; the fallback only exists for local runs
fn secret_key() -> &'static [u8] {
    SECRET.get_or_init(|| {
        std::env::var("TASKBOARD_JWT_SECRET")
            .map(String::into_bytes)
            .unwrap_or_else(|_| b"taskboard_dev_secret".to_vec())
    })
}

pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    hash(password, DEFAULT_COST)
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, bcrypt::BcryptError> {
    verify(password, hash)
}

pub fn create_jwt(user_id: &Uuid) -> Result<String, jsonwebtoken::errors::Error> {
    let expiration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock before epoch")
        .as_secs() as usize + 60 * 60 * 24; // 24 hours

    let claims = AuthPayload {
        sub: *user_id,
        exp: expiration,
    };

    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret_key()))
}

pub fn validate_jwt(token: &str) -> Result<AuthPayload, jsonwebtoken::errors::Error> {
    let token_data = decode::<AuthPayload>(
        token,
        &DecodingKey::from_secret(secret_key()),
        &Validation::new(Algorithm::HS256),
    )?;
    Ok(token_data.claims)
}
