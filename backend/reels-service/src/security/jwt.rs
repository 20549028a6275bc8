/// JWT issuing and validation for reels-service
///
/// Tokens are HS256 with a process-wide secret loaded once at startup.
/// No hardcoded fallback secret: the service refuses to boot without
/// `JWT_SECRET`. Keys are immutable after initialization.
///
/// Services must call `initialize()` during startup before any JWT
/// operations.
use anyhow::{anyhow, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, Algorithm, DecodingKey, EncodingKey, Header, TokenData, Validation,
};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const JWT_ALGORITHM: Algorithm = Algorithm::HS256;

/// JWT claims: subject is the user id as a UUID string.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    expiry: Duration,
}

/// Thread-safe global key storage, initialized once at startup.
static JWT_KEYS: OnceCell<Keys> = OnceCell::new();

/// Initialize the signing secret and token lifetime.
///
/// Can only be called once; subsequent calls return an error.
pub fn initialize(secret: &str, expiry_days: i64) -> Result<()> {
    if secret.is_empty() {
        return Err(anyhow!("JWT secret must not be empty"));
    }

    let keys = Keys {
        encoding: EncodingKey::from_secret(secret.as_bytes()),
        decoding: DecodingKey::from_secret(secret.as_bytes()),
        expiry: Duration::days(expiry_days.max(1)),
    };

    JWT_KEYS
        .set(keys)
        .map_err(|_| anyhow!("JWT keys already initialized"))
}

fn keys() -> Result<&'static Keys> {
    JWT_KEYS
        .get()
        .ok_or_else(|| anyhow!("JWT keys not initialized - call jwt::initialize() at startup"))
}

/// Issue an access token for the given user.
pub fn issue_token(user_id: Uuid) -> Result<String> {
    let keys = keys()?;
    let now = Utc::now();

    let claims = Claims {
        sub: user_id.to_string(),
        iat: now.timestamp(),
        exp: (now + keys.expiry).timestamp(),
    };

    encode(&Header::new(JWT_ALGORITHM), &claims, &keys.encoding)
        .map_err(|e| anyhow!("Failed to sign token: {e}"))
}

/// Validate a token and return its decoded claims.
pub fn validate_token(token: &str) -> Result<TokenData<Claims>> {
    let keys = keys()?;
    let validation = Validation::new(JWT_ALGORITHM);

    decode::<Claims>(token, &keys.decoding, &validation)
        .map_err(|e| anyhow!("Invalid token: {e}"))
}

/// Extract the user id from a validated token.
pub fn user_id_from_token(token: &str) -> Result<Uuid> {
    let data = validate_token(token)?;
    Uuid::parse_str(&data.claims.sub).map_err(|_| anyhow!("Invalid token: malformed subject"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ensure_keys() {
        // OnceCell: only the first test to get here actually initializes.
        let _ = initialize("test-secret-for-unit-tests", 7);
    }

    #[test]
    fn round_trip() {
        ensure_keys();
        let user_id = Uuid::new_v4();
        let token = issue_token(user_id).unwrap();
        assert_eq!(user_id_from_token(&token).unwrap(), user_id);
    }

    #[test]
    fn tampered_token_rejected() {
        ensure_keys();
        let token = issue_token(Uuid::new_v4()).unwrap();
        let mut tampered = token.clone();
        // Flip a character in the signature segment.
        let last = tampered.pop().unwrap();
        tampered.push(if last == 'a' { 'b' } else { 'a' });
        assert!(validate_token(&tampered).is_err());
    }

    #[test]
    fn garbage_token_rejected() {
        ensure_keys();
        assert!(validate_token("not-a-jwt").is_err());
    }

    #[test]
    fn claims_carry_expiry_after_issue_time() {
        ensure_keys();
        let token = issue_token(Uuid::new_v4()).unwrap();
        let data = validate_token(&token).unwrap();
        assert!(data.claims.exp > data.claims.iat);
    }
}
