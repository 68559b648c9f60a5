//! Session token generation and validation for API authentication.
//!
//! Tokens are HMAC-SHA256 based, scoped to a user and an expiry instant.
//! Format: `cs_st_<user_id>_<expires_unix>_<hmac_hex>`

use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

/// Token prefix used to identify session tokens.
const TOKEN_PREFIX: &str = "cs_st_";

/// How long an issued token stays valid.
pub const TOKEN_LIFETIME: Duration = Duration::hours(12);

/// Environment variable holding the hex-encoded signing secret.
pub const SECRET_ENV_VAR: &str = "CORESYNC_TOKEN_SECRET";

/// Errors that can occur during token operations.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("invalid token format: {0}")]
    InvalidFormat(String),

    #[error("invalid user ID in token: {0}")]
    InvalidUserId(String),

    #[error("invalid expiry in token: {0}")]
    InvalidExpiry(String),

    #[error("token HMAC verification failed")]
    HmacMismatch,

    #[error("token expired")]
    Expired,

    #[error("missing token secret")]
    MissingSecret,
}

/// Configuration for token generation and validation.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// The HMAC secret key bytes.
    pub secret: Vec<u8>,
}

impl TokenConfig {
    pub fn new(secret: Vec<u8>) -> Self {
        Self { secret }
    }

    /// Build a config from a hex-encoded secret, as written by `coresync init`.
    pub fn from_hex(secret_hex: &str) -> Result<Self, TokenError> {
        if secret_hex.is_empty() {
            return Err(TokenError::MissingSecret);
        }
        let secret = hex::decode(secret_hex)
            .map_err(|e| TokenError::InvalidFormat(format!("token secret is not valid hex: {e}")))?;
        Ok(Self::new(secret))
    }

    /// Create a TokenConfig from the `CORESYNC_TOKEN_SECRET` environment variable.
    pub fn from_env() -> Result<Self, TokenError> {
        let secret_hex = std::env::var(SECRET_ENV_VAR).map_err(|_| TokenError::MissingSecret)?;
        Self::from_hex(&secret_hex)
    }
}

/// Claims extracted from a validated token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

/// Issue a session token for `user_id`, valid for [`TOKEN_LIFETIME`].
pub fn generate_token(config: &TokenConfig, user_id: Uuid) -> Result<String, TokenError> {
    generate_token_at(config, user_id, Utc::now())
}

/// Issue a token as if the current time were `issued_at`.
pub fn generate_token_at(
    config: &TokenConfig,
    user_id: Uuid,
    issued_at: DateTime<Utc>,
) -> Result<String, TokenError> {
    let expires = (issued_at + TOKEN_LIFETIME).timestamp();
    let mut mac = keyed_mac(&config.secret)?;
    mac.update(signed_message(user_id, expires).as_bytes());
    let hmac_hex = hex::encode(mac.finalize().into_bytes());
    Ok(format!("{TOKEN_PREFIX}{user_id}_{expires}_{hmac_hex}"))
}

/// Validate a session token against the current time.
pub fn validate_token(config: &TokenConfig, token: &str) -> Result<TokenClaims, TokenError> {
    validate_token_at(config, token, Utc::now())
}

/// Validate a token as if the current time were `now`.
///
/// The signature is checked before the expiry so that a forged token never
/// reports `Expired`.
pub fn validate_token_at(
    config: &TokenConfig,
    token: &str,
    now: DateTime<Utc>,
) -> Result<TokenClaims, TokenError> {
    let rest = token.strip_prefix(TOKEN_PREFIX).ok_or_else(|| {
        TokenError::InvalidFormat(format!("token must start with '{TOKEN_PREFIX}'"))
    })?;

    // A hyphenated UUID is always 36 chars.
    if rest.len() < 36 || !rest.is_char_boundary(36) {
        return Err(TokenError::InvalidFormat(
            "token too short to contain a valid UUID".to_string(),
        ));
    }
    let (user_id_str, after_user_id) = rest.split_at(36);
    let user_id =
        Uuid::parse_str(user_id_str).map_err(|e| TokenError::InvalidUserId(e.to_string()))?;

    let after_underscore = after_user_id.strip_prefix('_').ok_or_else(|| {
        TokenError::InvalidFormat("expected underscore after user id".to_string())
    })?;
    let (expires_str, hmac_hex) = after_underscore.split_once('_').ok_or_else(|| {
        TokenError::InvalidFormat("expected underscore between expiry and hmac".to_string())
    })?;

    let expires: i64 = expires_str
        .parse()
        .map_err(|e: std::num::ParseIntError| TokenError::InvalidExpiry(e.to_string()))?;
    let provided_mac = hex::decode(hmac_hex)
        .map_err(|e| TokenError::InvalidFormat(format!("invalid hex in hmac: {e}")))?;

    // verify_slice compares in constant time.
    let mut mac = keyed_mac(&config.secret)?;
    mac.update(signed_message(user_id, expires).as_bytes());
    mac.verify_slice(&provided_mac)
        .map_err(|_| TokenError::HmacMismatch)?;

    let expires_at = DateTime::<Utc>::from_timestamp(expires, 0)
        .ok_or_else(|| TokenError::InvalidExpiry(format!("{expires} out of range")))?;
    if expires_at <= now {
        return Err(TokenError::Expired);
    }

    Ok(TokenClaims {
        user_id,
        expires_at,
    })
}

fn signed_message(user_id: Uuid, expires: i64) -> String {
    format!("{user_id}:{expires}")
}

fn keyed_mac(key: &[u8]) -> Result<HmacSha256, TokenError> {
    if key.is_empty() {
        return Err(TokenError::MissingSecret);
    }
    HmacSha256::new_from_slice(key).map_err(|_| TokenError::MissingSecret)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> TokenConfig {
        TokenConfig::new(b"test-secret-key-for-coresync".to_vec())
    }

    fn fixed_user() -> Uuid {
        Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap()
    }

    fn issued() -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn generate_token_has_correct_format() {
        let token = generate_token_at(&test_config(), fixed_user(), issued()).unwrap();

        let rest = token.strip_prefix("cs_st_").expect("prefix");
        assert!(rest.starts_with(&fixed_user().to_string()));
        let (expires, hmac_hex) = rest[37..].split_once('_').unwrap();
        assert_eq!(expires, (1_700_000_000 + 12 * 3600).to_string());
        assert_eq!(hmac_hex.len(), 64, "HMAC-SHA256 hex should be 64 chars");
    }

    #[test]
    fn generate_and_validate_roundtrip() {
        let config = test_config();
        let token = generate_token_at(&config, fixed_user(), issued()).unwrap();

        let claims = validate_token_at(&config, &token, issued() + Duration::hours(1)).unwrap();
        assert_eq!(claims.user_id, fixed_user());
        assert_eq!(claims.expires_at, issued() + TOKEN_LIFETIME);
    }

    #[test]
    fn fresh_token_validates_against_wall_clock() {
        let config = test_config();
        let user = Uuid::new_v4();
        let token = generate_token(&config, user).unwrap();
        assert_eq!(validate_token(&config, &token).unwrap().user_id, user);
    }

    #[test]
    fn reject_expired_token() {
        let config = test_config();
        let token = generate_token_at(&config, fixed_user(), issued()).unwrap();

        let at_expiry = issued() + TOKEN_LIFETIME;
        assert!(matches!(
            validate_token_at(&config, &token, at_expiry),
            Err(TokenError::Expired)
        ));
        assert!(matches!(
            validate_token_at(&config, &token, at_expiry + Duration::days(3)),
            Err(TokenError::Expired)
        ));
    }

    #[test]
    fn reject_extended_expiry() {
        let config = test_config();
        let token = generate_token_at(&config, fixed_user(), issued()).unwrap();

        let original = (issued() + TOKEN_LIFETIME).timestamp().to_string();
        let extended = (issued() + Duration::days(30)).timestamp().to_string();
        let tampered = token.replacen(&original, &extended, 1);

        assert!(matches!(
            validate_token_at(&config, &tampered, issued()),
            Err(TokenError::HmacMismatch)
        ));
    }

    #[test]
    fn reject_tampered_hmac() {
        let config = test_config();
        let token = generate_token_at(&config, fixed_user(), issued()).unwrap();

        let mut tampered = token.clone();
        let last_char = tampered.pop().unwrap();
        tampered.push(if last_char == 'a' { 'b' } else { 'a' });

        assert!(matches!(
            validate_token_at(&config, &tampered, issued()),
            Err(TokenError::HmacMismatch)
        ));
    }

    #[test]
    fn reject_swapped_user_id() {
        let config = test_config();
        let token = generate_token_at(&config, fixed_user(), issued()).unwrap();

        let other = Uuid::parse_str("660e8400-e29b-41d4-a716-446655440000").unwrap();
        let tampered = token.replace(&fixed_user().to_string(), &other.to_string());

        assert!(validate_token_at(&config, &tampered, issued()).is_err());
    }

    #[test]
    fn reject_wrong_secret() {
        let token = generate_token_at(&test_config(), fixed_user(), issued()).unwrap();
        let wrong = TokenConfig::new(b"wrong-secret-key".to_vec());

        assert!(matches!(
            validate_token_at(&wrong, &token, issued()),
            Err(TokenError::HmacMismatch)
        ));
    }

    #[test]
    fn reject_malformed_tokens() {
        let config = test_config();
        let user = fixed_user();

        for bad in ["", "wrong_prefix_abc", "cs_st_short"] {
            assert!(
                matches!(validate_token_at(&config, bad, issued()), Err(TokenError::InvalidFormat(_))),
                "{bad:?} should be a format error"
            );
        }
        assert!(matches!(
            validate_token_at(&config, "cs_st_not-a-valid-uuid-at-all-noooooooo_1_ab", issued()),
            Err(TokenError::InvalidUserId(_))
        ));
        assert!(matches!(
            validate_token_at(&config, &format!("cs_st_{user}_soon_deadbeef"), issued()),
            Err(TokenError::InvalidExpiry(_))
        ));
        assert!(matches!(
            validate_token_at(&config, &format!("cs_st_{user}_1_zz-not-hex!"), issued()),
            Err(TokenError::InvalidFormat(_))
        ));
    }

    #[test]
    fn multibyte_input_does_not_panic() {
        let token = format!("cs_st_{}", "é".repeat(20));
        assert!(validate_token_at(&test_config(), &token, issued()).is_err());
    }

    #[test]
    fn empty_secret_is_rejected() {
        let config = TokenConfig::new(Vec::new());
        assert!(matches!(
            generate_token(&config, fixed_user()),
            Err(TokenError::MissingSecret)
        ));
    }

    #[test]
    fn config_from_hex() {
        let config = TokenConfig::from_hex("deadbeef").unwrap();
        assert_eq!(config.secret, vec![0xde, 0xad, 0xbe, 0xef]);

        assert!(matches!(TokenConfig::from_hex(""), Err(TokenError::MissingSecret)));
        assert!(matches!(
            TokenConfig::from_hex("not hex"),
            Err(TokenError::InvalidFormat(_))
        ));
    }
}
