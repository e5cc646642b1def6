//! SELF-mode (server-to-server) authentication
//!
//! The Commerce API issues bearer tokens in exchange for a signature computed
//! locally from the application credentials:
//!
//! ```text
//! password           = "{client_id}_{timestamp_ms}"
//! hashed             = bcrypt(password, salt = client_secret)
//! client_secret_sign = base64_standard(hashed)
//! ```
//!
//! The client secret issued by the vendor is itself a bcrypt salt string
//! (`$2a$04$` followed by 22 salt characters). The timestamp must be captured
//! right before signing; the gateway rejects stale signatures.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD};
use base64::engine::DecodePaddingMode;
use base64::Engine as _;
use bcrypt::Version;
use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info};

use crate::providers::http_client::ApiSession;
use crate::providers::traits::{StoreError, StoreResult};

use super::models::TokenResponse;

/// `grant_type` form value
pub const GRANT_TYPE: &str = "client_credentials";
/// `type` form value for seller-owned applications
pub const AUTH_TYPE_SELF: &str = "SELF";
/// Token endpoint path
pub const TOKEN_PATH: &str = "/v1/oauth2/token";

/// Length of `$2a$NN$` plus the 22-character salt
const SALT_STRING_LEN: usize = 29;

/// bcrypt's own base64 dialect (`./A-Za-z0-9`, unpadded). The 22nd salt
/// character carries 4 unused bits which bcrypt ignores.
const BCRYPT_B64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::BCRYPT,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Signature fields for one token request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedSecret {
    /// Milliseconds since the Unix epoch, as sent on the wire
    pub timestamp: String,
    /// Base64 of the bcrypt hash
    pub client_secret_sign: String,
}

/// Form body of `POST /v1/oauth2/token`
#[derive(Debug, Clone, Serialize)]
pub struct TokenRequest {
    pub client_id: String,
    pub timestamp: String,
    pub client_secret_sign: String,
    pub grant_type: &'static str,
    #[serde(rename = "type")]
    pub auth_type: &'static str,
}

impl TokenRequest {
    /// Sign a fresh token request with the current time
    pub fn sign(client_id: &str, client_secret: &str) -> StoreResult<Self> {
        let signed = sign_client_secret(client_id, client_secret)?;
        Ok(Self::from_signed(client_id, signed))
    }

    pub fn from_signed(client_id: &str, signed: SignedSecret) -> Self {
        TokenRequest {
            client_id: client_id.to_string(),
            timestamp: signed.timestamp,
            client_secret_sign: signed.client_secret_sign,
            grant_type: GRANT_TYPE,
            auth_type: AUTH_TYPE_SELF,
        }
    }
}

/// Produce `(timestamp, client_secret_sign)` using the current clock.
pub fn sign_client_secret(client_id: &str, client_secret: &str) -> StoreResult<SignedSecret> {
    let timestamp = Utc::now().timestamp_millis();
    sign_client_secret_at(client_id, client_secret, timestamp)
}

/// Deterministic variant of [`sign_client_secret`] for a given timestamp.
pub fn sign_client_secret_at(
    client_id: &str,
    client_secret: &str,
    timestamp_ms: i64,
) -> StoreResult<SignedSecret> {
    if client_id.is_empty() {
        return Err(StoreError::config("client_id must not be empty"));
    }
    if client_secret.is_empty() {
        return Err(StoreError::config("client_secret must not be empty"));
    }

    let (version, cost, salt) = parse_salt(client_secret)?;
    let timestamp = timestamp_ms.to_string();
    let password = format!("{client_id}_{timestamp}");

    let hashed = bcrypt::hash_with_salt(password.as_bytes(), cost, salt)
        .map_err(|e| StoreError::config(format!("bcrypt hashing failed: {e}")))?
        .format_for_version(version);

    Ok(SignedSecret {
        timestamp,
        client_secret_sign: STANDARD.encode(hashed.as_bytes()),
    })
}

/// Split a `$2a$04$<22 chars>` salt string into version, cost and raw salt.
fn parse_salt(client_secret: &str) -> StoreResult<(Version, u32, [u8; 16])> {
    let invalid = || StoreError::config("client_secret is not a bcrypt salt string ($2a$NN$...)");

    let head = client_secret.get(..SALT_STRING_LEN).ok_or_else(invalid)?;
    let mut parts = head.splitn(4, '$');
    if parts.next() != Some("") {
        return Err(invalid());
    }

    let version = match parts.next() {
        Some("2a") => Version::TwoA,
        Some("2b") => Version::TwoB,
        Some("2x") => Version::TwoX,
        Some("2y") => Version::TwoY,
        _ => return Err(invalid()),
    };
    let cost: u32 = parts
        .next()
        .filter(|c| c.len() == 2)
        .and_then(|c| c.parse().ok())
        .ok_or_else(invalid)?;
    let encoded = parts.next().filter(|s| s.len() == 22).ok_or_else(invalid)?;

    let decoded = BCRYPT_B64.decode(encoded).map_err(|_| invalid())?;
    let salt: [u8; 16] = decoded
        .get(..16)
        .and_then(|s| s.try_into().ok())
        .ok_or_else(invalid)?;

    Ok((version, cost, salt))
}

/// Exchange a signed request for a bearer token.
///
/// Any status other than 2xx surfaces as `StoreError::Api` with the response
/// body unmodified.
pub async fn issue_token(session: &ApiSession, request: &TokenRequest) -> StoreResult<TokenResponse> {
    info!(
        client_id = %request.client_id,
        timestamp = %request.timestamp,
        "Requesting access token"
    );

    let token: TokenResponse = session.post_form(TOKEN_PATH, request).await?;
    debug!(expires_in = ?token.expires_in, "Access token issued");
    Ok(token)
}
