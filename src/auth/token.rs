//! Bearer token issuing and verification
//!
//! Tokens are compact HMAC-SHA256 signed documents
//! (`base64url(header).base64url(claims).base64url(signature)`) carrying a
//! single namespace claim `{"n": namespace}`. The signing secret is
//! process-wide configuration.

use crate::error::{Result, ZoneError};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD as B64};
use ring::hmac;
use serde::Deserialize;

const HEADER: &[u8] = br#"{"alg":"HS256","typ":"JWT"}"#;

#[derive(Debug, Deserialize)]
struct Header {
    alg: String,
}

#[derive(Debug, Deserialize)]
struct Claims {
    n: String,
}

/// Issues and verifies namespace-scoped bearer tokens
pub struct TokenSigner {
    key: hmac::Key,
}

impl TokenSigner {
    pub fn new(secret: &str) -> Self {
        Self {
            key: hmac::Key::new(hmac::HMAC_SHA256, secret.as_bytes()),
        }
    }

    /// Issue a token carrying the namespace claim
    pub fn issue(&self, namespace: &str) -> String {
        let header = B64.encode(HEADER);
        let payload = B64.encode(serde_json::json!({ "n": namespace }).to_string());
        let signing_input = format!("{}.{}", header, payload);
        let tag = hmac::sign(&self.key, signing_input.as_bytes());
        format!("{}.{}", signing_input, B64.encode(tag.as_ref()))
    }

    /// Verify a token and extract its namespace claim
    pub fn verify(&self, token: &str) -> Result<String> {
        let mut parts = token.split('.');
        let (header_b64, payload_b64, sig_b64) =
            match (parts.next(), parts.next(), parts.next(), parts.next()) {
                (Some(h), Some(p), Some(s), None) => (h, p, s),
                _ => return Err(ZoneError::Auth("malformed token".to_string())),
            };

        let header = B64
            .decode(header_b64)
            .map_err(|_| ZoneError::Auth("malformed token header".to_string()))?;
        let header: Header = serde_json::from_slice(&header)
            .map_err(|_| ZoneError::Auth("malformed token header".to_string()))?;
        if header.alg != "HS256" {
            return Err(ZoneError::Auth(format!(
                "unsupported token algorithm: {}",
                header.alg
            )));
        }

        let sig = B64
            .decode(sig_b64)
            .map_err(|_| ZoneError::Auth("malformed token signature".to_string()))?;
        let signing_input = format!("{}.{}", header_b64, payload_b64);
        hmac::verify(&self.key, signing_input.as_bytes(), &sig)
            .map_err(|_| ZoneError::Auth("token signature verification failed".to_string()))?;

        let payload = B64
            .decode(payload_b64)
            .map_err(|_| ZoneError::Auth("malformed token payload".to_string()))?;
        let claims: Claims = serde_json::from_slice(&payload)
            .map_err(|_| ZoneError::Auth("missing namespace claim".to_string()))?;

        Ok(claims.n)
    }
}
