//! Signed upload URLs.
//!
//! `/presign` hands out a short-lived URL the browser can `PUT` an image to
//! without holding the shared secret. The signature binds the object key, the
//! content type and the expiry:
//!
//! ```text
//! signature = hex(sha256(secret "\n" key "\n" content_type "\n" expires))
//! url       = {base}/upload/{key}?expires={unix_secs}&signature={signature}
//! ```

use std::time::Duration;

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use thiserror::Error;
use uuid::Uuid;

use crate::config::Secret;

/// Content types accepted for upload, with the key extension for each.
pub const ALLOWED_CONTENT_TYPES: &[(&str, &str)] = &[("image/png", "png"), ("image/jpeg", "jpg")];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SigningError {
    #[error("unsupported content type {0:?}")]
    UnsupportedContentType(String),
    #[error("upload signing key is not configured")]
    MissingKey,
    #[error("upload URL is missing expires or signature")]
    Incomplete,
    #[error("upload URL expired")]
    Expired,
    #[error("upload signature does not match")]
    BadSignature,
}

/// Key extension for an allowed content type.
pub fn extension_for(content_type: &str) -> Option<&'static str> {
    ALLOWED_CONTENT_TYPES
        .iter()
        .find(|(ct, _)| *ct == content_type)
        .map(|(_, ext)| *ext)
}

/// `uploads/YYYY-MM-DD/<uuid>.<ext>`, dated in UTC.
pub fn new_upload_key(content_type: &str, now: DateTime<Utc>) -> Result<String, SigningError> {
    let ext = extension_for(content_type)
        .ok_or_else(|| SigningError::UnsupportedContentType(content_type.to_string()))?;
    Ok(format!(
        "uploads/{}/{}.{}",
        now.format("%Y-%m-%d"),
        Uuid::new_v4(),
        ext
    ))
}

/// Byte comparison whose running time does not depend on where inputs differ.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// A freshly issued upload slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedUpload {
    pub key: String,
    pub url: String,
    pub content_type: String,
    pub expires_at: i64,
    pub expires_in: Duration,
}

#[derive(Debug, Clone)]
pub struct UploadSigner {
    secret: Secret,
    public_base_url: String,
    ttl: Duration,
}

impl UploadSigner {
    pub fn new(secret: Secret, public_base_url: impl Into<String>, ttl: Duration) -> Self {
        Self {
            secret,
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
            ttl,
        }
    }

    pub fn signature(&self, key: &str, content_type: &str, expires_at: i64) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.secret.expose().as_bytes());
        hasher.update(b"\n");
        hasher.update(key.as_bytes());
        hasher.update(b"\n");
        hasher.update(content_type.as_bytes());
        hasher.update(b"\n");
        hasher.update(expires_at.to_string().as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Allocate a new key and sign an upload URL for it.
    pub fn issue(&self, content_type: &str, now: DateTime<Utc>) -> Result<SignedUpload, SigningError> {
        let key = new_upload_key(content_type, now)?;
        if self.secret.is_empty() {
            return Err(SigningError::MissingKey);
        }

        let expires_at = now.timestamp() + self.ttl.as_secs() as i64;
        let signature = self.signature(&key, content_type, expires_at);
        let url = format!(
            "{}/upload/{}?expires={}&signature={}",
            self.public_base_url, key, expires_at, signature
        );

        Ok(SignedUpload {
            key,
            url,
            content_type: content_type.to_string(),
            expires_at,
            expires_in: self.ttl,
        })
    }

    /// Check an incoming upload against its URL parameters.
    pub fn verify(
        &self,
        key: &str,
        content_type: &str,
        expires: Option<&str>,
        signature: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<(), SigningError> {
        let (Some(expires), Some(signature)) = (expires, signature) else {
            return Err(SigningError::Incomplete);
        };
        let expires_at: i64 = expires.parse().map_err(|_| SigningError::Incomplete)?;
        if extension_for(content_type).is_none() {
            return Err(SigningError::UnsupportedContentType(content_type.to_string()));
        }

        let expected = self.signature(key, content_type, expires_at);
        if !constant_time_eq(expected.as_bytes(), signature.to_ascii_lowercase().as_bytes()) {
            return Err(SigningError::BadSignature);
        }
        if now.timestamp() > expires_at {
            return Err(SigningError::Expired);
        }
        Ok(())
    }
}
