//! Service configuration, read once at startup from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use triage_engine::TriageConfig;

pub const DEFAULT_HF_BASE_URL: &str = "https://router.huggingface.co/hf-inference/models";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value {value:?} for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
    #[error(transparent)]
    Triage(#[from] triage_engine::ConfigError),
}

/// String that never shows up in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Secret(***)")
    }
}

/// Inference endpoint for the emotion classifier.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    pub base_url: String,
    pub model: String,
    pub token: Secret,
    /// Single request timeout; there are no retries.
    pub timeout: Duration,
}

impl ClassifierConfig {
    /// `{base_url}/{model}`
    pub fn endpoint(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.model.trim()
        )
    }
}

/// Top-level service configuration.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub bind_addr: SocketAddr,
    /// Prefix for signed upload URLs handed to clients
    pub public_base_url: String,
    /// Root directory of the object store
    pub upload_dir: PathBuf,
    /// Required `x-shared-secret` for analyze; also signs upload URLs
    pub shared_secret: Secret,
    pub classifier: ClassifierConfig,
    pub presign_ttl: Duration,
    pub max_upload_bytes: usize,
    pub triage: TriageConfig,
}

impl ServiceConfig {
    /// Build from process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let bind_addr: SocketAddr = parse_or(&get, "TRIAGE_BIND_ADDR", "0.0.0.0:8080".parse().ok())?;
        let public_base_url = get("TRIAGE_PUBLIC_BASE_URL")
            .unwrap_or_else(|| "http://localhost:8080".to_string())
            .trim_end_matches('/')
            .to_string();
        let upload_dir = get("UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./uploads-store"));

        let shared_secret = Secret::new(required("SHARED_SECRET")?);

        let classifier = ClassifierConfig {
            base_url: get("HF_BASE_URL").unwrap_or_else(|| DEFAULT_HF_BASE_URL.to_string()),
            model: required("HF_MODEL")?.trim().to_string(),
            token: Secret::new(get("HF_TOKEN").unwrap_or_default()),
            timeout: Duration::from_secs(parse_or(&get, "HF_TIMEOUT_SECS", Some(30))?),
        };

        let presign_ttl = Duration::from_secs(parse_or(&get, "PRESIGN_TTL_SECS", Some(300))?);
        let max_upload_bytes: usize = parse_or(&get, "MAX_UPLOAD_BYTES", Some(10 * 1024 * 1024))?;
        let threshold: f64 = parse_or(
            &get,
            "TRIAGE_CONFIDENCE_THRESHOLD",
            Some(triage_engine::DEFAULT_CONFIDENCE_THRESHOLD),
        )?;

        Ok(Self {
            bind_addr,
            public_base_url,
            upload_dir,
            shared_secret,
            classifier,
            presign_ttl,
            max_upload_bytes,
            triage: TriageConfig::with_threshold(threshold)?,
        })
    }
}

fn parse_or<T, G>(get: &G, key: &'static str, default: Option<T>) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            value: raw.clone(),
            reason: e.to_string(),
        }),
        None => default.ok_or(ConfigError::Missing(key)),
    }
}
