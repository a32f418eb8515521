//! Triage API
//!
//! HTTP service around [`triage_engine`]:
//! - `POST /presign` issues a signed, short-lived upload URL for an image
//! - `PUT /upload/*key` stores an image sent to such a URL
//! - `POST /analyze` classifies a stored image and triages it with the
//!   caller's free-text context
//! - `GET /health` reports liveness and the classifier model id
//!
//! Storage and the emotion classifier sit behind traits ([`ObjectStore`],
//! [`EmotionClassifier`]) so the routes can be exercised without network
//! access.

pub mod classifier;
pub mod config;
pub mod contracts;
pub mod error;
pub mod presign;
pub mod server;
pub mod storage;

pub use classifier::{ClassifierError, EmotionClassifier, HfClassifier};
pub use config::{ClassifierConfig, ConfigError, Secret, ServiceConfig};
pub use error::{ApiError, ApiResult};
pub use presign::{SignedUpload, SigningError, UploadSigner};
pub use server::{router, AppState, SECRET_HEADER};
pub use storage::{FsObjectStore, MemoryObjectStore, ObjectMeta, ObjectStore, StorageError};
