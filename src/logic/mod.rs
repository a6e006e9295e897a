//! Logic Module - Prediction Pipeline
//!
//! The full path a request travels: `validate` → `preprocess` → `features` →
//! `model` → `risk`, coordinated by `service`.

pub mod features;
pub mod model;
pub mod preprocess;
pub mod risk;
pub mod service;
pub mod types;
pub mod validate;

// Re-export the surface most callers need
pub use service::{PredictionService, ServiceError, ServiceState, ServiceStatus};
pub use types::{
    BatchItemResult, BatchOutcome, ContentType, PredictionRequest, PredictionResult, RawRequest,
    RiskLevel, Verdict,
};
