//! Phishing Detection - Core Prediction Service
//!
//! Classifies a piece of text - an email body or a URL - as Phishing or Safe,
//! with a confidence score and a derived risk tier, using two independently
//! trained binary classifiers loaded once at startup.
//!
//! ```no_run
//! use phishing_core::logic::{PredictionService, RawRequest};
//!
//! let mut service = PredictionService::new();
//! service.load_models(std::path::Path::new("models/saved_models"))?;
//!
//! let result = service.predict_one(&RawRequest::new(
//!     "Urgent! Verify your account now",
//!     "email",
//! ))?;
//! println!("{} ({:?})", result.prediction, result.risk_level);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod constants;
pub mod logic;
