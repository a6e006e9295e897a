//! Prediction Service - Pipeline Coordinator
//!
//! Orchestrates validate → normalize/extract → classify → interpret →
//! assemble for single and batch requests. The service is an explicitly
//! constructed context object: the process entry point builds it, loads the
//! models once, and threads it through - there is no ambient singleton.
//!
//! Load state machine: Unloaded → Loading → Ready, or Unloaded → Loading →
//! Failed. Failed is terminal; the service then refuses every request with a
//! service-unavailable error instead of retrying. A partially loaded pair
//! (email ok, url failed) is Failed, never half-running.

use std::path::Path;

use serde::Serialize;

use crate::logic::features::{text, url};
use crate::logic::model::{
    Classifier, ModelHandle, ModelLoadError, OnnxClassifier, PredictionError,
};
use crate::logic::preprocess;
use crate::logic::risk::risk_level;
use crate::logic::types::{
    BatchItemResult, BatchOutcome, ContentType, PredictionRequest, PredictionResult, RawRequest,
};
use crate::logic::validate::{validate, validate_batch_size, ValidationError};

// ============================================================================
// SERVICE STATE
// ============================================================================

/// Lifecycle state of the backing classifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ServiceState {
    Unloaded,
    Loading,
    Ready,
    Failed,
}

// ============================================================================
// SERVICE ERROR
// ============================================================================

/// Umbrella error for the coordinator
#[derive(Debug)]
pub enum ServiceError {
    /// Malformed input; message is user-facing
    Validation(ValidationError),
    /// Classifiers not loaded (or load failed); service-unavailable condition
    NotReady,
    /// Unexpected failure inside extraction or classification
    Prediction(PredictionError),
}

impl ServiceError {
    /// Message safe to hand to the caller. Validation reasons pass through
    /// verbatim; internal failures collapse to a generic message (the detail
    /// goes to the log, not the caller).
    pub fn public_message(&self) -> String {
        match self {
            ServiceError::Validation(e) => e.to_string(),
            ServiceError::NotReady => "Prediction service unavailable".to_string(),
            ServiceError::Prediction(_) => "Prediction failed".to_string(),
        }
    }
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceError::Validation(e) => write!(f, "{}", e),
            ServiceError::NotReady => write!(f, "prediction service not ready"),
            ServiceError::Prediction(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ServiceError {}

impl From<ValidationError> for ServiceError {
    fn from(e: ValidationError) -> Self {
        ServiceError::Validation(e)
    }
}

impl From<PredictionError> for ServiceError {
    fn from(e: PredictionError) -> Self {
        ServiceError::Prediction(e)
    }
}

// ============================================================================
// STATUS
// ============================================================================

/// Snapshot of the service and its loaded models
#[derive(Debug, Clone, Serialize)]
pub struct ServiceStatus {
    pub state: ServiceState,
    pub failure: Option<String>,
    pub email_model: Option<ModelHandle>,
    pub url_model: Option<ModelHandle>,
}

// ============================================================================
// PREDICTION SERVICE
// ============================================================================

/// Coordinator owning one classifier per content type
pub struct PredictionService {
    state: ServiceState,
    failure: Option<String>,
    email: Option<Box<dyn Classifier>>,
    url: Option<Box<dyn Classifier>>,
}

impl PredictionService {
    /// New service with nothing loaded; refuses requests until `load_models`
    pub fn new() -> Self {
        Self {
            state: ServiceState::Unloaded,
            failure: None,
            email: None,
            url: None,
        }
    }

    /// Build a ready service from pre-constructed classifiers.
    /// Useful for embedding and for tests with stub classifiers.
    pub fn from_classifiers(email: Box<dyn Classifier>, url: Box<dyn Classifier>) -> Self {
        Self {
            state: ServiceState::Ready,
            failure: None,
            email: Some(email),
            url: Some(url),
        }
    }

    /// Load both classifiers from `models_dir`. One-time blocking startup
    /// step; on any failure the service transitions to Failed and stays
    /// there - it never serves with a partially loaded pair.
    pub fn load_models(&mut self, models_dir: &Path) -> Result<(), ModelLoadError> {
        self.state = ServiceState::Loading;

        let email = match OnnxClassifier::load(ContentType::Email, models_dir) {
            Ok(c) => c,
            Err(e) => return self.fail_load(e),
        };
        let url = match OnnxClassifier::load(ContentType::Url, models_dir) {
            Ok(c) => c,
            Err(e) => return self.fail_load(e),
        };

        self.email = Some(Box::new(email));
        self.url = Some(Box::new(url));
        self.state = ServiceState::Ready;
        log::info!("All models loaded successfully");
        Ok(())
    }

    fn fail_load(&mut self, e: ModelLoadError) -> Result<(), ModelLoadError> {
        log::error!("Model load failed: {}", e);
        self.state = ServiceState::Failed;
        self.failure = Some(e.to_string());
        self.email = None;
        self.url = None;
        Err(e)
    }

    pub fn state(&self) -> ServiceState {
        self.state
    }

    /// Snapshot for status reporting
    pub fn status(&self) -> ServiceStatus {
        ServiceStatus {
            state: self.state,
            failure: self.failure.clone(),
            email_model: self.email.as_ref().map(|c| c.handle().clone()),
            url_model: self.url.as_ref().map(|c| c.handle().clone()),
        }
    }

    /// Classify a single request: validate, preprocess, classify, interpret
    pub fn predict_one(&self, raw: &RawRequest) -> Result<PredictionResult, ServiceError> {
        let request = validate(raw)?;
        self.predict_validated(&request)
    }

    /// Classify up to `MAX_BATCH_SIZE` requests with per-item failure
    /// isolation: one bad item yields a Failure entry at its index and never
    /// blocks the rest. Result order matches input order.
    pub fn predict_batch(&self, items: &[RawRequest]) -> Result<BatchOutcome, ServiceError> {
        validate_batch_size(items.len())?;
        if self.state != ServiceState::Ready {
            return Err(ServiceError::NotReady);
        }

        let mut results = Vec::with_capacity(items.len());
        let mut succeeded = 0usize;

        for (index, item) in items.iter().enumerate() {
            match self.predict_one(item) {
                Ok(result) => {
                    succeeded += 1;
                    results.push(BatchItemResult::ok(index, result));
                }
                Err(e) => {
                    if let ServiceError::Prediction(ref inner) = e {
                        log::error!("batch item {} failed: {}", index, inner);
                    }
                    results.push(BatchItemResult::err(index, e.public_message()));
                }
            }
        }

        Ok(BatchOutcome {
            total: items.len(),
            succeeded,
            results,
        })
    }

    fn predict_validated(&self, request: &PredictionRequest) -> Result<PredictionResult, ServiceError> {
        let classifier = self.classifier_for(request.content_type)?;

        let features = match request.content_type {
            ContentType::Email => {
                let normalized = preprocess::normalize_email(&request.text);
                text::vectorize(&normalized, classifier.handle().expected_features)
            }
            ContentType::Url => {
                // The URL model saw validated URL text as-is at training time;
                // prefixing a scheme here would shift the length and "//" signals
                url::extract(&request.text, classifier.handle().expected_features)
            }
        };

        let raw = classifier.predict(&features)?;

        let verdict = classifier.labels().verdict_for(raw.raw_label).ok_or_else(|| {
            ServiceError::Prediction(PredictionError(format!(
                "model produced unmapped label {}",
                raw.raw_label
            )))
        })?;

        let confidence = round4(raw.confidence);
        let risk = risk_level(verdict, confidence);

        log::debug!(
            "{} prediction: raw={} verdict={} confidence={:.4} risk={:?}",
            request.content_type,
            raw.raw_label,
            verdict,
            confidence,
            risk
        );

        Ok(PredictionResult {
            prediction: verdict,
            confidence,
            risk_level: risk,
            content_type: request.content_type,
            raw_label: raw.raw_label,
        })
    }

    fn classifier_for(&self, content_type: ContentType) -> Result<&dyn Classifier, ServiceError> {
        if self.state != ServiceState::Ready {
            return Err(ServiceError::NotReady);
        }
        let slot = match content_type {
            ContentType::Email => &self.email,
            ContentType::Url => &self.url,
        };
        slot.as_deref().ok_or(ServiceError::NotReady)
    }
}

impl Default for PredictionService {
    fn default() -> Self {
        Self::new()
    }
}

/// Round to 4 decimals for the wire contract
fn round4(value: f32) -> f32 {
    (value * 10_000.0).round() / 10_000.0
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::model::{LabelMapping, RawPrediction};
    use crate::logic::types::{RiskLevel, Verdict};

    /// Stub classifier returning a fixed probability distribution
    struct StubClassifier {
        handle: ModelHandle,
        labels: LabelMapping,
        probabilities: Vec<f32>,
        fail: bool,
        expect_features: Option<Vec<f32>>,
    }

    impl StubClassifier {
        fn new(expected_features: usize, probabilities: Vec<f32>) -> Self {
            Self {
                handle: ModelHandle {
                    loaded: true,
                    expected_features,
                    model_path: "stub".to_string(),
                    sha256: None,
                    loaded_at: chrono::Utc::now(),
                },
                labels: LabelMapping::for_tests(vec![
                    (0, Verdict::Safe),
                    (1, Verdict::Phishing),
                ]),
                probabilities,
                fail: false,
                expect_features: None,
            }
        }

        fn failing(expected_features: usize) -> Self {
            let mut stub = Self::new(expected_features, vec![]);
            stub.fail = true;
            stub
        }

        /// Stub that also asserts on the exact feature vector it receives
        fn expecting(features: Vec<f32>, probabilities: Vec<f32>) -> Self {
            let mut stub = Self::new(features.len(), probabilities);
            stub.expect_features = Some(features);
            stub
        }
    }

    impl Classifier for StubClassifier {
        fn handle(&self) -> &ModelHandle {
            &self.handle
        }

        fn labels(&self) -> &LabelMapping {
            &self.labels
        }

        fn predict(&self, features: &[f32]) -> Result<RawPrediction, PredictionError> {
            assert_eq!(features.len(), self.handle.expected_features);
            if let Some(expected) = &self.expect_features {
                assert_eq!(features, expected.as_slice());
            }
            if self.fail {
                return Err(PredictionError("stub backend exploded".to_string()));
            }
            RawPrediction::from_probabilities(self.probabilities.clone())
        }
    }

    fn ready_service(email_probs: Vec<f32>, url_probs: Vec<f32>) -> PredictionService {
        PredictionService::from_classifiers(
            Box::new(StubClassifier::new(64, email_probs)),
            Box::new(StubClassifier::new(30, url_probs)),
        )
    }

    #[test]
    fn test_unloaded_service_refuses_requests() {
        let service = PredictionService::new();
        let err = service
            .predict_one(&RawRequest::new("hello there friend", "email"))
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotReady));
        assert_eq!(err.public_message(), "Prediction service unavailable");
    }

    #[test]
    fn test_phishing_email_high_risk() {
        let service = ready_service(vec![0.1, 0.9], vec![0.5, 0.5]);
        let result = service
            .predict_one(&RawRequest::new("verify your account immediately", "email"))
            .unwrap();
        assert_eq!(result.prediction, Verdict::Phishing);
        assert_eq!(result.risk_level, RiskLevel::High);
        assert_eq!(result.raw_label, 1);
        assert_eq!(result.content_type, ContentType::Email);
    }

    #[test]
    fn test_safe_verdict_is_low_risk_at_any_confidence() {
        for safe_prob in [0.51, 0.7, 0.95, 1.0] {
            let service = ready_service(vec![safe_prob, 1.0 - safe_prob], vec![0.5, 0.5]);
            let result = service
                .predict_one(&RawRequest::new("regular newsletter content here", "email"))
                .unwrap();
            assert_eq!(result.prediction, Verdict::Safe);
            assert_eq!(result.risk_level, RiskLevel::Low);
        }
    }

    #[test]
    fn test_medium_risk_band() {
        let service = ready_service(vec![0.3, 0.7], vec![0.5, 0.5]);
        let result = service
            .predict_one(&RawRequest::new("click here to win", "email"))
            .unwrap();
        assert_eq!(result.prediction, Verdict::Phishing);
        assert_eq!(result.risk_level, RiskLevel::Medium);
    }

    #[test]
    fn test_url_request_routes_to_url_classifier() {
        let service = ready_service(vec![0.9, 0.1], vec![0.05, 0.95]);
        let result = service
            .predict_one(&RawRequest::new("http://bit.ly/3xYz", "url"))
            .unwrap();
        assert_eq!(result.content_type, ContentType::Url);
        assert_eq!(result.prediction, Verdict::Phishing);
        assert!((result.confidence - 0.95).abs() < 1e-6);
    }

    #[test]
    fn test_url_features_come_from_validated_text_unmodified() {
        // "example.com//after" has one "//"; prefixing a scheme would add a
        // second and flip the double-slash signal (and grow the length input)
        let service = PredictionService::from_classifiers(
            Box::new(StubClassifier::new(64, vec![0.9, 0.1])),
            Box::new(StubClassifier::expecting(
                vec![-1.0, -1.0, -1.0, -1.0, -1.0, -1.0, -1.0],
                vec![0.9, 0.1],
            )),
        );

        let result = service
            .predict_one(&RawRequest::new("example.com//after", "url"))
            .unwrap();
        assert_eq!(result.prediction, Verdict::Safe);
    }

    #[test]
    fn test_confidence_rounded_to_four_decimals() {
        let service = ready_service(vec![0.123_456_78, 0.876_543_22], vec![0.5, 0.5]);
        let result = service
            .predict_one(&RawRequest::new("some email body text", "email"))
            .unwrap();
        assert_eq!(result.confidence, 0.8765);
    }

    #[test]
    fn test_validation_error_reaches_caller_verbatim() {
        let service = ready_service(vec![0.5, 0.5], vec![0.5, 0.5]);
        let err = service.predict_one(&RawRequest::new("hi", "email")).unwrap_err();
        assert!(err.public_message().contains("too short"));
    }

    #[test]
    fn test_batch_partial_failure_isolation() {
        let service = ready_service(vec![0.2, 0.8], vec![0.5, 0.5]);
        let items = vec![
            RawRequest::new("ok valid text here", "email"),
            RawRequest::new("x", "bogus"),
            RawRequest::new("another fine email body", "email"),
        ];

        let outcome = service.predict_batch(&items).unwrap();
        assert_eq!(outcome.total, 3);
        assert_eq!(outcome.succeeded, 2);
        assert_eq!(outcome.results.len(), 3);

        assert!(outcome.results[0].success);
        assert!(!outcome.results[1].success);
        assert_eq!(outcome.results[1].index, 1);
        assert!(outcome.results[2].success);

        for (i, item) in outcome.results.iter().enumerate() {
            assert_eq!(item.index, i);
        }
    }

    #[test]
    fn test_batch_internal_error_is_generic_and_isolated() {
        let service = PredictionService::from_classifiers(
            Box::new(StubClassifier::failing(64)),
            Box::new(StubClassifier::new(30, vec![0.9, 0.1])),
        );
        let items = vec![
            RawRequest::new("email body that will hit the failing stub", "email"),
            RawRequest::new("http://example.com", "url"),
        ];

        let outcome = service.predict_batch(&items).unwrap();
        assert!(!outcome.results[0].success);
        // Internal detail never leaks to the caller
        assert_eq!(outcome.results[0].error.as_deref(), Some("Prediction failed"));
        assert!(outcome.results[1].success);
        assert_eq!(outcome.succeeded, 1);
    }

    #[test]
    fn test_empty_batch_rejected_wholesale() {
        let service = ready_service(vec![0.5, 0.5], vec![0.5, 0.5]);
        let err = service.predict_batch(&[]).unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Validation(ValidationError::EmptyBatch)
        ));
    }

    #[test]
    fn test_oversized_batch_rejected_wholesale() {
        let service = ready_service(vec![0.5, 0.5], vec![0.5, 0.5]);
        let items: Vec<RawRequest> = (0..51)
            .map(|i| RawRequest::new(format!("batch item number {}", i), "email"))
            .collect();

        let err = service.predict_batch(&items).unwrap_err();
        assert!(err.public_message().contains("Batch size cannot exceed"));
    }

    #[test]
    fn test_batch_on_unloaded_service_unavailable() {
        let service = PredictionService::new();
        let items = vec![RawRequest::new("valid enough text", "email")];
        let err = service.predict_batch(&items).unwrap_err();
        assert!(matches!(err, ServiceError::NotReady));
    }

    #[test]
    fn test_status_snapshot() {
        let service = ready_service(vec![0.5, 0.5], vec![0.5, 0.5]);
        let status = service.status();
        assert_eq!(status.state, ServiceState::Ready);
        assert!(status.failure.is_none());
        assert_eq!(status.email_model.unwrap().expected_features, 64);
        assert_eq!(status.url_model.unwrap().expected_features, 30);
    }

    #[test]
    fn test_load_failure_is_terminal() {
        let dir = tempfile::tempdir().unwrap();
        let mut service = PredictionService::new();

        assert!(service.load_models(dir.path()).is_err());
        assert_eq!(service.state(), ServiceState::Failed);
        assert!(service.status().failure.is_some());

        let err = service
            .predict_one(&RawRequest::new("some valid text", "email"))
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotReady));
    }
}
