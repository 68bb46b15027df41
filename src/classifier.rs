//! Classifier seam between the feature pipeline and the decision fuser.

use crate::vectorizer::FeatureVector;
use serde::{Deserialize, Serialize};

/// Class probabilities for one message. Scam and safe always sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassProbabilities {
    pub scam: f64,
    pub safe: f64,
}

impl ClassProbabilities {
    pub fn from_scam(scam: f64) -> Self {
        let scam = scam.clamp(0.0, 1.0);
        Self {
            scam,
            safe: 1.0 - scam,
        }
    }
}

/// A trained model's classification capability: feature vector in, class
/// probabilities out. Implementations must be pure and thread-safe so one
/// loaded model can serve concurrent requests.
pub trait TextClassifier: Send + Sync {
    fn classify(&self, features: &FeatureVector) -> ClassProbabilities;
}

/// Deterministic classifier returning fixed probabilities. Lets the decision
/// fuser and engine plumbing be exercised without a trained ensemble.
#[derive(Debug, Clone, Copy)]
pub struct FixedClassifier {
    probabilities: ClassProbabilities,
}

impl FixedClassifier {
    pub fn new(scam_probability: f64) -> Self {
        Self {
            probabilities: ClassProbabilities::from_scam(scam_probability),
        }
    }
}

impl TextClassifier for FixedClassifier {
    fn classify(&self, _features: &FeatureVector) -> ClassProbabilities {
        self.probabilities
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probabilities_sum_to_one() {
        let p = ClassProbabilities::from_scam(0.73);
        assert!((p.scam + p.safe - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_from_scam_clamps() {
        assert_eq!(ClassProbabilities::from_scam(1.7).scam, 1.0);
        assert_eq!(ClassProbabilities::from_scam(-0.3).scam, 0.0);
    }

    #[test]
    fn test_fixed_classifier_ignores_features() {
        let c = FixedClassifier::new(0.9);
        let p = c.classify(&FeatureVector::default());
        assert_eq!(p.scam, 0.9);
    }
}
