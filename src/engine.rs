//! Detection engine: runs the text and URL pipelines and fuses both into a
//! single verdict with confidence and ordered reasons.

use crate::classifier::{ClassProbabilities, TextClassifier};
use crate::config::{DetectionConfig, FusionConfig};
use crate::model::Model;
use crate::preprocess::preprocess;
use crate::url_extractor::UrlExtractor;
use crate::url_scorer::{UrlAnalysis, UrlScorer};
use crate::vectorizer::TfidfVectorizer;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    #[serde(rename = "SCAM")]
    Scam,
    #[serde(rename = "SAFE")]
    Safe,
}

/// Final analysis for one message. Field order matches the serialized
/// boundary contract consumed by API/CLI layers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionResult {
    pub is_scam: bool,
    pub confidence: f64,
    pub verdict: Verdict,
    pub text_scam_probability: f64,
    pub text_safe_probability: f64,
    pub urls_found: usize,
    pub has_suspicious_urls: bool,
    pub max_url_suspicion_score: u32,
    pub url_analyses: Vec<UrlAnalysis>,
    pub reasons: Vec<String>,
}

/// Fuse text classification with URL risk into a verdict.
///
/// The weighted score is `text_weight * p_scam + url_weight * max_risk`,
/// SCAM at or above the threshold. Any single suspicious URL overrides the
/// verdict to SCAM regardless of the weighted score.
pub fn decide(
    probabilities: ClassProbabilities,
    url_analyses: Vec<UrlAnalysis>,
    fusion: &FusionConfig,
) -> DetectionResult {
    let max_url_suspicion_score = url_analyses
        .iter()
        .map(|a| a.suspicion_score)
        .max()
        .unwrap_or(0);
    let url_risk = max_url_suspicion_score as f64 / 100.0;

    let final_score =
        probabilities.scam * fusion.text_weight + url_risk * fusion.url_weight;

    let has_suspicious_urls = url_analyses.iter().any(|a| a.is_suspicious);

    let mut verdict = if final_score >= fusion.scam_threshold {
        Verdict::Scam
    } else {
        Verdict::Safe
    };
    if has_suspicious_urls {
        verdict = Verdict::Scam;
    }

    let confidence = match verdict {
        Verdict::Scam => final_score,
        Verdict::Safe => 1.0 - final_score,
    }
    .clamp(0.0, 1.0);

    let mut reasons = Vec::new();
    if probabilities.scam >= 0.5 {
        reasons.push(format!(
            "High scam probability in text ({:.2}%)",
            probabilities.scam * 100.0
        ));
    }
    for analysis in url_analyses.iter().filter(|a| a.is_suspicious) {
        reasons.push(format!(
            "Suspicious URL: {} ({})",
            analysis.url,
            analysis.reasons.join(", ")
        ));
    }
    if has_suspicious_urls {
        reasons.push("Contains suspicious URLs".to_string());
    }
    if reasons.is_empty() && verdict == Verdict::Safe {
        reasons.push("Message appears safe".to_string());
    }

    DetectionResult {
        is_scam: verdict == Verdict::Scam,
        confidence,
        verdict,
        text_scam_probability: probabilities.scam,
        text_safe_probability: probabilities.safe,
        urls_found: url_analyses.len(),
        has_suspicious_urls,
        max_url_suspicion_score,
        url_analyses,
        reasons,
    }
}

/// The complete detection pipeline over one loaded model. Immutable and
/// `Send + Sync`; any number of threads may call `analyze` concurrently.
pub struct ScamDetector {
    vectorizer: TfidfVectorizer,
    classifier: Box<dyn TextClassifier>,
    extractor: UrlExtractor,
    scorer: UrlScorer,
    fusion: FusionConfig,
}

impl ScamDetector {
    pub fn from_model(model: Model, config: DetectionConfig) -> Self {
        Self {
            vectorizer: model.vectorizer,
            classifier: Box::new(model.forest),
            extractor: UrlExtractor::new(),
            scorer: UrlScorer::new(config.url_rules),
            fusion: config.fusion,
        }
    }

    /// Assemble a detector around any classifier implementation. Used by
    /// tests to drive the pipeline with deterministic probabilities.
    pub fn with_classifier(
        vectorizer: TfidfVectorizer,
        classifier: Box<dyn TextClassifier>,
        config: DetectionConfig,
    ) -> Self {
        Self {
            vectorizer,
            classifier,
            extractor: UrlExtractor::new(),
            scorer: UrlScorer::new(config.url_rules),
            fusion: config.fusion,
        }
    }

    /// Analyze one message: classify the normalized text, score every
    /// extracted URL, fuse both into the final result.
    pub fn analyze(&self, message: &str) -> DetectionResult {
        let normalized = preprocess(message);
        let features = self.vectorizer.transform(&normalized);
        let probabilities = self.classifier.classify(&features);

        let candidates = self.extractor.extract(message);
        let url_analyses: Vec<UrlAnalysis> = candidates
            .iter()
            .map(|candidate| self.scorer.score(&candidate.url))
            .collect();

        let result = decide(probabilities, url_analyses, &self.fusion);
        log::debug!(
            "analyzed message ({} urls): verdict {:?}, confidence {:.3}",
            result.urls_found,
            result.verdict,
            result.confidence
        );
        result
    }

    /// Analyze messages in order; output index i corresponds to input
    /// index i. Messages are independent, so one odd message never affects
    /// its siblings.
    pub fn analyze_batch<S: AsRef<str>>(&self, messages: &[S]) -> Vec<DetectionResult> {
        messages.iter().map(|m| self.analyze(m.as_ref())).collect()
    }

    /// URL-only mode: score a bare URL string without running the text
    /// classifier.
    pub fn analyze_url(&self, url: &str) -> UrlAnalysis {
        self.scorer.score(url)
    }
}
