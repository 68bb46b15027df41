//! Trained model artifact: vocabulary, IDF weights and classifier parameters
//! bundled into one JSON file.
//!
//! A model is produced offline by the training pipeline, loaded once at
//! startup and read-only afterwards. Load failures are configuration errors,
//! reported before any message is analyzed.

use crate::forest::RandomForest;
use crate::vectorizer::TfidfVectorizer;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

pub const MODEL_FORMAT_VERSION: u32 = 1;

/// Why a model artifact could not be made available. Distinct from any
/// per-message condition: the engine never raises this after startup.
#[derive(Debug)]
pub enum ModelError {
    NotFound(String),
    Malformed(String),
    DimensionMismatch { vocabulary: usize, idf: usize },
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::NotFound(path) => write!(f, "model artifact not found: {path}"),
            ModelError::Malformed(detail) => write!(f, "model artifact malformed: {detail}"),
            ModelError::DimensionMismatch { vocabulary, idf } => write!(
                f,
                "model artifact inconsistent: vocabulary has {vocabulary} terms but {idf} IDF weights"
            ),
        }
    }
}

impl std::error::Error for ModelError {}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub trained_at: DateTime<Utc>,
    pub training_samples: usize,
    pub format_version: u32,
}

/// Immutable trained model. `Send + Sync` so one instance serves any number
/// of concurrent detection calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Model {
    pub vectorizer: TfidfVectorizer,
    pub forest: RandomForest,
    pub metadata: ModelMetadata,
}

impl Model {
    pub fn new(vectorizer: TfidfVectorizer, forest: RandomForest, training_samples: usize) -> Self {
        Self {
            vectorizer,
            forest,
            metadata: ModelMetadata {
                trained_at: Utc::now(),
                training_samples,
                format_version: MODEL_FORMAT_VERSION,
            },
        }
    }

    /// Load and validate a model artifact. Fails fast on a missing file,
    /// undeserializable content or internally inconsistent dimensions.
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        if !path.exists() {
            return Err(ModelError::NotFound(path.display().to_string()));
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| ModelError::Malformed(format!("{}: {e}", path.display())))?;
        let model: Model =
            serde_json::from_str(&content).map_err(|e| ModelError::Malformed(e.to_string()))?;
        model.validate()?;

        log::info!(
            "loaded model from {} ({} features, {} trees, trained {})",
            path.display(),
            model.vectorizer.dimension(),
            model.forest.n_trees(),
            model.metadata.trained_at.format("%Y-%m-%d %H:%M:%S UTC"),
        );
        Ok(model)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string(self)?;
        std::fs::write(path, json)?;
        log::info!("model saved to {}", path.display());
        Ok(())
    }

    fn validate(&self) -> Result<(), ModelError> {
        let vocabulary = self.vectorizer.dimension();
        let idf = self.vectorizer.idf_len();
        if vocabulary != idf {
            return Err(ModelError::DimensionMismatch { vocabulary, idf });
        }
        if self.forest.n_trees() == 0 {
            return Err(ModelError::Malformed("forest has no trees".to_string()));
        }
        if self.forest.n_features() != vocabulary {
            return Err(ModelError::DimensionMismatch {
                vocabulary,
                idf: self.forest.n_features(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forest::ForestOptions;
    use crate::vectorizer::{TfidfVectorizer, VectorizerOptions};

    fn tiny_model() -> Model {
        let docs = vec![
            "win a free prize now".to_string(),
            "meeting at noon tomorrow".to_string(),
            "claim your prize money".to_string(),
            "see you at lunch".to_string(),
        ];
        let labels = vec![true, false, true, false];
        let vectorizer = TfidfVectorizer::fit(&docs, &VectorizerOptions::default());
        let samples: Vec<_> = docs.iter().map(|d| vectorizer.transform(d)).collect();
        let forest = RandomForest::train(
            &samples,
            &labels,
            vectorizer.dimension(),
            &ForestOptions {
                n_trees: 5,
                min_samples_split: 2,
                min_samples_leaf: 1,
                ..ForestOptions::default()
            },
        );
        Model::new(vectorizer, forest, docs.len())
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let model = tiny_model();
        let dir = std::env::temp_dir().join("scamguard-model-test");
        let path = dir.join("model.json");
        model.save(&path).unwrap();

        let loaded = Model::load(&path).unwrap();
        assert_eq!(loaded.vectorizer.dimension(), model.vectorizer.dimension());
        assert_eq!(loaded.forest.n_trees(), model.forest.n_trees());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_missing_is_not_found() {
        let err = Model::load(Path::new("/nonexistent/scamguard/model.json")).unwrap_err();
        assert!(matches!(err, ModelError::NotFound(_)));
    }

    #[test]
    fn test_load_garbage_is_malformed() {
        let dir = std::env::temp_dir().join("scamguard-model-garbage-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("model.json");
        std::fs::write(&path, "{ not a model }").unwrap();

        let err = Model::load(&path).unwrap_err();
        assert!(matches!(err, ModelError::Malformed(_)));

        std::fs::remove_dir_all(&dir).ok();
    }
}
