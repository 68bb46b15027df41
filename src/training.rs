//! Offline training pipeline: dataset loading, stratified splitting,
//! vocabulary fitting, ensemble training and held-out evaluation.

use crate::forest::{ForestOptions, RandomForest};
use crate::model::Model;
use crate::preprocess::preprocess;
use crate::vectorizer::{TfidfVectorizer, VectorizerOptions};
use anyhow::{bail, Context};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One labeled training record; label 1 means scam.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabeledMessage {
    pub message: String,
    pub label: u8,
}

impl LabeledMessage {
    pub fn new(message: &str, label: u8) -> Self {
        Self {
            message: message.to_string(),
            label,
        }
    }

    pub fn is_scam(&self) -> bool {
        self.label != 0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingOptions {
    /// Fraction of each class held out for evaluation.
    pub test_size: f64,
    pub seed: u64,
    pub vectorizer: VectorizerOptions,
    pub forest: ForestOptions,
}

impl Default for TrainingOptions {
    fn default() -> Self {
        Self {
            test_size: 0.2,
            seed: 42,
            vectorizer: VectorizerOptions::default(),
            forest: ForestOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TrainingMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub train_samples: usize,
    pub test_samples: usize,
}

/// Load a JSON dataset: an array of `{"message": ..., "label": 0|1}`.
pub fn load_dataset(path: &Path) -> anyhow::Result<Vec<LabeledMessage>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read dataset {}", path.display()))?;
    let dataset: Vec<LabeledMessage> = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse dataset {}", path.display()))?;
    log::info!("dataset loaded: {} samples", dataset.len());
    Ok(dataset)
}

pub fn save_dataset(dataset: &[LabeledMessage], path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, serde_json::to_string_pretty(dataset)?)?;
    log::info!("sample dataset written to {}", path.display());
    Ok(())
}

/// Train a model on the dataset, holding out a stratified test split for
/// evaluation. Seeded: the same dataset and options produce the same model.
pub fn train(
    dataset: &[LabeledMessage],
    options: &TrainingOptions,
) -> anyhow::Result<(Model, TrainingMetrics)> {
    if dataset.is_empty() {
        bail!("training dataset is empty");
    }
    let scam_total = dataset.iter().filter(|s| s.is_scam()).count();
    if scam_total == 0 || scam_total == dataset.len() {
        bail!("training dataset needs both scam and safe samples");
    }
    if !(0.0..1.0).contains(&options.test_size) {
        bail!("test_size must be in [0, 1), got {}", options.test_size);
    }

    let (train_indices, test_indices) = stratified_split(dataset, options.test_size, options.seed);
    log::info!(
        "training samples: {}, test samples: {}",
        train_indices.len(),
        test_indices.len()
    );

    let train_texts: Vec<String> = train_indices
        .iter()
        .map(|&i| preprocess(&dataset[i].message))
        .collect();
    let train_labels: Vec<bool> = train_indices.iter().map(|&i| dataset[i].is_scam()).collect();

    let vectorizer = TfidfVectorizer::fit(&train_texts, &options.vectorizer);
    let train_vectors: Vec<_> = train_texts.iter().map(|t| vectorizer.transform(t)).collect();

    let forest = RandomForest::train(
        &train_vectors,
        &train_labels,
        vectorizer.dimension(),
        &options.forest,
    );

    let metrics = evaluate(&vectorizer, &forest, dataset, &train_indices, &test_indices);
    log::info!("model performance:");
    log::info!("  accuracy:  {:.4}", metrics.accuracy);
    log::info!("  precision: {:.4}", metrics.precision);
    log::info!("  recall:    {:.4}", metrics.recall);
    log::info!("  f1-score:  {:.4}", metrics.f1_score);

    let model = Model::new(vectorizer, forest, train_indices.len());
    Ok((model, metrics))
}

/// Per-class shuffled split so scam/safe proportions survive in both halves.
fn stratified_split(
    dataset: &[LabeledMessage],
    test_size: f64,
    seed: u64,
) -> (Vec<usize>, Vec<usize>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::new();
    let mut test = Vec::new();

    for class in [false, true] {
        let mut indices: Vec<usize> = (0..dataset.len())
            .filter(|&i| dataset[i].is_scam() == class)
            .collect();
        indices.shuffle(&mut rng);

        let mut held_out = (indices.len() as f64 * test_size).round() as usize;
        // Never hold out a whole class.
        if held_out >= indices.len() {
            held_out = indices.len().saturating_sub(1);
        }
        test.extend(indices.drain(..held_out));
        train.extend(indices);
    }

    train.sort_unstable();
    test.sort_unstable();
    (train, test)
}

fn evaluate(
    vectorizer: &TfidfVectorizer,
    forest: &RandomForest,
    dataset: &[LabeledMessage],
    train_indices: &[usize],
    test_indices: &[usize],
) -> TrainingMetrics {
    use crate::classifier::TextClassifier;

    let mut tp = 0usize;
    let mut fp = 0usize;
    let mut tn = 0usize;
    let mut fn_ = 0usize;

    for &i in test_indices {
        let features = vectorizer.transform(&preprocess(&dataset[i].message));
        let predicted_scam = forest.classify(&features).scam >= 0.5;
        match (predicted_scam, dataset[i].is_scam()) {
            (true, true) => tp += 1,
            (true, false) => fp += 1,
            (false, false) => tn += 1,
            (false, true) => fn_ += 1,
        }
    }

    let total = test_indices.len();
    let ratio = |num: usize, denom: usize| if denom == 0 { 0.0 } else { num as f64 / denom as f64 };

    let accuracy = ratio(tp + tn, total);
    let precision = ratio(tp, tp + fp);
    let recall = ratio(tp, tp + fn_);
    let f1_score = if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    };

    TrainingMetrics {
        accuracy,
        precision,
        recall,
        f1_score,
        train_samples: train_indices.len(),
        test_samples: total,
    }
}

/// Built-in labeled examples for bootstrapping a model without external
/// data. English plus code-mixed Tamil, mirroring real chat traffic.
pub fn sample_dataset() -> Vec<LabeledMessage> {
    vec![
        LabeledMessage::new(
            "Congratulations! You've won $5000 in our lottery. Click here to claim your prize.",
            1,
        ),
        LabeledMessage::new("Hi, how are you today?", 0),
        LabeledMessage::new(
            "URGENT: Your bank account has been suspended. Verify your details immediately.",
            1,
        ),
        LabeledMessage::new("Let's meet tomorrow for coffee", 0),
        LabeledMessage::new(
            "You are eligible for a free cash transfer. Update your bank account details here.",
            1,
        ),
        LabeledMessage::new(
            "Working from home? Earn $500 daily! NO EXPERIENCE NEEDED. Limited offer!",
            1,
        ),
        LabeledMessage::new("What time is the meeting?", 0),
        LabeledMessage::new(
            "Your Amazon account has expired. Click verify account to reactivate.",
            1,
        ),
        LabeledMessage::new("Thanks for the birthday wishes!", 0),
        LabeledMessage::new("FREE iPhone 15! Claim yours now. Limited stock. Act fast!", 1),
        LabeledMessage::new("Can you send me the document?", 0),
        LabeledMessage::new("Investment opportunity: Guaranteed 50% returns. Invest now!", 1),
        LabeledMessage::new("Have you seen the new movie?", 0),
        LabeledMessage::new(
            "ALERT: Unauthorized login detected. Confirm your password immediately.",
            1,
        ),
        LabeledMessage::new("See you at the office tomorrow", 0),
        LabeledMessage::new("You've been selected for our exclusive program. Apply now!", 1),
        LabeledMessage::new("How's your family doing?", 0),
        LabeledMessage::new("Be your own boss! MLM opportunity. Earn unlimited commissions!", 1),
        LabeledMessage::new("Let me know your availability", 0),
        LabeledMessage::new("Processing fee pending. Pay $50 to receive $50000 transfer.", 1),
        LabeledMessage::new(
            "Selected for winning lottery! Prize amount 5 lakhs! Contact immediately!",
            1,
        ),
        LabeledMessage::new("Your account verified and confirmed ok", 0),
        LabeledMessage::new("Panam jeyikum! Vetkalam invest pannu. 100% guarantee.", 1),
        LabeledMessage::new("Enaku solla irukku, yarkai message pannuven", 0),
        LabeledMessage::new("Congratulations selected for job! Advance fee required.", 1),
        LabeledMessage::new("Ok will send the files soon", 0),
    ]
}
