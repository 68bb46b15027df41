//! TF-IDF feature extraction over word n-grams.
//!
//! The vocabulary and IDF table are fitted once at training time and become
//! part of the model artifact; at inference the vectorizer is read-only.

use crate::preprocess::tokenize;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Words excluded from unigram features. Multi-word n-grams keep function
/// words since scam phrasing ("you have won") is discriminative.
pub const DEFAULT_STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "been", "but", "by", "can",
    "did", "do", "does", "for", "from", "had", "has", "have", "he", "her",
    "him", "his", "how", "i", "if", "in", "is", "it", "its", "me", "my",
    "no", "not", "of", "on", "or", "our", "she", "so", "that", "the",
    "their", "them", "then", "there", "they", "this", "to", "was", "we",
    "were", "what", "when", "which", "who", "will", "with", "would", "you",
    "your",
];

/// Sparse feature vector: (feature index, weight) pairs sorted by index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureVector {
    entries: Vec<(usize, f64)>,
}

impl FeatureVector {
    pub fn from_entries(mut entries: Vec<(usize, f64)>) -> Self {
        entries.sort_by_key(|&(index, _)| index);
        Self { entries }
    }

    pub fn entries(&self) -> &[(usize, f64)] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Weight at a feature index; absent entries are zero.
    pub fn get(&self, index: usize) -> f64 {
        match self.entries.binary_search_by_key(&index, |&(i, _)| i) {
            Ok(pos) => self.entries[pos].1,
            Err(_) => 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorizerOptions {
    pub max_features: usize,
    pub ngram_min: usize,
    pub ngram_max: usize,
    /// Terms appearing in more than this fraction of documents are dropped.
    pub max_df: f64,
    pub stop_words: Vec<String>,
}

impl Default for VectorizerOptions {
    fn default() -> Self {
        Self {
            max_features: 5000,
            ngram_min: 1,
            ngram_max: 3,
            max_df: 0.95,
            stop_words: DEFAULT_STOP_WORDS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Fitted TF-IDF vectorizer. Immutable after `fit`; serialized inside the
/// model artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
    ngram_min: usize,
    ngram_max: usize,
    stop_words: Vec<String>,
}

impl TfidfVectorizer {
    /// Fit vocabulary and IDF weights on normalized training documents.
    pub fn fit(documents: &[String], options: &VectorizerOptions) -> Self {
        let stop_words: HashSet<&str> =
            options.stop_words.iter().map(|s| s.as_str()).collect();

        // Document frequency and corpus-wide term count per n-gram.
        let mut doc_freq: HashMap<String, usize> = HashMap::new();
        let mut term_count: HashMap<String, usize> = HashMap::new();

        for doc in documents {
            let mut seen: HashSet<&str> = HashSet::new();
            let grams = extract_ngrams(doc, options.ngram_min, options.ngram_max, &stop_words);
            for gram in &grams {
                *term_count.entry(gram.clone()).or_insert(0) += 1;
            }
            for gram in &grams {
                if seen.insert(gram) {
                    *doc_freq.entry(gram.clone()).or_insert(0) += 1;
                }
            }
        }

        let n_docs = documents.len();
        let max_doc_count = (options.max_df * n_docs as f64).floor() as usize;

        let mut candidates: Vec<(String, usize)> = term_count
            .into_iter()
            .filter(|(term, _)| {
                let df = doc_freq.get(term).copied().unwrap_or(0);
                // min_df is 1 by construction; apply only the max_df cut.
                n_docs <= 1 || df <= max_doc_count.max(1)
            })
            .collect();

        // Keep the most frequent terms up to max_features; alphabetical
        // tie-break keeps fitting deterministic across runs.
        candidates.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        candidates.truncate(options.max_features);

        let mut terms: Vec<String> = candidates.into_iter().map(|(t, _)| t).collect();
        terms.sort();

        let mut vocabulary = HashMap::with_capacity(terms.len());
        let mut idf = Vec::with_capacity(terms.len());
        for (index, term) in terms.into_iter().enumerate() {
            let df = doc_freq.get(&term).copied().unwrap_or(0);
            // Smoothed IDF: ln((1 + n) / (1 + df)) + 1.
            idf.push(((1.0 + n_docs as f64) / (1.0 + df as f64)).ln() + 1.0);
            vocabulary.insert(term, index);
        }

        log::debug!(
            "fitted vocabulary: {} terms from {} documents",
            vocabulary.len(),
            n_docs
        );

        Self {
            vocabulary,
            idf,
            ngram_min: options.ngram_min,
            ngram_max: options.ngram_max,
            stop_words: options.stop_words.clone(),
        }
    }

    /// Map normalized text to a sparse L2-normalized TF-IDF vector.
    /// Out-of-vocabulary n-grams silently drop weight.
    pub fn transform(&self, normalized_text: &str) -> FeatureVector {
        let stop_words: HashSet<&str> =
            self.stop_words.iter().map(|s| s.as_str()).collect();
        let grams = extract_ngrams(normalized_text, self.ngram_min, self.ngram_max, &stop_words);

        let mut tf: HashMap<usize, f64> = HashMap::new();
        for gram in grams {
            if let Some(&index) = self.vocabulary.get(&gram) {
                *tf.entry(index).or_insert(0.0) += 1.0;
            }
        }

        let mut entries: Vec<(usize, f64)> = tf
            .into_iter()
            .map(|(index, count)| (index, count * self.idf[index]))
            .collect();

        let norm: f64 = entries.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            for entry in &mut entries {
                entry.1 /= norm;
            }
        }

        FeatureVector::from_entries(entries)
    }

    /// Number of features (vocabulary size).
    pub fn dimension(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn idf_len(&self) -> usize {
        self.idf.len()
    }
}

/// Build the n-gram stream for one normalized document. Stop words are
/// filtered from unigrams only.
fn extract_ngrams(
    normalized: &str,
    ngram_min: usize,
    ngram_max: usize,
    stop_words: &HashSet<&str>,
) -> Vec<String> {
    let tokens = tokenize(normalized);
    let mut grams = Vec::new();

    for n in ngram_min..=ngram_max {
        if n == 0 || tokens.len() < n {
            continue;
        }
        for window in tokens.windows(n) {
            if n == 1 && stop_words.contains(window[0]) {
                continue;
            }
            grams.push(window.join(" "));
        }
    }

    grams
}
