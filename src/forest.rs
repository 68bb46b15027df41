//! Ensemble voting classifier: bootstrap-sampled Gini decision trees.
//!
//! Each tree casts a scam/safe vote; the reported probability is the vote
//! fraction across the ensemble. Training is seeded so a dataset always
//! produces the same model.

use crate::classifier::{ClassProbabilities, TextClassifier};
use crate::vectorizer::FeatureVector;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestOptions {
    pub n_trees: usize,
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub seed: u64,
}

impl Default for ForestOptions {
    fn default() -> Self {
        Self {
            n_trees: 200,
            max_depth: 50,
            min_samples_split: 5,
            min_samples_leaf: 2,
            seed: 42,
        }
    }
}

/// Tree nodes stored flat; child fields index into the same vector.
#[derive(Debug, Clone, Serialize, Deserialize)]
enum TreeNode {
    Leaf {
        scam: bool,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<TreeNode>,
}

impl DecisionTree {
    /// Walk the tree for one sample; returns the scam vote.
    fn predict(&self, features: &FeatureVector) -> bool {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                TreeNode::Leaf { scam } => return *scam,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if features.get(*feature) <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
    n_features: usize,
}

impl RandomForest {
    /// Train the ensemble on sparse sample vectors with boolean scam labels.
    pub fn train(
        samples: &[FeatureVector],
        labels: &[bool],
        n_features: usize,
        options: &ForestOptions,
    ) -> Self {
        let mut rng = StdRng::seed_from_u64(options.seed);
        let mut trees = Vec::with_capacity(options.n_trees);

        // sqrt(n) feature subsampling per split, as in the standard forest.
        let features_per_split = ((n_features as f64).sqrt().ceil() as usize)
            .clamp(1, n_features.max(1));

        for _ in 0..options.n_trees {
            let indices: Vec<usize> = if samples.is_empty() {
                Vec::new()
            } else {
                (0..samples.len())
                    .map(|_| rng.random_range(0..samples.len()))
                    .collect()
            };

            let mut builder = TreeBuilder {
                samples,
                labels,
                n_features,
                features_per_split,
                options,
                nodes: Vec::new(),
                rng: &mut rng,
            };
            builder.build(indices, 0);
            trees.push(DecisionTree {
                nodes: builder.nodes,
            });
        }

        log::debug!(
            "trained forest: {} trees over {} features",
            trees.len(),
            n_features
        );

        Self { trees, n_features }
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }
}

impl TextClassifier for RandomForest {
    fn classify(&self, features: &FeatureVector) -> ClassProbabilities {
        if self.trees.is_empty() {
            return ClassProbabilities::from_scam(0.5);
        }
        let scam_votes = self
            .trees
            .iter()
            .filter(|tree| tree.predict(features))
            .count();
        ClassProbabilities::from_scam(scam_votes as f64 / self.trees.len() as f64)
    }
}

struct TreeBuilder<'a> {
    samples: &'a [FeatureVector],
    labels: &'a [bool],
    n_features: usize,
    features_per_split: usize,
    options: &'a ForestOptions,
    nodes: Vec<TreeNode>,
    rng: &'a mut StdRng,
}

impl TreeBuilder<'_> {
    /// Grow one subtree over the given sample indices; returns its node index.
    fn build(&mut self, indices: Vec<usize>, depth: usize) -> usize {
        let scam_count = indices.iter().filter(|&&i| self.labels[i]).count();
        let total = indices.len();

        let stop = total == 0
            || scam_count == 0
            || scam_count == total
            || depth >= self.options.max_depth
            || total < self.options.min_samples_split;

        if stop {
            return self.push_leaf(scam_count, total);
        }

        let split = match self.best_split(&indices) {
            Some(split) => split,
            None => return self.push_leaf(scam_count, total),
        };

        let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
            .into_iter()
            .partition(|&i| self.samples[i].get(split.feature) <= split.threshold);

        // Reserve the split slot before recursing so children land after it.
        let node_index = self.nodes.len();
        self.nodes.push(TreeNode::Leaf { scam: false });
        let left = self.build(left_indices, depth + 1);
        let right = self.build(right_indices, depth + 1);
        self.nodes[node_index] = TreeNode::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        node_index
    }

    fn push_leaf(&mut self, scam_count: usize, total: usize) -> usize {
        let index = self.nodes.len();
        self.nodes.push(TreeNode::Leaf {
            scam: scam_count * 2 > total,
        });
        index
    }

    /// Best Gini split among a random feature subset, or None when no split
    /// satisfies the minimum leaf size.
    fn best_split(&mut self, indices: &[usize]) -> Option<SplitCandidate> {
        if self.n_features == 0 {
            return None;
        }
        let mut best: Option<(f64, SplitCandidate)> = None;
        let total = indices.len() as f64;

        let candidates =
            rand::seq::index::sample(&mut *self.rng, self.n_features, self.features_per_split);

        for feature in candidates {
            let mut values: Vec<(f64, bool)> = indices
                .iter()
                .map(|&i| (self.samples[i].get(feature), self.labels[i]))
                .collect();
            values.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

            let total_scam = values.iter().filter(|(_, scam)| *scam).count();

            let mut left_count = 0usize;
            let mut left_scam = 0usize;
            for i in 0..values.len() - 1 {
                left_count += 1;
                if values[i].1 {
                    left_scam += 1;
                }
                // Only between distinct values is a threshold meaningful.
                if values[i].0 == values[i + 1].0 {
                    continue;
                }
                let right_count = values.len() - left_count;
                if left_count < self.options.min_samples_leaf
                    || right_count < self.options.min_samples_leaf
                {
                    continue;
                }

                let right_scam = total_scam - left_scam;
                let weighted = (left_count as f64 / total) * gini(left_scam, left_count)
                    + (right_count as f64 / total) * gini(right_scam, right_count);

                let threshold = (values[i].0 + values[i + 1].0) / 2.0;
                match &best {
                    Some((best_impurity, _)) if weighted >= *best_impurity => {}
                    _ => {
                        best = Some((weighted, SplitCandidate { feature, threshold }));
                    }
                }
            }
        }

        best.map(|(_, split)| split)
    }
}

struct SplitCandidate {
    feature: usize,
    threshold: f64,
}

fn gini(scam: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let p = scam as f64 / total as f64;
    1.0 - p * p - (1.0 - p) * (1.0 - p)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vectorizer::FeatureVector;

    fn toy_dataset() -> (Vec<FeatureVector>, Vec<bool>) {
        // Feature 0 separates the classes cleanly.
        let mut samples = Vec::new();
        let mut labels = Vec::new();
        for i in 0..10 {
            samples.push(FeatureVector::from_entries(vec![(0, 0.9), (1, i as f64 * 0.01)]));
            labels.push(true);
            samples.push(FeatureVector::from_entries(vec![(0, 0.1), (2, i as f64 * 0.01)]));
            labels.push(false);
        }
        (samples, labels)
    }

    fn small_options() -> ForestOptions {
        ForestOptions {
            n_trees: 25,
            max_depth: 10,
            min_samples_split: 2,
            min_samples_leaf: 1,
            seed: 42,
        }
    }

    #[test]
    fn test_learns_separable_data() {
        let (samples, labels) = toy_dataset();
        let forest = RandomForest::train(&samples, &labels, 3, &small_options());

        let scam = forest.classify(&FeatureVector::from_entries(vec![(0, 0.95)]));
        let safe = forest.classify(&FeatureVector::from_entries(vec![(0, 0.05)]));
        assert!(scam.scam > 0.8, "scam side got {}", scam.scam);
        assert!(safe.scam < 0.2, "safe side got {}", safe.scam);
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let (samples, labels) = toy_dataset();
        let forest = RandomForest::train(&samples, &labels, 3, &small_options());
        let p = forest.classify(&FeatureVector::from_entries(vec![(0, 0.5)]));
        assert!((p.scam + p.safe - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_training_is_reproducible() {
        let (samples, labels) = toy_dataset();
        let a = RandomForest::train(&samples, &labels, 3, &small_options());
        let b = RandomForest::train(&samples, &labels, 3, &small_options());

        let probe = FeatureVector::from_entries(vec![(0, 0.4), (1, 0.02)]);
        assert_eq!(a.classify(&probe), b.classify(&probe));
    }

    #[test]
    fn test_empty_vector_still_classifies() {
        let (samples, labels) = toy_dataset();
        let forest = RandomForest::train(&samples, &labels, 3, &small_options());
        let p = forest.classify(&FeatureVector::default());
        assert!(p.scam >= 0.0 && p.scam <= 1.0);
    }

    #[test]
    fn test_serde_round_trip_preserves_votes() {
        let (samples, labels) = toy_dataset();
        let forest = RandomForest::train(&samples, &labels, 3, &small_options());
        let probe = FeatureVector::from_entries(vec![(0, 0.9)]);

        let json = serde_json::to_string(&forest).unwrap();
        let restored: RandomForest = serde_json::from_str(&json).unwrap();
        assert_eq!(forest.classify(&probe), restored.classify(&probe));
    }
}
