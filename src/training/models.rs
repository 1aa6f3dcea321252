//! Classifier trait and model roster

use crate::error::Result;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use super::boosted_trees::{BoostedTreesClassifier, BoostedTreesConfig};
use super::gradient_boosting::{GbmClassifier, GbmConfig};
use super::knn::KnnClassifier;
use super::linear::LinearModel;
use super::logistic::LogisticRegression;
use super::naive_bayes::GaussianNaiveBayes;
use super::neural_network::{MlpClassifier, MlpConfig};
use super::random_forest::RandomForestClassifier;
use super::svm::SvmClassifier;

/// A binary classifier producing positive-class probabilities.
pub trait Classifier: Send {
    /// Fit the model to training data.
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()>;

    /// Predict positive-class probabilities in [0, 1].
    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>>;

    /// Per-feature importances, when the model exposes them.
    fn feature_importances(&self) -> Option<Array1<f64>> {
        None
    }
}

/// The fixed benchmark roster.
///
/// Adding a model means adding a variant here plus an arm in `name`,
/// `from_name`, and `build`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelKind {
    GradientBoosted,
    Logistic,
    RandomForest,
    NaiveBayes,
    Svm,
    Gbm,
    Linear,
    DeepLearning,
    PatternRecognition,
}

impl ModelKind {
    /// Roster in benchmark order; comparison ties resolve to this order.
    pub const ROSTER: [ModelKind; 9] = [
        ModelKind::GradientBoosted,
        ModelKind::Logistic,
        ModelKind::RandomForest,
        ModelKind::NaiveBayes,
        ModelKind::Svm,
        ModelKind::Gbm,
        ModelKind::Linear,
        ModelKind::DeepLearning,
        ModelKind::PatternRecognition,
    ];

    /// Stable identifier used in file names and reports.
    pub fn name(&self) -> &'static str {
        match self {
            ModelKind::GradientBoosted => "gradient_boosted",
            ModelKind::Logistic => "logistic",
            ModelKind::RandomForest => "random_forest",
            ModelKind::NaiveBayes => "naive_bayes",
            ModelKind::Svm => "svm",
            ModelKind::Gbm => "gbm",
            ModelKind::Linear => "linear",
            ModelKind::DeepLearning => "deep_learning",
            ModelKind::PatternRecognition => "pattern_recognition",
        }
    }

    /// Look up a roster entry by identifier.
    pub fn from_name(name: &str) -> Option<ModelKind> {
        Self::ROSTER.iter().copied().find(|k| k.name() == name)
    }

    /// Construct a fresh, unfitted instance.
    pub fn build(&self, seed: u64) -> Box<dyn Classifier> {
        match self {
            ModelKind::GradientBoosted => {
                Box::new(BoostedTreesClassifier::new(BoostedTreesConfig {
                    random_state: Some(seed),
                    ..Default::default()
                }))
            }
            ModelKind::Logistic => Box::new(LogisticRegression::new()),
            ModelKind::RandomForest => {
                Box::new(RandomForestClassifier::new(100).with_random_state(seed))
            }
            ModelKind::NaiveBayes => Box::new(GaussianNaiveBayes::new()),
            ModelKind::Svm => Box::new(SvmClassifier::new().with_random_state(seed)),
            ModelKind::Gbm => Box::new(GbmClassifier::new(GbmConfig {
                random_state: Some(seed),
                ..Default::default()
            })),
            ModelKind::Linear => Box::new(LinearModel::new()),
            ModelKind::DeepLearning => Box::new(MlpClassifier::new(MlpConfig {
                random_state: Some(seed),
                ..Default::default()
            })),
            ModelKind::PatternRecognition => Box::new(KnnClassifier::new(15)),
        }
    }
}

impl std::fmt::Display for ModelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
