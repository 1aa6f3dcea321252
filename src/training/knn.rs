//! K-nearest-neighbors classifier

use crate::error::{BiobeatError, Result};
use crate::training::models::Classifier;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Brute-force KNN; the probability is the positive fraction among the k
/// nearest training rows by Euclidean distance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnnClassifier {
    pub n_neighbors: usize,
    x_train: Option<Array2<f64>>,
    y_train: Option<Array1<f64>>,
}

impl KnnClassifier {
    pub fn new(n_neighbors: usize) -> Self {
        Self {
            n_neighbors: n_neighbors.max(1),
            x_train: None,
            y_train: None,
        }
    }
}

impl Classifier for KnnClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        if x.nrows() != y.len() {
            return Err(BiobeatError::ShapeError {
                expected: format!("{} labels", x.nrows()),
                actual: format!("{}", y.len()),
            });
        }
        if x.nrows() == 0 {
            return Err(BiobeatError::TrainingError(
                "cannot fit KNN on zero samples".to_string(),
            ));
        }

        self.x_train = Some(x.clone());
        self.y_train = Some(y.clone());
        Ok(())
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let (x_train, y_train) = match (&self.x_train, &self.y_train) {
            (Some(xt), Some(yt)) => (xt, yt),
            _ => return Err(BiobeatError::ModelNotFitted),
        };

        let k = self.n_neighbors.min(x_train.nrows());
        let mut proba = Array1::zeros(x.nrows());

        for (i, row) in x.rows().into_iter().enumerate() {
            let mut dists: Vec<(f64, f64)> = x_train
                .rows()
                .into_iter()
                .zip(y_train.iter())
                .map(|(train_row, &label)| {
                    let d = row
                        .iter()
                        .zip(train_row.iter())
                        .map(|(a, b)| (a - b) * (a - b))
                        .sum::<f64>();
                    (d, label)
                })
                .collect();

            dists.select_nth_unstable_by(k - 1, |a, b| a.0.total_cmp(&b.0));
            let positives = dists[..k].iter().filter(|(_, l)| *l > 0.5).count();
            proba[i] = positives as f64 / k as f64;
        }

        Ok(proba)
    }
}
