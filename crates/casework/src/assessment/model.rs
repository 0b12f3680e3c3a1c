//! The outcome predictor: a deterministic, retrainable logistic-regression
//! classifier over standardized feature vectors.
//!
//! Training always builds a complete replacement model; `ModelStore::publish`
//! swaps it in as a single assignment so concurrent readers observe either
//! the fully-old or fully-new parameters, never a mix.

use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{FeatureVector, OutcomeRecord, FEATURE_VECTOR_LEN};

const EPOCHS: usize = 400;
const LEARNING_RATE: f64 = 0.5;

/// Inference or training failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    #[error("no trained model is available yet")]
    NotTrained,
    #[error("training data must include both successful and unsuccessful outcomes")]
    InsufficientData,
}

/// Frozen model parameters. Immutable once trained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainedModel {
    weights: Vec<f64>,
    bias: f64,
    means: Vec<f64>,
    scales: Vec<f64>,
    trained_on: usize,
    trained_at: DateTime<Utc>,
}

impl TrainedModel {
    /// Predicted success probability, strictly inside `[0, 1]`.
    pub fn predict(&self, vector: &FeatureVector) -> f64 {
        let mut activation = self.bias;
        for (slot, value) in vector.as_slice().iter().enumerate() {
            let standardized = (value - self.means[slot]) / self.scales[slot];
            activation += self.weights[slot] * standardized;
        }
        sigmoid(activation)
    }

    pub fn summary(&self) -> ModelSummary {
        ModelSummary {
            trained_on: self.trained_on,
            trained_at: self.trained_at,
            feature_len: self.weights.len(),
        }
    }

    /// Serialize the parameters as an opaque blob for the storage collaborator.
    pub fn to_bytes(&self) -> Result<Vec<u8>, StorageError> {
        serde_json::to_vec(self).map_err(|err| StorageError::Corrupt(err.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StorageError> {
        serde_json::from_slice(bytes).map_err(|err| StorageError::Corrupt(err.to_string()))
    }
}

/// Metadata exposed to callers without revealing model internals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSummary {
    pub trained_on: usize,
    pub trained_at: DateTime<Utc>,
    pub feature_len: usize,
}

/// Train a replacement model from the accumulated outcome records.
///
/// Requires at least one record of each label; gradient descent runs from a
/// zero initialization for a fixed number of epochs, so identical inputs
/// always produce identical parameters.
pub fn train(records: &[OutcomeRecord]) -> Result<TrainedModel, ModelError> {
    let successes = records.iter().filter(|record| record.success).count();
    if successes == 0 || successes == records.len() {
        return Err(ModelError::InsufficientData);
    }

    let rows: Vec<[f64; FEATURE_VECTOR_LEN]> = records
        .iter()
        .map(|record| {
            let mut row = [0.0; FEATURE_VECTOR_LEN];
            row.copy_from_slice(record.vector().as_slice());
            row
        })
        .collect();
    let labels: Vec<f64> = records
        .iter()
        .map(|record| if record.success { 1.0 } else { 0.0 })
        .collect();

    let (means, scales) = standardization(&rows);
    let standardized: Vec<[f64; FEATURE_VECTOR_LEN]> = rows
        .iter()
        .map(|row| {
            let mut out = [0.0; FEATURE_VECTOR_LEN];
            for slot in 0..FEATURE_VECTOR_LEN {
                out[slot] = (row[slot] - means[slot]) / scales[slot];
            }
            out
        })
        .collect();

    let count = standardized.len() as f64;
    let mut weights = vec![0.0; FEATURE_VECTOR_LEN];
    let mut bias = 0.0;

    for _ in 0..EPOCHS {
        let mut weight_grads = vec![0.0; FEATURE_VECTOR_LEN];
        let mut bias_grad = 0.0;

        for (row, label) in standardized.iter().zip(&labels) {
            let mut activation = bias;
            for slot in 0..FEATURE_VECTOR_LEN {
                activation += weights[slot] * row[slot];
            }
            let residual = sigmoid(activation) - label;
            bias_grad += residual;
            for slot in 0..FEATURE_VECTOR_LEN {
                weight_grads[slot] += residual * row[slot];
            }
        }

        bias -= LEARNING_RATE * bias_grad / count;
        for slot in 0..FEATURE_VECTOR_LEN {
            weights[slot] -= LEARNING_RATE * weight_grads[slot] / count;
        }
    }

    Ok(TrainedModel {
        weights,
        bias,
        means,
        scales,
        trained_on: records.len(),
        trained_at: Utc::now(),
    })
}

fn standardization(rows: &[[f64; FEATURE_VECTOR_LEN]]) -> (Vec<f64>, Vec<f64>) {
    let count = rows.len() as f64;
    let mut means = vec![0.0; FEATURE_VECTOR_LEN];
    for row in rows {
        for slot in 0..FEATURE_VECTOR_LEN {
            means[slot] += row[slot];
        }
    }
    for mean in &mut means {
        *mean /= count;
    }

    let mut scales = vec![0.0; FEATURE_VECTOR_LEN];
    for row in rows {
        for slot in 0..FEATURE_VECTOR_LEN {
            let centered = row[slot] - means[slot];
            scales[slot] += centered * centered;
        }
    }
    for scale in &mut scales {
        let deviation = (*scale / count).sqrt();
        // Constant columns carry no signal; a unit scale keeps them inert.
        *scale = if deviation < 1e-9 { 1.0 } else { deviation };
    }

    (means, scales)
}

fn sigmoid(activation: f64) -> f64 {
    1.0 / (1.0 + (-activation).exp())
}

/// Anything that can score a feature vector. The ranker depends on this seam
/// rather than on a concrete model so tests can pin scores.
pub trait SuccessPredictor {
    fn predict(&self, vector: &FeatureVector) -> Result<f64, ModelError>;
}

impl SuccessPredictor for TrainedModel {
    fn predict(&self, vector: &FeatureVector) -> Result<f64, ModelError> {
        Ok(TrainedModel::predict(self, vector))
    }
}

/// Process-wide owner of the current model.
///
/// Readers take a cheap `Arc` snapshot; `publish` replaces the whole model
/// under a short write lock, which is the single indivisible assignment the
/// retrain flow relies on.
#[derive(Debug, Default)]
pub struct ModelStore {
    current: RwLock<Option<Arc<TrainedModel>>>,
}

impl ModelStore {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_model(model: TrainedModel) -> Self {
        Self {
            current: RwLock::new(Some(Arc::new(model))),
        }
    }

    pub fn is_trained(&self) -> bool {
        self.current.read().expect("model lock poisoned").is_some()
    }

    /// The current model, or `NotTrained` before the first publish.
    pub fn snapshot(&self) -> Result<Arc<TrainedModel>, ModelError> {
        self.current
            .read()
            .expect("model lock poisoned")
            .clone()
            .ok_or(ModelError::NotTrained)
    }

    /// Atomically replace the current model.
    pub fn publish(&self, model: TrainedModel) -> Arc<TrainedModel> {
        let model = Arc::new(model);
        *self.current.write().expect("model lock poisoned") = Some(model.clone());
        model
    }

    pub fn summary(&self) -> Option<ModelSummary> {
        self.current
            .read()
            .expect("model lock poisoned")
            .as_ref()
            .map(|model| model.summary())
    }
}

impl SuccessPredictor for ModelStore {
    fn predict(&self, vector: &FeatureVector) -> Result<f64, ModelError> {
        Ok(self.snapshot()?.predict(vector))
    }
}

/// Injected persistence collaborator for the serialized parameter blob.
pub trait ModelStorage: Send + Sync {
    fn load(&self) -> Result<Option<Vec<u8>>, StorageError>;
    fn save(&self, blob: &[u8]) -> Result<(), StorageError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("model storage unavailable: {0}")]
    Unavailable(String),
    #[error("stored model blob is corrupt: {0}")]
    Corrupt(String),
}
