use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::cleaner::{self, ValidationError};
use super::domain::{OutcomeRecord, RawClientRecord};
use super::enumerate::CombinationEnumerator;
use super::model::{self, ModelError, ModelStorage, ModelStore, ModelSummary, StorageError, TrainedModel};
use super::ranker::{self, RankingError, RecommendationReport};
use super::InvalidConfigError;

/// Facade wiring the cleaner, enumerator, predictor, and ranker together for
/// the recommendation flow, and the trainer plus storage for the retrain flow.
pub struct AssessmentService<S> {
    store: Arc<ModelStore>,
    storage: Arc<S>,
}

/// Parameters of one recommendation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationRequest {
    pub client: RawClientRecord,
    #[serde(default)]
    pub max_simultaneous: Option<usize>,
    #[serde(default)]
    pub top_k: Option<usize>,
}

impl<S: ModelStorage> AssessmentService<S> {
    pub fn new(store: Arc<ModelStore>, storage: Arc<S>) -> Self {
        Self { store, storage }
    }

    pub fn model_store(&self) -> &Arc<ModelStore> {
        &self.store
    }

    /// Publish a previously persisted model, if one exists.
    pub fn load_persisted_model(&self) -> Result<bool, AssessmentError> {
        match self.storage.load()? {
            Some(blob) => {
                let model = TrainedModel::from_bytes(&blob)?;
                let summary = model.summary();
                self.store.publish(model);
                info!(trained_on = summary.trained_on, "restored persisted model");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Clean, enumerate, score, and rank for a single client.
    pub fn recommend(
        &self,
        request: &RecommendationRequest,
    ) -> Result<RecommendationReport, AssessmentError> {
        let features = cleaner::clean(&request.client)?;
        let enumerator = CombinationEnumerator::all_interventions(request.max_simultaneous)?;
        let report = ranker::rank(
            self.store.as_ref(),
            &features,
            enumerator.iter(),
            request.top_k,
        )?;
        Ok(report)
    }

    /// Train a full replacement model, persist it, then publish it atomically.
    ///
    /// Persisting first means a crash between the two steps leaves the
    /// running process on the old model and the disk on the new one; the next
    /// boot converges on the new model.
    pub fn retrain(&self, records: &[OutcomeRecord]) -> Result<ModelSummary, AssessmentError> {
        let trained = model::train(records)?;
        let summary = trained.summary();
        self.storage.save(&trained.to_bytes()?)?;
        self.store.publish(trained);
        info!(trained_on = summary.trained_on, "published retrained model");
        Ok(summary)
    }

    pub fn model_summary(&self) -> Option<ModelSummary> {
        self.store.summary()
    }
}

/// Error raised by the assessment facade.
#[derive(Debug, thiserror::Error)]
pub enum AssessmentError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Config(#[from] InvalidConfigError),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<RankingError> for AssessmentError {
    fn from(value: RankingError) -> Self {
        match value {
            RankingError::Config(err) => Self::Config(err),
            RankingError::Model(err) => Self::Model(err),
        }
    }
}
