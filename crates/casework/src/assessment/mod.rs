//! The intervention-outcome recommendation engine.
//!
//! The pipeline is cleaner -> enumerator -> predictor -> ranker: a raw client
//! record is validated and encoded into a fixed-order feature vector, every
//! feasible intervention combination is enumerated, each combination is scored
//! by the trained outcome model, and the combinations are ranked by their
//! predicted lift over the client's no-intervention baseline.

pub mod cleaner;
pub mod dataset;
pub mod domain;
pub mod enumerate;
pub mod model;
pub mod ranker;
pub mod service;

pub use cleaner::{clean, ValidationError};
pub use dataset::{read_outcomes, DatasetError};
pub use domain::{
    ClientFeatures, FeatureVector, InterventionCombination, InterventionKind, OutcomeRecord,
    RawClientRecord, RawValue, CLIENT_FEATURE_LEN, FEATURE_VECTOR_LEN, INTERVENTION_COUNT,
};
pub use enumerate::CombinationEnumerator;
pub use model::{
    train, ModelError, ModelStorage, ModelStore, ModelSummary, StorageError, SuccessPredictor,
    TrainedModel,
};
pub use ranker::{rank, RankingError, RecommendationReport, ScoredCombination};
pub use service::{AssessmentError, AssessmentService, RecommendationRequest};

/// Caller-supplied engine parameters outside their legal range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum InvalidConfigError {
    #[error("max_simultaneous {requested} exceeds the {available} available interventions")]
    MaxSimultaneousTooLarge { requested: usize, available: usize },
    #[error("top_k must be at least 1")]
    ZeroTopK,
}
