//! Ranking of intervention combinations by predicted lift.
//!
//! Every candidate combination is scored once; the cost is
//! O(combinations x predictor) and the combination space is small and
//! bounded, so no further optimization is attempted.

use serde::{Deserialize, Serialize};

use super::domain::{ClientFeatures, InterventionCombination};
use super::model::{ModelError, SuccessPredictor};
use super::InvalidConfigError;

/// One ranked candidate: the combination, its predicted success probability,
/// and the lift over the client's no-intervention baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCombination {
    pub interventions: InterventionCombination,
    pub probability: f64,
    pub delta: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationReport {
    pub baseline_probability: f64,
    pub recommendations: Vec<ScoredCombination>,
}

#[derive(Debug, thiserror::Error)]
pub enum RankingError {
    #[error(transparent)]
    Config(#[from] InvalidConfigError),
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Score every candidate combination and rank by delta, descending.
///
/// Ties are broken toward fewer interventions, then toward earlier
/// enumeration order. `top_k` of `None` keeps every candidate. Either the
/// complete ranked list is produced or an error is raised; no partial output.
pub fn rank<P>(
    predictor: &P,
    baseline: &ClientFeatures,
    candidates: impl IntoIterator<Item = InterventionCombination>,
    top_k: Option<usize>,
) -> Result<RecommendationReport, RankingError>
where
    P: SuccessPredictor + ?Sized,
{
    if top_k == Some(0) {
        return Err(InvalidConfigError::ZeroTopK.into());
    }

    let baseline_vector = baseline.with_interventions(&InterventionCombination::empty());
    let baseline_probability = predictor.predict(&baseline_vector)?;

    let mut scored: Vec<(usize, ScoredCombination)> = Vec::new();
    for (position, interventions) in candidates.into_iter().enumerate() {
        let probability = predictor.predict(&baseline.with_interventions(&interventions))?;
        scored.push((
            position,
            ScoredCombination {
                delta: probability - baseline_probability,
                probability,
                interventions,
            },
        ));
    }

    scored.sort_by(|(left_pos, left), (right_pos, right)| {
        right
            .delta
            .total_cmp(&left.delta)
            .then_with(|| left.interventions.len().cmp(&right.interventions.len()))
            .then_with(|| left_pos.cmp(right_pos))
    });

    let mut recommendations: Vec<ScoredCombination> =
        scored.into_iter().map(|(_, entry)| entry).collect();
    if let Some(limit) = top_k {
        recommendations.truncate(limit);
    }

    Ok(RecommendationReport {
        baseline_probability,
        recommendations,
    })
}
