//! Bayesian likelihood updates over one or two test observations.
//!
//! The ordinary case multiplies prior odds by the category's likelihood ratio.
//! The degenerate case is an observation of the reference variable itself
//! (the PET scan when the PET layer is being computed): no arithmetic, the
//! posterior collapses by definition to 1.0 / 0.0 / the unchanged prior.
//!
//! Sequential two-test updates run as two explicit steps rather than one
//! multiplied ratio, because either step may be the degenerate case, which
//! short-circuits the combination: a direct observation wins regardless of
//! order. A prior that is already exactly 0.0 or 1.0 is a fixed point of any
//! further odds update.

use crate::prob::{clamp_unit, from_odds, to_odds};
use crate::types::{BiomarkerTest, Category, LikelihoodRatios, ReferenceStandard};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum UpdateError {
    #[error("Likelihood ratio must be strictly positive, got {0}.")]
    NonPositiveLikelihoodRatio(f64),
}

/// Posterior by direct observation of the reference variable. Exact by
/// definition: no odds arithmetic touches these values.
pub fn collapse_observation(prior: f64, category: Category) -> f64 {
    match category {
        Category::Positive => 1.0,
        Category::Negative => 0.0,
        Category::Indeterminate => prior,
    }
}

/// One odds-space update: `posterior = from_odds(to_odds(prior) * lr)`.
///
/// A prior of exactly 0.0 or 1.0 (a previously observed reference result) is
/// returned unchanged; indirect evidence cannot move a direct observation.
pub fn odds_update(prior: f64, lr: f64) -> Result<f64, UpdateError> {
    if !(lr > 0.0) || !lr.is_finite() {
        return Err(UpdateError::NonPositiveLikelihoodRatio(lr));
    }
    if prior == 0.0 || prior == 1.0 {
        return Ok(prior);
    }
    Ok(from_odds(to_odds(clamp_unit(prior)) * lr))
}

/// Applies a single observation to a prior within the given layer.
///
/// `lrs` are the ratios in force for this observation (library defaults or a
/// caller-supplied calibration). The degenerate rule fires when the test is a
/// direct reading of the layer's reference variable.
pub fn apply_observation(
    prior: f64,
    test: &BiomarkerTest,
    category: Category,
    lrs: &LikelihoodRatios,
    layer: ReferenceStandard,
) -> Result<f64, UpdateError> {
    if layer == ReferenceStandard::Pet && test.is_pet_scan() {
        let posterior = collapse_observation(prior, category);
        log::debug!(
            "direct PET observation ({:?}) collapses layer to {:.4}",
            category,
            posterior
        );
        return Ok(posterior);
    }
    odds_update(prior, lrs.for_category(category))
}
