//! PET↔autopsy reference harmonization.
//!
//! Evidence that is informative only about PET status can move an
//! autopsy-referenced belief no further than the two conditional extremes:
//! "autopsy-positive given PET-positive" (PPV) and "autopsy-positive given
//! PET-negative" (1 − NPV). Those extremes form the envelope; any PET-layer
//! belief `q` maps into the autopsy frame as the mixture
//! `q·PPV + (1−q)·(1−NPV)`, a mixing weight rather than a further Bayesian
//! update.

use crate::types::{Category, Envelope, PetOperatingPoint};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum HarmonizeError {
    #[error(
        "PET operating point yields an inverted envelope (lo {lo:.4} > hi {hi:.4}); the sensitivity/specificity assumptions are violated."
    )]
    InvalidEnvelope { lo: f64, hi: f64 },
}

/// Positive predictive value of a test at a given prevalence.
#[inline]
pub fn ppv(se: f64, sp: f64, prevalence: f64) -> f64 {
    (se * prevalence) / (se * prevalence + (1.0 - sp) * (1.0 - prevalence))
}

/// Negative predictive value of a test at a given prevalence.
#[inline]
pub fn npv(se: f64, sp: f64, prevalence: f64) -> f64 {
    (sp * (1.0 - prevalence)) / ((1.0 - se) * prevalence + sp * (1.0 - prevalence))
}

/// The PET-layer prior at a clinical prevalence: the marginal
/// `P(PET+) = se·prior + (1−sp)·(1−prior)`.
#[inline]
pub fn pet_marginal(prior: f64, pet: &PetOperatingPoint) -> f64 {
    pet.sensitivity * prior + (1.0 - pet.specificity) * (1.0 - prior)
}

/// The feasible autopsy-posterior range `[1 − NPV, PPV]` implied by a clinical
/// prior and PET's operating point against autopsy.
pub fn envelope(pet: &PetOperatingPoint, prior: f64) -> Result<Envelope, HarmonizeError> {
    let hi = ppv(pet.sensitivity, pet.specificity, prior);
    let lo = 1.0 - npv(pet.sensitivity, pet.specificity, prior);
    if lo > hi {
        return Err(HarmonizeError::InvalidEnvelope { lo, hi });
    }
    Ok(Envelope { lo, hi })
}

/// Maps a PET-layer belief `q` into the autopsy frame:
/// `lo + q·(hi − lo)`, bounded into the envelope.
pub fn mix(envelope: &Envelope, q: f64) -> f64 {
    let mixed = envelope.lo + q * envelope.width();
    mixed.clamp(envelope.lo, envelope.hi)
}

/// Autopsy posterior when PET itself was observed: the value collapses
/// exactly to an envelope bound (or the clinical prior when indeterminate),
/// skipping the interpolation arithmetic so no rounding leaks into the
/// boundary.
pub fn collapse(envelope: &Envelope, clinical_prior: f64, category: Category) -> f64 {
    match category {
        Category::Positive => envelope.hi,
        Category::Negative => envelope.lo,
        Category::Indeterminate => clinical_prior,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const PET: PetOperatingPoint = PetOperatingPoint {
        sensitivity: 0.92,
        specificity: 0.90,
    };

    #[test]
    fn predictive_values_at_scenario_prior() {
        // Clinical prior 0.7932: PPV = 0.9725, NPV = 0.7457.
        assert_relative_eq!(ppv(0.92, 0.90, 0.7932), 0.9725, epsilon = 1e-4);
        assert_relative_eq!(npv(0.92, 0.90, 0.7932), 0.7457, epsilon = 1e-4);
    }

    #[test]
    fn envelope_brackets_scenario_values() {
        let env = envelope(&PET, 0.7932).unwrap();
        assert_relative_eq!(env.lo, 0.2543, epsilon = 1e-4);
        assert_relative_eq!(env.hi, 0.9725, epsilon = 1e-4);
        assert!(env.lo <= env.hi);
    }

    #[test]
    fn envelope_ordering_holds_across_priors() {
        for &prior in &[0.01, 0.1, 0.25, 0.5, 0.75, 0.9, 0.99] {
            let env = envelope(&PET, prior).unwrap();
            assert!(env.lo <= env.hi, "inverted envelope at prior {prior}");
        }
    }

    #[test]
    fn uninformative_operating_point_inverts_envelope() {
        // se + sp < 1: PET anticorrelated with autopsy, assumptions violated.
        let bad = PetOperatingPoint {
            sensitivity: 0.3,
            specificity: 0.3,
        };
        assert!(matches!(
            envelope(&bad, 0.5),
            Err(HarmonizeError::InvalidEnvelope { .. })
        ));
    }

    #[test]
    fn mixture_matches_scenario_three() {
        let env = envelope(&PET, 0.7932).unwrap();
        // q = 0.9788 → 0.9788·0.9725 + 0.0212·0.2543 ≈ 0.9572.
        assert_relative_eq!(mix(&env, 0.9788), 0.9572, epsilon = 1e-4);
    }

    #[test]
    fn mixture_stays_inside_envelope() {
        let env = envelope(&PET, 0.5).unwrap();
        for &q in &[0.0, 0.2, 0.5, 0.8, 1.0] {
            assert!(env.contains(mix(&env, q)));
        }
    }

    #[test]
    fn collapse_hits_bounds_exactly() {
        let env = envelope(&PET, 0.7932).unwrap();
        // Bitwise equality: the boundary values carry no interpolation error.
        assert_eq!(collapse(&env, 0.7932, Category::Positive), env.hi);
        assert_eq!(collapse(&env, 0.7932, Category::Negative), env.lo);
        assert_eq!(collapse(&env, 0.7932, Category::Indeterminate), 0.7932);
    }
}
