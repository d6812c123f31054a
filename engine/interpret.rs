//! Enumerated interpretation of a posterior probability.
//!
//! The tier is structured output for presentation layers to render however
//! they like; the engine never emits label text for downstream re-parsing.
//! The same thresholds apply in both the PET-referenced and the
//! autopsy-referenced frames.

use serde::{Deserialize, Serialize};

/// Tier thresholds, upper buckets checked first.
const THRESHOLD_HIGH: f64 = 0.90;
const THRESHOLD_LIKELY: f64 = 0.70;
const THRESHOLD_LIKELY_NEGATIVE: f64 = 0.30;
const THRESHOLD_LOW: f64 = 0.10;

/// Default therapy-triage cut-off on the PET-referenced posterior.
pub const DEFAULT_TRIAGE_CUTOFF: f64 = 0.80;

/// Qualitative bucket for a posterior probability of positivity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProbabilityTier {
    /// ≥ 0.90.
    HighlyLikely,
    /// ≥ 0.70.
    Likely,
    /// Between the negative and positive bands.
    Indeterminate,
    /// ≤ 0.30.
    LikelyNegative,
    /// ≤ 0.10.
    Unlikely,
}

impl ProbabilityTier {
    pub fn from_probability(p: f64) -> Self {
        if !p.is_finite() {
            return ProbabilityTier::Indeterminate;
        }
        if p >= THRESHOLD_HIGH {
            ProbabilityTier::HighlyLikely
        } else if p >= THRESHOLD_LIKELY {
            ProbabilityTier::Likely
        } else if p <= THRESHOLD_LOW {
            ProbabilityTier::Unlikely
        } else if p <= THRESHOLD_LIKELY_NEGATIVE {
            ProbabilityTier::LikelyNegative
        } else {
            ProbabilityTier::Indeterminate
        }
    }
}

/// Whether a PET-referenced posterior clears the therapy-triage cut-off. A
/// cut-off outside (0, 1) falls back to the default rather than silently
/// gating everything in or out.
pub fn meets_triage(p: f64, cutoff: f64) -> bool {
    let cutoff = if cutoff > 0.0 && cutoff < 1.0 {
        cutoff
    } else {
        DEFAULT_TRIAGE_CUTOFF
    };
    p >= cutoff
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiers_bucket_at_the_documented_thresholds() {
        assert_eq!(
            ProbabilityTier::from_probability(0.95),
            ProbabilityTier::HighlyLikely
        );
        assert_eq!(
            ProbabilityTier::from_probability(0.90),
            ProbabilityTier::HighlyLikely
        );
        assert_eq!(
            ProbabilityTier::from_probability(0.75),
            ProbabilityTier::Likely
        );
        assert_eq!(
            ProbabilityTier::from_probability(0.50),
            ProbabilityTier::Indeterminate
        );
        assert_eq!(
            ProbabilityTier::from_probability(0.25),
            ProbabilityTier::LikelyNegative
        );
        assert_eq!(
            ProbabilityTier::from_probability(0.05),
            ProbabilityTier::Unlikely
        );
    }

    #[test]
    fn band_edges_belong_to_the_outer_buckets() {
        assert_eq!(
            ProbabilityTier::from_probability(0.70),
            ProbabilityTier::Likely
        );
        assert_eq!(
            ProbabilityTier::from_probability(0.30),
            ProbabilityTier::LikelyNegative
        );
        assert_eq!(
            ProbabilityTier::from_probability(0.10),
            ProbabilityTier::Unlikely
        );
    }

    #[test]
    fn non_finite_probability_is_indeterminate() {
        assert_eq!(
            ProbabilityTier::from_probability(f64::NAN),
            ProbabilityTier::Indeterminate
        );
    }

    #[test]
    fn triage_uses_the_cutoff_and_falls_back_when_invalid() {
        assert!(meets_triage(0.85, 0.80));
        assert!(!meets_triage(0.75, 0.80));
        assert!(meets_triage(0.95, 0.90));
        // Invalid cut-offs fall back to 0.80.
        assert!(meets_triage(0.85, 0.0));
        assert!(!meets_triage(0.75, 1.5));
    }
}
