//! Clinical prior estimation from age, cognitive stage, and APOE genotype.
//!
//! The stage anchors give the probability of amyloid positivity at ages 50 and
//! 90; intermediate ages interpolate linearly and ages outside the anchor
//! range clamp flat to the nearest anchor. The APOE adjustment is applied
//! after the age/stage prior, multiplicatively on odds, so genotype odds
//! ratios compose the way they are published.

use crate::prob::{clamp_unit, from_odds, to_odds};
use crate::types::{ApoeGenotype, ClinicalContext, Stage};

/// Prior anchors per stage: probability of amyloid positivity at age 50 and
/// at age 90. Illustrative literature-derived constants.
const PRIOR_ANCHORS: [(Stage, f64, f64); 4] = [
    (Stage::Cn, 0.10, 0.44),
    (Stage::Scd, 0.12, 0.43),
    (Stage::Mci, 0.27, 0.71),
    (Stage::Dem, 0.60, 0.85),
];

const ANCHOR_AGE_LO: f64 = 50.0;
const ANCHOR_AGE_HI: f64 = 90.0;

/// Anchor pair for a stage. A stage missing from the table falls back to the
/// MCI row; with the closed `Stage` enum every row is present, but the lookup
/// keeps the fallback so the table can shrink without changing behavior.
fn anchors_for(stage: Stage) -> (f64, f64) {
    PRIOR_ANCHORS
        .iter()
        .find(|(s, _, _)| *s == stage)
        .map(|&(_, a50, a90)| (a50, a90))
        .unwrap_or((0.27, 0.71))
}

/// Multiplicative odds ratio on the prior for an APOE genotype. Unknown
/// genotype is the neutral 1.0.
fn apoe_odds_ratio(genotype: ApoeGenotype) -> f64 {
    match genotype {
        ApoeGenotype::Unknown => 1.0,
        ApoeGenotype::E2E2 => 0.6,
        ApoeGenotype::E2E3 => 0.6,
        ApoeGenotype::E2E4 => 2.6,
        ApoeGenotype::E3E3 => 1.0,
        ApoeGenotype::E3E4 => 3.5,
        ApoeGenotype::E4E4 => 12.0,
    }
}

/// Linear interpolation with flat extension outside `[x0, x1]`.
fn lerp(x: f64, x0: f64, y0: f64, x1: f64, y1: f64) -> f64 {
    if x <= x0 {
        return y0;
    }
    if x >= x1 {
        return y1;
    }
    let t = (x - x0) / (x1 - x0);
    y0 + t * (y1 - y0)
}

/// Age/stage prior: interpolates the stage anchors and clamps the result into
/// `[0.01, 0.99]`.
pub fn prior_from_age_stage(age: f64, stage: Stage) -> f64 {
    let (a50, a90) = anchors_for(stage);
    lerp(age, ANCHOR_AGE_LO, a50, ANCHOR_AGE_HI, a90).clamp(0.01, 0.99)
}

/// Applies the APOE genotype odds ratio to a prior probability. The
/// multiplication happens in odds space; the result is clamped into the open
/// unit interval.
pub fn apply_apoe_adjustment(p: f64, genotype: ApoeGenotype) -> f64 {
    let odds = to_odds(clamp_unit(p));
    clamp_unit(from_odds(odds * apoe_odds_ratio(genotype)))
}

/// The clinical prior: age/stage interpolation first, APOE adjustment second.
pub fn clinical_prior(context: &ClinicalContext) -> f64 {
    let base = prior_from_age_stage(context.age, context.stage);
    let adjusted = apply_apoe_adjustment(base, context.apoe);
    log::debug!(
        "clinical prior: age/stage base {:.4}, after APOE {:.4}",
        base,
        adjusted
    );
    adjusted
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn mci_e3e4_prior_matches_hand_computation() {
        // age 73, MCI anchors (0.27, 0.71): t = 23/40 = 0.575,
        // base = 0.27 + 0.575 * 0.44 = 0.5230; odds 1.0964 * 3.5 = 3.8376,
        // prior = 3.8376 / 4.8376 = 0.7932.
        let ctx = ClinicalContext {
            age: 73.0,
            stage: Stage::Mci,
            apoe: ApoeGenotype::E3E4,
        };
        assert_relative_eq!(clinical_prior(&ctx), 0.7932, epsilon = 1e-4);
    }

    #[test]
    fn ages_outside_anchor_range_clamp_flat() {
        assert_relative_eq!(
            prior_from_age_stage(40.0, Stage::Cn),
            0.10,
            epsilon = 1e-12
        );
        assert_relative_eq!(
            prior_from_age_stage(101.0, Stage::Cn),
            0.44,
            epsilon = 1e-12
        );
    }

    #[test]
    fn anchor_interpolation_is_linear() {
        // Midpoint of the DEM anchors.
        assert_relative_eq!(
            prior_from_age_stage(70.0, Stage::Dem),
            (0.60 + 0.85) / 2.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn unknown_and_e3e3_genotypes_leave_prior_unchanged() {
        let p = prior_from_age_stage(73.0, Stage::Mci);
        assert_relative_eq!(
            apply_apoe_adjustment(p, ApoeGenotype::Unknown),
            p,
            epsilon = 1e-12
        );
        assert_relative_eq!(
            apply_apoe_adjustment(p, ApoeGenotype::E3E3),
            p,
            epsilon = 1e-12
        );
    }

    #[test]
    fn protective_genotype_lowers_prior() {
        let p = prior_from_age_stage(73.0, Stage::Mci);
        assert!(apply_apoe_adjustment(p, ApoeGenotype::E2E2) < p);
    }

    #[test]
    fn adjustment_stays_inside_open_interval() {
        let adjusted = apply_apoe_adjustment(0.999999, ApoeGenotype::E4E4);
        assert!(adjusted < 1.0);
        assert!(adjusted > 0.0);
    }
}
