//! Re-referencing a test's likelihood ratios from one reference standard to
//! another.
//!
//! Step 1 inverts the published ratios back to an operating point:
//! `LR+ = Se/(1−Sp)` and `LR− = (1−Se)/Sp` solve to
//! `Sp = (1−LR+)/(LR−−LR+)`, `Se = 1−LR−·Sp`. Step 2 re-expresses that
//! operating point against the target standard through the mediating
//! standard's predictive values at a stated prevalence, solving the 2×2
//! system from the law of total probability over the test/mediator/target
//! contingency table. Step 3 re-derives the ratios from the bridged accuracy.
//!
//! Bridging X→Y and back need not reproduce the inputs once any clamping
//! fired; the round trip is only an approximate identity on clean inputs.

use crate::harmonize::{npv, ppv};
use thiserror::Error;

/// Below this separation of LR− and LR+ the step-1 system is singular.
const LR_SEPARATION_EPS: f64 = 1e-9;

/// Bridged accuracy bounds: the algebraic solution is clamped into
/// `[0.001, 0.999]` and flagged when clamping was needed.
const ACCURACY_FLOOR: f64 = 1e-3;
const ACCURACY_CEIL: f64 = 0.999;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BridgeError {
    #[error("Likelihood ratios must be strictly positive, got LR+={lr_pos}, LR-={lr_neg}.")]
    NonPositiveLikelihoodRatio { lr_pos: f64, lr_neg: f64 },
    #[error("LR- and LR+ are too close to identify an operating point (|LR- - LR+| < 1e-9).")]
    UnidentifiableBridge,
    #[error(
        "Mediating operating point and prevalence are mutually inconsistent (PPV + NPV - 1 = {det:.4} <= 0); no valid bridging exists."
    )]
    InconsistentPrevalence { det: f64 },
}

/// A test's accuracy and ratios re-expressed against the target standard.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BridgedAccuracy {
    pub sensitivity: f64,
    pub specificity: f64,
    pub lr_positive: f64,
    pub lr_negative: f64,
    /// Set when the algebraic solution fell outside the valid probability
    /// range and was clamped; the inputs were borderline-inconsistent.
    pub warn: bool,
}

/// Step 1: recovers `(Se, Sp)` from a published `(LR+, LR−)` pair.
pub fn accuracy_from_lr(lr_pos: f64, lr_neg: f64) -> Result<(f64, f64), BridgeError> {
    if !(lr_pos > 0.0) || !(lr_neg > 0.0) {
        return Err(BridgeError::NonPositiveLikelihoodRatio { lr_pos, lr_neg });
    }
    let den = lr_neg - lr_pos;
    if den.abs() < LR_SEPARATION_EPS {
        return Err(BridgeError::UnidentifiableBridge);
    }
    let sp = (1.0 - lr_pos) / den;
    let se = 1.0 - lr_neg * sp;
    Ok((se, sp))
}

/// Steps 2 and 3: bridges ratios published against a mediating standard into
/// the frame of the target standard.
///
/// `mediator_se`/`mediator_sp` are the mediator's own accuracy against the
/// target, and `prevalence` the target-positivity rate the predictive values
/// are taken at.
pub fn bridge_accuracy(
    lr_pos: f64,
    lr_neg: f64,
    mediator_se: f64,
    mediator_sp: f64,
    prevalence: f64,
) -> Result<BridgedAccuracy, BridgeError> {
    let (se_raw, sp_raw) = accuracy_from_lr(lr_pos, lr_neg)?;

    // Out-of-range accuracy from step 1 is numeric drift, not a logical
    // failure: clamp into [0, 1] before building the linear system.
    let a = se_raw.clamp(0.0, 1.0);
    let b = sp_raw.clamp(0.0, 1.0);

    let u = ppv(mediator_se, mediator_sp, prevalence);
    let v = npv(mediator_se, mediator_sp, prevalence);
    let det = u + v - 1.0;
    if det <= 0.0 {
        return Err(BridgeError::InconsistentPrevalence { det });
    }

    let a_term = a - 1.0 + u;
    let b_term = b - 1.0 + v;
    let se_bridged = (a_term * v + (1.0 - u) * b_term) / det;
    let sp_bridged = (u * b_term + (1.0 - v) * a_term) / det;

    let warn = !(0.0..=1.0).contains(&se_bridged) || !(0.0..=1.0).contains(&sp_bridged);
    if warn {
        log::warn!(
            "bridged accuracy out of range (se {:.4}, sp {:.4}); clamping",
            se_bridged,
            sp_bridged
        );
    }
    let se = se_bridged.clamp(ACCURACY_FLOOR, ACCURACY_CEIL);
    let sp = sp_bridged.clamp(ACCURACY_FLOOR, ACCURACY_CEIL);

    Ok(BridgedAccuracy {
        sensitivity: se,
        specificity: sp,
        lr_positive: se / (1.0 - sp),
        lr_negative: (1.0 - se) / sp,
        warn,
    })
}
