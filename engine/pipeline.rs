//! End-to-end evaluation: clinical prior → PET-referenced layer →
//! autopsy-referenced layer.
//!
//! The two posterior frames are computed together but never conflated: the
//! PET layer accumulates odds updates against P(PET+), and the autopsy layer
//! maps the final PET belief through the envelope mixture exactly once, after
//! every update is absorbed.
//!
//! Lock rule: the first direct PET observation encountered in evaluation
//! order is authoritative for the autopsy layer. Once one has been seen,
//! later PET-referenced tests cannot move the autopsy posterior. An
//! indeterminate direct observation leaves the running value in place but
//! still locks the layer.

use crate::harmonize::{self, HarmonizeError};
use crate::interpret::ProbabilityTier;
use crate::library::{LibraryError, TestLibrary};
use crate::prior::clinical_prior;
use crate::prob::clamp_unit;
use crate::risk::{self, HazardTable, PosteriorPreference, RiskProjection};
use crate::types::{
    BiomarkerTest, ClinicalContext, Envelope, LikelihoodRatios, PetOperatingPoint,
    ReferenceStandard, TestObservation,
};
use crate::update::{UpdateError, apply_observation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Library(#[from] LibraryError),
    #[error(transparent)]
    Update(#[from] UpdateError),
    #[error(transparent)]
    Harmonize(#[from] HarmonizeError),
}

/// Everything one evaluation needs, passed by value: the engine holds no
/// state between calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRequest {
    pub context: ClinicalContext,
    /// Replaces the estimated clinical prior when present (clamped into the
    /// open unit interval at this boundary).
    #[serde(default)]
    pub prior_override: Option<f64>,
    pub pet: PetOperatingPoint,
    pub primary: TestObservation,
    #[serde(default)]
    pub secondary: Option<TestObservation>,
}

/// The two posteriors with their interpretation tiers. `pet_posterior` and
/// `autopsy_posterior` live in distinct probability spaces and must not be
/// compared directly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub clinical_prior: f64,
    /// The PET-layer prior P(PET+) at the clinical prevalence.
    pub pet_prior: f64,
    pub pet_posterior: f64,
    pub pet_tier: ProbabilityTier,
    pub autopsy_posterior: f64,
    pub autopsy_tier: ProbabilityTier,
    pub envelope: Envelope,
}

impl EvaluationReport {
    /// The posterior selected by an explicit preference policy.
    pub fn posterior(&self, preference: PosteriorPreference) -> f64 {
        match preference {
            PosteriorPreference::PetReferenced => self.pet_posterior,
            PosteriorPreference::AutopsyReferenced => self.autopsy_posterior,
        }
    }
}

struct ResolvedObservation<'a> {
    test: &'a BiomarkerTest,
    observation: &'a TestObservation,
    lrs: LikelihoodRatios,
}

fn resolve<'a>(
    library: &'a TestLibrary,
    observation: &'a TestObservation,
) -> Result<ResolvedObservation<'a>, LibraryError> {
    let test = library.get(&observation.test_id)?;
    Ok(ResolvedObservation {
        test,
        observation,
        lrs: observation.lr_override.unwrap_or(test.defaults),
    })
}

/// Runs the full evaluation for one or two observations.
pub fn evaluate(
    library: &TestLibrary,
    request: &EvaluationRequest,
) -> Result<EvaluationReport, EngineError> {
    let clinical_prior = match request.prior_override {
        Some(p) => {
            let clamped = clamp_unit(p);
            if clamped != p {
                log::warn!("prior override {p} outside the open unit interval; clamped");
            }
            clamped
        }
        None => clinical_prior(&request.context),
    };

    let primary = resolve(library, &request.primary)?;
    let secondary = request
        .secondary
        .as_ref()
        .map(|obs| resolve(library, obs))
        .transpose()?;

    // PET-referenced layer: marginal prior, then sequential updates. A direct
    // PET observation at either step collapses the layer and becomes a fixed
    // point for the other.
    let pet_prior = harmonize::pet_marginal(clinical_prior, &request.pet);
    let after_primary = apply_observation(
        pet_prior,
        primary.test,
        primary.observation.category,
        &primary.lrs,
        ReferenceStandard::Pet,
    )?;
    let pet_posterior = match &secondary {
        Some(second) => apply_observation(
            after_primary,
            second.test,
            second.observation.category,
            &second.lrs,
            ReferenceStandard::Pet,
        )?,
        None => after_primary,
    };
    log::debug!(
        "PET layer: prior {:.4}, after primary {:.4}, final {:.4}",
        pet_prior,
        after_primary,
        pet_posterior
    );

    // Autopsy-referenced layer: the envelope at the clinical prior, then
    // either a definitional collapse (PET observed) or one mixture mapping
    // after all updates are absorbed.
    let envelope = harmonize::envelope(&request.pet, clinical_prior)?;
    let autopsy_posterior = if primary.test.is_pet_scan() {
        // First direct observation is authoritative; the secondary test
        // cannot move the autopsy posterior.
        if secondary.is_some() {
            log::debug!("autopsy layer locked by primary PET observation");
        }
        harmonize::collapse(&envelope, clinical_prior, primary.observation.category)
    } else {
        match &secondary {
            Some(second) if second.test.is_pet_scan() => {
                match second.observation.category {
                    // The observation overrides the accumulated indirect
                    // evidence from the primary test.
                    crate::types::Category::Indeterminate => {
                        harmonize::mix(&envelope, after_primary)
                    }
                    category => harmonize::collapse(&envelope, clinical_prior, category),
                }
            }
            _ => harmonize::mix(&envelope, pet_posterior),
        }
    };

    Ok(EvaluationReport {
        clinical_prior,
        pet_prior,
        pet_posterior,
        pet_tier: ProbabilityTier::from_probability(pet_posterior),
        autopsy_posterior,
        autopsy_tier: ProbabilityTier::from_probability(autopsy_posterior),
        envelope,
    })
}

/// Projects the report's posterior, selected by an explicit preference, into
/// a multi-year conversion risk.
pub fn project_risk(
    report: &EvaluationReport,
    preference: PosteriorPreference,
    horizon_years: f64,
    context: &ClinicalContext,
    hazards: &HazardTable,
) -> RiskProjection {
    risk::project(
        report.posterior(preference),
        context.stage,
        horizon_years,
        hazards,
    )
}
