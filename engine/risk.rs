//! Multi-year conversion-risk projection.
//!
//! A two-component mixture over an exponential survival model: each amyloid
//! state carries an annual event hazard, the per-state cumulative risk over a
//! horizon is `1 − (1−h)^t`, and the posterior probability of positivity
//! mixes the two. This is not a Bayesian update.

use crate::types::Stage;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Which posterior feeds the projection. The caller chooses explicitly;
/// nothing is selected silently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum PosteriorPreference {
    PetReferenced,
    AutopsyReferenced,
}

/// Annual event hazards for the amyloid-positive and amyloid-negative states.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HazardRates {
    pub positive: f64,
    pub negative: f64,
}

/// Per-stage hazard rows. Only CN and MCI carry distinct hazards; every other
/// stage uses the MCI row, the same fallback policy as the prior anchors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HazardTable {
    pub cn: HazardRates,
    pub mci: HazardRates,
}

impl HazardTable {
    pub fn rates_for(&self, stage: Stage) -> HazardRates {
        match stage {
            Stage::Cn => self.cn,
            _ => self.mci,
        }
    }
}

impl Default for HazardTable {
    /// Illustrative default hazards.
    fn default() -> Self {
        Self {
            cn: HazardRates {
                positive: 0.06,
                negative: 0.01,
            },
            mci: HazardRates {
                positive: 0.15,
                negative: 0.03,
            },
        }
    }
}

/// Projected-risk tier, bucketed at 0.40 / 0.20 / 0.10.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskTier {
    High,
    Moderate,
    LowModerate,
    Low,
}

impl RiskTier {
    pub fn from_risk(risk: f64) -> Self {
        if risk >= 0.40 {
            RiskTier::High
        } else if risk >= 0.20 {
            RiskTier::Moderate
        } else if risk >= 0.10 {
            RiskTier::LowModerate
        } else {
            RiskTier::Low
        }
    }
}

/// The mixture risk with its per-state components.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskProjection {
    pub risk: f64,
    pub risk_positive: f64,
    pub risk_negative: f64,
    pub tier: RiskTier,
}

/// Cumulative event risk over `years` at a constant annual hazard.
#[inline]
pub fn cumulative_risk(hazard: f64, years: f64) -> f64 {
    1.0 - (1.0 - hazard).powf(years)
}

/// Projects a posterior probability of amyloid positivity into a
/// `years`-horizon conversion risk for the given stage.
pub fn project(
    posterior: f64,
    stage: Stage,
    years: f64,
    hazards: &HazardTable,
) -> RiskProjection {
    let rates = hazards.rates_for(stage);
    let risk_positive = cumulative_risk(rates.positive, years);
    let risk_negative = cumulative_risk(rates.negative, years);
    let risk = (posterior * risk_positive + (1.0 - posterior) * risk_negative).clamp(0.0, 0.999);
    log::debug!(
        "risk projection: {:?} over {:.1}y, A+ {:.4}, A- {:.4}, mix {:.4}",
        stage,
        years,
        risk_positive,
        risk_negative,
        risk
    );
    RiskProjection {
        risk,
        risk_positive,
        risk_negative,
        tier: RiskTier::from_risk(risk),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn mci_three_year_projection_matches_hand_computation() {
        // h+ = 0.15, h- = 0.03, t = 3, pa = 0.80:
        // risk+ = 1 - 0.85^3 = 0.3859, risk- = 1 - 0.97^3 = 0.0873,
        // mix = 0.80*0.3859 + 0.20*0.0873 = 0.3262.
        let projection = project(0.80, Stage::Mci, 3.0, &HazardTable::default());
        assert_relative_eq!(projection.risk_positive, 0.3859, epsilon = 1e-4);
        assert_relative_eq!(projection.risk_negative, 0.0873, epsilon = 1e-4);
        assert_relative_eq!(projection.risk, 0.3262, epsilon = 1e-4);
        assert_eq!(projection.tier, RiskTier::Moderate);
    }

    #[test]
    fn non_cn_stages_use_the_mci_row() {
        let table = HazardTable::default();
        assert_eq!(table.rates_for(Stage::Scd), table.mci);
        assert_eq!(table.rates_for(Stage::Dem), table.mci);
        assert_eq!(table.rates_for(Stage::Cn), table.cn);
    }

    #[test]
    fn zero_horizon_means_zero_risk() {
        let projection = project(0.9, Stage::Mci, 0.0, &HazardTable::default());
        assert_relative_eq!(projection.risk, 0.0, epsilon = 1e-12);
        assert_eq!(projection.tier, RiskTier::Low);
    }

    #[test]
    fn mixture_is_capped_below_one() {
        let table = HazardTable {
            cn: HazardRates {
                positive: 1.0,
                negative: 1.0,
            },
            mci: HazardRates {
                positive: 1.0,
                negative: 1.0,
            },
        };
        let projection = project(1.0, Stage::Mci, 10.0, &table);
        assert_eq!(projection.risk, 0.999);
    }

    #[test]
    fn tier_thresholds_bucket_correctly() {
        assert_eq!(RiskTier::from_risk(0.45), RiskTier::High);
        assert_eq!(RiskTier::from_risk(0.40), RiskTier::High);
        assert_eq!(RiskTier::from_risk(0.25), RiskTier::Moderate);
        assert_eq!(RiskTier::from_risk(0.12), RiskTier::LowModerate);
        assert_eq!(RiskTier::from_risk(0.05), RiskTier::Low);
    }
}
