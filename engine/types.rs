use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Library id of the test that *is* the PET reference variable. An observation
/// of this test is a direct reading of PET status, not evidence about it.
pub const PET_TEST_ID: &str = "amyloid_pet";

/// Cognitive stage at presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum Stage {
    #[serde(rename = "CN")]
    Cn,
    #[serde(rename = "SCD")]
    Scd,
    #[serde(rename = "MCI")]
    Mci,
    #[serde(rename = "DEM")]
    Dem,
}

/// APOE genotype, including the explicit unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ApoeGenotype {
    Unknown,
    #[value(name = "e2e2")]
    E2E2,
    #[value(name = "e2e3")]
    E2E3,
    #[value(name = "e2e4")]
    E2E4,
    #[value(name = "e3e3")]
    E3E3,
    #[value(name = "e3e4")]
    E3E4,
    #[value(name = "e4e4")]
    E4E4,
}

/// The ground-truth-like variable a test's accuracy is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReferenceStandard {
    #[serde(rename = "PET")]
    Pet,
    #[serde(rename = "autopsy")]
    Autopsy,
    #[serde(rename = "mixed")]
    Mixed,
}

/// Observed result category of a biomarker test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum Category {
    #[serde(rename = "pos")]
    Positive,
    #[serde(rename = "indet")]
    Indeterminate,
    #[serde(rename = "neg")]
    Negative,
}

/// Multiplicative odds factors for the three result categories. The
/// indeterminate ratio is conventionally ≈1 (non-informative).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LikelihoodRatios {
    #[serde(rename = "pos")]
    pub positive: f64,
    #[serde(rename = "indet")]
    pub indeterminate: f64,
    #[serde(rename = "neg")]
    pub negative: f64,
}

impl LikelihoodRatios {
    /// Selects the ratio applied for an observed category.
    pub fn for_category(&self, category: Category) -> f64 {
        match category {
            Category::Positive => self.positive,
            Category::Indeterminate => self.indeterminate,
            Category::Negative => self.negative,
        }
    }
}

/// One entry of the biomarker test library. The accuracy figures and default
/// likelihood ratios are externally supplied constants, never estimated here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiomarkerTest {
    pub id: String,
    pub label: String,
    #[serde(rename = "ref")]
    pub reference: ReferenceStandard,
    #[serde(rename = "se")]
    pub sensitivity: f64,
    #[serde(rename = "sp")]
    pub specificity: f64,
    pub defaults: LikelihoodRatios,
}

impl BiomarkerTest {
    /// Whether an observation of this test is a direct reading of PET status.
    pub fn is_pet_scan(&self) -> bool {
        self.id == PET_TEST_ID
    }
}

/// A test result as reported by the caller: which library test, which
/// category, and optionally calibrated likelihood ratios (e.g. from the
/// bridge) replacing the library defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestObservation {
    pub test_id: String,
    pub category: Category,
    #[serde(default)]
    pub lr_override: Option<LikelihoodRatios>,
}

impl TestObservation {
    pub fn new(test_id: impl Into<String>, category: Category) -> Self {
        Self {
            test_id: test_id.into(),
            category,
            lr_override: None,
        }
    }
}

/// Demographic and genetic context the clinical prior is derived from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClinicalContext {
    /// Age in years.
    pub age: f64,
    pub stage: Stage,
    pub apoe: ApoeGenotype,
}

/// PET's own operating point against autopsy, used whenever harmonizing a
/// PET-referenced belief into the autopsy frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PetOperatingPoint {
    pub sensitivity: f64,
    pub specificity: f64,
}

impl Default for PetOperatingPoint {
    fn default() -> Self {
        Self {
            sensitivity: 0.92,
            specificity: 0.90,
        }
    }
}

/// Feasible range of an autopsy-referenced posterior implied by a clinical
/// prior and PET's operating point: `[1 − NPV, PPV]`. Invariant: `lo ≤ hi`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub lo: f64,
    pub hi: f64,
}

impl Envelope {
    pub fn width(&self) -> f64 {
        self.hi - self.lo
    }

    pub fn contains(&self, p: f64) -> bool {
        self.lo <= p && p <= self.hi
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lr_selection_by_category() {
        let lrs = LikelihoodRatios {
            positive: 15.33,
            indeterminate: 1.0,
            negative: 0.085,
        };
        assert_eq!(lrs.for_category(Category::Positive), 15.33);
        assert_eq!(lrs.for_category(Category::Indeterminate), 1.0);
        assert_eq!(lrs.for_category(Category::Negative), 0.085);
    }

    #[test]
    fn pet_scan_is_recognized_by_id() {
        let pet = BiomarkerTest {
            id: PET_TEST_ID.to_string(),
            label: "Amyloid PET".to_string(),
            reference: ReferenceStandard::Autopsy,
            sensitivity: 0.92,
            specificity: 0.90,
            defaults: LikelihoodRatios {
                positive: 9.20,
                indeterminate: 1.0,
                negative: 0.089,
            },
        };
        assert!(pet.is_pet_scan());
    }

    #[test]
    fn serde_uses_compact_config_keys() {
        let json = serde_json::json!({
            "id": "plasma_ptau217_generic",
            "label": "Plasma p-tau217 (generic; ref PET)",
            "ref": "PET",
            "se": 0.92,
            "sp": 0.94,
            "defaults": { "pos": 15.33, "indet": 1.0, "neg": 0.085 }
        });
        let test: BiomarkerTest = serde_json::from_value(json).unwrap();
        assert_eq!(test.reference, ReferenceStandard::Pet);
        assert_eq!(test.defaults.negative, 0.085);
    }
}
