//! The biomarker test library.
//!
//! The library is configuration data, not engine logic: a table of test
//! records keyed by id, each carrying the test's reference standard, accuracy
//! figures, and default likelihood ratios. A built-in table ships with the
//! crate; deployments can persist and load their own as a human-readable TOML
//! artifact.

use crate::types::{BiomarkerTest, LikelihoodRatios, PET_TEST_ID, ReferenceStandard};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{BufWriter, Write};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LibraryError {
    #[error("Unknown test id '{0}'.")]
    UnknownTestId(String),
    #[error("Failed to read or write library file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML library file: {0}")]
    TomlParseError(#[from] toml::de::Error),
    #[error("Failed to serialize library to TOML format: {0}")]
    TomlSerializeError(#[from] toml::ser::Error),
}

/// Ordered collection of biomarker tests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestLibrary {
    pub tests: Vec<BiomarkerTest>,
}

impl TestLibrary {
    /// Looks up a test by id. A miss is fatal to the caller; there is no
    /// silent default.
    pub fn get(&self, id: &str) -> Result<&BiomarkerTest, LibraryError> {
        self.tests
            .iter()
            .find(|t| t.id == id)
            .ok_or_else(|| LibraryError::UnknownTestId(id.to_string()))
    }

    /// Saves the library to a human-readable TOML file.
    pub fn save(&self, path: &str) -> Result<(), LibraryError> {
        let toml_string = toml::to_string_pretty(self)?;
        let mut file = BufWriter::new(fs::File::create(path)?);
        file.write_all(toml_string.as_bytes())?;
        Ok(())
    }

    /// Loads a library from a TOML file.
    pub fn load(path: &str) -> Result<Self, LibraryError> {
        let toml_string = fs::read_to_string(path)?;
        let library = toml::from_str(&toml_string)?;
        Ok(library)
    }
}

impl Default for TestLibrary {
    /// The built-in library. Accuracy figures and ratios are illustrative
    /// defaults drawn from published operating points.
    fn default() -> Self {
        fn test(
            id: &str,
            label: &str,
            reference: ReferenceStandard,
            se: f64,
            sp: f64,
            pos: f64,
            neg: f64,
        ) -> BiomarkerTest {
            BiomarkerTest {
                id: id.to_string(),
                label: label.to_string(),
                reference,
                sensitivity: se,
                specificity: sp,
                defaults: LikelihoodRatios {
                    positive: pos,
                    indeterminate: 1.0,
                    negative: neg,
                },
            }
        }

        Self {
            tests: vec![
                test(
                    PET_TEST_ID,
                    "Amyloid PET (visual; ref autopsy)",
                    ReferenceStandard::Autopsy,
                    0.92,
                    0.90,
                    9.20,
                    0.089,
                ),
                test(
                    "csf_abeta42_40_lumipulse",
                    "CSF A\u{3b2}42/40 (Lumipulse; ref PET)",
                    ReferenceStandard::Pet,
                    0.92,
                    0.93,
                    13.14,
                    0.086,
                ),
                test(
                    "csf_ptau181_abeta42_elecsys",
                    "CSF p-tau181/A\u{3b2}42 (Elecsys; ref PET)",
                    ReferenceStandard::Pet,
                    0.91,
                    0.89,
                    8.27,
                    0.101,
                ),
                test(
                    "plasma_abeta42_40_generic",
                    "Plasma A\u{3b2}42/40 (generic; ref PET)",
                    ReferenceStandard::Pet,
                    0.85,
                    0.85,
                    5.67,
                    0.176,
                ),
                test(
                    "plasma_ptau217_generic",
                    "Plasma p-tau217 (generic; ref PET)",
                    ReferenceStandard::Pet,
                    0.92,
                    0.94,
                    15.33,
                    0.085,
                ),
                test(
                    "plasma_ptau217_abeta42_lumipulse",
                    "Plasma p-tau217/A\u{3b2}42 (Lumipulse; mixed PET/CSF ref)",
                    ReferenceStandard::Mixed,
                    0.96,
                    0.92,
                    12.00,
                    0.043,
                ),
            ],
        }
    }
}
