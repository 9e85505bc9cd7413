//! Verification and run configuration.
//!
//! Configuration is passed explicitly into every top-level call; there is
//! no process-wide setting.

use crate::error::{ConformanceError, ConformanceResult};
use repomodel_types::QName;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How strictly an overriding reference property's target class is compared
/// with the inherited one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchLevel {
    /// Target classes must have the same qualified name.
    #[serde(rename = "EXACT")]
    Exact,
    /// The overriding target must be, or extend, the inherited target.
    #[serde(rename = "ISOREXTENDS")]
    IsOrExtends,
    /// Target classes are not compared.
    #[serde(rename = "ANY")]
    Any,
}

impl MatchLevel {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Exact => "EXACT",
            Self::IsOrExtends => "ISOREXTENDS",
            Self::Any => "ANY",
        }
    }
}

impl fmt::Display for MatchLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Switches threaded through one verification call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifierConfig {
    /// Also compare display name, required, read-only, hidden and system
    /// flags of inherited properties.
    pub strict_match: bool,
    /// Comparison of reference target classes.
    pub reference_match: MatchLevel,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            strict_match: true,
            reference_match: MatchLevel::IsOrExtends,
        }
    }
}

impl VerifierConfig {
    pub fn with_strict_match(mut self, strict_match: bool) -> Self {
        self.strict_match = strict_match;
        self
    }

    pub fn with_reference_match(mut self, reference_match: MatchLevel) -> Self {
        self.reference_match = reference_match;
        self
    }
}

/// Configuration for a repository-wide conformance run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConformanceConfig {
    pub verifier: VerifierConfig,
    /// Restrict the run to these classes (empty = all).
    pub classes: Vec<QName>,
    /// Stop after the first class with findings.
    pub fail_fast: bool,
    /// Also check the repository against the schema assertion table.
    pub include_schema: bool,
}

impl ConformanceConfig {
    /// Load a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> ConformanceResult<Self> {
        serde_json::from_str(json).map_err(|e| ConformanceError::InvalidConfiguration(e.to_string()))
    }
}
