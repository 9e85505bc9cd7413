//! Verifier entry points.

use crate::baseline;
use crate::config::VerifierConfig;
use crate::finding::Finding;
use crate::guard::VisitGuard;
use crate::hierarchy;
use repomodel_types::{ClassDescriptor, ModelObject, ObjectKind};

/// State of one top-level verification: the configuration and a fresh
/// visit guard. Dropped when the call returns.
pub(crate) struct Session<'c> {
    pub config: &'c VerifierConfig,
    pub guard: VisitGuard,
}

impl<'c> Session<'c> {
    fn new(config: &'c VerifierConfig) -> Self {
        Self {
            config,
            guard: VisitGuard::new(),
        }
    }
}

/// Checks objects and classes of an object model for internal consistency.
///
/// The verifier holds only its configuration. Each call gets its own visit
/// guard, so one verifier can be shared across threads.
#[derive(Debug, Clone, Default)]
pub struct ModelVerifier {
    config: VerifierConfig,
}

impl ModelVerifier {
    /// Create a verifier with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a verifier with a specific configuration.
    pub fn with_config(config: VerifierConfig) -> Self {
        Self { config }
    }

    /// The verifier configuration.
    pub fn config(&self) -> &VerifierConfig {
        &self.config
    }

    /// Verify an object. Class objects get the full hierarchy checks, any
    /// other kind the baseline checks followed by its class.
    pub fn verify_object(&self, obj: &dyn ModelObject) -> Vec<Finding> {
        let mut session = Session::new(&self.config);
        match (obj.kind(), obj.as_class()) {
            (ObjectKind::Class, Some(cls)) => hierarchy::verify_class(cls, &mut session),
            _ => baseline::verify_object(obj, &mut session),
        }
    }

    /// Verify a class, its superclass chain and its aspects.
    pub fn verify_class(&self, cls: &dyn ClassDescriptor) -> Vec<Finding> {
        let mut session = Session::new(&self.config);
        hierarchy::verify_class(cls, &mut session)
    }
}
