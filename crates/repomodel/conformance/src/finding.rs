//! Findings produced by verification.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How serious a finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Soft diagnostic; the model may still be usable.
    Warning,
    /// Contract deviation; verification of the branch continued.
    Violation,
    /// Verification of the branch stopped here.
    Abort,
}

/// The rule a finding was raised by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Check {
    ObjectId,
    ObjectGuid,
    ObjectRepository,
    ObjectClass,
    ClassProperties,
    Instantiable,
    AspectInstance,
    PropertyPresent,
    PropertyType,
    Cardinality,
    RequiredValue,
    AvailableProperties,
    Baseline,
    ClassName,
    ClassNamespace,
    ClassQName,
    DeclaredProperties,
    Aspects,
    FlatAspects,
    AspectFlag,
    SuperSubConsistency,
    SubSuperConsistency,
    HierarchyLoop,
    DuplicateProperty,
    AspectConflict,
    AspectSuperConflict,
    PropertyOverride,
    DeclaredConflict,
    DeclaredShape,
    InheritedShape,
    Attribution,
    InheritedAspect,
    Schema,
}

impl Check {
    pub fn label(&self) -> &'static str {
        match self {
            Self::ObjectId => "IdCheck",
            Self::ObjectGuid => "GuidCheck",
            Self::ObjectRepository => "RepositoryCheck",
            Self::ObjectClass => "ClassCheck",
            Self::ClassProperties => "ClassPropertiesCheck",
            Self::Instantiable => "InstantiableCheck",
            Self::AspectInstance => "AspectInstanceCheck",
            Self::PropertyPresent => "PropertyPresentCheck",
            Self::PropertyType => "PropertyTypeCheck",
            Self::Cardinality => "CardinalityCheck",
            Self::RequiredValue => "RequiredValueCheck",
            Self::AvailableProperties => "AvailablePropertiesCheck",
            Self::Baseline => "BaselineCheck",
            Self::ClassName => "NameCheck",
            Self::ClassNamespace => "NamespaceCheck",
            Self::ClassQName => "QNameCheck",
            Self::DeclaredProperties => "DeclaredPropertiesCheck",
            Self::Aspects => "AspectsCheck",
            Self::FlatAspects => "FlatAspectsCheck",
            Self::AspectFlag => "AspectFlagCheck",
            Self::SuperSubConsistency => "SuperClassCheck",
            Self::SubSuperConsistency => "SubClassCheck",
            Self::HierarchyLoop => "HierarchyLoopCheck",
            Self::DuplicateProperty => "DuplicatePropertyCheck",
            Self::AspectConflict => "AspectConflictCheck",
            Self::AspectSuperConflict => "AspectImportCheck",
            Self::PropertyOverride => "PropertyOverrideCheck",
            Self::DeclaredConflict => "DeclaredConflictCheck",
            Self::DeclaredShape => "DeclaredPropertyCheck",
            Self::InheritedShape => "InheritedPropertyCheck",
            Self::Attribution => "PropertyAttributionCheck",
            Self::InheritedAspect => "InheritedAspectCheck",
            Self::Schema => "SchemaCheck",
        }
    }
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One diagnostic. An empty list of findings is a pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub severity: Severity,
    pub check: Check,
    /// Object id or class name the finding is about.
    pub subject: String,
    pub message: String,
}

impl Finding {
    pub fn new(
        severity: Severity,
        check: Check,
        subject: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            check,
            subject: subject.into(),
            message: message.into(),
        }
    }

    /// A soft diagnostic.
    pub fn warning(check: Check, subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, check, subject, message)
    }

    /// A broken rule; verification continues.
    pub fn violation(check: Check, subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Violation, check, subject, message)
    }

    /// A broken rule that stops verification of the subject.
    pub fn abort(check: Check, subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Abort, check, subject, message)
    }

    pub fn is_abort(&self) -> bool {
        self.severity == Severity::Abort
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.severity {
            Severity::Abort => write!(f, "ABORT: ")?,
            Severity::Warning => write!(f, "WARNING: ")?,
            Severity::Violation => {}
        }
        write!(
            f,
            "{} failed for {}: {}",
            self.check, self.subject, self.message
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn violation_display() {
        let f = Finding::violation(Check::HierarchyLoop, "ns:A", "superclass chain revisits ns:A");
        assert_eq!(
            f.to_string(),
            "HierarchyLoopCheck failed for ns:A: superclass chain revisits ns:A"
        );
        assert!(!f.is_abort());
    }

    #[test]
    fn abort_display_is_marked() {
        let f = Finding::abort(Check::ObjectClass, "obj-1", "object has no class");
        assert!(f.to_string().starts_with("ABORT: ClassCheck failed"));
        assert!(f.is_abort());
    }

    #[test]
    fn warning_display_is_marked() {
        let f = Finding::warning(Check::Aspects, "ns:A", "aspects are null");
        assert!(f.to_string().starts_with("WARNING: "));
    }

    #[test]
    fn finding_serializes() {
        let f = Finding::violation(Check::Attribution, "ns:C", "unexplained ns:x");
        let json = serde_json::to_string(&f).unwrap();
        assert!(json.contains("\"Attribution\""));
        let back: Finding = serde_json::from_str(&json).unwrap();
        assert_eq!(back, f);
    }
}
