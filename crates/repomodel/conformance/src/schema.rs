//! Expected shapes of well-known classes.
//!
//! The table is data: it is deserialized from JSON and compared against a
//! repository. Each missing class, missing property or differing attribute
//! yields one finding.

use crate::error::ConformanceResult;
use crate::finding::{Check, Finding};
use repomodel_types::{ClassDescriptor, DataType, PropertyInfo, QName, Repository};
use serde::{Deserialize, Serialize};
use std::fmt;

const STANDARD_SCHEMA: &str = include_str!("../fixtures/standard_schema.json");

/// Expected shape of one property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectedProperty {
    pub qname: QName,
    pub data_type: DataType,
    #[serde(default)]
    pub multi_value: bool,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_only: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_class: Option<QName>,
}

/// Expected shape of one class. Unset fields are not checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectedClass {
    pub qname: QName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub super_class: Option<QName>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instantiable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aspect: Option<bool>,
    #[serde(default)]
    pub properties: Vec<ExpectedProperty>,
}

/// A table of expected class shapes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaTable {
    pub classes: Vec<ExpectedClass>,
}

impl SchemaTable {
    /// Parse a table from JSON.
    pub fn from_json(json: &str) -> ConformanceResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// The bundled table for the standard content model.
    pub fn standard() -> ConformanceResult<Self> {
        Self::from_json(STANDARD_SCHEMA)
    }

    /// Number of class assertions.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Number of property assertions in the table.
    pub fn property_count(&self) -> usize {
        self.classes.iter().map(|c| c.properties.len()).sum()
    }

    /// Compare every expected class with the repository.
    pub fn check(&self, repository: &dyn Repository) -> Vec<Finding> {
        let mut findings = Vec::new();
        for expected in &self.classes {
            let subject = expected.qname.to_string();
            match repository.class(&expected.qname) {
                None => findings.push(Finding::violation(
                    Check::Schema,
                    &subject,
                    format!("class {subject} is missing from the repository"),
                )),
                Some(cls) => check_class(expected, cls.as_ref(), &subject, &mut findings),
            }
        }
        findings
    }
}

fn mismatch(
    findings: &mut Vec<Finding>,
    subject: &str,
    what: fmt::Arguments<'_>,
    expected: impl fmt::Display,
    actual: impl fmt::Display,
) {
    findings.push(Finding::violation(
        Check::Schema,
        subject,
        format!("{what}: expected {expected}, found {actual}"),
    ));
}

fn or_none(qname: Option<QName>) -> String {
    qname.map(|q| q.to_string()).unwrap_or_else(|| "<none>".to_string())
}

fn check_class(
    expected: &ExpectedClass,
    cls: &dyn ClassDescriptor,
    subject: &str,
    findings: &mut Vec<Finding>,
) {
    if let Some(sup) = &expected.super_class {
        let actual = cls.super_class().and_then(|s| s.qname());
        if actual.as_ref() != Some(sup) {
            mismatch(findings, subject, format_args!("superclass"), sup, or_none(actual));
        }
    }
    if let Some(instantiable) = expected.instantiable {
        if cls.is_instantiable() != instantiable {
            mismatch(
                findings,
                subject,
                format_args!("instantiable"),
                instantiable,
                cls.is_instantiable(),
            );
        }
    }
    if let Some(aspect) = expected.aspect {
        if cls.is_aspect() != aspect {
            mismatch(findings, subject, format_args!("aspect"), aspect, cls.is_aspect());
        }
    }

    let Some(properties) = cls.properties() else {
        findings.push(Finding::violation(
            Check::Schema,
            subject,
            "properties cannot be enumerated",
        ));
        return;
    };
    for ep in &expected.properties {
        match properties.iter().find(|p| p.qname == ep.qname) {
            None => findings.push(Finding::violation(
                Check::Schema,
                subject,
                format!("property {} is missing", ep.qname),
            )),
            Some(pi) => check_property(ep, pi, subject, findings),
        }
    }
}

fn check_property(ep: &ExpectedProperty, pi: &PropertyInfo, subject: &str, findings: &mut Vec<Finding>) {
    let q = &ep.qname;
    if pi.data_type != ep.data_type {
        mismatch(findings, subject, format_args!("dataType of {q}"), ep.data_type, pi.data_type);
    }
    if pi.multi_value != ep.multi_value {
        mismatch(findings, subject, format_args!("multiValue of {q}"), ep.multi_value, pi.multi_value);
    }
    if pi.required != ep.required {
        mismatch(findings, subject, format_args!("required of {q}"), ep.required, pi.required);
    }
    if let Some(read_only) = ep.read_only {
        if pi.read_only != read_only {
            mismatch(findings, subject, format_args!("readOnly of {q}"), read_only, pi.read_only);
        }
    }
    if let Some(system) = ep.system {
        if pi.system != system {
            mismatch(findings, subject, format_args!("system of {q}"), system, pi.system);
        }
    }
    if let Some(target) = &ep.reference_class {
        let actual = pi.reference_class_qname();
        if actual.as_ref() != Some(target) {
            mismatch(
                findings,
                subject,
                format_args!("referenceClass of {q}"),
                target,
                or_none(actual),
            );
        }
    }
}
