//! Object baseline checks.
//!
//! The minimal contract every object (classes included) satisfies: it has an
//! id, a guid, a repository and a class, and it answers every property of
//! its class with a value of the declared shape.

use crate::finding::{Check, Finding};
use crate::hierarchy;
use crate::verifier::Session;
use repomodel_types::{DataType, ModelError, ModelObject, PropertyInfo, PropertyValue, QName};
use std::collections::HashSet;
use tracing::{debug, warn};

const UNIDENTIFIED: &str = "<object without id>";

/// Check one object and recurse into its class.
pub(crate) fn verify_object(obj: &dyn ModelObject, session: &mut Session<'_>) -> Vec<Finding> {
    let mut findings = Vec::new();
    let id = obj.id();
    let subject = id
        .as_ref()
        .map(|id| id.to_string())
        .unwrap_or_else(|| UNIDENTIFIED.to_string());
    debug!(object = %subject, kind = ?obj.kind(), "Verifying object baseline");

    match &id {
        None => findings.push(Finding::violation(Check::ObjectId, &subject, "object has no id")),
        Some(id) => {
            if !session.guard.enter_object(id) {
                debug!(object = %subject, "Object already visited, stopping branch");
                return findings;
            }
        }
    }

    if obj.guid().is_none() {
        findings.push(Finding::violation(Check::ObjectGuid, &subject, "object has no guid"));
    }
    if obj.repository().is_none() {
        findings.push(Finding::violation(
            Check::ObjectRepository,
            &subject,
            "object has no repository",
        ));
    }

    let Some(class) = obj.class() else {
        warn!(object = %subject, "Object has no class, aborting");
        findings.push(Finding::abort(Check::ObjectClass, &subject, "object has no class"));
        return findings;
    };
    let class_name = class
        .qname()
        .map(|q| q.to_string())
        .unwrap_or_else(|| "<unnamed class>".to_string());

    let Some(properties) = class.properties() else {
        warn!(object = %subject, class = %class_name, "Class properties unavailable, aborting");
        findings.push(Finding::abort(
            Check::ClassProperties,
            &subject,
            format!("properties of class {class_name} cannot be enumerated"),
        ));
        return findings;
    };

    if !class.is_instantiable() {
        findings.push(Finding::warning(
            Check::Instantiable,
            &subject,
            format!("object is an instance of non-instantiable class {class_name}"),
        ));
    }
    if class.is_aspect() {
        findings.push(Finding::warning(
            Check::AspectInstance,
            &subject,
            format!("object is an instance of aspect {class_name}"),
        ));
    }

    let mut readable: Vec<&QName> = Vec::new();
    for pi in &properties {
        match obj.property(&pi.qname) {
            Ok(value) => {
                readable.push(&pi.qname);
                check_value(&subject, pi, &value, &mut findings);
            }
            Err(ModelError::NotFound(_)) => findings.push(Finding::violation(
                Check::PropertyPresent,
                &subject,
                format!("Missing property {}", pi.qname),
            )),
            Err(e) => findings.push(Finding::violation(
                Check::PropertyPresent,
                &subject,
                format!("property {} cannot be read: {e}", pi.qname),
            )),
        }
    }

    if obj.available_properties_complete() {
        let available: HashSet<QName> = obj.available_properties().collect();
        for qname in readable {
            if !available.contains(qname) {
                findings.push(Finding::violation(
                    Check::AvailableProperties,
                    &subject,
                    format!("property {qname} is missing from the complete list of available properties"),
                ));
            }
        }
    }

    findings.extend(hierarchy::verify_class(class.as_ref(), session));
    findings
}

fn check_value(subject: &str, pi: &PropertyInfo, value: &PropertyValue, findings: &mut Vec<Finding>) {
    let qname = &pi.qname;
    if value.data_type != pi.data_type {
        findings.push(Finding::violation(
            Check::PropertyType,
            subject,
            format!(
                "property {qname} has type {} but its class declares {}",
                value.data_type, pi.data_type
            ),
        ));
    }
    if value.multi_value != pi.multi_value {
        findings.push(Finding::violation(
            Check::Cardinality,
            subject,
            format!(
                "property {qname} has multiValue={} but its class declares multiValue={}",
                value.multi_value, pi.multi_value
            ),
        ));
    }
    if !pi.required {
        return;
    }
    if value.value.is_null() {
        findings.push(Finding::violation(
            Check::RequiredValue,
            subject,
            format!("required property {qname} has no value"),
        ));
        return;
    }
    if !pi.multi_value {
        return;
    }

    // Cast failures and empty collections are separate findings.
    let len = if pi.data_type == DataType::Reference {
        match value.reference_iterable() {
            Ok(ids) => ids.len(),
            Err(e) => {
                findings.push(Finding::violation(
                    Check::PropertyType,
                    subject,
                    format!("references of required property {qname} cannot be iterated: {e}"),
                ));
                return;
            }
        }
    } else {
        match value.value.as_list() {
            Some(items) => items.len(),
            None => {
                findings.push(Finding::violation(
                    Check::PropertyType,
                    subject,
                    format!("value of required multi-valued property {qname} is not a list"),
                ));
                return;
            }
        }
    };
    if len == 0 {
        findings.push(Finding::violation(
            Check::RequiredValue,
            subject,
            format!("required multi-valued property {qname} is empty"),
        ));
    }
}
