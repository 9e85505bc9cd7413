//! Class hierarchy verification.
//!
//! A class is checked first as an object, then for its own metadata, the
//! consistency of its superclass and subclass pointers, acyclicity of its
//! superclass chain, and finally whether its effective property set is
//! fully explained by declared, superclass and aspect properties.
//!
//! Only the superclass chain is probed for loops. A class whose class is
//! itself (the metaclass) has no superclass loop and is bounded by the
//! visit guard instead.

use crate::baseline;
use crate::config::MatchLevel;
use crate::differ::{self, DiffOptions};
use crate::finding::{Check, Finding};
use crate::resolution::{self, is_or_extends, PropertyMap, Resolution};
use crate::verifier::Session;
use repomodel_types::{ClassDescriptor, ClassRef, PropertyInfo, QName};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Check one class and recurse into its superclass and aspects.
pub(crate) fn verify_class(cls: &dyn ClassDescriptor, session: &mut Session<'_>) -> Vec<Finding> {
    let subject = cls
        .qname()
        .map(|q| q.to_string())
        .or_else(|| cls.name())
        .unwrap_or_else(|| "<unnamed class>".to_string());
    debug!(class = %subject, "Verifying class");

    // Entered by name before the baseline so that a class which is its own
    // class terminates even when it has no id.
    let qname = cls.qname();
    match &qname {
        Some(q) if !session.guard.enter_class(q) => {
            debug!(class = %subject, "Class already visited, stopping branch");
            return Vec::new();
        }
        Some(_) => {}
        None if cls.id().is_none() => {
            let findings = vec![Finding::violation(Check::ObjectId, &subject, "object has no id")];
            return abort(
                findings,
                Check::ClassQName,
                &subject,
                "class has neither id nor qualified name",
            );
        }
        None => {}
    }

    let mut findings = baseline::verify_object(cls.as_object(), session);
    if !findings.is_empty() {
        warn!(class = %subject, findings = findings.len(), "Class baseline failed, aborting");
        findings.push(Finding::abort(Check::Baseline, &subject, "baseline failed"));
        return findings;
    }

    if cls.name().is_none() {
        findings.push(Finding::violation(Check::ClassName, &subject, "class has no name"));
    }
    if cls.namespace().is_none() {
        findings.push(Finding::violation(
            Check::ClassNamespace,
            &subject,
            "class has no namespace",
        ));
    }
    let Some(qname) = qname else {
        return abort(findings, Check::ClassQName, &subject, "class has no qualified name");
    };

    let properties = match cls.properties() {
        None => return abort(findings, Check::ClassProperties, &subject, "properties are null"),
        Some(p) if p.is_empty() => {
            return abort(findings, Check::ClassProperties, &subject, "properties are empty")
        }
        Some(p) => p,
    };
    let Some(declared) = cls.declared_properties() else {
        return abort(
            findings,
            Check::DeclaredProperties,
            &subject,
            "declared properties are null",
        );
    };
    let aspects = cls.aspects();
    match &aspects {
        None => findings.push(Finding::warning(Check::Aspects, &subject, "aspects are null")),
        Some(list) if cls.is_aspect() && !list.is_empty() => findings.push(Finding::violation(
            Check::FlatAspects,
            &subject,
            format!("aspect declares {} aspects of its own", list.len()),
        )),
        Some(_) => {}
    }

    let super_class = cls.super_class();
    let mut loop_found = false;
    if let Some(sup) = &super_class {
        let sup_name = display_name(sup);
        if sup.is_aspect() != cls.is_aspect() {
            findings.push(Finding::violation(
                Check::AspectFlag,
                &subject,
                format!(
                    "aspect flag {} differs from superclass {sup_name} ({})",
                    cls.is_aspect(),
                    sup.is_aspect()
                ),
            ));
        }
        let listed = sup
            .sub_classes()
            .iter()
            .any(|sub| sub.qname().as_ref() == Some(&qname));
        if !listed {
            findings.push(Finding::violation(
                Check::SuperSubConsistency,
                &subject,
                format!("superclass {sup_name} does not list {qname} as a subclass"),
            ));
        }
        if let Some(finding) = probe_superclass_loop(cls, &qname, &subject) {
            loop_found = true;
            findings.push(finding);
        }
    }

    for sub in cls.sub_classes() {
        let back = sub.super_class().and_then(|s| s.qname());
        if back.as_ref() != Some(&qname) {
            findings.push(Finding::violation(
                Check::SubSuperConsistency,
                &subject,
                format!(
                    "subclass {} has superclass {} instead of {qname}",
                    display_name(&sub),
                    back.map(|q| q.to_string()).unwrap_or_else(|| "<none>".to_string())
                ),
            ));
        }
    }

    let resolution = resolution::resolve(cls, &subject);
    check_property_sets(&subject, &properties, &declared, &resolution, session, &mut findings);
    findings.extend(resolution.findings);

    if let Some(sup) = &super_class {
        let own = aspects.clone().unwrap_or_default();
        for inherited in sup.aspects().unwrap_or_default() {
            let Some(inherited_name) = inherited.qname() else {
                continue;
            };
            let relisted = own.iter().any(|a| is_or_extends(&inherited_name, a.as_ref()));
            if !relisted {
                findings.push(Finding::violation(
                    Check::InheritedAspect,
                    &subject,
                    format!(
                        "aspect {inherited_name} of superclass {} is not re-listed",
                        display_name(sup)
                    ),
                ));
            }
        }
    }

    if let Some(sup) = &super_class {
        if !loop_found {
            findings.extend(verify_class(sup.as_ref(), session));
        }
    }
    for aspect in aspects.unwrap_or_default() {
        findings.extend(verify_class(aspect.as_ref(), session));
    }
    findings
}

fn abort(mut findings: Vec<Finding>, check: Check, subject: &str, message: &str) -> Vec<Finding> {
    warn!(class = %subject, check = %check, "{message}, aborting");
    findings.push(Finding::abort(check, subject, message));
    findings
}

fn display_name(cls: &ClassRef) -> String {
    cls.qname()
        .map(|q| q.to_string())
        .unwrap_or_else(|| "<unnamed class>".to_string())
}

/// Walk the superclass chain from `cls` with a seen-set local to this walk.
fn probe_superclass_loop(cls: &dyn ClassDescriptor, qname: &QName, subject: &str) -> Option<Finding> {
    let mut seen = HashSet::from([qname.clone()]);
    let mut current = cls.super_class();
    while let Some(c) = current {
        let q = c.qname()?;
        if !seen.insert(q.clone()) {
            return Some(Finding::violation(
                Check::HierarchyLoop,
                subject,
                format!("superclass chain of {qname} revisits {q}"),
            ));
        }
        current = c.super_class();
    }
    None
}

fn check_property_sets(
    subject: &str,
    properties: &[PropertyInfo],
    declared: &[PropertyInfo],
    resolution: &Resolution,
    session: &Session<'_>,
    findings: &mut Vec<Finding>,
) {
    let config = session.config;
    let mut effective = PropertyMap::new();
    for pi in properties {
        if !effective.insert(pi.qname.clone(), pi) {
            findings.push(Finding::violation(
                Check::DuplicateProperty,
                subject,
                format!("properties list {} more than once", pi.qname),
            ));
        }
    }
    let mut declared_names = HashSet::new();

    for d in declared {
        declared_names.insert(&d.qname);
        if let Some(inherited) = resolution.super_props.get(&d.qname) {
            if let Some(finding) = resolution::check_override(subject, d, inherited, config) {
                findings.push(finding);
            }
        }
        if let Some(from_aspect) = resolution.aspect_props.get(&d.qname) {
            findings.push(Finding::violation(
                Check::DeclaredConflict,
                subject,
                format!(
                    "declared property {} conflicts with the same property of aspect {}",
                    d.qname, from_aspect.aspect
                ),
            ));
        }
        match effective.get(&d.qname) {
            None => findings.push(Finding::violation(
                Check::DeclaredShape,
                subject,
                format!("declared property {} is missing from properties", d.qname),
            )),
            Some(eff) => {
                if let Some(mismatch) = differ::diff(d, eff, DiffOptions::STRICT) {
                    findings.push(Finding::violation(
                        Check::DeclaredShape,
                        subject,
                        format!("declared property does not match effective property: {mismatch}"),
                    ));
                }
            }
        }
    }

    let inherited_options = DiffOptions::new(
        config.strict_match,
        config.reference_match != MatchLevel::Any,
    );
    let inherited = resolution
        .super_props
        .iter()
        .chain(
            resolution
                .aspect_props
                .iter()
                .filter(|(q, _)| !resolution.super_props.contains(q))
                .map(|(q, ap)| (q, &ap.info)),
        );
    for (qname, pi) in inherited {
        if declared_names.contains(qname) {
            continue;
        }
        match effective.get(qname) {
            None => findings.push(Finding::violation(
                Check::InheritedShape,
                subject,
                format!("inherited property {qname} is missing from properties"),
            )),
            Some(eff) => {
                if let Some(mismatch) = differ::diff(pi, eff, inherited_options) {
                    findings.push(Finding::violation(
                        Check::InheritedShape,
                        subject,
                        format!("inherited property does not match effective property: {mismatch}"),
                    ));
                }
            }
        }
    }

    for (qname, _) in effective.iter() {
        let explained = declared_names.contains(qname)
            || resolution.super_props.contains(qname)
            || resolution.aspect_props.contains(qname);
        if !explained {
            findings.push(Finding::violation(
                Check::Attribution,
                subject,
                format!("property {qname} is not explained by declared, superclass or aspect properties"),
            ));
        }
    }
}
