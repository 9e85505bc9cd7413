//! Aspect and property resolution.
//!
//! Computes which properties a class inherits from its superclass and which
//! it imports from its aspects, and decides when a declared property may
//! override an inherited one. Aspects are merged flat: a property name may
//! be contributed by only one aspect unless the aspects involved are the
//! same aspect or one extends the other.

use crate::config::{MatchLevel, VerifierConfig};
use crate::differ::{self, DiffOptions};
use crate::finding::{Check, Finding};
use repomodel_types::{ClassDescriptor, ClassRef, DataType, PropertyInfo, QName};
use std::collections::{HashMap, HashSet};

/// Insertion-ordered map keyed by property name. The first entry for a
/// name wins.
#[derive(Debug, Clone)]
pub struct PropertyMap<T> {
    entries: Vec<(QName, T)>,
    index: HashMap<QName, usize>,
}

impl<T> Default for PropertyMap<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T> PropertyMap<T> {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert unless present. Returns `false` if `qname` was already mapped.
    pub fn insert(&mut self, qname: QName, value: T) -> bool {
        if self.index.contains_key(&qname) {
            return false;
        }
        self.index.insert(qname.clone(), self.entries.len());
        self.entries.push((qname, value));
        true
    }

    /// The entry for `qname`, if any.
    pub fn get(&self, qname: &QName) -> Option<&T> {
        self.index.get(qname).map(|&i| &self.entries[i].1)
    }

    pub fn contains(&self, qname: &QName) -> bool {
        self.index.contains_key(qname)
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&QName, &T)> {
        self.entries.iter().map(|(q, v)| (q, v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A property imported from an aspect.
#[derive(Clone)]
pub struct AspectProperty {
    pub info: PropertyInfo,
    /// The aspect that contributed it first.
    pub aspect: QName,
    /// Whether that aspect is already carried by the superclass.
    pub inherited: bool,
    source: ClassRef,
}

impl std::fmt::Debug for AspectProperty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AspectProperty")
            .field("qname", &self.info.qname)
            .field("aspect", &self.aspect)
            .field("inherited", &self.inherited)
            .finish()
    }
}

/// Inherited property sets of one class.
#[derive(Debug, Default)]
pub struct Resolution {
    pub super_props: PropertyMap<PropertyInfo>,
    pub aspect_props: PropertyMap<AspectProperty>,
    pub findings: Vec<Finding>,
}

/// Whether `class` is the class named `target` or extends it through its
/// superclass chain. Aspects are not followed. Stops on a superclass loop.
pub fn is_or_extends(target: &QName, class: &dyn ClassDescriptor) -> bool {
    let Some(start) = class.qname() else {
        return false;
    };
    if &start == target {
        return true;
    }
    let mut seen = HashSet::from([start]);
    let mut current = class.super_class();
    while let Some(c) = current {
        let Some(q) = c.qname() else {
            return false;
        };
        if &q == target {
            return true;
        }
        if !seen.insert(q) {
            return false;
        }
        current = c.super_class();
    }
    false
}

fn related(a: &dyn ClassDescriptor, b: &dyn ClassDescriptor) -> bool {
    match (a.qname(), b.qname()) {
        (Some(qa), Some(qb)) => is_or_extends(&qa, b) || is_or_extends(&qb, a),
        _ => false,
    }
}

/// Build the superclass and aspect property maps of `cls`.
pub fn resolve(cls: &dyn ClassDescriptor, subject: &str) -> Resolution {
    let mut resolution = Resolution::default();
    let super_class = cls.super_class();

    if let Some(sup) = &super_class {
        let sup_name = sup
            .qname()
            .map(|q| q.to_string())
            .unwrap_or_else(|| "<unnamed superclass>".to_string());
        for pi in sup.properties().unwrap_or_default() {
            let qname = pi.qname.clone();
            if !resolution.super_props.insert(qname.clone(), pi) {
                resolution.findings.push(Finding::violation(
                    Check::DuplicateProperty,
                    subject,
                    format!("superclass {sup_name} lists property {qname} more than once"),
                ));
            }
        }
    }

    let super_aspects: Vec<QName> = super_class
        .as_ref()
        .and_then(|sup| sup.aspects())
        .unwrap_or_default()
        .iter()
        .filter_map(|a| a.qname())
        .collect();

    for aspect in cls.aspects().unwrap_or_default() {
        let Some(aspect_name) = aspect.qname() else {
            continue;
        };
        let inherited = super_aspects
            .iter()
            .any(|sa| is_or_extends(sa, aspect.as_ref()));

        for pi in aspect.properties().unwrap_or_default() {
            if let Some(existing) = resolution.aspect_props.get(&pi.qname) {
                if existing.aspect != aspect_name
                    && !related(existing.source.as_ref(), aspect.as_ref())
                {
                    resolution.findings.push(Finding::violation(
                        Check::AspectConflict,
                        subject,
                        format!(
                            "property {} of aspect {} conflicts with the same property of aspect {}",
                            pi.qname, aspect_name, existing.aspect
                        ),
                    ));
                }
                continue;
            }
            if !inherited && resolution.super_props.contains(&pi.qname) {
                resolution.findings.push(Finding::violation(
                    Check::AspectSuperConflict,
                    subject,
                    format!(
                        "aspect import conflicts with inherited superclass property: {} from aspect {}",
                        pi.qname, aspect_name
                    ),
                ));
            }
            resolution.aspect_props.insert(
                pi.qname.clone(),
                AspectProperty {
                    info: pi,
                    aspect: aspect_name.clone(),
                    inherited,
                    source: aspect.clone(),
                },
            );
        }
    }

    resolution
}

/// Check a declared property that shares its name with a superclass
/// property. Only REFERENCE properties may be overridden, and only by
/// narrowing the target class as the match level allows.
pub fn check_override(
    subject: &str,
    declared: &PropertyInfo,
    inherited: &PropertyInfo,
    config: &VerifierConfig,
) -> Option<Finding> {
    let qname = &declared.qname;
    if declared.data_type != DataType::Reference || inherited.data_type != DataType::Reference {
        return Some(Finding::violation(
            Check::PropertyOverride,
            subject,
            format!(
                "declared property {qname} redefines an inherited {} property as {}; only REFERENCE properties may be overridden",
                inherited.data_type, declared.data_type
            ),
        ));
    }

    let options = DiffOptions::new(
        config.strict_match,
        config.reference_match == MatchLevel::Exact,
    );
    if let Some(mismatch) = differ::diff(declared, inherited, options) {
        return Some(Finding::violation(
            Check::PropertyOverride,
            subject,
            format!("declared property {qname} is incompatible with the inherited one: {mismatch}"),
        ));
    }

    if config.reference_match != MatchLevel::IsOrExtends {
        return None;
    }
    let message = match (&declared.reference_class, inherited.reference_class_qname()) {
        (None, _) => format!("declared property {qname} has no reference class"),
        (_, None) => format!("inherited property {qname} has no reference class"),
        (Some(target), Some(inherited_target)) => {
            if is_or_extends(&inherited_target, target.as_ref()) {
                return None;
            }
            format!(
                "declared property {qname} targets {} which does not extend inherited target {inherited_target}",
                declared
                    .reference_class_qname()
                    .map(|q| q.to_string())
                    .unwrap_or_else(|| "<unnamed class>".to_string())
            )
        }
    };
    Some(Finding::violation(Check::PropertyOverride, subject, message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use repomodel_memory::{ClassSpec, InMemoryRepository, ModelBuilder, PropertySpec};
    use repomodel_types::Repository;

    fn q(s: &str) -> QName {
        s.parse().unwrap()
    }

    fn class(repo: &InMemoryRepository, name: &str) -> ClassRef {
        repo.class(&q(name)).unwrap()
    }

    fn targets() -> Vec<ClassSpec> {
        vec![
            ClassSpec::new(q("cm:document")),
            ClassSpec::new(q("cm:pdf")).extends(q("cm:document")),
            ClassSpec::new(q("cm:folder")),
        ]
    }

    #[test]
    fn property_map_keeps_first_entry_in_order() {
        let mut map = PropertyMap::new();
        assert!(map.insert(q("ns:b"), 1));
        assert!(map.insert(q("ns:a"), 2));
        assert!(!map.insert(q("ns:b"), 3));
        assert_eq!(map.get(&q("ns:b")), Some(&1));
        let order: Vec<_> = map.iter().map(|(k, _)| k.to_string()).collect();
        assert_eq!(order, vec!["ns:b", "ns:a"]);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn is_or_extends_walks_superclass_chain_only() {
        let repo = ModelBuilder::new("t")
            .class(ClassSpec::aspect(q("ns:X")))
            .class(ClassSpec::new(q("ns:A")))
            .class(ClassSpec::new(q("ns:B")).extends(q("ns:A")).with_aspect(q("ns:X")))
            .class(ClassSpec::new(q("ns:C")).extends(q("ns:B")))
            .build()
            .unwrap();
        let c = class(&repo, "ns:C");
        assert!(is_or_extends(&q("ns:C"), c.as_ref()));
        assert!(is_or_extends(&q("ns:A"), c.as_ref()));
        assert!(!is_or_extends(&q("ns:X"), c.as_ref()));
        assert!(!is_or_extends(&q("ns:C"), class(&repo, "ns:A").as_ref()));
    }

    #[test]
    fn is_or_extends_terminates_on_loop() {
        let repo = ModelBuilder::new("t")
            .class(ClassSpec::new(q("ns:A")).extends(q("ns:B")))
            .class(ClassSpec::new(q("ns:B")).extends(q("ns:A")))
            .build()
            .unwrap();
        assert!(!is_or_extends(&q("ns:Z"), class(&repo, "ns:A").as_ref()));
    }

    #[test]
    fn resolve_collects_super_and_aspect_properties() {
        let repo = ModelBuilder::new("t")
            .class(ClassSpec::aspect(q("ns:X")).declare(PropertySpec::new(q("ns:x"), DataType::String)))
            .class(ClassSpec::new(q("ns:Base")).declare(PropertySpec::new(q("ns:a"), DataType::String)))
            .class(ClassSpec::new(q("ns:C")).extends(q("ns:Base")).with_aspect(q("ns:X")))
            .build()
            .unwrap();
        let r = resolve(class(&repo, "ns:C").as_ref(), "ns:C");
        assert!(r.findings.is_empty(), "{:?}", r.findings);
        assert!(r.super_props.contains(&q("ns:a")));
        let x = r.aspect_props.get(&q("ns:x")).unwrap();
        assert_eq!(x.aspect, q("ns:X"));
        assert!(!x.inherited);
    }

    #[test]
    fn unrelated_aspects_sharing_a_name_conflict() {
        let repo = ModelBuilder::new("t")
            .class(ClassSpec::aspect(q("ns:X")).declare(PropertySpec::new(q("ns:q"), DataType::String)))
            .class(ClassSpec::aspect(q("ns:Y")).declare(PropertySpec::new(q("ns:q"), DataType::String)))
            .class(ClassSpec::new(q("ns:C")).with_aspect(q("ns:X")).with_aspect(q("ns:Y")))
            .build()
            .unwrap();
        let r = resolve(class(&repo, "ns:C").as_ref(), "ns:C");
        assert_eq!(r.findings.len(), 1);
        assert_eq!(r.findings[0].check, Check::AspectConflict);
        assert_eq!(r.aspect_props.get(&q("ns:q")).unwrap().aspect, q("ns:X"));
    }

    #[test]
    fn narrowing_aspects_do_not_conflict() {
        let repo = ModelBuilder::new("t")
            .class(ClassSpec::aspect(q("ns:X")).declare(PropertySpec::new(q("ns:q"), DataType::String)))
            .class(ClassSpec::aspect(q("ns:X2")).extends(q("ns:X")))
            .class(ClassSpec::new(q("ns:C")).with_aspect(q("ns:X")).with_aspect(q("ns:X2")))
            .build()
            .unwrap();
        let r = resolve(class(&repo, "ns:C").as_ref(), "ns:C");
        assert!(r.findings.is_empty(), "{:?}", r.findings);
    }

    #[test]
    fn aspect_import_colliding_with_superclass_property() {
        let repo = ModelBuilder::new("t")
            .class(ClassSpec::aspect(q("ns:X")).declare(PropertySpec::new(q("ns:a"), DataType::String)))
            .class(ClassSpec::new(q("ns:Base")).declare(PropertySpec::new(q("ns:a"), DataType::String)))
            .class(ClassSpec::new(q("ns:C")).extends(q("ns:Base")).with_aspect(q("ns:X")))
            .build()
            .unwrap();
        let r = resolve(class(&repo, "ns:C").as_ref(), "ns:C");
        assert_eq!(r.findings.len(), 1);
        assert_eq!(r.findings[0].check, Check::AspectSuperConflict);
    }

    #[test]
    fn aspect_relisted_from_superclass_is_inherited() {
        let repo = ModelBuilder::new("t")
            .class(ClassSpec::aspect(q("ns:X")).declare(PropertySpec::new(q("ns:x"), DataType::String)))
            .class(ClassSpec::new(q("ns:Base")).with_aspect(q("ns:X")))
            .class(ClassSpec::new(q("ns:C")).extends(q("ns:Base")).with_aspect(q("ns:X")))
            .build()
            .unwrap();
        let r = resolve(class(&repo, "ns:C").as_ref(), "ns:C");
        assert!(r.findings.is_empty(), "{:?}", r.findings);
        assert!(r.aspect_props.get(&q("ns:x")).unwrap().inherited);
    }

    #[test]
    fn duplicate_superclass_property_is_reported() {
        let dup = PropertySpec::new(q("ns:a"), DataType::String);
        let repo = ModelBuilder::new("t")
            .class(ClassSpec::new(q("ns:Base")).with_effective(vec![dup.clone(), dup]))
            .class(ClassSpec::new(q("ns:C")).extends(q("ns:Base")))
            .build()
            .unwrap();
        let r = resolve(class(&repo, "ns:C").as_ref(), "ns:C");
        assert_eq!(r.findings.len(), 1);
        assert_eq!(r.findings[0].check, Check::DuplicateProperty);
    }

    fn reference(repo: &InMemoryRepository, target: &str) -> PropertyInfo {
        PropertyInfo::new(q("ns:p"), DataType::Reference).with_reference_class(class(repo, target))
    }

    #[test]
    fn override_matrix() {
        let repo = ModelBuilder::new("t").classes(targets()).build().unwrap();
        let inherited = reference(&repo, "cm:document");
        let same = reference(&repo, "cm:document");
        let narrower = reference(&repo, "cm:pdf");
        let unrelated = reference(&repo, "cm:folder");
        let string = PropertyInfo::new(q("ns:p"), DataType::String);

        let exact = VerifierConfig::default().with_reference_match(MatchLevel::Exact);
        let is_or_extends = VerifierConfig::default();
        let any = VerifierConfig::default().with_reference_match(MatchLevel::Any);

        assert!(check_override("ns:C", &same, &inherited, &exact).is_none());
        assert!(check_override("ns:C", &narrower, &inherited, &is_or_extends).is_none());
        assert!(check_override("ns:C", &narrower, &inherited, &exact).is_some());
        assert!(check_override("ns:C", &unrelated, &inherited, &is_or_extends).is_some());
        assert!(check_override("ns:C", &unrelated, &inherited, &any).is_none());
        for cfg in [&exact, &is_or_extends, &any] {
            let f = check_override("ns:C", &string, &inherited, cfg).unwrap();
            assert_eq!(f.check, Check::PropertyOverride);
        }
    }

    #[test]
    fn widening_override_is_rejected() {
        let repo = ModelBuilder::new("t").classes(targets()).build().unwrap();
        let inherited = reference(&repo, "cm:pdf");
        let wider = reference(&repo, "cm:document");
        let f = check_override("ns:C", &wider, &inherited, &VerifierConfig::default()).unwrap();
        assert!(f.message.contains("does not extend"));
    }

    #[test]
    fn override_flags_respect_strictness() {
        let repo = ModelBuilder::new("t").classes(targets()).build().unwrap();
        let inherited = reference(&repo, "cm:document");
        let required = reference(&repo, "cm:pdf").required();
        assert!(check_override("ns:C", &required, &inherited, &VerifierConfig::default()).is_some());
        let lenient = VerifierConfig::default().with_strict_match(false);
        assert!(check_override("ns:C", &required, &inherited, &lenient).is_none());
    }
}
