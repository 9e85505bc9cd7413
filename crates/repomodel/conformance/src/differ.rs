//! Structural comparison of two property descriptors.

use repomodel_types::{DataType, ObjectId, PropertyInfo, QName};
use std::collections::HashSet;
use std::fmt;

/// Which attributes [`diff`] compares beyond the always-compared ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiffOptions {
    /// Also compare display name, required, read-only, hidden and system.
    pub strict: bool,
    /// For REFERENCE properties, require both target classes and compare
    /// their qualified names.
    pub check_reference_class: bool,
}

impl DiffOptions {
    /// Every attribute, including reference targets.
    pub const STRICT: DiffOptions = DiffOptions {
        strict: true,
        check_reference_class: true,
    };

    pub fn new(strict: bool, check_reference_class: bool) -> Self {
        Self {
            strict,
            check_reference_class,
        }
    }
}

/// First attribute found to differ between two descriptors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyMismatch {
    pub qname: QName,
    pub attribute: &'static str,
    pub left: String,
    pub right: String,
}

impl PropertyMismatch {
    fn new(qname: &QName, attribute: &'static str, left: impl fmt::Display, right: impl fmt::Display) -> Self {
        Self {
            qname: qname.clone(),
            attribute,
            left: left.to_string(),
            right: right.to_string(),
        }
    }
}

impl fmt::Display for PropertyMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} of {} differs: {} vs {}",
            self.attribute, self.qname, self.left, self.right
        )
    }
}

fn compare<T: PartialEq + fmt::Display>(
    qname: &QName,
    attribute: &'static str,
    left: T,
    right: T,
) -> Option<PropertyMismatch> {
    (left != right).then(|| PropertyMismatch::new(qname, attribute, left, right))
}

/// Compare `a` against `b` and report the first differing attribute.
///
/// Name, namespace, qualified name, data type, cardinality and the choice
/// list are always compared. Choice lists compare by presence and then as
/// sets of choice ids. Reference targets are compared by qualified name
/// only; narrowing rules are applied by callers.
pub fn diff(a: &PropertyInfo, b: &PropertyInfo, options: DiffOptions) -> Option<PropertyMismatch> {
    let q = &a.qname;
    compare(q, "name", &a.name, &b.name)
        .or_else(|| compare(q, "namespace", &a.namespace, &b.namespace))
        .or_else(|| compare(q, "qname", &a.qname, &b.qname))
        .or_else(|| compare(q, "dataType", a.data_type, b.data_type))
        .or_else(|| compare(q, "multiValue", a.multi_value, b.multi_value))
        .or_else(|| {
            if !options.strict {
                return None;
            }
            compare(q, "displayName", &a.display_name, &b.display_name)
                .or_else(|| compare(q, "required", a.required, b.required))
                .or_else(|| compare(q, "readOnly", a.read_only, b.read_only))
                .or_else(|| compare(q, "hidden", a.hidden, b.hidden))
                .or_else(|| compare(q, "system", a.system, b.system))
        })
        .or_else(|| diff_choices(a, b))
        .or_else(|| {
            if options.check_reference_class && a.data_type == DataType::Reference {
                diff_reference_class(a, b)
            } else {
                None
            }
        })
}

fn diff_choices(a: &PropertyInfo, b: &PropertyInfo) -> Option<PropertyMismatch> {
    let q = &a.qname;
    match (&a.choices, &b.choices) {
        (None, None) => None,
        (Some(_), None) => Some(PropertyMismatch::new(q, "choices", "present", "absent")),
        (None, Some(_)) => Some(PropertyMismatch::new(q, "choices", "absent", "present")),
        (Some(left), Some(right)) => {
            let left_ids: HashSet<&ObjectId> = left.iter().map(|c| &c.id).collect();
            let right_ids: HashSet<&ObjectId> = right.iter().map(|c| &c.id).collect();
            (left_ids != right_ids).then(|| {
                PropertyMismatch::new(q, "choices", id_list(&left_ids), id_list(&right_ids))
            })
        }
    }
}

fn id_list(ids: &HashSet<&ObjectId>) -> String {
    let mut sorted: Vec<&str> = ids.iter().map(|id| id.as_str()).collect();
    sorted.sort_unstable();
    format!("[{}]", sorted.join(", "))
}

fn diff_reference_class(a: &PropertyInfo, b: &PropertyInfo) -> Option<PropertyMismatch> {
    let q = &a.qname;
    match (a.reference_class_qname(), b.reference_class_qname()) {
        (None, _) => Some(PropertyMismatch::new(q, "referenceClass", "<none>", "left side is null")),
        (_, None) => Some(PropertyMismatch::new(q, "referenceClass", "right side is null", "<none>")),
        (Some(left), Some(right)) => compare(q, "referenceClass", left, right),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use repomodel_memory::{ClassSpec, InMemoryRepository, ModelBuilder};
    use repomodel_types::{ChoiceValue, Repository, Value};

    fn q(s: &str) -> QName {
        s.parse().unwrap()
    }

    fn repo() -> InMemoryRepository {
        ModelBuilder::new("differ")
            .class(ClassSpec::new(q("cm:document")))
            .class(ClassSpec::new(q("cm:pdf")).extends(q("cm:document")))
            .build()
            .unwrap()
    }

    fn reference(repo: &InMemoryRepository, target: &str) -> PropertyInfo {
        PropertyInfo::new(q("ns:p"), DataType::Reference)
            .with_reference_class(repo.class(&q(target)).unwrap())
    }

    #[test]
    fn identical_descriptors_match() {
        let a = PropertyInfo::new(q("ns:a"), DataType::String).required();
        assert_eq!(diff(&a, &a.clone(), DiffOptions::STRICT), None);
    }

    #[test]
    fn data_type_always_compared() {
        let a = PropertyInfo::new(q("ns:a"), DataType::String);
        let b = PropertyInfo::new(q("ns:a"), DataType::Integer);
        let m = diff(&a, &b, DiffOptions::new(false, false)).unwrap();
        assert_eq!(m.attribute, "dataType");
        assert_eq!(m.left, "STRING");
        assert_eq!(m.right, "INTEGER");
    }

    #[test]
    fn flags_only_compared_when_strict() {
        let a = PropertyInfo::new(q("ns:a"), DataType::String);
        let b = a.clone().required().with_display_name("Other");
        assert_eq!(diff(&a, &b, DiffOptions::new(false, true)), None);
        let m = diff(&a, &b, DiffOptions::STRICT).unwrap();
        assert_eq!(m.attribute, "displayName");
    }

    #[test]
    fn first_mismatch_is_reported() {
        let a = PropertyInfo::new(q("ns:a"), DataType::String);
        let b = PropertyInfo::new(q("ns:a"), DataType::Long).multi_valued();
        assert_eq!(diff(&a, &b, DiffOptions::STRICT).unwrap().attribute, "dataType");
    }

    #[test]
    fn choices_compared_by_presence_and_id_set() {
        let yes = ChoiceValue::new("yes", Value::Boolean(true), "Yes");
        let no = ChoiceValue::new("no", Value::Boolean(false), "No");
        let a = PropertyInfo::new(q("ns:c"), DataType::Boolean)
            .with_choices(vec![yes.clone(), no.clone()]);
        let reordered = PropertyInfo::new(q("ns:c"), DataType::Boolean)
            .with_choices(vec![no.clone(), yes.clone()]);
        let fewer = PropertyInfo::new(q("ns:c"), DataType::Boolean).with_choices(vec![yes]);
        let none = PropertyInfo::new(q("ns:c"), DataType::Boolean);

        assert_eq!(diff(&a, &reordered, DiffOptions::STRICT), None);
        assert_eq!(diff(&a, &fewer, DiffOptions::STRICT).unwrap().attribute, "choices");
        let m = diff(&none, &a, DiffOptions::new(false, false)).unwrap();
        assert_eq!((m.left.as_str(), m.right.as_str()), ("absent", "present"));
    }

    #[test]
    fn reference_class_compared_by_qname() {
        let repo = repo();
        let doc = reference(&repo, "cm:document");
        let pdf = reference(&repo, "cm:pdf");
        assert_eq!(diff(&doc, &doc.clone(), DiffOptions::STRICT), None);
        let m = diff(&pdf, &doc, DiffOptions::STRICT).unwrap();
        assert_eq!(m.attribute, "referenceClass");
        assert_eq!(diff(&pdf, &doc, DiffOptions::new(true, false)), None);
    }

    #[test]
    fn null_reference_class_names_the_side() {
        let repo = repo();
        let doc = reference(&repo, "cm:document");
        let bare = PropertyInfo::new(q("ns:p"), DataType::Reference);
        let m = diff(&bare, &doc, DiffOptions::STRICT).unwrap();
        assert!(m.to_string().contains("left side is null"));
        let m = diff(&doc, &bare, DiffOptions::STRICT).unwrap();
        assert!(m.to_string().contains("right side is null"));
    }
}
