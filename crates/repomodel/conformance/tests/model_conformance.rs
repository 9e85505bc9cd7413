//! End-to-end verification of in-memory models.
//!
//! Each test builds a small model with `repomodel-memory`, runs the verifier
//! over it and checks the exact findings that come back.

use repomodel_conformance::{
    Check, ConformanceConfig, ConformanceRunner, Finding, MatchLevel, ModelVerifier, Severity,
    VerifierConfig,
};
use repomodel_memory::{
    standard_classes, standard_model, ClassSpec, InMemoryRepository, ModelBuilder, ObjectSpec,
    PropertySpec,
};
use repomodel_types::{
    ClassDescriptor, DataType, ModelObject, ObjectId, PropertyValue, QName, Repository, Value,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn q(s: &str) -> QName {
    s.parse().unwrap()
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

fn verify_class(repo: &InMemoryRepository, class: &str, config: VerifierConfig) -> Vec<Finding> {
    let cls = repo.class(&q(class)).unwrap();
    ModelVerifier::with_config(config).verify_class(cls.as_ref())
}

fn count(findings: &[Finding], check: Check) -> usize {
    findings.iter().filter(|f| f.check == check).count()
}

/// `Base` declares `ns:p` as a reference to `cm:document`; `Sub` redeclares
/// it with the given property.
fn override_model(redeclared: PropertySpec) -> InMemoryRepository {
    ModelBuilder::new("override")
        .class(ClassSpec::new(q("cm:document")))
        .class(ClassSpec::new(q("cm:pdfDocument")).extends(q("cm:document")))
        .class(
            ClassSpec::new(q("ns:Base"))
                .declare(PropertySpec::reference(q("ns:p"), q("cm:document"))),
        )
        .class(ClassSpec::new(q("ns:Sub")).extends(q("ns:Base")).declare(redeclared))
        .build()
        .unwrap()
}

fn end_to_end_model(value: Option<Value>) -> InMemoryRepository {
    let mut object = ObjectSpec::new(ObjectId::new("o1"), q("ns:Derived"));
    if let Some(value) = value {
        object = object.with_value(PropertyValue::new(q("ns:A"), DataType::String, value));
    }
    ModelBuilder::new("e2e")
        .class(
            ClassSpec::new(q("ns:Base"))
                .declare(PropertySpec::new(q("ns:A"), DataType::String).required()),
        )
        .class(ClassSpec::new(q("ns:Derived")).extends(q("ns:Base")))
        .object(object)
        .build()
        .unwrap()
}

// ---------------------------------------------------------------------------
// Idempotence
// ---------------------------------------------------------------------------

#[test]
fn repeated_verification_yields_identical_findings() {
    init_tracing();
    let repo = ModelBuilder::new("defects")
        .class(ClassSpec::new(q("ns:A")).extends(q("ns:B")).declare(PropertySpec::new(q("ns:a"), DataType::String)))
        .class(ClassSpec::new(q("ns:B")).extends(q("ns:A")).declare(PropertySpec::new(q("ns:b"), DataType::String)))
        .class(
            ClassSpec::new(q("ns:C"))
                .declare(PropertySpec::new(q("ns:c"), DataType::String))
                .with_extra_property(PropertySpec::new(q("ns:ghost"), DataType::Integer)),
        )
        .build()
        .unwrap();
    let verifier = ModelVerifier::new();
    for cls in repo.classes() {
        let first = verifier.verify_class(cls.as_ref());
        let second = verifier.verify_class(cls.as_ref());
        assert_eq!(first, second);
    }
}

// ---------------------------------------------------------------------------
// Expected cycle vs. defect cycle
// ---------------------------------------------------------------------------

#[test]
fn class_of_itself_terminates_without_loop_finding() {
    let repo = standard_model().unwrap();
    let metaclass = repo.metaclass().unwrap();
    assert_eq!(metaclass.class().and_then(|c| c.qname()), metaclass.qname());

    let findings = ModelVerifier::new().verify_object(&metaclass);
    assert_eq!(count(&findings, Check::HierarchyLoop), 0);
    assert!(findings.is_empty(), "{findings:#?}");
}

#[test]
fn artificial_superclass_loop_reported_exactly_once() {
    let repo = ModelBuilder::new("loop")
        .class(ClassSpec::new(q("ns:A")).extends(q("ns:B")).declare(PropertySpec::new(q("ns:a"), DataType::String)))
        .class(ClassSpec::new(q("ns:B")).extends(q("ns:A")).declare(PropertySpec::new(q("ns:b"), DataType::String)))
        .build()
        .unwrap();
    let findings = verify_class(&repo, "ns:A", VerifierConfig::default());
    let loops: Vec<&Finding> = findings.iter().filter(|f| f.check == Check::HierarchyLoop).collect();
    assert_eq!(loops.len(), 1, "{findings:#?}");
    assert!(loops[0].to_string().starts_with("HierarchyLoopCheck failed"));
}

// ---------------------------------------------------------------------------
// Reference override matrix
// ---------------------------------------------------------------------------

#[test]
fn same_reference_target_passes_under_exact() {
    let repo = override_model(PropertySpec::reference(q("ns:p"), q("cm:document")));
    let exact = VerifierConfig::default().with_reference_match(MatchLevel::Exact);
    let findings = verify_class(&repo, "ns:Sub", exact);
    assert!(findings.is_empty(), "{findings:#?}");
}

#[test]
fn narrowed_reference_target_depends_on_match_level() {
    let repo = override_model(PropertySpec::reference(q("ns:p"), q("cm:pdfDocument")));

    let findings = verify_class(&repo, "ns:Sub", VerifierConfig::default());
    assert!(findings.is_empty(), "{findings:#?}");

    let exact = VerifierConfig::default().with_reference_match(MatchLevel::Exact);
    let findings = verify_class(&repo, "ns:Sub", exact);
    assert_eq!(findings.len(), 1, "{findings:#?}");
    assert_eq!(findings[0].check, Check::PropertyOverride);
}

#[test]
fn widened_reference_target_fails_unless_any() {
    let repo = ModelBuilder::new("widen")
        .class(ClassSpec::new(q("cm:document")))
        .class(ClassSpec::new(q("cm:pdfDocument")).extends(q("cm:document")))
        .class(
            ClassSpec::new(q("ns:Base"))
                .declare(PropertySpec::reference(q("ns:p"), q("cm:pdfDocument"))),
        )
        .class(
            ClassSpec::new(q("ns:Sub"))
                .extends(q("ns:Base"))
                .declare(PropertySpec::reference(q("ns:p"), q("cm:document"))),
        )
        .build()
        .unwrap();
    let findings = verify_class(&repo, "ns:Sub", VerifierConfig::default());
    assert_eq!(count(&findings, Check::PropertyOverride), 1);

    let any = VerifierConfig::default().with_reference_match(MatchLevel::Any);
    assert!(verify_class(&repo, "ns:Sub", any).is_empty());
}

#[test]
fn retyping_a_reference_as_string_fails_at_every_level() {
    let repo = override_model(PropertySpec::new(q("ns:p"), DataType::String));
    for level in [MatchLevel::Exact, MatchLevel::IsOrExtends, MatchLevel::Any] {
        let config = VerifierConfig::default().with_reference_match(level);
        let findings = verify_class(&repo, "ns:Sub", config);
        assert_eq!(findings.len(), 1, "{level}: {findings:#?}");
        assert_eq!(findings[0].check, Check::PropertyOverride);
    }
}

// ---------------------------------------------------------------------------
// Aspect conflict
// ---------------------------------------------------------------------------

#[test]
fn declaring_an_aspect_property_is_a_conflict() {
    let q_prop = PropertySpec::new(q("ns:q"), DataType::String);
    let repo = ModelBuilder::new("aspect")
        .class(ClassSpec::aspect(q("ns:X")).declare(q_prop.clone()))
        .class(ClassSpec::new(q("ns:Base")).declare(PropertySpec::new(q("ns:b"), DataType::String)))
        .class(
            ClassSpec::new(q("ns:C"))
                .extends(q("ns:Base"))
                .with_aspect(q("ns:X"))
                .declare(q_prop),
        )
        .build()
        .unwrap();
    let findings = verify_class(&repo, "ns:C", VerifierConfig::default());
    assert_eq!(findings.len(), 1, "{findings:#?}");
    assert_eq!(findings[0].check, Check::DeclaredConflict);
    assert!(findings[0].message.contains("ns:X"));
}

// ---------------------------------------------------------------------------
// Completeness
// ---------------------------------------------------------------------------

#[test]
fn injected_unexplained_property_yields_one_finding() {
    let classes = standard_classes().into_iter().map(|spec| {
        if spec.qname == q("cm:document") {
            spec.with_extra_property(PropertySpec::new(q("cm:ghost"), DataType::Long))
        } else {
            spec
        }
    });
    let repo = ModelBuilder::new("ghost").classes(classes).build().unwrap();
    let findings = verify_class(&repo, "cm:document", VerifierConfig::default());
    assert_eq!(findings.len(), 1, "{findings:#?}");
    assert_eq!(findings[0].check, Check::Attribution);
    assert!(findings[0].message.contains("cm:ghost"));
}

// ---------------------------------------------------------------------------
// End to end
// ---------------------------------------------------------------------------

#[test]
fn derived_class_inherits_required_property() {
    let repo = end_to_end_model(Some(Value::String("x".into())));
    let derived = repo.class(&q("ns:Derived")).unwrap();
    let names: Vec<QName> = derived
        .properties()
        .unwrap()
        .into_iter()
        .map(|p| p.qname)
        .collect();
    assert_eq!(names, vec![q("ns:A")]);

    let obj = repo.object(&ObjectId::new("o1")).unwrap();
    let findings = ModelVerifier::new().verify_object(&obj);
    assert!(findings.is_empty(), "{findings:#?}");
}

#[test]
fn removed_value_yields_one_finding() {
    let repo = end_to_end_model(None);
    let obj = repo.object(&ObjectId::new("o1")).unwrap();
    let findings = ModelVerifier::new().verify_object(&obj);
    assert_eq!(findings.len(), 1, "{findings:#?}");
    assert_eq!(findings[0].to_string(), "PropertyPresentCheck failed for o1: Missing property ns:A");
}

#[test]
fn null_value_yields_one_finding() {
    let repo = end_to_end_model(Some(Value::Null));
    let obj = repo.object(&ObjectId::new("o1")).unwrap();
    let findings = ModelVerifier::new().verify_object(&obj);
    assert_eq!(findings.len(), 1, "{findings:#?}");
    assert_eq!(findings[0].check, Check::RequiredValue);
}

// ---------------------------------------------------------------------------
// Runner
// ---------------------------------------------------------------------------

#[test]
fn standard_model_passes_runner_with_schema() {
    init_tracing();
    let repo = standard_model().unwrap();
    let config = ConformanceConfig::from_json(r#"{ "include_schema": true }"#).unwrap();
    let report = ConformanceRunner::with_config(config).run_all(&repo).unwrap();
    assert!(report.all_passed(), "{report}");
    assert_eq!(report.findings().count(), 0);
    assert!(report.to_string().contains("CLASSES CONFORM"));
}

#[test]
fn exact_matching_from_json_flags_narrowing_link() {
    let repo = standard_model().unwrap();
    let config = ConformanceConfig::from_json(
        r#"{ "verifier": { "reference_match": "EXACT" }, "classes": ["cm:pdfLink", "cm:link"] }"#,
    )
    .unwrap();
    let report = ConformanceRunner::with_config(config).run_all(&repo).unwrap();
    assert_eq!(report.summary.total, 2);
    assert_eq!(report.summary.failed, 1);
    let failure = report.failures()[0];
    assert_eq!(failure.class, q("cm:pdfLink"));
    assert_eq!(failure.findings[0].check, Check::PropertyOverride);
    assert_eq!(failure.findings[0].severity, Severity::Violation);
}

#[test]
fn verifier_can_be_shared_across_threads() {
    let repo = standard_model().unwrap();
    let verifier = &ModelVerifier::new();
    let classes = repo.classes();
    std::thread::scope(|scope| {
        let handles: Vec<_> = classes
            .iter()
            .map(|cls| scope.spawn(move || verifier.verify_class(cls.as_ref())))
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap().is_empty());
        }
    });
}
