//! Repository-wide conformance runner.
//!
//! Verifies every class of a repository (or a configured subset) with a
//! fresh visit guard per class, optionally checks the schema assertion
//! table, and produces a [`ConformanceReport`].

use crate::config::ConformanceConfig;
use crate::error::{ConformanceError, ConformanceResult};
use crate::report::{ClassResult, ConformanceReport};
use crate::schema::SchemaTable;
use crate::verifier::ModelVerifier;
use chrono::Utc;
use repomodel_types::{ClassRef, QName, Repository};
use tracing::{debug, info};

/// Runs conformance verification over a repository.
pub struct ConformanceRunner {
    config: ConformanceConfig,
    verifier: ModelVerifier,
    schema: Option<SchemaTable>,
}

impl ConformanceRunner {
    /// Runner with default configuration: all classes, no fail-fast, no
    /// schema table.
    pub fn new() -> Self {
        Self::with_config(ConformanceConfig::default())
    }

    /// Create a runner with a specific configuration.
    pub fn with_config(config: ConformanceConfig) -> Self {
        Self {
            verifier: ModelVerifier::with_config(config.verifier.clone()),
            config,
            schema: None,
        }
    }

    /// Use `schema` instead of the bundled table when `include_schema` is set.
    pub fn with_schema(mut self, schema: SchemaTable) -> Self {
        self.schema = Some(schema);
        self
    }

    /// The runner configuration.
    pub fn config(&self) -> &ConformanceConfig {
        &self.config
    }

    /// Verify every selected class and produce a report.
    pub fn run_all(&self, repository: &dyn Repository) -> ConformanceResult<ConformanceReport> {
        let started_at = Utc::now();
        let classes = self.resolve_classes(repository)?;
        let total_expected = classes.len();
        let mut results = Vec::new();

        for (qname, cls) in classes {
            let result = self.verify(qname, &cls);
            let failed = !result.passed();
            results.push(result);

            if self.config.fail_fast && failed {
                break;
            }
        }
        let skipped = total_expected - results.len();

        let schema_findings = if self.config.include_schema {
            let table = match &self.schema {
                Some(table) => table.clone(),
                None => SchemaTable::standard()?,
            };
            table.check(repository)
        } else {
            Vec::new()
        };

        let completed_at = Utc::now();
        let report = ConformanceReport::from_results(
            repository.name(),
            results,
            schema_findings,
            skipped,
            started_at,
            completed_at,
        );
        info!(
            repository = %report.repository,
            summary = %report.summary,
            "Conformance run complete"
        );
        Ok(report)
    }

    /// Verify a single class by name.
    pub fn run_single(&self, repository: &dyn Repository, qname: &QName) -> ConformanceResult<ClassResult> {
        let cls = repository
            .class(qname)
            .ok_or_else(|| ConformanceError::UnknownClass(qname.clone()))?;
        Ok(self.verify(qname.clone(), &cls))
    }

    fn verify(&self, qname: QName, cls: &ClassRef) -> ClassResult {
        let findings = self.verifier.verify_class(cls.as_ref());
        debug!(class = %qname, findings = findings.len(), "Class verified");
        ClassResult::new(qname, findings)
    }

    fn resolve_classes(&self, repository: &dyn Repository) -> ConformanceResult<Vec<(QName, ClassRef)>> {
        if !self.config.classes.is_empty() {
            return self
                .config
                .classes
                .iter()
                .map(|qname| {
                    repository
                        .class(qname)
                        .map(|cls| (qname.clone(), cls))
                        .ok_or_else(|| ConformanceError::UnknownClass(qname.clone()))
                })
                .collect();
        }

        let mut classes = Vec::new();
        for cls in repository.classes() {
            match cls.qname() {
                Some(qname) => classes.push((qname, cls)),
                None => {
                    return Err(ConformanceError::InvalidConfiguration(format!(
                        "repository {} lists a class without a qualified name",
                        repository.name()
                    )))
                }
            }
        }
        Ok(classes)
    }
}

impl Default for ConformanceRunner {
    fn default() -> Self {
        Self::new()
    }
}
