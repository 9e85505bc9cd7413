//! Conformance report generation.
//!
//! Collects per-class verification results into a report with summary
//! statistics, box-drawing display and JSON output.

use crate::error::ConformanceResult;
use crate::finding::{Finding, Severity};
use chrono::{DateTime, Utc};
use repomodel_types::QName;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Verification result for one class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassResult {
    pub class: QName,
    pub findings: Vec<Finding>,
}

impl ClassResult {
    /// Result for `class` from its verification findings.
    pub fn new(class: QName, findings: Vec<Finding>) -> Self {
        Self { class, findings }
    }

    /// A class passes when it has no findings beyond warnings.
    pub fn passed(&self) -> bool {
        self.findings.iter().all(|f| f.severity == Severity::Warning)
    }

    /// Number of warning findings.
    pub fn warnings(&self) -> usize {
        self.count(Severity::Warning)
    }

    /// Number of violation findings.
    pub fn violations(&self) -> usize {
        self.count(Severity::Violation)
    }

    /// Number of abort findings.
    pub fn aborts(&self) -> usize {
        self.count(Severity::Abort)
    }

    fn count(&self, severity: Severity) -> usize {
        self.findings.iter().filter(|f| f.severity == severity).count()
    }
}

impl fmt::Display for ClassResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mark = if self.passed() { "+" } else { "x" };
        write!(f, "[{}] {}", mark, self.class)?;
        if !self.findings.is_empty() {
            write!(
                f,
                " ({} violation(s), {} abort(s), {} warning(s))",
                self.violations(),
                self.aborts(),
                self.warnings()
            )?;
        }
        Ok(())
    }
}

/// Summary statistics for a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConformanceSummary {
    /// Classes verified.
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    /// Classes not verified because of fail-fast.
    pub skipped: usize,
    /// Findings of the schema assertion table.
    pub schema_violations: usize,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

impl ConformanceSummary {
    pub fn all_passed(&self) -> bool {
        self.failed == 0 && self.schema_violations == 0
    }

    /// Pass rate as a percentage.
    pub fn pass_rate(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        (self.passed as f64 / self.total as f64) * 100.0
    }
}

impl fmt::Display for ConformanceSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} passed ({:.1}%), {} failed, {} skipped, {} schema violation(s)",
            self.passed,
            self.total,
            self.pass_rate(),
            self.failed,
            self.skipped,
            self.schema_violations,
        )
    }
}

/// A complete conformance report for one repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConformanceReport {
    pub repository: String,
    pub results: Vec<ClassResult>,
    pub schema_findings: Vec<Finding>,
    pub summary: ConformanceSummary,
}

impl ConformanceReport {
    /// Build a report and its summary from per-class results.
    pub fn from_results(
        repository: impl Into<String>,
        results: Vec<ClassResult>,
        schema_findings: Vec<Finding>,
        skipped: usize,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
    ) -> Self {
        let total = results.len();
        let passed = results.iter().filter(|r| r.passed()).count();
        let summary = ConformanceSummary {
            total,
            passed,
            failed: total - passed,
            skipped,
            schema_violations: schema_findings.len(),
            started_at,
            completed_at,
        };
        Self {
            repository: repository.into(),
            results,
            schema_findings,
            summary,
        }
    }

    pub fn all_passed(&self) -> bool {
        self.summary.all_passed()
    }

    /// Classes that did not pass.
    pub fn failures(&self) -> Vec<&ClassResult> {
        self.results.iter().filter(|r| !r.passed()).collect()
    }

    /// Every finding in discovery order, schema findings last.
    pub fn findings(&self) -> impl Iterator<Item = &Finding> {
        self.results
            .iter()
            .flat_map(|r| r.findings.iter())
            .chain(self.schema_findings.iter())
    }

    /// Serialize the report as pretty-printed JSON.
    pub fn to_json(&self) -> ConformanceResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl fmt::Display for ConformanceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "+-------------------------------------------------+")?;
        writeln!(f, "|   Object Model Conformance Report               |")?;
        writeln!(f, "+-------------------------------------------------+")?;
        writeln!(f, "| Repository: {:<36}|", self.repository)?;
        writeln!(
            f,
            "| Total: {:3}  Passed: {:3}  Failed: {:3}             |",
            self.summary.total, self.summary.passed, self.summary.failed,
        )?;
        writeln!(f, "+-------------------------------------------------+")?;
        writeln!(f)?;

        for result in &self.results {
            writeln!(f, "  {}", result)?;
            for finding in &result.findings {
                writeln!(f, "      {}", finding)?;
            }
        }
        if !self.schema_findings.is_empty() {
            writeln!(f)?;
            writeln!(f, "  Schema assertions:")?;
            for finding in &self.schema_findings {
                writeln!(f, "      {}", finding)?;
            }
        }

        writeln!(f)?;
        if self.all_passed() {
            writeln!(f, "  ALL {} CLASSES CONFORM", self.summary.total)?;
        } else {
            writeln!(
                f,
                "  {} CLASS(ES) FAILED, {} SCHEMA VIOLATION(S)",
                self.summary.failed, self.summary.schema_violations,
            )?;
        }
        Ok(())
    }
}
