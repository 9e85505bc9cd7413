//! Repomodel Conformance - consistency verification for reflective object models
//!
//! Checks that an implementation of the repomodel contract is internally
//! consistent:
//!
//! - every object carries an id, guid, repository and class, and answers
//!   each property of its class with a value of the declared shape
//! - superclass chains terminate and agree with subclass lists
//! - the effective property set of a class is explained by its declared,
//!   superclass and aspect properties, with aspects merged flat
//! - a redeclared property only narrows the target of an inherited
//!   REFERENCE property
//!
//! Verification never fails and never mutates the model. It returns a list
//! of [`Finding`]s in discovery order; an empty list is a pass.
//!
//! ```rust
//! use repomodel_conformance::ModelVerifier;
//! use repomodel_memory::standard_model;
//! use repomodel_types::{ObjectId, Repository};
//!
//! let repo = standard_model().unwrap();
//! let doc = repo.object(&ObjectId::new("doc-1")).unwrap();
//! assert!(ModelVerifier::new().verify_object(&doc).is_empty());
//! ```

#![deny(unsafe_code)]
#![warn(rust_2018_idioms)]

mod baseline;
mod hierarchy;
mod verifier;

pub mod config;
pub mod differ;
pub mod error;
pub mod finding;
pub mod guard;
pub mod report;
pub mod resolution;
pub mod runner;
pub mod schema;

pub use config::{ConformanceConfig, MatchLevel, VerifierConfig};
pub use differ::{diff, DiffOptions, PropertyMismatch};
pub use error::{ConformanceError, ConformanceResult};
pub use finding::{Check, Finding, Severity};
pub use guard::VisitGuard;
pub use report::{ClassResult, ConformanceReport, ConformanceSummary};
pub use resolution::{is_or_extends, PropertyMap, Resolution};
pub use runner::ConformanceRunner;
pub use schema::{ExpectedClass, ExpectedProperty, SchemaTable};
pub use verifier::ModelVerifier;
