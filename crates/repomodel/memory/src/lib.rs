#![deny(unsafe_code)]
//! # repomodel-memory
//!
//! In-memory implementation of the repomodel object model contract.
//!
//! Models are described declaratively ([`ClassSpec`], [`PropertySpec`],
//! [`ObjectSpec`], or a JSON [`ModelDefinition`]) and assembled by
//! [`ModelBuilder`] into an [`InMemoryRepository`]. Definitions can leave
//! out any nullable part of a class or object, report an explicit
//! effective property set, or append unexplained properties, so defective
//! models are as easy to express as conformant ones.
//!
//! ```rust
//! use repomodel_memory::{ClassSpec, ModelBuilder, PropertySpec};
//! use repomodel_types::{ClassDescriptor, DataType, QName, Repository};
//!
//! let repo = ModelBuilder::new("demo")
//!     .class(ClassSpec::new(QName::new("ns", "Base"))
//!         .declare(PropertySpec::new(QName::new("ns", "A"), DataType::String).required()))
//!     .class(ClassSpec::new(QName::new("ns", "Derived")).extends(QName::new("ns", "Base")))
//!     .build()
//!     .unwrap();
//! let derived = repo.class(&QName::new("ns", "Derived")).unwrap();
//! assert_eq!(derived.properties().unwrap().len(), 1);
//! ```

pub mod builder;
pub mod definition;
pub mod error;
pub mod repository;
pub mod standard;

pub use builder::ModelBuilder;
pub use definition::{ClassField, ClassSpec, ModelDefinition, ObjectField, ObjectSpec, PropertySpec};
pub use error::{BuildError, BuildResult};
pub use repository::{metaclass_qname, InMemoryRepository, MemoryClass, MemoryObject};
pub use standard::{sample_document, standard_builder, standard_classes, standard_model};
