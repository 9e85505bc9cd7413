//! Repomodel Types - the object model contract under verification
//!
//! Identifiers, qualified names, property descriptors and the traits a
//! reflective repository object model implements so that its class
//! hierarchy and property sets can be checked for consistency.

#![deny(unsafe_code)]
#![warn(rust_2018_idioms)]

mod error;
mod identity;
mod model;
mod property;

pub use error::*;
pub use identity::*;
pub use model::*;
pub use property::*;
