//! Loop guard bounding recursion over cyclic object graphs.

use repomodel_types::{ObjectId, QName};
use std::collections::HashSet;

/// Identities already entered during one top-level verification.
///
/// Object ids and class names are separate identity spaces and are tracked
/// in separate sets: a class is entered once as an object (by id, for its
/// baseline) and once as a class (by qualified name, for its hierarchy).
/// A repeat entry is an expected cycle, not a defect.
#[derive(Debug, Default)]
pub struct VisitGuard {
    visited_ids: HashSet<ObjectId>,
    visited_classes: HashSet<QName>,
}

impl VisitGuard {
    /// Create an empty guard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` the first time `id` is entered.
    pub fn enter_object(&mut self, id: &ObjectId) -> bool {
        self.visited_ids.insert(id.clone())
    }

    /// Returns `true` the first time `qname` is entered.
    pub fn enter_class(&mut self, qname: &QName) -> bool {
        self.visited_classes.insert(qname.clone())
    }

    /// Number of distinct object ids entered.
    pub fn objects_visited(&self) -> usize {
        self.visited_ids.len()
    }

    /// Number of distinct classes entered.
    pub fn classes_visited(&self) -> usize {
        self.visited_classes.len()
    }
}
