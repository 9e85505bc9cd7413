//! Identifiers used by the object model.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Globally unique identifier carried by every object.
pub type Guid = uuid::Uuid;

/// Identifies an object instance within a repository.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub String);

impl ObjectId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// A fresh random id.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Qualified name: a `(namespace, local name)` pair identifying a class or
/// a property.
///
/// Rendered and parsed as `namespace:local`. The local name may not contain
/// a colon; the namespace may be empty.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct QName {
    namespace: String,
    local_name: String,
}

impl QName {
    pub fn new(namespace: impl Into<String>, local_name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            local_name: local_name.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn local_name(&self) -> &str {
        &self.local_name
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.local_name)
    }
}

/// Error returned when a string is not a valid `namespace:local` name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid qualified name '{0}': expected namespace:local")]
pub struct QNameParseError(pub String);

impl FromStr for QName {
    type Err = QNameParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.rsplit_once(':') {
            Some((ns, local)) if !local.is_empty() => Ok(QName::new(ns, local)),
            _ => Err(QNameParseError(s.to_string())),
        }
    }
}

impl TryFrom<String> for QName {
    type Error = QNameParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<QName> for String {
    fn from(q: QName) -> Self {
        q.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qname_display_and_parse() {
        let q = QName::new("cm", "document");
        assert_eq!(q.to_string(), "cm:document");
        assert_eq!("cm:document".parse::<QName>().unwrap(), q);
    }

    #[test]
    fn qname_parse_keeps_colons_in_namespace() {
        let q: QName = "http://example.org/model:title".parse().unwrap();
        assert_eq!(q.namespace(), "http://example.org/model");
        assert_eq!(q.local_name(), "title");
    }

    #[test]
    fn qname_parse_rejects_missing_local_name() {
        assert!("cm:".parse::<QName>().is_err());
        assert!("document".parse::<QName>().is_err());
    }

    #[test]
    fn qname_serializes_as_string() {
        let q = QName::new("ns", "A");
        let json = serde_json::to_string(&q).unwrap();
        assert_eq!(json, "\"ns:A\"");
        let back: QName = serde_json::from_str(&json).unwrap();
        assert_eq!(back, q);
    }

    #[test]
    fn object_id_generate_is_unique() {
        assert_ne!(ObjectId::generate(), ObjectId::generate());
        assert_eq!(ObjectId::new("obj-1").as_str(), "obj-1");
    }
}
