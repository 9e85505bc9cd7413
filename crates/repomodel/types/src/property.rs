//! Property descriptors, values and choice lists.

use crate::{ClassRef, Guid, ModelError, ModelResult, ObjectId, QName};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ── Data types ───────────────────────────────────────────────────────

/// Data type of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataType {
    String,
    Integer,
    Short,
    Long,
    Float,
    Double,
    Boolean,
    #[serde(rename = "DATETIME")]
    DateTime,
    Blob,
    Reference,
    Id,
    Guid,
    Content,
}

impl DataType {
    pub fn label(&self) -> &'static str {
        match self {
            Self::String => "STRING",
            Self::Integer => "INTEGER",
            Self::Short => "SHORT",
            Self::Long => "LONG",
            Self::Float => "FLOAT",
            Self::Double => "DOUBLE",
            Self::Boolean => "BOOLEAN",
            Self::DateTime => "DATETIME",
            Self::Blob => "BLOB",
            Self::Reference => "REFERENCE",
            Self::Id => "ID",
            Self::Guid => "GUID",
            Self::Content => "CONTENT",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ── Values ───────────────────────────────────────────────────────────

/// A raw property value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Value {
    Null,
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    DateTime(DateTime<Utc>),
    Blob(Vec<u8>),
    Id(ObjectId),
    Guid(Guid),
    Reference(ObjectId),
    References(Vec<ObjectId>),
    List(Vec<Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The list behind a multi-valued non-reference property.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Scalar data type this value carries, if it determines one.
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Value::Null | Value::List(_) => None,
            Value::String(_) => Some(DataType::String),
            Value::Integer(_) => Some(DataType::Integer),
            Value::Float(_) => Some(DataType::Double),
            Value::Boolean(_) => Some(DataType::Boolean),
            Value::DateTime(_) => Some(DataType::DateTime),
            Value::Blob(_) => Some(DataType::Blob),
            Value::Id(_) => Some(DataType::Id),
            Value::Guid(_) => Some(DataType::Guid),
            Value::Reference(_) | Value::References(_) => Some(DataType::Reference),
        }
    }
}

/// A property value as read from an object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyValue {
    pub qname: QName,
    pub data_type: DataType,
    pub multi_value: bool,
    pub read_only: bool,
    pub value: Value,
}

impl PropertyValue {
    pub fn new(qname: QName, data_type: DataType, value: Value) -> Self {
        let multi_value = matches!(value, Value::List(_) | Value::References(_));
        Self {
            qname,
            data_type,
            multi_value,
            read_only: false,
            value,
        }
    }

    pub fn with_multi_value(mut self, multi_value: bool) -> Self {
        self.multi_value = multi_value;
        self
    }

    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    pub fn name(&self) -> &str {
        self.qname.local_name()
    }

    /// Referenced object ids. Fails unless the property is REFERENCE-typed
    /// and holds reference values.
    pub fn reference_iterable(&self) -> ModelResult<Vec<ObjectId>> {
        if self.data_type != DataType::Reference {
            return Err(ModelError::InvalidDataType {
                qname: self.qname.clone(),
                expected: DataType::Reference,
                actual: self.data_type,
            });
        }
        match &self.value {
            Value::Null => Ok(Vec::new()),
            Value::Reference(id) => Ok(vec![id.clone()]),
            Value::References(ids) => Ok(ids.clone()),
            other => Err(ModelError::InvalidDataType {
                qname: self.qname.clone(),
                expected: DataType::Reference,
                actual: other.data_type().unwrap_or(self.data_type),
            }),
        }
    }
}

// ── Choices ──────────────────────────────────────────────────────────

/// One admissible value of an enumerated property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceValue {
    pub id: ObjectId,
    pub value: Value,
    pub display_name: String,
}

impl ChoiceValue {
    pub fn new(id: impl Into<String>, value: Value, display_name: impl Into<String>) -> Self {
        Self {
            id: ObjectId::new(id),
            value,
            display_name: display_name.into(),
        }
    }
}

// ── Property descriptors ─────────────────────────────────────────────

/// Shape of a property as declared on a class.
///
/// `name` and `namespace` normally mirror `qname`; they are kept separately
/// because implementations report them independently.
#[derive(Clone)]
pub struct PropertyInfo {
    pub name: String,
    pub namespace: String,
    pub qname: QName,
    pub display_name: String,
    pub data_type: DataType,
    pub multi_value: bool,
    pub required: bool,
    pub read_only: bool,
    pub hidden: bool,
    pub system: bool,
    /// Target class; present iff `data_type` is REFERENCE.
    pub reference_class: Option<ClassRef>,
    pub choices: Option<Vec<ChoiceValue>>,
}

impl PropertyInfo {
    pub fn new(qname: QName, data_type: DataType) -> Self {
        Self {
            name: qname.local_name().to_string(),
            namespace: qname.namespace().to_string(),
            display_name: qname.local_name().to_string(),
            qname,
            data_type,
            multi_value: false,
            required: false,
            read_only: false,
            hidden: false,
            system: false,
            reference_class: None,
            choices: None,
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    pub fn multi_valued(mut self) -> Self {
        self.multi_value = true;
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn system(mut self) -> Self {
        self.system = true;
        self
    }

    pub fn with_reference_class(mut self, class: ClassRef) -> Self {
        self.reference_class = Some(class);
        self
    }

    pub fn with_choices(mut self, choices: Vec<ChoiceValue>) -> Self {
        self.choices = Some(choices);
        self
    }

    /// Qualified name of the reference target, if any.
    pub fn reference_class_qname(&self) -> Option<QName> {
        self.reference_class.as_ref().and_then(|c| c.qname())
    }
}

impl fmt::Debug for PropertyInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyInfo")
            .field("qname", &self.qname)
            .field("data_type", &self.data_type)
            .field("multi_value", &self.multi_value)
            .field("required", &self.required)
            .field("read_only", &self.read_only)
            .field("hidden", &self.hidden)
            .field("system", &self.system)
            .field("reference_class", &self.reference_class_qname())
            .field("choices", &self.choices.as_ref().map(|c| c.len()))
            .finish()
    }
}
