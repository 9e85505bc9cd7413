//! Declarative definitions of classes, properties and objects.
//!
//! Definitions are plain data: they name other classes by [`QName`] and are
//! resolved into handles only when the model is built. This keeps cyclic
//! graphs (a metaclass that is its own class, artificial superclass loops)
//! representable.

use repomodel_types::{ChoiceValue, DataType, ObjectId, PropertyValue, QName};
use serde::{Deserialize, Serialize};

// ── Properties ───────────────────────────────────────────────────────

/// Declarative form of a property descriptor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PropertySpec {
    pub qname: QName,
    #[serde(default)]
    pub display_name: Option<String>,
    pub data_type: DataType,
    #[serde(default)]
    pub multi_value: bool,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub read_only: bool,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub system: bool,
    #[serde(default)]
    pub reference_class: Option<QName>,
    #[serde(default)]
    pub choices: Option<Vec<ChoiceValue>>,
}

impl PropertySpec {
    pub fn new(qname: QName, data_type: DataType) -> Self {
        Self {
            qname,
            display_name: None,
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

    /// A REFERENCE property targeting `target`.
    pub fn reference(qname: QName, target: QName) -> Self {
        Self::new(qname, DataType::Reference).with_reference_class(target)
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
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

    pub fn with_reference_class(mut self, target: QName) -> Self {
        self.reference_class = Some(target);
        self
    }

    pub fn with_choices(mut self, choices: Vec<ChoiceValue>) -> Self {
        self.choices = Some(choices);
        self
    }
}

// ── Classes ──────────────────────────────────────────────────────────

/// Parts of a class an implementation may fail to report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassField {
    Id,
    Guid,
    Repository,
    Class,
    Name,
    Namespace,
    QName,
    Aspects,
    DeclaredProperties,
    Properties,
}

/// Declarative form of a class.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassSpec {
    pub qname: QName,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default = "default_true")]
    pub instantiable: bool,
    #[serde(default)]
    pub aspect: bool,
    #[serde(default)]
    pub super_class: Option<QName>,
    #[serde(default)]
    pub aspects: Vec<QName>,
    #[serde(default)]
    pub declared: Vec<PropertySpec>,
    /// Effective property set reported verbatim instead of the merged one.
    #[serde(default)]
    pub effective: Option<Vec<PropertySpec>>,
    /// Properties appended to the effective set without a source.
    #[serde(default)]
    pub extra_properties: Vec<PropertySpec>,
    /// Sub-class list reported verbatim instead of the derived one.
    #[serde(default)]
    pub sub_classes: Option<Vec<QName>>,
    /// Fields the class reports as absent.
    #[serde(default)]
    pub omit: Vec<ClassField>,
}

fn default_true() -> bool {
    true
}

impl ClassSpec {
    pub fn new(qname: QName) -> Self {
        Self {
            qname,
            display_name: None,
            instantiable: true,
            aspect: false,
            super_class: None,
            aspects: Vec::new(),
            declared: Vec::new(),
            effective: None,
            extra_properties: Vec::new(),
            sub_classes: None,
            omit: Vec::new(),
        }
    }

    /// An aspect (flat mixin) class. Aspects are not instantiable.
    pub fn aspect(qname: QName) -> Self {
        Self {
            instantiable: false,
            aspect: true,
            ..Self::new(qname)
        }
    }

    pub fn extends(mut self, super_class: QName) -> Self {
        self.super_class = Some(super_class);
        self
    }

    pub fn with_aspect(mut self, aspect: QName) -> Self {
        self.aspects.push(aspect);
        self
    }

    pub fn declare(mut self, property: PropertySpec) -> Self {
        self.declared.push(property);
        self
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    pub fn not_instantiable(mut self) -> Self {
        self.instantiable = false;
        self
    }

    pub fn with_effective(mut self, properties: Vec<PropertySpec>) -> Self {
        self.effective = Some(properties);
        self
    }

    pub fn with_extra_property(mut self, property: PropertySpec) -> Self {
        self.extra_properties.push(property);
        self
    }

    pub fn with_sub_classes(mut self, sub_classes: Vec<QName>) -> Self {
        self.sub_classes = Some(sub_classes);
        self
    }

    pub fn without(mut self, field: ClassField) -> Self {
        self.omit.push(field);
        self
    }

    pub fn omits(&self, field: ClassField) -> bool {
        self.omit.contains(&field)
    }
}

// ── Objects ──────────────────────────────────────────────────────────

/// Parts of an object an implementation may fail to report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectField {
    Id,
    Guid,
    Repository,
    Class,
}

/// Declarative form of an object instance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObjectSpec {
    pub id: ObjectId,
    pub class: QName,
    #[serde(default)]
    pub values: Vec<PropertyValue>,
    /// Available-property listing reported instead of the value names.
    #[serde(default)]
    pub available: Option<Vec<QName>>,
    #[serde(default = "default_true")]
    pub available_complete: bool,
    #[serde(default)]
    pub omit: Vec<ObjectField>,
}

impl ObjectSpec {
    pub fn new(id: ObjectId, class: QName) -> Self {
        Self {
            id,
            class,
            values: Vec::new(),
            available: None,
            available_complete: true,
            omit: Vec::new(),
        }
    }

    pub fn with_value(mut self, value: PropertyValue) -> Self {
        self.values.push(value);
        self
    }

    pub fn with_available(mut self, available: Vec<QName>) -> Self {
        self.available = Some(available);
        self
    }

    pub fn with_available_complete(mut self, complete: bool) -> Self {
        self.available_complete = complete;
        self
    }

    pub fn without(mut self, field: ObjectField) -> Self {
        self.omit.push(field);
        self
    }

    pub fn omits(&self, field: ObjectField) -> bool {
        self.omit.contains(&field)
    }
}

/// A whole model in declarative form.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelDefinition {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub classes: Vec<ClassSpec>,
    #[serde(default)]
    pub objects: Vec<ObjectSpec>,
}
