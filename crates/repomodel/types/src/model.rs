//! Traits an object model implementation exposes for verification.
//!
//! Every accessor that an implementation may legitimately fail to answer
//! returns an `Option`; property lookups that can fail return a
//! [`ModelResult`]. Nothing here mutates the model.

use crate::{Guid, ModelResult, ObjectId, PropertyInfo, PropertyValue, QName};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Shared handle to a class descriptor.
pub type ClassRef = Arc<dyn ClassDescriptor>;

/// Shared handle to a repository.
pub type RepositoryRef = Arc<dyn Repository>;

/// What kind of model element an object is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    Object,
    Class,
    PropertyInfo,
    ChoiceValue,
}

/// An instance living in a repository.
pub trait ModelObject: Send + Sync {
    /// What kind of model element this is.
    fn kind(&self) -> ObjectKind;

    /// Repository-unique id, if the object has one.
    fn id(&self) -> Option<ObjectId>;

    /// Globally unique id, if the object has one.
    fn guid(&self) -> Option<Guid>;

    /// Repository owning this object.
    fn repository(&self) -> Option<RepositoryRef>;

    /// Class this object is an instance of.
    fn class(&self) -> Option<ClassRef>;

    /// Read one property. Absent properties yield [`crate::ModelError::NotFound`].
    fn property(&self, qname: &QName) -> ModelResult<PropertyValue>;

    /// Names of the properties this object carries. Each call starts a new
    /// iteration; implementations must return a finite sequence.
    fn available_properties(&self) -> Box<dyn Iterator<Item = QName> + '_>;

    /// Whether [`ModelObject::available_properties`] lists every property.
    fn available_properties_complete(&self) -> bool;

    /// View this object as a class descriptor when it is one.
    fn as_class(&self) -> Option<&dyn ClassDescriptor> {
        None
    }
}

/// Metadata of a class. A class is itself an object (its class is usually a
/// metaclass, which may be its own class).
pub trait ClassDescriptor: ModelObject {
    /// This class viewed as a plain object.
    fn as_object(&self) -> &dyn ModelObject;

    /// Local part of the class name.
    fn name(&self) -> Option<String>;

    /// Namespace part of the class name.
    fn namespace(&self) -> Option<String>;

    /// Qualified name; the identity of a class within its repository.
    fn qname(&self) -> Option<QName>;

    fn display_name(&self) -> Option<String>;

    /// Whether objects of exactly this class may exist.
    fn is_instantiable(&self) -> bool;

    /// Aspects are flat mixin classes.
    fn is_aspect(&self) -> bool;

    /// Direct superclass. `None` for a root class.
    fn super_class(&self) -> Option<ClassRef>;

    /// Direct subclasses.
    fn sub_classes(&self) -> Vec<ClassRef>;

    /// Aspects applied to this class.
    fn aspects(&self) -> Option<Vec<ClassRef>>;

    /// Properties introduced by this class.
    fn declared_properties(&self) -> Option<Vec<PropertyInfo>>;

    /// Effective property set visible on instances.
    fn properties(&self) -> Option<Vec<PropertyInfo>>;
}

/// A repository owning classes and objects.
pub trait Repository: Send + Sync {
    /// Id of the repository itself.
    fn id(&self) -> ObjectId;

    fn name(&self) -> String;

    /// Look up a class by qualified name.
    fn class(&self, qname: &QName) -> Option<ClassRef>;

    /// Every class known to the repository, in a stable order.
    fn classes(&self) -> Vec<ClassRef>;
}
