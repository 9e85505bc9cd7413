//! Arena-backed repository and the handles it hands out.
//!
//! Handles hold the arena plus an index, so a class can point at itself (or
//! two classes at each other) without reference cycles.

use crate::definition::{ClassField, ClassSpec, ObjectField, ObjectSpec, PropertySpec};
use repomodel_types::{
    ClassDescriptor, ClassRef, DataType, Guid, ModelError, ModelObject, ModelResult, ObjectId,
    ObjectKind, PropertyInfo, PropertyValue, QName, Repository, RepositoryRef, Value,
};
use std::collections::HashMap;
use std::sync::Arc;

/// Qualified name of the built-in metaclass every class is an instance of.
pub fn metaclass_qname() -> QName {
    QName::new("sys", "class")
}

/// Properties the metaclass declares; every class object answers them.
pub(crate) fn metaclass_properties() -> Vec<PropertySpec> {
    ["name", "namespace"]
        .into_iter()
        .map(|local| PropertySpec::new(QName::new("sys", local), DataType::String))
        .chain(
            ["instantiable", "aspect"]
                .into_iter()
                .map(|local| PropertySpec::new(QName::new("sys", local), DataType::Boolean)),
        )
        .map(|p| p.required().read_only().system())
        .collect()
}

pub(crate) struct ClassEntry {
    pub spec: ClassSpec,
    pub object_id: ObjectId,
    pub guid: Guid,
    pub effective: Vec<PropertySpec>,
    pub sub_classes: Vec<QName>,
}

pub(crate) struct ObjectEntry {
    pub spec: ObjectSpec,
    pub guid: Guid,
}

pub(crate) struct ModelArena {
    pub id: ObjectId,
    pub name: String,
    pub classes: Vec<ClassEntry>,
    pub class_index: HashMap<QName, usize>,
    pub objects: Vec<ObjectEntry>,
    pub object_index: HashMap<ObjectId, usize>,
}

impl ModelArena {
    fn class_handle(self: &Arc<Self>, qname: &QName) -> Option<MemoryClass> {
        self.class_index.get(qname).map(|&index| MemoryClass {
            arena: Arc::clone(self),
            index,
        })
    }

    fn class_ref(self: &Arc<Self>, qname: &QName) -> Option<ClassRef> {
        self.class_handle(qname).map(|c| Arc::new(c) as ClassRef)
    }

    fn repository_ref(self: &Arc<Self>) -> RepositoryRef {
        Arc::new(InMemoryRepository {
            arena: Arc::clone(self),
        })
    }

    fn materialize(self: &Arc<Self>, spec: &PropertySpec) -> PropertyInfo {
        let mut info = PropertyInfo::new(spec.qname.clone(), spec.data_type);
        if let Some(display_name) = &spec.display_name {
            info.display_name = display_name.clone();
        }
        info.multi_value = spec.multi_value;
        info.required = spec.required;
        info.read_only = spec.read_only;
        info.hidden = spec.hidden;
        info.system = spec.system;
        info.reference_class = spec
            .reference_class
            .as_ref()
            .and_then(|target| self.class_ref(target));
        info.choices = spec.choices.clone();
        info
    }
}

// ── Repository ───────────────────────────────────────────────────────

/// An in-memory repository built by [`crate::ModelBuilder`].
#[derive(Clone)]
pub struct InMemoryRepository {
    pub(crate) arena: Arc<ModelArena>,
}

impl InMemoryRepository {
    /// Concrete handle to a class.
    pub fn class_handle(&self, qname: &QName) -> Option<MemoryClass> {
        self.arena.class_handle(qname)
    }

    /// The class of every class.
    pub fn metaclass(&self) -> Option<MemoryClass> {
        self.class_handle(&metaclass_qname())
    }

    /// Concrete handle to a non-class object.
    pub fn object(&self, id: &ObjectId) -> Option<MemoryObject> {
        self.arena.object_index.get(id).map(|&index| MemoryObject {
            arena: Arc::clone(&self.arena),
            index,
        })
    }

    /// All instances, in registration order.
    pub fn objects(&self) -> Vec<MemoryObject> {
        (0..self.arena.objects.len())
            .map(|index| MemoryObject {
                arena: Arc::clone(&self.arena),
                index,
            })
            .collect()
    }

    pub fn class_count(&self) -> usize {
        self.arena.classes.len()
    }
}

impl Repository for InMemoryRepository {
    fn id(&self) -> ObjectId {
        self.arena.id.clone()
    }

    fn name(&self) -> String {
        self.arena.name.clone()
    }

    fn class(&self, qname: &QName) -> Option<ClassRef> {
        self.arena.class_ref(qname)
    }

    fn classes(&self) -> Vec<ClassRef> {
        (0..self.arena.classes.len())
            .map(|index| {
                Arc::new(MemoryClass {
                    arena: Arc::clone(&self.arena),
                    index,
                }) as ClassRef
            })
            .collect()
    }
}

impl std::fmt::Debug for InMemoryRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryRepository")
            .field("name", &self.arena.name)
            .field("classes", &self.arena.classes.len())
            .field("objects", &self.arena.objects.len())
            .finish()
    }
}

// ── Classes ──────────────────────────────────────────────────────────

/// Handle to a class in an [`InMemoryRepository`].
#[derive(Clone)]
pub struct MemoryClass {
    arena: Arc<ModelArena>,
    index: usize,
}

impl MemoryClass {
    fn entry(&self) -> &ClassEntry {
        &self.arena.classes[self.index]
    }

    fn spec(&self) -> &ClassSpec {
        &self.entry().spec
    }

    fn omits(&self, field: ClassField) -> bool {
        self.spec().omits(field)
    }

    /// Qualified name the handle was registered under, even when the class
    /// reports none.
    pub fn registered_qname(&self) -> &QName {
        &self.spec().qname
    }

    fn metaclass_value(&self, qname: &QName) -> Option<Value> {
        if qname.namespace() != "sys" {
            return None;
        }
        let spec = self.spec();
        match qname.local_name() {
            "name" => Some(Value::String(spec.qname.local_name().to_string())),
            "namespace" => Some(Value::String(spec.qname.namespace().to_string())),
            "instantiable" => Some(Value::Boolean(spec.instantiable)),
            "aspect" => Some(Value::Boolean(spec.aspect)),
            _ => None,
        }
    }
}

impl ModelObject for MemoryClass {
    fn kind(&self) -> ObjectKind {
        ObjectKind::Class
    }

    fn id(&self) -> Option<ObjectId> {
        (!self.omits(ClassField::Id)).then(|| self.entry().object_id.clone())
    }

    fn guid(&self) -> Option<Guid> {
        (!self.omits(ClassField::Guid)).then(|| self.entry().guid)
    }

    fn repository(&self) -> Option<RepositoryRef> {
        (!self.omits(ClassField::Repository)).then(|| self.arena.repository_ref())
    }

    fn class(&self) -> Option<ClassRef> {
        if self.omits(ClassField::Class) {
            return None;
        }
        self.arena.class_ref(&metaclass_qname())
    }

    fn property(&self, qname: &QName) -> ModelResult<PropertyValue> {
        let data_type = metaclass_properties()
            .into_iter()
            .find(|p| &p.qname == qname)
            .map(|p| p.data_type);
        match (data_type, self.metaclass_value(qname)) {
            (Some(data_type), Some(value)) => {
                Ok(PropertyValue::new(qname.clone(), data_type, value).with_read_only(true))
            }
            _ => Err(ModelError::NotFound(qname.clone())),
        }
    }

    fn available_properties(&self) -> Box<dyn Iterator<Item = QName> + '_> {
        Box::new(metaclass_properties().into_iter().map(|p| p.qname))
    }

    fn available_properties_complete(&self) -> bool {
        true
    }

    fn as_class(&self) -> Option<&dyn ClassDescriptor> {
        Some(self)
    }
}

impl ClassDescriptor for MemoryClass {
    fn as_object(&self) -> &dyn ModelObject {
        self
    }

    fn name(&self) -> Option<String> {
        (!self.omits(ClassField::Name)).then(|| self.spec().qname.local_name().to_string())
    }

    fn namespace(&self) -> Option<String> {
        (!self.omits(ClassField::Namespace)).then(|| self.spec().qname.namespace().to_string())
    }

    fn qname(&self) -> Option<QName> {
        (!self.omits(ClassField::QName)).then(|| self.spec().qname.clone())
    }

    fn display_name(&self) -> Option<String> {
        let spec = self.spec();
        Some(
            spec.display_name
                .clone()
                .unwrap_or_else(|| spec.qname.local_name().to_string()),
        )
    }

    fn is_instantiable(&self) -> bool {
        self.spec().instantiable
    }

    fn is_aspect(&self) -> bool {
        self.spec().aspect
    }

    fn super_class(&self) -> Option<ClassRef> {
        self.spec()
            .super_class
            .as_ref()
            .and_then(|q| self.arena.class_ref(q))
    }

    fn sub_classes(&self) -> Vec<ClassRef> {
        self.entry()
            .sub_classes
            .iter()
            .filter_map(|q| self.arena.class_ref(q))
            .collect()
    }

    fn aspects(&self) -> Option<Vec<ClassRef>> {
        if self.omits(ClassField::Aspects) {
            return None;
        }
        Some(
            self.spec()
                .aspects
                .iter()
                .filter_map(|q| self.arena.class_ref(q))
                .collect(),
        )
    }

    fn declared_properties(&self) -> Option<Vec<PropertyInfo>> {
        if self.omits(ClassField::DeclaredProperties) {
            return None;
        }
        Some(
            self.spec()
                .declared
                .iter()
                .map(|p| self.arena.materialize(p))
                .collect(),
        )
    }

    fn properties(&self) -> Option<Vec<PropertyInfo>> {
        if self.omits(ClassField::Properties) {
            return None;
        }
        Some(
            self.entry()
                .effective
                .iter()
                .map(|p| self.arena.materialize(p))
                .collect(),
        )
    }
}

impl std::fmt::Debug for MemoryClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MemoryClass({})", self.spec().qname)
    }
}

// ── Objects ──────────────────────────────────────────────────────────

/// Handle to an instance in an [`InMemoryRepository`].
#[derive(Clone)]
pub struct MemoryObject {
    arena: Arc<ModelArena>,
    index: usize,
}

impl MemoryObject {
    fn entry(&self) -> &ObjectEntry {
        &self.arena.objects[self.index]
    }

    fn omits(&self, field: ObjectField) -> bool {
        self.entry().spec.omits(field)
    }
}

impl ModelObject for MemoryObject {
    fn kind(&self) -> ObjectKind {
        ObjectKind::Object
    }

    fn id(&self) -> Option<ObjectId> {
        (!self.omits(ObjectField::Id)).then(|| self.entry().spec.id.clone())
    }

    fn guid(&self) -> Option<Guid> {
        (!self.omits(ObjectField::Guid)).then(|| self.entry().guid)
    }

    fn repository(&self) -> Option<RepositoryRef> {
        (!self.omits(ObjectField::Repository)).then(|| self.arena.repository_ref())
    }

    fn class(&self) -> Option<ClassRef> {
        if self.omits(ObjectField::Class) {
            return None;
        }
        self.arena.class_ref(&self.entry().spec.class)
    }

    fn property(&self, qname: &QName) -> ModelResult<PropertyValue> {
        self.entry()
            .spec
            .values
            .iter()
            .find(|v| &v.qname == qname)
            .cloned()
            .ok_or_else(|| ModelError::NotFound(qname.clone()))
    }

    fn available_properties(&self) -> Box<dyn Iterator<Item = QName> + '_> {
        let spec = &self.entry().spec;
        match &spec.available {
            Some(listed) => Box::new(listed.iter().cloned()),
            None => Box::new(spec.values.iter().map(|v| v.qname.clone())),
        }
    }

    fn available_properties_complete(&self) -> bool {
        self.entry().spec.available_complete
    }
}

impl std::fmt::Debug for MemoryObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MemoryObject({})", self.entry().spec.id)
    }
}
