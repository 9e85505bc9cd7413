//! Assembles definitions into an [`InMemoryRepository`].

use crate::definition::{ClassSpec, ModelDefinition, ObjectSpec, PropertySpec};
use crate::error::{BuildError, BuildResult};
use crate::repository::{
    metaclass_properties, metaclass_qname, ClassEntry, InMemoryRepository, ModelArena,
    ObjectEntry,
};
use repomodel_types::{ObjectId, QName};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

/// Collects class and object definitions and builds a repository.
///
/// The builder always registers the metaclass `sys:class`. Effective
/// property sets are merged as superclass properties, then aspect
/// properties not already present, then declared properties (a declared
/// property replaces an inherited one of the same name).
pub struct ModelBuilder {
    name: String,
    classes: Vec<ClassSpec>,
    objects: Vec<ObjectSpec>,
}

impl ModelBuilder {
    /// Start an empty model for a repository called `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            classes: Vec::new(),
            objects: Vec::new(),
        }
    }

    /// Start from a declarative definition.
    pub fn from_definition(definition: ModelDefinition) -> Self {
        Self {
            name: definition.name.unwrap_or_else(|| "model".to_string()),
            classes: definition.classes,
            objects: definition.objects,
        }
    }

    /// Start from a JSON model definition.
    pub fn from_json(json: &str) -> BuildResult<Self> {
        let definition: ModelDefinition = serde_json::from_str(json)?;
        Ok(Self::from_definition(definition))
    }

    pub fn class(mut self, spec: ClassSpec) -> Self {
        self.classes.push(spec);
        self
    }

    pub fn classes(mut self, specs: impl IntoIterator<Item = ClassSpec>) -> Self {
        self.classes.extend(specs);
        self
    }

    pub fn object(mut self, spec: ObjectSpec) -> Self {
        self.objects.push(spec);
        self
    }

    /// Check references and build the repository.
    pub fn build(self) -> BuildResult<InMemoryRepository> {
        let mut specs = Vec::with_capacity(self.classes.len() + 1);
        specs.push(metaclass_spec());
        specs.extend(self.classes);

        let mut class_index = HashMap::new();
        for (i, spec) in specs.iter().enumerate() {
            if class_index.insert(spec.qname.clone(), i).is_some() {
                return Err(BuildError::DuplicateClass(spec.qname.clone()));
            }
        }
        for spec in &specs {
            check_references(spec, &class_index)?;
        }

        let mut memo = HashMap::new();
        let effective: Vec<Vec<PropertySpec>> = (0..specs.len())
            .map(|i| effective_of(i, &specs, &class_index, &mut memo, &mut HashSet::new()))
            .collect();
        let derived_subs = derive_sub_classes(&specs);

        let classes: Vec<ClassEntry> = specs
            .into_iter()
            .zip(effective)
            .map(|(spec, effective)| {
                let sub_classes = spec
                    .sub_classes
                    .clone()
                    .or_else(|| derived_subs.get(&spec.qname).cloned())
                    .unwrap_or_default();
                ClassEntry {
                    object_id: ObjectId::new(format!("class:{}", spec.qname)),
                    guid: uuid::Uuid::new_v4(),
                    effective,
                    sub_classes,
                    spec,
                }
            })
            .collect();

        let mut object_index = HashMap::new();
        let mut objects = Vec::with_capacity(self.objects.len());
        for spec in self.objects {
            if !class_index.contains_key(&spec.class) {
                return Err(BuildError::UnknownObjectClass {
                    object: spec.id.clone(),
                    class: spec.class.clone(),
                });
            }
            if object_index.insert(spec.id.clone(), objects.len()).is_some() {
                return Err(BuildError::DuplicateObject(spec.id.clone()));
            }
            objects.push(ObjectEntry {
                spec,
                guid: uuid::Uuid::new_v4(),
            });
        }

        debug!(
            model = %self.name,
            classes = classes.len(),
            objects = objects.len(),
            "built in-memory model"
        );

        Ok(InMemoryRepository {
            arena: Arc::new(ModelArena {
                id: ObjectId::new(format!("repository:{}", self.name)),
                name: self.name,
                classes,
                class_index,
                objects,
                object_index,
            }),
        })
    }
}

fn metaclass_spec() -> ClassSpec {
    let mut spec = ClassSpec::new(metaclass_qname()).with_display_name("Class");
    spec.declared = metaclass_properties();
    spec
}

fn check_references(spec: &ClassSpec, index: &HashMap<QName, usize>) -> BuildResult<()> {
    let property_targets = spec
        .declared
        .iter()
        .chain(spec.effective.iter().flatten())
        .chain(spec.extra_properties.iter())
        .filter_map(|p| p.reference_class.as_ref());
    let targets = spec
        .super_class
        .iter()
        .chain(spec.aspects.iter())
        .chain(spec.sub_classes.iter().flatten())
        .chain(property_targets);
    for target in targets {
        if !index.contains_key(target) {
            return Err(BuildError::UnknownClass {
                class: spec.qname.clone(),
                target: target.clone(),
            });
        }
    }
    Ok(())
}

fn effective_of(
    i: usize,
    specs: &[ClassSpec],
    index: &HashMap<QName, usize>,
    memo: &mut HashMap<usize, Vec<PropertySpec>>,
    visiting: &mut HashSet<usize>,
) -> Vec<PropertySpec> {
    if let Some(done) = memo.get(&i) {
        return done.clone();
    }
    // Superclass or aspect loop: contribute nothing on the way back round.
    if !visiting.insert(i) {
        return Vec::new();
    }
    let spec = &specs[i];
    let mut merged = match &spec.effective {
        Some(explicit) => explicit.clone(),
        None => {
            let mut merged = match spec.super_class.as_ref().and_then(|q| index.get(q)) {
                Some(&sup) => effective_of(sup, specs, index, memo, visiting),
                None => Vec::new(),
            };
            for aspect in spec.aspects.iter().filter_map(|q| index.get(q)) {
                for p in effective_of(*aspect, specs, index, memo, visiting) {
                    if !merged.iter().any(|m| m.qname == p.qname) {
                        merged.push(p);
                    }
                }
            }
            for declared in &spec.declared {
                match merged.iter_mut().find(|m| m.qname == declared.qname) {
                    Some(slot) => *slot = declared.clone(),
                    None => merged.push(declared.clone()),
                }
            }
            merged
        }
    };
    merged.extend(spec.extra_properties.iter().cloned());
    visiting.remove(&i);
    memo.insert(i, merged.clone());
    merged
}

fn derive_sub_classes(specs: &[ClassSpec]) -> HashMap<QName, Vec<QName>> {
    let mut subs: HashMap<QName, Vec<QName>> = HashMap::new();
    for spec in specs {
        if let Some(sup) = &spec.super_class {
            subs.entry(sup.clone()).or_default().push(spec.qname.clone());
        }
    }
    subs
}
