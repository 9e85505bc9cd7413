//! The standard content model: a small set of well-known classes used as a
//! conformant baseline.

use crate::builder::ModelBuilder;
use crate::definition::{ClassSpec, ObjectSpec, PropertySpec};
use crate::error::BuildResult;
use crate::repository::InMemoryRepository;
use chrono::{TimeZone, Utc};
use repomodel_types::{ChoiceValue, DataType, ObjectId, PropertyValue, QName, Value};

fn sys(local: &str) -> QName {
    QName::new("sys", local)
}

fn cm(local: &str) -> QName {
    QName::new("cm", local)
}

/// Class definitions of the standard content model.
pub fn standard_classes() -> Vec<ClassSpec> {
    vec![
        ClassSpec::new(sys("base"))
            .with_display_name("Base")
            .not_instantiable()
            .declare(
                PropertySpec::new(sys("node-id"), DataType::Id)
                    .required()
                    .read_only()
                    .system(),
            )
            .declare(
                PropertySpec::new(sys("guid"), DataType::Guid)
                    .required()
                    .read_only()
                    .system(),
            ),
        ClassSpec::new(cm("object"))
            .with_display_name("Object")
            .extends(sys("base"))
            .declare(PropertySpec::new(cm("name"), DataType::String).required())
            .declare(PropertySpec::new(cm("created"), DataType::DateTime).read_only())
            .declare(PropertySpec::new(cm("creator"), DataType::String).read_only()),
        ClassSpec::aspect(cm("titled"))
            .with_display_name("Titled")
            .declare(PropertySpec::new(cm("title"), DataType::String))
            .declare(PropertySpec::new(cm("description"), DataType::String)),
        ClassSpec::aspect(cm("versionable"))
            .with_display_name("Versionable")
            .declare(PropertySpec::new(cm("versionLabel"), DataType::String).read_only())
            .declare(PropertySpec::new(cm("autoVersion"), DataType::Boolean)),
        ClassSpec::new(cm("document"))
            .with_display_name("Document")
            .extends(cm("object"))
            .with_aspect(cm("titled"))
            .with_aspect(cm("versionable"))
            .declare(PropertySpec::new(cm("content"), DataType::Content))
            .declare(
                PropertySpec::new(cm("mimetype"), DataType::String)
                    .required()
                    .with_choices(vec![
                        ChoiceValue::new(
                            "mimetype-text",
                            Value::String("text/plain".into()),
                            "Plain Text",
                        ),
                        ChoiceValue::new(
                            "mimetype-pdf",
                            Value::String("application/pdf".into()),
                            "PDF",
                        ),
                    ]),
            ),
        ClassSpec::new(cm("pdfDocument"))
            .with_display_name("PDF Document")
            .extends(cm("document"))
            .with_aspect(cm("titled"))
            .with_aspect(cm("versionable"))
            .declare(PropertySpec::new(cm("pageCount"), DataType::Integer)),
        ClassSpec::new(cm("folder"))
            .with_display_name("Folder")
            .extends(cm("object"))
            .with_aspect(cm("titled"))
            .declare(PropertySpec::reference(cm("contains"), cm("object")).multi_valued()),
        ClassSpec::new(cm("link"))
            .with_display_name("Link")
            .extends(cm("object"))
            .declare(PropertySpec::reference(cm("destination"), cm("document")).required()),
        ClassSpec::new(cm("pdfLink"))
            .with_display_name("PDF Link")
            .extends(cm("link"))
            .declare(PropertySpec::reference(cm("destination"), cm("pdfDocument")).required()),
    ]
}

/// A conformant `cm:document` instance.
pub fn sample_document(id: &str) -> ObjectSpec {
    let created = Utc
        .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or_else(Utc::now);
    ObjectSpec::new(ObjectId::new(id), cm("document"))
        .with_value(PropertyValue::new(
            sys("node-id"),
            DataType::Id,
            Value::Id(ObjectId::new(id)),
        ))
        .with_value(PropertyValue::new(
            sys("guid"),
            DataType::Guid,
            Value::Guid(uuid::Uuid::new_v4()),
        ))
        .with_value(PropertyValue::new(
            cm("name"),
            DataType::String,
            Value::String(format!("{id}.txt")),
        ))
        .with_value(PropertyValue::new(cm("created"), DataType::DateTime, Value::DateTime(created)))
        .with_value(PropertyValue::new(
            cm("creator"),
            DataType::String,
            Value::String("admin".into()),
        ))
        .with_value(PropertyValue::new(cm("title"), DataType::String, Value::Null))
        .with_value(PropertyValue::new(cm("description"), DataType::String, Value::Null))
        .with_value(PropertyValue::new(
            cm("versionLabel"),
            DataType::String,
            Value::String("1.0".into()),
        ))
        .with_value(PropertyValue::new(cm("autoVersion"), DataType::Boolean, Value::Boolean(true)))
        .with_value(PropertyValue::new(cm("content"), DataType::Content, Value::Blob(b"hello".to_vec())))
        .with_value(PropertyValue::new(
            cm("mimetype"),
            DataType::String,
            Value::String("text/plain".into()),
        ))
}

/// Builder preloaded with the standard classes.
pub fn standard_builder() -> ModelBuilder {
    ModelBuilder::new("standard").classes(standard_classes())
}

/// The standard content model with one sample document, `doc-1`.
pub fn standard_model() -> BuildResult<InMemoryRepository> {
    standard_builder().object(sample_document("doc-1")).build()
}
