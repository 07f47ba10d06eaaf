//! Derives a [`CodeModel`] from a [`SchemaGraph`].

mod class;
mod context;
mod particle;

use std::collections::HashSet;

use indexmap::IndexMap;
use tracing::debug;

use tm_xsd::{is_builtin_name, QName, SchemaGraph};

use crate::error::GenerateError;
use crate::model::{ClassModel, CodeModel, TypeName};
use crate::namespace::NamespaceMapper;
use crate::resolver::TypeNameResolver;

use self::class::ElementClass;
use self::context::GeneratorContext;

/// Configuration for deriving code models. One builder can derive models for any number of
/// schema graphs.
#[derive(Clone, Debug, Default)]
pub struct CodeModelBuilder {
    namespaces: NamespaceMapper,
    existing_types: IndexMap<QName, TypeName>,
}

impl CodeModelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps the XML namespace `xml_namespace` (empty for no namespace) to `output_namespace`.
    /// Later calls for the same XML namespace win.
    pub fn map_namespace(
        &mut self,
        xml_namespace: impl Into<String>,
        output_namespace: impl Into<String>,
    ) -> &mut Self {
        self.namespaces.register(xml_namespace, output_namespace);
        self
    }

    /// Declares that `type_name` already exists for the global type or element `xml_name`. No
    /// class is generated for it and all references to it use `type_name`.
    pub fn add_existing_type(&mut self, xml_name: QName, type_name: TypeName) -> &mut Self {
        self.existing_types.insert(xml_name, type_name);
        self
    }

    pub fn namespaces(&self) -> &NamespaceMapper {
        &self.namespaces
    }

    /// The resolver this builder names classes with.
    pub fn resolver<'a>(&'a self, graph: &'a SchemaGraph) -> TypeNameResolver<'a> {
        TypeNameResolver::new(graph, &self.namespaces, &self.existing_types)
    }

    pub fn build(&self, graph: &SchemaGraph) -> Result<CodeModel, GenerateError> {
        let mut context = GeneratorContext::new(self.resolver(graph));
        let mut classes = ClassSet::default();

        for (name, type_def) in graph.type_definitions() {
            if self.skips(name) {
                continue;
            }
            classes.insert(context.type_class(*type_def)?)?;
        }

        for (name, element) in graph.element_declarations() {
            if self.skips(name) {
                continue;
            }
            match context.element_class(*element, &classes.classes)? {
                ElementClass::New(class) => classes.insert(class)?,
                ElementClass::RootOf { class, root_element } => {
                    if let Some(class) = classes.classes.get_mut(&class) {
                        class.xml.root_element = Some(root_element);
                    }
                }
            }
        }

        for (name, attribute) in graph.attribute_declarations() {
            if self.skips(name) {
                continue;
            }
            if let Some(class) = context.attribute_class(*attribute)? {
                classes.insert(class)?;
            }
        }

        let mut model = CodeModel::default();
        for class in classes.classes.into_values() {
            model
                .namespaces
                .entry(class.namespace.clone())
                .or_default()
                .push(class);
        }
        Ok(model)
    }

    fn skips(&self, name: &QName) -> bool {
        is_builtin_name(name) || self.existing_types.contains_key(name)
    }
}

/// The top-level classes generated so far plus every name declared by them or their nested
/// classes.
#[derive(Default)]
struct ClassSet {
    classes: IndexMap<TypeName, ClassModel>,
    declared: HashSet<TypeName>,
}

impl ClassSet {
    fn insert(&mut self, class: ClassModel) -> Result<(), GenerateError> {
        self.declare(&class)?;
        debug!(name = %class.name, properties = class.properties.len(), "generated class");
        self.classes.insert(class.name.clone(), class);
        Ok(())
    }

    fn declare(&mut self, class: &ClassModel) -> Result<(), GenerateError> {
        if !self.declared.insert(class.name.clone()) {
            return Err(GenerateError::DuplicateTypeName {
                name: class.name.clone(),
            });
        }
        class
            .nested
            .iter()
            .try_for_each(|nested| self.declare(nested))
    }
}
