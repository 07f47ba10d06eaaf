use indexmap::IndexMap;
use roxmltree::Node;
use tracing::{debug, warn};

use super::{
    builtins::{self, XS_NAMESPACE},
    components::{
        Component, ComponentTable, ComponentTraits, HasArenaContainer, Lookup, LookupTables,
    },
    error::ReadError,
    mapping_context::TopLevelMappable,
    shared::TypeDefinition,
    xstypes::QName,
    AttributeDeclaration, AttributeGroupDefinition, ComplexTypeDefinition, ElementDeclaration,
    MappingContext, ModelGroupDefinition, Ref, SchemaComponentTable, SimpleTypeDefinition,
};

/// Options for [`read_schema`] and [`read_schemas`].
#[derive(Copy, Clone, Debug, Default)]
pub struct ReadOptions {
    /// Accept documents with a DOCTYPE declaration.
    pub allow_dtd: bool,
}

/// A compiled set of schema documents: the component table plus the global symbol spaces the
/// code model is derived from.
///
/// The symbol spaces keep declaration order and include the built-in types of the XML Schema
/// namespace.
pub struct SchemaGraph {
    components: SchemaComponentTable,
    type_definitions: IndexMap<QName, TypeDefinition>,
    element_declarations: IndexMap<QName, Ref<ElementDeclaration>>,
    attribute_declarations: IndexMap<QName, Ref<AttributeDeclaration>>,
}

impl SchemaGraph {
    pub fn components(&self) -> &SchemaComponentTable {
        &self.components
    }

    pub fn type_definitions(&self) -> &IndexMap<QName, TypeDefinition> {
        &self.type_definitions
    }

    pub fn element_declarations(&self) -> &IndexMap<QName, Ref<ElementDeclaration>> {
        &self.element_declarations
    }

    pub fn attribute_declarations(&self) -> &IndexMap<QName, Ref<AttributeDeclaration>> {
        &self.attribute_declarations
    }

    pub fn type_definition(&self, name: &QName) -> Option<TypeDefinition> {
        self.type_definitions.get(name).copied()
    }

    pub fn element_declaration(&self, name: &QName) -> Option<Ref<ElementDeclaration>> {
        self.element_declarations.get(name).copied()
    }

    pub fn attribute_declaration(&self, name: &QName) -> Option<Ref<AttributeDeclaration>> {
        self.attribute_declarations.get(name).copied()
    }
}

impl ComponentTable for SchemaGraph {
    fn get<R>(&self, ref_: Ref<R>) -> &R
    where
        R: Component,
        ComponentTraits: HasArenaContainer<R>,
    {
        self.components.get(ref_)
    }
}

/// A reserved top-level component, mapped in the second pass.
#[derive(Copy, Clone)]
enum TopLevelRef {
    SimpleType(Ref<SimpleTypeDefinition>),
    ComplexType(Ref<ComplexTypeDefinition>),
    Element(Ref<ElementDeclaration>),
    Attribute(Ref<AttributeDeclaration>),
    AttributeGroup(Ref<AttributeGroupDefinition>),
    Group(Ref<ModelGroupDefinition>),
}

/// Compiles a single schema document.
pub fn read_schema(text: &str, options: ReadOptions) -> Result<SchemaGraph, ReadError> {
    read_schemas(&[text], options)
}

/// Compiles several schema documents into one graph. Documents may reference each other's
/// top-level components; `import`/`include` elements themselves are not followed.
pub fn read_schemas(texts: &[&str], options: ReadOptions) -> Result<SchemaGraph, ReadError> {
    let parsing_options = roxmltree::ParsingOptions {
        allow_dtd: options.allow_dtd,
        ..Default::default()
    };
    let documents = texts
        .iter()
        .map(|text| roxmltree::Document::parse_with_options(text, parsing_options))
        .collect::<Result<Vec<_>, _>>()?;

    let mut context = MappingContext::new();
    builtins::register_builtins(&mut context);

    // Reserve and register all top-level components first, so that references resolve
    // independently of declaration order.
    let mut top_level = Vec::new();
    for document in &documents {
        let schema = document.root_element();
        let tag_name = schema.tag_name();
        if tag_name.name() != "schema" || tag_name.namespace() != Some(XS_NAMESPACE) {
            return Err(ReadError::NotASchema(tag_name.name().to_string()));
        }
        for node in schema.children().filter(Node::is_element) {
            if let Some(ref_) = reserve_top_level(&mut context, node, schema)? {
                top_level.push(ref_);
            }
        }
    }
    debug!(
        documents = documents.len(),
        components = top_level.len(),
        "registered top-level components"
    );

    for ref_ in top_level {
        match ref_ {
            TopLevelRef::SimpleType(ref_) => {
                context.request(ref_)?;
            }
            TopLevelRef::ComplexType(ref_) => {
                context.request(ref_)?;
            }
            TopLevelRef::Element(ref_) => {
                context.request(ref_)?;
            }
            TopLevelRef::Attribute(ref_) => {
                context.request(ref_)?;
            }
            TopLevelRef::AttributeGroup(ref_) => {
                context.request(ref_)?;
            }
            TopLevelRef::Group(ref_) => {
                context.request(ref_)?;
            }
        }
    }

    let LookupTables {
        type_definitions,
        attribute_declarations,
        element_declarations,
        ..
    } = context.lookups;
    let components = context
        .components
        .convert_to_schema_table()
        .ok_or(ReadError::Incomplete)?;

    Ok(SchemaGraph {
        components,
        type_definitions,
        element_declarations,
        attribute_declarations,
    })
}

fn reserve_top_level<'a, 'input: 'a>(
    context: &mut MappingContext<'a, 'input>,
    node: Node<'a, 'input>,
    schema: Node<'a, 'input>,
) -> Result<Option<TopLevelRef>, ReadError> {
    fn reserve<'a, 'input: 'a, C>(
        context: &mut MappingContext<'a, 'input>,
        name: QName,
        kind: &'static str,
        node: Node<'a, 'input>,
        schema: Node<'a, 'input>,
    ) -> Result<Ref<C>, ReadError>
    where
        C: TopLevelMappable,
        ComponentTraits: HasArenaContainer<C>,
        LookupTables: Lookup<Ref<C>>,
    {
        let ref_ = context.reserve::<C>();
        context.register_with_name(name, ref_, kind)?;
        context.declare_top_level(ref_, node, schema);
        Ok(ref_)
    }

    let ref_ = match node.tag_name().name() {
        SimpleTypeDefinition::TAG_NAME => {
            let name = SimpleTypeDefinition::name_from_xml(node, schema).ok_or(
                ReadError::MissingAttribute {
                    element: SimpleTypeDefinition::TAG_NAME,
                    attribute: "name",
                },
            )?;
            let ref_ = context.reserve();
            context.register_with_name(name, TypeDefinition::Simple(ref_), "type")?;
            context.declare_top_level(ref_, node, schema);
            TopLevelRef::SimpleType(ref_)
        }
        ComplexTypeDefinition::TAG_NAME => {
            let name = ComplexTypeDefinition::name_from_xml(node, schema).ok_or(
                ReadError::MissingAttribute {
                    element: ComplexTypeDefinition::TAG_NAME,
                    attribute: "name",
                },
            )?;
            let ref_ = context.reserve();
            context.register_with_name(name, TypeDefinition::Complex(ref_), "type")?;
            context.declare_top_level(ref_, node, schema);
            TopLevelRef::ComplexType(ref_)
        }
        ElementDeclaration::TAG_NAME => {
            let name = ElementDeclaration::name_from_xml(node, schema)?;
            TopLevelRef::Element(reserve(context, name, "element", node, schema)?)
        }
        AttributeDeclaration::TAG_NAME => {
            let name = AttributeDeclaration::name_from_xml(node, schema)?;
            TopLevelRef::Attribute(reserve(context, name, "attribute", node, schema)?)
        }
        AttributeGroupDefinition::TAG_NAME => {
            let name = AttributeGroupDefinition::name_from_xml(node, schema)?;
            TopLevelRef::AttributeGroup(reserve(context, name, "attribute group", node, schema)?)
        }
        ModelGroupDefinition::TAG_NAME => {
            let name = ModelGroupDefinition::name_from_xml(node, schema)?;
            TopLevelRef::Group(reserve(context, name, "group", node, schema)?)
        }
        "annotation" => return Ok(None),
        "import" | "include" | "redefine" | "override" => {
            let location = node.attribute("schemaLocation").unwrap_or("<no location>");
            warn!(
                element = node.tag_name().name(),
                location, "schema composition is not supported, skipping"
            );
            return Ok(None);
        }
        "notation" => {
            warn!("notation declarations are not supported, skipping");
            return Ok(None);
        }
        other => return Err(ReadError::Unsupported(format!("top-level <{other}>"))),
    };
    Ok(Some(ref_))
}
