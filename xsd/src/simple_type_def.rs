use roxmltree::Node;

use super::{
    annotation,
    builtins::{XS_ANY_SIMPLE_TYPE_NAME, XS_NAMESPACE},
    components::{Component, ComponentTable, Named},
    error::ReadError,
    mapping_context::TopLevelMappable,
    values::actual_value,
    xstypes::{AnyURI, NCName, QName, Sequence},
    AttributeDeclaration, ComplexTypeDefinition, ElementDeclaration, MappingContext, Ref,
};

/// Schema Component: Simple Type Definition, a kind of Type Definition (§3.16)
///
/// Constraining facets other than `enumeration` are not kept.
#[derive(Clone, Debug)]
pub struct SimpleTypeDefinition {
    pub documentation: Option<String>,
    pub name: Option<NCName>,
    pub target_namespace: Option<AnyURI>,
    /// Absent only for `xs:anySimpleType`.
    pub base_type_definition: Option<Ref<SimpleTypeDefinition>>,
    /// Absent only for `xs:anySimpleType`.
    pub variety: Option<Variety>,
    pub item_type_definition: Option<Ref<SimpleTypeDefinition>>,
    pub member_type_definitions: Sequence<Ref<SimpleTypeDefinition>>,
    pub enumeration: Sequence<String>,
    pub context: Option<Context>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Variety {
    Atomic,
    List,
    Union,
}

/// The declaration an anonymous simple type definition appears in.
#[derive(Copy, Clone, Debug)]
pub enum Context {
    Attribute(Ref<AttributeDeclaration>),
    Element(Ref<ElementDeclaration>),
    ComplexType(Ref<ComplexTypeDefinition>),
    SimpleType(Ref<SimpleTypeDefinition>),
}

impl SimpleTypeDefinition {
    pub const TAG_NAME: &'static str = "simpleType";

    pub(super) fn builtin(
        name: &str,
        base_type_definition: Option<Ref<Self>>,
        variety: Option<Variety>,
    ) -> Self {
        Self {
            documentation: None,
            name: Some(name.into()),
            target_namespace: Some(XS_NAMESPACE.into()),
            base_type_definition,
            variety,
            item_type_definition: None,
            member_type_definitions: Vec::new(),
            enumeration: Vec::new(),
            context: None,
        }
    }

    /// `true` if this is a restriction that only enumerates permitted values.
    pub fn is_enumeration(&self) -> bool {
        self.variety == Some(Variety::Atomic) && !self.enumeration.is_empty()
    }

    /// Follows the base type chain until a named type definition is reached. For named types this
    /// is the type itself.
    pub fn named_ancestor(self_ref: Ref<Self>, table: &impl ComponentTable) -> Ref<Self> {
        let mut current = self_ref;
        loop {
            let definition = current.get(table);
            match (&definition.name, definition.base_type_definition) {
                (None, Some(base)) => current = base,
                _ => return current,
            }
        }
    }

    pub(super) fn name_from_xml(simple_type: Node, schema: Node) -> Option<QName> {
        let name = simple_type.attribute("name")?;
        Some(QName::with_optional_namespace(
            schema.attribute("targetNamespace"),
            name,
        ))
    }

    /// Maps a `<simpleType>` element. `self_ref` is given for top-level definitions, which have
    /// been reserved beforehand.
    pub(super) fn map_from_xml(
        context: &mut MappingContext,
        simple_type: Node,
        schema: Node,
        self_ref: Option<Ref<Self>>,
        type_context: Option<Context>,
    ) -> Result<Ref<Self>, ReadError> {
        let self_ref = self_ref.unwrap_or_else(|| context.reserve());

        // {name}, {target namespace}
        //   The ·actual value· of the name [attribute] if present on the <simpleType> element,
        //   otherwise ·absent·; the targetNamespace of the <schema> ancestor if {name} is present.
        let (name, target_namespace) = match Self::name_from_xml(simple_type, schema) {
            Some(name) => (Some(name.local_name), name.namespace_name),
            None => (None, None),
        };

        let derivation = simple_type
            .children()
            .find(|c| matches!(c.tag_name().name(), "restriction" | "list" | "union"))
            .ok_or(ReadError::MissingChild {
                element: "simpleType",
                child: "restriction|list|union",
            })?;

        let nested_context = Some(Context::SimpleType(self_ref));
        let mut definition = Self {
            documentation: annotation::documentation(simple_type),
            name,
            target_namespace,
            base_type_definition: None,
            variety: None,
            item_type_definition: None,
            member_type_definitions: Vec::new(),
            enumeration: Vec::new(),
            context: type_context,
        };

        match derivation.tag_name().name() {
            "restriction" => {
                // {base type definition}
                //   The type definition ·resolved· to by the ·actual value· of the base [attribute]
                //   or the <simpleType> [children], whichever is present.
                let base = Self::map_base(context, derivation, schema, nested_context)?;
                let base_definition = context.request(base)?;

                // {variety} The {variety} of the {base type definition}
                definition.variety = base_definition.variety;
                definition.item_type_definition = base_definition.item_type_definition;
                definition.member_type_definitions =
                    base_definition.member_type_definitions.clone();
                definition.base_type_definition = Some(base);
                definition.enumeration = Self::enumeration_facets(derivation);
            }
            "list" => {
                // {item type definition}
                //   The type definition ·resolved· to by the ·actual value· of the itemType
                //   [attribute] of <list>, or the <simpleType> among the [children] of <list>.
                let item = match actual_value::<QName>(derivation, "itemType")? {
                    Some(item_type) => context.resolve(&item_type, "type")?,
                    None => Self::map_inline_child(context, derivation, schema, nested_context)?,
                };
                definition.variety = Some(Variety::List);
                definition.item_type_definition = Some(item);
                definition.base_type_definition =
                    Some(context.resolve(&XS_ANY_SIMPLE_TYPE_NAME, "type")?);
            }
            _ => {
                // {member type definitions}
                //   The sequence of type definitions ·resolved· to by the items in the ·actual
                //   value· of the memberTypes [attribute] of <union>, if any, followed by the type
                //   definitions corresponding to the <simpleType>s among the [children].
                let mut members = Vec::new();
                for member_type in actual_value::<Vec<QName>>(derivation, "memberTypes")?
                    .unwrap_or_default()
                {
                    members.push(context.resolve(&member_type, "type")?);
                }
                for child in derivation
                    .children()
                    .filter(|c| c.tag_name().name() == Self::TAG_NAME)
                {
                    members.push(Self::map_from_xml(
                        context,
                        child,
                        schema,
                        None,
                        nested_context,
                    )?);
                }
                definition.variety = Some(Variety::Union);
                definition.member_type_definitions = members;
                definition.base_type_definition =
                    Some(context.resolve(&XS_ANY_SIMPLE_TYPE_NAME, "type")?);
            }
        }

        Ok(context.insert(self_ref, definition))
    }

    /// Resolves the `base` attribute of a `<restriction>`, or maps its inline `<simpleType>`.
    pub(super) fn map_base(
        context: &mut MappingContext,
        restriction: Node,
        schema: Node,
        nested_context: Option<Context>,
    ) -> Result<Ref<Self>, ReadError> {
        match actual_value::<QName>(restriction, "base")? {
            Some(base) => context.resolve(&base, "simple type"),
            None => Self::map_inline_child(context, restriction, schema, nested_context),
        }
    }

    fn map_inline_child(
        context: &mut MappingContext,
        parent: Node,
        schema: Node,
        nested_context: Option<Context>,
    ) -> Result<Ref<Self>, ReadError> {
        let child = parent
            .children()
            .find(|c| c.tag_name().name() == Self::TAG_NAME)
            .ok_or(ReadError::MissingAttribute {
                element: "simpleType",
                attribute: "base",
            })?;
        Self::map_from_xml(context, child, schema, None, nested_context)
    }

    pub(super) fn enumeration_facets(restriction: Node) -> Sequence<String> {
        restriction
            .children()
            .filter(|c| c.tag_name().name() == "enumeration")
            .filter_map(|c| c.attribute("value"))
            .map(str::to_string)
            .collect()
    }
}

impl Component for SimpleTypeDefinition {
    const DISPLAY_NAME: &'static str = "SimpleTypeDefinition";
}

impl Named for SimpleTypeDefinition {
    fn name(&self) -> Option<QName> {
        self.name.as_ref().map(|name| {
            QName::with_optional_namespace(self.target_namespace.as_ref(), name)
        })
    }
}

impl TopLevelMappable for SimpleTypeDefinition {
    fn map_from_top_level_xml(
        context: &mut MappingContext,
        self_ref: Ref<Self>,
        simple_type: Node,
        schema: Node,
    ) -> Result<(), ReadError> {
        Self::map_from_xml(context, simple_type, schema, Some(self_ref), None)?;
        Ok(())
    }
}
