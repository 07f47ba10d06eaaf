use roxmltree::Node;

use super::{
    annotation,
    builtins::XS_ANY_SIMPLE_TYPE_NAME,
    components::{Component, Named},
    element_decl::is_qualified,
    error::ReadError,
    mapping_context::TopLevelMappable,
    shared::{self, ValueConstraint},
    simple_type_def::{self, SimpleTypeDefinition},
    values::{actual_value, required_value},
    xstypes::{AnyURI, NCName, QName},
    AttributeGroupDefinition, ComplexTypeDefinition, MappingContext, Ref,
};

/// Schema Component: Attribute Declaration (§3.2)
#[derive(Clone, Debug)]
pub struct AttributeDeclaration {
    pub documentation: Option<String>,
    pub name: NCName,
    pub target_namespace: Option<AnyURI>,
    pub type_definition: Ref<SimpleTypeDefinition>,
    pub scope: Scope,
    pub value_constraint: Option<ValueConstraint>,
}

/// Property Record: Scope (§3.2)
pub type Scope = shared::Scope<ScopeParent>;

#[derive(Copy, Clone, Debug)]
pub enum ScopeParent {
    ComplexType(Ref<ComplexTypeDefinition>),
    AttributeGroup(Ref<AttributeGroupDefinition>),
}

impl AttributeDeclaration {
    pub const TAG_NAME: &'static str = "attribute";

    pub fn qualified_name(&self) -> QName {
        QName::with_optional_namespace(self.target_namespace.as_ref(), &self.name)
    }

    pub(super) fn name_from_xml(attribute: Node, schema: Node) -> Result<QName, ReadError> {
        let name = required_value::<&str>(attribute, "name", Self::TAG_NAME)?;
        Ok(QName::with_optional_namespace(
            schema.attribute("targetNamespace"),
            name,
        ))
    }

    fn map_from_xml_common(
        context: &mut MappingContext,
        self_ref: Ref<Self>,
        attribute: Node,
        schema: Node,
        target_namespace: Option<AnyURI>,
        scope: Scope,
    ) -> Result<Ref<Self>, ReadError> {
        // {name} The ·actual value· of the name [attribute]
        let name = required_value::<String>(attribute, "name", Self::TAG_NAME)?;

        // {type definition}
        //   The simple type definition corresponding to the <simpleType> element information item
        //   in the [children], if present, otherwise the simple type definition ·resolved· to by
        //   the ·actual value· of the type [attribute], if present, otherwise ·xs:anySimpleType·.
        let inline = attribute
            .children()
            .find(|c| c.tag_name().name() == SimpleTypeDefinition::TAG_NAME);
        let type_definition = if let Some(simple_type) = inline {
            SimpleTypeDefinition::map_from_xml(
                context,
                simple_type,
                schema,
                None,
                Some(simple_type_def::Context::Attribute(self_ref)),
            )?
        } else if let Some(type_) = actual_value::<QName>(attribute, "type")? {
            context.resolve(&type_, "simple type")?
        } else {
            context.resolve(&XS_ANY_SIMPLE_TYPE_NAME, "simple type")?
        };

        let declaration = Self {
            documentation: annotation::documentation(attribute),
            name,
            target_namespace,
            type_definition,
            scope,
            value_constraint: ValueConstraint::from_xml(attribute),
        };
        Ok(context.insert(self_ref, declaration))
    }

    pub(super) fn map_from_xml_global(
        context: &mut MappingContext,
        self_ref: Ref<Self>,
        attribute: Node,
        schema: Node,
    ) -> Result<Ref<Self>, ReadError> {
        let target_namespace = schema.attribute("targetNamespace").map(str::to_string);
        Self::map_from_xml_common(
            context,
            self_ref,
            attribute,
            schema,
            target_namespace,
            Scope::Global,
        )
    }

    pub(super) fn map_from_xml_local(
        context: &mut MappingContext,
        attribute: Node,
        schema: Node,
        parent: ScopeParent,
    ) -> Result<Ref<Self>, ReadError> {
        let self_ref = context.reserve();

        // {target namespace}
        //   The targetNamespace of the <schema> ancestor if the attribute is qualified (through
        //   form or attributeFormDefault), otherwise ·absent·.
        let target_namespace = match attribute.attribute("targetNamespace") {
            Some(namespace) => Some(namespace.to_string()),
            None => is_qualified(attribute, schema, "attributeFormDefault")?
                .then(|| schema.attribute("targetNamespace").map(str::to_string))
                .flatten(),
        };

        Self::map_from_xml_common(
            context,
            self_ref,
            attribute,
            schema,
            target_namespace,
            Scope::Local(parent),
        )
    }
}

impl Component for AttributeDeclaration {
    const DISPLAY_NAME: &'static str = "AttributeDeclaration";
}

impl Named for AttributeDeclaration {
    fn name(&self) -> Option<QName> {
        Some(self.qualified_name())
    }
}

impl TopLevelMappable for AttributeDeclaration {
    fn map_from_top_level_xml(
        context: &mut MappingContext,
        self_ref: Ref<Self>,
        attribute: Node,
        schema: Node,
    ) -> Result<(), ReadError> {
        Self::map_from_xml_global(context, self_ref, attribute, schema)?;
        Ok(())
    }
}
