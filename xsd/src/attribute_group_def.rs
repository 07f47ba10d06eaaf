use roxmltree::Node;

use super::{
    attribute_decl,
    attribute_use::AttributeUse,
    components::{Component, Named},
    error::ReadError,
    mapping_context::TopLevelMappable,
    values::required_value,
    xstypes::{AnyURI, NCName, QName, Set},
    MappingContext, Ref,
};

/// Schema Component: Attribute Group Definition (§3.6)
#[derive(Clone, Debug)]
pub struct AttributeGroupDefinition {
    pub name: NCName,
    pub target_namespace: Option<AnyURI>,
    pub attribute_uses: Set<Ref<AttributeUse>>,
}

impl AttributeGroupDefinition {
    pub const TAG_NAME: &'static str = "attributeGroup";

    pub(super) fn name_from_xml(attribute_group: Node, schema: Node) -> Result<QName, ReadError> {
        let name = required_value::<&str>(attribute_group, "name", Self::TAG_NAME)?;
        Ok(QName::with_optional_namespace(
            schema.attribute("targetNamespace"),
            name,
        ))
    }
}

impl Component for AttributeGroupDefinition {
    const DISPLAY_NAME: &'static str = "AttributeGroupDefinition";
}

impl Named for AttributeGroupDefinition {
    fn name(&self) -> Option<QName> {
        Some(QName::with_optional_namespace(
            self.target_namespace.as_ref(),
            &self.name,
        ))
    }
}

impl TopLevelMappable for AttributeGroupDefinition {
    fn map_from_top_level_xml(
        context: &mut MappingContext,
        self_ref: Ref<Self>,
        attribute_group: Node,
        schema: Node,
    ) -> Result<(), ReadError> {
        let QName {
            local_name: name,
            namespace_name: target_namespace,
        } = Self::name_from_xml(attribute_group, schema)?;

        // {attribute uses}
        //   The union of the set of attribute uses corresponding to the <attribute> [children], if
        //   any, with the {attribute uses} of the attribute groups ·resolved· to by the ·actual
        //   value·s of the ref [attribute] of the <attributeGroup> [children], if any.
        let attribute_uses = AttributeUse::map_attribute_uses(
            context,
            attribute_group,
            schema,
            attribute_decl::ScopeParent::AttributeGroup(self_ref),
        )?;

        context.insert(
            self_ref,
            Self {
                name,
                target_namespace,
                attribute_uses,
            },
        );
        Ok(())
    }
}
