use roxmltree::Node;
use tracing::warn;

use super::{
    attribute_decl::{self, AttributeDeclaration},
    components::Component,
    error::ReadError,
    shared::ValueConstraint,
    values::required_value,
    xstypes::{QName, Set},
    AttributeGroupDefinition, MappingContext, Ref,
};

/// Schema Component: Attribute Use (§3.5)
#[derive(Clone, Debug)]
pub struct AttributeUse {
    pub required: bool,
    pub attribute_declaration: Ref<AttributeDeclaration>,
    pub value_constraint: Option<ValueConstraint>,
}

impl AttributeUse {
    /// Maps the `<attribute>` and `<attributeGroup ref>` children of `parent` (a complex type, an
    /// extension/restriction or an attribute group) into attribute uses, in document order.
    /// Prohibited uses are dropped.
    pub(super) fn map_attribute_uses(
        context: &mut MappingContext,
        parent: Node,
        schema: Node,
        scope_parent: attribute_decl::ScopeParent,
    ) -> Result<Set<Ref<Self>>, ReadError> {
        let mut uses = Vec::new();
        for child in parent.children().filter(Node::is_element) {
            match child.tag_name().name() {
                "attribute" => {
                    if let Some(use_) = Self::map_from_xml(context, child, schema, scope_parent)? {
                        uses.push(use_);
                    }
                }
                "attributeGroup" => {
                    let ref_ = required_value::<QName>(child, "ref", "attributeGroup")?;
                    let group =
                        context.resolve::<Ref<AttributeGroupDefinition>>(&ref_, "attribute group")?;
                    uses.extend(context.request(group)?.attribute_uses.iter().copied());
                }
                "anyAttribute" => warn!("attribute wildcards are not supported, skipping"),
                _ => {}
            }
        }
        Ok(uses)
    }

    fn map_from_xml(
        context: &mut MappingContext,
        attribute: Node,
        schema: Node,
        scope_parent: attribute_decl::ScopeParent,
    ) -> Result<Option<Ref<Self>>, ReadError> {
        // {required} true if use = required, otherwise false.
        let required = match attribute.attribute("use") {
            None | Some("optional") => false,
            Some("required") => true,
            Some("prohibited") => return Ok(None),
            Some(other) => {
                return Err(ReadError::InvalidValue {
                    attribute: "use",
                    value: other.to_string(),
                })
            }
        };

        // {attribute declaration}
        //   If the <attribute> element has a ref [attribute], the (top-level) attribute declaration
        //   ·resolved· to by it; otherwise a local declaration corresponding to the element.
        let attribute_declaration = match attribute.attribute("ref") {
            Some(_) => {
                let ref_ = required_value::<QName>(attribute, "ref", "attribute")?;
                context.resolve::<Ref<AttributeDeclaration>>(&ref_, "attribute")?
            }
            None => {
                AttributeDeclaration::map_from_xml_local(context, attribute, schema, scope_parent)?
            }
        };

        Ok(Some(context.create(Self {
            required,
            attribute_declaration,
            value_constraint: ValueConstraint::from_xml(attribute),
        })))
    }
}

impl Component for AttributeUse {
    const DISPLAY_NAME: &'static str = "AttributeUse";
}
