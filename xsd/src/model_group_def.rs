use roxmltree::Node;

use super::{
    components::{Component, Named},
    element_decl,
    error::ReadError,
    mapping_context::TopLevelMappable,
    model_group::ModelGroup,
    values::required_value,
    xstypes::{AnyURI, NCName, QName},
    MappingContext, Particle, Ref,
};

/// Schema Component: Model Group Definition (§3.7)
#[derive(Clone, Debug)]
pub struct ModelGroupDefinition {
    pub name: NCName,
    pub target_namespace: Option<AnyURI>,
    pub model_group: Ref<ModelGroup>,
}

impl ModelGroupDefinition {
    pub const TAG_NAME: &'static str = "group";

    pub(super) fn name_from_xml(group: Node, schema: Node) -> Result<QName, ReadError> {
        let name = required_value::<&str>(group, "name", Self::TAG_NAME)?;
        Ok(QName::with_optional_namespace(
            schema.attribute("targetNamespace"),
            name,
        ))
    }
}

impl Component for ModelGroupDefinition {
    const DISPLAY_NAME: &'static str = "ModelGroupDefinition";
}

impl Named for ModelGroupDefinition {
    fn name(&self) -> Option<QName> {
        Some(QName::with_optional_namespace(
            self.target_namespace.as_ref(),
            &self.name,
        ))
    }
}

impl TopLevelMappable for ModelGroupDefinition {
    fn map_from_top_level_xml(
        context: &mut MappingContext,
        self_ref: Ref<Self>,
        group: Node,
        schema: Node,
    ) -> Result<(), ReadError> {
        let QName {
            local_name: name,
            namespace_name: target_namespace,
        } = Self::name_from_xml(group, schema)?;

        // {model group}
        //   A model group which is the {term} of a particle corresponding to the <all>, <choice>
        //   or <sequence> among the [children] (there must be exactly one).
        let mut compositors = group
            .children()
            .filter(|c| matches!(c.tag_name().name(), "all" | "choice" | "sequence"));
        let (Some(compositor), None) = (compositors.next(), compositors.next()) else {
            return Err(ReadError::MissingChild {
                element: Self::TAG_NAME,
                child: "all|choice|sequence",
            });
        };

        let model_group = Particle::map_from_xml_model_group_term(
            context,
            compositor,
            schema,
            element_decl::ScopeParent::Group(self_ref),
        )?;

        context.insert(
            self_ref,
            Self {
                name,
                target_namespace,
                model_group,
            },
        );
        Ok(())
    }
}
