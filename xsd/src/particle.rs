use roxmltree::Node;

use super::{
    components::Component,
    element_decl,
    error::ReadError,
    model_group::Compositor,
    shared::Term,
    values::{actual_value, required_value},
    xstypes::QName,
    ElementDeclaration, MappingContext, ModelGroup, ModelGroupDefinition, Ref, Wildcard,
};

/// Schema Component: Particle (§3.9)
#[derive(Clone, Debug)]
pub struct Particle {
    pub min_occurs: u64,
    pub max_occurs: MaxOccurs,
    pub term: Term,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MaxOccurs {
    Unbounded,
    Count(u64),
}

impl MaxOccurs {
    pub fn mul(&self, other: &Self) -> Self {
        match (self, other) {
            (Self::Unbounded, _) | (_, Self::Unbounded) => Self::Unbounded,
            (Self::Count(a), Self::Count(b)) => Self::Count(a.saturating_mul(*b)),
        }
    }

    /// `true` if more than one occurrence is allowed.
    pub fn is_repeated(&self) -> bool {
        match self {
            Self::Unbounded => true,
            Self::Count(count) => *count > 1,
        }
    }

    pub fn count(&self) -> Option<u64> {
        match self {
            Self::Unbounded => None,
            Self::Count(count) => Some(*count),
        }
    }
}

/// Reads `minOccurs`/`maxOccurs`, defaulting both to 1.
fn occurrence_bounds(node: Node) -> Result<(u64, MaxOccurs), ReadError> {
    let min_occurs = actual_value::<u64>(node, "minOccurs")?.unwrap_or(1);
    let max_occurs = actual_value::<MaxOccurs>(node, "maxOccurs")?.unwrap_or(MaxOccurs::Count(1));
    if matches!(max_occurs, MaxOccurs::Count(max) if max < min_occurs) {
        return Err(ReadError::InvalidValue {
            attribute: "maxOccurs",
            value: format!("{max_occurs:?} < minOccurs {min_occurs}"),
        });
    }
    Ok((min_occurs, max_occurs))
}

impl Particle {
    /// Creates the particle for an `<element>` appearing inside a model group, either a local
    /// declaration or a `ref` to a global one.
    pub(super) fn map_from_xml_element(
        context: &mut MappingContext,
        element: Node,
        schema: Node,
        parent: element_decl::ScopeParent,
    ) -> Result<Ref<Self>, ReadError> {
        let (min_occurs, max_occurs) = occurrence_bounds(element)?;

        let term = if let Some(ref_) = actual_value::<QName>(element, "ref")? {
            // {term} The (top-level) element declaration ·resolved· to by the ·actual value· of
            //   the ref [attribute].
            let global = context.resolve::<Ref<ElementDeclaration>>(&ref_, "element")?;
            Term::ElementDeclaration(global)
        } else {
            Term::ElementDeclaration(ElementDeclaration::map_from_xml_local(
                context, element, schema, parent,
            )?)
        };

        Ok(context.create(Particle {
            min_occurs,
            max_occurs,
            term,
        }))
    }

    /// Maps the children of an `<all>`, `<choice>` or `<sequence>` element into a model group.
    pub(super) fn map_from_xml_model_group_term(
        context: &mut MappingContext,
        group: Node,
        schema: Node,
        parent: element_decl::ScopeParent,
    ) -> Result<Ref<ModelGroup>, ReadError> {
        // {compositor}
        //   One of all, choice, sequence depending on the element information item.
        let compositor = match group.tag_name().name() {
            "all" => Compositor::All,
            "choice" => Compositor::Choice,
            "sequence" => Compositor::Sequence,
            other => return Err(ReadError::Unsupported(format!("<{other}> as model group"))),
        };

        // {particles}
        //   A sequence of particles corresponding to all the <all>, <choice>, <sequence>,
        //   <any>, <group> or <element> items among the [children], in order.
        let particles = group
            .children()
            .filter(|child| child.is_element())
            .filter_map(|child| match child.tag_name().name() {
                "all" | "choice" | "sequence" => Some(Self::map_from_xml_model_group(
                    context, child, schema, parent,
                )),
                "any" => Some(Self::map_from_xml_wildcard_any(context, child)),
                "group" => Some(Self::map_from_xml_group_reference(context, child)),
                "element" => Some(Self::map_from_xml_element(context, child, schema, parent)),
                _ => None,
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(context.create(ModelGroup {
            compositor,
            particles,
        }))
    }

    /// Mapper for model groups `<all>`, `<sequence>`, and `<choice>` in particle position.
    pub(super) fn map_from_xml_model_group(
        context: &mut MappingContext,
        group: Node,
        schema: Node,
        parent: element_decl::ScopeParent,
    ) -> Result<Ref<Self>, ReadError> {
        let (min_occurs, max_occurs) = occurrence_bounds(group)?;
        let model_group = Self::map_from_xml_model_group_term(context, group, schema, parent)?;

        Ok(context.create(Particle {
            min_occurs,
            max_occurs,
            term: Term::ModelGroup(model_group),
        }))
    }

    /// Mapper for group references `<group ref="..."/>` (§3.7.2)
    pub(super) fn map_from_xml_group_reference(
        context: &mut MappingContext,
        group: Node,
    ) -> Result<Ref<Self>, ReadError> {
        let (min_occurs, max_occurs) = occurrence_bounds(group)?;

        // {term} The {model group} of the model group definition ·resolved· to by the ·actual
        //   value· of the ref [attribute]
        let ref_ = required_value::<QName>(group, "ref", "group")?;
        let definition = context.resolve::<Ref<ModelGroupDefinition>>(&ref_, "group")?;
        let model_group = context.request(definition)?.model_group;

        Ok(context.create(Particle {
            min_occurs,
            max_occurs,
            term: Term::ModelGroup(model_group),
        }))
    }

    /// Mapper for wildcards `<any>` (§3.10.2)
    pub(super) fn map_from_xml_wildcard_any(
        context: &mut MappingContext,
        any: Node,
    ) -> Result<Ref<Self>, ReadError> {
        let (min_occurs, max_occurs) = occurrence_bounds(any)?;
        let wildcard = Wildcard::map_from_xml(context, any)?;

        Ok(context.create(Particle {
            min_occurs,
            max_occurs,
            term: Term::Wildcard(wildcard),
        }))
    }
}

impl Component for Particle {
    const DISPLAY_NAME: &'static str = "Particle";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_occurs_multiplication() {
        let two = MaxOccurs::Count(2);
        assert_eq!(two.mul(&MaxOccurs::Count(3)), MaxOccurs::Count(6));
        assert_eq!(two.mul(&MaxOccurs::Unbounded), MaxOccurs::Unbounded);
        assert!(!MaxOccurs::Count(1).is_repeated());
        assert!(MaxOccurs::Count(0).mul(&MaxOccurs::Count(5)).count() == Some(0));
        assert!(MaxOccurs::Unbounded.is_repeated());
    }
}
