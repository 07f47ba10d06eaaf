use tm_xsd::{
    model_group::Compositor, particle::MaxOccurs, ComponentTable, ElementDeclaration, Particle,
    Ref, Term, TypeDefinition,
};

use super::context::GeneratorContext;
use crate::error::{Construct, GenerateError};
use crate::model::{
    Cardinality, ClassModel, PropertyModel, TypeRef, XmlBinding, XmlName, XmlNodeKind,
};
use crate::naming;
use crate::resolver::Entity;

type Result<T> = std::result::Result<T, GenerateError>;

/// How a particle is expanded into properties.
#[derive(Copy, Clone, Debug)]
pub(crate) enum ParticleKind<'a> {
    Sequence(&'a [Ref<Particle>]),
    Choice(&'a [Ref<Particle>]),
    All,
    Any,
    SingleElement(Ref<ElementDeclaration>),
    /// Never occurs, or a group without particles.
    Empty,
}

impl<'a> ParticleKind<'a> {
    pub(crate) fn of<T: ComponentTable>(particle: &Particle, table: &'a T) -> Self {
        if particle.max_occurs == MaxOccurs::Count(0) {
            return Self::Empty;
        }
        match particle.term {
            Term::ElementDeclaration(element) => Self::SingleElement(element),
            Term::Wildcard(_) => Self::Any,
            Term::ModelGroup(group) => {
                let group = group.get(table);
                if group.particles.is_empty() {
                    return Self::Empty;
                }
                match group.compositor {
                    Compositor::Sequence => Self::Sequence(&group.particles),
                    Compositor::Choice => Self::Choice(&group.particles),
                    Compositor::All => Self::All,
                }
            }
        }
    }
}

/// Occurrence bounds accumulated from the enclosing particles.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(super) struct Occurs {
    min: u64,
    max: MaxOccurs,
}

impl Occurs {
    pub(super) const ONCE: Self = Self {
        min: 1,
        max: MaxOccurs::Count(1),
    };

    fn times(self, particle: &Particle) -> Self {
        Self {
            min: self.min.saturating_mul(particle.min_occurs),
            max: self.max.mul(&particle.max_occurs),
        }
    }

    /// Only one branch of a choice occurs, so none of them is required.
    fn optional(self) -> Self {
        Self { min: 0, ..self }
    }
}

impl GeneratorContext<'_> {
    /// Appends the properties for `particle` to `properties`, in document order.
    pub(super) fn expand_particle(
        &mut self,
        particle_ref: Ref<Particle>,
        outer: Occurs,
        properties: &mut Vec<PropertyModel>,
        nested: &mut Vec<ClassModel>,
    ) -> Result<()> {
        let graph = self.graph;
        let particle = particle_ref.get(graph);
        let occurs = outer.times(particle);

        match ParticleKind::of(particle, graph) {
            ParticleKind::Empty => {}
            ParticleKind::All => {
                return Err(GenerateError::unmapped(
                    self.current_entity(),
                    Construct::AllGroup,
                ))
            }
            ParticleKind::Any => {
                return Err(GenerateError::unmapped(
                    self.current_entity(),
                    Construct::Wildcard,
                ))
            }
            ParticleKind::Sequence(children) => {
                for child in children {
                    self.expand_particle(*child, occurs, properties, nested)?;
                }
            }
            ParticleKind::Choice(children) => {
                for child in children {
                    self.expand_particle(*child, occurs.optional(), properties, nested)?;
                }
            }
            ParticleKind::SingleElement(element) => {
                let property = self.element_property(element, occurs, nested)?;
                properties.push(property);
            }
        }
        Ok(())
    }

    fn element_property(
        &mut self,
        element_ref: Ref<ElementDeclaration>,
        occurs: Occurs,
        nested: &mut Vec<ClassModel>,
    ) -> Result<PropertyModel> {
        let element = element_ref.get(self.graph);

        let type_ref = if element.scope.is_global() {
            // A ref to a global element has the element's class
            TypeRef::Class(self.resolve(Entity::Element(element_ref))?)
        } else {
            match element.type_definition {
                None => {
                    return Err(GenerateError::unmapped(
                        element.qualified_name(),
                        Construct::UntypedElement,
                    ))
                }
                Some(TypeDefinition::Simple(simple)) => self.simple_type_ref(simple, nested)?,
                Some(TypeDefinition::Complex(complex)) => self.complex_type_ref(complex, nested)?,
            }
        };

        Ok(PropertyModel {
            identifier: naming::identifier(&element.name),
            type_ref,
            cardinality: Cardinality::new(occurs.min, occurs.max),
            xml: XmlBinding {
                kind: XmlNodeKind::Element,
                name: Some(XmlName::from(&element.qualified_name())),
                nillable: element.nillable,
                value_constraint: element.value_constraint.as_ref().map(Into::into),
            },
            documentation: element.documentation.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tm_xsd::{read_schema, QName, ReadOptions};

    const SCHEMA: &str = r#"
        <xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" targetNamespace="urn:t">
            <xs:complexType name="Kinds">
                <xs:sequence>
                    <xs:element name="a" type="xs:string"/>
                    <xs:choice maxOccurs="unbounded">
                        <xs:element name="b" type="xs:int"/>
                    </xs:choice>
                    <xs:element name="never" type="xs:string" minOccurs="0" maxOccurs="0"/>
                    <xs:sequence/>
                    <xs:any/>
                </xs:sequence>
            </xs:complexType>
        </xs:schema>
    "#;

    #[test]
    fn particle_kinds() {
        let graph = read_schema(SCHEMA, ReadOptions::default()).unwrap();
        let kinds = graph
            .type_definition(&QName::with_namespace("urn:t", "Kinds"))
            .and_then(TypeDefinition::complex)
            .unwrap();
        let outer = kinds
            .get(&graph)
            .content_type
            .particle()
            .unwrap()
            .get(&graph);

        let ParticleKind::Sequence(children) = ParticleKind::of(outer, &graph) else {
            panic!("expected a sequence");
        };
        let kinds = children
            .iter()
            .map(|child| ParticleKind::of(child.get(&graph), &graph))
            .collect::<Vec<_>>();
        assert!(matches!(kinds[0], ParticleKind::SingleElement(_)));
        assert!(matches!(kinds[1], ParticleKind::Choice(choices) if choices.len() == 1));
        assert!(matches!(kinds[2], ParticleKind::Empty));
        assert!(matches!(kinds[3], ParticleKind::Empty));
        assert!(matches!(kinds[4], ParticleKind::Any));
    }

    #[test]
    fn occurrence_bounds_multiply() {
        let graph = read_schema(SCHEMA, ReadOptions::default()).unwrap();
        let kinds = graph
            .type_definition(&QName::with_namespace("urn:t", "Kinds"))
            .and_then(TypeDefinition::complex)
            .unwrap();
        let outer = kinds.get(&graph).content_type.particle().unwrap();
        let ParticleKind::Sequence(children) = ParticleKind::of(outer.get(&graph), &graph) else {
            panic!("expected a sequence");
        };

        let choice = Occurs::ONCE.times(children[1].get(&graph)).optional();
        assert_eq!(
            choice,
            Occurs {
                min: 0,
                max: MaxOccurs::Unbounded
            }
        );
        assert_eq!(Occurs::ONCE.times(children[0].get(&graph)), Occurs::ONCE);
    }
}
