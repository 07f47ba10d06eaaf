use indexmap::IndexMap;

use tm_xsd::{
    complex_type_def::DerivationMethod, simple_type_def::Variety, AttributeDeclaration,
    AttributeUse, ComplexTypeDefinition, ElementDeclaration, Named, Ref, SimpleTypeDefinition,
    TypeDefinition,
};

use super::context::GeneratorContext;
use super::particle::Occurs;
use crate::builtin::ScalarType;
use crate::error::{Construct, GenerateError};
use crate::model::{
    Cardinality, ClassKind, ClassModel, PropertyModel, TypeName, TypeRef, ValueModel, XmlBinding,
    XmlName, XmlNodeKind, XmlTypeInfo,
};
use crate::naming::{self, IdentifierSet};
use crate::resolver::Entity;

type Result<T> = std::result::Result<T, GenerateError>;

/// Identifier of the property holding simple content.
const VALUE_PROPERTY: &str = "Value";

/// The outcome of generating a global element.
pub(super) enum ElementClass {
    New(ClassModel),
    /// The element resolves to the same name as its type, whose class `class` becomes the root
    /// class.
    RootOf {
        class: TypeName,
        root_element: XmlName,
    },
}

/// Properties of a class under construction, grouped by how they are serialized.
#[derive(Default)]
pub(super) struct PropertyList {
    pub(super) attributes: Vec<PropertyModel>,
    pub(super) elements: Vec<PropertyModel>,
    pub(super) text: Option<PropertyModel>,
}

impl PropertyList {
    /// Makes all identifiers unique and returns the properties in their final order: attributes,
    /// elements, text.
    fn finish(self) -> Vec<PropertyModel> {
        let mut identifiers = IdentifierSet::new();
        let elements = self
            .elements
            .into_iter()
            .map(|mut property| {
                property.identifier = identifiers.claim(&property.identifier);
                property
            })
            .collect::<Vec<_>>();
        let text = self.text.map(|mut property| {
            property.identifier = identifiers.claim(&property.identifier);
            property
        });
        let attributes = self.attributes.into_iter().map(|mut property| {
            property.identifier = identifiers.claim_with_suffix(&property.identifier, "Attribute");
            property
        });
        attributes.chain(elements).chain(text).collect()
    }
}

fn text_property(type_ref: TypeRef, element: Option<&ElementDeclaration>) -> PropertyModel {
    PropertyModel {
        identifier: VALUE_PROPERTY.to_string(),
        type_ref,
        cardinality: Cardinality::REQUIRED,
        xml: XmlBinding {
            kind: XmlNodeKind::Text,
            name: None,
            nillable: element.is_some_and(|element| element.nillable),
            value_constraint: element
                .and_then(|element| element.value_constraint.as_ref())
                .map(Into::into),
        },
        documentation: None,
    }
}

fn class_model(name: TypeName, kind: ClassKind) -> ClassModel {
    ClassModel {
        identifier: name.identifier().to_string(),
        namespace: name.namespace().to_string(),
        name,
        base: None,
        properties: Vec::new(),
        nested: Vec::new(),
        kind,
        is_abstract: false,
        documentation: None,
        xml: XmlTypeInfo::default(),
    }
}

impl GeneratorContext<'_> {
    /// Generates the class of a global type definition.
    pub(super) fn type_class(&mut self, type_def: TypeDefinition) -> Result<ClassModel> {
        let name = self.resolve_type(type_def)?;
        match type_def {
            TypeDefinition::Complex(complex) => self.complex_class(complex, name),
            TypeDefinition::Simple(simple) => self.value_class(simple, name),
        }
    }

    fn resolve_type(&self, type_def: TypeDefinition) -> Result<TypeName> {
        self.resolve(Entity::Type(type_def))
    }

    pub(super) fn complex_class(
        &mut self,
        complex_ref: Ref<ComplexTypeDefinition>,
        name: TypeName,
    ) -> Result<ClassModel> {
        let graph = self.graph;
        let complex = complex_ref.get(graph);

        let base = match (complex.derivation_method, complex.base_type_definition) {
            (Some(DerivationMethod::Extension), TypeDefinition::Complex(base))
                if !TypeDefinition::Complex(base).is_builtin(graph) =>
            {
                Some(base)
            }
            _ => None,
        };
        let base_name = base
            .map(|base| self.resolve_type(TypeDefinition::Complex(base)))
            .transpose()?;

        let mut class = class_model(name.clone(), ClassKind::Complex);
        class.base = base_name;
        class.is_abstract = complex.abstract_;
        class.documentation = complex.documentation.clone();
        class.xml.type_name = complex.name().as_ref().map(XmlName::from);

        let (properties, nested) = self.in_scope(name, |context| {
            let mut properties = PropertyList::default();
            let mut nested = Vec::new();

            let inherited: &[Ref<AttributeUse>] = match base {
                Some(base) => base.get(graph).attribute_uses.as_slice(),
                None => &[],
            };
            for attribute_use in complex.attribute_uses.iter().copied() {
                if inherited.contains(&attribute_use) {
                    continue;
                }
                let property = context.attribute_property(attribute_use, &mut nested)?;
                properties.attributes.push(property);
            }

            // By extension, the base class already holds the inherited content
            let particle = match complex.derivation_method {
                Some(DerivationMethod::Extension) => complex.explicit_content,
                _ => complex.content_type.particle(),
            };
            if let Some(particle) = particle {
                context.expand_particle(
                    particle,
                    Occurs::ONCE,
                    &mut properties.elements,
                    &mut nested,
                )?;
            }

            if let Some(simple) = complex.content_type.simple_type_definition() {
                let inherits_text = base.is_some_and(|base| {
                    base.get(graph)
                        .content_type
                        .simple_type_definition()
                        .is_some()
                });
                if !inherits_text {
                    let type_ref = context.simple_type_ref(simple, &mut nested)?;
                    properties.text = Some(text_property(type_ref, None));
                }
            }

            Ok((properties.finish(), nested))
        })?;

        class.properties = properties;
        class.nested = nested;
        Ok(class)
    }

    /// Generates the value class of a simple type definition.
    pub(super) fn value_class(
        &mut self,
        simple_ref: Ref<SimpleTypeDefinition>,
        name: TypeName,
    ) -> Result<ClassModel> {
        let simple = simple_ref.get(self.graph);

        let (value, nested) = self.in_scope(name.clone(), |context| {
            let mut nested = Vec::new();
            let value = context.value_model(simple, &mut nested)?;
            Ok((value, nested))
        })?;

        let mut class = class_model(name, ClassKind::Value(value));
        class.nested = nested;
        class.documentation = simple.documentation.clone();
        class.xml.type_name = simple.name().as_ref().map(XmlName::from);
        Ok(class)
    }

    fn value_model(
        &mut self,
        simple: &SimpleTypeDefinition,
        nested: &mut Vec<ClassModel>,
    ) -> Result<ValueModel> {
        let value = match simple.variety {
            Some(Variety::List) => {
                let item = match simple.item_type_definition {
                    Some(item) => self.simple_type_ref(item, nested)?,
                    None => TypeRef::Scalar(ScalarType::String),
                };
                ValueModel::List(item)
            }
            Some(Variety::Union) => ValueModel::Union(
                simple
                    .member_type_definitions
                    .iter()
                    .map(|member| self.simple_type_ref(*member, nested))
                    .collect::<Result<_>>()?,
            ),
            Some(Variety::Atomic) | None => {
                let base = match simple.base_type_definition {
                    Some(base) => self.simple_type_ref(base, nested)?,
                    None => TypeRef::Scalar(ScalarType::Any),
                };
                if simple.is_enumeration() {
                    ValueModel::Enumeration {
                        base,
                        members: simple.enumeration.clone(),
                    }
                } else {
                    ValueModel::Alias(base)
                }
            }
        };
        Ok(value)
    }

    /// The type of a value of `simple`. Anonymous types declared inside the current class are
    /// generated into `nested`.
    pub(super) fn simple_type_ref(
        &mut self,
        simple: Ref<SimpleTypeDefinition>,
        nested: &mut Vec<ClassModel>,
    ) -> Result<TypeRef> {
        let type_def = TypeDefinition::Simple(simple);
        if let Some(scalar) = self.builtin_scalar(type_def) {
            return Ok(TypeRef::Scalar(scalar));
        }
        let name = self.resolve_type(type_def)?;
        if simple.get(self.graph).name.is_some() || !self.is_nested_here(&name) {
            return Ok(TypeRef::Class(name));
        }
        nested.push(self.value_class(simple, name.clone())?);
        Ok(TypeRef::Nested(name))
    }

    /// Like [`simple_type_ref`](Self::simple_type_ref), for complex types.
    pub(super) fn complex_type_ref(
        &mut self,
        complex: Ref<ComplexTypeDefinition>,
        nested: &mut Vec<ClassModel>,
    ) -> Result<TypeRef> {
        let type_def = TypeDefinition::Complex(complex);
        if let Some(scalar) = self.builtin_scalar(type_def) {
            return Ok(TypeRef::Scalar(scalar));
        }
        let name = self.resolve_type(type_def)?;
        if complex.get(self.graph).name.is_some() || !self.is_nested_here(&name) {
            return Ok(TypeRef::Class(name));
        }
        nested.push(self.complex_class(complex, name.clone())?);
        Ok(TypeRef::Nested(name))
    }

    fn attribute_property(
        &mut self,
        attribute_use_ref: Ref<AttributeUse>,
        nested: &mut Vec<ClassModel>,
    ) -> Result<PropertyModel> {
        let attribute_use = attribute_use_ref.get(self.graph);
        let attribute = attribute_use.attribute_declaration.get(self.graph);

        let type_ref = self.simple_type_ref(attribute.type_definition, nested)?;
        let cardinality = if attribute_use.required {
            Cardinality::REQUIRED
        } else {
            Cardinality::OPTIONAL
        };
        let value_constraint = attribute_use
            .value_constraint
            .as_ref()
            .or(attribute.value_constraint.as_ref());

        Ok(PropertyModel {
            identifier: naming::identifier(&attribute.name),
            type_ref,
            cardinality,
            xml: XmlBinding {
                kind: XmlNodeKind::Attribute,
                name: Some(XmlName::from(&attribute.qualified_name())),
                nillable: false,
                value_constraint: value_constraint.map(Into::into),
            },
            documentation: attribute.documentation.clone(),
        })
    }

    /// Generates the class of a global element. `classes` are the classes generated for the
    /// global types.
    pub(super) fn element_class(
        &mut self,
        element_ref: Ref<ElementDeclaration>,
        classes: &IndexMap<TypeName, ClassModel>,
    ) -> Result<ElementClass> {
        let graph = self.graph;
        let element = element_ref.get(graph);
        let name = self.resolve(Entity::Element(element_ref))?;
        let root_element = XmlName::from(&element.qualified_name());

        let Some(type_def) = element.type_definition else {
            return Err(GenerateError::unmapped(
                element.qualified_name(),
                Construct::UntypedElement,
            ));
        };

        let mut class = match type_def {
            TypeDefinition::Complex(complex) if complex.get(graph).name.is_none() => {
                self.complex_class(complex, name)?
            }
            TypeDefinition::Simple(simple) if simple.get(graph).name.is_none() => {
                let (type_ref, nested) = self.in_scope(name.clone(), |context| {
                    let mut nested = Vec::new();
                    let type_ref = context.simple_type_ref(simple, &mut nested)?;
                    Ok((type_ref, nested))
                })?;
                let mut class = class_model(name, ClassKind::Complex);
                class.properties = vec![text_property(type_ref, Some(element))];
                class.nested = nested;
                class
            }
            _ => {
                if let Some(scalar) = self.builtin_scalar(type_def) {
                    let mut class = class_model(name, ClassKind::Complex);
                    class.properties = vec![text_property(TypeRef::Scalar(scalar), Some(element))];
                    class
                } else {
                    let type_name = self.resolve_type(type_def)?;
                    if type_name == name {
                        return Ok(ElementClass::RootOf {
                            class: type_name,
                            root_element,
                        });
                    }
                    match (type_def, classes.get(&type_name)) {
                        (TypeDefinition::Complex(_), Some(type_class)) => {
                            element_copy(type_class, name)
                        }
                        (TypeDefinition::Complex(_), None) => {
                            // A registered existing type
                            let mut class = class_model(name, ClassKind::Complex);
                            class.base = Some(type_name);
                            class
                        }
                        (TypeDefinition::Simple(_), _) => {
                            let mut class = class_model(name, ClassKind::Complex);
                            class.properties =
                                vec![text_property(TypeRef::Class(type_name), Some(element))];
                            class
                        }
                    }
                }
            }
        };

        class.xml.root_element = Some(root_element);
        class.is_abstract = element.abstract_;
        if element.documentation.is_some() {
            class.documentation = element.documentation.clone();
        }
        Ok(ElementClass::New(class))
    }

    /// Generates the value class of a global attribute with an anonymous type.
    pub(super) fn attribute_class(
        &mut self,
        attribute_ref: Ref<AttributeDeclaration>,
    ) -> Result<Option<ClassModel>> {
        let simple = attribute_ref.get(self.graph).type_definition;
        if simple.get(self.graph).name.is_some() {
            return Ok(None);
        }
        let name = self.resolve(Entity::Attribute(attribute_ref))?;
        self.value_class(simple, name).map(Some)
    }
}

/// The class of a global element of a named complex type: the type's class under the element's
/// name. Nested classes stay with the type's class and are referenced there.
fn element_copy(type_class: &ClassModel, name: TypeName) -> ClassModel {
    let mut class = type_class.clone();
    class.identifier = name.identifier().to_string();
    class.namespace = name.namespace().to_string();
    class.name = name;
    class.nested.clear();
    for property in &mut class.properties {
        if let TypeRef::Nested(nested) = &property.type_ref {
            property.type_ref = TypeRef::Class(nested.clone());
        }
    }
    class
}
