use roxmltree::Node;

use super::{
    annotation,
    attribute_decl,
    attribute_use::AttributeUse,
    builtins::XS_ANY_TYPE_NAME,
    components::{Component, Named},
    element_decl,
    error::ReadError,
    mapping_context::TopLevelMappable,
    model_group::Compositor,
    particle::{MaxOccurs, Particle},
    shared::{Term, TypeDefinition},
    simple_type_def::{self, SimpleTypeDefinition, Variety},
    values::{actual_value, required_value},
    xstypes::{AnyURI, NCName, QName, Set},
    ElementDeclaration, MappingContext, ModelGroup, Ref,
};

/// Schema Component: Complex Type Definition, a kind of Type Definition (§3.4)
#[derive(Clone, Debug)]
pub struct ComplexTypeDefinition {
    pub documentation: Option<String>,
    pub name: Option<NCName>,
    pub target_namespace: Option<AnyURI>,
    pub base_type_definition: TypeDefinition,
    pub derivation_method: Option<DerivationMethod>,
    pub context: Option<Context>,
    pub abstract_: bool,
    /// All attribute uses, including the ones inherited from the base type.
    pub attribute_uses: Set<Ref<AttributeUse>>,
    pub content_type: ContentType,
    /// The particle written on this definition itself, before the base type's content is merged
    /// in by extension.
    pub explicit_content: Option<Ref<Particle>>,
}

/// The declaration an anonymous complex type definition appears in.
#[derive(Copy, Clone, Debug)]
pub enum Context {
    Element(Ref<ElementDeclaration>),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DerivationMethod {
    Extension,
    Restriction,
}

/// Property Record: Content Type (§3.4)
///
/// Open content is not supported.
#[derive(Copy, Clone, Debug)]
pub enum ContentType {
    Empty,
    Simple {
        simple_type_definition: Ref<SimpleTypeDefinition>,
    },
    ElementOnly {
        particle: Ref<Particle>,
    },
    Mixed {
        particle: Ref<Particle>,
    },
}

impl ContentType {
    pub fn particle(&self) -> Option<Ref<Particle>> {
        match self {
            Self::ElementOnly { particle } | Self::Mixed { particle } => Some(*particle),
            Self::Empty | Self::Simple { .. } => None,
        }
    }

    pub fn simple_type_definition(&self) -> Option<Ref<SimpleTypeDefinition>> {
        match self {
            Self::Simple {
                simple_type_definition,
            } => Some(*simple_type_definition),
            _ => None,
        }
    }

    fn with_particle(particle: Option<Ref<Particle>>, mixed: bool) -> Self {
        match (particle, mixed) {
            (None, _) => Self::Empty,
            (Some(particle), true) => Self::Mixed { particle },
            (Some(particle), false) => Self::ElementOnly { particle },
        }
    }
}

/// The parts every mapping variant computes for its [`ComplexTypeDefinition`].
struct Derivation {
    base_type_definition: TypeDefinition,
    derivation_method: DerivationMethod,
    attribute_uses: Set<Ref<AttributeUse>>,
    content_type: ContentType,
    explicit_content: Option<Ref<Particle>>,
}

impl ComplexTypeDefinition {
    pub const TAG_NAME: &'static str = "complexType";

    pub(super) fn name_from_xml(complex_type: Node, schema: Node) -> Option<QName> {
        let name = complex_type.attribute("name")?;
        Some(QName::with_optional_namespace(
            schema.attribute("targetNamespace"),
            name,
        ))
    }

    /// Maps a `<complexType>` element. `self_ref` is given for top-level definitions, which have
    /// been reserved beforehand; anonymous definitions pass the declaration they appear in as
    /// `type_context`.
    pub(super) fn map_from_xml(
        context: &mut MappingContext,
        complex_type: Node,
        schema: Node,
        self_ref: Option<Ref<Self>>,
        type_context: Option<Context>,
    ) -> Result<Ref<Self>, ReadError> {
        let self_ref = self_ref.unwrap_or_else(|| context.reserve());

        // {name}, {target namespace}
        //   The ·actual value· of the name [attribute] if present, otherwise ·absent·; the
        //   targetNamespace of the <schema> ancestor.
        let (name, target_namespace) = match Self::name_from_xml(complex_type, schema) {
            Some(name) => (Some(name.local_name), name.namespace_name),
            None => (None, schema.attribute("targetNamespace").map(str::to_string)),
        };

        // {abstract}
        //   The ·actual value· of the abstract [attribute], if present, otherwise false.
        let abstract_ = actual_value::<bool>(complex_type, "abstract")?.unwrap_or(false);

        let simple_content = complex_type
            .children()
            .find(|c| c.tag_name().name() == "simpleContent");
        let complex_content = complex_type
            .children()
            .find(|c| c.tag_name().name() == "complexContent");

        let derivation = if let Some(simple_content) = simple_content {
            Self::map_with_simple_content(context, self_ref, simple_content, schema)?
        } else if let Some(complex_content) = complex_content {
            Self::map_with_explicit_complex_content(
                context,
                self_ref,
                complex_type,
                complex_content,
                schema,
            )?
        } else {
            Self::map_with_implicit_complex_content(context, self_ref, complex_type, schema)?
        };

        let definition = Self {
            documentation: annotation::documentation(complex_type),
            name,
            target_namespace,
            base_type_definition: derivation.base_type_definition,
            derivation_method: Some(derivation.derivation_method),
            context: type_context,
            abstract_,
            attribute_uses: derivation.attribute_uses,
            content_type: derivation.content_type,
            explicit_content: derivation.explicit_content,
        };
        Ok(context.insert(self_ref, definition))
    }

    /// `<complexType><simpleContent><extension|restriction base="..."/></simpleContent>`
    fn map_with_simple_content(
        context: &mut MappingContext,
        self_ref: Ref<Self>,
        simple_content: Node,
        schema: Node,
    ) -> Result<Derivation, ReadError> {
        let (derivation, derivation_method) = derivation_child(simple_content, "simpleContent")?;

        // {base type definition}
        //   The type definition ·resolved· to by the ·actual value· of the base [attribute]
        let base = required_value::<QName>(derivation, "base", "simpleContent")?;
        let base_type_definition = context.resolve::<TypeDefinition>(&base, "type")?;

        let base_simple_content = match base_type_definition {
            TypeDefinition::Simple(simple) => Some(context.request(simple).map(|_| simple)?),
            TypeDefinition::Complex(complex) => context
                .request(complex)?
                .content_type
                .simple_type_definition(),
        };

        // {content type}
        //   1 If the base is a complex type with simple content and this is a restriction, the
        //     restricted simple type (an anonymous one if facets are given).
        //   2 If this is an extension of a simple type, that simple type.
        //   3 If this is an extension of a complex type with simple content, the base's content.
        let simple_type_definition = match (derivation_method, base_simple_content) {
            (DerivationMethod::Restriction, Some(restricted)) => {
                Self::restrict_simple_content(context, self_ref, derivation, schema, restricted)?
            }
            (DerivationMethod::Extension, Some(extended)) => extended,
            (_, None) => {
                return Err(ReadError::Unsupported(format!(
                    "simple content derived from {base}, which has no simple content"
                )))
            }
        };

        let attribute_uses = Self::map_attribute_uses_property(
            context,
            self_ref,
            derivation,
            schema,
            base_type_definition,
            derivation_method,
        )?;

        Ok(Derivation {
            base_type_definition,
            derivation_method,
            attribute_uses,
            content_type: ContentType::Simple {
                simple_type_definition,
            },
            explicit_content: None,
        })
    }

    fn restrict_simple_content(
        context: &mut MappingContext,
        self_ref: Ref<Self>,
        restriction: Node,
        schema: Node,
        restricted: Ref<SimpleTypeDefinition>,
    ) -> Result<Ref<SimpleTypeDefinition>, ReadError> {
        let nested_context = Some(simple_type_def::Context::ComplexType(self_ref));
        let base = match restriction
            .children()
            .find(|c| c.tag_name().name() == SimpleTypeDefinition::TAG_NAME)
        {
            Some(simple_type) => {
                SimpleTypeDefinition::map_from_xml(context, simple_type, schema, None, nested_context)?
            }
            None => restricted,
        };

        let enumeration = SimpleTypeDefinition::enumeration_facets(restriction);
        if enumeration.is_empty() {
            return Ok(base);
        }

        let base_definition = base.get(&context.components);
        let definition = SimpleTypeDefinition {
            documentation: None,
            name: None,
            target_namespace: None,
            base_type_definition: Some(base),
            variety: base_definition.variety.or(Some(Variety::Atomic)),
            item_type_definition: base_definition.item_type_definition,
            member_type_definitions: base_definition.member_type_definitions.clone(),
            enumeration,
            context: nested_context,
        };
        Ok(context.create(definition))
    }

    /// `<complexType><complexContent><extension|restriction base="..."/></complexContent>`
    fn map_with_explicit_complex_content(
        context: &mut MappingContext,
        self_ref: Ref<Self>,
        complex_type: Node,
        complex_content: Node,
        schema: Node,
    ) -> Result<Derivation, ReadError> {
        let (derivation, derivation_method) = derivation_child(complex_content, "complexContent")?;

        // {base type definition}
        //   The type definition ·resolved· to by the ·actual value· of the base [attribute]
        let base = required_value::<QName>(derivation, "base", "complexContent")?;
        let base_type_definition = match context.resolve::<TypeDefinition>(&base, "type")? {
            TypeDefinition::Complex(complex) => TypeDefinition::Complex(complex),
            TypeDefinition::Simple(_) => {
                return Err(ReadError::Unsupported(format!(
                    "complex content derived from simple type {base}"
                )))
            }
        };

        // The mixed [attribute] of <complexContent> takes precedence over the one on
        // <complexType>.
        let mixed = match actual_value::<bool>(complex_content, "mixed")? {
            Some(mixed) => mixed,
            None => actual_value::<bool>(complex_type, "mixed")?.unwrap_or(false),
        };

        let explicit_content = Self::map_explicit_content(context, self_ref, derivation, schema)?;
        let content_type = match derivation_method {
            DerivationMethod::Restriction => ContentType::with_particle(explicit_content, mixed),
            DerivationMethod::Extension => {
                Self::extend_content(context, base_type_definition, explicit_content, mixed)?
            }
        };

        let attribute_uses = Self::map_attribute_uses_property(
            context,
            self_ref,
            derivation,
            schema,
            base_type_definition,
            derivation_method,
        )?;

        Ok(Derivation {
            base_type_definition,
            derivation_method,
            attribute_uses,
            content_type,
            explicit_content,
        })
    }

    /// `<complexType>` holding its particle and attributes directly, a restriction of
    /// ·xs:anyType·.
    fn map_with_implicit_complex_content(
        context: &mut MappingContext,
        self_ref: Ref<Self>,
        complex_type: Node,
        schema: Node,
    ) -> Result<Derivation, ReadError> {
        // {base type definition} ·xs:anyType·
        let base_type_definition = context.resolve::<TypeDefinition>(&XS_ANY_TYPE_NAME, "type")?;
        let mixed = actual_value::<bool>(complex_type, "mixed")?.unwrap_or(false);

        let explicit_content =
            Self::map_explicit_content(context, self_ref, complex_type, schema)?;
        let attribute_uses = AttributeUse::map_attribute_uses(
            context,
            complex_type,
            schema,
            attribute_decl::ScopeParent::ComplexType(self_ref),
        )?;

        Ok(Derivation {
            base_type_definition,
            derivation_method: DerivationMethod::Restriction,
            attribute_uses,
            content_type: ContentType::with_particle(explicit_content, mixed),
            explicit_content,
        })
    }

    /// Maps the `<sequence>`, `<choice>`, `<all>` or `<group>` child of `parent`, if any. An
    /// empty `<sequence>` or `<all>` counts as no content at all.
    fn map_explicit_content(
        context: &mut MappingContext,
        self_ref: Ref<Self>,
        parent: Node,
        schema: Node,
    ) -> Result<Option<Ref<Particle>>, ReadError> {
        let Some(child) = parent
            .children()
            .find(|c| matches!(c.tag_name().name(), "sequence" | "choice" | "all" | "group"))
        else {
            return Ok(None);
        };

        let particle = if child.tag_name().name() == "group" {
            Particle::map_from_xml_group_reference(context, child)?
        } else {
            Particle::map_from_xml_model_group(
                context,
                child,
                schema,
                element_decl::ScopeParent::ComplexType(self_ref),
            )?
        };

        let Term::ModelGroup(model_group) = particle.get(&context.components).term else {
            return Ok(Some(particle));
        };
        let model_group = model_group.get(&context.components);
        let is_empty =
            model_group.particles.is_empty() && model_group.compositor != Compositor::Choice;
        Ok((!is_empty).then_some(particle))
    }

    /// Computes the content type of an extension: the base's content followed by the explicit
    /// content (§3.4.2.3.3).
    fn extend_content(
        context: &mut MappingContext,
        base_type_definition: TypeDefinition,
        explicit_content: Option<Ref<Particle>>,
        mixed: bool,
    ) -> Result<ContentType, ReadError> {
        let base_content = match base_type_definition.complex() {
            Some(base) => context.request(base)?.content_type,
            None => ContentType::Empty,
        };

        let Some(explicit) = explicit_content else {
            return Ok(base_content);
        };
        let Some(base_particle) = base_content.particle() else {
            return Ok(ContentType::with_particle(Some(explicit), mixed));
        };

        let sequence = context.create(ModelGroup {
            compositor: Compositor::Sequence,
            particles: vec![base_particle, explicit],
        });
        let particle = context.create(Particle {
            min_occurs: 1,
            max_occurs: MaxOccurs::Count(1),
            term: Term::ModelGroup(sequence),
        });
        let mixed = mixed || matches!(base_content, ContentType::Mixed { .. });
        Ok(ContentType::with_particle(Some(particle), mixed))
    }

    /// Maps the {attribute uses} property of a derived type: the uses declared on the
    /// `<extension>`/`<restriction>` element, followed by those inherited from the base type.
    fn map_attribute_uses_property(
        context: &mut MappingContext,
        self_ref: Ref<Self>,
        derivation: Node,
        schema: Node,
        base_type_definition: TypeDefinition,
        derivation_method: DerivationMethod,
    ) -> Result<Set<Ref<AttributeUse>>, ReadError> {
        let mut attribute_uses = AttributeUse::map_attribute_uses(
            context,
            derivation,
            schema,
            attribute_decl::ScopeParent::ComplexType(self_ref),
        )?;

        let Some(base) = base_type_definition.complex() else {
            return Ok(attribute_uses);
        };
        let inherited = context.request(base)?.attribute_uses.clone();

        // 3.1 If T is a complex type definition and {derivation method} = extension, then the
        //   attribute uses in T.{attribute uses} are inherited.
        // 3.2 If {derivation method} = restriction, then the attribute uses in T.{attribute uses}
        //   are inherited, except those restated or prohibited by this definition.
        let restated: Vec<String> = match derivation_method {
            DerivationMethod::Extension => Vec::new(),
            DerivationMethod::Restriction => derivation
                .children()
                .filter(|c| c.tag_name().name() == "attribute")
                .filter_map(|c| {
                    c.attribute("name").or_else(|| {
                        c.attribute("ref")
                            .map(|ref_| ref_.rsplit(':').next().unwrap_or(ref_))
                    })
                })
                .map(str::to_string)
                .collect(),
        };

        for use_ in inherited {
            let declaration = use_.get(&context.components).attribute_declaration;
            let name = &declaration.get(&context.components).name;
            if !restated.contains(name) {
                attribute_uses.push(use_);
            }
        }
        Ok(attribute_uses)
    }
}

/// Finds the `<extension>` or `<restriction>` child of `<simpleContent>`/`<complexContent>`.
fn derivation_child<'a, 'input>(
    content: Node<'a, 'input>,
    element: &'static str,
) -> Result<(Node<'a, 'input>, DerivationMethod), ReadError> {
    // {derivation method}
    //   If the <restriction> alternative is chosen, then restriction, otherwise (the <extension>
    //   alternative is chosen) extension.
    content
        .children()
        .find_map(|c| match c.tag_name().name() {
            "restriction" => Some((c, DerivationMethod::Restriction)),
            "extension" => Some((c, DerivationMethod::Extension)),
            _ => None,
        })
        .ok_or(ReadError::MissingChild {
            element,
            child: "extension|restriction",
        })
}

impl Component for ComplexTypeDefinition {
    const DISPLAY_NAME: &'static str = "ComplexTypeDefinition";
}

impl Named for ComplexTypeDefinition {
    fn name(&self) -> Option<QName> {
        self.name.as_ref().map(|name| {
            QName::with_optional_namespace(self.target_namespace.as_ref(), name)
        })
    }
}

impl TopLevelMappable for ComplexTypeDefinition {
    fn map_from_top_level_xml(
        context: &mut MappingContext,
        self_ref: Ref<Self>,
        complex_type: Node,
        schema: Node,
    ) -> Result<(), ReadError> {
        Self::map_from_xml(context, complex_type, schema, Some(self_ref), None)?;
        Ok(())
    }
}
