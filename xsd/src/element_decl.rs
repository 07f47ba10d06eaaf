use roxmltree::Node;

use super::complex_type_def::{self, ComplexTypeDefinition};
use super::simple_type_def::{self, SimpleTypeDefinition};
use super::{
    annotation,
    components::{Component, ComponentTable, Named, RefNamed},
    error::ReadError,
    mapping_context::TopLevelMappable,
    shared::{self, TypeDefinition, ValueConstraint},
    values::{actual_value, required_value},
    xstypes::{AnyURI, NCName, QName},
    MappingContext, ModelGroupDefinition, Ref,
};

/// Schema Component: Element Declaration, a kind of [Term](super::shared::Term) (§3.3)
#[derive(Clone, Debug)]
pub struct ElementDeclaration {
    pub documentation: Option<String>,
    pub name: NCName,
    pub target_namespace: Option<AnyURI>,
    /// The declared type. Absent if the declaration names neither a type nor a substitution group
    /// head and has no inline type, where XSD would fall back to `xs:anyType`.
    pub type_definition: Option<TypeDefinition>,
    pub scope: Scope,
    pub value_constraint: Option<ValueConstraint>,
    pub nillable: bool,
    pub abstract_: bool,
}

/// Property Record: Scope (§3.3)
pub type Scope = shared::Scope<ScopeParent>;

#[derive(Copy, Clone, Debug)]
pub enum ScopeParent {
    ComplexType(Ref<ComplexTypeDefinition>),
    Group(Ref<ModelGroupDefinition>),
}

impl ElementDeclaration {
    pub const TAG_NAME: &'static str = "element";

    pub fn qualified_name(&self) -> QName {
        QName::with_optional_namespace(self.target_namespace.as_ref(), &self.name)
    }

    /// `true` if the element's type is declared inline rather than referenced by name.
    pub fn has_anonymous_type(&self, table: &impl ComponentTable) -> bool {
        self.type_definition
            .is_some_and(|type_def| type_def.name(table).is_none())
    }

    pub(super) fn name_from_xml(element: Node, schema: Node) -> Result<QName, ReadError> {
        let name = required_value::<&str>(element, "name", Self::TAG_NAME)?;
        Ok(QName::with_optional_namespace(
            schema.attribute("targetNamespace"),
            name,
        ))
    }

    fn map_from_xml_common(
        context: &mut MappingContext,
        self_ref: Ref<Self>,
        element: Node,
        schema: Node,
        target_namespace: Option<AnyURI>,
        scope: Scope,
    ) -> Result<Self, ReadError> {
        // {name} The ·actual value· of the name [attribute].
        let name = required_value::<String>(element, "name", Self::TAG_NAME)?;

        // {type definition}
        //   The first of the following that applies:
        //   1 The type definition corresponding to the <simpleType> or <complexType> element
        //     information item in the [children], if either is present.
        //   2 The type definition ·resolved· to by the ·actual value· of the type [attribute], if
        //     it is present.
        //   3 The declared {type definition} of the Element Declaration ·resolved· to by the first
        //     QName in the ·actual value· of the substitutionGroup [attribute], if present.
        //   4 ·xs:anyType·.
        // Case 4 is left absent here; consumers decide how to treat untyped elements.
        let inline_simple = element
            .children()
            .find(|c| c.tag_name().name() == SimpleTypeDefinition::TAG_NAME);
        let inline_complex = element
            .children()
            .find(|c| c.tag_name().name() == ComplexTypeDefinition::TAG_NAME);

        let type_definition = if let Some(simple_type) = inline_simple {
            Some(TypeDefinition::Simple(SimpleTypeDefinition::map_from_xml(
                context,
                simple_type,
                schema,
                None,
                Some(simple_type_def::Context::Element(self_ref)),
            )?))
        } else if let Some(complex_type) = inline_complex {
            Some(TypeDefinition::Complex(ComplexTypeDefinition::map_from_xml(
                context,
                complex_type,
                schema,
                None,
                Some(complex_type_def::Context::Element(self_ref)),
            )?))
        } else if let Some(type_) = actual_value::<QName>(element, "type")? {
            Some(context.resolve::<TypeDefinition>(&type_, "type")?)
        } else if let Some(heads) = actual_value::<Vec<QName>>(element, "substitutionGroup")? {
            match heads.first() {
                Some(head) => {
                    let head = context.resolve::<Ref<ElementDeclaration>>(head, "element")?;
                    context.request(head)?.type_definition
                }
                None => None,
            }
        } else {
            None
        };

        // {nillable} The ·actual value· of the nillable [attribute], if present, otherwise false.
        let nillable = actual_value::<bool>(element, "nillable")?.unwrap_or(false);
        // {abstract} The ·actual value· of the abstract [attribute], if present, otherwise false.
        let abstract_ = actual_value::<bool>(element, "abstract")?.unwrap_or(false);

        Ok(Self {
            documentation: annotation::documentation(element),
            name,
            target_namespace,
            type_definition,
            scope,
            value_constraint: ValueConstraint::from_xml(element),
            nillable,
            abstract_,
        })
    }

    /// Maps a top-level `<element>`.
    pub(super) fn map_from_xml_global(
        context: &mut MappingContext,
        self_ref: Ref<Self>,
        element: Node,
        schema: Node,
    ) -> Result<Ref<Self>, ReadError> {
        // {target namespace}
        //   The ·actual value· of the targetNamespace [attribute] of the parent <schema> element
        //   information item, or ·absent· if there is none.
        let target_namespace = schema.attribute("targetNamespace").map(str::to_string);
        let declaration = Self::map_from_xml_common(
            context,
            self_ref,
            element,
            schema,
            target_namespace,
            Scope::Global,
        )?;
        Ok(context.insert(self_ref, declaration))
    }

    /// Maps a local `<element>` declaration (one without `ref`) inside a model group.
    pub(super) fn map_from_xml_local(
        context: &mut MappingContext,
        element: Node,
        schema: Node,
        parent: ScopeParent,
    ) -> Result<Ref<Self>, ReadError> {
        let self_ref = context.reserve();

        // {target namespace}
        //   1 If targetNamespace is present, its ·actual value·.
        //   2 If form is present and its ·actual value· is qualified, or if form is absent and the
        //     ·actual value· of elementFormDefault on the <schema> ancestor is qualified, then the
        //     ·actual value· of the targetNamespace [attribute] of the ancestor <schema>.
        //   3 otherwise ·absent·.
        let target_namespace = match element.attribute("targetNamespace") {
            Some(namespace) => Some(namespace.to_string()),
            None => is_qualified(element, schema, "elementFormDefault")?
                .then(|| schema.attribute("targetNamespace").map(str::to_string))
                .flatten(),
        };

        let declaration = Self::map_from_xml_common(
            context,
            self_ref,
            element,
            schema,
            target_namespace,
            Scope::Local(parent),
        )?;
        Ok(context.insert(self_ref, declaration))
    }
}

/// Evaluates the `form` attribute of a local declaration against the schema-wide default stored
/// in `default_attribute` (`elementFormDefault` or `attributeFormDefault`).
pub(super) fn is_qualified(
    node: Node,
    schema: Node,
    default_attribute: &'static str,
) -> Result<bool, ReadError> {
    let form = node
        .attribute("form")
        .map(|form| ("form", form))
        .or_else(|| {
            schema
                .attribute(default_attribute)
                .map(|form| (default_attribute, form))
        });
    match form {
        None | Some((_, "unqualified")) => Ok(false),
        Some((_, "qualified")) => Ok(true),
        Some((attribute, value)) => Err(ReadError::InvalidValue {
            attribute,
            value: value.to_string(),
        }),
    }
}

impl Component for ElementDeclaration {
    const DISPLAY_NAME: &'static str = "ElementDeclaration";
}

impl Named for ElementDeclaration {
    fn name(&self) -> Option<QName> {
        Some(self.qualified_name())
    }
}

impl TopLevelMappable for ElementDeclaration {
    fn map_from_top_level_xml(
        context: &mut MappingContext,
        self_ref: Ref<Self>,
        element: Node,
        schema: Node,
    ) -> Result<(), ReadError> {
        Self::map_from_xml_global(context, self_ref, element, schema)?;
        Ok(())
    }
}
