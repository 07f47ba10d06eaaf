use super::{
    builtins::XS_NAMESPACE,
    complex_type_def::ComplexTypeDefinition,
    components::{ComponentTable, RefNamed},
    element_decl::ElementDeclaration,
    model_group::ModelGroup,
    simple_type_def::SimpleTypeDefinition,
    wildcard::Wildcard,
    xstypes::QName,
    Ref,
};

/// Supertype of the two kinds of type definitions.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeDefinition {
    Simple(Ref<SimpleTypeDefinition>),
    Complex(Ref<ComplexTypeDefinition>),
}

impl TypeDefinition {
    pub fn simple(self) -> Option<Ref<SimpleTypeDefinition>> {
        match self {
            Self::Simple(simple) => Some(simple),
            Self::Complex(_) => None,
        }
    }

    pub fn complex(self) -> Option<Ref<ComplexTypeDefinition>> {
        match self {
            Self::Simple(_) => None,
            Self::Complex(complex) => Some(complex),
        }
    }

    pub fn is_simple(self) -> bool {
        matches!(self, Self::Simple(_))
    }

    /// `true` for the built-in types registered in the XML Schema namespace.
    pub fn is_builtin(self, table: &impl ComponentTable) -> bool {
        self.name(table)
            .is_some_and(|name| name.namespace_name.as_deref() == Some(XS_NAMESPACE))
    }

    /// Documentation attached to the type's declaration, if any.
    pub fn documentation(self, table: &impl ComponentTable) -> Option<&str> {
        match self {
            Self::Simple(simple) => simple.get(table).documentation.as_deref(),
            Self::Complex(complex) => complex.get(table).documentation.as_deref(),
        }
    }
}

impl RefNamed for TypeDefinition {
    fn name(&self, table: &impl ComponentTable) -> Option<QName> {
        match self {
            Self::Simple(simple) => simple.name(table),
            Self::Complex(complex) => complex.name(table),
        }
    }
}

/// Supertype of the components that can be the {term} of a particle.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Term {
    ElementDeclaration(Ref<ElementDeclaration>),
    ModelGroup(Ref<ModelGroup>),
    Wildcard(Ref<Wildcard>),
}

impl Term {
    pub fn is_model_group(&self) -> bool {
        matches!(self, Self::ModelGroup(_))
    }
}

/// Common {variety} of element and attribute scopes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ScopeVariety {
    Global,
    Local,
}

/// Scope of an element or attribute declaration, with `P` being the scope's parent type.
///
/// {parent} is required when the variety is local and absent when it is global, so both are folded
/// into one enum.
#[derive(Clone, Debug)]
pub enum Scope<P> {
    Global,
    Local(P),
}

impl<P> Scope<P> {
    pub fn variety(&self) -> ScopeVariety {
        match self {
            Self::Global => ScopeVariety::Global,
            Self::Local(_) => ScopeVariety::Local,
        }
    }

    pub fn parent(&self) -> Option<&P> {
        match self {
            Self::Global => None,
            Self::Local(parent) => Some(parent),
        }
    }

    pub fn is_global(&self) -> bool {
        matches!(self, Self::Global)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ValueConstraintVariety {
    Default,
    Fixed,
}

/// Property Record: Value Constraint, shared by element declarations, attribute declarations and
/// attribute uses.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValueConstraint {
    pub variety: ValueConstraintVariety,
    pub lexical_form: String,
}

impl ValueConstraint {
    /// Reads the `default`/`fixed` attribute pair of a declaration.
    pub(crate) fn from_xml(node: roxmltree::Node) -> Option<Self> {
        node.attribute("default")
            .map(|value| (ValueConstraintVariety::Default, value))
            .or_else(|| {
                node.attribute("fixed")
                    .map(|value| (ValueConstraintVariety::Fixed, value))
            })
            .map(|(variety, value)| Self {
                variety,
                lexical_form: value.to_string(),
            })
    }
}
