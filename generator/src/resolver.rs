//! Computes the output [`TypeName`] of schema entities.
//!
//! Named types and global elements resolve to `namespace.LocalName` in their mapped output
//! namespace. Anonymous types have no name of their own and are named after the chain of named
//! scopes they appear in, which the caller passes explicitly as a [`NameScope`].

use indexmap::IndexMap;
use tracing::debug;

use tm_xsd::{
    complex_type_def, model_group::Compositor, simple_type_def, AttributeDeclaration,
    ElementDeclaration, Particle, QName, Ref, RefNamed, SchemaGraph, SimpleTypeDefinition, Term,
    TypeDefinition,
};

use crate::error::{Construct, GenerateError};
use crate::model::TypeName;
use crate::namespace::NamespaceMapper;

/// A schema entity that can be given an output type name.
#[derive(Copy, Clone, Debug)]
pub enum Entity {
    Type(TypeDefinition),
    Element(Ref<ElementDeclaration>),
    Particle(Ref<Particle>),
    Attribute(Ref<AttributeDeclaration>),
}

/// The chain of named classes currently open during a walk, outermost first.
#[derive(Clone, Debug, Default)]
pub struct NameScope {
    open: Vec<TypeName>,
}

impl NameScope {
    /// The scope outside of any class.
    pub fn root() -> Self {
        Self::default()
    }

    /// A copy of this scope with `name` opened inside it.
    pub fn enter(&self, name: TypeName) -> Self {
        let mut scope = self.clone();
        scope.push(name);
        scope
    }

    pub fn push(&mut self, name: TypeName) {
        self.open.push(name);
    }

    pub fn pop(&mut self) -> Option<TypeName> {
        self.open.pop()
    }

    /// The nearest enclosing named class.
    pub fn innermost(&self) -> Option<&TypeName> {
        self.open.last()
    }

    pub fn depth(&self) -> usize {
        self.open.len()
    }
}

pub struct TypeNameResolver<'a> {
    graph: &'a SchemaGraph,
    namespaces: &'a NamespaceMapper,
    existing: &'a IndexMap<QName, TypeName>,
}

type Result<T> = std::result::Result<T, GenerateError>;

impl<'a> TypeNameResolver<'a> {
    pub fn new(
        graph: &'a SchemaGraph,
        namespaces: &'a NamespaceMapper,
        existing: &'a IndexMap<QName, TypeName>,
    ) -> Self {
        Self {
            graph,
            namespaces,
            existing,
        }
    }

    pub fn graph(&self) -> &'a SchemaGraph {
        self.graph
    }

    /// Resolves `entity` as seen from `scope`. The result only depends on the arguments and the
    /// resolver's configuration.
    pub fn resolve(&self, entity: Entity, scope: &NameScope) -> Result<TypeName> {
        match entity {
            Entity::Type(type_def) => self.resolve_type(type_def, scope),
            Entity::Element(element) => self.resolve_element(element, scope),
            Entity::Particle(particle) => self.resolve_particle(particle, scope),
            Entity::Attribute(attribute) => self.resolve_attribute(attribute, scope),
        }
    }

    /// The name of a named global component, unless an existing type was registered for it.
    fn global_name(&self, name: &QName) -> TypeName {
        if let Some(existing) = self.existing.get(name) {
            return existing.clone();
        }
        self.namespace_local_name(name)
    }

    /// `namespace.local_name` with the mapped namespace and the verbatim local name.
    fn namespace_local_name(&self, name: &QName) -> TypeName {
        TypeName::new(
            self.namespaces.map(name.namespace_or_empty()),
            name.local_name.as_str(),
        )
    }

    /// Name of an anonymous type declared by a local component called `name`.
    fn nested_name(&self, name: &QName, scope: &NameScope) -> TypeName {
        match scope.innermost() {
            Some(outer) => outer.nested(name.local_name.as_str()),
            None => {
                debug!(%name, "no enclosing named type, falling back to the namespace");
                self.namespace_local_name(name)
            }
        }
    }

    fn resolve_type(&self, type_def: TypeDefinition, scope: &NameScope) -> Result<TypeName> {
        if let Some(name) = type_def.name(self.graph) {
            return Ok(self.global_name(&name));
        }
        match type_def {
            TypeDefinition::Complex(complex) => match complex.get(self.graph).context {
                Some(complex_type_def::Context::Element(element)) => {
                    self.resolve_element(element, scope)
                }
                None => Err(self.anonymous_type_error(scope)),
            },
            TypeDefinition::Simple(simple) => self.resolve_anonymous_simple_type(simple, scope),
        }
    }

    fn resolve_anonymous_simple_type(
        &self,
        simple: Ref<SimpleTypeDefinition>,
        scope: &NameScope,
    ) -> Result<TypeName> {
        use simple_type_def::Context;

        let Some(context) = simple.get(self.graph).context else {
            return Err(self.anonymous_type_error(scope));
        };
        match context {
            Context::Element(element) if element.get(self.graph).scope.is_global() => {
                // The element's own class holds the value
                Ok(self.resolve_element(element, scope)?.nested("Value"))
            }
            Context::Element(element) => self.resolve_element(element, scope),
            Context::Attribute(attribute) => self.resolve_attribute(attribute, scope),
            Context::ComplexType(_) => self.nested_in_innermost("Value", scope),
            Context::SimpleType(parent) => {
                let parent_def = parent.get(self.graph);
                let identifier = if parent_def.item_type_definition == Some(simple) {
                    "Item".to_string()
                } else if let Some(index) = parent_def
                    .member_type_definitions
                    .iter()
                    .position(|member| *member == simple)
                {
                    format!("Member{}", index + 1)
                } else {
                    "Base".to_string()
                };
                self.nested_in_innermost(&identifier, scope)
            }
        }
    }

    fn nested_in_innermost(&self, identifier: &str, scope: &NameScope) -> Result<TypeName> {
        scope
            .innermost()
            .map(|outer| outer.nested(identifier))
            .ok_or_else(|| self.anonymous_type_error(scope))
    }

    fn anonymous_type_error(&self, scope: &NameScope) -> GenerateError {
        GenerateError::unmapped(scope_entity(scope), Construct::AnonymousType)
    }

    fn resolve_element(
        &self,
        element_ref: Ref<ElementDeclaration>,
        scope: &NameScope,
    ) -> Result<TypeName> {
        let element = element_ref.get(self.graph);
        let name = element.qualified_name();
        if element.scope.is_global() {
            return Ok(self.global_name(&name));
        }
        match element.type_definition {
            None => Err(GenerateError::unmapped(name, Construct::UntypedElement)),
            Some(type_def) if type_def.name(self.graph).is_some() => {
                self.resolve_type(type_def, scope)
            }
            Some(_) => Ok(self.nested_name(&name, scope)),
        }
    }

    fn resolve_particle(&self, particle: Ref<Particle>, scope: &NameScope) -> Result<TypeName> {
        match particle.get(self.graph).term {
            Term::ElementDeclaration(element) => self.resolve_element(element, scope),
            Term::ModelGroup(group) => {
                let construct = match group.get(self.graph).compositor {
                    Compositor::All => Construct::AllGroup,
                    Compositor::Choice | Compositor::Sequence => Construct::ModelGroup,
                };
                Err(GenerateError::unmapped(scope_entity(scope), construct))
            }
            Term::Wildcard(_) => Err(GenerateError::unmapped(
                scope_entity(scope),
                Construct::Wildcard,
            )),
        }
    }

    fn resolve_attribute(
        &self,
        attribute_ref: Ref<AttributeDeclaration>,
        scope: &NameScope,
    ) -> Result<TypeName> {
        let attribute = attribute_ref.get(self.graph);
        let type_def = TypeDefinition::Simple(attribute.type_definition);
        if type_def.name(self.graph).is_some() {
            return self.resolve_type(type_def, scope);
        }
        let name = attribute.qualified_name();
        if attribute.scope.is_global() {
            Ok(self.global_name(&name))
        } else {
            Ok(self.nested_name(&name, scope))
        }
    }
}

/// Describes where in the walk an error occurred.
pub(crate) fn scope_entity(scope: &NameScope) -> String {
    scope
        .innermost()
        .map_or_else(|| "the schema".to_string(), TypeName::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_tracks_innermost_name() {
        let mut scope = NameScope::root();
        assert!(scope.innermost().is_none());
        scope.push(TypeName::new("Gen", "Outer"));
        let inner = scope.enter(TypeName::new("Gen", "Outer").nested("Inner"));
        assert_eq!(inner.depth(), 2);
        assert_eq!(inner.innermost().unwrap().to_string(), "Gen.Outer.Inner");
        assert_eq!(scope.pop().unwrap().to_string(), "Gen.Outer");
        assert_eq!(scope.depth(), 0);
    }
}
