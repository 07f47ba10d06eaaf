use tm_xsd::{SchemaGraph, TypeDefinition};

use crate::builtin::ScalarType;
use crate::error::GenerateError;
use crate::model::TypeName;
use crate::resolver::{self, Entity, NameScope, TypeNameResolver};

/// State of one [`build`](super::CodeModelBuilder::build) walk.
pub(super) struct GeneratorContext<'a> {
    pub(super) graph: &'a SchemaGraph,
    resolver: TypeNameResolver<'a>,
    /// The classes currently being generated, outermost first.
    scope: NameScope,
}

impl<'a> GeneratorContext<'a> {
    pub(super) fn new(resolver: TypeNameResolver<'a>) -> Self {
        Self {
            graph: resolver.graph(),
            resolver,
            scope: NameScope::root(),
        }
    }

    pub(super) fn resolve(&self, entity: Entity) -> Result<TypeName, GenerateError> {
        self.resolver.resolve(entity, &self.scope)
    }

    /// Runs `f` with `name` as the innermost open class.
    pub(super) fn in_scope<T>(
        &mut self,
        name: TypeName,
        f: impl FnOnce(&mut Self) -> Result<T, GenerateError>,
    ) -> Result<T, GenerateError> {
        self.scope.push(name);
        let result = f(self);
        self.scope.pop();
        result
    }

    /// `true` if `name` is declared directly inside the class being generated, i.e. the type it
    /// names has to be generated as a nested class right here.
    pub(super) fn is_nested_here(&self, name: &TypeName) -> bool {
        self.scope
            .innermost()
            .is_some_and(|outer| name.is_nested_in(outer))
    }

    /// The class being generated, for error messages.
    pub(super) fn current_entity(&self) -> String {
        resolver::scope_entity(&self.scope)
    }

    /// The scalar a built-in type maps to; `None` for user-defined types.
    pub(super) fn builtin_scalar(&self, type_def: TypeDefinition) -> Option<ScalarType> {
        use tm_xsd::RefNamed;

        type_def
            .name(self.graph)
            .and_then(|name| ScalarType::from_xsd(&name))
    }
}
