use std::collections::{HashMap, HashSet};

use roxmltree::Node;

use super::{
    components::{
        Component, ComponentTraits, ConstructionComponentTable, DynamicRef, HasArenaContainer,
        Lookup, LookupTables,
    },
    error::ReadError,
    xstypes::QName,
    Ref,
};

/// A top-level schema element together with the `<schema>` element it belongs to.
#[derive(Copy, Clone)]
struct TopLevelNode<'a, 'input> {
    node: Node<'a, 'input>,
    schema: Node<'a, 'input>,
}

pub(crate) trait TopLevelMappable: Component + Sized + 'static
where
    ComponentTraits: HasArenaContainer<Self>,
{
    /// Map this component from a top-level XML element. `self_ref` is the pre-reserved [`Ref`] for
    /// this component, `self_node` is the actual element, and `schema_node` is the root `<schema>`
    /// element.
    fn map_from_top_level_xml(
        context: &mut MappingContext,
        self_ref: Ref<Self>,
        self_node: Node,
        schema_node: Node,
    ) -> Result<(), ReadError>;
}

/// State shared by all mapping functions while one or more schema documents are compiled.
///
/// Top-level components are reserved and registered by name before anything is mapped, so that
/// references can be resolved regardless of declaration order. Components whose content is needed
/// (not just their `Ref`) are mapped on demand through [`MappingContext::request`].
pub(crate) struct MappingContext<'a, 'input> {
    pub(crate) components: ConstructionComponentTable,
    pub(crate) lookups: LookupTables,

    top_level: HashMap<DynamicRef, TopLevelNode<'a, 'input>>,
    in_progress: HashSet<DynamicRef>,
}

impl<'a, 'input: 'a> MappingContext<'a, 'input> {
    pub(crate) fn new() -> Self {
        Self {
            components: ConstructionComponentTable::new(),
            lookups: LookupTables::default(),
            top_level: HashMap::new(),
            in_progress: HashSet::new(),
        }
    }

    pub(crate) fn reserve<R>(&mut self) -> Ref<R>
    where
        R: Component,
        ComponentTraits: HasArenaContainer<R>,
    {
        self.components.reserve()
    }

    pub(crate) fn create<R>(&mut self, value: R) -> Ref<R>
    where
        R: Component,
        ComponentTraits: HasArenaContainer<R>,
    {
        self.components.create(value)
    }

    pub(crate) fn insert<R>(&mut self, ref_: Ref<R>, value: R) -> Ref<R>
    where
        R: Component,
        ComponentTraits: HasArenaContainer<R>,
    {
        self.components.insert(ref_, value)
    }

    /// Registers `value` under `name` in its symbol space. `kind` names the symbol space in errors.
    pub(crate) fn register_with_name<R>(
        &mut self,
        name: QName,
        value: R,
        kind: &'static str,
    ) -> Result<(), ReadError>
    where
        R: Copy,
        LookupTables: Lookup<R>,
    {
        if self.lookups.lookup_value(&name).is_some() {
            return Err(ReadError::DuplicateComponent { kind, name });
        }
        self.lookups.register_value_for_lookup(name, value);
        Ok(())
    }

    pub(crate) fn resolve<R>(&self, key: &QName, kind: &'static str) -> Result<R, ReadError>
    where
        R: Copy,
        LookupTables: Lookup<R>,
    {
        self.lookups
            .lookup_value(key)
            .ok_or_else(|| ReadError::UnresolvedReference {
                kind,
                name: key.clone(),
            })
    }

    /// Remembers the XML element a reserved top-level component will be mapped from.
    pub(crate) fn declare_top_level<C>(
        &mut self,
        ref_: Ref<C>,
        node: Node<'a, 'input>,
        schema: Node<'a, 'input>,
    ) where
        C: TopLevelMappable,
        ComponentTraits: HasArenaContainer<C>,
    {
        self.top_level
            .insert(ref_.into(), TopLevelNode { node, schema });
    }

    /// Returns the component behind `ref_`, mapping it from its top-level element first if that
    /// has not happened yet.
    pub(crate) fn request<C>(&mut self, ref_: Ref<C>) -> Result<&C, ReadError>
    where
        C: TopLevelMappable,
        ComponentTraits: HasArenaContainer<C>,
    {
        if !self.components.is_present(ref_) {
            let dynref = DynamicRef::from(ref_);
            let top_level = match self.top_level.get(&dynref) {
                Some(top_level) if self.in_progress.insert(dynref) => *top_level,
                _ => return Err(ReadError::CircularDefinition(C::DISPLAY_NAME)),
            };

            C::map_from_top_level_xml(self, ref_, top_level.node, top_level.schema)?;
            self.in_progress.remove(&dynref);
        }
        Ok(ref_.get(&self.components))
    }
}
