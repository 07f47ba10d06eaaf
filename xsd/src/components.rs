use std::any::TypeId;
use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;
use std::num::NonZeroU32;

use indexmap::IndexMap;

use super::xstypes::QName;
use super::{
    AttributeDeclaration, AttributeGroupDefinition, AttributeUse, ComplexTypeDefinition,
    ElementDeclaration, ModelGroup, ModelGroupDefinition, Particle, SimpleTypeDefinition,
    TypeDefinition, Wildcard,
};

/// A kind of schema component stored in its own arena.
pub trait Component {
    const DISPLAY_NAME: &'static str;
}

/// Carrier of the arena accessors, kept off the public [`Component`] trait.
pub struct ComponentTraits;

/// Arena accessors for components of kind `R`.
pub trait HasArenaContainer<R: Component>: Sized {
    fn get_container_from_construction_component_table(
        table: &ConstructionComponentTable,
    ) -> &[Option<R>];
    fn get_container_from_construction_component_table_mut(
        table: &mut ConstructionComponentTable,
    ) -> &mut Vec<Option<R>>;
    fn get_container_from_schema_component_table(table: &SchemaComponentTable) -> &[R];
}

/// Typed handle to a component in a [`ComponentTable`]. IDs start at 1.
pub struct Ref<R>(NonZeroU32, PhantomData<R>)
where
    R: Component,
    ComponentTraits: HasArenaContainer<R>;

impl<R> Ref<R>
where
    R: Component,
    ComponentTraits: HasArenaContainer<R>,
{
    const fn from_inner(inner: NonZeroU32) -> Self {
        Self(inner, PhantomData)
    }

    const fn inner(self) -> NonZeroU32 {
        self.0
    }

    fn index(self) -> usize {
        // u32 always fits into usize on the targets we build for
        self.0.get() as usize - 1
    }

    pub fn get(self, table: &impl ComponentTable) -> &R {
        table.get(self)
    }
}

impl<R> Copy for Ref<R>
where
    R: Component,
    ComponentTraits: HasArenaContainer<R>,
{
}

impl<R> Clone for Ref<R>
where
    R: Component,
    ComponentTraits: HasArenaContainer<R>,
{
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> fmt::Debug for Ref<R>
where
    R: Component,
    ComponentTraits: HasArenaContainer<R>,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "<{} #{}>", R::DISPLAY_NAME, self.0)
    }
}

impl<R> PartialEq for Ref<R>
where
    R: Component,
    ComponentTraits: HasArenaContainer<R>,
{
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<R> Eq for Ref<R>
where
    R: Component,
    ComponentTraits: HasArenaContainer<R>,
{
}

impl<R> Hash for Ref<R>
where
    R: Component,
    ComponentTraits: HasArenaContainer<R>,
{
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

/// A reference to a component whose type is not known at compile time.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub(crate) struct DynamicRef(TypeId, NonZeroU32);

impl<R> From<Ref<R>> for DynamicRef
where
    R: Component + 'static,
    ComponentTraits: HasArenaContainer<R>,
{
    fn from(ref_: Ref<R>) -> Self {
        Self(TypeId::of::<R>(), ref_.inner())
    }
}

/// Resolves [`Ref`]s to components.
pub trait ComponentTable {
    /// Panics if `ref_` points to an empty slot or into another table.
    fn get<R>(&self, ref_: Ref<R>) -> &R
    where
        R: Component,
        ComponentTraits: HasArenaContainer<R>;
}

/// The [component table](ComponentTable) used while a schema is being read.
///
/// Slots are `Option`s since components often need to reference themselves (an anonymous type
/// points back at its element), and are therefore inserted after their `Ref` was handed out.
#[derive(Default)]
pub struct ConstructionComponentTable {
    attribute_declarations: Vec<Option<AttributeDeclaration>>,
    attribute_group_definitions: Vec<Option<AttributeGroupDefinition>>,
    attribute_uses: Vec<Option<AttributeUse>>,
    complex_type_definitions: Vec<Option<ComplexTypeDefinition>>,
    element_declarations: Vec<Option<ElementDeclaration>>,
    model_group_definitions: Vec<Option<ModelGroupDefinition>>,
    model_groups: Vec<Option<ModelGroup>>,
    particles: Vec<Option<Particle>>,
    simple_type_definitions: Vec<Option<SimpleTypeDefinition>>,
    wildcards: Vec<Option<Wildcard>>,
}

impl ComponentTable for ConstructionComponentTable {
    fn get<R>(&self, ref_: Ref<R>) -> &R
    where
        R: Component,
        ComponentTraits: HasArenaContainer<R>,
    {
        let container = ComponentTraits::get_container_from_construction_component_table(self);
        container
            .get(ref_.index())
            .expect("Invalid component reference (out-of-bounds)")
            .as_ref()
            .expect("Component is not present")
    }
}

impl ConstructionComponentTable {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Hands out the `Ref` of a new, still empty slot.
    pub(crate) fn reserve<R>(&mut self) -> Ref<R>
    where
        R: Component,
        ComponentTraits: HasArenaContainer<R>,
    {
        let container = ComponentTraits::get_container_from_construction_component_table_mut(self);
        container.push(None);

        // The length is the ref's ID, which is non-zero after the push
        let id = u32::try_from(container.len())
            .ok()
            .and_then(NonZeroU32::new)
            .expect("component ID did not fit into a non-zero 32-bit integer");
        Ref::from_inner(id)
    }

    /// Fills the slot of `ref_` and returns `ref_`.
    pub(crate) fn insert<R>(&mut self, ref_: Ref<R>, value: R) -> Ref<R>
    where
        R: Component,
        ComponentTraits: HasArenaContainer<R>,
    {
        let container = ComponentTraits::get_container_from_construction_component_table_mut(self);
        let slot = container
            .get_mut(ref_.index())
            .expect("Invalid component reference (out-of-bounds)");
        *slot = Some(value);
        ref_
    }

    pub(crate) fn create<R>(&mut self, value: R) -> Ref<R>
    where
        R: Component,
        ComponentTraits: HasArenaContainer<R>,
    {
        let ref_ = self.reserve();
        self.insert(ref_, value)
    }

    pub(crate) fn is_present<R>(&self, ref_: Ref<R>) -> bool
    where
        R: Component,
        ComponentTraits: HasArenaContainer<R>,
    {
        ComponentTraits::get_container_from_construction_component_table(self)
            .get(ref_.index())
            .is_some_and(Option::is_some)
    }

    /// Freezes the table; `None` while any reserved slot is still empty.
    pub(crate) fn convert_to_schema_table(self) -> Option<SchemaComponentTable> {
        Some(SchemaComponentTable {
            attribute_declarations: Self::convert_container(self.attribute_declarations)?,
            attribute_group_definitions: Self::convert_container(self.attribute_group_definitions)?,
            attribute_uses: Self::convert_container(self.attribute_uses)?,
            complex_type_definitions: Self::convert_container(self.complex_type_definitions)?,
            element_declarations: Self::convert_container(self.element_declarations)?,
            model_group_definitions: Self::convert_container(self.model_group_definitions)?,
            model_groups: Self::convert_container(self.model_groups)?,
            particles: Self::convert_container(self.particles)?,
            simple_type_definitions: Self::convert_container(self.simple_type_definitions)?,
            wildcards: Self::convert_container(self.wildcards)?,
        })
    }

    fn convert_container<R>(container: Vec<Option<R>>) -> Option<Box<[R]>> {
        container.into_iter().collect()
    }
}

/// The read-only [component table](ComponentTable) that backs a compiled
/// [`SchemaGraph`](crate::SchemaGraph).
///
/// Components for which a [`Ref`] exists are always present in this table.
pub struct SchemaComponentTable {
    attribute_declarations: Box<[AttributeDeclaration]>,
    attribute_group_definitions: Box<[AttributeGroupDefinition]>,
    attribute_uses: Box<[AttributeUse]>,
    complex_type_definitions: Box<[ComplexTypeDefinition]>,
    element_declarations: Box<[ElementDeclaration]>,
    model_group_definitions: Box<[ModelGroupDefinition]>,
    model_groups: Box<[ModelGroup]>,
    particles: Box<[Particle]>,
    simple_type_definitions: Box<[SimpleTypeDefinition]>,
    wildcards: Box<[Wildcard]>,
}

impl ComponentTable for SchemaComponentTable {
    fn get<R>(&self, ref_: Ref<R>) -> &R
    where
        R: Component,
        ComponentTraits: HasArenaContainer<R>,
    {
        ComponentTraits::get_container_from_schema_component_table(self)
            .get(ref_.index())
            .expect("Invalid component reference (out-of-bounds)")
    }
}

macro_rules! has_arena_container_impl {
    ($type_name:ty, $field_name:ident) => {
        impl HasArenaContainer<$type_name> for ComponentTraits {
            fn get_container_from_construction_component_table(
                table: &ConstructionComponentTable,
            ) -> &[Option<$type_name>] {
                &table.$field_name
            }

            fn get_container_from_construction_component_table_mut(
                table: &mut ConstructionComponentTable,
            ) -> &mut Vec<Option<$type_name>> {
                &mut table.$field_name
            }

            fn get_container_from_schema_component_table(
                table: &SchemaComponentTable,
            ) -> &[$type_name] {
                &table.$field_name
            }
        }
    };
}

has_arena_container_impl!(AttributeDeclaration, attribute_declarations);
has_arena_container_impl!(AttributeGroupDefinition, attribute_group_definitions);
has_arena_container_impl!(AttributeUse, attribute_uses);
has_arena_container_impl!(ComplexTypeDefinition, complex_type_definitions);
has_arena_container_impl!(ElementDeclaration, element_declarations);
has_arena_container_impl!(ModelGroupDefinition, model_group_definitions);
has_arena_container_impl!(ModelGroup, model_groups);
has_arena_container_impl!(Particle, particles);
has_arena_container_impl!(SimpleTypeDefinition, simple_type_definitions);
has_arena_container_impl!(Wildcard, wildcards);

/// Components with a qualified name. Anonymous types return `None`.
pub trait Named: Component {
    fn name(&self) -> Option<QName>;
}

/// Handles whose component has a name, i.e. every `Ref<impl Named>` and [`TypeDefinition`].
pub trait RefNamed {
    fn name(&self, table: &impl ComponentTable) -> Option<QName>;
}

impl<R> RefNamed for Ref<R>
where
    R: Named,
    ComponentTraits: HasArenaContainer<R>,
{
    fn name(&self, table: &impl ComponentTable) -> Option<QName> {
        self.get(table).name()
    }
}

/// Symbol space access for top-level components of value type `V`.
pub(crate) trait Lookup<V: Copy> {
    /// Returns `true` if `key` was already taken in the symbol space of `V`.
    fn register_value_for_lookup(&mut self, key: QName, value: V) -> bool;

    fn lookup_value(&self, key: &QName) -> Option<V>;
}

type LookupTable<T> = IndexMap<QName, T>;

/// The symbol spaces of a schema, in declaration order.
#[derive(Default)]
pub(crate) struct LookupTables {
    /// Shared symbol space for simple and complex type definitions
    pub(crate) type_definitions: LookupTable<TypeDefinition>,
    pub(crate) attribute_declarations: LookupTable<Ref<AttributeDeclaration>>,
    pub(crate) element_declarations: LookupTable<Ref<ElementDeclaration>>,
    pub(crate) attribute_group_definitions: LookupTable<Ref<AttributeGroupDefinition>>,
    pub(crate) model_group_definitions: LookupTable<Ref<ModelGroupDefinition>>,
}

macro_rules! impl_lookup {
    ($field_name:ident: $value_type:ty) => {
        impl Lookup<$value_type> for LookupTables {
            fn register_value_for_lookup(&mut self, key: QName, value: $value_type) -> bool {
                self.$field_name.insert(key, value).is_some()
            }

            fn lookup_value(&self, key: &QName) -> Option<$value_type> {
                self.$field_name.get(key).copied()
            }
        }
    };
}

impl_lookup!(type_definitions: TypeDefinition);
impl_lookup!(attribute_declarations: Ref<AttributeDeclaration>);
impl_lookup!(element_declarations: Ref<ElementDeclaration>);
impl_lookup!(attribute_group_definitions: Ref<AttributeGroupDefinition>);
impl_lookup!(model_group_definitions: Ref<ModelGroupDefinition>);

impl Lookup<Ref<SimpleTypeDefinition>> for LookupTables {
    fn register_value_for_lookup(&mut self, key: QName, value: Ref<SimpleTypeDefinition>) -> bool {
        self.type_definitions
            .insert(key, TypeDefinition::Simple(value))
            .is_some()
    }

    fn lookup_value(&self, key: &QName) -> Option<Ref<SimpleTypeDefinition>> {
        self.type_definitions
            .get(key)
            .and_then(|type_def| type_def.simple())
    }
}

impl Lookup<Ref<ComplexTypeDefinition>> for LookupTables {
    fn register_value_for_lookup(&mut self, key: QName, value: Ref<ComplexTypeDefinition>) -> bool {
        self.type_definitions
            .insert(key, TypeDefinition::Complex(value))
            .is_some()
    }

    fn lookup_value(&self, key: &QName) -> Option<Ref<ComplexTypeDefinition>> {
        self.type_definitions
            .get(key)
            .and_then(|type_def| type_def.complex())
    }
}
