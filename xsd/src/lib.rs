//! Schema graph for XML Schema 1.1 documents.
//!
//! [`read_schema`] compiles XSD text into a [`SchemaGraph`]: an arena of schema components
//! addressed by typed [`Ref`]s, plus the global symbol spaces for types, elements and attributes.
//! Only the subset of XSD needed to derive type models is read; see [`schema`] for what is
//! skipped.

pub mod attribute_decl;
pub mod attribute_group_def;
pub mod attribute_use;
pub mod complex_type_def;
pub mod element_decl;
pub mod error;
pub mod model_group;
pub mod model_group_def;
pub mod particle;
pub mod schema;
pub mod shared;
pub mod simple_type_def;
pub mod wildcard;
pub mod xstypes;

mod annotation;
mod builtins;
mod components;
mod mapping_context;
mod values;

pub use attribute_decl::AttributeDeclaration;
pub use attribute_group_def::AttributeGroupDefinition;
pub use attribute_use::AttributeUse;
pub use complex_type_def::ComplexTypeDefinition;
pub use element_decl::ElementDeclaration;
pub use error::ReadError;
pub use model_group::ModelGroup;
pub use model_group_def::ModelGroupDefinition;
pub use particle::Particle;
pub use schema::{read_schema, read_schemas, ReadOptions, SchemaGraph};
pub use shared::{Term, TypeDefinition};
pub use simple_type_def::SimpleTypeDefinition;
pub use wildcard::Wildcard;
pub use xstypes::QName;

pub use builtins::{is_builtin_name, XS_NAMESPACE};
pub use components::{Component, ComponentTable, Named, Ref, RefNamed, SchemaComponentTable};
use mapping_context::MappingContext;
