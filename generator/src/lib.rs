//! Derives language-neutral code models from XML Schema graphs.
//!
//! A [`CodeModelBuilder`] walks the global types, elements and attributes of a
//! [`tm_xsd::SchemaGraph`] and produces a [`CodeModel`]: classes grouped by output namespace, with
//! properties, inheritance and the XML names needed to serialize values of the generated types.
//! The [`render`] module turns a code model into source code.

pub mod builtin;
pub mod error;
pub mod model;
pub mod namespace;
pub mod naming;
pub mod resolver;

mod builder;

#[cfg(feature = "render-rust")]
pub mod render;

pub use builder::CodeModelBuilder;
pub use builtin::ScalarType;
pub use error::{Construct, GenerateError};
pub use model::{
    Cardinality, ClassKind, ClassModel, CodeModel, PropertyModel, TypeName, TypeRef, ValueModel,
    XmlBinding, XmlName, XmlNodeKind, XmlTypeInfo,
};
pub use namespace::NamespaceMapper;
pub use resolver::{Entity, NameScope, TypeNameResolver};
