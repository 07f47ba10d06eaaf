use std::fmt;

use thiserror::Error;

use crate::model::TypeName;

/// Errors raised while deriving a [`CodeModel`](crate::model::CodeModel). All of them abort the
/// build.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("cannot map {construct} in {entity}")]
    UnmappedConstruct { entity: String, construct: Construct },

    #[error("duplicate type name {name}")]
    DuplicateTypeName { name: TypeName },
}

/// Schema constructs the code model has no representation for.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Construct {
    /// An `xs:all` model group.
    AllGroup,
    /// An `xs:any` wildcard particle.
    Wildcard,
    /// An element declaration without a type.
    UntypedElement,
    /// A sequence or choice resolved as if it were a named entity.
    ModelGroup,
    /// An anonymous type with neither a declaring component nor an enclosing class.
    AnonymousType,
}

impl fmt::Display for Construct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::AllGroup => "an xs:all group",
            Self::Wildcard => "an xs:any wildcard",
            Self::UntypedElement => "an untyped element",
            Self::ModelGroup => "an unnamed model group",
            Self::AnonymousType => "an anonymous type without context",
        })
    }
}

impl GenerateError {
    pub(crate) fn unmapped(entity: impl fmt::Display, construct: Construct) -> Self {
        Self::UnmappedConstruct {
            entity: entity.to_string(),
            construct,
        }
    }
}
