use thiserror::Error;

use crate::xstypes::QName;

/// Errors raised while compiling XSD documents into a [`SchemaGraph`](crate::SchemaGraph).
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("malformed XML: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("expected an xs:schema root element, found <{0}>")]
    NotASchema(String),

    #[error("failed to resolve prefix {0:?} to a namespace URI")]
    NamePrefixNotResolved(String),

    #[error("<{element}> is missing the required attribute `{attribute}`")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },

    #[error("<{element}> needs a <{child}> child")]
    MissingChild {
        element: &'static str,
        child: &'static str,
    },

    #[error("invalid value {value:?} for `{attribute}`")]
    InvalidValue {
        attribute: &'static str,
        value: String,
    },

    #[error("unresolved {kind} reference {name}")]
    UnresolvedReference { kind: &'static str, name: QName },

    #[error("duplicate {kind} {name}")]
    DuplicateComponent { kind: &'static str, name: QName },

    #[error("circular definition involving {0}")]
    CircularDefinition(&'static str),

    #[error("schema components were left unmapped")]
    Incomplete,

    #[error("unsupported schema construct: {0}")]
    Unsupported(String),
}
