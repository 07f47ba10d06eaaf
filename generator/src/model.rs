//! The language-neutral code model produced by [`CodeModelBuilder`](crate::CodeModelBuilder).

use std::fmt;

use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use tm_xsd::{particle::MaxOccurs, QName};

use crate::builtin::ScalarType;

/// Full name of a generated type: the output namespace plus the path of names leading to it,
/// e.g. `Gen.WithNested.Nested` for a class nested inside `Gen.WithNested`.
///
/// Path segments are schema local names as written; target languages make identifiers out of
/// them when rendering.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeName {
    namespace: String,
    path: Vec<String>,
}

impl TypeName {
    pub fn new(namespace: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            path: vec![identifier.into()],
        }
    }

    /// Parses a dotted name such as `Out.Name`. The last segment is the identifier, everything
    /// before it the namespace.
    pub fn parse(full_name: &str) -> Option<Self> {
        let (namespace, identifier) = full_name.rsplit_once('.').unwrap_or(("", full_name));
        (!identifier.is_empty()).then(|| Self::new(namespace, identifier))
    }

    /// The name of a type declared inside this one.
    pub fn nested(&self, identifier: impl Into<String>) -> Self {
        let mut path = self.path.clone();
        path.push(identifier.into());
        Self {
            namespace: self.namespace.clone(),
            path,
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Identifiers from the outermost enclosing type down to this one.
    pub fn path(&self) -> &[String] {
        &self.path
    }

    pub fn identifier(&self) -> &str {
        self.path.last().map(String::as_str).unwrap_or_default()
    }

    pub fn is_nested(&self) -> bool {
        self.path.len() > 1
    }

    /// `true` if this name denotes a type declared directly inside `outer`.
    pub fn is_nested_in(&self, outer: &TypeName) -> bool {
        self.namespace == outer.namespace
            && self.path.len() == outer.path.len() + 1
            && self.path.starts_with(&outer.path)
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.namespace.is_empty() {
            write!(f, "{}.", self.namespace)?;
        }
        write!(f, "{}", self.path.join("."))
    }
}

impl Serialize for TypeName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// The generated classes, grouped by output namespace in first-appearance order.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(transparent)]
pub struct CodeModel {
    pub namespaces: IndexMap<String, Vec<ClassModel>>,
}

impl CodeModel {
    /// All top-level classes, namespace by namespace.
    pub fn classes(&self) -> impl Iterator<Item = &ClassModel> {
        self.namespaces.values().flatten()
    }

    /// Looks up a class (top-level or nested) by its full dotted name.
    pub fn find(&self, full_name: &str) -> Option<&ClassModel> {
        self.classes().find_map(|class| class.find(full_name))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ClassModel {
    pub identifier: String,
    pub namespace: String,
    pub name: TypeName,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base: Option<TypeName>,
    pub properties: Vec<PropertyModel>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub nested: Vec<ClassModel>,
    pub kind: ClassKind,
    pub is_abstract: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,
    pub xml: XmlTypeInfo,
}

impl ClassModel {
    pub fn property(&self, identifier: &str) -> Option<&PropertyModel> {
        self.properties.iter().find(|p| p.identifier == identifier)
    }

    /// This class or one of its nested classes, by full dotted name.
    pub fn find(&self, full_name: &str) -> Option<&ClassModel> {
        if self.name.to_string() == full_name {
            return Some(self);
        }
        self.nested.iter().find_map(|nested| nested.find(full_name))
    }

    pub fn value_model(&self) -> Option<&ValueModel> {
        match &self.kind {
            ClassKind::Complex => None,
            ClassKind::Value(value) => Some(value),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ClassKind {
    Complex,
    Value(ValueModel),
}

/// The shape of a class generated from a simple type.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueModel {
    Alias(TypeRef),
    Enumeration { base: TypeRef, members: Vec<String> },
    List(TypeRef),
    Union(Vec<TypeRef>),
}

/// Schema-side identity of a class.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct XmlTypeInfo {
    /// The qualified name of the type definition the class was generated from, absent for
    /// anonymous types.
    pub type_name: Option<XmlName>,
    /// Set only for classes that correspond to a global element.
    pub root_element: Option<XmlName>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct XmlName {
    pub namespace: Option<String>,
    pub local_name: String,
}

impl XmlName {
    pub fn new(namespace: Option<&str>, local_name: &str) -> Self {
        Self {
            namespace: namespace.map(str::to_string),
            local_name: local_name.to_string(),
        }
    }
}

impl From<&QName> for XmlName {
    fn from(name: &QName) -> Self {
        Self::new(name.namespace_name.as_deref(), &name.local_name)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PropertyModel {
    pub identifier: String,
    pub type_ref: TypeRef,
    pub cardinality: Cardinality,
    pub xml: XmlBinding,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,
}

/// Reference from a property (or value model) to the type of its values.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum TypeRef {
    Scalar(ScalarType),
    /// A top-level class, generated or registered as an existing type.
    Class(TypeName),
    /// A class generated inside the owning class.
    Nested(TypeName),
}

impl TypeRef {
    pub fn type_name(&self) -> Option<&TypeName> {
        match self {
            Self::Scalar(_) => None,
            Self::Class(name) | Self::Nested(name) => Some(name),
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(scalar) => write!(f, "{scalar:?}"),
            Self::Class(name) | Self::Nested(name) => write!(f, "{name}"),
        }
    }
}

/// Occurrence bounds of a property; `max_occurs` is `None` when unbounded.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Cardinality {
    pub min_occurs: u64,
    pub max_occurs: Option<u64>,
}

impl Cardinality {
    pub const REQUIRED: Self = Self {
        min_occurs: 1,
        max_occurs: Some(1),
    };
    pub const OPTIONAL: Self = Self {
        min_occurs: 0,
        max_occurs: Some(1),
    };

    pub fn new(min_occurs: u64, max_occurs: MaxOccurs) -> Self {
        Self {
            min_occurs,
            max_occurs: max_occurs.count(),
        }
    }

    pub fn is_optional(&self) -> bool {
        self.min_occurs == 0 && !self.is_collection()
    }

    pub fn is_collection(&self) -> bool {
        self.max_occurs.map_or(true, |max| max > 1)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct XmlBinding {
    pub kind: XmlNodeKind,
    /// Absent for text content.
    pub name: Option<XmlName>,
    pub nillable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_constraint: Option<ValueConstraint>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum XmlNodeKind {
    Element,
    Attribute,
    Text,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueConstraint {
    Default(String),
    Fixed(String),
}

impl From<&tm_xsd::shared::ValueConstraint> for ValueConstraint {
    fn from(constraint: &tm_xsd::shared::ValueConstraint) -> Self {
        use tm_xsd::shared::ValueConstraintVariety;

        let value = constraint.lexical_form.clone();
        match constraint.variety {
            ValueConstraintVariety::Default => Self::Default(value),
            ValueConstraintVariety::Fixed => Self::Fixed(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_name_display() {
        let outer = TypeName::new("Gen", "WithNested");
        let nested = outer.nested("Nested");
        assert_eq!(nested.to_string(), "Gen.WithNested.Nested");
        assert_eq!(nested.identifier(), "Nested");
        assert!(nested.is_nested());
        assert_eq!(TypeName::new("", "Person").to_string(), "Person");
    }

    #[test]
    fn type_name_parse() {
        let name = TypeName::parse("Out.Model.Name").unwrap();
        assert_eq!(name.namespace(), "Out.Model");
        assert_eq!(name.identifier(), "Name");
        assert_eq!(TypeName::parse("Name").unwrap().namespace(), "");
        assert_eq!(TypeName::parse("Out."), None);
    }

    #[test]
    fn cardinality_kinds() {
        assert!(Cardinality::OPTIONAL.is_optional());
        assert!(!Cardinality::REQUIRED.is_optional());
        assert!(!Cardinality::REQUIRED.is_collection());
        let many = Cardinality::new(0, MaxOccurs::Unbounded);
        assert!(many.is_collection());
        assert!(!many.is_optional());
        assert!(Cardinality::new(1, MaxOccurs::Count(3)).is_collection());
    }
}
