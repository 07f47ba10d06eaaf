use std::fmt;

use super::error::ReadError;

pub type NCName = String;
pub type AnyURI = String;

pub type Sequence<T> = Vec<T>;
pub type Set<T> = Vec<T>;

/// An expanded name: an optional namespace name plus a local name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QName {
    pub namespace_name: Option<AnyURI>,
    pub local_name: NCName,
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(namespace_name) = self.namespace_name.as_ref() {
            write!(f, "{{{}}}{}", namespace_name, self.local_name)
        } else {
            write!(f, "{}", self.local_name)
        }
    }
}

impl QName {
    pub fn with_namespace(
        namespace_name: impl Into<String>,
        local_name: impl Into<String>,
    ) -> Self {
        Self::with_optional_namespace(Some(namespace_name), local_name)
    }

    pub fn with_optional_namespace(
        namespace_name: Option<impl Into<String>>,
        local_name: impl Into<String>,
    ) -> Self {
        Self {
            namespace_name: namespace_name.map(Into::into),
            local_name: local_name.into(),
        }
    }

    /// The namespace name, with the empty string standing in for "no namespace".
    pub fn namespace_or_empty(&self) -> &str {
        self.namespace_name.as_deref().unwrap_or_default()
    }

    /// Parses Clark notation (`{namespace}local` or just `local`).
    pub fn from_clark(source: &str) -> Option<Self> {
        match source.strip_prefix('{') {
            Some(rest) => {
                let (namespace, local) = rest.split_once('}')?;
                (!local.is_empty()).then(|| Self::with_namespace(namespace, local))
            }
            None => (!source.is_empty()).then(|| Self::with_optional_namespace(None::<String>, source)),
        }
    }

    pub(crate) fn qualified(
        prefix: &str,
        local_name: impl Into<String>,
        context: roxmltree::Node,
    ) -> Result<Self, ReadError> {
        let resolved_prefix = if prefix == "xml" {
            // The prefix xml is by definition bound to the namespace name
            // http://www.w3.org/XML/1998/namespace. (Namespaces in XML 1.0, §3)
            "http://www.w3.org/XML/1998/namespace"
        } else {
            context
                .lookup_namespace_uri(Some(prefix))
                .ok_or_else(|| ReadError::NamePrefixNotResolved(prefix.into()))?
        };
        Ok(Self::with_namespace(resolved_prefix, local_name))
    }

    pub(crate) fn unqualified(local_name: impl Into<String>, context: roxmltree::Node) -> Self {
        // An unprefixed QName value takes the default namespace in scope, if any.
        // (Namespaces in XML 1.0, §6.2)
        let namespace_name = context.lookup_namespace_uri(None);
        QName::with_optional_namespace(namespace_name, local_name)
    }

    /// Resolves a prefixed name (`tns:Foo`) against the namespace declarations in scope at
    /// `context`.
    pub(crate) fn parse(source: &str, context: roxmltree::Node) -> Result<Self, ReadError> {
        if let Some((prefix, local)) = source.split_once(':') {
            Self::qualified(prefix, local, context)
        } else {
            Ok(Self::unqualified(source, context))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clark_notation() {
        assert_eq!(
            QName::from_clark("{urn:a}Foo"),
            Some(QName::with_namespace("urn:a", "Foo"))
        );
        assert_eq!(
            QName::from_clark("Foo"),
            Some(QName::with_optional_namespace(None::<String>, "Foo"))
        );
        assert_eq!(QName::from_clark("{urn:a}"), None);
        assert_eq!(QName::from_clark("{urn:a"), None);
    }

    #[test]
    fn display_uses_clark_notation() {
        let name = QName::with_namespace("urn:a", "Foo");
        assert_eq!(name.to_string(), "{urn:a}Foo");
        assert_eq!(QName::from_clark(&name.to_string()), Some(name));
    }

    #[test]
    fn prefixes_resolve_against_scope() {
        let doc = roxmltree::Document::parse(r#"<a xmlns="urn:default" xmlns:t="urn:t"/>"#)
            .unwrap();
        let node = doc.root_element();
        assert_eq!(
            QName::parse("t:Foo", node).unwrap(),
            QName::with_namespace("urn:t", "Foo")
        );
        assert_eq!(
            QName::parse("Foo", node).unwrap(),
            QName::with_namespace("urn:default", "Foo")
        );
        assert!(matches!(
            QName::parse("x:Foo", node),
            Err(ReadError::NamePrefixNotResolved(prefix)) if prefix == "x"
        ));
    }
}
