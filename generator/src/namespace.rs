use indexmap::IndexMap;

/// Maps XML namespaces to output namespaces. The absent namespace is the empty string.
///
/// Unmapped namespaces map to themselves.
#[derive(Clone, Debug, Default)]
pub struct NamespaceMapper {
    mappings: IndexMap<String, String>,
}

impl NamespaceMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `output_namespace` for `xml_namespace`, replacing an earlier registration.
    pub fn register(
        &mut self,
        xml_namespace: impl Into<String>,
        output_namespace: impl Into<String>,
    ) {
        self.mappings
            .insert(xml_namespace.into(), output_namespace.into());
    }

    pub fn map<'a>(&'a self, xml_namespace: &'a str) -> &'a str {
        self.mappings
            .get(xml_namespace)
            .map(String::as_str)
            .unwrap_or(xml_namespace)
    }

    pub fn mappings(&self) -> impl Iterator<Item = (&str, &str)> {
        self.mappings
            .iter()
            .map(|(xml, output)| (xml.as_str(), output.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unmapped_namespace_is_returned_verbatim() {
        let mapper = NamespaceMapper::new();
        assert_eq!(mapper.map("http://example.com/ns"), "http://example.com/ns");
        assert_eq!(mapper.map(""), "");
    }

    #[test]
    fn last_registration_wins() {
        let mut mapper = NamespaceMapper::new();
        mapper.register("http://example.com/ns", "First");
        mapper.register("", "NoNamespace");
        mapper.register("http://example.com/ns", "Gen");
        assert_eq!(mapper.map("http://example.com/ns"), "Gen");
        assert_eq!(mapper.map(""), "NoNamespace");
        assert_eq!(mapper.mappings().count(), 2);
    }
}
