//! Renders [`CodeModel`]s to source code.

pub mod rust;

use indexmap::IndexMap;

use crate::model::{ClassModel, CodeModel};

/// The classes of a code model arranged by namespace segment, e.g. `Gen.Model` becomes the
/// module `gen` with the child module `model`.
#[derive(Debug, Default)]
pub(crate) struct ModuleTree<'a> {
    pub(crate) classes: Vec<&'a ClassModel>,
    pub(crate) children: IndexMap<&'a str, ModuleTree<'a>>,
}

impl<'a> ModuleTree<'a> {
    pub(crate) fn new(model: &'a CodeModel) -> Self {
        let mut root = Self::default();
        for (namespace, classes) in &model.namespaces {
            let module = namespace_segments(namespace)
                .fold(&mut root, |module, segment| {
                    module.children.entry(segment).or_default()
                });
            module.classes.extend(classes);
        }
        root
    }
}

/// Splits an output namespace into module segments. Unmapped XML namespaces are URIs, so every
/// character that cannot appear in an identifier separates segments.
pub(crate) fn namespace_segments(namespace: &str) -> impl Iterator<Item = &str> {
    namespace
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|segment| !segment.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segments_of_dotted_and_uri_namespaces() {
        assert_eq!(
            namespace_segments("Gen.Model").collect::<Vec<_>>(),
            ["Gen", "Model"]
        );
        assert_eq!(
            namespace_segments("http://example.com/ns").collect::<Vec<_>>(),
            ["http", "example", "com", "ns"]
        );
        assert_eq!(namespace_segments("").count(), 0);
    }
}
