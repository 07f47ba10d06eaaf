use roxmltree::Node;

/// Collects the text of the `<xs:documentation>` children of a component's `<xs:annotation>`.
///
/// Paragraphs from several documentation elements are joined by blank lines; surrounding
/// whitespace of each is trimmed. Returns `None` if there is no non-empty documentation.
pub(crate) fn documentation(node: Node) -> Option<String> {
    let paragraphs = node
        .children()
        .filter(|c| c.tag_name().name() == "annotation")
        .flat_map(|annotation| annotation.children())
        .filter(|c| c.tag_name().name() == "documentation")
        .map(|documentation| {
            documentation
                .descendants()
                .filter(Node::is_text)
                .filter_map(|text| text.text())
                .collect::<String>()
        })
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>();

    (!paragraphs.is_empty()).then(|| paragraphs.join("\n\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_documentation_paragraphs() {
        let doc = roxmltree::Document::parse(
            r#"<xs:complexType xmlns:xs="http://www.w3.org/2001/XMLSchema">
                 <xs:annotation>
                   <xs:appinfo>ignored</xs:appinfo>
                   <xs:documentation> A person. </xs:documentation>
                   <xs:documentation>Has <b>two</b> names.</xs:documentation>
                 </xs:annotation>
               </xs:complexType>"#,
        )
        .unwrap();
        assert_eq!(
            documentation(doc.root_element()).as_deref(),
            Some("A person.\n\nHas two names.")
        );
    }

    #[test]
    fn no_annotation() {
        let doc = roxmltree::Document::parse("<element/>").unwrap();
        assert_eq!(documentation(doc.root_element()), None);
    }
}
