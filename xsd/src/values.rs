use roxmltree::Node;

use crate::error::ReadError;
use crate::particle::MaxOccurs;
use crate::xstypes::QName;

/// Conversion of an attribute's normalized value into its ·actual value·.
pub trait ActualValue<'a>: Sized {
    fn convert(src: &'a str, parent: Node) -> Result<Self, Option<ReadError>>;
}

impl<'a> ActualValue<'a> for &'a str {
    fn convert(src: &'a str, _parent: Node) -> Result<Self, Option<ReadError>> {
        Ok(src)
    }
}

impl ActualValue<'_> for String {
    fn convert(src: &str, _parent: Node) -> Result<Self, Option<ReadError>> {
        Ok(src.to_string())
    }
}

impl ActualValue<'_> for QName {
    fn convert(src: &str, parent: Node) -> Result<Self, Option<ReadError>> {
        QName::parse(src, parent).map_err(Some)
    }
}

impl<'a, T: ActualValue<'a>> ActualValue<'a> for Vec<T> {
    fn convert(src: &'a str, parent: Node) -> Result<Self, Option<ReadError>> {
        // NOTE: assumes whiteSpace="collapse", which holds for every list-valued schema attribute
        src.split_ascii_whitespace()
            .map(|item| T::convert(item, parent))
            .collect()
    }
}

impl ActualValue<'_> for bool {
    fn convert(src: &str, _parent: Node) -> Result<Self, Option<ReadError>> {
        match src {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            _ => Err(None),
        }
    }
}

impl ActualValue<'_> for u64 {
    fn convert(src: &str, _parent: Node) -> Result<Self, Option<ReadError>> {
        src.parse().map_err(|_| None)
    }
}

impl ActualValue<'_> for MaxOccurs {
    fn convert(src: &str, _parent: Node) -> Result<Self, Option<ReadError>> {
        if src == "unbounded" {
            Ok(MaxOccurs::Unbounded)
        } else {
            src.parse().map(MaxOccurs::Count).map_err(|_| None)
        }
    }
}

/// Reads the attribute `attribute` of `node` as its ·actual value·, if present.
pub fn actual_value<'a, T: ActualValue<'a>>(
    node: Node<'a, '_>,
    attribute: &'static str,
) -> Result<Option<T>, ReadError> {
    node.attribute(attribute)
        .map(|value| {
            T::convert(value, node).map_err(|err| {
                err.unwrap_or_else(|| ReadError::InvalidValue {
                    attribute,
                    value: value.to_string(),
                })
            })
        })
        .transpose()
}

/// Like [`actual_value`], but fails if the attribute is absent.
pub fn required_value<'a, T: ActualValue<'a>>(
    node: Node<'a, '_>,
    attribute: &'static str,
    element: &'static str,
) -> Result<T, ReadError> {
    actual_value(node, attribute)?.ok_or(ReadError::MissingAttribute { element, attribute })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn occurrence_values() {
        let doc = roxmltree::Document::parse(
            r#"<element minOccurs="0" maxOccurs="unbounded" nillable="maybe"/>"#,
        )
        .unwrap();
        let node = doc.root_element();
        assert_eq!(actual_value::<u64>(node, "minOccurs").unwrap(), Some(0));
        assert_eq!(
            actual_value::<MaxOccurs>(node, "maxOccurs").unwrap(),
            Some(MaxOccurs::Unbounded)
        );
        assert_eq!(actual_value::<u64>(node, "absent").unwrap(), None);
        assert!(matches!(
            actual_value::<bool>(node, "nillable"),
            Err(ReadError::InvalidValue { attribute: "nillable", .. })
        ));
        assert!(matches!(
            required_value::<String>(node, "name", "element"),
            Err(ReadError::MissingAttribute { element: "element", attribute: "name" })
        ));
    }
}
