use serde::Serialize;
use tm_xsd::{QName, XS_NAMESPACE};

/// Target-independent scalar types the XSD built-in datatypes map to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum ScalarType {
    String,
    Boolean,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    /// Arbitrary-precision integer.
    Integer,
    Float32,
    Float64,
    Decimal,
    Date,
    DateTime,
    Time,
    Duration,
    QName,
    AnyUri,
    Base64Binary,
    HexBinary,
    /// `xs:anyType`, `xs:anySimpleType` and `xs:anyAtomicType`.
    Any,
}

impl ScalarType {
    /// Maps a built-in datatype of the XML Schema namespace. Returns `None` for any other name,
    /// which is then a user-defined type.
    pub fn from_xsd(name: &QName) -> Option<Self> {
        if name.namespace_name.as_deref() != Some(XS_NAMESPACE) {
            return None;
        }
        use ScalarType::*;
        let scalar = match name.local_name.as_str() {
            "string" | "normalizedString" | "token" | "language" | "Name" | "NCName"
            | "NMTOKEN" | "ID" | "IDREF" | "ENTITY" => String,
            // Whitespace-separated lists, kept in their lexical form
            "NMTOKENS" | "IDREFS" | "ENTITIES" => String,
            // Gregorian fragments
            "gYearMonth" | "gYear" | "gMonthDay" | "gDay" | "gMonth" => String,
            "NOTATION" => String,
            "boolean" => Boolean,
            "byte" => Int8,
            "short" => Int16,
            "int" => Int32,
            "long" => Int64,
            "unsignedByte" => UInt8,
            "unsignedShort" => UInt16,
            "unsignedInt" => UInt32,
            "unsignedLong" => UInt64,
            "integer" | "nonPositiveInteger" | "negativeInteger" | "nonNegativeInteger"
            | "positiveInteger" => Integer,
            "float" => Float32,
            "double" => Float64,
            "decimal" => Decimal,
            "date" => Date,
            "dateTime" | "dateTimeStamp" => DateTime,
            "time" => Time,
            "duration" | "yearMonthDuration" | "dayTimeDuration" => Duration,
            "QName" => QName,
            "anyURI" => AnyUri,
            "base64Binary" => Base64Binary,
            "hexBinary" => HexBinary,
            "anyType" | "anySimpleType" | "anyAtomicType" => Any,
            _ => return None,
        };
        Some(scalar)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn xs(local_name: &str) -> QName {
        QName::with_namespace(XS_NAMESPACE, local_name)
    }

    #[test]
    fn maps_builtin_families() {
        assert_eq!(ScalarType::from_xsd(&xs("token")), Some(ScalarType::String));
        assert_eq!(ScalarType::from_xsd(&xs("int")), Some(ScalarType::Int32));
        assert_eq!(ScalarType::from_xsd(&xs("unsignedShort")), Some(ScalarType::UInt16));
        assert_eq!(ScalarType::from_xsd(&xs("positiveInteger")), Some(ScalarType::Integer));
        assert_eq!(ScalarType::from_xsd(&xs("double")), Some(ScalarType::Float64));
        assert_eq!(ScalarType::from_xsd(&xs("dayTimeDuration")), Some(ScalarType::Duration));
        assert_eq!(ScalarType::from_xsd(&xs("gYear")), Some(ScalarType::String));
        assert_eq!(ScalarType::from_xsd(&xs("anyURI")), Some(ScalarType::AnyUri));
        assert_eq!(ScalarType::from_xsd(&xs("anyType")), Some(ScalarType::Any));
    }

    #[test]
    fn other_names_are_not_builtin() {
        assert_eq!(ScalarType::from_xsd(&xs("person")), None);
        assert_eq!(
            ScalarType::from_xsd(&QName::with_namespace("urn:other", "string")),
            None
        );
    }
}
