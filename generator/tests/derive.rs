use pretty_assertions::assert_eq;

use tm_generator::{
    Cardinality, ClassKind, ClassModel, CodeModel, CodeModelBuilder, Construct, GenerateError,
    ScalarType, TypeName, TypeRef, ValueModel, XmlName, XmlNodeKind,
};
use tm_xsd::{read_schema, QName, ReadOptions};

const TNS: &str = "urn:example:people";

fn schema(body: &str) -> String {
    format!(
        r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
                      xmlns:tns="{TNS}" targetNamespace="{TNS}"
                      elementFormDefault="qualified">{body}</xs:schema>"#
    )
}

fn build_with(builder: &CodeModelBuilder, body: &str) -> Result<CodeModel, GenerateError> {
    let graph = read_schema(&schema(body), ReadOptions::default()).unwrap();
    builder.build(&graph)
}

fn build(body: &str) -> CodeModel {
    let mut builder = CodeModelBuilder::new();
    builder.map_namespace(TNS, "Gen");
    build_with(&builder, body).unwrap()
}

fn class<'a>(model: &'a CodeModel, full_name: &str) -> &'a ClassModel {
    model
        .find(full_name)
        .unwrap_or_else(|| panic!("no class {full_name}"))
}

fn class_name(full_name: &str) -> TypeName {
    TypeName::parse(full_name).unwrap()
}

fn identifiers(class: &ClassModel) -> Vec<&str> {
    class
        .properties
        .iter()
        .map(|p| p.identifier.as_str())
        .collect()
}

const PEOPLE: &str = r#"
    <xs:complexType name="Person">
      <xs:sequence>
        <xs:element name="Address" type="tns:Address"/>
      </xs:sequence>
    </xs:complexType>
    <xs:complexType name="Address">
      <xs:sequence>
        <xs:element name="Street" type="xs:string" minOccurs="0"/>
        <xs:element name="City" type="xs:string" minOccurs="0"/>
      </xs:sequence>
    </xs:complexType>"#;

#[test]
fn person_with_address() {
    let model = build(PEOPLE);
    assert_eq!(model.namespaces.keys().collect::<Vec<_>>(), ["Gen"]);

    let person = class(&model, "Gen.Person");
    assert_eq!(person.properties.len(), 1);
    let address = &person.properties[0];
    assert_eq!(address.identifier, "Address");
    assert_eq!(address.type_ref, TypeRef::Class(class_name("Gen.Address")));
    assert_eq!(address.cardinality, Cardinality::REQUIRED);
    assert_eq!(address.xml.kind, XmlNodeKind::Element);
    assert_eq!(
        address.xml.name,
        Some(XmlName::new(Some(TNS), "Address"))
    );

    let address = class(&model, "Gen.Address");
    assert_eq!(identifiers(address), ["Street", "City"]);
    for property in &address.properties {
        assert_eq!(property.type_ref, TypeRef::Scalar(ScalarType::String));
        assert_eq!(property.cardinality, Cardinality::OPTIONAL);
    }
}

#[test]
fn type_metadata_round_trips_schema_names() {
    let model = build(PEOPLE);
    for local_name in ["Person", "Address"] {
        let class = class(&model, &format!("Gen.{local_name}"));
        let type_name = class.xml.type_name.as_ref().unwrap();
        assert_eq!(
            QName::with_optional_namespace(
                type_name.namespace.clone(),
                type_name.local_name.clone()
            ),
            QName::with_namespace(TNS, local_name)
        );
        assert_eq!(class.xml.root_element, None);
    }
}

#[test]
fn element_ref_property_has_the_element_class() {
    let model = build(&format!(
        r#"{PEOPLE}
        <xs:element name="AddressElement" type="tns:Address"/>
        <xs:complexType name="WithAddress">
          <xs:sequence>
            <xs:element ref="tns:AddressElement"/>
          </xs:sequence>
        </xs:complexType>"#
    ));

    let with_address = class(&model, "Gen.WithAddress");
    let property = &with_address.properties[0];
    assert_eq!(property.identifier, "AddressElement");
    assert_eq!(
        property.type_ref,
        TypeRef::Class(class_name("Gen.AddressElement"))
    );

    let element = class(&model, "Gen.AddressElement");
    assert_eq!(identifiers(element), ["Street", "City"]);
    assert_eq!(
        element.xml.root_element,
        Some(XmlName::new(Some(TNS), "AddressElement"))
    );
    assert_eq!(
        element.xml.type_name,
        Some(XmlName::new(Some(TNS), "Address"))
    );
}

#[test]
fn anonymous_types_nest_under_their_named_ancestors() {
    let model = build(
        r#"
        <xs:element name="WithNested">
          <xs:complexType>
            <xs:sequence>
              <xs:element name="Nested">
                <xs:complexType>
                  <xs:sequence><xs:element name="Leaf" type="xs:int"/></xs:sequence>
                </xs:complexType>
              </xs:element>
            </xs:sequence>
          </xs:complexType>
        </xs:element>
        <xs:element name="Other">
          <xs:complexType>
            <xs:sequence>
              <xs:element name="Nested">
                <xs:complexType>
                  <xs:attribute name="flag" type="xs:boolean"/>
                </xs:complexType>
              </xs:element>
            </xs:sequence>
          </xs:complexType>
        </xs:element>"#,
    );

    let with_nested = class(&model, "Gen.WithNested");
    assert_eq!(
        with_nested.properties[0].type_ref,
        TypeRef::Nested(class_name("Gen.WithNested").nested("Nested"))
    );
    assert_eq!(
        with_nested.xml.root_element,
        Some(XmlName::new(Some(TNS), "WithNested"))
    );
    assert_eq!(with_nested.xml.type_name, None);

    let nested = class(&model, "Gen.WithNested.Nested");
    assert_eq!(identifiers(nested), ["Leaf"]);
    assert_eq!(nested.xml.root_element, None);

    let sibling = class(&model, "Gen.Other.Nested");
    assert_eq!(identifiers(sibling), ["Flag"]);
    assert_eq!(model.classes().count(), 2);
}

#[test]
fn extension_records_the_base_class() {
    let model = build(
        r#"
        <xs:complexType name="Base">
          <xs:sequence><xs:element name="A" type="xs:string"/></xs:sequence>
          <xs:attribute name="version" type="xs:string"/>
        </xs:complexType>
        <xs:complexType name="Derived">
          <xs:complexContent>
            <xs:extension base="tns:Base">
              <xs:sequence><xs:element name="B" type="xs:string"/></xs:sequence>
              <xs:attribute name="extra" type="xs:string"/>
            </xs:extension>
          </xs:complexContent>
        </xs:complexType>
        <xs:complexType name="Price">
          <xs:simpleContent>
            <xs:extension base="xs:decimal">
              <xs:attribute name="currency" type="xs:string"/>
            </xs:extension>
          </xs:simpleContent>
        </xs:complexType>"#,
    );

    let base = class(&model, "Gen.Base");
    assert_eq!(base.base, None);
    assert_eq!(identifiers(base), ["Version", "A"]);

    let derived = class(&model, "Gen.Derived");
    assert_eq!(derived.base, Some(class_name("Gen.Base")));
    assert_eq!(identifiers(derived), ["Extra", "B"]);

    // Built-in bases are not recorded
    let price = class(&model, "Gen.Price");
    assert_eq!(price.base, None);
    assert_eq!(identifiers(price), ["Currency", "Value"]);
    let value = price.property("Value").unwrap();
    assert_eq!(value.type_ref, TypeRef::Scalar(ScalarType::Decimal));
    assert_eq!(value.xml.kind, XmlNodeKind::Text);
    assert_eq!(value.xml.name, None);
}

#[test]
fn choice_branches_are_optional_and_bounds_multiply() {
    let model = build(
        r#"
        <xs:complexType name="Shape">
          <xs:sequence>
            <xs:choice>
              <xs:element name="Circle" type="xs:double"/>
              <xs:element name="Square" type="xs:double"/>
            </xs:choice>
            <xs:sequence maxOccurs="unbounded">
              <xs:element name="Tag" type="xs:string"/>
            </xs:sequence>
          </xs:sequence>
        </xs:complexType>"#,
    );

    let shape = class(&model, "Gen.Shape");
    assert_eq!(identifiers(shape), ["Circle", "Square", "Tag"]);
    assert_eq!(shape.properties[0].cardinality, Cardinality::OPTIONAL);
    assert_eq!(shape.properties[1].cardinality, Cardinality::OPTIONAL);
    assert_eq!(
        shape.properties[2].cardinality,
        Cardinality {
            min_occurs: 1,
            max_occurs: None
        }
    );
    assert!(shape.properties[2].cardinality.is_collection());
}

#[test]
fn property_identifiers_are_unique() {
    let model = build(
        r#"
        <xs:complexType name="Entry">
          <xs:sequence>
            <xs:element name="name" type="xs:string"/>
            <xs:element name="item" type="xs:string"/>
            <xs:element name="item" type="xs:string"/>
          </xs:sequence>
          <xs:attribute name="name" type="xs:string" use="required"/>
        </xs:complexType>"#,
    );

    let entry = class(&model, "Gen.Entry");
    assert_eq!(identifiers(entry), ["NameAttribute", "Name", "Item", "Item2"]);
    let attribute = &entry.properties[0];
    assert_eq!(attribute.xml.kind, XmlNodeKind::Attribute);
    assert_eq!(attribute.xml.name, Some(XmlName::new(None, "name")));
    assert_eq!(attribute.cardinality, Cardinality::REQUIRED);
    assert_eq!(
        entry.properties[3].xml.name,
        Some(XmlName::new(Some(TNS), "item"))
    );
}

#[test]
fn simple_types_become_value_classes() {
    let model = build(
        r#"
        <xs:simpleType name="Color">
          <xs:restriction base="xs:string">
            <xs:enumeration value="red"/>
            <xs:enumeration value="green"/>
          </xs:restriction>
        </xs:simpleType>
        <xs:simpleType name="Sizes">
          <xs:list>
            <xs:simpleType><xs:restriction base="xs:int"/></xs:simpleType>
          </xs:list>
        </xs:simpleType>
        <xs:simpleType name="ColorOrCode">
          <xs:union memberTypes="tns:Color xs:int"/>
        </xs:simpleType>
        <xs:simpleType name="Code">
          <xs:restriction base="xs:token"/>
        </xs:simpleType>"#,
    );

    let color = class(&model, "Gen.Color");
    assert!(color.properties.is_empty());
    assert_eq!(
        color.kind,
        ClassKind::Value(ValueModel::Enumeration {
            base: TypeRef::Scalar(ScalarType::String),
            members: vec!["red".to_string(), "green".to_string()],
        })
    );

    let sizes = class(&model, "Gen.Sizes");
    let item = class_name("Gen.Sizes").nested("Item");
    assert_eq!(
        sizes.value_model(),
        Some(&ValueModel::List(TypeRef::Nested(item.clone())))
    );
    assert_eq!(
        class(&model, "Gen.Sizes.Item").value_model(),
        Some(&ValueModel::Alias(TypeRef::Scalar(ScalarType::Int32)))
    );

    assert_eq!(
        class(&model, "Gen.ColorOrCode").value_model(),
        Some(&ValueModel::Union(vec![
            TypeRef::Class(class_name("Gen.Color")),
            TypeRef::Scalar(ScalarType::Int32),
        ]))
    );
    assert_eq!(
        class(&model, "Gen.Code").value_model(),
        Some(&ValueModel::Alias(TypeRef::Scalar(ScalarType::String)))
    );
}

#[test]
fn element_named_like_its_type_marks_the_type_class_as_root() {
    let model = build(&format!(
        r#"{PEOPLE}
        <xs:element name="Person" type="tns:Person"/>"#
    ));

    assert_eq!(model.classes().count(), 2);
    let person = class(&model, "Gen.Person");
    assert_eq!(
        person.xml.root_element,
        Some(XmlName::new(Some(TNS), "Person"))
    );
    assert_eq!(
        person.xml.type_name,
        Some(XmlName::new(Some(TNS), "Person"))
    );
}

#[test]
fn elements_of_simple_types_wrap_the_value() {
    let model = build(
        r#"
        <xs:element name="Count" type="xs:int" nillable="true"/>
        <xs:element name="Level">
          <xs:simpleType>
            <xs:restriction base="xs:string">
              <xs:enumeration value="low"/>
              <xs:enumeration value="high"/>
            </xs:restriction>
          </xs:simpleType>
        </xs:element>"#,
    );

    let count = class(&model, "Gen.Count");
    assert_eq!(identifiers(count), ["Value"]);
    let value = &count.properties[0];
    assert_eq!(value.type_ref, TypeRef::Scalar(ScalarType::Int32));
    assert!(value.xml.nillable);

    let level = class(&model, "Gen.Level");
    let value_class = class_name("Gen.Level").nested("Value");
    assert_eq!(level.properties[0].type_ref, TypeRef::Nested(value_class));
    assert!(matches!(
        class(&model, "Gen.Level.Value").value_model(),
        Some(ValueModel::Enumeration { members, .. }) if members.len() == 2
    ));
}

#[test]
fn existing_types_are_referenced_not_generated() {
    let mut builder = CodeModelBuilder::new();
    builder
        .map_namespace(TNS, "Gen")
        .add_existing_type(
            QName::with_namespace(TNS, "Address"),
            TypeName::new("Model", "PostalAddress"),
        );
    let model = build_with(&builder, PEOPLE).unwrap();

    assert!(model.find("Gen.Address").is_none());
    assert_eq!(model.classes().count(), 1);
    assert_eq!(
        class(&model, "Gen.Person").properties[0].type_ref,
        TypeRef::Class(class_name("Model.PostalAddress"))
    );
}

#[test]
fn unmapped_namespaces_pass_through() {
    let model = build_with(&CodeModelBuilder::new(), PEOPLE).unwrap();
    assert_eq!(model.namespaces.keys().collect::<Vec<_>>(), [TNS]);
    let person = class(&model, &format!("{TNS}.Person"));
    assert_eq!(person.namespace, TNS);
}

#[test]
fn namespaces_partition_classes() {
    let other = format!(
        r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
                      xmlns:tns="{TNS}" targetNamespace="urn:example:other">
             <xs:import namespace="{TNS}"/>
             <xs:complexType name="Household">
               <xs:sequence>
                 <xs:element name="Member" type="tns:Person" maxOccurs="unbounded"/>
               </xs:sequence>
             </xs:complexType>
           </xs:schema>"#
    );
    let people = schema(PEOPLE);
    let graph =
        tm_xsd::read_schemas(&[people.as_str(), other.as_str()], ReadOptions::default()).unwrap();

    let mut builder = CodeModelBuilder::new();
    builder
        .map_namespace(TNS, "Gen.People")
        .map_namespace("urn:example:other", "Gen.Other");
    let model = builder.build(&graph).unwrap();

    assert_eq!(
        model.namespaces.keys().collect::<Vec<_>>(),
        ["Gen.People", "Gen.Other"]
    );
    let household = class(&model, "Gen.Other.Household");
    assert_eq!(
        household.properties[0].type_ref,
        TypeRef::Class(class_name("Gen.People.Person"))
    );
    assert_eq!(household.properties[0].xml.name, Some(XmlName::new(None, "Member")));
}

#[test]
fn all_groups_fail() {
    let error = build_with(
        CodeModelBuilder::new().map_namespace(TNS, "Gen"),
        r#"
        <xs:complexType name="Unordered">
          <xs:all><xs:element name="A" type="xs:string"/></xs:all>
        </xs:complexType>"#,
    )
    .unwrap_err();
    assert!(
        matches!(
            &error,
            GenerateError::UnmappedConstruct { entity, construct: Construct::AllGroup }
                if entity == "Gen.Unordered"
        ),
        "{error:?}"
    );
}

#[test]
fn wildcards_fail() {
    let error = build_with(
        CodeModelBuilder::new().map_namespace(TNS, "Gen"),
        r###"
        <xs:complexType name="Open">
          <xs:sequence>
            <xs:element name="A" type="xs:string"/>
            <xs:any namespace="##other" minOccurs="0"/>
          </xs:sequence>
        </xs:complexType>"###,
    )
    .unwrap_err();
    assert!(
        matches!(
            error,
            GenerateError::UnmappedConstruct { construct: Construct::Wildcard, .. }
        ),
        "{error:?}"
    );
    assert_eq!(
        error.to_string(),
        "cannot map an xs:any wildcard in Gen.Open"
    );
}

#[test]
fn untyped_elements_fail() {
    let error = build_with(&CodeModelBuilder::new(), r#"<xs:element name="Loose"/>"#).unwrap_err();
    assert!(
        matches!(
            &error,
            GenerateError::UnmappedConstruct { entity, construct: Construct::UntypedElement }
                if entity.ends_with("Loose")
        ),
        "{error:?}"
    );
}

#[test]
fn colliding_names_fail() {
    let error = build_with(
        CodeModelBuilder::new().map_namespace(TNS, "Gen"),
        &format!(
            r#"{PEOPLE}
            <xs:element name="Person" type="tns:Address"/>"#
        ),
    )
    .unwrap_err();
    assert!(
        matches!(
            &error,
            GenerateError::DuplicateTypeName { name } if name.to_string() == "Gen.Person"
        ),
        "{error:?}"
    );
}

#[test]
fn names_differing_in_case_or_punctuation_stay_apart() {
    let model = build(
        r#"
        <xs:complexType name="address">
          <xs:sequence><xs:element name="line" type="xs:string"/></xs:sequence>
        </xs:complexType>
        <xs:complexType name="Address">
          <xs:sequence><xs:element name="Street" type="xs:string"/></xs:sequence>
        </xs:complexType>
        <xs:complexType name="my-type"/>
        <xs:complexType name="my_type"/>
        <xs:complexType name="Holder">
          <xs:sequence>
            <xs:element name="lower" type="tns:address"/>
            <xs:element name="upper" type="tns:Address"/>
            <xs:element name="dashed" type="tns:my-type"/>
          </xs:sequence>
        </xs:complexType>"#,
    );

    for local_name in ["address", "Address", "my-type", "my_type"] {
        let class = class(&model, &format!("Gen.{local_name}"));
        assert_eq!(class.identifier, local_name);
        assert_eq!(
            class.xml.type_name,
            Some(XmlName::new(Some(TNS), local_name))
        );
    }
    assert_eq!(identifiers(class(&model, "Gen.address")), ["Line"]);
    assert_eq!(identifiers(class(&model, "Gen.Address")), ["Street"]);

    let holder = class(&model, "Gen.Holder");
    assert_eq!(identifiers(holder), ["Lower", "Upper", "Dashed"]);
    let types = holder
        .properties
        .iter()
        .map(|p| p.type_ref.clone())
        .collect::<Vec<_>>();
    assert_eq!(
        types,
        [
            TypeRef::Class(class_name("Gen.address")),
            TypeRef::Class(class_name("Gen.Address")),
            TypeRef::Class(class_name("Gen.my-type")),
        ]
    );
    assert_references_resolve(&model, &[]);
}

const LANG: &str = r#"
    <xs:attribute name="lang">
      <xs:simpleType>
        <xs:restriction base="xs:string">
          <xs:enumeration value="en"/>
          <xs:enumeration value="de"/>
        </xs:restriction>
      </xs:simpleType>
    </xs:attribute>
    <xs:complexType name="Text">
      <xs:simpleContent>
        <xs:extension base="xs:string">
          <xs:attribute ref="tns:lang"/>
        </xs:extension>
      </xs:simpleContent>
    </xs:complexType>"#;

#[test]
fn global_attribute_refs_use_the_attribute_class() {
    let model = build(LANG);
    let lang = class(&model, "Gen.lang");
    assert!(matches!(lang.kind, ClassKind::Value(ValueModel::Enumeration { .. })));

    let text = class(&model, "Gen.Text");
    let property = text
        .properties
        .iter()
        .find(|p| p.xml.kind == XmlNodeKind::Attribute)
        .unwrap();
    assert_eq!(property.type_ref, TypeRef::Class(class_name("Gen.lang")));
    assert_references_resolve(&model, &[]);
}

#[test]
fn global_attributes_registered_as_existing_types_are_referenced() {
    let mut builder = CodeModelBuilder::new();
    builder
        .map_namespace(TNS, "Gen")
        .add_existing_type(
            QName::with_namespace(TNS, "lang"),
            TypeName::new("Model", "Lang"),
        );
    let model = build_with(&builder, LANG).unwrap();

    assert!(model.find("Gen.lang").is_none());
    let text = class(&model, "Gen.Text");
    let property = text
        .properties
        .iter()
        .find(|p| p.xml.kind == XmlNodeKind::Attribute)
        .unwrap();
    assert_eq!(property.type_ref, TypeRef::Class(class_name("Model.Lang")));
    assert_references_resolve(&model, &[class_name("Model.Lang")]);
}

/// Every class reference names a class of `model` or one of the `existing` types.
fn assert_references_resolve(model: &CodeModel, existing: &[TypeName]) {
    fn declared(class: &ClassModel, names: &mut Vec<TypeName>) {
        names.push(class.name.clone());
        for nested in &class.nested {
            declared(nested, names);
        }
    }
    let mut names = existing.to_vec();
    for class in model.classes() {
        declared(class, &mut names);
    }

    fn check(class: &ClassModel, names: &[TypeName]) {
        let references = class
            .properties
            .iter()
            .filter_map(|p| p.type_ref.type_name())
            .chain(class.base.as_ref());
        for reference in references {
            assert!(
                names.contains(reference),
                "{} references the unknown class {reference}",
                class.name
            );
        }
        for nested in &class.nested {
            check(nested, names);
        }
    }
    for class in model.classes() {
        check(class, &names);
    }
}

#[test]
fn building_twice_gives_the_same_model() {
    let graph = read_schema(&schema(PEOPLE), ReadOptions::default()).unwrap();
    let mut builder = CodeModelBuilder::new();
    builder.map_namespace(TNS, "Gen");
    let first = builder.build(&graph).unwrap();
    let second = builder.build(&graph).unwrap();
    assert_eq!(
        first.classes().collect::<Vec<_>>(),
        second.classes().collect::<Vec<_>>()
    );
}
