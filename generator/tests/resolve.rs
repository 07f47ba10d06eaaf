use tm_generator::{CodeModelBuilder, Construct, Entity, GenerateError, NameScope, TypeName};
use tm_xsd::{
    read_schema, ComplexTypeDefinition, Particle, QName, ReadOptions, Ref, SchemaGraph, Term,
    TypeDefinition,
};

const TNS: &str = "urn:example:people";

const SCHEMA: &str = r#"
    <xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
               xmlns:tns="urn:example:people" targetNamespace="urn:example:people"
               elementFormDefault="qualified">
      <xs:complexType name="Address">
        <xs:sequence><xs:element name="Street" type="xs:string"/></xs:sequence>
      </xs:complexType>
      <xs:element name="AddressElement" type="tns:Address"/>
      <xs:complexType name="WithAddress">
        <xs:sequence>
          <xs:element ref="tns:AddressElement"/>
          <xs:element name="Home" type="tns:Address"/>
        </xs:sequence>
      </xs:complexType>
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
      <xs:complexType name="Unordered">
        <xs:all><xs:element name="A" type="xs:string"/></xs:all>
      </xs:complexType>
      <xs:complexType name="Open">
        <xs:sequence><xs:any/></xs:sequence>
      </xs:complexType>
    </xs:schema>"#;

fn graph() -> SchemaGraph {
    read_schema(SCHEMA, ReadOptions::default()).unwrap()
}

fn builder() -> CodeModelBuilder {
    let mut builder = CodeModelBuilder::new();
    builder.map_namespace(TNS, "Gen");
    builder
}

fn complex_type(graph: &SchemaGraph, local_name: &str) -> Ref<ComplexTypeDefinition> {
    graph
        .type_definition(&QName::with_namespace(TNS, local_name))
        .and_then(TypeDefinition::complex)
        .unwrap()
}

/// The particles of the outermost model group of `complex`.
fn child_particles(graph: &SchemaGraph, complex: Ref<ComplexTypeDefinition>) -> Vec<Ref<Particle>> {
    let particle = complex.get(graph).content_type.particle().unwrap();
    let Term::ModelGroup(group) = particle.get(graph).term else {
        panic!("expected a model group");
    };
    group.get(graph).particles.clone()
}

fn output_name(full_name: &str) -> TypeName {
    TypeName::parse(full_name).unwrap()
}

#[test]
fn named_components_resolve_in_their_mapped_namespace() {
    let graph = graph();
    let builder = builder();
    let resolver = builder.resolver(&graph);
    let root = NameScope::root();

    let address = TypeDefinition::Complex(complex_type(&graph, "Address"));
    assert_eq!(
        resolver.resolve(Entity::Type(address), &root).unwrap(),
        output_name("Gen.Address")
    );
    let element = graph
        .element_declaration(&QName::with_namespace(TNS, "AddressElement"))
        .unwrap();
    assert_eq!(
        resolver.resolve(Entity::Element(element), &root).unwrap(),
        output_name("Gen.AddressElement")
    );
}

#[test]
fn element_refs_resolve_to_the_referenced_element() {
    let graph = graph();
    let builder = builder();
    let resolver = builder.resolver(&graph);
    let particles = child_particles(&graph, complex_type(&graph, "WithAddress"));
    let scope = NameScope::root().enter(output_name("Gen.WithAddress"));

    assert_eq!(
        resolver.resolve(Entity::Particle(particles[0]), &scope).unwrap(),
        output_name("Gen.AddressElement")
    );
    // A local element of a named type has the type's name
    assert_eq!(
        resolver.resolve(Entity::Particle(particles[1]), &scope).unwrap(),
        output_name("Gen.Address")
    );
}

#[test]
fn inline_types_resolve_to_their_nesting_path() {
    let graph = graph();
    let builder = builder();
    let resolver = builder.resolver(&graph);

    let with_nested = graph
        .element_declaration(&QName::with_namespace(TNS, "WithNested"))
        .unwrap();
    let Some(TypeDefinition::Complex(outer)) = with_nested.get(&graph).type_definition else {
        panic!("expected an inline complex type");
    };
    let nested = child_particles(&graph, outer)[0];

    let scope = NameScope::root().enter(output_name("Gen.WithNested"));
    assert_eq!(
        resolver.resolve(Entity::Particle(nested), &scope).unwrap(),
        output_name("Gen.WithNested").nested("Nested")
    );
    let Term::ElementDeclaration(nested_element) = nested.get(&graph).term else {
        panic!("expected an element");
    };
    let Some(inline) = nested_element.get(&graph).type_definition else {
        panic!("expected a type");
    };
    assert_eq!(
        resolver.resolve(Entity::Type(inline), &scope).unwrap().to_string(),
        "Gen.WithNested.Nested"
    );

    // The anonymous type of the global element has the element's name
    assert_eq!(
        resolver
            .resolve(Entity::Type(TypeDefinition::Complex(outer)), &NameScope::root())
            .unwrap(),
        output_name("Gen.WithNested")
    );

    // Without an enclosing class, the namespace stands in
    assert_eq!(
        resolver
            .resolve(Entity::Particle(nested), &NameScope::root())
            .unwrap(),
        output_name("Gen.Nested")
    );
}

#[test]
fn resolving_is_deterministic() {
    let graph = graph();
    let builder = builder();
    let particles = child_particles(&graph, complex_type(&graph, "WithAddress"));
    let scope = NameScope::root().enter(output_name("Gen.WithAddress"));

    for particle in particles {
        let first = builder.resolver(&graph).resolve(Entity::Particle(particle), &scope);
        let resolver = builder.resolver(&graph);
        let second = resolver.resolve(Entity::Particle(particle), &scope);
        let third = resolver.resolve(Entity::Particle(particle), &scope);
        let first = first.unwrap();
        assert_eq!(first, second.unwrap());
        assert_eq!(first, third.unwrap());
    }
}

#[test]
fn existing_types_replace_generated_names() {
    let graph = graph();
    let mut builder = builder();
    builder.add_existing_type(
        QName::with_namespace(TNS, "Address"),
        TypeName::new("Model", "PostalAddress"),
    );
    let resolver = builder.resolver(&graph);
    let particles = child_particles(&graph, complex_type(&graph, "WithAddress"));

    assert_eq!(
        resolver
            .resolve(Entity::Particle(particles[1]), &NameScope::root())
            .unwrap(),
        output_name("Model.PostalAddress")
    );
    // The element ref keeps the element's name
    assert_eq!(
        resolver
            .resolve(Entity::Particle(particles[0]), &NameScope::root())
            .unwrap(),
        output_name("Gen.AddressElement")
    );
}

#[test]
fn all_and_any_particles_fail() {
    let graph = graph();
    let builder = builder();
    let resolver = builder.resolver(&graph);

    let unordered = complex_type(&graph, "Unordered")
        .get(&graph)
        .content_type
        .particle()
        .unwrap();
    let error = resolver
        .resolve(Entity::Particle(unordered), &NameScope::root())
        .unwrap_err();
    assert!(
        matches!(
            error,
            GenerateError::UnmappedConstruct { construct: Construct::AllGroup, .. }
        ),
        "{error:?}"
    );

    let wildcard = child_particles(&graph, complex_type(&graph, "Open"))[0];
    let scope = NameScope::root().enter(output_name("Gen.Open"));
    let error = resolver
        .resolve(Entity::Particle(wildcard), &scope)
        .unwrap_err();
    assert!(
        matches!(
            &error,
            GenerateError::UnmappedConstruct { entity, construct: Construct::Wildcard }
                if entity == "Gen.Open"
        ),
        "{error:?}"
    );
}
