use lazy_static::lazy_static;

use super::complex_type_def::{ComplexTypeDefinition, ContentType};
use super::mapping_context::MappingContext;
use super::model_group::Compositor;
use super::particle::MaxOccurs;
use super::simple_type_def::{SimpleTypeDefinition, Variety};
use super::wildcard::ProcessContents;
use super::xstypes::QName;
use super::{ModelGroup, Particle, Ref, Term, TypeDefinition, Wildcard};

// Namespaces used by the specification (pt. 1, §1.3.1)
pub const XS_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

lazy_static! {
    /// The `xs:anyType` qualified name
    pub static ref XS_ANY_TYPE_NAME: QName = QName::with_namespace(XS_NAMESPACE, "anyType");
    /// The `xs:anySimpleType` qualified name
    pub static ref XS_ANY_SIMPLE_TYPE_NAME: QName = QName::with_namespace(XS_NAMESPACE, "anySimpleType");
    pub static ref XS_STRING_NAME: QName = QName::with_namespace(XS_NAMESPACE, "string");
}

/// The atomic built-in datatypes and the type each is derived from (pt. 2, §3.3 and §3.4).
/// Order matters: a base always precedes the types derived from it.
const ATOMIC_BUILTINS: &[(&str, &str)] = &[
    ("anyAtomicType", "anySimpleType"),
    // primitive datatypes
    ("string", "anyAtomicType"),
    ("boolean", "anyAtomicType"),
    ("decimal", "anyAtomicType"),
    ("float", "anyAtomicType"),
    ("double", "anyAtomicType"),
    ("duration", "anyAtomicType"),
    ("dateTime", "anyAtomicType"),
    ("time", "anyAtomicType"),
    ("date", "anyAtomicType"),
    ("gYearMonth", "anyAtomicType"),
    ("gYear", "anyAtomicType"),
    ("gMonthDay", "anyAtomicType"),
    ("gDay", "anyAtomicType"),
    ("gMonth", "anyAtomicType"),
    ("hexBinary", "anyAtomicType"),
    ("base64Binary", "anyAtomicType"),
    ("anyURI", "anyAtomicType"),
    ("QName", "anyAtomicType"),
    ("NOTATION", "anyAtomicType"),
    // other built-in atomic datatypes
    ("normalizedString", "string"),
    ("token", "normalizedString"),
    ("language", "token"),
    ("NMTOKEN", "token"),
    ("Name", "token"),
    ("NCName", "Name"),
    ("ID", "NCName"),
    ("IDREF", "NCName"),
    ("ENTITY", "NCName"),
    ("integer", "decimal"),
    ("nonPositiveInteger", "integer"),
    ("negativeInteger", "nonPositiveInteger"),
    ("long", "integer"),
    ("int", "long"),
    ("short", "int"),
    ("byte", "short"),
    ("nonNegativeInteger", "integer"),
    ("unsignedLong", "nonNegativeInteger"),
    ("unsignedInt", "unsignedLong"),
    ("unsignedShort", "unsignedInt"),
    ("unsignedByte", "unsignedShort"),
    ("positiveInteger", "nonNegativeInteger"),
    ("yearMonthDuration", "duration"),
    ("dayTimeDuration", "duration"),
    ("dateTimeStamp", "dateTime"),
];

/// The built-in list datatypes and their item types.
const LIST_BUILTINS: &[(&str, &str)] = &[
    ("NMTOKENS", "NMTOKEN"),
    ("IDREFS", "IDREF"),
    ("ENTITIES", "ENTITY"),
];

pub fn is_builtin_name(name: &QName) -> bool {
    name.namespace_name.as_deref() == Some(XS_NAMESPACE)
}

pub(crate) fn register_builtins(context: &mut MappingContext) {
    register_xs_any_type(context);
    register_simple_types(context);
}

/// Registers the only built-in complex type, `xs:anyType` (§3.4.7)
fn register_xs_any_type(context: &mut MappingContext) {
    // The inner particle of ·xs:anyType· contains a wildcard which matches any element
    let wildcard = context.create(Wildcard {
        namespace_constraint: "##any".into(),
        process_contents: ProcessContents::Lax,
    });
    let inner_particle = context.create(Particle {
        min_occurs: 0,
        max_occurs: MaxOccurs::Unbounded,
        term: Term::Wildcard(wildcard),
    });
    let model_group = context.create(ModelGroup {
        compositor: Compositor::Sequence,
        particles: vec![inner_particle],
    });
    let outer_particle = context.create(Particle {
        min_occurs: 1,
        max_occurs: MaxOccurs::Count(1),
        term: Term::ModelGroup(model_group),
    });

    let any_type: Ref<ComplexTypeDefinition> = context.reserve();
    context.insert(
        any_type,
        ComplexTypeDefinition {
            documentation: None,
            name: Some(XS_ANY_TYPE_NAME.local_name.clone()),
            target_namespace: Some(XS_NAMESPACE.into()),
            // ·xs:anyType· is its own base
            base_type_definition: TypeDefinition::Complex(any_type),
            derivation_method: None,
            context: None,
            abstract_: false,
            attribute_uses: Vec::new(),
            content_type: ContentType::Mixed {
                particle: outer_particle,
            },
            explicit_content: Some(outer_particle),
        },
    );
    register(context, &XS_ANY_TYPE_NAME, TypeDefinition::Complex(any_type));
}

fn register_simple_types(context: &mut MappingContext) {
    let any_simple_type = context.create(SimpleTypeDefinition::builtin(
        &XS_ANY_SIMPLE_TYPE_NAME.local_name,
        None,
        None,
    ));
    register(
        context,
        &XS_ANY_SIMPLE_TYPE_NAME,
        TypeDefinition::Simple(any_simple_type),
    );

    for (name, base) in ATOMIC_BUILTINS {
        let base = lookup_simple(context, base);
        let type_def = context.create(SimpleTypeDefinition::builtin(
            name,
            Some(base),
            Some(Variety::Atomic),
        ));
        register(
            context,
            &QName::with_namespace(XS_NAMESPACE, *name),
            TypeDefinition::Simple(type_def),
        );
    }

    for (name, item) in LIST_BUILTINS {
        let item = lookup_simple(context, item);
        let mut definition =
            SimpleTypeDefinition::builtin(name, Some(any_simple_type), Some(Variety::List));
        definition.item_type_definition = Some(item);
        let type_def = context.create(definition);
        register(
            context,
            &QName::with_namespace(XS_NAMESPACE, *name),
            TypeDefinition::Simple(type_def),
        );
    }
}

fn lookup_simple(context: &MappingContext, local_name: &str) -> Ref<SimpleTypeDefinition> {
    context
        .resolve(&QName::with_namespace(XS_NAMESPACE, local_name), "type")
        .expect("built-in base types are registered before their derived types")
}

fn register(context: &mut MappingContext, name: &QName, type_def: TypeDefinition) {
    context
        .register_with_name(name.clone(), type_def, "type")
        .expect("built-in types are registered into an empty symbol space");
}
