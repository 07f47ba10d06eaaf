//! Rust renderer: one module per namespace segment, one item per class.
//!
//! Serialization attributes follow the serde conventions of `quick-xml`: attributes are renamed
//! to `@name`, text content to `$text`. Type paths are absolute (`crate::...`), so the output is
//! meant to be the root of its crate or included there.

use std::collections::HashMap;

use syn::{Attribute, Field, Ident, Item, Type, Variant, __private::Span, parse_quote};

use check_keyword::CheckKeyword;
use heck::{ToPascalCase, ToSnakeCase};

use super::ModuleTree;
use crate::builtin::ScalarType;
use crate::model::{
    ClassKind, ClassModel, CodeModel, PropertyModel, TypeName, TypeRef, ValueModel, XmlNodeKind,
};
use crate::naming::IdentifierSet;

/// Renders `model` to a Rust source file.
pub fn render(model: &CodeModel) -> String {
    let tree = ModuleTree::new(model);
    let names = RustNames::new(&tree);
    let doc_comment = concat!(
        "Generated by ",
        env!("CARGO_PKG_NAME"),
        " ",
        env!("CARGO_PKG_VERSION")
    );
    let root = syn::File {
        shebang: None,
        attrs: vec![
            parse_quote!(#![doc = #doc_comment]),
            parse_quote!(#![allow(dead_code, non_camel_case_types)]),
        ],
        items: module_items(&tree, &names, &mut Vec::new()),
    };
    prettyplease::unparse(&root)
}

/// Rust names of the modules and classes of one model. Within every module, type and module
/// names are unique; both live in the same Rust namespace.
#[derive(Default)]
struct RustNames<'a> {
    /// Module of each namespace node, keyed by its namespace segments.
    namespace_modules: HashMap<Vec<&'a str>, String>,
    /// Module holding the nested classes of a class.
    nested_modules: HashMap<&'a TypeName, String>,
    /// Module path and type identifier of each class.
    types: HashMap<&'a TypeName, Vec<String>>,
}

impl<'a> RustNames<'a> {
    fn new(tree: &ModuleTree<'a>) -> Self {
        let mut names = Self::default();
        names.assign_module(tree, &mut Vec::new(), &[]);
        names
    }

    fn assign_module(
        &mut self,
        tree: &ModuleTree<'a>,
        segments: &mut Vec<&'a str>,
        path: &[String],
    ) {
        let mut taken = IdentifierSet::new();
        // Namespace modules claim their names before nested-class modules
        let modules = tree
            .children
            .keys()
            .map(|segment| {
                let module = taken.claim(&module_name(segment));
                segments.push(*segment);
                self.namespace_modules
                    .insert(segments.clone(), module.clone());
                segments.pop();
                module
            })
            .collect::<Vec<_>>();

        self.assign_classes(tree.classes.iter().copied(), path, &mut taken);

        for ((segment, child), module) in tree.children.iter().zip(modules) {
            segments.push(*segment);
            self.assign_module(child, segments, &child_path(path, module));
            segments.pop();
        }
    }

    fn assign_classes(
        &mut self,
        classes: impl IntoIterator<Item = &'a ClassModel>,
        path: &[String],
        taken: &mut IdentifierSet,
    ) {
        for class in classes {
            let ident = taken.claim(&type_name(&class.identifier));
            self.types.insert(&class.name, child_path(path, ident));
            if !class.nested.is_empty() {
                let module = taken.claim(&module_name(&class.identifier));
                self.nested_modules.insert(&class.name, module.clone());
                let nested_path = child_path(path, module);
                self.assign_classes(&class.nested, &nested_path, &mut IdentifierSet::new());
            }
        }
    }

    fn namespace_module(&self, segments: &[&'a str]) -> Ident {
        let fallback = || segments.last().map_or_else(String::new, |s| module_name(s));
        name_to_ident(
            &self
                .namespace_modules
                .get(segments)
                .cloned()
                .unwrap_or_else(fallback),
        )
    }

    fn nested_module(&self, class: &ClassModel) -> Ident {
        let module = self.nested_modules.get(&class.name).cloned();
        name_to_ident(&module.unwrap_or_else(|| module_name(&class.identifier)))
    }

    fn type_ident(&self, class: &ClassModel) -> Ident {
        let ident = self
            .types
            .get(&class.name)
            .and_then(|path| path.last())
            .cloned();
        name_to_ident(&ident.unwrap_or_else(|| type_name(&class.identifier)))
    }

    /// `crate::<modules>::Type`. Names outside the model, such as registered existing types, are
    /// derived from the type name alone.
    fn path(&self, name: &TypeName) -> syn::Path {
        match self.types.get(name) {
            Some(path) => {
                let segments = path.iter().map(|segment| name_to_ident(segment));
                parse_quote!(crate #(:: #segments)*)
            }
            None => type_name_path(name),
        }
    }
}

fn child_path(path: &[String], name: String) -> Vec<String> {
    let mut path = path.to_vec();
    path.push(name);
    path
}

fn module_items<'a>(
    tree: &ModuleTree<'a>,
    names: &RustNames<'a>,
    segments: &mut Vec<&'a str>,
) -> Vec<Item> {
    let mut items = tree
        .classes
        .iter()
        .flat_map(|class| class_items(class, names))
        .collect::<Vec<_>>();
    for (segment, child) in &tree.children {
        segments.push(*segment);
        let module = names.namespace_module(segments);
        let child_items = module_items(child, names, segments);
        segments.pop();
        items.push(parse_quote! {
            pub mod #module {
                #(#child_items)*
            }
        });
    }
    items
}

/// The item for `class`, followed by a module holding its nested classes.
fn class_items(class: &ClassModel, names: &RustNames) -> Vec<Item> {
    let mut items = vec![match &class.kind {
        ClassKind::Complex => struct_item(class, names),
        ClassKind::Value(value) => value_item(class, value, names),
    }];
    if !class.nested.is_empty() {
        let module = names.nested_module(class);
        let nested_items = class
            .nested
            .iter()
            .flat_map(|nested| class_items(nested, names))
            .collect::<Vec<_>>();
        items.push(parse_quote! {
            pub mod #module {
                #(#nested_items)*
            }
        });
    }
    items
}

fn struct_item(class: &ClassModel, names: &RustNames) -> Item {
    let ident = names.type_ident(class);
    let docs = doc_attributes(class.documentation.as_deref());

    let mut fields: Vec<Field> = Vec::with_capacity(class.properties.len() + 1);
    if let Some(base) = &class.base {
        let base = names.path(base);
        fields.push(parse_quote! {
            #[serde(flatten)]
            pub base: #base
        });
    }
    let mut field_names = IdentifierSet::new();
    if class.base.is_some() {
        field_names.claim("base");
    }
    for property in &class.properties {
        fields.push(property_field(property, &class.name, names, &mut field_names));
    }

    let rename: Option<Attribute> = class.xml.root_element.as_ref().map(|root| {
        let local_name = &root.local_name;
        parse_quote!(#[serde(rename = #local_name)])
    });

    parse_quote! {
        #(#docs)*
        #[derive(Debug, Clone, PartialEq, ::serde::Serialize, ::serde::Deserialize)]
        #rename
        pub struct #ident {
            #(#fields),*
        }
    }
}

fn property_field(
    property: &PropertyModel,
    owner: &TypeName,
    names: &RustNames,
    field_names: &mut IdentifierSet,
) -> Field {
    let ident = field_ident(&property.identifier, field_names);
    let docs = doc_attributes(property.documentation.as_deref());

    let mut type_ = type_ref_type(&property.type_ref, names);
    if property.type_ref.type_name() == Some(owner) && !property.cardinality.is_collection() {
        // A directly recursive type needs indirection
        type_ = parse_quote!(Box<#type_>);
    }

    let serialized_name = match property.xml.kind {
        XmlNodeKind::Text => "$text".to_string(),
        XmlNodeKind::Attribute => format!("@{}", xml_local_name(property)),
        XmlNodeKind::Element => xml_local_name(property).to_string(),
    };

    let (type_, serde_attr): (Type, Attribute) = if property.cardinality.is_collection() {
        (
            parse_quote!(Vec<#type_>),
            parse_quote!(#[serde(rename = #serialized_name, default)]),
        )
    } else if property.cardinality.is_optional() {
        (
            parse_quote!(Option<#type_>),
            parse_quote! {
                #[serde(rename = #serialized_name, default, skip_serializing_if = "Option::is_none")]
            },
        )
    } else {
        (type_, parse_quote!(#[serde(rename = #serialized_name)]))
    };

    parse_quote! {
        #(#docs)*
        #serde_attr
        pub #ident: #type_
    }
}

fn xml_local_name(property: &PropertyModel) -> &str {
    property
        .xml
        .name
        .as_ref()
        .map_or(property.identifier.as_str(), |name| name.local_name.as_str())
}

fn value_item(class: &ClassModel, value: &ValueModel, names: &RustNames) -> Item {
    let ident = names.type_ident(class);
    let docs = doc_attributes(class.documentation.as_deref());

    match value {
        ValueModel::Alias(base) => {
            let base = type_ref_type(base, names);
            parse_quote! {
                #(#docs)*
                #[derive(Debug, Clone, PartialEq, ::serde::Serialize, ::serde::Deserialize)]
                #[serde(transparent)]
                pub struct #ident(pub #base);
            }
        }
        ValueModel::List(item) => {
            let item = type_ref_type(item, names);
            parse_quote! {
                #(#docs)*
                #[derive(Debug, Clone, PartialEq, ::serde::Serialize, ::serde::Deserialize)]
                #[serde(transparent)]
                pub struct #ident(pub Vec<#item>);
            }
        }
        ValueModel::Enumeration { members, .. } => {
            let mut variant_names = IdentifierSet::new();
            let variants = members.iter().map(|member| -> Variant {
                let variant = name_to_ident(&variant_names.claim(&variant_name(member)));
                parse_quote! {
                    #[serde(rename = #member)]
                    #variant
                }
            });
            parse_quote! {
                #(#docs)*
                #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ::serde::Serialize, ::serde::Deserialize)]
                pub enum #ident {
                    #(#variants),*
                }
            }
        }
        ValueModel::Union(members) => {
            let mut variant_names = IdentifierSet::new();
            let variants = members.iter().map(|member| -> Variant {
                let variant = match member {
                    TypeRef::Scalar(scalar) => format!("{scalar:?}"),
                    TypeRef::Class(name) | TypeRef::Nested(name) => name.identifier().to_string(),
                };
                let variant = type_ident(&variant_names.claim(&variant));
                let member = type_ref_type(member, names);
                parse_quote!(#variant(#member))
            });
            parse_quote! {
                #(#docs)*
                #[derive(Debug, Clone, PartialEq, ::serde::Serialize, ::serde::Deserialize)]
                #[serde(untagged)]
                pub enum #ident {
                    #(#variants),*
                }
            }
        }
    }
}

fn doc_attributes(documentation: Option<&str>) -> Vec<Attribute> {
    documentation
        .into_iter()
        .flat_map(str::lines)
        .map(|line| {
            let line = format!(" {}", line.trim());
            parse_quote!(#[doc = #line])
        })
        .collect()
}

fn scalar_type(scalar: ScalarType) -> Type {
    use ScalarType::*;
    match scalar {
        Boolean => parse_quote!(bool),
        Int8 => parse_quote!(i8),
        Int16 => parse_quote!(i16),
        Int32 => parse_quote!(i32),
        Int64 | Integer => parse_quote!(i64),
        UInt8 => parse_quote!(u8),
        UInt16 => parse_quote!(u16),
        UInt32 => parse_quote!(u32),
        UInt64 => parse_quote!(u64),
        Float32 => parse_quote!(f32),
        Float64 => parse_quote!(f64),
        // Kept in their lexical form
        String | Decimal | Date | DateTime | Time | Duration | QName | AnyUri | Base64Binary
        | HexBinary | Any => parse_quote!(::std::string::String),
    }
}

fn type_ref_type(type_ref: &TypeRef, names: &RustNames) -> Type {
    match type_ref {
        TypeRef::Scalar(scalar) => scalar_type(*scalar),
        TypeRef::Class(name) | TypeRef::Nested(name) => {
            let path = names.path(name);
            parse_quote!(#path)
        }
    }
}

/// `crate::<namespace modules>::<owner modules>::Type`, derived from `name` alone.
fn type_name_path(name: &TypeName) -> syn::Path {
    let (identifier, owners) = match name.path().split_last() {
        Some((identifier, owners)) => (identifier.as_str(), owners),
        None => (name.identifier(), &[][..]),
    };
    let modules = super::namespace_segments(name.namespace())
        .chain(owners.iter().map(String::as_str))
        .map(module_ident);
    let ident = type_ident(identifier);
    parse_quote!(crate #(:: #modules)* :: #ident)
}

fn name_to_ident(name: &str) -> Ident {
    if ["crate", "self", "super", "Self"].contains(&name) {
        // These are keywords that are not allowed as raw identifiers
        Ident::new(&format!("{}_", name), Span::call_site())
    } else if name.is_keyword() {
        Ident::new_raw(name, Span::call_site())
    } else {
        Ident::new(name, Span::call_site())
    }
}

/// Case conversion may strip everything up to a leading digit.
fn valid_start(name: String) -> String {
    match name.chars().next() {
        None => "_x".to_string(),
        Some(first) if first.is_ascii_digit() => format!("_{name}"),
        Some(_) => name,
    }
}

fn type_name(name: &str) -> String {
    valid_start(name.to_pascal_case())
}

fn module_name(name: &str) -> String {
    valid_start(name.to_snake_case())
}

fn type_ident(name: &str) -> Ident {
    name_to_ident(&type_name(name))
}

fn module_ident(name: &str) -> Ident {
    name_to_ident(&module_name(name))
}

fn field_ident(name: &str, names: &mut IdentifierSet) -> Ident {
    name_to_ident(&names.claim(&valid_start(name.to_snake_case())))
}

/// Variant name for an enumeration value.
fn variant_name(value: &str) -> String {
    let Some(first_char) = value.chars().next() else {
        return "Empty".to_string();
    };
    let sanitized_name = value.replace(|c: char| !c.is_ascii_alphanumeric(), "_");
    let pascal = sanitized_name.to_pascal_case();
    if pascal.is_empty() {
        "Unnamed".to_string()
    } else if !first_char.is_ascii_alphabetic() {
        format!("_{pascal}")
    } else {
        pascal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_are_valid() {
        assert_eq!(type_ident("person").to_string(), "Person");
        assert_eq!(type_ident("Self").to_string(), "Self_");
        assert_eq!(module_ident("type").to_string(), "r#type");
        assert_eq!(module_ident("_1st").to_string(), "_1st");
        let mut names = IdentifierSet::new();
        assert_eq!(field_ident("FirstName", &mut names).to_string(), "first_name");
        assert_eq!(field_ident("firstName", &mut names).to_string(), "first_name2");
    }

    #[test]
    fn enumeration_variants() {
        assert_eq!(variant_name("red"), "Red");
        assert!(variant_name("1.0").starts_with('_'));
        assert_eq!(variant_name(""), "Empty");
        assert_eq!(variant_name("-"), "Unnamed");
        assert_eq!(name_to_ident(&variant_name("self")).to_string(), "Self_");
    }

    #[test]
    fn paths_include_namespace_and_owner_modules() {
        let name = TypeName::new("Out.Model", "WithNested").nested("Nested");
        let path = type_name_path(&name);
        let rendered = quote::quote!(#path).to_string().replace(' ', "");
        assert_eq!(rendered, "crate::out::model::with_nested::Nested");
    }
}
