//! Derive macros for syntax node kinds
//!
//! `#[derive(Shape)]` inspects the fields of every variant of a node-kind enum and
//! classifies them as child references (`NodeId`, `Option<NodeId>`, `Vec<NodeId>`,
//! `Vec<Option<NodeId>>`) or plain data. From that it generates:
//!
//! - `tag()`, `children()` and `child_slots_mut()` on the enum, in field declaration order
//! - a fieldless tag enum naming every variant
//! - one query pattern struct per variant whose fields are all optional constraints
//! - a pattern enum over those structs with a `matches_kind` structural test

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{
    Data, DeriveInput, Fields, GenericArgument, Ident, PathArguments, Type, parse_macro_input,
};

/// Derive macro generating child traversal and query patterns for a node-kind enum
///
/// # Attributes
///
/// - `#[shape(id_type = "NodeId")]` - type of child references (default: `NodeId`)
/// - `#[shape(pattern = "Pattern")]` - pattern type used for child constraints (default: `Pattern`)
/// - `#[shape(kind_pattern = "KindPattern")]` - name of the generated pattern enum
/// - `#[shape(tag = "NodeTag")]` - name of the generated tag enum
///
/// # Example
///
/// ```ignore
/// #[derive(Shape)]
/// #[shape(id_type = "NodeId", pattern = "Pattern")]
/// pub enum NodeKind {
///     Binary { operator: BinaryOperator, left: NodeId, right: NodeId },
///     Call { callee: NodeId, arguments: Vec<NodeId> },
/// }
/// ```
#[proc_macro_derive(Shape, attributes(shape))]
pub fn derive_shape(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand_shape(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

/// Names configured through `#[shape(...)]`
struct ShapeConfig {
    id_type: Ident,
    pattern: Ident,
    kind_pattern: Ident,
    tag: Ident,
}

/// How a field participates in traversal and matching
#[derive(Clone, Copy, PartialEq, Eq)]
enum FieldShape {
    /// `NodeId`
    Single,
    /// `Option<NodeId>`
    Optional,
    /// `Vec<NodeId>`
    Many,
    /// `Vec<Option<NodeId>>`
    ManyOptional,
    /// Anything else, compared by equality
    Primitive,
}

struct VariantField<'input> {
    name: &'input Ident,
    ty: &'input Type,
    shape: FieldShape,
}

fn expand_shape(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let Data::Enum(data_enum) = &input.data else {
        return Err(syn::Error::new_spanned(
            input,
            "Shape can only be derived for enums",
        ));
    };

    let enum_name = &input.ident;
    let vis = &input.vis;
    let config = parse_shape_attributes(&input.attrs, enum_name)?;
    let ShapeConfig {
        id_type,
        pattern,
        kind_pattern,
        tag,
    } = &config;

    let mut tag_variants = Vec::new();
    let mut tag_names = Vec::new();
    let mut tag_arms = Vec::new();
    let mut pattern_tag_arms = Vec::new();
    let mut children_arms = Vec::new();
    let mut slot_arms = Vec::new();
    let mut pattern_structs = Vec::new();
    let mut pattern_variants = Vec::new();
    let mut match_arms = Vec::new();

    for variant in &data_enum.variants {
        let variant_name = &variant.ident;
        let fields = match &variant.fields {
            Fields::Named(named) => named
                .named
                .iter()
                .filter_map(|field| {
                    let name = field.ident.as_ref()?;
                    Some(VariantField {
                        name,
                        ty: &field.ty,
                        shape: classify_field(&field.ty, id_type),
                    })
                })
                .collect::<Vec<_>>(),
            Fields::Unit => Vec::new(),
            Fields::Unnamed(_) => {
                return Err(syn::Error::new_spanned(
                    variant,
                    "Shape requires named or unit variants",
                ));
            }
        };

        let variant_str = variant_name.to_string();
        tag_variants.push(quote! {
            #[doc = #variant_str]
            #variant_name
        });
        tag_names.push(quote! { Self::#variant_name => #variant_str });
        tag_arms.push(quote! { #enum_name::#variant_name { .. } => #tag::#variant_name });
        pattern_tag_arms.push(quote! { Self::#variant_name(_) => #tag::#variant_name });

        let child_fields: Vec<_> = fields
            .iter()
            .filter(|field| field.shape != FieldShape::Primitive)
            .collect();
        let child_names: Vec<_> = child_fields.iter().map(|field| field.name).collect();
        let child_bindings: Vec<_> = child_fields
            .iter()
            .map(|field| format_ident!("node_{}", field.name))
            .collect();

        let collect_stmts = child_fields.iter().zip(&child_bindings).map(|(field, binding)| {
            match field.shape {
                FieldShape::Single => quote! { children.push(*#binding); },
                FieldShape::Optional => quote! { children.extend(#binding.iter().copied()); },
                FieldShape::Many => quote! { children.extend(#binding.iter().copied()); },
                FieldShape::ManyOptional => quote! { children.extend(#binding.iter().flatten().copied()); },
                FieldShape::Primitive => quote! {},
            }
        });
        children_arms.push(quote! {
            #enum_name::#variant_name { #(#child_names: #child_bindings,)* .. } => {
                #(#collect_stmts)*
            }
        });

        let slot_stmts = child_fields.iter().zip(&child_bindings).map(|(field, binding)| {
            match field.shape {
                FieldShape::Single => quote! { slots.push(#binding); },
                FieldShape::Optional | FieldShape::Many => quote! { slots.extend(#binding.iter_mut()); },
                FieldShape::ManyOptional => quote! { slots.extend(#binding.iter_mut().flatten()); },
                FieldShape::Primitive => quote! {},
            }
        });
        slot_arms.push(quote! {
            #enum_name::#variant_name { #(#child_names: #child_bindings,)* .. } => {
                #(#slot_stmts)*
            }
        });

        let struct_name = format_ident!("{}Pattern", variant_name);
        let struct_doc = format!("Query pattern for [`{enum_name}::{variant_name}`]; `None` fields match anything");
        let struct_fields = fields.iter().map(|field| {
            let name = field.name;
            let field_doc = format!("Constraint on `{name}`");
            let ty = match field.shape {
                FieldShape::Single | FieldShape::Optional => quote! { Option<Box<#pattern>> },
                FieldShape::Many | FieldShape::ManyOptional => quote! { Option<Vec<#pattern>> },
                FieldShape::Primitive => {
                    let ty = field.ty;
                    quote! { Option<#ty> }
                }
            };
            quote! {
                #[doc = #field_doc]
                pub #name: #ty
            }
        });
        pattern_structs.push(quote! {
            #[doc = #struct_doc]
            #[derive(Debug, Clone, Default, PartialEq)]
            #vis struct #struct_name {
                #(#struct_fields,)*
            }
        });
        pattern_variants.push(quote! {
            #[doc = #variant_str]
            #variant_name(#struct_name)
        });

        let all_names: Vec<_> = fields.iter().map(|field| field.name).collect();
        let all_bindings: Vec<_> = fields
            .iter()
            .map(|field| format_ident!("node_{}", field.name))
            .collect();
        let checks = fields.iter().zip(&all_bindings).map(|(field, binding)| {
            let name = field.name;
            match field.shape {
                FieldShape::Single => quote! {
                    if let Some(expected) = &shape.#name {
                        if !shape_child(*#binding, &**expected) {
                            return false;
                        }
                    }
                },
                FieldShape::Optional => quote! {
                    if let (Some(expected), Some(node_id)) = (&shape.#name, #binding) {
                        if !shape_child(*node_id, &**expected) {
                            return false;
                        }
                    }
                },
                FieldShape::Many => quote! {
                    if let Some(expected) = &shape.#name {
                        for (item_pattern, node_id) in expected.iter().zip(#binding.iter()) {
                            if !shape_child(*node_id, item_pattern) {
                                return false;
                            }
                        }
                    }
                },
                FieldShape::ManyOptional => quote! {
                    if let Some(expected) = &shape.#name {
                        for (item_pattern, slot) in expected.iter().zip(#binding.iter()) {
                            if let Some(node_id) = slot {
                                if !shape_child(*node_id, item_pattern) {
                                    return false;
                                }
                            }
                        }
                    }
                },
                FieldShape::Primitive => quote! {
                    if let Some(expected) = &shape.#name {
                        if expected != #binding {
                            return false;
                        }
                    }
                },
            }
        });
        let shape_binding = if fields.is_empty() {
            quote! { _ }
        } else {
            quote! { shape }
        };
        match_arms.push(quote! {
            (Self::#variant_name(#shape_binding), #enum_name::#variant_name { #(#all_names: #all_bindings,)* .. }) => {
                #(#checks)*
                true
            }
        });
    }

    let tag_doc = format!("Fieldless tag of each [`{enum_name}`] variant");
    let kind_pattern_doc = format!("Partially specified [`{enum_name}`] used for structural queries");

    Ok(quote! {
        #[doc = #tag_doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #vis enum #tag {
            #(#tag_variants,)*
        }

        impl #tag {
            /// The variant name, as used in diagnostics
            pub fn name(self) -> &'static str {
                match self {
                    #(#tag_names,)*
                }
            }
        }

        impl ::std::fmt::Display for #tag {
            fn fmt(&self, formatter: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                formatter.write_str(self.name())
            }
        }

        impl #enum_name {
            /// The tag of this variant
            pub fn tag(&self) -> #tag {
                match self {
                    #(#tag_arms,)*
                }
            }

            /// Child references in field declaration order
            pub fn children(&self) -> Vec<#id_type> {
                let mut children = Vec::new();
                match self {
                    #(#children_arms)*
                }
                children
            }

            /// Mutable child slots in field declaration order
            pub fn child_slots_mut(&mut self) -> Vec<&mut #id_type> {
                let mut slots = Vec::new();
                match self {
                    #(#slot_arms)*
                }
                slots
            }
        }

        #(#pattern_structs)*

        #[doc = #kind_pattern_doc]
        #[derive(Debug, Clone, PartialEq)]
        #vis enum #kind_pattern {
            #(#pattern_variants,)*
        }

        impl #kind_pattern {
            /// The tag this pattern requires
            pub fn tag(&self) -> #tag {
                match self {
                    #(#pattern_tag_arms,)*
                }
            }

            /// Test `kind` against this pattern
            ///
            /// Plain fields compare by equality. Child constraints are delegated to
            /// `shape_child`; list constraints apply positionally and extra pattern
            /// entries beyond the candidate's length are ignored.
            pub fn matches_kind(
                &self,
                kind: &#enum_name,
                shape_child: &mut dyn FnMut(#id_type, &#pattern) -> bool,
            ) -> bool {
                match (self, kind) {
                    #(#match_arms)*
                    _ => false,
                }
            }
        }
    })
}

/// Parse `#[shape(...)]` attributes, falling back to the conventional names
fn parse_shape_attributes(attrs: &[syn::Attribute], enum_name: &Ident) -> syn::Result<ShapeConfig> {
    let mut config = ShapeConfig {
        id_type: format_ident!("NodeId"),
        pattern: format_ident!("Pattern"),
        kind_pattern: format_ident!("{}Pattern", enum_name),
        tag: format_ident!("{}Tag", enum_name),
    };

    for attr in attrs {
        if attr.path().is_ident("shape") {
            attr.parse_nested_meta(|meta| {
                let value: syn::LitStr = meta.value()?.parse()?;
                let ident = format_ident!("{}", value.value());
                if meta.path.is_ident("id_type") {
                    config.id_type = ident;
                } else if meta.path.is_ident("pattern") {
                    config.pattern = ident;
                } else if meta.path.is_ident("kind_pattern") {
                    config.kind_pattern = ident;
                } else if meta.path.is_ident("tag") {
                    config.tag = ident;
                } else {
                    return Err(meta.error("unknown shape attribute"));
                }
                Ok(())
            })?;
        }
    }

    Ok(config)
}

/// Classify a field type relative to the configured id type
fn classify_field(ty: &Type, id_type: &Ident) -> FieldShape {
    if is_ident_type(ty, id_type) {
        return FieldShape::Single;
    }
    if let Some(inner) = generic_inner(ty, "Option") {
        if is_ident_type(inner, id_type) {
            return FieldShape::Optional;
        }
    }
    if let Some(inner) = generic_inner(ty, "Vec") {
        if is_ident_type(inner, id_type) {
            return FieldShape::Many;
        }
        if generic_inner(inner, "Option").is_some_and(|item| is_ident_type(item, id_type)) {
            return FieldShape::ManyOptional;
        }
    }
    FieldShape::Primitive
}

/// Check if `ty` is a plain path ending in `ident`
fn is_ident_type(ty: &Type, ident: &Ident) -> bool {
    if let Type::Path(type_path) = ty {
        if let Some(segment) = type_path.path.segments.last() {
            return segment.ident == *ident && segment.arguments.is_empty();
        }
    }
    false
}

/// Extract `T` from `wrapper<T>`
fn generic_inner<'ty>(ty: &'ty Type, wrapper: &str) -> Option<&'ty Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let segment = type_path.path.segments.last()?;
    if segment.ident != wrapper {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    match args.args.first()? {
        GenericArgument::Type(inner) => Some(inner),
        _ => None,
    }
}
