//! Procedural macros for CoffeeShop.
//!
//! `#[derive(Brewable)]` turns a struct with named fields into a
//! `TypeDefinition`: one constructor parameter per field, in field order.
//!
//! ```rust,ignore
//! #[derive(Brewable)]
//! #[brewable(name = "EE_Front_Controller", autoload)]
//! struct FrontController {
//!     registry: Arc<Registry>,            // brewed as type_name::<Registry>()
//!     #[brew(id = "EE_Request")]
//!     request: Arc<Request>,              // brewed as "EE_Request"
//!     #[brew(default)]
//!     retries: u32,                       // 0 unless passed explicitly
//!     #[brew(skip)]
//!     cache: Vec<String>,                 // never a parameter
//! }
//! ```

use darling::ast::{Data, Style};
use darling::util::Ignored;
use darling::{FromDeriveInput, FromField};
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{DeriveInput, GenericArgument, PathArguments, Type, parse_macro_input};

#[derive(FromDeriveInput)]
#[darling(attributes(brewable), supports(struct_named, struct_unit))]
struct BrewableInput {
    ident: syn::Ident,
    generics: syn::Generics,
    data: Data<Ignored, BrewField>,
    /// Definition name; defaults to `type_name::<Self>()`.
    #[darling(default)]
    name: Option<String>,
    /// Submit the definition to the autoload inventory.
    #[darling(default)]
    autoload: bool,
}

#[derive(FromField)]
#[darling(attributes(brew))]
struct BrewField {
    ident: Option<syn::Ident>,
    ty: Type,
    /// Identifier to brew instead of the field's type name.
    #[darling(default)]
    id: Option<String>,
    /// Use `Default::default()` when nothing else fills the parameter.
    #[darling(default)]
    default: bool,
    /// Not a parameter; always `Default::default()`.
    #[darling(default)]
    skip: bool,
}

/// Derive macro implementing `coffeeshop::Brewable`.
///
/// # Attributes
/// - `#[brewable(name = "...")]` — definition name
/// - `#[brewable(autoload)]` — make the type loadable by name everywhere
/// - `#[brew(id = "...")]` — identifier brewed for the field
/// - `#[brew(default)]` — fall back to `Default::default()`
/// - `#[brew(skip)]` — leave the field out of the constructor
#[proc_macro_derive(Brewable, attributes(brewable, brew))]
pub fn derive_brewable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let parsed = match BrewableInput::from_derive_input(&input) {
        Ok(parsed) => parsed,
        Err(error) => return error.write_errors().into(),
    };

    if !parsed.generics.params.is_empty() {
        return syn::Error::new_spanned(
            &parsed.generics,
            "#[derive(Brewable)] does not support generic types",
        )
        .to_compile_error()
        .into();
    }

    expand(&parsed).into()
}

fn expand(input: &BrewableInput) -> TokenStream2 {
    let ident = &input.ident;

    let name = match input.name {
        Some(ref name) => quote! { #name },
        None => quote! { ::std::any::type_name::<#ident>() },
    };

    let fields = match input.data {
        Data::Struct(ref fields) => fields,
        // `supports(...)` rejects enums before we get here
        Data::Enum(_) => return TokenStream2::new(),
    };

    let mut params = Vec::new();
    let mut inits = Vec::new();
    let mut position = 0usize;

    for field in fields.iter() {
        let Some(ref field_ident) = field.ident else {
            continue;
        };
        let ty = &field.ty;

        if field.skip {
            inits.push(quote! { #field_ident: ::std::default::Default::default() });
            continue;
        }

        let param_name = field_ident.to_string();
        let inner = arc_inner(ty);

        let hint = match (&field.id, inner) {
            (Some(id), _) => Some(quote! { #id }),
            (None, Some(inner)) => Some(quote! { ::std::any::type_name::<#inner>() }),
            (None, None) => None,
        };
        let typed = hint.map(|hint| quote! { .typed(#hint) });

        let default = match (field.default, inner) {
            (false, _) => None,
            (true, Some(inner)) => Some(quote! {
                .default_instance(
                    ::std::sync::Arc::<#inner>::default() as ::coffeeshop::definition::Instance
                )
            }),
            (true, None) => Some(quote! {
                .default_value(<#ty as ::std::default::Default>::default())
            }),
        };

        params.push(quote! {
            .param(::coffeeshop::definition::Parameter::new(#param_name) #typed #default)
        });

        inits.push(match inner {
            Some(inner) => quote! { #field_ident: args.arc::<#inner>(#position)? },
            None => quote! { #field_ident: args.cloned::<#ty>(#position)? },
        });
        position += 1;
    }

    let construct = if fields.style == Style::Unit {
        quote! { #ident }
    } else {
        quote! { #ident { #(#inits),* } }
    };

    // the closure only reads `args` when some field is a parameter
    let args = if position == 0 {
        quote! { _args }
    } else {
        quote! { args }
    };

    let autoload = input.autoload.then(|| {
        quote! {
            ::coffeeshop::inventory::submit! {
                ::coffeeshop::locator::Autoload::new(
                    <#ident as ::coffeeshop::definition::Brewable>::definition
                )
            }
        }
    });

    quote! {
        impl ::coffeeshop::definition::Brewable for #ident {
            fn definition() -> ::coffeeshop::definition::TypeDefinition {
                ::coffeeshop::definition::TypeDefinition::class(#name)
                    #(#params)*
                    .constructor(|#args: ::coffeeshop::definition::ResolvedArguments| {
                        ::std::result::Result::Ok(
                            ::std::sync::Arc::new(#construct) as ::coffeeshop::definition::Instance
                        )
                    })
            }
        }

        #autoload
    }
}

/// `T` for a field typed `Arc<T>` (any path ending in `Arc`).
fn arc_inner(ty: &Type) -> Option<&Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    let segment = path.path.segments.last()?;
    if segment.ident != "Arc" {
        return None;
    }
    let PathArguments::AngleBracketed(ref generics) = segment.arguments else {
        return None;
    };
    match generics.args.first()? {
        GenericArgument::Type(inner) if generics.args.len() == 1 => Some(inner),
        _ => None,
    }
}
