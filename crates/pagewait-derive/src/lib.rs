//! pagewait derive macros: page objects from tagged fields
//!
//! `#[derive(PageObject)]` turns field tags into an ordered list of load
//! requirements, so a page object declares what "loaded" means next to the
//! fields themselves:
//!
//! ```ignore
//! use pagewait::prelude::*;
//!
//! #[derive(PageObject)]
//! struct CheckoutPage {
//!     base: PageBase,
//!     #[visible]
//!     summary: ElementHandle,
//!     #[clickable]
//!     #[page(name = "Pay now")]
//!     pay: ElementHandle,
//!     #[existence]
//!     line_items: FindBy,
//! }
//! ```
//!
//! # Attributes
//!
//! - `#[existence]`, `#[visible]`, `#[clickable]` - required state of a field;
//!   a field may carry several, evaluated top to bottom
//! - `#[page(base)]` - marks the `PageBase` field (defaults to a field named `base`)
//! - `#[page(name = "...")]` - name used in logs and errors (defaults to the field name)

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::spanned::Spanned;
use syn::{parse_macro_input, Attribute, Data, DeriveInput, Field, Fields, Ident, LitStr, Meta};

/// Tag names recognised on fields, with the `ElementState` variant each maps to
const TAGS: [(&str, &str); 3] = [
    ("existence", "Existence"),
    ("visible", "Visible"),
    ("clickable", "Clickable"),
];

/// Derive macro implementing `pagewait::PageObject`.
///
/// Generates `page()` from the base field and `load_requirements()` from the
/// tagged fields in declaration order.
#[proc_macro_derive(PageObject, attributes(existence, visible, clickable, page))]
pub fn derive_page_object(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_page_object(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// A tagged field, ready for code generation
struct Requirement {
    ident: Ident,
    name: String,
    state: Ident,
}

/// Options parsed from `#[page(...)]`
#[derive(Default)]
struct PageAttr {
    base: bool,
    name: Option<String>,
}

fn expand_page_object(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let fields = named_fields(input)?;

    let mut explicit_base: Option<&Ident> = None;
    let mut requirements = Vec::new();

    for field in fields {
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let page_attr = parse_page_attr(&field.attrs)?;
        if page_attr.base {
            if explicit_base.is_some() {
                return Err(syn::Error::new(
                    field.span(),
                    "only one field may be marked #[page(base)]",
                ));
            }
            explicit_base = Some(ident);
        }

        let display_name = page_attr.name.unwrap_or_else(|| ident.to_string());
        for state in extract_tags(&field.attrs)? {
            requirements.push(Requirement {
                ident: ident.clone(),
                name: display_name.clone(),
                state,
            });
        }
    }

    let base = match explicit_base {
        Some(ident) => ident.clone(),
        None => find_default_base(fields).ok_or_else(|| {
            syn::Error::new(
                name.span(),
                "PageObject needs a `base: PageBase` field or a field marked #[page(base)]",
            )
        })?,
    };

    let entries = requirements.iter().map(|r| {
        let ident = &r.ident;
        let field_name = &r.name;
        let state = &r.state;
        quote! {
            ::pagewait::FieldRequirement::new(
                #field_name,
                ::pagewait::ElementState::#state,
                &self.#ident,
            )
        }
    });

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::pagewait::PageObject for #name #ty_generics #where_clause {
            fn page(&self) -> &::pagewait::PageBase {
                &self.#base
            }

            fn load_requirements(&self) -> ::std::vec::Vec<::pagewait::FieldRequirement<'_>> {
                ::std::vec![#(#entries),*]
            }
        }
    })
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Named fields of a struct, or a spanned error for anything else
fn named_fields(input: &DeriveInput) -> syn::Result<&syn::punctuated::Punctuated<Field, syn::Token![,]>> {
    match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => Ok(&fields.named),
            _ => Err(syn::Error::new(
                input.ident.span(),
                "PageObject can only be derived for structs with named fields",
            )),
        },
        _ => Err(syn::Error::new(
            input.ident.span(),
            "PageObject can only be derived for structs",
        )),
    }
}

/// Collect state tags on a field, in attribute order
fn extract_tags(attrs: &[Attribute]) -> syn::Result<Vec<Ident>> {
    let mut states = Vec::new();
    for attr in attrs {
        let Some((tag, variant)) = TAGS.iter().find(|(tag, _)| attr.path().is_ident(tag)) else {
            continue;
        };
        if !matches!(attr.meta, Meta::Path(_)) {
            return Err(syn::Error::new(
                attr.span(),
                format!("#[{tag}] takes no arguments"),
            ));
        }
        states.push(Ident::new(variant, attr.span()));
    }
    Ok(states)
}

/// Parse `#[page(base)]` and `#[page(name = "...")]`
fn parse_page_attr(attrs: &[Attribute]) -> syn::Result<PageAttr> {
    let mut out = PageAttr::default();
    for attr in attrs {
        if !attr.path().is_ident("page") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("base") {
                out.base = true;
                Ok(())
            } else if meta.path.is_ident("name") {
                let lit: LitStr = meta.value()?.parse()?;
                out.name = Some(lit.value());
                Ok(())
            } else {
                Err(meta.error("expected `base` or `name = \"...\"`"))
            }
        })?;
    }
    Ok(out)
}

/// The field named `base`, when no field is marked explicitly
fn find_default_base<'a>(fields: impl IntoIterator<Item = &'a Field>) -> Option<Ident> {
    fields
        .into_iter()
        .filter_map(|f| f.ident.as_ref())
        .find(|ident| *ident == "base")
        .cloned()
}
