use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::ext::IdentExt;
use syn::visit_mut::{self, VisitMut};
use syn::{
    parse_macro_input, parse_quote, Data, DeriveInput, Fields, Ident, LitStr, Type, TypePath,
    Visibility,
};

/// Derive macro that makes a struct walkable by the defaulting engine.
///
/// Generates `defaultz_api::Value` and `defaultz_api::Record` for the
/// annotated struct, backed by a static field table.
///
/// Per-field metadata goes into `#[tag(...)]`, one `name = "raw"` pair per
/// tag, the equivalent of a Go struct tag:
///
/// ```ignore
/// #[derive(Record, Default)]
/// pub struct Server {
///     #[tag(default = "8080", json = "port")]
///     pub port: u16,
///
///     #[tag(default = "1s")]
///     pub timeout: std::time::Duration,
///
///     pub tls: Option<Tls>,
/// }
/// ```
///
/// Fields that are not `pub` are described as not writable. Generic structs
/// and tuple structs are not supported.
#[proc_macro_derive(Record, attributes(tag))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match derive_impl(&input) {
        Ok(tokens) => tokens.into(),
        Err(e) => e.to_compile_error().into(),
    }
}

fn derive_impl(input: &DeriveInput) -> Result<TokenStream2, syn::Error> {
    let name = &input.ident;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Record does not support generic structs",
        ));
    }

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            Fields::Unit => return Ok(expand(name, &[])),
            Fields::Unnamed(_) => {
                return Err(syn::Error::new_spanned(
                    name,
                    "Record only supports structs with named fields",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                name,
                "Record only supports structs",
            ))
        }
    };

    let mut parsed = Vec::with_capacity(fields.len());
    for field in fields {
        let ident = field.ident.as_ref().ok_or_else(|| {
            syn::Error::new_spanned(field, "expected named field")
        })?;

        // Parse #[tag(...)] attributes.
        let mut tags: Vec<(String, String)> = Vec::new();
        for attr in &field.attrs {
            if !attr.path().is_ident("tag") {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                let tag = meta
                    .path
                    .get_ident()
                    .ok_or_else(|| meta.error("expected a tag name"))?
                    .unraw()
                    .to_string();
                let raw: LitStr = meta.value()?.parse()?;
                tags.push((tag, raw.value()));
                Ok(())
            })?;
        }

        let mut ty = field.ty.clone();
        ReplaceSelf(name).visit_type_mut(&mut ty);

        parsed.push(ParsedField {
            ident: ident.clone(),
            type_name: type_string(&ty),
            ty,
            writable: !matches!(field.vis, Visibility::Inherited),
            tags,
        });
    }

    Ok(expand(name, &parsed))
}

struct ParsedField {
    ident: Ident,
    ty: Type,
    type_name: String,
    writable: bool,
    tags: Vec<(String, String)>,
}

fn expand(name: &Ident, fields: &[ParsedField]) -> TokenStream2 {
    let count = fields.len();
    let table = format_ident!("__DEFAULTZ_FIELDS_{}", name.to_string().to_uppercase());

    let descriptors = fields.iter().map(|field| {
        let field_name = field.ident.unraw().to_string();
        let ty = &field.ty;
        let type_name = &field.type_name;
        let writable = field.writable;
        let tags = field.tags.iter().map(|(tag, raw)| quote! { (#tag, #raw) });
        quote! {
            defaultz_api::FieldDescriptor {
                name: #field_name,
                type_name: #type_name,
                shape: <#ty as defaultz_api::Value>::describe,
                tags: &[#(#tags),*],
                writable: #writable,
            }
        }
    });

    let idents: Vec<&Ident> = fields.iter().map(|field| &field.ident).collect();
    let indices = 0..count;

    quote! {
        const _: () = {
            static #table: [defaultz_api::FieldDescriptor; #count] = [
                #(#descriptors),*
            ];

            impl defaultz_api::Value for #name {
                fn describe() -> defaultz_api::Shape {
                    defaultz_api::Shape::record::<#name>(&#table)
                }

                fn shape(&self) -> defaultz_api::Shape {
                    <Self as defaultz_api::Value>::describe()
                }

                fn is_zero(&self) -> bool {
                    true #(&& defaultz_api::Value::is_zero(&self.#idents))*
                }

                fn slot(&mut self) -> defaultz_api::Slot<'_> {
                    defaultz_api::Slot::Record(self)
                }
            }

            impl defaultz_api::Record for #name {
                fn fields(&self) -> &'static [defaultz_api::FieldDescriptor] {
                    &#table
                }

                fn field_mut(
                    &mut self,
                    index: usize,
                ) -> ::core::option::Option<&mut dyn defaultz_api::Value> {
                    match index {
                        #(#indices => ::core::option::Option::Some(
                            &mut self.#idents as &mut dyn defaultz_api::Value
                        ),)*
                        _ => ::core::option::Option::None,
                    }
                }
            }
        };
    }
}

/// Field types end up in a static outside the impl, where `Self` is not in scope.
struct ReplaceSelf<'a>(&'a Ident);

impl VisitMut for ReplaceSelf<'_> {
    fn visit_type_path_mut(&mut self, ty: &mut TypePath) {
        if ty.qself.is_none() && ty.path.is_ident("Self") {
            let name = self.0;
            *ty = parse_quote!(#name);
            return;
        }
        visit_mut::visit_type_path_mut(self, ty);
    }
}

/// Declared type as written, without the token spacing `quote` inserts
/// (`HashMap < String , Vec < u8 > >` becomes `HashMap<String, Vec<u8>>`).
fn type_string(ty: &Type) -> String {
    let raw = quote!(#ty).to_string();
    let is_word = |c: char| c.is_alphanumeric() || c == '_';
    let chars: Vec<char> = raw.chars().collect();
    let mut out = String::with_capacity(raw.len());
    for (i, &c) in chars.iter().enumerate() {
        if c == ' ' {
            let prev = out.chars().last();
            let next = chars.get(i + 1).is_some_and(|&n| is_word(n));
            let separator = matches!(prev, Some(',' | ';'));
            if separator || (prev.is_some_and(is_word) && next) {
                out.push(' ');
            }
            continue;
        }
        out.push(c);
    }
    out
}
