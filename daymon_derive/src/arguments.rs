use darling::{FromDeriveInput, FromField, ast::Data};
use proc_macro::TokenStream;
use proc_macro2::Ident;
use quote::quote;
use syn::parse_macro_input;
use thiserror::Error;

#[derive(Debug, FromDeriveInput)]
#[darling(attributes(option), supports(struct_named, struct_unit))]
struct ArgumentsReceiver {
    ident: syn::Ident,
    data: Data<(), FieldReceiver>,
}

#[derive(Debug, FromField)]
#[darling(attributes(option))]
struct FieldReceiver {
    ident: Option<syn::Ident>,
    /// Override the option name this field is read from
    #[darling(default)]
    name: Option<String>,
}

#[derive(Error, Debug)]
enum FieldNameError {
    #[error("Field is missing an identifier")]
    MissingIdent,
    #[error("Option name `{0}` must be 1-32 characters of [a-z0-9_-]")]
    InvalidName(String),
}

pub fn derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as syn::DeriveInput);
    let receiver = match ArgumentsReceiver::from_derive_input(&input) {
        Ok(r) => r,
        Err(e) => return e.write_errors().into(),
    };

    let Some(fields) = receiver.data.take_struct() else {
        return darling::Error::custom("only structs are supported")
            .write_errors()
            .into();
    };

    let field_names: Result<Vec<(String, Ident)>, FieldNameError> =
        fields.fields.iter().map(field_name).collect();
    let field_names = match field_names {
        Ok(names) => names,
        Err(e) => return darling::Error::custom(e.to_string()).write_errors().into(),
    };

    let ident = receiver.ident;
    let struct_fields = field_names.iter().map(|(name, field_ident)| {
        quote! {
            #field_ident: ::daymon::arguments::parse(options, #name)?
        }
    });

    // Unit structs never read the map.
    let options_param = if field_names.is_empty() {
        quote! { _options }
    } else {
        quote! { options }
    };

    quote! {
        #[automatically_derived]
        impl ::daymon::arguments::Arguments for #ident {
            fn from_options(
                #options_param: &::daymon::arguments::OptionMap,
            ) -> ::core::result::Result<Self, ::daymon::error::ValidationError> {
                Ok(Self {
                    #(#struct_fields,)*
                })
            }
        }
    }
    .into()
}

/// Resolves the option name for a field, preferring `#[option(name = "...")]`.
fn field_name(field: &FieldReceiver) -> Result<(String, Ident), FieldNameError> {
    let ident = field.ident.clone().ok_or(FieldNameError::MissingIdent)?;
    let name = field.name.clone().unwrap_or_else(|| ident.to_string());
    if !is_option_name(&name) {
        return Err(FieldNameError::InvalidName(name));
    }
    Ok((name, ident))
}

fn is_option_name(name: &str) -> bool {
    (1..=32).contains(&name.chars().count())
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
}
