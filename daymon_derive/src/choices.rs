use darling::ast::Data;
use proc_macro::TokenStream;
use quote::quote;
use syn::DeriveInput;
use syn::Ident;
use syn::parse_macro_input;

use darling::FromDeriveInput;
use darling::FromVariant;

/// Platform cap on static choices per option.
const MAX_CHOICES: usize = 25;

#[derive(FromDeriveInput)]
#[darling(attributes(choice), supports(enum_unit))]
struct ChoicesEnumReceiver {
    ident: Ident,
    data: Data<ChoiceVariant, ()>,
}

#[derive(FromVariant)]
#[darling(attributes(choice))]
struct ChoiceVariant {
    ident: Ident,
    #[darling(default)]
    name: Option<String>,
    #[darling(default)]
    value: Option<String>,
}

pub fn derive(tokens: TokenStream) -> TokenStream {
    let input = parse_macro_input!(tokens as DeriveInput);

    let receiver = match ChoicesEnumReceiver::from_derive_input(&input) {
        Ok(val) => val,
        Err(err) => return TokenStream::from(err.write_errors()),
    };

    let Some(variants) = receiver.data.as_ref().take_enum() else {
        return darling::Error::custom("Choices can only be derived for enums")
            .write_errors()
            .into();
    };

    if variants.len() > MAX_CHOICES {
        return TokenStream::from(
            darling::Error::custom(format!(
                "Enums with more than {MAX_CHOICES} variants are not supported"
            ))
            .write_errors(),
        );
    }

    let enum_name = &receiver.ident;
    let variants = variants
        .iter()
        .map(|variant| {
            let fallback = variant.ident.to_string();
            (
                variant.ident.clone(),
                variant.name.clone().unwrap_or_else(|| fallback.clone()),
                variant.value.clone().unwrap_or(fallback),
            )
        })
        .collect::<Vec<_>>();

    let mut seen_values = std::collections::HashSet::new();
    for (_ident, _name, value) in &variants {
        if !seen_values.insert(value) {
            return TokenStream::from(
                darling::Error::custom(format!("Duplicate choice value found: {}", value))
                    .write_errors(),
            );
        }
    }

    let command_option_choices = variants.iter().map(|(_ident, name, value)| {
        quote! {
            ::twilight_model::application::command::CommandOptionChoice {
                name: #name.to_string(),
                value: ::twilight_model::application::command::CommandOptionChoiceValue::String(#value.to_string()),
                name_localizations: None,
            }
        }
    });

    let value_matches = variants.iter().map(|(ident, _name, value)| {
        quote! {
            #value => Ok(#enum_name::#ident)
        }
    });

    let as_value_arms = variants.iter().map(|(ident, _name, value)| {
        quote! {
            #enum_name::#ident => #value
        }
    });

    quote! {
        #[automatically_derived]
        impl ::daymon::arguments::ToOption for #enum_name {
            fn to_option() -> ::daymon::options::OptionDescriptor {
                ::daymon::options::OptionDescriptor::new(
                    ::daymon::options::SemanticType::String
                ).choices(vec![
                    #(#command_option_choices),*
                ])
            }
        }

        #[automatically_derived]
        impl ::daymon::arguments::ArgumentConverter for #enum_name {
            fn convert(
                data: &::daymon::options::OptionValue,
            ) -> ::core::result::Result<Self, ::daymon::arguments::Error> {
                if let ::daymon::options::OptionValue::String(value) = data {
                    match value.as_str() {
                        #(#value_matches),*,
                        _ => Err(::daymon::arguments::Error::InvalidType)
                    }
                } else {
                    Err(::daymon::arguments::Error::InvalidType)
                }
            }
        }

        #[automatically_derived]
        impl #enum_name {
            /// The wire value sent by the platform for this choice.
            pub fn as_value(&self) -> &'static str {
                match self {
                    #(#as_value_arms),*
                }
            }
        }
    }
    .into()
}
