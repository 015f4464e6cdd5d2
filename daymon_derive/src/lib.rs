use proc_macro::TokenStream;

mod arguments;
mod choices;

#[proc_macro_derive(Arguments, attributes(option))]
pub fn arguments_derive(input: TokenStream) -> TokenStream {
    arguments::derive(input)
}

#[proc_macro_derive(Choices, attributes(choice))]
pub fn enum_choices_derive(input: TokenStream) -> TokenStream {
    choices::derive(input)
}
