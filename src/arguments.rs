use std::collections::HashMap;

use crate::{
    error::ValidationError,
    options::{OptionDescriptor, OptionValue},
};

/// Decoded options of one invocation, keyed by option name.
pub type OptionMap = HashMap<String, OptionValue>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("Invalid type for command argument")]
    InvalidType,
    #[error("A value is required for this argument")]
    Missing,
}

/// A typed view over a command's options, usually derived with
/// `#[derive(Arguments)]`.
pub trait Arguments: Sized {
    fn from_options(options: &OptionMap) -> Result<Self, ValidationError>;
}

/// Gives a starter descriptor for a Rust type.
pub trait ToOption {
    fn to_option() -> OptionDescriptor;
}

pub trait OptionalArgumentConverter: Sized {
    fn convert(data: Option<&OptionValue>) -> Result<Self, Error>;
}

pub trait ArgumentConverter: Sized {
    fn convert(data: &OptionValue) -> Result<Self, Error>;
}

impl<T: OptionalArgumentConverter> OptionalArgumentConverter for Option<T> {
    fn convert(data: Option<&OptionValue>) -> Result<Self, Error> {
        match data {
            Some(_) => Ok(Some(T::convert(data)?)),
            None => Ok(None),
        }
    }
}

impl<T: ArgumentConverter> OptionalArgumentConverter for T {
    fn convert(data: Option<&OptionValue>) -> Result<Self, Error> {
        if let Some(value) = data {
            T::convert(value)
        } else {
            Err(Error::Missing)
        }
    }
}

/// Reads one option out of the decoded map. Keys are lowercase, matching
/// the names registered with the platform.
pub fn parse<T: OptionalArgumentConverter>(
    options: &OptionMap,
    name: &str,
) -> Result<T, ValidationError> {
    T::convert(options.get(&name.to_lowercase())).map_err(|source| ValidationError::Argument {
        option: name.to_string(),
        source,
    })
}

impl<T: ToOption> ToOption for Option<T> {
    fn to_option() -> OptionDescriptor {
        T::to_option().required(false)
    }
}
