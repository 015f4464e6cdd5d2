use std::{fmt, sync::Arc};

use twilight_model::{
    application::{
        command::{CommandOptionChoice, CommandOptionType},
        interaction::application_command::CommandOptionValue,
    },
    id::{Id, marker::UserMarker},
};

use crate::error::ValidationError;

/// The closed set of argument types a command can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SemanticType {
    String,
    /// 32-bit integer. The platform sends 64-bit integers; values outside the
    /// `i32` range are truncated when decoded.
    Integer,
    Long,
    Double,
    Boolean,
    User,
}

impl SemanticType {
    /// Platform option type used when registering.
    pub fn option_type(self) -> CommandOptionType {
        match self {
            SemanticType::String => CommandOptionType::String,
            SemanticType::Integer | SemanticType::Long => CommandOptionType::Integer,
            SemanticType::Double => CommandOptionType::Number,
            SemanticType::Boolean => CommandOptionType::Boolean,
            SemanticType::User => CommandOptionType::User,
        }
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SemanticType::String => "string",
            SemanticType::Integer => "integer",
            SemanticType::Long => "long",
            SemanticType::Double => "double",
            SemanticType::Boolean => "boolean",
            SemanticType::User => "user",
        };
        f.write_str(s)
    }
}

/// A raw option value after it has been mapped onto its declared type.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    String(String),
    Integer(i32),
    Long(i64),
    Double(f64),
    Boolean(bool),
    User(Id<UserMarker>),
}

impl OptionValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptionValue::String(value) => Some(value),
            _ => None,
        }
    }
}

pub type Validator = Arc<dyn Fn(&OptionValue) -> bool + Send + Sync>;

/// Declaration of one argument accepted by a command.
#[derive(Clone)]
pub struct OptionDescriptor {
    pub name: String,
    pub description: String,
    pub kind: SemanticType,
    pub required: bool,
    pub autocomplete: bool,
    pub choices: Vec<CommandOptionChoice>,
    validator: Option<Validator>,
    validation_failure: String,
}

impl fmt::Debug for OptionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("required", &self.required)
            .field("autocomplete", &self.autocomplete)
            .field("choices", &self.choices.len())
            .field("validator", &self.validator.is_some())
            .finish()
    }
}

impl OptionDescriptor {
    pub fn new(kind: SemanticType) -> Self {
        OptionDescriptor {
            name: String::new(),
            description: String::new(),
            kind,
            required: true,
            autocomplete: false,
            choices: Vec::new(),
            validator: None,
            validation_failure: String::new(),
        }
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn autocomplete(mut self, autocomplete: bool) -> Self {
        self.autocomplete = autocomplete;
        self
    }

    pub fn choices(mut self, choices: Vec<CommandOptionChoice>) -> Self {
        self.choices = choices;
        self
    }

    /// Adds a predicate run after type decoding. A `false` result fails
    /// decoding with `message`.
    pub fn validator<F>(mut self, validator: F, message: &str) -> Self
    where
        F: Fn(&OptionValue) -> bool + Send + Sync + 'static,
    {
        self.validator = Some(Arc::new(validator));
        self.validation_failure = message.to_string();
        self
    }

    /// Maps a raw platform value to this option's declared type, then runs the
    /// validator if one is set.
    pub fn decode(&self, raw: &CommandOptionValue) -> Result<OptionValue, ValidationError> {
        let value = self
            .decode_type(raw)
            .ok_or_else(|| ValidationError::InvalidType {
                option: self.name.clone(),
                expected: self.kind,
            })?;

        if let Some(validator) = &self.validator
            && !validator(&value)
        {
            return Err(ValidationError::Rejected {
                option: self.name.clone(),
                message: self.validation_failure.clone(),
            });
        }

        Ok(value)
    }

    fn decode_type(&self, raw: &CommandOptionValue) -> Option<OptionValue> {
        // Focused values carry the partial text typed so far.
        if let CommandOptionValue::Focused(partial, _) = raw {
            return match self.kind {
                SemanticType::String => Some(OptionValue::String(partial.clone())),
                SemanticType::Integer => partial.trim().parse().ok().map(OptionValue::Integer),
                SemanticType::Long => partial.trim().parse().ok().map(OptionValue::Long),
                SemanticType::Double => partial.trim().parse().ok().map(OptionValue::Double),
                SemanticType::Boolean | SemanticType::User => None,
            };
        }

        match (self.kind, raw) {
            (SemanticType::String, CommandOptionValue::String(value)) => {
                Some(OptionValue::String(value.clone()))
            }
            (SemanticType::Integer, CommandOptionValue::Integer(value)) => {
                Some(OptionValue::Integer(*value as i32))
            }
            (SemanticType::Long, CommandOptionValue::Integer(value)) => {
                Some(OptionValue::Long(*value))
            }
            (SemanticType::Double, CommandOptionValue::Number(value)) => {
                Some(OptionValue::Double(*value))
            }
            (SemanticType::Double, CommandOptionValue::Integer(value)) => {
                Some(OptionValue::Double(*value as f64))
            }
            (SemanticType::Boolean, CommandOptionValue::Boolean(value)) => {
                Some(OptionValue::Boolean(*value))
            }
            (SemanticType::User, CommandOptionValue::User(user)) => Some(OptionValue::User(*user)),
            _ => None,
        }
    }
}

impl From<&OptionDescriptor> for twilight_model::application::command::CommandOption {
    fn from(option: &OptionDescriptor) -> Self {
        twilight_model::application::command::CommandOption {
            autocomplete: option.autocomplete.then_some(true),
            channel_types: None,
            choices: (!option.choices.is_empty()).then(|| option.choices.clone()),
            name: option.name.to_lowercase(),
            description: option.description.clone(),
            kind: option.kind.option_type(),
            max_length: None,
            max_value: None,
            min_length: None,
            min_value: None,
            required: Some(option.required),
            description_localizations: None,
            name_localizations: None,
            options: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn symbol() -> OptionDescriptor {
        OptionDescriptor::new(SemanticType::String)
            .name("security_symbol")
            .description("Security you want to get a price of")
    }

    #[test]
    fn decodes_string() {
        let value = symbol()
            .decode(&CommandOptionValue::String("AAPL".to_string()))
            .unwrap();
        assert_eq!(value, OptionValue::String("AAPL".to_string()));
    }

    #[rstest]
    #[case(SemanticType::Integer, CommandOptionValue::Integer(42), OptionValue::Integer(42))]
    #[case(SemanticType::Long, CommandOptionValue::Integer(1 << 40), OptionValue::Long(1 << 40))]
    #[case(SemanticType::Double, CommandOptionValue::Number(1.5), OptionValue::Double(1.5))]
    #[case(SemanticType::Double, CommandOptionValue::Integer(2), OptionValue::Double(2.0))]
    #[case(SemanticType::Boolean, CommandOptionValue::Boolean(true), OptionValue::Boolean(true))]
    #[case(SemanticType::User, CommandOptionValue::User(Id::new(7)), OptionValue::User(Id::new(7)))]
    fn decodes_declared_type(
        #[case] kind: SemanticType,
        #[case] raw: CommandOptionValue,
        #[case] expected: OptionValue,
    ) {
        let descriptor = OptionDescriptor::new(kind).name("value");
        assert_eq!(descriptor.decode(&raw).unwrap(), expected);
    }

    #[test]
    fn integer_truncates_values_beyond_i32() {
        let descriptor = OptionDescriptor::new(SemanticType::Integer).name("count");
        let value = descriptor
            .decode(&CommandOptionValue::Integer(i64::from(i32::MAX) + 1))
            .unwrap();
        assert_eq!(value, OptionValue::Integer(i32::MIN));
    }

    #[test]
    fn type_mismatch_is_reported() {
        let err = symbol()
            .decode(&CommandOptionValue::Boolean(true))
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidType {
                option: "security_symbol".to_string(),
                expected: SemanticType::String,
            }
        );
    }

    #[test]
    fn validator_rejection_carries_message() {
        let descriptor = symbol().validator(
            |value| value.as_str().is_some_and(|s| s.len() <= 5),
            "Symbols are at most 5 characters",
        );

        assert!(
            descriptor
                .decode(&CommandOptionValue::String("MSFT".to_string()))
                .is_ok()
        );
        let err = descriptor
            .decode(&CommandOptionValue::String("TOOLONG".to_string()))
            .unwrap_err();
        assert_eq!(err.to_string(), "Symbols are at most 5 characters");
    }

    #[test]
    fn focused_value_decodes_as_partial_text() {
        let value = symbol()
            .decode(&CommandOptionValue::Focused(
                "AA".to_string(),
                CommandOptionType::String,
            ))
            .unwrap();
        assert_eq!(value, OptionValue::String("AA".to_string()));
    }

    #[test]
    fn platform_option_is_lowercased_and_marks_autocomplete() {
        let option = twilight_model::application::command::CommandOption::from(
            &OptionDescriptor::new(SemanticType::String)
                .name("Model")
                .description("The model you want to use")
                .autocomplete(true),
        );
        assert_eq!(option.name, "model");
        assert_eq!(option.autocomplete, Some(true));
        assert_eq!(option.choices, None);
        assert_eq!(option.required, Some(true));
        assert_eq!(option.kind, CommandOptionType::String);
    }
}
