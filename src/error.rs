//! Error types shared by the command model, the dispatcher and handlers.

use thiserror::Error;

use crate::options::SemanticType;

/// A command tree that breaks a platform or structural rule.
///
/// Raised while building nodes or the registry at startup, never while
/// dispatching.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DefinitionError {
    #[error("`{0}` is not a valid command or option name")]
    InvalidName(String),

    #[error("`{parent}` declares `{name}` more than once")]
    DuplicateName { parent: String, name: String },

    #[error("`{0}` mixes options, sub-commands and groups; a node is either a leaf or a router")]
    MixedShape(String),

    #[error("group `{group}` in `{parent}` has no sub-commands")]
    EmptyGroup { parent: String, group: String },

    #[error("option `{0}` declares both static choices and autocomplete")]
    ChoicesWithAutocomplete(String),

    #[error("required option `{option}` in `{node}` follows an optional one")]
    RequiredAfterOptional { node: String, option: String },

    #[error("`{parent}` declares {count} {what}, the limit is 25")]
    TooMany {
        parent: String,
        what: &'static str,
        count: usize,
    },
}

/// The event named a command, group or sub-command that is not registered.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    #[error("{0} command has not been found :(")]
    Command(String),

    #[error("{command} {group} {subcommand} has not been found")]
    Group {
        command: String,
        group: String,
        subcommand: String,
    },

    #[error("{command} {subcommand} has not been found")]
    SubCommand { command: String, subcommand: String },
}

/// Which side of the interaction is missing permissions.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PermissionDenied {
    #[error("You do not have the required permissions to use this command.")]
    Caller,

    #[error("I do not have the required permissions to use this command.")]
    Bot,
}

/// Everything the dispatcher itself can refuse before any handler runs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("This command must be sent from a guild")]
    OutsideGuild,

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Permission(#[from] PermissionDenied),
}

/// A raw option value that could not be turned into what the handler asked for.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("option `{option}` expected a {expected} value")]
    InvalidType {
        option: String,
        expected: SemanticType,
    },

    #[error("{message}")]
    Rejected { option: String, message: String },

    #[error("option `{0}` is not declared by this command")]
    Undeclared(String),

    #[error("option `{option}`: {source}")]
    Argument {
        option: String,
        #[source]
        source: crate::arguments::Error,
    },
}

impl ValidationError {
    /// Name of the option that failed.
    pub fn option(&self) -> &str {
        match self {
            ValidationError::InvalidType { option, .. }
            | ValidationError::Rejected { option, .. }
            | ValidationError::Argument { option, .. } => option,
            ValidationError::Undeclared(option) => option,
        }
    }
}

/// Failures signalled by the default handler behaviour.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HandlerError {
    #[error("Execution for {0} has not been implemented")]
    ExecuteUnimplemented(String),

    #[error("Autocomplete for {0} has not been implemented")]
    AutocompleteUnimplemented(String),
}
