//! Slash-command framework for a finance and utility chat bot.
//!
//! Commands are declared as a static tree of [`commands::RootCommand`]s, held
//! by an [`executor::CommandRegistry`] and driven by an
//! [`executor::Dispatcher`] that turns platform interactions into handler
//! calls.

extern crate self as daymon;

pub mod argument_converters;
pub mod arguments;
pub mod cache;
pub mod commands;
pub mod config;
pub mod error;
pub mod executor;
pub mod options;
pub mod permissions;
pub mod sources;

#[cfg(feature = "commands")]
pub mod bot;

// Re-export macros
pub use daymon_derive::{Arguments, Choices};
