//! Turns inbound interactions into handler calls and handler replies into
//! platform responses.

pub mod context;
pub mod dispatcher;
pub mod event;
pub mod registry;

pub use context::{AutocompleteContext, CommandContext, InteractionResponder, Invocation};
pub use dispatcher::{Dispatch, Dispatcher};
pub use event::{Caller, CommandPath, InteractionEvent, InteractionKind};
pub use registry::{CommandRegistry, CommandUploader};
