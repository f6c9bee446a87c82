//! Component host and context propagation.
//!
//! This module provides the component tree that hooks run inside, the
//! "mark dirty" scheduling primitive, and subtree-scoped contexts.

mod context;
mod host;
mod provider;

pub use context::{provide_context, try_use_context, use_context, Context};
pub use host::{ComponentId, Host, Trigger};
pub use provider::{compose_providers, ComposedProvider, ContextProvider, Provider};

pub(crate) use host::{current, next_hook};
