//! Hooks binding models to the component lifecycle.
//!
//! Hooks run inside a component render on a [`Host`](crate::Host): they
//! subscribe on the first render, mark the component dirty when the model
//! changes, and release their subscriptions on unmount.

mod event;
mod lifecycle;
mod model;
mod state;

pub use event::{use_model_ctx_dispatcher, use_model_ctx_event, use_model_event, EventDispatcher};
pub use lifecycle::{on_unmount, use_hook, use_trigger};
pub use model::use_model_ctx;
pub use state::{use_model_ctx_state, use_model_state, FieldSetter};
