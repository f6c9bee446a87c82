//! # Modelkit
//!
//! Observable keyed state and event models, bound to components through
//! hooks and contexts.
//!
//! ## Models (the store)
//!
//! - `Model<S, E>` - State record with per-key subscribers and named events
//! - `Subscription` - RAII handle that removes its callback when dropped
//! - `ViewModel` - Contract for user types wrapping a model
//!
//! ## Components (the binding)
//!
//! - `Host` - Single-threaded component tree with re-render scheduling
//! - Hooks - `use_model_state`, `use_model_event` and their context variants
//! - Contexts - `Context<T>`, providers and `compose_providers`
//! - `create_model` - A view model type bundled with its own context
//!
//! ```
//! use modelkit::{use_model_state, Host, Model};
//! use std::collections::HashMap;
//!
//! let model: Model<HashMap<&str, i32>> = Model::new(HashMap::from([("count", 0)]));
//! let host = Host::new();
//!
//! let counter = host
//!     .mount(None, {
//!         let model = model.clone();
//!         move || {
//!             let (count, set_count) = use_model_state(&model, "count")?;
//!             if count == Some(0) {
//!                 set_count.set(1);
//!             }
//!             Ok(())
//!         }
//!     })
//!     .unwrap();
//!
//! assert_eq!(model.get(&"count"), Some(1));
//! assert!(host.is_dirty(counter));
//! host.flush().unwrap();
//! ```

pub mod config;
pub mod error;
pub mod factory;
pub mod hooks;
pub mod model;
pub mod runtime;

// Re-export main types for convenience
pub use config::{ModelOptions, NotifyMode};
pub use error::{ModelError, Result};
pub use factory::{create_model, ModelKit};
pub use hooks::{
    on_unmount, use_hook, use_model_ctx, use_model_ctx_dispatcher, use_model_ctx_event,
    use_model_ctx_state, use_model_event, use_model_state, use_trigger, EventDispatcher,
    FieldSetter,
};
pub use model::{
    EventNameOf, KeyOf, Model, ModelEvents, ModelState, NoEvents, Subscription, ValueOf, ViewModel,
};
pub use runtime::{
    compose_providers, provide_context, try_use_context, use_context, ComponentId,
    ComposedProvider, Context, ContextProvider, Host, Provider, Trigger,
};
