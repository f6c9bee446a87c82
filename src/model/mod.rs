//! Observable state and event models.
//!
//! A [`Model`] owns a state record, a snapshot of it for [`Model::reset`],
//! per-key subscribers and per-event listeners.

mod events;
#[allow(clippy::module_inception)]
mod model;
mod registry;
mod state;
mod subscription;

pub use events::{ModelEvents, NoEvents};
pub use model::{EventNameOf, KeyOf, Model, ValueOf, ViewModel};
pub use state::ModelState;
pub use subscription::Subscription;
