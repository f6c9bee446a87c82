use thiserror::Error;

use crate::runtime::ComponentId;

pub type Result<T> = std::result::Result<T, ModelError>;

/// Failures at the boundary between models and the component host.
///
/// Store operations never fail; these only come from hooks, context lookups
/// and the host's mount/flush cycle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("hook called outside of a component render")]
    OutsideRender,

    #[error("hook slot {index} changed type between renders")]
    HookMismatch { index: usize },

    #[error("component not found: {id}")]
    ComponentNotFound { id: ComponentId },

    #[error("no provider found for context `{context}`")]
    MissingProvider { context: &'static str },

    #[error("components still dirty after {passes} flush passes")]
    RenderLoop { passes: usize },
}
