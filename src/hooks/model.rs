use crate::error::Result;
use crate::model::ViewModel;
use crate::runtime::{try_use_context, Context};

/// The view model from the nearest enclosing provider of `ctx`.
///
/// # Errors
///
/// [`ModelError::MissingProvider`](crate::ModelError::MissingProvider) when no
/// ancestor provides `ctx`.
pub fn use_model_ctx<M: ViewModel>(ctx: &Context<M>) -> Result<M> {
    try_use_context(ctx)
}
