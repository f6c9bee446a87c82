use std::fmt;

use super::lifecycle::{use_subscription, use_trigger};
use super::model::use_model_ctx;
use crate::error::Result;
use crate::model::{KeyOf, ValueOf, ViewModel};
use crate::runtime::Context;

/// Writes one field of a model through [`Model::set_value`](crate::Model::set_value).
pub struct FieldSetter<M: ViewModel> {
    vm: M,
    key: KeyOf<M>,
}

impl<M: ViewModel> FieldSetter<M> {
    /// Write `value` to the bound field.
    pub fn set(&self, value: ValueOf<M>) {
        self.vm.model().set_value(self.key.clone(), value);
    }

    /// Compute the new value from the current one.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(Option<ValueOf<M>>) -> ValueOf<M>,
    {
        let value = f(self.vm.model().get(&self.key));
        self.set(value);
    }

    pub fn key(&self) -> &KeyOf<M> {
        &self.key
    }
}

impl<M: ViewModel> Clone for FieldSetter<M> {
    fn clone(&self) -> Self {
        Self {
            vm: self.vm.clone(),
            key: self.key.clone(),
        }
    }
}

impl<M: ViewModel> fmt::Debug for FieldSetter<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldSetter").field("key", &self.key).finish()
    }
}

/// Bind one field of `vm` to the rendering component.
///
/// On the first render this subscribes to the field; every change to it,
/// including its removal by [`Model::reset`](crate::Model::reset), marks the
/// component dirty. The subscription is released when the component
/// unmounts. The key given on the first render is the one watched.
///
/// Returns the field's current value (`None` for a field the state doesn't
/// have) and a setter that writes through to the model, so every other
/// subscriber sees the update too.
pub fn use_model_state<M: ViewModel>(
    vm: &M,
    key: KeyOf<M>,
) -> Result<(Option<ValueOf<M>>, FieldSetter<M>)> {
    let trigger = use_trigger()?;
    let model = vm.model();

    use_subscription(|| {
        model.watch_key(key.clone(), move |_| trigger.notify())
    })?;

    Ok((
        model.get(&key),
        FieldSetter {
            vm: vm.clone(),
            key,
        },
    ))
}

/// [`use_model_state`] on the view model from the nearest provider of `ctx`.
pub fn use_model_ctx_state<M: ViewModel>(
    ctx: &Context<M>,
    key: KeyOf<M>,
) -> Result<(Option<ValueOf<M>>, FieldSetter<M>)> {
    let vm = use_model_ctx(ctx)?;
    use_model_state(&vm, key)
}
