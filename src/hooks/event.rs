use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::lifecycle::{use_hook, use_subscription};
use super::model::use_model_ctx;
use crate::error::Result;
use crate::model::{EventNameOf, ViewModel};
use crate::runtime::Context;

type Listener<E> = Rc<dyn Fn(&E)>;

/// Dispatches events on a view model's model.
pub struct EventDispatcher<M: ViewModel> {
    vm: M,
}

impl<M: ViewModel> EventDispatcher<M> {
    pub fn new(vm: M) -> Self {
        Self { vm }
    }

    /// Forward to [`Model::dispatch_event`](crate::Model::dispatch_event).
    pub fn dispatch(&self, event: M::Events) {
        self.vm.model().dispatch_event(event);
    }
}

impl<M: ViewModel> Clone for EventDispatcher<M> {
    fn clone(&self) -> Self {
        Self {
            vm: self.vm.clone(),
        }
    }
}

impl<M: ViewModel> fmt::Debug for EventDispatcher<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventDispatcher").finish_non_exhaustive()
    }
}

/// Listen for events named `name` while the rendering component is mounted.
///
/// The listener is registered on the first render and released on unmount.
/// It always calls the `callback` passed on the most recent render, so a
/// closure capturing fresh render data never goes stale.
pub fn use_model_event<M, F>(vm: &M, name: EventNameOf<M>, callback: F) -> Result<EventDispatcher<M>>
where
    M: ViewModel,
    F: Fn(&M::Events) + 'static,
{
    let latest = use_hook(|| RefCell::new(None::<Listener<M::Events>>))?;
    *latest.borrow_mut() = Some(Rc::new(callback) as Listener<M::Events>);

    use_subscription(|| {
        let latest = Rc::clone(&latest);
        vm.model().subscribe_to_event(name, move |event| {
            let callback = latest.borrow().clone();
            if let Some(callback) = callback {
                callback(event);
            }
        })
    })?;

    Ok(EventDispatcher::new(vm.clone()))
}

/// [`use_model_event`] on the view model from the nearest provider of `ctx`.
pub fn use_model_ctx_event<M, F>(
    ctx: &Context<M>,
    name: EventNameOf<M>,
    callback: F,
) -> Result<EventDispatcher<M>>
where
    M: ViewModel,
    F: Fn(&M::Events) + 'static,
{
    let vm = use_model_ctx(ctx)?;
    use_model_event(&vm, name, callback)
}

/// A dispatcher for the view model from the nearest provider of `ctx`,
/// without listening.
pub fn use_model_ctx_dispatcher<M: ViewModel>(ctx: &Context<M>) -> Result<EventDispatcher<M>> {
    use_model_ctx(ctx).map(EventDispatcher::new)
}
