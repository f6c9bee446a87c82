use std::fmt;
use std::rc::Rc;

use crate::error::Result;
use crate::hooks::{
    use_hook, use_model_ctx, use_model_ctx_dispatcher, use_model_ctx_event, use_model_ctx_state,
    EventDispatcher, FieldSetter,
};
use crate::model::{EventNameOf, KeyOf, ValueOf, ViewModel};
use crate::runtime::{provide_context, Context, ContextProvider};

/// A view model type bundled with its own context.
///
/// Created by [`create_model`]. Every kit has a distinct context, so two kits
/// for the same view model type never see each other's providers.
pub struct ModelKit<M: ViewModel> {
    ctx: Context<M>,
    build: Rc<dyn Fn(M::State) -> M>,
}

/// Bundle a view model constructor with a fresh context, provider helpers and
/// context-bound hooks.
///
/// # Examples
///
/// ```
/// use modelkit::{create_model, Host, Model};
/// use std::collections::HashMap;
///
/// type Counter = Model<HashMap<&'static str, i32>>;
///
/// let counter = create_model(Counter::new);
/// let host = Host::new();
///
/// let root = host
///     .mount(None, counter.with_provider(HashMap::from([("count", 3)]), |_| Ok(())))
///     .unwrap();
/// host.mount(Some(root), {
///     let counter = counter.clone();
///     move || {
///         let (count, _set_count) = counter.use_state("count")?;
///         assert_eq!(count, Some(3));
///         Ok(())
///     }
/// })
/// .unwrap();
/// ```
pub fn create_model<M, F>(build: F) -> ModelKit<M>
where
    M: ViewModel,
    F: Fn(M::State) -> M + 'static,
{
    ModelKit {
        ctx: Context::new(),
        build: Rc::new(build),
    }
}

impl<M: ViewModel> ModelKit<M> {
    /// The context this kit's providers install.
    pub fn context(&self) -> Context<M> {
        self.ctx
    }

    /// Construct a view model with the kit's constructor.
    pub fn build(&self, initial: M::State) -> M {
        (self.build)(initial)
    }

    /// A provider for an existing view model.
    pub fn provider(&self, vm: M) -> ContextProvider<M> {
        ContextProvider::new(self.ctx, vm)
    }

    /// A provider for a view model built from `initial`.
    pub fn provider_with_state(&self, initial: M::State) -> ContextProvider<M> {
        self.provider(self.build(initial))
    }

    /// Wrap `render` in a component that builds a view model from `initial`
    /// on its first render, provides it to its subtree, and hands it to
    /// `render` on every render.
    pub fn with_provider<R>(
        &self,
        initial: M::State,
        mut render: R,
    ) -> impl FnMut() -> Result<()> + 'static
    where
        R: FnMut(&M) -> Result<()> + 'static,
    {
        let ctx = self.ctx;
        let build = Rc::clone(&self.build);
        move || {
            let vm = use_hook(|| build(initial.clone()))?;
            provide_context(&ctx, M::clone(&vm))?;
            render(&vm)
        }
    }

    /// Wrap `render` in a component that resolves the view model from the
    /// nearest provider and hands it to `render`.
    pub fn with_model<R>(&self, mut render: R) -> impl FnMut() -> Result<()> + 'static
    where
        R: FnMut(&M) -> Result<()> + 'static,
    {
        let ctx = self.ctx;
        move || {
            let vm = use_model_ctx(&ctx)?;
            render(&vm)
        }
    }

    /// The view model from the nearest provider of this kit.
    pub fn use_model(&self) -> Result<M> {
        use_model_ctx(&self.ctx)
    }

    /// [`use_model_state`](crate::use_model_state) on the provided view model.
    pub fn use_state(&self, key: KeyOf<M>) -> Result<(Option<ValueOf<M>>, FieldSetter<M>)> {
        use_model_ctx_state(&self.ctx, key)
    }

    /// [`use_model_event`](crate::use_model_event) on the provided view model.
    pub fn use_event<F>(&self, name: EventNameOf<M>, callback: F) -> Result<EventDispatcher<M>>
    where
        F: Fn(&M::Events) + 'static,
    {
        use_model_ctx_event(&self.ctx, name, callback)
    }

    /// A dispatcher for the provided view model, without listening.
    pub fn use_dispatcher(&self) -> Result<EventDispatcher<M>> {
        use_model_ctx_dispatcher(&self.ctx)
    }
}

impl<M: ViewModel> Clone for ModelKit<M> {
    fn clone(&self) -> Self {
        Self {
            ctx: self.ctx,
            build: Rc::clone(&self.build),
        }
    }
}

impl<M: ViewModel> fmt::Debug for ModelKit<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelKit").field("ctx", &self.ctx).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ModelError;
    use crate::model::{Model, ModelEvents};
    use crate::runtime::Host;
    use std::cell::{Cell, RefCell};
    use std::collections::BTreeMap;

    #[derive(Debug, Clone, PartialEq)]
    enum Ev {
        Increment(i32),
    }

    impl ModelEvents for Ev {
        type Name = &'static str;

        fn name(&self) -> &'static str {
            match self {
                Ev::Increment(_) => "increment",
            }
        }
    }

    type State = BTreeMap<&'static str, i32>;

    /// A view model with its own behavior on top of the model.
    #[derive(Clone)]
    struct Counter {
        model: Model<State, Ev>,
    }

    impl Counter {
        fn new(initial: State) -> Self {
            let model = Model::new(initial);
            let listener = model.subscribe_to_event("increment", {
                let model = model.clone();
                move |Ev::Increment(by): &Ev| {
                    let count = model.get(&"count").unwrap_or_default();
                    model.set_value("count", count + by);
                }
            });
            listener.detach();
            Self { model }
        }
    }

    impl ViewModel for Counter {
        type State = State;
        type Events = Ev;

        fn model(&self) -> &Model<State, Ev> {
            &self.model
        }
    }

    #[test]
    fn with_provider_builds_once() {
        let builds = Rc::new(Cell::new(0));
        let kit = create_model({
            let builds = Rc::clone(&builds);
            move |initial: State| {
                builds.set(builds.get() + 1);
                Counter::new(initial)
            }
        });
        let host = Host::new();
        let root = host
            .mount(None, kit.with_provider(BTreeMap::from([("count", 0)]), |_| Ok(())))
            .unwrap();

        host.trigger(root).notify();
        host.flush().unwrap();
        assert_eq!(builds.get(), 1);
        assert_eq!(host.render_count(root), Some(2));
    }

    #[test]
    fn descendants_share_the_provided_model() {
        let kit = create_model(Counter::new);
        let host = Host::new();
        let provided: Rc<RefCell<Option<Counter>>> = Rc::new(RefCell::new(None));

        let root = host
            .mount(None, {
                let provided = Rc::clone(&provided);
                kit.with_provider(BTreeMap::from([("count", 1)]), move |vm| {
                    *provided.borrow_mut() = Some(vm.clone());
                    Ok(())
                })
            })
            .unwrap();

        let seen = Rc::new(RefCell::new(Vec::new()));
        let child = host
            .mount(Some(root), {
                let kit = kit.clone();
                let seen = Rc::clone(&seen);
                move || {
                    let (count, _) = kit.use_state("count")?;
                    seen.borrow_mut().push(count);
                    Ok(())
                }
            })
            .unwrap();

        let dispatcher = Rc::new(RefCell::new(None));
        host.mount(Some(root), {
            let kit = kit.clone();
            let dispatcher = Rc::clone(&dispatcher);
            kit.clone().with_model(move |vm| {
                assert!(vm.model().ptr_eq(kit.use_model()?.model()));
                *dispatcher.borrow_mut() = Some(kit.use_dispatcher()?);
                Ok(())
            })
        })
        .unwrap();

        let dispatcher = dispatcher.borrow().clone().unwrap();
        dispatcher.dispatch(Ev::Increment(4));

        assert!(host.is_dirty(child));
        host.flush().unwrap();
        assert_eq!(*seen.borrow(), vec![Some(1), Some(5)]);

        let vm = provided.borrow().clone().unwrap();
        assert_eq!(vm.model().get(&"count"), Some(5));
    }

    #[test]
    fn kits_do_not_share_contexts() {
        let a = create_model(Counter::new);
        let b = create_model(Counter::new);
        let host = Host::new();

        let root = host
            .mount(None, a.with_provider(BTreeMap::new(), |_| Ok(())))
            .unwrap();
        let err = host
            .mount(Some(root), move || b.use_model().map(drop))
            .unwrap_err();
        assert!(matches!(err, ModelError::MissingProvider { .. }));
    }

    #[test]
    fn provider_with_state_mounts_subtree() {
        let kit = create_model(Counter::new);
        let host = Host::new();
        let calls = Rc::new(Cell::new(0));

        let child = kit
            .provider_with_state(BTreeMap::from([("count", 2)]))
            .mount(&host, None, {
                let kit = kit.clone();
                let calls = Rc::clone(&calls);
                move || {
                    let _ = kit.use_event("increment", {
                        let calls = Rc::clone(&calls);
                        move |_| calls.set(calls.get() + 1)
                    })?;
                    Ok(())
                }
            })
            .unwrap();

        let provider = host.parent(child).unwrap();
        assert_eq!(host.parent(provider), None);

        let vm = kit.build(BTreeMap::new());
        assert_eq!(vm.model().get(&"count"), None);
        assert_eq!(calls.get(), 0);
    }
}
