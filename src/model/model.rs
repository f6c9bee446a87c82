use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use std::rc::Rc;

use super::events::{ModelEvents, NoEvents};
use super::registry::Registry;
use super::state::ModelState;
use super::subscription::Subscription;
use crate::config::{ModelOptions, NotifyMode};

enum Notice<S: ModelState, E: ModelEvents> {
    /// `None` when the field no longer exists.
    Field(S::Key, Option<S::Value>),
    Event(E),
}

struct ModelInner<S: ModelState, E: ModelEvents> {
    state: RefCell<S>,
    initial: S,
    subscribers: Rc<RefCell<Registry<S::Key, Option<S::Value>>>>,
    listeners: Rc<RefCell<Registry<E::Name, E>>>,
    options: ModelOptions,
    pending: RefCell<VecDeque<Notice<S, E>>>,
    flushing: Cell<bool>,
    depth: Cell<usize>,
    // Immediate mode: sequence number of the latest notified write per key.
    writes: RefCell<HashMap<S::Key, u64>>,
    sequence: Cell<u64>,
}

/// An observable state record with per-key subscribers and named events.
///
/// `Model` is a cheap handle: clones share the same state, subscribers and
/// listeners. Everything runs synchronously on the calling thread.
///
/// # Examples
///
/// ```
/// use modelkit::Model;
/// use std::cell::Cell;
/// use std::collections::HashMap;
/// use std::rc::Rc;
///
/// let model: Model<HashMap<&str, i32>> = Model::new(HashMap::from([("count", 0)]));
///
/// let seen = Rc::new(Cell::new(0));
/// let sub = model.subscribe_to_key("count", {
///     let seen = seen.clone();
///     move |v: &i32| seen.set(*v)
/// });
///
/// model.set_value("count", 5);
/// assert_eq!(seen.get(), 5);
/// assert_eq!(model.get(&"count"), Some(5));
///
/// sub.unsubscribe();
/// model.set_value("count", 6);
/// assert_eq!(seen.get(), 5);
/// ```
pub struct Model<S: ModelState, E: ModelEvents = NoEvents> {
    inner: Rc<ModelInner<S, E>>,
}

impl<S: ModelState, E: ModelEvents> Model<S, E> {
    /// Create a model, snapshotting `initial` for [`Model::reset`].
    pub fn new(initial: S) -> Self {
        Self::with_options(initial, ModelOptions::default())
    }

    /// Create a model with explicit notification options.
    pub fn with_options(initial: S, options: ModelOptions) -> Self {
        Self {
            inner: Rc::new(ModelInner {
                state: RefCell::new(initial.clone()),
                initial,
                subscribers: Rc::new(RefCell::new(Registry::new())),
                listeners: Rc::new(RefCell::new(Registry::new())),
                options,
                pending: RefCell::new(VecDeque::new()),
                flushing: Cell::new(false),
                depth: Cell::new(0),
                writes: RefCell::new(HashMap::new()),
                sequence: Cell::new(0),
            }),
        }
    }

    /// Get a clone of the current state.
    pub fn state(&self) -> S {
        self.inner.state.borrow().clone()
    }

    /// Read state without cloning it.
    pub fn with_state<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&S) -> R,
    {
        f(&self.inner.state.borrow())
    }

    /// Current value of one field; `None` for a field the state doesn't have.
    pub fn get(&self, key: &S::Key) -> Option<S::Value> {
        self.inner.state.borrow().field(key)
    }

    /// The snapshot taken at construction.
    pub fn initial_state(&self) -> &S {
        &self.inner.initial
    }

    /// Options the model was created with.
    pub fn options(&self) -> &ModelOptions {
        &self.inner.options
    }

    /// Replace one field and notify that key's subscribers with `value`.
    ///
    /// Subscribers are notified even when the value is unchanged.
    pub fn set_value(&self, key: S::Key, value: S::Value) {
        self.inner
            .state
            .borrow_mut()
            .set_field(key.clone(), value.clone());
        self.notify(vec![Notice::Field(key, Some(value))]);
    }

    /// Merge `delta` into the state, then notify each changed key.
    ///
    /// Every write commits before any subscriber runs. A key repeated in the
    /// delta is notified once with its final value.
    pub fn set_state<I>(&self, delta: I)
    where
        I: IntoIterator<Item = (S::Key, S::Value)>,
    {
        let notices = {
            let mut state = self.inner.state.borrow_mut();
            let mut seen = HashSet::new();
            let mut touched = Vec::new();
            for (key, value) in delta {
                if seen.insert(key.clone()) {
                    touched.push((key.clone(), state.field(&key)));
                }
                state.set_field(key, value);
            }
            touched
                .into_iter()
                .filter_map(|(key, before)| {
                    let after = state.field(&key)?;
                    self.changed(before.as_ref(), &after)
                        .then(|| Notice::Field(key, Some(after)))
                })
                .collect()
        };
        self.notify(notices);
    }

    /// Restore the construction snapshot and notify the restored fields.
    ///
    /// Fields added since construction are removed. Their watchers (see
    /// [`Model::watch_key`]) are told with `None`.
    pub fn reset(&self) {
        let notices = {
            let mut state = self.inner.state.borrow_mut();
            let previous = std::mem::replace(&mut *state, self.inner.initial.clone());
            let restored = state
                .fields()
                .into_iter()
                .filter(|(key, value)| self.changed(previous.field(key).as_ref(), value))
                .map(|(key, value)| Notice::Field(key, Some(value)));
            let removed = previous
                .fields()
                .into_iter()
                .filter(|(key, _)| state.field(key).is_none())
                .map(|(key, _)| Notice::Field(key, None));
            restored.chain(removed).collect()
        };
        tracing::debug!("model reset to initial state");
        self.notify(notices);
    }

    /// Call `callback` with the new value whenever `key` changes.
    ///
    /// A field removed by [`Model::reset`] has no value to deliver, so the
    /// callback is not called for it. Use [`Model::watch_key`] to see removals.
    pub fn subscribe_to_key<F>(&self, key: S::Key, callback: F) -> Subscription
    where
        F: Fn(&S::Value) + 'static,
    {
        self.watch_key(key, move |value| {
            if let Some(value) = value {
                callback(value);
            }
        })
    }

    /// Like [`Model::subscribe_to_key`], also called with `None` when the
    /// field is removed.
    pub fn watch_key<F>(&self, key: S::Key, callback: F) -> Subscription
    where
        F: Fn(Option<&S::Value>) + 'static,
    {
        let callback = move |value: &Option<S::Value>| callback(value.as_ref());
        let id = self
            .inner
            .subscribers
            .borrow_mut()
            .insert(key.clone(), Rc::new(callback));
        tracing::trace!(key = ?key, id, "subscribed to key");
        Subscription::new(&self.inner.subscribers, key, id)
    }

    /// Call `callback` whenever an event named `name` is dispatched.
    pub fn subscribe_to_event<F>(&self, name: E::Name, callback: F) -> Subscription
    where
        F: Fn(&E) + 'static,
    {
        let id = self
            .inner
            .listeners
            .borrow_mut()
            .insert(name.clone(), Rc::new(callback));
        tracing::trace!(event = ?name, id, "subscribed to event");
        Subscription::new(&self.inner.listeners, name, id)
    }

    /// Deliver `event` to every listener registered for its name.
    pub fn dispatch_event(&self, event: E) {
        self.notify(vec![Notice::Event(event)]);
    }

    /// Number of callbacks registered for `key`.
    pub fn subscriber_count(&self, key: &S::Key) -> usize {
        self.inner.subscribers.borrow().len(key)
    }

    /// Number of listeners registered for the event `name`.
    pub fn listener_count(&self, name: &E::Name) -> usize {
        self.inner.listeners.borrow().len(name)
    }

    /// Whether both handles point at the same model.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    fn changed(&self, before: Option<&S::Value>, after: &S::Value) -> bool {
        !self.inner.options.skip_unchanged || before != Some(after)
    }

    fn notify(&self, notices: Vec<Notice<S, E>>) {
        if notices.is_empty() {
            return;
        }
        match self.inner.options.notify {
            NotifyMode::Deferred => {
                self.inner.pending.borrow_mut().extend(notices);
                if self.inner.flushing.get() {
                    tracing::trace!("fan-out in progress, notification queued");
                    return;
                }
                let _flushing = Flushing::new(&self.inner);
                loop {
                    let next = self.inner.pending.borrow_mut().pop_front();
                    let Some(notice) = next else {
                        break;
                    };
                    self.deliver(notice, None);
                }
            }
            NotifyMode::Immediate => {
                let depth = self.inner.depth.get();
                if depth >= self.inner.options.max_depth {
                    tracing::warn!(
                        depth,
                        "notification depth limit reached, dropping nested fan-out"
                    );
                    return;
                }
                let _depth = Nested::new(&self.inner.depth);
                // All writes are committed, so stamp them before any callback
                // can write again.
                let stamped: Vec<_> = notices
                    .into_iter()
                    .map(|notice| (self.stamp(&notice), notice))
                    .collect();
                for (write, notice) in stamped {
                    self.deliver(notice, write);
                }
            }
        }
    }

    /// Record a field notice as the latest write to its key.
    fn stamp(&self, notice: &Notice<S, E>) -> Option<u64> {
        let Notice::Field(key, _) = notice else {
            return None;
        };
        let sequence = self.inner.sequence.get() + 1;
        self.inner.sequence.set(sequence);
        self.inner.writes.borrow_mut().insert(key.clone(), sequence);
        Some(sequence)
    }

    fn is_latest(&self, key: &S::Key, write: u64) -> bool {
        self.inner.writes.borrow().get(key) == Some(&write)
    }

    /// Fan a notice out. A stamped field notice stops as soon as a newer write
    /// to the same key has been notified, so no subscriber ends on a stale value.
    fn deliver(&self, notice: Notice<S, E>, write: Option<u64>) {
        match notice {
            Notice::Field(key, value) => {
                Registry::fan_out_while(&self.inner.subscribers, &key, &value, || match write {
                    Some(write) => self.is_latest(&key, write),
                    None => true,
                });
            }
            Notice::Event(event) => {
                let name = event.name();
                Registry::fan_out(&self.inner.listeners, &name, &event);
            }
        }
    }
}

impl<S: ModelState, E: ModelEvents> Clone for Model<S, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<S, E> fmt::Debug for Model<S, E>
where
    S: ModelState + fmt::Debug,
    E: ModelEvents,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("state", &*self.inner.state.borrow())
            .field("options", &self.inner.options)
            .finish()
    }
}

/// Marks a deferred fan-out in progress.
///
/// Leftover notices are discarded on drop; they are only left over when a
/// callback panicked mid-fan-out.
struct Flushing<'a, S: ModelState, E: ModelEvents>(&'a ModelInner<S, E>);

impl<'a, S: ModelState, E: ModelEvents> Flushing<'a, S, E> {
    fn new(inner: &'a ModelInner<S, E>) -> Self {
        inner.flushing.set(true);
        Self(inner)
    }
}

impl<S: ModelState, E: ModelEvents> Drop for Flushing<'_, S, E> {
    fn drop(&mut self) {
        self.0.flushing.set(false);
        let mut pending = self.0.pending.borrow_mut();
        if !pending.is_empty() {
            tracing::warn!(
                discarded = pending.len(),
                "fan-out aborted, discarding queued notifications"
            );
            pending.clear();
        }
    }
}

/// One level of immediate-mode recursion.
struct Nested<'a>(&'a Cell<usize>);

impl<'a> Nested<'a> {
    fn new(depth: &'a Cell<usize>) -> Self {
        depth.set(depth.get() + 1);
        Self(depth)
    }
}

impl Drop for Nested<'_> {
    fn drop(&mut self) {
        self.0.set(self.0.get().saturating_sub(1));
    }
}

/// A user type built around a [`Model`].
///
/// Implement this for a struct that wraps a model and adds domain methods;
/// hooks, providers and [`create_model`](crate::create_model) accept any
/// view model. `Model` itself is one.
pub trait ViewModel: Clone + 'static {
    type State: ModelState;
    type Events: ModelEvents;

    fn model(&self) -> &Model<Self::State, Self::Events>;
}

impl<S: ModelState, E: ModelEvents> ViewModel for Model<S, E> {
    type State = S;
    type Events = E;

    fn model(&self) -> &Model<S, E> {
        self
    }
}

/// Field key type of a view model.
pub type KeyOf<M> = <<M as ViewModel>::State as ModelState>::Key;
/// Field value type of a view model.
pub type ValueOf<M> = <<M as ViewModel>::State as ModelState>::Value;
/// Event name type of a view model.
pub type EventNameOf<M> = <<M as ViewModel>::Events as ModelEvents>::Name;
