use std::fmt::Debug;
use std::hash::Hash;

/// The set of events a model can dispatch.
///
/// Each event value carries its own payload, so the payload shape of every
/// event channel is fixed by the type: a variant without fields is an event
/// without payload. Listeners register against [`ModelEvents::Name`] and
/// receive the whole event.
///
/// # Examples
///
/// ```
/// use modelkit::ModelEvents;
///
/// #[derive(Clone, Debug)]
/// enum TodoEvent {
///     Added(String),
///     Clear,
/// }
///
/// #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
/// enum TodoEventName {
///     Added,
///     Clear,
/// }
///
/// impl ModelEvents for TodoEvent {
///     type Name = TodoEventName;
///
///     fn name(&self) -> TodoEventName {
///         match self {
///             TodoEvent::Added(_) => TodoEventName::Added,
///             TodoEvent::Clear => TodoEventName::Clear,
///         }
///     }
/// }
///
/// assert_eq!(TodoEvent::Clear.name(), TodoEventName::Clear);
/// ```
pub trait ModelEvents: 'static {
    type Name: Clone + Eq + Hash + Debug + 'static;

    fn name(&self) -> Self::Name;
}

/// Event set for models that dispatch no events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoEvents {}

impl ModelEvents for NoEvents {
    type Name = NoEvents;

    fn name(&self) -> NoEvents {
        match *self {}
    }
}
