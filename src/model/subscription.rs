use std::cell::{Cell, RefCell};
use std::fmt;
use std::fmt::Debug;
use std::hash::Hash;
use std::rc::Rc;

use super::registry::Registry;

/// RAII handle for a key subscription or event listener.
///
/// Dropping the handle removes the callback. Use [`Subscription::detach`] to
/// keep the callback registered for as long as the model lives.
#[must_use = "dropping a Subscription removes its callback; call `detach` to keep it"]
pub struct Subscription {
    release: Cell<Option<Box<dyn FnOnce()>>>,
}

impl Subscription {
    pub(crate) fn new<K, A>(registry: &Rc<RefCell<Registry<K, A>>>, key: K, id: u64) -> Self
    where
        K: Clone + Eq + Hash + Debug + 'static,
        A: 'static,
    {
        let registry = Rc::downgrade(registry);
        Self {
            release: Cell::new(Some(Box::new(move || {
                if let Some(registry) = registry.upgrade() {
                    let removed = registry.borrow_mut().remove(&key, id);
                    tracing::trace!(key = ?key, id, removed, "unsubscribed");
                }
            }))),
        }
    }

    /// Remove the callback. Calling this more than once has no further effect.
    pub fn unsubscribe(&self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }

    /// Whether the callback may still be registered.
    pub fn is_active(&self) -> bool {
        let release = self.release.take();
        let active = release.is_some();
        self.release.set(release);
        active
    }

    /// Give up the handle without removing the callback.
    ///
    /// The callback then lives as long as the model. A detached callback that
    /// captures a clone of its own model keeps that model alive forever.
    pub fn detach(self) {
        drop(self.release.take());
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}
