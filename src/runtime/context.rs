use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use super::host;
use crate::error::{ModelError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct ContextId(u64);

impl ContextId {
    fn next() -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(0);
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// A key for passing a value down the component tree.
///
/// Every `Context` is distinct, even for the same value type, so two
/// providers of `Model<S>` under different contexts never shadow each other.
///
/// # Examples
///
/// ```
/// use modelkit::{provide_context, use_context, Context, Host};
///
/// let theme: Context<&'static str> = Context::new();
/// let host = Host::new();
///
/// let root = host
///     .mount(None, move || provide_context(&theme, "dark"))
///     .unwrap();
/// host.mount(Some(root), move || {
///     assert_eq!(use_context(&theme), Some("dark"));
///     Ok(())
/// })
/// .unwrap();
/// ```
pub struct Context<T> {
    id: ContextId,
    _marker: PhantomData<fn() -> T>,
}

impl<T: 'static> Context<T> {
    pub fn new() -> Self {
        Self {
            id: ContextId::next(),
            _marker: PhantomData,
        }
    }

    pub(crate) fn id(&self) -> ContextId {
        self.id
    }
}

impl<T: 'static> Default for Context<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Context<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Context<T> {}

impl<T> fmt::Debug for Context<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("id", &self.id.0)
            .field("type", &std::any::type_name::<T>())
            .finish()
    }
}

/// Make `value` visible to the rendering component and its descendants.
///
/// Providing again replaces the previous value for this component.
pub fn provide_context<T: 'static>(ctx: &Context<T>, value: T) -> Result<()> {
    let (host, id) = host::current().ok_or(ModelError::OutsideRender)?;
    host.insert_context(id, ctx.id(), Rc::new(value));
    tracing::debug!(
        component = %id,
        context = std::any::type_name::<T>(),
        "context provided"
    );
    Ok(())
}

/// Read the value from the nearest enclosing provider of `ctx`.
///
/// Returns `None` when no ancestor provides it or when called outside a
/// render.
pub fn use_context<T: Clone + 'static>(ctx: &Context<T>) -> Option<T> {
    try_use_context(ctx).ok()
}

/// Like [`use_context`], reporting why no value was found.
pub fn try_use_context<T: Clone + 'static>(ctx: &Context<T>) -> Result<T> {
    let (host, id) = host::current().ok_or(ModelError::OutsideRender)?;
    host.find_context(id, ctx.id())
        .and_then(|value| value.downcast_ref::<T>().cloned())
        .ok_or(ModelError::MissingProvider {
            context: std::any::type_name::<T>(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::Host;
    use std::cell::RefCell;

    #[test]
    fn outside_render() {
        let ctx: Context<i32> = Context::new();
        assert_eq!(provide_context(&ctx, 1), Err(ModelError::OutsideRender));
        assert_eq!(use_context(&ctx), None);
        assert_eq!(try_use_context(&ctx), Err(ModelError::OutsideRender));
    }

    #[test]
    fn nearest_provider_wins() {
        let ctx: Context<i32> = Context::new();
        let host = Host::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let outer = host.mount(None, move || provide_context(&ctx, 1)).unwrap();
        let inner = host
            .mount(Some(outer), move || provide_context(&ctx, 2))
            .unwrap();

        for parent in [outer, inner] {
            let seen = Rc::clone(&seen);
            host.mount(Some(parent), move || {
                seen.borrow_mut().push(try_use_context(&ctx)?);
                Ok(())
            })
            .unwrap();
        }

        assert_eq!(*seen.borrow(), vec![1, 2]);
    }

    #[test]
    fn missing_provider() {
        let ctx: Context<String> = Context::new();
        let other: Context<String> = Context::new();
        let host = Host::new();

        let root = host
            .mount(None, move || provide_context(&other, "x".to_string()))
            .unwrap();
        let err = host
            .mount(Some(root), move || try_use_context(&ctx).map(drop))
            .unwrap_err();
        assert_eq!(
            err,
            ModelError::MissingProvider {
                context: std::any::type_name::<String>()
            }
        );
    }
}
