use std::fmt;
use std::rc::Rc;

use super::context::{provide_context, Context};
use super::host::{ComponentId, Host};
use crate::error::Result;

/// Something that installs context values while a component renders.
pub trait Provider {
    fn provide(&self) -> Result<()>;
}

/// Provides one value under one context.
pub struct ContextProvider<T> {
    ctx: Context<T>,
    value: T,
}

impl<T: Clone + 'static> ContextProvider<T> {
    /// Provide `value` under `ctx`.
    pub fn new(ctx: Context<T>, value: T) -> Self {
        Self { ctx, value }
    }

    /// The context this provider installs.
    pub fn context(&self) -> &Context<T> {
        &self.ctx
    }

    /// The value handed to consumers.
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Mount a provider component under `parent` with `child` beneath it.
    pub fn mount<F>(self, host: &Host, parent: Option<ComponentId>, child: F) -> Result<ComponentId>
    where
        F: FnMut() -> Result<()> + 'static,
    {
        compose_providers([Rc::new(self) as Rc<dyn Provider>]).mount(host, parent, child)
    }
}

impl<T: Clone + 'static> Provider for ContextProvider<T> {
    fn provide(&self) -> Result<()> {
        provide_context(&self.ctx, self.value.clone())
    }
}

impl<T> fmt::Debug for ContextProvider<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextProvider")
            .field("ctx", &self.ctx)
            .finish_non_exhaustive()
    }
}

/// An ordered list of providers acting as one.
///
/// Built by [`compose_providers`]. The first provider is the outermost.
#[derive(Clone, Default)]
pub struct ComposedProvider {
    providers: Vec<Rc<dyn Provider>>,
}

/// Combine providers into one, preserving nesting order.
///
/// # Examples
///
/// ```
/// use modelkit::{compose_providers, try_use_context, Context, ContextProvider, Host, Provider};
/// use std::rc::Rc;
///
/// let name: Context<&'static str> = Context::new();
/// let level: Context<u8> = Context::new();
///
/// let providers = compose_providers([
///     Rc::new(ContextProvider::new(name, "outer")) as Rc<dyn Provider>,
///     Rc::new(ContextProvider::new(level, 3)),
/// ]);
///
/// let host = Host::new();
/// providers
///     .mount(&host, None, move || {
///         assert_eq!(try_use_context(&name)?, "outer");
///         assert_eq!(try_use_context(&level)?, 3);
///         Ok(())
///     })
///     .unwrap();
/// assert_eq!(host.len(), 3);
/// ```
pub fn compose_providers<I>(providers: I) -> ComposedProvider
where
    I: IntoIterator<Item = Rc<dyn Provider>>,
{
    ComposedProvider {
        providers: providers.into_iter().collect(),
    }
}

impl ComposedProvider {
    /// Number of composed providers.
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Mount one component per provider, each nested in the previous, then
    /// mount `child` under the innermost. Returns the child's id.
    ///
    /// With no providers the child is mounted directly under `parent`. If any
    /// mount fails, everything this call mounted is unmounted again.
    pub fn mount<F>(&self, host: &Host, parent: Option<ComponentId>, child: F) -> Result<ComponentId>
    where
        F: FnMut() -> Result<()> + 'static,
    {
        let mut outermost = None;
        let mut current = parent;
        for provider in &self.providers {
            let provider = Rc::clone(provider);
            match host.mount(current, move || provider.provide()) {
                Ok(id) => {
                    outermost.get_or_insert(id);
                    current = Some(id);
                }
                Err(err) => {
                    if let Some(id) = outermost {
                        host.unmount(id);
                    }
                    return Err(err);
                }
            }
        }
        host.mount(current, child).inspect_err(|_| {
            if let Some(id) = outermost {
                host.unmount(id);
            }
        })
    }
}

impl Provider for ComposedProvider {
    /// Install every provider in order in the current component; later
    /// providers shadow earlier ones for the same context.
    fn provide(&self) -> Result<()> {
        for provider in &self.providers {
            provider.provide()?;
        }
        Ok(())
    }
}

impl fmt::Debug for ComposedProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComposedProvider")
            .field("providers", &self.providers.len())
            .finish()
    }
}
