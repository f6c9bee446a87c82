use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::rc::{Rc, Weak};

use super::context::ContextId;
use crate::error::{ModelError, Result};

/// Identifies a mounted component within its [`Host`].
///
/// Ids increase with mount order, so a parent always sorts before its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ComponentId(u64);

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

type RenderFn = Box<dyn FnMut() -> Result<()>>;

struct ComponentNode {
    parent: Option<ComponentId>,
    children: Vec<ComponentId>,
    // Taken out while the component renders.
    render: Option<RenderFn>,
    hooks: Vec<Rc<dyn Any>>,
    cleanups: Vec<Box<dyn FnOnce()>>,
    contexts: HashMap<ContextId, Rc<dyn Any>>,
    renders: usize,
}

impl ComponentNode {
    fn new(parent: Option<ComponentId>, render: RenderFn) -> Self {
        Self {
            parent,
            children: Vec::new(),
            render: Some(render),
            hooks: Vec::new(),
            cleanups: Vec::new(),
            contexts: HashMap::new(),
            renders: 0,
        }
    }
}

pub(crate) struct HostInner {
    next_id: Cell<u64>,
    components: RefCell<BTreeMap<ComponentId, ComponentNode>>,
    dirty: RefCell<BTreeSet<ComponentId>>,
}

impl HostInner {
    /// Existing hook slot at `index`, if the component has rendered past it.
    pub(crate) fn hook(&self, id: ComponentId, index: usize) -> Option<Rc<dyn Any>> {
        self.components.borrow().get(&id)?.hooks.get(index).cloned()
    }

    pub(crate) fn push_hook(&self, id: ComponentId, slot: Rc<dyn Any>) {
        if let Some(node) = self.components.borrow_mut().get_mut(&id) {
            node.hooks.push(slot);
        }
    }

    pub(crate) fn push_cleanup(&self, id: ComponentId, cleanup: Box<dyn FnOnce()>) {
        if let Some(node) = self.components.borrow_mut().get_mut(&id) {
            node.cleanups.push(cleanup);
        }
    }

    pub(crate) fn insert_context(&self, id: ComponentId, context: ContextId, value: Rc<dyn Any>) {
        if let Some(node) = self.components.borrow_mut().get_mut(&id) {
            node.contexts.insert(context, value);
        }
    }

    /// Walk from `id` up through its ancestors to the nearest value for `context`.
    pub(crate) fn find_context(&self, id: ComponentId, context: ContextId) -> Option<Rc<dyn Any>> {
        let components = self.components.borrow();
        let mut current = Some(id);
        while let Some(id) = current {
            let node = components.get(&id)?;
            if let Some(value) = node.contexts.get(&context) {
                return Some(Rc::clone(value));
            }
            current = node.parent;
        }
        None
    }

    fn mark_dirty(&self, id: ComponentId) -> bool {
        if !self.components.borrow().contains_key(&id) {
            return false;
        }
        self.dirty.borrow_mut().insert(id)
    }
}

/// The component currently rendering on this thread.
pub(crate) struct Frame {
    host: Rc<HostInner>,
    id: ComponentId,
    cursor: usize,
}

// Thread-local stack of rendering components; nested mounts push on top.
thread_local! {
    static RENDER_STACK: RefCell<Vec<Frame>> = const { RefCell::new(Vec::new()) };
}

/// Host and component of the active render.
pub(crate) fn current() -> Option<(Rc<HostInner>, ComponentId)> {
    RENDER_STACK.with(|stack| {
        stack
            .borrow()
            .last()
            .map(|frame| (Rc::clone(&frame.host), frame.id))
    })
}

/// Like [`current`], also claiming the next hook slot index.
pub(crate) fn next_hook() -> Option<(Rc<HostInner>, ComponentId, usize)> {
    RENDER_STACK.with(|stack| {
        let mut stack = stack.borrow_mut();
        let frame = stack.last_mut()?;
        let index = frame.cursor;
        frame.cursor += 1;
        Some((Rc::clone(&frame.host), frame.id, index))
    })
}

/// Run `f` with `frame` as the active render.
fn with_frame<F, R>(frame: Frame, f: F) -> R
where
    F: FnOnce() -> R,
{
    RENDER_STACK.with(|stack| {
        stack.borrow_mut().push(frame);
    });

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(f));

    RENDER_STACK.with(|stack| {
        stack.borrow_mut().pop();
    });

    match result {
        Ok(r) => r,
        Err(e) => std::panic::resume_unwind(e),
    }
}

/// Schedules a re-render of one component.
///
/// This is the host's "mark dirty" primitive; the component re-renders on the
/// next [`Host::flush`]. Triggers outliving their component do nothing.
#[derive(Clone)]
pub struct Trigger {
    host: Weak<HostInner>,
    id: ComponentId,
}

impl Trigger {
    pub(crate) fn new(host: &Rc<HostInner>, id: ComponentId) -> Self {
        Self {
            host: Rc::downgrade(host),
            id,
        }
    }

    /// Mark the component dirty.
    pub fn notify(&self) {
        if let Some(host) = self.host.upgrade() {
            if host.mark_dirty(self.id) {
                tracing::trace!(component = %self.id, "component marked dirty");
            }
        }
    }

    pub fn component(&self) -> ComponentId {
        self.id
    }
}

impl fmt::Debug for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Trigger").field("component", &self.id).finish()
    }
}

/// A single-threaded component tree.
///
/// The host owns every mounted component's render function, hook slots,
/// unmount cleanups and provided contexts. Components render once when
/// mounted and again on [`Host::flush`] after something marked them dirty.
///
/// # Examples
///
/// ```
/// use modelkit::{use_model_state, Host, Model};
/// use std::collections::HashMap;
///
/// let model: Model<HashMap<&str, i32>> = Model::new(HashMap::from([("count", 0)]));
/// let host = Host::new();
///
/// let id = host
///     .mount(None, {
///         let model = model.clone();
///         move || {
///             let (_count, _set_count) = use_model_state(&model, "count")?;
///             Ok(())
///         }
///     })
///     .unwrap();
///
/// model.set_value("count", 1);
/// assert!(host.is_dirty(id));
/// assert_eq!(host.flush().unwrap(), 1);
/// assert_eq!(host.render_count(id), Some(2));
/// ```
#[derive(Clone)]
pub struct Host {
    inner: Rc<HostInner>,
}

impl Host {
    /// Upper bound on re-render passes in one [`Host::flush`].
    pub const MAX_FLUSH_PASSES: usize = 100;

    pub fn new() -> Self {
        Self {
            inner: Rc::new(HostInner {
                next_id: Cell::new(0),
                components: RefCell::new(BTreeMap::new()),
                dirty: RefCell::new(BTreeSet::new()),
            }),
        }
    }

    /// Mount a component under `parent` (or as a root) and render it once.
    ///
    /// If the first render fails the component is unmounted again and the
    /// error returned.
    pub fn mount<F>(&self, parent: Option<ComponentId>, render: F) -> Result<ComponentId>
    where
        F: FnMut() -> Result<()> + 'static,
    {
        let id = ComponentId(self.inner.next_id.get());
        {
            let mut components = self.inner.components.borrow_mut();
            if let Some(parent) = parent {
                components
                    .get_mut(&parent)
                    .ok_or(ModelError::ComponentNotFound { id: parent })?
                    .children
                    .push(id);
            }
            components.insert(id, ComponentNode::new(parent, Box::new(render)));
        }
        self.inner.next_id.set(id.0 + 1);
        tracing::debug!(component = %id, parent = ?parent, "mounting component");

        if let Err(err) = self.render(id) {
            self.unmount(id);
            return Err(err);
        }
        Ok(id)
    }

    /// Unmount a component and its descendants, deepest first.
    ///
    /// Cleanups run in registration order, then hook slots are dropped.
    /// Unknown ids are ignored.
    pub fn unmount(&self, id: ComponentId) {
        let children = match self.inner.components.borrow().get(&id) {
            Some(node) => node.children.clone(),
            None => return,
        };
        for child in children {
            self.unmount(child);
        }

        let Some(mut node) = self.inner.components.borrow_mut().remove(&id) else {
            return;
        };
        if let Some(parent) = node.parent {
            if let Some(parent) = self.inner.components.borrow_mut().get_mut(&parent) {
                parent.children.retain(|child| *child != id);
            }
        }
        self.inner.dirty.borrow_mut().remove(&id);

        let cleanups = std::mem::take(&mut node.cleanups);
        tracing::debug!(component = %id, cleanups = cleanups.len(), "unmounting component");
        for cleanup in cleanups {
            cleanup();
        }
    }

    /// Re-render dirty components, parents before children, until none are
    /// left. Returns the number of renders performed.
    pub fn flush(&self) -> Result<usize> {
        let mut rendered = 0;
        for _ in 0..Self::MAX_FLUSH_PASSES {
            let batch = std::mem::take(&mut *self.inner.dirty.borrow_mut());
            if batch.is_empty() {
                tracing::debug!(rendered, "flush complete");
                return Ok(rendered);
            }
            let mut batch = batch.into_iter();
            while let Some(id) = batch.next() {
                if !self.is_mounted(id) {
                    continue;
                }
                if let Err(err) = self.render(id) {
                    // Keep the rest of the pass scheduled.
                    self.inner.dirty.borrow_mut().extend(batch);
                    return Err(err);
                }
                rendered += 1;
            }
        }
        if self.inner.dirty.borrow().is_empty() {
            return Ok(rendered);
        }
        Err(ModelError::RenderLoop {
            passes: Self::MAX_FLUSH_PASSES,
        })
    }

    /// Whether `id` is still in the tree.
    pub fn is_mounted(&self, id: ComponentId) -> bool {
        self.inner.components.borrow().contains_key(&id)
    }

    /// Whether `id` will re-render on the next [`Host::flush`].
    pub fn is_dirty(&self, id: ComponentId) -> bool {
        self.inner.dirty.borrow().contains(&id)
    }

    /// How many times a mounted component has rendered.
    pub fn render_count(&self, id: ComponentId) -> Option<usize> {
        self.inner.components.borrow().get(&id).map(|node| node.renders)
    }

    pub fn children(&self, id: ComponentId) -> Vec<ComponentId> {
        self.inner
            .components
            .borrow()
            .get(&id)
            .map(|node| node.children.clone())
            .unwrap_or_default()
    }

    pub fn parent(&self, id: ComponentId) -> Option<ComponentId> {
        self.inner.components.borrow().get(&id)?.parent
    }

    /// Number of mounted components.
    pub fn len(&self) -> usize {
        self.inner.components.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A trigger for `id`, for scheduling re-renders from outside a render.
    pub fn trigger(&self, id: ComponentId) -> Trigger {
        Trigger::new(&self.inner, id)
    }

    fn render(&self, id: ComponentId) -> Result<()> {
        let render = {
            let mut components = self.inner.components.borrow_mut();
            let node = components
                .get_mut(&id)
                .ok_or(ModelError::ComponentNotFound { id })?;
            node.render.take()
        };
        // Already on the render stack.
        let Some(mut render) = render else {
            tracing::trace!(component = %id, "skipping re-entrant render");
            return Ok(());
        };
        self.inner.dirty.borrow_mut().remove(&id);

        let frame = Frame {
            host: Rc::clone(&self.inner),
            id,
            cursor: 0,
        };
        let result = with_frame(frame, || render());

        if let Some(node) = self.inner.components.borrow_mut().get_mut(&id) {
            node.render = Some(render);
            node.renders += 1;
        }
        tracing::trace!(component = %id, ok = result.is_ok(), "rendered component");
        result
    }
}

impl Default for Host {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Host")
            .field("components", &self.len())
            .field("dirty", &self.inner.dirty.borrow().len())
            .finish()
    }
}
