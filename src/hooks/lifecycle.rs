use std::any::Any;
use std::cell::Cell;
use std::rc::Rc;

use crate::error::{ModelError, Result};
use crate::model::Subscription;
use crate::runtime::{self, Trigger};

/// Per-component storage that survives re-renders.
///
/// Slots are matched by call order, so hooks must be called in the same
/// order on every render. `init` runs on the first render only and must not
/// call other hooks.
///
/// # Errors
///
/// [`ModelError::OutsideRender`] outside a render, and
/// [`ModelError::HookMismatch`] if the slot held a different type last render.
pub fn use_hook<T, F>(init: F) -> Result<Rc<T>>
where
    T: 'static,
    F: FnOnce() -> T,
{
    let (host, id, index) = runtime::next_hook().ok_or(ModelError::OutsideRender)?;
    if let Some(slot) = host.hook(id, index) {
        return slot
            .downcast::<T>()
            .map_err(|_| ModelError::HookMismatch { index });
    }
    let slot = Rc::new(init());
    host.push_hook(id, Rc::clone(&slot) as Rc<dyn Any>);
    Ok(slot)
}

/// The re-render trigger of the rendering component.
pub fn use_trigger() -> Result<Trigger> {
    let (host, id) = runtime::current().ok_or(ModelError::OutsideRender)?;
    Ok(Trigger::new(&host, id))
}

/// Run `cleanup` once, when the rendering component unmounts.
///
/// Every call registers another cleanup; call it from first-render code.
pub fn on_unmount<F>(cleanup: F) -> Result<()>
where
    F: FnOnce() + 'static,
{
    let (host, id) = runtime::current().ok_or(ModelError::OutsideRender)?;
    host.push_cleanup(id, Box::new(cleanup));
    Ok(())
}

/// Subscribe on the first render and unsubscribe on unmount.
pub(crate) fn use_subscription<F>(subscribe: F) -> Result<()>
where
    F: FnOnce() -> Subscription,
{
    let mounted = use_hook(|| Cell::new(false))?;
    if !mounted.get() {
        mounted.set(true);
        let subscription = subscribe();
        on_unmount(move || subscription.unsubscribe())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::Host;
    use std::cell::RefCell;

    #[test]
    fn hooks_outside_render() {
        assert_eq!(use_hook(|| 0).unwrap_err(), ModelError::OutsideRender);
        assert_eq!(use_trigger().unwrap_err(), ModelError::OutsideRender);
        assert_eq!(on_unmount(|| {}).unwrap_err(), ModelError::OutsideRender);
    }

    #[test]
    fn slot_survives_rerender() {
        let host = Host::new();
        let inits = Rc::new(Cell::new(0));
        let values = Rc::new(RefCell::new(Vec::new()));

        let id = host
            .mount(None, {
                let inits = Rc::clone(&inits);
                let values = Rc::clone(&values);
                move || {
                    let counter = use_hook(|| {
                        inits.set(inits.get() + 1);
                        Cell::new(0)
                    })?;
                    counter.set(counter.get() + 1);
                    values.borrow_mut().push(counter.get());
                    Ok(())
                }
            })
            .unwrap();

        host.trigger(id).notify();
        host.flush().unwrap();

        assert_eq!(inits.get(), 1);
        assert_eq!(*values.borrow(), vec![1, 2]);
    }

    #[test]
    fn slot_type_change_is_rejected() {
        let host = Host::new();
        let first = Rc::new(Cell::new(true));

        let id = host
            .mount(None, {
                let first = Rc::clone(&first);
                move || {
                    if first.replace(false) {
                        use_hook(|| 1u8)?;
                    } else {
                        use_hook(|| "text")?;
                    }
                    Ok(())
                }
            })
            .unwrap();

        host.trigger(id).notify();
        assert_eq!(
            host.flush().unwrap_err(),
            ModelError::HookMismatch { index: 0 }
        );
    }

    #[test]
    fn cleanup_runs_on_unmount() {
        let host = Host::new();
        let cleaned = Rc::new(Cell::new(0));

        let id = host
            .mount(None, {
                let cleaned = Rc::clone(&cleaned);
                move || {
                    let registered = use_hook(|| Cell::new(false))?;
                    if !registered.replace(true) {
                        let cleaned = Rc::clone(&cleaned);
                        on_unmount(move || cleaned.set(cleaned.get() + 1))?;
                    }
                    Ok(())
                }
            })
            .unwrap();

        host.trigger(id).notify();
        host.flush().unwrap();
        assert_eq!(cleaned.get(), 0);

        host.unmount(id);
        assert_eq!(cleaned.get(), 1);
    }
}
