//! Complete counter application demonstrating all features together

use std::cell::RefCell;
use std::rc::Rc;

use modelkit::{create_model, Host, Model, ModelEvents, ModelState, ViewModel};
use tracing_subscriber::EnvFilter;

#[derive(Clone, Debug)]
struct CounterState {
    count: i32,
    step: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum Field {
    Count,
    Step,
}

impl ModelState for CounterState {
    type Key = Field;
    type Value = i32;

    fn field(&self, key: &Field) -> Option<i32> {
        Some(match key {
            Field::Count => self.count,
            Field::Step => self.step,
        })
    }

    fn set_field(&mut self, key: Field, value: i32) {
        match key {
            Field::Count => self.count = value,
            Field::Step => self.step = value,
        }
    }

    fn fields(&self) -> Vec<(Field, i32)> {
        vec![(Field::Count, self.count), (Field::Step, self.step)]
    }
}

#[derive(Clone, Debug)]
enum CounterEvent {
    Increment,
    Decrement,
    Reset,
}

impl ModelEvents for CounterEvent {
    type Name = &'static str;

    fn name(&self) -> &'static str {
        match self {
            CounterEvent::Increment => "increment",
            CounterEvent::Decrement => "decrement",
            CounterEvent::Reset => "reset",
        }
    }
}

/// Counter view model: reacts to its own events by updating the count.
#[derive(Clone)]
struct Counter {
    model: Model<CounterState, CounterEvent>,
    history: Rc<RefCell<Vec<i32>>>,
}

impl Counter {
    fn new(initial: CounterState) -> Self {
        let model = Model::new(initial);
        let history = Rc::new(RefCell::new(vec![model.state().count]));

        for name in ["increment", "decrement", "reset"] {
            model
                .subscribe_to_event(name, {
                    let model = model.clone();
                    move |event: &CounterEvent| {
                        let CounterState { count, step } = model.state();
                        match event {
                            CounterEvent::Increment => model.set_value(Field::Count, count + step),
                            CounterEvent::Decrement => model.set_value(Field::Count, count - step),
                            CounterEvent::Reset => model.reset(),
                        }
                    }
                })
                .detach();
        }
        model
            .subscribe_to_key(Field::Count, {
                let history = Rc::clone(&history);
                move |count: &i32| history.borrow_mut().push(*count)
            })
            .detach();

        Self { model, history }
    }
}

impl ViewModel for Counter {
    type State = CounterState;
    type Events = CounterEvent;

    fn model(&self) -> &Model<CounterState, CounterEvent> {
        &self.model
    }
}

fn main() -> modelkit::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();

    println!("=== Complete Counter Application ===\n");

    println!("1. Creating the counter kit and mounting its provider");
    let counter = create_model(Counter::new);
    let host = Host::new();
    let vm = Rc::new(RefCell::new(None));
    let root = host.mount(
        None,
        counter.with_provider(CounterState { count: 0, step: 1 }, {
            let vm = Rc::clone(&vm);
            move |counter: &Counter| {
                vm.borrow_mut().get_or_insert_with(|| counter.clone());
                Ok(())
            }
        }),
    )?;

    println!("\n2. Mounting a display component");
    let display = host.mount(Some(root), {
        let counter = counter.clone();
        move || {
            let (count, _) = counter.use_state(Field::Count)?;
            let (step, _) = counter.use_state(Field::Step)?;
            let count = count.unwrap_or_default();
            println!(
                "   [Display] Count: {} | Step: {} | Positive: {} | Even: {}",
                count,
                step.unwrap_or_default(),
                count > 0,
                count % 2 == 0
            );
            Ok(())
        }
    })?;

    println!("\n3. Mounting a controls component");
    let controls = Rc::new(RefCell::new(None));
    host.mount(Some(root), {
        let counter = counter.clone();
        let controls = Rc::clone(&controls);
        move || {
            let dispatcher = counter.use_dispatcher()?;
            let (_, set_step) = counter.use_state(Field::Step)?;
            *controls.borrow_mut() = Some((dispatcher, set_step));
            Ok(())
        }
    })?;
    let controls = controls.borrow().clone();
    let Some((dispatch, set_step)) = controls else {
        return Ok(());
    };

    println!("\n4. Incrementing...");
    for _ in 0..3 {
        dispatch.dispatch(CounterEvent::Increment);
        host.flush()?;
    }

    println!("\n5. Changing step size to 5");
    set_step.set(5);
    host.flush()?;

    println!("\n6. Incrementing with new step...");
    dispatch.dispatch(CounterEvent::Increment);
    host.flush()?;

    println!("\n7. Decrementing...");
    for _ in 0..3 {
        dispatch.dispatch(CounterEvent::Decrement);
        host.flush()?;
    }

    if let Some(vm) = vm.borrow().as_ref() {
        println!("\n8. History:");
        println!("   {:?}", vm.history.borrow());
    }

    println!("\n9. Resetting...");
    dispatch.dispatch(CounterEvent::Reset);
    host.flush()?;

    println!(
        "\n10. Display rendered {} times",
        host.render_count(display).unwrap_or_default()
    );

    host.unmount(root);
    println!("\n✓ Counter application complete!");
    Ok(())
}
