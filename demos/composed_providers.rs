//! Two independent view models provided to one subtree through a composed provider

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use modelkit::{compose_providers, create_model, Host, Model, ModelEvents, Provider};
use tracing_subscriber::EnvFilter;

type Theme = Model<BTreeMap<&'static str, String>>;

#[derive(Clone, Debug)]
enum SessionEvent {
    Login(String),
    Logout,
}

impl ModelEvents for SessionEvent {
    type Name = &'static str;

    fn name(&self) -> &'static str {
        match self {
            SessionEvent::Login(_) => "login",
            SessionEvent::Logout => "logout",
        }
    }
}

type Session = Model<BTreeMap<&'static str, Option<String>>, SessionEvent>;

fn session(initial: BTreeMap<&'static str, Option<String>>) -> Session {
    let model = Session::new(initial);
    for name in ["login", "logout"] {
        model
            .subscribe_to_event(name, {
                let model = model.clone();
                move |event: &SessionEvent| match event {
                    SessionEvent::Login(user) => model.set_value("user", Some(user.clone())),
                    SessionEvent::Logout => model.set_value("user", None),
                }
            })
            .detach();
    }
    model
}

fn main() -> modelkit::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();

    println!("=== Composed Providers ===\n");

    let theme = create_model(Theme::new);
    let session = create_model(session);

    println!("1. Composing the theme and session providers");
    let providers = compose_providers([
        Rc::new(theme.provider_with_state(BTreeMap::from([("accent", "teal".to_string())])))
            as Rc<dyn Provider>,
        Rc::new(session.provider_with_state(BTreeMap::from([("user", None)]))),
    ]);
    println!("   {} providers", providers.len());

    let host = Host::new();
    println!("\n2. Mounting a header under both providers");
    let header = providers.mount(&host, None, {
        let theme = theme.clone();
        let session = session.clone();
        move || {
            let (accent, _) = theme.use_state("accent")?;
            let (user, _) = session.use_state("user")?;
            let user = user.flatten().unwrap_or_else(|| "guest".to_string());
            println!(
                "   [Header] Hello, {} ({})",
                user,
                accent.unwrap_or_default()
            );
            session.use_event("logout", |_| println!("   [Header] session ended"))?;
            Ok(())
        }
    })?;

    let controls = Rc::new(RefCell::new(None));
    host.mount(Some(header), {
        let theme = theme.clone();
        let session = session.clone();
        let controls = Rc::clone(&controls);
        move || {
            let (_, set_accent) = theme.use_state("accent")?;
            *controls.borrow_mut() = Some((session.use_dispatcher()?, set_accent));
            Ok(())
        }
    })?;
    let controls = controls.borrow().clone();
    let Some((dispatch, set_accent)) = controls else {
        return Ok(());
    };

    println!("\n3. Logging in");
    dispatch.dispatch(SessionEvent::Login("ada".to_string()));
    host.flush()?;

    println!("\n4. Changing the accent");
    set_accent.update(|accent| match accent.as_deref() {
        Some("teal") => "amber".to_string(),
        _ => "teal".to_string(),
    });
    host.flush()?;

    println!("\n5. Logging out");
    dispatch.dispatch(SessionEvent::Logout);
    host.flush()?;

    println!("\n6. Header rendered {:?} times", host.render_count(header));
    println!("\n✓ Composed providers complete!");
    Ok(())
}
