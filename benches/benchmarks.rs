use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::collections::HashMap;
use std::hint::black_box;

use modelkit::{Model, ModelEvents, ModelOptions, NotifyMode};

type Counter = Model<HashMap<&'static str, usize>>;

fn counter() -> Counter {
    Model::new(HashMap::from([("count", 0), ("step", 1)]))
}

#[derive(Clone)]
enum Ping {
    Ping(usize),
}

impl ModelEvents for Ping {
    type Name = &'static str;

    fn name(&self) -> &'static str {
        "ping"
    }
}

fn model_creation_benchmark(c: &mut Criterion) {
    c.bench_function("model_creation", |b| {
        b.iter(|| {
            let model: Counter = Model::new(black_box(HashMap::from([("count", 0)])));
            model
        });
    });
}

fn model_read_benchmark(c: &mut Criterion) {
    let model = counter();

    c.bench_function("model_read", |b| {
        b.iter(|| {
            black_box(model.get(&"count"));
        });
    });
}

fn set_value_benchmark(c: &mut Criterion) {
    let model = counter();

    c.bench_function("set_value", |b| {
        let mut i = 0;
        b.iter(|| {
            model.set_value("count", black_box(i));
            i += 1;
        });
    });
}

fn set_state_benchmark(c: &mut Criterion) {
    let model = counter();

    c.bench_function("set_state", |b| {
        let mut i = 0;
        b.iter(|| {
            model.set_state([("count", black_box(i)), ("step", black_box(i + 1))]);
            i += 1;
        });
    });
}

fn fan_out_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("fan_out");

    for subscriber_count in [1, 10, 100].iter() {
        let model = counter();
        let subscriptions: Vec<_> = (0..*subscriber_count)
            .map(|_| {
                model.subscribe_to_key("count", |v: &usize| {
                    black_box(v);
                })
            })
            .collect();

        group.bench_with_input(
            BenchmarkId::from_parameter(subscriber_count),
            subscriber_count,
            |b, _| {
                let mut i = 0;
                b.iter(|| {
                    model.set_value("count", black_box(i));
                    i += 1;
                });
            },
        );
        drop(subscriptions);
    }
    group.finish();
}

fn nested_notify_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("nested_notify");

    for options in [
        ModelOptions::default(),
        ModelOptions::default().notify(NotifyMode::Immediate),
    ] {
        let model: Counter = Model::with_options(HashMap::from([("count", 0)]), options.clone());
        let _chain = model.subscribe_to_key("count", {
            let model = model.clone();
            move |v: &usize| {
                if v % 8 != 0 {
                    model.set_value("count", v + 1);
                }
            }
        });

        let id = BenchmarkId::from_parameter(format!("{:?}", options.notify));
        group.bench_function(id, |b| {
            b.iter(|| {
                model.set_value("count", black_box(1));
            });
        });
    }
    group.finish();
}

fn dispatch_benchmark(c: &mut Criterion) {
    let model: Model<HashMap<&'static str, usize>, Ping> = Model::new(HashMap::new());
    let _listener = model.subscribe_to_event("ping", |Ping::Ping(n): &Ping| {
        black_box(n);
    });

    c.bench_function("dispatch_event", |b| {
        let mut i = 0;
        b.iter(|| {
            model.dispatch_event(Ping::Ping(black_box(i)));
            i += 1;
        });
    });
}

criterion_group!(
    benches,
    model_creation_benchmark,
    model_read_benchmark,
    set_value_benchmark,
    set_state_benchmark,
    fan_out_benchmark,
    nested_notify_benchmark,
    dispatch_benchmark,
);
criterion_main!(benches);
