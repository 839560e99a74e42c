//! Benchmarks for context restore and capture.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::sync::Arc;
use twitter_agentkit::actions::{action_fn, ActionArgs};
use twitter_agentkit::client::ClientHandle;
use twitter_agentkit::context::{ActionContext, ContextSnapshot};
use twitter_agentkit::testing::{test_wrapper, InMemoryTwitterClient};

fn snapshot_with(client: &ClientHandle, variables: usize) -> ContextSnapshot {
    let initial = ContextSnapshot::initial(Arc::clone(client));
    let Ok(mut ctx) = ActionContext::restore(&initial, client) else {
        return initial;
    };
    for i in 0..variables {
        ctx.set_value(format!("var-{i}"), serde_json::json!({ "index": i, "payload": "x" }));
    }
    ctx.capture(&initial)
}

fn restore_capture_benchmark(c: &mut Criterion) {
    let client: ClientHandle = Arc::new(InMemoryTwitterClient::new());
    let mut group = c.benchmark_group("restore_capture");

    for variables in [0, 8, 64] {
        let snapshot = snapshot_with(&client, variables);
        group.bench_with_input(BenchmarkId::from_parameter(variables), &snapshot, |b, snapshot| {
            b.iter(|| {
                if let Ok(ctx) = ActionContext::restore(black_box(snapshot), &client) {
                    black_box(ctx.capture(snapshot));
                }
            });
        });
    }
    group.finish();
}

fn execute_benchmark(c: &mut Criterion) {
    let Ok(runtime) = tokio::runtime::Runtime::new() else {
        return;
    };
    let (wrapper, _client) = runtime.block_on(async { test_wrapper() });
    let noop = action_fn("noop", "Does nothing", |_, _| Ok(String::new()));

    c.bench_function("execute_noop", |b| {
        b.iter(|| runtime.block_on(wrapper.execute(&noop, ActionArgs::new())));
    });
}

criterion_group!(benches, restore_capture_benchmark, execute_benchmark);
criterion_main!(benches);
