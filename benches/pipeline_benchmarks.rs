//! Criterion benchmarks for rust_log_pipeline

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use rust_log_pipeline::prelude::*;
use rust_log_pipeline::render_template;
use std::io;
use std::sync::Arc;
use std::time::Duration;

fn quiet() -> Diagnostics {
    Diagnostics::callback_only(Arc::new(|_: DiagnosticLevel, _: &str| {}))
}

// ============================================================================
// Template Rendering Benchmarks
// ============================================================================

fn bench_template_rendering(c: &mut Criterion) {
    let mut group = c.benchmark_group("template_rendering");
    group.throughput(Throughput::Elements(1));

    let no_args: Vec<ArgValue> = Vec::new();
    group.bench_function("plain", |b| {
        b.iter(|| render_template(black_box("Server started"), black_box(no_args.as_slice())));
    });

    let positional = vec![ArgValue::from(42), ArgValue::from("login")];
    group.bench_function("positional", |b| {
        b.iter(|| render_template(black_box("User {0} performed {1}"), black_box(positional.as_slice())));
    });

    let named = vec![ArgValue::from(
        NamedArgs::new()
            .with("UserId", 42)
            .with("Action", "login")
            .with("Extra", true),
    )];
    group.bench_function("named_with_extras", |b| {
        b.iter(|| render_template(black_box("User {UserId} performed {Action}"), black_box(named.as_slice())));
    });

    group.finish();
}

fn bench_formatter(c: &mut Criterion) {
    let mut group = c.benchmark_group("formatter");
    group.throughput(Throughput::Elements(1));

    let formatter = TemplateFormatter::new();
    let event = LogEvent::new(
        LogLevel::Error,
        "App.Orders",
        "Order {0} failed",
        vec![1001.into()],
    )
    .with_caller(CallerInfo::new(Some("orders::submit"), Some("src/orders.rs"), Some(42)))
    .with_exception(ExceptionInfo::new("timeout", "timeout\n  caused by: connection reset"));

    group.bench_function("console_line", |b| {
        b.iter(|| black_box(formatter.render(black_box(&event), false)));
    });

    group.bench_function("file_line", |b| {
        b.iter(|| black_box(formatter.render(black_box(&event), true)));
    });

    group.finish();
}

// ============================================================================
// Dispatch Benchmarks
// ============================================================================

fn bench_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch");
    group.throughput(Throughput::Elements(1));

    let filtered = Logger::builder()
        .min_level(LogLevel::Error)
        .target(MemoryTarget::new())
        .build();
    group.bench_function("below_min_level", |b| {
        b.iter(|| filtered.debug(black_box("Debug {0}"), vec![1.into()]));
    });

    let memory = Logger::builder().target(MemoryTarget::new()).build();
    group.bench_function("memory_target", |b| {
        b.iter(|| memory.info(black_box("Info {0}"), vec![1.into()]));
    });

    let console = Logger::builder()
        .target(
            ConsoleTarget::builder()
                .use_colors(false)
                .writer(Box::new(io::sink()))
                .diagnostics(quiet())
                .build()
                .expect("Failed to create console target"),
        )
        .build();
    group.bench_function("console_target", |b| {
        b.iter(|| console.info(black_box("Info {0}"), vec![1.into()]));
    });

    let with_caller = Logger::builder()
        .caller_info(CallerInfoPolicy::new(LogLevel::Debug, true))
        .target(MemoryTarget::new())
        .build();
    group.bench_function("caller_capture", |b| {
        b.iter(|| with_caller.info(black_box("Info {0}"), vec![1.into()]));
    });

    group.finish();
    console.shutdown(Duration::from_secs(5));
}

fn bench_file_target(c: &mut Criterion) {
    let mut group = c.benchmark_group("file_target");
    group.throughput(Throughput::Elements(1));

    let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let logger = Logger::builder()
        .target(
            FileTarget::new(temp_dir.path().join("bench.log"))
                .expect("Failed to create file target"),
        )
        .build();

    group.bench_function("enqueue", |b| {
        b.iter(|| logger.info(black_box("File event {0}"), vec![1.into()]));
    });

    group.finish();
    logger.shutdown(Duration::from_secs(30));
}

// ============================================================================
// Concurrent Logging Benchmarks
// ============================================================================

fn bench_concurrent_logging(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent_logging");

    let logger = Logger::builder()
        .target(MemoryTarget::with_capacity(10_000))
        .build();

    group.bench_function("multi_thread_4", |b| {
        b.iter(|| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    let logger = logger.clone();
                    std::thread::spawn(move || {
                        for i in 0..100 {
                            logger.info(black_box("Concurrent {0}"), vec![i.into()]);
                        }
                    })
                })
                .collect();

            for handle in handles {
                handle.join().unwrap();
            }
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_template_rendering,
    bench_formatter,
    bench_dispatch,
    bench_file_target,
    bench_concurrent_logging,
);
criterion_main!(benches);
