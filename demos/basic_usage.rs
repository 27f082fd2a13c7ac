//! Basic pipeline usage example
//!
//! Demonstrates console output, message templates, child loggers and the
//! in-memory target.
//!
//! Run with: cargo run --example basic_usage

use rust_log_pipeline::prelude::*;
use rust_log_pipeline::{error, info, named, warning};
use std::sync::Arc;
use std::time::Duration;

fn main() -> Result<()> {
    println!("=== Rust Log Pipeline - Basic Usage Example ===\n");

    let recent = Arc::new(MemoryTarget::with_capacity(3));
    let logger = Logger::builder()
        .min_level(LogLevel::Debug)
        .source("Demo")
        .target(ConsoleTarget::new()?)
        .shared_target(recent.clone())
        .build();

    println!("1. Logging at different levels:");
    logger.debug("This is a debug message", vec![]);
    logger.info("This is an info message", vec![]);
    logger.warning("This is a warning message", vec![]);
    logger.error("This is an error message", vec![]);
    logger.critical("This is a critical message", vec![]);

    println!("\n2. Templates:");
    info!(logger, "Listening on {0}:{1}", "0.0.0.0", 8080);
    info!(logger, "User {UserId} signed in from {Ip}", named! { UserId = 42, Ip = "10.0.0.7" });
    warning!(logger, "Unused values are kept {0}", 1, 2, 3);

    println!("\n3. Child loggers and errors:");
    let db = logger.create_child("Db");
    let err = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused");
    error!(db, exception = err, "Query {Name} failed", named! { Name = "load_orders" });

    // Let the console worker catch up before printing the snapshot
    std::thread::sleep(Duration::from_millis(100));

    println!("\n4. Last three events held in memory:");
    for event in recent.get_recent() {
        println!("   [{}] {}", event.level().code(), event.template());
    }

    logger.shutdown(DEFAULT_SHUTDOWN_TIMEOUT);
    println!("\n=== Example completed successfully! ===");

    Ok(())
}
