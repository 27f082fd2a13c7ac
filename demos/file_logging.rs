//! File logging example
//!
//! Demonstrates configuring the logging service from JSON, batched file
//! output and reading the result back.
//!
//! Run with: cargo run --example file_logging

use rust_log_pipeline::prelude::*;
use rust_log_pipeline::{critical, info, named};
use std::time::Duration;

fn main() -> Result<()> {
    println!("=== Rust Log Pipeline - File Logging Example ===\n");

    let log_path = std::env::temp_dir().join("rust_log_pipeline_demo").join("app.log");
    let _ = std::fs::remove_file(&log_path);

    let config = LoggingConfig::from_json_str(&format!(
        r#"{{
            "minimum_level": "debug",
            "caller_info": {{ "level": "warning" }},
            "targets": [
                {{ "kind": "console", "minimum_level": "warning" }},
                {{ "kind": "file", "path": {}, "batch_size": 50, "flush_interval_ms": 200 }}
            ]
        }}"#,
        serde_json::to_string(&log_path).map_err(LoggerError::from)?
    ))?;

    let service = LoggingService::new();
    service.configure(&config)?;
    println!("Service state: {:?}", service.state());

    let logger = service.logger("FileDemo");
    for i in 0..10 {
        info!(logger, "Processed batch {Batch} with {Count} rows", named! { Batch = i, Count = i * 100 });
    }
    critical!(logger, "Disk usage at {0}%", 97);

    if let Err(e) = service.configure(&LoggingConfig::default()) {
        println!("Second configure rejected: {}", e);
    }

    service.shutdown(Duration::from_secs(5));

    println!("\nContents of {}:", log_path.display());
    let contents = std::fs::read_to_string(&log_path)
        .map_err(|e| LoggerError::io_operation("reading demo log", "cannot read output", e))?;
    for line in contents.lines() {
        println!("   {}", line);
    }

    println!("\n=== Example completed successfully! ===");
    Ok(())
}
