//! File target implementation
//!
//! Unbounded queue (never drops) drained by one worker thread in batches.
//! A batch is written when an event arrives or the flush interval ticks,
//! capped at `batch_size` events, and appended to the file in one write
//! under the path's shared lock.

use super::path_locks;
use super::worker::{CancellationSignal, WorkerHandle};
use crate::core::diagnostics::panic_message;
use crate::core::{
    Diagnostics, Formatter, LogEvent, LogLevel, LoggerError, OverflowPolicy, Result, Target,
    TargetMetrics, TargetSettings, TemplateFormatter, DEFAULT_SHUTDOWN_TIMEOUT,
};
use crossbeam_channel::{select, tick, unbounded, Receiver, Sender};
use parking_lot::{Mutex, RwLock};
use std::any::Any;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Maximum events per batched write
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Longest time an event waits in the queue under low volume
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_secs(1);

/// File target with batched appends
///
/// # Example
///
/// ```no_run
/// use rust_log_pipeline::{FileTarget, LogLevel};
/// use std::time::Duration;
///
/// let target = FileTarget::builder("/var/log/app/app.log")
///     .minimum_level(LogLevel::Info)
///     .batch_size(500)
///     .flush_interval(Duration::from_millis(250))
///     .build()
///     .unwrap();
/// ```
pub struct FileTarget {
    settings: TargetSettings,
    path: PathBuf,
    sender: RwLock<Option<Sender<Arc<LogEvent>>>>,
    worker: WorkerHandle,
    metrics: Arc<TargetMetrics>,
    diagnostics: Diagnostics,
}

impl FileTarget {
    /// File target with default batching
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        Self::builder(path).build()
    }

    pub fn builder(path: impl Into<PathBuf>) -> FileTargetBuilder {
        FileTargetBuilder::new(path)
    }

    /// Resolved absolute path of the log file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Target for FileTarget {
    fn enqueue(&self, event: Arc<LogEvent>) {
        if !self.settings.accepts(event.level()) {
            return;
        }

        if let Some(sender) = self.sender.read().as_ref() {
            if sender.send(event).is_ok() {
                self.metrics.record_enqueued();
            }
        }
    }

    fn name(&self) -> &str {
        self.settings.name()
    }

    fn minimum_level(&self) -> LogLevel {
        self.settings.minimum_level()
    }

    fn is_enabled(&self) -> bool {
        self.settings.is_enabled()
    }

    fn set_enabled(&self, enabled: bool) {
        self.settings.set_enabled(enabled);
    }

    fn overflow_policy(&self) -> OverflowPolicy {
        OverflowPolicy::Unbounded
    }

    fn metrics(&self) -> &TargetMetrics {
        &self.metrics
    }

    fn shutdown(&self, timeout: Duration) -> bool {
        drop(self.sender.write().take());
        self.worker.stop(timeout, &self.diagnostics)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Drop for FileTarget {
    fn drop(&mut self) {
        self.shutdown(DEFAULT_SHUTDOWN_TIMEOUT);
    }
}

/// Builder for [`FileTarget`]
pub struct FileTargetBuilder {
    path: PathBuf,
    name: String,
    minimum_level: LogLevel,
    batch_size: usize,
    flush_interval: Duration,
    formatter: Arc<dyn Formatter>,
    diagnostics: Diagnostics,
}

impl FileTargetBuilder {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            name: "file".to_string(),
            minimum_level: LogLevel::Debug,
            batch_size: DEFAULT_BATCH_SIZE,
            flush_interval: DEFAULT_FLUSH_INTERVAL,
            formatter: Arc::new(TemplateFormatter::new()),
            diagnostics: Diagnostics::stderr(),
        }
    }

    #[must_use = "builder methods return a new value"]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn minimum_level(mut self, level: LogLevel) -> Self {
        self.minimum_level = level;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn flush_interval(mut self, interval: Duration) -> Self {
        self.flush_interval = interval;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn formatter(mut self, formatter: Arc<dyn Formatter>) -> Self {
        self.formatter = formatter;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn diagnostics(mut self, diagnostics: Diagnostics) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Create the destination directory and start the worker
    ///
    /// # Errors
    ///
    /// Returns error if the configuration is invalid, the directory cannot be
    /// created, or the worker thread cannot be spawned
    pub fn build(self) -> Result<FileTarget> {
        let display = self.path.display().to_string();
        if self.path.as_os_str().is_empty() || self.path.file_name().is_none() {
            return Err(LoggerError::file_target(display, "path must name a file"));
        }
        if self.batch_size == 0 {
            return Err(LoggerError::config("FileTarget", "batch_size must be greater than zero"));
        }
        if self.flush_interval.is_zero() {
            return Err(LoggerError::config(
                "FileTarget",
                "flush_interval must be greater than zero",
            ));
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                LoggerError::io_operation(
                    "creating log directory",
                    format!("cannot create '{}'", parent.display()),
                    e,
                )
            })?;
        }
        let path = path_locks::resolve(&self.path).map_err(|e| {
            LoggerError::io_operation("resolving log path", format!("cannot resolve '{}'", display), e)
        })?;

        let (sender, receiver) = unbounded();
        let cancel = CancellationSignal::new();
        let metrics = Arc::new(TargetMetrics::new());

        let worker = FileWorker {
            receiver,
            cancel: cancel.clone(),
            path_lock: path_locks::lock_for(&path),
            path: path.clone(),
            batch_size: self.batch_size,
            flush_interval: self.flush_interval,
            formatter: self.formatter,
            metrics: Arc::clone(&metrics),
            diagnostics: self.diagnostics.clone(),
        };
        let worker = WorkerHandle::spawn(&self.name, cancel, move || worker.run())?;

        Ok(FileTarget {
            settings: TargetSettings::new(self.name, self.minimum_level),
            path,
            sender: RwLock::new(Some(sender)),
            worker,
            metrics,
            diagnostics: self.diagnostics,
        })
    }
}

struct FileWorker {
    receiver: Receiver<Arc<LogEvent>>,
    cancel: CancellationSignal,
    path_lock: Arc<Mutex<()>>,
    path: PathBuf,
    batch_size: usize,
    flush_interval: Duration,
    formatter: Arc<dyn Formatter>,
    metrics: Arc<TargetMetrics>,
    diagnostics: Diagnostics,
}

impl FileWorker {
    fn run(self) {
        let ticker = tick(self.flush_interval);
        let mut batch = Vec::with_capacity(self.batch_size);

        loop {
            select! {
                recv(self.receiver) -> msg => match msg {
                    Ok(event) => {
                        batch.push(event);
                        self.fill(&mut batch);
                        self.write_batch(&mut batch);
                    }
                    Err(_) => break,
                },
                recv(ticker) -> _ => {
                    self.fill(&mut batch);
                    self.write_batch(&mut batch);
                }
                recv(self.cancel.receiver()) -> _ => break,
            }
        }

        // Everything still queued goes out as one final batch
        batch.extend(self.receiver.try_iter());
        self.write_batch(&mut batch);
    }

    fn fill(&self, batch: &mut Vec<Arc<LogEvent>>) {
        while batch.len() < self.batch_size {
            match self.receiver.try_recv() {
                Ok(event) => batch.push(event),
                Err(_) => break,
            }
        }
    }

    fn write_batch(&self, batch: &mut Vec<Arc<LogEvent>>) {
        if batch.is_empty() {
            return;
        }
        let count = batch.len() as u64;

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let mut payload = String::with_capacity(batch.len() * 128);
            for event in batch.iter() {
                payload.push_str(&self.formatter.render(event, true));
                payload.push('\n');
            }
            self.append(payload.as_bytes())
        }));
        batch.clear();

        match result {
            Ok(Ok(())) => {
                self.metrics.record_written(count);
            }
            Ok(Err(e)) => {
                self.metrics.record_failed(count);
                self.diagnostics.error(&format!(
                    "Failed to write {} log events to '{}': {}",
                    count,
                    self.path.display(),
                    e
                ));
            }
            Err(panic_info) => {
                self.metrics.record_failed(count);
                self.diagnostics.critical(&format!(
                    "File worker panicked while writing '{}': {}. The worker continues.",
                    self.path.display(),
                    panic_message(panic_info.as_ref())
                ));
            }
        }
    }

    /// Append `bytes` while holding the path lock
    fn append(&self, bytes: &[u8]) -> io::Result<()> {
        let _guard = self.path_lock.lock();
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;

        #[cfg(feature = "file-lock")]
        fs2::FileExt::lock_exclusive(&file)?;

        let result = file.write_all(bytes).and_then(|()| file.flush());

        #[cfg(feature = "file-lock")]
        let _ = fs2::FileExt::unlock(&file);

        result
    }
}
