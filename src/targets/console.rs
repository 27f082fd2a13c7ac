//! Console target implementation
//!
//! Bounded queue with drop-newest overflow and one worker thread that
//! renders and writes colored lines.

use super::worker::{CancellationSignal, WorkerHandle};
use super::MAX_QUEUE_CAPACITY;
use crate::core::diagnostics::panic_message;
use crate::core::{
    Diagnostics, Formatter, LogEvent, LogLevel, LoggerError, OverflowPolicy, Result, Target,
    TargetMetrics, TargetSettings, TemplateFormatter, DEFAULT_SHUTDOWN_TIMEOUT,
};
use crossbeam_channel::{bounded, select, Receiver, Sender, TrySendError};
use parking_lot::RwLock;
use std::any::Any;
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

/// Default queue capacity for console targets
pub const DEFAULT_CONSOLE_CAPACITY: usize = 1000;

/// Output stream used by the console worker
pub type ConsoleWriter = Box<dyn Write + Send>;

pub struct ConsoleTarget {
    settings: TargetSettings,
    capacity: usize,
    sender: RwLock<Option<Sender<Arc<LogEvent>>>>,
    worker: WorkerHandle,
    metrics: Arc<TargetMetrics>,
    diagnostics: Diagnostics,
}

impl ConsoleTarget {
    /// Console target writing to stdout with default settings
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    pub fn builder() -> ConsoleTargetBuilder {
        ConsoleTargetBuilder::new()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn alert_drop(&self, previously_dropped: u64) {
        // Alert on first drop and periodically thereafter
        if previously_dropped == 0 || (previously_dropped + 1) % 1000 == 0 {
            self.diagnostics.warning(&format!(
                "Console target '{}' queue full, {} logs dropped. \
                 Consider increasing its capacity.",
                self.settings.name(),
                previously_dropped + 1
            ));
        }
    }
}

impl Target for ConsoleTarget {
    fn enqueue(&self, event: Arc<LogEvent>) {
        if !self.settings.accepts(event.level()) {
            return;
        }

        let sender = self.sender.read();
        let Some(sender) = sender.as_ref() else {
            return;
        };

        match sender.try_send(event) {
            Ok(()) => {
                self.metrics.record_enqueued();
            }
            Err(TrySendError::Full(_)) => {
                let previously_dropped = self.metrics.record_dropped();
                self.alert_drop(previously_dropped);
            }
            Err(TrySendError::Disconnected(_)) => {
                // Worker is gone (shutdown in progress), silently ignore
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
        OverflowPolicy::DropNewest
    }

    fn metrics(&self) -> &TargetMetrics {
        &self.metrics
    }

    fn shutdown(&self, timeout: Duration) -> bool {
        // Stop accepting first so the worker's final drain is bounded
        drop(self.sender.write().take());
        self.worker.stop(timeout, &self.diagnostics)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Drop for ConsoleTarget {
    fn drop(&mut self) {
        self.shutdown(DEFAULT_SHUTDOWN_TIMEOUT);
    }
}

/// Builder for [`ConsoleTarget`]
///
/// # Example
///
/// ```no_run
/// use rust_log_pipeline::{ConsoleTarget, LogLevel};
///
/// let console = ConsoleTarget::builder()
///     .name("stdout")
///     .minimum_level(LogLevel::Info)
///     .capacity(4096)
///     .use_colors(false)
///     .build()
///     .unwrap();
/// ```
pub struct ConsoleTargetBuilder {
    name: String,
    minimum_level: LogLevel,
    capacity: usize,
    use_colors: bool,
    formatter: Arc<dyn Formatter>,
    writer: Option<ConsoleWriter>,
    diagnostics: Diagnostics,
}

impl ConsoleTargetBuilder {
    pub fn new() -> Self {
        Self {
            name: "console".to_string(),
            minimum_level: LogLevel::Debug,
            capacity: DEFAULT_CONSOLE_CAPACITY,
            use_colors: true,
            formatter: Arc::new(TemplateFormatter::new()),
            writer: None,
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

    /// Queue capacity; events beyond it are dropped. Zero is raised to one,
    /// anything above [`MAX_QUEUE_CAPACITY`] fails in `build`.
    #[must_use = "builder methods return a new value"]
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    /// Colors are also suppressed when `colored` detects `NO_COLOR` and friends
    #[must_use = "builder methods return a new value"]
    pub fn use_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn formatter(mut self, formatter: Arc<dyn Formatter>) -> Self {
        self.formatter = formatter;
        self
    }

    /// Write somewhere other than stdout
    #[must_use = "builder methods return a new value"]
    pub fn writer(mut self, writer: ConsoleWriter) -> Self {
        self.writer = Some(writer);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn diagnostics(mut self, diagnostics: Diagnostics) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn build(self) -> Result<ConsoleTarget> {
        if self.capacity > MAX_QUEUE_CAPACITY {
            return Err(LoggerError::config(
                format!("console target '{}'", self.name),
                format!("capacity must not exceed {}", MAX_QUEUE_CAPACITY),
            ));
        }

        let (sender, receiver) = bounded(self.capacity);
        let cancel = CancellationSignal::new();
        let metrics = Arc::new(TargetMetrics::new());

        let worker = ConsoleWorker {
            receiver,
            cancel: cancel.clone(),
            writer: self.writer.unwrap_or_else(|| Box::new(io::stdout())),
            formatter: self.formatter,
            use_colors: self.use_colors && colored::control::SHOULD_COLORIZE.should_colorize(),
            metrics: Arc::clone(&metrics),
            diagnostics: self.diagnostics.clone(),
        };
        let worker = WorkerHandle::spawn(&self.name, cancel, move || worker.run())?;

        Ok(ConsoleTarget {
            settings: TargetSettings::new(self.name, self.minimum_level),
            capacity: self.capacity,
            sender: RwLock::new(Some(sender)),
            worker,
            metrics,
            diagnostics: self.diagnostics,
        })
    }
}

impl Default for ConsoleTargetBuilder {
    fn default() -> Self {
        Self::new()
    }
}

struct ConsoleWorker {
    receiver: Receiver<Arc<LogEvent>>,
    cancel: CancellationSignal,
    writer: ConsoleWriter,
    formatter: Arc<dyn Formatter>,
    use_colors: bool,
    metrics: Arc<TargetMetrics>,
    diagnostics: Diagnostics,
}

impl ConsoleWorker {
    fn run(mut self) {
        loop {
            select! {
                recv(self.receiver) -> msg => match msg {
                    Ok(event) => self.write_event(&event),
                    Err(_) => break,
                },
                recv(self.cancel.receiver()) -> _ => {
                    // Drain what was queued before shutdown; the caller's
                    // wait is bounded, so leftovers past it are abandoned
                    while let Ok(event) = self.receiver.try_recv() {
                        self.write_event(&event);
                    }
                    break;
                }
            }
        }
        let _ = self.writer.flush();
    }

    fn write_event(&mut self, event: &LogEvent) {
        let style = self.use_colors.then(|| event.level());

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let line = self.formatter.render(event, false);
            write_colored_line(self.writer.as_mut(), style, &line)
        }));

        match result {
            Ok(Ok(())) => {
                self.metrics.record_written(1);
            }
            Ok(Err(e)) => {
                self.metrics.record_failed(1);
                self.diagnostics
                    .error(&format!("Console write failed: {}", e));
            }
            Err(panic_info) => {
                self.metrics.record_failed(1);
                self.diagnostics.critical(&format!(
                    "Console worker panicked: {}. The worker continues.",
                    panic_message(panic_info.as_ref())
                ));
            }
        }
    }
}

// Stands in for the line when splitting a styled string into its escapes
const STYLE_MARKER: char = '\u{1}';

/// Opening and closing escape sequences `colored` uses for `level`
///
/// `None` when the level is unstyled or coloring is turned off globally.
fn style_sequences(level: LogLevel) -> Option<(String, String)> {
    let painted = level.paint(&STYLE_MARKER.to_string()).to_string();
    let (open, close) = painted.split_once(STYLE_MARKER)?;
    if open.is_empty() {
        return None;
    }
    Some((open.to_string(), close.to_string()))
}

/// Switches the terminal style for its lifetime
///
/// The reset sequence is written on drop, so the style is restored even
/// when the write in between fails.
struct ColorScope<'a> {
    out: &'a mut (dyn Write + Send),
    reset: Option<String>,
}

impl<'a> ColorScope<'a> {
    fn enter(out: &'a mut (dyn Write + Send), style: Option<LogLevel>) -> Self {
        let reset = match style.and_then(style_sequences) {
            Some((open, close)) => out.write_all(open.as_bytes()).ok().map(|()| close),
            None => None,
        };
        Self { out, reset }
    }

    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.out.write_all(bytes)
    }
}

impl Drop for ColorScope<'_> {
    fn drop(&mut self) {
        if let Some(reset) = self.reset.take() {
            let _ = self.out.write_all(reset.as_bytes());
        }
    }
}

fn write_colored_line(
    out: &mut (dyn Write + Send),
    style: Option<LogLevel>,
    line: &str,
) -> io::Result<()> {
    {
        let mut scope = ColorScope::enter(out, style);
        scope.write_all(line.as_bytes())?;
    }
    out.write_all(b"\n")?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::time::Instant;

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl SharedBuffer {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock()).into_owned()
        }
    }

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct FailingWriter {
        attempts: Arc<Mutex<Vec<u8>>>,
    }

    impl Write for FailingWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if buf.starts_with(b"\x1b[") {
                self.attempts.lock().extend_from_slice(buf);
                return Ok(buf.len());
            }
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn event(level: LogLevel, message: &str) -> Arc<LogEvent> {
        Arc::new(LogEvent::new(level, "Test", message, Vec::new()))
    }

    #[test]
    fn test_writes_lines_in_order() {
        let buffer = SharedBuffer::default();
        let target = ConsoleTarget::builder()
            .use_colors(false)
            .writer(Box::new(buffer.clone()))
            .build()
            .expect("console target");

        for i in 0..10 {
            target.enqueue(event(LogLevel::Info, &format!("message {}", i)));
        }
        assert!(target.shutdown(Duration::from_secs(5)));

        let contents = buffer.contents();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 10);
        for (i, line) in lines.iter().enumerate() {
            assert!(line.ends_with(&format!("[INF] [Test] message {}", i)), "{}", line);
        }
    }

    #[test]
    fn test_minimum_level_and_enabled_flag() {
        let buffer = SharedBuffer::default();
        let target = ConsoleTarget::builder()
            .minimum_level(LogLevel::Warning)
            .use_colors(false)
            .writer(Box::new(buffer.clone()))
            .build()
            .expect("console target");

        target.enqueue(event(LogLevel::Info, "filtered"));
        target.enqueue(event(LogLevel::Error, "kept"));
        target.set_enabled(false);
        target.enqueue(event(LogLevel::Critical, "disabled"));
        target.shutdown(Duration::from_secs(5));

        let contents = buffer.contents();
        assert!(!contents.contains("filtered"));
        assert!(contents.contains("kept"));
        assert!(!contents.contains("disabled"));
        assert_eq!(target.metrics().enqueued(), 1);
    }

    #[test]
    fn test_saturation_never_blocks() {
        let buffer = SharedBuffer::default();
        let target = ConsoleTarget::builder()
            .capacity(4)
            .use_colors(false)
            .writer(Box::new(buffer.clone()))
            .diagnostics(Diagnostics::callback_only(Arc::new(|_: crate::core::DiagnosticLevel, _: &str| {})))
            .build()
            .expect("console target");

        let start = Instant::now();
        for i in 0..10_000 {
            target.enqueue(event(LogLevel::Info, &format!("burst {}", i)));
        }
        assert!(start.elapsed() < Duration::from_secs(5));
        target.shutdown(Duration::from_secs(5));

        let metrics = target.metrics();
        assert_eq!(metrics.enqueued() + metrics.dropped(), 10_000);
        assert!(metrics.written() <= metrics.enqueued());
        assert!(buffer.contents().lines().count() as u64 <= 10_000);
    }

    /// Holds the first write until the gate opens
    struct GatedWriter {
        started: Sender<()>,
        gate: Receiver<()>,
        opened: bool,
        buffer: SharedBuffer,
    }

    impl Write for GatedWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if !self.opened {
                let _ = self.started.send(());
                let _ = self.gate.recv();
                self.opened = true;
            }
            self.buffer.write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_full_queue_drops_newest_events() {
        let (started_tx, started_rx) = crossbeam_channel::bounded(1);
        let (gate_tx, gate_rx) = crossbeam_channel::bounded::<()>(0);
        let buffer = SharedBuffer::default();
        let target = ConsoleTarget::builder()
            .capacity(4)
            .use_colors(false)
            .writer(Box::new(GatedWriter {
                started: started_tx,
                gate: gate_rx,
                opened: false,
                buffer: buffer.clone(),
            }))
            .diagnostics(Diagnostics::callback_only(Arc::new(|_: crate::core::DiagnosticLevel, _: &str| {})))
            .build()
            .expect("console target");

        // The worker takes event 0 and blocks writing it, so the queue fills
        target.enqueue(event(LogLevel::Info, "event 0"));
        started_rx
            .recv_timeout(Duration::from_secs(5))
            .expect("worker started writing");
        for i in 1..100 {
            target.enqueue(event(LogLevel::Info, &format!("event {}", i)));
        }
        drop(gate_tx);
        assert!(target.shutdown(Duration::from_secs(5)));

        let contents = buffer.contents();
        let written: Vec<String> = contents
            .lines()
            .map(|line| line.rsplit("] ").next().unwrap_or_default().to_string())
            .collect();
        let expected: Vec<String> = (0..5).map(|i| format!("event {}", i)).collect();
        assert_eq!(written, expected);

        let metrics = target.metrics();
        assert_eq!(metrics.enqueued(), 5);
        assert_eq!(metrics.dropped(), 95);
        assert_eq!(metrics.written(), 5);
    }

    #[test]
    fn test_oversized_capacity_is_rejected() {
        let result = ConsoleTarget::builder()
            .capacity(MAX_QUEUE_CAPACITY + 1)
            .use_colors(false)
            .writer(Box::new(io::sink()))
            .build();
        assert!(matches!(result, Err(LoggerError::InvalidConfiguration { .. })));

        let largest = ConsoleTarget::builder()
            .capacity(MAX_QUEUE_CAPACITY)
            .use_colors(false)
            .writer(Box::new(io::sink()))
            .build()
            .expect("console target");
        assert_eq!(largest.capacity(), MAX_QUEUE_CAPACITY);
    }

    #[test]
    fn test_color_is_reset_after_failed_write() {
        colored::control::set_override(true);
        let attempts = Arc::new(Mutex::new(Vec::new()));
        let mut writer = FailingWriter {
            attempts: Arc::clone(&attempts),
        };

        let result = write_colored_line(&mut writer, Some(LogLevel::Error), "line");
        assert!(result.is_err());

        let written = String::from_utf8_lossy(&attempts.lock()).into_owned();
        assert!(written.starts_with("\x1b[31m"));
        assert!(written.ends_with("\x1b[0m"));
    }

    #[test]
    fn test_colored_output_wraps_line() {
        colored::control::set_override(true);
        let mut out: Vec<u8> = Vec::new();
        write_colored_line(&mut out, Some(LogLevel::Warning), "warn").expect("write");
        assert_eq!(String::from_utf8_lossy(&out), "\x1b[33mwarn\x1b[0m\n");

        let mut out: Vec<u8> = Vec::new();
        write_colored_line(&mut out, Some(LogLevel::Debug), "debug").expect("write");
        assert_eq!(String::from_utf8_lossy(&out), "\x1b[2mdebug\x1b[0m\n");

        let mut out: Vec<u8> = Vec::new();
        write_colored_line(&mut out, Some(LogLevel::Info), "info").expect("write");
        assert_eq!(String::from_utf8_lossy(&out), "info\n");

        let mut out: Vec<u8> = Vec::new();
        write_colored_line(&mut out, None, "plain").expect("write");
        assert_eq!(String::from_utf8_lossy(&out), "plain\n");
    }

    #[test]
    fn test_write_failure_is_contained() {
        let messages = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&messages);
        let target = ConsoleTarget::builder()
            .use_colors(false)
            .writer(Box::new(FailingWriter {
                attempts: Arc::new(Mutex::new(Vec::new())),
            }))
            .diagnostics(Diagnostics::callback_only(Arc::new(
                move |_: crate::core::DiagnosticLevel, msg: &str| sink.lock().push(msg.to_string()),
            )))
            .build()
            .expect("console target");

        target.enqueue(event(LogLevel::Info, "first"));
        target.enqueue(event(LogLevel::Info, "second"));
        assert!(target.shutdown(Duration::from_secs(5)));

        assert_eq!(target.metrics().failed(), 2);
        assert_eq!(messages.lock().len(), 2);
    }

    #[test]
    fn test_enqueue_after_shutdown_is_ignored() {
        let buffer = SharedBuffer::default();
        let target = ConsoleTarget::builder()
            .use_colors(false)
            .writer(Box::new(buffer.clone()))
            .build()
            .expect("console target");

        assert!(target.shutdown(Duration::from_secs(5)));
        target.enqueue(event(LogLevel::Info, "late"));
        assert!(target.shutdown(Duration::from_secs(5)));
        assert!(buffer.contents().is_empty());
    }
}
