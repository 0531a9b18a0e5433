use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Severity of a blocked-attempt log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Informational; used when diagnostics are switched off for a client
    Info,
    /// Warning; used when a restricted route is refused
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
        }
    }
}

/// One blocked attempt, as handed to a [`LogSink`].
///
/// The gates build the message; the sink only decides where it goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockedAttempt {
    /// Severity chosen by the gate
    pub severity: Severity,
    /// Client address as seen by the gate
    pub client_ip: String,
    /// Reverse hostname, if one was resolved
    pub reverse: Option<String>,
    /// Fully formatted message
    pub message: String,
}

/// Destination for blocked-attempt log entries.
///
/// Transport and persistence belong to the implementation. Sinks are shared
/// between concurrently handled requests and must be `Send + Sync`.
pub trait LogSink: Send + Sync {
    /// Records one entry.
    fn record(&self, entry: BlockedAttempt);
}

impl<S: LogSink + ?Sized> LogSink for &S {
    fn record(&self, entry: BlockedAttempt) {
        (**self).record(entry)
    }
}

impl<S: LogSink + ?Sized> LogSink for std::sync::Arc<S> {
    fn record(&self, entry: BlockedAttempt) {
        (**self).record(entry)
    }
}

/// Default sink: forwards entries to `tracing` under the `devgate` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn record(&self, entry: BlockedAttempt) {
        let reverse = entry.reverse.as_deref().unwrap_or("unknown");
        match entry.severity {
            Severity::Info => tracing::info!(
                target: "devgate",
                client_ip = %entry.client_ip,
                reverse = %reverse,
                "{}",
                entry.message
            ),
            Severity::Warning => tracing::warn!(
                target: "devgate",
                client_ip = %entry.client_ip,
                reverse = %reverse,
                "{}",
                entry.message
            ),
        }
    }
}

/// A sink that keeps entries in memory.
///
/// Useful in tests and for hosts that drain entries into their own logger.
///
/// # Examples
///
/// ```
/// use devgate::{BlockedAttempt, LogSink, MemorySink, Severity};
///
/// let sink = MemorySink::new();
/// sink.record(BlockedAttempt {
///     severity: Severity::Info,
///     client_ip: "10.0.0.1".to_string(),
///     reverse: None,
///     message: "blocked".to_string(),
/// });
///
/// assert_eq!(sink.len(), 1);
/// assert_eq!(sink.count(Severity::Warning), 0);
/// ```
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: Mutex<Vec<BlockedAttempt>>,
}

impl MemorySink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<BlockedAttempt>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the number of recorded entries.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Returns the number of entries with the given severity.
    pub fn count(&self, severity: Severity) -> usize {
        self.lock().iter().filter(|e| e.severity == severity).count()
    }

    /// Provides borrowed access to the entries via callback.
    pub fn with_entries<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&[BlockedAttempt]) -> R,
    {
        f(&self.lock())
    }

    /// Returns a snapshot of the entries.
    pub fn entries(&self) -> Vec<BlockedAttempt> {
        self.lock().clone()
    }

    /// Removes and returns all entries.
    pub fn drain(&self) -> Vec<BlockedAttempt> {
        std::mem::take(&mut *self.lock())
    }
}

impl LogSink for MemorySink {
    fn record(&self, entry: BlockedAttempt) {
        self.lock().push(entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attempt(severity: Severity, ip: &str) -> BlockedAttempt {
        BlockedAttempt {
            severity,
            client_ip: ip.to_string(),
            reverse: None,
            message: format!("blocked {ip}"),
        }
    }

    #[test]
    fn memory_sink_starts_empty() {
        let sink = MemorySink::new();
        assert!(sink.is_empty());
        assert_eq!(sink.len(), 0);
    }

    #[test]
    fn memory_sink_records_in_order() {
        let sink = MemorySink::new();
        sink.record(attempt(Severity::Info, "10.0.0.1"));
        sink.record(attempt(Severity::Warning, "10.0.0.2"));

        let entries = sink.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].client_ip, "10.0.0.1");
        assert_eq!(entries[1].severity, Severity::Warning);
        assert_eq!(sink.count(Severity::Info), 1);
        assert_eq!(sink.count(Severity::Warning), 1);
    }

    #[test]
    fn memory_sink_drain_empties() {
        let sink = MemorySink::new();
        sink.record(attempt(Severity::Info, "::1"));

        let drained = sink.drain();
        assert_eq!(drained.len(), 1);
        assert!(sink.is_empty());
    }

    #[test]
    fn with_entries_borrows() {
        let sink = MemorySink::new();
        sink.record(attempt(Severity::Info, "192.0.2.1"));
        let first = sink.with_entries(|e| e[0].message.clone());
        assert_eq!(first, "blocked 192.0.2.1");
    }

    #[test]
    fn tracing_sink_accepts_both_severities() {
        let subscriber = tracing_subscriber::fmt().with_test_writer().finish();
        tracing::subscriber::with_default(subscriber, || {
            TracingSink.record(attempt(Severity::Info, "10.0.0.1"));
            TracingSink.record(attempt(Severity::Warning, "10.0.0.2"));
        });
    }

    #[test]
    fn severity_display() {
        assert_eq!(Severity::Info.to_string(), "info");
        assert_eq!(Severity::Warning.to_string(), "warning");
    }
}
