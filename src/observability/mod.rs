//! Observability
//!
//! - Structured logging (JSON lines)
//! - Typed lifecycle events
//!
//! Observability is read-only: logging never changes what the restore
//! flow does.
//!
//! ```ignore
//! use node_restore::observability::{log_event_with_fields, Event};
//!
//! log_event_with_fields(Event::BackupWait, &[("interval", "10s")]);
//! ```

mod events;
mod logger;

pub use events::Event;
pub use logger::{Logger, Severity, Timer};

/// Log a lifecycle event
pub fn log_event(event: Event) {
    Logger::log(event.severity(), event.as_str(), &[]);
}

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_event() {
        // verifies no panic
        log_event(Event::RestoreBegin);
        log_event(Event::RestoreComplete);
    }

    #[test]
    fn test_log_event_with_fields() {
        log_event_with_fields(Event::ConfigLoaded, &[("path", "/tmp/restore.json")]);
    }
}
