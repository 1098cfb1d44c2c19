//! Observability subsystem
//!
//! - Structured logging (JSON, one line per event)
//! - Typed lifecycle events
//! - Begin/complete scopes for multi-step work
//!
//! # Principles
//!
//! 1. Observability is read-only
//! 2. No side effects on declaration or construction
//! 3. No async or background threads
//! 4. Deterministic output
//!
//! # Usage
//!
//! ```ignore
//! use mallows::observability::{Event, Logger, ObservationScope, Severity};
//!
//! Logger::set_min_severity(Severity::Warn);
//! log_event_with_fields(Event::TypeDeclared, &[("type", "Singer")]);
//! ```

mod events;
mod logger;
mod scope;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use scope::ObservationScope;

/// Log a lifecycle event
pub fn log_event(event: Event) {
    log_event_with_fields(event, &[]);
}

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    let severity = if event.is_fatal() {
        Severity::Fatal
    } else {
        Severity::Info
    };
    Logger::log(severity, event.as_str(), fields);
}

/// Log a per-instance event at TRACE level
pub fn trace_event(event: Event, fields: &[(&str, &str)]) {
    Logger::trace(event.as_str(), fields);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_event() {
        log_event(Event::ConfigLoaded);
    }

    #[test]
    fn test_log_event_with_fields() {
        log_event_with_fields(Event::DeclarationRejected, &[("type", "Broken")]);
    }

    #[test]
    fn test_trace_event() {
        trace_event(Event::InstanceConstructed, &[("type", "Person")]);
    }
}
