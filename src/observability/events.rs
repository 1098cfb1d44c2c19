//! Observable events
//!
//! Events are explicit and typed.

use std::fmt;

/// Observable events in the declaration and construction lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    /// Configuration loaded
    ConfigLoaded,

    // Declaration
    /// Type aggregated, compiled and registered
    TypeDeclared,
    /// Declaration failed (FATAL)
    DeclarationRejected,

    // Construction
    /// Instance materialized
    InstanceConstructed,
    /// Construction input rejected
    InstanceRejected,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::TypeDeclared => "TYPE_DECLARED",
            Event::DeclarationRejected => "DECLARATION_REJECTED",
            Event::InstanceConstructed => "INSTANCE_CONSTRUCTED",
            Event::InstanceRejected => "INSTANCE_REJECTED",
        }
    }

    /// Returns true if this event indicates a fatal condition
    pub fn is_fatal(&self) -> bool {
        matches!(self, Event::DeclarationRejected)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_events_have_string_representation() {
        let events = [
            Event::ConfigLoaded,
            Event::TypeDeclared,
            Event::DeclarationRejected,
            Event::InstanceConstructed,
            Event::InstanceRejected,
        ];

        for event in events {
            let s = event.as_str();
            assert!(!s.is_empty());
            assert!(s.chars().all(|c| c.is_uppercase() || c == '_'));
        }
    }

    #[test]
    fn test_fatal_events() {
        assert!(Event::DeclarationRejected.is_fatal());
        assert!(!Event::TypeDeclared.is_fatal());
        assert!(!Event::InstanceRejected.is_fatal());
    }

    #[test]
    fn test_event_display() {
        assert_eq!(format!("{}", Event::TypeDeclared), "TYPE_DECLARED");
    }
}
