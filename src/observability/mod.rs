//! Observability for walkdb
//!
//! Structured JSON logging of lifecycle events, catalog mutations and
//! store failures.
//!
//! ```ignore
//! use walkdb::observability::{log_event_with_fields, Event};
//!
//! log_event_with_fields(Event::WalkCreated, &[("id", "65a1f0c2e4b0a1b2c3d4e5f6")]);
//! ```

mod events;
mod logger;
mod scope;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use scope::ObservationScope;

/// Log a typed event with no fields
pub fn log_event(event: Event) {
    log_event_with_fields(event, &[]);
}

/// Log a typed event, at ERROR for failures and INFO otherwise
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    let severity = if event.is_failure() {
        Severity::Error
    } else {
        Severity::Info
    };
    Logger::log(severity, event.as_str(), fields);
}
