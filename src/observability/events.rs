//! Observable events
//!
//! Every line the service logs names one of these events.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Lifecycle
    ConfigLoaded,
    HttpServerStart,

    // Catalog mutations
    WalkCreated,
    WalkUpdated,
    KeywordAdded,
    WalksRenamed,
    WalkDeleted,

    // Rejections and failures
    RequestRejected,
    StoreFailure,

    // File store
    SnapshotLoaded,
    SnapshotPersisted,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::HttpServerStart => "HTTP_SERVER_START",
            Event::WalkCreated => "WALK_CREATED",
            Event::WalkUpdated => "WALK_UPDATED",
            Event::KeywordAdded => "KEYWORD_ADDED",
            Event::WalksRenamed => "WALKS_RENAMED",
            Event::WalkDeleted => "WALK_DELETED",
            Event::RequestRejected => "REQUEST_REJECTED",
            Event::StoreFailure => "STORE_FAILURE",
            Event::SnapshotLoaded => "SNAPSHOT_LOADED",
            Event::SnapshotPersisted => "SNAPSHOT_PERSISTED",
        }
    }

    /// Failures are routed to stderr at ERROR
    pub fn is_failure(&self) -> bool {
        matches!(self, Event::StoreFailure)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
