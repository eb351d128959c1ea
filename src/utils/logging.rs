//! Structured logging with provenance tags
//!
//! A verifying node logs every rejected record together with where it came
//! from. [`Provenance`] carries those tags and turns them into a tracing span.

use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{field, span, Level, Span};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt as fmt_layer, EnvFilter};

/// Where a buffer came from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Provenance {
    /// Remote peer address or name
    pub peer: Option<String>,
    /// Connection identifier
    pub connection: Option<u64>,
    /// Additional custom fields
    pub custom_fields: BTreeMap<String, String>,
}

impl Provenance {
    /// Create an empty provenance
    pub fn new() -> Self {
        Self::default()
    }

    /// Provenance for a remote peer
    pub fn for_peer(peer: impl Into<String>) -> Self {
        Self {
            peer: Some(peer.into()),
            ..Self::new()
        }
    }

    /// Add a connection identifier
    pub fn with_connection(mut self, connection: u64) -> Self {
        self.connection = Some(connection);
        self
    }

    /// Add custom field
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom_fields.insert(key.into(), value.into());
        self
    }

    /// Create a tracing span carrying these tags
    pub fn span(&self, name: &str) -> Span {
        let span = span!(
            Level::INFO,
            "provenance",
            name = %name,
            peer = field::Empty,
            connection = field::Empty,
            extra = field::Empty
        );

        if let Some(ref peer) = self.peer {
            span.record("peer", field::display(peer));
        }
        if let Some(connection) = self.connection {
            span.record("connection", connection);
        }
        if !self.custom_fields.is_empty() {
            span.record("extra", field::debug(&self.custom_fields));
        }

        span
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.peer, self.connection) {
            (Some(peer), Some(conn)) => write!(f, "{}#{}", peer, conn),
            (Some(peer), None) => write!(f, "{}", peer),
            (None, Some(conn)) => write!(f, "#{}", conn),
            (None, None) => write!(f, "local"),
        }
    }
}

/// Install the global subscriber
///
/// `format` is one of `plain`, `json` or `pretty`; anything else falls back to
/// plain output. Logs go to stderr so stdout stays free for record output.
/// Fails if a global subscriber is already installed.
pub fn init_structured_logging(level: &str, format: &str) -> Result<()> {
    let env_filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));

    let installed = match format {
        "json" => {
            let layer = fmt_layer::layer()
                .json()
                .with_target(false)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .with_writer(std::io::stderr);

            tracing_subscriber::registry()
                .with(env_filter)
                .with(layer)
                .try_init()
        }
        "pretty" => {
            let layer = fmt_layer::layer()
                .pretty()
                .with_target(false)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .with_writer(std::io::stderr);

            tracing_subscriber::registry()
                .with(env_filter)
                .with(layer)
                .try_init()
        }
        _ => {
            let layer = fmt_layer::layer()
                .with_target(false)
                .with_writer(std::io::stderr);

            tracing_subscriber::registry()
                .with(env_filter)
                .with(layer)
                .try_init()
        }
    };
    installed.map_err(|e| Error::config(format!("Failed to install log subscriber: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provenance_builder() {
        let prov = Provenance::for_peer("10.0.0.7:64764")
            .with_connection(42)
            .with_field("handshake", "done");

        assert_eq!(prov.peer.as_deref(), Some("10.0.0.7:64764"));
        assert_eq!(prov.connection, Some(42));
        assert_eq!(prov.custom_fields.get("handshake").map(String::as_str), Some("done"));
    }

    #[test]
    fn test_provenance_display() {
        assert_eq!(Provenance::new().to_string(), "local");
        assert_eq!(Provenance::for_peer("a").to_string(), "a");
        assert_eq!(Provenance::for_peer("a").with_connection(3).to_string(), "a#3");
        assert_eq!(Provenance::new().with_connection(3).to_string(), "#3");
    }

    #[test]
    fn test_global_subscriber_installs_once() {
        assert!(init_structured_logging("warn", "json").is_ok());
        let err = init_structured_logging("debug", "plain").unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Config);
    }

    #[test]
    fn test_span_without_subscriber() {
        // Spans are inert without a subscriber but must still build
        let span = Provenance::for_peer("p").with_connection(1).span("check");
        let _enter = span.enter();
    }
}
