//! Correlation types for request tracking and tracing
//!
//! A release run or a pull request is one unit of work; every log event and
//! error produced inside it can carry the same `RequestId`.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! correlation_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Generate a fresh time-ordered id (UUIDv7)
            pub fn new() -> Self {
                Self(Uuid::now_v7().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Wrap an id received from outside (header, job record)
            pub fn from_string(s: String) -> Self {
                Self(s)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

correlation_id!(
    /// Identifier for a single request or scheduled job invocation
    RequestId
);
correlation_id!(
    /// Trace identifier propagated from an upstream caller
    TraceId
);
correlation_id!(
    /// Identifier for one step inside a request (e.g. one course of a release run)
    SpanId
);

/// Correlation ids carried through operation boundaries
#[derive(Debug, Clone)]
pub struct Correlation {
    pub request_id: RequestId,
    pub trace_id: Option<TraceId>,
}

impl Correlation {
    pub fn new() -> Self {
        Self {
            request_id: RequestId::new(),
            trace_id: None,
        }
    }

    pub fn with_request_id(request_id: RequestId) -> Self {
        Self {
            request_id,
            trace_id: None,
        }
    }

    pub fn with_trace_id(mut self, trace_id: TraceId) -> Self {
        self.trace_id = Some(trace_id);
        self
    }
}

impl Default for Correlation {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique_and_non_empty() {
        let a = RequestId::new();
        let b = RequestId::new();
        assert_ne!(a, b);
        assert!(!a.as_str().is_empty());
        assert_ne!(SpanId::new(), SpanId::new());
    }

    #[test]
    fn test_display_matches_as_str() {
        let id = TraceId::from_string("trace-1".to_string());
        assert_eq!(id.to_string(), "trace-1");
        assert_eq!(id.as_str(), "trace-1");
    }

    #[test]
    fn test_correlation_with_trace_id() {
        let trace_id = TraceId::new();
        let ctx = Correlation::new().with_trace_id(trace_id.clone());
        assert_eq!(ctx.trace_id, Some(trace_id));
    }

    #[test]
    fn test_serialization() {
        let id = RequestId::new();
        let json = serde_json::to_string(&id).unwrap();
        let back: RequestId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }
}
