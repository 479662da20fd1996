//! Core types shared across the OER release facilities
//!
//! This crate provides foundational types used by both error handling
//! and logging facilities:
//!
//! - **Correlation types**: RequestId, TraceId, SpanId, Correlation
//! - **Schema constants**: Canonical field keys and event names

pub mod correlation;
pub mod schema;

pub use correlation::{Correlation, RequestId, SpanId, TraceId};
