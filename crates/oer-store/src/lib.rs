//! OER Store - SQLite persistence for the release engine
//!
//! Provides:
//! - SQLite schema with migrations framework
//! - Repositories for stored metadata, course info, host course data,
//!   settings and the audit log
//! - Snapshot ledger with compare-and-insert
//! - Seed Format v0 parser, importer and seed-backed source plugins

pub mod db;
pub mod errors;
pub mod migrations;
pub mod repo;
pub mod seed;
pub mod snapshot;

pub use errors::Result;
