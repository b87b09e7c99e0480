//! Storage layer for cadence
//!
//! Atomic whole-document file I/O plus the event store seam consumed by
//! the analytics and forecast engines.

pub mod events;
pub mod file_io;

pub use events::{EventFilter, EventStore, JsonEventStore};
pub use file_io::{read_json, read_json_required, read_yaml, write_json_atomic, write_yaml_atomic};
