//! Shared fixtures for pipeline tests.

pub mod fixtures;

pub use fixtures::{claim, ok_json_run, MockProvider, NullCache};
