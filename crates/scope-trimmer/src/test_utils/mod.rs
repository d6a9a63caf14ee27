//! Shared fixtures for unit tests and benchmarks.

pub mod fake_host;
pub mod fixture_project;
