//! Shared helpers for integration tests.

#![allow(dead_code)]

// Same guard the unit tests use, compiled into each integration test crate
#[path = "../../src/test_support/socket_guard.rs"]
pub mod socket_guard;
