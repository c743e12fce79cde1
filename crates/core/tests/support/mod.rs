//! Shared test helpers for `deploywatch-core` integration tests.

pub mod adapter;
