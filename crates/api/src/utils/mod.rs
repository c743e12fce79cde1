//! Shared helpers for the tool layer

pub mod logging;
