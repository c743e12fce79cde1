//! Platform access ports

pub mod ports;
