//! Transport builder
//!
//! - `core`: the builder type, errors and the connect entry points
//! - `options`: socket tuning and trust setters
//! - `proxy`: proxy selection

pub mod core;
pub mod options;
pub mod proxy;

pub use core::{ConnectError, TransportBuilder};
