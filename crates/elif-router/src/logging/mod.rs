//! Structured logging setup
//!
//! Library code only emits `tracing` events (targets `elif::router` and
//! `elif::middleware`); applications call [`init_logging`] once to install
//! a subscriber.

pub mod config;

pub use config::{init_logging, LoggingConfig};
