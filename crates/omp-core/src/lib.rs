//! Core plumbing for the OMP protocol engine.
//!
//! This crate carries the pieces of the protocol front end that are
//! independent of any particular command grammar:
//!
//! - Error taxonomy and protocol status codes
//! - The SAX-style XML event source adapter
//! - Output sinks with first-class backpressure
//! - XML writing and escaping helpers
//! - Filter term parsing and pagination queries
//! - Logging setup

pub mod constants;
pub mod error;
pub mod event;
pub mod filter;
pub mod logging;
pub mod sink;
pub mod status;
pub mod xml;

pub use error::{Error, Result};
pub use status::StatusCode;
