//! OMP protocol engine.
//!
//! This crate is the command-protocol front end of a scan management
//! daemon. It consumes a stream of XML events, tracks per-connection
//! parsing state, accumulates command payloads, validates and dispatches
//! them against a [`backend::Backend`], and writes structured XML
//! responses — without ever materializing a DOM.
//!
//! The layering, bytes in to bytes out:
//!
//! ```text
//! EventReader --> Session --> per-command parser --> Command
//!                    |                                  |
//!                    v                                  v
//!               OutputSink  <--  ResponseWriter  <-- dispatch
//! ```
//!
//! Transport (sockets, TLS) and the persistent resource store are
//! external; the store is reached only through the [`backend::Backend`]
//! trait.

pub mod backend;
pub mod command;
pub mod config;
pub mod dispatch;
pub mod parser;
pub mod response;
pub mod session;
pub mod wizard;

pub use config::EngineConfig;
pub use session::{Flow, Session};
