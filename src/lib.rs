//! agentchat is a terminal chat client for a multi-agent assistant service.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns the transcript, the exchange cycle against the remote
//!   endpoint, and configuration.
//! - [`ui`] renders the terminal interface, runs the interactive event loop,
//!   and contains rendering faults.
//! - [`api`] defines the JSON payloads exchanged with the endpoint.
//! - [`utils`] holds logging setup and the process-wide panic hook.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`].

pub mod api;
pub mod cli;
pub mod core;
pub mod ui;
pub mod utils;
