#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::redundant_pub_crate)]

//! Administrative CLI for the AAA identity store of a controller node.
//!
//! Layout:
//! - `cli.rs`: argument parsing, session setup, and command dispatch
//! - `commands/`: command handlers grouped by resource
//! - `client.rs`: shared context, credentials, and CLI error type
//! - `transport.rs`: request model and the single HTTP call per request
//! - `response.rs`: status classification and failure diagnostics
//! - `prompt.rs`: masked password entry
//! - `output.rs`: success rendering
//! - `main.rs`: thin entrypoint delegating to `run()`

pub(crate) mod cli;
pub(crate) mod client;
pub(crate) mod commands;
pub(crate) mod output;
pub(crate) mod prompt;
pub(crate) mod response;
pub(crate) mod transport;

pub use cli::run;
