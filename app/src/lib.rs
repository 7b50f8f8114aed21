//! QR label generator: configuration, logging, CLI commands and HTTP API
//! on top of `label-engine` and `row-source`.

pub mod cli;
pub mod commands;
pub mod config;
pub mod logging;
pub mod pipeline;
pub mod server;
pub mod summary;
