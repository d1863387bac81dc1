#![deny(missing_docs)]

//! Core library for the SparkyFitness MCP server.

/// HTTP routing for the streamable HTTP transport.
pub mod api;
/// Environment-driven configuration management.
pub mod config;
/// Structured logging and tracing setup.
pub mod logging;
/// Model Context Protocol server implementation.
pub mod mcp;
/// SparkyFitness backend client and wire types.
pub mod sparkyfitness;
/// Stdio and HTTP transports.
pub mod transport;
