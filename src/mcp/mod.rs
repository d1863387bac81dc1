//! Model Context Protocol (MCP) integration for SparkyFitness.
//!
//! This module exposes the SparkyFitness food database to agent hosts as three tools:
//!
//! - `search_foods`: look up existing foods and their default variant.
//! - `add_food_variant`: attach another serving size to an existing food.
//! - `create_food_variant`: create a new custom food with its default variant.
//!
//! Handlers, schemas, and the dispatch registry live in focused submodules; the transports in
//! [`crate::transport`] serve the same [`SparkyFitnessMcpServer`] over stdio or HTTP.

pub mod handlers;
mod registry;
mod schemas;
mod server;

pub use handlers::FoodTools;
pub use server::SparkyFitnessMcpServer;
