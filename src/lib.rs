//! Discovery and routing gateway in front of a pool of task-queue workers.
//!
//! Client requests name an algorithm; the gateway finds a worker that has
//! registered it and forwards the request to that worker's HTTP endpoint.

pub mod catalog;
pub mod clients;
pub mod config;
pub mod error;
pub mod gateway;
pub mod proxy;
pub mod registry;
pub mod results;
pub mod routes;
pub mod selector;
pub mod traits;

#[cfg(test)]
mod testing;

pub use error::{GatewayError, SelectorError};
pub use gateway::Gateway;
