pub mod abi;
pub mod chain;
pub mod config;
pub mod contracts;
pub mod error;
pub mod io;
pub mod network;
pub mod paths;
pub mod pipeline;
pub mod presale;
pub mod registry;
pub mod report;
pub mod resolver;
pub mod rpc;
pub mod treasury;
pub mod types;

#[cfg(test)]
mod testing;

pub use error::{Result, RomeError};
