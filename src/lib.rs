//! State Relayer Bot Library
//!
//! Aggregates DeFiChain Ocean statistics into fixed-point records and
//! relays them to the StateRelayer contract on the EVM side

pub mod aggregator;
pub mod chain;
pub mod codec;
pub mod config;
pub mod error;
pub mod ocean;
pub mod relayer;
pub mod sync;
pub mod types;
