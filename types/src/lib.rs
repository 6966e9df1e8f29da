//! Shared types for the luckdraw contract: draw records, operations, signed
//! messages and the key/value layout used by the execution layer.

pub mod draw;
pub mod execution;
pub use execution::{Event, Inbound, Key, Message, Operation, Value, NAMESPACE};

#[cfg(test)]
mod fuzz_tests;
