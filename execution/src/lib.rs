//! Luckdraw execution layer.
//!
//! This crate contains the draw lifecycle state machine (`Layer`), the message driver
//! (`Engine`) that commits accepted operations and executes payouts, and read-only queries.
//!
//! ## Determinism requirements
//! - Messages are handled strictly one at a time; each is a function of (state, sender,
//!   attached value, operation).
//! - Do not use wall-clock time or randomness inside execution.
//! - Durable state is an ADB keyed by the sha256 of each encoded `Key`; nothing iterates it.
//!
//! ## Atomicity
//! Handlers validate before they write, and every write is staged in the `Layer`. A
//! rejected operation is discarded with its layer; nothing reaches the backing `State`.
//! Accepted changes are persisted before any payout leaves the contract.
//!
//! ## Minimal pipeline (example)
//! ```rust,ignore
//! use luckdraw_execution::{mocks, Engine, Memory};
//!
//! let (owner, owner_public) = mocks::create_account_keypair(0);
//! let mut engine = mocks::create_engine(&owner_public, mocks::RecordingWallet::default()).await;
//! let receipt = engine.deliver(mocks::create_draw(&owner, 1, 10, 1_000)).await?;
//! assert!(receipt.is_applied());
//! ```

pub mod commitment;
pub mod engine;
pub mod query;

#[cfg(any(test, feature = "mocks"))]
pub mod mocks;

mod layer;
mod state;

pub use engine::{Engine, Outcome, Receipt, Wallet};
pub use layer::{Effect, Layer};
pub use state::{create_adb, Adb, State, Status};

#[cfg(any(test, feature = "mocks"))]
pub use state::Memory;
