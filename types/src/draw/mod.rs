//! Draw domain types.
//!
//! Defines the draw record layout, the contract configuration, rejection codes and the
//! opcode table consumed by the execution layer and clients.

mod codec;
mod constants;
mod error;
mod record;

pub use codec::{read_string, string_encode_size, write_string};
pub use constants::*;
pub use error::DrawError;
pub use record::*;
