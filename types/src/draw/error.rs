use super::constants::*;
use thiserror::Error;

/// Reason a draw operation was rejected.
///
/// Every variant maps to a stable exit code (see [`DrawError::code`]). A rejected
/// operation never leaves a partial write behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DrawError {
    #[error("sender is not the contract owner")]
    NotOwner,
    #[error("draw {0} already exists")]
    DrawAlreadyExists(u32),
    #[error("draw {0} not found")]
    DrawNotFound(u32),
    #[error("entry of {attached} does not exceed the minimum of {minimum}")]
    InsufficientEntryAmount { minimum: u64, attached: u64 },
    #[error("draw {0} already has a winner")]
    WinnerAlreadyFound(u32),
    #[error("draw {0} has no win hash")]
    HashNotSet(u32),
    #[error("revealed hash does not match the commitment of draw {0}")]
    InvalidHash(u32),
    #[error("unknown operation {0:#010x}")]
    UnknownOperation(u32),
}

impl DrawError {
    /// Exit code surfaced to the caller.
    pub const fn code(&self) -> u32 {
        match self {
            Self::NotOwner => ERROR_NOT_OWNER,
            Self::DrawAlreadyExists(_) => ERROR_DRAW_ALREADY_EXISTS,
            Self::DrawNotFound(_) => ERROR_DRAW_NOT_FOUND,
            Self::InsufficientEntryAmount { .. } => ERROR_INSUFFICIENT_ENTRY_AMOUNT,
            Self::WinnerAlreadyFound(_) => ERROR_WINNER_ALREADY_FOUND,
            Self::HashNotSet(_) => ERROR_HASH_NOT_SET,
            Self::InvalidHash(_) => ERROR_INVALID_HASH,
            Self::UnknownOperation(_) => ERROR_UNKNOWN_OPERATION,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_distinct() {
        let errors = [
            DrawError::NotOwner,
            DrawError::DrawAlreadyExists(1),
            DrawError::DrawNotFound(1),
            DrawError::InsufficientEntryAmount {
                minimum: 1,
                attached: 1,
            },
            DrawError::WinnerAlreadyFound(1),
            DrawError::HashNotSet(1),
            DrawError::InvalidHash(1),
            DrawError::UnknownOperation(0xdeadbeef),
        ];
        let mut codes: Vec<u32> = errors.iter().map(DrawError::code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn unknown_operation_formats_opcode() {
        let err = DrawError::UnknownOperation(0xdeadbeef);
        assert_eq!(err.to_string(), "unknown operation 0xdeadbeef");
    }
}
