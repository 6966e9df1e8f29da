/// Opcode of a participant entry.
pub const OP_LUCK_ROLL: u32 = 0x0f8a7ea5;

/// Opcode of the owner's settlement (winner + reveal).
pub const OP_PAY_REWARD: u32 = 0x2f8170a5;

/// Opcode opening a new draw.
pub const OP_CREATE_DRAW: u32 = 0xd372118a;

/// Opcode publishing the winning commitment.
pub const OP_SET_WIN_HASH: u32 = 0x2f8116a1;

/// Opcode of a bare value deposit.
pub const OP_TOP_UP: u32 = 0xd372158c;

/// Exit codes reported with rejected operations.
pub const ERROR_NOT_OWNER: u32 = 73;
pub const ERROR_DRAW_ALREADY_EXISTS: u32 = 1004;
pub const ERROR_DRAW_NOT_FOUND: u32 = 1009;
pub const ERROR_INSUFFICIENT_ENTRY_AMOUNT: u32 = 449;
pub const ERROR_HASH_NOT_SET: u32 = 2001;
pub const ERROR_INVALID_HASH: u32 = 2002;
pub const ERROR_WINNER_ALREADY_FOUND: u32 = 2009;
pub const ERROR_UNKNOWN_OPERATION: u32 = 0xffff;

/// Maximum length of the human readable reason attached to a rejection.
pub const MAX_REASON_LENGTH: usize = 256;

/// Length of a 256-bit word in bytes.
pub const WORD_LENGTH: usize = 32;
