use crate::draw::{
    read_string, string_encode_size, write_string, Config, Draw, Entry, Transfer, U256,
    MAX_REASON_LENGTH, OP_CREATE_DRAW, OP_LUCK_ROLL, OP_PAY_REWARD, OP_SET_WIN_HASH, OP_TOP_UP,
};
use bytes::{Buf, BufMut};
use commonware_codec::{varint::UInt, EncodeSize, Error, FixedSize, Read, ReadExt, Write};
use commonware_cryptography::{
    ed25519::{self, PublicKey},
    sha256::Digest,
    Signer, Verifier,
};
use commonware_utils::union;

pub const NAMESPACE: &[u8] = b"_LUCKDRAW";
pub const MESSAGE_SUFFIX: &[u8] = b"_MSG";

#[inline]
pub fn message_namespace(namespace: &[u8]) -> Vec<u8> {
    union(namespace, MESSAGE_SUFFIX)
}

/// A decoded draw operation.
///
/// Binary layout is `[opcode:u32 BE]` followed by the variant's fields in order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Operation {
    /// Participant entry.
    /// Binary: [0x0f8a7ea5] [queryId:u64] [drawId:u32] [answer:u256]
    LuckRoll {
        query_id: u64,
        draw_id: u32,
        answer: U256,
    },

    /// Owner settlement.
    /// Binary: [0x2f8170a5] [queryId:u64] [drawId:u32] [winner:32] [revealHash:option<32>]
    PayReward {
        query_id: u64,
        draw_id: u32,
        winner: PublicKey,
        reveal_hash: Option<Digest>,
    },

    /// Open a new draw.
    /// Binary: [0xd372118a] [queryId:u64] [drawId:u32] [minEntryAmount:varint] [keyLength:u256]
    CreateDraw {
        query_id: u64,
        draw_id: u32,
        min_entry_amount: u64,
        key_length: U256,
    },

    /// Publish the winning commitment.
    /// Binary: [0x2f8116a1] [queryId:u64] [drawId:u32] [winHash:32]
    SetWinHash {
        query_id: u64,
        draw_id: u32,
        win_hash: Digest,
    },

    /// Bare value deposit.
    /// Binary: [0xd372158c]
    TopUp,

    /// Any other opcode. The body after the opcode is skipped when decoding.
    Unknown { opcode: u32 },
}

impl Operation {
    pub fn opcode(&self) -> u32 {
        match self {
            Self::LuckRoll { .. } => OP_LUCK_ROLL,
            Self::PayReward { .. } => OP_PAY_REWARD,
            Self::CreateDraw { .. } => OP_CREATE_DRAW,
            Self::SetWinHash { .. } => OP_SET_WIN_HASH,
            Self::TopUp => OP_TOP_UP,
            Self::Unknown { opcode } => *opcode,
        }
    }

    pub fn query_id(&self) -> Option<u64> {
        match self {
            Self::LuckRoll { query_id, .. }
            | Self::PayReward { query_id, .. }
            | Self::CreateDraw { query_id, .. }
            | Self::SetWinHash { query_id, .. } => Some(*query_id),
            Self::TopUp | Self::Unknown { .. } => None,
        }
    }

    pub fn draw_id(&self) -> Option<u32> {
        match self {
            Self::LuckRoll { draw_id, .. }
            | Self::PayReward { draw_id, .. }
            | Self::CreateDraw { draw_id, .. }
            | Self::SetWinHash { draw_id, .. } => Some(*draw_id),
            Self::TopUp | Self::Unknown { .. } => None,
        }
    }
}

impl Write for Operation {
    fn write(&self, writer: &mut impl BufMut) {
        self.opcode().write(writer);
        match self {
            Self::LuckRoll {
                query_id,
                draw_id,
                answer,
            } => {
                query_id.write(writer);
                draw_id.write(writer);
                answer.write(writer);
            }
            Self::PayReward {
                query_id,
                draw_id,
                winner,
                reveal_hash,
            } => {
                query_id.write(writer);
                draw_id.write(writer);
                winner.write(writer);
                reveal_hash.write(writer);
            }
            Self::CreateDraw {
                query_id,
                draw_id,
                min_entry_amount,
                key_length,
            } => {
                query_id.write(writer);
                draw_id.write(writer);
                UInt(*min_entry_amount).write(writer);
                key_length.write(writer);
            }
            Self::SetWinHash {
                query_id,
                draw_id,
                win_hash,
            } => {
                query_id.write(writer);
                draw_id.write(writer);
                win_hash.write(writer);
            }
            Self::TopUp | Self::Unknown { .. } => {}
        }
    }
}

impl Read for Operation {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let operation = match u32::read(reader)? {
            OP_LUCK_ROLL => Self::LuckRoll {
                query_id: u64::read(reader)?,
                draw_id: u32::read(reader)?,
                answer: U256::read(reader)?,
            },
            OP_PAY_REWARD => Self::PayReward {
                query_id: u64::read(reader)?,
                draw_id: u32::read(reader)?,
                winner: PublicKey::read(reader)?,
                reveal_hash: Option::<Digest>::read(reader)?,
            },
            OP_CREATE_DRAW => {
                let query_id = u64::read(reader)?;
                let draw_id = u32::read(reader)?;
                let min_entry_amount: u64 = UInt::read(reader)?.into();
                let key_length = U256::read(reader)?;
                Self::CreateDraw {
                    query_id,
                    draw_id,
                    min_entry_amount,
                    key_length,
                }
            }
            OP_SET_WIN_HASH => Self::SetWinHash {
                query_id: u64::read(reader)?,
                draw_id: u32::read(reader)?,
                win_hash: Digest::read(reader)?,
            },
            OP_TOP_UP => Self::TopUp,
            opcode => {
                reader.advance(reader.remaining());
                Self::Unknown { opcode }
            }
        };

        Ok(operation)
    }
}

impl EncodeSize for Operation {
    fn encode_size(&self) -> usize {
        u32::SIZE
            + match self {
                Self::LuckRoll { .. } => u64::SIZE + u32::SIZE + U256::SIZE,
                Self::PayReward { reveal_hash, .. } => {
                    u64::SIZE + u32::SIZE + PublicKey::SIZE + reveal_hash.encode_size()
                }
                Self::CreateDraw {
                    min_entry_amount, ..
                } => u64::SIZE + u32::SIZE + UInt(*min_entry_amount).encode_size() + U256::SIZE,
                Self::SetWinHash { .. } => u64::SIZE + u32::SIZE + Digest::SIZE,
                Self::TopUp | Self::Unknown { .. } => 0,
            }
    }
}

/// A signed inbound message carrying value and an optional operation.
///
/// `operation` is `None` for an empty body (a plain value deposit). It is encoded last so an
/// unrecognized opcode can consume the rest of the body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    pub value: u64,
    pub operation: Option<Operation>,

    pub public: ed25519::PublicKey,
    pub signature: ed25519::Signature,
}

impl Message {
    fn payload(value: &u64, operation: &Option<Operation>) -> Vec<u8> {
        let mut payload = Vec::new();
        UInt(*value).write(&mut payload);
        operation.write(&mut payload);

        payload
    }

    pub fn sign(private: &ed25519::PrivateKey, value: u64, operation: Option<Operation>) -> Self {
        let signature = private.sign(
            Some(&message_namespace(NAMESPACE)),
            &Self::payload(&value, &operation),
        );

        Self {
            value,
            operation,
            public: private.public_key(),
            signature,
        }
    }

    pub fn verify(&self) -> bool {
        self.public.verify(
            Some(&message_namespace(NAMESPACE)),
            &Self::payload(&self.value, &self.operation),
            &self.signature,
        )
    }
}

impl Write for Message {
    fn write(&self, writer: &mut impl BufMut) {
        UInt(self.value).write(writer);
        self.public.write(writer);
        self.signature.write(writer);
        self.operation.write(writer);
    }
}

impl Read for Message {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let value: u64 = UInt::read(reader)?.into();
        let public = ed25519::PublicKey::read(reader)?;
        let signature = ed25519::Signature::read(reader)?;
        let operation = Option::<Operation>::read(reader)?;

        Ok(Self {
            value,
            operation,
            public,
            signature,
        })
    }
}

impl EncodeSize for Message {
    fn encode_size(&self) -> usize {
        UInt(self.value).encode_size()
            + self.public.encode_size()
            + self.signature.encode_size()
            + self.operation.encode_size()
    }
}

/// Anything the contract can be asked to process.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Inbound {
    /// A signed message from an account.
    Message(Message),
    /// One of the contract's own transfers returned as undeliverable.
    Bounce(Transfer),
}

impl Write for Inbound {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Self::Message(message) => {
                0u8.write(writer);
                message.write(writer);
            }
            Self::Bounce(transfer) => {
                1u8.write(writer);
                transfer.write(writer);
            }
        }
    }
}

impl Read for Inbound {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let inbound = match u8::read(reader)? {
            0 => Self::Message(Message::read(reader)?),
            1 => Self::Bounce(Transfer::read(reader)?),
            i => return Err(Error::InvalidEnum(i)),
        };
        Ok(inbound)
    }
}

impl EncodeSize for Inbound {
    fn encode_size(&self) -> usize {
        u8::SIZE
            + match self {
                Self::Message(message) => message.encode_size(),
                Self::Bounce(transfer) => transfer.encode_size(),
            }
    }
}

#[derive(Hash, Eq, PartialEq, Ord, PartialOrd, Clone, Debug)]
pub enum Key {
    /// Contract configuration (tag 0)
    Config,
    /// Draw record (tag 1)
    Draw(u32),
    /// Entry `index` of a draw (tag 2)
    Entry { draw_id: u32, index: u32 },
}

impl Write for Key {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Self::Config => 0u8.write(writer),
            Self::Draw(id) => {
                1u8.write(writer);
                id.write(writer);
            }
            Self::Entry { draw_id, index } => {
                2u8.write(writer);
                draw_id.write(writer);
                index.write(writer);
            }
        }
    }
}

impl Read for Key {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let key = match u8::read(reader)? {
            0 => Self::Config,
            1 => Self::Draw(u32::read(reader)?),
            2 => Self::Entry {
                draw_id: u32::read(reader)?,
                index: u32::read(reader)?,
            },
            i => return Err(Error::InvalidEnum(i)),
        };

        Ok(key)
    }
}

impl EncodeSize for Key {
    fn encode_size(&self) -> usize {
        u8::SIZE
            + match self {
                Self::Config => 0,
                Self::Draw(_) => u32::SIZE,
                Self::Entry { .. } => u32::SIZE + u32::SIZE,
            }
    }
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub enum Value {
    Config(Config),
    Draw(Draw),
    Entry(Entry),
}

impl Write for Value {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Self::Config(config) => {
                0u8.write(writer);
                config.write(writer);
            }
            Self::Draw(draw) => {
                1u8.write(writer);
                draw.write(writer);
            }
            Self::Entry(entry) => {
                2u8.write(writer);
                entry.write(writer);
            }
        }
    }
}

impl Read for Value {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let value = match u8::read(reader)? {
            0 => Self::Config(Config::read(reader)?),
            1 => Self::Draw(Draw::read(reader)?),
            2 => Self::Entry(Entry::read(reader)?),
            i => return Err(Error::InvalidEnum(i)),
        };

        Ok(value)
    }
}

impl EncodeSize for Value {
    fn encode_size(&self) -> usize {
        u8::SIZE
            + match self {
                Self::Config(config) => config.encode_size(),
                Self::Draw(draw) => draw.encode_size(),
                Self::Entry(entry) => entry.encode_size(),
            }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    // Draw lifecycle (tags 0-3)
    DrawCreated {
        draw_id: u32,
        min_entry_amount: u64,
        key_length: U256,
        query_id: u64,
    },
    EntryRecorded {
        draw_id: u32,
        index: u32,
        player: PublicKey,
        answer: U256,
        amount: u64,
        query_id: u64,
    },
    WinHashSet {
        draw_id: u32,
        win_hash: Digest,
        query_id: u64,
    },
    RewardPaid {
        draw_id: u32,
        winner: PublicKey,
        amount: u64,
        query_id: u64,
    },

    // Value movement (tags 4-5)
    ToppedUp {
        from: PublicKey,
        amount: u64,
    },
    BounceIgnored {
        transfer: Transfer,
    },

    // Rejection (tag 6)
    Rejected {
        sender: PublicKey,
        query_id: Option<u64>,
        code: u32,
        reason: String,
    },
}

impl Write for Event {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Self::DrawCreated {
                draw_id,
                min_entry_amount,
                key_length,
                query_id,
            } => {
                0u8.write(writer);
                draw_id.write(writer);
                UInt(*min_entry_amount).write(writer);
                key_length.write(writer);
                query_id.write(writer);
            }
            Self::EntryRecorded {
                draw_id,
                index,
                player,
                answer,
                amount,
                query_id,
            } => {
                1u8.write(writer);
                draw_id.write(writer);
                index.write(writer);
                player.write(writer);
                answer.write(writer);
                UInt(*amount).write(writer);
                query_id.write(writer);
            }
            Self::WinHashSet {
                draw_id,
                win_hash,
                query_id,
            } => {
                2u8.write(writer);
                draw_id.write(writer);
                win_hash.write(writer);
                query_id.write(writer);
            }
            Self::RewardPaid {
                draw_id,
                winner,
                amount,
                query_id,
            } => {
                3u8.write(writer);
                draw_id.write(writer);
                winner.write(writer);
                UInt(*amount).write(writer);
                query_id.write(writer);
            }
            Self::ToppedUp { from, amount } => {
                4u8.write(writer);
                from.write(writer);
                UInt(*amount).write(writer);
            }
            Self::BounceIgnored { transfer } => {
                5u8.write(writer);
                transfer.write(writer);
            }
            Self::Rejected {
                sender,
                query_id,
                code,
                reason,
            } => {
                6u8.write(writer);
                sender.write(writer);
                query_id.write(writer);
                code.write(writer);
                write_string(reason, writer);
            }
        }
    }
}

impl Read for Event {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let event = match u8::read(reader)? {
            0 => {
                let draw_id = u32::read(reader)?;
                let min_entry_amount: u64 = UInt::read(reader)?.into();
                Self::DrawCreated {
                    draw_id,
                    min_entry_amount,
                    key_length: U256::read(reader)?,
                    query_id: u64::read(reader)?,
                }
            }
            1 => {
                let draw_id = u32::read(reader)?;
                let index = u32::read(reader)?;
                let player = PublicKey::read(reader)?;
                let answer = U256::read(reader)?;
                let amount: u64 = UInt::read(reader)?.into();
                Self::EntryRecorded {
                    draw_id,
                    index,
                    player,
                    answer,
                    amount,
                    query_id: u64::read(reader)?,
                }
            }
            2 => Self::WinHashSet {
                draw_id: u32::read(reader)?,
                win_hash: Digest::read(reader)?,
                query_id: u64::read(reader)?,
            },
            3 => {
                let draw_id = u32::read(reader)?;
                let winner = PublicKey::read(reader)?;
                let amount: u64 = UInt::read(reader)?.into();
                Self::RewardPaid {
                    draw_id,
                    winner,
                    amount,
                    query_id: u64::read(reader)?,
                }
            }
            4 => {
                let from = PublicKey::read(reader)?;
                let amount: u64 = UInt::read(reader)?.into();
                Self::ToppedUp { from, amount }
            }
            5 => Self::BounceIgnored {
                transfer: Transfer::read(reader)?,
            },
            6 => Self::Rejected {
                sender: PublicKey::read(reader)?,
                query_id: Option::<u64>::read(reader)?,
                code: u32::read(reader)?,
                reason: read_string(reader, MAX_REASON_LENGTH)?,
            },
            i => return Err(Error::InvalidEnum(i)),
        };

        Ok(event)
    }
}

impl EncodeSize for Event {
    fn encode_size(&self) -> usize {
        u8::SIZE
            + match self {
                Self::DrawCreated {
                    min_entry_amount, ..
                } => u32::SIZE + UInt(*min_entry_amount).encode_size() + U256::SIZE + u64::SIZE,
                Self::EntryRecorded { amount, .. } => {
                    u32::SIZE
                        + u32::SIZE
                        + PublicKey::SIZE
                        + U256::SIZE
                        + UInt(*amount).encode_size()
                        + u64::SIZE
                }
                Self::WinHashSet { .. } => u32::SIZE + Digest::SIZE + u64::SIZE,
                Self::RewardPaid { amount, .. } => {
                    u32::SIZE + PublicKey::SIZE + UInt(*amount).encode_size() + u64::SIZE
                }
                Self::ToppedUp { amount, .. } => PublicKey::SIZE + UInt(*amount).encode_size(),
                Self::BounceIgnored { transfer } => transfer.encode_size(),
                Self::Rejected {
                    query_id, reason, ..
                } => {
                    PublicKey::SIZE
                        + query_id.encode_size()
                        + u32::SIZE
                        + string_encode_size(reason)
                }
            }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use commonware_codec::{DecodeExt, Encode};
    use commonware_cryptography::{ed25519::PrivateKey, sha256::Sha256, Hasher, PrivateKeyExt};

    fn create_draw() -> Operation {
        Operation::CreateDraw {
            query_id: 242342,
            draw_id: 10,
            min_entry_amount: 1_000_000_000,
            key_length: U256::from(255u64),
        }
    }

    #[test]
    fn test_operation_starts_with_big_endian_opcode() {
        let encoded = create_draw().encode();
        assert_eq!(&encoded[..4], &[0xd3, 0x72, 0x11, 0x8a]);
        assert_eq!(encoded.len(), create_draw().encode_size());

        let encoded = Operation::TopUp.encode();
        assert_eq!(encoded.as_ref(), &[0xd3, 0x72, 0x15, 0x8c]);
    }

    #[test]
    fn test_unknown_opcode_skips_body() {
        let mut body = Vec::new();
        0xdeadbeefu32.write(&mut body);
        1u64.write(&mut body);

        let decoded = Operation::decode(body.as_slice()).expect("unknown opcode decodes");
        assert_eq!(decoded, Operation::Unknown { opcode: 0xdeadbeef });
        assert_eq!(decoded.query_id(), None);
        assert_eq!(decoded.draw_id(), None);
    }

    #[test]
    fn test_pay_reward_with_and_without_reveal() {
        let winner = PrivateKey::from_seed(3).public_key();
        for reveal_hash in [None, Some(Sha256::hash(b"reveal"))] {
            let op = Operation::PayReward {
                query_id: 4,
                draw_id: 1,
                winner: winner.clone(),
                reveal_hash,
            };
            let decoded = Operation::decode(op.encode()).expect("pay reward decodes");
            assert_eq!(decoded, op);
        }
    }

    #[test]
    fn test_truncated_operation_is_rejected() {
        let encoded = create_draw().encode();
        let truncated = &encoded[..encoded.len() - 1];
        assert!(Operation::decode(truncated).is_err());
    }

    #[test]
    fn test_message_signature_covers_value_and_operation() {
        let private = PrivateKey::from_seed(1);
        let message = Message::sign(&private, 2_000_000_000, Some(create_draw()));
        assert!(message.verify());

        let mut inflated = message.clone();
        inflated.value = 3_000_000_000;
        assert!(!inflated.verify());

        let mut swapped = message.clone();
        swapped.operation = Some(Operation::TopUp);
        assert!(!swapped.verify());

        let decoded = Message::decode(message.encode()).expect("message decodes");
        assert_eq!(decoded, message);
        assert!(decoded.verify());
    }

    #[test]
    fn test_empty_body_message_decodes() {
        let private = PrivateKey::from_seed(1);
        let message = Message::sign(&private, 500_000_000, None);
        let decoded = Message::decode(message.encode()).expect("message decodes");
        assert_eq!(decoded.operation, None);
        assert!(decoded.verify());
    }

    #[test]
    fn test_inbound_rejects_unknown_tag() {
        assert!(matches!(
            Inbound::decode([9u8].as_ref()),
            Err(Error::InvalidEnum(9))
        ));
    }

    #[test]
    fn test_keys_order_by_draw_then_entry() {
        let mut keys = vec![
            Key::Entry {
                draw_id: 2,
                index: 0,
            },
            Key::Draw(2),
            Key::Entry {
                draw_id: 1,
                index: 1,
            },
            Key::Config,
            Key::Draw(1),
        ];
        keys.sort();
        assert_eq!(keys[0], Key::Config);
        assert_eq!(keys[1], Key::Draw(1));
        assert_eq!(keys[2], Key::Draw(2));
        for key in &keys {
            assert_eq!(Key::decode(key.encode()).expect("key decodes"), *key);
        }
    }

    #[test]
    fn test_rejected_event_carries_reason() {
        let event = Event::Rejected {
            sender: PrivateKey::from_seed(5).public_key(),
            query_id: Some(7),
            code: 1009,
            reason: "draw 999 not found".to_string(),
        };
        let encoded = event.encode();
        assert_eq!(encoded.len(), event.encode_size());
        assert_eq!(Event::decode(encoded).expect("event decodes"), event);
    }
}
