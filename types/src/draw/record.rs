use super::constants::WORD_LENGTH;
use bytes::{Buf, BufMut};
use commonware_codec::{varint::UInt, EncodeSize, Error, FixedSize, Read, ReadExt, Write};
use commonware_cryptography::{ed25519::PublicKey, sha256::Digest};
use std::fmt;

/// Opaque 256-bit unsigned integer, stored big-endian.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct U256(pub [u8; WORD_LENGTH]);

impl U256 {
    pub const ZERO: Self = Self([0u8; WORD_LENGTH]);

    pub fn as_bytes(&self) -> &[u8; WORD_LENGTH] {
        &self.0
    }
}

impl From<u64> for U256 {
    fn from(value: u64) -> Self {
        let mut word = [0u8; WORD_LENGTH];
        word[WORD_LENGTH - 8..].copy_from_slice(&value.to_be_bytes());
        Self(word)
    }
}

impl From<[u8; WORD_LENGTH]> for U256 {
    fn from(word: [u8; WORD_LENGTH]) -> Self {
        Self(word)
    }
}

impl fmt::Debug for U256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "U256({})", commonware_utils::hex(&self.0))
    }
}

impl fmt::Display for U256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", commonware_utils::hex(&self.0))
    }
}

impl Write for U256 {
    fn write(&self, writer: &mut impl BufMut) {
        writer.put_slice(&self.0);
    }
}

impl Read for U256 {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        if reader.remaining() < WORD_LENGTH {
            return Err(Error::EndOfBuffer);
        }
        let mut word = [0u8; WORD_LENGTH];
        reader.copy_to_slice(&mut word);
        Ok(Self(word))
    }
}

impl FixedSize for U256 {
    const SIZE: usize = WORD_LENGTH;
}

/// Contract-wide configuration, written once at deployment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Sole authority over draw creation, commitments and payouts.
    pub owner: PublicKey,
    /// Owner fee rate. Persisted and reported, never deducted from payouts.
    pub fee: u16,
}

impl Write for Config {
    fn write(&self, writer: &mut impl BufMut) {
        self.owner.write(writer);
        self.fee.write(writer);
    }
}

impl Read for Config {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            owner: PublicKey::read(reader)?,
            fee: u16::read(reader)?,
        })
    }
}

impl FixedSize for Config {
    const SIZE: usize = PublicKey::SIZE + u16::SIZE;
}

/// Lifecycle phase of a draw, derived from which optional fields are present.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrawPhase {
    /// Accepting entries, no commitment yet.
    Open,
    /// Commitment published, still accepting entries.
    Committed,
    /// Winner paid. Terminal.
    Settled,
}

impl fmt::Display for DrawPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Committed => write!(f, "committed"),
            Self::Settled => write!(f, "settled"),
        }
    }
}

/// A single lottery round.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Draw {
    pub id: u32,
    pub min_entry_amount: u64,
    pub key_length: U256,
    pub win_hash: Option<Digest>,
    pub winner: Option<PublicKey>,
    /// Number of accepted entries; also the index of the next entry.
    pub entry_count: u32,
    /// Sum of the value attached to accepted entries.
    pub pot: u64,
}

impl Draw {
    pub fn new(id: u32, min_entry_amount: u64, key_length: U256) -> Self {
        Self {
            id,
            min_entry_amount,
            key_length,
            win_hash: None,
            winner: None,
            entry_count: 0,
            pot: 0,
        }
    }

    pub fn phase(&self) -> DrawPhase {
        match (&self.winner, &self.win_hash) {
            (Some(_), _) => DrawPhase::Settled,
            (None, Some(_)) => DrawPhase::Committed,
            (None, None) => DrawPhase::Open,
        }
    }

    pub fn is_settled(&self) -> bool {
        self.winner.is_some()
    }
}

impl Write for Draw {
    fn write(&self, writer: &mut impl BufMut) {
        self.id.write(writer);
        UInt(self.min_entry_amount).write(writer);
        self.key_length.write(writer);
        self.win_hash.write(writer);
        self.winner.write(writer);
        self.entry_count.write(writer);
        UInt(self.pot).write(writer);
    }
}

impl Read for Draw {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let id = u32::read(reader)?;
        let min_entry_amount: u64 = UInt::read(reader)?.into();
        let key_length = U256::read(reader)?;
        let win_hash = Option::<Digest>::read(reader)?;
        let winner = Option::<PublicKey>::read(reader)?;
        let entry_count = u32::read(reader)?;
        let pot: u64 = UInt::read(reader)?.into();
        Ok(Self {
            id,
            min_entry_amount,
            key_length,
            win_hash,
            winner,
            entry_count,
            pot,
        })
    }
}

impl EncodeSize for Draw {
    fn encode_size(&self) -> usize {
        u32::SIZE
            + UInt(self.min_entry_amount).encode_size()
            + U256::SIZE
            + self.win_hash.encode_size()
            + self.winner.encode_size()
            + u32::SIZE
            + UInt(self.pot).encode_size()
    }
}

/// A participant's paid submission against a draw.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    pub player: PublicKey,
    pub answer: U256,
    pub amount: u64,
    pub query_id: u64,
}

impl Write for Entry {
    fn write(&self, writer: &mut impl BufMut) {
        self.player.write(writer);
        self.answer.write(writer);
        UInt(self.amount).write(writer);
        self.query_id.write(writer);
    }
}

impl Read for Entry {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let player = PublicKey::read(reader)?;
        let answer = U256::read(reader)?;
        let amount: u64 = UInt::read(reader)?.into();
        let query_id = u64::read(reader)?;
        Ok(Self {
            player,
            answer,
            amount,
            query_id,
        })
    }
}

impl EncodeSize for Entry {
    fn encode_size(&self) -> usize {
        PublicKey::SIZE + U256::SIZE + UInt(self.amount).encode_size() + u64::SIZE
    }
}

/// Outbound value transfer requested by a successful payout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transfer {
    pub to: PublicKey,
    pub amount: u64,
    pub draw_id: u32,
}

impl Write for Transfer {
    fn write(&self, writer: &mut impl BufMut) {
        self.to.write(writer);
        UInt(self.amount).write(writer);
        self.draw_id.write(writer);
    }
}

impl Read for Transfer {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let to = PublicKey::read(reader)?;
        let amount: u64 = UInt::read(reader)?.into();
        let draw_id = u32::read(reader)?;
        Ok(Self {
            to,
            amount,
            draw_id,
        })
    }
}

impl EncodeSize for Transfer {
    fn encode_size(&self) -> usize {
        PublicKey::SIZE + UInt(self.amount).encode_size() + u32::SIZE
    }
}
