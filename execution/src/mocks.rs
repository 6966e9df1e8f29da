use crate::{engine::Wallet, state::Memory, Engine};
use anyhow::Result;
use commonware_cryptography::{
    ed25519::{PrivateKey, PublicKey},
    sha256::Digest,
    PrivateKeyExt, Signer,
};
use luckdraw_types::{
    draw::{Config, Transfer, U256},
    execution::{Inbound, Message, Operation},
};

/// Fee used by [`create_engine`].
pub const TEST_FEE: u16 = 1;

/// Creates an account keypair for Ed25519 signatures used by owners and participants
pub fn create_account_keypair(seed: u64) -> (PrivateKey, PublicKey) {
    let private = PrivateKey::from_seed(seed);
    let public = private.public_key();
    (private, public)
}

/// Records every transfer it is asked to perform.
#[derive(Default, Debug)]
pub struct RecordingWallet {
    pub transfers: Vec<Transfer>,
}

impl Wallet for RecordingWallet {
    async fn transfer(&mut self, transfer: &Transfer) -> Result<()> {
        self.transfers.push(transfer.clone());
        Ok(())
    }
}

/// Refuses every transfer.
#[derive(Default, Debug)]
pub struct FailingWallet {
    pub attempts: usize,
}

impl Wallet for FailingWallet {
    async fn transfer(&mut self, transfer: &Transfer) -> Result<()> {
        self.attempts += 1;
        anyhow::bail!("destination {:?} rejected transfer", transfer.to)
    }
}

/// Creates an engine over fresh memory, deployed with `owner` as the contract owner.
pub async fn create_engine<W: Wallet>(owner: &PublicKey, wallet: W) -> Engine<Memory, W> {
    let mut engine = Engine::new(Memory::default(), wallet);
    engine
        .deploy(Config {
            owner: owner.clone(),
            fee: TEST_FEE,
        })
        .await
        .expect("fresh state accepts deployment");
    engine
}

pub fn create_draw(
    private: &PrivateKey,
    query_id: u64,
    draw_id: u32,
    min_entry_amount: u64,
) -> Inbound {
    Inbound::Message(Message::sign(
        private,
        0,
        Some(Operation::CreateDraw {
            query_id,
            draw_id,
            min_entry_amount,
            key_length: U256::from(256u64),
        }),
    ))
}

pub fn luck_roll(
    private: &PrivateKey,
    query_id: u64,
    draw_id: u32,
    answer: u64,
    value: u64,
) -> Inbound {
    Inbound::Message(Message::sign(
        private,
        value,
        Some(Operation::LuckRoll {
            query_id,
            draw_id,
            answer: U256::from(answer),
        }),
    ))
}

pub fn set_win_hash(
    private: &PrivateKey,
    query_id: u64,
    draw_id: u32,
    win_hash: Digest,
) -> Inbound {
    Inbound::Message(Message::sign(
        private,
        0,
        Some(Operation::SetWinHash {
            query_id,
            draw_id,
            win_hash,
        }),
    ))
}

pub fn pay_reward(
    private: &PrivateKey,
    query_id: u64,
    draw_id: u32,
    winner: &PublicKey,
    reveal_hash: Option<Digest>,
) -> Inbound {
    Inbound::Message(Message::sign(
        private,
        0,
        Some(Operation::PayReward {
            query_id,
            draw_id,
            winner: winner.clone(),
            reveal_hash,
        }),
    ))
}

pub fn top_up(private: &PrivateKey, value: u64) -> Inbound {
    Inbound::Message(Message::sign(private, value, Some(Operation::TopUp)))
}

pub fn deposit(private: &PrivateKey, value: u64) -> Inbound {
    Inbound::Message(Message::sign(private, value, None))
}

pub fn unknown(private: &PrivateKey, opcode: u32, value: u64) -> Inbound {
    Inbound::Message(Message::sign(
        private,
        value,
        Some(Operation::Unknown { opcode }),
    ))
}
