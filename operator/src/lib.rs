use anyhow::{Context as _, Result};
use commonware_codec::DecodeExt;
use commonware_cryptography::ed25519::PublicKey;
use commonware_runtime::{Clock, Metrics, Spawner, Storage};
use commonware_storage::translator::EightCap;
use luckdraw_execution::{create_adb, Adb, Engine, Outcome, State, Wallet};
use luckdraw_types::{
    draw::{self, Transfer},
    execution::{Inbound, Message},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// Configuration for the operator (from config file)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(with = "serde_public_key_hex")]
    pub owner: PublicKey,
    pub fee: u16,
    pub log_level: String,
    pub directory: PathBuf,
    pub partition_prefix: String,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        serde_yaml::from_str(&raw).with_context(|| format!("parse config {}", path.display()))
    }

    pub fn contract(&self) -> draw::Config {
        draw::Config {
            owner: self.owner.clone(),
            fee: self.fee,
        }
    }
}

mod serde_public_key_hex {
    use commonware_codec::ReadExt;
    use commonware_cryptography::ed25519::PublicKey;
    use commonware_utils::{from_hex, hex};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(public_key: &PublicKey, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&hex(public_key.as_ref()))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<PublicKey, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let bytes = from_hex(&s).ok_or_else(|| serde::de::Error::custom("invalid hex string"))?;
        let mut reader = bytes.as_slice();
        PublicKey::read(&mut reader).map_err(|_| serde::de::Error::custom("invalid public key"))
    }
}

/// Logs payouts instead of moving value; the ledger settles them out of band.
#[derive(Default, Debug)]
pub struct LoggingWallet {
    pub paid: Vec<Transfer>,
}

impl Wallet for LoggingWallet {
    async fn transfer(&mut self, transfer: &Transfer) -> Result<()> {
        info!(
            to = %commonware_utils::hex(transfer.to.as_ref()),
            amount = transfer.amount,
            draw_id = transfer.draw_id,
            "payout"
        );
        self.paid.push(transfer.clone());
        Ok(())
    }
}

/// Open the contract state under the configured partition prefix.
pub async fn open_state<E: Spawner + Metrics + Clock + Storage>(
    context: E,
    config: &Config,
) -> Result<Adb<E, EightCap>> {
    create_adb(context, &config.partition_prefix).await
}

/// Counts of how each delivered message was resolved.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Tally {
    pub applied: usize,
    pub rejected: usize,
    pub dropped: usize,
    pub failed: usize,
}

/// Deliver `inbound` in order.
///
/// A message that fails with a storage or arithmetic error is logged and skipped; every
/// message applied before it has already been persisted by the engine.
pub async fn deliver_all<S: State, W: Wallet>(
    engine: &mut Engine<S, W>,
    inbound: Vec<Inbound>,
) -> Tally {
    let mut tally = Tally::default();
    for (index, message) in inbound.into_iter().enumerate() {
        let receipt = match engine.deliver(message).await {
            Ok(receipt) => receipt,
            Err(err) => {
                error!(index, ?err, "message failed");
                tally.failed += 1;
                continue;
            }
        };
        match &receipt.outcome {
            Outcome::Applied => tally.applied += 1,
            Outcome::Rejected(err) => {
                tally.rejected += 1;
                warn!(index, code = err.code(), %err, "message rejected");
            }
            Outcome::Dropped => tally.dropped += 1,
        }
        for event in &receipt.events {
            println!("{event:?}");
        }
    }
    tally
}

/// Parse one hex-encoded signed message per line. Blank lines and `#` comments are skipped.
pub fn parse_messages(input: &str) -> Result<Vec<Inbound>> {
    let mut messages = Vec::new();
    for (number, line) in input.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let bytes = commonware_utils::from_hex(line)
            .with_context(|| format!("line {}: invalid hex", number + 1))?;
        let message = Message::decode(bytes.as_slice())
            .with_context(|| format!("line {}: invalid message", number + 1))?;
        messages.push(Inbound::Message(message));
    }
    Ok(messages)
}
