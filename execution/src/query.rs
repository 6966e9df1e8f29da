//! Read-only queries over stored draw state.
//!
//! - [`get_owner`] / [`get_fee`]: contract configuration
//! - [`get_draw`]: a single draw record, `None` if the id was never created
//! - [`get_entries`]: every accepted entry of a draw, in acceptance order
//! - [`draw_status`]: phase and bookkeeping summary of a draw
//!
//! ```rust,ignore
//! use luckdraw_execution::query::{draw_status, get_owner};
//!
//! let owner = get_owner(&state).await?;
//! if let Some(status) = draw_status(&state, 10).await? {
//!     println!("draw 10 is {} with {} entries", status.phase, status.entry_count);
//! }
//! ```

use commonware_cryptography::{ed25519::PublicKey, sha256::Digest};
use luckdraw_types::draw::{Config, Draw, DrawPhase, Entry};
use luckdraw_types::execution::{Key, Value};

use crate::state::State;

#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("contract not deployed")]
    NotDeployed,
    #[error("state error: {0}")]
    State(#[from] anyhow::Error),
    #[error("unexpected value under {0:?}")]
    Corrupt(Key),
}

/// Summary of a draw for display.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DrawStatus {
    pub draw_id: u32,
    pub phase: DrawPhase,
    pub min_entry_amount: u64,
    pub entry_count: u32,
    pub pot: u64,
    pub win_hash: Option<Digest>,
    pub winner: Option<PublicKey>,
}

impl From<&Draw> for DrawStatus {
    fn from(draw: &Draw) -> Self {
        Self {
            draw_id: draw.id,
            phase: draw.phase(),
            min_entry_amount: draw.min_entry_amount,
            entry_count: draw.entry_count,
            pot: draw.pot,
            win_hash: draw.win_hash,
            winner: draw.winner.clone(),
        }
    }
}

pub async fn get_config<S: State>(state: &S) -> Result<Config, QueryError> {
    match state.get(&Key::Config).await? {
        Some(Value::Config(config)) => Ok(config),
        Some(_) => Err(QueryError::Corrupt(Key::Config)),
        None => Err(QueryError::NotDeployed),
    }
}

pub async fn get_owner<S: State>(state: &S) -> Result<PublicKey, QueryError> {
    Ok(get_config(state).await?.owner)
}

pub async fn get_fee<S: State>(state: &S) -> Result<u16, QueryError> {
    Ok(get_config(state).await?.fee)
}

pub async fn get_draw<S: State>(state: &S, draw_id: u32) -> Result<Option<Draw>, QueryError> {
    let key = Key::Draw(draw_id);
    match state.get(&key).await? {
        Some(Value::Draw(draw)) => Ok(Some(draw)),
        Some(_) => Err(QueryError::Corrupt(key)),
        None => Ok(None),
    }
}

/// Entries are stored under consecutive indices `0..entry_count`.
pub async fn get_entries<S: State>(state: &S, draw_id: u32) -> Result<Vec<Entry>, QueryError> {
    let Some(draw) = get_draw(state, draw_id).await? else {
        return Ok(Vec::new());
    };

    let mut entries = Vec::with_capacity(draw.entry_count as usize);
    for index in 0..draw.entry_count {
        let key = Key::Entry { draw_id, index };
        match state.get(&key).await? {
            Some(Value::Entry(entry)) => entries.push(entry),
            _ => return Err(QueryError::Corrupt(key)),
        }
    }
    Ok(entries)
}

pub async fn draw_status<S: State>(
    state: &S,
    draw_id: u32,
) -> Result<Option<DrawStatus>, QueryError> {
    Ok(get_draw(state, draw_id).await?.as_ref().map(DrawStatus::from))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Memory;
    use commonware_cryptography::{ed25519::PrivateKey, sha256::Sha256, Hasher, PrivateKeyExt, Signer};
    use commonware_runtime::{deterministic::Runner, Runner as _};
    use luckdraw_types::draw::U256;

    #[test]
    fn test_queries_before_deploy() {
        let executor = Runner::default();
        executor.start(|_| async move {
            let state = Memory::default();
            assert!(matches!(get_owner(&state).await, Err(QueryError::NotDeployed)));
            assert!(matches!(get_fee(&state).await, Err(QueryError::NotDeployed)));
            assert!(get_draw(&state, 1).await.unwrap().is_none());
            assert!(get_entries(&state, 1).await.unwrap().is_empty());
            assert!(draw_status(&state, 1).await.unwrap().is_none());
        });
    }

    #[test]
    fn test_entries_come_back_in_order() {
        let executor = Runner::default();
        executor.start(|_| async move {
            let mut state = Memory::default();
            let mut draw = Draw::new(4, 10, U256::from(256u64));
            for index in 0..3u32 {
                let entry = Entry {
                    player: PrivateKey::from_seed(index as u64).public_key(),
                    answer: U256::from(index as u64),
                    amount: 11 + index as u64,
                    query_id: index as u64,
                };
                draw.pot += entry.amount;
                draw.entry_count += 1;
                state
                    .insert(Key::Entry { draw_id: 4, index }, Value::Entry(entry))
                    .await
                    .unwrap();
            }
            state.insert(Key::Draw(4), Value::Draw(draw)).await.unwrap();

            let entries = get_entries(&state, 4).await.unwrap();
            assert_eq!(entries.len(), 3);
            assert_eq!(entries[2].answer, U256::from(2u64));

            let status = draw_status(&state, 4).await.unwrap().unwrap();
            assert_eq!(status.phase, DrawPhase::Open);
            assert_eq!(status.pot, 11 + 12 + 13);
            assert_eq!(status.entry_count, 3);
        });
    }

    #[test]
    fn test_missing_entry_is_reported() {
        let executor = Runner::default();
        executor.start(|_| async move {
            let mut state = Memory::default();
            let mut draw = Draw::new(1, 10, U256::ZERO);
            draw.entry_count = 1;
            draw.win_hash = Some(Sha256::hash(b"h"));
            state.insert(Key::Draw(1), Value::Draw(draw)).await.unwrap();

            assert!(matches!(
                get_entries(&state, 1).await,
                Err(QueryError::Corrupt(Key::Entry { draw_id: 1, index: 0 }))
            ));
            let status = draw_status(&state, 1).await.unwrap().unwrap();
            assert_eq!(status.phase, DrawPhase::Committed);
        });
    }
}
