use anyhow::Result;
use commonware_cryptography::ed25519::PublicKey;
use luckdraw_types::{
    draw::{DrawError, Transfer},
    execution::{Event, Key, Operation, Value},
};
use std::collections::BTreeMap;
use tracing::debug;

use crate::state::{State, Status};

mod handlers;

/// What a successfully handled operation produced.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Effect {
    pub events: Vec<Event>,
    pub transfer: Option<Transfer>,
}

impl Effect {
    pub(crate) fn event(event: Event) -> Self {
        Self {
            events: vec![event],
            transfer: None,
        }
    }
}

/// Staging area for a single dispatch.
///
/// Reads fall through to the backing state; writes accumulate in `pending` and are only
/// returned by [`Layer::commit`]. A rejected operation leaves `pending` exactly as it was
/// before the operation was handled.
pub struct Layer<'a, S: State> {
    state: &'a S,
    pending: BTreeMap<Key, Status>,
}

impl<'a, S: State> Layer<'a, S> {
    pub fn new(state: &'a S) -> Self {
        Self {
            state,
            pending: BTreeMap::new(),
        }
    }

    fn insert(&mut self, key: Key, value: Value) {
        self.pending.insert(key, Status::Update(value));
    }

    /// Dispatch one operation sent by `sender` with `value` attached.
    ///
    /// The outer `Result` carries storage failures; the inner one carries the rejection
    /// reason for operations that fail validation.
    pub async fn handle(
        &mut self,
        sender: &PublicKey,
        value: u64,
        operation: Option<&Operation>,
    ) -> Result<Result<Effect, DrawError>> {
        let checkpoint = self.pending.clone();
        let result = self.dispatch(sender, value, operation).await;
        match &result {
            Ok(Ok(effect)) => {
                debug!(
                    sender = ?sender,
                    value,
                    events = effect.events.len(),
                    transfer = effect.transfer.is_some(),
                    "operation applied"
                );
            }
            Ok(Err(err)) => {
                debug!(sender = ?sender, value, code = err.code(), %err, "operation rejected");
                self.pending = checkpoint;
            }
            Err(_) => self.pending = checkpoint,
        }
        result
    }

    async fn dispatch(
        &mut self,
        sender: &PublicKey,
        value: u64,
        operation: Option<&Operation>,
    ) -> Result<Result<Effect, DrawError>> {
        let Some(operation) = operation else {
            return Ok(Ok(self.handle_top_up(sender, value)));
        };

        match operation {
            Operation::CreateDraw {
                query_id,
                draw_id,
                min_entry_amount,
                key_length,
            } => {
                self.handle_create_draw(sender, *query_id, *draw_id, *min_entry_amount, *key_length)
                    .await
            }
            Operation::LuckRoll {
                query_id,
                draw_id,
                answer,
            } => {
                self.handle_luck_roll(sender, value, *query_id, *draw_id, *answer)
                    .await
            }
            Operation::SetWinHash {
                query_id,
                draw_id,
                win_hash,
            } => {
                self.handle_set_win_hash(sender, *query_id, *draw_id, *win_hash)
                    .await
            }
            Operation::PayReward {
                query_id,
                draw_id,
                winner,
                reveal_hash,
            } => {
                self.handle_pay_reward(sender, *query_id, *draw_id, winner, reveal_hash.as_ref())
                    .await
            }
            Operation::TopUp => Ok(Ok(self.handle_top_up(sender, value))),
            Operation::Unknown { opcode } => Ok(Err(DrawError::UnknownOperation(*opcode))),
        }
    }

    pub fn commit(self) -> Vec<(Key, Status)> {
        self.pending.into_iter().collect()
    }
}

impl<'a, S: State> State for Layer<'a, S> {
    async fn get(&self, key: &Key) -> Result<Option<Value>> {
        Ok(match self.pending.get(key) {
            Some(Status::Update(value)) => Some(value.clone()),
            Some(Status::Delete) => None,
            None => self.state.get(key).await?,
        })
    }

    async fn insert(&mut self, key: Key, value: Value) -> Result<()> {
        self.pending.insert(key, Status::Update(value));
        Ok(())
    }

    async fn delete(&mut self, key: &Key) -> Result<()> {
        self.pending.insert(key.clone(), Status::Delete);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::create_account_keypair;
    use crate::state::Memory;
    use commonware_runtime::deterministic::Runner;
    use commonware_runtime::Runner as _;
    use luckdraw_types::draw::{Config, U256};

    async fn deployed(owner: &PublicKey) -> Memory {
        let mut state = Memory::default();
        state
            .insert(
                Key::Config,
                Value::Config(Config {
                    owner: owner.clone(),
                    fee: 1,
                }),
            )
            .await
            .unwrap();
        state
    }

    fn create(draw_id: u32) -> Operation {
        Operation::CreateDraw {
            query_id: 0,
            draw_id,
            min_entry_amount: 10,
            key_length: U256::from(256u64),
        }
    }

    #[test]
    fn test_rejection_keeps_earlier_staged_writes() {
        let executor = Runner::default();
        executor.start(|_| async move {
            let (_, owner) = create_account_keypair(0);
            let state = deployed(&owner).await;
            let mut layer = Layer::new(&state);

            assert!(layer.handle(&owner, 0, Some(&create(1))).await.unwrap().is_ok());
            let roll = Operation::LuckRoll {
                query_id: 1,
                draw_id: 1,
                answer: U256::ZERO,
            };
            assert_eq!(
                layer.handle(&owner, 10, Some(&roll)).await.unwrap(),
                Err(DrawError::InsufficientEntryAmount {
                    minimum: 10,
                    attached: 10
                })
            );
            assert_eq!(
                layer.handle(&owner, 0, Some(&create(1))).await.unwrap(),
                Err(DrawError::DrawAlreadyExists(1))
            );

            let changes = layer.commit();
            assert_eq!(changes.len(), 1);
            assert_eq!(changes[0].0, Key::Draw(1));
        });
    }

    #[test]
    fn test_reads_see_pending_writes() {
        let executor = Runner::default();
        executor.start(|_| async move {
            let (_, owner) = create_account_keypair(0);
            let state = deployed(&owner).await;
            let mut layer = Layer::new(&state);

            layer.handle(&owner, 0, Some(&create(7))).await.unwrap().unwrap();
            assert!(layer.get(&Key::Draw(7)).await.unwrap().is_some());
            assert!(state.get(&Key::Draw(7)).await.unwrap().is_none());
        });
    }

    #[test]
    fn test_owner_operation_before_deploy_is_an_error() {
        let executor = Runner::default();
        executor.start(|_| async move {
            let (_, owner) = create_account_keypair(0);
            let state = Memory::default();
            let mut layer = Layer::new(&state);

            assert!(layer.handle(&owner, 0, Some(&create(1))).await.is_err());
            assert!(layer.commit().is_empty());
        });
    }

    #[test]
    fn test_empty_body_is_a_deposit() {
        let executor = Runner::default();
        executor.start(|_| async move {
            let (_, owner) = create_account_keypair(0);
            let state = deployed(&owner).await;
            let mut layer = Layer::new(&state);

            let effect = layer.handle(&owner, 42, None).await.unwrap().unwrap();
            assert_eq!(
                effect.events,
                vec![Event::ToppedUp {
                    from: owner.clone(),
                    amount: 42
                }]
            );
            assert!(layer.commit().is_empty());
        });
    }
}
