use anyhow::{Context as _, Result};
use bytes::{Buf, BufMut};
use commonware_codec::{Encode, EncodeSize, Error, Read, ReadExt, Write};
use commonware_cryptography::{
    sha256::{Digest, Sha256},
    Hasher,
};
use commonware_runtime::{buffer::PoolRef, Clock, Metrics, Spawner, Storage};
use commonware_storage::adb::{self, any::variable::Any as AnyAdb};
use commonware_storage::translator::{EightCap, Translator};
use commonware_utils::{NZUsize, NZU64};
use luckdraw_types::execution::{Key, Value};
use std::future::Future;

#[cfg(any(test, feature = "mocks"))]
use std::collections::BTreeMap;

pub type Adb<E, T> = AnyAdb<E, Digest, Value, Sha256, T>;

pub trait State {
    fn get(&self, key: &Key) -> impl Future<Output = Result<Option<Value>>>;
    fn insert(&mut self, key: Key, value: Value) -> impl Future<Output = Result<()>>;
    fn delete(&mut self, key: &Key) -> impl Future<Output = Result<()>>;

    /// Make every applied change durable. Stores without a log have nothing to do.
    fn persist(&mut self) -> impl Future<Output = Result<()>> {
        async { Ok(()) }
    }

    fn apply(&mut self, changes: Vec<(Key, Status)>) -> impl Future<Output = Result<()>> {
        async {
            for (key, status) in changes {
                match status {
                    Status::Update(value) => self.insert(key, value).await?,
                    Status::Delete => self.delete(&key).await?,
                }
            }
            Ok(())
        }
    }
}

impl<E: Spawner + Metrics + Clock + Storage, T: Translator> State for Adb<E, T> {
    async fn get(&self, key: &Key) -> Result<Option<Value>> {
        let key_hash = Sha256::hash(&key.encode());
        AnyAdb::get(self, &key_hash).await.context("adb get")
    }

    async fn insert(&mut self, key: Key, value: Value) -> Result<()> {
        let key_hash = Sha256::hash(&key.encode());
        self.update(key_hash, value).await.context("adb update")?;
        Ok(())
    }

    async fn delete(&mut self, key: &Key) -> Result<()> {
        let key_hash = Sha256::hash(&key.encode());
        AnyAdb::delete(self, key_hash).await.context("adb delete")?;
        Ok(())
    }

    async fn persist(&mut self) -> Result<()> {
        self.commit(None).await.context("adb commit")?;
        Ok(())
    }
}

/// Opens (or recovers) the contract state stored under `partition_prefix`.
pub async fn create_adb<E: Spawner + Metrics + Clock + Storage>(
    context: E,
    partition_prefix: &str,
) -> Result<Adb<E, EightCap>> {
    let buffer_pool = PoolRef::new(NZUsize!(1024), NZUsize!(1024));
    Adb::init(
        context,
        adb::any::variable::Config {
            mmr_journal_partition: format!("{partition_prefix}-state-mmr-journal"),
            mmr_metadata_partition: format!("{partition_prefix}-state-mmr-metadata"),
            mmr_items_per_blob: NZU64!(1024),
            mmr_write_buffer: NZUsize!(1024),
            log_journal_partition: format!("{partition_prefix}-state-log-journal"),
            log_items_per_section: NZU64!(1024),
            log_write_buffer: NZUsize!(1024),
            log_compression: None,
            log_codec_config: (),
            locations_journal_partition: format!("{partition_prefix}-state-locations-journal"),
            locations_items_per_blob: NZU64!(1024),
            translator: EightCap,
            thread_pool: None,
            buffer_pool,
        },
    )
    .await
    .with_context(|| format!("initialize state adb ({partition_prefix})"))
}

/// Ordered in-memory state.
#[cfg(any(test, feature = "mocks"))]
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct Memory {
    state: BTreeMap<Key, Value>,
}

#[cfg(any(test, feature = "mocks"))]
impl State for Memory {
    async fn get(&self, key: &Key) -> Result<Option<Value>> {
        Ok(self.state.get(key).cloned())
    }

    async fn insert(&mut self, key: Key, value: Value) -> Result<()> {
        self.state.insert(key, value);
        Ok(())
    }

    async fn delete(&mut self, key: &Key) -> Result<()> {
        self.state.remove(key);
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[allow(clippy::large_enum_variant)]
pub enum Status {
    Update(Value),
    Delete,
}

impl Write for Status {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Status::Update(value) => {
                0u8.write(writer);
                value.write(writer);
            }
            Status::Delete => 1u8.write(writer),
        }
    }
}

impl Read for Status {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let kind = u8::read(reader)?;
        match kind {
            0 => Ok(Status::Update(Value::read(reader)?)),
            1 => Ok(Status::Delete),
            _ => Err(Error::InvalidEnum(kind)),
        }
    }
}

impl EncodeSize for Status {
    fn encode_size(&self) -> usize {
        1 + match self {
            Status::Update(value) => value.encode_size(),
            Status::Delete => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use commonware_cryptography::{ed25519::PrivateKey, PrivateKeyExt, Signer};
    use commonware_runtime::{deterministic::Runner, Runner as _};
    use luckdraw_types::draw::{Config, Draw, U256};

    fn config() -> Value {
        Value::Config(Config {
            owner: PrivateKey::from_seed(0).public_key(),
            fee: 1,
        })
    }

    #[test]
    fn test_adb_get_insert_delete() {
        let executor = Runner::default();
        executor.start(|context| async move {
            let mut state = create_adb(context.with_label("state"), "test").await.unwrap();
            assert!(State::get(&state, &Key::Config).await.unwrap().is_none());

            state.insert(Key::Config, config()).await.unwrap();
            let draw = Value::Draw(Draw::new(1, 10, U256::from(256u64)));
            state.insert(Key::Draw(1), draw.clone()).await.unwrap();
            assert_eq!(State::get(&state, &Key::Draw(1)).await.unwrap(), Some(draw));
            assert!(State::get(&state, &Key::Draw(2)).await.unwrap().is_none());

            State::delete(&mut state, &Key::Draw(1)).await.unwrap();
            assert!(State::get(&state, &Key::Draw(1)).await.unwrap().is_none());
            assert_eq!(State::get(&state, &Key::Config).await.unwrap(), Some(config()));
        });
    }

    #[test]
    fn test_adb_recovers_persisted_changes() {
        let executor = Runner::default();
        executor.start(|context| async move {
            let draw = Value::Draw(Draw::new(3, 10, U256::ZERO));
            let mut state = create_adb(context.with_label("first"), "recover").await.unwrap();
            state.insert(Key::Config, config()).await.unwrap();
            state.persist().await.unwrap();
            drop(state);

            let mut state = create_adb(context.with_label("second"), "recover").await.unwrap();
            assert_eq!(State::get(&state, &Key::Config).await.unwrap(), Some(config()));
            assert!(State::get(&state, &Key::Draw(3)).await.unwrap().is_none());

            state.insert(Key::Draw(3), draw.clone()).await.unwrap();
            state.persist().await.unwrap();
            drop(state);

            let state = create_adb(context.with_label("third"), "recover").await.unwrap();
            assert_eq!(State::get(&state, &Key::Draw(3)).await.unwrap(), Some(draw));
        });
    }

    #[test]
    fn test_apply_updates_and_deletes() {
        let executor = Runner::default();
        executor.start(|_| async move {
            let mut state = Memory::default();
            state
                .apply(vec![
                    (Key::Config, Status::Update(config())),
                    (
                        Key::Draw(1),
                        Status::Update(Value::Draw(Draw::new(1, 1, U256::ZERO))),
                    ),
                ])
                .await
                .unwrap();
            assert!(state.get(&Key::Draw(1)).await.unwrap().is_some());

            state
                .apply(vec![(Key::Draw(1), Status::Delete)])
                .await
                .unwrap();
            assert!(state.get(&Key::Draw(1)).await.unwrap().is_none());
            assert!(state.get(&Key::Config).await.unwrap().is_some());
        });
    }
}
