use super::*;
use luckdraw_types::draw::{Config, Draw};

impl<'a, S: State> Layer<'a, S> {
    pub(in crate::layer) async fn config(&self) -> Result<Config> {
        match self.get(&Key::Config).await? {
            Some(Value::Config(config)) => Ok(config),
            Some(other) => anyhow::bail!("unexpected value under config key: {other:?}"),
            None => anyhow::bail!("contract not deployed"),
        }
    }

    pub(in crate::layer) async fn is_owner(&self, public: &PublicKey) -> Result<bool> {
        Ok(self.config().await?.owner == *public)
    }

    pub(in crate::layer) async fn draw(&self, draw_id: u32) -> Result<Option<Draw>> {
        match self.get(&Key::Draw(draw_id)).await? {
            Some(Value::Draw(draw)) => Ok(Some(draw)),
            Some(other) => anyhow::bail!("unexpected value under draw {draw_id}: {other:?}"),
            None => Ok(None),
        }
    }
}

mod draw;
