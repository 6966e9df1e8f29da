//! Message driver.
//!
//! [`Engine`] owns the committed state and the transfer primitive. Each inbound item is
//! handled in its own [`Layer`]; staged writes reach the state only when the operation is
//! accepted, and a payout is handed to the [`Wallet`] only after its state change is applied
//! and persisted.

use anyhow::{Context as _, Result};
use commonware_cryptography::ed25519::PublicKey;
use luckdraw_types::{
    draw::{Config, Draw, DrawError, Entry, Transfer},
    execution::{Event, Inbound, Key, Message, Value},
};
use std::future::Future;
use tracing::{debug, info, warn};

use crate::{
    layer::{Effect, Layer},
    query::{self, QueryError},
    state::State,
};

/// Moves value out of the contract.
pub trait Wallet {
    fn transfer(&mut self, transfer: &Transfer) -> impl Future<Output = Result<()>>;
}

/// How an inbound item was resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Operation accepted and its changes applied.
    Applied,
    /// Operation failed validation; state untouched.
    Rejected(DrawError),
    /// Signature did not verify; nothing was processed.
    Dropped,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Receipt {
    pub outcome: Outcome,
    pub events: Vec<Event>,
    pub transfer: Option<Transfer>,
    /// The wallet refused `transfer`. The draw stays settled.
    pub bounced: bool,
}

impl Receipt {
    fn applied(effect: Effect) -> Self {
        Self {
            outcome: Outcome::Applied,
            events: effect.events,
            transfer: effect.transfer,
            bounced: false,
        }
    }

    fn rejected(message: &Message, err: DrawError) -> Self {
        Self {
            outcome: Outcome::Rejected(err),
            events: vec![Event::Rejected {
                sender: message.public.clone(),
                query_id: message.operation.as_ref().and_then(|op| op.query_id()),
                code: err.code(),
                reason: err.to_string(),
            }],
            transfer: None,
            bounced: false,
        }
    }

    fn dropped() -> Self {
        Self {
            outcome: Outcome::Dropped,
            events: Vec::new(),
            transfer: None,
            bounced: false,
        }
    }

    pub fn is_applied(&self) -> bool {
        self.outcome == Outcome::Applied
    }

    /// Exit code of a rejected operation.
    pub fn code(&self) -> Option<u32> {
        match &self.outcome {
            Outcome::Rejected(err) => Some(err.code()),
            _ => None,
        }
    }
}

pub struct Engine<S: State, W: Wallet> {
    state: S,
    wallet: W,
}

impl<S: State, W: Wallet> Engine<S, W> {
    pub fn new(state: S, wallet: W) -> Self {
        Self { state, wallet }
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    pub fn wallet(&self) -> &W {
        &self.wallet
    }

    pub fn into_parts(self) -> (S, W) {
        (self.state, self.wallet)
    }

    /// Write the contract configuration. Fails if one is already stored.
    pub async fn deploy(&mut self, config: Config) -> Result<()> {
        if self.state.get(&Key::Config).await?.is_some() {
            anyhow::bail!("contract already deployed");
        }
        info!(owner = ?config.owner, fee = config.fee, "deploying contract");
        self.state
            .insert(Key::Config, Value::Config(config))
            .await
            .context("store config")?;
        self.state.persist().await.context("persist config")
    }

    pub async fn deliver(&mut self, inbound: Inbound) -> Result<Receipt> {
        match inbound {
            Inbound::Message(message) => self.deliver_message(message).await,
            Inbound::Bounce(transfer) => {
                debug!(
                    to = ?transfer.to,
                    amount = transfer.amount,
                    draw_id = transfer.draw_id,
                    "ignoring bounced transfer"
                );
                Ok(Receipt::applied(Effect::event(Event::BounceIgnored { transfer })))
            }
        }
    }

    async fn deliver_message(&mut self, message: Message) -> Result<Receipt> {
        if !message.verify() {
            warn!(public = ?message.public, "dropping message with invalid signature");
            return Ok(Receipt::dropped());
        }

        let (result, changes) = {
            let mut layer = Layer::new(&self.state);
            let result = layer
                .handle(&message.public, message.value, message.operation.as_ref())
                .await?;
            (result, layer.commit())
        };

        let effect = match result {
            Ok(effect) => effect,
            Err(err) => {
                debug!(public = ?message.public, code = err.code(), %err, "message rejected");
                return Ok(Receipt::rejected(&message, err));
            }
        };

        self.state
            .apply(changes)
            .await
            .context("apply accepted changes")?;
        // Settlement must be durable before any value leaves the contract.
        self.state
            .persist()
            .await
            .context("persist accepted changes")?;

        let mut receipt = Receipt::applied(effect);
        if let Some(transfer) = &receipt.transfer {
            if let Err(err) = self.wallet.transfer(transfer).await {
                warn!(
                    to = ?transfer.to,
                    amount = transfer.amount,
                    draw_id = transfer.draw_id,
                    ?err,
                    "payout transfer failed"
                );
                receipt.bounced = true;
            }
        }
        Ok(receipt)
    }

    pub async fn owner(&self) -> Result<PublicKey, QueryError> {
        query::get_owner(&self.state).await
    }

    pub async fn fee(&self) -> Result<u16, QueryError> {
        query::get_fee(&self.state).await
    }

    pub async fn draw(&self, draw_id: u32) -> Result<Option<Draw>, QueryError> {
        query::get_draw(&self.state, draw_id).await
    }

    pub async fn entries(&self, draw_id: u32) -> Result<Vec<Entry>, QueryError> {
        query::get_entries(&self.state, draw_id).await
    }
}
