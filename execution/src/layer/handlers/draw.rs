use super::super::*;
use commonware_cryptography::sha256::Digest;
use luckdraw_types::draw::{Draw, Entry, U256};

impl<'a, S: State> Layer<'a, S> {
    // === Draw Handlers ===

    pub(in crate::layer) async fn handle_create_draw(
        &mut self,
        public: &PublicKey,
        query_id: u64,
        draw_id: u32,
        min_entry_amount: u64,
        key_length: U256,
    ) -> Result<Result<Effect, DrawError>> {
        if !self.is_owner(public).await? {
            return Ok(Err(DrawError::NotOwner));
        }
        if self.draw(draw_id).await?.is_some() {
            return Ok(Err(DrawError::DrawAlreadyExists(draw_id)));
        }

        self.insert(
            Key::Draw(draw_id),
            Value::Draw(Draw::new(draw_id, min_entry_amount, key_length)),
        );

        Ok(Ok(Effect::event(Event::DrawCreated {
            draw_id,
            min_entry_amount,
            key_length,
            query_id,
        })))
    }

    pub(in crate::layer) async fn handle_luck_roll(
        &mut self,
        public: &PublicKey,
        value: u64,
        query_id: u64,
        draw_id: u32,
        answer: U256,
    ) -> Result<Result<Effect, DrawError>> {
        let Some(mut draw) = self.draw(draw_id).await? else {
            return Ok(Err(DrawError::DrawNotFound(draw_id)));
        };
        if draw.is_settled() {
            return Ok(Err(DrawError::WinnerAlreadyFound(draw_id)));
        }
        // The minimum itself is not enough.
        if value <= draw.min_entry_amount {
            return Ok(Err(DrawError::InsufficientEntryAmount {
                minimum: draw.min_entry_amount,
                attached: value,
            }));
        }

        let index = draw.entry_count;
        draw.entry_count = index
            .checked_add(1)
            .ok_or_else(|| anyhow::anyhow!("entry count overflow on draw {draw_id}"))?;
        draw.pot = draw
            .pot
            .checked_add(value)
            .ok_or_else(|| anyhow::anyhow!("pot overflow on draw {draw_id}"))?;

        self.insert(
            Key::Entry { draw_id, index },
            Value::Entry(Entry {
                player: public.clone(),
                answer,
                amount: value,
                query_id,
            }),
        );
        self.insert(Key::Draw(draw_id), Value::Draw(draw));

        Ok(Ok(Effect::event(Event::EntryRecorded {
            draw_id,
            index,
            player: public.clone(),
            answer,
            amount: value,
            query_id,
        })))
    }

    pub(in crate::layer) async fn handle_set_win_hash(
        &mut self,
        public: &PublicKey,
        query_id: u64,
        draw_id: u32,
        win_hash: Digest,
    ) -> Result<Result<Effect, DrawError>> {
        if !self.is_owner(public).await? {
            return Ok(Err(DrawError::NotOwner));
        }
        let Some(mut draw) = self.draw(draw_id).await? else {
            return Ok(Err(DrawError::DrawNotFound(draw_id)));
        };
        if draw.is_settled() {
            return Ok(Err(DrawError::WinnerAlreadyFound(draw_id)));
        }

        // Re-publishing before payout replaces the previous commitment.
        draw.win_hash = Some(win_hash);
        self.insert(Key::Draw(draw_id), Value::Draw(draw));

        Ok(Ok(Effect::event(Event::WinHashSet {
            draw_id,
            win_hash,
            query_id,
        })))
    }

    pub(in crate::layer) async fn handle_pay_reward(
        &mut self,
        public: &PublicKey,
        query_id: u64,
        draw_id: u32,
        winner: &PublicKey,
        reveal_hash: Option<&Digest>,
    ) -> Result<Result<Effect, DrawError>> {
        if !self.is_owner(public).await? {
            return Ok(Err(DrawError::NotOwner));
        }
        let Some(mut draw) = self.draw(draw_id).await? else {
            return Ok(Err(DrawError::DrawNotFound(draw_id)));
        };
        if draw.is_settled() {
            return Ok(Err(DrawError::WinnerAlreadyFound(draw_id)));
        }
        let Some(win_hash) = draw.win_hash.as_ref() else {
            return Ok(Err(DrawError::HashNotSet(draw_id)));
        };
        if reveal_hash != Some(win_hash) {
            return Ok(Err(DrawError::InvalidHash(draw_id)));
        }

        let amount = draw.pot;
        draw.winner = Some(winner.clone());
        self.insert(Key::Draw(draw_id), Value::Draw(draw));

        let transfer = (amount > 0).then(|| Transfer {
            to: winner.clone(),
            amount,
            draw_id,
        });

        Ok(Ok(Effect {
            events: vec![Event::RewardPaid {
                draw_id,
                winner: winner.clone(),
                amount,
                query_id,
            }],
            transfer,
        }))
    }

    pub(in crate::layer) fn handle_top_up(&self, public: &PublicKey, value: u64) -> Effect {
        Effect::event(Event::ToppedUp {
            from: public.clone(),
            amount: value,
        })
    }
}
