//! Position ledger: open, collateral adjustments, mint and burn

use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{msg, program_error::ProgramError, pubkey::Pubkey};

use crate::{
    collaborators::{Collaborators, PriceOracle},
    engine::{PriceContext, Protocol, Staged},
    error::SyntheticMintError,
    events::ProtocolEvent,
    math::{collateral_ratio, fee_amount, max_mintable, mul_div},
    state::{LockId, LockRecord, Position},
};

/// Swap guard for positions whose minted synthetic is sold
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShortTerms {
    pub min_out: u128,
    pub deadline: u64,
}

impl Staged {
    fn ensure_mint_window(&self, ctx: &PriceContext) -> Result<(), ProgramError> {
        if let Some(ipo) = ctx.market.ipo {
            if self.state.now > ipo.mint_end {
                msg!("Pre-IPO mint window for {} closed at {}", ctx.market.synthetic_asset, ipo.mint_end);
                return Err(SyntheticMintError::MintPeriodEnded.into());
            }
        }
        Ok(())
    }

    /// Queue a release for `beneficiary` behind the lock period
    pub(crate) fn lock_release(
        &mut self,
        position_id: u64,
        beneficiary: Pubkey,
        asset: Pubkey,
        amount: u128,
    ) -> Result<LockId, ProgramError> {
        let seq = self.state.positions.get_mut(position_id)?.take_lock_seq();
        let lock_id = LockId { position_id, seq };
        let available_at = self
            .state
            .now
            .checked_add(self.state.config.lock_period)
            .ok_or(SyntheticMintError::ArithmeticOverflow)?;

        self.state.escrow.lock(
            lock_id,
            LockRecord {
                beneficiary,
                asset,
                amount,
                available_at,
            },
        )?;
        self.record(ProtocolEvent::CollateralLocked {
            lock_id,
            beneficiary,
            asset,
            amount,
            available_at,
        });
        Ok(lock_id)
    }

    /// Hand out freshly minted synthetic. Long positions receive it directly;
    /// short positions sell it, escrow the proceeds and stake the minted size.
    fn deliver_minted(
        &mut self,
        env: &mut dyn Collaborators,
        position_id: u64,
        ctx: &PriceContext,
        amount: u128,
        short: Option<ShortTerms>,
    ) -> Result<(), ProgramError> {
        let position = self.state.positions.get(position_id)?;
        let owner = position.owner;
        let synthetic = ctx.market.synthetic_asset;

        let terms = match short {
            None => {
                env.mint_to(&synthetic, &owner, amount)?;
                return Ok(());
            }
            Some(terms) => terms,
        };

        let custody = self.state.config.custody;
        env.mint_to(&synthetic, &custody, amount)?;
        let proceeds = env.swap_exact_in(
            &synthetic,
            &ctx.market.quote_asset,
            amount,
            terms.min_out,
            terms.deadline,
        )?;
        if proceeds < terms.min_out {
            msg!("Swap returned {} below minimum {}", proceeds, terms.min_out);
            return Err(SyntheticMintError::SlippageExceeded.into());
        }
        self.record(ProtocolEvent::ShortSold {
            position_id,
            synthetic_sold: amount,
            proceeds,
        });

        if proceeds > 0 {
            self.lock_release(position_id, owner, ctx.market.quote_asset, proceeds)?;
        }

        let now = self.state.now;
        self.state
            .rewards
            .deposit(ctx.market.short_pool_id, &owner, amount, now)?;
        self.record(ProtocolEvent::Staked {
            pool_id: ctx.market.short_pool_id,
            user: owner,
            amount,
        });
        Ok(())
    }

    /// Release collateral to a position's owner, through escrow for shorts
    pub(crate) fn pay_owner(
        &mut self,
        env: &mut dyn Collaborators,
        position: &Position,
        amount: u128,
    ) -> Result<(), ProgramError> {
        if amount == 0 {
            return Ok(());
        }
        if position.is_short {
            self.lock_release(position.id, position.owner, position.collateral_asset, amount)?;
        } else {
            env.transfer(&position.collateral_asset, &position.owner, amount)?;
        }
        Ok(())
    }

    /// Protocol fee on `amount` synthetic, never more than `released`
    pub(crate) fn take_fee(
        &mut self,
        collateral_asset: &Pubkey,
        amount: u128,
        price: u128,
        released: u128,
    ) -> Result<u128, ProgramError> {
        let mut fee = fee_amount(amount, price, self.state.config.fee_rate)?;
        if fee > released {
            msg!("Fee {} exceeds released collateral {}, clamping", fee, released);
            fee = released;
        }
        if fee > 0 {
            self.state.fees.accrue(collateral_asset, fee)?;
            self.record(ProtocolEvent::FeeAccrued {
                collateral_asset: *collateral_asset,
                amount: fee,
            });
        }
        Ok(fee)
    }

    /// Remove a fully repaid position, returning any collateral left in it
    pub(crate) fn close_position(&mut self, env: &mut dyn Collaborators, position_id: u64) -> Result<(), ProgramError> {
        let position = self.state.positions.get(position_id)?.clone();
        let remaining = position.collateral_amount;
        self.pay_owner(env, &position, remaining)?;
        self.state.positions.remove(position_id);

        msg!("Position {} closed", position_id);
        self.record(ProtocolEvent::PositionClosed {
            position_id,
            owner: position.owner,
            returned_collateral: remaining,
        });
        Ok(())
    }
}

impl Protocol {
    /// Open a position minting as much synthetic as `collateral_amount`
    /// backs at `ratio` (parts-per-1000). `short` makes it a short position.
    #[allow(clippy::too_many_arguments)]
    pub fn open(
        &mut self,
        env: &mut dyn Collaborators,
        owner: &Pubkey,
        synthetic_asset: &Pubkey,
        collateral_asset: &Pubkey,
        collateral_amount: u128,
        ratio: u64,
        short: Option<ShortTerms>,
    ) -> Result<u64, ProgramError> {
        self.transact(|tx| {
            if collateral_amount == 0 {
                return Err(SyntheticMintError::InvalidAmount.into());
            }
            let ctx = tx.state.price_context(&*env, synthetic_asset, collateral_asset)?;
            tx.ensure_mint_window(&ctx)?;

            if ratio < ctx.min_ratio {
                msg!("Requested ratio {} below minimum {}", ratio, ctx.min_ratio);
                return Err(SyntheticMintError::InsufficientRatio.into());
            }
            if let Some(terms) = short {
                if terms.deadline < tx.state.now {
                    return Err(SyntheticMintError::DeadlineExpired.into());
                }
            }

            let minted = max_mintable(collateral_amount, ctx.price, ratio)?;
            if minted == 0 {
                return Err(SyntheticMintError::InvalidAmount.into());
            }

            let now = tx.state.now;
            let position_id = tx.state.positions.open(
                *owner,
                *collateral_asset,
                collateral_amount,
                *synthetic_asset,
                minted,
                short.is_some(),
                now,
            )?;

            env.transfer_from(collateral_asset, owner, collateral_amount)?;
            tx.deliver_minted(env, position_id, &ctx, minted, short)?;

            msg!("Position {} opened: {} collateral, {} minted", position_id, collateral_amount, minted);
            tx.record(ProtocolEvent::PositionOpened {
                position_id,
                owner: *owner,
                synthetic_asset: *synthetic_asset,
                collateral_asset: *collateral_asset,
                collateral_amount,
                synthetic_amount: minted,
                is_short: short.is_some(),
            });
            Ok(position_id)
        })
    }

    pub fn deposit(
        &mut self,
        env: &mut dyn Collaborators,
        caller: &Pubkey,
        position_id: u64,
        amount: u128,
    ) -> Result<(), ProgramError> {
        self.transact(|tx| {
            if amount == 0 {
                return Err(SyntheticMintError::InvalidAmount.into());
            }
            let position = tx.state.positions.owned_mut(position_id, caller)?;
            position.deposit_collateral(amount)?;
            let collateral_asset = position.collateral_asset;

            env.transfer_from(&collateral_asset, caller, amount)?;
            tx.record(ProtocolEvent::CollateralDeposited { position_id, amount });
            Ok(())
        })
    }

    pub fn withdraw(
        &mut self,
        env: &mut dyn Collaborators,
        caller: &Pubkey,
        position_id: u64,
        amount: u128,
    ) -> Result<(), ProgramError> {
        self.transact(|tx| {
            if amount == 0 {
                return Err(SyntheticMintError::InvalidAmount.into());
            }
            let position = tx.state.positions.owned_mut(position_id, caller)?.clone();
            let ctx = tx
                .state
                .price_context(&*env, &position.synthetic_asset, &position.collateral_asset)?;

            let remaining = position
                .collateral_amount
                .checked_sub(amount)
                .ok_or(SyntheticMintError::InvalidAmount)?;
            let ratio = collateral_ratio(remaining, position.synthetic_amount, ctx.price)?;
            if ratio < ctx.min_ratio as u128 {
                msg!("Withdraw would leave ratio {} below {}", ratio, ctx.min_ratio);
                return Err(SyntheticMintError::RatioBreach.into());
            }

            tx.state.positions.get_mut(position_id)?.withdraw_collateral(amount)?;
            env.transfer(&position.collateral_asset, caller, amount)?;
            tx.record(ProtocolEvent::CollateralWithdrawn { position_id, amount });
            Ok(())
        })
    }

    /// Mint more synthetic against an existing position. `min_out` guards
    /// the short-side sale; `deadline` bounds how late the action may land.
    pub fn mint(
        &mut self,
        env: &mut dyn Collaborators,
        caller: &Pubkey,
        position_id: u64,
        amount: u128,
        min_out: u128,
        deadline: u64,
    ) -> Result<(), ProgramError> {
        self.transact(|tx| {
            if amount == 0 {
                return Err(SyntheticMintError::InvalidAmount.into());
            }
            if deadline < tx.state.now {
                return Err(SyntheticMintError::DeadlineExpired.into());
            }
            let position = tx.state.positions.owned_mut(position_id, caller)?.clone();
            let ctx = tx
                .state
                .price_context(&*env, &position.synthetic_asset, &position.collateral_asset)?;
            tx.ensure_mint_window(&ctx)?;

            let debt = position
                .synthetic_amount
                .checked_add(amount)
                .ok_or(SyntheticMintError::ArithmeticOverflow)?;
            let ratio = collateral_ratio(position.collateral_amount, debt, ctx.price)?;
            if ratio < ctx.min_ratio as u128 {
                msg!("Mint would leave ratio {} below {}", ratio, ctx.min_ratio);
                return Err(SyntheticMintError::RatioBreach.into());
            }

            tx.state.positions.get_mut(position_id)?.add_debt(amount)?;
            let short = position.is_short.then_some(ShortTerms { min_out, deadline });
            tx.deliver_minted(env, position_id, &ctx, amount, short)?;

            tx.record(ProtocolEvent::SyntheticMinted { position_id, amount });
            Ok(())
        })
    }

    /// Repay `amount` synthetic and release collateral pro rata, so the
    /// position's ratio is unchanged. The protocol fee comes out of the
    /// released collateral.
    pub fn burn(
        &mut self,
        env: &mut dyn Collaborators,
        caller: &Pubkey,
        position_id: u64,
        amount: u128,
    ) -> Result<(), ProgramError> {
        self.transact(|tx| {
            let position = tx.state.positions.owned_mut(position_id, caller)?.clone();
            if amount == 0 || amount > position.synthetic_amount {
                return Err(SyntheticMintError::InvalidAmount.into());
            }
            let ctx = tx
                .state
                .price_context(&*env, &position.synthetic_asset, &position.collateral_asset)?;

            let released = if amount == position.synthetic_amount {
                position.collateral_amount
            } else {
                mul_div(position.collateral_amount, amount, position.synthetic_amount)?
            };
            let fee = tx.take_fee(&position.collateral_asset, amount, ctx.price, released)?;
            let net = released - fee;

            {
                let live = tx.state.positions.get_mut(position_id)?;
                live.repay_debt(amount)?;
                live.withdraw_collateral(released)?;
            }

            if position.is_short {
                let now = tx.state.now;
                tx.state
                    .rewards
                    .withdraw(ctx.market.short_pool_id, &position.owner, amount, now)?;
                tx.record(ProtocolEvent::Unstaked {
                    pool_id: ctx.market.short_pool_id,
                    user: position.owner,
                    amount,
                });
            }

            env.burn_from(&position.synthetic_asset, caller, amount)?;
            tx.pay_owner(env, &position, net)?;
            tx.record(ProtocolEvent::SyntheticBurned {
                position_id,
                amount,
                released,
                fee,
            });

            if tx.state.positions.get(position_id)?.is_closed() {
                tx.close_position(env, position_id)?;
            }
            Ok(())
        })
    }

    pub fn position(&self, position_id: u64) -> Result<&Position, ProgramError> {
        self.state.positions.get(position_id)
    }

    /// Live positions of `owner`, paged in id order
    pub fn positions_of(&self, owner: &Pubkey, start: usize, count: usize) -> Vec<&Position> {
        self.state.positions.of_owner(owner, start, count)
    }

    /// Collateral ratio in parts-per-1000 at the current oracle price
    pub fn current_ratio(&self, oracle: &dyn PriceOracle, position_id: u64) -> Result<u128, ProgramError> {
        let position = self.state.positions.get(position_id)?;
        let ctx = self
            .state
            .price_context(oracle, &position.synthetic_asset, &position.collateral_asset)?;
        collateral_ratio(position.collateral_amount, position.synthetic_amount, ctx.price)
    }

    pub fn is_in_auction(&self, oracle: &dyn PriceOracle, position_id: u64) -> Result<bool, ProgramError> {
        let position = self.state.positions.get(position_id)?;
        let ctx = self
            .state
            .price_context(oracle, &position.synthetic_asset, &position.collateral_asset)?;
        let ratio = collateral_ratio(position.collateral_amount, position.synthetic_amount, ctx.price)?;
        Ok(ratio < ctx.min_ratio as u128)
    }
}
