//! Staking entry points for the reward distributor
//!
//! Short pools are fed only by the position ledger. Long pools take
//! liquidity shares, either directly or by adding liquidity on the caller's
//! behalf through the swap venue.

use solana_program::{msg, program_error::ProgramError, pubkey::Pubkey};

use crate::{
    collaborators::Collaborators,
    engine::{Protocol, ProtocolState},
    error::SyntheticMintError,
    events::ProtocolEvent,
    state::{MarketListing, PoolId},
};

impl ProtocolState {
    /// Market whose long pool is `pool`
    fn long_pool_market(&self, pool: PoolId) -> Result<MarketListing, ProgramError> {
        let market = self.rewards.market_of(pool)?;
        let listing = self.market(&market)?;
        if listing.long_pool_id != pool {
            msg!("Pool {} is not a long pool", pool);
            return Err(SyntheticMintError::NotLongPool.into());
        }
        Ok(listing.clone())
    }
}

impl Protocol {
    /// Stake liquidity-share tokens in a long pool
    pub fn deposit_lp(
        &mut self,
        env: &mut dyn Collaborators,
        caller: &Pubkey,
        pool: PoolId,
        amount: u128,
    ) -> Result<(), ProgramError> {
        self.transact(|tx| {
            let market = tx.state.long_pool_market(pool)?;
            let now = tx.state.now;
            tx.state.rewards.deposit(pool, caller, amount, now)?;

            env.transfer_from(&market.lp_asset, caller, amount)?;
            tx.record(ProtocolEvent::Staked {
                pool_id: pool,
                user: *caller,
                amount,
            });
            Ok(())
        })
    }

    pub fn withdraw_lp(
        &mut self,
        env: &mut dyn Collaborators,
        caller: &Pubkey,
        pool: PoolId,
        amount: u128,
    ) -> Result<(), ProgramError> {
        self.transact(|tx| {
            let market = tx.state.long_pool_market(pool)?;
            let now = tx.state.now;
            tx.state.rewards.withdraw(pool, caller, amount, now)?;

            env.transfer(&market.lp_asset, caller, amount)?;
            tx.record(ProtocolEvent::Unstaked {
                pool_id: pool,
                user: *caller,
                amount,
            });
            Ok(())
        })
    }

    /// Add synthetic/quote liquidity through the venue and stake exactly the
    /// shares it mints. Unused amounts go back to the caller.
    #[allow(clippy::too_many_arguments)]
    pub fn deposit_pair(
        &mut self,
        env: &mut dyn Collaborators,
        caller: &Pubkey,
        pool: PoolId,
        amount_synthetic: u128,
        amount_quote: u128,
        min_synthetic: u128,
        min_quote: u128,
        deadline: u64,
    ) -> Result<u128, ProgramError> {
        self.transact(|tx| {
            if deadline < tx.state.now {
                return Err(SyntheticMintError::DeadlineExpired.into());
            }
            let market = tx.state.long_pool_market(pool)?;
            let synthetic = market.synthetic_asset;
            let quote = market.quote_asset;

            env.transfer_from(&synthetic, caller, amount_synthetic)?;
            env.transfer_from(&quote, caller, amount_quote)?;
            let receipt = env.add_liquidity(
                &synthetic,
                &quote,
                amount_synthetic,
                amount_quote,
                min_synthetic,
                min_quote,
                deadline,
            )?;
            if receipt.used_a > amount_synthetic || receipt.used_b > amount_quote {
                return Err(SyntheticMintError::InvalidAmount.into());
            }

            let refund_synthetic = amount_synthetic - receipt.used_a;
            let refund_quote = amount_quote - receipt.used_b;
            if refund_synthetic > 0 {
                env.transfer(&synthetic, caller, refund_synthetic)?;
            }
            if refund_quote > 0 {
                env.transfer(&quote, caller, refund_quote)?;
            }

            let now = tx.state.now;
            tx.state.rewards.deposit(pool, caller, receipt.liquidity, now)?;
            tx.record(ProtocolEvent::LiquidityStaked {
                pool_id: pool,
                user: *caller,
                used_a: receipt.used_a,
                used_b: receipt.used_b,
                liquidity: receipt.liquidity,
            });
            Ok(receipt.liquidity)
        })
    }

    /// Unstake liquidity shares, remove the liquidity and pay out both sides
    #[allow(clippy::too_many_arguments)]
    pub fn withdraw_pair(
        &mut self,
        env: &mut dyn Collaborators,
        caller: &Pubkey,
        pool: PoolId,
        liquidity: u128,
        min_synthetic: u128,
        min_quote: u128,
        deadline: u64,
    ) -> Result<(u128, u128), ProgramError> {
        self.transact(|tx| {
            if deadline < tx.state.now {
                return Err(SyntheticMintError::DeadlineExpired.into());
            }
            let market = tx.state.long_pool_market(pool)?;
            let now = tx.state.now;
            tx.state.rewards.withdraw(pool, caller, liquidity, now)?;

            let (amount_synthetic, amount_quote) = env.remove_liquidity(
                &market.synthetic_asset,
                &market.quote_asset,
                liquidity,
                min_synthetic,
                min_quote,
                deadline,
            )?;
            if amount_synthetic > 0 {
                env.transfer(&market.synthetic_asset, caller, amount_synthetic)?;
            }
            if amount_quote > 0 {
                env.transfer(&market.quote_asset, caller, amount_quote)?;
            }

            tx.record(ProtocolEvent::LiquidityUnstaked {
                pool_id: pool,
                user: *caller,
                liquidity,
                amount_a: amount_synthetic,
                amount_b: amount_quote,
            });
            Ok((amount_synthetic, amount_quote))
        })
    }

    /// Pay out everything `caller` earned in `pool` without touching the stake
    pub fn get_reward(&mut self, env: &mut dyn Collaborators, caller: &Pubkey, pool: PoolId) -> Result<u128, ProgramError> {
        self.transact(|tx| {
            let now = tx.state.now;
            let amount = tx.state.rewards.take_reward(pool, caller, now)?;
            if amount > 0 {
                let reward_asset = tx.state.rewards.emission.reward_asset;
                env.mint_to(&reward_asset, caller, amount)?;
                tx.record(ProtocolEvent::RewardPaid {
                    pool_id: pool,
                    user: *caller,
                    amount,
                });
            }
            Ok(amount)
        })
    }

    pub fn update_pool(&mut self, pool: PoolId) -> Result<(), ProgramError> {
        self.transact(|tx| {
            let now = tx.state.now;
            tx.state.rewards.update_pool(pool, now)
        })
    }

    pub fn pending_reward(&self, pool: PoolId, user: &Pubkey) -> Result<u128, ProgramError> {
        self.state.rewards.pending_reward(pool, user, self.state.now)
    }

    pub fn claimable_reward(&self, pool: PoolId, user: &Pubkey) -> u128 {
        self.state.rewards.claimable_reward(pool, user)
    }

    pub fn stake_of(&self, pool: PoolId, user: &Pubkey) -> u128 {
        self.state.rewards.stake_of(pool, user)
    }
}
