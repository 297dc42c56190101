//! Reward-per-share accumulator
//!
//! `acc_reward_per_share` only grows, and only while stake is present.
//! A stake's `reward_debt` is reset to `amount * acc` on every change, so
//! `amount * acc - reward_debt` is exactly what it earned since.

use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::program_error::ProgramError;

use crate::{constants::ACC_PRECISION, error::SyntheticMintError, math::mul_div};

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct RewardAccumulator {
    /// Weight among siblings in the same tier
    pub alloc_points: u64,
    /// Scaled by ACC_PRECISION
    pub acc_reward_per_share: u128,
    pub last_update: u64,
    pub total_stake: u128,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserStake {
    pub amount: u128,
    pub reward_debt: u128,
    /// Settled on stake changes, paid out by the next reward claim
    pub claimable: u128,
}

impl RewardAccumulator {
    pub fn new(alloc_points: u64, now: u64) -> Self {
        Self {
            alloc_points,
            acc_reward_per_share: 0,
            last_update: now,
            total_stake: 0,
        }
    }

    /// Spread `reward` over the current stake. Returns false when the pool
    /// is dormant, in which case nothing accrues.
    pub fn distribute(&mut self, reward: u128) -> Result<bool, ProgramError> {
        if self.total_stake == 0 {
            return Ok(false);
        }
        if reward == 0 {
            return Ok(true);
        }
        let increment = mul_div(reward, ACC_PRECISION, self.total_stake)?;
        self.acc_reward_per_share = self
            .acc_reward_per_share
            .checked_add(increment)
            .ok_or(SyntheticMintError::ArithmeticOverflow)?;
        Ok(true)
    }

    fn accrued(&self, amount: u128) -> Result<u128, ProgramError> {
        mul_div(amount, self.acc_reward_per_share, ACC_PRECISION)
    }

    /// Unsettled reward of `stake` at the current accumulator value
    pub fn pending(&self, stake: &UserStake) -> Result<u128, ProgramError> {
        self.accrued(stake.amount)?
            .checked_sub(stake.reward_debt)
            .ok_or_else(|| SyntheticMintError::ArithmeticOverflow.into())
    }

    /// Move pending into `claimable` and reset the debt
    pub fn settle(&self, stake: &mut UserStake) -> Result<u128, ProgramError> {
        let pending = self.pending(stake)?;
        stake.claimable = stake
            .claimable
            .checked_add(pending)
            .ok_or(SyntheticMintError::ArithmeticOverflow)?;
        stake.reward_debt = self.accrued(stake.amount)?;
        Ok(pending)
    }

    /// Settle, then take everything claimable
    pub fn harvest(&self, stake: &mut UserStake) -> Result<u128, ProgramError> {
        self.settle(stake)?;
        Ok(std::mem::take(&mut stake.claimable))
    }

    pub fn stake(&mut self, stake: &mut UserStake, amount: u128) -> Result<u128, ProgramError> {
        let settled = self.settle(stake)?;
        stake.amount = stake
            .amount
            .checked_add(amount)
            .ok_or(SyntheticMintError::ArithmeticOverflow)?;
        self.total_stake = self
            .total_stake
            .checked_add(amount)
            .ok_or(SyntheticMintError::ArithmeticOverflow)?;
        stake.reward_debt = self.accrued(stake.amount)?;
        Ok(settled)
    }

    pub fn unstake(&mut self, stake: &mut UserStake, amount: u128) -> Result<u128, ProgramError> {
        if amount > stake.amount {
            return Err(SyntheticMintError::InsufficientStake.into());
        }
        let settled = self.settle(stake)?;
        stake.amount -= amount;
        self.total_stake = self
            .total_stake
            .checked_sub(amount)
            .ok_or(SyntheticMintError::ArithmeticOverflow)?;
        stake.reward_debt = self.accrued(stake.amount)?;
        Ok(settled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::WAD;

    #[test]
    fn test_dormant_pool_does_not_accrue() {
        let mut pool = RewardAccumulator::new(100, 0);
        assert!(!pool.distribute(1_000 * WAD).unwrap());
        assert_eq!(pool.acc_reward_per_share, 0);
    }

    #[test]
    fn test_no_free_reward_after_deposit() {
        let mut pool = RewardAccumulator::new(100, 0);
        let mut alice = UserStake::default();
        let mut bob = UserStake::default();

        pool.stake(&mut alice, 10 * WAD).unwrap();
        pool.distribute(100 * WAD).unwrap();

        pool.stake(&mut bob, 30 * WAD).unwrap();
        assert_eq!(pool.pending(&bob).unwrap(), 0);
        assert_eq!(pool.pending(&alice).unwrap(), 100 * WAD);
    }

    #[test]
    fn test_proportional_split_and_settle() {
        let mut pool = RewardAccumulator::new(100, 0);
        let mut alice = UserStake::default();
        let mut bob = UserStake::default();

        pool.stake(&mut alice, 10 * WAD).unwrap();
        pool.stake(&mut bob, 30 * WAD).unwrap();
        pool.distribute(40 * WAD).unwrap();

        assert_eq!(pool.pending(&alice).unwrap(), 10 * WAD);
        assert_eq!(pool.pending(&bob).unwrap(), 30 * WAD);

        let settled = pool.unstake(&mut bob, 30 * WAD).unwrap();
        assert_eq!(settled, 30 * WAD);
        assert_eq!(bob.claimable, 30 * WAD);
        assert_eq!(bob.amount, 0);
        assert_eq!(bob.reward_debt, 0);
        assert_eq!(pool.total_stake, 10 * WAD);

        assert_eq!(pool.harvest(&mut alice).unwrap(), 10 * WAD);
        assert_eq!(pool.pending(&alice).unwrap(), 0);
    }

    #[test]
    fn test_unstake_more_than_staked() {
        let mut pool = RewardAccumulator::new(100, 0);
        let mut alice = UserStake::default();
        pool.stake(&mut alice, 5).unwrap();
        assert_eq!(
            pool.unstake(&mut alice, 6).unwrap_err(),
            ProgramError::from(SyntheticMintError::InsufficientStake)
        );
    }
}
