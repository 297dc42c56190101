//! Two-tier emission distributor
//!
//! The root tier splits the global emission across markets by alloc points.
//! Each market holds a single representative stake in its root entry while
//! any of its pools has stakers. Whatever that stake earns is harvested into
//! the market's sub tier and split across its pools, then across users.

use std::collections::BTreeMap;

use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{msg, program_error::ProgramError, pubkey::Pubkey};

use crate::{
    constants::ROOT_SHARE,
    error::SyntheticMintError,
    math::mul_div,
    rewards::accumulator::{RewardAccumulator, UserStake},
    state::PoolId,
};

/// Global reward emission, capped over its lifetime
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct EmissionSchedule {
    pub reward_asset: Pubkey,
    /// Reward units per clock unit across all markets
    pub reward_per_unit: u128,
    /// Nothing accrues before this time
    pub start_time: u64,
    pub max_mint: u128,
    /// Emission distributed into the root tier so far
    pub minted: u128,
}

impl EmissionSchedule {
    pub fn new(reward_asset: Pubkey, reward_per_unit: u128, start_time: u64, max_mint: u128) -> Self {
        Self {
            reward_asset,
            reward_per_unit,
            start_time,
            max_mint,
            minted: 0,
        }
    }

    /// Reserve up to `reward` against the cap, returning what was granted
    fn reserve(&mut self, reward: u128) -> Result<u128, ProgramError> {
        let remaining = self
            .max_mint
            .checked_sub(self.minted)
            .ok_or(SyntheticMintError::EmissionCapExceeded)?;
        let granted = if reward > remaining {
            msg!("Emission cap reached: clamping {} to {}", reward, remaining);
            remaining
        } else {
            reward
        };
        self.minted += granted;
        Ok(granted)
    }
}

/// One market: its root entry and its own pools
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct MarketRewards {
    pub root: RewardAccumulator,
    /// The sub tier's representative stake in `root`
    pub root_stake: UserStake,
    pub pools: BTreeMap<PoolId, RewardAccumulator>,
    pub sub_alloc_total: u64,
    /// Emission that reached this market while the receiving pool was dormant
    pub forfeited: u128,
}

impl MarketRewards {
    fn accrue_root(
        &mut self,
        emission: &mut EmissionSchedule,
        root_alloc_total: u64,
        now: u64,
    ) -> Result<(), ProgramError> {
        if now <= self.root.last_update {
            return Ok(());
        }
        let elapsed = now - self.root.last_update;
        self.root.last_update = now;

        if self.root.total_stake == 0 || self.root.alloc_points == 0 || root_alloc_total == 0 {
            return Ok(());
        }

        let weighted = (elapsed as u128)
            .checked_mul(self.root.alloc_points as u128)
            .ok_or(SyntheticMintError::ArithmeticOverflow)?;
        let reward = mul_div(emission.reward_per_unit, weighted, root_alloc_total as u128)?;
        let granted = emission.reserve(reward)?;
        self.root.distribute(granted)?;
        Ok(())
    }

    fn harvest_into_pools(&mut self, now: u64) -> Result<(), ProgramError> {
        let harvested = self.root.harvest(&mut self.root_stake)?;
        for pool in self.pools.values_mut() {
            pool.last_update = now;
        }
        if harvested == 0 {
            return Ok(());
        }

        let mut lost = harvested;
        if self.sub_alloc_total > 0 {
            for (pool_id, pool) in self.pools.iter_mut() {
                if pool.alloc_points == 0 {
                    continue;
                }
                let share = mul_div(harvested, pool.alloc_points as u128, self.sub_alloc_total as u128)?;
                if pool.distribute(share)? {
                    lost -= share;
                } else {
                    msg!("Pool {} dormant, forfeiting {}", pool_id, share);
                }
            }
        }

        self.forfeited = self
            .forfeited
            .checked_add(lost)
            .ok_or(SyntheticMintError::ArithmeticOverflow)?;
        Ok(())
    }

    /// Accrue the root entry up to `now` and push its earnings into the pools
    pub fn update(
        &mut self,
        emission: &mut EmissionSchedule,
        root_alloc_total: u64,
        now: u64,
    ) -> Result<(), ProgramError> {
        self.accrue_root(emission, root_alloc_total, now)?;
        self.harvest_into_pools(now)
    }

    pub fn aggregate_stake(&self) -> Result<u128, ProgramError> {
        self.pools.values().try_fold(0u128, |sum, pool| {
            sum.checked_add(pool.total_stake)
                .ok_or_else(|| SyntheticMintError::ArithmeticOverflow.into())
        })
    }

    /// Enter or leave the root tier when the market gains its first or
    /// loses its last staker. Must run right after `update`.
    fn sync_root_share(&mut self, before: u128) -> Result<(), ProgramError> {
        let after = self.aggregate_stake()?;
        if before == 0 && after > 0 {
            self.root.stake(&mut self.root_stake, ROOT_SHARE)?;
        } else if before > 0 && after == 0 {
            self.root.unstake(&mut self.root_stake, ROOT_SHARE)?;
        }
        Ok(())
    }
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct TieredRewardDistributor {
    pub emission: EmissionSchedule,
    pub root_alloc_total: u64,
    pub next_pool_id: PoolId,
    pub markets: BTreeMap<Pubkey, MarketRewards>,
    /// Pool -> owning market
    pub pool_market: BTreeMap<PoolId, Pubkey>,
    pub stakes: BTreeMap<(PoolId, Pubkey), UserStake>,
}

impl TieredRewardDistributor {
    pub fn new(emission: EmissionSchedule) -> Self {
        Self {
            emission,
            root_alloc_total: 0,
            next_pool_id: 1,
            markets: BTreeMap::new(),
            pool_market: BTreeMap::new(),
            stakes: BTreeMap::new(),
        }
    }

    fn accrual_start(&self, now: u64) -> u64 {
        now.max(self.emission.start_time)
    }

    pub fn market_of(&self, pool: PoolId) -> Result<Pubkey, ProgramError> {
        self.pool_market
            .get(&pool)
            .copied()
            .ok_or_else(|| SyntheticMintError::PoolNotFound.into())
    }

    /// Register a market's root entry and one sub pool per alloc weight
    pub fn add_market(
        &mut self,
        market: Pubkey,
        root_alloc_points: u64,
        pool_alloc_points: &[u64],
        now: u64,
    ) -> Result<Vec<PoolId>, ProgramError> {
        if self.markets.contains_key(&market) {
            return Err(SyntheticMintError::MarketAlreadyListed.into());
        }
        self.mass_update(now)?;

        let start = self.accrual_start(now);
        let mut pools = BTreeMap::new();
        let mut ids = Vec::with_capacity(pool_alloc_points.len());
        let mut sub_alloc_total = 0u64;
        for points in pool_alloc_points {
            let id = self.next_pool_id;
            self.next_pool_id = id.checked_add(1).ok_or(SyntheticMintError::ArithmeticOverflow)?;
            pools.insert(id, RewardAccumulator::new(*points, start));
            self.pool_market.insert(id, market);
            sub_alloc_total = sub_alloc_total
                .checked_add(*points)
                .ok_or(SyntheticMintError::ArithmeticOverflow)?;
            ids.push(id);
        }

        self.root_alloc_total = self
            .root_alloc_total
            .checked_add(root_alloc_points)
            .ok_or(SyntheticMintError::ArithmeticOverflow)?;
        self.markets.insert(
            market,
            MarketRewards {
                root: RewardAccumulator::new(root_alloc_points, start),
                root_stake: UserStake::default(),
                pools,
                sub_alloc_total,
                forfeited: 0,
            },
        );
        Ok(ids)
    }

    pub fn update_market(&mut self, market: &Pubkey, now: u64) -> Result<(), ProgramError> {
        let root_alloc_total = self.root_alloc_total;
        let rewards = self
            .markets
            .get_mut(market)
            .ok_or(SyntheticMintError::MarketNotFound)?;
        rewards.update(&mut self.emission, root_alloc_total, now)
    }

    /// Bring a pool's accumulator (and its market's root entry) up to `now`
    pub fn update_pool(&mut self, pool: PoolId, now: u64) -> Result<(), ProgramError> {
        let market = self.market_of(pool)?;
        self.update_market(&market, now)
    }

    pub fn mass_update(&mut self, now: u64) -> Result<(), ProgramError> {
        let markets: Vec<Pubkey> = self.markets.keys().copied().collect();
        for market in markets {
            self.update_market(&market, now)?;
        }
        Ok(())
    }

    pub fn deposit(&mut self, pool: PoolId, user: &Pubkey, amount: u128, now: u64) -> Result<u128, ProgramError> {
        if amount == 0 {
            return Err(SyntheticMintError::InvalidAmount.into());
        }
        let market = self.market_of(pool)?;
        self.update_market(&market, now)?;

        let rewards = self
            .markets
            .get_mut(&market)
            .ok_or(SyntheticMintError::MarketNotFound)?;
        let before = rewards.aggregate_stake()?;
        let accumulator = rewards
            .pools
            .get_mut(&pool)
            .ok_or(SyntheticMintError::PoolNotFound)?;
        let stake = self.stakes.entry((pool, *user)).or_default();
        let settled = accumulator.stake(stake, amount)?;
        rewards.sync_root_share(before)?;
        Ok(settled)
    }

    pub fn withdraw(&mut self, pool: PoolId, user: &Pubkey, amount: u128, now: u64) -> Result<u128, ProgramError> {
        if amount == 0 {
            return Err(SyntheticMintError::InvalidAmount.into());
        }
        if amount > self.stake_of(pool, user) {
            return Err(SyntheticMintError::InsufficientStake.into());
        }
        let market = self.market_of(pool)?;
        self.update_market(&market, now)?;

        let rewards = self
            .markets
            .get_mut(&market)
            .ok_or(SyntheticMintError::MarketNotFound)?;
        let before = rewards.aggregate_stake()?;
        let accumulator = rewards
            .pools
            .get_mut(&pool)
            .ok_or(SyntheticMintError::PoolNotFound)?;
        let stake = self
            .stakes
            .get_mut(&(pool, *user))
            .ok_or(SyntheticMintError::InsufficientStake)?;
        let settled = accumulator.unstake(stake, amount)?;
        rewards.sync_root_share(before)?;
        Ok(settled)
    }

    /// Settle and take everything the user has earned in `pool`
    pub fn take_reward(&mut self, pool: PoolId, user: &Pubkey, now: u64) -> Result<u128, ProgramError> {
        let market = self.market_of(pool)?;
        self.update_market(&market, now)?;

        let accumulator = self
            .markets
            .get(&market)
            .and_then(|rewards| rewards.pools.get(&pool))
            .ok_or(SyntheticMintError::PoolNotFound)?;
        match self.stakes.get_mut(&(pool, *user)) {
            Some(stake) => accumulator.harvest(stake),
            None => Ok(0),
        }
    }

    /// Unsettled reward as of `now`, computed on a scratch copy
    pub fn pending_reward(&self, pool: PoolId, user: &Pubkey, now: u64) -> Result<u128, ProgramError> {
        let market = self.market_of(pool)?;
        let stake = match self.stakes.get(&(pool, *user)) {
            Some(stake) => *stake,
            None => return Ok(0),
        };
        let mut emission = self.emission.clone();
        let mut rewards = self
            .markets
            .get(&market)
            .cloned()
            .ok_or(SyntheticMintError::MarketNotFound)?;
        rewards.update(&mut emission, self.root_alloc_total, now)?;
        rewards
            .pools
            .get(&pool)
            .ok_or(SyntheticMintError::PoolNotFound)?
            .pending(&stake)
    }

    pub fn claimable_reward(&self, pool: PoolId, user: &Pubkey) -> u128 {
        self.stakes
            .get(&(pool, *user))
            .map(|stake| stake.claimable)
            .unwrap_or(0)
    }

    pub fn stake_of(&self, pool: PoolId, user: &Pubkey) -> u128 {
        self.stakes
            .get(&(pool, *user))
            .map(|stake| stake.amount)
            .unwrap_or(0)
    }

    pub fn set_market_alloc(&mut self, market: &Pubkey, points: u64, now: u64) -> Result<(), ProgramError> {
        self.mass_update(now)?;
        let rewards = self
            .markets
            .get_mut(market)
            .ok_or(SyntheticMintError::MarketNotFound)?;
        let previous = rewards.root.alloc_points;
        rewards.root.alloc_points = points;
        self.root_alloc_total = self
            .root_alloc_total
            .checked_sub(previous)
            .and_then(|total| total.checked_add(points))
            .ok_or(SyntheticMintError::ArithmeticOverflow)?;
        Ok(())
    }

    pub fn set_pool_alloc(&mut self, pool: PoolId, points: u64, now: u64) -> Result<(), ProgramError> {
        let market = self.market_of(pool)?;
        self.update_market(&market, now)?;
        let rewards = self
            .markets
            .get_mut(&market)
            .ok_or(SyntheticMintError::MarketNotFound)?;
        let accumulator = rewards
            .pools
            .get_mut(&pool)
            .ok_or(SyntheticMintError::PoolNotFound)?;
        let previous = accumulator.alloc_points;
        accumulator.alloc_points = points;
        rewards.sub_alloc_total = rewards
            .sub_alloc_total
            .checked_sub(previous)
            .and_then(|total| total.checked_add(points))
            .ok_or(SyntheticMintError::ArithmeticOverflow)?;
        Ok(())
    }
}
