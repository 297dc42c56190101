//! Collateralized debt positions
//!
//! A position is live while it owes synthetic. Burning the last unit
//! removes it from the book; its id is never handed out again.

use std::collections::BTreeMap;

use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{program_error::ProgramError, pubkey::Pubkey};

use crate::{constants::FIRST_POSITION_ID, error::SyntheticMintError};

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub id: u64,
    pub owner: Pubkey,
    pub collateral_asset: Pubkey,
    pub collateral_amount: u128,
    pub synthetic_asset: Pubkey,
    pub synthetic_amount: u128,
    /// Minted synthetic is sold and staked in the short pool
    pub is_short: bool,
    /// Logical time of creation
    pub opened_at: u64,
    /// Escrow sequence for releases queued by this position
    pub next_lock_seq: u64,
}

impl Position {
    pub fn deposit_collateral(&mut self, amount: u128) -> Result<(), ProgramError> {
        self.collateral_amount = self
            .collateral_amount
            .checked_add(amount)
            .ok_or(SyntheticMintError::ArithmeticOverflow)?;
        Ok(())
    }

    pub fn withdraw_collateral(&mut self, amount: u128) -> Result<(), ProgramError> {
        self.collateral_amount = self
            .collateral_amount
            .checked_sub(amount)
            .ok_or(SyntheticMintError::InvalidAmount)?;
        Ok(())
    }

    pub fn add_debt(&mut self, amount: u128) -> Result<(), ProgramError> {
        self.synthetic_amount = self
            .synthetic_amount
            .checked_add(amount)
            .ok_or(SyntheticMintError::ArithmeticOverflow)?;
        Ok(())
    }

    pub fn repay_debt(&mut self, amount: u128) -> Result<(), ProgramError> {
        self.synthetic_amount = self
            .synthetic_amount
            .checked_sub(amount)
            .ok_or(SyntheticMintError::InvalidAmount)?;
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.synthetic_amount == 0
    }

    /// Take the next escrow sequence number
    pub fn take_lock_seq(&mut self) -> u64 {
        let seq = self.next_lock_seq;
        self.next_lock_seq += 1;
        seq
    }
}

/// Live positions keyed by id
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct PositionBook {
    pub next_id: u64,
    pub live: BTreeMap<u64, Position>,
}

impl Default for PositionBook {
    fn default() -> Self {
        Self {
            next_id: FIRST_POSITION_ID,
            live: BTreeMap::new(),
        }
    }
}

impl PositionBook {
    /// Assign the next id and insert a fresh position
    #[allow(clippy::too_many_arguments)]
    pub fn open(
        &mut self,
        owner: Pubkey,
        collateral_asset: Pubkey,
        collateral_amount: u128,
        synthetic_asset: Pubkey,
        synthetic_amount: u128,
        is_short: bool,
        now: u64,
    ) -> Result<u64, ProgramError> {
        let id = self.next_id;
        self.next_id = id.checked_add(1).ok_or(SyntheticMintError::ArithmeticOverflow)?;
        self.live.insert(
            id,
            Position {
                id,
                owner,
                collateral_asset,
                collateral_amount,
                synthetic_asset,
                synthetic_amount,
                is_short,
                opened_at: now,
                next_lock_seq: 0,
            },
        );
        Ok(id)
    }

    pub fn get(&self, id: u64) -> Result<&Position, ProgramError> {
        self.live
            .get(&id)
            .ok_or_else(|| SyntheticMintError::PositionNotFound.into())
    }

    pub fn get_mut(&mut self, id: u64) -> Result<&mut Position, ProgramError> {
        self.live
            .get_mut(&id)
            .ok_or_else(|| SyntheticMintError::PositionNotFound.into())
    }

    /// Fetch a position the caller owns
    pub fn owned_mut(&mut self, id: u64, caller: &Pubkey) -> Result<&mut Position, ProgramError> {
        let position = self.get_mut(id)?;
        if position.owner != *caller {
            return Err(SyntheticMintError::Unauthorized.into());
        }
        Ok(position)
    }

    pub fn remove(&mut self, id: u64) -> Option<Position> {
        self.live.remove(&id)
    }

    /// Page through an owner's live positions in id order
    pub fn of_owner(&self, owner: &Pubkey, start: usize, count: usize) -> Vec<&Position> {
        self.live
            .values()
            .filter(|p| p.owner == *owner)
            .skip(start)
            .take(count)
            .collect()
    }
}
