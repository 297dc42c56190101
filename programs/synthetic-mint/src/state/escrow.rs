use std::collections::BTreeMap;

use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{program_error::ProgramError, pubkey::Pubkey};

use crate::error::SyntheticMintError;

/// Escrow key: the releasing position and its per-position sequence
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LockId {
    pub position_id: u64,
    pub seq: u64,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct LockRecord {
    pub beneficiary: Pubkey,
    pub asset: Pubkey,
    pub amount: u128,
    pub available_at: u64,
}

/// Short-side releases waiting out the lock period
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct TimeLockEscrow {
    pub locks: BTreeMap<LockId, LockRecord>,
}

impl TimeLockEscrow {
    pub fn lock(&mut self, id: LockId, record: LockRecord) -> Result<(), ProgramError> {
        if record.amount == 0 {
            return Err(SyntheticMintError::InvalidAmount.into());
        }
        self.locks.insert(id, record);
        Ok(())
    }

    /// Remove a matured lock and hand back its record
    pub fn release(&mut self, id: &LockId, now: u64) -> Result<LockRecord, ProgramError> {
        let record = self.locks.get(id).ok_or(SyntheticMintError::LockNotFound)?;
        if now < record.available_at {
            return Err(SyntheticMintError::StillLocked.into());
        }
        self.locks
            .remove(id)
            .ok_or_else(|| SyntheticMintError::LockNotFound.into())
    }

    pub fn of_beneficiary(&self, beneficiary: &Pubkey) -> Vec<(LockId, &LockRecord)> {
        self.locks
            .iter()
            .filter(|(_, record)| record.beneficiary == *beneficiary)
            .map(|(id, record)| (*id, record))
            .collect()
    }
}
