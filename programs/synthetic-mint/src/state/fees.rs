use std::collections::BTreeMap;

use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{program_error::ProgramError, pubkey::Pubkey};

use crate::error::SyntheticMintError;

/// Accrued protocol fees per collateral asset
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct FeeLedger {
    pub accrued: BTreeMap<Pubkey, u128>,
}

impl FeeLedger {
    pub fn accrue(&mut self, collateral_asset: &Pubkey, amount: u128) -> Result<(), ProgramError> {
        if amount == 0 {
            return Ok(());
        }
        let entry = self.accrued.entry(*collateral_asset).or_insert(0);
        *entry = entry
            .checked_add(amount)
            .ok_or(SyntheticMintError::ArithmeticOverflow)?;
        Ok(())
    }

    pub fn debit(&mut self, collateral_asset: &Pubkey, amount: u128) -> Result<(), ProgramError> {
        let balance = self.accrued_for(collateral_asset);
        if amount > balance {
            return Err(SyntheticMintError::InsufficientFee.into());
        }
        self.accrued.insert(*collateral_asset, balance - amount);
        Ok(())
    }

    pub fn accrued_for(&self, collateral_asset: &Pubkey) -> u128 {
        self.accrued.get(collateral_asset).copied().unwrap_or(0)
    }
}
