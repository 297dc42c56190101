use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{msg, program_error::ProgramError, pubkey::Pubkey};

use crate::{
    constants::{DEFAULT_FEE_RATE, DEFAULT_LOCK_PERIOD, DEFAULT_ORACLE_MAX_DELAY, RATIO_SCALE},
    error::SyntheticMintError,
};

/// Administration-owned parameters the core reads on every action
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct ProtocolConfig {
    /// Single capability governing every admin entry point
    pub authority: Pubkey,

    /// Account the core holds collateral, swap proceeds and LP shares in
    pub custody: Pubkey,

    /// Recipient of claimed protocol fees
    pub fee_to: Pubkey,

    /// Protocol fee, parts-per-1000 of burned value (2 = 0.2%)
    pub fee_rate: u16,

    /// Maximum oracle age in clock units
    pub oracle_max_delay: u64,

    /// Escrow delay for short-side releases
    pub lock_period: u64,
}

impl ProtocolConfig {
    /// Create a config with default parameters
    pub fn new(authority: Pubkey, custody: Pubkey, fee_to: Pubkey) -> Self {
        Self {
            authority,
            custody,
            fee_to,
            fee_rate: DEFAULT_FEE_RATE,
            oracle_max_delay: DEFAULT_ORACLE_MAX_DELAY,
            lock_period: DEFAULT_LOCK_PERIOD,
        }
    }

    pub fn validate(&self) -> Result<(), ProgramError> {
        if self.fee_rate as u64 >= RATIO_SCALE {
            msg!("Fee rate {} out of range", self.fee_rate);
            return Err(SyntheticMintError::InvalidConfiguration.into());
        }

        if self.oracle_max_delay == 0 {
            return Err(SyntheticMintError::InvalidConfiguration.into());
        }

        if self.custody == self.authority {
            msg!("Custody must be distinct from the authority");
            return Err(SyntheticMintError::InvalidConfiguration.into());
        }

        Ok(())
    }

    pub fn require_authority(&self, caller: &Pubkey) -> Result<(), ProgramError> {
        if *caller != self.authority {
            msg!("Caller {} is not the protocol authority", caller);
            return Err(SyntheticMintError::Unauthorized.into());
        }
        Ok(())
    }
}
