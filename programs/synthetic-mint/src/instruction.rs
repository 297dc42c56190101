use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{program_error::ProgramError, pubkey::Pubkey};

use crate::{
    engine::ShortTerms,
    state::{LockId, MarketParams, PoolId},
};

/// Caller-facing operations. The caller identity travels beside the
/// instruction data, supplied by the sequencer.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub enum SyntheticMintInstruction {
    /// Open a position; `short` sells the minted synthetic through the venue
    OpenPosition {
        synthetic_asset: Pubkey,
        collateral_asset: Pubkey,
        collateral_amount: u128,
        ratio: u64,
        short: Option<ShortTerms>,
    },

    /// Add collateral to an owned position
    Deposit { position_id: u64, amount: u128 },

    /// Remove collateral, keeping the position at or above its min ratio
    Withdraw { position_id: u64, amount: u128 },

    /// Increase the debt of an owned position
    Mint {
        position_id: u64,
        amount: u128,
        min_out: u128,
        deadline: u64,
    },

    /// Repay debt and release collateral pro rata
    Burn { position_id: u64, amount: u128 },

    /// Liquidate part or all of an undercollateralized position
    Auction { position_id: u64, burn_amount: u128 },

    /// Authority only
    ClaimFee { collateral_asset: Pubkey, amount: u128 },

    /// Release a matured escrow lock to its beneficiary
    Unlock { lock_id: LockId },

    DepositLp { pool_id: PoolId, amount: u128 },

    WithdrawLp { pool_id: PoolId, amount: u128 },

    /// Provide synthetic/quote liquidity and stake the resulting shares
    DepositPair {
        pool_id: PoolId,
        amount_synthetic: u128,
        amount_quote: u128,
        min_synthetic: u128,
        min_quote: u128,
        deadline: u64,
    },

    WithdrawPair {
        pool_id: PoolId,
        liquidity: u128,
        min_synthetic: u128,
        min_quote: u128,
        deadline: u64,
    },

    GetReward { pool_id: PoolId },

    UpdatePool { pool_id: PoolId },

    // Administration
    RegisterCollateral {
        asset: Pubkey,
        oracle: Option<Pubkey>,
        multiplier: u16,
    },

    SetCollateralMultiplier { asset: Pubkey, multiplier: u16 },

    RegisterMarket { params: MarketParams },

    UpdateMarketParams {
        synthetic_asset: Pubkey,
        auction_discount: u64,
        min_cratio: u64,
        target_ratio: u64,
    },

    TriggerIpo { synthetic_asset: Pubkey },

    SetFeeRate { fee_rate: u16 },

    SetFeeTo { fee_to: Pubkey },

    SetOracleMaxDelay { oracle_max_delay: u64 },

    SetLockPeriod { lock_period: u64 },

    SetMarketAlloc { synthetic_asset: Pubkey, points: u64 },

    SetPoolAlloc { pool_id: PoolId, points: u64 },

    TransferAuthority { authority: Pubkey },
}

impl SyntheticMintInstruction {
    pub fn unpack(input: &[u8]) -> Result<Self, ProgramError> {
        if input.is_empty() {
            return Err(ProgramError::InvalidInstructionData);
        }
        Self::try_from_slice(input).map_err(|_| ProgramError::InvalidInstructionData)
    }

    pub fn pack(&self) -> Result<Vec<u8>, ProgramError> {
        self.try_to_vec().map_err(|_| ProgramError::InvalidInstructionData)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unpack_rejects_garbage() {
        assert_eq!(
            SyntheticMintInstruction::unpack(&[]).unwrap_err(),
            ProgramError::InvalidInstructionData
        );
        assert_eq!(
            SyntheticMintInstruction::unpack(&[255, 1, 2]).unwrap_err(),
            ProgramError::InvalidInstructionData
        );
    }

    #[test]
    fn test_unpack_reads_packed_short_open() {
        let instruction = SyntheticMintInstruction::OpenPosition {
            synthetic_asset: Pubkey::new_unique(),
            collateral_asset: Pubkey::new_unique(),
            collateral_amount: 1_000,
            ratio: 2_500,
            short: Some(ShortTerms {
                min_out: 10,
                deadline: 99,
            }),
        };
        let data = instruction.pack().unwrap();
        assert_eq!(SyntheticMintInstruction::unpack(&data).unwrap(), instruction);
    }
}
