//! Protocol events
//!
//! Staged during an action and emitted only once it commits.

use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{msg, pubkey::Pubkey};

use crate::state::{LockId, PoolId};

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolEvent {
    PositionOpened {
        position_id: u64,
        owner: Pubkey,
        synthetic_asset: Pubkey,
        collateral_asset: Pubkey,
        collateral_amount: u128,
        synthetic_amount: u128,
        is_short: bool,
    },
    CollateralDeposited {
        position_id: u64,
        amount: u128,
    },
    CollateralWithdrawn {
        position_id: u64,
        amount: u128,
    },
    SyntheticMinted {
        position_id: u64,
        amount: u128,
    },
    SyntheticBurned {
        position_id: u64,
        amount: u128,
        released: u128,
        fee: u128,
    },
    PositionClosed {
        position_id: u64,
        owner: Pubkey,
        returned_collateral: u128,
    },
    ShortSold {
        position_id: u64,
        synthetic_sold: u128,
        proceeds: u128,
    },
    AuctionSettled {
        position_id: u64,
        liquidator: Pubkey,
        burned: u128,
        released: u128,
        fee: u128,
    },
    AuctionShortfall {
        position_id: u64,
        collateral: u128,
        synthetic: u128,
    },
    FeeAccrued {
        collateral_asset: Pubkey,
        amount: u128,
    },
    FeeClaimed {
        collateral_asset: Pubkey,
        amount: u128,
        to: Pubkey,
    },
    CollateralLocked {
        lock_id: LockId,
        beneficiary: Pubkey,
        asset: Pubkey,
        amount: u128,
        available_at: u64,
    },
    CollateralUnlocked {
        lock_id: LockId,
        beneficiary: Pubkey,
        amount: u128,
    },
    Staked {
        pool_id: PoolId,
        user: Pubkey,
        amount: u128,
    },
    Unstaked {
        pool_id: PoolId,
        user: Pubkey,
        amount: u128,
    },
    RewardPaid {
        pool_id: PoolId,
        user: Pubkey,
        amount: u128,
    },
    LiquidityStaked {
        pool_id: PoolId,
        user: Pubkey,
        used_a: u128,
        used_b: u128,
        liquidity: u128,
    },
    LiquidityUnstaked {
        pool_id: PoolId,
        user: Pubkey,
        liquidity: u128,
        amount_a: u128,
        amount_b: u128,
    },
    CollateralListed {
        asset: Pubkey,
        multiplier: u16,
    },
    MarketListed {
        synthetic_asset: Pubkey,
        short_pool_id: PoolId,
        long_pool_id: PoolId,
    },
    MarketParamsUpdated {
        synthetic_asset: Pubkey,
        auction_discount: u64,
        min_cratio: u64,
        target_ratio: u64,
    },
    IpoTriggered {
        synthetic_asset: Pubkey,
        min_cratio: u64,
    },
    ConfigUpdated,
    AuthorityTransferred {
        previous: Pubkey,
        authority: Pubkey,
    },
}

impl ProtocolEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::PositionOpened { .. } => "PositionOpened",
            Self::CollateralDeposited { .. } => "CollateralDeposited",
            Self::CollateralWithdrawn { .. } => "CollateralWithdrawn",
            Self::SyntheticMinted { .. } => "SyntheticMinted",
            Self::SyntheticBurned { .. } => "SyntheticBurned",
            Self::PositionClosed { .. } => "PositionClosed",
            Self::ShortSold { .. } => "ShortSold",
            Self::AuctionSettled { .. } => "AuctionSettled",
            Self::AuctionShortfall { .. } => "AuctionShortfall",
            Self::FeeAccrued { .. } => "FeeAccrued",
            Self::FeeClaimed { .. } => "FeeClaimed",
            Self::CollateralLocked { .. } => "CollateralLocked",
            Self::CollateralUnlocked { .. } => "CollateralUnlocked",
            Self::Staked { .. } => "Staked",
            Self::Unstaked { .. } => "Unstaked",
            Self::RewardPaid { .. } => "RewardPaid",
            Self::LiquidityStaked { .. } => "LiquidityStaked",
            Self::LiquidityUnstaked { .. } => "LiquidityUnstaked",
            Self::CollateralListed { .. } => "CollateralListed",
            Self::MarketListed { .. } => "MarketListed",
            Self::MarketParamsUpdated { .. } => "MarketParamsUpdated",
            Self::IpoTriggered { .. } => "IpoTriggered",
            Self::ConfigUpdated => "ConfigUpdated",
            Self::AuthorityTransferred { .. } => "AuthorityTransferred",
        }
    }

    pub fn emit(&self) {
        msg!("SYNTHETIC_MINT_EVENT");
        msg!("TYPE:{}", self.kind());

        if let Ok(data) = self.try_to_vec() {
            msg!("DATA:{}", bs58::encode(&data).into_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_data_decodes_from_log_encoding() {
        let event = ProtocolEvent::PositionClosed {
            position_id: 7,
            owner: Pubkey::new_unique(),
            returned_collateral: 42,
        };
        let encoded = bs58::encode(event.try_to_vec().unwrap()).into_string();
        let bytes = bs58::decode(encoded).into_vec().unwrap();
        assert_eq!(ProtocolEvent::try_from_slice(&bytes).unwrap(), event);
        assert_eq!(event.kind(), "PositionClosed");
    }
}
