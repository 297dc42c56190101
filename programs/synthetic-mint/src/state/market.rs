use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{msg, program_error::ProgramError, pubkey::Pubkey};

use crate::{
    constants::{DEFAULT_COLLATERAL_MULTIPLIER, RATIO_SCALE},
    error::SyntheticMintError,
    math::scale_ratio,
};

pub type PoolId = u64;

/// Fixed-price issuance window before a listing goes public
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct IpoParams {
    /// Last clock value at which open/mint are accepted
    pub mint_end: u64,
    /// Synthetic price in WAD used instead of the oracle
    pub pre_ipo_price: u128,
    /// Min ratio that replaces the listing's once the IPO triggers
    pub min_cratio_after_ipo: u64,
}

/// Parameters supplied by administration when listing a synthetic asset
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct MarketParams {
    pub synthetic_asset: Pubkey,
    /// Asset id the price oracle quotes for this market
    pub oracle: Pubkey,
    /// Other side of the AMM pair, receives short sale proceeds
    pub quote_asset: Pubkey,
    /// Liquidity-share token of the synthetic/quote pair
    pub lp_asset: Pubkey,
    pub auction_discount: u64,
    pub min_cratio: u64,
    pub target_ratio: u64,
    pub ipo: Option<IpoParams>,
    pub root_alloc_points: u64,
    pub short_alloc_points: u64,
    pub long_alloc_points: u64,
}

/// Listing consumed read-only by the position engine
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct MarketListing {
    pub synthetic_asset: Pubkey,
    pub oracle: Pubkey,
    pub quote_asset: Pubkey,
    pub lp_asset: Pubkey,

    /// Parts-per-1000; liquidators pay `discount` of fair value
    pub auction_discount: u64,

    /// Parts-per-1000
    pub min_cratio: u64,

    /// Parts-per-1000, always above `min_cratio`
    pub target_ratio: u64,

    pub short_pool_id: PoolId,
    pub long_pool_id: PoolId,

    pub ipo: Option<IpoParams>,
}

impl MarketListing {
    pub fn from_params(params: &MarketParams, short_pool_id: PoolId, long_pool_id: PoolId) -> Self {
        Self {
            synthetic_asset: params.synthetic_asset,
            oracle: params.oracle,
            quote_asset: params.quote_asset,
            lp_asset: params.lp_asset,
            auction_discount: params.auction_discount,
            min_cratio: params.min_cratio,
            target_ratio: params.target_ratio,
            short_pool_id,
            long_pool_id,
            ipo: params.ipo,
        }
    }

    pub fn is_pre_ipo(&self) -> bool {
        self.ipo.is_some()
    }

    /// Min and target ratio after the collateral multiplier
    pub fn effective_ratios(&self, collateral: &CollateralConfig) -> Result<(u64, u64), ProgramError> {
        Ok((
            scale_ratio(self.min_cratio, collateral.multiplier)?,
            scale_ratio(self.target_ratio, collateral.multiplier)?,
        ))
    }

    /// Check the ratios a position backed by `collateral` would be held to
    pub fn validate_with(&self, collateral: &CollateralConfig) -> Result<(), ProgramError> {
        let (min_ratio, target_ratio) = self.effective_ratios(collateral)?;
        validate_ratio_params(self.auction_discount, min_ratio, target_ratio).map_err(|err| {
            msg!(
                "Market {} invalid under collateral {} (multiplier {})",
                self.synthetic_asset,
                collateral.asset,
                collateral.multiplier
            );
            err
        })
    }
}

pub fn validate_ratio_params(auction_discount: u64, min_cratio: u64, target_ratio: u64) -> Result<(), ProgramError> {
    if auction_discount == 0 || auction_discount >= RATIO_SCALE {
        msg!("Auction discount {} outside (0, 1000)", auction_discount);
        return Err(SyntheticMintError::InvalidRatioParameters.into());
    }

    if min_cratio < RATIO_SCALE {
        msg!("Min ratio {} below 100%", min_cratio);
        return Err(SyntheticMintError::InvalidRatioParameters.into());
    }

    if target_ratio <= min_cratio {
        msg!("Target ratio {} must exceed min ratio {}", target_ratio, min_cratio);
        return Err(SyntheticMintError::InvalidRatioParameters.into());
    }

    // below this no partial auction moves a position toward the target
    let scale_sq = (RATIO_SCALE as u128) * (RATIO_SCALE as u128);
    if (target_ratio as u128) * (auction_discount as u128) <= scale_sq {
        msg!(
            "Target ratio {} and discount {} leave no partial auction",
            target_ratio,
            auction_discount
        );
        return Err(SyntheticMintError::InvalidRatioParameters.into());
    }

    Ok(())
}

/// Whitelisted collateral
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct CollateralConfig {
    pub asset: Pubkey,
    /// Oracle asset id; None prices the collateral at exactly 1
    pub oracle: Option<Pubkey>,
    /// Parts-per-1000 applied to the market's ratios
    pub multiplier: u16,
}

impl CollateralConfig {
    pub fn new(asset: Pubkey, oracle: Option<Pubkey>) -> Self {
        Self {
            asset,
            oracle,
            multiplier: DEFAULT_COLLATERAL_MULTIPLIER,
        }
    }
}
