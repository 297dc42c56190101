//! 18-decimal fixed-point helpers
//!
//! All results round down unless the name says otherwise. Products are
//! taken in 256 bits so amount * price never overflows before dividing.

use solana_program::program_error::ProgramError;

use crate::constants::{RATIO_SCALE, WAD, WAD_DECIMALS};
use crate::error::SyntheticMintError;
use crate::math::u256::U256;

fn narrow(value: U256) -> Result<u128, ProgramError> {
    value
        .to_u128()
        .ok_or_else(|| SyntheticMintError::ArithmeticOverflow.into())
}

/// floor(a * b / denominator)
pub fn mul_div(a: u128, b: u128, denominator: u128) -> Result<u128, ProgramError> {
    let quotient = U256::mul_u128(a, b)
        .checked_div(&U256::from_u128(denominator))
        .ok_or(SyntheticMintError::ArithmeticOverflow)?;
    narrow(quotient)
}

/// ceil(a * b / denominator)
pub fn mul_div_ceil(a: u128, b: u128, denominator: u128) -> Result<u128, ProgramError> {
    let (quotient, remainder) = U256::mul_u128(a, b)
        .div_rem(&U256::from_u128(denominator))
        .ok_or(SyntheticMintError::ArithmeticOverflow)?;
    let quotient = narrow(quotient)?;
    if remainder.is_zero() {
        Ok(quotient)
    } else {
        quotient
            .checked_add(1)
            .ok_or_else(|| SyntheticMintError::ArithmeticOverflow.into())
    }
}

/// Rescale an oracle quote with `decimals` fractional digits to WAD
pub fn normalize_price(price: u128, decimals: u8) -> Result<u128, ProgramError> {
    if decimals <= WAD_DECIMALS {
        let factor = 10u128.pow((WAD_DECIMALS - decimals) as u32);
        price
            .checked_mul(factor)
            .ok_or_else(|| SyntheticMintError::ArithmeticOverflow.into())
    } else {
        let factor = 10u128.pow((decimals - WAD_DECIMALS) as u32);
        Ok(price / factor)
    }
}

/// Price of the synthetic asset in units of the collateral asset
pub fn relative_price(asset_price: u128, collateral_price: u128) -> Result<u128, ProgramError> {
    if asset_price == 0 || collateral_price == 0 {
        return Err(SyntheticMintError::InvalidOraclePrice.into());
    }
    let price = mul_div(asset_price, WAD, collateral_price)?;
    if price == 0 {
        return Err(SyntheticMintError::InvalidOraclePrice.into());
    }
    Ok(price)
}

/// Collateral-denominated value of a synthetic amount
pub fn value_of(amount: u128, price: u128) -> Result<u128, ProgramError> {
    mul_div(amount, price, WAD)
}

/// Collateral ratio in parts-per-1000, u128::MAX when nothing is owed
pub fn collateral_ratio(collateral: u128, synthetic: u128, price: u128) -> Result<u128, ProgramError> {
    if synthetic == 0 {
        return Ok(u128::MAX);
    }
    let numerator = U256::mul_u128(collateral, WAD * RATIO_SCALE as u128);
    let denominator = U256::mul_u128(synthetic, price);
    let ratio = numerator
        .checked_div(&denominator)
        .ok_or(SyntheticMintError::InvalidOraclePrice)?;
    Ok(ratio.to_u128().unwrap_or(u128::MAX))
}

/// Largest synthetic amount `collateral` backs at `ratio` (parts-per-1000)
pub fn max_mintable(collateral: u128, price: u128, ratio: u64) -> Result<u128, ProgramError> {
    if ratio == 0 {
        return Err(SyntheticMintError::InvalidRatioParameters.into());
    }
    let numerator = U256::mul_u128(collateral, WAD * RATIO_SCALE as u128);
    let denominator = U256::mul_u128(price, ratio as u128);
    let amount = numerator
        .checked_div(&denominator)
        .ok_or(SyntheticMintError::InvalidOraclePrice)?;
    narrow(amount)
}

/// Apply a parts-per-1000 multiplier to a parts-per-1000 ratio, rounding up
pub fn scale_ratio(ratio: u64, multiplier: u16) -> Result<u64, ProgramError> {
    let scaled = mul_div_ceil(ratio as u128, multiplier as u128, RATIO_SCALE as u128)?;
    u64::try_from(scaled).map_err(|_| SyntheticMintError::ArithmeticOverflow.into())
}

/// Protocol fee on a synthetic amount, in collateral units
pub fn fee_amount(amount: u128, price: u128, fee_rate: u16) -> Result<u128, ProgramError> {
    let value = value_of(amount, price)?;
    mul_div(value, fee_rate as u128, RATIO_SCALE as u128)
}
