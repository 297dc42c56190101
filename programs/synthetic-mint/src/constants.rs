//! Protocol constants
//!
//! Fixed-point scales and the defaults used when a config is created

/// 18-decimal fixed point unit for amounts and prices
pub const WAD: u128 = 1_000_000_000_000_000_000;

/// Decimals of the WAD unit
pub const WAD_DECIMALS: u8 = 18;

/// Ratios, discounts, fee rates and multipliers are parts-per-1000
pub const RATIO_SCALE: u64 = 1_000;

/// Precision of reward-per-share accumulators
pub const ACC_PRECISION: u128 = 1_000_000_000_000;

/// Stake a market's sub tier holds in the root tier while it has stakers.
/// Equal to `ACC_PRECISION` so root distributions divide without remainder.
pub const ROOT_SHARE: u128 = ACC_PRECISION;

/// Position ids start here
pub const FIRST_POSITION_ID: u64 = 1;

/// Default protocol fee (2 = 0.2%)
pub const DEFAULT_FEE_RATE: u16 = 2;

/// Default oracle staleness bound in clock units (seconds)
pub const DEFAULT_ORACLE_MAX_DELAY: u64 = 3_600;

/// Default escrow delay (7 days)
pub const DEFAULT_LOCK_PERIOD: u64 = 7 * 24 * 3_600;

/// Default collateral multiplier (1.0)
pub const DEFAULT_COLLATERAL_MULTIPLIER: u16 = 1_000;

/// Upper bound accepted for oracle decimals
pub const MAX_ORACLE_DECIMALS: u8 = 36;
