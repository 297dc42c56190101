use num_derive::FromPrimitive;
use solana_program::{
    decode_error::DecodeError,
    program_error::{PrintProgramError, ProgramError},
};
use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, FromPrimitive, PartialEq, Eq)]
pub enum SyntheticMintError {
    // Validation
    #[error("Requested ratio is below the market minimum")]
    InsufficientRatio = 0,

    #[error("Resulting ratio would fall below the market minimum")]
    RatioBreach = 1,

    #[error("Withdrawal exceeds staked amount")]
    InsufficientStake = 2,

    #[error("Claim exceeds accrued fee")]
    InsufficientFee = 3,

    #[error("Amount must be non-zero and within bounds")]
    InvalidAmount = 4,

    #[error("Invalid ratio parameters")]
    InvalidRatioParameters = 5,

    // Market state
    #[error("Position is not eligible for auction")]
    NotLiquidatable = 10,

    #[error("Burn amount exceeds the auction cap")]
    AmountExceedsAuctionCap = 11,

    #[error("Pre-IPO mint window has ended")]
    MintPeriodEnded = 12,

    #[error("Market is not in pre-IPO")]
    NotInPreIpo = 13,

    // Collaborators
    #[error("Oracle price is stale")]
    StalePrice = 20,

    #[error("Swap output below minimum")]
    SlippageExceeded = 21,

    #[error("Deadline expired")]
    DeadlineExpired = 22,

    #[error("Oracle returned an unusable price")]
    InvalidOraclePrice = 23,

    // Access and lookup
    #[error("Caller is not authorized")]
    Unauthorized = 30,

    #[error("Market not found")]
    MarketNotFound = 31,

    #[error("Market already listed")]
    MarketAlreadyListed = 32,

    #[error("Collateral not found")]
    CollateralNotFound = 33,

    #[error("Collateral already listed")]
    CollateralAlreadyListed = 34,

    #[error("Position not found")]
    PositionNotFound = 35,

    #[error("Reward pool not found")]
    PoolNotFound = 36,

    #[error("Lock not found")]
    LockNotFound = 37,

    #[error("Pool does not accept direct stakes")]
    NotLongPool = 38,

    // Invariants
    #[error("Arithmetic overflow")]
    ArithmeticOverflow = 40,

    #[error("Emission cap exceeded")]
    EmissionCapExceeded = 41,

    #[error("Logical clock moved backwards")]
    ClockRegression = 42,

    #[error("Invalid configuration")]
    InvalidConfiguration = 43,

    // Escrow
    #[error("Lock has not matured")]
    StillLocked = 50,
}

impl PrintProgramError for SyntheticMintError {
    fn print<E>(&self) {
        use solana_program::msg;
        msg!("SyntheticMintError: {}", self);
    }
}

impl From<SyntheticMintError> for ProgramError {
    fn from(e: SyntheticMintError) -> Self {
        ProgramError::Custom(e as u32)
    }
}

impl<T> DecodeError<T> for SyntheticMintError {
    fn type_of() -> &'static str {
        "SyntheticMintError"
    }
}
