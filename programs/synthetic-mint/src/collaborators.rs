//! Interfaces to the systems the core consults but does not own
//!
//! Implementations must fail atomically: an `Err` means nothing moved.

use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{program_error::ProgramError, pubkey::Pubkey};

/// Raw quote as returned by a price feed
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct OraclePrice {
    pub price: u128,
    /// Fractional digits of `price`
    pub decimals: u8,
    /// Logical time of the quote
    pub as_of: u64,
}

pub trait PriceOracle {
    fn latest_price(&self, asset: &Pubkey) -> Result<OraclePrice, ProgramError>;
}

/// Amounts consumed and liquidity shares minted by an add-liquidity call
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiquidityReceipt {
    pub used_a: u128,
    pub used_b: u128,
    pub liquidity: u128,
}

/// Automated market maker. Every call acts on the protocol's custody account.
pub trait SwapVenue {
    fn swap_exact_in(
        &mut self,
        asset_in: &Pubkey,
        asset_out: &Pubkey,
        amount_in: u128,
        min_amount_out: u128,
        deadline: u64,
    ) -> Result<u128, ProgramError>;

    #[allow(clippy::too_many_arguments)]
    fn add_liquidity(
        &mut self,
        asset_a: &Pubkey,
        asset_b: &Pubkey,
        amount_a: u128,
        amount_b: u128,
        min_a: u128,
        min_b: u128,
        deadline: u64,
    ) -> Result<LiquidityReceipt, ProgramError>;

    fn remove_liquidity(
        &mut self,
        asset_a: &Pubkey,
        asset_b: &Pubkey,
        liquidity: u128,
        min_a: u128,
        min_b: u128,
        deadline: u64,
    ) -> Result<(u128, u128), ProgramError>;
}

/// Token movement. `transfer_from` pulls into custody, `transfer` pays out of it.
pub trait TokenLedger {
    fn transfer_from(&mut self, asset: &Pubkey, from: &Pubkey, amount: u128) -> Result<(), ProgramError>;

    fn transfer(&mut self, asset: &Pubkey, to: &Pubkey, amount: u128) -> Result<(), ProgramError>;

    fn balance_of(&self, asset: &Pubkey, who: &Pubkey) -> u128;

    /// Issue an asset the protocol controls (synthetics, reward token)
    fn mint_to(&mut self, asset: &Pubkey, to: &Pubkey, amount: u128) -> Result<(), ProgramError>;

    fn burn_from(&mut self, asset: &Pubkey, from: &Pubkey, amount: u128) -> Result<(), ProgramError>;
}

/// Everything an action may call out to
pub trait Collaborators: PriceOracle + SwapVenue + TokenLedger {}

impl<T: PriceOracle + SwapVenue + TokenLedger> Collaborators for T {}
