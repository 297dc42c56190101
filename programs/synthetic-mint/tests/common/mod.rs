#![allow(dead_code)]

use std::collections::HashMap;

use solana_program::{program_error::ProgramError, pubkey::Pubkey};
use synthetic_mint::{
    constants::WAD,
    engine::Protocol,
    rewards::EmissionSchedule,
    state::{IpoParams, MarketParams, ProtocolConfig},
    LiquidityReceipt, OraclePrice, PriceOracle, SwapVenue, SyntheticMintError, TokenLedger,
};

pub const FEED_DECIMALS: u8 = 8;

/// In-memory oracle, AMM and token ledger
pub struct MockChain {
    pub custody: Pubkey,
    pub now: u64,
    pub prices: HashMap<Pubkey, OraclePrice>,
    pub balances: HashMap<(Pubkey, Pubkey), u128>,
    /// asset_out per asset_in as (numerator, denominator)
    pub swap_rates: HashMap<(Pubkey, Pubkey), (u128, u128)>,
    /// Liquidity shares outstanding per pair
    pub liquidity: HashMap<(Pubkey, Pubkey), u128>,
}

impl MockChain {
    pub fn new(custody: Pubkey) -> Self {
        Self {
            custody,
            now: 0,
            prices: HashMap::new(),
            balances: HashMap::new(),
            swap_rates: HashMap::new(),
            liquidity: HashMap::new(),
        }
    }

    /// Quote `asset` at a whole-unit price on an 8-decimal feed
    pub fn set_price(&mut self, asset: &Pubkey, whole: u128) {
        self.prices.insert(
            *asset,
            OraclePrice {
                price: whole * 100_000_000,
                decimals: FEED_DECIMALS,
                as_of: self.now,
            },
        );
    }

    pub fn restamp_prices(&mut self) {
        let now = self.now;
        for quote in self.prices.values_mut() {
            quote.as_of = now;
        }
    }

    pub fn set_swap_rate(&mut self, asset_in: &Pubkey, asset_out: &Pubkey, numerator: u128, denominator: u128) {
        self.swap_rates.insert((*asset_in, *asset_out), (numerator, denominator));
    }

    pub fn balance(&self, asset: &Pubkey, who: &Pubkey) -> u128 {
        self.balances.get(&(*asset, *who)).copied().unwrap_or(0)
    }

    pub fn credit(&mut self, asset: &Pubkey, who: &Pubkey, amount: u128) {
        *self.balances.entry((*asset, *who)).or_default() += amount;
    }

    fn debit(&mut self, asset: &Pubkey, who: &Pubkey, amount: u128) -> Result<(), ProgramError> {
        let balance = self.balances.entry((*asset, *who)).or_default();
        if *balance < amount {
            return Err(ProgramError::InsufficientFunds);
        }
        *balance -= amount;
        Ok(())
    }

    fn check_deadline(&self, deadline: u64) -> Result<(), ProgramError> {
        if deadline < self.now {
            return Err(SyntheticMintError::DeadlineExpired.into());
        }
        Ok(())
    }

    fn pair_rate(&self, asset_a: &Pubkey, asset_b: &Pubkey) -> Result<(u128, u128), ProgramError> {
        self.swap_rates
            .get(&(*asset_a, *asset_b))
            .copied()
            .ok_or(ProgramError::InvalidArgument)
    }
}

impl PriceOracle for MockChain {
    fn latest_price(&self, asset: &Pubkey) -> Result<OraclePrice, ProgramError> {
        self.prices.get(asset).copied().ok_or(ProgramError::InvalidArgument)
    }
}

impl SwapVenue for MockChain {
    fn swap_exact_in(
        &mut self,
        asset_in: &Pubkey,
        asset_out: &Pubkey,
        amount_in: u128,
        min_amount_out: u128,
        deadline: u64,
    ) -> Result<u128, ProgramError> {
        self.check_deadline(deadline)?;
        let (numerator, denominator) = self.pair_rate(asset_in, asset_out)?;
        let amount_out = amount_in * numerator / denominator;
        if amount_out < min_amount_out {
            return Err(SyntheticMintError::SlippageExceeded.into());
        }
        let custody = self.custody;
        self.debit(asset_in, &custody, amount_in)?;
        self.credit(asset_out, &custody, amount_out);
        Ok(amount_out)
    }

    fn add_liquidity(
        &mut self,
        asset_a: &Pubkey,
        asset_b: &Pubkey,
        amount_a: u128,
        amount_b: u128,
        min_a: u128,
        min_b: u128,
        deadline: u64,
    ) -> Result<LiquidityReceipt, ProgramError> {
        self.check_deadline(deadline)?;
        let (numerator, denominator) = self.pair_rate(asset_a, asset_b)?;
        let used_a = amount_a.min(amount_b * denominator / numerator);
        let used_b = used_a * numerator / denominator;
        if used_a < min_a || used_b < min_b {
            return Err(SyntheticMintError::SlippageExceeded.into());
        }
        let custody = self.custody;
        self.debit(asset_a, &custody, used_a)?;
        self.debit(asset_b, &custody, used_b)?;
        *self.liquidity.entry((*asset_a, *asset_b)).or_default() += used_a;
        Ok(LiquidityReceipt {
            used_a,
            used_b,
            liquidity: used_a,
        })
    }

    fn remove_liquidity(
        &mut self,
        asset_a: &Pubkey,
        asset_b: &Pubkey,
        liquidity: u128,
        min_a: u128,
        min_b: u128,
        deadline: u64,
    ) -> Result<(u128, u128), ProgramError> {
        self.check_deadline(deadline)?;
        let (numerator, denominator) = self.pair_rate(asset_a, asset_b)?;
        let amount_a = liquidity;
        let amount_b = liquidity * numerator / denominator;
        if amount_a < min_a || amount_b < min_b {
            return Err(SyntheticMintError::SlippageExceeded.into());
        }
        let outstanding = self.liquidity.entry((*asset_a, *asset_b)).or_default();
        if *outstanding < liquidity {
            return Err(ProgramError::InsufficientFunds);
        }
        *outstanding -= liquidity;
        let custody = self.custody;
        self.credit(asset_a, &custody, amount_a);
        self.credit(asset_b, &custody, amount_b);
        Ok((amount_a, amount_b))
    }
}

impl TokenLedger for MockChain {
    fn transfer_from(&mut self, asset: &Pubkey, from: &Pubkey, amount: u128) -> Result<(), ProgramError> {
        self.debit(asset, from, amount)?;
        let custody = self.custody;
        self.credit(asset, &custody, amount);
        Ok(())
    }

    fn transfer(&mut self, asset: &Pubkey, to: &Pubkey, amount: u128) -> Result<(), ProgramError> {
        let custody = self.custody;
        self.debit(asset, &custody, amount)?;
        self.credit(asset, to, amount);
        Ok(())
    }

    fn balance_of(&self, asset: &Pubkey, who: &Pubkey) -> u128 {
        self.balance(asset, who)
    }

    fn mint_to(&mut self, asset: &Pubkey, to: &Pubkey, amount: u128) -> Result<(), ProgramError> {
        self.credit(asset, to, amount);
        Ok(())
    }

    fn burn_from(&mut self, asset: &Pubkey, from: &Pubkey, amount: u128) -> Result<(), ProgramError> {
        self.debit(asset, from, amount)
    }
}

/// A protocol with one oracle-less collateral and one listed market
pub struct Fixture {
    pub chain: MockChain,
    pub protocol: Protocol,
    pub authority: Pubkey,
    pub fee_to: Pubkey,
    pub collateral: Pubkey,
    pub synthetic: Pubkey,
    pub quote: Pubkey,
    pub lp: Pubkey,
    pub reward: Pubkey,
    pub short_pool: u64,
    pub long_pool: u64,
}

pub fn market_params(synthetic: Pubkey, quote: Pubkey, lp: Pubkey, discount: u64, min: u64, target: u64) -> MarketParams {
    MarketParams {
        synthetic_asset: synthetic,
        oracle: synthetic,
        quote_asset: quote,
        lp_asset: lp,
        auction_discount: discount,
        min_cratio: min,
        target_ratio: target,
        ipo: None,
        root_alloc_points: 100,
        short_alloc_points: 1,
        long_alloc_points: 3,
    }
}

impl Fixture {
    pub fn new(discount: u64, min: u64, target: u64) -> Self {
        Self::build(discount, min, target, None, u128::MAX)
    }

    pub fn with_ipo(ipo: IpoParams) -> Self {
        Self::build(800, 1500, 1800, Some(ipo), u128::MAX)
    }

    pub fn with_emission_cap(max_mint: u128) -> Self {
        Self::build(800, 1500, 1800, None, max_mint)
    }

    fn build(discount: u64, min: u64, target: u64, ipo: Option<IpoParams>, max_mint: u128) -> Self {
        let authority = Pubkey::new_unique();
        let custody = Pubkey::new_unique();
        let fee_to = Pubkey::new_unique();
        let reward = Pubkey::new_unique();

        let config = ProtocolConfig::new(authority, custody, fee_to);
        let emission = EmissionSchedule::new(reward, WAD, 0, max_mint);
        let mut protocol = Protocol::initialize(config, emission, 0).unwrap();

        let collateral = Pubkey::new_unique();
        let synthetic = Pubkey::new_unique();
        let quote = Pubkey::new_unique();
        let lp = Pubkey::new_unique();

        protocol
            .register_collateral(&authority, collateral, None, 1000)
            .unwrap();
        let mut params = market_params(synthetic, quote, lp, discount, min, target);
        params.ipo = ipo;
        let listing = protocol.register_market(&authority, params).unwrap();

        let mut chain = MockChain::new(custody);
        chain.set_price(&synthetic, 35);
        chain.set_swap_rate(&synthetic, &quote, 35, 1);

        Self {
            chain,
            protocol,
            authority,
            fee_to,
            collateral,
            synthetic,
            quote,
            lp,
            reward,
            short_pool: listing.short_pool_id,
            long_pool: listing.long_pool_id,
        }
    }

    /// Move both clocks forward, keeping oracle quotes fresh
    pub fn warp(&mut self, now: u64) {
        self.chain.now = now;
        self.chain.restamp_prices();
        self.protocol.advance_clock(now).unwrap();
    }

    pub fn fund(&mut self, who: &Pubkey, amount: u128) {
        let collateral = self.collateral;
        self.chain.credit(&collateral, who, amount);
    }

    /// Fund `owner` and open a long position
    pub fn open_long(&mut self, owner: &Pubkey, collateral_amount: u128, ratio: u64) -> u64 {
        self.fund(owner, collateral_amount);
        self.protocol
            .open(
                &mut self.chain,
                owner,
                &self.synthetic,
                &self.collateral,
                collateral_amount,
                ratio,
                None,
            )
            .unwrap()
    }

    pub fn ratio(&self, position_id: u64) -> u128 {
        self.protocol.current_ratio(&self.chain, position_id).unwrap()
    }
}
