//! Protocol engine
//!
//! Every mutating action runs on a staged copy of the state and replaces the
//! live state only when it returns Ok. A failed action leaves the live state
//! exactly as it was.

pub mod admin;
pub mod auction;
pub mod escrow;
pub mod fees;
pub mod positions;
pub mod staking;

use std::collections::BTreeMap;

use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{msg, program_error::ProgramError, pubkey::Pubkey};

use crate::{
    collaborators::PriceOracle,
    constants::{MAX_ORACLE_DECIMALS, WAD},
    error::SyntheticMintError,
    events::ProtocolEvent,
    math::{normalize_price, relative_price},
    rewards::{EmissionSchedule, TieredRewardDistributor},
    state::{CollateralConfig, FeeLedger, MarketListing, PositionBook, ProtocolConfig, TimeLockEscrow},
};

pub use auction::{quote_auction, AuctionQuote};
pub use positions::ShortTerms;

/// Everything the core persists
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct ProtocolState {
    pub discriminator: [u8; 8],
    pub config: ProtocolConfig,
    /// Logical clock, advanced by the sequencer
    pub now: u64,
    pub collaterals: BTreeMap<Pubkey, CollateralConfig>,
    pub markets: BTreeMap<Pubkey, MarketListing>,
    pub positions: PositionBook,
    pub rewards: TieredRewardDistributor,
    pub fees: FeeLedger,
    pub escrow: TimeLockEscrow,
}

/// Market, collateral and the single price snapshot an action works with
#[derive(Debug, Clone)]
pub struct PriceContext {
    pub market: MarketListing,
    pub collateral: CollateralConfig,
    /// Synthetic price in collateral units (WAD)
    pub price: u128,
    pub min_ratio: u64,
    pub target_ratio: u64,
}

impl ProtocolState {
    pub const DISCRIMINATOR: [u8; 8] = [83, 89, 78, 84, 77, 73, 78, 84]; // "SYNTMINT"

    pub fn market(&self, synthetic_asset: &Pubkey) -> Result<&MarketListing, ProgramError> {
        self.markets
            .get(synthetic_asset)
            .ok_or_else(|| SyntheticMintError::MarketNotFound.into())
    }

    pub fn collateral(&self, asset: &Pubkey) -> Result<&CollateralConfig, ProgramError> {
        self.collaterals
            .get(asset)
            .ok_or_else(|| SyntheticMintError::CollateralNotFound.into())
    }

    /// Fresh oracle price in WAD, rejecting quotes older than the max delay
    pub fn oracle_price<O: PriceOracle + ?Sized>(&self, oracle: &O, asset: &Pubkey) -> Result<u128, ProgramError> {
        let quote = oracle.latest_price(asset)?;
        if quote.decimals > MAX_ORACLE_DECIMALS {
            return Err(SyntheticMintError::InvalidOraclePrice.into());
        }

        let age = self.now.saturating_sub(quote.as_of);
        if age > self.config.oracle_max_delay {
            msg!("Stale price for {}: age {} > {}", asset, age, self.config.oracle_max_delay);
            return Err(SyntheticMintError::StalePrice.into());
        }

        let price = normalize_price(quote.price, quote.decimals)?;
        if price == 0 {
            return Err(SyntheticMintError::InvalidOraclePrice.into());
        }
        Ok(price)
    }

    pub fn price_context<O: PriceOracle + ?Sized>(
        &self,
        oracle: &O,
        synthetic_asset: &Pubkey,
        collateral_asset: &Pubkey,
    ) -> Result<PriceContext, ProgramError> {
        let market = self.market(synthetic_asset)?.clone();
        let collateral = self.collateral(collateral_asset)?.clone();

        let asset_price = match market.ipo {
            Some(ipo) => ipo.pre_ipo_price,
            None => self.oracle_price(oracle, &market.oracle)?,
        };
        let collateral_price = match collateral.oracle {
            Some(feed) => self.oracle_price(oracle, &feed)?,
            None => WAD,
        };

        let price = relative_price(asset_price, collateral_price)?;
        let (min_ratio, target_ratio) = market.effective_ratios(&collateral)?;
        Ok(PriceContext {
            market,
            collateral,
            price,
            min_ratio,
            target_ratio,
        })
    }
}

/// Working copy of the state for one action
pub struct Staged {
    pub state: ProtocolState,
    events: Vec<ProtocolEvent>,
}

impl Staged {
    pub fn record(&mut self, event: ProtocolEvent) {
        self.events.push(event);
    }
}

#[derive(Debug)]
pub struct Protocol {
    state: ProtocolState,
    journal: Vec<ProtocolEvent>,
}

impl Protocol {
    pub fn initialize(config: ProtocolConfig, emission: EmissionSchedule, now: u64) -> Result<Self, ProgramError> {
        config.validate()?;
        msg!("Initializing protocol, authority {}", config.authority);
        Ok(Self {
            state: ProtocolState {
                discriminator: ProtocolState::DISCRIMINATOR,
                config,
                now,
                collaterals: BTreeMap::new(),
                markets: BTreeMap::new(),
                positions: PositionBook::default(),
                rewards: TieredRewardDistributor::new(emission),
                fees: FeeLedger::default(),
                escrow: TimeLockEscrow::default(),
            },
            journal: Vec::new(),
        })
    }

    pub fn from_state(state: ProtocolState) -> Result<Self, ProgramError> {
        if state.discriminator != ProtocolState::DISCRIMINATOR {
            return Err(ProgramError::InvalidAccountData);
        }
        state.config.validate()?;
        Ok(Self {
            state,
            journal: Vec::new(),
        })
    }

    pub fn load(data: &[u8]) -> Result<Self, ProgramError> {
        let state = ProtocolState::try_from_slice(data).map_err(|_| ProgramError::InvalidAccountData)?;
        Self::from_state(state)
    }

    pub fn save(&self) -> Result<Vec<u8>, ProgramError> {
        self.state
            .try_to_vec()
            .map_err(|_| ProgramError::InvalidAccountData)
    }

    pub fn state(&self) -> &ProtocolState {
        &self.state
    }

    pub fn now(&self) -> u64 {
        self.state.now
    }

    pub fn advance_clock(&mut self, now: u64) -> Result<(), ProgramError> {
        if now < self.state.now {
            msg!("Clock regression: {} -> {}", self.state.now, now);
            return Err(SyntheticMintError::ClockRegression.into());
        }
        self.state.now = now;
        Ok(())
    }

    /// Committed events since the last drain
    pub fn events(&self) -> &[ProtocolEvent] {
        &self.journal
    }

    pub fn drain_events(&mut self) -> Vec<ProtocolEvent> {
        std::mem::take(&mut self.journal)
    }

    fn transact<T, F>(&mut self, action: F) -> Result<T, ProgramError>
    where
        F: FnOnce(&mut Staged) -> Result<T, ProgramError>,
    {
        let mut staged = Staged {
            state: self.state.clone(),
            events: Vec::new(),
        };
        let output = action(&mut staged)?;

        self.state = staged.state;
        for event in staged.events {
            event.emit();
            self.journal.push(event);
        }
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::OraclePrice;

    struct FixedOracle(OraclePrice);

    impl PriceOracle for FixedOracle {
        fn latest_price(&self, _asset: &Pubkey) -> Result<OraclePrice, ProgramError> {
            Ok(self.0)
        }
    }

    fn protocol() -> Protocol {
        let config = ProtocolConfig::new(Pubkey::new_unique(), Pubkey::new_unique(), Pubkey::new_unique());
        let emission = EmissionSchedule::new(Pubkey::new_unique(), WAD, 0, 1_000 * WAD);
        Protocol::initialize(config, emission, 100).unwrap()
    }

    #[test]
    fn test_clock_is_monotonic() {
        let mut protocol = protocol();
        protocol.advance_clock(150).unwrap();
        assert_eq!(protocol.now(), 150);
        assert_eq!(
            protocol.advance_clock(149).unwrap_err(),
            ProgramError::from(SyntheticMintError::ClockRegression)
        );
    }

    #[test]
    fn test_oracle_staleness() {
        let mut protocol = protocol();
        protocol.advance_clock(10_000).unwrap();
        let asset = Pubkey::new_unique();

        let fresh = FixedOracle(OraclePrice { price: 3_500_000_000, decimals: 8, as_of: 10_000 - 3_600 });
        assert_eq!(protocol.state().oracle_price(&fresh, &asset).unwrap(), 35 * WAD);

        let stale = FixedOracle(OraclePrice { price: 3_500_000_000, decimals: 8, as_of: 10_000 - 3_601 });
        assert_eq!(
            protocol.state().oracle_price(&stale, &asset).unwrap_err(),
            ProgramError::from(SyntheticMintError::StalePrice)
        );
    }

    #[test]
    fn test_failed_action_leaves_state_untouched() {
        let mut protocol = protocol();
        let before = protocol.save().unwrap();

        let result: Result<(), ProgramError> = protocol.transact(|tx| {
            tx.state.now = 999;
            tx.record(ProtocolEvent::ConfigUpdated);
            Err(SyntheticMintError::InvalidAmount.into())
        });

        assert!(result.is_err());
        assert_eq!(protocol.save().unwrap(), before);
        assert!(protocol.events().is_empty());
    }

    #[test]
    fn test_save_and_load() {
        let protocol = protocol();
        let bytes = protocol.save().unwrap();
        let loaded = Protocol::load(&bytes).unwrap();
        assert_eq!(loaded.state(), protocol.state());

        let mut corrupted = bytes.clone();
        corrupted[0] ^= 0xff;
        assert_eq!(Protocol::load(&corrupted).unwrap_err(), ProgramError::InvalidAccountData);
    }
}
