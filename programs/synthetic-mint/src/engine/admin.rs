//! Administration: listings, risk parameters and protocol configuration
//!
//! Every entry point here requires the protocol authority.

use solana_program::{msg, program_error::ProgramError, pubkey::Pubkey};

use crate::{
    constants::RATIO_SCALE,
    engine::{Protocol, ProtocolState, Staged},
    error::SyntheticMintError,
    events::ProtocolEvent,
    state::{
        validate_ratio_params, CollateralConfig, IpoParams, MarketListing, MarketParams, PoolId, ProtocolConfig,
    },
};

fn validate_ipo(ipo: &IpoParams, target_ratio: u64) -> Result<(), ProgramError> {
    if ipo.pre_ipo_price == 0 {
        msg!("Pre-IPO price must be positive");
        return Err(SyntheticMintError::InvalidRatioParameters.into());
    }
    if ipo.min_cratio_after_ipo < RATIO_SCALE || ipo.min_cratio_after_ipo >= target_ratio {
        msg!(
            "Post-IPO min ratio {} must lie in [1000, {})",
            ipo.min_cratio_after_ipo,
            target_ratio
        );
        return Err(SyntheticMintError::InvalidRatioParameters.into());
    }
    Ok(())
}

impl ProtocolState {
    /// Every listed collateral must leave `listing` with usable ratios
    fn check_market_pairings(&self, listing: &MarketListing) -> Result<(), ProgramError> {
        self.collaterals
            .values()
            .try_for_each(|collateral| listing.validate_with(collateral))
    }

    /// `collateral` must leave every listed market with usable ratios
    fn check_collateral_pairings(&self, collateral: &CollateralConfig) -> Result<(), ProgramError> {
        self.markets
            .values()
            .try_for_each(|listing| listing.validate_with(collateral))
    }
}

impl Staged {
    /// Apply a config change and keep the result valid
    fn update_config<F>(&mut self, caller: &Pubkey, change: F) -> Result<(), ProgramError>
    where
        F: FnOnce(&mut ProtocolConfig),
    {
        self.state.config.require_authority(caller)?;
        change(&mut self.state.config);
        self.state.config.validate()?;
        self.record(ProtocolEvent::ConfigUpdated);
        Ok(())
    }
}

impl Protocol {
    pub fn register_collateral(
        &mut self,
        caller: &Pubkey,
        asset: Pubkey,
        oracle: Option<Pubkey>,
        multiplier: u16,
    ) -> Result<(), ProgramError> {
        self.transact(|tx| {
            tx.state.config.require_authority(caller)?;
            if tx.state.collaterals.contains_key(&asset) {
                return Err(SyntheticMintError::CollateralAlreadyListed.into());
            }
            if multiplier == 0 {
                msg!("Collateral multiplier must be positive");
                return Err(SyntheticMintError::InvalidRatioParameters.into());
            }

            let mut config = CollateralConfig::new(asset, oracle);
            config.multiplier = multiplier;
            tx.state.check_collateral_pairings(&config)?;
            tx.state.collaterals.insert(asset, config);

            msg!("Listed collateral {} with multiplier {}", asset, multiplier);
            tx.record(ProtocolEvent::CollateralListed { asset, multiplier });
            Ok(())
        })
    }

    pub fn set_collateral_multiplier(
        &mut self,
        caller: &Pubkey,
        asset: &Pubkey,
        multiplier: u16,
    ) -> Result<(), ProgramError> {
        self.transact(|tx| {
            tx.state.config.require_authority(caller)?;
            if multiplier == 0 {
                return Err(SyntheticMintError::InvalidRatioParameters.into());
            }
            let config = tx
                .state
                .collaterals
                .get_mut(asset)
                .ok_or(SyntheticMintError::CollateralNotFound)?;
            config.multiplier = multiplier;
            let config = config.clone();
            tx.state.check_collateral_pairings(&config)?;

            msg!("Collateral {} multiplier set to {}", asset, multiplier);
            tx.record(ProtocolEvent::CollateralListed {
                asset: *asset,
                multiplier,
            });
            Ok(())
        })
    }

    /// List a synthetic asset together with its short and long reward pools
    pub fn register_market(&mut self, caller: &Pubkey, params: MarketParams) -> Result<MarketListing, ProgramError> {
        self.transact(|tx| {
            tx.state.config.require_authority(caller)?;
            validate_ratio_params(params.auction_discount, params.min_cratio, params.target_ratio)?;
            if let Some(ipo) = &params.ipo {
                validate_ipo(ipo, params.target_ratio)?;
            }
            if tx.state.markets.contains_key(&params.synthetic_asset) {
                return Err(SyntheticMintError::MarketAlreadyListed.into());
            }

            let now = tx.state.now;
            let pools = tx.state.rewards.add_market(
                params.synthetic_asset,
                params.root_alloc_points,
                &[params.short_alloc_points, params.long_alloc_points],
                now,
            )?;
            let (short_pool_id, long_pool_id) = match pools.as_slice() {
                [short, long] => (*short, *long),
                _ => return Err(SyntheticMintError::InvalidConfiguration.into()),
            };

            let listing = MarketListing::from_params(&params, short_pool_id, long_pool_id);
            tx.state.check_market_pairings(&listing)?;
            tx.state.markets.insert(params.synthetic_asset, listing.clone());

            msg!(
                "Listed market {} (short pool {}, long pool {})",
                params.synthetic_asset,
                short_pool_id,
                long_pool_id
            );
            tx.record(ProtocolEvent::MarketListed {
                synthetic_asset: params.synthetic_asset,
                short_pool_id,
                long_pool_id,
            });
            Ok(listing)
        })
    }

    /// Replace a market's risk parameters. Open positions are judged against
    /// the new values from the next action on.
    pub fn update_market_params(
        &mut self,
        caller: &Pubkey,
        synthetic_asset: &Pubkey,
        auction_discount: u64,
        min_cratio: u64,
        target_ratio: u64,
    ) -> Result<(), ProgramError> {
        self.transact(|tx| {
            tx.state.config.require_authority(caller)?;
            validate_ratio_params(auction_discount, min_cratio, target_ratio)?;

            let market = tx
                .state
                .markets
                .get_mut(synthetic_asset)
                .ok_or(SyntheticMintError::MarketNotFound)?;
            if let Some(ipo) = &market.ipo {
                validate_ipo(ipo, target_ratio)?;
            }
            market.auction_discount = auction_discount;
            market.min_cratio = min_cratio;
            market.target_ratio = target_ratio;
            let listing = market.clone();
            tx.state.check_market_pairings(&listing)?;

            tx.record(ProtocolEvent::MarketParamsUpdated {
                synthetic_asset: *synthetic_asset,
                auction_discount,
                min_cratio,
                target_ratio,
            });
            Ok(())
        })
    }

    /// End the pre-IPO phase; the market switches to oracle pricing
    pub fn trigger_ipo(&mut self, caller: &Pubkey, synthetic_asset: &Pubkey) -> Result<(), ProgramError> {
        self.transact(|tx| {
            tx.state.config.require_authority(caller)?;
            let market = tx
                .state
                .markets
                .get_mut(synthetic_asset)
                .ok_or(SyntheticMintError::MarketNotFound)?;
            let ipo = market.ipo.take().ok_or(SyntheticMintError::NotInPreIpo)?;

            market.min_cratio = ipo.min_cratio_after_ipo;
            validate_ratio_params(market.auction_discount, market.min_cratio, market.target_ratio)?;
            let listing = market.clone();
            tx.state.check_market_pairings(&listing)?;

            msg!("IPO triggered for {}", synthetic_asset);
            tx.record(ProtocolEvent::IpoTriggered {
                synthetic_asset: *synthetic_asset,
                min_cratio: ipo.min_cratio_after_ipo,
            });
            Ok(())
        })
    }

    pub fn set_fee_rate(&mut self, caller: &Pubkey, fee_rate: u16) -> Result<(), ProgramError> {
        self.transact(|tx| tx.update_config(caller, |config| config.fee_rate = fee_rate))
    }

    pub fn set_fee_to(&mut self, caller: &Pubkey, fee_to: Pubkey) -> Result<(), ProgramError> {
        self.transact(|tx| tx.update_config(caller, |config| config.fee_to = fee_to))
    }

    pub fn set_oracle_max_delay(&mut self, caller: &Pubkey, oracle_max_delay: u64) -> Result<(), ProgramError> {
        self.transact(|tx| tx.update_config(caller, |config| config.oracle_max_delay = oracle_max_delay))
    }

    /// Applies to locks created after the change
    pub fn set_lock_period(&mut self, caller: &Pubkey, lock_period: u64) -> Result<(), ProgramError> {
        self.transact(|tx| tx.update_config(caller, |config| config.lock_period = lock_period))
    }

    pub fn set_market_alloc(&mut self, caller: &Pubkey, synthetic_asset: &Pubkey, points: u64) -> Result<(), ProgramError> {
        self.transact(|tx| {
            tx.state.config.require_authority(caller)?;
            let now = tx.state.now;
            tx.state.rewards.set_market_alloc(synthetic_asset, points, now)?;
            msg!("Market {} root allocation set to {}", synthetic_asset, points);
            Ok(())
        })
    }

    pub fn set_pool_alloc(&mut self, caller: &Pubkey, pool: PoolId, points: u64) -> Result<(), ProgramError> {
        self.transact(|tx| {
            tx.state.config.require_authority(caller)?;
            let now = tx.state.now;
            tx.state.rewards.set_pool_alloc(pool, points, now)?;
            msg!("Pool {} allocation set to {}", pool, points);
            Ok(())
        })
    }

    pub fn transfer_authority(&mut self, caller: &Pubkey, authority: Pubkey) -> Result<(), ProgramError> {
        self.transact(|tx| {
            let previous = tx.state.config.authority;
            tx.update_config(caller, |config| config.authority = authority)?;
            msg!("Authority transferred from {} to {}", previous, authority);
            tx.record(ProtocolEvent::AuthorityTransferred { previous, authority });
            Ok(())
        })
    }
}
