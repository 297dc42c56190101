//! Discount auction for under-collateralized positions
//!
//! With ratios as fractions, target `t`, discount `d` and price `P`, the
//! burn `x` and collateral `y` satisfy
//!
//!   y = x * P / d
//!   C - y = t * P * (A - x)
//!
//! so `x = (t*A*P - C) / (P * (t - 1/d))`, clamped to `[0, A]`. When
//! `t <= 1/d` no burn helps and the cap is zero. When the result exceeds
//! the position, the whole position goes to auction instead.

use solana_program::{msg, program_error::ProgramError, pubkey::Pubkey};

use crate::{
    collaborators::{Collaborators, PriceOracle},
    constants::{RATIO_SCALE, WAD},
    engine::Protocol,
    error::SyntheticMintError,
    events::ProtocolEvent,
    math::{collateral_ratio, mul_div, U256},
};

/// Largest burn an auction accepts and the collateral it releases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuctionQuote {
    pub burn: u128,
    pub collateral: u128,
    /// Target ratio is unreachable; everything is released
    pub full_liquidation: bool,
}

fn overflow() -> ProgramError {
    SyntheticMintError::ArithmeticOverflow.into()
}

/// Compute the auction trade for a position. Ratios and discount are
/// parts-per-1000, amounts and price are WAD.
pub fn quote_auction(
    collateral: u128,
    synthetic: u128,
    price: u128,
    min_ratio: u64,
    target_ratio: u64,
    discount: u64,
) -> Result<AuctionQuote, ProgramError> {
    let ratio = collateral_ratio(collateral, synthetic, price)?;
    if ratio >= min_ratio as u128 {
        return Err(SyntheticMintError::NotLiquidatable.into());
    }

    let scale_sq = (RATIO_SCALE * RATIO_SCALE) as u128;
    let weighted = (target_ratio as u128) * (discount as u128);
    if weighted <= scale_sq {
        msg!("Target {} unreachable at discount {}, auction cap is zero", target_ratio, discount);
        return Ok(AuctionQuote {
            burn: 0,
            collateral: 0,
            full_liquidation: false,
        });
    }

    let full = AuctionQuote {
        burn: synthetic,
        collateral,
        full_liquidation: true,
    };

    // t*A*P and C, both scaled by 1000 * WAD
    let debt_at_target = U256::mul_u128(synthetic, price)
        .checked_mul_u128(target_ratio as u128)
        .ok_or_else(overflow)?;
    let collateral_scaled = U256::mul_u128(collateral, WAD * RATIO_SCALE as u128);
    let gap = match debt_at_target.checked_sub(&collateral_scaled) {
        Some(gap) if !gap.is_zero() => gap,
        _ => return Err(SyntheticMintError::NotLiquidatable.into()),
    };

    let numerator = gap.checked_mul_u128(discount as u128).ok_or_else(overflow)?;
    let denominator = U256::mul_u128(price, weighted - scale_sq);
    let burn = match numerator.checked_div(&denominator).and_then(|q| q.to_u128()) {
        Some(burn) => burn,
        None => return Ok(full),
    };

    let released = U256::mul_u128(burn, price)
        .checked_mul_u128(RATIO_SCALE as u128)
        .and_then(|v| v.checked_div(&U256::from_u128(WAD * discount as u128)))
        .and_then(|q| q.to_u128());
    let released = match released {
        Some(released) => released,
        None => return Ok(full),
    };

    if burn > synthetic || released > collateral {
        return Ok(full);
    }

    Ok(AuctionQuote {
        burn,
        collateral: released,
        full_liquidation: false,
    })
}

impl Protocol {
    /// Preview of the auction trade at the current price
    pub fn amount_in_auction(&self, oracle: &dyn PriceOracle, position_id: u64) -> Result<AuctionQuote, ProgramError> {
        let position = self.state.positions.get(position_id)?;
        let ctx = self
            .state
            .price_context(oracle, &position.synthetic_asset, &position.collateral_asset)?;
        quote_auction(
            position.collateral_amount,
            position.synthetic_amount,
            ctx.price,
            ctx.min_ratio,
            ctx.target_ratio,
            ctx.market.auction_discount,
        )
    }

    /// Burn up to the live auction cap of `position_id` and receive the
    /// matching discounted collateral, less the protocol fee.
    pub fn auction(
        &mut self,
        env: &mut dyn Collaborators,
        liquidator: &Pubkey,
        position_id: u64,
        burn_amount: u128,
    ) -> Result<(), ProgramError> {
        self.transact(|tx| {
            if burn_amount == 0 {
                return Err(SyntheticMintError::InvalidAmount.into());
            }
            let position = tx.state.positions.get(position_id)?.clone();
            let ctx = tx
                .state
                .price_context(&*env, &position.synthetic_asset, &position.collateral_asset)?;
            let quote = quote_auction(
                position.collateral_amount,
                position.synthetic_amount,
                ctx.price,
                ctx.min_ratio,
                ctx.target_ratio,
                ctx.market.auction_discount,
            )?;

            if burn_amount > quote.burn {
                msg!("Auction burn {} exceeds cap {}", burn_amount, quote.burn);
                return Err(SyntheticMintError::AmountExceedsAuctionCap.into());
            }

            let released = if burn_amount == quote.burn {
                quote.collateral
            } else {
                mul_div(quote.collateral, burn_amount, quote.burn)?
            };
            let fee = tx.take_fee(&position.collateral_asset, burn_amount, ctx.price, released)?;
            let net = released - fee;

            {
                let live = tx.state.positions.get_mut(position_id)?;
                live.repay_debt(burn_amount)?;
                live.withdraw_collateral(released)?;
            }

            if position.is_short {
                let now = tx.state.now;
                tx.state
                    .rewards
                    .withdraw(ctx.market.short_pool_id, &position.owner, burn_amount, now)?;
                tx.record(ProtocolEvent::Unstaked {
                    pool_id: ctx.market.short_pool_id,
                    user: position.owner,
                    amount: burn_amount,
                });
            }

            env.burn_from(&position.synthetic_asset, liquidator, burn_amount)?;
            if net > 0 {
                env.transfer(&position.collateral_asset, liquidator, net)?;
            }

            if quote.full_liquidation {
                msg!(
                    "Auction shortfall on position {}: {} collateral against {} synthetic",
                    position_id,
                    position.collateral_amount,
                    position.synthetic_amount
                );
                tx.record(ProtocolEvent::AuctionShortfall {
                    position_id,
                    collateral: position.collateral_amount,
                    synthetic: position.synthetic_amount,
                });
            }
            tx.record(ProtocolEvent::AuctionSettled {
                position_id,
                liquidator: *liquidator,
                burned: burn_amount,
                released,
                fee,
            });

            if tx.state.positions.get(position_id)?.is_closed() {
                tx.close_position(env, position_id)?;
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post_ratio(c: u128, a: u128, price: u128, quote: &AuctionQuote) -> u128 {
        collateral_ratio(c - quote.collateral, a - quote.burn, price).unwrap()
    }

    #[test]
    fn test_healthy_position_is_not_liquidatable() {
        let err = quote_auction(2_000 * WAD, 10 * WAD, 100 * WAD, 1_500, 1_800, 800).unwrap_err();
        assert_eq!(err, ProgramError::from(SyntheticMintError::NotLiquidatable));
    }

    #[test]
    fn test_quote_restores_target_ratio() {
        // ratio 1400 with target 1800 and a 20% discount
        let c = 1_400 * WAD;
        let a = 10 * WAD;
        let price = 100 * WAD;
        let quote = quote_auction(c, a, price, 1_500, 1_800, 800).unwrap();

        assert!(!quote.full_liquidation);
        assert!(quote.burn < a);
        let ratio = post_ratio(c, a, price, &quote);
        assert!((1_790..=1_810).contains(&ratio), "ratio {}", ratio);

        // liquidator receives collateral worth burn / discount
        let value_burned = mul_div(quote.burn, price, WAD).unwrap();
        let expected = mul_div(value_burned, 1_000, 800).unwrap();
        assert!(expected.abs_diff(quote.collateral) <= 2);
    }

    #[test]
    fn test_deep_underwater_liquidates_everything() {
        // ratio 1166 cannot be restored to 1800 with a 20% discount
        let c = 1_000 * WAD;
        let a = 11_428_571_428_571_428_571;
        let price = 75 * WAD;
        let quote = quote_auction(c, a, price, 1_500, 1_800, 800).unwrap();
        assert!(quote.full_liquidation);
        assert_eq!(quote.burn, a);
        assert_eq!(quote.collateral, c);
    }

    #[test]
    fn test_discount_too_small_for_target_seizes_nothing() {
        // 1/d >= t: every burn lowers the ratio further
        let quote = quote_auction(1_400 * WAD, 10 * WAD, 100 * WAD, 1_500, 1_800, 500).unwrap();
        assert_eq!(
            quote,
            AuctionQuote {
                burn: 0,
                collateral: 0,
                full_liquidation: false,
            }
        );
    }
}
