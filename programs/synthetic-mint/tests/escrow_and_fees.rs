mod common;

use common::Fixture;
use solana_program::{program_error::ProgramError, pubkey::Pubkey};
use synthetic_mint::{
    constants::{DEFAULT_LOCK_PERIOD, WAD},
    engine::ShortTerms,
    state::LockId,
    SyntheticMintError,
};

fn open_short(fx: &mut Fixture, owner: &Pubkey) -> u64 {
    fx.fund(owner, 1_000 * WAD);
    fx.protocol
        .open(
            &mut fx.chain,
            owner,
            &fx.synthetic,
            &fx.collateral,
            1_000 * WAD,
            2_500,
            Some(ShortTerms {
                min_out: 0,
                deadline: u64::MAX,
            }),
        )
        .unwrap()
}

#[test]
fn test_unlock_succeeds_exactly_once_after_maturity() {
    let mut fx = Fixture::new(800, 1500, 1800);
    let owner = Pubkey::new_unique();
    let id = open_short(&mut fx, &owner);
    let lock_id = LockId { position_id: id, seq: 0 };
    let locked = fx.protocol.lock(&lock_id).unwrap().amount;

    for now in [1, DEFAULT_LOCK_PERIOD / 2, DEFAULT_LOCK_PERIOD - 1] {
        fx.warp(now);
        let before = fx.protocol.save().unwrap();
        assert_eq!(
            fx.protocol.unlock(&mut fx.chain, lock_id).unwrap_err(),
            ProgramError::from(SyntheticMintError::StillLocked)
        );
        assert_eq!(fx.protocol.save().unwrap(), before);
    }

    fx.warp(DEFAULT_LOCK_PERIOD);
    assert_eq!(fx.protocol.unlock(&mut fx.chain, lock_id).unwrap(), locked);
    assert_eq!(fx.chain.balance(&fx.quote, &owner), locked);
    assert!(fx.protocol.locks_of(&owner).is_empty());

    fx.warp(DEFAULT_LOCK_PERIOD * 2);
    assert_eq!(
        fx.protocol.unlock(&mut fx.chain, lock_id).unwrap_err(),
        ProgramError::from(SyntheticMintError::LockNotFound)
    );
    assert_eq!(fx.chain.balance(&fx.quote, &owner), locked);
}

#[test]
fn test_each_short_burn_queues_its_own_lock() {
    let mut fx = Fixture::new(800, 1500, 1800);
    let owner = Pubkey::new_unique();
    let id = open_short(&mut fx, &owner);
    let synthetic = fx.synthetic;
    fx.chain.credit(&synthetic, &owner, 2 * WAD);

    fx.warp(10);
    fx.protocol.burn(&mut fx.chain, &owner, id, WAD).unwrap();
    fx.warp(20);
    fx.protocol.burn(&mut fx.chain, &owner, id, WAD).unwrap();

    let locks = fx.protocol.locks_of(&owner);
    let seqs: Vec<u64> = locks.iter().map(|(lock_id, _)| lock_id.seq).collect();
    assert_eq!(seqs, vec![0, 1, 2]);
    assert_eq!(locks[1].1.asset, fx.collateral);
    assert_eq!(locks[1].1.available_at, 10 + DEFAULT_LOCK_PERIOD);
    assert_eq!(locks[2].1.available_at, 20 + DEFAULT_LOCK_PERIOD);

    // The first burn's release matures first, independently of the second.
    fx.warp(10 + DEFAULT_LOCK_PERIOD);
    let first = LockId { position_id: id, seq: 1 };
    let second = LockId { position_id: id, seq: 2 };
    let amount = fx.protocol.unlock(&mut fx.chain, first).unwrap();
    assert_eq!(fx.chain.balance(&fx.collateral, &owner), amount);
    assert_eq!(
        fx.protocol.unlock(&mut fx.chain, second).unwrap_err(),
        ProgramError::from(SyntheticMintError::StillLocked)
    );
}

#[test]
fn test_lock_period_change_applies_to_new_locks() {
    let mut fx = Fixture::new(800, 1500, 1800);
    fx.protocol.set_lock_period(&fx.authority, 10).unwrap();
    let owner = Pubkey::new_unique();
    let id = open_short(&mut fx, &owner);

    let lock_id = LockId { position_id: id, seq: 0 };
    assert_eq!(fx.protocol.lock(&lock_id).unwrap().available_at, 10);
    fx.warp(10);
    fx.protocol.unlock(&mut fx.chain, lock_id).unwrap();
}

#[test]
fn test_fee_accrues_and_is_claimed_by_authority() {
    let mut fx = Fixture::new(800, 1500, 1800);
    let owner = Pubkey::new_unique();
    let id = fx.open_long(&owner, 10_000 * WAD, 2_000);
    fx.protocol
        .burn(&mut fx.chain, &owner, id, 100 * WAD)
        .unwrap();
    assert_eq!(fx.protocol.accrued_fee(&fx.collateral), 7 * WAD);

    let collateral = fx.collateral;
    let authority = fx.authority;
    assert_eq!(
        fx.protocol
            .claim_fee(&mut fx.chain, &owner, &collateral, WAD)
            .unwrap_err(),
        ProgramError::from(SyntheticMintError::Unauthorized)
    );
    assert_eq!(
        fx.protocol
            .claim_fee(&mut fx.chain, &authority, &collateral, 8 * WAD)
            .unwrap_err(),
        ProgramError::from(SyntheticMintError::InsufficientFee)
    );
    assert_eq!(
        fx.protocol
            .claim_fee(&mut fx.chain, &authority, &collateral, 0)
            .unwrap_err(),
        ProgramError::from(SyntheticMintError::InvalidAmount)
    );

    fx.protocol
        .claim_fee(&mut fx.chain, &authority, &collateral, 3 * WAD)
        .unwrap();
    let new_fee_to = Pubkey::new_unique();
    fx.protocol.set_fee_to(&authority, new_fee_to).unwrap();
    fx.protocol
        .claim_fee(&mut fx.chain, &authority, &collateral, 4 * WAD)
        .unwrap();

    assert_eq!(fx.chain.balance(&collateral, &fx.fee_to), 3 * WAD);
    assert_eq!(fx.chain.balance(&collateral, &new_fee_to), 4 * WAD);
    assert_eq!(fx.protocol.accrued_fee(&collateral), 0);
}

#[test]
fn test_fee_clamped_to_released_collateral() {
    let mut fx = Fixture::new(800, 1500, 1800);
    let owner = Pubkey::new_unique();
    let id = fx.open_long(&owner, 1_000 * WAD, 2_500);
    fx.protocol.set_fee_rate(&fx.authority, 999).unwrap();
    fx.chain.set_price(&fx.synthetic, 175);

    let before = fx.protocol.position(id).unwrap().collateral_amount;
    fx.protocol.burn(&mut fx.chain, &owner, id, WAD).unwrap();
    let released = before - fx.protocol.position(id).unwrap().collateral_amount;

    assert_eq!(fx.protocol.accrued_fee(&fx.collateral), released);
    assert_eq!(fx.chain.balance(&fx.collateral, &owner), 0);
}

#[test]
fn test_zero_fee_rate_charges_nothing() {
    let mut fx = Fixture::new(800, 1500, 1800);
    fx.protocol.set_fee_rate(&fx.authority, 0).unwrap();
    let owner = Pubkey::new_unique();
    let id = fx.open_long(&owner, 1_000 * WAD, 2_500);
    let minted = fx.protocol.position(id).unwrap().synthetic_amount;

    fx.protocol.burn(&mut fx.chain, &owner, id, minted).unwrap();
    assert_eq!(fx.protocol.accrued_fee(&fx.collateral), 0);
    assert_eq!(fx.chain.balance(&fx.collateral, &owner), 1_000 * WAD);
}
