mod common;

use common::{market_params, Fixture};
use solana_program::{program_error::ProgramError, pubkey::Pubkey};
use synthetic_mint::{
    constants::WAD,
    instruction::SyntheticMintInstruction,
    Processor, SyntheticMintError,
};

fn process(fx: &mut Fixture, caller: &Pubkey, instruction: SyntheticMintInstruction) -> Result<(), ProgramError> {
    let data = instruction.pack().unwrap();
    Processor::process(&mut fx.protocol, &mut fx.chain, caller, &data)
}

#[test]
fn test_open_and_burn_through_processor() {
    let mut fx = Fixture::new(800, 1500, 1800);
    let owner = Pubkey::new_unique();
    fx.fund(&owner, 1_000 * WAD);

    let open = SyntheticMintInstruction::OpenPosition {
        synthetic_asset: fx.synthetic,
        collateral_asset: fx.collateral,
        collateral_amount: 1_000 * WAD,
        ratio: 2_500,
        short: None,
    };
    process(&mut fx, &owner, open).unwrap();

    let position = fx.protocol.positions_of(&owner, 0, 1)[0].clone();
    assert_eq!(position.synthetic_amount, 11_428_571_428_571_428_571);

    let burn = SyntheticMintInstruction::Burn {
        position_id: position.id,
        amount: position.synthetic_amount,
    };
    process(&mut fx, &owner, burn).unwrap();
    assert!(fx.protocol.positions_of(&owner, 0, 1).is_empty());
}

#[test]
fn test_garbage_instruction_rejected() {
    let mut fx = Fixture::new(800, 1500, 1800);
    let caller = Pubkey::new_unique();
    let before = fx.protocol.save().unwrap();

    assert_eq!(
        Processor::process(&mut fx.protocol, &mut fx.chain, &caller, &[]).unwrap_err(),
        ProgramError::InvalidInstructionData
    );
    assert_eq!(
        Processor::process(&mut fx.protocol, &mut fx.chain, &caller, &[200, 0, 0]).unwrap_err(),
        ProgramError::InvalidInstructionData
    );
    assert_eq!(fx.protocol.save().unwrap(), before);
}

#[test]
fn test_admin_instructions_require_authority() {
    let mut fx = Fixture::new(800, 1500, 1800);
    let stranger = Pubkey::new_unique();
    let authority = fx.authority;

    assert_eq!(
        process(&mut fx, &stranger, SyntheticMintInstruction::SetFeeRate { fee_rate: 5 }).unwrap_err(),
        ProgramError::from(SyntheticMintError::Unauthorized)
    );

    let asset = Pubkey::new_unique();
    let listing = SyntheticMintInstruction::RegisterMarket {
        params: market_params(asset, Pubkey::new_unique(), Pubkey::new_unique(), 900, 1300, 1600),
    };
    process(&mut fx, &authority, listing).unwrap();
    let market = fx.protocol.state().market(&asset).unwrap();
    assert_eq!((market.short_pool_id, market.long_pool_id), (3, 4));

    process(
        &mut fx,
        &authority,
        SyntheticMintInstruction::UpdateMarketParams {
            synthetic_asset: asset,
            auction_discount: 850,
            min_cratio: 1400,
            target_ratio: 1700,
        },
    )
    .unwrap();
    assert_eq!(fx.protocol.state().market(&asset).unwrap().min_cratio, 1400);

    assert_eq!(
        process(
            &mut fx,
            &authority,
            SyntheticMintInstruction::UpdateMarketParams {
                synthetic_asset: asset,
                auction_discount: 1000,
                min_cratio: 1400,
                target_ratio: 1700,
            },
        )
        .unwrap_err(),
        ProgramError::from(SyntheticMintError::InvalidRatioParameters)
    );
}

#[test]
fn test_authority_transfer_covers_every_admin_entry() {
    let mut fx = Fixture::new(800, 1500, 1800);
    let old = fx.authority;
    let new = Pubkey::new_unique();

    process(&mut fx, &old, SyntheticMintInstruction::TransferAuthority { authority: new }).unwrap();
    assert_eq!(fx.protocol.state().config.authority, new);

    let pool = fx.long_pool;
    assert_eq!(
        process(&mut fx, &old, SyntheticMintInstruction::SetPoolAlloc { pool_id: pool, points: 9 }).unwrap_err(),
        ProgramError::from(SyntheticMintError::Unauthorized)
    );
    assert_eq!(
        process(
            &mut fx,
            &old,
            SyntheticMintInstruction::RegisterCollateral {
                asset: Pubkey::new_unique(),
                oracle: None,
                multiplier: 1000,
            },
        )
        .unwrap_err(),
        ProgramError::from(SyntheticMintError::Unauthorized)
    );

    process(&mut fx, &new, SyntheticMintInstruction::SetPoolAlloc { pool_id: pool, points: 9 }).unwrap();
    process(&mut fx, &new, SyntheticMintInstruction::SetOracleMaxDelay { oracle_max_delay: 60 }).unwrap();
    assert_eq!(fx.protocol.state().config.oracle_max_delay, 60);
}

#[test]
fn test_events_journaled_only_for_committed_actions() {
    let mut fx = Fixture::new(800, 1500, 1800);
    let owner = Pubkey::new_unique();
    fx.protocol.drain_events();

    let open = SyntheticMintInstruction::OpenPosition {
        synthetic_asset: fx.synthetic,
        collateral_asset: fx.collateral,
        collateral_amount: 1_000 * WAD,
        ratio: 2_500,
        short: None,
    };
    // Unfunded owner: the collateral pull fails and nothing is journaled.
    assert_eq!(
        process(&mut fx, &owner, open.clone()).unwrap_err(),
        ProgramError::InsufficientFunds
    );
    assert!(fx.protocol.events().is_empty());

    fx.fund(&owner, 1_000 * WAD);
    process(&mut fx, &owner, open).unwrap();
    let kinds: Vec<&str> = fx.protocol.events().iter().map(|event| event.kind()).collect();
    assert_eq!(kinds, vec!["PositionOpened"]);
}
