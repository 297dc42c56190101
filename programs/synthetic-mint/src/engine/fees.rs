use solana_program::{program_error::ProgramError, pubkey::Pubkey};

use crate::{
    collaborators::Collaborators,
    engine::Protocol,
    error::SyntheticMintError,
    events::ProtocolEvent,
};

impl Protocol {
    /// Pay `amount` of accrued fees in `collateral_asset` to the fee recipient
    pub fn claim_fee(
        &mut self,
        env: &mut dyn Collaborators,
        caller: &Pubkey,
        collateral_asset: &Pubkey,
        amount: u128,
    ) -> Result<(), ProgramError> {
        self.transact(|tx| {
            tx.state.config.require_authority(caller)?;
            if amount == 0 {
                return Err(SyntheticMintError::InvalidAmount.into());
            }
            tx.state.fees.debit(collateral_asset, amount)?;

            let to = tx.state.config.fee_to;
            env.transfer(collateral_asset, &to, amount)?;
            tx.record(ProtocolEvent::FeeClaimed {
                collateral_asset: *collateral_asset,
                amount,
                to,
            });
            Ok(())
        })
    }

    pub fn accrued_fee(&self, collateral_asset: &Pubkey) -> u128 {
        self.state.fees.accrued_for(collateral_asset)
    }
}
