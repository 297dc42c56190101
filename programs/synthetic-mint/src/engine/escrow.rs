use solana_program::{msg, program_error::ProgramError, pubkey::Pubkey};

use crate::{
    collaborators::Collaborators,
    engine::Protocol,
    events::ProtocolEvent,
    state::{LockId, LockRecord},
};

impl Protocol {
    /// Release a matured lock to its beneficiary. Anyone may call this.
    pub fn unlock(&mut self, env: &mut dyn Collaborators, lock_id: LockId) -> Result<u128, ProgramError> {
        self.transact(|tx| {
            let now = tx.state.now;
            let record = tx.state.escrow.release(&lock_id, now)?;
            env.transfer(&record.asset, &record.beneficiary, record.amount)?;

            msg!(
                "Unlocked {} for {} (position {}, seq {})",
                record.amount,
                record.beneficiary,
                lock_id.position_id,
                lock_id.seq
            );
            tx.record(ProtocolEvent::CollateralUnlocked {
                lock_id,
                beneficiary: record.beneficiary,
                amount: record.amount,
            });
            Ok(record.amount)
        })
    }

    pub fn lock(&self, lock_id: &LockId) -> Option<&LockRecord> {
        self.state.escrow.locks.get(lock_id)
    }

    pub fn locks_of(&self, beneficiary: &Pubkey) -> Vec<(LockId, &LockRecord)> {
        self.state.escrow.of_beneficiary(beneficiary)
    }
}
