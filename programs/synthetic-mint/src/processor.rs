use solana_program::{entrypoint::ProgramResult, msg, pubkey::Pubkey};

use crate::{collaborators::Collaborators, engine::Protocol, instruction::SyntheticMintInstruction};

pub struct Processor;

impl Processor {
    /// Decode one instruction from `caller` and apply it to `protocol`
    pub fn process(
        protocol: &mut Protocol,
        env: &mut dyn Collaborators,
        caller: &Pubkey,
        instruction_data: &[u8],
    ) -> ProgramResult {
        let instruction = SyntheticMintInstruction::unpack(instruction_data)?;

        match instruction {
            SyntheticMintInstruction::OpenPosition {
                synthetic_asset,
                collateral_asset,
                collateral_amount,
                ratio,
                short,
            } => {
                msg!("Instruction: OpenPosition");
                protocol
                    .open(env, caller, &synthetic_asset, &collateral_asset, collateral_amount, ratio, short)
                    .map(|_| ())
            }
            SyntheticMintInstruction::Deposit { position_id, amount } => {
                msg!("Instruction: Deposit");
                protocol.deposit(env, caller, position_id, amount)
            }
            SyntheticMintInstruction::Withdraw { position_id, amount } => {
                msg!("Instruction: Withdraw");
                protocol.withdraw(env, caller, position_id, amount)
            }
            SyntheticMintInstruction::Mint {
                position_id,
                amount,
                min_out,
                deadline,
            } => {
                msg!("Instruction: Mint");
                protocol.mint(env, caller, position_id, amount, min_out, deadline)
            }
            SyntheticMintInstruction::Burn { position_id, amount } => {
                msg!("Instruction: Burn");
                protocol.burn(env, caller, position_id, amount)
            }
            SyntheticMintInstruction::Auction {
                position_id,
                burn_amount,
            } => {
                msg!("Instruction: Auction");
                protocol.auction(env, caller, position_id, burn_amount)
            }
            SyntheticMintInstruction::ClaimFee {
                collateral_asset,
                amount,
            } => {
                msg!("Instruction: ClaimFee");
                protocol.claim_fee(env, caller, &collateral_asset, amount)
            }
            SyntheticMintInstruction::Unlock { lock_id } => {
                msg!("Instruction: Unlock");
                protocol.unlock(env, lock_id).map(|_| ())
            }
            SyntheticMintInstruction::DepositLp { pool_id, amount } => {
                msg!("Instruction: DepositLp");
                protocol.deposit_lp(env, caller, pool_id, amount)
            }
            SyntheticMintInstruction::WithdrawLp { pool_id, amount } => {
                msg!("Instruction: WithdrawLp");
                protocol.withdraw_lp(env, caller, pool_id, amount)
            }
            SyntheticMintInstruction::DepositPair {
                pool_id,
                amount_synthetic,
                amount_quote,
                min_synthetic,
                min_quote,
                deadline,
            } => {
                msg!("Instruction: DepositPair");
                protocol
                    .deposit_pair(
                        env,
                        caller,
                        pool_id,
                        amount_synthetic,
                        amount_quote,
                        min_synthetic,
                        min_quote,
                        deadline,
                    )
                    .map(|_| ())
            }
            SyntheticMintInstruction::WithdrawPair {
                pool_id,
                liquidity,
                min_synthetic,
                min_quote,
                deadline,
            } => {
                msg!("Instruction: WithdrawPair");
                protocol
                    .withdraw_pair(env, caller, pool_id, liquidity, min_synthetic, min_quote, deadline)
                    .map(|_| ())
            }
            SyntheticMintInstruction::GetReward { pool_id } => {
                msg!("Instruction: GetReward");
                protocol.get_reward(env, caller, pool_id).map(|_| ())
            }
            SyntheticMintInstruction::UpdatePool { pool_id } => {
                msg!("Instruction: UpdatePool");
                protocol.update_pool(pool_id)
            }
            SyntheticMintInstruction::RegisterCollateral {
                asset,
                oracle,
                multiplier,
            } => {
                msg!("Instruction: RegisterCollateral");
                protocol.register_collateral(caller, asset, oracle, multiplier)
            }
            SyntheticMintInstruction::SetCollateralMultiplier { asset, multiplier } => {
                msg!("Instruction: SetCollateralMultiplier");
                protocol.set_collateral_multiplier(caller, &asset, multiplier)
            }
            SyntheticMintInstruction::RegisterMarket { params } => {
                msg!("Instruction: RegisterMarket");
                protocol.register_market(caller, params).map(|_| ())
            }
            SyntheticMintInstruction::UpdateMarketParams {
                synthetic_asset,
                auction_discount,
                min_cratio,
                target_ratio,
            } => {
                msg!("Instruction: UpdateMarketParams");
                protocol.update_market_params(caller, &synthetic_asset, auction_discount, min_cratio, target_ratio)
            }
            SyntheticMintInstruction::TriggerIpo { synthetic_asset } => {
                msg!("Instruction: TriggerIpo");
                protocol.trigger_ipo(caller, &synthetic_asset)
            }
            SyntheticMintInstruction::SetFeeRate { fee_rate } => {
                msg!("Instruction: SetFeeRate");
                protocol.set_fee_rate(caller, fee_rate)
            }
            SyntheticMintInstruction::SetFeeTo { fee_to } => {
                msg!("Instruction: SetFeeTo");
                protocol.set_fee_to(caller, fee_to)
            }
            SyntheticMintInstruction::SetOracleMaxDelay { oracle_max_delay } => {
                msg!("Instruction: SetOracleMaxDelay");
                protocol.set_oracle_max_delay(caller, oracle_max_delay)
            }
            SyntheticMintInstruction::SetLockPeriod { lock_period } => {
                msg!("Instruction: SetLockPeriod");
                protocol.set_lock_period(caller, lock_period)
            }
            SyntheticMintInstruction::SetMarketAlloc {
                synthetic_asset,
                points,
            } => {
                msg!("Instruction: SetMarketAlloc");
                protocol.set_market_alloc(caller, &synthetic_asset, points)
            }
            SyntheticMintInstruction::SetPoolAlloc { pool_id, points } => {
                msg!("Instruction: SetPoolAlloc");
                protocol.set_pool_alloc(caller, pool_id, points)
            }
            SyntheticMintInstruction::TransferAuthority { authority } => {
                msg!("Instruction: TransferAuthority");
                protocol.transfer_authority(caller, authority)
            }
        }
    }
}
