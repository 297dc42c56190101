// Synthetic asset issuance core
// Native Solana types - hosted by the sequencer, no program entrypoint

pub mod collaborators;
pub mod constants;
pub mod engine;
pub mod error;
pub mod events;
pub mod instruction;
pub mod math;
pub mod processor;
pub mod rewards;
pub mod state;

pub use collaborators::{Collaborators, LiquidityReceipt, OraclePrice, PriceOracle, SwapVenue, TokenLedger};
pub use engine::Protocol;
pub use error::SyntheticMintError;
pub use processor::Processor;
