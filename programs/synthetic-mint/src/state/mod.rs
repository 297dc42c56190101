pub mod config;
pub mod escrow;
pub mod fees;
pub mod market;
pub mod position;

pub use config::*;
pub use escrow::*;
pub use fees::*;
pub use market::*;
pub use position::*;
