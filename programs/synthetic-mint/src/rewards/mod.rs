pub mod accumulator;
pub mod distributor;

pub use accumulator::*;
pub use distributor::*;
