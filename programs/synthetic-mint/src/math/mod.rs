pub mod fixed_point;
pub mod u256;

pub use fixed_point::*;
pub use u256::U256;
