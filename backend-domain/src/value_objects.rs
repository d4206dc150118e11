// Domain value objects
pub mod window_key;

pub use window_key::*;
