pub mod hash;
pub mod keys;

pub use hash::*;
pub use keys::*;
