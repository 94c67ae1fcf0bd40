pub mod contract;
pub mod delegation;
pub mod note;
pub mod transaction;

pub use contract::*;
pub use delegation::*;
pub use note::*;
pub use transaction::*;
