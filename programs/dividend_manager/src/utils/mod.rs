pub mod clock;
pub mod ledger;
pub mod token;

pub use clock::*;
pub use ledger::*;
pub use token::*;
