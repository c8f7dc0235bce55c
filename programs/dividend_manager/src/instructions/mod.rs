pub mod attach_module;
pub mod calculate_dividend;
pub mod create_checkpoint;
pub mod create_dividend;
pub mod push_dividend_payment;
pub mod reclaim_dividend;
pub mod set_default_exclusions;
pub mod set_withholding;
pub mod withdraw_withholding;

pub use attach_module::*;
pub use calculate_dividend::*;
pub use create_checkpoint::*;
pub use create_dividend::*;
pub use push_dividend_payment::*;
pub use reclaim_dividend::*;
pub use set_default_exclusions::*;
pub use set_withholding::*;
pub use withdraw_withholding::*;
