pub mod checkpoint_state;
pub mod claim_state;
pub mod dividend_ledger;
pub mod dividend_state;
pub mod exclusion_state;
pub mod settings_state;
pub mod withholding_state;

pub use checkpoint_state::*;
pub use claim_state::*;
pub use dividend_ledger::*;
pub use dividend_state::*;
pub use exclusion_state::*;
pub use settings_state::*;
pub use withholding_state::*;
