mod convolution;
mod engine;
mod error;
mod ledger;
mod pool;
mod splitter;
mod sweep;
mod types;

pub use convolution::{ClosedFormMonth, closed_form_schedule};
pub use engine::{SimulationEngine, run_simulation, run_simulation_with_cancel};
pub use error::SimError;
pub use ledger::{Ledger, roi_pct};
pub use pool::{Contract, ContractId, ContractPool, ContractState, PoolStep};
pub use splitter::{CashSplit, split_cash};
pub use sweep::{PolicyComparison, PolicyVariant, compare_policies, run_batch};
pub use types::{
    ActivationDelay, ActivationOrder, CapitalPolicy, Inputs, LedgerRow, LedgerSummary, RateSpec,
    RunConfig,
};
