//! Data model for a bill run: configuration inputs, per-provider results and
//! the aggregated household summary.

pub mod summary;
pub mod types;

pub use summary::aggregate;
pub use types::{
    AggregateSummary, BillResult, HouseholdSize, ProviderConfig, RunConfig, StaticBill, MAX_AMOUNT,
};
