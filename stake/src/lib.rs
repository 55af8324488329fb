//! Stake and reputation ledgers.
//!
//! The validation engine never owns balances. It reads validator-role stake
//! for weighted selection, slashes minority voters at finalization, and
//! credits reputation to majority voters, all through the narrow traits
//! defined here. The in-memory ledgers back tests and single-process
//! deployments.

pub mod error;
pub mod ledger;
pub mod reputation;

pub use error::StakeError;
pub use ledger::{MemoryStakeLedger, StakeLedger};
pub use reputation::{MemoryReputationLedger, ReputationLedger};
