//! # statebls-types
//!
//! Shared types, errors, and configuration for **StateBLS** settlement.
//!
//! This crate is the leaf dependency of the workspace: every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`AccountIndex`], [`RecordKey`]
//! - **Receipt model**: [`Receipt`] and its packed signing bytes
//! - **Ledger state**: [`Record`], [`AccountState`]
//! - **Cycle model**: [`CycleConfig`]
//! - **Configuration**: [`SettlementConfig`]
//! - **Errors**: [`StateBlsError`] with `SB_ERR_` prefix codes
//! - **Constants**: wire sizes and defaults

pub mod account;
pub mod config;
pub mod constants;
pub mod cycle;
pub mod error;
pub mod ids;
pub mod receipt;
pub mod record;

pub use account::*;
pub use config::*;
pub use cycle::*;
pub use error::*;
pub use ids::*;
pub use receipt::*;
pub use record::*;

// Constants are accessed via `statebls_types::constants::FOO`
// (not re-exported to avoid name collisions).
