//! # statebls-settlement
//!
//! **Settlement plane**: account registry, cycle clock, receipt ledger and
//! the two state-transition entry points.
//!
//! ## Flow
//!
//! A hub and each counterparty co-sign one [`Receipt`](statebls_types::Receipt)
//! per cycle off-ledger. At cycle end the hub submits `post`:
//! 1. Derives `expiresBy` from the clock and `seqNo` from the ledger
//! 2. Rebuilds every receipt and checks one aggregate BLS signature
//! 3. Moves each amount from counterparty to hub and locks the
//!    counterparty's withdrawals for one buffer period
//! 4. Stores the new records and checks supply conservation
//!
//! A counterparty holding a higher co-signed receipt calls `correctUpdate`
//! to claw back the difference; the pair is marked slashed.

pub mod clock;
pub mod ledger;
pub mod processor;
pub mod registry;
pub mod supply_conservation;

mod staging;

pub use clock::{CycleClock, wall_clock_now};
pub use ledger::ReceiptLedger;
pub use processor::{CorrectionOutcome, PostOutcome, SettlementOutcome, SettlementProcessor};
pub use registry::{Account, AccountRegistry};
pub use supply_conservation::SupplyConservation;
