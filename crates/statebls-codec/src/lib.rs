//! # statebls-codec
//!
//! Bit-exact encoding of the two settlement calls. Every integer is
//! big-endian and densely packed: calldata bytes drive fee cost.
//!
//! ```text
//! post:
//!   [4  selector][8 aIndex][2 updateCount][64 aggSig]
//!   updateCount × [8 bIndex][16 amount]
//!
//! correctUpdate:
//!   [4  selector][38 receipt][64 aSignature][64 bSignature]
//! ```
//!
//! `post` carries neither `expiresBy` nor `seqNo`; the ledger derives both.

pub mod call;
pub mod correction;
pub mod post;
pub mod selector;
pub mod update;

mod reader;

pub use call::Call;
pub use correction::CorrectionPayload;
pub use post::{PostEntry, PostPayload};
pub use selector::{CORRECT_UPDATE_SIGNATURE, POST_SIGNATURE, Selector};
pub use update::Update;
