//! System-wide constants for StateBLS settlement.

/// Default length of one settlement cycle in seconds (one week).
pub const DEFAULT_CYCLE_DURATION_SECS: u64 = 7 * 24 * 60 * 60;

/// Default delay between a settlement touch and withdrawal unlock (one day).
pub const DEFAULT_BUFFER_PERIOD_SECS: u64 = 24 * 60 * 60;

/// Default domain tag hashed into the BLS domain-separation tag.
pub const DEFAULT_DOMAIN_TAG: &str = "statebls:v1";

/// Default upper bound on entries in one `post` payload.
pub const DEFAULT_MAX_UPDATES_PER_POST: u16 = u16::MAX;

/// Basis points denominator (10 000 bps = 100%).
pub const BPS_DENOMINATOR: u32 = 10_000;

/// Separator between the two indices when deriving a record key.
pub const RECORD_KEY_SEPARATOR: &[u8] = b"++";

/// Function selector width in bytes.
pub const SELECTOR_LEN: usize = 4;

/// Packed receipt width: `u64 ‖ u64 ‖ u128 ‖ u32 ‖ u16`.
pub const RECEIPT_LEN: usize = 8 + 8 + 16 + 4 + 2;

/// Encoded G1 point width (`x ‖ y`).
pub const G1_LEN: usize = 64;

/// Encoded G2 point width (`x.c1 ‖ x.c0 ‖ y.c1 ‖ y.c0`).
pub const G2_LEN: usize = 128;

/// Width of one `(bIndex, amount)` entry in a `post` payload.
pub const POST_ENTRY_LEN: usize = 8 + 16;

/// Fixed `post` header: selector, `aIndex`, `updateCount`, aggregate signature.
pub const POST_HEADER_LEN: usize = SELECTOR_LEN + 8 + 2 + G1_LEN;

/// Exact `correctUpdate` payload width.
pub const CORRECTION_LEN: usize = SELECTOR_LEN + RECEIPT_LEN + 2 * G1_LEN;
