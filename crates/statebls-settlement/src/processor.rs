//! Settlement processor: the `post` and `correctUpdate` entry points.
//!
//! `post` lets a hub settle a whole cycle of bilateral receipts with one
//! aggregate signature; the ledger derives each receipt's `expiresBy` and
//! `seqNo` itself, so the payload only carries `(bIndex, amount)` pairs.
//! `correctUpdate` lets a counterparty replace a posted record with a
//! strictly higher co-signed amount, moving the difference back and
//! marking the pair slashed.
//!
//! Every call is all-or-nothing: changes are staged in a
//! [`TransactionBuffer`] and committed only after every check passes.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use statebls_bls::{BlsDomain, BlsVerifier, PublicKey};
use statebls_codec::{Call, CorrectionPayload, PostPayload, Update};
use statebls_types::{
    AccountIndex, AccountState, Receipt, Record, RecordKey, Result, SettlementConfig,
    StateBlsError, constants,
};

use crate::clock::{CycleClock, wall_clock_now};
use crate::ledger::ReceiptLedger;
use crate::registry::AccountRegistry;
use crate::staging::TransactionBuffer;
use crate::supply_conservation::SupplyConservation;

/// Result of a committed `post`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostOutcome {
    pub a_index: AccountIndex,
    pub entries: usize,
    /// Sum of all entry amounts credited to the hub.
    pub total_amount: u128,
    /// `expiresBy` stamped on every receipt in this post.
    pub expires_by: u32,
    /// `withdrawAfter` floor applied to every counterparty.
    pub withdraw_unlock: u64,
    /// SHA-256 of the calldata.
    pub payload_hash: [u8; 32],
}

/// Result of a committed `correctUpdate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectionOutcome {
    pub record_key: RecordKey,
    pub a_index: AccountIndex,
    pub b_index: AccountIndex,
    /// Amount moved back from hub to counterparty.
    pub delta: u128,
    /// Additional slash moved from hub to counterparty.
    pub penalty: u128,
    /// The record as stored after the correction.
    pub record: Record,
    /// SHA-256 of the calldata.
    pub payload_hash: [u8; 32],
}

/// Either outcome, as returned by [`SettlementProcessor::submit`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SettlementOutcome {
    Posted(PostOutcome),
    Corrected(CorrectionOutcome),
}

/// Sole writer of account balances and receipt records.
pub struct SettlementProcessor {
    config: SettlementConfig,
    verifier: BlsVerifier,
    clock: CycleClock,
    registry: AccountRegistry,
    ledger: ReceiptLedger,
    supply: SupplyConservation,
}

impl SettlementProcessor {
    /// Create a processor with an empty registry and ledger.
    ///
    /// # Errors
    /// `Configuration` if `config` fails validation.
    pub fn new(config: SettlementConfig) -> Result<Self> {
        config.validate()?;
        let domain = BlsDomain(config.domain());
        tracing::info!(
            domain_tag = %config.domain_tag,
            cycle_secs = config.cycle.cycle_duration_secs,
            buffer_secs = config.cycle.buffer_period_secs,
            "Settlement processor initialised"
        );
        Ok(Self {
            verifier: BlsVerifier::new(domain),
            clock: CycleClock::new(config.cycle),
            config,
            registry: AccountRegistry::new(),
            ledger: ReceiptLedger::new(),
            supply: SupplyConservation::new(),
        })
    }

    // ── Registration and external flows ────────────────────────────────

    /// Register a BLS public key; returns the new account's index.
    pub fn register(&mut self, public_key: PublicKey) -> AccountIndex {
        let index = self.registry.register(public_key);
        tracing::info!(account = %index, "Account registered");
        index
    }

    /// Register a key given in its 128-byte encoding.
    ///
    /// # Errors
    /// `InvalidPoint` if the bytes are not a valid non-identity G2 point.
    pub fn register_bytes(&mut self, public_key: &[u8]) -> Result<AccountIndex> {
        let key = PublicKey::from_bytes(public_key)?;
        Ok(self.register(key))
    }

    /// Deposit external funds into an account.
    ///
    /// # Errors
    /// - `UnknownAccount` if `index` is not registered
    /// - `BalanceOverflow` if the balance would overflow
    /// - `SupplyInvariantViolation` if cumulative deposits would overflow
    pub fn fund(&mut self, index: AccountIndex, amount: u128) -> Result<()> {
        let state = self.registry.get(index)?.state;
        if state.balance.checked_add(amount).is_none() {
            return Err(StateBlsError::BalanceOverflow(index));
        }
        self.supply.record_deposit(amount)?;
        self.registry.credit(index, amount)?;
        tracing::debug!(account = %index, amount, "Account funded");
        Ok(())
    }

    /// Withdraw funds out of the settlement plane.
    ///
    /// # Errors
    /// - `UnknownAccount` if `index` is not registered
    /// - `WithdrawLocked` if `now` is before the account's `withdraw_after`
    /// - `InsufficientBalance` if the balance cannot cover `amount`
    pub fn withdraw(&mut self, index: AccountIndex, amount: u128, now: u64) -> Result<()> {
        self.registry.withdraw(index, amount, now)?;
        self.supply.record_withdrawal(amount)?;
        tracing::debug!(account = %index, amount, "Account withdrew");
        Ok(())
    }

    // ── Entry points ───────────────────────────────────────────────────

    /// Dispatch raw calldata on its selector.
    ///
    /// # Errors
    /// Any error of [`Self::post`] or [`Self::correct_update`], plus
    /// `UnknownSelector`.
    pub fn submit(&mut self, calldata: &[u8], now: u64) -> Result<SettlementOutcome> {
        let call = Call::decode(calldata).inspect_err(|err| {
            tracing::warn!(error = %err, "Rejected calldata");
        })?;
        tracing::debug!(call = call.name(), len = calldata.len(), "Dispatching call");
        let hash = payload_hash(calldata);
        match call {
            Call::Post(payload) => self.apply_post(&payload, hash, now).map(SettlementOutcome::Posted),
            Call::CorrectUpdate(payload) => self
                .apply_correction(&payload.update, hash, now)
                .map(SettlementOutcome::Corrected),
        }
    }

    /// [`Self::submit`] stamped with the system clock.
    ///
    /// # Errors
    /// As [`Self::submit`].
    pub fn submit_now(&mut self, calldata: &[u8]) -> Result<SettlementOutcome> {
        self.submit(calldata, wall_clock_now())
    }

    /// Settle a batch of receipts for one hub.
    ///
    /// # Errors
    /// - `MalformedPayload` on bad encoding or too many entries
    /// - `UnknownAccount` if the hub or any counterparty is unregistered
    /// - `SelfSettlement` if an entry names the hub
    /// - `StaleCorrection` if a pair's sequence space is exhausted
    /// - `InsufficientBalance` if a counterparty cannot cover its entries
    /// - `InvalidSignature` if the aggregate does not verify
    pub fn post(&mut self, calldata: &[u8], now: u64) -> Result<PostOutcome> {
        let payload = PostPayload::decode(calldata).inspect_err(|err| {
            tracing::warn!(error = %err, "Rejected post payload");
        })?;
        self.apply_post(&payload, payload_hash(calldata), now)
    }

    /// Replace a posted record with a higher co-signed amount.
    ///
    /// # Errors
    /// - `MalformedPayload` on bad encoding
    /// - `UnknownAccount` if either party is unregistered
    /// - `InvalidSignature` if either signature does not verify
    /// - `RecordNotFound` if the pair was never posted
    /// - `StaleCorrection` if the correction does not improve on the record
    /// - `AlreadySlashed` if the record was already corrected at this `seqNo`
    /// - `ExpiredReceipt` if the correction window has closed
    /// - `InsufficientBalance` if the hub cannot return the difference
    pub fn correct_update(&mut self, calldata: &[u8], now: u64) -> Result<CorrectionOutcome> {
        let payload = CorrectionPayload::decode(calldata).inspect_err(|err| {
            tracing::warn!(error = %err, "Rejected correctUpdate payload");
        })?;
        self.apply_correction(&payload.update, payload_hash(calldata), now)
    }

    fn apply_post(
        &mut self,
        payload: &PostPayload,
        payload_hash: [u8; 32],
        now: u64,
    ) -> Result<PostOutcome> {
        let a_index = payload.a_index;
        if payload.entries.len() > usize::from(self.config.max_updates_per_post) {
            return Err(StateBlsError::malformed(format!(
                "{} entries exceed the limit of {}",
                payload.entries.len(),
                self.config.max_updates_per_post
            )));
        }
        let hub_key = self.registry.public_key(a_index)?;
        let expires_by = self.clock.current_cycle_expiry(now);
        let unlock = self.clock.withdraw_unlock(now);

        let mut buffer = TransactionBuffer::new(&self.registry, &self.ledger);
        let mut obligations: Vec<([u8; constants::RECEIPT_LEN], PublicKey)> =
            Vec::with_capacity(payload.entries.len() * 2);
        let mut total_amount: u128 = 0;

        for entry in &payload.entries {
            let b_index = entry.b_index;
            if b_index == a_index {
                return Err(StateBlsError::SelfSettlement(a_index));
            }
            let b_key = self.registry.public_key(b_index)?;

            let key = RecordKey::derive(a_index, b_index);
            let prior = buffer.record(&key);
            let seq_no = match prior {
                Some(record) => record.next_seq_no().ok_or_else(|| {
                    StateBlsError::stale(format!("sequence space exhausted for {key}"))
                })?,
                None => 1,
            };

            let receipt = Receipt {
                a_index,
                b_index,
                amount: entry.amount,
                expires_by,
                seq_no,
            };
            let message = receipt.signing_bytes();
            obligations.push((message, hub_key));
            obligations.push((message, b_key));

            buffer.transfer(b_index, a_index, entry.amount)?;
            buffer.lock_withdrawals(b_index, unlock)?;
            buffer.put_record(
                key,
                Record {
                    amount: entry.amount,
                    seq_no,
                    fixed_after: unlock,
                    slashed: false,
                },
            );
            total_amount = total_amount.saturating_add(entry.amount);

            tracing::debug!(
                record = %key,
                counterparty = %b_index,
                amount = entry.amount,
                seq_no,
                "Staged post entry"
            );
        }

        let verified = self.verifier.verify_aggregate(
            &payload.aggregate_signature,
            obligations.iter().map(|(msg, pk)| (msg, pk)),
        );
        if !verified {
            tracing::warn!(hub = %a_index, entries = payload.entries.len(), "Post signature rejected");
            return Err(StateBlsError::InvalidSignature);
        }

        let changes = buffer.finish()?;
        self.registry.apply(changes.accounts);
        self.ledger.apply(changes.records);

        tracing::info!(
            hub = %a_index,
            entries = payload.entries.len(),
            total_amount,
            expires_by,
            payload = %hex::encode(payload_hash),
            "Post settled"
        );

        Ok(PostOutcome {
            a_index,
            entries: payload.entries.len(),
            total_amount,
            expires_by,
            withdraw_unlock: unlock,
            payload_hash,
        })
    }

    fn apply_correction(
        &mut self,
        update: &Update,
        payload_hash: [u8; 32],
        now: u64,
    ) -> Result<CorrectionOutcome> {
        let receipt = update.receipt;
        let (a_index, b_index) = (receipt.a_index, receipt.b_index);
        if a_index == b_index {
            return Err(StateBlsError::SelfSettlement(a_index));
        }
        let a_key = self.registry.public_key(a_index)?;
        let b_key = self.registry.public_key(b_index)?;

        // 1. Each party signed exactly this receipt.
        let message = receipt.signing_bytes();
        let signed = self.verifier.verify(&update.a_signature, &message, &a_key)
            && self.verifier.verify(&update.b_signature, &message, &b_key);
        if !signed {
            tracing::warn!(hub = %a_index, counterparty = %b_index, "Correction signature rejected");
            return Err(StateBlsError::InvalidSignature);
        }

        // 2. It improves on what the hub posted.
        let key = receipt.record_key();
        let record = *self
            .ledger
            .get(&key)
            .ok_or(StateBlsError::RecordNotFound(key))?;
        if receipt.seq_no < record.seq_no {
            return Err(StateBlsError::stale(format!(
                "seqNo {} below recorded {}",
                receipt.seq_no, record.seq_no
            )));
        }
        if record.slashed && receipt.seq_no <= record.seq_no {
            return Err(StateBlsError::AlreadySlashed(key));
        }
        if receipt.amount <= record.amount {
            return Err(StateBlsError::stale(format!(
                "amount {} does not exceed recorded {}",
                receipt.amount, record.amount
            )));
        }

        // 3. The correction window is still open.
        if !self.clock.is_correctable(receipt.expires_by, now) {
            return Err(StateBlsError::ExpiredReceipt {
                expires_by: receipt.expires_by,
                now,
            });
        }

        let delta = receipt.amount - record.amount;
        let unlock = self.clock.withdraw_unlock(now);
        let mut buffer = TransactionBuffer::new(&self.registry, &self.ledger);
        buffer.transfer(b_index, a_index, delta)?;
        let hub_balance = buffer.account(a_index)?.balance;
        let penalty = slash_penalty(delta, self.config.slash_penalty_bps).min(hub_balance);
        if penalty > 0 {
            buffer.transfer(a_index, b_index, penalty)?;
        }
        buffer.lock_withdrawals(b_index, unlock)?;
        let corrected = Record {
            amount: receipt.amount,
            seq_no: receipt.seq_no,
            fixed_after: unlock,
            slashed: true,
        };
        buffer.put_record(key, corrected);

        let changes = buffer.finish()?;
        self.registry.apply(changes.accounts);
        self.ledger.apply(changes.records);

        tracing::warn!(
            record = %key,
            hub = %a_index,
            counterparty = %b_index,
            delta,
            penalty,
            seq_no = receipt.seq_no,
            "Hub record corrected; pair slashed"
        );

        Ok(CorrectionOutcome {
            record_key: key,
            a_index,
            b_index,
            delta,
            penalty,
            record: corrected,
            payload_hash,
        })
    }

    // ── Queries ────────────────────────────────────────────────────────

    /// `accounts[index]`; `None` if unregistered.
    #[must_use]
    pub fn account(&self, index: AccountIndex) -> Option<AccountState> {
        self.registry.state(index)
    }

    /// `records[keccak(a ++ b)]`; `None` if the pair was never posted.
    #[must_use]
    pub fn record(&self, a_index: AccountIndex, b_index: AccountIndex) -> Option<Record> {
        self.ledger.record(a_index, b_index)
    }

    #[must_use]
    pub fn current_cycle_expiry(&self, now: u64) -> u32 {
        self.clock.current_cycle_expiry(now)
    }

    #[must_use]
    pub fn buffer_period(&self) -> u64 {
        self.clock.buffer_period()
    }

    /// Verify that balances sum to deposits minus withdrawals.
    ///
    /// # Errors
    /// `SupplyInvariantViolation` if they do not.
    pub fn verify_supply(&self) -> Result<()> {
        self.supply.verify(self.registry.total_supply())
    }

    #[must_use]
    pub fn config(&self) -> &SettlementConfig {
        &self.config
    }

    #[must_use]
    pub fn verifier(&self) -> &BlsVerifier {
        &self.verifier
    }

    #[must_use]
    pub fn registry(&self) -> &AccountRegistry {
        &self.registry
    }

    #[must_use]
    pub fn ledger(&self) -> &ReceiptLedger {
        &self.ledger
    }
}

fn payload_hash(calldata: &[u8]) -> [u8; 32] {
    Sha256::digest(calldata).into()
}

/// `delta × bps / 10000`, without overflowing for any `u128` delta.
fn slash_penalty(delta: u128, bps: u32) -> u128 {
    let bps = u128::from(bps);
    let denom = u128::from(constants::BPS_DENOMINATOR);
    delta / denom * bps + delta % denom * bps / denom
}

#[cfg(test)]
mod tests {
    use statebls_bls::{SecretKey, Signature, aggregate};

    use super::*;

    const NOW: u64 = 1_000;

    struct Fixture {
        proc: SettlementProcessor,
        domain: BlsDomain,
        hub: (AccountIndex, SecretKey),
        peer: (AccountIndex, SecretKey),
    }

    fn fixture() -> Fixture {
        let mut proc = SettlementProcessor::new(SettlementConfig::default()).unwrap();
        let domain = BlsDomain(proc.config().domain());
        let hub_sk = SecretKey::from_seed(10);
        let peer_sk = SecretKey::from_seed(11);
        let hub = proc.register(hub_sk.public_key());
        let peer = proc.register(peer_sk.public_key());
        proc.fund(peer, 10_000).unwrap();
        Fixture {
            proc,
            domain,
            hub: (hub, hub_sk),
            peer: (peer, peer_sk),
        }
    }

    impl Fixture {
        fn update(&self, amount: u128, seq_no: u16, now: u64) -> Update {
            let receipt = Receipt {
                a_index: self.hub.0,
                b_index: self.peer.0,
                amount,
                expires_by: self.proc.current_cycle_expiry(now),
                seq_no,
            };
            Update::sign(receipt, &self.domain, &self.hub.1, &self.peer.1)
        }

        fn post_bytes(&self, amount: u128, seq_no: u16) -> Vec<u8> {
            PostPayload::from_updates(self.hub.0, &[self.update(amount, seq_no, NOW)])
                .unwrap()
                .encode()
                .unwrap()
        }
    }

    #[test]
    fn post_moves_funds_and_records() {
        let mut f = fixture();
        let bytes = f.post_bytes(400, 1);
        let out = f.proc.post(&bytes, NOW).unwrap();
        assert_eq!(out.total_amount, 400);
        assert_eq!(out.payload_hash, payload_hash(&bytes));
        assert_eq!(f.proc.account(f.hub.0).unwrap().balance, 400);
        assert_eq!(f.proc.account(f.peer.0).unwrap().balance, 9_600);
        let rec = f.proc.record(f.hub.0, f.peer.0).unwrap();
        assert_eq!(rec.seq_no, 1);
        assert!(!rec.slashed);
        f.proc.verify_supply().unwrap();
    }

    #[test]
    fn post_with_wrong_seq_no_fails_signature() {
        let mut f = fixture();
        let bytes = f.post_bytes(400, 2);
        let err = f.proc.post(&bytes, NOW).unwrap_err();
        assert!(matches!(err, StateBlsError::InvalidSignature));
        assert!(f.proc.record(f.hub.0, f.peer.0).is_none());
    }

    #[test]
    fn self_settlement_rejected() {
        let mut f = fixture();
        let receipt = Receipt {
            a_index: f.hub.0,
            b_index: f.hub.0,
            amount: 1,
            expires_by: f.proc.current_cycle_expiry(NOW),
            seq_no: 1,
        };
        let update = Update::sign(receipt, &f.domain, &f.hub.1, &f.hub.1);
        let bytes = PostPayload::from_updates(f.hub.0, &[update])
            .unwrap()
            .encode()
            .unwrap();
        assert!(matches!(
            f.proc.post(&bytes, NOW).unwrap_err(),
            StateBlsError::SelfSettlement(_)
        ));
    }

    #[test]
    fn correction_applies_penalty() {
        let config = SettlementConfig {
            slash_penalty_bps: 5_000,
            ..SettlementConfig::default()
        };
        let mut f = fixture();
        f.proc = SettlementProcessor::new(config).unwrap();
        f.proc.register(f.hub.1.public_key());
        f.proc.register(f.peer.1.public_key());
        f.proc.fund(f.peer.0, 10_000).unwrap();

        f.proc.post(&f.post_bytes(400, 1), NOW).unwrap();
        let fix = CorrectionPayload::new(f.update(600, 1, NOW)).encode();
        let out = f.proc.correct_update(&fix, NOW + 5).unwrap();
        assert_eq!(out.delta, 200);
        assert_eq!(out.penalty, 100);
        // Hub: 400 + 200 - 100. Peer: 9600 - 200 + 100.
        assert_eq!(f.proc.account(f.hub.0).unwrap().balance, 500);
        assert_eq!(f.proc.account(f.peer.0).unwrap().balance, 9_500);
        f.proc.verify_supply().unwrap();
    }

    #[test]
    fn penalty_is_capped_at_hub_balance() {
        assert_eq!(slash_penalty(1_000, 10_000), 1_000);
        assert_eq!(slash_penalty(u128::MAX, 10_000), u128::MAX);
        assert_eq!(slash_penalty(3, 5_000), 1);
        assert_eq!(slash_penalty(1_000, 0), 0);
    }

    #[test]
    fn correction_checks_each_signature_alone() {
        let mut f = fixture();
        f.proc.post(&f.post_bytes(400, 1), NOW).unwrap();

        // Shift value between the halves; their sum still verifies.
        let honest = f.update(600, 1, NOW);
        let shift = SecretKey::from_seed(99).sign(&f.domain, b"shift");
        let split = Update {
            a_signature: aggregate(&[honest.a_signature, shift]),
            b_signature: aggregate(&[honest.b_signature, Signature(-shift.0)]),
            ..honest
        };
        assert_eq!(
            aggregate(&[split.a_signature, split.b_signature]),
            aggregate(&[honest.a_signature, honest.b_signature])
        );

        let fix = CorrectionPayload::new(split).encode();
        assert!(matches!(
            f.proc.correct_update(&fix, NOW).unwrap_err(),
            StateBlsError::InvalidSignature
        ));
        assert!(!f.proc.record(f.hub.0, f.peer.0).unwrap().slashed);
    }

    #[test]
    fn post_after_correction_clears_slashed() {
        let mut f = fixture();
        f.proc.post(&f.post_bytes(400, 1), NOW).unwrap();
        let fix = CorrectionPayload::new(f.update(600, 1, NOW)).encode();
        f.proc.correct_update(&fix, NOW).unwrap();
        assert!(f.proc.record(f.hub.0, f.peer.0).unwrap().slashed);

        f.proc.post(&f.post_bytes(100, 2), NOW).unwrap();
        let rec = f.proc.record(f.hub.0, f.peer.0).unwrap();
        assert_eq!((rec.seq_no, rec.amount, rec.slashed), (2, 100, false));
    }

    #[test]
    fn submit_now_uses_wall_clock() {
        let mut f = fixture();
        let now = wall_clock_now();
        let bytes = PostPayload::from_updates(f.hub.0, &[f.update(400, 1, now)])
            .unwrap()
            .encode()
            .unwrap();
        let SettlementOutcome::Posted(out) = f.proc.submit_now(&bytes).unwrap() else {
            panic!("expected a post outcome");
        };
        assert_eq!(out.expires_by, f.proc.current_cycle_expiry(now));
    }

    #[test]
    fn correction_without_record_fails() {
        let mut f = fixture();
        let fix = CorrectionPayload::new(f.update(600, 1, NOW)).encode();
        assert!(matches!(
            f.proc.correct_update(&fix, NOW).unwrap_err(),
            StateBlsError::RecordNotFound(_)
        ));
    }

    #[test]
    fn submit_dispatches_on_selector() {
        let mut f = fixture();
        let post = f.post_bytes(400, 1);
        assert!(matches!(
            f.proc.submit(&post, NOW).unwrap(),
            SettlementOutcome::Posted(_)
        ));
        let fix = CorrectionPayload::new(f.update(450, 1, NOW)).encode();
        assert!(matches!(
            f.proc.submit(&fix, NOW).unwrap(),
            SettlementOutcome::Corrected(_)
        ));
        assert!(matches!(
            f.proc.submit(&[1, 2, 3, 4], NOW).unwrap_err(),
            StateBlsError::UnknownSelector { .. }
        ));
    }

    #[test]
    fn fund_unknown_account_fails() {
        let mut f = fixture();
        assert!(matches!(
            f.proc.fund(AccountIndex(77), 1).unwrap_err(),
            StateBlsError::UnknownAccount(_)
        ));
        f.proc.verify_supply().unwrap();
    }

    #[test]
    fn invalid_config_rejected() {
        let config = SettlementConfig {
            slash_penalty_bps: 10_001,
            ..SettlementConfig::default()
        };
        assert!(matches!(
            SettlementProcessor::new(config),
            Err(StateBlsError::Configuration(_))
        ));
    }
}
