//! The court: stake custody, dispute lifecycle and settlement.

use crate::error::CourtError;
use crate::redistribution::{compute_redistribution, Redistribution};
use crate::sampler::WeightedSampler;
use crate::state::{Dispute, DisputePhase, DisputeSummary, JurorVote};
use crate::voting::SealedVoting;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, info, warn};
use tribunal_crypto::VoteNonce;
use tribunal_random::RandomSource;
use tribunal_stake::{LockBatch, StakeLedger, StakeRecord, StakeToken, StakeView};
use tribunal_store::{CourtStore, StoreError};
use tribunal_types::{
    Address, CommitmentHash, CourtParams, DisputeId, Ruling, StakeAmount, Timestamp,
};

const META_PARAMS: &[u8] = b"params";
const META_NEXT_DISPUTE_ID: &[u8] = b"next_dispute_id";
const META_ROSTER: &[u8] = b"roster";

/// Events emitted by the court for the embedding service to process.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CourtEvent {
    Deposited {
        participant: Address,
        amount: StakeAmount,
        total: StakeAmount,
    },
    Withdrawn {
        participant: Address,
        amount: StakeAmount,
        total: StakeAmount,
    },
    DisputeCreated {
        dispute: DisputeId,
        evidence: String,
    },
    /// Every slot filled; `jurors` pairs each unique juror with its slot count.
    JurorsDrawn {
        dispute: DisputeId,
        jurors: Vec<(Address, u32)>,
        commit_deadline: Timestamp,
        reveal_deadline: Timestamp,
    },
    VoteCommitted {
        dispute: DisputeId,
        juror: Address,
    },
    VoteRevealed {
        dispute: DisputeId,
        juror: Address,
        ruling: Ruling,
        weight: u32,
    },
    DisputeResolved {
        dispute: DisputeId,
        ruling: Ruling,
        redistribution: Redistribution,
    },
}

/// Every public operation is all-or-nothing: all checks and fallible
/// computations run before the first mutation.
pub struct Court {
    params: CourtParams,
    ledger: StakeLedger,
    disputes: BTreeMap<DisputeId, Dispute>,
    next_dispute_id: DisputeId,
    token: Arc<dyn StakeToken>,
    random: Arc<dyn RandomSource>,
    sampler: WeightedSampler,
    voting: SealedVoting,
    /// Pending events for the embedding service to process.
    pending_events: Vec<CourtEvent>,
}

impl Court {
    /// Create an empty court. Invalid parameters are rejected here and never
    /// at draw time.
    pub fn new(
        params: CourtParams,
        token: Arc<dyn StakeToken>,
        random: Arc<dyn RandomSource>,
    ) -> Result<Self, CourtError> {
        Self::assemble(
            params,
            StakeLedger::new(),
            BTreeMap::new(),
            DisputeId::FIRST,
            token,
            random,
        )
    }

    fn assemble(
        params: CourtParams,
        ledger: StakeLedger,
        disputes: BTreeMap<DisputeId, Dispute>,
        next_dispute_id: DisputeId,
        token: Arc<dyn StakeToken>,
        random: Arc<dyn RandomSource>,
    ) -> Result<Self, CourtError> {
        params.validate()?;
        if let Some((last, _)) = disputes.last_key_value() {
            if *last >= next_dispute_id {
                return Err(CourtError::Store(StoreError::Corruption(format!(
                    "dispute {last} is not below the next id {next_dispute_id}"
                ))));
            }
        }
        info!(
            slots = params.selection_slots,
            stake_per_slot = %params.min_stake_per_slot,
            stake_per_dispute = ?params.stake_per_dispute(),
            random = random.name(),
            "court ready"
        );
        Ok(Self {
            sampler: WeightedSampler::new(&params),
            voting: SealedVoting,
            params,
            ledger,
            disputes,
            next_dispute_id,
            token,
            random,
            pending_events: Vec::new(),
        })
    }

    // ── Stake ────────────────────────────────────────────────────────────

    /// Deposit collateral, pulling it from the stake token. Returns the new
    /// total. If the token transfer fails nothing is recorded.
    pub fn deposit(
        &mut self,
        participant: &Address,
        amount: StakeAmount,
    ) -> Result<StakeAmount, CourtError> {
        if !participant.is_valid() {
            return Err(CourtError::InvalidParticipant(participant.to_string()));
        }
        self.ledger
            .validate_deposit(participant, amount, self.params.min_stake)?;
        self.token.pull(participant, amount)?;
        let total = self
            .ledger
            .deposit(participant, amount, self.params.min_stake)?;

        debug!(participant = %participant, %amount, %total, "stake deposited");
        self.pending_events.push(CourtEvent::Deposited {
            participant: participant.clone(),
            amount,
            total,
        });
        Ok(total)
    }

    /// Withdraw unlocked collateral back through the stake token. Returns the
    /// new total.
    pub fn withdraw(
        &mut self,
        participant: &Address,
        amount: StakeAmount,
    ) -> Result<StakeAmount, CourtError> {
        self.ledger.validate_withdraw(participant, amount)?;
        self.token.push(participant, amount)?;
        let total = self.ledger.withdraw(participant, amount)?;

        debug!(participant = %participant, %amount, %total, "stake withdrawn");
        self.pending_events.push(CourtEvent::Withdrawn {
            participant: participant.clone(),
            amount,
            total,
        });
        Ok(total)
    }

    // ── Dispute lifecycle ────────────────────────────────────────────────

    /// Open a dispute over `evidence`. The pool must hold at least one slot's
    /// worth of available stake.
    pub fn create_dispute(
        &mut self,
        evidence: impl Into<String>,
        now: Timestamp,
    ) -> Result<DisputeId, CourtError> {
        let available = self.ledger.available_stake_sum();
        if available < self.params.min_stake_per_slot {
            return Err(CourtError::InsufficientPoolStake {
                available,
                needed: self.params.min_stake_per_slot,
            });
        }
        let id = self.next_dispute_id;
        let next = id.next().ok_or(CourtError::Overflow)?;
        let evidence = evidence.into();

        self.disputes
            .insert(id, Dispute::new(id, evidence.clone(), now));
        self.next_dispute_id = next;

        info!(dispute = id.get(), "dispute created");
        self.pending_events
            .push(CourtEvent::DisputeCreated { dispute: id, evidence });
        Ok(id)
    }

    /// Fill every selection slot with a stake-weighted draw and lock the
    /// jurors' stake. Returns the unique jurors in draw order.
    ///
    /// The draws run against a [`LockBatch`]; the ledger sees the locks only
    /// once every slot is filled, so a failed draw changes nothing.
    pub fn draw_jurors(
        &mut self,
        id: DisputeId,
        now: Timestamp,
    ) -> Result<Vec<Address>, CourtError> {
        let phase = self.phase_of(id);
        if phase != DisputePhase::Created {
            return Err(CourtError::WrongPhase {
                dispute: id,
                actual: phase,
                expected: "Created",
            });
        }

        let mut batch = LockBatch::new(&self.ledger);
        let mut unique: Vec<usize> = Vec::new();
        let mut counts: HashMap<usize, u32> = HashMap::new();
        for slot in 0..self.params.selection_slots {
            let index = self
                .sampler
                .draw_slot(&mut batch, self.random.as_ref(), id, slot)
                .inspect_err(|e| warn!(dispute = id.get(), slot, error = %e, "juror draw failed"))?;
            let count = counts.entry(index).or_insert(0);
            if *count == 0 {
                unique.push(index);
            }
            *count += 1;
        }
        let locks = batch.finish();

        let roster = self.ledger.participants();
        let mut jurors = Vec::with_capacity(unique.len());
        for index in &unique {
            let address = roster.get(*index).cloned().ok_or_else(|| {
                CourtError::Store(StoreError::Corruption(format!(
                    "no participant at roster index {index}"
                )))
            })?;
            let slots = counts.get(index).copied().unwrap_or_default();
            let locked_stake = StakeAmount::from(slots)
                .checked_mul(self.params.min_stake_per_slot)
                .ok_or(CourtError::Overflow)?;
            jurors.push((address, slots, locked_stake));
        }
        let commit_deadline = now.saturating_add_secs(self.params.commit_duration_secs);
        let reveal_deadline =
            commit_deadline.saturating_add_secs(self.params.reveal_duration_secs);

        self.ledger.apply_locks(locks)?;

        let dispute = dispute_mut(&mut self.disputes, id, "Created")?;
        for (address, slots, locked_stake) in &jurors {
            dispute.unique_jurors.push(address.clone());
            dispute.votes.insert(
                address.clone(),
                JurorVote {
                    selection_count: *slots,
                    locked_stake: *locked_stake,
                    ..JurorVote::default()
                },
            );
        }
        dispute.total_selections = self.params.selection_slots;
        dispute.commit_deadline = Some(commit_deadline);
        dispute.reveal_deadline = Some(reveal_deadline);
        dispute.phase = DisputePhase::JurorsDrawn;

        info!(
            dispute = id.get(),
            unique_jurors = jurors.len(),
            commit_deadline = %commit_deadline,
            reveal_deadline = %reveal_deadline,
            "jurors drawn"
        );
        self.pending_events.push(CourtEvent::JurorsDrawn {
            dispute: id,
            jurors: jurors
                .iter()
                .map(|(address, slots, _)| (address.clone(), *slots))
                .collect(),
            commit_deadline,
            reveal_deadline,
        });
        Ok(jurors.into_iter().map(|(address, _, _)| address).collect())
    }

    /// Record a drawn juror's sealed vote during the commit window.
    pub fn commit_vote(
        &mut self,
        id: DisputeId,
        juror: &Address,
        commitment: CommitmentHash,
        now: Timestamp,
    ) -> Result<(), CourtError> {
        let dispute = dispute_mut(&mut self.disputes, id, "JurorsDrawn or Commit")?;
        self.voting.commit(dispute, juror, commitment, now)?;

        debug!(dispute = id.get(), juror = %juror, "vote committed");
        self.pending_events.push(CourtEvent::VoteCommitted {
            dispute: id,
            juror: juror.clone(),
        });
        Ok(())
    }

    /// Open a commitment during the reveal window. Returns the revealed option.
    pub fn reveal_vote(
        &mut self,
        id: DisputeId,
        juror: &Address,
        choice: u8,
        nonce: &VoteNonce,
        now: Timestamp,
    ) -> Result<Ruling, CourtError> {
        let dispute = dispute_mut(&mut self.disputes, id, "Commit or Reveal")?;
        let ruling = self.voting.reveal(dispute, juror, choice, nonce, now)?;
        let weight = dispute.vote(juror).map_or(0, |v| v.selection_count);

        debug!(dispute = id.get(), juror = %juror, %ruling, weight, "vote revealed");
        self.pending_events.push(CourtEvent::VoteRevealed {
            dispute: id,
            juror: juror.clone(),
            ruling,
            weight,
        });
        Ok(ruling)
    }

    /// Close the dispute once the reveal window has lapsed: fix the ruling,
    /// slash and reward, and release every lock the draw took.
    ///
    /// A dispute nobody committed to (still `JurorsDrawn`) can be finalized
    /// too; it resolves `Undecided` and its locks are released.
    pub fn finalize(&mut self, id: DisputeId, now: Timestamp) -> Result<Ruling, CourtError> {
        let dispute = self.disputes.get(&id).ok_or(CourtError::WrongPhase {
            dispute: id,
            actual: DisputePhase::None,
            expected: "JurorsDrawn, Commit or Reveal",
        })?;
        let deadline = match (dispute.phase, dispute.reveal_deadline) {
            (
                DisputePhase::JurorsDrawn | DisputePhase::Commit | DisputePhase::Reveal,
                Some(deadline),
            ) => deadline,
            (actual, _) => {
                return Err(CourtError::WrongPhase {
                    dispute: id,
                    actual,
                    expected: "JurorsDrawn, Commit or Reveal",
                })
            }
        };
        if now <= deadline {
            return Err(CourtError::RevealStillOpen { deadline, now });
        }

        let ruling = self.voting.tally(dispute);
        let redistribution = compute_redistribution(ruling, dispute)?;
        self.ledger.apply_settlement(&redistribution.settlement())?;

        let dispute = dispute_mut(&mut self.disputes, id, "JurorsDrawn, Commit or Reveal")?;
        dispute.ruling = ruling;
        dispute.phase = DisputePhase::Resolved;
        dispute.resolution = Some(redistribution.clone());

        info!(
            dispute = id.get(),
            %ruling,
            slashed = %redistribution.total_slashed,
            rewarded = %redistribution.total_rewarded,
            dust = %redistribution.dust,
            "dispute resolved"
        );
        self.pending_events.push(CourtEvent::DisputeResolved {
            dispute: id,
            ruling,
            redistribution,
        });
        Ok(ruling)
    }

    // ── Queries ──────────────────────────────────────────────────────────

    pub fn dispute(&self, id: DisputeId) -> Option<&Dispute> {
        self.disputes.get(&id)
    }

    pub fn dispute_summary(&self, id: DisputeId) -> Option<DisputeSummary> {
        self.disputes.get(&id).map(Dispute::summary)
    }

    /// `DisputePhase::None` for an unknown id.
    pub fn phase_of(&self, id: DisputeId) -> DisputePhase {
        self.disputes.get(&id).map_or(DisputePhase::None, |d| d.phase)
    }

    pub fn juror_vote(&self, id: DisputeId, juror: &Address) -> Option<&JurorVote> {
        self.disputes.get(&id).and_then(|d| d.vote(juror))
    }

    pub fn stake_record(&self, participant: &Address) -> Option<StakeRecord> {
        self.ledger.record(participant).copied()
    }

    /// Every participant ever seen, in roster order.
    pub fn participants(&self) -> &[Address] {
        self.ledger.participants()
    }

    /// All participants with their stake records, in roster order.
    pub fn roster(&self) -> Vec<(Address, StakeRecord)> {
        self.ledger
            .entries()
            .map(|(address, record)| (address.clone(), *record))
            .collect()
    }

    pub fn available_stake_sum(&self) -> StakeAmount {
        self.ledger.available_stake_sum()
    }

    pub fn total_stake(&self) -> StakeAmount {
        self.ledger.total_stake()
    }

    pub fn total_locked(&self) -> StakeAmount {
        self.ledger.total_locked()
    }

    pub fn params(&self) -> &CourtParams {
        &self.params
    }

    pub fn dispute_count(&self) -> usize {
        self.disputes.len()
    }

    /// Drain pending events for the embedding service to process.
    pub fn drain_events(&mut self) -> Vec<CourtEvent> {
        std::mem::take(&mut self.pending_events)
    }

    // ── Persistence ──────────────────────────────────────────────────────

    /// Capture ledger and dispute state for persistence across restarts.
    pub fn snapshot(&self) -> CourtSnapshot {
        CourtSnapshot {
            params: self.params.clone(),
            roster: self.roster(),
            disputes: self.disputes.values().cloned().collect(),
            next_dispute_id: self.next_dispute_id,
        }
    }

    /// Rebuild a court from a snapshot. Pending events are not part of it.
    pub fn restore(
        snapshot: CourtSnapshot,
        token: Arc<dyn StakeToken>,
        random: Arc<dyn RandomSource>,
    ) -> Result<Self, CourtError> {
        let ledger = StakeLedger::from_entries(snapshot.roster).map_err(CourtError::Stake)?;
        let disputes = snapshot.disputes.into_iter().map(|d| (d.id, d)).collect();
        Self::assemble(
            snapshot.params,
            ledger,
            disputes,
            snapshot.next_dispute_id,
            token,
            random,
        )
    }

    /// Persist all court state to a store.
    ///
    /// Disputes are written before the stake records that carry their locks,
    /// and the roster and dispute counter last, so an interrupted save never
    /// stores a lock without the dispute that releases it. Keys are written
    /// one by one; backends that need the whole save to be atomic must wrap
    /// it in their own transaction.
    pub fn save_to_store(&self, store: &dyn CourtStore) -> Result<(), CourtError> {
        for (id, dispute) in &self.disputes {
            store.put_dispute(*id, &encode(dispute)?)?;
        }
        for (address, record) in self.ledger.entries() {
            store.put_stake_record(address, &encode(record)?)?;
        }

        store.put_meta(META_ROSTER, &encode(&self.ledger.participants())?)?;
        store.put_meta(META_NEXT_DISPUTE_ID, &self.next_dispute_id.to_be_bytes())?;
        store.put_meta(META_PARAMS, &encode(&self.params)?)?;
        debug!(
            participants = self.ledger.participants().len(),
            disputes = self.disputes.len(),
            "court state saved"
        );
        Ok(())
    }

    /// Restore court state from a store. A store written under different
    /// parameters is rejected.
    pub fn load_from_store(
        store: &dyn CourtStore,
        params: CourtParams,
        token: Arc<dyn StakeToken>,
        random: Arc<dyn RandomSource>,
    ) -> Result<Self, CourtError> {
        if let Some(bytes) = store.get_meta(META_PARAMS)? {
            let stored: CourtParams = decode(&bytes)?;
            if stored != params {
                return Err(CourtError::Config(format!(
                    "store was written with different court parameters: {stored:?}"
                )));
            }
        }

        let next_dispute_id = match store.get_meta(META_NEXT_DISPUTE_ID)? {
            Some(bytes) => {
                let raw: [u8; 8] = bytes.as_slice().try_into().map_err(|_| {
                    CourtError::Store(StoreError::Corruption(format!(
                        "next dispute id has {} bytes",
                        bytes.len()
                    )))
                })?;
                DisputeId::new(u64::from_be_bytes(raw))
            }
            None => DisputeId::FIRST,
        };

        let roster: Vec<Address> = match store.get_meta(META_ROSTER)? {
            Some(bytes) => decode(&bytes)?,
            None => Vec::new(),
        };
        let mut records: HashMap<Address, StakeRecord> = HashMap::new();
        for (address, bytes) in store.iter_stake_records()? {
            records.insert(address, decode(&bytes)?);
        }
        if records.len() != roster.len() {
            return Err(CourtError::Store(StoreError::Corruption(format!(
                "{} stake records for a roster of {}",
                records.len(),
                roster.len()
            ))));
        }
        let mut entries = Vec::with_capacity(roster.len());
        for address in roster {
            let record = records.remove(&address).ok_or_else(|| {
                CourtError::Store(StoreError::Corruption(format!(
                    "no stake record for {address}"
                )))
            })?;
            entries.push((address, record));
        }
        let ledger = StakeLedger::from_entries(entries).map_err(CourtError::Stake)?;

        let mut disputes = BTreeMap::new();
        for (id, bytes) in store.iter_disputes()? {
            let dispute: Dispute = decode(&bytes)?;
            if dispute.id != id {
                return Err(CourtError::Store(StoreError::Corruption(format!(
                    "dispute stored under {id} claims id {}",
                    dispute.id
                ))));
            }
            disputes.insert(id, dispute);
        }

        debug!(
            participants = ledger.participants().len(),
            disputes = disputes.len(),
            "court state loaded"
        );
        Self::assemble(params, ledger, disputes, next_dispute_id, token, random)
    }
}

/// Serializable court state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CourtSnapshot {
    pub params: CourtParams,
    /// Participants and their stake, in roster order.
    pub roster: Vec<(Address, StakeRecord)>,
    pub disputes: Vec<Dispute>,
    pub next_dispute_id: DisputeId,
}

fn dispute_mut<'a>(
    disputes: &'a mut BTreeMap<DisputeId, Dispute>,
    id: DisputeId,
    expected: &'static str,
) -> Result<&'a mut Dispute, CourtError> {
    disputes.get_mut(&id).ok_or(CourtError::WrongPhase {
        dispute: id,
        actual: DisputePhase::None,
        expected,
    })
}

fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, CourtError> {
    bincode::serialize(value).map_err(|e| CourtError::Serialization(e.to_string()))
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, CourtError> {
    bincode::deserialize(bytes).map_err(|e| CourtError::Serialization(e.to_string()))
}
