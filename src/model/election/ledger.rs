use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Duration, Utc};
use log::{info, warn};

use crate::clock::{Clock, SystemClock};
use crate::error::{Error, Result};
use crate::model::candidate::CandidateRegistry;
use crate::model::identity::Identity;
use crate::model::voter::VoterRegistry;

use super::state::{ElectionPhase, ElectionState, ElectionStatus};
use super::CandidateId;

/// The election lifecycle, per-candidate tally, and per-voter vote marks.
///
/// Borrows the voter and candidate registries read-only: every vote
/// consults them, but nothing here ever mutates them. Each operation either
/// fully commits its single state change or fails with no observable side
/// effect.
#[derive(Debug)]
pub struct ElectionLedger<'a, C: Clock = SystemClock> {
    voters: &'a VoterRegistry,
    candidates: &'a CandidateRegistry,
    clock: C,
    state: ElectionState,
    tally: HashMap<CandidateId, u64>,
    voted: HashSet<Identity>,
}

impl<'a> ElectionLedger<'a> {
    /// A ledger over the given registries, using wall-clock time.
    pub fn new(voters: &'a VoterRegistry, candidates: &'a CandidateRegistry) -> Self {
        Self::with_clock(voters, candidates, SystemClock)
    }
}

impl<'a, C: Clock> ElectionLedger<'a, C> {
    /// A ledger with an explicit time source.
    pub fn with_clock(
        voters: &'a VoterRegistry,
        candidates: &'a CandidateRegistry,
        clock: C,
    ) -> Self {
        Self {
            voters,
            candidates,
            clock,
            state: ElectionState::NotStarted,
            tally: HashMap::new(),
            voted: HashSet::new(),
        }
    }

    /// Open the polls, fixing the close of polls at now + `duration_minutes`.
    ///
    /// Admin only; the duration must be positive; an election can be
    /// started exactly once and the end time never changes afterwards.
    pub fn start_election(&mut self, caller: &Identity, duration_minutes: i64) -> Result<()> {
        if caller != self.voters.admin() {
            warn!("{caller} attempted to start the election without admin rights");
            return Err(Error::NotAdmin);
        }
        if duration_minutes <= 0 {
            return Err(Error::InvalidInput(format!(
                "election duration must be positive, got {duration_minutes} minutes"
            )));
        }
        // A duration too large to represent, or one that would push the end
        // time past the representable range, is also caller error.
        let duration = Duration::try_minutes(duration_minutes)
            .ok_or_else(|| duration_out_of_range(duration_minutes))?;
        if self.state != ElectionState::NotStarted {
            return Err(Error::AlreadyStarted);
        }

        let end_time = self
            .clock
            .now()
            .checked_add_signed(duration)
            .ok_or_else(|| duration_out_of_range(duration_minutes))?;
        self.state = ElectionState::Active { end_time };
        info!("Election started, polls close at {end_time}");
        Ok(())
    }

    /// Cast `caller`'s single vote for `candidate_id`.
    ///
    /// The checks run in a fixed order and the first failure wins: time
    /// window, then registration, then the double-vote mark, then the
    /// candidate lookup. The order is part of the contract: a caller
    /// violating several preconditions at once must see the earliest error.
    pub fn cast_vote(&mut self, caller: &Identity, candidate_id: CandidateId) -> Result<()> {
        if self.state.phase(self.clock.now()) != ElectionPhase::Active {
            return Err(Error::NotActive);
        }
        if !self.voters.is_registered(caller) {
            return Err(Error::NotRegistered);
        }
        if self.voted.contains(caller) {
            return Err(Error::AlreadyVoted);
        }
        if self.candidates.candidate(candidate_id).is_none() {
            return Err(Error::InvalidCandidate(candidate_id));
        }

        self.voted.insert(caller.clone());
        *self.tally.entry(candidate_id).or_insert(0) += 1;
        info!("{caller} voted for candidate {candidate_id}");
        Ok(())
    }

    /// The number of votes cast for `candidate_id`.
    ///
    /// Zero for a candidate nobody has voted for; `InvalidCandidate` for an
    /// ID not on the roster.
    pub fn result(&self, candidate_id: CandidateId) -> Result<u64> {
        if self.candidates.candidate(candidate_id).is_none() {
            return Err(Error::InvalidCandidate(candidate_id));
        }
        Ok(self.tally.get(&candidate_id).copied().unwrap_or(0))
    }

    /// Whether `identity` has already cast their vote.
    pub fn has_voted(&self, identity: &Identity) -> bool {
        self.voted.contains(identity)
    }

    /// Whether the polls are currently open. Re-derived from the clock on
    /// every call.
    pub fn is_active(&self) -> bool {
        self.state.phase(self.clock.now()) == ElectionPhase::Active
    }

    /// The fixed close of polls, if the election has started.
    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        self.state.end_time()
    }

    /// A point-in-time lifecycle snapshot.
    pub fn status(&self) -> ElectionStatus {
        ElectionStatus::at(self.state, self.clock.now())
    }
}

fn duration_out_of_range(duration_minutes: i64) -> Error {
    Error::InvalidInput(format!(
        "election duration of {duration_minutes} minutes is out of range"
    ))
}

#[cfg(test)]
mod tests {
    use crate::clock::ManualClock;

    use super::*;

    fn fixtures() -> (Identity, VoterRegistry, CandidateRegistry, ManualClock) {
        let admin = Identity::admin_example();
        let mut voters = VoterRegistry::new(admin.clone());
        voters
            .register_voter(&admin, Identity::voter_example())
            .unwrap();
        let mut candidates = CandidateRegistry::new(admin.clone());
        candidates.add_candidate(&admin, "Alice").unwrap();
        candidates.add_candidate(&admin, "Bob").unwrap();
        let clock = ManualClock::new(Utc::now());
        (admin, voters, candidates, clock)
    }

    #[test]
    fn only_the_admin_may_start_the_election() {
        let (_, voters, candidates, clock) = fixtures();
        let mut ledger = ElectionLedger::with_clock(&voters, &candidates, &clock);

        let err = ledger
            .start_election(&Identity::voter_example(), 10)
            .unwrap_err();
        assert_eq!(err, Error::NotAdmin);
        assert!(!ledger.is_active());
        assert_eq!(ledger.end_time(), None);
    }

    #[test]
    fn the_duration_must_be_positive() {
        let (admin, voters, candidates, clock) = fixtures();
        let mut ledger = ElectionLedger::with_clock(&voters, &candidates, &clock);

        for minutes in [0, -1, -600] {
            assert!(matches!(
                ledger.start_election(&admin, minutes),
                Err(Error::InvalidInput(_))
            ));
        }
        assert!(!ledger.is_active());
    }

    #[test]
    fn absurdly_long_durations_are_rejected_not_a_crash() {
        let (admin, voters, candidates, clock) = fixtures();
        let mut ledger = ElectionLedger::with_clock(&voters, &candidates, &clock);

        // Durations beyond what a timestamp can represent are caller error,
        // the same as a non-positive one. The last value is representable as
        // a duration but pushes the end time past the datetime range.
        for minutes in [i64::MAX, i64::MAX / 60, 1 << 50, 526_000_000_000] {
            assert!(matches!(
                ledger.start_election(&admin, minutes),
                Err(Error::InvalidInput(_))
            ));
        }
        assert!(!ledger.is_active());
        assert_eq!(ledger.end_time(), None);

        // The registries and ledger are still usable afterwards.
        ledger.start_election(&admin, 10).unwrap();
        assert!(ledger.is_active());
    }

    #[test]
    fn the_election_cannot_be_started_twice() {
        let (admin, voters, candidates, clock) = fixtures();
        let mut ledger = ElectionLedger::with_clock(&voters, &candidates, &clock);

        ledger.start_election(&admin, 10).unwrap();
        let first_end = ledger.end_time().unwrap();

        assert_eq!(ledger.start_election(&admin, 60), Err(Error::AlreadyStarted));
        assert_eq!(ledger.end_time(), Some(first_end));
    }

    #[test]
    fn a_registered_voter_can_vote_exactly_once() {
        let (admin, voters, candidates, clock) = fixtures();
        let mut ledger = ElectionLedger::with_clock(&voters, &candidates, &clock);
        ledger.start_election(&admin, 10).unwrap();

        let voter = Identity::voter_example();
        assert!(!ledger.has_voted(&voter));
        ledger.cast_vote(&voter, 1).unwrap();
        assert!(ledger.has_voted(&voter));
        assert_eq!(ledger.result(1), Ok(1));
        assert_eq!(ledger.result(2), Ok(0));

        // Subsequent votes fail, for any candidate, and change no tally.
        assert_eq!(ledger.cast_vote(&voter, 1), Err(Error::AlreadyVoted));
        assert_eq!(ledger.cast_vote(&voter, 2), Err(Error::AlreadyVoted));
        assert_eq!(ledger.result(1), Ok(1));
        assert_eq!(ledger.result(2), Ok(0));
    }

    #[test]
    fn unregistered_voters_are_rejected() {
        let (admin, voters, candidates, clock) = fixtures();
        let mut ledger = ElectionLedger::with_clock(&voters, &candidates, &clock);
        ledger.start_election(&admin, 10).unwrap();

        let outsider = Identity::outsider_example();
        assert_eq!(ledger.cast_vote(&outsider, 1), Err(Error::NotRegistered));
        assert_eq!(ledger.result(1), Ok(0));
    }

    #[test]
    fn votes_are_rejected_before_the_start_and_after_the_end() {
        let (admin, voters, candidates, clock) = fixtures();
        let mut ledger = ElectionLedger::with_clock(&voters, &candidates, &clock);
        let voter = Identity::voter_example();

        assert_eq!(ledger.cast_vote(&voter, 1), Err(Error::NotActive));

        ledger.start_election(&admin, 10).unwrap();
        assert!(ledger.is_active());

        clock.advance(Duration::minutes(10));
        assert!(!ledger.is_active());
        assert_eq!(ledger.cast_vote(&voter, 1), Err(Error::NotActive));
        assert_eq!(ledger.result(1), Ok(0));
    }

    #[test]
    fn the_time_check_runs_before_every_other_check() {
        // An unregistered caller voting for a nonexistent candidate after
        // the end must still see NotActive.
        let (admin, voters, candidates, clock) = fixtures();
        let mut ledger = ElectionLedger::with_clock(&voters, &candidates, &clock);
        ledger.start_election(&admin, 10).unwrap();
        clock.advance(Duration::minutes(11));

        assert_eq!(
            ledger.cast_vote(&Identity::outsider_example(), 99),
            Err(Error::NotActive)
        );
    }

    #[test]
    fn the_registration_check_runs_before_the_candidate_check() {
        let (admin, voters, candidates, clock) = fixtures();
        let mut ledger = ElectionLedger::with_clock(&voters, &candidates, &clock);
        ledger.start_election(&admin, 10).unwrap();

        // Unregistered caller, invalid candidate: registration wins.
        assert_eq!(
            ledger.cast_vote(&Identity::outsider_example(), 99),
            Err(Error::NotRegistered)
        );
    }

    #[test]
    fn the_double_vote_check_runs_before_the_candidate_check() {
        let (admin, voters, candidates, clock) = fixtures();
        let mut ledger = ElectionLedger::with_clock(&voters, &candidates, &clock);
        ledger.start_election(&admin, 10).unwrap();

        let voter = Identity::voter_example();
        ledger.cast_vote(&voter, 1).unwrap();
        assert_eq!(ledger.cast_vote(&voter, 99), Err(Error::AlreadyVoted));
    }

    #[test]
    fn invalid_candidates_are_rejected_without_marking_the_voter() {
        let (admin, voters, candidates, clock) = fixtures();
        let mut ledger = ElectionLedger::with_clock(&voters, &candidates, &clock);
        ledger.start_election(&admin, 10).unwrap();

        let voter = Identity::voter_example();
        assert_eq!(ledger.cast_vote(&voter, 0), Err(Error::InvalidCandidate(0)));
        assert_eq!(ledger.cast_vote(&voter, 3), Err(Error::InvalidCandidate(3)));

        // The failed attempts must not have consumed the voter's ballot.
        assert!(!ledger.has_voted(&voter));
        ledger.cast_vote(&voter, 1).unwrap();
    }

    #[test]
    fn results_require_a_known_candidate() {
        let (_, voters, candidates, clock) = fixtures();
        let ledger = ElectionLedger::with_clock(&voters, &candidates, &clock);

        assert_eq!(ledger.result(1), Ok(0));
        assert_eq!(ledger.result(0), Err(Error::InvalidCandidate(0)));
        assert_eq!(ledger.result(3), Err(Error::InvalidCandidate(3)));
    }

    #[test]
    fn reading_the_status_never_mutates_anything() {
        let (admin, voters, candidates, clock) = fixtures();
        let mut ledger = ElectionLedger::with_clock(&voters, &candidates, &clock);
        ledger.start_election(&admin, 10).unwrap();

        for _ in 0..5 {
            assert!(ledger.is_active());
            assert_eq!(ledger.status().phase, ElectionPhase::Active);
        }
        assert_eq!(ledger.status().remaining_seconds, 600);

        clock.advance(Duration::minutes(10));
        for _ in 0..5 {
            assert!(!ledger.is_active());
            assert_eq!(ledger.status().phase, ElectionPhase::Ended);
        }
        // The end time is unchanged by repeated derivation.
        assert_eq!(
            ledger.status().end_time,
            ledger.end_time()
        );
    }
}
