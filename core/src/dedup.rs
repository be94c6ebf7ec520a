//! Client-side duplicate-save checks.
//!
//! # Overview
//! Two small guards against saving the same plan twice, complementing the
//! backend's unique constraint: a lookup over already-fetched plans, and an
//! in-flight flag against double-tapped submit buttons. Both are advisory —
//! the backend's 409 response remains the source of truth, and the guard
//! has no atomicity (exclusive access is the caller's, via `&mut self`).

use crate::types::{NewPlan, Plan};

/// Find the saved plan that collides with `candidate` on the backend's
/// unique key (destination + start date), if any.
pub fn find_duplicate<'a>(existing: &'a [Plan], candidate: &NewPlan) -> Option<&'a Plan> {
    existing
        .iter()
        .find(|p| p.destination == candidate.destination && p.start_date == candidate.start_date)
}

/// In-flight flag that swallows repeated submissions until the first one
/// finishes. Plain bool, single-threaded by construction.
#[derive(Debug, Default)]
pub struct SaveGuard {
    in_flight: bool,
}

impl SaveGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the in-flight slot. Returns `false` when a save is already
    /// running, in which case the caller should drop the submission.
    pub fn try_begin(&mut self) -> bool {
        if self.in_flight {
            return false;
        }
        self.in_flight = true;
        true
    }

    /// Release the slot once the save settles, whatever the outcome.
    pub fn finish(&mut self) {
        self.in_flight = false;
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }
}
