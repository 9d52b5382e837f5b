//! Shared test doubles for the flow tests.

#![allow(dead_code)]

pub mod fake_git;
pub mod mock_host;

pub use fake_git::FakeGit;
pub use mock_host::MockReviewHost;

use chrono::{DateTime, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use shipr::{BranchNamer, Clock};

pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Namer pinned to 2024-03-05 14:30:00 UTC with a seeded suffix.
pub fn fixed_namer() -> BranchNamer {
    let clock = FixedClock(Utc.with_ymd_and_hms(2024, 3, 5, 14, 30, 0).unwrap());
    BranchNamer::new(Box::new(clock), Box::new(StdRng::seed_from_u64(7)))
}
