use chrono::{DateTime, Utc};

use crate::models::wash::{WashJob, WashPhase};

/// Days after job creation at which the garment is assumed to have
/// entered the washer.
pub const WASHING_AFTER_DAYS: i64 = 1;

/// Days after job creation at which the cycle is assumed complete and the
/// garment is ready for its ESD retest.
pub const COMPLETED_AFTER_DAYS: i64 = 3;

/// Derive the effective phase of a wash job from stored state and
/// wall-clock time.
///
/// Pure and idempotent: no side effects, and repeated calls with the same
/// inputs return the same phase. Persisting a derived phase, where needed,
/// is the lifecycle controller's job, not this function's.
///
/// Terminal stored phases are returned unchanged; they are never
/// re-derived from elapsed time. Elapsed time before the first full day
/// (including negative elapsed after a date shift) counts as day zero.
pub fn derive_phase(
    stored: WashPhase,
    created_at: DateTime<Utc>,
    rewash_count: i32,
    now: DateTime<Utc>,
) -> WashPhase {
    if stored.is_terminal() {
        return stored;
    }

    let elapsed_days = (now - created_at).num_days();

    if elapsed_days >= COMPLETED_AFTER_DAYS {
        WashPhase::Completed
    } else if elapsed_days >= WASHING_AFTER_DAYS {
        if rewash_count == 0 {
            WashPhase::Washing
        } else {
            WashPhase::Rewashing(rewash_count)
        }
    } else if rewash_count == 0 {
        WashPhase::WaitingToSend
    } else {
        WashPhase::WaitingRewash(rewash_count)
    }
}

/// Effective phase of a job as of `now`.
pub fn derive_job_phase(job: &WashJob, now: DateTime<Utc>) -> WashPhase {
    derive_phase(job.phase, job.created_at, job.rewash_count, now)
}

/// Initial phase for a freshly created job: day zero by construction.
pub fn initial_phase(rewash_count: i32) -> WashPhase {
    if rewash_count == 0 {
        WashPhase::WaitingToSend
    } else {
        WashPhase::WaitingRewash(rewash_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn at(now: DateTime<Utc>, hours_ago: i64) -> DateTime<Utc> {
        now - Duration::hours(hours_ago)
    }

    #[test]
    fn fresh_job_is_waiting_to_send() {
        let now = Utc::now();
        let phase = derive_phase(WashPhase::WaitingToSend, now, 0, now);
        assert_eq!(phase, WashPhase::WaitingToSend);
    }

    #[test]
    fn day_thresholds_drive_washing_and_completed() {
        let now = Utc::now();

        // 1.5 days elapsed: in the washer.
        let phase = derive_phase(WashPhase::WaitingToSend, at(now, 36), 0, now);
        assert_eq!(phase, WashPhase::Washing);

        // 3 days elapsed: ready for retest.
        let phase = derive_phase(WashPhase::WaitingToSend, at(now, 72), 0, now);
        assert_eq!(phase, WashPhase::Completed);
    }

    #[test]
    fn rewash_count_selects_rewash_variants() {
        let now = Utc::now();

        let phase = derive_phase(WashPhase::WaitingRewash(2), now, 2, now);
        assert_eq!(phase, WashPhase::WaitingRewash(2));

        let phase = derive_phase(WashPhase::WaitingRewash(2), at(now, 30), 2, now);
        assert_eq!(phase, WashPhase::Rewashing(2));

        let phase = derive_phase(WashPhase::WaitingRewash(2), at(now, 80), 2, now);
        assert_eq!(phase, WashPhase::Completed);
    }

    #[test]
    fn terminal_phases_are_sticky() {
        let now = Utc::now();
        let week_ago = at(now, 24 * 7);

        assert_eq!(
            derive_phase(WashPhase::EsdPassed, week_ago, 0, now),
            WashPhase::EsdPassed
        );
        assert_eq!(
            derive_phase(WashPhase::Scrap, week_ago, 5, now),
            WashPhase::Scrap
        );
    }

    #[test]
    fn derivation_is_idempotent() {
        let now = Utc::now();
        let created = at(now, 50);

        let first = derive_phase(WashPhase::WaitingToSend, created, 1, now);
        let second = derive_phase(first, created, 1, now);
        assert_eq!(first, second);
    }

    #[test]
    fn negative_elapsed_counts_as_day_zero() {
        let now = Utc::now();
        let future = now + Duration::days(2);

        let phase = derive_phase(WashPhase::Washing, future, 0, now);
        assert_eq!(phase, WashPhase::WaitingToSend);
    }
}
