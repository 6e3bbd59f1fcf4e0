use super::MAX_REVISION;
use crate::error::RevisionError;

/// Checks that `new` may replace the entry currently at `previous`.
///
/// `None` and `Some(MAX_REVISION)` both mean the key was never written, so
/// any storable revision is accepted. Otherwise `new` must be strictly
/// greater than `previous`.
pub fn check_revision(previous: Option<u64>, new: u64) -> Result<(), RevisionError> {
    if new == MAX_REVISION {
        return Err(RevisionError::SentinelRevision);
    }
    match previous {
        None | Some(MAX_REVISION) => Ok(()),
        Some(previous) if new > previous => Ok(()),
        Some(previous) => Err(RevisionError::NotMonotonic {
            previous,
            attempted: new,
        }),
    }
}

/// The revision to use for the next write after `previous`.
pub fn next_revision(previous: Option<u64>) -> Result<u64, RevisionError> {
    match previous {
        None | Some(MAX_REVISION) => Ok(0),
        Some(previous) if previous + 1 == MAX_REVISION => {
            Err(RevisionError::Exhausted { previous })
        }
        Some(previous) => Ok(previous + 1),
    }
}
