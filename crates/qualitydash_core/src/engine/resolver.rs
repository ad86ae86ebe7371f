//! Level resolution over a condition ledger.
//!
//! A condition is satisfied when its status is `Done` or `NotApplicable`.
//! Nothing is achieved until at least one entry is satisfied. After that,
//! levels are scanned from the lowest `value` upward and the first level
//! with an unsatisfied condition ends the scan. A level without any gating
//! condition is vacuously satisfied, so it is achieved whenever the scan
//! reaches it.

use crate::model::framework::Level;
use crate::model::ledger::ConditionEntry;

/// Returns the highest level whose gating conditions, and those of every
/// lower level, are all satisfied, or `None` if no entry is satisfied.
///
/// `entries` must belong to one project objective. Entries gated by a level
/// missing from `levels` are ignored.
pub fn resolve_achieved_level<'a>(
    levels: &'a [Level],
    entries: &[ConditionEntry],
) -> Option<&'a Level> {
    if !entries.iter().any(|entry| entry.status.is_satisfied()) {
        return None;
    }

    let mut ordered: Vec<&Level> = levels.iter().collect();
    ordered.sort_by_key(|level| level.value);

    let mut achieved = None;
    for level in ordered {
        let blocked = entries
            .iter()
            .any(|entry| entry.level_id == level.id && !entry.status.is_satisfied());
        if blocked {
            break;
        }
        achieved = Some(level);
    }
    achieved
}
