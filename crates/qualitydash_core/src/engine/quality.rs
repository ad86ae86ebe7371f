//! Display status, quality indicator and commitment checks.

use crate::model::framework::{Level, Reason};
use serde::{Deserialize, Serialize};

/// Display-facing state of one project objective.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ObjectiveStatus {
    /// A level has been achieved.
    Level(Level),
    /// No level yet; an unstarted reason was recorded.
    Reason(Reason),
}

impl ObjectiveStatus {
    pub fn level(&self) -> Option<&Level> {
        match self {
            Self::Level(level) => Some(level),
            Self::Reason(_) => None,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Level(level) => &level.name,
            Self::Reason(reason) => &reason.name,
        }
    }
}

/// The achieved level wins; otherwise the unstarted reason, if any.
pub fn resolve_status(achieved: Option<Level>, reason: Option<Reason>) -> Option<ObjectiveStatus> {
    achieved
        .map(ObjectiveStatus::Level)
        .or_else(|| reason.map(ObjectiveStatus::Reason))
}

/// `level.value * weight` for a level status, zero for anything else.
pub fn weighted_contribution(status: Option<&ObjectiveStatus>, weight: i32) -> i64 {
    status
        .and_then(ObjectiveStatus::level)
        .map_or(0, |level| i64::from(level.value) * i64::from(weight))
}

/// Sums the weighted contributions of `(weight, status)` pairs.
pub fn quality_indicator<'a, I>(objectives: I) -> i64
where
    I: IntoIterator<Item = (i32, Option<&'a ObjectiveStatus>)>,
{
    objectives
        .into_iter()
        .map(|(weight, status)| weighted_contribution(status, weight))
        .sum()
}

/// Whether the current achievement fulfils a commitment to `committed_level`.
///
/// `None` while nothing has been achieved.
pub fn commitment_met(achieved: Option<&Level>, committed_level: &Level) -> Option<bool> {
    achieved.map(|level| level.value >= committed_level.value)
}

#[cfg(test)]
mod tests {
    use super::{commitment_met, quality_indicator, resolve_status, ObjectiveStatus};
    use crate::model::framework::{Level, Reason};

    #[test]
    fn status_prefers_level_over_reason() {
        let level = Level::new("level_1", 1);
        let reason = Reason::new("Not planned", 1);

        let status = resolve_status(Some(level.clone()), Some(reason.clone()));
        assert_eq!(status, Some(ObjectiveStatus::Level(level)));

        let status = resolve_status(None, Some(reason.clone()));
        assert_eq!(status, Some(ObjectiveStatus::Reason(reason)));

        assert_eq!(resolve_status(None, None), None);
    }

    #[test]
    fn weighted_sum_skips_reasons_and_unknowns() {
        let two = ObjectiveStatus::Level(Level::new("level_2", 2));
        let four = ObjectiveStatus::Level(Level::new("level_4", 4));
        let reason = ObjectiveStatus::Reason(Reason::new("Blocked", 7));

        let total = quality_indicator([
            (10, Some(&two)),
            (5, Some(&four)),
            (100, Some(&reason)),
            (3, None),
        ]);
        assert_eq!(total, 40);
    }

    #[test]
    fn commitment_met_compares_level_values() {
        let committed = Level::new("level_2", 2);
        assert_eq!(commitment_met(None, &committed), None);
        assert_eq!(
            commitment_met(Some(&Level::new("level_1", 1)), &committed),
            Some(false)
        );
        assert_eq!(
            commitment_met(Some(&Level::new("level_3", 3)), &committed),
            Some(true)
        );
    }

    #[test]
    fn status_serializes_with_kind_tag() {
        let status = ObjectiveStatus::Reason(Reason::new("Not planned", 1));
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["kind"], "reason");
        assert_eq!(json["value"]["name"], "Not planned");
    }
}
