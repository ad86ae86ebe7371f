//! Project records and review-freshness policy.
//!
//! # Responsibility
//! - Define the tracked project and its review metadata.
//! - Classify how stale the last review is.
//!
//! # Invariants
//! - `review_freshness` is `None` exactly when `last_review` is unset.
//! - Freshness thresholds are strictly increasing day counts.

use super::{ensure_id, ensure_name, ModelValidationError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type ProjectId = Uuid;
pub type ProjectGroupId = Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectGroup {
    pub id: ProjectGroupId,
    pub name: String,
}

impl ProjectGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        ensure_id("project group", self.id)?;
        ensure_name("project group", &self.name)
    }
}

/// A tracked project scored against every objective.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    /// Empty string when unknown.
    pub url: String,
    pub group_id: Option<ProjectGroupId>,
    /// Usually the engineering manager or director.
    pub owner: Option<String>,
    /// Usually a technical author.
    pub driver: Option<String>,
    pub last_review: Option<NaiveDate>,
    pub last_review_status: Option<String>,
    pub agreement_status: Option<String>,
}

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            url: String::new(),
            group_id: None,
            owner: None,
            driver: None,
            last_review: None,
            last_review_status: None,
            agreement_status: None,
        }
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        ensure_id("project", self.id)?;
        ensure_name("project", &self.name)
    }

    /// Classifies the age of `last_review` relative to `today`.
    ///
    /// A review dated in the future counts as `New`.
    pub fn review_freshness(
        &self,
        today: NaiveDate,
        policy: &FreshnessPolicy,
    ) -> Option<ReviewFreshness> {
        let last_review = self.last_review?;
        let elapsed_days = (today - last_review).num_days();
        Some(policy.classify(elapsed_days))
    }
}

/// Staleness bucket of a project's last review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewFreshness {
    New,
    Acceptable,
    Overdue,
    Unacceptable,
}

/// Day thresholds separating the freshness buckets.
///
/// A review `d` days old is `New` when `d < new_days`, `Acceptable` when
/// `d < acceptable_days`, `Overdue` when `d < overdue_days`, and
/// `Unacceptable` otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FreshnessPolicy {
    pub new_days: i64,
    pub acceptable_days: i64,
    pub overdue_days: i64,
}

impl Default for FreshnessPolicy {
    fn default() -> Self {
        Self {
            new_days: 31,
            acceptable_days: 93,
            overdue_days: 186,
        }
    }
}

impl FreshnessPolicy {
    pub fn classify(&self, elapsed_days: i64) -> ReviewFreshness {
        if elapsed_days < self.new_days {
            ReviewFreshness::New
        } else if elapsed_days < self.acceptable_days {
            ReviewFreshness::Acceptable
        } else if elapsed_days < self.overdue_days {
            ReviewFreshness::Overdue
        } else {
            ReviewFreshness::Unacceptable
        }
    }
}
