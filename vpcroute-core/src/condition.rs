//! Condition - Readiness conditions recorded on a managed resource's status

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConditionType {
    /// Whether the external resource is ready for use
    Ready,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConditionStatus {
    True,
    False,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConditionReason {
    Creating,
    Available,
    Deleting,
}

/// A single observed condition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub condition_type: ConditionType,
    pub status: ConditionStatus,
    pub reason: ConditionReason,
    pub last_transition_time: DateTime<Utc>,
}

impl Condition {
    fn ready(status: ConditionStatus, reason: ConditionReason) -> Self {
        Self {
            condition_type: ConditionType::Ready,
            status,
            reason,
            last_transition_time: Utc::now(),
        }
    }

    /// The external resource is being created
    pub fn creating() -> Self {
        Self::ready(ConditionStatus::False, ConditionReason::Creating)
    }

    /// The external resource is available for use
    pub fn available() -> Self {
        Self::ready(ConditionStatus::True, ConditionReason::Available)
    }

    /// The external resource is being deleted
    pub fn deleting() -> Self {
        Self::ready(ConditionStatus::False, ConditionReason::Deleting)
    }

    /// Returns true if both conditions describe the same state, ignoring time
    pub fn same_state(&self, other: &Condition) -> bool {
        self.condition_type == other.condition_type
            && self.status == other.status
            && self.reason == other.reason
    }
}

/// Set a condition, replacing any existing condition of the same type
///
/// The transition time of the existing condition is kept when the state did not change.
pub fn set_condition(conditions: &mut Vec<Condition>, condition: Condition) {
    match conditions
        .iter_mut()
        .find(|c| c.condition_type == condition.condition_type)
    {
        Some(existing) if existing.same_state(&condition) => {}
        Some(existing) => *existing = condition,
        None => conditions.push(condition),
    }
}
