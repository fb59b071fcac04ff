use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_plain::derive_display_from_serialize;

/// The tri-state value of a [`StatusCondition`].
#[derive(Serialize, Deserialize, Debug, Eq, PartialEq, Clone, Copy, JsonSchema)]
pub enum ConditionStatus {
    True,
    False,
    Unknown,
}

impl Default for ConditionStatus {
    fn default() -> Self {
        ConditionStatus::Unknown
    }
}

derive_display_from_serialize!(ConditionStatus);

/// One entry of a `status.conditions` list as written by the addon operator and the package
/// operator. Conditions are unique by `type_`.
#[derive(Serialize, Deserialize, Debug, Default, Eq, PartialEq, Clone, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusCondition {
    #[serde(rename = "type")]
    pub type_: String,
    pub status: ConditionStatus,
    #[serde(default)]
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<String>,
}

impl StatusCondition {
    pub fn new<S1, S2>(type_: S1, status: ConditionStatus, reason: S2) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
    {
        Self {
            type_: type_.into(),
            status,
            reason: reason.into(),
            ..Self::default()
        }
    }
}

/// Finds the condition of the given type. If the list holds more than one entry for a type, the
/// last one wins.
pub fn find_status_condition<'a>(
    conditions: &'a [StatusCondition],
    type_: &str,
) -> Option<&'a StatusCondition> {
    conditions.iter().rev().find(|c| c.type_ == type_)
}

/// `true` only when a condition of the given type exists and its status is `True`.
pub fn is_status_condition_true(conditions: &[StatusCondition], type_: &str) -> bool {
    find_status_condition(conditions, type_)
        .map(|c| c.status == ConditionStatus::True)
        .unwrap_or(false)
}

/// Renders a condition list as `Type=Status(Reason)` pairs for diagnostics.
pub fn summarize_conditions(conditions: &[StatusCondition]) -> String {
    if conditions.is_empty() {
        return "no conditions".to_string();
    }
    conditions
        .iter()
        .map(|c| {
            if c.reason.is_empty() {
                format!("{}={}", c.type_, c.status)
            } else {
                format!("{}={}({})", c.type_, c.status, c.reason)
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Implemented by objects that carry a `status.conditions` list.
pub trait HasConditions {
    /// The object's conditions, empty when the status has not been written yet.
    fn conditions(&self) -> &[StatusCondition];

    fn find_condition(&self, type_: &str) -> Option<&StatusCondition> {
        find_status_condition(self.conditions(), type_)
    }

    fn is_condition_true(&self, type_: &str) -> bool {
        is_status_condition_true(self.conditions(), type_)
    }
}
