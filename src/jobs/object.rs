//! # Backend job objects as seen through lifecycle events.
//!
//! The reconciler never depends on a concrete backend type. It only needs two
//! capabilities, expressed by [`TrackedObject`]:
//! - the job identifier the object belongs to;
//! - whether the object has reached a terminal state.
//!
//! [`Labeled`] is the extra capability event sources need to apply a
//! [`LabelSelector`](crate::LabelSelector).
//!
//! [`JobObject`] is a backend-neutral representation (labels + status conditions)
//! that implements both traits. Adapters for real backends either convert into
//! it or implement the traits on their own types.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Label holding the (converted) agent tag a job was scheduled for.
pub const TAG_LABEL: &str = "jobgate.io/tag";

/// Label holding the [`JobId`](crate::JobId) of the job.
pub const ID_LABEL: &str = "jobgate.io/uuid";

/// Minimal view of a backend object needed for in-flight reconciliation.
pub trait TrackedObject: Send + Sync + 'static {
    /// Identifier of the job this object belongs to, if the object carries one.
    fn job_id(&self) -> Option<&str>;

    /// True once the object reports a terminal state (completed or failed).
    fn is_terminal(&self) -> bool;
}

/// Objects that expose a label map.
pub trait Labeled {
    /// Returns the object's labels.
    fn labels(&self) -> &BTreeMap<String, String>;
}

/// Status condition type reported by the backend.
///
/// Only [`ConditionKind::Complete`] and [`ConditionKind::Failed`] are interpreted;
/// every other value is carried through unchanged.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ConditionKind {
    Complete,
    Failed,
    Suspended,
    FailureTarget,
    SuccessCriteriaMet,
    Other(String),
}

impl ConditionKind {
    pub fn as_str(&self) -> &str {
        match self {
            ConditionKind::Complete => "Complete",
            ConditionKind::Failed => "Failed",
            ConditionKind::Suspended => "Suspended",
            ConditionKind::FailureTarget => "FailureTarget",
            ConditionKind::SuccessCriteriaMet => "SuccessCriteriaMet",
            ConditionKind::Other(s) => s,
        }
    }

    /// True for `Complete` and `Failed`.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, ConditionKind::Complete | ConditionKind::Failed)
    }
}

impl From<&str> for ConditionKind {
    fn from(s: &str) -> Self {
        match s {
            "Complete" => ConditionKind::Complete,
            "Failed" => ConditionKind::Failed,
            "Suspended" => ConditionKind::Suspended,
            "FailureTarget" => ConditionKind::FailureTarget,
            "SuccessCriteriaMet" => ConditionKind::SuccessCriteriaMet,
            other => ConditionKind::Other(other.to_owned()),
        }
    }
}

impl From<String> for ConditionKind {
    fn from(s: String) -> Self {
        ConditionKind::from(s.as_str())
    }
}

impl From<ConditionKind> for String {
    fn from(kind: ConditionKind) -> Self {
        kind.as_str().to_owned()
    }
}

impl fmt::Display for ConditionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of a job's status condition list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobCondition {
    #[serde(rename = "type")]
    pub kind: ConditionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl JobCondition {
    pub fn new(kind: impl Into<ConditionKind>) -> Self {
        Self {
            kind: kind.into(),
            reason: None,
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

/// Backend-neutral job object: a name, labels and status conditions.
///
/// ## Example
/// ```rust
/// use jobgate::{ConditionKind, JobObject, TrackedObject};
///
/// let running = JobObject::new("job-1").with_job_id("0190-abcd");
/// assert_eq!(running.job_id(), Some("0190-abcd"));
/// assert!(!running.is_terminal());
///
/// let done = running.clone().with_condition(ConditionKind::Complete);
/// assert!(done.is_terminal());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobObject {
    pub name: String,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    #[serde(default)]
    pub conditions: Vec<JobCondition>,
}

impl JobObject {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Sets the identifier label ([`ID_LABEL`]).
    pub fn with_job_id(self, id: impl Into<String>) -> Self {
        self.with_label(ID_LABEL, id)
    }

    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    pub fn with_condition(mut self, kind: impl Into<ConditionKind>) -> Self {
        self.conditions.push(JobCondition::new(kind));
        self
    }
}

impl TrackedObject for JobObject {
    fn job_id(&self) -> Option<&str> {
        self.labels.get(ID_LABEL).map(String::as_str)
    }

    fn is_terminal(&self) -> bool {
        self.conditions.iter().any(|c| c.kind.is_terminal())
    }
}

impl Labeled for JobObject {
    fn labels(&self) -> &BTreeMap<String, String> {
        &self.labels
    }
}
