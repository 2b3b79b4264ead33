//! # Job identity and producer-side description.
//!
//! [`JobId`] is the sole key used for in-flight tracking: the same value appears
//! in the producer's [`JobDescription`] and in the backend object's identifier label.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque, globally unique job identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    /// Wraps an identifier string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for JobId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for JobId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for JobId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Producer-supplied description of a job to launch.
///
/// The gate only reads [`JobDescription::id`]; tags and payload are forwarded
/// untouched to the [`Scheduler`](crate::Scheduler).
///
/// ## Example
/// ```rust
/// use jobgate::JobDescription;
///
/// let job = JobDescription::new("0190-abcd")
///     .with_tags(["queue=default"])
///     .with_payload(serde_json::json!({ "command": "make test" }));
///
/// assert_eq!(job.id.as_str(), "0190-abcd");
/// assert_eq!(job.tags, vec!["queue=default".to_string()]);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JobDescription {
    /// Unique job identifier.
    pub id: JobId,
    /// Agent tags the job was requested with (`key=value`).
    #[serde(default)]
    pub tags: Vec<String>,
    /// Opaque launch payload.
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl JobDescription {
    /// Creates a description with no tags and a null payload.
    pub fn new(id: impl Into<JobId>) -> Self {
        Self {
            id: id.into(),
            tags: Vec::new(),
            payload: serde_json::Value::Null,
        }
    }

    /// Returns a new description with the given tags.
    pub fn with_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Returns a new description with the given payload.
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}
