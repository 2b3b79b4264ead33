//! # Label selectors for filtering backend job objects.
//!
//! A gate only cares about objects that:
//! - carry one of its agent tags in [`TAG_LABEL`](crate::TAG_LABEL), and
//! - carry an identifier in [`ID_LABEL`](crate::ID_LABEL).
//!
//! [`LabelSelector::for_tags`] builds exactly that pair of requirements.
//! Tags are written `key=value`; since `=` is not allowed in label values they
//! are converted to `key_value` ([`tag_to_label`]).
//!
//! ## Example
//! ```rust
//! use jobgate::LabelSelector;
//!
//! let sel = LabelSelector::for_tags(&["queue=default".to_string()]).unwrap();
//! assert_eq!(sel.to_string(), "jobgate.io/tag in (queue_default),jobgate.io/uuid");
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::error::GateError;
use crate::jobs::{ID_LABEL, TAG_LABEL};

/// Maximum length of a label value.
const MAX_LABEL_VALUE_LEN: usize = 63;

/// One selector requirement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Requirement {
    /// Label `key` is present and its value is one of `values`.
    In {
        key: String,
        values: BTreeSet<String>,
    },
    /// Label `key` is present (any value).
    Exists { key: String },
}

impl Requirement {
    /// Builds an `In` requirement; the value set must be non-empty and every value valid.
    pub fn is_in<I, T>(key: impl Into<String>, values: I) -> Result<Self, GateError>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let key = key.into();
        let values: BTreeSet<String> = values.into_iter().map(Into::into).collect();
        if values.is_empty() {
            return Err(GateError::InvalidSelector {
                reason: format!("requirement on {key:?}: value set can't be empty"),
            });
        }
        for v in &values {
            validate_label_value(v)?;
        }
        Ok(Requirement::In { key, values })
    }

    /// Builds an `Exists` requirement.
    pub fn exists(key: impl Into<String>) -> Self {
        Requirement::Exists { key: key.into() }
    }

    /// True if `labels` satisfy this requirement.
    pub fn matches(&self, labels: &BTreeMap<String, String>) -> bool {
        match self {
            Requirement::In { key, values } => labels.get(key).is_some_and(|v| values.contains(v)),
            Requirement::Exists { key } => labels.contains_key(key),
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Requirement::In { key, values } => {
                write!(f, "{key} in (")?;
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    f.write_str(v)?;
                }
                f.write_str(")")
            }
            Requirement::Exists { key } => f.write_str(key),
        }
    }
}

/// Conjunction of requirements. An empty selector matches everything.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LabelSelector {
    requirements: Vec<Requirement>,
}

impl LabelSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a requirement.
    pub fn with(mut self, req: Requirement) -> Self {
        self.requirements.push(req);
        self
    }

    /// Selector used by the gate: `TAG_LABEL in (<tags>)` and `ID_LABEL` exists.
    pub fn for_tags(tags: &[String]) -> Result<Self, GateError> {
        let has_tag = Requirement::is_in(TAG_LABEL, tags.iter().map(|t| tag_to_label(t)))?;
        Ok(Self::new()
            .with(has_tag)
            .with(Requirement::exists(ID_LABEL)))
    }

    pub fn requirements(&self) -> &[Requirement] {
        &self.requirements
    }

    /// True if `labels` satisfy every requirement.
    pub fn matches(&self, labels: &BTreeMap<String, String>) -> bool {
        self.requirements.iter().all(|r| r.matches(labels))
    }
}

impl fmt::Display for LabelSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, r) in self.requirements.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{r}")?;
        }
        Ok(())
    }
}

/// Converts a `key=value` agent tag into a label value (`key_value`).
pub fn tag_to_label(tag: &str) -> String {
    tag.replace('=', "_")
}

/// Validates a label value: at most 63 characters of `[A-Za-z0-9._-]`,
/// starting and ending with an alphanumeric character.
fn validate_label_value(v: &str) -> Result<(), GateError> {
    let invalid = |why: &str| GateError::InvalidSelector {
        reason: format!("invalid label value {v:?}: {why}"),
    };

    if v.is_empty() {
        return Err(invalid("must not be empty"));
    }
    if v.len() > MAX_LABEL_VALUE_LEN {
        return Err(invalid("must be no more than 63 characters"));
    }
    if !v
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    {
        return Err(invalid("only alphanumerics, '-', '_' and '.' are allowed"));
    }
    let bytes = v.as_bytes();
    if !bytes[0].is_ascii_alphanumeric() || !bytes[bytes.len() - 1].is_ascii_alphanumeric() {
        return Err(invalid("must start and end with an alphanumeric character"));
    }
    Ok(())
}
