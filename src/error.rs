//! Error types used by the gate, the scheduler seam and event sources.
//!
//! - [`GateError`] - admission failures and fatal startup failures.
//! - [`LaunchError`] - returned by a [`Scheduler`](crate::Scheduler) that failed to launch a job.
//! - [`SourceError`] - returned by a [`LifecycleSource`](crate::LifecycleSource).
//! - [`ConfigError`] - configuration loading failures.
//!
//! Duplicate admissions and cancelled waits are **not** errors; they are reported
//! through [`Admission`](crate::Admission).
//!
//! Every enum provides `as_label` for logs/metrics.

use thiserror::Error;

use crate::jobs::JobId;

/// # Errors produced by the admission gate.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum GateError {
    /// The downstream scheduler failed; the job was **not** recorded in-flight.
    #[error("failed to launch job {job}: {source}")]
    Launch {
        /// Job that failed to launch.
        job: JobId,
        /// Scheduler error.
        #[source]
        source: LaunchError,
    },

    /// Selector criteria could not be turned into a valid label selector.
    #[error("invalid selector: {reason}")]
    InvalidSelector {
        /// What was wrong with the criteria.
        reason: String,
    },

    /// The event source did not finish replaying existing objects.
    #[error("event source failed to sync: {reason}")]
    SyncFailed {
        /// Underlying cause.
        reason: String,
    },
}

impl GateError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use jobgate::GateError;
    ///
    /// let err = GateError::SyncFailed { reason: "timeout".into() };
    /// assert_eq!(err.as_label(), "gate_sync_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            GateError::Launch { .. } => "gate_launch_failed",
            GateError::InvalidSelector { .. } => "gate_invalid_selector",
            GateError::SyncFailed { .. } => "gate_sync_failed",
        }
    }

    /// True for failures that must abort startup.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            GateError::InvalidSelector { .. } | GateError::SyncFailed { .. }
        )
    }
}

/// # Errors produced by the downstream scheduler.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LaunchError {
    /// The backend refused the job (invalid spec, quota, admission webhook...).
    #[error("launch rejected: {error}")]
    Rejected {
        /// Backend message.
        error: String,
    },

    /// The backend could not be reached.
    #[error("backend unavailable: {error}")]
    Unavailable {
        /// Transport/backend message.
        error: String,
    },
}

impl LaunchError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            LaunchError::Rejected { .. } => "launch_rejected",
            LaunchError::Unavailable { .. } => "launch_unavailable",
        }
    }
}

/// # Errors produced by lifecycle event sources.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// Listing existing objects failed.
    #[error("listing failed: {error}")]
    List {
        /// Backend message.
        error: String,
    },

    /// The source was already consumed or its feed was dropped.
    #[error("event source closed")]
    Closed,
}

impl SourceError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            SourceError::List { .. } => "source_list_failed",
            SourceError::Closed => "source_closed",
        }
    }
}

/// # Errors produced while loading configuration.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file does not exist.
    #[error("configuration file not found: {0}")]
    FileNotFound(String),

    /// File or environment could not be parsed into a [`Config`](crate::Config).
    #[error("failed to parse configuration: {0}")]
    Parse(String),
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::FileNotFound(_) => "config_not_found",
            ConfigError::Parse(_) => "config_parse_failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_launch_error_is_source_of_gate_error() {
        let err = GateError::Launch {
            job: JobId::from("j-1"),
            source: LaunchError::Rejected {
                error: "quota".into(),
            },
        };
        assert_eq!(err.to_string(), "failed to launch job j-1: launch rejected: quota");
        assert!(err.source().is_some());
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_startup_errors_are_fatal() {
        assert!(GateError::InvalidSelector { reason: "x".into() }.is_fatal());
        assert!(GateError::SyncFailed { reason: "x".into() }.is_fatal());
    }
}
