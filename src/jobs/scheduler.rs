//! # Downstream scheduler capability and a function-backed implementation.
//!
//! The gate forwards every admitted, non-duplicate job to exactly one
//! [`Scheduler::create`] call. The common handle type is [`SchedulerRef`], an
//! `Arc<dyn Scheduler>` injected at construction time.
//!
//! `create` runs while the gate holds its exclusive lock, so implementations must
//! not block indefinitely: a stalled launch stalls every admission and every
//! lifecycle event behind it.

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::LaunchError;
use crate::jobs::JobDescription;

/// # Job-launching backend.
///
/// # Example
/// ```
/// use tokio_util::sync::CancellationToken;
/// use async_trait::async_trait;
/// use jobgate::{JobDescription, LaunchError, Scheduler};
///
/// struct Noop;
///
/// #[async_trait]
/// impl Scheduler for Noop {
///     async fn create(&self, _ctx: &CancellationToken, _job: &JobDescription) -> Result<(), LaunchError> {
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Scheduler: Send + Sync + 'static {
    /// Human-readable name (for logs).
    fn name(&self) -> &str {
        "scheduler"
    }

    /// Launches the job.
    async fn create(&self, ctx: &CancellationToken, job: &JobDescription)
    -> Result<(), LaunchError>;
}

/// Shared handle to a scheduler.
pub type SchedulerRef = Arc<dyn Scheduler>;

/// Function-backed scheduler.
///
/// Wraps a closure that creates a new future per launch.
///
/// ## Example
/// ```rust
/// use tokio_util::sync::CancellationToken;
/// use jobgate::{JobDescription, LaunchError, SchedulerFn, SchedulerRef};
///
/// let s: SchedulerRef = SchedulerFn::arc("noop", |_ctx: CancellationToken, _job: JobDescription| async {
///     Ok::<_, LaunchError>(())
/// });
/// assert_eq!(s.name(), "noop");
/// ```
#[derive(Debug)]
pub struct SchedulerFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> SchedulerFn<F> {
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the scheduler and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F, Fut> Scheduler for SchedulerFn<F>
where
    F: Fn(CancellationToken, JobDescription) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), LaunchError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn create(
        &self,
        ctx: &CancellationToken,
        job: &JobDescription,
    ) -> Result<(), LaunchError> {
        (self.f)(ctx.clone(), job.clone()).await
    }
}
