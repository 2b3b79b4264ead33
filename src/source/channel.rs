//! # In-memory lifecycle source backed by an mpsc channel.
//!
//! [`ChannelSource`] is seeded with the objects that exist "before startup" and is
//! then fed through a [`ChannelSourceHandle`]. Backend adapters that already own a
//! watch loop can push into the handle; tests use it to script event sequences.
//!
//! The selector passed to [`LifecycleSource::list`] is applied to the replay and to
//! every later event. Updates that cross the selector boundary are rewritten the
//! way a label-selector watch reports them:
//!
//! ```text
//! Updated { old: matches,   new: matches   } ─► Updated { old, new }
//! Updated { old: matches,   new: unmatched } ─► Deleted(old)
//! Updated { old: unmatched, new: matches   } ─► Added(new)
//! Updated { old: unmatched, new: unmatched } ─► dropped
//! ```
//!
//! ## Example
//! ```rust
//! use jobgate::{ChannelSource, JobObject};
//!
//! # async fn demo() {
//! let (source, feed) = ChannelSource::<JobObject>::new(vec![], 16);
//! feed.add(JobObject::new("job-1").with_job_id("u1")).await.unwrap();
//! # drop(source);
//! # }
//! ```

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::SourceError;
use crate::jobs::Labeled;
use crate::source::{LabelSelector, LifecycleEvent, LifecycleSource};

/// Producer side of a [`ChannelSource`]. Cheap to clone.
pub struct ChannelSourceHandle<O> {
    tx: mpsc::Sender<LifecycleEvent<O>>,
}

impl<O> Clone for ChannelSourceHandle<O> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<O> ChannelSourceHandle<O> {
    /// Sends an `Added` notification (waits if the queue is full).
    pub async fn add(&self, obj: O) -> Result<(), SourceError> {
        self.send(LifecycleEvent::Added(obj)).await
    }

    /// Sends an `Updated` notification.
    pub async fn update(&self, old: O, new: O) -> Result<(), SourceError> {
        self.send(LifecycleEvent::Updated { old, new }).await
    }

    /// Sends a `Deleted` notification.
    pub async fn delete(&self, obj: O) -> Result<(), SourceError> {
        self.send(LifecycleEvent::Deleted(obj)).await
    }

    /// Sends a raw notification.
    pub async fn send(&self, ev: LifecycleEvent<O>) -> Result<(), SourceError> {
        self.tx.send(ev).await.map_err(|_| SourceError::Closed)
    }
}

/// Channel-backed [`LifecycleSource`].
pub struct ChannelSource<O> {
    existing: Option<Vec<O>>,
    rx: mpsc::Receiver<LifecycleEvent<O>>,
    selector: LabelSelector,
}

impl<O> ChannelSource<O> {
    /// Creates a source seeded with `existing` objects and a feed of `capacity` events.
    pub fn new(existing: Vec<O>, capacity: usize) -> (Self, ChannelSourceHandle<O>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let source = Self {
            existing: Some(existing),
            rx,
            selector: LabelSelector::new(),
        };
        (source, ChannelSourceHandle { tx })
    }
}

impl<O: Labeled> ChannelSource<O> {
    /// Applies the selector to `ev`, rewriting updates that enter or leave it.
    fn select(&self, ev: LifecycleEvent<O>) -> Option<LifecycleEvent<O>> {
        let matches = |obj: &O| self.selector.matches(obj.labels());
        match ev {
            LifecycleEvent::Added(obj) => matches(&obj).then_some(LifecycleEvent::Added(obj)),
            LifecycleEvent::Deleted(obj) => matches(&obj).then_some(LifecycleEvent::Deleted(obj)),
            LifecycleEvent::Updated { old, new } => match (matches(&old), matches(&new)) {
                (true, true) => Some(LifecycleEvent::Updated { old, new }),
                (true, false) => Some(LifecycleEvent::Deleted(old)),
                (false, true) => Some(LifecycleEvent::Added(new)),
                (false, false) => None,
            },
        }
    }
}

#[async_trait]
impl<O> LifecycleSource<O> for ChannelSource<O>
where
    O: Labeled + Send + Sync + 'static,
{
    async fn list(&mut self, selector: &LabelSelector) -> Result<Vec<O>, SourceError> {
        let existing = self.existing.take().ok_or(SourceError::Closed)?;
        self.selector = selector.clone();
        Ok(existing
            .into_iter()
            .filter(|obj| selector.matches(obj.labels()))
            .collect())
    }

    async fn next(&mut self) -> Option<LifecycleEvent<O>> {
        loop {
            let ev = self.rx.recv().await?;
            if let Some(ev) = self.select(ev) {
                return Some(ev);
            }
        }
    }
}
