//! Background refresh of a comment listing.
//!
//! A view that shows comments keeps them fresh by re-running its listing
//! query on an interval. [`CommentPoller::spawn`] starts that loop as a
//! tokio task and returns a [`PollHandle`]; the task lives exactly as long
//! as the handle. Each refresh is published on a `watch` channel, so
//! subscribers only ever see the latest snapshot.

use std::sync::Arc;
use std::time::Duration;

use advocacy_commons::{Comment, CommentListing, ParentRef};
use advocacy_commons_store_api::{ContentStore, DocumentQuery};
use chrono::{DateTime, Utc};
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::comments::{decode_comments, listing_query};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// One refresh of a comment listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommentSnapshot {
    pub comments: Vec<Comment>,
    /// Set when the refresh failed; `comments` is then empty.
    pub error: Option<String>,
    /// `None` until the first refresh completes.
    pub refreshed_at: Option<DateTime<Utc>>,
}

/// Configures a polling loop over one listing.
pub struct CommentPoller {
    store: Arc<dyn ContentStore>,
    query: DocumentQuery,
    interval: Duration,
}

impl CommentPoller {
    pub fn new(store: Arc<dyn ContentStore>, parent: &ParentRef, listing: CommentListing) -> Self {
        Self {
            store,
            query: listing_query(parent, listing),
            interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Start polling. The first refresh runs immediately.
    pub fn spawn(self) -> PollHandle {
        let (tx, rx) = watch::channel(CommentSnapshot::default());
        let (stop_tx, stop_rx) = oneshot::channel();
        let task = tokio::spawn(self.run(tx, stop_rx));
        PollHandle {
            updates: rx,
            stop: Some(stop_tx),
            task,
        }
    }

    async fn run(self, tx: watch::Sender<CommentSnapshot>, mut stop: oneshot::Receiver<()>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = &mut stop => break,
                _ = ticker.tick() => {}
            }

            let snapshot = match self.store.query(&self.query).await {
                Ok(docs) => CommentSnapshot {
                    comments: decode_comments(docs),
                    error: None,
                    refreshed_at: Some(Utc::now()),
                },
                Err(e) => {
                    warn!("comment refresh failed: {e}");
                    CommentSnapshot {
                        comments: Vec::new(),
                        error: Some(e.to_string()),
                        refreshed_at: Some(Utc::now()),
                    }
                }
            };

            if tx.send(snapshot).is_err() {
                // Every receiver is gone.
                break;
            }
        }
        debug!("comment poller stopped");
    }
}

/// Owns a running poll task. Dropping the handle cancels the task.
pub struct PollHandle {
    updates: watch::Receiver<CommentSnapshot>,
    stop: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl PollHandle {
    /// A receiver that is notified on every refresh.
    pub fn subscribe(&self) -> watch::Receiver<CommentSnapshot> {
        self.updates.clone()
    }

    /// The most recent snapshot.
    pub fn latest(&self) -> CommentSnapshot {
        self.updates.borrow().clone()
    }

    /// Wait for the next refresh and return it. `None` once the task ended.
    pub async fn next(&mut self) -> Option<CommentSnapshot> {
        self.updates.changed().await.ok()?;
        Some(self.updates.borrow_and_update().clone())
    }

    /// Stop polling and wait for the task to finish.
    pub async fn stop(mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        let _ = (&mut self.task).await;
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
