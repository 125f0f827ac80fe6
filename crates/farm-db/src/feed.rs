//! # Live Collection Feeds
//!
//! Full-collection snapshots pushed to subscribers after every change.
//!
//! ## How A Write Reaches Subscribers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  db.create_detail(..) ──► batch commit ──► refresh(details)            │
//! │                                               │                         │
//! │                                               ▼                         │
//! │                              SELECT * FROM details                      │
//! │                                               │                         │
//! │                                               ▼                         │
//! │                        watch::Sender<FeedState<Detail>>                 │
//! │                          │              │              │                │
//! │                          ▼              ▼              ▼                │
//! │                   Subscription   Subscription   Subscription            │
//! │                   (client A)     (client B)     (client C)             │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Delivery Guarantees
//! - Every subscriber eventually observes the latest collection
//! - Intermediate states may be skipped by a slow subscriber
//! - A client's own committed write is always followed by a refresh, so it
//!   shows up in that client's next snapshot

use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

use crate::batch::Collection;
use crate::error::{DbError, DbResult};

/// Latest known state of one collection.
#[derive(Debug, Clone)]
pub enum FeedState<T> {
    /// No load has completed yet.
    Pending,
    /// The full collection as of the last refresh.
    Items(Arc<Vec<T>>),
    /// The last refresh failed; carries the error message.
    Failed(String),
}

/// Publisher side of a collection feed.
#[derive(Debug)]
pub(crate) struct CollectionFeed<T> {
    collection: Collection,
    tx: watch::Sender<FeedState<T>>,
}

impl<T: Clone + PartialEq> CollectionFeed<T> {
    pub(crate) fn new(collection: Collection) -> Self {
        let (tx, _rx) = watch::channel(FeedState::Pending);
        CollectionFeed { collection, tx }
    }

    /// Publishes a freshly loaded collection.
    ///
    /// Subscribers are only woken when the content actually changed.
    pub(crate) fn publish(&self, items: Vec<T>) {
        let collection = self.collection;
        self.tx.send_if_modified(|state| {
            if let FeedState::Items(current) = state {
                if **current == items {
                    return false;
                }
            }
            debug!(collection = %collection, count = items.len(), "Publishing snapshot");
            *state = FeedState::Items(Arc::new(items));
            true
        });
    }

    /// Publishes a refresh failure.
    pub(crate) fn publish_error(&self, err: &DbError) {
        self.tx.send_replace(FeedState::Failed(err.to_string()));
    }

    /// Registers a new subscriber.
    pub(crate) fn subscribe(&self) -> Subscription<T> {
        Subscription {
            collection: self.collection,
            rx: self.tx.subscribe(),
            primed: false,
        }
    }

    /// Number of live subscriptions.
    pub(crate) fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// Handle to a live collection subscription.
///
/// Dropping the handle (or calling [`Subscription::unsubscribe`]) cancels it.
///
/// ## Usage
/// ```rust,ignore
/// let mut details = db.subscribe_details().await?;
/// while let Some(update) = details.next().await {
///     match update {
///         Ok(items) => render(&items),
///         Err(err) => report(err),
///     }
/// }
/// ```
#[derive(Debug)]
pub struct Subscription<T> {
    collection: Collection,
    rx: watch::Receiver<FeedState<T>>,
    primed: bool,
}

impl<T: Clone> Subscription<T> {
    /// Waits for the next snapshot.
    ///
    /// The first call returns the current collection immediately. Later
    /// calls wait for a change. Returns `None` once the store is gone.
    pub async fn next(&mut self) -> Option<DbResult<Arc<Vec<T>>>> {
        loop {
            if self.primed && self.rx.changed().await.is_err() {
                return None;
            }
            self.primed = true;

            let state = self.rx.borrow_and_update().clone();
            match state {
                FeedState::Pending => continue,
                FeedState::Items(items) => return Some(Ok(items)),
                FeedState::Failed(message) => {
                    return Some(Err(DbError::SubscriptionFailed {
                        collection: self.collection.to_string(),
                        message,
                    }))
                }
            }
        }
    }

    /// The collection this subscription follows.
    pub fn collection(&self) -> Collection {
        self.collection
    }

    /// Cancels the subscription.
    pub fn unsubscribe(self) {
        debug!(collection = %self.collection, "Unsubscribed");
    }
}
