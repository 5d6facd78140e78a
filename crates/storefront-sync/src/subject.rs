//! # Snapshot Subjects
//!
//! Push-based streams of immutable snapshots with replay of the latest value.
//!
//! ## Publication Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         SnapshotSubject<T>                              │
//! │                                                                         │
//! │   owner ──publish(v)──► ┌──────────────────────────────┐                │
//! │                         │ latest: Arc<T>   (one lock)  │                │
//! │                         │ queues: [mpsc<Arc<T>>; n]    │                │
//! │                         └──────────────┬───────────────┘                │
//! │                                        │ every publication, in order    │
//! │                  ┌─────────────────────┼─────────────────────┐          │
//! │                  ▼                     ▼                     ▼          │
//! │           Subscription #1       Subscription #2       Subscription #3   │
//! │           replay(latest)        replay(latest)        replay(latest)    │
//! │           then v1, v2, ...      then v2, ...          then ...          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `subscribe` captures the latest value and registers its queue under the
//! same lock that `publish` holds while it sends, so a subscriber never
//! misses or duplicates the publication that races with its subscription.
//!
//! Each subscription owns an unbounded queue of `Arc` pointers. A slow
//! subscriber never loses a snapshot; it only holds on to more of them.
//! Queues whose subscription was dropped are pruned on the next publish.

use std::sync::{Arc, Mutex, MutexGuard};

use futures_util::Stream;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_stream::StreamExt;
use tracing::trace;

#[derive(Debug)]
struct State<T> {
    latest: Arc<T>,
    subscribers: Vec<UnboundedSender<Arc<T>>>,
}

/// Publisher side: owns the latest snapshot.
#[derive(Debug)]
pub struct SnapshotSubject<T> {
    state: Mutex<State<T>>,
}

impl<T> SnapshotSubject<T>
where
    T: Send + Sync + 'static,
{
    /// Creates a subject holding `initial`.
    pub fn new(initial: T) -> Self {
        SnapshotSubject {
            state: Mutex::new(State {
                latest: Arc::new(initial),
                subscribers: Vec::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State<T>> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// The most recently published snapshot.
    pub fn current(&self) -> Arc<T> {
        Arc::clone(&self.lock().latest)
    }

    /// Replaces the snapshot and pushes it to every subscriber.
    pub fn publish(&self, value: T) -> Arc<T> {
        let mut state = self.lock();
        Self::store_and_send(&mut state, Arc::new(value))
    }

    /// Derives the next snapshot from the current one and publishes it,
    /// atomically with respect to other publishers.
    pub fn publish_with<F>(&self, next: F) -> Arc<T>
    where
        F: FnOnce(&T) -> T,
    {
        let mut state = self.lock();
        let value = Arc::new(next(&state.latest));
        Self::store_and_send(&mut state, value)
    }

    fn store_and_send(state: &mut State<T>, value: Arc<T>) -> Arc<T> {
        state.latest = Arc::clone(&value);

        let before = state.subscribers.len();
        state
            .subscribers
            .retain(|queue| queue.send(Arc::clone(&value)).is_ok());

        let pruned = before - state.subscribers.len();
        if pruned > 0 {
            trace!(pruned, remaining = state.subscribers.len(), "Pruned closed snapshot subscriptions");
        }
        value
    }

    /// Opens a subscription that first replays the current snapshot.
    pub fn subscribe(&self) -> Subscription<T> {
        let mut state = self.lock();
        let (queue, receiver) = mpsc::unbounded_channel();
        state.subscribers.push(queue);

        Subscription {
            current: Arc::clone(&state.latest),
            replay: Some(Arc::clone(&state.latest)),
            receiver,
        }
    }

    /// Number of open subscriptions.
    pub fn subscriber_count(&self) -> usize {
        let mut state = self.lock();
        state.subscribers.retain(|queue| !queue.is_closed());
        state.subscribers.len()
    }
}

/// Subscriber side of a [`SnapshotSubject`].
#[derive(Debug)]
pub struct Subscription<T> {
    current: Arc<T>,
    replay: Option<Arc<T>>,
    receiver: UnboundedReceiver<Arc<T>>,
}

impl<T> Subscription<T>
where
    T: Send + Sync + 'static,
{
    /// The snapshot most recently returned by [`Subscription::next`], or
    /// the one captured when subscribing.
    pub fn current(&self) -> Arc<T> {
        Arc::clone(&self.current)
    }

    /// Next snapshot: the replayed one first, then every publication in
    /// order. `None` once the subject has been dropped and the queue drained.
    pub async fn next(&mut self) -> Option<Arc<T>> {
        if let Some(replayed) = self.replay.take() {
            return Some(replayed);
        }

        let value = self.receiver.recv().await?;
        self.current = Arc::clone(&value);
        Some(value)
    }

    /// Adapts the subscription into a [`Stream`].
    pub fn into_stream(self) -> impl Stream<Item = Arc<T>> + Send + 'static {
        let updates = UnboundedReceiverStream::new(self.receiver);
        tokio_stream::iter(self.replay).chain(updates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_replays_latest_to_new_subscriber() {
        let subject = SnapshotSubject::new(vec![1]);
        subject.publish(vec![1, 2]);

        let mut sub = subject.subscribe();
        assert_eq!(*sub.current(), vec![1, 2]);
        assert_eq!(*sub.next().await.unwrap(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_every_subscriber_sees_every_publication_in_order() {
        let subject = SnapshotSubject::new(0u32);
        let mut first = subject.subscribe();
        let mut second = subject.subscribe();

        for value in 1..=5 {
            subject.publish(value);
        }

        for sub in [&mut first, &mut second] {
            let mut seen = Vec::new();
            for _ in 0..6 {
                seen.push(*sub.next().await.unwrap());
            }
            assert_eq!(seen, vec![0, 1, 2, 3, 4, 5]);
        }
    }

    #[tokio::test]
    async fn test_publish_with_derives_from_current() {
        let subject = SnapshotSubject::new(vec!["a"]);
        subject.publish_with(|current| {
            let mut next = current.clone();
            next.push("b");
            next
        });
        assert_eq!(*subject.current(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_slow_subscriber_receives_every_snapshot() {
        let subject = SnapshotSubject::new(0u32);
        let mut sub = subject.subscribe();
        assert_eq!(*sub.next().await.unwrap(), 0);

        for value in 1..=1_000 {
            subject.publish(value);
        }

        for expected in 1..=1_000 {
            assert_eq!(*sub.next().await.unwrap(), expected);
        }
        assert_eq!(*sub.current(), 1_000);
    }

    #[tokio::test]
    async fn test_dropped_subscriptions_are_pruned() {
        let subject = SnapshotSubject::new(0u8);
        let kept = subject.subscribe();
        let dropped = subject.subscribe();
        assert_eq!(subject.subscriber_count(), 2);

        drop(dropped);
        subject.publish(1);

        assert_eq!(subject.subscriber_count(), 1);
        drop(kept);
        assert_eq!(subject.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_queued_snapshots_survive_subject_drop() {
        let subject = SnapshotSubject::new(1u8);
        let mut sub = subject.subscribe();
        subject.publish(2);
        drop(subject);

        assert_eq!(sub.next().await.map(|v| *v), Some(1));
        assert_eq!(sub.next().await.map(|v| *v), Some(2));
        assert!(sub.next().await.is_none());
    }

    #[tokio::test]
    async fn test_into_stream_replays_then_follows() {
        let subject = SnapshotSubject::new(String::from("a"));
        let stream = subject.subscribe().into_stream();
        subject.publish("b".into());
        drop(subject);

        let seen: Vec<String> = stream.map(|v| (*v).clone()).collect().await;
        assert_eq!(seen, vec!["a".to_string(), "b".to_string()]);
    }
}
