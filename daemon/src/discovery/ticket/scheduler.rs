//! Requester side of ticket admission: resending tickets once their wait time
//! is over.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use log::{debug, trace};

use disco_common::tokio::{
    spawn_task,
    sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender},
    time::sleep,
    JoinHandle,
};

use super::message::TicketMessage;
use crate::discovery::topic::Topic;

/// A ticket due for redemption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketResend {
    pub topic: Topic,
    pub request_id: Vec<u8>,
    pub ticket: Vec<u8>,
}

struct PendingResend {
    id: u64,
    handle: JoinHandle<()>,
}

type PendingMap = Arc<Mutex<HashMap<Topic, PendingResend>>>;

fn lock(pending: &PendingMap) -> MutexGuard<'_, HashMap<Topic, PendingResend>> {
    pending.lock().unwrap_or_else(|e| e.into_inner())
}

/// One resend timer per topic.
///
/// Each timer fires at most once, never before the ticket's wait time, and
/// delivers the ticket bytes unchanged on the channel returned by
/// [`TicketScheduler::new`].
pub struct TicketScheduler {
    pending: PendingMap,
    next_id: AtomicU64,
    sender: UnboundedSender<TicketResend>,
}

impl TicketScheduler {
    pub fn new() -> (Self, UnboundedReceiver<TicketResend>) {
        let (sender, receiver) = unbounded_channel();
        let scheduler = Self {
            pending: Arc::new(Mutex::new(HashMap::new())),
            next_id: AtomicU64::new(0),
            sender,
        };
        (scheduler, receiver)
    }

    /// Schedule the resend of `message` for `topic`, replacing any pending
    /// resend for that topic.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule(&self, topic: Topic, message: TicketMessage) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let wait = Duration::from_millis(message.wait_time);

        // held until the entry is inserted so the timer can't fire before
        let mut pending = lock(&self.pending);

        let handle = {
            let shared = Arc::clone(&self.pending);
            let sender = self.sender.clone();
            let topic = topic.clone();
            spawn_task("ticket-resend", async move {
                sleep(wait).await;

                let due = {
                    let mut pending = lock(&shared);
                    match pending.get(&topic) {
                        Some(entry) if entry.id == id => {
                            pending.remove(&topic);
                            true
                        }
                        _ => false,
                    }
                };
                if !due {
                    return;
                }

                if log::log_enabled!(log::Level::Debug) {
                    debug!("Resending ticket for topic {}", topic);
                }
                let resend = TicketResend {
                    topic,
                    request_id: message.request_id,
                    ticket: message.ticket,
                };
                if sender.send(resend).is_err() && log::log_enabled!(log::Level::Trace) {
                    trace!("Ticket resend receiver dropped");
                }
            })
        };

        if let Some(previous) = pending.insert(topic, PendingResend { id, handle }) {
            previous.handle.abort();
        }
    }

    /// Cancel the pending resend for `topic`.
    pub fn cancel(&self, topic: &Topic) -> bool {
        match lock(&self.pending).remove(topic) {
            Some(entry) => {
                entry.handle.abort();
                true
            }
            None => false,
        }
    }

    /// Cancel every pending resend.
    pub fn cancel_all(&self) {
        for (_, entry) in lock(&self.pending).drain() {
            entry.handle.abort();
        }
    }

    /// Number of topics with a pending resend.
    pub fn pending(&self) -> usize {
        lock(&self.pending).len()
    }

    pub fn is_pending(&self, topic: &Topic) -> bool {
        lock(&self.pending).contains_key(topic)
    }
}

impl Drop for TicketScheduler {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{timeout, Instant};

    fn message(ticket: u8, wait_time: u64) -> TicketMessage {
        TicketMessage::new(b"R1".to_vec(), vec![ticket; 32], wait_time)
    }

    fn topic() -> Topic {
        Topic::new("a1b2").unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_resend_after_wait_time() {
        let (scheduler, mut receiver) = TicketScheduler::new();
        let start = Instant::now();
        scheduler.schedule(topic(), message(1, 500));
        assert!(scheduler.is_pending(&topic()));

        let resend = receiver.recv().await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(500));
        assert_eq!(resend.topic, topic());
        assert_eq!(resend.request_id, b"R1");
        assert_eq!(resend.ticket, vec![1; 32]);
        assert_eq!(scheduler.pending(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fires_once() {
        let (scheduler, mut receiver) = TicketScheduler::new();
        scheduler.schedule(topic(), message(1, 100));

        assert!(receiver.recv().await.is_some());
        assert!(timeout(Duration::from_secs(60), receiver.recv()).await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel() {
        let (scheduler, mut receiver) = TicketScheduler::new();
        scheduler.schedule(topic(), message(1, 500));

        assert!(scheduler.cancel(&topic()));
        assert!(!scheduler.cancel(&topic()));
        assert!(timeout(Duration::from_secs(60), receiver.recv()).await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reschedule_replaces() {
        let (scheduler, mut receiver) = TicketScheduler::new();
        let start = Instant::now();
        scheduler.schedule(topic(), message(1, 500));
        scheduler.schedule(topic(), message(2, 1_000));
        assert_eq!(scheduler.pending(), 1);

        let resend = receiver.recv().await.unwrap();
        assert_eq!(resend.ticket, vec![2; 32]);
        assert!(start.elapsed() >= Duration::from_millis(1_000));
        assert!(timeout(Duration::from_secs(60), receiver.recv()).await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_topics_are_independent() {
        let (scheduler, mut receiver) = TicketScheduler::new();
        let other = Topic::new("ff").unwrap();
        scheduler.schedule(topic(), message(1, 1_000));
        scheduler.schedule(other.clone(), message(2, 200));

        assert_eq!(receiver.recv().await.unwrap().topic, other);
        assert_eq!(receiver.recv().await.unwrap().topic, topic());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_all_and_drop() {
        let (scheduler, mut receiver) = TicketScheduler::new();
        scheduler.schedule(topic(), message(1, 500));
        scheduler.schedule(Topic::new("ff").unwrap(), message(2, 500));
        scheduler.cancel_all();
        assert_eq!(scheduler.pending(), 0);

        scheduler.schedule(topic(), message(3, 500));
        drop(scheduler);
        // every sender is gone once the aborted timers are dropped
        assert_eq!(timeout(Duration::from_secs(60), receiver.recv()).await, Ok(None));
    }
}
