//! Background reply poller for stage 3.
//!
//! While the offer-acceptance view is open and the candidate has not
//! answered, this task asks the backend for a reply, immediately on
//! entry, then at a fixed cadence. A terminal reply is persisted, the
//! view is notified, and the task exits on its own. Everything else
//! (network failures, backend messages, non-terminal replies) is
//! swallowed and retried next tick.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::record::MailReply;
use crate::store::RecordStore;

/// Event emitted to the view layer by a poller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollEvent {
    /// A terminal reply was received and persisted.
    ReplyReceived(MailReply),
}

/// Handle to a running reply poller. Dropping it stops the poll loop;
/// in-flight requests are abandoned.
pub struct ReplyPoller {
    handle: JoinHandle<()>,
    shutdown: Arc<AtomicBool>,
}

impl ReplyPoller {
    /// Stop polling. No further requests are initiated after this.
    pub fn stop(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for ReplyPoller {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Spawn a poller for one record's offer reply.
///
/// The first check happens immediately; subsequent checks every
/// `interval`. On a terminal reply the poller persists it via
/// `set_mail_reply`, emits [`PollEvent::ReplyReceived`], and stops.
pub fn spawn_reply_poller(
    store: Arc<dyn RecordStore>,
    record_id: String,
    interval: Duration,
    events: mpsc::UnboundedSender<PollEvent>,
) -> ReplyPoller {
    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&shutdown);

    let handle = tokio::spawn(async move {
        debug!(record_id = %record_id, "Reply poller started");
        let mut tick = tokio::time::interval(interval);

        loop {
            tick.tick().await;

            if flag.load(Ordering::Relaxed) {
                debug!(record_id = %record_id, "Reply poller shutting down");
                return;
            }

            match store.check_email(&record_id).await {
                Ok(Some(reply)) if reply.is_terminal() => {
                    match store.set_mail_reply(&record_id, reply).await {
                        Ok(()) => {
                            info!(record_id = %record_id, reply = %reply.as_str(), "Offer reply received");
                            let _ = events.send(PollEvent::ReplyReceived(reply));
                            return;
                        }
                        Err(e) => {
                            // Persist failed; keep the reply unclaimed and retry.
                            debug!(record_id = %record_id, "Failed to persist reply: {e}");
                        }
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    debug!(record_id = %record_id, "Reply poll failed: {e}");
                }
            }
        }
    });

    ReplyPoller { handle, shutdown }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::OnboardingRecord;
    use crate::store::fake::FakeStore;

    const TICK: Duration = Duration::from_millis(10);

    fn seeded_store() -> (Arc<FakeStore>, String) {
        let store = Arc::new(FakeStore::new());
        let id = store.seed(OnboardingRecord {
            id: "rec-1".into(),
            ..Default::default()
        });
        (store, id)
    }

    #[tokio::test]
    async fn terminal_reply_is_persisted_and_stops_poller() {
        let (store, id) = seeded_store();
        *store.email_reply.lock().unwrap() = Some(MailReply::Yes);

        let (tx, mut rx) = mpsc::unbounded_channel();
        let poller = spawn_reply_poller(store.clone() as Arc<dyn RecordStore>, id.clone(), TICK, tx);

        let event = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("poller should emit within the timeout")
            .expect("channel open");
        assert_eq!(event, PollEvent::ReplyReceived(MailReply::Yes));

        // Persisted exactly once, on the immediate first check.
        assert_eq!(store.call_count("set_mail_reply"), 1);
        assert_eq!(store.call_count("check_email"), 1);
        let record = store.records.lock().unwrap()[0].clone();
        assert_eq!(record.mail_reply, MailReply::Yes);

        tokio::time::sleep(TICK * 3).await;
        assert!(poller.is_finished());
        assert_eq!(store.call_count("check_email"), 1);
    }

    #[tokio::test]
    async fn errors_are_swallowed_and_retried() {
        let (store, id) = seeded_store();
        *store.fail_with.lock().unwrap() = Some("backend down".into());

        let (tx, mut rx) = mpsc::unbounded_channel();
        let _poller =
            spawn_reply_poller(store.clone() as Arc<dyn RecordStore>, id.clone(), TICK, tx);

        tokio::time::sleep(TICK * 5).await;
        assert!(store.call_count("check_email") >= 2, "should keep retrying");

        // Backend recovers; next tick picks up the reply.
        *store.fail_with.lock().unwrap() = None;
        *store.email_reply.lock().unwrap() = Some(MailReply::No);

        let event = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("poller should emit after recovery")
            .expect("channel open");
        assert_eq!(event, PollEvent::ReplyReceived(MailReply::No));
    }

    #[tokio::test]
    async fn stop_halts_requests() {
        let (store, id) = seeded_store();

        let (tx, _rx) = mpsc::unbounded_channel();
        let poller = spawn_reply_poller(store.clone() as Arc<dyn RecordStore>, id, TICK, tx);

        tokio::time::sleep(TICK * 3).await;
        poller.stop();
        let after_stop = store.call_count("check_email");

        tokio::time::sleep(TICK * 5).await;
        assert_eq!(store.call_count("check_email"), after_stop);
        assert!(poller.is_finished());
    }

    #[tokio::test]
    async fn pending_reply_keeps_polling() {
        let (store, id) = seeded_store();
        *store.email_reply.lock().unwrap() = Some(MailReply::Pending);

        let (tx, mut rx) = mpsc::unbounded_channel();
        let _poller = spawn_reply_poller(store.clone() as Arc<dyn RecordStore>, id, TICK, tx);

        tokio::time::sleep(TICK * 5).await;
        assert!(store.call_count("check_email") >= 2);
        assert_eq!(store.call_count("set_mail_reply"), 0);
        assert!(rx.try_recv().is_err());
    }
}
