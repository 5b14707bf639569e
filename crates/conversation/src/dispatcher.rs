//! Dispatcher: pumps a channel's inbound messages through the controller.
//!
//! Every message gets its own task. Tasks for the same user are chained so
//! they reach the controller in arrival order; tasks for different users run
//! concurrently.

use crate::controller::SessionController;
use crate::input::Input;
use gymbot_core::channel::{Channel, ChannelMessage, Reply};
use gymbot_core::error::{ChannelError, Error};
use gymbot_core::schedule::UserId;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

pub const STORAGE_FAILURE_TEXT: &str =
    "⚠️ Could not access your schedule right now. Please send that again.";

/// Completion signal of the latest queued task per user.
type Tails = HashMap<UserId, oneshot::Receiver<()>>;

pub struct Dispatcher {
    controller: Arc<SessionController>,
}

impl Dispatcher {
    pub fn new(controller: Arc<SessionController>) -> Self {
        Self { controller }
    }

    /// Run until the channel's message stream ends, wait for every
    /// in-flight message to finish, then stop the channel.
    pub async fn run(&self, channel: Arc<dyn Channel>) -> Result<(), ChannelError> {
        let mut rx = channel.start().await?;
        info!(channel = channel.name(), "Dispatcher started");

        let mut tails = Tails::new();
        let mut tasks = JoinSet::new();

        while let Some(incoming) = rx.recv().await {
            let msg = match incoming {
                Ok(msg) => msg,
                Err(ChannelError::ConnectionLost(reason)) => {
                    warn!(channel = channel.name(), %reason, "Channel closed");
                    break;
                }
                Err(e) => {
                    warn!(channel = channel.name(), error = %e, "Dropping bad update");
                    continue;
                }
            };

            if !channel.is_allowed(msg.sender_id) {
                warn!(
                    channel = channel.name(),
                    sender = %msg.sender_id,
                    "Ignoring message from unauthorized sender"
                );
                continue;
            }

            let mut reaped = false;
            while let Some(result) = tasks.try_join_next() {
                log_join(result);
                reaped = true;
            }
            if reaped {
                prune_finished(&mut tails);
            }

            let (done_tx, done_rx) = oneshot::channel();
            let previous = tails.insert(msg.sender_id, done_rx);
            let controller = self.controller.clone();
            let channel = channel.clone();

            tasks.spawn(async move {
                if let Some(previous) = previous {
                    // Err only means the previous task ended without signalling
                    let _ = previous.await;
                }
                Self::process(&controller, channel.as_ref(), msg).await;
                let _ = done_tx.send(());
            });
        }

        info!(
            channel = channel.name(),
            pending = tasks.len(),
            "Dispatcher draining"
        );
        while let Some(result) = tasks.join_next().await {
            log_join(result);
        }

        info!(channel = channel.name(), "Dispatcher stopping");
        channel.stop().await
    }

    /// Handle one message and deliver the reply. Returns what was sent.
    pub async fn process(
        controller: &SessionController,
        channel: &dyn Channel,
        msg: ChannelMessage,
    ) -> Option<Reply> {
        let input = Input::resolve(&msg.content, msg.is_command);
        let reply = match controller.handle(msg.sender_id, input).await {
            Ok(reply) => reply,
            Err(Error::Store(e)) => {
                error!(user = %msg.sender_id, error = %e, "Schedule storage failed");
                Reply::text(STORAGE_FAILURE_TEXT)
            }
        };

        if let Err(e) = channel.send(&msg.chat_id, &reply).await {
            warn!(chat_id = %msg.chat_id, error = %e, "Failed to deliver reply");
            return None;
        }
        Some(reply)
    }
}

fn log_join(result: Result<(), tokio::task::JoinError>) {
    if let Err(e) = result {
        error!(error = %e, "Message task failed");
    }
}

/// Drop chain entries whose task has already finished.
fn prune_finished(tails: &mut Tails) {
    tails.retain(|_, done| matches!(done.try_recv(), Err(TryRecvError::Empty)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::Formatter;
    use crate::menu;
    use async_trait::async_trait;
    use gymbot_core::channel::ChannelId;
    use gymbot_core::error::StoreError;
    use gymbot_core::schedule::{UserSchedule, Weekday};
    use gymbot_core::store::ScheduleStore;
    use gymbot_store::InMemoryStore;
    use std::time::Duration;
    use tokio::sync::{Mutex, mpsc};

    /// Channel fed from a vector of messages, recording every reply.
    struct ScriptedChannel {
        id: ChannelId,
        script: Mutex<Vec<ChannelMessage>>,
        sent: Arc<Mutex<Vec<(String, Reply)>>>,
        blocked: Option<UserId>,
    }

    impl ScriptedChannel {
        fn new(script: Vec<ChannelMessage>) -> Self {
            Self {
                id: ChannelId("scripted".into()),
                script: Mutex::new(script),
                sent: Arc::new(Mutex::new(Vec::new())),
                blocked: None,
            }
        }
    }

    #[async_trait]
    impl Channel for ScriptedChannel {
        fn name(&self) -> &str {
            "scripted"
        }

        fn id(&self) -> &ChannelId {
            &self.id
        }

        async fn start(
            &self,
        ) -> Result<mpsc::Receiver<Result<ChannelMessage, ChannelError>>, ChannelError> {
            let (tx, rx) = mpsc::channel(64);
            for msg in self.script.lock().await.drain(..) {
                tx.send(Ok(msg)).await.unwrap();
            }
            Ok(rx)
        }

        async fn send(&self, chat_id: &str, reply: &Reply) -> Result<(), ChannelError> {
            self.sent
                .lock()
                .await
                .push((chat_id.to_string(), reply.clone()));
            Ok(())
        }

        fn is_allowed(&self, sender_id: UserId) -> bool {
            self.blocked != Some(sender_id)
        }
    }

    fn message(user: i64, content: &str) -> ChannelMessage {
        ChannelMessage {
            channel_id: ChannelId("scripted".into()),
            sender_id: UserId(user),
            sender_name: None,
            chat_id: format!("chat{user}"),
            content: content.into(),
            is_command: content.starts_with('/'),
        }
    }

    #[tokio::test]
    async fn same_user_messages_apply_in_order() {
        let store = Arc::new(InMemoryStore::new());
        let controller = Arc::new(SessionController::new(store.clone(), Formatter::default()));
        let dispatcher = Dispatcher::new(controller);

        let channel = Arc::new(ScriptedChannel::new(vec![
            message(1, menu::ADD_EXERCISE),
            message(1, "Tuesday"),
            message(1, "Bench press"),
            message(2, "/start"),
            message(1, "/add"),
            message(1, "Tuesday"),
            message(1, "Dips"),
        ]));
        let sent = channel.sent.clone();
        dispatcher.run(channel).await.unwrap();
        assert_eq!(sent.lock().await.len(), 7);

        let schedule = store.load(UserId(1)).await.unwrap();
        let names: Vec<_> = schedule
            .day(Weekday::Tuesday)
            .unwrap()
            .entries()
            .iter()
            .map(|e| e.name.clone())
            .collect();
        assert_eq!(names, vec!["Bench press", "Dips"]);
    }

    #[tokio::test]
    async fn unauthorized_sender_gets_no_reply() {
        let controller = Arc::new(SessionController::new(
            Arc::new(InMemoryStore::new()),
            Formatter::default(),
        ));
        let dispatcher = Dispatcher::new(controller);
        let mut channel = ScriptedChannel::new(vec![message(66, "/start")]);
        channel.blocked = Some(UserId(66));
        let channel = Arc::new(channel);
        let sent = channel.sent.clone();

        dispatcher.run(channel).await.unwrap();
        assert!(sent.lock().await.is_empty());
    }

    #[tokio::test]
    async fn process_sends_reply_to_chat() {
        let controller = SessionController::new(Arc::new(InMemoryStore::new()), Formatter::default());
        let channel = ScriptedChannel::new(vec![]);
        let reply = Dispatcher::process(&controller, &channel, message(5, "/schedule"))
            .await
            .unwrap();
        let sent = channel.sent.lock().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "chat5");
        assert_eq!(sent[0].1, reply);
        assert_eq!(reply.menu, menu::main_menu());
    }

    /// Store whose saves take a while to land.
    struct SlowStore {
        inner: InMemoryStore,
        delay: Duration,
    }

    #[async_trait]
    impl ScheduleStore for SlowStore {
        fn name(&self) -> &str {
            "slow"
        }

        async fn load(&self, user: UserId) -> Result<UserSchedule, StoreError> {
            self.inner.load(user).await
        }

        async fn save(&self, user: UserId, schedule: &UserSchedule) -> Result<(), StoreError> {
            tokio::time::sleep(self.delay).await;
            self.inner.save(user, schedule).await
        }
    }

    #[tokio::test]
    async fn run_waits_for_pending_saves() {
        let store = Arc::new(SlowStore {
            inner: InMemoryStore::new(),
            delay: Duration::from_millis(50),
        });
        let controller = Arc::new(SessionController::new(store.clone(), Formatter::default()));
        let dispatcher = Dispatcher::new(controller);

        let channel = Arc::new(ScriptedChannel::new(vec![
            message(5, "/add"),
            message(5, "Monday"),
            message(5, "Squat"),
            message(6, "/add"),
            message(6, "Friday"),
            message(6, "Row"),
        ]));
        let sent = channel.sent.clone();
        dispatcher.run(channel).await.unwrap();

        // No waiting here: the saves must already have landed
        assert_eq!(sent.lock().await.len(), 6);
        let monday = store.inner.load(UserId(5)).await.unwrap();
        assert_eq!(monday.day(Weekday::Monday).unwrap().entries()[0].name, "Squat");
        let friday = store.inner.load(UserId(6)).await.unwrap();
        assert_eq!(friday.day(Weekday::Friday).unwrap().entries()[0].name, "Row");
    }

    #[tokio::test]
    async fn finished_chain_entries_are_pruned() {
        let mut tails = Tails::new();

        let (done_tx, done_rx) = oneshot::channel();
        tails.insert(UserId(1), done_rx);
        let (_pending_tx, pending_rx) = oneshot::channel::<()>();
        tails.insert(UserId(2), pending_rx);
        let (dropped_tx, dropped_rx) = oneshot::channel::<()>();
        tails.insert(UserId(3), dropped_rx);

        done_tx.send(()).unwrap();
        drop(dropped_tx);
        prune_finished(&mut tails);

        assert_eq!(tails.len(), 1);
        assert!(tails.contains_key(&UserId(2)));
    }
}
