//! Session controller: owns the per-user session table and drives the
//! state machine against the schedule store.
//!
//! Events for one user are serialized by that user's mutex, which is held
//! across the load → transition → save sequence. Different users never
//! contend beyond the brief table lookup.

use crate::format::Formatter;
use crate::input::Input;
use crate::machine::{self, Context, Outcome};
use crate::state::ConvState;
use chrono::Datelike;
use gymbot_core::channel::Reply;
use gymbot_core::error::Result;
use gymbot_core::schedule::{UserId, Weekday};
use gymbot_core::store::ScheduleStore;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

type Slot = Arc<Mutex<ConvState>>;

pub struct SessionController {
    store: Arc<dyn ScheduleStore>,
    formatter: Formatter,
    sessions: Mutex<HashMap<UserId, Slot>>,
    /// Pinned day for the "today" view; `None` uses the local calendar.
    today: Option<Weekday>,
}

impl SessionController {
    pub fn new(store: Arc<dyn ScheduleStore>, formatter: Formatter) -> Self {
        Self {
            store,
            formatter,
            sessions: Mutex::new(HashMap::new()),
            today: None,
        }
    }

    /// Pin the day used by the "today" view.
    pub fn with_today(mut self, day: Weekday) -> Self {
        self.today = Some(day);
        self
    }

    /// Handle one event for one user.
    ///
    /// On a storage failure the error is returned and the user's state is
    /// left exactly as it was, so resending the same input retries it.
    pub async fn handle(&self, user: UserId, input: Input) -> Result<Reply> {
        let slot = self.slot(user).await;
        let mut state = slot.lock().await;
        let result = self.step(user, &mut state, &input).await;
        drop(state);
        self.release(user, slot).await;
        result
    }

    async fn step(&self, user: UserId, state: &mut ConvState, input: &Input) -> Result<Reply> {
        let schedule = self.store.load(user).await?;
        let ctx = Context {
            schedule: &schedule,
            formatter: &self.formatter,
            today: self.today(),
        };
        let transition = machine::transition(state, input, &ctx);

        if let Some(updated) = &transition.write {
            self.store.save(user, updated).await?;
        }

        match &transition.outcome {
            Outcome::Rejected(reason) => {
                debug!(user = %user, state = state.name(), %reason, "Input rejected")
            }
            Outcome::Completed => info!(user = %user, from = state.name(), "Flow completed"),
            _ => debug!(
                user = %user,
                from = state.name(),
                to = transition.next.name(),
                "Transition"
            ),
        }

        *state = transition.next;
        Ok(transition.reply)
    }

    /// Current state of a user (Idle when no session exists).
    pub async fn state_of(&self, user: UserId) -> ConvState {
        let slot = self.sessions.lock().await.get(&user).cloned();
        match slot {
            Some(slot) => *slot.lock().await,
            None => ConvState::Idle,
        }
    }

    /// Number of users with a live session entry.
    pub async fn active_sessions(&self) -> usize {
        self.sessions.lock().await.len()
    }

    async fn slot(&self, user: UserId) -> Slot {
        self.sessions
            .lock()
            .await
            .entry(user)
            .or_default()
            .clone()
    }

    /// Evict an idle session nobody else is waiting on.
    async fn release(&self, user: UserId, slot: Slot) {
        let mut sessions = self.sessions.lock().await;
        // The table and `slot` are the only holders: no queued event for this user
        if Arc::strong_count(&slot) == 2 && slot.try_lock().is_ok_and(|state| state.is_idle()) {
            sessions.remove(&user);
        }
    }

    fn today(&self) -> Weekday {
        self.today.unwrap_or_else(|| {
            let offset = chrono::Local::now().weekday().num_days_from_monday();
            Weekday::from_monday_offset(offset).unwrap_or(Weekday::Monday)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Command;
    use crate::state::EditFlow;
    use async_trait::async_trait;
    use gymbot_core::error::{Error, StoreError};
    use gymbot_core::schedule::{ExerciseEntry, UserSchedule};
    use gymbot_store::InMemoryStore;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn controller() -> SessionController {
        SessionController::new(Arc::new(InMemoryStore::new()), Formatter::default())
    }

    fn cmd(c: Command) -> Input {
        Input::Command(c)
    }

    fn text(s: &str) -> Input {
        Input::Text(s.into())
    }

    /// Store whose saves can be made to fail.
    struct FlakyStore {
        inner: InMemoryStore,
        fail_saves: AtomicBool,
    }

    #[async_trait]
    impl ScheduleStore for FlakyStore {
        fn name(&self) -> &str {
            "flaky"
        }

        async fn load(&self, user: UserId) -> std::result::Result<UserSchedule, StoreError> {
            self.inner.load(user).await
        }

        async fn save(
            &self,
            user: UserId,
            schedule: &UserSchedule,
        ) -> std::result::Result<(), StoreError> {
            if self.fail_saves.load(Ordering::SeqCst) {
                return Err(StoreError::Io {
                    path: "flaky".into(),
                    reason: "disk full".into(),
                });
            }
            self.inner.save(user, schedule).await
        }
    }

    #[tokio::test]
    async fn session_created_and_evicted() {
        let ctl = controller();
        let user = UserId(10);
        assert_eq!(ctl.active_sessions().await, 0);

        ctl.handle(user, cmd(Command::AddExercise)).await.unwrap();
        assert_eq!(ctl.state_of(user).await, ConvState::AwaitingDay);
        assert_eq!(ctl.active_sessions().await, 1);

        ctl.handle(user, cmd(Command::Back)).await.unwrap();
        assert_eq!(ctl.state_of(user).await, ConvState::Idle);
        assert_eq!(ctl.active_sessions().await, 0);
    }

    #[tokio::test]
    async fn full_add_flow_persists() {
        let store = Arc::new(InMemoryStore::new());
        let ctl = SessionController::new(store.clone(), Formatter::default());
        let user = UserId(11);

        ctl.handle(user, cmd(Command::AddExercise)).await.unwrap();
        ctl.handle(user, text("Wednesday")).await.unwrap();
        let reply = ctl.handle(user, text("Pull-ups")).await.unwrap();
        assert!(reply.text.contains("Pull-ups"));

        let saved = store.load(user).await.unwrap();
        assert_eq!(saved.day(Weekday::Wednesday).unwrap().len(), 1);
        assert_eq!(ctl.active_sessions().await, 0);
    }

    #[tokio::test]
    async fn users_do_not_share_sessions() {
        let ctl = controller();
        ctl.handle(UserId(1), cmd(Command::AddExercise)).await.unwrap();
        ctl.handle(UserId(2), text("Monday")).await.unwrap();
        assert_eq!(ctl.state_of(UserId(1)).await, ConvState::AwaitingDay);
        assert_eq!(ctl.state_of(UserId(2)).await, ConvState::Idle);
    }

    #[tokio::test]
    async fn failed_save_keeps_state_for_retry() {
        let store = Arc::new(FlakyStore {
            inner: InMemoryStore::new(),
            fail_saves: AtomicBool::new(true),
        });
        let ctl = SessionController::new(store.clone(), Formatter::default());
        let user = UserId(12);

        ctl.handle(user, cmd(Command::AddExercise)).await.unwrap();
        ctl.handle(user, text("Friday")).await.unwrap();

        let err = ctl.handle(user, text("Deadlift")).await.unwrap_err();
        assert!(matches!(err, Error::Store(_)));
        assert_eq!(
            ctl.state_of(user).await,
            ConvState::AwaitingExercise { day: Weekday::Friday }
        );

        store.fail_saves.store(false, Ordering::SeqCst);
        ctl.handle(user, text("Deadlift")).await.unwrap();
        assert_eq!(ctl.state_of(user).await, ConvState::Idle);
        assert_eq!(
            store.load(user).await.unwrap().day(Weekday::Friday).unwrap().len(),
            1
        );
    }

    #[tokio::test]
    async fn concurrent_users_are_isolated() {
        let store = Arc::new(InMemoryStore::new());
        let ctl = Arc::new(SessionController::new(store.clone(), Formatter::default()));

        let mut handles = Vec::new();
        for id in 0..8 {
            let ctl = ctl.clone();
            handles.push(tokio::spawn(async move {
                let user = UserId(id);
                ctl.handle(user, cmd(Command::AddExercise)).await.unwrap();
                ctl.handle(user, text("Saturday")).await.unwrap();
                ctl.handle(user, text(&format!("Exercise {id}"))).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        for id in 0..8 {
            let schedule = store.load(UserId(id)).await.unwrap();
            let entries = schedule.day(Weekday::Saturday).unwrap().entries();
            assert_eq!(entries.len(), 1);
            assert_eq!(entries[0].name, format!("Exercise {id}"));
        }
        assert_eq!(ctl.active_sessions().await, 0);
    }

    #[tokio::test]
    async fn restart_mid_flow_resets() {
        let store = Arc::new(InMemoryStore::new());
        let mut schedule = UserSchedule::new();
        schedule.add_entry(Weekday::Monday, ExerciseEntry::new("Squat").unwrap());
        store.save(UserId(3), &schedule).await.unwrap();

        let ctl = SessionController::new(store, Formatter::default());
        ctl.handle(UserId(3), cmd(Command::DeleteExercise)).await.unwrap();
        assert_eq!(
            ctl.state_of(UserId(3)).await,
            ConvState::AwaitingEditDay { flow: EditFlow::Delete }
        );
        ctl.handle(UserId(3), cmd(Command::AddWeight)).await.unwrap();
        assert_eq!(
            ctl.state_of(UserId(3)).await,
            ConvState::AwaitingEditDay { flow: EditFlow::Weight }
        );
    }

    #[tokio::test]
    async fn pinned_today() {
        let store = Arc::new(InMemoryStore::new());
        let mut schedule = UserSchedule::new();
        schedule.add_entry(Weekday::Sunday, ExerciseEntry::new("Long run").unwrap());
        store.save(UserId(4), &schedule).await.unwrap();

        let ctl = SessionController::new(store, Formatter::default()).with_today(Weekday::Sunday);
        let reply = ctl.handle(UserId(4), cmd(Command::ShowToday)).await.unwrap();
        assert!(reply.text.contains("Long run"));
    }
}
