use super::GameEvent;
use crate::client::{ChannelHandler, CloseEvent};
use crate::game::GameStore;
use crate::types::{ChannelError, ChannelMessage};

type EventListener = Box<dyn FnMut(&GameEvent) + Send + 'static>;

/// Routes channel messages into an injected [`GameStore`].
///
/// Each message is interpreted as a [`GameEvent`], applied to the store, and
/// then handed to the optional listener.
pub struct GameEventRouter {
    store: GameStore,
    listener: Option<EventListener>,
}

impl GameEventRouter {
    pub fn new(store: GameStore) -> Self {
        Self {
            store,
            listener: None,
        }
    }

    /// Observe every event after it has been applied to the store
    pub fn with_listener<F>(mut self, listener: F) -> Self
    where
        F: FnMut(&GameEvent) + Send + 'static,
    {
        self.listener = Some(Box::new(listener));
        self
    }

    pub fn store(&self) -> &GameStore {
        &self.store
    }

    /// Routes a message to the store and listener
    pub fn route(&mut self, message: &ChannelMessage) {
        let event = match GameEvent::from_message(message) {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!("Dropping malformed '{}' event: {}", message.kind(), e);
                self.store.record_error(e.to_string());
                return;
            }
        };

        if let GameEvent::Unknown(kind) = &event {
            tracing::warn!("Unknown game event type: {}", kind);
        } else {
            tracing::debug!("Applying game event: {}", message.kind());
        }

        self.store.apply(&event);
        if let Some(listener) = self.listener.as_mut() {
            listener(&event);
        }
    }
}

impl ChannelHandler for GameEventRouter {
    fn on_message(&mut self, message: ChannelMessage) {
        self.route(&message);
    }

    fn on_open(&mut self) {
        tracing::debug!("Game channel open");
    }

    fn on_close(&mut self, event: CloseEvent) {
        if event.retries_exhausted {
            self.store
                .record_error("Connection to the game server was lost");
        }
    }

    fn on_error(&mut self, error: ChannelError) {
        tracing::warn!("Game channel error: {}", error);
        if matches!(
            error,
            ChannelError::Decode { .. } | ChannelError::RetryExhausted { .. }
        ) {
            self.store.record_error(error.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::RoomStatus;
    use std::sync::{Arc, Mutex};

    fn message(text: &str) -> ChannelMessage {
        ChannelMessage::decode(text).unwrap()
    }

    #[test]
    fn test_question_flow_updates_store() {
        let store = GameStore::new();
        let mut router = GameEventRouter::new(store.clone());

        router.on_message(message(
            r#"{"type":"game_started","payload":{"questions":[{"id":1},{"id":2}],"startAt":1000,"totalQuestions":2}}"#,
        ));
        router.on_message(message(
            r#"{"type":"next_question","payload":{"question":{"id":1},"timing":{"timePerQuestion":20,"questionEndAt":21000},"progress":{"current":1}}}"#,
        ));
        router.on_message(message(r#"{"type":"player_answered","playerId":"0xa","responseTime":1200}"#));
        router.on_message(message(
            r#"{"type":"answer_submitted","payload":{"isCorrect":true,"points":10,"totalScore":10}}"#,
        ));

        let state = store.snapshot();
        assert_eq!(state.room_status, RoomStatus::InProgress);
        assert_eq!(state.start_at, Some(1000));
        assert_eq!(state.questions.len(), 2);
        assert_eq!(state.question_number, Some(1));
        assert_eq!(state.question_end_at, Some(21000));
        assert_eq!(state.players["0xa"].status, "answered");
        assert_eq!(state.players["0xa"].response_time, Some(1200));
        assert!(state.last_answer.as_ref().unwrap().is_correct);
    }

    #[test]
    fn test_game_end_and_clear_cache() {
        let store = GameStore::new();
        let mut router = GameEventRouter::new(store.clone());

        router.on_message(message(
            r#"{"type":"question_result","payload":{"correctAnswer":"B","leaderboard":[{"walletId":"0xa","score":20}]}}"#,
        ));
        router.on_message(message(
            r#"{"type":"game_ended","payload":{"leaderboard":[{"walletId":"0xa","score":30}],"winner":{"walletId":"0xa"}}}"#,
        ));

        let state = store.snapshot();
        assert_eq!(state.room_status, RoomStatus::Finished);
        assert_eq!(state.winner_wallet.as_deref(), Some("0xa"));
        assert_eq!(state.players["0xa"].score, Some(20));
        assert_eq!(state.leaderboard[0].score, 30);

        router.on_message(message(r#"{"type":"clear_local_storage"}"#));
        assert!(store.snapshot().questions.is_empty());
    }

    #[test]
    fn test_room_status_drives_tie_break() {
        let store = GameStore::new();
        let mut router = GameEventRouter::new(store.clone());

        router.on_message(message(
            r#"{"type":"room_status","status":"sudden_death","data":{"sudden_death_activated":true,"message":"last one standing"}}"#,
        ));

        let state = store.snapshot();
        assert_eq!(state.room_status, RoomStatus::SuddenDeath);
        assert!(state.tie_break.is_sudden_death);
        assert_eq!(state.tie_break.message, "last one standing");
    }

    #[test]
    fn test_listener_sees_applied_events() {
        let store = GameStore::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_by_listener = Arc::clone(&seen);
        let listener_store = store.clone();
        let mut router = GameEventRouter::new(store).with_listener(move |event| {
            let stale = listener_store.read(|state| state.rooms_stale);
            seen_by_listener.lock().unwrap().push((event.clone(), stale));
        });

        router.on_message(message(r#"{"type":"room_update"}"#));

        assert_eq!(
            *seen.lock().unwrap(),
            vec![(GameEvent::RoomUpdate, true)]
        );
    }

    #[test]
    fn test_malformed_event_is_recorded_not_applied() {
        let store = GameStore::new();
        let mut router = GameEventRouter::new(store.clone());

        router.on_message(message(r#"{"type":"player_answered"}"#));

        let state = store.snapshot();
        assert!(state.players.is_empty());
        assert!(state.last_error.is_some());
    }

    #[test]
    fn test_kick_broadcast_removes_player() {
        let store = GameStore::new();
        let mut router = GameEventRouter::new(store.clone());

        router.on_message(message(r#"{"type":"player_joined","playerId":"0xa","currentPlayers":2}"#));
        router.on_message(message(
            r#"{"type":"player_left","action":"kick","payload":{"walletId":"0xa","username":"alice"}}"#,
        ));

        let state = store.snapshot();
        assert!(!state.players.contains_key("0xa"));
        assert_eq!(state.last_error, None);
    }

    #[test]
    fn test_exhausted_close_is_recorded() {
        let store = GameStore::new();
        let mut router = GameEventRouter::new(store.clone());

        router.on_close(CloseEvent {
            retries_exhausted: true,
            ..Default::default()
        });

        assert!(store.snapshot().last_error.is_some());
    }
}
