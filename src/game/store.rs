use super::state::{GameState, RoomStatus, RoomStatusUpdate, WinnerInfo};
use super::tie_break::{SubmitAnswerResponse, TieBreakResult};
use crate::messaging::GameEvent;
use parking_lot::RwLock;
use std::sync::Arc;

/// Shared, injectable game state container.
///
/// Starts at [`GameState::default()`] and can be returned there with
/// [`reset()`](Self::reset). Clones share the same state.
#[derive(Clone, Default)]
pub struct GameStore {
    state: Arc<RwLock<GameState>>,
}

impl GameStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: GameState) -> Self {
        Self {
            state: Arc::new(RwLock::new(state)),
        }
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> GameState {
        self.state.read().clone()
    }

    /// Read a value without cloning the whole state
    pub fn read<R>(&self, f: impl FnOnce(&GameState) -> R) -> R {
        f(&self.state.read())
    }

    pub fn update<R>(&self, f: impl FnOnce(&mut GameState) -> R) -> R {
        f(&mut self.state.write())
    }

    pub fn reset(&self) {
        *self.state.write() = GameState::default();
    }

    pub fn apply(&self, event: &GameEvent) {
        self.state.write().apply(event);
    }

    pub fn update_room_status(&self, status: RoomStatus, update: Option<&RoomStatusUpdate>) {
        self.state.write().update_room_status(status, update);
    }

    pub fn apply_tie_break_result(&self, result: &TieBreakResult) -> Option<WinnerInfo> {
        self.state.write().apply_tie_break_result(result)
    }

    pub fn apply_submit_answer(&self, response: &SubmitAnswerResponse) -> Option<WinnerInfo> {
        self.state.write().apply_submit_answer(response)
    }

    pub fn reset_tie_break(&self) {
        self.state.write().reset_tie_break();
    }

    pub fn record_error(&self, message: impl Into<String>) {
        self.state.write().last_error = Some(message.into());
    }
}

impl std::fmt::Debug for GameStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameStore")
            .field("state", &*self.state.read())
            .finish()
    }
}
