// Game module - client-side mirror of backend game state
mod state;
mod store;
mod tie_break;

pub use state::{
    AnswerFeedback, ChatMessage, ChatSender, DEFAULT_TIE_BREAK_TIME_LIMIT, GameState, LeaderboardEntry, PlayerProgress,
    Room, RoomStatus, RoomStatusUpdate, TieBreakState, WinnerInfo,
};
pub(crate) use state::id_string;
pub use store::GameStore;
pub use tie_break::{
    SubmitAnswerResponse, SuddenDeathResult, TieBreakResult, TimeoutResponse, TimeoutResult,
};
