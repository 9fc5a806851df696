use crate::messaging::GameEvent;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Default tie-break answer window (seconds)
pub const DEFAULT_TIE_BREAK_TIME_LIMIT: u32 = 10;

/// Room lifecycle as reported by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RoomStatus {
    #[default]
    Waiting,
    CountingDown,
    InProgress,
    Finished,
    TieBreak,
    SuddenDeath,
    Completed,
    Cancelled,
}

impl RoomStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Waiting => "waiting",
            Self::CountingDown => "counting_down",
            Self::InProgress => "in_progress",
            Self::Finished => "finished",
            Self::TieBreak => "tie_break",
            Self::SuddenDeath => "sudden_death",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Room as returned by the REST API. Fields the client does not use are
/// kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(default)]
    pub room_code: Option<String>,
    #[serde(default)]
    pub status: RoomStatus,
    #[serde(default)]
    pub current_players: u32,
    #[serde(default)]
    pub max_players: Option<u32>,
    #[serde(default)]
    pub time_per_question: Option<u32>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinnerInfo {
    pub wallet_id: String,
    pub username: String,
}

/// Per-player progress within the current game
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PlayerProgress {
    pub status: String,
    pub response_time: Option<u64>,
    pub score: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    #[serde(deserialize_with = "id_string")]
    pub wallet_id: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub score: i64,
}

/// Author of a room chat line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSender {
    #[serde(deserialize_with = "id_string")]
    pub wallet_id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub sender: ChatSender,
    pub message: String,
}

/// Server feedback for the local player's last answer
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerFeedback {
    pub is_correct: bool,
    #[serde(default)]
    pub points: i64,
    #[serde(default)]
    pub total_score: i64,
    #[serde(default)]
    pub correct_answer: Option<String>,
    #[serde(default)]
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TieBreakState {
    pub round: u32,
    pub current_question: Option<Value>,
    pub is_sudden_death: bool,
    pub winner: Option<WinnerInfo>,
    pub message: String,
    pub time_limit: u32,
}

impl Default for TieBreakState {
    fn default() -> Self {
        Self {
            round: 1,
            current_question: None,
            is_sudden_death: false,
            winner: None,
            message: String::new(),
            time_limit: DEFAULT_TIE_BREAK_TIME_LIMIT,
        }
    }
}

/// Partial room-status update. Absent, zero, or empty fields keep the
/// current value.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct RoomStatusUpdate {
    #[serde(default)]
    pub tie_break_round: Option<u32>,
    #[serde(default)]
    pub current_question: Option<Value>,
    #[serde(default)]
    pub sudden_death_activated: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub time_limit: Option<u32>,
}

/// Client-side mirror of one game, updated from decoded channel events.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GameState {
    pub room_status: RoomStatus,
    pub start_at: Option<i64>,
    pub questions: Vec<Value>,
    pub total_questions: Option<u32>,
    pub current_question: Option<Value>,
    pub question_number: Option<u32>,
    pub question_end_at: Option<i64>,
    pub time_per_question: Option<u32>,
    pub players: BTreeMap<String, PlayerProgress>,
    pub current_players: Option<u32>,
    pub last_answer: Option<AnswerFeedback>,
    pub leaderboard: Vec<LeaderboardEntry>,
    pub winner_wallet: Option<String>,
    pub tie_break: TieBreakState,
    pub chat: Vec<ChatMessage>,
    /// Lobby room list is out of date and should be refetched
    pub rooms_stale: bool,
    pub last_error: Option<String>,
}

impl GameState {
    /// Apply one backend event.
    pub fn apply(&mut self, event: &GameEvent) {
        match event {
            GameEvent::GameStarted(started) => {
                self.start_at = started.start_at;
                self.questions = started.questions.clone();
                self.total_questions = started.total_questions;
            }
            GameEvent::PlayerJoined {
                player_id,
                current_players,
            } => {
                self.players
                    .entry(player_id.clone())
                    .or_default()
                    .status = "joined".to_string();
                if current_players.is_some() {
                    self.current_players = *current_players;
                }
            }
            GameEvent::PlayerLeft { player_id } => {
                self.players.remove(player_id);
            }
            GameEvent::PlayerAnswered {
                player_id,
                response_time,
            } => {
                let player = self.players.entry(player_id.clone()).or_default();
                player.status = "answered".to_string();
                player.response_time = *response_time;
            }
            GameEvent::NextQuestion(None) => {
                self.room_status = RoomStatus::Finished;
                self.current_question = None;
            }
            GameEvent::NextQuestion(Some(next)) => {
                self.room_status = RoomStatus::InProgress;
                self.current_question = Some(next.question.clone());
                self.question_number = next.progress.as_ref().map(|p| p.current);
                if let Some(timing) = &next.timing {
                    self.question_end_at = timing.question_end_at;
                    self.time_per_question = timing.time_per_question;
                }
                self.last_answer = None;
            }
            GameEvent::AnswerSubmitted(feedback) => {
                self.last_answer = Some(feedback.clone());
            }
            GameEvent::QuestionResult(result) => {
                for entry in &result.leaderboard {
                    self.players
                        .entry(entry.wallet_id.clone())
                        .or_default()
                        .score = Some(entry.score);
                }
                if !result.leaderboard.is_empty() {
                    self.leaderboard = result.leaderboard.clone();
                }
            }
            GameEvent::GameEnded(ended) => {
                self.leaderboard = ended.leaderboard.clone();
                self.room_status = RoomStatus::Finished;
                self.winner_wallet = ended.winner_wallet.clone();
            }
            GameEvent::RoomUpdate => self.rooms_stale = true,
            GameEvent::RoomStatus { status, update } => {
                self.update_room_status(*status, update.as_ref());
            }
            GameEvent::Error { message } => self.last_error = Some(message.clone()),
            GameEvent::Kicked { reason, .. } => {
                *self = GameState {
                    last_error: Some(reason.clone()),
                    ..GameState::default()
                };
            }
            GameEvent::Chat(line) => self.chat.push(line.clone()),
            GameEvent::ClearLocalStorage => self.clear_round_cache(),
            GameEvent::Pong | GameEvent::Unknown(_) => {}
        }
    }

    /// Drop per-round data cached for the current game
    pub fn clear_round_cache(&mut self) {
        self.questions.clear();
        self.start_at = None;
        self.question_end_at = None;
        self.last_answer = None;
    }
}

/// Accepts ids the backend sends either as strings or numbers
pub(crate) fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(id) => Ok(id),
        Value::Number(id) => Ok(id.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {}",
            other
        ))),
    }
}
