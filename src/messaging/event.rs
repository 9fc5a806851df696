use crate::game::{
    AnswerFeedback, ChatMessage, LeaderboardEntry, RoomStatus, RoomStatusUpdate, id_string,
};
use crate::types::constants::{PAYLOAD_FIELD, TYPE_FIELD, client_events, game_events};
use crate::types::{ChannelMessage, Result};
use serde::Deserialize;
use serde_json::{Value, json};

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStarted {
    #[serde(default)]
    pub questions: Vec<Value>,
    #[serde(default)]
    pub start_at: Option<i64>,
    #[serde(default)]
    pub total_questions: Option<u32>,
    #[serde(default)]
    pub countdown_duration: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionTiming {
    #[serde(default)]
    pub time_per_question: Option<u32>,
    #[serde(default)]
    pub question_end_at: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct QuestionProgress {
    pub current: u32,
    #[serde(default)]
    pub total: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NextQuestion {
    #[serde(default)]
    pub question: Value,
    #[serde(default)]
    pub timing: Option<QuestionTiming>,
    #[serde(default)]
    pub progress: Option<QuestionProgress>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResult {
    #[serde(default)]
    pub correct_answer: Option<String>,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default)]
    pub answer_stats: Option<Value>,
    #[serde(default)]
    pub leaderboard: Vec<LeaderboardEntry>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct GameEnded {
    pub leaderboard: Vec<LeaderboardEntry>,
    pub winner_wallet: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GameEndedPayload {
    #[serde(default)]
    leaderboard: Vec<LeaderboardEntry>,
    #[serde(default)]
    winner: Option<WinnerRef>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WinnerRef {
    #[serde(default, deserialize_with = "optional_id")]
    wallet_id: Option<String>,
}

fn optional_id<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Id(#[serde(deserialize_with = "id_string")] String);

    Ok(Option::<Id>::deserialize(deserializer)?.map(|Id(id)| id))
}

/// Typed view of the events the game backend pushes over a channel.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    GameStarted(GameStarted),
    PlayerJoined {
        player_id: String,
        current_players: Option<u32>,
    },
    PlayerLeft {
        player_id: String,
    },
    PlayerAnswered {
        player_id: String,
        response_time: Option<u64>,
    },
    /// `None` when the backend has no further question, which ends the game
    NextQuestion(Option<NextQuestion>),
    AnswerSubmitted(AnswerFeedback),
    QuestionResult(QuestionResult),
    GameEnded(GameEnded),
    /// The lobby room list changed
    RoomUpdate,
    /// Room lifecycle transition, including tie-break and sudden death
    RoomStatus {
        status: RoomStatus,
        update: Option<RoomStatusUpdate>,
    },
    Error {
        message: String,
    },
    ClearLocalStorage,
    Pong,
    /// The host removed the local player from the room
    Kicked {
        reason: String,
        room_id: Option<String>,
    },
    Chat(ChatMessage),
    Unknown(String),
}

impl GameEvent {
    /// Interpret a decoded channel message.
    ///
    /// Unrecognised types become [`GameEvent::Unknown`]; a recognised type with
    /// a malformed body is a decode error.
    pub fn from_message(message: &ChannelMessage) -> Result<Self> {
        let event = match message.kind() {
            game_events::GAME_STARTED => Self::GameStarted(
                message
                    .field_as::<GameStarted>(PAYLOAD_FIELD)?
                    .unwrap_or_default(),
            ),
            game_events::PLAYER_JOINED => Self::PlayerJoined {
                player_id: player_id(message)?,
                current_players: message.field_as("currentPlayers")?,
            },
            game_events::PLAYER_LEFT => Self::PlayerLeft {
                player_id: player_id(message)?,
            },
            game_events::PLAYER_ANSWERED => Self::PlayerAnswered {
                player_id: player_id(message)?,
                response_time: message.field_as("responseTime")?,
            },
            game_events::NEXT_QUESTION => {
                let next = message.field_as::<NextQuestion>(PAYLOAD_FIELD)?;
                Self::NextQuestion(next.filter(|next| !next.question.is_null()))
            }
            game_events::ANSWER_SUBMITTED => {
                Self::AnswerSubmitted(required(message, PAYLOAD_FIELD)?)
            }
            game_events::QUESTION_RESULT => {
                Self::QuestionResult(required(message, PAYLOAD_FIELD)?)
            }
            game_events::GAME_ENDED => {
                let payload = message.field_as::<GameEndedPayload>(PAYLOAD_FIELD)?;
                Self::GameEnded(payload.map_or_else(GameEnded::default, |payload| GameEnded {
                    leaderboard: payload.leaderboard,
                    winner_wallet: payload.winner.and_then(|winner| winner.wallet_id),
                }))
            }
            game_events::ROOM_UPDATE => Self::RoomUpdate,
            game_events::ROOM_STATUS => Self::RoomStatus {
                status: required(message, "status")?,
                update: message.field_as("data")?,
            },
            game_events::ERROR => Self::Error {
                message: error_message(message),
            },
            game_events::CLEAR_LOCAL_STORAGE => Self::ClearLocalStorage,
            game_events::PONG => Self::Pong,
            game_events::KICKED => {
                let payload = message.payload();
                Self::Kicked {
                    reason: payload
                        .and_then(|payload| payload.get("reason"))
                        .and_then(Value::as_str)
                        .unwrap_or("You were removed from the room")
                        .to_string(),
                    room_id: payload.and_then(|payload| id_value(payload.get("roomId"))),
                }
            }
            game_events::CHAT => Self::Chat(required(message, PAYLOAD_FIELD)?),
            other => Self::Unknown(other.to_string()),
        };
        Ok(event)
    }
}

fn required<T: serde::de::DeserializeOwned>(message: &ChannelMessage, field: &str) -> Result<T> {
    message.field_as(field)?.ok_or_else(|| {
        crate::types::ChannelError::decode(
            format!("'{}' message is missing '{}'", message.kind(), field),
            message.value().to_string(),
        )
    })
}

/// Top-level `playerId`, or `payload.walletId` as sent on kicks
fn player_id(message: &ChannelMessage) -> Result<String> {
    id_value(message.get("playerId"))
        .or_else(|| id_value(message.payload().and_then(|payload| payload.get("walletId"))))
        .ok_or_else(|| {
            crate::types::ChannelError::decode(
                format!("'{}' message has no usable player id", message.kind()),
                message.value().to_string(),
            )
        })
}

fn id_value(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(id) => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

fn error_message(message: &ChannelMessage) -> String {
    message
        .get("message")
        .and_then(Value::as_str)
        .or_else(|| {
            message
                .payload()
                .and_then(|payload| payload.get("message"))
                .and_then(Value::as_str)
        })
        .unwrap_or("An error occurred")
        .to_string()
}

/// Answer submission sent over the room channel
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerSubmission {
    pub room_id: String,
    /// Empty when the question timed out
    pub answer: String,
    pub response_time: u64,
    pub question_start_at: i64,
}

/// Messages the client sends to the backend
#[derive(Debug, Clone, PartialEq)]
pub enum ClientMessage {
    Ping,
    JoinRoom { room_id: String },
    LeaveRoom { room_id: String, player_id: String },
    SubmitAnswer(AnswerSubmission),
    /// Host-only; the backend rejects kicks from anyone else
    KickPlayer { room_id: String, wallet_id: String },
    Chat(ChatMessage),
}

impl ClientMessage {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Ping => client_events::PING,
            Self::JoinRoom { .. } => client_events::JOIN_ROOM,
            Self::LeaveRoom { .. } => client_events::LEAVE_ROOM,
            Self::SubmitAnswer(_) => client_events::SUBMIT_ANSWER,
            Self::KickPlayer { .. } => client_events::KICK_PLAYER,
            Self::Chat(_) => client_events::CHAT,
        }
    }

    pub fn to_value(&self) -> Value {
        let mut value = match self {
            Self::Ping => json!({}),
            Self::JoinRoom { room_id } => json!({ "roomId": room_id }),
            Self::LeaveRoom { room_id, player_id } => {
                json!({ "roomId": room_id, "playerId": player_id })
            }
            Self::SubmitAnswer(submission) => json!({
                "data": {
                    "roomId": submission.room_id,
                    "answer": submission.answer,
                    "responseTime": submission.response_time,
                    "questionStartAt": submission.question_start_at,
                }
            }),
            Self::KickPlayer { room_id, wallet_id } => json!({
                "payload": { "wallet_id": wallet_id, "room_id": room_id }
            }),
            Self::Chat(line) => json!({ "payload": line }),
        };
        value[TYPE_FIELD] = Value::from(self.kind());
        value
    }
}

impl From<ClientMessage> for Value {
    fn from(message: ClientMessage) -> Self {
        message.to_value()
    }
}
