/// Path segment every channel endpoint lives under (`scheme://host/ws{path}`)
pub const WS_PATH_PREFIX: &str = "/ws";

/// Discriminant field carried by every wire message
pub const TYPE_FIELD: &str = "type";

/// Payload field used by most backend events
pub const PAYLOAD_FIELD: &str = "payload";

/// Default delay before the first reconnect attempt (milliseconds)
pub const DEFAULT_INITIAL_BACKOFF_MS: u64 = 1000;

/// Default ceiling for reconnect delays (milliseconds)
pub const DEFAULT_MAX_BACKOFF_MS: u64 = 30_000;

/// Default reconnect budget
pub const DEFAULT_MAX_RECONNECT_ATTEMPTS: u32 = 10;

/// Default wait for the server's close acknowledgement (milliseconds)
pub const DEFAULT_CLOSE_TIMEOUT_MS: u64 = 5000;

/// WebSocket close codes
pub const WS_CLOSE_NORMAL: u16 = 1000;

/// Message types sent by the client
pub mod client_events {
    pub const PING: &str = "ping";
    pub const JOIN_ROOM: &str = "join_room";
    pub const LEAVE_ROOM: &str = "leave_room";
    pub const SUBMIT_ANSWER: &str = "submit_answer";
    pub const KICK_PLAYER: &str = "kick_player";
    pub const CHAT: &str = "chat";
}

/// Message types emitted by the game backend
pub mod game_events {
    pub const GAME_STARTED: &str = "game_started";
    pub const PLAYER_JOINED: &str = "player_joined";
    pub const PLAYER_LEFT: &str = "player_left";
    pub const PLAYER_ANSWERED: &str = "player_answered";
    pub const NEXT_QUESTION: &str = "next_question";
    pub const ANSWER_SUBMITTED: &str = "answer_submitted";
    pub const QUESTION_RESULT: &str = "question_result";
    pub const GAME_ENDED: &str = "game_ended";
    pub const ROOM_UPDATE: &str = "room_update";
    pub const ROOM_STATUS: &str = "room_status";
    pub const ERROR: &str = "error";
    pub const CLEAR_LOCAL_STORAGE: &str = "clear_local_storage";
    pub const PONG: &str = "pong";
    pub const KICKED: &str = "kicked";
    pub const CHAT: &str = "chat";
}
