use super::state::{GameState, RoomStatus, RoomStatusUpdate, TieBreakState, WinnerInfo};
use serde::Deserialize;

/// Outcome of a tie-break answer, as returned by `POST /api/submit-answer`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TieBreakResult {
    Winner {
        winner_wallet_id: String,
        winner_username: String,
        #[serde(default)]
        message: String,
    },
    NextRound {
        round: u32,
        #[serde(default)]
        message: String,
    },
    SuddenDeath {
        #[serde(default)]
        message: String,
    },
    Cancelled {
        #[serde(default)]
        message: String,
    },
}

impl TieBreakResult {
    pub fn message(&self) -> &str {
        match self {
            Self::Winner { message, .. }
            | Self::NextRound { message, .. }
            | Self::SuddenDeath { message }
            | Self::Cancelled { message } => message,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SuddenDeathResult {
    pub status: String,
    #[serde(default)]
    pub winner_wallet_id: Option<String>,
    #[serde(default)]
    pub winner_username: Option<String>,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SubmitAnswerResponse {
    pub success: bool,
    #[serde(default)]
    pub tie_break_result: Option<TieBreakResult>,
    #[serde(default)]
    pub sudden_death_result: Option<SuddenDeathResult>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TimeoutResult {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TimeoutResponse {
    pub success: bool,
    #[serde(default)]
    pub timeout_result: Option<TimeoutResult>,
}

impl GameState {
    /// Set the room status, merging whichever tie-break fields `update` carries
    pub fn update_room_status(&mut self, status: RoomStatus, update: Option<&RoomStatusUpdate>) {
        self.room_status = status;

        let Some(update) = update else {
            return;
        };
        let tie_break = &mut self.tie_break;
        if let Some(round) = update.tie_break_round.filter(|round| *round > 0) {
            tie_break.round = round;
        }
        if let Some(question) = update.current_question.as_ref().filter(|q| !q.is_null()) {
            tie_break.current_question = Some(question.clone());
        }
        if update.sudden_death_activated.unwrap_or(false) {
            tie_break.is_sudden_death = true;
        }
        if let Some(message) = update.message.as_ref().filter(|m| !m.is_empty()) {
            tie_break.message = message.clone();
        }
        if let Some(limit) = update.time_limit.filter(|limit| *limit > 0) {
            tie_break.time_limit = limit;
        }
    }

    /// Apply a tie-break outcome. Returns the winner when the game is decided.
    pub fn apply_tie_break_result(&mut self, result: &TieBreakResult) -> Option<WinnerInfo> {
        self.tie_break.message = result.message().to_string();

        match result {
            TieBreakResult::Winner {
                winner_wallet_id,
                winner_username,
                ..
            } => {
                let winner = WinnerInfo {
                    wallet_id: winner_wallet_id.clone(),
                    username: winner_username.clone(),
                };
                self.room_status = RoomStatus::Completed;
                self.winner_wallet = Some(winner.wallet_id.clone());
                self.tie_break.winner = Some(winner.clone());
                Some(winner)
            }
            TieBreakResult::NextRound { round, .. } => {
                self.tie_break.round = *round;
                None
            }
            TieBreakResult::SuddenDeath { .. } => {
                self.room_status = RoomStatus::SuddenDeath;
                self.tie_break.is_sudden_death = true;
                None
            }
            TieBreakResult::Cancelled { .. } => {
                self.room_status = RoomStatus::Cancelled;
                None
            }
        }
    }

    /// Apply a sudden-death outcome. Only a `winner` status changes the game.
    pub fn apply_sudden_death_result(&mut self, result: &SuddenDeathResult) -> Option<WinnerInfo> {
        if result.status != "winner" {
            return None;
        }

        let winner = WinnerInfo {
            wallet_id: result.winner_wallet_id.clone().unwrap_or_default(),
            username: result.winner_username.clone().unwrap_or_default(),
        };
        self.room_status = RoomStatus::Completed;
        self.winner_wallet = Some(winner.wallet_id.clone());
        self.tie_break.winner = Some(winner.clone());
        self.tie_break.message = result.message.clone();
        Some(winner)
    }

    /// Apply both halves of a submit-answer response
    pub fn apply_submit_answer(&mut self, response: &SubmitAnswerResponse) -> Option<WinnerInfo> {
        if !response.success {
            return None;
        }
        let tie_break_winner = response
            .tie_break_result
            .as_ref()
            .and_then(|result| self.apply_tie_break_result(result));
        let sudden_death_winner = response
            .sudden_death_result
            .as_ref()
            .and_then(|result| self.apply_sudden_death_result(result));
        sudden_death_winner.or(tie_break_winner)
    }

    pub fn reset_tie_break(&mut self) {
        self.room_status = RoomStatus::Waiting;
        self.tie_break = TieBreakState::default();
    }
}
