// Messaging module - typed game events and routing into the game store
pub mod event;
pub mod router;

pub use event::{
    AnswerSubmission, ClientMessage, GameEnded, GameEvent, GameStarted, NextQuestion,
    QuestionProgress, QuestionResult, QuestionTiming,
};
pub use router::GameEventRouter;
