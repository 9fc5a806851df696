// Infrastructure module - retry timing and the backend REST client
pub mod http;
pub mod timer;

pub use http::{GameApi, JoinRoomRequest, JoinTarget, TieBreakAnswer, ws_to_http_endpoint};
pub use timer::{Backoff, Scheduler, TokioScheduler};
