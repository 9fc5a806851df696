use crate::client::ChannelConfig;
use crate::game::{Room, RoomStatus, SubmitAnswerResponse, TimeoutResponse};
use crate::types::{ChannelError, error::Result};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use url::Url;

/// Which room to join: by numeric id or by invite code
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinTarget {
    Id(String),
    Code(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinRoomRequest {
    pub target: JoinTarget,
    pub wallet_id: String,
    pub username: Option<String>,
}

impl JoinRoomRequest {
    fn to_body(&self) -> Value {
        let mut body = json!({ "walletId": self.wallet_id });
        match &self.target {
            JoinTarget::Id(id) => body["roomId"] = Value::from(id.as_str()),
            JoinTarget::Code(code) => body["roomCode"] = Value::from(code.as_str()),
        }
        if let Some(username) = &self.username {
            body["username"] = Value::from(username.as_str());
        }
        body
    }
}

/// Answer to the current tie-break question
#[derive(Debug, Clone, PartialEq)]
pub struct TieBreakAnswer {
    pub room_id: String,
    pub wallet_id: String,
    pub question_id: Value,
    pub answer: String,
}

/// Thin client for the game backend's REST endpoints
#[derive(Debug, Clone)]
pub struct GameApi {
    base: Url,
    access_token: Option<String>,
    http: reqwest::Client,
}

impl GameApi {
    pub fn new(base: &str) -> Result<Self> {
        let mut base = Url::parse(base)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        base.set_query(None);

        Ok(Self {
            base,
            access_token: None,
            http: reqwest::Client::new(),
        })
    }

    /// API rooted at the same backend the channel connects to
    pub fn from_channel(config: &ChannelConfig) -> Result<Self> {
        match config.options().base_host.as_deref() {
            Some(prefix) if prefix.starts_with("ws://") || prefix.starts_with("wss://") => {
                Self::new(&ws_to_http_endpoint(prefix))
            }
            _ => {
                let url = config.url();
                let scheme = if url.scheme() == "wss" { "https" } else { "http" };
                let host = url
                    .host_str()
                    .ok_or_else(|| ChannelError::Config("channel url has no host".to_string()))?;
                match url.port() {
                    Some(port) => Self::new(&format!("{}://{}:{}/", scheme, host, port)),
                    None => Self::new(&format!("{}://{}/", scheme, host)),
                }
            }
        }
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Resolve an API path against the base
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base.join(path.trim_start_matches('/'))?)
    }

    /// `path` followed by `ids`, each escaped as a single path segment
    fn endpoint_with_ids(&self, path: &str, ids: &[&str]) -> Result<Url> {
        let mut url = self.endpoint(path)?;
        url.path_segments_mut()
            .map_err(|_| ChannelError::Config(format!("cannot extend api url {}", self.base)))?
            .extend(ids);
        Ok(url)
    }

    pub async fn list_rooms(&self) -> Result<Vec<Room>> {
        let url = self.endpoint("/api/rooms")?;
        read_json(self.request(reqwest::Method::GET, url).send().await?).await
    }

    pub async fn get_room(&self, room_id: &str) -> Result<Room> {
        let url = self.endpoint_with_ids("/api/rooms", &[room_id])?;
        read_json(self.request(reqwest::Method::GET, url).send().await?).await
    }

    pub async fn join_room(&self, request: &JoinRoomRequest) -> Result<Room> {
        let url = self.endpoint("/api/rooms/join")?;
        let response = self
            .request(reqwest::Method::POST, url)
            .json(&request.to_body())
            .send()
            .await?;
        read_json(response).await
    }

    /// One page of a player's past games
    pub async fn histories(
        &self,
        wallet_id: &str,
        limit: u32,
        offset: u32,
        status: Option<RoomStatus>,
    ) -> Result<Vec<Room>> {
        let url = self.histories_url(wallet_id, limit, offset, status)?;
        read_json(self.request(reqwest::Method::GET, url).send().await?).await
    }

    fn histories_url(
        &self,
        wallet_id: &str,
        limit: u32,
        offset: u32,
        status: Option<RoomStatus>,
    ) -> Result<Url> {
        let mut url = self.endpoint("/api/rooms/histories")?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("walletId", wallet_id)
                .append_pair("limit", &limit.to_string())
                .append_pair("offset", &offset.to_string());
            if let Some(status) = status {
                query.append_pair("status", status.as_str());
            }
        }
        Ok(url)
    }

    pub async fn submit_tie_break_answer(
        &self,
        answer: &TieBreakAnswer,
    ) -> Result<SubmitAnswerResponse> {
        let url = self.endpoint("/api/submit-answer")?;
        let body = json!({
            "room_id": answer.room_id,
            "wallet_id": answer.wallet_id,
            "question_id": answer.question_id,
            "answer": answer.answer,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        });

        tracing::debug!("Submitting tie-break answer for room {}", answer.room_id);
        let response = self
            .request(reqwest::Method::POST, url)
            .json(&body)
            .send()
            .await?;
        read_json(response).await
    }

    /// Report that the tie-break question ran out of time
    pub async fn report_timeout(&self, room_id: &str, question_id: &str) -> Result<TimeoutResponse> {
        let url = self.endpoint_with_ids("/api/timeout", &[room_id, question_id])?;
        read_json(self.request(reqwest::Method::POST, url).send().await?).await
    }

    fn request(&self, method: reqwest::Method, url: Url) -> reqwest::RequestBuilder {
        let request = self.http.request(method, url);
        match &self.access_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = api_error_message(&body)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());
        tracing::warn!("Game API returned {}: {}", status, message);
        return Err(ChannelError::Api {
            status: status.as_u16(),
            message,
        });
    }

    Ok(response.json::<T>().await?)
}

/// Pulls `error` or `message` out of a JSON error body
fn api_error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["error", "message"]
        .iter()
        .find_map(|field| value.get(field).and_then(Value::as_str))
        .map(str::to_string)
}

/// Converts WebSocket endpoint to HTTP endpoint
pub fn ws_to_http_endpoint(ws_endpoint: &str) -> String {
    ws_endpoint
        .replacen("wss://", "https://", 1)
        .replacen("ws://", "http://", 1)
        .split('?')
        .next()
        .unwrap_or(ws_endpoint)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ChannelOptions;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    #[test]
    fn test_ws_to_http_endpoint() {
        assert_eq!(
            ws_to_http_endpoint("wss://api.example.com/ws?token=x"),
            "https://api.example.com/ws"
        );
        assert_eq!(ws_to_http_endpoint("ws://localhost:8000"), "http://localhost:8000");
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let api = GameApi::new("https://api.example.com/backend").unwrap();
        assert_eq!(
            api.endpoint("/api/rooms/7").unwrap().as_str(),
            "https://api.example.com/backend/api/rooms/7"
        );
    }

    #[test]
    fn test_ids_are_escaped_as_segments() {
        let api = GameApi::new("https://api.example.com").unwrap();
        assert_eq!(
            api.endpoint_with_ids("/api/timeout", &["room/7?x", "q#1"])
                .unwrap()
                .as_str(),
            "https://api.example.com/api/timeout/room%2F7%3Fx/q%231"
        );
    }

    /// Serves one canned response and hands back the raw request head
    async fn respond_once(
        status_line: &'static str,
        body: &'static str,
    ) -> (String, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let response = format!(
                "{}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            let _ = tx.send(String::from_utf8_lossy(&request).into_owned());
        });

        (base, rx)
    }

    #[tokio::test]
    async fn test_error_status_becomes_api_error() {
        let (base, request) =
            respond_once("HTTP/1.1 404 Not Found", r#"{"error":"Room not found"}"#).await;
        let api = GameApi::new(&base).unwrap().with_access_token("secret-token");

        let result = api.get_room("room/7").await;

        match result {
            Err(ChannelError::Api { status, message }) => {
                assert_eq!(status, 404);
                assert_eq!(message, "Room not found");
            }
            other => panic!("expected api error, got {:?}", other),
        }

        let request = request.await.unwrap();
        assert!(request.starts_with("GET /api/rooms/room%2F7 HTTP/1.1"));
        assert!(
            request
                .to_ascii_lowercase()
                .contains("authorization: bearer secret-token")
        );
    }

    #[tokio::test]
    async fn test_success_decodes_json() {
        let (base, _request) = respond_once(
            "HTTP/1.1 200 OK",
            r#"{"success":true,"timeout_result":{"message":"Time is up"}}"#,
        )
        .await;
        let api = GameApi::new(&base).unwrap();

        let response = api.report_timeout("42", "7").await.unwrap();

        assert!(response.success);
        assert_eq!(response.timeout_result.unwrap().message, "Time is up");
    }

    #[test]
    fn test_from_channel_uses_channel_host() {
        let config =
            ChannelConfig::new("http://localhost:3000", "/lobby", ChannelOptions::default())
                .unwrap();
        let api = GameApi::from_channel(&config).unwrap();
        assert_eq!(api.base().as_str(), "http://localhost:3000/");

        let config = ChannelConfig::new(
            "https://play.example.com",
            "/lobby",
            ChannelOptions {
                base_host: Some("wss://backend.example.com".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        let api = GameApi::from_channel(&config).unwrap();
        assert_eq!(api.base().as_str(), "https://backend.example.com/");
    }

    #[test]
    fn test_histories_query() {
        let api = GameApi::new("https://api.example.com").unwrap();
        let url = api
            .histories_url("0xab", 10, 20, Some(RoomStatus::Finished))
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.example.com/api/rooms/histories?walletId=0xab&limit=10&offset=20&status=finished"
        );
    }

    #[test]
    fn test_join_body_by_code() {
        let request = JoinRoomRequest {
            target: JoinTarget::Code("ABCD".into()),
            wallet_id: "0xab".into(),
            username: Some("alice".into()),
        };
        assert_eq!(
            request.to_body(),
            json!({"walletId": "0xab", "roomCode": "ABCD", "username": "alice"})
        );
    }

    #[test]
    fn test_api_error_message() {
        assert_eq!(
            api_error_message(r#"{"error":"Room is full"}"#).as_deref(),
            Some("Room is full")
        );
        assert_eq!(api_error_message("<html>"), None);
    }
}
