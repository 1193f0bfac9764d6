use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::booking::resource::{RecurringClass, ResourceId, Session};

pub const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("Request rejected with status {status}: {}", .detail.as_deref().unwrap_or("no detail"))]
    Rejected { status: u16, detail: Option<String> },
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Authentication failed: {}", .0.as_deref().unwrap_or("no detail"))]
    AuthenticationFailed(Option<String>),
    #[error("Parse error: {0}")]
    ParseError(String),
}

impl ApiError {
    pub fn user_detail(&self) -> String {
        match self {
            ApiError::Rejected { detail: Some(detail), .. }
            | ApiError::AuthenticationFailed(Some(detail)) => detail.clone(),
            ApiError::NotFound(detail) if !detail.is_empty() => detail.clone(),
            _ => GENERIC_FAILURE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub session_id: ResourceId,
    pub call_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingConfirmation {
    pub id: u64,
    pub session_id: ResourceId,
    pub call_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassBookingRequest {
    pub student_id: u64,
    pub session_id: ResourceId,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ClassBookingResponse {
    #[serde(default)]
    pub invite_code: Option<String>,
    pub stripe_checkout_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutRequest {
    #[serde(with = "wall_clock")]
    pub start: NaiveDateTime,
    #[serde(with = "wall_clock")]
    pub end: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CheckoutSession {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinInfo {
    pub session_id: ResourceId,
    pub zoom_link: Option<String>,
    pub discord_invite_link: Option<String>,
    pub price_per_seat: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NextSession {
    pub title: String,
    pub date: String,
    pub time: String,
    pub link: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<serde_json::Value>,
}

mod wall_clock {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, FORMAT).map_err(serde::de::Error::custom)
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookingApi: Send + Sync {
    async fn fetch_sessions(&self) -> Result<Vec<Session>, ApiError>;

    async fn fetch_classes(&self) -> Result<Vec<RecurringClass>, ApiError>;

    async fn create_booking(&self, request: &BookingRequest) -> Result<BookingConfirmation, ApiError>;

    async fn book_class(&self, request: &ClassBookingRequest) -> Result<ClassBookingResponse, ApiError>;

    async fn create_checkout_session(&self, request: &CheckoutRequest) -> Result<CheckoutSession, ApiError>;

    async fn join_info(&self, invite_code: &str) -> Result<JoinInfo, ApiError>;

    async fn next_session(&self) -> Result<NextSession, ApiError>;
}

pub struct HttpBookingClient {
    base_url: String,
    auth_token: Option<String>,
    client: reqwest::Client,
}

impl HttpBookingClient {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_token: None,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_auth_token(mut self, token: Option<String>) -> Self {
        self.auth_token = token.filter(|t| !t.is_empty());
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn check_status(
        response: reqwest::Response,
        what: &str,
    ) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        tracing::info!("{} response status: {}", what, status);

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.detail)
            .and_then(|d| match d {
                serde_json::Value::String(s) => Some(s),
                _ => None,
            });

        if status == 401 {
            tracing::error!("Authentication failed during {}: {:?}", what, detail);
            return Err(ApiError::AuthenticationFailed(detail));
        }

        if status == 404 {
            tracing::error!("{} target not found: {:?}", what, detail);
            return Err(ApiError::NotFound(detail.unwrap_or_default()));
        }

        tracing::error!("{} failed. Status: {}, Body: {}", what, status, body);
        Err(ApiError::Rejected {
            status: status.as_u16(),
            detail,
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str, what: &str) -> Result<T, ApiError> {
        let response = self.authorize(self.client.get(self.url(path))).send().await?;
        let response = Self::check_status(response, what).await?;
        response
            .json()
            .await
            .map_err(|e| ApiError::ParseError(format!("{}: {}", what, e)))
    }

    async fn post_json<B, T>(&self, path: &str, body: &B, what: &str) -> Result<T, ApiError>
    where
        B: Serialize + Sync + ?Sized,
        T: serde::de::DeserializeOwned,
    {
        tracing::debug!("POST {} with payload: {}", path, serde_json::to_string(body).unwrap_or_default());
        let response = self
            .authorize(self.client.post(self.url(path)))
            .json(body)
            .send()
            .await?;
        let response = Self::check_status(response, what).await?;
        response
            .json()
            .await
            .map_err(|e| ApiError::ParseError(format!("{}: {}", what, e)))
    }
}

#[async_trait]
impl BookingApi for HttpBookingClient {
    async fn fetch_sessions(&self) -> Result<Vec<Session>, ApiError> {
        let sessions: Vec<Session> = self.get_json("/sessions", "Fetch sessions").await?;
        tracing::info!("Fetched {} sessions", sessions.len());
        Ok(sessions)
    }

    async fn fetch_classes(&self) -> Result<Vec<RecurringClass>, ApiError> {
        let classes: Vec<RecurringClass> = self.get_json("/classes", "Fetch classes").await?;
        tracing::info!("Fetched {} classes", classes.len());
        Ok(classes)
    }

    async fn create_booking(&self, request: &BookingRequest) -> Result<BookingConfirmation, ApiError> {
        tracing::info!("Booking session {} via {}", request.session_id, request.call_type);
        self.post_json("/bookings", request, "Create booking").await
    }

    async fn book_class(&self, request: &ClassBookingRequest) -> Result<ClassBookingResponse, ApiError> {
        tracing::info!("Requesting checkout for session {}", request.session_id);
        self.post_json("/class/book", request, "Book class").await
    }

    async fn create_checkout_session(&self, request: &CheckoutRequest) -> Result<CheckoutSession, ApiError> {
        tracing::info!("Creating checkout session for {} - {}", request.start, request.end);
        self.post_json("/create-checkout-session", request, "Create checkout session").await
    }

    async fn join_info(&self, invite_code: &str) -> Result<JoinInfo, ApiError> {
        let path = format!("/class/join?code={}", urlencoding::encode(invite_code));
        self.get_json(&path, "Fetch join info").await
    }

    async fn next_session(&self) -> Result<NextSession, ApiError> {
        self.get_json("/next-session", "Fetch next session").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    #[test]
    fn client_trims_trailing_slash() {
        let client = HttpBookingClient::new("http://localhost:8000/".to_string());

        assert_eq!(client.base_url, "http://localhost:8000");
    }

    #[test]
    fn empty_token_is_not_sent() {
        let client = HttpBookingClient::new("http://localhost".to_string())
            .with_auth_token(Some(String::new()));

        assert_eq!(client.auth_token, None);
    }

    #[test]
    fn checkout_request_serializes_wall_clock_times() {
        let request = CheckoutRequest { start: at(9, 0), end: at(10, 30) };

        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(
            json,
            serde_json::json!({ "start": "2024-01-01T09:00:00", "end": "2024-01-01T10:30:00" })
        );
    }

    #[test]
    fn user_detail_falls_back_to_generic_message() {
        let err = ApiError::Rejected { status: 500, detail: None };

        assert_eq!(err.user_detail(), GENERIC_FAILURE);
    }

    #[tokio::test]
    async fn fetch_sessions_sends_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sessions"))
            .and(header("authorization", "Bearer secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([{
                "id": 1,
                "start_time": "2024-01-01T10:00:00Z",
                "end_time": "2024-01-01T11:00:00Z",
                "price_per_seat": 0,
                "max_participants": 1,
                "current_bookings": 0
            }])))
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpBookingClient::new(server.uri()).with_auth_token(Some("secret".to_string()));
        let sessions = client.fetch_sessions().await.unwrap();

        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].id, 1);
    }

    #[tokio::test]
    async fn checkout_session_posts_start_and_end() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/create-checkout-session"))
            .and(body_json(serde_json::json!({
                "start": "2024-01-01T09:00:00",
                "end": "2024-01-01T10:30:00"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "url": "https://pay.example/cs_123"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpBookingClient::new(server.uri());
        let session = client
            .create_checkout_session(&CheckoutRequest { start: at(9, 0), end: at(10, 30) })
            .await
            .unwrap();

        assert_eq!(session.url, "https://pay.example/cs_123");
    }

    #[tokio::test]
    async fn backend_detail_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/create-checkout-session"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "detail": "card declined"
            })))
            .mount(&server)
            .await;

        let client = HttpBookingClient::new(server.uri());
        let err = client
            .create_checkout_session(&CheckoutRequest { start: at(9, 0), end: at(10, 30) })
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Rejected { status: 400, .. }));
        assert_eq!(err.user_detail(), "card declined");
    }

    #[tokio::test]
    async fn unauthorized_maps_to_authentication_failed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/classes"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = HttpBookingClient::new(server.uri());
        let err = client.fetch_classes().await.unwrap_err();

        assert!(matches!(err, ApiError::AuthenticationFailed(None)));
        assert_eq!(err.user_detail(), GENERIC_FAILURE);
    }

    #[tokio::test]
    async fn unauthorized_keeps_backend_detail() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sessions"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(serde_json::json!({ "detail": "Token expired" })),
            )
            .mount(&server)
            .await;

        let client = HttpBookingClient::new(server.uri()).with_auth_token(Some("stale".to_string()));
        let err = client.fetch_sessions().await.unwrap_err();

        assert!(matches!(&err, ApiError::AuthenticationFailed(Some(d)) if d == "Token expired"));
        assert_eq!(err.user_detail(), "Token expired");
    }

    #[tokio::test]
    async fn join_info_encodes_invite_code() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/class/join"))
            .and(query_param("code", "abc 123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "session_id": 4,
                "zoom_link": "https://zoom.example/j/1",
                "discord_invite_link": null,
                "price_per_seat": 2500
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpBookingClient::new(server.uri());
        let info = client.join_info("abc 123").await.unwrap();

        assert_eq!(info.session_id, 4);
        assert_eq!(info.zoom_link.as_deref(), Some("https://zoom.example/j/1"));
    }

    #[tokio::test]
    async fn unpaid_invite_is_not_found_with_detail() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/class/join"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "detail": "Invalid or unpaid invite"
            })))
            .mount(&server)
            .await;

        let client = HttpBookingClient::new(server.uri());
        let err = client.join_info("nope").await.unwrap_err();

        assert_eq!(err.user_detail(), "Invalid or unpaid invite");
    }
}
