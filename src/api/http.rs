//! reqwest implementation of `Backend`

use super::models::{
    decode_envelope, disposition_filename, EventList, MessageBody, StatisticsBody,
};
use super::{
    Backend, EventSummary, ExportFile, ExportFormat, ParticipantPage, RegistrationOutcome,
    RegistrationRequest, Statistics, WinnerOutcome, PAGE_SIZE,
};
use crate::error::UiError;
use crate::filters::FilterState;
use chrono::Local;
use reqwest::header::{CONTENT_DISPOSITION, COOKIE};
use reqwest::{Client, RequestBuilder};
use serde_json::Value;

/// HTTP client for the registration backend
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    /// Always ends with '/'
    base_url: String,
    /// Sent verbatim as the Cookie header on every request
    session_cookie: Option<String>,
}

impl HttpBackend {
    pub fn new(base_url: &str, session_cookie: Option<String>) -> Result<Self, UiError> {
        let client = Client::builder()
            .user_agent(concat!("eventdesk/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let mut base_url = base_url.trim().to_string();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Ok(Self {
            client,
            base_url,
            session_cookie: session_cookie.filter(|c| !c.is_empty()),
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    fn with_session(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.session_cookie {
            Some(cookie) => request.header(COOKIE, cookie),
            None => request,
        }
    }

    async fn get_json(&self, endpoint: &str, query: &[(&str, String)]) -> Result<Value, UiError> {
        tracing::debug!(endpoint, "GET");
        let request = self.client.get(self.url(endpoint)).query(query);
        let response = self.with_session(request).send().await?.error_for_status()?;
        Ok(response.json::<Value>().await?)
    }

    async fn post_form(&self, endpoint: &str, form: &[(&str, String)]) -> Result<Value, UiError> {
        tracing::debug!(endpoint, "POST");
        let request = self.client.post(self.url(endpoint)).form(form);
        let response = self.with_session(request).send().await?.error_for_status()?;
        Ok(response.json::<Value>().await?)
    }

    /// POST an admin action on one record and return the server message
    async fn post_action(&self, endpoint: &str, action: &str, id: u64) -> Result<String, UiError> {
        let form = [("action", action.to_string()), ("id", id.to_string())];
        let value = self.post_form(endpoint, &form).await?;
        let body: MessageBody = decode_envelope(value)?;
        Ok(body.message)
    }
}

impl Backend for HttpBackend {
    async fn list_events(&self) -> Result<Vec<EventSummary>, UiError> {
        let value = self
            .get_json("event-settings", &[("action", "get_events".to_string())])
            .await?;
        let list: EventList = decode_envelope(value)?;
        Ok(list.events)
    }

    async fn register(&self, request: RegistrationRequest) -> Result<RegistrationOutcome, UiError> {
        let form = [
            ("name", request.name),
            ("email", request.email),
            ("college", request.college),
            ("event", request.event),
        ];
        let value = self.post_form("register", &form).await?;
        decode_envelope(value)
    }

    async fn select_winner(&self, id: u64) -> Result<WinnerOutcome, UiError> {
        let form = [("action", "select_winner".to_string()), ("id", id.to_string())];
        let value = self.post_form("winner", &form).await?;
        decode_envelope(value)
    }

    async fn revoke_winner(&self, id: u64) -> Result<String, UiError> {
        self.post_action("winner", "revoke_winner", id).await
    }

    async fn winner_certificate(&self, id: u64) -> Result<WinnerOutcome, UiError> {
        let form = [
            ("action", "generate_winner_certificate".to_string()),
            ("id", id.to_string()),
        ];
        let value = self.post_form("winner", &form).await?;
        decode_envelope(value)
    }

    async fn check_session(&self) -> Result<(), UiError> {
        let value = self
            .get_json("admin-dashboard", &[("action", "check_session".to_string())])
            .await?;
        decode_envelope::<MessageBody>(value).map(|_| ())
    }

    async fn participants(&self, page: u32, filters: FilterState) -> Result<ParticipantPage, UiError> {
        let mut query = vec![
            ("action", "get_participants".to_string()),
            ("page", page.max(1).to_string()),
            ("limit", PAGE_SIZE.to_string()),
        ];
        query.extend(filters.query_pairs());
        let value = self.get_json("admin-dashboard", &query).await?;
        decode_envelope(value)
    }

    async fn statistics(&self) -> Result<Statistics, UiError> {
        let value = self
            .get_json("admin-dashboard", &[("action", "get_statistics".to_string())])
            .await?;
        let body: StatisticsBody = decode_envelope(value)?;
        Ok(body.statistics)
    }

    async fn delete_participant(&self, id: u64) -> Result<String, UiError> {
        self.post_action("admin-dashboard", "delete_participant", id).await
    }

    async fn add_event(&self, name: String, description: String) -> Result<String, UiError> {
        let form = [
            ("action", "add_event".to_string()),
            ("event_name", name),
            ("description", description),
        ];
        let value = self.post_form("event-settings", &form).await?;
        let body: MessageBody = decode_envelope(value)?;
        Ok(body.message)
    }

    async fn update_event(
        &self,
        id: u64,
        name: String,
        description: String,
    ) -> Result<String, UiError> {
        let form = [
            ("action", "update_event".to_string()),
            ("id", id.to_string()),
            ("event_name", name),
            ("description", description),
        ];
        let value = self.post_form("event-settings", &form).await?;
        let body: MessageBody = decode_envelope(value)?;
        Ok(body.message)
    }

    async fn delete_event(&self, id: u64) -> Result<String, UiError> {
        self.post_action("event-settings", "delete_event", id).await
    }

    async fn export(&self, format: ExportFormat, filters: FilterState) -> Result<ExportFile, UiError> {
        let mut query = vec![("format", format.as_str().to_string())];
        query.extend(filters.export_pairs());

        tracing::info!(format = format.as_str(), "requesting export");
        let request = self.client.get(self.url("export")).query(&query);
        let response = self.with_session(request).send().await?.error_for_status()?;

        let filename = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(disposition_filename);

        // Errors come back as a JSON envelope instead of a file
        let is_json = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/json"));
        let bytes = response.bytes().await?.to_vec();
        if is_json && filename.is_none() {
            let value: Value = serde_json::from_slice(&bytes)?;
            decode_envelope::<MessageBody>(value)?;
        }

        Ok(ExportFile {
            filename: filename.unwrap_or_else(|| ExportFile::fallback_name(format, Local::now())),
            bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Query;
    use axum::http::header;
    use axum::response::IntoResponse;
    use axum::routing::{get, post};
    use axum::{Form, Json, Router};
    use serde_json::json;
    use std::collections::HashMap;

    fn error(message: &str) -> Json<Value> {
        Json(json!({"status": "error", "message": message}))
    }

    fn success(message: &str) -> Json<Value> {
        Json(json!({"status": "success", "message": message}))
    }

    async fn event_settings(Query(q): Query<HashMap<String, String>>) -> Json<Value> {
        if q.get("action").map(String::as_str) == Some("get_events") {
            Json(json!({"status": "success", "events": [{"id": 3, "event_name": "Hack Night"}]}))
        } else {
            error("Invalid action specified")
        }
    }

    /// Event 3 has registrations and cannot be deleted
    async fn event_settings_post(Form(form): Form<HashMap<String, String>>) -> Json<Value> {
        let field = |name: &str| form.get(name).map(String::as_str).unwrap_or_default();
        match (field("action"), field("id")) {
            ("update_event", "3") if field("event_name") == "Hack Night 2" => {
                success("Event updated successfully")
            }
            ("update_event", _) => error("Failed to update event"),
            ("delete_event", "4") => success("Event deleted successfully"),
            ("delete_event", _) => {
                error("Failed to delete event. Event may have registrations.")
            }
            _ => error("Invalid action specified"),
        }
    }

    fn winner_certificate_data(id: &str) -> Value {
        json!({
            "name": "Jane",
            "event": "Hack Night",
            "certificate_type": "winner",
            "certificate_id": format!("WIN-{id}-1736071200000")
        })
    }

    /// Participant 1 is selectable, participant 2 is already a winner
    async fn winner(Form(form): Form<HashMap<String, String>>) -> Json<Value> {
        let id = form.get("id").map(String::as_str).unwrap_or_default();
        match (form.get("action").map(String::as_str), id) {
            (Some("select_winner"), "1") => Json(json!({
                "status": "success",
                "message": "Winner selected",
                "certificate_data": winner_certificate_data(id)
            })),
            (Some("select_winner"), "2") => error("Participant is already a winner"),
            (Some("revoke_winner"), "2") => success("Winner status revoked successfully"),
            (Some("revoke_winner"), "1") => error("Participant is not a winner"),
            (Some("generate_winner_certificate"), "2") => Json(json!({
                "status": "success",
                "message": "Winner certificate generated successfully",
                "certificate_data": winner_certificate_data(id)
            })),
            (Some(_), _) => error("Participant not found"),
            (None, _) => error("Invalid action specified"),
        }
    }

    async fn dashboard(Query(q): Query<HashMap<String, String>>) -> Json<Value> {
        match q.get("action").map(String::as_str) {
            Some("check_session") => Json(
                json!({"status": "error", "message": "Unauthorized access. Please login first."}),
            ),
            Some("get_participants") => Json(json!({
                "status": "success",
                "participants": [{"id": 1, "name": "Jane", "event": q.get("event")}],
                "pagination": {"current_page": 1, "total_pages": 1, "total_count": 1}
            })),
            _ => Json(json!({"status": "error", "message": "Invalid action specified"})),
        }
    }

    async fn dashboard_post(Form(form): Form<HashMap<String, String>>) -> Json<Value> {
        match (
            form.get("action").map(String::as_str),
            form.get("id").map(String::as_str),
        ) {
            (Some("delete_participant"), Some("1")) => success("Participant deleted successfully"),
            (Some("delete_participant"), _) => error("Failed to delete participant"),
            _ => error("Invalid action specified"),
        }
    }

    /// Echoes the filter parameters back in the file body
    async fn export(Query(q): Query<HashMap<String, String>>) -> impl IntoResponse {
        let body = format!(
            "winner={} status={}\n",
            q.get("winner").map(String::as_str).unwrap_or("-"),
            q.get("status").map(String::as_str).unwrap_or("-"),
        );
        (
            [
                (header::CONTENT_TYPE, "text/csv"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"participants.csv\"",
                ),
            ],
            body,
        )
    }

    async fn spawn_stub() -> HttpBackend {
        let app = Router::new()
            .route("/event-settings", get(event_settings).post(event_settings_post))
            .route("/winner", post(winner))
            .route("/admin-dashboard", get(dashboard).post(dashboard_post))
            .route("/export", get(export));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        HttpBackend::new(&format!("http://{addr}"), Some("JSESSIONID=test".to_string())).unwrap()
    }

    #[tokio::test]
    async fn test_list_events() {
        let backend = spawn_stub().await;
        let events = backend.list_events().await.unwrap();
        assert_eq!(events[0].event_name, "Hack Night");
    }

    #[tokio::test]
    async fn test_select_winner_keeps_certificate() {
        let backend = spawn_stub().await;
        let outcome = backend.select_winner(1).await.unwrap();
        assert_eq!(outcome.message, "Winner selected");
        let cert = outcome.certificate.unwrap();
        assert_eq!(cert.certificate_id.as_deref(), Some("WIN-1-1736071200000"));

        let err = backend.select_winner(2).await.unwrap_err();
        assert_eq!(err.user_message(), "Participant is already a winner");
    }

    #[tokio::test]
    async fn test_revoke_winner() {
        let backend = spawn_stub().await;
        assert_eq!(
            backend.revoke_winner(2).await.unwrap(),
            "Winner status revoked successfully"
        );
        let err = backend.revoke_winner(1).await.unwrap_err();
        assert_eq!(err.user_message(), "Participant is not a winner");
    }

    #[tokio::test]
    async fn test_winner_certificate_for_existing_winner() {
        let backend = spawn_stub().await;
        let outcome = backend.winner_certificate(2).await.unwrap();
        let cert = outcome.certificate.unwrap();
        assert_eq!(cert.certificate_id.as_deref(), Some("WIN-2-1736071200000"));
        assert_eq!(cert.certificate_type.as_deref(), Some("winner"));
    }

    #[tokio::test]
    async fn test_delete_participant() {
        let backend = spawn_stub().await;
        assert_eq!(
            backend.delete_participant(1).await.unwrap(),
            "Participant deleted successfully"
        );
        assert!(matches!(
            backend.delete_participant(9).await,
            Err(UiError::Backend(_))
        ));
    }

    #[tokio::test]
    async fn test_update_and_delete_event() {
        let backend = spawn_stub().await;
        let message = backend
            .update_event(3, "Hack Night 2".to_string(), "Overnight build".to_string())
            .await
            .unwrap();
        assert_eq!(message, "Event updated successfully");

        assert_eq!(
            backend.delete_event(4).await.unwrap(),
            "Event deleted successfully"
        );
        let err = backend.delete_event(3).await.unwrap_err();
        assert_eq!(
            err.user_message(),
            "Failed to delete event. Event may have registrations."
        );
    }

    #[tokio::test]
    async fn test_check_session_unauthorized() {
        let backend = spawn_stub().await;
        let err = backend.check_session().await.unwrap_err();
        assert!(matches!(err, UiError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_participants_forward_filters() {
        let backend = spawn_stub().await;
        let filters = FilterState {
            event: "Hack Night".to_string(),
            ..Default::default()
        };
        let page = backend.participants(1, filters).await.unwrap();
        assert_eq!(page.participants[0].event, "Hack Night");
        assert_eq!(page.pagination.total_count, 1);
    }

    #[tokio::test]
    async fn test_export_uses_disposition_name() {
        let backend = spawn_stub().await;
        let file = backend
            .export(ExportFormat::Csv, FilterState::default())
            .await
            .unwrap();
        assert_eq!(file.filename, "participants.csv");
        assert_eq!(file.bytes, b"winner=- status=-\n");
    }

    #[tokio::test]
    async fn test_export_sends_status_as_winner_filter() {
        let backend = spawn_stub().await;
        let filters = FilterState {
            status: "winner".to_string(),
            ..Default::default()
        };
        let file = backend.export(ExportFormat::Csv, filters).await.unwrap();
        assert_eq!(file.bytes, b"winner=winner status=winner\n");
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let backend = HttpBackend::new("http://localhost:8080/EventTech", None).unwrap();
        assert_eq!(backend.base_url, "http://localhost:8080/EventTech/");
        assert_eq!(backend.url("register"), "http://localhost:8080/EventTech/register");
    }
}
