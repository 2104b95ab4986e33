//! Wire types for the registration backend
//!
//! Every endpoint answers with a JSON envelope `{status, message?, ...}`.
//! Payload fields are decoded leniently: the backend serializes some
//! timestamps as strings and others as bean objects.

use crate::certificate::CertificateData;
use crate::error::UiError;
use chrono::{DateTime, Local};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum ApiStatus {
    Success,
    Error,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    status: ApiStatus,
    #[serde(default)]
    message: Option<String>,
}

/// Check the envelope status, then decode the payload from the same object.
///
/// `status: "error"` becomes `UiError::Backend`, or `UiError::Unauthorized`
/// when the message says so.
pub fn decode_envelope<T: DeserializeOwned>(value: Value) -> Result<T, UiError> {
    let envelope: Envelope = serde_json::from_value(value.clone())?;
    match envelope.status {
        ApiStatus::Success => Ok(serde_json::from_value(value)?),
        ApiStatus::Error => Err(UiError::from_backend_message(
            envelope
                .message
                .unwrap_or_else(|| "An unexpected error occurred".to_string()),
        )),
    }
}

/// Payload of endpoints that only carry a message
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageBody {
    #[serde(default)]
    pub message: String,
}

/// An event offered for registration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventSummary {
    #[serde(default)]
    pub id: Option<u64>,
    pub event_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub registration_count: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventList {
    #[serde(default)]
    pub events: Vec<EventSummary>,
}

/// A registered participant as listed on the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub college: String,
    #[serde(default)]
    pub event: String,
    #[serde(default)]
    pub registration_date: Option<Value>,
    #[serde(default)]
    pub winner_status: bool,
}

impl Participant {
    pub fn registration_date_text(&self) -> String {
        self.registration_date
            .as_ref()
            .and_then(timestamp_text)
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub current_page: u32,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_count: u64,
    #[serde(default)]
    pub limit: u32,
    #[serde(default)]
    pub has_next: bool,
    #[serde(default)]
    pub has_previous: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ParticipantPage {
    #[serde(default)]
    pub participants: Vec<Participant>,
    #[serde(default)]
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    #[serde(default)]
    pub total_registrations: u64,
    #[serde(default)]
    pub total_winners: u64,
    #[serde(default)]
    pub event_registrations: BTreeMap<String, u64>,
    #[serde(default)]
    pub certificate_statistics: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatisticsBody {
    #[serde(default)]
    pub statistics: Statistics,
}

/// Form body of `POST register`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RegistrationRequest {
    pub name: String,
    pub email: String,
    pub college: String,
    pub event: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegistrationOutcome {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub registration_id: Option<u64>,
    #[serde(default, rename = "certificate_data")]
    pub certificate: Option<CertificateData>,
}

/// Payload of winner selection and winner certificate generation. The
/// certificate carries the server-issued id.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WinnerOutcome {
    #[serde(default)]
    pub message: String,
    #[serde(default, rename = "certificate_data")]
    pub certificate: Option<CertificateData>,
}

/// Export formats supported by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    Csv,
    Html,
    Json,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Html => "html",
            ExportFormat::Json => "json",
        }
    }
}

/// A downloaded export body plus the server-suggested file name
#[derive(Debug, Clone)]
pub struct ExportFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl ExportFile {
    /// Name used when the server sends no Content-Disposition
    pub fn fallback_name(format: ExportFormat, now: DateTime<Local>) -> String {
        format!(
            "participants_{}.{}",
            now.format("%Y%m%d_%H%M%S"),
            format.as_str()
        )
    }

    /// Write the export into `dir`, creating it if needed
    pub fn save_to(&self, dir: &Path) -> Result<PathBuf, UiError> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(&self.filename);
        std::fs::write(&path, &self.bytes)?;
        tracing::info!(path = %path.display(), bytes = self.bytes.len(), "export saved");
        Ok(path)
    }
}

/// Extract `filename` from a Content-Disposition header value
pub fn disposition_filename(header: &str) -> Option<String> {
    header.split(';').map(str::trim).find_map(|part| {
        let value = part.strip_prefix("filename=")?;
        let value = value.trim_matches('"');
        // Never let the server pick a directory
        let name = value.rsplit(['/', '\\']).next().unwrap_or(value);
        (!name.is_empty()).then(|| name.to_string())
    })
}

/// Render a backend timestamp as text.
///
/// Strings are passed through; bean-style objects are read from their
/// epoch-millis `time` field.
pub fn timestamp_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => millis_text(n.as_i64()?),
        Value::Object(map) => millis_text(map.get("time")?.as_i64()?),
        _ => None,
    }
}

fn millis_text(millis: i64) -> Option<String> {
    let dt = DateTime::from_timestamp_millis(millis)?;
    Some(dt.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_envelope_decodes_payload() {
        let value = json!({
            "status": "success",
            "events": [{"event_name": "Hack Night", "registration_count": 3}]
        });
        let list: EventList = decode_envelope(value).unwrap();
        assert_eq!(list.events.len(), 1);
        assert_eq!(list.events[0].event_name, "Hack Night");
        assert_eq!(list.events[0].registration_count, Some(3));
    }

    #[test]
    fn test_error_envelope_maps_to_error() {
        let value = json!({"status": "error", "message": "Participant not found"});
        let err = decode_envelope::<MessageBody>(value).unwrap_err();
        assert_eq!(err.user_message(), "Participant not found");
    }

    #[test]
    fn test_unauthorized_envelope() {
        let value = json!({"status": "error", "message": "Unauthorized access. Please login first."});
        let err = decode_envelope::<MessageBody>(value).unwrap_err();
        assert!(matches!(err, UiError::Unauthorized(_)));
    }

    #[test]
    fn test_registration_with_certificate() {
        let value = json!({
            "status": "success",
            "message": "Registration successful!",
            "registration_id": 7,
            "certificate_data": {
                "name": "Jane Doe",
                "event": "Hack Night",
                "certificate_type": "participation",
                "certificate_id": "CERT-1"
            }
        });
        let outcome: RegistrationOutcome = decode_envelope(value).unwrap();
        assert_eq!(outcome.registration_id, Some(7));
        let cert = outcome.certificate.unwrap();
        assert_eq!(cert.name.as_deref(), Some("Jane Doe"));
    }

    #[test]
    fn test_winner_outcome_keeps_server_certificate() {
        let value = json!({
            "status": "success",
            "message": "Winner selected successfully! Winner certificate is ready for download.",
            "certificate_data": {
                "id": 4,
                "name": "Jane Doe",
                "event": "Hack Night",
                "winner_status": true,
                "certificate_type": "winner",
                "certificate_id": "WIN-4-1736071200000"
            }
        });
        let outcome: WinnerOutcome = decode_envelope(value).unwrap();
        let cert = outcome.certificate.unwrap();
        assert_eq!(cert.certificate_id.as_deref(), Some("WIN-4-1736071200000"));
        assert_eq!(cert.kind(), crate::certificate::CertificateKind::Winner);
    }

    #[test]
    fn test_disposition_filename() {
        assert_eq!(
            disposition_filename("attachment; filename=\"participants_20250105.csv\""),
            Some("participants_20250105.csv".to_string())
        );
        assert_eq!(
            disposition_filename("attachment; filename=../../etc/passwd"),
            Some("passwd".to_string())
        );
        assert_eq!(disposition_filename("inline"), None);
    }

    #[test]
    fn test_timestamp_text_accepts_strings_and_beans() {
        assert_eq!(
            timestamp_text(&json!("2025-01-05 10:00:00.0")),
            Some("2025-01-05 10:00:00.0".to_string())
        );
        assert!(timestamp_text(&json!({"time": 1736071200000i64})).is_some());
        assert_eq!(timestamp_text(&json!(null)), None);
    }
}
